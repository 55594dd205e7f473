// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detector configuration
//!
//! A `DetectorConfig` is an immutable value handed to construction. The
//! builder setters return a modified copy; changing a value only takes
//! effect on the next construction.

use crate::error::{GeometryError, Result as GeometryResult};
use crate::material::MaterialCatalog;
use crate::registry::Axis;
use crate::units::TESLA;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by `DetectorConfig::load`
pub const CONFIG_FILE: &str = "dpsim.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Target material, predefined or NIST-style name
    pub target_material: String,
    /// Field over the recoil tracker (tesla)
    pub recoil_field: f64,
    /// Field over the tag tracker (tesla)
    pub tag_field: f64,
    /// Step-length hint for tracker planes (mm)
    pub max_step: Option<f64>,
    pub check_overlaps: bool,
    /// World half-size as a multiple of the largest content extent
    pub world_margin: f64,
    pub design: DesignParameters,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            target_material: "Tungsten".to_string(),
            recoil_field: 1.5 * TESLA,
            tag_field: 1.5 * TESLA,
            max_step: None,
            check_overlaps: true,
            world_margin: 1.2,
            design: DesignParameters::default(),
        }
    }
}

/// Fixed design ratios of the test stand. Lengths in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignParameters {
    /// Gap between neighbouring sub-detectors along the beam
    pub clearance: f64,
    pub field_axis: Axis,
    pub target: TargetDesign,
    pub tracker: TrackerDesign,
    pub ecal: EcalDesign,
    pub hcal: HcalDesign,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            clearance: 1.0,
            field_axis: Axis::Y,
            target: TargetDesign::default(),
            tracker: TrackerDesign::default(),
            ecal: EcalDesign::default(),
            hcal: HcalDesign::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetDesign {
    pub half_xy: f64,
    pub thickness: f64,
}

impl Default for TargetDesign {
    fn default() -> Self {
        Self {
            half_xy: 50.0,
            thickness: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerDesign {
    pub half_xy: f64,
    /// Planes per tracker; tag and recoil are identical
    pub planes: u32,
    pub plane_thickness: f64,
    pub plane_pitch: f64,
}

impl Default for TrackerDesign {
    fn default() -> Self {
        Self {
            half_xy: 100.0,
            planes: 7,
            plane_thickness: 0.15,
            plane_pitch: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcalDesign {
    pub half_xy: f64,
    pub modules: u32,
    pub module_thickness: f64,
    pub module_gap: f64,
}

impl Default for EcalDesign {
    fn default() -> Self {
        Self {
            half_xy: 250.0,
            modules: 11,
            module_thickness: 20.0,
            module_gap: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HcalDesign {
    /// Barrel layers along the beam
    pub layers: u32,
    /// End-cap layers downstream of the barrel
    pub cap_layers: u32,
    /// Layers in each side stack flanking the barrel in x
    pub side_layers: u32,
    pub absorber_thickness: f64,
    pub rpc_inner_radius: f64,
    pub rpc_outer_radius: f64,
    pub rpc_half_thickness: f64,
    pub gas_half_thickness: f64,
    /// Glass between the gas gap and the downstream face of the shell
    pub back_glass: f64,
    /// Gas slot half width as a fraction of the shell's transverse half
    /// size; for the round barrel shells, of the largest inscribed square
    pub slot_fraction: f64,
    pub layer_gap: f64,
}

impl Default for HcalDesign {
    fn default() -> Self {
        Self {
            layers: 10,
            cap_layers: 3,
            side_layers: 3,
            absorber_thickness: 50.0,
            rpc_inner_radius: 0.0,
            rpc_outer_radius: 500.0,
            rpc_half_thickness: 4.0,
            gas_half_thickness: 1.0,
            back_glass: 1.0,
            slot_fraction: 0.9,
            layer_gap: 1.0,
        }
    }
}

impl DetectorConfig {
    pub fn with_target_material(mut self, name: impl Into<String>) -> Self {
        self.target_material = name.into();
        self
    }

    pub fn with_recoil_field(mut self, tesla: f64) -> Self {
        self.recoil_field = tesla;
        self
    }

    pub fn with_tag_field(mut self, tesla: f64) -> Self {
        self.tag_field = tesla;
        self
    }

    pub fn with_max_step(mut self, max_step: Option<f64>) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_check_overlaps(mut self, enabled: bool) -> Self {
        self.check_overlaps = enabled;
        self
    }

    pub fn with_world_margin(mut self, margin: f64) -> Self {
        self.world_margin = margin;
        self
    }

    pub fn with_ecal_modules(mut self, modules: u32) -> Self {
        self.design.ecal.modules = modules;
        self
    }

    pub fn with_hcal_layers(mut self, layers: u32) -> Self {
        self.design.hcal.layers = layers;
        self
    }

    pub fn with_hcal_cap_layers(mut self, layers: u32) -> Self {
        self.design.hcal.cap_layers = layers;
        self
    }

    pub fn with_hcal_side_layers(mut self, layers: u32) -> Self {
        self.design.hcal.side_layers = layers;
        self
    }

    /// Check the scalar settings and that the target material resolves.
    /// Derived dimensions are checked when the layout is computed.
    pub fn validate(&self, catalog: &MaterialCatalog) -> GeometryResult<()> {
        catalog.resolve(&self.target_material)?;

        for (what, value) in [("recoil field", self.recoil_field), ("tag field", self.tag_field)] {
            if !value.is_finite() {
                return Err(GeometryError::InvalidConfig(format!("{what} must be finite, got {value}")));
            }
        }
        if let Some(step) = self.max_step {
            if !(step.is_finite() && step > 0.0) {
                return Err(GeometryError::InvalidConfig(format!(
                    "max step must be positive, got {step}"
                )));
            }
        }
        if !(self.world_margin.is_finite() && self.world_margin > 0.0) {
            return Err(GeometryError::InvalidConfig(format!(
                "world margin must be positive, got {}",
                self.world_margin
            )));
        }
        if !(self.design.clearance.is_finite() && self.design.clearance >= 0.0) {
            return Err(GeometryError::InvalidConfig(format!(
                "clearance must be non-negative, got {}",
                self.design.clearance
            )));
        }
        for (what, count) in [
            ("tracker planes", self.design.tracker.planes),
            ("ECal modules", self.design.ecal.modules),
            ("HCal layers", self.design.hcal.layers),
            ("HCal end-cap layers", self.design.hcal.cap_layers),
            ("HCal side layers", self.design.hcal.side_layers),
        ] {
            if count == 0 {
                return Err(GeometryError::InvalidConfig(format!("{what} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: DetectorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `dpsim.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `DPSIM_*` overrides read through `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(material) = lookup("DPSIM_TARGET_MATERIAL") {
            self.target_material = material;
        }
        if let Some(value) = lookup("DPSIM_RECOIL_FIELD") {
            self.recoil_field = value
                .parse()
                .with_context(|| format!("Invalid DPSIM_RECOIL_FIELD: {value}"))?;
        }
        if let Some(value) = lookup("DPSIM_TAG_FIELD") {
            self.tag_field = value
                .parse()
                .with_context(|| format!("Invalid DPSIM_TAG_FIELD: {value}"))?;
        }
        if let Some(value) = lookup("DPSIM_MAX_STEP") {
            self.max_step = Some(
                value
                    .parse()
                    .with_context(|| format!("Invalid DPSIM_MAX_STEP: {value}"))?,
            );
        }
        if let Some(value) = lookup("DPSIM_CHECK_OVERLAPS") {
            self.check_overlaps = value
                .parse()
                .with_context(|| format!("Invalid DPSIM_CHECK_OVERLAPS: {value}"))?;
        }
        Ok(self)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_setters_leave_original_untouched() {
        let base = DetectorConfig::default();
        let changed = base.clone().with_target_material("Beryllium").with_tag_field(0.0);
        assert_eq!(base.target_material, "Tungsten");
        assert_eq!(changed.target_material, "Beryllium");
        assert_eq!(changed.tag_field, 0.0);
        assert_eq!(changed.recoil_field, base.recoil_field);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let catalog = MaterialCatalog::new();
        assert!(DetectorConfig::default().validate(&catalog).is_ok());

        let unknown = DetectorConfig::default().with_target_material("Kryptonite");
        assert!(matches!(unknown.validate(&catalog), Err(GeometryError::UnknownMaterial(_))));

        let nan_field = DetectorConfig::default().with_recoil_field(f64::NAN);
        assert!(matches!(nan_field.validate(&catalog), Err(GeometryError::InvalidConfig(_))));

        let bad_step = DetectorConfig::default().with_max_step(Some(0.0));
        assert!(matches!(bad_step.validate(&catalog), Err(GeometryError::InvalidConfig(_))));

        let no_modules = DetectorConfig::default().with_ecal_modules(0);
        assert!(matches!(no_modules.validate(&catalog), Err(GeometryError::InvalidConfig(_))));

        let no_side = DetectorConfig::default().with_hcal_side_layers(0);
        assert!(matches!(no_side.validate(&catalog), Err(GeometryError::InvalidConfig(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = DetectorConfig::default()
            .with_env_overrides(|key| match key {
                "DPSIM_TARGET_MATERIAL" => Some("Beryllium".to_string()),
                "DPSIM_TAG_FIELD" => Some("0.0".to_string()),
                "DPSIM_MAX_STEP" => Some("0.5".to_string()),
                "DPSIM_CHECK_OVERLAPS" => Some("false".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.target_material, "Beryllium");
        assert_eq!(config.tag_field, 0.0);
        assert_eq!(config.max_step, Some(0.5));
        assert!(!config.check_overlaps);

        let bad = DetectorConfig::default().with_env_overrides(|key| {
            (key == "DPSIM_RECOIL_FIELD").then(|| "strong".to_string())
        });
        assert!(bad.is_err());

        let unparsed_switch = DetectorConfig::default()
            .with_check_overlaps(false)
            .with_env_overrides(|key| (key == "DPSIM_CHECK_OVERLAPS").then(|| "yes".to_string()));
        let err = unparsed_switch.unwrap_err();
        assert!(format!("{err:#}").contains("DPSIM_CHECK_OVERLAPS"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DetectorConfig = toml::from_str(
            r#"
            target_material = "Beryllium"

            [design.ecal]
            modules = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.target_material, "Beryllium");
        assert_eq!(config.design.ecal.modules, 5);
        assert_eq!(config.design.ecal.half_xy, EcalDesign::default().half_xy);
        assert_eq!(config.recoil_field, 1.5);
    }
}
