// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Material module - element table, material records and the catalog

mod catalog;
mod element;

pub use catalog::MaterialCatalog;
pub use element::{element, Element};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaterialState {
    Solid,
    Gas,
}

/// One element's share of a material, by mass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub symbol: String,
    pub mass_fraction: f64,
}

/// Physical material record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub name: String,
    /// g/cm³
    pub density: f64,
    pub state: MaterialState,
    pub composition: Vec<Component>,
}

impl Material {
    /// Create a material; mass fractions are normalized to sum to one
    pub fn new(
        name: impl Into<String>,
        density: f64,
        state: MaterialState,
        mut composition: Vec<Component>,
    ) -> Self {
        let total: f64 = composition.iter().map(|c| c.mass_fraction).sum();
        if total > 0.0 {
            for c in &mut composition {
                c.mass_fraction /= total;
            }
        }
        Self {
            name: name.into(),
            density,
            state,
            composition,
        }
    }

    /// Mass fraction of an element, zero if absent
    pub fn mass_fraction(&self, symbol: &str) -> f64 {
        self.composition
            .iter()
            .find(|c| c.symbol == symbol)
            .map(|c| c.mass_fraction)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractions_are_normalized() {
        let m = Material::new(
            "half-and-half",
            1.0,
            MaterialState::Solid,
            vec![
                Component { symbol: "C".into(), mass_fraction: 2.0 },
                Component { symbol: "H".into(), mass_fraction: 2.0 },
            ],
        );
        assert_eq!(m.mass_fraction("C"), 0.5);
        assert_eq!(m.mass_fraction("O"), 0.0);
    }
}
