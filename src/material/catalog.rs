// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Material catalog with resolution cache

use super::element::element;
use super::{Component, Material, MaterialState};
use crate::error::{GeometryError, Result};
use crate::units::{G_PER_CM3, MG_PER_CM3};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// How a built-in material is assembled on first resolution
enum Recipe {
    /// Pure element
    Element(&'static str),
    /// Molecule given by atom counts
    Compound(&'static [(&'static str, u32)]),
    /// Element mix given by mass fractions
    ElementMix(&'static [(&'static str, f64)]),
    /// Mix of other catalog materials given by mass fractions
    Mixture(&'static [(&'static str, f64)]),
}

struct Definition {
    name: &'static str,
    density: f64,
    state: MaterialState,
    recipe: Recipe,
}

const DEFINITIONS: &[Definition] = &[
    Definition {
        name: "G4_Galactic",
        density: 1.0e-25 * G_PER_CM3,
        state: MaterialState::Gas,
        recipe: Recipe::Element("H"),
    },
    Definition {
        name: "G4_AIR",
        density: 1.20479 * MG_PER_CM3,
        state: MaterialState::Gas,
        recipe: Recipe::ElementMix(&[("C", 0.000124), ("N", 0.755268), ("O", 0.231781), ("Ar", 0.012827)]),
    },
    Definition {
        name: "G4_Be",
        density: 1.848 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Element("Be"),
    },
    Definition {
        name: "G4_Al",
        density: 2.699 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Element("Al"),
    },
    Definition {
        name: "G4_Si",
        density: 2.33 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Element("Si"),
    },
    Definition {
        name: "G4_Fe",
        density: 7.874 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Element("Fe"),
    },
    Definition {
        name: "G4_Cu",
        density: 8.96 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Element("Cu"),
    },
    Definition {
        name: "G4_W",
        density: 19.3 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Element("W"),
    },
    Definition {
        name: "G4_Pb",
        density: 11.35 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Element("Pb"),
    },
    Definition {
        name: "G4_PbWO4",
        density: 8.28 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::Compound(&[("Pb", 1), ("W", 1), ("O", 4)]),
    },
    Definition {
        name: "G4_GLASS_PLATE",
        density: 2.4 * G_PER_CM3,
        state: MaterialState::Solid,
        recipe: Recipe::ElementMix(&[("O", 0.4598), ("Na", 0.0964), ("Si", 0.3365), ("Ca", 0.1073)]),
    },
    Definition {
        name: "Freon",
        density: 4.25 * MG_PER_CM3,
        state: MaterialState::Gas,
        recipe: Recipe::Compound(&[("C", 2), ("H", 2), ("F", 4)]),
    },
    Definition {
        name: "Isobutane",
        density: 2.51 * MG_PER_CM3,
        state: MaterialState::Gas,
        recipe: Recipe::Compound(&[("C", 4), ("H", 10)]),
    },
    Definition {
        name: "SF6",
        density: 6.17 * MG_PER_CM3,
        state: MaterialState::Gas,
        recipe: Recipe::Compound(&[("S", 1), ("F", 6)]),
    },
    Definition {
        name: "RPCGas",
        density: 4.18 * MG_PER_CM3,
        state: MaterialState::Gas,
        recipe: Recipe::Mixture(&[("Freon", 0.947), ("Isobutane", 0.045), ("SF6", 0.008)]),
    },
];

/// Friendly names accepted in configuration files
const ALIASES: &[(&str, &str)] = &[
    ("Vacuum", "G4_Galactic"),
    ("Galactic", "G4_Galactic"),
    ("Air", "G4_AIR"),
    ("Beryllium", "G4_Be"),
    ("Aluminium", "G4_Al"),
    ("Silicon", "G4_Si"),
    ("Iron", "G4_Fe"),
    ("Copper", "G4_Cu"),
    ("Tungsten", "G4_W"),
    ("Lead", "G4_Pb"),
    ("PbWO4", "G4_PbWO4"),
    ("Glass", "G4_GLASS_PLATE"),
];

/// Resolves material names to shared material records.
///
/// Resolved materials are cached, so repeated lookups return the same
/// `Arc`. The cache is a concurrent map and the catalog can be shared
/// between threads.
#[derive(Debug)]
pub struct MaterialCatalog {
    cache: DashMap<String, Arc<Material>>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Resolve a predefined or NIST-style material name
    pub fn resolve(&self, name: &str) -> Result<Arc<Material>> {
        if let Some(material) = self.cache.get(name).map(|entry| Arc::clone(entry.value())) {
            return Ok(material);
        }

        let canonical = canonical_name(name);
        let definition = DEFINITIONS
            .iter()
            .find(|d| d.name == canonical)
            .ok_or_else(|| GeometryError::UnknownMaterial(name.to_string()))?;

        let material = Arc::new(self.build(definition)?);
        debug!(material = %material.name, density = material.density, "resolved material");

        // First insertion wins so every caller shares one record.
        let shared = Arc::clone(
            self.cache
                .entry(canonical.to_string())
                .or_insert(material)
                .value(),
        );
        if name != canonical {
            self.cache.insert(name.to_string(), Arc::clone(&shared));
        }
        Ok(shared)
    }

    /// Whether `name` resolves without error
    pub fn contains(&self, name: &str) -> bool {
        let canonical = canonical_name(name);
        DEFINITIONS.iter().any(|d| d.name == canonical)
    }

    /// Number of materials resolved so far
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// All built-in names, canonical first, then aliases
    pub fn names() -> Vec<&'static str> {
        DEFINITIONS
            .iter()
            .map(|d| d.name)
            .chain(ALIASES.iter().map(|(alias, _)| *alias))
            .collect()
    }

    fn build(&self, definition: &Definition) -> Result<Material> {
        let composition = match definition.recipe {
            Recipe::Element(symbol) => vec![component(definition.name, symbol, 1.0)?],
            Recipe::Compound(atoms) => {
                let mut weighted = Vec::with_capacity(atoms.len());
                for (symbol, count) in atoms {
                    let el = element(symbol).ok_or_else(|| unknown_element(definition.name, symbol))?;
                    weighted.push((*symbol, el.molar_mass * f64::from(*count)));
                }
                let total: f64 = weighted.iter().map(|(_, mass)| mass).sum();
                weighted
                    .into_iter()
                    .map(|(symbol, mass)| component(definition.name, symbol, mass / total))
                    .collect::<Result<Vec<_>>>()?
            }
            Recipe::ElementMix(fractions) => fractions
                .iter()
                .map(|(symbol, fraction)| component(definition.name, symbol, *fraction))
                .collect::<Result<Vec<_>>>()?,
            Recipe::Mixture(parts) => {
                let mut merged: Vec<Component> = Vec::new();
                for (part, fraction) in parts {
                    let material = self.resolve(part)?;
                    for c in &material.composition {
                        let share = c.mass_fraction * fraction;
                        match merged.iter_mut().find(|m| m.symbol == c.symbol) {
                            Some(existing) => existing.mass_fraction += share,
                            None => merged.push(Component {
                                symbol: c.symbol.clone(),
                                mass_fraction: share,
                            }),
                        }
                    }
                }
                merged
            }
        };

        Ok(Material::new(
            definition.name,
            definition.density,
            definition.state,
            composition,
        ))
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical_name(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

fn component(material: &str, symbol: &str, mass_fraction: f64) -> Result<Component> {
    element(symbol).ok_or_else(|| unknown_element(material, symbol))?;
    Ok(Component {
        symbol: symbol.to_string(),
        mass_fraction,
    })
}

fn unknown_element(material: &str, symbol: &str) -> GeometryError {
    GeometryError::UnknownMaterial(format!("{material} (element {symbol})"))
}
