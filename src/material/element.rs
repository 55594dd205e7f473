// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Chemical element table

use serde::Serialize;

/// A chemical element with its molar mass in g/mol
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Element {
    pub symbol: &'static str,
    pub name: &'static str,
    pub z: u32,
    pub molar_mass: f64,
}

const ELEMENTS: &[Element] = &[
    Element { symbol: "H", name: "Hydrogen", z: 1, molar_mass: 1.008 },
    Element { symbol: "Be", name: "Beryllium", z: 4, molar_mass: 9.012 },
    Element { symbol: "C", name: "Carbon", z: 6, molar_mass: 12.011 },
    Element { symbol: "N", name: "Nitrogen", z: 7, molar_mass: 14.007 },
    Element { symbol: "O", name: "Oxygen", z: 8, molar_mass: 15.999 },
    Element { symbol: "F", name: "Fluorine", z: 9, molar_mass: 18.998 },
    Element { symbol: "Na", name: "Sodium", z: 11, molar_mass: 22.990 },
    Element { symbol: "Al", name: "Aluminium", z: 13, molar_mass: 26.982 },
    Element { symbol: "Si", name: "Silicon", z: 14, molar_mass: 28.085 },
    Element { symbol: "S", name: "Sulfur", z: 16, molar_mass: 32.06 },
    Element { symbol: "Ar", name: "Argon", z: 18, molar_mass: 39.948 },
    Element { symbol: "Ca", name: "Calcium", z: 20, molar_mass: 40.078 },
    Element { symbol: "Fe", name: "Iron", z: 26, molar_mass: 55.845 },
    Element { symbol: "Cu", name: "Copper", z: 29, molar_mass: 63.546 },
    Element { symbol: "W", name: "Tungsten", z: 74, molar_mass: 183.84 },
    Element { symbol: "Pb", name: "Lead", z: 82, molar_mass: 207.2 },
];

/// Look up an element by its chemical symbol
pub fn element(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_symbol() {
        let w = element("W").unwrap();
        assert_eq!(w.z, 74);
        assert!(element("Xx").is_none());
    }
}
