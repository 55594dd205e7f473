// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Unit conventions
//!
//! Lengths are stored in millimetres, densities in g/cm³ and magnetic
//! fields in tesla. Multiply a literal by one of these constants to make
//! the unit explicit at the call site.

pub const MM: f64 = 1.0;

pub const G_PER_CM3: f64 = 1.0;
pub const MG_PER_CM3: f64 = 1.0e-3 * G_PER_CM3;

pub const TESLA: f64 = 1.0;

/// mm³ to cm³
pub const MM3_TO_CM3: f64 = 1.0e-3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_centimetre() {
        // 1 cm = 10 mm
        let side = 10.0 * MM;
        assert_eq!(side * side * side * MM3_TO_CM3, 1.0);
    }
}
