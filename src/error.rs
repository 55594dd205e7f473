// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry construction errors

use thiserror::Error;

/// Errors raised while resolving materials, creating shapes or assembling
/// the placement hierarchy. All of them abort construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("invalid geometry for '{shape}': {reason}")]
    InvalidGeometry { shape: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("overlap detected between '{0}' and '{1}'")]
    OverlapDetected(String, String),

    #[error("'{child}' protrudes from its mother '{mother}'")]
    Protrusion { child: String, mother: String },

    #[error("volume '{0}' already carries a sensitive tag")]
    DuplicateSensitiveTag(String),

    #[error("volume '{0}' already carries a field region")]
    DuplicateFieldRegion(String),

    #[error("invalid placement of '{volume}': {reason}")]
    InvalidPlacement { volume: String, reason: String },
}

impl GeometryError {
    pub(crate) fn invalid_geometry(shape: &str, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            shape: shape.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_placement(volume: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPlacement {
            volume: volume.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeometryError>;
