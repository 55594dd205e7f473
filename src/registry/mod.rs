// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Side tables handed to the transport engine: sensitive volumes and
//! field regions, keyed by volume identity

mod field;
mod sensitive;

pub use field::{Axis, FieldRegion, FieldRegistry};
pub use sensitive::{CalorimeterId, DetectorRole, SensitiveRegistry, SensitiveTag, TrackerId};
