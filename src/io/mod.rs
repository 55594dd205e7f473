// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - geometry description export

mod export;

pub use export::{describe, export_json, to_json_string, GeometryDescription, PlacementRecord, VolumeRecord};
