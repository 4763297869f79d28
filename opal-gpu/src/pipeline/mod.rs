// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Draw pipeline stages.
//!
//! A triangle assembly flows through the stages in order: near-plane
//! clipping in clip space, perspective division and viewport transform,
//! then rasterization into fragments. The device drives the stages per
//! input triangle and hands the produced fragments to the fragment
//! shader.

pub mod clipper;
pub mod project;
pub mod raster;

use opal_common::OutVertex;

/// Three shaded vertices forming one primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [OutVertex; 3],
}
