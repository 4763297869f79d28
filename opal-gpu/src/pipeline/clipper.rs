// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Near-plane clipping.
//!
//! Triangles are clipped against `z = -w` in homogeneous clip space,
//! before perspective division; linear interpolation in clip space is
//! what keeps the later perspective-correct interpolation valid. A
//! vertex is inside when `z ≥ -w`. Depending on how many vertices are
//! inside, a triangle yields zero, one, or two output triangles.

use glam::Vec4;

use opal_common::{Attribute, AttributeType, OutVertex, MAX_ATTRIBUTES};

use super::Triangle;

/// Clip one triangle against the near plane. Varyings declared
/// non-`Empty` in `varyings` are interpolated alongside the position;
/// fully inside triangles pass through unchanged.
pub fn clip_triangle(
    tri: &Triangle,
    varyings: &[AttributeType; MAX_ATTRIBUTES],
) -> Vec<Triangle> {
    let mut inside: Vec<&OutVertex> = Vec::with_capacity(3);
    let mut outside: Vec<&OutVertex> = Vec::with_capacity(3);
    for v in &tri.vertices {
        if v.position.z >= -v.position.w {
            inside.push(v);
        } else {
            outside.push(v);
        }
    }

    match inside.len() {
        0 => Vec::new(),
        3 => vec![*tri],
        2 => {
            // Two survivors A, B; the outside vertex F is replaced by the
            // two edge intersections P (on A-F) and Q (on B-F).
            let (a, b, f) = (inside[0], inside[1], outside[0]);
            let p = clip_vertex(a, f, varyings);
            let q = clip_vertex(b, f, varyings);
            vec![
                Triangle {
                    vertices: [*a, p, q],
                },
                Triangle {
                    vertices: [*a, *b, q],
                },
            ]
        }
        1 => {
            let (a, f1, f2) = (inside[0], outside[0], outside[1]);
            let p = clip_vertex(a, f1, varyings);
            let q = clip_vertex(a, f2, varyings);
            vec![Triangle {
                vertices: [*a, p, q],
            }]
        }
        _ => unreachable!("a triangle has three vertices"),
    }
}

/// Parameter of the intersection of edge A→B with the near plane.
/// A is inside and B outside, so the denominator is strictly negative.
fn intersection_t(a: Vec4, b: Vec4) -> f32 {
    (-a.w - a.z) / ((b.w - a.w) + (b.z - a.z))
}

/// New vertex on the near plane along A→B, with position and declared
/// varyings interpolated in clip space by the same parameter.
fn clip_vertex(
    a: &OutVertex,
    b: &OutVertex,
    varyings: &[AttributeType; MAX_ATTRIBUTES],
) -> OutVertex {
    let t = intersection_t(a.position, b.position);
    let mut out = OutVertex {
        position: a.position.lerp(b.position, t),
        ..OutVertex::default()
    };
    for (slot, ty) in varyings.iter().enumerate() {
        if *ty != AttributeType::Empty {
            out.attributes[slot] =
                Attribute::lerp(a.attributes[slot], b.attributes[slot], t, *ty);
        }
    }
    out
}
