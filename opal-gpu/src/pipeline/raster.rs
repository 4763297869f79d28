// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Triangle rasterization.
//!
//! Walks the clamped bounding box of a projected triangle and emits one
//! fragment per covered pixel center, row by row, x fastest. Coverage
//! uses three edge functions normalized by the triangle's winding so
//! that interior samples make all of them non-negative; samples exactly
//! on an edge count as covered for both neighboring triangles. Varyings,
//! depth and w interpolate perspective-correctly using the clip-space w
//! of each vertex.

use glam::{Vec3, Vec4};

use opal_common::{Attribute, AttributeType, InFragment, MAX_ATTRIBUTES};

use super::Triangle;

/// Rasterize one projected triangle into fragments, in row-major order
/// (y ascending, x ascending). Only varyings declared non-`Empty` are
/// interpolated into the fragments.
pub fn rasterize(
    tri: &Triangle,
    varyings: &[AttributeType; MAX_ATTRIBUTES],
    width: u32,
    height: u32,
) -> Vec<InFragment> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let pa = tri.vertices[0].position;
    let pb = tri.vertices[1].position;
    let pc = tri.vertices[2].position;
    if !(pa.is_finite() && pb.is_finite() && pc.is_finite()) {
        log::trace!("raster: non-finite vertex position, triangle skipped");
        return Vec::new();
    }

    // Bounding box clamped to the framebuffer; empty box means nothing
    // to do.
    let x_lo = pa.x.min(pb.x).min(pc.x).floor().max(0.0);
    let x_hi = pa.x.max(pb.x).max(pc.x).floor().min(width as f32 - 1.0);
    let y_lo = pa.y.min(pb.y).min(pc.y).floor().max(0.0);
    let y_hi = pa.y.max(pb.y).max(pc.y).floor().min(height as f32 - 1.0);
    if x_lo > x_hi || y_lo > y_hi {
        return Vec::new();
    }
    let (x_min, x_max) = (x_lo as u32, x_hi as u32);
    let (y_min, y_max) = (y_lo as u32, y_hi as u32);

    // Twice the signed area decides the winding; its sign flips the edge
    // functions so that "inside" is non-negative either way.
    let area = (pb.x - pa.x) * (pc.y - pa.y) - (pc.x - pa.x) * (pb.y - pa.y);
    if area == 0.0 {
        log::trace!("raster: degenerate triangle skipped");
        return Vec::new();
    }
    let flip = if area > 0.0 { -1.0 } else { 1.0 };

    let edge = |p: Vec4, q: Vec4, x: f32, y: f32| {
        ((x - p.x) * (q.y - p.y) - (y - p.y) * (q.x - p.x)) * flip
    };

    let inv_w = Vec3::new(1.0 / pa.w, 1.0 / pb.w, 1.0 / pc.w);
    let mut fragments = Vec::new();

    for y in y_min..=y_max {
        let sy = y as f32 + 0.5;
        for x in x_min..=x_max {
            let sx = x as f32 + 0.5;
            let e_ab = edge(pa, pb, sx, sy);
            let e_bc = edge(pb, pc, sx, sy);
            let e_ca = edge(pc, pa, sx, sy);
            if e_ab < 0.0 || e_bc < 0.0 || e_ca < 0.0 {
                continue;
            }

            // Barycentrics: each weight is the sub-triangle opposite the
            // vertex over the full area.
            let lambdas = Vec3::new(e_bc, e_ca, e_ab) / (e_ab + e_bc + e_ca);
            let denom = lambdas.dot(inv_w);
            if !denom.is_finite() || denom == 0.0 {
                continue;
            }

            let mut frag = InFragment::default();
            let z = correct_scalar(lambdas, inv_w, denom, pa.z, pb.z, pc.z);
            let w = correct_scalar(lambdas, inv_w, denom, pa.w, pb.w, pc.w);
            frag.frag_coord = Vec4::new(sx, sy, z, w);

            for (slot, ty) in varyings.iter().enumerate() {
                if *ty != AttributeType::Empty {
                    frag.attributes[slot] = correct_attribute(
                        lambdas,
                        inv_w,
                        denom,
                        tri.vertices[0].attributes[slot],
                        tri.vertices[1].attributes[slot],
                        tri.vertices[2].attributes[slot],
                        *ty,
                    );
                }
            }

            fragments.push(frag);
        }
    }

    fragments
}

/// Perspective-correct interpolation of a scalar:
/// `(Σ λᵢ·vᵢ/wᵢ) / (Σ λᵢ/wᵢ)`.
fn correct_scalar(lambdas: Vec3, inv_w: Vec3, denom: f32, a: f32, b: f32, c: f32) -> f32 {
    (Vec3::new(a, b, c) * inv_w).dot(lambdas) / denom
}

/// Same interpolation lifted over the attribute shapes, dispatched on the
/// declared varying type.
fn correct_attribute(
    lambdas: Vec3,
    inv_w: Vec3,
    denom: f32,
    a: Attribute,
    b: Attribute,
    c: Attribute,
    ty: AttributeType,
) -> Attribute {
    let weights = lambdas * inv_w;
    match ty {
        AttributeType::Empty => Attribute::Empty,
        AttributeType::Float => Attribute::Float(correct_scalar(
            lambdas,
            inv_w,
            denom,
            a.float(),
            b.float(),
            c.float(),
        )),
        AttributeType::Vec2 => Attribute::Vec2(
            (a.vec2() * weights.x + b.vec2() * weights.y + c.vec2() * weights.z) / denom,
        ),
        AttributeType::Vec3 => Attribute::Vec3(
            (a.vec3() * weights.x + b.vec3() * weights.y + c.vec3() * weights.z) / denom,
        ),
        AttributeType::Vec4 => Attribute::Vec4(
            (a.vec4() * weights.x + b.vec4() * weights.y + c.vec4() * weights.z) / denom,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_common::OutVertex;

    fn triangle(positions: [Vec4; 3]) -> Triangle {
        Triangle {
            vertices: positions.map(|p| OutVertex {
                position: p,
                ..OutVertex::default()
            }),
        }
    }

    fn no_varyings() -> [AttributeType; MAX_ATTRIBUTES] {
        [AttributeType::Empty; MAX_ATTRIBUTES]
    }

    fn centers(fragments: &[InFragment]) -> Vec<(f32, f32)> {
        fragments
            .iter()
            .map(|f| (f.frag_coord.x, f.frag_coord.y))
            .collect()
    }

    #[test]
    fn test_lower_left_half_coverage_includes_diagonal() {
        // Pixel-space triangle (0,0)-(3,0)-(0,3) on a 4×4 target: the six
        // centers on or below the diagonal are covered.
        let tri = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(3.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 3.0, 0.0, 1.0),
        ]);
        let frags = rasterize(&tri, &no_varyings(), 4, 4);
        assert_eq!(
            centers(&frags),
            vec![
                (0.5, 0.5),
                (1.5, 0.5),
                (2.5, 0.5),
                (0.5, 1.5),
                (1.5, 1.5),
                (0.5, 2.5),
            ]
        );
    }

    #[test]
    fn test_winding_does_not_change_coverage() {
        let ccw = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(3.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 3.0, 0.0, 1.0),
        ]);
        let cw = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 3.0, 0.0, 1.0),
            Vec4::new(3.0, 0.0, 0.0, 1.0),
        ]);
        let a = rasterize(&ccw, &no_varyings(), 4, 4);
        let b = rasterize(&cw, &no_varyings(), 4, 4);
        assert_eq!(centers(&a), centers(&b));
    }

    #[test]
    fn test_full_cover_triangle_hits_every_pixel() {
        let tri = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(8.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 8.0, 0.0, 1.0),
        ]);
        let frags = rasterize(&tri, &no_varyings(), 4, 4);
        assert_eq!(frags.len(), 16);
        // Row-major order: first fragment is (0,0), last is (3,3).
        assert_eq!(centers(&frags)[0], (0.5, 0.5));
        assert_eq!(centers(&frags)[15], (3.5, 3.5));
    }

    #[test]
    fn test_bounding_box_clamped_to_target() {
        let tri = triangle([
            Vec4::new(-10.0, -10.0, 0.0, 1.0),
            Vec4::new(20.0, -10.0, 0.0, 1.0),
            Vec4::new(-10.0, 20.0, 0.0, 1.0),
        ]);
        let frags = rasterize(&tri, &no_varyings(), 2, 2);
        assert_eq!(frags.len(), 4);
    }

    #[test]
    fn test_off_screen_triangle_emits_nothing() {
        let tri = triangle([
            Vec4::new(10.0, 10.0, 0.0, 1.0),
            Vec4::new(12.0, 10.0, 0.0, 1.0),
            Vec4::new(10.0, 12.0, 0.0, 1.0),
        ]);
        assert!(rasterize(&tri, &no_varyings(), 4, 4).is_empty());
    }

    #[test]
    fn test_degenerate_triangle_skipped() {
        let tri = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(2.0, 2.0, 0.0, 1.0),
            Vec4::new(4.0, 4.0, 0.0, 1.0),
        ]);
        assert!(rasterize(&tri, &no_varyings(), 4, 4).is_empty());
    }

    #[test]
    fn test_equal_w_interpolation_is_affine() {
        // With all w = 1 the perspective correction reduces to plain
        // barycentric interpolation.
        let mut tri = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(4.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 4.0, 0.0, 1.0),
        ]);
        tri.vertices[0].attributes[0] = Attribute::Float(0.0);
        tri.vertices[1].attributes[0] = Attribute::Float(1.0);
        tri.vertices[2].attributes[0] = Attribute::Float(0.0);
        let mut varyings = no_varyings();
        varyings[0] = AttributeType::Float;

        let frags = rasterize(&tri, &varyings, 4, 4);
        let frag = frags
            .iter()
            .find(|f| f.frag_coord.x == 1.5 && f.frag_coord.y == 1.5)
            .unwrap();
        // λ_B at (1.5, 1.5) for this right triangle is 1.5/4.
        assert!((frag.attributes[0].float() - 0.375).abs() < 1e-5);
    }

    #[test]
    fn test_perspective_correct_interpolation_law() {
        // One vertex at w = 2: the interpolated value must satisfy
        // (Σ λᵢ·vᵢ/wᵢ)/(Σ λᵢ/wᵢ) and differ from the affine average.
        let mut tri = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(4.0, 0.0, 0.0, 2.0),
            Vec4::new(0.0, 4.0, 0.0, 1.0),
        ]);
        tri.vertices[0].attributes[0] = Attribute::Float(0.0);
        tri.vertices[1].attributes[0] = Attribute::Float(1.0);
        tri.vertices[2].attributes[0] = Attribute::Float(0.0);
        let mut varyings = no_varyings();
        varyings[0] = AttributeType::Float;

        let frags = rasterize(&tri, &varyings, 4, 4);
        let frag = frags
            .iter()
            .find(|f| f.frag_coord.x == 1.5 && f.frag_coord.y == 1.5)
            .unwrap();

        // Barycentrics at (1.5, 1.5): λ = (0.25, 0.375, 0.375).
        let (la, lb, lc) = (0.25, 0.375, 0.375);
        let expected = (lb * 1.0 / 2.0) / (la / 1.0 + lb / 2.0 + lc / 1.0);
        let affine = lb;
        assert!((frag.attributes[0].float() - expected).abs() < 1e-5);
        assert!((expected - affine).abs() > 0.05);

        // w in frag_coord is the inverse-interpolated clip w.
        let expected_w = 1.0 / (la / 1.0 + lb / 2.0 + lc / 1.0);
        assert!((frag.frag_coord.w - expected_w).abs() < 1e-5);
    }

    #[test]
    fn test_depth_interpolates_perspective_correct() {
        let tri = triangle([
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(4.0, 0.0, 1.0, 2.0),
            Vec4::new(0.0, 4.0, 0.0, 1.0),
        ]);
        let frags = rasterize(&tri, &no_varyings(), 4, 4);
        let frag = frags
            .iter()
            .find(|f| f.frag_coord.x == 1.5 && f.frag_coord.y == 1.5)
            .unwrap();

        let (la, lb, lc) = (0.25, 0.375, 0.375);
        let denom = la / 1.0 + lb / 2.0 + lc / 1.0;
        let expected_z = (lb * 1.0 / 2.0) / denom;
        assert!((frag.frag_coord.z - expected_z).abs() < 1e-5);
    }
}
