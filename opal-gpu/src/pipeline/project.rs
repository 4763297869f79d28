// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Perspective division and viewport transform.

use super::Triangle;

/// Divide x, y, z of each vertex by its clip-space w. The w component is
/// kept as-is; the rasterizer needs it for perspective-correct
/// interpolation.
pub fn perspective_division(tri: &mut Triangle) {
    for v in &mut tri.vertices {
        let w = v.position.w;
        v.position.x /= w;
        v.position.y /= w;
        v.position.z /= w;
    }
}

/// Map NDC x/y to pixel coordinates: `[-1, 1]` spans `[0, extent − 1]`.
/// Depth is untouched.
pub fn viewport_transform(tri: &mut Triangle, width: u32, height: u32) {
    let sx = (width as f32 - 1.0) / 2.0;
    let sy = (height as f32 - 1.0) / 2.0;
    for v in &mut tri.vertices {
        v.position.x = (v.position.x + 1.0) * sx;
        v.position.y = (v.position.y + 1.0) * sy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use opal_common::OutVertex;

    fn triangle(positions: [Vec4; 3]) -> Triangle {
        Triangle {
            vertices: positions.map(|p| OutVertex {
                position: p,
                ..OutVertex::default()
            }),
        }
    }

    #[test]
    fn test_perspective_division_keeps_w() {
        let mut tri = triangle([
            Vec4::new(2.0, 4.0, 1.0, 2.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(-3.0, 3.0, 3.0, 3.0),
        ]);
        perspective_division(&mut tri);

        assert_eq!(tri.vertices[0].position, Vec4::new(1.0, 2.0, 0.5, 2.0));
        assert_eq!(tri.vertices[1].position, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(tri.vertices[2].position, Vec4::new(-1.0, 1.0, 1.0, 3.0));
    }

    #[test]
    fn test_viewport_maps_ndc_corners() {
        let mut tri = triangle([
            Vec4::new(-1.0, -1.0, 0.0, 1.0),
            Vec4::new(1.0, 1.0, 0.25, 1.0),
            Vec4::new(0.0, 0.0, -0.5, 1.0),
        ]);
        viewport_transform(&mut tri, 101, 51);

        let p0 = tri.vertices[0].position;
        let p1 = tri.vertices[1].position;
        let p2 = tri.vertices[2].position;
        assert_eq!((p0.x, p0.y), (0.0, 0.0));
        assert_eq!((p1.x, p1.y), (100.0, 50.0));
        assert_eq!((p2.x, p2.y), (50.0, 25.0));
        // z passes through untouched.
        assert_eq!(p1.z, 0.25);
        assert_eq!(p2.z, -0.5);
    }
}
