// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Vertex attribute model.
//!
//! An attribute is a tagged value of one of four float shapes. The tag
//! (`AttributeType`) lives in puller heads and in the program's varying
//! table and decides how many bytes a read head fetches and which shape
//! the interpolators operate on.

use glam::{Vec2, Vec3, Vec4};

/// Shape of a vertex attribute. `Empty` marks an unused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeType {
    #[default]
    Empty,
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl AttributeType {
    /// Number of float components.
    #[inline]
    pub const fn component_count(self) -> usize {
        match self {
            AttributeType::Empty => 0,
            AttributeType::Float => 1,
            AttributeType::Vec2 => 2,
            AttributeType::Vec3 => 3,
            AttributeType::Vec4 => 4,
        }
    }

    /// Size in bytes of one attribute of this shape.
    #[inline]
    pub const fn size_bytes(self) -> u64 {
        (self.component_count() * 4) as u64
    }
}

/// One attribute value. The carried shape normally matches the declared
/// `AttributeType`; the accessors return zero values on a mismatch so a
/// misconfigured pipeline degrades instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Attribute {
    #[default]
    Empty,
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

impl Attribute {
    /// Shape tag of the carried value.
    pub const fn attr_type(self) -> AttributeType {
        match self {
            Attribute::Empty => AttributeType::Empty,
            Attribute::Float(_) => AttributeType::Float,
            Attribute::Vec2(_) => AttributeType::Vec2,
            Attribute::Vec3(_) => AttributeType::Vec3,
            Attribute::Vec4(_) => AttributeType::Vec4,
        }
    }

    #[inline]
    pub fn float(self) -> f32 {
        match self {
            Attribute::Float(v) => v,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn vec2(self) -> Vec2 {
        match self {
            Attribute::Vec2(v) => v,
            _ => Vec2::ZERO,
        }
    }

    #[inline]
    pub fn vec3(self) -> Vec3 {
        match self {
            Attribute::Vec3(v) => v,
            _ => Vec3::ZERO,
        }
    }

    #[inline]
    pub fn vec4(self) -> Vec4 {
        match self {
            Attribute::Vec4(v) => v,
            _ => Vec4::ZERO,
        }
    }

    /// Linear interpolation `a + t·(b − a)`, dispatched on the declared
    /// shape. `Empty` slots stay empty.
    pub fn lerp(a: Attribute, b: Attribute, t: f32, ty: AttributeType) -> Attribute {
        match ty {
            AttributeType::Empty => Attribute::Empty,
            AttributeType::Float => Attribute::Float(a.float() + t * (b.float() - a.float())),
            AttributeType::Vec2 => Attribute::Vec2(a.vec2().lerp(b.vec2(), t)),
            AttributeType::Vec3 => Attribute::Vec3(a.vec3().lerp(b.vec3(), t)),
            AttributeType::Vec4 => Attribute::Vec4(a.vec4().lerp(b.vec4(), t)),
        }
    }
}
