// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shader programs.
//!
//! A program bundles a vertex shader, a fragment shader, the varying-type
//! table (which vertex shader outputs are interpolated into fragment
//! attributes, and with what shape) and a uniform block.

use opal_common::{
    AttributeType, FragmentShader, Uniforms, VertexShader, MAX_ATTRIBUTES,
};

pub struct Program {
    vertex_shader: Option<VertexShader>,
    fragment_shader: Option<FragmentShader>,
    varyings: [AttributeType; MAX_ATTRIBUTES],
    uniforms: Uniforms,
}

impl Program {
    /// A fresh program: no shaders, all varyings `Empty`, zeroed uniforms.
    pub fn new() -> Self {
        Self {
            vertex_shader: None,
            fragment_shader: None,
            varyings: [AttributeType::Empty; MAX_ATTRIBUTES],
            uniforms: Uniforms::new(),
        }
    }

    pub fn attach_shaders(&mut self, vs: VertexShader, fs: FragmentShader) {
        self.vertex_shader = Some(vs);
        self.fragment_shader = Some(fs);
    }

    /// Both shaders, or `None` while the program is incomplete.
    pub fn shaders(&self) -> Option<(VertexShader, FragmentShader)> {
        Some((self.vertex_shader?, self.fragment_shader?))
    }

    /// Declare the shape of varying `slot`. Out-of-range slots are ignored.
    pub fn set_varying(&mut self, slot: usize, attr_type: AttributeType) {
        if let Some(v) = self.varyings.get_mut(slot) {
            *v = attr_type;
        }
    }

    pub fn varyings(&self) -> &[AttributeType; MAX_ATTRIBUTES] {
        &self.varyings
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.uniforms
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opal_common::{InFragment, InVertex, OutFragment, OutVertex, UniformValue};

    fn vs(out: &mut OutVertex, input: &InVertex, _uni: &Uniforms) {
        out.position = input.attributes[0].vec4();
    }

    fn fs(out: &mut OutFragment, _input: &InFragment, _uni: &Uniforms) {
        out.color = glam::Vec4::ONE;
    }

    #[test]
    fn test_new_program_is_incomplete() {
        let prog = Program::new();
        assert!(prog.shaders().is_none());
        assert!(prog
            .varyings()
            .iter()
            .all(|v| *v == AttributeType::Empty));
    }

    #[test]
    fn test_attach_shaders_completes() {
        let mut prog = Program::new();
        prog.attach_shaders(vs, fs);
        assert!(prog.shaders().is_some());
    }

    #[test]
    fn test_set_varying() {
        let mut prog = Program::new();
        prog.set_varying(2, AttributeType::Vec3);
        assert_eq!(prog.varyings()[2], AttributeType::Vec3);

        // Out of range: ignored.
        prog.set_varying(MAX_ATTRIBUTES, AttributeType::Float);
        prog.set_varying(usize::MAX, AttributeType::Float);
    }

    #[test]
    fn test_uniform_block() {
        let mut prog = Program::new();
        prog.uniforms_mut().set(4, UniformValue::Float(2.5));
        assert_eq!(prog.uniforms().float(4), 2.5);
    }
}
