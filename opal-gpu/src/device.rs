// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The device.
//!
//! Central state of the software GPU: the resource registries, the two
//! bind points (vertex puller, program), the framebuffer, and the draw
//! entry points. The API models a permissive driver: operations on dead
//! handles, out-of-range slots or incomplete draw state degrade to
//! logged no-ops, queries return defaults, and nothing ever panics —
//! misuse shows up in the rendered output instead of as errors.
//!
//! A draw call is a synchronous transaction. Triangles are processed in
//! input order; within a triangle, fragments are generated bottom-up,
//! row by row, x fastest. There is no concurrency anywhere.

use glam::{Mat4, Vec2, Vec3, Vec4};

use opal_common::{
    AttributeType, FragmentShader, Handle, IndexType, OutFragment, OutVertex, UniformValue,
    VertexShader, EMPTY_HANDLE,
};

use crate::buffer::Buffer;
use crate::framebuffer::Framebuffer;
use crate::pipeline::{clipper, project, raster, Triangle};
use crate::program::Program;
use crate::puller::VertexPuller;
use crate::registry::Registry;

pub struct Device {
    buffers: Registry<Buffer>,
    pullers: Registry<VertexPuller>,
    programs: Registry<Program>,
    framebuffer: Option<Framebuffer>,
    bound_puller: Handle,
    active_program: Handle,
}

impl Device {
    /// A fresh device: no resources, nothing bound, no framebuffer.
    pub fn new() -> Self {
        Self {
            buffers: Registry::new(),
            pullers: Registry::new(),
            programs: Registry::new(),
            framebuffer: None,
            bound_puller: EMPTY_HANDLE,
            active_program: EMPTY_HANDLE,
        }
    }

    // ── Buffers ─────────────────────────────────────────────────────────

    /// Allocate a zero-filled buffer of `size` bytes.
    pub fn create_buffer(&mut self, size: u64) -> Handle {
        let handle = self.buffers.create(Buffer::new(size));
        log::debug!("device: buffer {} created ({} bytes)", handle, size);
        handle
    }

    pub fn delete_buffer(&mut self, id: Handle) {
        self.buffers.delete(id);
    }

    /// Upload `data` at byte `offset`. Out-of-range uploads are rejected
    /// whole.
    pub fn set_buffer_data(&mut self, id: Handle, offset: u64, data: &[u8]) {
        let Some(buffer) = self.buffers.get_mut(id) else {
            return;
        };
        if let Err(err) = buffer.write(offset, data) {
            log::warn!("device: set_buffer_data on buffer {}: {}", id, err);
        }
    }

    /// Download bytes at `offset` into `dst`. On a dead handle or an
    /// out-of-range request, `dst` is left untouched.
    pub fn get_buffer_data(&self, id: Handle, offset: u64, dst: &mut [u8]) {
        let Some(buffer) = self.buffers.get(id) else {
            return;
        };
        if let Err(err) = buffer.read(offset, dst) {
            log::warn!("device: get_buffer_data on buffer {}: {}", id, err);
        }
    }

    pub fn is_buffer(&self, id: Handle) -> bool {
        self.buffers.is_live(id)
    }

    // ── Vertex pullers ──────────────────────────────────────────────────

    /// Create an empty puller: indexing off, all heads disabled.
    pub fn create_vertex_puller(&mut self) -> Handle {
        let handle = self.pullers.create(VertexPuller::new());
        log::debug!("device: vertex puller {} created", handle);
        handle
    }

    pub fn delete_vertex_puller(&mut self, id: Handle) {
        self.pullers.delete(id);
    }

    pub fn set_vertex_puller_head(
        &mut self,
        id: Handle,
        head: u32,
        attr_type: AttributeType,
        stride: u64,
        offset: u64,
        buffer: Handle,
    ) {
        if let Some(puller) = self.pullers.get_mut(id) {
            puller.set_head(head as usize, attr_type, stride, offset, buffer);
        }
    }

    pub fn set_vertex_puller_indexing(&mut self, id: Handle, index_type: IndexType, buffer: Handle) {
        if let Some(puller) = self.pullers.get_mut(id) {
            puller.set_indexing(index_type, buffer);
        }
    }

    pub fn enable_vertex_puller_head(&mut self, id: Handle, head: u32) {
        if let Some(puller) = self.pullers.get_mut(id) {
            puller.enable_head(head as usize);
        }
    }

    pub fn disable_vertex_puller_head(&mut self, id: Handle, head: u32) {
        if let Some(puller) = self.pullers.get_mut(id) {
            puller.disable_head(head as usize);
        }
    }

    /// Select the puller used by subsequent draws. Dead handles leave the
    /// binding unchanged.
    pub fn bind_vertex_puller(&mut self, id: Handle) {
        if self.pullers.is_live(id) {
            self.bound_puller = id;
        }
    }

    pub fn unbind_vertex_puller(&mut self) {
        self.bound_puller = EMPTY_HANDLE;
    }

    pub fn is_vertex_puller(&self, id: Handle) -> bool {
        self.pullers.is_live(id)
    }

    // ── Programs ────────────────────────────────────────────────────────

    /// Create a program with no shaders and all varyings `Empty`.
    pub fn create_program(&mut self) -> Handle {
        let handle = self.programs.create(Program::new());
        log::debug!("device: program {} created", handle);
        handle
    }

    pub fn delete_program(&mut self, id: Handle) {
        self.programs.delete(id);
    }

    pub fn attach_shaders(&mut self, id: Handle, vs: VertexShader, fs: FragmentShader) {
        if let Some(program) = self.programs.get_mut(id) {
            program.attach_shaders(vs, fs);
        }
    }

    /// Declare the shape of the varying in `attrib`, interpolated from
    /// the vertex shader into fragments.
    pub fn set_vs2fs_type(&mut self, id: Handle, attrib: u32, attr_type: AttributeType) {
        if let Some(program) = self.programs.get_mut(id) {
            program.set_varying(attrib as usize, attr_type);
        }
    }

    /// Select the program used by subsequent draws. Dead handles leave
    /// the selection unchanged.
    pub fn use_program(&mut self, id: Handle) {
        if self.programs.is_live(id) {
            self.active_program = id;
        }
    }

    pub fn is_program(&self, id: Handle) -> bool {
        self.programs.is_live(id)
    }

    pub fn program_uniform1f(&mut self, id: Handle, uniform_id: u32, value: f32) {
        self.set_uniform(id, uniform_id, UniformValue::Float(value));
    }

    pub fn program_uniform2f(&mut self, id: Handle, uniform_id: u32, value: Vec2) {
        self.set_uniform(id, uniform_id, UniformValue::Vec2(value));
    }

    pub fn program_uniform3f(&mut self, id: Handle, uniform_id: u32, value: Vec3) {
        self.set_uniform(id, uniform_id, UniformValue::Vec3(value));
    }

    pub fn program_uniform4f(&mut self, id: Handle, uniform_id: u32, value: Vec4) {
        self.set_uniform(id, uniform_id, UniformValue::Vec4(value));
    }

    pub fn program_uniform_matrix4f(&mut self, id: Handle, uniform_id: u32, value: Mat4) {
        self.set_uniform(id, uniform_id, UniformValue::Mat4(value));
    }

    fn set_uniform(&mut self, id: Handle, uniform_id: u32, value: UniformValue) {
        if let Some(program) = self.programs.get_mut(id) {
            program.uniforms_mut().set(uniform_id, value);
        }
    }

    // ── Framebuffer ─────────────────────────────────────────────────────

    /// Allocate the color and depth planes. An existing framebuffer is
    /// replaced.
    pub fn create_framebuffer(&mut self, width: u32, height: u32) {
        log::debug!("device: framebuffer {}x{} created", width, height);
        self.framebuffer = Some(Framebuffer::new(width, height));
    }

    pub fn delete_framebuffer(&mut self) {
        self.framebuffer = None;
    }

    /// Reallocate both planes at the new size; contents are undefined
    /// afterwards. Works whether or not a framebuffer exists.
    pub fn resize_framebuffer(&mut self, width: u32, height: u32) {
        self.framebuffer = Some(Framebuffer::new(width, height));
    }

    /// RGBA8 color plane, or an empty slice without a framebuffer.
    pub fn framebuffer_color(&self) -> &[u8] {
        self.framebuffer.as_ref().map_or(&[], Framebuffer::color)
    }

    /// Depth plane, or an empty slice without a framebuffer.
    pub fn framebuffer_depth(&self) -> &[f32] {
        self.framebuffer.as_ref().map_or(&[], Framebuffer::depth)
    }

    pub fn framebuffer_width(&self) -> u32 {
        self.framebuffer.as_ref().map_or(0, Framebuffer::width)
    }

    pub fn framebuffer_height(&self) -> u32 {
        self.framebuffer.as_ref().map_or(0, Framebuffer::height)
    }

    // ── Execution ───────────────────────────────────────────────────────

    /// Fill the color plane with `(r, g, b, a)` and reset every depth to
    /// the clear depth.
    pub fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        if let Some(fb) = &mut self.framebuffer {
            fb.clear(r, g, b, a);
        }
    }

    /// Draw `n_vertices / 3` triangles using the bound vertex puller and
    /// the active program. The draw is skipped — leaving the framebuffer
    /// untouched — when `n_vertices` is not a positive multiple of 3 or
    /// any required piece of state is missing.
    pub fn draw_triangles(&mut self, n_vertices: u32) {
        if n_vertices < 3 || n_vertices % 3 != 0 {
            log::debug!(
                "device: draw of {} vertices skipped (not a positive multiple of 3)",
                n_vertices
            );
            return;
        }
        let Some(puller) = self.pullers.get(self.bound_puller) else {
            log::debug!("device: draw skipped, no vertex puller bound");
            return;
        };
        let Some(program) = self.programs.get(self.active_program) else {
            log::debug!("device: draw skipped, no program in use");
            return;
        };
        let Some((vs, fs)) = program.shaders() else {
            log::debug!(
                "device: draw skipped, program {} has no shaders attached",
                self.active_program
            );
            return;
        };
        let Some(framebuffer) = self.framebuffer.as_mut() else {
            log::debug!("device: draw skipped, no framebuffer");
            return;
        };

        let (width, height) = (framebuffer.width(), framebuffer.height());
        let varyings = program.varyings();
        let uniforms = program.uniforms();

        log::debug!("device: drawing {} triangles", n_vertices / 3);

        for tri_index in 0..n_vertices / 3 {
            // Vertex stage: pull and shade three consecutive vertices.
            let mut vertices = [OutVertex::default(); 3];
            for (i, out) in vertices.iter_mut().enumerate() {
                let input = puller.pull(&self.buffers, 3 * tri_index + i as u32);
                vs(out, &input, uniforms);
            }
            let assembly = Triangle { vertices };

            for mut clipped in clipper::clip_triangle(&assembly, varyings) {
                project::perspective_division(&mut clipped);
                project::viewport_transform(&mut clipped, width, height);

                for fragment in raster::rasterize(&clipped, varyings, width, height) {
                    let mut shaded = OutFragment::default();
                    fs(&mut shaded, &fragment, uniforms);
                    framebuffer.write_fragment(
                        fragment.frag_coord.x as u32,
                        fragment.frag_coord.y as u32,
                        shaded.color,
                        fragment.frag_coord.z,
                    );
                }
            }
        }
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}
