// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Software GPU for opal.
//!
//! The device exposes an imperative bind-then-draw API: allocate byte
//! buffers, configure a vertex puller over them, attach vertex and
//! fragment shaders to a program, then rasterize triangle lists into an
//! RGBA8 + F32 framebuffer. Everything runs on the CPU, single-threaded
//! and strictly sequential.

pub mod buffer;
pub mod device;
pub mod framebuffer;
pub mod pipeline;
pub mod program;
pub mod puller;
pub mod registry;

pub use device::Device;
pub use framebuffer::CLEAR_DEPTH;
