// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Vertex puller.
//!
//! The fixed-function unit that gathers per-vertex attributes from device
//! buffers. Each of the `MAX_ATTRIBUTES` read heads addresses one buffer
//! with a byte offset and stride and feeds the same-numbered attribute
//! slot of the vertex shader. With indexing enabled, the vertex number is
//! first translated through an index buffer of u8/u16/u32 entries.
//!
//! All buffer contents are little-endian. Reads that leave the buffer
//! range are dropped and the target keeps its default value.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use opal_common::{
    Attribute, AttributeType, Handle, InVertex, IndexType, EMPTY_HANDLE, MAX_ATTRIBUTES,
};

use crate::buffer::Buffer;
use crate::registry::Registry;

/// One configured read head.
#[derive(Debug, Clone, Copy)]
pub struct Head {
    pub attr_type: AttributeType,
    pub stride: u64,
    pub offset: u64,
    pub buffer: Handle,
    pub enabled: bool,
}

impl Default for Head {
    fn default() -> Self {
        Self {
            attr_type: AttributeType::Empty,
            stride: 0,
            offset: 0,
            buffer: EMPTY_HANDLE,
            enabled: false,
        }
    }
}

/// Index-buffer configuration. Once set it stays enabled; there is no
/// call that disables indexing.
#[derive(Debug, Clone, Copy)]
pub struct Indexing {
    pub enabled: bool,
    pub index_type: IndexType,
    pub buffer: Handle,
}

impl Default for Indexing {
    fn default() -> Self {
        Self {
            enabled: false,
            index_type: IndexType::U32,
            buffer: EMPTY_HANDLE,
        }
    }
}

/// Puller settings table: heads plus indexing.
#[derive(Debug, Default)]
pub struct VertexPuller {
    heads: [Head; MAX_ATTRIBUTES],
    indexing: Indexing,
}

impl VertexPuller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure head `head`. Indices past `MAX_ATTRIBUTES` are ignored.
    /// The enable flag is left as it was.
    pub fn set_head(
        &mut self,
        head: usize,
        attr_type: AttributeType,
        stride: u64,
        offset: u64,
        buffer: Handle,
    ) {
        if let Some(slot) = self.heads.get_mut(head) {
            slot.attr_type = attr_type;
            slot.stride = stride;
            slot.offset = offset;
            slot.buffer = buffer;
        }
    }

    /// Enable indexed pulling through `buffer`.
    pub fn set_indexing(&mut self, index_type: IndexType, buffer: Handle) {
        self.indexing = Indexing {
            enabled: true,
            index_type,
            buffer,
        };
    }

    pub fn enable_head(&mut self, head: usize) {
        if let Some(slot) = self.heads.get_mut(head) {
            slot.enabled = true;
        }
    }

    pub fn disable_head(&mut self, head: usize) {
        if let Some(slot) = self.heads.get_mut(head) {
            slot.enabled = false;
        }
    }

    pub fn head(&self, head: usize) -> Option<&Head> {
        self.heads.get(head)
    }

    pub fn indexing(&self) -> &Indexing {
        &self.indexing
    }

    /// Fetch one vertex. `vertex_number` is the running number within the
    /// draw; with indexing enabled the actual index comes from the index
    /// buffer. Heads that are disabled, `Empty`, or read out of range
    /// leave their attribute slot at the default.
    pub fn pull(&self, buffers: &Registry<Buffer>, vertex_number: u32) -> InVertex {
        let index = if self.indexing.enabled {
            self.read_index(buffers, vertex_number).unwrap_or_else(|| {
                log::debug!(
                    "puller: index read failed for vertex {} (buffer {})",
                    vertex_number,
                    self.indexing.buffer
                );
                0
            })
        } else {
            vertex_number
        };

        let mut vertex = InVertex {
            vertex_id: index,
            ..InVertex::default()
        };

        for (slot, head) in self.heads.iter().enumerate() {
            if !head.enabled || head.attr_type == AttributeType::Empty {
                continue;
            }
            match read_attribute(buffers, head, index) {
                Some(attr) => vertex.attributes[slot] = attr,
                None => log::debug!(
                    "puller: head {} read failed at index {} (buffer {})",
                    slot,
                    index,
                    head.buffer
                ),
            }
        }

        vertex
    }

    fn read_index(&self, buffers: &Registry<Buffer>, vertex_number: u32) -> Option<u32> {
        let buffer = buffers.get(self.indexing.buffer)?;
        let size = self.indexing.index_type.size_bytes();
        let bytes = buffer
            .bytes(vertex_number as u64 * size, size as usize)
            .ok()?;
        let mut cursor = Cursor::new(bytes);
        match self.indexing.index_type {
            IndexType::U8 => cursor.read_u8().ok().map(u32::from),
            IndexType::U16 => cursor.read_u16::<LittleEndian>().ok().map(u32::from),
            IndexType::U32 => cursor.read_u32::<LittleEndian>().ok(),
        }
    }
}

/// Decode one attribute of `head.attr_type` at `offset + stride·index`.
fn read_attribute(buffers: &Registry<Buffer>, head: &Head, index: u32) -> Option<Attribute> {
    let buffer = buffers.get(head.buffer)?;
    let offset = head.stride.checked_mul(index as u64)?.checked_add(head.offset)?;
    let bytes = buffer
        .bytes(offset, head.attr_type.size_bytes() as usize)
        .ok()?;
    let mut cursor = Cursor::new(bytes);

    let mut component = || cursor.read_f32::<LittleEndian>().ok();
    let attr = match head.attr_type {
        AttributeType::Empty => return None,
        AttributeType::Float => Attribute::Float(component()?),
        AttributeType::Vec2 => Attribute::Vec2(glam::Vec2::new(component()?, component()?)),
        AttributeType::Vec3 => {
            Attribute::Vec3(glam::Vec3::new(component()?, component()?, component()?))
        }
        AttributeType::Vec4 => Attribute::Vec4(glam::Vec4::new(
            component()?,
            component()?,
            component()?,
            component()?,
        )),
    };
    Some(attr)
}
