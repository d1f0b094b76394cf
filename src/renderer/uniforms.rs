//! Uniform block reflection and per-draw upload ring
//!
//! Every program declares one `var<uniform>` struct at `@group(0) @binding(0)`
//! in each stage. Its members are reflected from the naga IR so setters can
//! address them by name, GL style. Values are staged in a CPU block and
//! copied into a fresh slot of a dynamic-offset ring for every draw.

use std::cell::Cell;
use std::collections::HashMap;

/// Byte range of one uniform member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub offset: u32,
    pub size: u32,
}

/// Name -> byte range map of a uniform struct
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniformLayout {
    fields: HashMap<String, UniformField>,
    span: u32,
}

impl UniformLayout {
    /// Reflect the struct bound at group 0, binding 0 in the uniform address space
    pub fn from_module(module: &naga::Module) -> Option<Self> {
        let (_, var) = module.global_variables.iter().find(|(_, var)| {
            matches!(var.space, naga::AddressSpace::Uniform)
                && var
                    .binding
                    .as_ref()
                    .is_some_and(|b| b.group == 0 && b.binding == 0)
        })?;

        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return None;
        };

        let mut fields = HashMap::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            let Some(name) = &member.name else { continue };
            // Member extent runs to the next member (or the end of the struct)
            let end = members.get(i + 1).map_or(*span, |next| next.offset);
            fields.insert(
                name.clone(),
                UniformField {
                    offset: member.offset,
                    size: end - member.offset,
                },
            );
        }

        Some(Self {
            fields,
            span: *span,
        })
    }

    /// Combine the vertex and fragment views of the same block.
    ///
    /// Members present in both stages must agree on their offset; the error
    /// carries the first conflicting name.
    pub fn merge(mut self, other: UniformLayout) -> Result<Self, String> {
        for (name, field) in other.fields {
            match self.fields.get(&name) {
                Some(existing) if existing.offset != field.offset => return Err(name),
                Some(existing) => {
                    let size = existing.size.min(field.size);
                    self.fields.insert(name, UniformField { size, ..field });
                }
                None => {
                    self.fields.insert(name, field);
                }
            }
        }
        self.span = self.span.max(other.span);
        Ok(self)
    }

    pub fn field(&self, name: &str) -> Option<UniformField> {
        self.fields.get(name).copied()
    }

    pub fn span(&self) -> u32 {
        self.span
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// CPU copy of a uniform block
#[derive(Debug, Clone)]
pub struct UniformBlock {
    bytes: Vec<u8>,
}

impl UniformBlock {
    pub fn new(span: u32) -> Self {
        Self {
            bytes: vec![0; span as usize],
        }
    }

    /// Write raw bytes into a member; oversize data is rejected
    pub fn write(&mut self, field: UniformField, data: &[u8]) -> bool {
        if data.len() > field.size as usize {
            return false;
        }
        let start = field.offset as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        true
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Distance between ring slots: the block rounded up to the device's dynamic
/// offset alignment
pub fn ring_stride(span: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    span.max(1).div_ceil(alignment) * alignment
}

/// Per-frame ring of uniform slots addressed with dynamic offsets
pub struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: u32,
    cursor: Cell<u32>,
}

impl UniformRing {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        span: u32,
        capacity: u32,
    ) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let stride = ring_stride(span, alignment);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride as u64 * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(span as u64),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
            cursor: Cell::new(0),
        }
    }

    /// Upload `bytes` into the next free slot; `None` once the frame's slots
    /// are used up
    pub fn push(&self, queue: &wgpu::Queue, bytes: &[u8]) -> Option<u32> {
        let slot = self.cursor.get();
        if slot >= self.capacity {
            return None;
        }
        self.cursor.set(slot + 1);
        let offset = slot * self.stride;
        queue.write_buffer(&self.buffer, offset as u64, bytes);
        Some(offset)
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn rewind(&self) {
        self.cursor.set(0);
    }
}
