//! Star field buffer ownership.

use wgpu::util::DeviceExt;

use crate::config::StarFieldConfig;
use crate::record::{StarRecord, MAX_POINT_VERTICES};
use crate::sim::{self, RenderArea};

/// Fixed-capacity array of `StarRecord`s in GPU memory.
///
/// The buffer is created and seeded once; records are never individually
/// destroyed afterwards. `release` is idempotent and the only way the
/// allocation goes away before drop.
pub struct StarFieldBuffer {
    buffer: Option<wgpu::Buffer>,
    capacity: u32,
}

impl StarFieldBuffer {
    /// Allocates a buffer of `config.star_amount` records (clamped to the
    /// point-topology ceiling) and seeds every slot through
    /// [`sim::init_record`].
    pub fn new(device: &wgpu::Device, config: &StarFieldConfig, area: &RenderArea) -> Self {
        let capacity = Self::clamp_capacity(config.star_amount);

        let mut rng = rand::thread_rng();
        let records: Vec<StarRecord> = (0..capacity)
            .map(|i| sim::init_record(i, area, config, &mut rng))
            .collect();

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Field Buffer"),
            contents: bytemuck::cast_slice(&records),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer: Some(buffer),
            capacity,
        }
    }

    /// Clamps a requested star amount to [`MAX_POINT_VERTICES`], warning
    /// instead of failing.
    pub fn clamp_capacity(requested: u32) -> u32 {
        if requested > MAX_POINT_VERTICES {
            tracing::warn!(
                target: "starfield",
                "Star amount {} is too large, clamping to {}",
                requested,
                MAX_POINT_VERTICES
            );
            MAX_POINT_VERTICES
        } else {
            requested
        }
    }

    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_released(&self) -> bool {
        self.buffer.is_none()
    }

    /// Frees the GPU allocation. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            buffer.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_requests_are_clamped_to_the_vertex_ceiling() {
        assert_eq!(StarFieldBuffer::clamp_capacity(70000), 65000);
        assert_eq!(StarFieldBuffer::clamp_capacity(65000), 65000);
        assert_eq!(StarFieldBuffer::clamp_capacity(3000), 3000);
    }
}
