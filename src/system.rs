//! The star field system object.
//!
//! The host drives this at its own cadence: `new` once, `step` once per
//! frame before any draw, `draw` once per visible registered view,
//! `shutdown` on teardown. All GPU work is recorded into host-owned
//! encoders and passes, so the dispatch for frame *f* is ordered before
//! the draws that read it.

use crate::config::{ConfigError, StarFieldConfig};
use crate::record::{FrameUniforms, SceneUniforms};
use crate::render::{
    KernelRole, RenderEmitter, SimulationKernel, StarFieldBuffer, ViewId, ViewRegistry,
};
use crate::scheduler::{FrameTrigger, ShootingStarScheduler};
use crate::sim::RenderArea;

/// GPU-resident star field: persistent record buffer, per-frame compute
/// step and per-view point-sprite draw.
pub struct StarFieldSystem {
    field: StarFieldBuffer,
    kernel: SimulationKernel,
    emitter: RenderEmitter,
    scheduler: ShootingStarScheduler,
    views: ViewRegistry,
    frame_buffer: wgpu::Buffer,
    // Kept alive for the bind groups' sake; written once at setup.
    _scene_buffer: wgpu::Buffer,
    huge_star_ratio: u32,
}

impl StarFieldSystem {
    /// Validates `config`, allocates and seeds the star buffer, compiles
    /// both kernel roles and the starlight pipeline, uploads the scene
    /// uniforms and runs the `Initialize` kernel once.
    ///
    /// Configuration problems and a degenerate (zero-extent) render area
    /// are the only failure modes; capacity overflow is clamped with a
    /// warning instead.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: &StarFieldConfig,
        area: RenderArea,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            tracing::error!(target: "starfield", "Invalid star field config: {}", err);
            return Err(err);
        }
        if !area.has_positive_extents() {
            let err = ConfigError::ValidationError(format!(
                "render area extents must be positive (min {}, max {})",
                area.min, area.max
            ));
            tracing::error!(target: "starfield", "{}", err);
            return Err(err);
        }

        let field = StarFieldBuffer::new(device, config, &area);
        let capacity = field.capacity();

        let scene = SceneUniforms::new(&area, config.shooting_star_size);
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Star Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&scene_buffer, 0, bytemuck::bytes_of(&scene));

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Star Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&frame_buffer, 0, bytemuck::bytes_of(&FrameUniforms::default()));

        let star_buffer = field
            .buffer()
            .expect("freshly created star field buffer is alive");
        let kernel = SimulationKernel::new(device, star_buffer, &scene_buffer, &frame_buffer, capacity);
        let emitter = RenderEmitter::new(
            device,
            star_buffer,
            &scene_buffer,
            &frame_buffer,
            target_format,
            capacity,
        );

        // One synchronous pass over the buffer to enforce the creation
        // invariants on every record.
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Star Init Encoder"),
        });
        kernel.dispatch(KernelRole::Initialize, &mut encoder);
        queue.submit(Some(encoder.finish()));

        tracing::info!(target: "starfield", "Star field initialized with {} stars", capacity);

        Ok(Self {
            field,
            kernel,
            emitter,
            scheduler: ShootingStarScheduler::new(config),
            views: ViewRegistry::new(),
            frame_buffer,
            _scene_buffer: scene_buffer,
            huge_star_ratio: config.huge_star_ratio,
        })
    }

    /// Advances the simulation by `delta_time` seconds: scheduler decision,
    /// frame-uniform upload, then a `Step` dispatch recorded into
    /// `encoder`. Call before any `draw` of the same frame.
    pub fn step(&mut self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, delta_time: f32) {
        if self.field.is_released() {
            return;
        }

        let FrameTrigger { shoot, slot } = self.scheduler.advance(delta_time);
        let frame = FrameUniforms {
            delta_time,
            shoot_star: shoot as u32,
            shoot_id: slot,
            huge_star_mod: self.huge_star_ratio,
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        self.kernel.dispatch(KernelRole::Step, encoder);
    }

    /// Draws the star field into `pass` for `view`. A no-op for
    /// unregistered views and after shutdown; otherwise exactly one draw
    /// command per call.
    pub fn draw<'pass>(&'pass self, view: ViewId, pass: &mut wgpu::RenderPass<'pass>) {
        if self.field.is_released() || !self.views.contains(view) {
            return;
        }
        self.emitter.draw(pass);
    }

    /// Registers a view for drawing; duplicates are a no-op. Returns
    /// whether the view was newly registered.
    pub fn register_view(&mut self, view: ViewId) -> bool {
        if self.field.is_released() {
            return false;
        }
        self.views.register(view)
    }

    /// Removes a destroyed view's draw registration.
    pub fn deregister_view(&mut self, view: ViewId) {
        self.views.deregister(view);
    }

    pub fn registered_views(&self) -> usize {
        self.views.len()
    }

    /// Number of records in the field (post-clamp).
    pub fn capacity(&self) -> u32 {
        self.field.capacity()
    }

    /// Changes the huge-star ratio; takes effect on the next frame's draw,
    /// re-selecting among the existing stars without resampling.
    pub fn set_huge_star_ratio(&mut self, ratio: u32) {
        self.huge_star_ratio = ratio;
    }

    /// Switches the shooting-star scheduler to the dense preset.
    pub fn enter_dense_shooting_star_mode(&mut self) {
        self.scheduler.enter_dense_mode();
    }

    /// Switches the shooting-star scheduler back to the normal preset.
    pub fn exit_dense_shooting_star_mode(&mut self) {
        self.scheduler.exit_dense_mode();
    }

    pub fn scheduler(&self) -> &ShootingStarScheduler {
        &self.scheduler
    }

    /// Deregisters every view and releases the star buffer. Idempotent;
    /// safe to call before any frame ever ran.
    pub fn shutdown(&mut self) {
        self.views.clear();
        self.field.release();
    }
}
