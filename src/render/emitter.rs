//! Point-sprite draw emission.
//!
//! One point-list draw of `capacity` vertices per registered view per
//! frame; the vertex stage pulls records straight out of the star storage
//! buffer, so there is no CPU-side geometry.

use std::collections::HashSet;

/// Opaque handle for a host view/camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ViewId(pub u64);

/// Set of views a draw command is registered for.
///
/// Registration is idempotent; teardown removal is exhaustive.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: HashSet<ViewId>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view. Returns `false` if it was already registered
    /// (duplicate registration is a no-op).
    pub fn register(&mut self, view: ViewId) -> bool {
        self.views.insert(view)
    }

    /// Removes a destroyed view. Unknown views are a no-op.
    pub fn deregister(&mut self, view: ViewId) -> bool {
        self.views.remove(&view)
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.views.contains(&view)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }
}

/// Render-time huge-star selection, the same test the vertex shader runs
/// against the per-frame modulus.
///
/// Modulus 0 (ratio 0) disables huge stars outright; any nonzero modulus
/// would still select id 0, since `0 % n == 0`. Because the modulus is
/// pushed with the frame uniforms, changing the ratio at runtime changes
/// which existing stars render huge, without any resampling.
pub fn is_huge_star(id: u32, modulus: u32) -> bool {
    modulus != 0 && id % modulus == 0
}

/// Render pipeline sourcing vertex data from the star field buffer.
pub struct RenderEmitter {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    capacity: u32,
}

impl RenderEmitter {
    pub fn new(
        device: &wgpu::Device,
        star_buffer: &wgpu::Buffer,
        scene_buffer: &wgpu::Buffer,
        frame_buffer: &wgpu::Buffer,
        target_format: wgpu::TextureFormat,
        capacity: u32,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Starlight BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Starlight BG"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: star_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: scene_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: frame_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Starlight Shader"),
            source: wgpu::ShaderSource::Wgsl(STARLIGHT_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Starlight Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Starlight Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            bind_group,
            capacity,
        }
    }

    /// Issues the single "draw N points" command into `pass`.
    pub fn draw<'pass>(&'pass self, pass: &mut wgpu::RenderPass<'pass>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..self.capacity, 0..1);
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// Point-sprite shading. wgpu point lists rasterize one pixel, so the
/// selected sprite scale (normal / huge / shooting) modulates emitted
/// intensity rather than raster footprint.
const STARLIGHT_SHADER: &str = r#"
struct Star {
    pos: vec3<f32>,
    power: f32,
    dir: vec3<f32>,
    twinkle: f32,
    color: vec4<f32>,
    id: u32,
    is_shooting: u32,
    star_size: f32,
    huge_star_size: f32,
    random: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

struct SceneUniforms {
    render_min_area: vec3<f32>,
    shooting_star_size: f32,
    render_max_area: vec3<f32>,
    shooting_star_cache: u32,
    aspect: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

struct FrameUniforms {
    delta_time: f32,
    shoot_star: u32,
    shoot_id: u32,
    huge_star_mod: u32,
};

@group(0) @binding(0) var<storage, read> stars: array<Star>;
@group(0) @binding(1) var<uniform> scene: SceneUniforms;
@group(0) @binding(2) var<uniform> frame: FrameUniforms;

struct VsOut {
    @builtin(position) clip_pos: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VsOut {
    let s = stars[vi];
    let extent = scene.render_max_area - scene.render_min_area;
    let ndc = vec2<f32>(
        (s.pos.x - scene.render_min_area.x) / extent.x * 2.0 - 1.0,
        (s.pos.z - scene.render_min_area.z) / extent.z * 2.0 - 1.0,
    );

    var size = s.star_size;
    if (frame.huge_star_mod != 0u && s.id % frame.huge_star_mod == 0u) {
        size = s.huge_star_size;
    }

    var intensity = size * (0.75 + 0.25 * sin(s.random));
    if (s.is_shooting == 1u) {
        // random carries the streak age while shooting; streaks flare and
        // fade over their one-to-two second flight.
        size = scene.shooting_star_size;
        intensity = size * 4.0 * exp(-1.5 * s.random);
    }

    var out: VsOut;
    out.clip_pos = vec4<f32>(ndc, 0.0, 1.0);
    out.color = vec4<f32>(s.color.rgb * intensity, s.color.a);
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let mut registry = ViewRegistry::new();
        assert!(registry.register(ViewId(1)));
        assert!(!registry.register(ViewId(1)));
        assert_eq!(registry.len(), 1);
        assert!(registry.register(ViewId(2)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn deregistration_tolerates_unknown_views() {
        let mut registry = ViewRegistry::new();
        registry.register(ViewId(9));
        assert!(registry.deregister(ViewId(9)));
        assert!(!registry.deregister(ViewId(9)));
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_is_exhaustive() {
        let mut registry = ViewRegistry::new();
        for id in 0..8 {
            registry.register(ViewId(id));
        }
        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains(ViewId(0)));
    }

    #[test]
    fn huge_star_selection_matches_the_ratio() {
        let huge: Vec<u32> = (0..100u32).filter(|id| is_huge_star(*id, 4)).collect();
        assert_eq!(huge.len(), 25);
        assert_eq!(huge.first(), Some(&0));
        assert_eq!(huge.last(), Some(&96));
        assert!(huge.windows(2).all(|w| w[1] - w[0] == 4));
    }

    #[test]
    fn ratio_zero_disables_huge_stars() {
        assert!((0..100u32).all(|id| !is_huge_star(id, 0)));
    }
}
