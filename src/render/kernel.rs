//! Simulation kernel dispatch.
//!
//! Both kernel entry points live in one WGSL module and share one bind
//! group over the star buffer and the two uniform buffers. The role-to-
//! pipeline mapping is built once at setup and immutable afterwards.

const WORKGROUP_SIZE: u32 = 64;

/// Kernel entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelRole {
    /// Enforces the per-record creation invariants; dispatched once at setup.
    Initialize,
    /// Advances every record by one frame.
    Step,
}

impl KernelRole {
    fn entry_point(self) -> &'static str {
        match self {
            Self::Initialize => "init",
            Self::Step => "step",
        }
    }
}

/// Compute pipelines plus the bind group tying them to the star buffer.
///
/// The uniform buffers are owned by the system (they are shared with the
/// render emitter); the kernel only binds them.
pub struct SimulationKernel {
    init_pipeline: wgpu::ComputePipeline,
    step_pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    capacity: u32,
}

impl SimulationKernel {
    pub fn new(
        device: &wgpu::Device,
        star_buffer: &wgpu::Buffer,
        scene_buffer: &wgpu::Buffer,
        frame_buffer: &wgpu::Buffer,
        capacity: u32,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Star Kernel BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
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
            label: Some("Star Kernel BG"),
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
            label: Some("Star Kernel Shader"),
            source: wgpu::ShaderSource::Wgsl(KERNEL_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Star Kernel Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let make_pipeline = |role: KernelRole| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(role.entry_point()),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: role.entry_point(),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            })
        };

        Self {
            init_pipeline: make_pipeline(KernelRole::Initialize),
            step_pipeline: make_pipeline(KernelRole::Step),
            bind_group,
            capacity,
        }
    }

    fn pipeline(&self, role: KernelRole) -> &wgpu::ComputePipeline {
        match role {
            KernelRole::Initialize => &self.init_pipeline,
            KernelRole::Step => &self.step_pipeline,
        }
    }

    /// Records one dispatch covering every record into `encoder`.
    pub fn dispatch(&self, role: KernelRole, encoder: &mut wgpu::CommandEncoder) {
        let workgroups = (self.capacity + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Star Kernel Pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(self.pipeline(role));
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(workgroups, 1, 1);
    }
}

/// Simulation kernels. The `Star`, `SceneUniforms` and `FrameUniforms`
/// structs mirror `crate::record` offset for offset.
const KERNEL_SHADER: &str = r#"
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
    // scalar padding keeps the struct at 48 bytes; a vec3 here would be
    // 16-aligned and desynchronize the layout from the Rust side
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

@group(0) @binding(0) var<storage, read_write> stars: array<Star>;
@group(0) @binding(1) var<uniform> scene: SceneUniforms;
@group(0) @binding(2) var<uniform> frame: FrameUniforms;

const NORMAL_SPEED_SCALE: f32 = 2.0;
const SHOOTING_SPEED_SCALE: f32 = 64.0;

fn wrap_coord(v: f32, lo: f32, hi: f32) -> f32 {
    let range = hi - lo;
    return v - floor((v - lo) / range) * range;
}

fn inside_area(pos: vec3<f32>) -> bool {
    return pos.x >= scene.render_min_area.x && pos.x <= scene.render_max_area.x
        && pos.z >= scene.render_min_area.z && pos.z <= scene.render_max_area.z;
}

@compute @workgroup_size(64)
fn init(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= arrayLength(&stars)) {
        return;
    }
    var s = stars[i];
    s.id = i;
    s.is_shooting = 0u;
    s.random = 0.0;
    s.pos.y = 0.0;
    s.dir = normalize(vec3<f32>(s.dir.x, 0.0, s.dir.z));
    stars[i] = s;
}

@compute @workgroup_size(64)
fn step(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= arrayLength(&stars)) {
        return;
    }
    var s = stars[i];

    if (frame.shoot_star == 1u && s.id % scene.shooting_star_cache == frame.shoot_id) {
        s.is_shooting = 1u;
        s.random = 0.0;
    }

    let speed_scale = select(NORMAL_SPEED_SCALE, SHOOTING_SPEED_SCALE, s.is_shooting == 1u);
    var pos = s.pos + s.dir * s.power * speed_scale * frame.delta_time;

    // A streak ends at the boundary; the record itself re-enters as a
    // normal star.
    if (s.is_shooting == 1u && !inside_area(pos)) {
        s.is_shooting = 0u;
    }
    pos.x = wrap_coord(pos.x, scene.render_min_area.x, scene.render_max_area.x);
    pos.z = wrap_coord(pos.z, scene.render_min_area.z, scene.render_max_area.z);
    pos.y = 0.0;
    s.pos = pos;

    if (s.is_shooting == 1u) {
        s.random = s.random + frame.delta_time;
    } else {
        s.random = s.random + s.twinkle * frame.delta_time;
    }

    stars[i] = s;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_roles_map_to_distinct_entry_points() {
        assert_eq!(KernelRole::Initialize.entry_point(), "init");
        assert_eq!(KernelRole::Step.entry_point(), "step");
    }

    #[test]
    fn shader_declares_both_entry_points() {
        assert!(KERNEL_SHADER.contains("fn init"));
        assert!(KERNEL_SHADER.contains("fn step"));
        assert!(KERNEL_SHADER.contains("@compute"));
    }
}
