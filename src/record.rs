//! GPU-side data contract.
//!
//! `StarRecord` and the two uniform structs are the wire format between the
//! host and the simulation kernel / starlight shader. Field order, types and
//! padding must match the WGSL structs offset for offset; the layout tests
//! below pin the sizes.

use crate::sim::RenderArea;

/// Point-topology vertex ceiling; star counts above this are clamped.
pub const MAX_POINT_VERTICES: u32 = 65000;

/// Size of the rotating shooting-star slot cache.
pub const SHOOTING_STAR_CACHE: u32 = 5;

/// One star's simulation and shading state (corresponds to the WGSL `Star`
/// struct, 80 bytes).
///
/// `is_shooting` is a 0/1 flag carried as `u32`; WGSL storage buffers have
/// no bool. `random` doubles as twinkle phase while the star is normal and
/// as streak age while it is shooting.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarRecord {
    /// World-space position; only X/Z are simulated, Y stays 0.
    pub pos: [f32; 3],
    /// Per-star speed scalar.
    pub power: f32,
    /// Unit-length travel direction in the XZ plane.
    pub dir: [f32; 3],
    /// Twinkle-speed coefficient.
    pub twinkle: f32,
    /// Per-star tint (RGBA).
    pub color: [f32; 4],
    /// Stable slot index; equals the array index for the buffer's lifetime.
    pub id: u32,
    /// 1 while animating as a shooting star, else 0.
    pub is_shooting: u32,
    /// Baseline sprite scale.
    pub star_size: f32,
    /// Sprite scale used when the render-time huge-star rule selects this record.
    pub huge_star_size: f32,
    /// Twinkle phase / shooting-streak age accumulator.
    pub random: f32,
    pub _pad: [f32; 3],
}

/// Static uniforms, written once at setup (WGSL `SceneUniforms`, 48 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub render_min_area: [f32; 3],
    pub shooting_star_size: f32,
    pub render_max_area: [f32; 3],
    pub shooting_star_cache: u32,
    pub aspect: f32,
    pub _pad: [f32; 3],
}

impl SceneUniforms {
    pub fn new(area: &RenderArea, shooting_star_size: f32) -> Self {
        Self {
            render_min_area: [area.min.x, 0.0, area.min.z],
            shooting_star_size,
            render_max_area: [area.max.x, 0.0, area.max.z],
            shooting_star_cache: SHOOTING_STAR_CACHE,
            aspect: area.aspect(),
            _pad: [0.0; 3],
        }
    }
}

/// Per-frame uniforms (WGSL `FrameUniforms`, 16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Seconds elapsed since the previous frame.
    pub delta_time: f32,
    /// 1 exactly on the frame a shooting star is triggered, else 0.
    pub shoot_star: u32,
    /// Slot id the trigger targets (meaningful only when `shoot_star == 1`).
    pub shoot_id: u32,
    /// Modulus for the render-time huge-star selection rule.
    pub huge_star_mod: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    #[test]
    fn star_record_layout_matches_wgsl() {
        // vec3 fields are padded to 16-byte boundaries by the trailing scalar;
        // the WGSL struct rounds up to 80 bytes.
        assert_eq!(size_of::<StarRecord>(), 80);
        assert_eq!(align_of::<StarRecord>(), 4);
    }

    #[test]
    fn uniform_layouts_match_wgsl() {
        assert_eq!(size_of::<SceneUniforms>(), 48);
        assert_eq!(size_of::<FrameUniforms>(), 16);
    }

    #[test]
    fn scene_uniforms_capture_area() {
        let area = RenderArea::new(glam::Vec3::new(-50.0, 0.0, -25.0), glam::Vec3::new(50.0, 0.0, 25.0));
        let scene = SceneUniforms::new(&area, 0.45);
        assert_eq!(scene.render_min_area, [-50.0, 0.0, -25.0]);
        assert_eq!(scene.render_max_area, [50.0, 0.0, 25.0]);
        assert_eq!(scene.shooting_star_cache, SHOOTING_STAR_CACHE);
        assert!((scene.aspect - 0.5).abs() < 1e-6);
    }
}
