//! CPU reference of the simulation kernels.
//!
//! `init_record` is the rule the star field buffer is seeded with;
//! `step_record` is the same math the WGSL `step` kernel runs per record.
//! The render path never executes this per frame; it exists to seed the
//! buffer once and to make the kernel semantics testable without a GPU.

use glam::Vec3;
use rand::Rng;

use crate::config::StarFieldConfig;
use crate::record::StarRecord;

/// Speed multiplier for normal drift; stars take tens of seconds and up to
/// cross the area.
pub const NORMAL_SPEED_SCALE: f32 = 2.0;

/// Speed multiplier while shooting; a full-power star crosses a 100-unit
/// area in well under two seconds.
pub const SHOOTING_SPEED_SCALE: f32 = 64.0;

/// XZ rectangle the stars live in. Y is a rendering-plane constant (0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderArea {
    pub min: Vec3,
    pub max: Vec3,
}

impl RenderArea {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: Vec3::new(min.x, 0.0, min.z),
            max: Vec3::new(max.x, 0.0, max.z),
        }
    }

    /// Rectangle centered on the origin.
    pub fn from_extents(width: f32, depth: f32) -> Self {
        let half = Vec3::new(width * 0.5, 0.0, depth * 0.5);
        Self::new(-half, half)
    }

    /// True when both XZ extents are positive. `wrap` and `aspect` divide
    /// by the extents, so a degenerate rectangle must be rejected at setup.
    pub fn has_positive_extents(&self) -> bool {
        self.max.x > self.min.x && self.max.z > self.min.z
    }

    pub fn contains(&self, pos: Vec3) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.z >= self.min.z && pos.z <= self.max.z
    }

    /// Toroidal wrap of the XZ components into the rectangle.
    pub fn wrap(&self, pos: Vec3) -> Vec3 {
        Vec3::new(
            wrap_coord(pos.x, self.min.x, self.max.x),
            0.0,
            wrap_coord(pos.z, self.min.z, self.max.z),
        )
    }

    /// Depth-to-width ratio, fed to the shading pass.
    pub fn aspect(&self) -> f32 {
        (self.max.z - self.min.z) / (self.max.x - self.min.x)
    }
}

fn wrap_coord(v: f32, lo: f32, hi: f32) -> f32 {
    let range = hi - lo;
    v - ((v - lo) / range).floor() * range
}

/// Per-frame kernel inputs (mirrors the `FrameUniforms` consumed by WGSL).
#[derive(Debug, Clone, Copy)]
pub struct StepInputs {
    pub delta_time: f32,
    pub shoot_star: bool,
    pub shoot_id: u32,
    pub cache_size: u32,
}

fn sample<T: Copy>(rng: &mut impl Rng, pool: &[T]) -> T {
    // Pools are validated non-empty at config time.
    pool[rng.gen_range(0..pool.len())]
}

/// Creates the record for slot `index`: position sampled uniformly inside
/// the area at y = 0, everything else sampled independently from its pool.
pub fn init_record(
    index: u32,
    area: &RenderArea,
    config: &StarFieldConfig,
    rng: &mut impl Rng,
) -> StarRecord {
    let dir = sample(rng, &config.directions);
    let dir = Vec3::new(dir.x, 0.0, dir.z).normalize();
    let huge_star_size = if config.huge_star_sizes.is_empty() {
        // Ratio 0 disables huge stars; the field is never read then.
        0.0
    } else {
        sample(rng, &config.huge_star_sizes)
    };

    StarRecord {
        pos: [
            rng.gen_range(area.min.x..=area.max.x),
            0.0,
            rng.gen_range(area.min.z..=area.max.z),
        ],
        power: sample(rng, &config.speeds),
        dir: dir.to_array(),
        twinkle: sample(rng, &config.twinkles),
        color: sample(rng, &config.colors).to_array(),
        id: index,
        is_shooting: 0,
        star_size: sample(rng, &config.star_sizes),
        huge_star_size,
        random: 0.0,
        _pad: [0.0; 3],
    }
}

/// Advances one record by one frame. Same math as the WGSL `step` kernel.
pub fn step_record(rec: &mut StarRecord, area: &RenderArea, inputs: &StepInputs) {
    if inputs.shoot_star && rec.id % inputs.cache_size == inputs.shoot_id {
        rec.is_shooting = 1;
        rec.random = 0.0;
    }

    let speed_scale = if rec.is_shooting == 1 {
        SHOOTING_SPEED_SCALE
    } else {
        NORMAL_SPEED_SCALE
    };
    let pos = Vec3::from_array(rec.pos)
        + Vec3::from_array(rec.dir) * rec.power * speed_scale * inputs.delta_time;

    // A shooting star that leaves the area ends its streak there; the record
    // re-enters from the opposite edge as a normal star.
    if rec.is_shooting == 1 && !area.contains(pos) {
        rec.is_shooting = 0;
    }
    rec.pos = area.wrap(pos).to_array();

    if rec.is_shooting == 1 {
        rec.random += inputs.delta_time;
    } else {
        rec.random += rec.twinkle * inputs.delta_time;
    }
}
