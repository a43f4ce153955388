//! Shooting-star scheduling.
//!
//! The only sequential state in the system: a countdown timer and a cursor
//! rotating through the shooting-star slot cache. Everything downstream is
//! stateless per frame given the buffer contents.

use rand::Rng;

use crate::config::StarFieldConfig;
use crate::record::SHOOTING_STAR_CACHE;

/// Base interval plus uniform jitter, one per scheduler mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalPreset {
    pub base: f32,
    pub jitter: f32,
}

impl IntervalPreset {
    fn sample(&self, rng: &mut impl Rng) -> f32 {
        // gen_range panics on an empty range, and zero jitter is a valid
        // (fully deterministic) configuration.
        if self.jitter > 0.0 {
            self.base + rng.gen_range(0.0..self.jitter)
        } else {
            self.base
        }
    }
}

/// Per-frame scheduler output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTrigger {
    /// True exactly on the frame a shooting star fires.
    pub shoot: bool,
    /// Slot the trigger targets; meaningful only when `shoot` is true.
    pub slot: u32,
}

impl FrameTrigger {
    pub const NONE: Self = Self { shoot: false, slot: 0 };
}

/// Decides, once per frame, whether a shooting star is triggered and which
/// rotating slot it occupies.
pub struct ShootingStarScheduler {
    timer: f32,
    cursor: u32,
    cache_size: u32,
    dense: bool,
    normal: IntervalPreset,
    dense_preset: IntervalPreset,
}

impl ShootingStarScheduler {
    pub fn new(config: &StarFieldConfig) -> Self {
        let mut scheduler = Self {
            timer: 0.0,
            cursor: 0,
            cache_size: SHOOTING_STAR_CACHE,
            dense: false,
            normal: IntervalPreset {
                base: config.shooting_star_interval,
                jitter: config.shooting_star_randomize_range,
            },
            dense_preset: IntervalPreset {
                base: config.full_shooting_star_interval,
                jitter: config.full_shooting_star_randomize_range,
            },
        };
        scheduler.resample_timer();
        scheduler
    }

    /// Advances the countdown by `delta_time` seconds.
    ///
    /// When it expires the trigger fires for this frame only, the cursor
    /// moves to the next slot and the countdown is resampled from the
    /// active preset.
    pub fn advance(&mut self, delta_time: f32) -> FrameTrigger {
        self.timer -= delta_time;
        if self.timer > 0.0 {
            return FrameTrigger::NONE;
        }

        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.cache_size;
        self.resample_timer();
        FrameTrigger { shoot: true, slot }
    }

    /// Switches to the dense ("full of shooting stars") preset. The current
    /// countdown is discarded, not blended.
    pub fn enter_dense_mode(&mut self) {
        self.dense = true;
        self.resample_timer();
    }

    /// Switches back to the normal preset, resampling immediately.
    pub fn exit_dense_mode(&mut self) {
        self.dense = false;
        self.resample_timer();
    }

    pub fn is_dense(&self) -> bool {
        self.dense
    }

    /// Seconds until the next trigger.
    pub fn timer(&self) -> f32 {
        self.timer
    }

    fn active_preset(&self) -> IntervalPreset {
        if self.dense {
            self.dense_preset
        } else {
            self.normal
        }
    }

    fn resample_timer(&mut self) {
        self.timer = self.active_preset().sample(&mut rand::thread_rng());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact_config(interval: f32) -> StarFieldConfig {
        StarFieldConfig {
            shooting_star_interval: interval,
            shooting_star_randomize_range: 0.0,
            full_shooting_star_interval: 2.0,
            full_shooting_star_randomize_range: 2.0,
            ..StarFieldConfig::default()
        }
    }

    #[test]
    fn exactly_one_trigger_per_interval_and_slots_rotate() {
        let mut scheduler = ShootingStarScheduler::new(&exact_config(10.0));

        // 10 seconds of 1 s frames: exactly one trigger, targeting slot 0.
        let mut triggers = Vec::new();
        for _ in 0..10 {
            let t = scheduler.advance(1.0);
            if t.shoot {
                triggers.push(t.slot);
            }
        }
        assert_eq!(triggers, vec![0]);

        // The next 10 seconds target slot 1.
        let mut triggers = Vec::new();
        for _ in 0..10 {
            let t = scheduler.advance(1.0);
            if t.shoot {
                triggers.push(t.slot);
            }
        }
        assert_eq!(triggers, vec![1]);
    }

    #[test]
    fn cursor_wraps_around_the_cache() {
        let mut scheduler = ShootingStarScheduler::new(&exact_config(1.0));
        let mut slots = Vec::new();
        for _ in 0..(SHOOTING_STAR_CACHE + 2) {
            let t = scheduler.advance(1.0);
            assert!(t.shoot);
            slots.push(t.slot);
        }
        assert_eq!(slots, vec![0, 1, 2, 3, 4, 0, 1]);
    }

    #[test]
    fn no_trigger_before_the_countdown_expires() {
        let mut scheduler = ShootingStarScheduler::new(&exact_config(10.0));
        for _ in 0..9 {
            assert!(!scheduler.advance(1.0).shoot);
        }
        assert!(scheduler.advance(1.0).shoot);
    }

    #[test]
    fn mode_switch_resamples_under_the_new_preset() {
        let config = StarFieldConfig {
            shooting_star_interval: 30.0,
            shooting_star_randomize_range: 3.0,
            full_shooting_star_interval: 2.0,
            full_shooting_star_randomize_range: 2.0,
            ..StarFieldConfig::default()
        };
        let mut scheduler = ShootingStarScheduler::new(&config);
        assert!(scheduler.timer() >= 30.0 && scheduler.timer() <= 33.0);

        scheduler.enter_dense_mode();
        assert!(scheduler.is_dense());
        assert!(scheduler.timer() >= 2.0 && scheduler.timer() <= 4.0);

        scheduler.exit_dense_mode();
        assert!(!scheduler.is_dense());
        assert!(scheduler.timer() >= 30.0 && scheduler.timer() <= 33.0);
    }

    #[test]
    fn zero_jitter_never_panics() {
        let mut scheduler = ShootingStarScheduler::new(&exact_config(0.0));
        // A zero interval fires every frame.
        assert!(scheduler.advance(0.016).shoot);
        assert!(scheduler.advance(0.016).shoot);
    }
}
