//! # starfield
//!
//! GPU-resident procedural star field built with Rust and wgpu.
//!
//! A fixed-capacity structured buffer of per-star records lives on the GPU;
//! a compute kernel rewrites every record in place each frame (drift,
//! toroidal wraparound, twinkle phase, shooting-star lifecycle) and a
//! point-list draw consumes the same buffer as geometry. The CPU side is
//! limited to the shooting-star countdown, a 16-byte uniform upload and the
//! draw registration bookkeeping.
//!
//! ## Usage
//!
//! ```ignore
//! use starfield::{RenderArea, StarFieldConfig, StarFieldSystem, ViewId};
//!
//! let config = StarFieldConfig::default();
//! let area = RenderArea::from_extents(200.0, 120.0);
//! let mut stars = StarFieldSystem::new(&device, &queue, &config, area, surface_format)?;
//! stars.register_view(ViewId(0));
//!
//! // per frame:
//! stars.step(&queue, &mut encoder, delta_time);
//! // ... begin the render pass for the view ...
//! stars.draw(ViewId(0), &mut render_pass);
//! ```
//!
//! ## Modules
//!
//! - [`config`]: tunables, variant pools, TOML/JSON loading, validation
//! - [`record`]: the `StarRecord`/uniform layouts shared with WGSL
//! - [`sim`]: CPU reference of the kernel math, buffer seeding
//! - [`scheduler`]: shooting-star trigger timing
//! - [`render`]: buffer, compute kernels and point-sprite emission
//! - [`system`]: the host-facing system object

/// Configuration surface and validation
pub mod config;
/// CPU↔GPU binary contract
pub mod record;
/// Rendering: star buffer, simulation kernels, draw emission
pub mod render;
/// Shooting-star scheduling
pub mod scheduler;
/// Kernel reference math and the render area
pub mod sim;
/// Host-facing system object
pub mod system;

pub use config::{ConfigError, StarFieldConfig};
pub use record::{StarRecord, MAX_POINT_VERTICES, SHOOTING_STAR_CACHE};
pub use render::ViewId;
pub use scheduler::ShootingStarScheduler;
pub use sim::RenderArea;
pub use system::StarFieldSystem;
