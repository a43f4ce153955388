//! GPU-facing half of the crate: buffer ownership, kernel dispatch and
//! point-sprite draw emission.

pub mod emitter;
pub mod field;
pub mod kernel;

pub use emitter::{is_huge_star, RenderEmitter, ViewId, ViewRegistry};
pub use field::StarFieldBuffer;
pub use kernel::{KernelRole, SimulationKernel};
