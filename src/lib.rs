//! # descenso
//!
//! A weight-decayed, bias-corrected Adam optimizer over generic parameter
//! trees.
//!
//! The optimizer never sees a model's internals. It is written against two
//! small capabilities:
//!
//! - [`TangentVector`] — the algebra of one gradient-shaped value: zero
//!   construction, scaling, elementwise arithmetic, square root, and
//!   global-norm computation over an arbitrary nested tree of floats.
//! - [`DifferentiableModel`] — what the model exposes: a zero tangent (for
//!   shape), a regularization penalty gradient, and an in-place parameter
//!   move.
//!
//! The training loop is:
//!
//! 1. `direction = autodiff(model)` — gradients come from outside
//! 2. `optimizer.update(&mut model, &direction)` — one fixed update sequence
//!
//! Each `update` clips the direction by global norm (if configured),
//! advances the step counter (re-deriving the effective learning rate from
//! the injected [`LrSchedule`]), decays the first/second moment trees, and
//! moves the parameters along the combined Adam + weight-decay delta. The
//! order is fixed; see [`Adam::update`].
//!
//! Updates are synchronous, CPU-bound, and single-threaded; `update` takes
//! `&mut self`, so one instance cannot be driven concurrently. Parallel
//! training shards optimizer instances and merges directions externally.

mod adam;
mod convergence_tests; // Tests split into convergence_tests/ directory
mod error;
mod model;
mod schedule;
mod tangent;

pub use adam::{Adam, AdamConfig, BiasCorrection};
pub use error::{OptimError, Result};
pub use model::DifferentiableModel;
pub use schedule::{ConstantLr, CosineDecayLr, LinearWarmupLr, LrFn, LrSchedule};
pub use tangent::TangentVector;
