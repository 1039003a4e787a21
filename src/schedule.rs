//! Learning rate schedules
//!
//! A schedule is an opaque, pure mapping from step count to learning rate.
//! The optimizer re-derives its effective rate from the current step on
//! every advance, so schedules carry no mutable state of their own. Any
//! `Fn(u64) -> f32` closure becomes a schedule through [`LrFn`], and the
//! concrete types below cover the common shapes:
//! - `ConstantLr` - Fixed rate at every step
//! - `LinearWarmupLr` - Linear warmup from 0 to target
//! - `CosineDecayLr` - Smooth cosine decay

use std::f32::consts::PI;

/// Pure learning-rate schedule: `step -> rate`, total over all steps.
pub trait LrSchedule {
    /// Scheduled learning rate at `step`.
    fn rate(&self, step: u64) -> f32;
}

/// Adapter turning any `Fn(u64) -> f32` closure into a schedule.
#[derive(Debug, Clone, Copy)]
pub struct LrFn<F>(pub F);

impl<F: Fn(u64) -> f32> LrSchedule for LrFn<F> {
    fn rate(&self, step: u64) -> f32 {
        (self.0)(step)
    }
}

/// Fixed learning rate, independent of the step count.
#[derive(Debug, Clone, Copy)]
pub struct ConstantLr(pub f32);

impl LrSchedule for ConstantLr {
    fn rate(&self, _step: u64) -> f32 {
        self.0
    }
}

/// Linear warmup learning rate schedule
///
/// Linearly increases the rate from 0 to target over `warmup_steps`.
/// After warmup, maintains the target rate.
///
/// Formula: lr_t = lr_target * min(1, t / warmup_steps)
#[derive(Debug, Clone, Copy)]
pub struct LinearWarmupLr {
    lr_target: f32,
    warmup_steps: u64,
}

impl LinearWarmupLr {
    /// Create a new linear warmup schedule
    ///
    /// # Arguments
    /// * `lr_target` - Target learning rate after warmup
    /// * `warmup_steps` - Number of steps for warmup
    pub fn new(lr_target: f32, warmup_steps: u64) -> Self {
        Self { lr_target, warmup_steps }
    }
}

impl LrSchedule for LinearWarmupLr {
    fn rate(&self, step: u64) -> f32 {
        if self.warmup_steps == 0 || step >= self.warmup_steps {
            return self.lr_target;
        }
        self.lr_target * (step as f32 / self.warmup_steps as f32)
    }
}

/// Cosine decay learning rate schedule
///
/// Decreases the rate following a cosine curve from lr_max to lr_min.
///
/// Formula: lr_t = lr_min + 0.5 * (lr_max - lr_min) * (1 + cos(pi * t / T))
///
/// Where:
/// - t is the current step
/// - T is the total number of steps
/// - lr_max is the initial learning rate
/// - lr_min is the minimum learning rate (default 0)
#[derive(Debug, Clone, Copy)]
pub struct CosineDecayLr {
    lr_max: f32,
    lr_min: f32,
    t_max: u64,
}

impl CosineDecayLr {
    /// Create a new cosine decay schedule
    ///
    /// # Arguments
    /// * `lr_max` - Initial (maximum) learning rate
    /// * `t_max` - Total number of steps for the schedule
    /// * `lr_min` - Minimum learning rate
    pub fn new(lr_max: f32, t_max: u64, lr_min: f32) -> Self {
        Self { lr_max, lr_min, t_max }
    }

    /// Create a schedule with lr_min = 0
    pub fn default_min(lr_max: f32, t_max: u64) -> Self {
        Self::new(lr_max, t_max, 0.0)
    }
}

impl LrSchedule for CosineDecayLr {
    fn rate(&self, step: u64) -> f32 {
        if step >= self.t_max {
            return self.lr_min;
        }

        let progress = step as f32 / self.t_max as f32;
        let cosine_decay = 0.5 * (1.0 + (PI * progress).cos());
        self.lr_min + (self.lr_max - self.lr_min) * cosine_decay
    }
}
