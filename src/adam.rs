//! Weight-decayed, bias-corrected Adam over generic parameter trees.
//!
//! Adam maintains TWO moving averages shaped like the parameter tree:
//!
//!   first moments:  exponential average of gradients (direction)
//!   second moments: exponential average of squared gradients (magnitude)
//!
//! Per update, in this exact order: clip the incoming direction by global
//! norm (if configured), advance the step counter (which re-derives the
//! effective learning rate), decay both moment trees toward the new
//! direction, then move the parameters along
//! `-lr * (m / (sqrt(v) + eps) + weight_decay * regularization)`.
//! Reordering any of these silently changes convergence behavior, so the
//! sequence lives in one method.

use serde::{Deserialize, Serialize};

use crate::error::{OptimError, Result};
use crate::model::DifferentiableModel;
use crate::schedule::LrSchedule;
use crate::tangent::TangentVector;

/// How the effective learning rate is derived from the step counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BiasCorrection {
    /// `lr = schedule(step)`. Pure recomputation, idempotent per step.
    Off,
    /// `lr *= sqrt(1 - beta2^t) / (1 - beta1^t)`.
    ///
    /// The correction factor multiplies whatever the rate already was, so it
    /// compounds across the whole run instead of being applied to a fresh
    /// scheduled rate. Textbook bias-corrected Adam is
    /// [`BiasCorrection::FromSchedule`]; this compounding variant is the
    /// default because it reproduces the behavior of the system this
    /// optimizer is compatible with.
    #[default]
    Compounding,
    /// `lr = schedule(step) * sqrt(1 - beta2^t) / (1 - beta1^t)`.
    ///
    /// Recomputes from the schedule every step — standard Adam bias
    /// correction.
    FromSchedule,
}

/// Hyperparameters for [`Adam`], immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// First-moment decay rate, in [0, 1]
    pub beta1: f32,
    /// Second-moment decay rate, in [0, 1]
    pub beta2: f32,
    /// Numerical-stability floor added to the denominator
    pub epsilon: f32,
    /// Scale applied to the model's regularization value
    pub weight_decay_rate: f32,
    /// Learning-rate derivation mode
    pub bias_correction: BiasCorrection,
    /// Clip incoming directions to this global norm, if set
    pub max_gradient_global_norm: Option<f32>,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-6,
            weight_decay_rate: 0.01,
            bias_correction: BiasCorrection::Compounding,
            max_gradient_global_norm: None,
        }
    }
}

impl AdamConfig {
    /// Create a configuration with the standard defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set beta1 (first-moment decay rate)
    pub fn with_beta1(mut self, beta1: f32) -> Self {
        self.beta1 = beta1;
        self
    }

    /// Set beta2 (second-moment decay rate)
    pub fn with_beta2(mut self, beta2: f32) -> Self {
        self.beta2 = beta2;
        self
    }

    /// Set epsilon (numerical-stability floor)
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the weight decay rate
    pub fn with_weight_decay_rate(mut self, rate: f32) -> Self {
        self.weight_decay_rate = rate;
        self
    }

    /// Set the learning-rate derivation mode
    pub fn with_bias_correction(mut self, mode: BiasCorrection) -> Self {
        self.bias_correction = mode;
        self
    }

    /// Clip incoming directions to `max_norm` (global norm)
    pub fn with_max_gradient_global_norm(mut self, max_norm: f32) -> Self {
        self.max_gradient_global_norm = Some(max_norm);
        self
    }

    /// Validate all hyperparameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.beta1) {
            return Err(OptimError::InvalidBeta1(self.beta1));
        }
        if !(0.0..=1.0).contains(&self.beta2) {
            return Err(OptimError::InvalidBeta2(self.beta2));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(OptimError::InvalidEpsilon(self.epsilon));
        }
        if self.weight_decay_rate < 0.0 || self.weight_decay_rate.is_nan() {
            return Err(OptimError::InvalidWeightDecay(self.weight_decay_rate));
        }
        if let Some(max_norm) = self.max_gradient_global_norm {
            if max_norm <= 0.0 || max_norm.is_nan() {
                return Err(OptimError::InvalidMaxGradientNorm(max_norm));
            }
        }
        Ok(())
    }
}

/// Weight-decayed Adam optimizer over a generic parameter tree.
///
/// `T` is the tangent-vector tree shaped like the model's parameters; `S` is
/// the opaque learning-rate schedule. One instance owns the moment
/// accumulators and the step counter for exactly one training run; `&mut
/// self` on [`update`](Adam::update) makes concurrent invocation against the
/// same instance unrepresentable.
///
/// `Clone` relocates the optimizer: all scalar and tree-valued state is
/// copied verbatim, so a clone continues training bit-for-bit.
#[derive(Debug, Clone)]
pub struct Adam<T, S> {
    config: AdamConfig,
    schedule: S,
    /// Updates applied so far. Starts at 0, +1 per `update`.
    step: u64,
    /// Effective rate at the current step, re-derived on every step change.
    learning_rate: f32,
    first_moments: T,
    second_moments: T,
}

impl<T: TangentVector, S: LrSchedule> Adam<T, S> {
    /// Create an optimizer for `model`, failing fast on invalid
    /// hyperparameters.
    ///
    /// Moments start as the zero tree shaped like the model's parameters;
    /// the effective learning rate starts at `schedule.rate(0)`.
    pub fn new<M>(model: &M, schedule: S, config: AdamConfig) -> Result<Self>
    where
        M: DifferentiableModel<Tangent = T>,
    {
        config.validate()?;
        let zero = model.zero_tangent();
        let learning_rate = schedule.rate(0);
        Ok(Self {
            config,
            schedule,
            step: 0,
            learning_rate,
            first_moments: zero.clone(),
            second_moments: zero,
        })
    }

    /// Apply one update: mutate `model`'s parameters along `direction` and
    /// advance this optimizer's moments, step counter, and learning rate.
    ///
    /// `direction` is the gradient for the model's current state, produced
    /// by an external autodiff process and shape-matched to the parameters.
    /// Shape mismatch panics; NaN/Inf propagate silently.
    pub fn update<M>(&mut self, model: &mut M, direction: &T)
    where
        M: DifferentiableModel<Tangent = T>,
    {
        let clipped;
        let direction = if let Some(max_norm) = self.config.max_gradient_global_norm {
            clipped = direction.clip_by_global_norm(max_norm);
            &clipped
        } else {
            direction
        };

        self.advance_step();

        let AdamConfig { beta1, beta2, epsilon, weight_decay_rate, .. } = self.config;

        // m_t = b1 * m_{t-1} + (1 - b1) * g
        self.first_moments =
            self.first_moments.scale(beta1).add(&direction.scale(1.0 - beta1));

        // v_t = b2 * v_{t-1} + (1 - b2) * g^2
        self.second_moments = self
            .second_moments
            .scale(beta2)
            .add(&direction.elementwise_mul(direction).scale(1.0 - beta2));

        let denominator = self.second_moments.elementwise_sqrt().add_scalar(epsilon);
        let weight_decay_term = model.regularization_value().scale(weight_decay_rate);
        let delta = self.first_moments.elementwise_div(&denominator).add(&weight_decay_term);

        model.move_along(&delta.scale(-self.learning_rate));
    }

    /// Advance the step counter and immediately re-derive the effective
    /// learning rate from the new step value, as one atomic operation.
    fn advance_step(&mut self) {
        self.step += 1;
        match self.config.bias_correction {
            BiasCorrection::Off => {
                self.learning_rate = self.schedule.rate(self.step);
            }
            BiasCorrection::Compounding => {
                self.learning_rate *= self.correction_factor(self.step);
            }
            BiasCorrection::FromSchedule => {
                self.learning_rate =
                    self.schedule.rate(self.step) * self.correction_factor(self.step);
            }
        }
    }

    /// `sqrt(1 - beta2^t) / (1 - beta1^t)`, the zero-initialization
    /// correction for step `t >= 1`.
    fn correction_factor(&self, t: u64) -> f32 {
        (1.0 - self.config.beta2.powi(t as i32)).sqrt()
            / (1.0 - self.config.beta1.powi(t as i32))
    }

    /// Current effective learning rate.
    #[must_use]
    pub fn lr(&self) -> f32 {
        self.learning_rate
    }

    /// Overwrite the effective learning rate (checkpoint restore for
    /// [`BiasCorrection::Compounding`], where the rate is itself state).
    pub fn set_lr(&mut self, lr: f32) {
        self.learning_rate = lr;
    }

    /// Optimizer step counter.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Set the step counter (checkpoint resume).
    ///
    /// In [`BiasCorrection::Off`] and [`BiasCorrection::FromSchedule`] modes
    /// the learning rate is recomputed for the restored step. In
    /// `Compounding` mode the rate cannot be reconstructed from the step
    /// alone; restore it with [`set_lr`](Adam::set_lr).
    pub fn set_step_count(&mut self, step: u64) {
        self.step = step;
        match self.config.bias_correction {
            BiasCorrection::Off => {
                self.learning_rate = self.schedule.rate(step);
            }
            BiasCorrection::FromSchedule => {
                self.learning_rate = if step == 0 {
                    self.schedule.rate(0)
                } else {
                    self.schedule.rate(step) * self.correction_factor(step)
                };
            }
            BiasCorrection::Compounding => {}
        }
    }

    /// First-moment accumulator tree.
    #[must_use]
    pub fn first_moments(&self) -> &T {
        &self.first_moments
    }

    /// Second-moment accumulator tree.
    #[must_use]
    pub fn second_moments(&self) -> &T {
        &self.second_moments
    }

    /// Set the first-moment tree (checkpoint resume).
    pub fn set_first_moments(&mut self, moments: T) {
        self.first_moments = moments;
    }

    /// Set the second-moment tree (checkpoint resume).
    pub fn set_second_moments(&mut self, moments: T) {
        self.second_moments = moments;
    }

    /// Hyperparameters this optimizer was built with.
    #[must_use]
    pub fn config(&self) -> &AdamConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{ConstantLr, LrFn};
    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, Array1};

    /// Single scalar parameter with a fixed regularization value.
    #[derive(Debug, Clone)]
    struct ScalarModel {
        param: f32,
        penalty: f32,
    }

    impl DifferentiableModel for ScalarModel {
        type Tangent = f32;

        fn zero_tangent(&self) -> f32 {
            0.0
        }

        fn regularization_value(&self) -> f32 {
            self.penalty
        }

        fn move_along(&mut self, delta: &f32) {
            self.param += delta;
        }
    }

    /// Vector parameters with an L2 penalty gradient (the parameters
    /// themselves).
    #[derive(Debug, Clone)]
    struct VectorModel {
        params: Array1<f32>,
    }

    impl DifferentiableModel for VectorModel {
        type Tangent = Array1<f32>;

        fn zero_tangent(&self) -> Array1<f32> {
            Array1::zeros(self.params.len())
        }

        fn regularization_value(&self) -> Array1<f32> {
            self.params.clone()
        }

        fn move_along(&mut self, delta: &Array1<f32>) {
            self.params = &self.params + delta;
        }
    }

    fn scalar_model(param: f32) -> ScalarModel {
        ScalarModel { param, penalty: 0.0 }
    }

    // ── Construction validation ─────────────────────────────────────────

    #[test]
    fn test_construction_rejects_beta1_out_of_range() {
        for bad in [-0.1f32, 1.5, f32::NAN] {
            let config = AdamConfig::new().with_beta1(bad);
            let result = Adam::new(&scalar_model(1.0), ConstantLr(0.01), config);
            assert!(matches!(result, Err(OptimError::InvalidBeta1(_))), "accepted beta1={bad}");
        }
    }

    #[test]
    fn test_construction_rejects_beta2_out_of_range() {
        for bad in [-1.0f32, 1.0001, f32::NAN] {
            let config = AdamConfig::new().with_beta2(bad);
            let result = Adam::new(&scalar_model(1.0), ConstantLr(0.01), config);
            assert!(matches!(result, Err(OptimError::InvalidBeta2(_))), "accepted beta2={bad}");
        }
    }

    #[test]
    fn test_construction_accepts_beta_boundaries() {
        for (b1, b2) in [(0.0f32, 0.0f32), (1.0, 1.0), (0.0, 1.0), (0.9, 0.999)] {
            let config = AdamConfig::new().with_beta1(b1).with_beta2(b2);
            assert!(Adam::new(&scalar_model(1.0), ConstantLr(0.01), config).is_ok());
        }
    }

    #[test]
    fn test_construction_rejects_bad_epsilon_decay_and_clip() {
        let model = scalar_model(1.0);

        let result = Adam::new(&model, ConstantLr(0.01), AdamConfig::new().with_epsilon(0.0));
        assert!(matches!(result, Err(OptimError::InvalidEpsilon(_))));

        let result =
            Adam::new(&model, ConstantLr(0.01), AdamConfig::new().with_weight_decay_rate(-0.01));
        assert!(matches!(result, Err(OptimError::InvalidWeightDecay(_))));

        let result = Adam::new(
            &model,
            ConstantLr(0.01),
            AdamConfig::new().with_max_gradient_global_norm(0.0),
        );
        assert!(matches!(result, Err(OptimError::InvalidMaxGradientNorm(_))));
    }

    #[test]
    fn test_initial_state() {
        let schedule = LrFn(|step: u64| 0.1 / (1.0 + step as f32));
        let opt = Adam::new(&scalar_model(1.0), schedule, AdamConfig::new()).unwrap();

        assert_eq!(opt.step_count(), 0);
        assert_abs_diff_eq!(opt.lr(), 0.1, epsilon = 1e-6); // schedule.rate(0)
        assert_abs_diff_eq!(*opt.first_moments(), 0.0, epsilon = 0.0);
        assert_abs_diff_eq!(*opt.second_moments(), 0.0, epsilon = 0.0);
    }

    // ── Update sequencing ───────────────────────────────────────────────

    #[test]
    fn test_step_counts_updates_exactly() {
        let mut model = scalar_model(1.0);
        let mut opt = Adam::new(&model, ConstantLr(0.01), AdamConfig::new()).unwrap();

        for n in 1..=17u64 {
            opt.update(&mut model, &0.5);
            assert_eq!(opt.step_count(), n);
        }
    }

    #[test]
    fn test_first_update_moments_from_zero_state() {
        let mut model = scalar_model(1.0);
        let config = AdamConfig::new().with_weight_decay_rate(0.0);
        let mut opt = Adam::new(&model, ConstantLr(0.01), config).unwrap();

        let direction = 0.5f32;
        opt.update(&mut model, &direction);

        // m_1 = (1 - b1) * g, v_1 = (1 - b2) * g^2
        assert_abs_diff_eq!(*opt.first_moments(), 0.1 * 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(*opt.second_moments(), 0.001 * 0.25, epsilon = 1e-8);
    }

    #[test]
    fn test_single_scalar_update_exact_values() {
        // b1=0.9, b2=0.999, eps=1e-6, wd=0, no bias correction, lr=0.01,
        // p=1.0, g=0.5:
        //   m = 0.05, v = 0.00025
        //   denom = sqrt(0.00025) + 1e-6 = 0.0158124
        //   delta = 0.05 / 0.0158124 = 3.16208
        //   p' = 1.0 - 0.01 * 3.16208 = 0.968379
        let mut model = scalar_model(1.0);
        let config = AdamConfig::new()
            .with_weight_decay_rate(0.0)
            .with_bias_correction(BiasCorrection::Off);
        let mut opt = Adam::new(&model, ConstantLr(0.01), config).unwrap();

        opt.update(&mut model, &0.5);

        assert_abs_diff_eq!(opt.lr(), 0.01, epsilon = 1e-7);
        assert_abs_diff_eq!(*opt.first_moments(), 0.05, epsilon = 1e-7);
        assert_abs_diff_eq!(*opt.second_moments(), 0.00025, epsilon = 1e-8);
        assert_abs_diff_eq!(model.param, 0.968379, epsilon = 1e-4);
    }

    #[test]
    fn test_update_clips_direction_first() {
        // Direction with global norm 4 and max norm 1: every leaf scaled by
        // 0.25 before the moments see it.
        let mut model = VectorModel { params: arr1(&[0.0, 0.0]) };
        let config = AdamConfig::new()
            .with_weight_decay_rate(0.0)
            .with_bias_correction(BiasCorrection::Off)
            .with_max_gradient_global_norm(1.0);
        let mut opt = Adam::new(&model, ConstantLr(0.01), config).unwrap();

        // norm = sqrt((2*sqrt(2))^2 * 2) = 4
        let direction = arr1(&[2.0 * 2.0f32.sqrt(), 2.0 * 2.0f32.sqrt()]);
        assert_abs_diff_eq!(direction.global_norm(), 4.0, epsilon = 1e-5);

        opt.update(&mut model, &direction);

        // m_1 = 0.1 * clipped leaf = 0.1 * 0.25 * 2*sqrt(2)
        let clipped_leaf = 0.25 * 2.0 * 2.0f32.sqrt();
        assert_abs_diff_eq!(opt.first_moments()[0], 0.1 * clipped_leaf, epsilon = 1e-6);
        assert_abs_diff_eq!(opt.first_moments()[1], 0.1 * clipped_leaf, epsilon = 1e-6);
        assert_abs_diff_eq!(
            opt.first_moments().scale(10.0).global_norm(),
            1.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_weight_decay_applies_with_zero_gradient() {
        // Fresh optimizer, zero direction, wd=0.1, regularization value 0.2:
        // moments stay zero, delta = 0 + 0.1 * 0.2 = 0.02.
        let mut model = ScalarModel { param: 1.0, penalty: 0.2 };
        let config = AdamConfig::new()
            .with_weight_decay_rate(0.1)
            .with_bias_correction(BiasCorrection::Off);
        let mut opt = Adam::new(&model, ConstantLr(0.01), config).unwrap();

        opt.update(&mut model, &0.0);

        assert_abs_diff_eq!(*opt.first_moments(), 0.0, epsilon = 0.0);
        assert_abs_diff_eq!(*opt.second_moments(), 0.0, epsilon = 0.0);
        // p' = 1.0 - 0.01 * 0.02
        assert_abs_diff_eq!(model.param, 1.0 - 0.01 * 0.02, epsilon = 1e-7);
    }

    #[test]
    fn test_coupled_decay_shrinks_params_under_l2_penalty() {
        let mut model = VectorModel { params: arr1(&[2.0, -2.0]) };
        let config = AdamConfig::new().with_weight_decay_rate(0.1);
        let mut opt = Adam::new(&model, ConstantLr(0.01), config).unwrap();

        for _ in 0..20 {
            let direction = model.zero_tangent();
            opt.update(&mut model, &direction);
        }

        // L2 penalty gradient alone pulls both parameters toward zero
        assert!(model.params[0] < 2.0 && model.params[0] > 0.0);
        assert!(model.params[1] > -2.0 && model.params[1] < 0.0);
    }

    // ── Learning-rate derivation ────────────────────────────────────────

    #[test]
    fn test_off_mode_rate_follows_schedule() {
        let schedule = LrFn(|step: u64| 0.1 / (1.0 + step as f32));
        let mut model = scalar_model(1.0);
        let config = AdamConfig::new().with_bias_correction(BiasCorrection::Off);
        let mut opt = Adam::new(&model, schedule, config).unwrap();

        opt.update(&mut model, &0.5);
        assert_abs_diff_eq!(opt.lr(), 0.05, epsilon = 1e-7);
        opt.update(&mut model, &0.5);
        assert_abs_diff_eq!(opt.lr(), 0.1 / 3.0, epsilon = 1e-7);
    }

    #[test]
    fn test_off_mode_rate_is_idempotent_per_step() {
        // Re-running the same step after an external reset re-derives the
        // same rate from the schedule.
        let schedule = LrFn(|step: u64| 0.1 / (1.0 + step as f32));
        let mut model = scalar_model(1.0);
        let config = AdamConfig::new().with_bias_correction(BiasCorrection::Off);
        let mut opt = Adam::new(&model, schedule, config).unwrap();

        opt.update(&mut model, &0.5);
        let lr_first = opt.lr();

        opt.set_step_count(0);
        opt.update(&mut model, &0.5);
        assert_eq!(opt.step_count(), 1);
        assert_abs_diff_eq!(opt.lr(), lr_first, epsilon = 0.0);
    }

    #[test]
    fn test_compounding_rate_first_steps() {
        // Regression pin for the legacy compounding behavior under a
        // constant schedule of 0.01 with default betas:
        //   c(1) = sqrt(1 - 0.999) / (1 - 0.9)       = 0.3162278
        //   c(2) = sqrt(1 - 0.999^2) / (1 - 0.9^2)   = 0.2353167
        //   lr_1 = 0.01 * c(1)        = 3.1622776e-3
        //   lr_2 = lr_1 * c(2)        = 7.4413e-4
        let mut model = scalar_model(1.0);
        let mut opt = Adam::new(&model, ConstantLr(0.01), AdamConfig::new()).unwrap();

        opt.update(&mut model, &0.5);
        assert_abs_diff_eq!(opt.lr(), 3.1622776e-3, epsilon = 1e-6);

        opt.update(&mut model, &0.5);
        assert_abs_diff_eq!(opt.lr(), 7.4413e-4, epsilon = 1e-7);
    }

    #[test]
    fn test_compounding_rate_diverges_from_schedule_recompute() {
        let mut compounding_model = scalar_model(1.0);
        let mut recompute_model = scalar_model(1.0);

        let mut compounding =
            Adam::new(&compounding_model, ConstantLr(0.01), AdamConfig::new()).unwrap();
        let mut recompute = Adam::new(
            &recompute_model,
            ConstantLr(0.01),
            AdamConfig::new().with_bias_correction(BiasCorrection::FromSchedule),
        )
        .unwrap();

        compounding.update(&mut compounding_model, &0.5);
        recompute.update(&mut recompute_model, &0.5);
        // Identical at step 1: both apply c(1) to the scheduled rate
        assert_abs_diff_eq!(compounding.lr(), recompute.lr(), epsilon = 1e-9);

        compounding.update(&mut compounding_model, &0.5);
        recompute.update(&mut recompute_model, &0.5);
        // From step 2 on the compounded factor drags the rate down
        assert_abs_diff_eq!(recompute.lr(), 0.01 * 0.2353167, epsilon = 1e-7);
        assert!(compounding.lr() < recompute.lr());
    }

    #[test]
    fn test_from_schedule_rate_matches_textbook_adam() {
        let mut model = scalar_model(1.0);
        let config = AdamConfig::new().with_bias_correction(BiasCorrection::FromSchedule);
        let mut opt = Adam::new(&model, ConstantLr(0.01), config).unwrap();

        for t in 1..=10i32 {
            opt.update(&mut model, &0.5);
            let expected =
                0.01 * (1.0 - 0.999f32.powi(t)).sqrt() / (1.0 - 0.9f32.powi(t));
            assert_abs_diff_eq!(opt.lr(), expected, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_set_step_count_rederives_rate() {
        let schedule = LrFn(|step: u64| 0.1 / (1.0 + step as f32));
        let model = scalar_model(1.0);
        let config = AdamConfig::new().with_bias_correction(BiasCorrection::FromSchedule);
        let mut opt = Adam::new(&model, schedule, config).unwrap();

        opt.set_step_count(4);
        let expected = (0.1 / 5.0) * (1.0 - 0.999f32.powi(4)).sqrt() / (1.0 - 0.9f32.powi(4));
        assert_abs_diff_eq!(opt.lr(), expected, epsilon = 1e-8);

        opt.set_step_count(0);
        assert_abs_diff_eq!(opt.lr(), 0.1, epsilon = 1e-7);
    }

    // ── Relocation & checkpoint state ───────────────────────────────────

    #[test]
    fn test_clone_continues_training_identically() {
        let mut model = VectorModel { params: arr1(&[3.0, -2.0, 1.5]) };
        let mut opt = Adam::new(&model, ConstantLr(0.05), AdamConfig::new()).unwrap();

        for _ in 0..3 {
            let direction = model.params.mapv(|x| 2.0 * x);
            opt.update(&mut model, &direction);
        }

        let mut cloned_opt = opt.clone();
        let mut cloned_model = model.clone();

        for _ in 0..5 {
            let direction = model.params.mapv(|x| 2.0 * x);
            opt.update(&mut model, &direction);
            let direction = cloned_model.params.mapv(|x| 2.0 * x);
            cloned_opt.update(&mut cloned_model, &direction);
        }

        assert_eq!(opt.step_count(), cloned_opt.step_count());
        assert_eq!(opt.lr(), cloned_opt.lr());
        assert_eq!(model.params, cloned_model.params);
        assert_eq!(opt.first_moments(), cloned_opt.first_moments());
        assert_eq!(opt.second_moments(), cloned_opt.second_moments());
    }

    #[test]
    fn test_checkpoint_state_round_trip() {
        let mut model = scalar_model(1.0);
        let mut opt = Adam::new(&model, ConstantLr(0.01), AdamConfig::new()).unwrap();

        for _ in 0..4 {
            opt.update(&mut model, &0.3);
        }
        let (step, lr, m, v) =
            (opt.step_count(), opt.lr(), *opt.first_moments(), *opt.second_moments());

        // Restore into a fresh instance, compounding mode: rate is state too
        let mut restored = Adam::new(&model, ConstantLr(0.01), AdamConfig::new()).unwrap();
        restored.set_step_count(step);
        restored.set_lr(lr);
        restored.set_first_moments(m);
        restored.set_second_moments(v);

        let mut model_restored = model.clone();
        opt.update(&mut model, &0.3);
        restored.update(&mut model_restored, &0.3);

        assert_abs_diff_eq!(model.param, model_restored.param, epsilon = 0.0);
        assert_abs_diff_eq!(opt.lr(), restored.lr(), epsilon = 0.0);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = AdamConfig::new()
            .with_beta1(0.85)
            .with_bias_correction(BiasCorrection::FromSchedule)
            .with_max_gradient_global_norm(5.0);

        let json = serde_json::to_string(&config).unwrap();
        let back: AdamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
