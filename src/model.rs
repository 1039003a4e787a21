//! The model-side capability the optimizer trains against.

use crate::tangent::TangentVector;

/// A trainable model, seen from the optimizer's side of the seam.
///
/// The optimizer never inspects parameters directly. It learns the parameter
/// tree's shape from [`zero_tangent`](DifferentiableModel::zero_tangent),
/// reads the penalty gradient through
/// [`regularization_value`](DifferentiableModel::regularization_value), and
/// writes updates through [`move_along`](DifferentiableModel::move_along) —
/// the single parameter mutation point. Gradients themselves come from an
/// external autodiff process; the optimizer never triggers differentiation.
pub trait DifferentiableModel {
    /// The gradient-shaped tree matching this model's parameters.
    type Tangent: TangentVector;

    /// Zero tree with the exact shape of the trainable parameters.
    fn zero_tangent(&self) -> Self::Tangent;

    /// Regularization penalty gradient (e.g. the L2 penalty's gradient),
    /// shape-matched to the parameters. Pure function of current state.
    fn regularization_value(&self) -> Self::Tangent;

    /// In-place parameter update: `params += delta`, leafwise.
    fn move_along(&mut self, delta: &Self::Tangent);
}
