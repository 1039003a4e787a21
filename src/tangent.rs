//! Tangent-vector algebra over parameter trees.
//!
//! A tangent vector is one gradient-shaped value: a tree of floating-point
//! scalars isomorphic to a model's trainable-parameter tree. The optimizer is
//! written purely against this trait, so it never learns the tree's layout.
//!
//! Every operation is shape-preserving. Binary operations require equal
//! shapes; a mismatched pair has no well-defined partial result, so mismatch
//! is fatal (panic) at the point of the operation.

use ndarray::{Array1, Array2};

/// One gradient-shaped or parameter-shaped value.
///
/// Implementations exist for scalar and array leaves (`f32`,
/// [`Array1<f32>`], [`Array2<f32>`]) and for composite nodes (`Vec<T>` for
/// uniform children, `(A, B)` for heterogeneous ones), so arbitrary nested
/// structs-of-floats compose without runtime type introspection.
pub trait TangentVector: Clone {
    /// The additive identity with the receiver's shape.
    fn zeros_like(&self) -> Self;

    /// Multiply every leaf by `by`.
    fn scale(&self, by: f32) -> Self;

    /// Leafwise sum. Panics on shape mismatch.
    fn add(&self, other: &Self) -> Self;

    /// Leafwise product. Panics on shape mismatch.
    fn elementwise_mul(&self, other: &Self) -> Self;

    /// Leafwise quotient. Panics on shape mismatch.
    fn elementwise_div(&self, other: &Self) -> Self;

    /// Leafwise non-negative square root.
    ///
    /// Leaves must be >= 0. The optimizer only calls this on accumulated
    /// squared values, which are non-negative by construction; this is an
    /// invariant, not a runtime check.
    fn elementwise_sqrt(&self) -> Self;

    /// Add `value` to every leaf.
    fn add_scalar(&self, value: f32) -> Self;

    /// Sum of squares of every leaf across the whole tree.
    fn squared_norm(&self) -> f32;

    /// L2 norm of the entire tree treated as one flat vector.
    fn global_norm(&self) -> f32 {
        self.squared_norm().sqrt()
    }

    /// Clip to a maximum global norm.
    ///
    /// If `global_norm() > max_norm`, every leaf is scaled by
    /// `max_norm / global_norm()`, so the result's norm equals `max_norm` up
    /// to rounding and its direction is unchanged. Otherwise the value is
    /// returned as-is.
    fn clip_by_global_norm(&self, max_norm: f32) -> Self {
        let norm = self.global_norm();
        if norm > max_norm {
            self.scale(max_norm / norm)
        } else {
            self.clone()
        }
    }
}

impl TangentVector for f32 {
    fn zeros_like(&self) -> Self {
        0.0
    }

    fn scale(&self, by: f32) -> Self {
        self * by
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn elementwise_mul(&self, other: &Self) -> Self {
        self * other
    }

    fn elementwise_div(&self, other: &Self) -> Self {
        self / other
    }

    fn elementwise_sqrt(&self) -> Self {
        self.sqrt()
    }

    fn add_scalar(&self, value: f32) -> Self {
        self + value
    }

    fn squared_norm(&self) -> f32 {
        self * self
    }
}

// ndarray's arithmetic panics when operand shapes differ, which is exactly
// the fatality contract binary operations carry here.
impl TangentVector for Array1<f32> {
    fn zeros_like(&self) -> Self {
        Array1::zeros(self.len())
    }

    fn scale(&self, by: f32) -> Self {
        self.mapv(|x| x * by)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn elementwise_mul(&self, other: &Self) -> Self {
        self * other
    }

    fn elementwise_div(&self, other: &Self) -> Self {
        self / other
    }

    fn elementwise_sqrt(&self) -> Self {
        self.mapv(f32::sqrt)
    }

    fn add_scalar(&self, value: f32) -> Self {
        self.mapv(|x| x + value)
    }

    fn squared_norm(&self) -> f32 {
        self.iter().map(|&x| x * x).sum()
    }
}

impl TangentVector for Array2<f32> {
    fn zeros_like(&self) -> Self {
        Array2::zeros(self.raw_dim())
    }

    fn scale(&self, by: f32) -> Self {
        self.mapv(|x| x * by)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn elementwise_mul(&self, other: &Self) -> Self {
        self * other
    }

    fn elementwise_div(&self, other: &Self) -> Self {
        self / other
    }

    fn elementwise_sqrt(&self) -> Self {
        self.mapv(f32::sqrt)
    }

    fn add_scalar(&self, value: f32) -> Self {
        self.mapv(|x| x + value)
    }

    fn squared_norm(&self) -> f32 {
        self.iter().map(|&x| x * x).sum()
    }
}

/// Uniform tree node: a list of same-typed subtrees, one slot per child.
impl<T: TangentVector> TangentVector for Vec<T> {
    fn zeros_like(&self) -> Self {
        self.iter().map(TangentVector::zeros_like).collect()
    }

    fn scale(&self, by: f32) -> Self {
        self.iter().map(|child| child.scale(by)).collect()
    }

    fn add(&self, other: &Self) -> Self {
        zip_children(self, other, "add", TangentVector::add)
    }

    fn elementwise_mul(&self, other: &Self) -> Self {
        zip_children(self, other, "elementwise_mul", TangentVector::elementwise_mul)
    }

    fn elementwise_div(&self, other: &Self) -> Self {
        zip_children(self, other, "elementwise_div", TangentVector::elementwise_div)
    }

    fn elementwise_sqrt(&self) -> Self {
        self.iter().map(TangentVector::elementwise_sqrt).collect()
    }

    fn add_scalar(&self, value: f32) -> Self {
        self.iter().map(|child| child.add_scalar(value)).collect()
    }

    fn squared_norm(&self) -> f32 {
        self.iter().map(TangentVector::squared_norm).sum()
    }
}

fn zip_children<T: TangentVector>(
    a: &[T],
    b: &[T],
    op: &str,
    f: impl Fn(&T, &T) -> T,
) -> Vec<T> {
    assert_eq!(
        a.len(),
        b.len(),
        "tangent tree shape mismatch in {op}: {} children vs {}",
        a.len(),
        b.len()
    );
    a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect()
}

/// Heterogeneous tree node, for hand-composed structs-of-floats.
impl<A: TangentVector, B: TangentVector> TangentVector for (A, B) {
    fn zeros_like(&self) -> Self {
        (self.0.zeros_like(), self.1.zeros_like())
    }

    fn scale(&self, by: f32) -> Self {
        (self.0.scale(by), self.1.scale(by))
    }

    fn add(&self, other: &Self) -> Self {
        (self.0.add(&other.0), self.1.add(&other.1))
    }

    fn elementwise_mul(&self, other: &Self) -> Self {
        (self.0.elementwise_mul(&other.0), self.1.elementwise_mul(&other.1))
    }

    fn elementwise_div(&self, other: &Self) -> Self {
        (self.0.elementwise_div(&other.0), self.1.elementwise_div(&other.1))
    }

    fn elementwise_sqrt(&self) -> Self {
        (self.0.elementwise_sqrt(), self.1.elementwise_sqrt())
    }

    fn add_scalar(&self, value: f32) -> Self {
        (self.0.add_scalar(value), self.1.add_scalar(value))
    }

    fn squared_norm(&self) -> f32 {
        self.0.squared_norm() + self.1.squared_norm()
    }
}
