//! Error types for optimizer construction.
//!
//! Every variant is a fail-fast construction error: an invalid
//! hyperparameter is rejected before any training step runs. Shape
//! mismatches and numerical degeneracy are deliberately not represented
//! here — the former is fatal at the mismatched operation, the latter
//! propagates silently like any floating-point optimizer.

use thiserror::Error;

/// Optimizer construction errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimError {
    #[error("beta1 must be in [0, 1], got {0}")]
    InvalidBeta1(f32),

    #[error("beta2 must be in [0, 1], got {0}")]
    InvalidBeta2(f32),

    #[error("epsilon must be a positive finite value, got {0}")]
    InvalidEpsilon(f32),

    #[error("weight decay rate must be non-negative, got {0}")]
    InvalidWeightDecay(f32),

    #[error("max gradient global norm must be positive, got {0}")]
    InvalidMaxGradientNorm(f32),
}

/// Result type for optimizer operations
pub type Result<T> = std::result::Result<T, OptimError>;
