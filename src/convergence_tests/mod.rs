//! Property-based convergence tests for the optimizer
//!
//! These tests validate optimizer correctness using:
//! - Quadratic convergence (convex, optimal solution at origin)
//! - Ill-conditioned problems (tests numerical stability)
//! - Numerical edge cases (very small/large gradients)
//! - Tree-shaped parameter structures (exercises the generic algebra)

mod helpers;
