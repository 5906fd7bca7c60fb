// Finite-difference verification of a layer's backward pass.

pub mod config;
pub mod grad_check;
pub mod reldiff;
pub mod target;

pub use config::{ConfigError, GradCheckConfig};
pub use grad_check::{
    check_gradient, perturbation_direction, GradCheckError, GradientChecker, GradientMismatch,
};
pub use reldiff::relative_difference;
pub use target::CheckTarget;
