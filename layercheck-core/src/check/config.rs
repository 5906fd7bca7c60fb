use std::collections::BTreeSet;
use thiserror::Error;

pub const DEFAULT_NUMERIC_EPS: f64 = 1e-3;
pub const DEFAULT_CHECK_EPS: f64 = 1e-3;
pub const DEFAULT_SEED: u64 = 1701;

/// Rejected gradient check settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("numeric_eps must be finite and non-zero, got {0}")]
    NumericEps(f64),
    #[error("check_eps must be finite and positive, got {0}")]
    CheckEps(f64),
}

/// Parameters of one gradient check.
///
/// * `numeric_eps`: step used for the forward difference.
/// * `check_eps`: a target passes when its relative error is below this.
/// * `seed`: seed of the perturbation direction.
/// * `skip_bottom` / `skip_blobs`: bottom and parameter indices left out of
///   the check. Indices past the end select nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct GradCheckConfig {
    pub numeric_eps: f64,
    pub check_eps: f64,
    pub seed: u64,
    pub skip_bottom: BTreeSet<usize>,
    pub skip_blobs: BTreeSet<usize>,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        GradCheckConfig {
            numeric_eps: DEFAULT_NUMERIC_EPS,
            check_eps: DEFAULT_CHECK_EPS,
            seed: DEFAULT_SEED,
            skip_bottom: BTreeSet::new(),
            skip_blobs: BTreeSet::new(),
        }
    }
}

impl GradCheckConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric_eps(mut self, numeric_eps: f64) -> Self {
        self.numeric_eps = numeric_eps;
        self
    }

    pub fn with_check_eps(mut self, check_eps: f64) -> Self {
        self.check_eps = check_eps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_skip_bottom(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.skip_bottom = indices.into_iter().collect();
        self
    }

    pub fn with_skip_blobs(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.skip_blobs = indices.into_iter().collect();
        self
    }

    /// Rejects steps and thresholds that would make every check meaningless.
    ///
    /// A negative `numeric_eps` is accepted (backward difference); zero is not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.numeric_eps.is_finite() || self.numeric_eps == 0.0 {
            return Err(ConfigError::NumericEps(self.numeric_eps));
        }
        if !self.check_eps.is_finite() || self.check_eps <= 0.0 {
            return Err(ConfigError::CheckEps(self.check_eps));
        }
        Ok(())
    }
}
