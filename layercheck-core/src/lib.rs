//! Finite-difference gradient checking for layers that expose explicit
//! `setup`/`forward`/`backward` passes over [`Blob`]s.
//!
//! ```no_run
//! use layercheck_core::{check_gradient, Blob, GradCheckConfig, InnerProductLayer};
//!
//! let mut layer = InnerProductLayer::<f64>::new(4, true);
//! let mut bottom = vec![Blob::new(vec![0.5; 6], vec![2, 3]).unwrap()];
//! let mut top = vec![Blob::zeros(&[1])];
//! check_gradient(&mut layer, &mut bottom, &mut top, &GradCheckConfig::default()).unwrap();
//! ```

pub mod blob;
pub mod check;
pub mod error;
pub mod layer;
pub mod layers;
pub mod numeric;

pub use blob::Blob;
pub use check::{
    check_gradient, relative_difference, CheckTarget, GradCheckConfig, GradCheckError,
    GradientChecker, GradientMismatch,
};
pub use error::LayerError;
pub use layer::Layer;
pub use layers::{IdentityLayer, InnerProductLayer, SigmoidLayer};
pub use numeric::BlobNumeric;
// Re-export traits required by public functions/structs
pub use num_traits;
pub use rand;
