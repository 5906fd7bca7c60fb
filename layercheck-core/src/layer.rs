use crate::blob::Blob;
use crate::error::LayerError;
use crate::numeric::BlobNumeric;
use std::fmt::Debug;

/// A stateful computation over bottom (input) and top (output) blobs.
///
/// The lifecycle is `setup` once, then any number of `forward`/`backward`
/// pairs. Parameter blobs are owned by the layer and exposed through
/// `blobs`/`blobs_mut` so that external tools (the gradient checker, solvers)
/// can read and perturb them.
pub trait Layer<T: BlobNumeric>: Debug {
    /// Short type name used in error messages, e.g. `"InnerProduct"`.
    fn layer_type(&self) -> &'static str;

    /// Validates the bottoms, initializes parameters if the layer has none
    /// yet and reshapes the tops.
    ///
    /// Calling `setup` again with the same shapes must leave already
    /// initialized parameters untouched.
    fn setup(&mut self, bottom: &[Blob<T>], top: &mut [Blob<T>]) -> Result<(), LayerError>;

    /// Computes `top[*].data` from `bottom[*].data` and the parameters.
    fn forward(&mut self, bottom: &[Blob<T>], top: &mut [Blob<T>]) -> Result<(), LayerError>;

    /// Reads `top[*].diff` and writes the gradient into `bottom[i].diff` for
    /// every `i` where `propagate_down[i]` is set, and into the parameter
    /// blobs' `diff`.
    fn backward(
        &mut self,
        top: &[Blob<T>],
        propagate_down: &[bool],
        bottom: &mut [Blob<T>],
    ) -> Result<(), LayerError>;

    /// Parameter blobs, in a stable order.
    fn blobs(&self) -> &[Blob<T>];

    fn blobs_mut(&mut self) -> &mut [Blob<T>];
}

/// Checks the number of bottom or top blobs handed to a layer.
pub fn check_blob_count(
    layer: &'static str,
    role: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), LayerError> {
    if expected != actual {
        return Err(LayerError::BlobCountMismatch {
            layer,
            role,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Checks that `propagate_down` has one flag per bottom.
pub fn check_propagate_down(propagate_down: &[bool], num_bottom: usize) -> Result<(), LayerError> {
    if propagate_down.len() != num_bottom {
        return Err(LayerError::PropagateDownMismatch {
            expected: num_bottom,
            actual: propagate_down.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_blob_count() {
        assert!(check_blob_count("Identity", "bottom", 1, 1).is_ok());
        let err = check_blob_count("Identity", "top", 1, 2).unwrap_err();
        assert_eq!(err.to_string(), "Identity layer expects 1 top blob(s), got 2");
    }

    #[test]
    fn test_check_propagate_down() {
        assert!(check_propagate_down(&[true, false], 2).is_ok());
        assert_eq!(
            check_propagate_down(&[true], 2),
            Err(LayerError::PropagateDownMismatch { expected: 2, actual: 1 })
        );
    }
}
