use crate::error::LayerError;
use crate::numeric::BlobNumeric;
use approx::{AbsDiffEq, RelativeEq};
use std::fmt;

/// A row-major numeric buffer paired with a gradient buffer of the same shape.
///
/// `data` holds the current values and `diff` the gradient accumulated by a
/// backward pass. Both buffers always hold `count()` elements; every method
/// that can change a length goes through `reshape`, which resizes both.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob<T> {
    shape: Vec<usize>,
    data: Vec<T>,
    diff: Vec<T>,
}

impl<T: BlobNumeric> Blob<T> {
    /// Creates a blob from flat data and a shape. The gradient buffer starts at zero.
    ///
    /// # Errors
    /// `LayerError::BlobCreationError` if `data.len()` is not the product of `shape`.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Result<Self, LayerError> {
        let count: usize = shape.iter().product();
        if data.len() != count {
            return Err(LayerError::BlobCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Blob {
            diff: vec![T::zero(); count],
            shape,
            data,
        })
    }

    /// Creates a blob with explicit data and gradient buffers.
    #[cfg(test)]
    pub(crate) fn from_parts(data: Vec<T>, diff: Vec<T>, shape: Vec<usize>) -> Result<Self, LayerError> {
        let mut blob = Self::new(data, shape)?;
        blob.set_diff(&diff)?;
        Ok(blob)
    }

    /// A zero-filled blob of the given shape.
    pub fn zeros(shape: &[usize]) -> Self {
        let count: usize = shape.iter().product();
        Blob {
            shape: shape.to_vec(),
            data: vec![T::zero(); count],
            diff: vec![T::zero(); count],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn num_axes(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn count(&self) -> usize {
        self.data.len()
    }

    /// Product of the dimensions from `axis` (inclusive) to the last one.
    /// Returns 1 when `axis` is past the last dimension.
    pub fn count_from(&self, axis: usize) -> usize {
        self.shape.iter().skip(axis).product()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn diff(&self) -> &[T] {
        &self.diff
    }

    pub fn diff_mut(&mut self) -> &mut [T] {
        &mut self.diff
    }

    /// Overwrites `data` with `values`.
    pub fn set_data(&mut self, values: &[T]) -> Result<(), LayerError> {
        check_len(self.count(), values.len(), "set_data")?;
        self.data.copy_from_slice(values);
        Ok(())
    }

    /// Overwrites `diff` with `values`.
    pub fn set_diff(&mut self, values: &[T]) -> Result<(), LayerError> {
        check_len(self.count(), values.len(), "set_diff")?;
        self.diff.copy_from_slice(values);
        Ok(())
    }

    pub fn zero_diff(&mut self) {
        self.diff.fill(T::zero());
    }

    /// Changes the shape, resizing both buffers. Existing values are kept up
    /// to the new length; new slots are zero.
    pub fn reshape(&mut self, shape: &[usize]) {
        if self.shape == shape {
            return;
        }
        let count: usize = shape.iter().product();
        self.shape = shape.to_vec();
        self.data.resize(count, T::zero());
        self.diff.resize(count, T::zero());
    }
}

fn check_len(expected: usize, actual: usize, operation: &str) -> Result<(), LayerError> {
    if expected != actual {
        return Err(LayerError::BufferLengthMismatch {
            expected,
            actual,
            operation: operation.to_string(),
        });
    }
    Ok(())
}

impl<T: BlobNumeric> fmt::Display for Blob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob{:?} {:?}", self.shape, self.data)
    }
}

// Comparisons look at `data` only; two blobs with different shapes are never equal.
impl<T> AbsDiffEq for Blob<T>
where
    T: BlobNumeric + AbsDiffEq<Epsilon = T>,
{
    type Epsilon = T;

    fn default_epsilon() -> T {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T> RelativeEq for Blob<T>
where
    T: BlobNumeric + RelativeEq<Epsilon = T>,
{
    fn default_max_relative() -> T {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T, max_relative: T) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

#[cfg(test)]
#[path = "blob_test.rs"]
mod tests;
