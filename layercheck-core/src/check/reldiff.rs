use crate::numeric::{to_f64, BlobNumeric};

/// Normalized L1 distance between two gradients: `sum|a - b| / sum|a|`.
///
/// Exact matches (including two all-zero gradients) return 0 without
/// looking at the norm. When `a` is all zeros but `b` is not, the division
/// is left unguarded and the result is infinite; NaN inputs give NaN.
///
/// `a` and `b` must hold the same number of elements.
pub fn relative_difference<T: BlobNumeric>(a: &[T], b: &[T]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "relative_difference on buffers of different length");
    let diff: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| to_f64((x - y).abs()))
        .sum();
    if diff == 0.0 {
        return 0.0;
    }
    let norm: f64 = a.iter().map(|&x| to_f64(x.abs())).sum();
    diff / norm
}
