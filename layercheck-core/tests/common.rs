use layercheck_core::{Blob, BlobNumeric};

// Used from several test crates; not every one calls every helper.
#[allow(dead_code)]
pub fn create_test_blob<T: BlobNumeric>(data: Vec<T>, shape: Vec<usize>) -> Blob<T> {
    Blob::new(data, shape).expect("Test blob creation failed")
}

/// A one-element top; layers reshape it during setup.
#[allow(dead_code)]
pub fn placeholder_top<T: BlobNumeric>() -> Vec<Blob<T>> {
    vec![Blob::zeros(&[1])]
}

/// Wᵀ · p for a row-major `[n, k]` matrix `w` and a length-`n` vector `p`.
#[allow(dead_code)]
pub fn transpose_matvec(w: &[f64], n: usize, k: usize, p: &[f64]) -> Vec<f64> {
    (0..k)
        .map(|i| (0..n).map(|row| w[row * k + i] * p[row]).sum::<f64>())
        .collect()
}
