use crate::blob::Blob;
use crate::error::LayerError;
use crate::layer::{check_blob_count, check_propagate_down, Layer};
use crate::numeric::{from_f64, BlobNumeric};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const DEFAULT_WEIGHT_STD: f64 = 0.1;

/// Fully connected layer: y = x · Wᵀ + b.
///
/// The bottom is viewed as a `[M, K]` matrix where `M` is its first dimension
/// and `K` the product of the remaining ones. Parameter blobs are
/// `[weight (N x K), bias (N)]`, the bias being present only when
/// `bias_term` is set.
#[derive(Debug, Clone)]
pub struct InnerProductLayer<T> {
    num_output: usize,
    bias_term: bool,
    weight_std: f64,
    filler_seed: u64,
    blobs: Vec<Blob<T>>,
    m: usize,
    k: usize,
}

impl<T: BlobNumeric> InnerProductLayer<T> {
    /// Creates a layer whose weights are drawn from a Gaussian filler during
    /// `setup`, once the input size is known.
    pub fn new(num_output: usize, bias_term: bool) -> Self {
        InnerProductLayer {
            num_output,
            bias_term,
            weight_std: DEFAULT_WEIGHT_STD,
            filler_seed: 0,
            blobs: Vec::new(),
            m: 0,
            k: 0,
        }
    }

    /// Standard deviation of the Gaussian weight filler.
    pub fn with_weight_std(mut self, std: f64) -> Self {
        self.weight_std = std;
        self
    }

    /// Seed of the Gaussian weight filler.
    pub fn with_filler_seed(mut self, seed: u64) -> Self {
        self.filler_seed = seed;
        self
    }

    /// Creates a layer from explicit parameters. `weight` must be `[N, K]`
    /// and `bias`, if given, must hold `N` elements.
    pub fn with_params(weight: Blob<T>, bias: Option<Blob<T>>) -> Result<Self, LayerError> {
        if weight.num_axes() != 2 {
            return Err(LayerError::ConfigurationError(format!(
                "InnerProduct weight must be 2-D, got shape {:?}",
                weight.shape()
            )));
        }
        let num_output = weight.shape()[0];
        let k = weight.shape()[1];
        let mut blobs = vec![weight];
        if let Some(bias) = bias {
            if bias.count() != num_output {
                return Err(LayerError::ShapeMismatch {
                    expected: vec![num_output],
                    actual: bias.shape().to_vec(),
                    operation: "InnerProductLayer::with_params (bias)".to_string(),
                });
            }
            blobs.push(bias);
        }
        Ok(InnerProductLayer {
            num_output,
            bias_term: blobs.len() == 2,
            weight_std: DEFAULT_WEIGHT_STD,
            filler_seed: 0,
            blobs,
            m: 0,
            k,
        })
    }

    pub fn num_output(&self) -> usize {
        self.num_output
    }

    fn fill_params(&mut self) -> Result<(), LayerError> {
        if !(self.weight_std.is_finite() && self.weight_std >= 0.0) {
            return Err(LayerError::ConfigurationError(format!(
                "InnerProduct weight filler std must be finite and non-negative, got {}",
                self.weight_std
            )));
        }
        let normal = Normal::new(0.0, self.weight_std).map_err(|e| {
            LayerError::ConfigurationError(format!("InnerProduct weight filler: {}", e))
        })?;
        let mut rng = StdRng::seed_from_u64(self.filler_seed);
        let weight: Vec<T> = (0..self.num_output * self.k)
            .map(|_| from_f64(normal.sample(&mut rng)))
            .collect();
        self.blobs = vec![Blob::new(weight, vec![self.num_output, self.k])?];
        if self.bias_term {
            self.blobs.push(Blob::zeros(&[self.num_output]));
        }
        debug!(
            "InnerProductLayer: filled weight [{}, {}] with std {}",
            self.num_output, self.k, self.weight_std
        );
        Ok(())
    }
}

impl<T: BlobNumeric> Layer<T> for InnerProductLayer<T> {
    fn layer_type(&self) -> &'static str {
        "InnerProduct"
    }

    fn setup(&mut self, bottom: &[Blob<T>], top: &mut [Blob<T>]) -> Result<(), LayerError> {
        check_blob_count(self.layer_type(), "bottom", 1, bottom.len())?;
        check_blob_count(self.layer_type(), "top", 1, top.len())?;
        if bottom[0].num_axes() == 0 {
            return Err(LayerError::ConfigurationError(
                "InnerProduct bottom needs at least one axis".to_string(),
            ));
        }
        self.m = bottom[0].shape()[0];
        self.k = bottom[0].count_from(1);

        if self.blobs.is_empty() {
            self.fill_params()?;
        } else {
            debug!("InnerProductLayer: skipping parameter initialization");
            let expected = [self.num_output, self.k];
            if self.blobs[0].shape() != expected {
                return Err(LayerError::ShapeMismatch {
                    expected: expected.to_vec(),
                    actual: self.blobs[0].shape().to_vec(),
                    operation: "InnerProductLayer::setup (weight)".to_string(),
                });
            }
        }
        top[0].reshape(&[self.m, self.num_output]);
        Ok(())
    }

    fn forward(&mut self, bottom: &[Blob<T>], top: &mut [Blob<T>]) -> Result<(), LayerError> {
        check_blob_count(self.layer_type(), "bottom", 1, bottom.len())?;
        check_blob_count(self.layer_type(), "top", 1, top.len())?;
        if self.blobs.is_empty() {
            return Err(LayerError::InternalError(
                "InnerProductLayer used before setup".to_string(),
            ));
        }
        let (m, k, n) = (self.m, self.k, self.num_output);
        if bottom[0].count() != m * k {
            return Err(LayerError::ShapeMismatch {
                expected: vec![m, k],
                actual: bottom[0].shape().to_vec(),
                operation: "InnerProductLayer::forward".to_string(),
            });
        }
        let x = bottom[0].data();
        let w = self.blobs[0].data();
        let bias = self.blobs.get(1).map(|b| b.data());

        let mut y = vec![T::zero(); m * n];
        for row in 0..m {
            for col in 0..n {
                let mut acc = bias.map_or(T::zero(), |b| b[col]);
                for i in 0..k {
                    acc += x[row * k + i] * w[col * k + i];
                }
                y[row * n + col] = acc;
            }
        }
        top[0].set_data(&y)
    }

    fn backward(
        &mut self,
        top: &[Blob<T>],
        propagate_down: &[bool],
        bottom: &mut [Blob<T>],
    ) -> Result<(), LayerError> {
        check_blob_count(self.layer_type(), "top", 1, top.len())?;
        check_blob_count(self.layer_type(), "bottom", 1, bottom.len())?;
        check_propagate_down(propagate_down, bottom.len())?;
        if self.blobs.is_empty() {
            return Err(LayerError::InternalError(
                "InnerProductLayer used before setup".to_string(),
            ));
        }
        let (m, k, n) = (self.m, self.k, self.num_output);
        let dy = top[0].diff();
        if dy.len() != m * n {
            return Err(LayerError::ShapeMismatch {
                expected: vec![m, n],
                actual: top[0].shape().to_vec(),
                operation: "InnerProductLayer::backward".to_string(),
            });
        }

        // dW = dyᵀ · x
        let x = bottom[0].data();
        let mut dw = vec![T::zero(); n * k];
        for col in 0..n {
            for i in 0..k {
                let mut acc = T::zero();
                for row in 0..m {
                    acc += dy[row * n + col] * x[row * k + i];
                }
                dw[col * k + i] = acc;
            }
        }
        self.blobs[0].set_diff(&dw)?;

        if let Some(bias) = self.blobs.get_mut(1) {
            let db: Vec<T> = (0..n)
                .map(|col| (0..m).fold(T::zero(), |acc, row| acc + dy[row * n + col]))
                .collect();
            bias.set_diff(&db)?;
        }

        if propagate_down[0] {
            // dx = dy · W
            let w = self.blobs[0].data();
            let mut dx = vec![T::zero(); m * k];
            for row in 0..m {
                for i in 0..k {
                    let mut acc = T::zero();
                    for col in 0..n {
                        acc += dy[row * n + col] * w[col * k + i];
                    }
                    dx[row * k + i] = acc;
                }
            }
            bottom[0].set_diff(&dx)?;
        }
        Ok(())
    }

    fn blobs(&self) -> &[Blob<T>] {
        &self.blobs
    }

    fn blobs_mut(&mut self) -> &mut [Blob<T>] {
        &mut self.blobs
    }
}

#[cfg(test)]
#[path = "inner_product_test.rs"]
mod tests;
