use crate::blob::Blob;
use crate::error::LayerError;
use crate::layer::{check_blob_count, check_propagate_down, Layer};
use crate::numeric::BlobNumeric;

/// Elementwise logistic function, y = 1 / (1 + e^-x).
#[derive(Debug, Clone)]
pub struct SigmoidLayer<T> {
    blobs: Vec<Blob<T>>,
}

impl<T: BlobNumeric> SigmoidLayer<T> {
    pub fn new() -> Self {
        SigmoidLayer { blobs: Vec::new() }
    }
}

impl<T: BlobNumeric> Default for SigmoidLayer<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn sigmoid<T: BlobNumeric>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

impl<T: BlobNumeric> Layer<T> for SigmoidLayer<T> {
    fn layer_type(&self) -> &'static str {
        "Sigmoid"
    }

    fn setup(&mut self, bottom: &[Blob<T>], top: &mut [Blob<T>]) -> Result<(), LayerError> {
        check_blob_count(self.layer_type(), "bottom", 1, bottom.len())?;
        check_blob_count(self.layer_type(), "top", 1, top.len())?;
        top[0].reshape(bottom[0].shape());
        Ok(())
    }

    fn forward(&mut self, bottom: &[Blob<T>], top: &mut [Blob<T>]) -> Result<(), LayerError> {
        check_blob_count(self.layer_type(), "bottom", 1, bottom.len())?;
        check_blob_count(self.layer_type(), "top", 1, top.len())?;
        let out: Vec<T> = bottom[0].data().iter().map(|&x| sigmoid(x)).collect();
        top[0].set_data(&out)
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
        if !propagate_down[0] {
            return Ok(());
        }
        // dy/dx expressed through the forward output: y * (1 - y)
        let grad: Vec<T> = top[0]
            .data()
            .iter()
            .zip(top[0].diff())
            .map(|(&y, &dy)| dy * y * (T::one() - y))
            .collect();
        bottom[0].set_diff(&grad)
    }

    fn blobs(&self) -> &[Blob<T>] {
        &self.blobs
    }

    fn blobs_mut(&mut self) -> &mut [Blob<T>] {
        &mut self.blobs
    }
}
