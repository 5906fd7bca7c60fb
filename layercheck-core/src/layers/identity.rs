use crate::blob::Blob;
use crate::error::LayerError;
use crate::layer::{check_blob_count, check_propagate_down, Layer};
use crate::numeric::BlobNumeric;

/// Copies its single bottom to its single top: y = x.
#[derive(Debug, Clone)]
pub struct IdentityLayer<T> {
    blobs: Vec<Blob<T>>,
}

impl<T: BlobNumeric> IdentityLayer<T> {
    pub fn new() -> Self {
        IdentityLayer { blobs: Vec::new() }
    }
}

impl<T: BlobNumeric> Default for IdentityLayer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BlobNumeric> Layer<T> for IdentityLayer<T> {
    fn layer_type(&self) -> &'static str {
        "Identity"
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
        top[0].set_data(bottom[0].data())
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
        if propagate_down[0] {
            bottom[0].set_diff(top[0].diff())?;
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
