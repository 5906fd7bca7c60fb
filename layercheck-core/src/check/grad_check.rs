use crate::blob::Blob;
use crate::check::config::{ConfigError, GradCheckConfig};
use crate::check::reldiff::relative_difference;
use crate::check::target::{collect_targets, CheckTarget};
use crate::error::LayerError;
use crate::layer::Layer;
use crate::numeric::{from_f64, to_f64, BlobNumeric};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use std::fmt;
use thiserror::Error;

/// Added to every component of the perturbation direction.
const DIRECTION_BIAS: f64 = 0.1;

/// Payload of a failed check: which target failed, by how much, and the
/// three gradients needed to find the offending element.
///
/// The gradients are stored in the `data` buffer of each blob.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientMismatch<T> {
    /// Position of the target in the checked sequence.
    pub index: usize,
    pub target: CheckTarget,
    pub err: f64,
    pub threshold: f64,
    pub analytic: Blob<T>,
    pub numeric: Blob<T>,
    /// `analytic - numeric`, elementwise.
    pub difference: Blob<T>,
}

fn write_section<T: fmt::Debug>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    values: &[T],
) -> fmt::Result {
    writeln!(f, "------ {} ------", name)?;
    writeln!(f, "{:?}", values)
}

impl<T: BlobNumeric> fmt::Display for GradientMismatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fail grad of bottom|{} ({}), err|{} > {}",
            self.index, self.target, self.err, self.threshold
        )?;
        write_section(f, "grad", self.analytic.data())?;
        write_section(f, "_grad", self.numeric.data())?;
        write_section(f, "diff", self.difference.data())
    }
}

/// Error type for gradient checking.
#[derive(Error, Debug)]
pub enum GradCheckError<T: BlobNumeric> {
    #[error("Gradient check supports exactly one top blob, got {count}")]
    UnsupportedTopCount { count: usize },

    #[error("Invalid gradient check configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("{0}")]
    GradientMismatch(Box<GradientMismatch<T>>),

    #[error("Layer failed during gradient check: {0}")]
    Layer(#[from] LayerError),
}

impl<T: BlobNumeric> GradCheckError<T> {
    /// The mismatch payload, if this is a failed comparison.
    pub fn mismatch(&self) -> Option<&GradientMismatch<T>> {
        match self {
            GradCheckError::GradientMismatch(m) => Some(m),
            _ => None,
        }
    }
}

/// Compares a layer's analytic gradients against forward-difference estimates.
///
/// The scalar loss is `sum(top.data * p)` for a random direction `p`, so the
/// gradient seeded into `top.diff` is `p` itself. Every element of every
/// target blob is then perturbed by `numeric_eps`, one at a time, and the
/// change in loss gives the numeric gradient. A target passes when
/// [`relative_difference`] of analytic vs numeric is below `check_eps`; the
/// first target that does not aborts the check.
#[derive(Debug, Clone, Default)]
pub struct GradientChecker {
    config: GradCheckConfig,
}

impl GradientChecker {
    pub fn new(config: GradCheckConfig) -> Self {
        GradientChecker { config }
    }

    pub fn config(&self) -> &GradCheckConfig {
        &self.config
    }

    /// Runs the check with a generator seeded from `config.seed`.
    pub fn check<T, L>(
        &self,
        layer: &mut L,
        bottom: &mut [Blob<T>],
        top: &mut [Blob<T>],
    ) -> Result<(), GradCheckError<T>>
    where
        T: BlobNumeric,
        L: Layer<T> + ?Sized,
    {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.check_with_rng(layer, bottom, top, &mut rng)
    }

    /// Runs the check drawing the perturbation direction from `rng`.
    /// `config.seed` is ignored.
    ///
    /// On return every target's `data` holds the values it had right after
    /// `setup`, whatever the outcome. `diff` buffers are left as the last
    /// pass wrote them.
    pub fn check_with_rng<T, L, R>(
        &self,
        layer: &mut L,
        bottom: &mut [Blob<T>],
        top: &mut [Blob<T>],
        rng: &mut R,
    ) -> Result<(), GradCheckError<T>>
    where
        T: BlobNumeric,
        L: Layer<T> + ?Sized,
        R: Rng + ?Sized,
    {
        if top.len() != 1 {
            return Err(GradCheckError::UnsupportedTopCount { count: top.len() });
        }
        self.config.validate()?;

        layer.setup(bottom, top)?;

        let targets = collect_targets(bottom.len(), layer.blobs().len(), &self.config);
        let snapshots: Vec<Vec<T>> = targets
            .iter()
            .map(|&t| target_blob(layer, bottom, t).data().to_vec())
            .collect();
        debug!(
            "GradientChecker: {} layer, {} target(s): {:?}",
            layer.layer_type(),
            targets.len(),
            targets
        );

        let outcome = self.compare_targets(layer, bottom, top, &targets, &snapshots, rng);
        let restored = restore_targets(layer, bottom, &targets, &snapshots, false);
        outcome.and(restored.map_err(GradCheckError::from))
    }

    fn compare_targets<T, L, R>(
        &self,
        layer: &mut L,
        bottom: &mut [Blob<T>],
        top: &mut [Blob<T>],
        targets: &[CheckTarget],
        snapshots: &[Vec<T>],
        rng: &mut R,
    ) -> Result<(), GradCheckError<T>>
    where
        T: BlobNumeric,
        L: Layer<T> + ?Sized,
        R: Rng + ?Sized,
    {
        let numeric_eps = self.config.numeric_eps;
        let step: T = from_f64(numeric_eps);
        let direction = perturbation_direction::<T, R>(top[0].shape(), rng);

        layer.forward(bottom, top)?;
        let loss = weighted_loss(top[0].data(), direction.data());
        debug!("GradientChecker: baseline loss {}", loss);

        for &t in targets {
            target_blob_mut(layer, bottom, t).zero_diff();
        }
        top[0].set_diff(direction.data())?;
        let propagate_down = vec![true; bottom.len()];
        layer.backward(top, &propagate_down, bottom)?;

        let analytic_grads: Vec<Blob<T>> = targets
            .iter()
            .map(|&t| {
                let blob = target_blob(layer, bottom, t);
                Blob::new(blob.diff().to_vec(), blob.shape().to_vec())
            })
            .collect::<Result<_, _>>()?;

        for (index, (&target, analytic)) in targets.iter().zip(analytic_grads).enumerate() {
            restore_targets(layer, bottom, targets, snapshots, true)?;

            let baseline = &snapshots[index];
            let mut numeric = Vec::with_capacity(baseline.len());
            for (j, &value) in baseline.iter().enumerate() {
                set_scalar(target_blob_mut(layer, bottom, target), j, value + step)?;
                layer.forward(bottom, top)?;
                let perturbed = weighted_loss(top[0].data(), direction.data());
                let estimate = (perturbed - loss) / numeric_eps;
                trace!("GradientChecker: {} element {} numeric grad {}", target, j, estimate);
                numeric.push(from_f64::<T>(estimate));
                set_scalar(target_blob_mut(layer, bottom, target), j, value)?;
            }
            let numeric = Blob::new(numeric, analytic.shape().to_vec())?;

            let err = relative_difference(analytic.data(), numeric.data());
            // Written as a negated `<` so that a NaN error fails.
            if !(err < self.config.check_eps) {
                let difference: Vec<T> = analytic
                    .data()
                    .iter()
                    .zip(numeric.data())
                    .map(|(&a, &n)| a - n)
                    .collect();
                let difference = Blob::new(difference, analytic.shape().to_vec())?;
                return Err(GradCheckError::GradientMismatch(Box::new(GradientMismatch {
                    index,
                    target,
                    err,
                    threshold: self.config.check_eps,
                    analytic,
                    numeric,
                    difference,
                })));
            }
            debug!("pass blobs|{} ({}) err {} ... ", index, target, err);
        }
        Ok(())
    }
}

/// Checks `layer` with `config`. Shorthand for
/// `GradientChecker::new(config.clone()).check(layer, bottom, top)`.
pub fn check_gradient<T, L>(
    layer: &mut L,
    bottom: &mut [Blob<T>],
    top: &mut [Blob<T>],
    config: &GradCheckConfig,
) -> Result<(), GradCheckError<T>>
where
    T: BlobNumeric,
    L: Layer<T> + ?Sized,
{
    GradientChecker::new(config.clone()).check(layer, bottom, top)
}

/// Draws the loss direction `p`: standard normal samples shifted by 0.1.
pub fn perturbation_direction<T, R>(shape: &[usize], rng: &mut R) -> Blob<T>
where
    T: BlobNumeric,
    R: Rng + ?Sized,
{
    let mut direction = Blob::zeros(shape);
    for slot in direction.data_mut() {
        let sample: f64 = StandardNormal.sample(&mut *rng);
        *slot = from_f64(sample + DIRECTION_BIAS);
    }
    direction
}

fn weighted_loss<T: BlobNumeric>(data: &[T], direction: &[T]) -> f64 {
    data.iter()
        .zip(direction.iter())
        .map(|(&y, &p)| to_f64(y) * to_f64(p))
        .sum()
}

fn target_blob<'a, T, L>(layer: &'a L, bottom: &'a [Blob<T>], target: CheckTarget) -> &'a Blob<T>
where
    T: BlobNumeric,
    L: Layer<T> + ?Sized,
{
    match target {
        CheckTarget::Bottom(i) => &bottom[i],
        CheckTarget::Param(i) => &layer.blobs()[i],
    }
}

fn target_blob_mut<'a, T, L>(
    layer: &'a mut L,
    bottom: &'a mut [Blob<T>],
    target: CheckTarget,
) -> &'a mut Blob<T>
where
    T: BlobNumeric,
    L: Layer<T> + ?Sized,
{
    match target {
        CheckTarget::Bottom(i) => &mut bottom[i],
        CheckTarget::Param(i) => &mut layer.blobs_mut()[i],
    }
}

fn set_scalar<T: BlobNumeric>(
    blob: &mut Blob<T>,
    index: usize,
    value: T,
) -> Result<(), LayerError> {
    let count = blob.count();
    let slot = blob.data_mut().get_mut(index).ok_or_else(|| {
        LayerError::InternalError(format!(
            "blob shrank to {} element(s) while perturbing element {}",
            count, index
        ))
    })?;
    *slot = value;
    Ok(())
}

/// Writes every snapshot back into its target, optionally clearing `diff`.
fn restore_targets<T, L>(
    layer: &mut L,
    bottom: &mut [Blob<T>],
    targets: &[CheckTarget],
    snapshots: &[Vec<T>],
    clear_diff: bool,
) -> Result<(), LayerError>
where
    T: BlobNumeric,
    L: Layer<T> + ?Sized,
{
    for (&target, snapshot) in targets.iter().zip(snapshots) {
        let blob = target_blob_mut(layer, bottom, target);
        blob.set_data(snapshot)?;
        if clear_diff {
            blob.zero_diff();
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "grad_check_test.rs"]
mod tests;
