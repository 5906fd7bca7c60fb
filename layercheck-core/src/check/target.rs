use crate::check::config::GradCheckConfig;
use log::warn;
use std::fmt;

/// A blob selected for checking: either a bottom or one of the layer's
/// parameter blobs, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckTarget {
    Bottom(usize),
    Param(usize),
}

impl fmt::Display for CheckTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckTarget::Bottom(i) => write!(f, "bottom[{}]", i),
            CheckTarget::Param(i) => write!(f, "param[{}]", i),
        }
    }
}

/// Builds the ordered target list: non-skipped bottoms first, then
/// non-skipped parameter blobs.
pub fn collect_targets(
    num_bottom: usize,
    num_params: usize,
    config: &GradCheckConfig,
) -> Vec<CheckTarget> {
    for &i in config.skip_bottom.iter().filter(|&&i| i >= num_bottom) {
        warn!("skip_bottom index {} selects nothing ({} bottom(s))", i, num_bottom);
    }
    for &i in config.skip_blobs.iter().filter(|&&i| i >= num_params) {
        warn!("skip_blobs index {} selects nothing ({} parameter blob(s))", i, num_params);
    }

    let bottoms = (0..num_bottom)
        .filter(|i| !config.skip_bottom.contains(i))
        .map(CheckTarget::Bottom);
    let params = (0..num_params)
        .filter(|i| !config.skip_blobs.contains(i))
        .map(CheckTarget::Param);
    bottoms.chain(params).collect()
}
