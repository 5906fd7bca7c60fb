use num_traits::{Float, NumAssignOps, NumCast};
use std::fmt::{Debug, Display};

/// Element types a [`Blob`](crate::blob::Blob) can hold.
///
/// Restricted to floating point (`f32`, `f64`): finite differences make no
/// sense on integers. `Float` already brings `zero()`, `one()`, `from()` and
/// `to_f64()`, which is everything the checker needs to move values between
/// the blob's type and the `f64` it accumulates the loss in.
pub trait BlobNumeric:
    Float
    + NumAssignOps
    + PartialOrd
    + Debug
    + Display
    + Copy
    + Send
    + Sync
    + 'static
{
}

impl BlobNumeric for f32 {}
impl BlobNumeric for f64 {}

/// Converts an `f64` into `T`, falling back to NaN when the value cannot be
/// represented (only reachable for exotic `Float` impls).
pub(crate) fn from_f64<T: BlobNumeric>(value: f64) -> T {
    <T as NumCast>::from(value).unwrap_or_else(T::nan)
}

/// Widens a `T` to `f64` for loss accumulation.
pub(crate) fn to_f64<T: BlobNumeric>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
