// Reference layers used to drive the gradient checker.

pub mod identity;
pub mod inner_product;
pub mod sigmoid;

pub use identity::IdentityLayer;
pub use inner_product::InnerProductLayer;
pub use sigmoid::SigmoidLayer;
