pub mod artifact;
pub mod encoder;
pub mod linear;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod pricing;
pub mod store;

pub use artifact::{EstimatorSpec, ModelArtifact};
pub use pricing::PricingModel;
pub use store::ModelStore;
