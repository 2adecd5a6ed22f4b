//! Registries for collaborators outside the core pipeline.
//!
//! Each registry is an explicit value built once by the host and passed by
//! reference to whatever needs it.

pub mod assets;
pub mod transforms;

pub use assets::{AssetLoader, MapRegistry};
pub use transforms::{
    StatisticalTransform, TransformOutput, TransformRegistry, TransformRequest,
    dataset_for_series,
};
