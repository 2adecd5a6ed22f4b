pub mod alignment;
pub mod mapping;
pub mod normalize;
pub mod primitives;
pub mod types;

pub use alignment::{AlignedSeries, Alignment, align};
pub use mapping::{DataSource, FieldMapping, SeriesSource, YFields};
pub use normalize::{
    NormalizeWarning, Normalized, Normalizer, NormalizerConfig, UNKNOWN_GROUP, group_records,
    normalize, validate_series,
};
pub use types::{Record, Scalar, Surface, SurfaceId, Viewport};
