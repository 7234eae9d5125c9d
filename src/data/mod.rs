pub mod dataset;
pub mod loader;
pub mod normalize;

pub use dataset::Dataset;
pub use loader::{load_dataset, parse_dataset};
pub use normalize::{inverse, normalize_dataset, transform, NormalizationParams};
