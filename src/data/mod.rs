pub mod dataset;
pub mod synthetic;

pub use dataset::Dataset;
pub use synthetic::{synthetic_split, SyntheticSpec};
