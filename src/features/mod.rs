// URL feature extraction — the train/serve parity core.
//
// Both the training pipeline and the serving path must build their vectors
// through `extract` in this module. There is deliberately no second
// implementation anywhere in the crate.

pub mod extractor;
pub mod url_parts;

pub use extractor::{extract, FEATURE_COUNT, FEATURE_NAMES};
