// Persistent stores for labeled training data and user feedback.
//
// Both are flat files so the dataset stays diffable and portable: the
// canonical training store is a CSV of the 20 features plus CLASS_LABEL,
// the feedback log is a two-column url,label CSV kept separate until an
// operator merges it.

pub mod csv_store;
pub mod feedback;
pub mod models;
pub mod traits;

pub use csv_store::CsvStore;
pub use feedback::FeedbackLog;
pub use models::{FeedbackEntry, LabeledRecord};
pub use traits::DatasetStore;
