pub mod auth;
pub mod dataset;
pub mod feedback;
pub mod predict;
pub mod retrain;
pub mod status;
