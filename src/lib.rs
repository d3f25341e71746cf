// Lurecheck: lexical phishing URL detection.
//
// This is the library root. The feature extractor under `features` is the
// correctness-critical core — every other module (model, stores, web, CLI)
// is glue that must go through it.

pub mod config;
pub mod features;
pub mod model;
pub mod output;
pub mod store;
pub mod web;
