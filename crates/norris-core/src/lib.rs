// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod config;
pub mod data;
pub mod features;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod predictor;
pub mod season;
pub mod split;
