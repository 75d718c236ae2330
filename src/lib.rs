pub mod classify;
pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod normalize;
pub mod patterns;
pub mod reader;
pub mod schema;
pub mod shaper;
pub mod sink;
