pub mod batcher;
pub mod collector;
pub mod core;
pub mod params;
