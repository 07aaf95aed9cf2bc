pub mod barcode;
pub mod command;
pub mod common;
pub mod fileformat;
pub mod runtime;
pub mod threading;

pub use command::split::params;
pub use command::split::SplitStats;
pub use command::split::Splitter;
