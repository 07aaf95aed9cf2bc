mod command;
pub mod constants;
pub mod core;

pub use command::Command;
pub use self::core::core::SplitReport;
pub use self::core::core::SplitStats;
pub use self::core::core::Splitter;
pub use self::core::params;
