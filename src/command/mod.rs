pub mod split;

pub use split::Command as Split;
