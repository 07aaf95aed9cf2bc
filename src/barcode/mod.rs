pub mod revcomp;
pub mod transform;

pub use revcomp::revcomp;
pub use revcomp::reverse_qual;

pub use transform::transform_batch;
pub use transform::transform_pair;
