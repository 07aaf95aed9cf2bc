pub mod coordinator;
pub mod reorder;

pub use coordinator::recv_or_cancel;
pub use coordinator::send_or_cancel;
pub use coordinator::Coordinator;
pub use reorder::ReorderBuffer;
