//! Table state slices and the update protocol

mod slice;
mod slices;
mod table_state;
mod updater;

pub use slice::*;
pub use slices::*;
pub use table_state::*;
pub use updater::*;
