//! Built-in pipeline stages
//!
//! Each function returns a factory the table calls once, on the stage's
//! first read. The stage it creates owns a memo keyed on its input model and
//! the state slices it reads, so an unchanged input hands back the same
//! `Rc`.

mod expanded;
mod faceted;
mod filtered;
mod grouped;
mod paginated;
mod sorted;

pub use expanded::*;
pub use faceted::*;
pub use filtered::*;
pub use grouped::*;
pub use paginated::*;
pub use sorted::*;
