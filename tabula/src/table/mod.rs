//! The table instance and its structural entities
//!
//! [`Table`] owns options, state and every memo. [`Column`], [`Row`],
//! [`Cell`] and [`Header`] are immutable once built and shared through `Rc`;
//! their feature APIs take the table as an argument instead of holding a
//! back-reference.

mod cell;
mod column;
mod header;
mod instance;
mod row;
mod row_model;

pub use cell::*;
pub use column::*;
pub use header::*;
pub use instance::*;
pub use row::*;
pub use row_model::*;
