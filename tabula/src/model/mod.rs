//! Row data model: dynamic values, records and the row data trait

mod data;
mod record;
mod value;

pub use data::*;
pub use record::*;
pub use value::*;
