//! Named filter, sorting and aggregation strategies
//!
//! Columns refer to strategies through [`Strategy`]: `Auto` lets the table
//! pick one from the data, `Named` looks the name up in the table's registry
//! and then in the built-ins, `Custom` carries the function itself. Only
//! names are persisted; functions are re-resolved on load.

mod aggregation;
mod filter;
mod sorting;

use std::collections::HashMap;
use std::fmt;

pub use aggregation::*;
pub use filter::*;
pub use sorting::*;

/// How a column chooses its filter, sorting or aggregation function.
#[derive(Clone)]
pub enum Strategy<F> {
    /// Inferred from the column's first values.
    Auto,
    /// Looked up by name in the table registry, then among the built-ins.
    Named(String),
    /// A function supplied directly.
    Custom(F),
}

impl<F> Strategy<F> {
    /// Creates a named strategy.
    pub fn named(name: impl Into<String>) -> Self {
        Strategy::Named(name.into())
    }

    /// Returns the strategy name, if named.
    pub fn name(&self) -> Option<&str> {
        match self {
            Strategy::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl<F: Clone> Strategy<F> {
    /// Resolves the strategy to a function.
    ///
    /// A name is looked up in `registry`, then through `builtin`; an unknown
    /// name is reported and falls back to `auto`.
    pub(crate) fn resolve(
        &self,
        registry: &HashMap<String, F>,
        builtin: impl FnOnce(&str) -> Option<F>,
        auto: impl FnOnce() -> Option<F>,
    ) -> Option<F> {
        match self {
            Strategy::Auto => auto(),
            Strategy::Custom(f) => Some(f.clone()),
            Strategy::Named(name) => match registry.get(name).cloned().or_else(|| builtin(name)) {
                Some(f) => Some(f),
                None => {
                    log::warn!("[fns] unknown strategy '{name}', falling back to auto");
                    auto()
                }
            },
        }
    }
}

impl<F> Default for Strategy<F> {
    fn default() -> Self {
        Strategy::Auto
    }
}

impl<F> From<&str> for Strategy<F> {
    fn from(name: &str) -> Self {
        Strategy::Named(name.to_string())
    }
}

macro_rules! custom_strategy {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Strategy<$ty> {
                fn from(f: $ty) -> Self {
                    Strategy::Custom(f)
                }
            }
        )*
    };
}

custom_strategy!(FilterFn, SortingFn, AggregationFn);

impl<F> fmt::Debug for Strategy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Auto => f.write_str("Auto"),
            Strategy::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Strategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
