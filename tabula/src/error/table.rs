//! Table construction and lookup errors

use thiserror::Error;

/// Errors surfaced by table construction, reconfiguration and row lookup.
///
/// Construction errors are fatal: [`Table::new`](crate::Table::new) never hands
/// back a partially built table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A column built from an accessor function has no explicit id.
    #[error("column definition at {path} uses an accessor function and must provide an id")]
    MissingAccessorColumnId {
        /// Position of the definition in the column tree, e.g. `1.0`.
        path: String,
    },

    /// A column has no id, no accessor key and no string header.
    #[error("column definition at {path} needs an id, an accessor key or a string header")]
    MissingColumnId {
        /// Position of the definition in the column tree.
        path: String,
    },

    /// Two column definitions resolved to the same id.
    #[error("duplicate column id '{0}'")]
    DuplicateColumnId(String),

    /// No row with this id exists in the searched row models.
    #[error("could not find row with id '{0}'")]
    RowNotFound(String),

    /// A feature's construct hook rejected the configuration.
    #[error("feature '{feature}' failed: {message}")]
    Feature {
        /// Name of the failing feature.
        feature: String,
        /// What went wrong.
        message: String,
    },
}

impl TableError {
    /// Creates a feature hook failure.
    pub fn feature(feature: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Feature {
            feature: feature.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error was raised while building columns.
    pub fn is_column_error(&self) -> bool {
        matches!(
            self,
            TableError::MissingAccessorColumnId { .. }
                | TableError::MissingColumnId { .. }
                | TableError::DuplicateColumnId(_)
        )
    }
}
