//! Impact model errors.

use thiserror::Error;

/// Errors raised by the impact calculator factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactError {
    /// No model is registered under the requested name.
    #[error("unknown impact model '{name}', available models: [{}]", .available.join(", "))]
    UnknownModel {
        /// The requested name
        name: String,
        /// Every registered model name, sorted
        available: Vec<String>,
    },

    /// A model was registered without a constructor.
    #[error("no constructor supplied for impact model '{0}'")]
    MissingConstructor(String),

    /// Model names must be non-empty.
    #[error("impact model name must not be empty")]
    InvalidModelName,
}
