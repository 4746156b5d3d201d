use thiserror::Error;

/// Error type for invalid build-time or configuration operations.
///
/// The edit surface of a [`Ledger`](crate::ledger::Ledger) never returns these; invalid edits
/// degrade to no-ops and are only reported through logging.
#[derive(Error, Debug)]
pub enum GhgError {
    #[error("{0}")]
    Error(String),
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u8),
    #[error("Indicator '{0}' is already registered")]
    DuplicateIndicator(String),
    #[error("Category '{category}' is defined twice in industry '{industry}'")]
    DuplicateCategory { industry: String, category: String },
    #[error("Industry '{0}' is defined twice")]
    DuplicateIndustry(String),
    #[error("Unknown industry '{0}'")]
    UnknownIndustry(String),
    #[error("Entity '{0}' is defined more than once")]
    DuplicateEntity(String),
    #[error("Output '{output}' is produced by more than one formula in category '{category}'")]
    DuplicateOutput { category: String, output: String },
    #[error("Formulas in category '{0}' depend on each other's outputs in a cycle")]
    CyclicFormulaChain(String),
    #[error("Category '{0}' does not declare an 'emission' output")]
    MissingEmissionOutput(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Could not serialise configuration: {0}")]
    Serialization(#[from] toml::ser::Error),
}

/// Convenience type for `Result<T, GhgError>`.
pub type GhgResult<T> = Result<T, GhgError>;
