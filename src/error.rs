use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuchaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Data user '{new}' collides with '{existing}': both resolve to storage key suffix '{slug}'")]
    NamespaceConflict {
        existing: String,
        new: String,
        slug: String,
    },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown data user: {0}")]
    UnknownUser(String),

    #[error("Unrecognized category mapping document: {0}")]
    MappingFormat(String),

    #[error("Stored data under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HuchaError>;
