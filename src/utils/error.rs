use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChocAnError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Record {key} already exists in {table}")]
    DuplicateKey { table: String, key: String },

    #[error("Record {key} not found in {table}")]
    NotFound { table: String, key: String },

    #[error("Field '{field}' cannot be edited in {table}")]
    UnknownField { table: String, field: String },

    #[error("At least one field must be given to update a record")]
    NoUpdates,

    #[error("No identifiers left in {table}")]
    IdSpaceExhausted { table: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Storage,
    Validation,
    Configuration,
    Report,
    Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ChocAnError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChocAnError::IoError(_) | ChocAnError::SerializationError(_) => ErrorCategory::Storage,
            ChocAnError::CsvError(_) | ChocAnError::ZipError(_) => ErrorCategory::Report,
            ChocAnError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ChocAnError::InvalidValue { .. }
            | ChocAnError::DuplicateKey { .. }
            | ChocAnError::NotFound { .. }
            | ChocAnError::UnknownField { .. }
            | ChocAnError::NoUpdates => ErrorCategory::Validation,
            ChocAnError::IdSpaceExhausted { .. } | ChocAnError::InvalidArgument { .. } => {
                ErrorCategory::Program
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChocAnError::NotFound { .. } | ChocAnError::NoUpdates => ErrorSeverity::Low,
            ChocAnError::InvalidValue { .. }
            | ChocAnError::DuplicateKey { .. }
            | ChocAnError::UnknownField { .. }
            | ChocAnError::CsvError(_) => ErrorSeverity::Medium,
            ChocAnError::ConfigValidationError { .. }
            | ChocAnError::InvalidArgument { .. }
            | ChocAnError::ZipError(_) => ErrorSeverity::High,
            ChocAnError::IoError(_)
            | ChocAnError::SerializationError(_)
            | ChocAnError::IdSpaceExhausted { .. } => ErrorSeverity::Critical,
        }
    }

    /// Short message suitable for the terminal, without internal detail.
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Storage => {
                format!("There was an issue accessing the database. ({})", self)
            }
            ErrorCategory::Report => format!("A report file could not be written. ({})", self),
            ErrorCategory::Configuration => format!("The configuration is not usable. ({})", self),
            ErrorCategory::Validation | ErrorCategory::Program => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ChocAnError::IoError(_) => "Check that the data and report directories exist and are writable",
            ChocAnError::SerializationError(_) => {
                "A table file is corrupt; restore it from a backup or re-import it from CSV"
            }
            ChocAnError::CsvError(_) => "Check the CSV header and column values",
            ChocAnError::ZipError(_) => "Disable report archiving or free disk space and retry",
            ChocAnError::ConfigValidationError { .. } => {
                "Fix the configuration file or pass the value on the command line"
            }
            ChocAnError::InvalidValue { .. } => "Enter a value within the allowed limits",
            ChocAnError::DuplicateKey { .. } => "Remove the duplicate rows and retry",
            ChocAnError::NotFound { .. } => "Check the number and try again",
            ChocAnError::UnknownField { .. } => "Choose one of the editable fields",
            ChocAnError::NoUpdates => "Choose at least one field to change",
            ChocAnError::IdSpaceExhausted { .. } => "Remove unused records before adding new ones",
            ChocAnError::InvalidArgument { .. } => "Check the command arguments and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, ChocAnError>;
