use thiserror::Error;

#[derive(Error, Debug)]
pub enum OfferError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Translation failed: {message}")]
    TranslationError { message: String },

    #[error("Geocoding failed: {message}")]
    GeocodingError { message: String },

    #[error("Invalid identifier: {value:?}")]
    InvalidIdentifier { value: String },

    #[error("Invalid {record} record: {message}")]
    DirectoryRecordError { record: String, message: String },
}

impl OfferError {
    /// Errors caused by the caller's input rather than by the service or its collaborators.
    pub fn is_input_error(&self) -> bool {
        matches!(self, OfferError::InvalidIdentifier { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OfferError::HttpError(_) => "Could not reach an external service".to_string(),
            OfferError::CsvError(_) => "The localities CSV file could not be read".to_string(),
            OfferError::IoError(e) => format!("File access failed: {}", e),
            OfferError::SerializationError(_) => "The data file is not valid JSON".to_string(),
            OfferError::ConfigError { message } => format!("Configuration problem: {}", message),
            OfferError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            OfferError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            OfferError::ConfigValidationError { field, message } => {
                format!("Setting '{}' is invalid: {}", field, message)
            }
            OfferError::TranslationError { .. } => "Translation is unavailable".to_string(),
            OfferError::GeocodingError { .. } => "Location lookup is unavailable".to_string(),
            OfferError::InvalidIdentifier { .. } => "Invalid id".to_string(),
            OfferError::DirectoryRecordError { record, .. } => {
                format!("A {} record in the directory is invalid", record)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            OfferError::HttpError(_)
            | OfferError::TranslationError { .. }
            | OfferError::GeocodingError { .. } => {
                "Check network connectivity and the configured endpoints"
            }
            OfferError::CsvError(_) => {
                "Make sure the CSV has the columns id,name,district,state,lat,lng"
            }
            OfferError::IoError(_) => "Check that the file exists and is readable",
            OfferError::SerializationError(_) | OfferError::DirectoryRecordError { .. } => {
                "Re-export the directory snapshot and try again"
            }
            OfferError::ConfigError { .. }
            | OfferError::MissingConfigError { .. }
            | OfferError::InvalidConfigValueError { .. }
            | OfferError::ConfigValidationError { .. } => {
                "Review the configuration file and environment variables"
            }
            OfferError::InvalidIdentifier { .. } => {
                "Ids contain only letters, digits, '-' or '_' (at most 64 characters)"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, OfferError>;
