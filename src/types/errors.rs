use thiserror::Error;

// === ValidationError ===

/// Reasons a proposed category name is rejected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The name is empty.
    #[error("Category name cannot be empty")]
    Empty,
    /// The name has fewer characters than allowed.
    #[error("Category name must be at least {min} characters")]
    TooShort { min: usize },
    /// The name has more characters than allowed.
    #[error("Category name must be at most {max} characters")]
    TooLong { max: usize },
    /// A category with exactly this name already exists.
    #[error("Category already exists: {0}")]
    Duplicate(String),
}

// === CategoryError ===

/// Errors related to category store and list model operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// The proposed name failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A row index beyond the current category count. Caller contract violation.
    #[error("Category index {index} out of range (count {count})")]
    OutOfRange { index: usize, count: usize },
    /// The operation would remove the last remaining category.
    #[error("Cannot delete the last category")]
    LastCategory,
    /// Category with the given ID was not found.
    #[error("Category not found: {0}")]
    NotFound(String),
    /// Database operation failed.
    #[error("Category database error: {0}")]
    DatabaseError(String),
}

impl From<rusqlite::Error> for CategoryError {
    fn from(e: rusqlite::Error) -> Self {
        CategoryError::DatabaseError(e.to_string())
    }
}

// === ExportError ===

/// Errors related to exporting a category to a file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The category to export does not exist.
    #[error("Category not found for export: {0}")]
    NotFound(String),
    /// Writing the export file failed.
    #[error("Export I/O error: {0}")]
    Io(String),
    /// Encoding the category snapshot failed.
    #[error("Export serialization error: {0}")]
    Serialization(String),
}

impl ExportError {
    /// Title and message pair shown to the user in an alert.
    pub fn user_message(&self) -> (String, String) {
        match self {
            ExportError::NotFound(_) => (
                "Unable to share".to_string(),
                "The list no longer exists.".to_string(),
            ),
            ExportError::Io(msg) => (
                "Unable to share".to_string(),
                format!("The file could not be written: {}", msg),
            ),
            ExportError::Serialization(msg) => (
                "Unable to share".to_string(),
                format!("The list could not be converted: {}", msg),
            ),
        }
    }
}

// === ConversionError ===

/// Errors related to importing legacy-format category files.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Reading a legacy file or directory failed.
    #[error("Conversion I/O error: {0}")]
    Io(String),
    /// A legacy file could not be parsed.
    #[error("Conversion parse error in {file}: {message}")]
    Parse { file: String, message: String },
    /// Writing converted data into the store failed.
    #[error("Conversion store error: {0}")]
    Store(#[from] CategoryError),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
