//! Input validation for identifiers and room fields arriving from callers

use crate::models::{RoomId, SourceId};

/// Maximum room name length
pub const ROOM_NAME_MAX: usize = 100;
/// Maximum room id length accepted from callers
pub const ROOM_ID_MAX: usize = 64;
/// Maximum source id length (external video/track identifiers)
pub const SOURCE_ID_MAX: usize = 128;

/// Validation error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid {field}: {message}")]
    Field { field: String, message: String },
}

impl ValidationError {
    fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for crate::Error {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Validation result
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Parse a room id: 1..=64 chars of `[A-Za-z0-9_-]` (nanoid alphabet)
pub fn parse_room_id(raw: &str) -> ValidationResult<RoomId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::field("room_id", "must not be empty"));
    }
    if raw.len() > ROOM_ID_MAX {
        return Err(ValidationError::field(
            "room_id",
            format!("must be at most {ROOM_ID_MAX} characters"),
        ));
    }
    if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(ValidationError::field("room_id", "contains invalid characters"));
    }
    Ok(RoomId::from_string(raw.to_string()))
}

/// Parse a source id: non-empty, bounded, no whitespace or control characters
pub fn parse_source_id(raw: &str) -> ValidationResult<SourceId> {
    if raw.is_empty() {
        return Err(ValidationError::field("source_id", "must not be empty"));
    }
    if raw.len() > SOURCE_ID_MAX {
        return Err(ValidationError::field(
            "source_id",
            format!("must be at most {SOURCE_ID_MAX} characters"),
        ));
    }
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::field("source_id", "must not contain whitespace"));
    }
    Ok(SourceId::from_string(raw.to_string()))
}

/// Validate and normalize a room name
pub fn validate_room_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::field("name", "must not be empty"));
    }
    if name.chars().count() > ROOM_NAME_MAX {
        return Err(ValidationError::field(
            "name",
            format!("must be at most {ROOM_NAME_MAX} characters"),
        ));
    }
    Ok(name.to_string())
}
