use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is closed")]
    RoomClosed,

    #[error("Room is full")]
    RoomFull,

    #[error("User is not a member of this room")]
    NotMember,

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Track is already queued: {0}")]
    DuplicateTrack(String),

    #[error("Track not found in queue: {0}")]
    TrackNotFound(String),

    #[error("Stale playback state: reported {reported:?}, current {current:?}")]
    StaleState {
        reported: Option<String>,
        current: Option<String>,
    },

    #[error("Room modified concurrently")]
    VersionConflict,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller may safely repeat the whole request.
    ///
    /// Only a version conflict qualifies; nothing was committed when it is raised.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::RoomNotFound,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation
                    "23505" => Self::AlreadyExists("Room already exists".to_string()),
                    // PostgreSQL check_violation
                    "23514" => Self::InvalidInput("Constraint check failed".to_string()),
                    _ => Self::Database(err),
                }
            }
            _ => Self::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
