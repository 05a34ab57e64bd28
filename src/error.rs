use thiserror::Error;

/// Errors raised by the timelog store and its file storage
#[derive(Debug, Error)]
pub enum TimelogError {
    /// `start_plan` while a record is still open
    #[error("a plan is already running, stop it first")]
    AlreadyOpen,

    /// `create_plan` with an id that is taken
    #[error("plan {id} ({name}) already exists, choose another id")]
    DuplicatePlanId { id: String, name: String },

    /// Write path referencing a plan that doesn't exist
    #[error("no plan with id {0}")]
    NotFound(String),

    /// A required plan field was left empty
    #[error("plan {0} must not be empty")]
    MissingField(&'static str),

    /// Backing file is not a timelog
    #[error("{path} is not a valid timelog file: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Mutation refused because the backing file failed to load; saving
    /// now would replace its content with whatever is in memory
    #[error("{0} could not be loaded, fix the file and reload (l)")]
    NotLoaded(String),

    /// Creating a file that is already there
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("failed to encode timelog: {0}")]
    Encode(#[from] serde_json::Error),

    /// Reading or writing the backing file failed
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TimelogError {
    /// Validation errors and refusals are shown inline by the action that
    /// caused them; nothing was changed
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AlreadyOpen
                | Self::DuplicatePlanId { .. }
                | Self::NotFound(_)
                | Self::MissingField(_)
                | Self::NotLoaded(_)
        )
    }
}

pub type TimelogResult<T> = Result<T, TimelogError>;
