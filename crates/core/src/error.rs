/// Result alias that carries the custom [`PlayerError`] type.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Common error type for the core crate.
///
/// Timeline dispatch never lets one of these escape the scheduler; they are
/// rendered into the trigger log and the surfaced error message instead.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Free-form failure reported by a collaborator.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid media reference: {0}")]
    Url(#[from] url::ParseError),
    /// A media download failed before any bytes reached a player.
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },
    #[error("unsupported media scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("No visual animation mapped for effect \"{0}\".")]
    UnresolvedEffect(String),
    #[error("AHAP event is missing its file.")]
    MissingPatternFile,
    #[error("The AHAP file payload is invalid: {0}")]
    UnsupportedPattern(String),
    #[error("Haptics are unavailable on this device.")]
    HapticsUnavailable,
}

impl PlayerError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<&str> for PlayerError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for PlayerError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
