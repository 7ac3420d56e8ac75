use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// Not even one enemy column fits between the margins.
    PlayfieldTooNarrow { width: i32, required: i32 },
    /// No room for the flight-path margin above the fighter.
    PlayfieldTooShort { height: i32, required: i32 },
    InvalidConfig { field: &'static str, reason: String },
    Parse(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayfieldTooNarrow { width, required } => write!(
                f,
                "playfield too narrow: width {width}, need at least {required}"
            ),
            Self::PlayfieldTooShort { height, required } => write!(
                f,
                "playfield too short: height {height}, need more than {required}"
            ),
            Self::InvalidConfig { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
            Self::Parse(message) => write!(f, "could not parse config: {message}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
