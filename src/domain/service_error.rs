use serde::Deserialize;
use std::fmt;
use strum::EnumString;

/// Error codes the PR service puts in its error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceErrorCode {
    TeamExists,
    PrExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    NotFound,
    #[strum(default)]
    Other(String),
}

impl ServiceErrorCode {
    /// Extract the code from `{"error": {"code": ..., "message": ...}}`.
    ///
    /// Returns `None` for bodies that are not an error envelope, such as the
    /// `{"pr": ...}` body of a successful create.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
        envelope.error.code.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceErrorCode::TeamExists => "TEAM_EXISTS",
            ServiceErrorCode::PrExists => "PR_EXISTS",
            ServiceErrorCode::PrMerged => "PR_MERGED",
            ServiceErrorCode::NotAssigned => "NOT_ASSIGNED",
            ServiceErrorCode::NoCandidate => "NO_CANDIDATE",
            ServiceErrorCode::NotFound => "NOT_FOUND",
            ServiceErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
}
