use reqwest::StatusCode;
use serde::Serialize;

const CREATE_ACCEPTED: &[StatusCode] = &[StatusCode::CREATED, StatusCode::CONFLICT];

/// Result of a single check evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Fail,
}

impl CheckOutcome {
    pub fn is_pass(self) -> bool {
        matches!(self, CheckOutcome::Pass)
    }
}

/// Named assertion over the response status of one request.
///
/// A request that never got a response has no status and always fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCheck {
    name: &'static str,
    accepted: &'static [StatusCode],
}

impl StatusCheck {
    /// Creating a PR passes when it was created or already existed
    pub const fn create_pull_request() -> Self {
        Self {
            name: "status is 201 or 409",
            accepted: CREATE_ACCEPTED,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn evaluate(&self, status: Option<StatusCode>) -> CheckOutcome {
        match status {
            Some(status) if self.accepted.contains(&status) => CheckOutcome::Pass,
            _ => CheckOutcome::Fail,
        }
    }
}
