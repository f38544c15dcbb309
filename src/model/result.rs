//! Outcome classification for state-changing actions.

use serde::Serialize;

/// Substring the daemon includes in every successful action response.
///
/// The daemon has no structured success field; responses to accepted actions
/// carry a `"build"` member and rejected ones do not.
pub const SUCCESS_MARKER: &str = "build";

/// Logical outcome of a state-changing action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestResult {
    Success,
    Fail,
}

impl RequestResult {
    /// Classifies a response body by the presence of [`SUCCESS_MARKER`].
    ///
    /// A missing body is a `Fail`. HTTP status plays no part here.
    #[must_use]
    pub fn from_response(body: Option<&str>) -> Self {
        match body {
            Some(body) if body.contains(SUCCESS_MARKER) => Self::Success,
            _ => Self::Fail,
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_present_is_success() {
        assert_eq!(
            RequestResult::from_response(Some("{\"build\":12345}")),
            RequestResult::Success
        );
        assert_eq!(
            RequestResult::from_response(Some("...build 12345...")),
            RequestResult::Success
        );
    }

    #[test]
    fn test_marker_absent_is_fail() {
        assert_eq!(
            RequestResult::from_response(Some("error")),
            RequestResult::Fail
        );
        assert_eq!(RequestResult::from_response(Some("")), RequestResult::Fail);
        assert_eq!(RequestResult::from_response(None), RequestResult::Fail);
    }
}
