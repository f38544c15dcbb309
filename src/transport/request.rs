//! Request descriptor built per facade call and handed to a [`Transport`](super::Transport).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::action::{ACTION_PARAM, LIST_PARAM, TOKEN_PARAM};

/// Header carrying the session cookie.
pub const COOKIE_HEADER: &str = "Cookie";

const REDACTED: &str = "<redacted>";

/// One named query parameter. Names may repeat (`hash`, `f`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A file uploaded as one multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Multipart field name.
    pub name: String,
    /// Local path read at send time.
    pub path: PathBuf,
    /// MIME type of the part.
    pub content_type: String,
}

impl FilePart {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content_type: content_type.into(),
        }
    }
}

/// A logical daemon request: query parameters, headers and optional file parts.
///
/// Built fresh for every call and never retained. Parameter order is preserved,
/// which keeps repeated names (`hash=A&hash=B`) in caller order on the wire.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    params: Vec<QueryParam>,
    headers: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl ApiRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(QueryParam::new(name, value));
        self
    }

    /// Appends several query parameters in order.
    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = QueryParam>) -> Self {
        self.params.extend(params);
        self
    }

    /// Appends a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attaches a file part.
    #[must_use]
    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// Returns a copy carrying the session token parameter and cookie header.
    #[must_use]
    pub fn authenticated(&self, token: &str, cookie: &str) -> Self {
        self.clone()
            .param(TOKEN_PARAM, token)
            .header(COOKIE_HEADER, cookie)
    }

    #[must_use]
    pub fn query_params(&self) -> &[QueryParam] {
        &self.params
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[must_use]
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// First value for `name`, if present.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.value.as_str())
    }

    /// All values for `name`, in order.
    #[must_use]
    pub fn param_values(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|param| param.name == name)
            .map(|param| param.value.as_str())
            .collect()
    }

    /// Short label for logs: the action name, `list` for list requests.
    #[must_use]
    pub fn label(&self) -> &str {
        if let Some(action) = self.param_value(ACTION_PARAM) {
            return action;
        }
        if self.param_value(LIST_PARAM).is_some() {
            return "list";
        }
        "request"
    }

    /// Paths of attached files.
    pub fn file_paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|part| part.path.as_path())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|param| {
                let value = if param.name == TOKEN_PARAM {
                    REDACTED
                } else {
                    param.value.as_str()
                };
                (param.name.as_str(), value)
            })
            .collect();
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                let value = if name.eq_ignore_ascii_case(COOKIE_HEADER) {
                    REDACTED
                } else {
                    value.as_str()
                };
                (name.as_str(), value)
            })
            .collect();
        f.debug_struct("ApiRequest")
            .field("params", &params)
            .field("headers", &headers)
            .field("files", &self.files)
            .finish()
    }
}
