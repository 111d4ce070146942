//! Transport outcome model consumed by the classifier.
//!
//! The transport layer is an external collaborator: it reduces whatever it
//! received into a [`Response`] tagged with a closed [`Classification`].

use serde::{Deserialize, Serialize};

/// Closed set of outcome tags a transport result is reduced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    Success,
    ApiError,
    UnauthorizedError,
    NetworkError,
    ParsingError,
    ServerError,
    NoInternetError,
    /// Nothing recognisable came back.
    #[default]
    #[serde(rename = "none")]
    Unclassified,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::ApiError => "apiError",
            Classification::UnauthorizedError => "unauthorizedError",
            Classification::NetworkError => "networkError",
            Classification::ParsingError => "parsingError",
            Classification::ServerError => "serverError",
            Classification::NoInternetError => "noInternetError",
            Classification::Unclassified => "none",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified transport outcome.
///
/// `payload` is only meaningful when `classification` is
/// [`Classification::Success`]; `error_messages` feeds API error text and
/// `exception_message` feeds the network/parsing narratives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<P> {
    #[serde(default)]
    pub classification: Classification,
    pub payload: Option<P>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub exception_message: String,
}

impl<P> Response<P> {
    pub fn success(payload: P) -> Self {
        Self {
            classification: Classification::Success,
            payload: Some(payload),
            status_code: Some(200),
            error_messages: Vec::new(),
            exception_message: String::new(),
        }
    }

    /// API-level rejection carrying the server's messages.
    pub fn api_error(status_code: Option<u16>, error_messages: Vec<String>) -> Self {
        Self {
            classification: Classification::ApiError,
            payload: None,
            status_code,
            error_messages,
            exception_message: String::new(),
        }
    }

    /// Non-API failure (network, parsing, server, connectivity...).
    pub fn failure(classification: Classification, exception_message: impl Into<String>) -> Self {
        Self {
            classification,
            payload: None,
            status_code: None,
            error_messages: Vec::new(),
            exception_message: exception_message.into(),
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// First non-empty server message, if any.
    pub fn first_message(&self) -> Option<&str> {
        self.error_messages
            .iter()
            .map(String::as_str)
            .find(|m| !m.trim().is_empty())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401) || self.classification == Classification::UnauthorizedError
    }
}
