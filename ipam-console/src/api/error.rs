//! Failure taxonomy for calls against the inventory API

/// Error returned by every inventory API call
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be sent or the response could not be received
    Network(reqwest::Error),
    /// The server refused the supplied credentials (401/403)
    AuthRejected { status: u16 },
    /// Any other non-success status; the body is kept for the operator
    BadStatus { status: u16, body: String },
    /// The response body did not decode into the expected structure
    Decode(String),
}

impl ApiError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::AuthRejected { status },
            _ => ApiError::BadStatus { status, body },
        }
    }

    /// Status code carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthRejected { status } | ApiError::BadStatus { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, ApiError::AuthRejected { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "Network failure: {}", e),
            ApiError::AuthRejected { status } => {
                write!(f, "Credentials rejected by the inventory API (HTTP {})", status)
            }
            ApiError::BadStatus { status, body } => {
                if body.trim().is_empty() {
                    write!(f, "Inventory API answered HTTP {}", status)
                } else {
                    write!(f, "Inventory API answered HTTP {}: {}", status, body.trim())
                }
            }
            ApiError::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_are_rejections() {
        assert!(ApiError::from_status(401, String::new()).is_auth_rejected());
        assert!(ApiError::from_status(403, "forbidden".into()).is_auth_rejected());
        assert!(!ApiError::from_status(500, String::new()).is_auth_rejected());
    }

    #[test]
    fn test_bad_status_keeps_body() {
        let err = ApiError::from_status(400, "{\"name\":[\"required\"]}".into());
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "Inventory API answered HTTP 400: {\"name\":[\"required\"]}"
        );
    }

    #[test]
    fn test_decode_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ApiError::from(serde_err);
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.status(), None);
    }
}
