// ── Core error types ──
//
// Collection-level errors. Consumers never match on HTTP details; the
// `From<meraki_api::Error>` impl folds transport failures into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the Dashboard API: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Collection errors ────────────────────────────────────────────
    /// A source whose failure aborts the whole collection.
    #[error("Required source '{source_name}' failed: {message}")]
    SourceFailed {
        source_name: &'static str,
        message: String,
    },

    #[error("Organization not found: {org_id}")]
    OrganizationNotFound { org_id: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap a failure of a required source.
    pub fn source_failed(source_name: &'static str, err: &CoreError) -> Self {
        CoreError::SourceFailed {
            source_name,
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<meraki_api::Error> for CoreError {
    fn from(err: meraki_api::Error) -> Self {
        match err {
            meraki_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            meraki_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            meraki_api::Error::Forbidden { message } => CoreError::Api {
                message: format!("Access forbidden: {message}"),
                status: Some(403),
            },
            meraki_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            meraki_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            meraki_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            meraki_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            meraki_api::Error::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            meraki_api::Error::Api { message, status } => CoreError::Api {
                message,
                status: Some(status),
            },
            meraki_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;

    #[test]
    fn invalid_key_becomes_authentication_failure() {
        let err = CoreError::from(meraki_api::Error::InvalidApiKey);
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn api_status_is_preserved() {
        let err = CoreError::from(meraki_api::Error::Api {
            message: "boom".into(),
            status: 500,
        });
        assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    }

    #[test]
    fn source_failure_names_the_source() {
        let inner = CoreError::Timeout { timeout_secs: 60 };
        let err = CoreError::source_failed("switch_port_tags", &inner);
        assert_eq!(
            err.to_string(),
            "Required source 'switch_port_tags' failed: Timed out after 60s"
        );
    }
}
