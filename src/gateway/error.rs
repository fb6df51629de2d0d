// ABOUTME: Errors reported by Cluster Gateway implementations.
// ABOUTME: Variants map onto failure categories; Api carries raw client output.

/// Errors from cluster gateway operations.
///
/// Implementations should pick the most specific variant they can. Raw client
/// output that does not fit goes in [`GatewayError::Api`] and is classified by text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("unable to connect to cluster: {0}")]
    Connection(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("exceeded quota: {0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    Api(String),
}

impl GatewayError {
    /// Shorthand for a missing object of the given kind.
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        GatewayError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Whether the error says the target object does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            GatewayError::NotFound { .. } => true,
            GatewayError::Api(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("not found") || msg.contains("no resources found")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_kind() {
        let err = GatewayError::not_found("namespace", "staging");
        assert_eq!(err.to_string(), "namespace \"staging\" not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn raw_output_can_be_not_found() {
        let err = GatewayError::Api("No resources found in web namespace.".to_string());
        assert!(err.is_not_found());
        assert!(!GatewayError::Timeout("slow".to_string()).is_not_found());
    }
}
