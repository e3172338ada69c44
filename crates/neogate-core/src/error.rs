use serde::Serialize;

// ==============================================================================
// RPC Errors
// ==============================================================================

/// Failures talking to a Neo node, before any domain interpretation.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON-RPC error {code}: {message}")]
    ServerError { code: i64, message: String },

    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("cannot build RPC client: {0}")]
    Client(String),
}

impl RpcError {
    /// Connection-level failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_connect() || err.is_timeout() || err.is_request(),
            Self::Unavailable(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::ServerError { .. } | Self::InvalidResponse(_) | Self::Client(_) => false,
        }
    }
}

// ==============================================================================
// Service Errors
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NeoError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("network error: {0}")]
    Network(#[from] RpcError),

    #[error("contract error: {message}")]
    Contract {
        message: String,
        /// VM exception text when the failure came from a FAULT state.
        exception: Option<String>,
    },

    #[error("transaction rejected: {0}")]
    Transaction(String),

    #[error("rate limit exceeded for `{key}`; retry in {retry_after_ms}ms")]
    RateLimited { key: String, retry_after_ms: u64 },

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl NeoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
            exception: None,
        }
    }

    /// A VM FAULT, keeping the exception text reported by the node.
    pub fn vm_fault(exception: Option<String>) -> Self {
        let text = exception
            .clone()
            .unwrap_or_else(|| "execution faulted without an exception message".to_owned());
        Self::Contract {
            message: format!("VM FAULT: {text}"),
            exception,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Contract { .. } => ErrorKind::Contract,
            Self::Transaction(_) => ErrorKind::Transaction,
            Self::RateLimited { .. } => ErrorKind::RateLimit,
            Self::Wallet(_) => ErrorKind::Wallet,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether retrying the same call could succeed. Only transient
    /// transport failures qualify; everything else is deterministic.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(err) if err.is_transient())
    }

    /// Convert into the uniform boundary shape.
    pub fn to_body(&self) -> ErrorBody {
        let detail = match self {
            Self::Contract {
                exception: Some(exception),
                ..
            } => Some(serde_json::json!({ "exception": exception })),
            Self::RateLimited {
                key,
                retry_after_ms,
            } => Some(serde_json::json!({ "key": key, "retry_after_ms": retry_after_ms })),
            Self::Network(RpcError::ServerError { code, .. }) => {
                Some(serde_json::json!({ "rpc_code": code }))
            }
            Self::Network(RpcError::HttpStatus { status, .. }) => {
                Some(serde_json::json!({ "http_status": status }))
            }
            _ => None,
        };

        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            detail,
        }
    }
}

// ==============================================================================
// Boundary Shape
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "ValidationError")]
    Validation,
    #[serde(rename = "NetworkError")]
    Network,
    #[serde(rename = "ContractError")]
    Contract,
    #[serde(rename = "TransactionError")]
    Transaction,
    #[serde(rename = "RateLimitError")]
    RateLimit,
    #[serde(rename = "WalletError")]
    Wallet,
    #[serde(rename = "InternalError")]
    Internal,
}

impl ErrorKind {
    /// Callers may retry these after backing off. The rest are terminal.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::Network)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "ValidationError",
            Self::Network => "NetworkError",
            Self::Contract => "ContractError",
            Self::Transaction => "TransactionError",
            Self::RateLimit => "RateLimitError",
            Self::Wallet => "WalletError",
            Self::Internal => "InternalError",
        };
        f.write_str(name)
    }
}

/// `{kind, message, detail?}` as seen by every collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}
