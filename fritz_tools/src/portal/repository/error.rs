//! Error types for portal operations.
//!
//! Every failure carries a structured [`ErrorContext`] naming the operation and
//! the entity involved, so per-row log lines stay self-describing.

use std::fmt;

/// Result type for portal operations
pub type PortalResult<T> = Result<T, PortalError>;

/// Structured context for portal errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The operation being performed (e.g., "create_source", "put_status")
    pub operation: Option<String>,
    /// The entity type involved (e.g., "source", "followup_request")
    pub entity: Option<String>,
    /// The entity ID if applicable
    pub entity_id: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    /// Set the entity type.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Set the entity ID.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.operation.is_none()
            && self.entity.is_none()
            && self.entity_id.is_none()
            && self.details.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for portal operations
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// No token could be resolved, or a settings file is unreadable.
    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    /// Malformed input row, coordinate string or response body.
    #[error("Format error: {message} {context}")]
    FormatError {
        message: String,
        context: ErrorContext,
    },

    /// Wrong value types or out-of-range codes, raised before any remote call.
    #[error("Validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// The portal reports no such entity.
    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// Transport failure, non-success HTTP status or error envelope.
    #[error("Remote error: {message} {context}")]
    RemoteError {
        message: String,
        context: ErrorContext,
    },
}

impl PortalError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::FormatError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Create a format error with context.
    pub fn format_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::FormatError {
            message: message.into(),
            context,
        }
    }

    /// Create a validation error with context.
    pub fn validation_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ValidationError {
            message: message.into(),
            context,
        }
    }

    /// Create a not found error with context.
    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    /// Create a remote error with context.
    pub fn remote_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::RemoteError {
            message: message.into(),
            context,
        }
    }

    /// The bare message, without the context suffix.
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigurationError { message, .. }
            | Self::FormatError { message, .. }
            | Self::ValidationError { message, .. }
            | Self::NotFound { message, .. }
            | Self::RemoteError { message, .. } => message,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConfigurationError { context, .. }
            | Self::FormatError { context, .. }
            | Self::ValidationError { context, .. }
            | Self::NotFound { context, .. }
            | Self::RemoteError { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::ConfigurationError { context, .. }
            | Self::FormatError { context, .. }
            | Self::ValidationError { context, .. }
            | Self::NotFound { context, .. }
            | Self::RemoteError { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }

    /// Add or update the entity id in the error context.
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        match &mut self {
            Self::ConfigurationError { context, .. }
            | Self::FormatError { context, .. }
            | Self::ValidationError { context, .. }
            | Self::NotFound { context, .. }
            | Self::RemoteError { context, .. } => {
                context.entity_id = Some(id.to_string());
            }
        }
        self
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        let details = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_decode() {
            "decode"
        } else {
            "request"
        };
        let mut context = ErrorContext::default().with_details(details);
        if let Some(url) = err.url() {
            context = context.with_entity_id(url.path());
        }
        PortalError::RemoteError {
            message: err.to_string(),
            context,
        }
    }
}

impl From<csv::Error> for PortalError {
    fn from(err: csv::Error) -> Self {
        let context = match err.position() {
            Some(pos) => ErrorContext::default().with_details(format!("line={}", pos.line())),
            None => ErrorContext::default(),
        };
        PortalError::FormatError {
            message: err.to_string(),
            context,
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::format(format!("Invalid JSON: {}", err))
    }
}
