use crate::types::ContentViewId;

// ============================================================================
// Error Types (9200+ range)
// ============================================================================

/// Error codes for shell operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ShellErrorCode {
    /// Content view or platform window could not be created
    CreateFailed = 9200,
    /// No registered shell owns the content view
    ViewNotFound = 9201,
    /// Inbound message payload could not be decoded
    InvalidMessage = 9202,
    /// Application manifest is missing or malformed
    InvalidManifest = 9203,
    /// Shell configuration is malformed
    InvalidConfig = 9204,
    /// Platform window toolkit failure
    Platform = 9205,
}

/// Custom error type for shell operations
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("[{code}] Failed to create shell: {message}")]
    CreateFailed { code: u32, message: String },

    #[error("[{code}] No shell owns content view {view}")]
    ViewNotFound { code: u32, view: ContentViewId },

    #[error("[{code}] Invalid message on channel '{channel}': {message}")]
    InvalidMessage {
        code: u32,
        channel: String,
        message: String,
    },

    #[error("[{code}] Invalid manifest: {message}")]
    InvalidManifest { code: u32, message: String },

    #[error("[{code}] Invalid config: {message}")]
    InvalidConfig { code: u32, message: String },

    #[error("[{code}] Platform error: {message}")]
    Platform { code: u32, message: String },
}

impl ShellError {
    pub fn create_failed(message: impl Into<String>) -> Self {
        Self::CreateFailed {
            code: ShellErrorCode::CreateFailed as u32,
            message: message.into(),
        }
    }

    pub fn view_not_found(view: ContentViewId) -> Self {
        Self::ViewNotFound {
            code: ShellErrorCode::ViewNotFound as u32,
            view,
        }
    }

    pub fn invalid_message(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            code: ShellErrorCode::InvalidMessage as u32,
            channel: channel.into(),
            message: message.into(),
        }
    }

    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            code: ShellErrorCode::InvalidManifest as u32,
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            code: ShellErrorCode::InvalidConfig as u32,
            message: message.into(),
        }
    }

    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            code: ShellErrorCode::Platform as u32,
            message: message.into(),
        }
    }

    /// Numeric code carried by every variant
    pub fn code(&self) -> u32 {
        match self {
            Self::CreateFailed { code, .. }
            | Self::ViewNotFound { code, .. }
            | Self::InvalidMessage { code, .. }
            | Self::InvalidManifest { code, .. }
            | Self::InvalidConfig { code, .. }
            | Self::Platform { code, .. } => *code,
        }
    }
}

pub type Result<T, E = ShellError> = std::result::Result<T, E>;
