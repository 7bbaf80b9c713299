use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the Real-ESRGAN wrapper.
///
/// Each variant carries the context of its failure domain (validation, download,
/// archive extraction, child process) so `main` can pick an exit code and print a
/// message without parsing error strings.
#[derive(Error, Debug)]
pub enum UpscaleError {
    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },

    #[error("Unsupported OS: {os}")]
    UnsupportedPlatform { os: String },

    #[error("Download error: failed to fetch {url}")]
    Download {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {operation} failed for {path:?}")]
    Archive {
        path: PathBuf,
        operation: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Unsafe archive entry {entry:?}: resolves outside {root:?}")]
    UnsafeArchiveEntry { entry: String, root: PathBuf },

    #[error("Real-ESRGAN binary {name} not found in {dir:?}")]
    BinaryNotFound { name: String, dir: PathBuf },

    #[error("Failed to launch {binary:?}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Real-ESRGAN failed with exit code {code}")]
    ChildFailed { code: i32 },

    #[error("Real-ESRGAN was terminated before it could exit")]
    ChildTerminated,
}

pub type Result<T> = std::result::Result<T, UpscaleError>;

impl UpscaleError {
    /// Process exit code reported for this error.
    ///
    /// A failing child keeps its own code; everything else is a plain `1`.
    /// Codes outside `1..=255` (possible on Windows) collapse to `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ChildFailed { code } => u8::try_from(*code)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Fallback for I/O errors raised without path/operation context. Code that
/// knows which file it was touching should build `UpscaleError::FileSystem`
/// directly.
impl From<std::io::Error> for UpscaleError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}
