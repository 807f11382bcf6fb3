/// Crate-level error types for orgref diagnostics.
use std::path::PathBuf;

/// Errors surfaced by the CLI layer. Each variant names the file or
/// reason, enough for a useful diagnostic without a debugger.
///
/// Resolution itself has no error class: a reference that cannot be
/// resolved degrades to the deepest level reached and the literal text
/// stays in the message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Platform configuration exists but does not describe an
    /// organization tree.
    #[error("config invalid: {}: {reason}", path.display())]
    ConfigInvalid {
        /// Path to the malformed configuration file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The platform configuration file does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing configuration file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Settings file deserialization failed.
    #[error("settings deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
