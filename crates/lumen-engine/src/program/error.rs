use std::io;
use std::path::PathBuf;

use super::BuildLog;

/// Errors raised while loading, compiling and resolving the kernel.
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    /// The kernel source artifact is absent. There is no embedded fallback.
    #[error("kernel source not found at '{}'", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("kernel source at '{}' could not be read", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Compilation failed; the log carries the full diagnostic text.
    #[error("kernel compilation failed")]
    Build(BuildLog),

    #[error("program '{label}' has not been built")]
    NotBuilt { label: String },

    #[error("entry point '{name}' not found in program (available: {})", available.join(", "))]
    EntryPointNotFound { name: String, available: Vec<String> },

    #[error("entry point '{name}' is not a compute entry point")]
    NotACompute { name: String },

    #[error("entry point '{name}' does not declare a fixed work group size")]
    NoWorkGroupSize { name: String },

    #[error(
        "work group {size:?} of '{name}' exceeds device limits \
         ({max_invocations} invocations, {max_dims:?} per dimension)"
    )]
    WorkGroupTooLarge {
        name: String,
        size: [u32; 3],
        max_invocations: u32,
        max_dims: [u32; 3],
    },
}
