use crate::device::WaitError;

/// Errors raised while allocating, filling and binding device buffers.
///
/// Sizes are deterministic for a given image and scene, so none of these is
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("image has zero pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("scene has no objects")]
    EmptyScene,

    #[error("{what} count {count} does not fit the kernel's 32-bit argument")]
    CountOverflow { what: &'static str, count: usize },

    #[error("{label} needs {size} bytes, device allows at most {max}")]
    BufferTooLarge {
        label: &'static str,
        size: u64,
        max: u64,
    },

    #[error("upload of {len} objects into a buffer sized for {capacity}")]
    UploadOverflow { len: usize, capacity: usize },

    #[error("kernel argument {index} was never set")]
    MissingArgument { index: u32 },

    #[error("kernel argument index {index} is out of range (at most {max} arguments)")]
    ArgumentIndexOutOfRange { index: u32, max: u32 },

    /// The device rejected the argument list for the kernel's layout.
    #[error("binding arguments to '{kernel}' failed: {message}")]
    Binding { kernel: String, message: String },

    #[error(transparent)]
    Wait(#[from] WaitError),
}
