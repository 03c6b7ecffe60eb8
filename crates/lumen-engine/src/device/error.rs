use std::io;

/// Errors raised while enumerating platforms and devices.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No backend exposes a compute-capable adapter.
    #[error("no compute platform found (no wgpu backend exposes an adapter)")]
    NoPlatforms,

    #[error("platform '{platform}' exposes no devices")]
    NoDevices { platform: String },

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Errors raised by the interactive selection prompt.
///
/// Malformed or out-of-range answers are not errors: the prompt asks again.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no {what} to choose from")]
    NoCandidates { what: &'static str },

    /// Input reached end-of-stream before a valid answer was given.
    #[error("input closed before a {what} was chosen")]
    InputClosed { what: &'static str },

    #[error("selection prompt I/O failed")]
    Io(#[from] io::Error),
}

/// Errors raised while binding a device to a context and queue.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("device id {0} is not part of this catalog")]
    UnknownDevice(usize),

    /// The driver rejected the device. No fallback device is attempted.
    #[error("device request failed for '{device}'")]
    DeviceRequest {
        device: String,
        #[source]
        source: wgpu::RequestDeviceError,
    },
}

/// A blocking wait on the device timeline did not complete.
#[derive(Debug, thiserror::Error)]
#[error("device wait failed: {message}")]
pub struct WaitError {
    pub message: String,
}
