//! Lumen engine crate.
//!
//! Host-side dispatch pipeline for a compute-kernel path tracer: device
//! discovery and selection, kernel compilation with diagnostics, scene
//! upload, positional argument binding, work sizing, dispatch and readback.
//!
//! The kernel itself is an external WGSL artifact; this crate only knows its
//! entry-point name and argument order.

pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod ppm;
pub mod program;
pub mod readback;
pub mod resource;
pub mod scene;

pub use config::RenderConfig;
pub use error::RenderError;
pub use pipeline::RenderSession;
