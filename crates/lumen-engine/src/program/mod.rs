//! Kernel source loading, compilation and entry-point resolution.

mod build;
mod error;
mod kernel;
mod source;

pub use build::{report_build_failure, BuildLog, Program, ProgramState};
pub use error::ProgramError;
pub use kernel::KernelHandle;
pub use source::load_source;
