use std::io;
use std::path::PathBuf;

use crate::device::{CatalogError, ContextError};
use crate::dispatch::DispatchError;
use crate::program::ProgramError;
use crate::readback::ReadbackError;
use crate::resource::ResourceError;

/// Any fatal failure of the render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Readback(#[from] ReadbackError),

    #[error("failed to write image '{}'", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
