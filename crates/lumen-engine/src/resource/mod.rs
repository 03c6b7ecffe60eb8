//! Device buffers and positional kernel-argument binding.

mod args;
mod buffers;
mod error;

pub use args::{
    bind_arguments, render_arguments, BoundArguments, KernelArg, KernelArgs, ARG_HEIGHT,
    ARG_OBJECT_COUNT, ARG_OUTPUT, ARG_SCENE, ARG_WIDTH, MAX_KERNEL_ARGS,
};
pub use buffers::{OutputBuffer, SceneBuffer};
pub use error::ResourceError;
