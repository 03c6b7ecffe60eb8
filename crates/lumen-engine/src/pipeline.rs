//! The pipeline owner: one value holding every device-side object of a run.
//!
//! Stages run strictly in order: upload, bind, enqueue, wait, readback. Each
//! blocking stage returns only after the device confirms completion. Every
//! resource is released by scope, on success and on every error path.

use std::io::{self, Write};
use std::path::Path;

use crate::config::RenderConfig;
use crate::device::{ComputeContext, ContextInit, SelectedDevice};
use crate::dispatch::{compute_work_sizing, enqueue};
use crate::error::RenderError;
use crate::program::{report_build_failure, KernelHandle, Program, ProgramError};
use crate::readback::{readback, Frame};
use crate::resource::{bind_arguments, OutputBuffer, ResourceError, SceneBuffer};
use crate::scene::SceneObject;

/// A compiled kernel on a live device, ready to render.
///
/// # Field drop order
/// `context` is declared last so the kernel and program are released before
/// the device they were created on.
pub struct RenderSession {
    config: RenderConfig,
    kernel: KernelHandle,
    _program: Program,
    context: ComputeContext,
}

impl RenderSession {
    /// Creates the context, then loads, builds and resolves the kernel.
    ///
    /// On a build failure the log is echoed to stderr and persisted at
    /// `config.build_log_path` before the error is returned; nothing is
    /// allocated on the device.
    pub fn open(
        selected: SelectedDevice,
        init: &ContextInit,
        config: RenderConfig,
    ) -> Result<Self, RenderError> {
        let context = ComputeContext::create(selected, init)?;
        Self::with_context(context, config, &mut io::stderr().lock())
    }

    /// Like [`open`](Self::open) on an existing context, echoing build
    /// diagnostics to `diagnostics`.
    pub fn with_context<W: Write>(
        context: ComputeContext,
        config: RenderConfig,
        diagnostics: &mut W,
    ) -> Result<Self, RenderError> {
        let mut program = Program::load(&config.kernel_path)?;

        // Device-side compilation finishes at pipeline creation, so a failed
        // resolve can also carry a build log.
        let kernel = program
            .build(&context)
            .and_then(|()| KernelHandle::resolve(&context, &program, &config.entry_point))
            .map_err(|err| persist_build_log(err, &config.build_log_path, diagnostics))?;

        Ok(Self {
            config,
            kernel,
            _program: program,
            context,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders `scene` at the configured size and returns the host image.
    pub fn render(&self, scene: &[SceneObject]) -> Result<Frame, RenderError> {
        let ctx = &self.context;
        let (width, height) = (self.config.width, self.config.height);

        let object_count = u32::try_from(scene.len()).map_err(|_| ResourceError::CountOverflow {
            what: "scene object",
            count: scene.len(),
        })?;

        let output = OutputBuffer::allocate(ctx, width, height)?;
        let scene_buffer = SceneBuffer::allocate(ctx, scene.len())?;
        scene_buffer.upload(ctx, scene)?;

        let args = bind_arguments(
            ctx,
            &self.kernel,
            &scene_buffer,
            width,
            height,
            object_count,
            &output,
        )?;

        let sizing = compute_work_sizing(width, height, self.kernel.work_group_size());
        log::info!(
            "rendering started: {width}x{height}, {object_count} objects, {} work items",
            sizing.global
        );

        let done = enqueue(ctx, &self.kernel, &args, sizing)?.wait(ctx)?;
        log::info!("rendering done, copying output from device to host");

        Ok(readback(ctx, &output, &done)?)
    }

    /// Renders `scene` and writes the image to `config.output_path`.
    pub fn render_to_file(&self, scene: &[SceneObject]) -> Result<Frame, RenderError> {
        let frame = self.render(scene)?;
        let path = &self.config.output_path;
        frame.save_ppm(path).map_err(|source| RenderError::Output {
            path: path.clone(),
            source,
        })?;
        log::info!("saved image to '{}'", path.display());
        Ok(frame)
    }
}

fn persist_build_log<W: Write>(err: ProgramError, path: &Path, diagnostics: &mut W) -> ProgramError {
    if let ProgramError::Build(log) = &err {
        if let Err(io_err) = report_build_failure(log, path, diagnostics) {
            log::error!("could not save build log to '{}': {io_err}", path.display());
        }
    }
    err
}
