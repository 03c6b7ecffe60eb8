//! Device-to-host copies.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;

use bytemuck::Pod;

use crate::device::{ComputeContext, WaitError};
use crate::dispatch::DispatchComplete;
use crate::ppm;
use crate::resource::OutputBuffer;
use crate::scene::ColorRecord;

/// Errors raised while copying device memory back to the host.
#[derive(Debug, thiserror::Error)]
pub enum ReadbackError {
    #[error("mapping the readback buffer failed")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("readback map callback was dropped without firing")]
    CallbackDropped,

    #[error(transparent)]
    Wait(#[from] WaitError),
}

/// The rendered image in host memory, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<ColorRecord>,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[ColorRecord] {
        &self.pixels
    }

    /// Writes the frame as a plain-text PPM.
    pub fn write_ppm<W: Write>(&self, out: W) -> io::Result<()> {
        ppm::write_ppm(out, self.width, self.height, &self.pixels)
    }

    /// Writes the frame as a plain-text PPM file at `path`.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        self.write_ppm(&mut out)?;
        out.flush()
    }
}

/// Copies the output image to a freshly allocated host array.
///
/// Takes a [`DispatchComplete`] so the copy can only be issued after the
/// kernel that writes `output` has finished.
pub fn readback(
    ctx: &ComputeContext,
    output: &OutputBuffer,
    _done: &DispatchComplete,
) -> Result<Frame, ReadbackError> {
    let pixels = read_buffer::<ColorRecord>(ctx, output.buffer(), output.len())?;
    log::debug!("read back {} pixels", pixels.len());
    Ok(Frame {
        width: output.width(),
        height: output.height(),
        pixels,
    })
}

/// Blocking copy of the first `count` elements of `source` into a new `Vec`.
///
/// `source` needs `COPY_SRC` usage.
pub fn read_buffer<T: Pod>(
    ctx: &ComputeContext,
    source: &wgpu::Buffer,
    count: usize,
) -> Result<Vec<T>, ReadbackError> {
    let size = (count * std::mem::size_of::<T>()) as u64;
    let mut out = vec![T::zeroed(); count];
    if size == 0 {
        return Ok(out);
    }

    let staging = ctx.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("lumen readback staging"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen readback encoder"),
        });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
    ctx.submit_and_wait(std::iter::once(encoder.finish()))?;

    let slice = staging.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        // The receiver only disappears if this function already returned.
        let _ = sender.send(result);
    });

    // Drives the map callback.
    ctx.wait_idle()?;
    receiver.recv().map_err(|_| ReadbackError::CallbackDropped)??;

    {
        let mapped = slice.get_mapped_range();
        // Copy through bytes: the mapping carries no alignment guarantee for T.
        bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(&mapped);
    }
    staging.unmap();

    Ok(out)
}
