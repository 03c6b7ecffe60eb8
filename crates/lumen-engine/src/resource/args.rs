use wgpu::util::DeviceExt;

use crate::device::ComputeContext;
use crate::program::KernelHandle;

use super::{OutputBuffer, ResourceError, SceneBuffer};

/// Positional argument indices of the render entry point.
///
/// Argument `i` is `@group(0) @binding(i)` in the kernel source.
pub const ARG_SCENE: u32 = 0;
pub const ARG_WIDTH: u32 = 1;
pub const ARG_HEIGHT: u32 = 2;
pub const ARG_OBJECT_COUNT: u32 = 3;
pub const ARG_OUTPUT: u32 = 4;

/// Highest number of positional arguments accepted before a device is known.
///
/// Matches wgpu's default `max_bindings_per_bind_group`; [`KernelArgs::bind`]
/// checks the device's own limit.
pub const MAX_KERNEL_ARGS: u32 = 1000;

/// Size of the uniform buffer backing one scalar argument.
const SCALAR_SLOT_SIZE: usize = 16;

/// One positional kernel argument.
#[derive(Debug, Clone, Copy)]
pub enum KernelArg<'a> {
    /// Bound as a storage buffer.
    Buffer(&'a wgpu::Buffer),
    /// Bound as a `var<uniform> name: u32`.
    Scalar(u32),
}

/// Positional argument list, filled with [`set_arg`](Self::set_arg) in any
/// order and bound in one step.
#[derive(Debug, Default)]
pub struct KernelArgs<'a> {
    slots: Vec<Option<KernelArg<'a>>>,
}

impl<'a> KernelArgs<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets argument `index`, replacing any previous value.
    pub fn set_arg(&mut self, index: u32, arg: KernelArg<'a>) -> Result<&mut Self, ResourceError> {
        if index >= MAX_KERNEL_ARGS {
            return Err(ResourceError::ArgumentIndexOutOfRange {
                index,
                max: MAX_KERNEL_ARGS,
            });
        }

        let index = index as usize;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(arg);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// First index below the highest set argument that has no value.
    pub fn first_missing(&self) -> Option<u32> {
        self.slots.iter().position(Option::is_none).map(|i| i as u32)
    }

    /// Creates the bind group for `kernel` from the argument list.
    pub fn bind(
        &self,
        ctx: &ComputeContext,
        kernel: &KernelHandle,
    ) -> Result<BoundArguments, ResourceError> {
        if let Some(index) = self.first_missing() {
            return Err(ResourceError::MissingArgument { index });
        }

        let max = ctx.limits().max_bindings_per_bind_group;
        if self.slots.len() > max as usize {
            return Err(ResourceError::ArgumentIndexOutOfRange {
                index: (self.slots.len() - 1) as u32,
                max,
            });
        }

        let resolved: Vec<Resolved<'a>> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|arg| (i, arg)))
            .map(|(i, arg)| match arg {
                KernelArg::Buffer(buffer) => Resolved::Borrowed(buffer),
                KernelArg::Scalar(value) => Resolved::Owned(scalar_buffer(ctx, i, value)),
            })
            .collect();

        let entries: Vec<wgpu::BindGroupEntry<'_>> = resolved
            .iter()
            .enumerate()
            .map(|(i, r)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: r.buffer().as_entire_binding(),
            })
            .collect();

        let (bind_group, error) = ctx.capture_errors(|device| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(kernel.name()),
                layout: kernel.arguments_layout(),
                entries: &entries,
            })
        });
        if let Some(error) = error {
            return Err(ResourceError::Binding {
                kernel: kernel.name().to_string(),
                message: error.to_string(),
            });
        }
        log::debug!("bound {} arguments to '{}'", entries.len(), kernel.name());

        let scalars = resolved
            .into_iter()
            .filter_map(|r| match r {
                Resolved::Owned(buffer) => Some(buffer),
                Resolved::Borrowed(_) => None,
            })
            .collect();

        Ok(BoundArguments {
            bind_group,
            _scalars: scalars,
        })
    }
}

enum Resolved<'a> {
    Borrowed(&'a wgpu::Buffer),
    Owned(wgpu::Buffer),
}

impl Resolved<'_> {
    fn buffer(&self) -> &wgpu::Buffer {
        match self {
            Resolved::Borrowed(buffer) => buffer,
            Resolved::Owned(buffer) => buffer,
        }
    }
}

fn scalar_buffer(ctx: &ComputeContext, index: usize, value: u32) -> wgpu::Buffer {
    let contents: [u32; SCALAR_SLOT_SIZE / 4] = [value, 0, 0, 0];
    ctx.device()
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("lumen scalar arg {index}")),
            contents: bytemuck::bytes_of(&contents),
            usage: wgpu::BufferUsages::UNIFORM,
        })
}

/// Arguments bound to a kernel, plus the scalar buffers they reference.
pub struct BoundArguments {
    bind_group: wgpu::BindGroup,
    _scalars: Vec<wgpu::Buffer>,
}

impl BoundArguments {
    pub(crate) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Fills the render entry point's arguments in their fixed order.
pub fn render_arguments<'a>(
    scene: &'a SceneBuffer,
    width: u32,
    height: u32,
    object_count: u32,
    output: &'a OutputBuffer,
) -> Result<KernelArgs<'a>, ResourceError> {
    let mut args = KernelArgs::new();
    args.set_arg(ARG_SCENE, KernelArg::Buffer(scene.buffer()))?
        .set_arg(ARG_WIDTH, KernelArg::Scalar(width))?
        .set_arg(ARG_HEIGHT, KernelArg::Scalar(height))?
        .set_arg(ARG_OBJECT_COUNT, KernelArg::Scalar(object_count))?
        .set_arg(ARG_OUTPUT, KernelArg::Buffer(output.buffer()))?;
    Ok(args)
}

/// Binds scene, width, height, object count and output to `kernel`.
pub fn bind_arguments(
    ctx: &ComputeContext,
    kernel: &KernelHandle,
    scene: &SceneBuffer,
    width: u32,
    height: u32,
    object_count: u32,
    output: &OutputBuffer,
) -> Result<BoundArguments, ResourceError> {
    render_arguments(scene, width, height, object_count, output)?.bind(ctx, kernel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_can_be_set_out_of_order() {
        let mut args = KernelArgs::new();
        args.set_arg(2, KernelArg::Scalar(7))
            .unwrap()
            .set_arg(0, KernelArg::Scalar(1))
            .unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args.first_missing(), Some(1));

        args.set_arg(1, KernelArg::Scalar(4)).unwrap();
        assert_eq!(args.first_missing(), None);
    }

    #[test]
    fn set_arg_replaces_previous_value() {
        let mut args = KernelArgs::new();
        args.set_arg(0, KernelArg::Scalar(1))
            .unwrap()
            .set_arg(0, KernelArg::Scalar(9))
            .unwrap();
        assert_eq!(args.len(), 1);
        assert!(matches!(args.slots[0], Some(KernelArg::Scalar(9))));
    }

    #[test]
    fn render_argument_indices_are_contiguous() {
        let mut indices = [ARG_SCENE, ARG_WIDTH, ARG_HEIGHT, ARG_OBJECT_COUNT, ARG_OUTPUT];
        indices.sort_unstable();
        assert_eq!(indices, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn out_of_range_index_is_rejected_without_growing() {
        let mut args = KernelArgs::new();
        let err = args.set_arg(u32::MAX, KernelArg::Scalar(1)).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::ArgumentIndexOutOfRange { index: u32::MAX, max: MAX_KERNEL_ARGS }
        ));
        assert!(args.is_empty());

        assert!(args.set_arg(MAX_KERNEL_ARGS, KernelArg::Scalar(1)).is_err());
        assert!(args.set_arg(MAX_KERNEL_ARGS - 1, KernelArg::Scalar(1)).is_ok());
        assert_eq!(args.len(), MAX_KERNEL_ARGS as usize);
    }
}
