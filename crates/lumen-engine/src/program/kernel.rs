use crate::device::ComputeContext;

use super::build::device_error_log;
use super::{Program, ProgramError};

/// A compute entry point of a built [`Program`], ready for dispatch.
///
/// Arguments are positional: argument `i` is `@group(0) @binding(i)` of the
/// entry point. Their types are a contract with the kernel author and are not
/// checked here beyond what wgpu validates.
pub struct KernelHandle {
    name: String,
    work_group: [u32; 3],
    pipeline: wgpu::ComputePipeline,
    arguments_layout: wgpu::BindGroupLayout,
}

impl KernelHandle {
    /// Resolves `name` in `program` and creates its compute pipeline.
    pub fn resolve(
        ctx: &ComputeContext,
        program: &Program,
        name: &str,
    ) -> Result<Self, ProgramError> {
        let built = program.built()?;
        let entry = find_entry_point(&built.module, name)?;
        let work_group = entry.workgroup_size;
        check_work_group(name, work_group, ctx.limits())?;

        // Device-side compilation happens here; its failures are build failures.
        let ((pipeline, arguments_layout), error) = ctx.capture_errors(|device| {
            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(name),
                layout: None,
                module: &built.shader,
                entry_point: Some(name),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });
            let layout = pipeline.get_bind_group_layout(0);
            (pipeline, layout)
        });
        if let Some(error) = error {
            log::error!("pipeline creation for '{name}' failed");
            return Err(ProgramError::Build(device_error_log(&error)));
        }

        let handle = Self {
            name: name.to_string(),
            work_group,
            pipeline,
            arguments_layout,
        };
        log::info!("kernel '{}' work group size: {}", handle.name, handle.work_group_size());
        Ok(handle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invocations per work group, as declared by the entry point.
    ///
    /// This is the granularity global work sizes are rounded to.
    pub fn work_group_size(&self) -> u32 {
        work_group_total(self.work_group)
    }

    pub(crate) fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    pub(crate) fn arguments_layout(&self) -> &wgpu::BindGroupLayout {
        &self.arguments_layout
    }
}

pub(crate) fn find_entry_point<'m>(
    module: &'m naga::Module,
    name: &str,
) -> Result<&'m naga::EntryPoint, ProgramError> {
    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.name == name)
        .ok_or_else(|| ProgramError::EntryPointNotFound {
            name: name.to_string(),
            available: module.entry_points.iter().map(|ep| ep.name.clone()).collect(),
        })?;

    if entry.stage != naga::ShaderStage::Compute {
        return Err(ProgramError::NotACompute {
            name: name.to_string(),
        });
    }
    Ok(entry)
}

fn work_group_total(size: [u32; 3]) -> u32 {
    size.iter().fold(1u32, |acc, &d| acc.saturating_mul(d))
}

pub(crate) fn check_work_group(
    name: &str,
    size: [u32; 3],
    limits: &wgpu::Limits,
) -> Result<(), ProgramError> {
    // Override-sized work groups are reported as zero until pipeline creation.
    if size.contains(&0) {
        return Err(ProgramError::NoWorkGroupSize {
            name: name.to_string(),
        });
    }

    let max_dims = [
        limits.max_compute_workgroup_size_x,
        limits.max_compute_workgroup_size_y,
        limits.max_compute_workgroup_size_z,
    ];
    let max_invocations = limits.max_compute_invocations_per_workgroup;

    let dims_ok = size.iter().zip(max_dims.iter()).all(|(d, m)| d <= m);
    if !dims_ok || work_group_total(size) > max_invocations {
        return Err(ProgramError::WorkGroupTooLarge {
            name: name.to_string(),
            size,
            max_invocations,
            max_dims,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use naga::valid::Capabilities;

    use super::super::build::compile_wgsl;
    use super::*;

    const RENDER_KERNEL: &str = include_str!("../../../../render_kernel.wgsl");

    const TWO_ENTRIES: &str = "
@group(0) @binding(0) var<storage, read_write> data: array<u32>;

@compute @workgroup_size(8, 4, 2)
fn fill(@builtin(global_invocation_id) id: vec3<u32>) {
    data[id.x] = id.y;
}

@vertex
fn vs() -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0);
}
";

    #[test]
    fn shipped_kernel_exposes_render_entry_point() {
        let module = compile_wgsl(RENDER_KERNEL, Capabilities::empty()).unwrap_or_else(|log| panic!("{log}"));
        let entry = find_entry_point(&module, "render_kernel").unwrap();
        assert_eq!(entry.workgroup_size, [64, 1, 1]);
    }

    #[test]
    fn missing_entry_point_lists_available_ones() {
        let module = compile_wgsl(TWO_ENTRIES, Capabilities::empty()).unwrap();
        let err = find_entry_point(&module, "render_kernel").unwrap_err();
        match err {
            ProgramError::EntryPointNotFound { name, available } => {
                assert_eq!(name, "render_kernel");
                assert!(available.contains(&"fill".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_compute_entry_point_is_rejected() {
        let module = compile_wgsl(TWO_ENTRIES, Capabilities::empty()).unwrap();
        let err = find_entry_point(&module, "vs").unwrap_err();
        assert!(matches!(err, ProgramError::NotACompute { .. }));
    }

    #[test]
    fn declared_dims_are_reported() {
        let module = compile_wgsl(TWO_ENTRIES, Capabilities::empty()).unwrap();
        let entry = find_entry_point(&module, "fill").unwrap();
        assert_eq!(entry.workgroup_size, [8, 4, 2]);
        assert_eq!(work_group_total(entry.workgroup_size), 64);
    }

    #[test]
    fn work_group_within_limits_passes() {
        let limits = wgpu::Limits::default();
        assert!(check_work_group("k", [64, 1, 1], &limits).is_ok());
        assert!(check_work_group("k", [16, 16, 1], &limits).is_ok());
    }

    #[test]
    fn work_group_over_invocation_limit_fails() {
        let limits = wgpu::Limits {
            max_compute_invocations_per_workgroup: 64,
            ..wgpu::Limits::default()
        };
        let err = check_work_group("k", [16, 8, 1], &limits).unwrap_err();
        assert!(matches!(
            err,
            ProgramError::WorkGroupTooLarge { max_invocations: 64, size: [16, 8, 1], .. }
        ));
    }

    #[test]
    fn work_group_over_dimension_limit_fails() {
        let limits = wgpu::Limits {
            max_compute_workgroup_size_z: 1,
            ..wgpu::Limits::default()
        };
        assert!(check_work_group("k", [4, 4, 2], &limits).is_err());
    }

    #[test]
    fn zero_sized_work_group_is_rejected() {
        let limits = wgpu::Limits::default();
        let err = check_work_group("k", [0, 1, 1], &limits).unwrap_err();
        assert!(matches!(err, ProgramError::NoWorkGroupSize { .. }));
    }
}
