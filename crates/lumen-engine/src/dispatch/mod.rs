//! Work sizing and kernel submission.
//!
//! One work item per output pixel. The total is rounded up to a whole number
//! of work groups; the kernel is responsible for ignoring work items whose
//! index is at or beyond `width * height`.

use crate::device::{ComputeContext, WaitError};
use crate::program::KernelHandle;
use crate::resource::BoundArguments;

/// Global/local work sizes of one dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WorkSizing {
    /// Total work items, a multiple of `local`.
    pub global: u64,
    /// Work items per work group.
    pub local: u32,
}

impl WorkSizing {
    /// Number of work groups covering `global`.
    pub fn groups(&self) -> u64 {
        self.global / u64::from(self.local)
    }
}

/// Rounds `width * height` up to the next multiple of `local`.
///
/// Guarantees `global >= width * height`, `global % local == 0` and
/// `global < width * height + local`. A `local` of zero is treated as one.
pub fn compute_work_sizing(width: u32, height: u32, local: u32) -> WorkSizing {
    let local = local.max(1);
    let pixels = u64::from(width) * u64::from(height);
    let group = u64::from(local);

    let global = if pixels % group == 0 {
        pixels
    } else {
        (pixels / group + 1) * group
    };

    WorkSizing { global, local }
}

/// Work-group grid actually dispatched.
///
/// A dispatch dimension holds at most `max_compute_workgroups_per_dimension`
/// groups, so long rows of groups are folded into a second dimension. The
/// kernel linearizes `workgroup_id` back into a flat work-item index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DispatchGrid {
    pub x: u32,
    pub y: u32,
}

impl DispatchGrid {
    pub fn groups(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y)
    }
}

/// Folds `sizing` into a grid no wider than `max_per_dimension` in x or y.
pub fn dispatch_grid(
    sizing: WorkSizing,
    max_per_dimension: u32,
) -> Result<DispatchGrid, DispatchError> {
    let groups = sizing.groups();
    let max = u64::from(max_per_dimension.max(1));

    if groups <= max {
        return Ok(DispatchGrid {
            x: groups as u32,
            y: 1,
        });
    }

    let rows = groups.div_ceil(max);
    if rows > max {
        return Err(DispatchError::GridTooLarge {
            groups,
            max_per_dimension,
        });
    }

    Ok(DispatchGrid {
        x: max as u32,
        y: rows as u32,
    })
}

/// Errors raised while submitting or awaiting a dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{groups} work groups exceed a {max_per_dimension}x{max_per_dimension} dispatch grid")]
    GridTooLarge { groups: u64, max_per_dimension: u32 },

    #[error(transparent)]
    Wait(#[from] WaitError),
}

/// A submitted dispatch that has not been confirmed complete.
#[must_use = "a dispatch must be waited on before its output is read"]
pub struct PendingDispatch {
    submission: wgpu::SubmissionIndex,
    sizing: WorkSizing,
}

impl PendingDispatch {
    /// Blocks until the device reports the dispatch complete.
    pub fn wait(self, ctx: &ComputeContext) -> Result<DispatchComplete, DispatchError> {
        ctx.wait_for(self.submission)?;
        Ok(DispatchComplete {
            sizing: self.sizing,
        })
    }
}

/// Proof that a dispatch finished; required to read its output back.
#[derive(Debug)]
pub struct DispatchComplete {
    sizing: WorkSizing,
}

impl DispatchComplete {
    pub fn sizing(&self) -> WorkSizing {
        self.sizing
    }
}

/// Submits `kernel` over `sizing` with `args`. Returns without waiting.
pub fn enqueue(
    ctx: &ComputeContext,
    kernel: &KernelHandle,
    args: &BoundArguments,
    sizing: WorkSizing,
) -> Result<PendingDispatch, DispatchError> {
    let grid = dispatch_grid(sizing, ctx.limits().max_compute_workgroups_per_dimension)?;
    log::debug!(
        "dispatching '{}': global {}, local {}, grid {}x{}",
        kernel.name(),
        sizing.global,
        sizing.local,
        grid.x,
        grid.y
    );

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen dispatch encoder"),
        });

    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(kernel.name()),
            timestamp_writes: None,
        });
        pass.set_pipeline(kernel.pipeline());
        pass.set_bind_group(0, args.bind_group(), &[]);
        pass.dispatch_workgroups(grid.x, grid.y, 1);
    }

    let submission = ctx.queue().submit(std::iter::once(encoder.finish()));
    Ok(PendingDispatch { submission, sizing })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_is_unchanged() {
        let s = compute_work_sizing(16, 4, 64);
        assert_eq!(s, WorkSizing { global: 64, local: 64 });
        assert_eq!(s.groups(), 1);
    }

    #[test]
    fn remainder_rounds_up_one_group() {
        // 1280x720 = 921600 = 3600 * 256, exact; 4x2 = 8 needs one group of 64.
        assert_eq!(compute_work_sizing(1280, 720, 256).global, 921_600);
        assert_eq!(compute_work_sizing(4, 2, 64).global, 64);
        assert_eq!(compute_work_sizing(100, 3, 64).global, 320);
    }

    #[test]
    fn zero_local_is_treated_as_one() {
        let s = compute_work_sizing(3, 3, 0);
        assert_eq!(s, WorkSizing { global: 9, local: 1 });
    }

    #[test]
    fn sizing_properties_hold_on_a_grid() {
        for local in [1u32, 2, 3, 7, 32, 64, 96, 128, 256, 1024] {
            for width in 0..40u32 {
                for height in 0..12u32 {
                    let s = compute_work_sizing(width, height, local);
                    let p = u64::from(width) * u64::from(height);
                    let l = u64::from(local);
                    assert!(s.global >= p, "{width}x{height}/{local}: {s:?}");
                    assert_eq!(s.global % l, 0, "{width}x{height}/{local}: {s:?}");
                    assert!(s.global < p + l, "{width}x{height}/{local}: {s:?}");
                }
            }
        }
    }

    #[test]
    fn sizing_does_not_overflow_for_large_images() {
        let s = compute_work_sizing(u32::MAX, u32::MAX, 256);
        let p = u64::from(u32::MAX) * u64::from(u32::MAX);
        assert!(s.global >= p && s.global % 256 == 0);
    }

    #[test]
    fn small_dispatch_is_one_row() {
        let grid = dispatch_grid(compute_work_sizing(1280, 720, 64), 65535).unwrap();
        assert_eq!(grid, DispatchGrid { x: 14_400, y: 1 });
    }

    #[test]
    fn wide_dispatch_folds_into_rows() {
        let sizing = WorkSizing { global: 10 * 64, local: 64 };
        let grid = dispatch_grid(sizing, 4).unwrap();
        assert_eq!(grid, DispatchGrid { x: 4, y: 3 });
        assert!(grid.groups() >= sizing.groups());
    }

    #[test]
    fn oversized_dispatch_is_rejected() {
        let sizing = WorkSizing { global: 17, local: 1 };
        let err = dispatch_grid(sizing, 4).unwrap_err();
        assert!(matches!(err, DispatchError::GridTooLarge { groups: 17, max_per_dimension: 4 }));
    }
}
