use std::path::PathBuf;

/// Parameters of one render.
///
/// Defaults reproduce the reference configuration; there are no command-line
/// or environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// Kernel source artifact, relative to the working directory.
    pub kernel_path: PathBuf,

    /// Name of the compute entry point inside the kernel source.
    pub entry_point: String,

    /// Where the full build log is written when compilation fails.
    pub build_log_path: PathBuf,

    /// Where the rendered image is written.
    pub output_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            kernel_path: PathBuf::from("render_kernel.wgsl"),
            entry_point: "render_kernel".to_string(),
            build_log_path: PathBuf::from("errorlog.txt"),
            output_path: PathBuf::from("lumen_render.ppm"),
        }
    }
}
