use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::device::ComputeContext;

use super::{load_source, ProgramError};

/// Full diagnostic text produced by a failed compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLog {
    text: String,
}

impl BuildLog {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for BuildLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compilation state of a [`Program`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProgramState {
    Unbuilt,
    Built,
    Failed,
}

enum Status {
    Unbuilt,
    Built(BuiltProgram),
    Failed(BuildLog),
}

pub(crate) struct BuiltProgram {
    /// Front-end IR, kept for entry-point inspection.
    pub(crate) module: naga::Module,
    pub(crate) shader: wgpu::ShaderModule,
}

/// Kernel source text plus the result of compiling it for one device.
pub struct Program {
    label: String,
    source: String,
    status: Status,
}

impl Program {
    /// Wraps already-loaded source text. `label` names it in logs and diagnostics.
    pub fn from_source(label: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            status: Status::Unbuilt,
        }
    }

    /// Loads the source artifact at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let source = load_source(path)?;
        log::debug!("loaded {} bytes of kernel source from '{}'", source.len(), path.display());
        Ok(Self::from_source(path.display().to_string(), source))
    }

    pub fn state(&self) -> ProgramState {
        match self.status {
            Status::Unbuilt => ProgramState::Unbuilt,
            Status::Built(_) => ProgramState::Built,
            Status::Failed(_) => ProgramState::Failed,
        }
    }

    /// Returns the diagnostic log of a failed build.
    pub fn build_log(&self) -> Option<&BuildLog> {
        match &self.status {
            Status::Failed(log) => Some(log),
            _ => None,
        }
    }

    pub(crate) fn built(&self) -> Result<&BuiltProgram, ProgramError> {
        match &self.status {
            Status::Built(built) => Ok(built),
            _ => Err(ProgramError::NotBuilt {
                label: self.label.clone(),
            }),
        }
    }

    /// Compiles the source for the context's device.
    ///
    /// Blocks until the compiler returns. A program that already built is
    /// left as is; a failed one is compiled again.
    pub fn build(&mut self, ctx: &ComputeContext) -> Result<(), ProgramError> {
        if matches!(self.status, Status::Built(_)) {
            return Ok(());
        }

        let capabilities = shader_capabilities(ctx.device().features());
        let module = match compile_wgsl(&self.source, capabilities) {
            Ok(module) => module,
            Err(log) => return Err(self.fail(log)),
        };

        let (shader, error) = ctx.capture_errors(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&self.label),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&self.source)),
            })
        });
        if let Some(error) = error {
            return Err(self.fail(device_error_log(&error)));
        }

        log::info!("compiled '{}' for {}", self.label, ctx.info().name);
        self.status = Status::Built(BuiltProgram { module, shader });
        Ok(())
    }

    fn fail(&mut self, log: BuildLog) -> ProgramError {
        log::error!("compilation of '{}' failed", self.label);
        self.status = Status::Failed(log.clone());
        ProgramError::Build(log)
    }
}

/// Shader capabilities unlocked by the features granted to a device.
pub(crate) fn shader_capabilities(features: wgpu::Features) -> naga::valid::Capabilities {
    use naga::valid::Capabilities;

    let table = [
        (wgpu::Features::SHADER_F16, Capabilities::SHADER_FLOAT16),
        (wgpu::Features::SHADER_F64, Capabilities::FLOAT64),
        (wgpu::Features::SHADER_INT64, Capabilities::SHADER_INT64),
        (wgpu::Features::SUBGROUP, Capabilities::SUBGROUP),
    ];

    table
        .into_iter()
        .filter(|(feature, _)| features.contains(*feature))
        .fold(Capabilities::empty(), |acc, (_, capability)| acc | capability)
}

/// Renders an error raised by the device while creating a shader object,
/// with its cause chain, as a build log.
pub(crate) fn device_error_log(error: &wgpu::Error) -> BuildLog {
    use std::error::Error as _;

    let mut text = error.to_string();
    let mut cause = error.source();
    while let Some(inner) = cause {
        text.push_str(&format!("\n  caused by: {inner}"));
        cause = inner.source();
    }
    BuildLog::new(text)
}

/// Parses and validates WGSL, rendering any failure as a full build log.
pub(crate) fn compile_wgsl(
    source: &str,
    capabilities: naga::valid::Capabilities,
) -> Result<naga::Module, BuildLog> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| BuildLog::new(e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        capabilities,
    );
    validator
        .validate(&module)
        .map_err(|e| BuildLog::new(e.emit_to_string(source)))?;

    Ok(module)
}

/// Echoes `log` to `err` and writes it verbatim to `path`.
///
/// The echo happens first so the diagnostic is visible even when the file
/// cannot be written.
pub fn report_build_failure<W: Write>(
    log: &BuildLog,
    path: impl AsRef<Path>,
    err: &mut W,
) -> io::Result<PathBuf> {
    let path = path.as_ref();

    writeln!(err, "Build log:")?;
    writeln!(err, "{log}")?;
    err.flush()?;

    fs::write(path, format!("{log}\n"))?;
    log::error!("build log saved in '{}'", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use naga::valid::Capabilities;

    use super::*;

    const VALID: &str = "
@group(0) @binding(0) var<storage, read_write> data: array<f32>;

@compute @workgroup_size(32)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    data[id.x] = 1.0;
}
";

    #[test]
    fn valid_source_compiles() {
        let module = compile_wgsl(VALID, Capabilities::empty()).unwrap();
        assert_eq!(module.entry_points.len(), 1);
    }

    #[test]
    fn syntax_defect_yields_non_empty_log() {
        let broken = VALID.replace("data[id.x] = 1.0;", "data[id.x] = ;");
        let log = compile_wgsl(&broken, Capabilities::empty()).unwrap_err();
        assert!(!log.is_empty());
        assert!(log.as_str().contains("error"), "unexpected log: {log}");
    }

    #[test]
    fn type_error_is_caught_by_validation() {
        let broken = VALID.replace("data[id.x] = 1.0;", "data[id.x] = vec2<f32>(1.0, 2.0);");
        assert!(compile_wgsl(&broken, Capabilities::empty()).is_err());
    }

    #[test]
    fn new_program_is_unbuilt() {
        let program = Program::from_source("inline", VALID);
        assert_eq!(program.state(), ProgramState::Unbuilt);
        assert!(program.build_log().is_none());
        assert!(matches!(program.built(), Err(ProgramError::NotBuilt { .. })));
    }

    #[test]
    fn failure_report_is_echoed_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errorlog.txt");
        let log = BuildLog::new("error: expected expression\n  ┌─ wgsl:6:19");

        let mut echoed = Vec::new();
        let written = report_build_failure(&log, &path, &mut echoed).unwrap();

        assert_eq!(written, path);
        let echoed = String::from_utf8(echoed).unwrap();
        assert!(echoed.starts_with("Build log:\n"));
        assert!(echoed.contains(log.as_str()));
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{log}\n"));
    }

    #[test]
    fn failure_report_echoes_even_when_file_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("errorlog.txt");
        let log = BuildLog::new("error: boom");

        let mut echoed = Vec::new();
        assert!(report_build_failure(&log, &path, &mut echoed).is_err());
        assert!(String::from_utf8(echoed).unwrap().contains("error: boom"));
    }

    const HALF_PRECISION: &str = "
enable f16;

@group(0) @binding(0) var<storage, read_write> data: array<f32>;

@compute @workgroup_size(1)
fn main() {
    let h: f16 = 1.5h;
    data[0] = f32(h);
}
";

    #[test]
    fn granted_features_unlock_capabilities() {
        let caps = shader_capabilities(wgpu::Features::SHADER_F16 | wgpu::Features::SHADER_INT64);
        assert!(caps.contains(Capabilities::SHADER_FLOAT16));
        assert!(caps.contains(Capabilities::SHADER_INT64));
        assert!(!caps.contains(Capabilities::FLOAT64));
        assert_eq!(shader_capabilities(wgpu::Features::empty()), Capabilities::empty());
    }

    #[test]
    fn half_precision_kernel_builds_only_when_f16_is_granted() {
        assert!(compile_wgsl(HALF_PRECISION, Capabilities::empty()).is_err());

        let caps = shader_capabilities(wgpu::Features::SHADER_F16);
        compile_wgsl(HALF_PRECISION, caps).unwrap_or_else(|log| panic!("{log}"));
    }
}
