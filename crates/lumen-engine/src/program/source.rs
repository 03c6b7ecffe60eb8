use std::fs;
use std::io;
use std::path::Path;

use super::ProgramError;

/// Reads the kernel source text, line structure intact.
pub fn load_source(path: impl AsRef<Path>) -> Result<String, ProgramError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ProgramError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => ProgramError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })
}
