//! Interactive 1-based selection.
//!
//! Input is consumed one line per attempt, so whatever was typed on a
//! rejected line can never leak into the next prompt. The loop ends on the
//! first valid answer or when the input stream closes.

use std::io::{BufRead, Write};

use super::{Device, Platform, SelectionError};

/// Chooses one of `count` candidates and returns its 0-based index.
///
/// A single candidate is selected without reading or writing anything.
pub fn select_index<R, W>(
    what: &'static str,
    count: usize,
    input: &mut R,
    output: &mut W,
) -> Result<usize, SelectionError>
where
    R: BufRead,
    W: Write,
{
    match count {
        0 => return Err(SelectionError::NoCandidates { what }),
        1 => return Ok(0),
        _ => {}
    }

    write!(output, "\nChoose a {what}: ")?;
    output.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(SelectionError::InputClosed { what });
        }

        if let Some(index) = parse_choice(&line, count) {
            return Ok(index);
        }

        log::debug!("rejected {what} choice {:?}", line.trim());
        write!(output, "No such option. Choose a {what}: ")?;
        output.flush()?;
    }
}

fn parse_choice(line: &str, count: usize) -> Option<usize> {
    let n: usize = line.trim().parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

/// Chooses a platform; automatic when only one exists.
pub fn select_platform<'a, R: BufRead, W: Write>(
    platforms: &'a [Platform],
    input: &mut R,
    output: &mut W,
) -> Result<&'a Platform, SelectionError> {
    let index = select_index("platform", platforms.len(), input, output)?;
    Ok(&platforms[index])
}

/// Chooses a device; automatic when only one exists.
pub fn select_device<'c, R: BufRead, W: Write>(
    devices: &[&'c Device],
    input: &mut R,
    output: &mut W,
) -> Result<&'c Device, SelectionError> {
    let index = select_index("device", devices.len(), input, output)?;
    Ok(devices[index])
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn run(count: usize, input: &str) -> (Result<usize, SelectionError>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let result = select_index("device", count, &mut reader, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn single_candidate_never_prompts() {
        let (result, out) = run(1, "");
        assert_eq!(result.unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn single_candidate_leaves_input_untouched() {
        let mut reader = Cursor::new(b"3\n".to_vec());
        let mut out = Vec::new();
        select_index("platform", 1, &mut reader, &mut out).unwrap();
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn zero_candidates_is_an_error() {
        let (result, _) = run(0, "1\n");
        assert!(matches!(result, Err(SelectionError::NoCandidates { what: "device" })));
    }

    #[test]
    fn valid_index_is_accepted() {
        let (result, out) = run(3, "2\n");
        assert_eq!(result.unwrap(), 1);
        assert_eq!(out, "\nChoose a device: ");
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let (result, _) = run(3, "   3  \r\n");
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn out_of_range_reprompts() {
        let (result, out) = run(2, "0\n3\n2\n");
        assert_eq!(result.unwrap(), 1);
        assert_eq!(out.matches("No such option. Choose a device: ").count(), 2);
    }

    #[test]
    fn non_numeric_reprompts() {
        let (result, out) = run(2, "abc\n-1\n1.5\n\n1\n");
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out.matches("No such option").count(), 4);
    }

    #[test]
    fn rejected_line_does_not_leak_into_next_prompt() {
        // "9 1" is rejected as a whole; its trailing "1" must not be read as
        // the next answer.
        let (result, out) = run(2, "9 1\n2\n");
        assert_eq!(result.unwrap(), 1);
        assert_eq!(out.matches("No such option").count(), 1);
    }

    #[test]
    fn consecutive_prompts_share_a_reader_cleanly() {
        let mut reader = Cursor::new(b"x\n2\n1\n".to_vec());
        let mut out = Vec::new();
        let first = select_index("platform", 2, &mut reader, &mut out).unwrap();
        let second = select_index("device", 3, &mut reader, &mut out).unwrap();
        assert_eq!((first, second), (1, 0));
    }

    #[test]
    fn closed_input_is_reported() {
        let (result, _) = run(2, "7\n");
        assert!(matches!(result, Err(SelectionError::InputClosed { what: "device" })));
    }

    #[test]
    fn platform_selection_returns_the_chosen_entry() {
        let platforms = [
            Platform::new(wgpu::Backend::Vulkan),
            Platform::new(wgpu::Backend::Gl),
        ];
        let mut reader = Cursor::new(b"2\n".to_vec());
        let mut out = Vec::new();
        let chosen = select_platform(&platforms, &mut reader, &mut out).unwrap();
        assert_eq!(chosen.backend, wgpu::Backend::Gl);
        assert_eq!(String::from_utf8(out).unwrap(), "\nChoose a platform: ");
    }
}
