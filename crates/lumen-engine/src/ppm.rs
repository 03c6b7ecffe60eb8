//! Plain-text PPM (`P3`) image writer.
//!
//! Header `P3\n<width> <height>\n255\n`, then one `r g b` triplet per pixel
//! in row-major order, one pixel per line.

use std::io::{self, Write};

use crate::scene::ColorRecord;

/// Maximum channel value written in the header.
pub const MAX_CHANNEL: u8 = 255;

/// Converts a linear channel to `0..=255`: clamp to `[0, 1]`, scale, round.
///
/// No gamma correction. NaN maps to 0.
#[inline]
pub fn to_channel(x: f32) -> u8 {
    if x.is_nan() {
        return 0;
    }
    (x.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Writes `pixels` (`width * height` of them) as a `P3` image.
pub fn write_ppm<W: Write>(
    mut out: W,
    width: u32,
    height: u32,
    pixels: &[ColorRecord],
) -> io::Result<()> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} pixels given for a {width}x{height} image ({expected} expected)",
                pixels.len()
            ),
        ));
    }

    write!(out, "P3\n{width} {height}\n{MAX_CHANNEL}\n")?;
    for p in pixels {
        writeln!(
            out,
            "{} {} {}",
            to_channel(p.r),
            to_channel(p.g),
            to_channel(p.b)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(width: u32, height: u32, pixels: &[ColorRecord]) -> String {
        let mut out = Vec::new();
        write_ppm(&mut out, width, height, pixels).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn body(text: &str) -> Vec<&str> {
        text.splitn(4, '\n').nth(3).unwrap().lines().collect()
    }

    #[test]
    fn header_is_exact() {
        let text = render(4, 2, &[ColorRecord::splat(0.0); 8]);
        assert!(text.starts_with("P3\n4 2\n255\n"));
    }

    #[test]
    fn full_white_is_255() {
        let text = render(3, 2, &[ColorRecord::splat(1.0); 6]);
        let lines = body(&text);
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|l| *l == "255 255 255"));
    }

    #[test]
    fn black_is_0() {
        let text = render(2, 2, &[ColorRecord::splat(0.0); 4]);
        assert!(body(&text).iter().all(|l| *l == "0 0 0"));
    }

    #[test]
    fn out_of_range_values_clamp() {
        let text = render(2, 1, &[ColorRecord::splat(2.0), ColorRecord::splat(-0.5)]);
        assert_eq!(body(&text), vec!["255 255 255", "0 0 0"]);
    }

    #[test]
    fn channels_round_to_nearest() {
        assert_eq!(to_channel(0.5), 128);
        assert_eq!(to_channel(0.25), 64);
        assert_eq!(to_channel(1.0 / 255.0), 1);
        assert_eq!(to_channel(f32::NAN), 0);
        assert_eq!(to_channel(f32::INFINITY), 255);
    }

    #[test]
    fn channels_are_written_in_rgb_order() {
        let text = render(1, 1, &[ColorRecord::new(1.0, 0.5, 0.0)]);
        assert_eq!(body(&text), vec!["255 128 0"]);
    }

    #[test]
    fn pixel_count_mismatch_is_rejected() {
        let mut out = Vec::new();
        let err = write_ppm(&mut out, 4, 2, &[ColorRecord::splat(0.0); 7]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(out.is_empty());
    }
}
