use std::sync::LazyLock;

use regex::Regex;

use crate::palette::Rgb;

/// One RGB reading extracted from a sensor line.
///
/// Channels are wider than a display channel on purpose: a miscalibrated
/// sensor can report values past 255 and those pass through to
/// classification unchanged rather than being clamped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbReading {
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl RgbReading {
    /// The raw reading as a display code, channels saturated to 8 bits.
    pub fn display_code(&self) -> Rgb {
        Rgb::new(
            self.r.min(255) as u8,
            self.g.min(255) as u8,
            self.b.min(255) as u8,
        )
    }
}

static RGB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"R:\s*(\d+)\s*G:\s*(\d+)\s*B:\s*(\d+)").expect("RGB pattern compiles")
});

/// Extract an RGB triple from one sensor line, e.g.
/// `Color -> R: 255  G: 0  B: 0  |  HEX: #FF0000  |  Name: Red`.
///
/// The labels must appear in R, G, B order; everything else on the line is
/// ignored. A line that doesn't match yields `None`, never an error.
pub fn parse_sensor_line(line: &str) -> Option<RgbReading> {
    let caps = RGB_PATTERN.captures(line)?;
    let channel = |i: usize| caps[i].parse::<u32>().ok();

    Some(RgbReading {
        r: channel(1)?,
        g: channel(2)?,
        b: channel(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_triple_from_full_sensor_line() {
        let line = "Color -> R: 255  G: 0  B: 0  |  HEX: #FF0000  |  Name: Red";
        assert_eq!(
            parse_sensor_line(line),
            Some(RgbReading { r: 255, g: 0, b: 0 })
        );
    }

    #[test]
    fn tolerates_whitespace_variations() {
        assert_eq!(
            parse_sensor_line("R:1 G:2 B:3"),
            Some(RgbReading { r: 1, g: 2, b: 3 })
        );
        assert_eq!(
            parse_sensor_line("R:   10\tG: 20   B:30"),
            Some(RgbReading { r: 10, g: 20, b: 30 })
        );
    }

    #[test]
    fn requires_labels_in_rgb_order() {
        assert_eq!(parse_sensor_line("G: 1 R: 2 B: 3"), None);
        assert_eq!(parse_sensor_line("B: 1 G: 2 R: 3"), None);
        assert_eq!(parse_sensor_line("R: 1 B: 2 G: 3"), None);
    }

    #[test]
    fn rejects_lines_without_the_pattern() {
        assert_eq!(parse_sensor_line(""), None);
        assert_eq!(parse_sensor_line("Calibrating white point..."), None);
        assert_eq!(parse_sensor_line("R: G: B:"), None);
        assert_eq!(parse_sensor_line("R: x G: y B: z"), None);
    }

    #[test]
    fn out_of_range_channels_pass_through() {
        let reading = parse_sensor_line("R: 300 G: 20 B: 999").unwrap();
        assert_eq!(reading, RgbReading { r: 300, g: 20, b: 999 });
        // Saturation only happens when the reading is used as a display code.
        assert_eq!(reading.display_code(), Rgb::new(255, 20, 255));
    }

    #[test]
    fn first_match_wins_on_repeated_patterns() {
        assert_eq!(
            parse_sensor_line("R: 1 G: 2 B: 3 R: 7 G: 8 B: 9"),
            Some(RgbReading { r: 1, g: 2, b: 3 })
        );
    }
}
