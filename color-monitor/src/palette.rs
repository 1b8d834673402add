use std::fmt;

use ratatui::style::Color;

/// A 24-bit display color code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(code: u32) -> Self {
        Self::new((code >> 16) as u8, (code >> 8) as u8, code as u8)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for Color {
    fn from(code: Rgb) -> Self {
        Color::Rgb(code.r, code.g, code.b)
    }
}

/// Returned when no rule matches a class name. Callers treat this value as
/// "the resolver gave up", so no other rule may produce it.
pub const DEFAULT_GRAY: Rgb = Rgb::hex(0x808080);

const RED: Rgb = Rgb::hex(0xFF0000);
const GREEN: Rgb = Rgb::hex(0x00FF00);
const BLUE: Rgb = Rgb::hex(0x0000FF);
const YELLOW: Rgb = Rgb::hex(0xFFFF00);
const ORANGE: Rgb = Rgb::hex(0xFFA500);
const PURPLE: Rgb = Rgb::hex(0x800080);
const PINK: Rgb = Rgb::hex(0xFFC0CB);
const BROWN: Rgb = Rgb::hex(0x8B4513);
const WHITE: Rgb = Rgb::hex(0xFFFFFF);
const BLACK: Rgb = Rgb::hex(0x000000);
const CYAN: Rgb = Rgb::hex(0x00FFFF);
const UFO_GREEN: Rgb = Rgb::hex(0x7CE263);
const DARK_GREEN: Rgb = Rgb::hex(0x006400);
const LIGHT_GREEN: Rgb = Rgb::hex(0x90EE90);

/// Exact (case-insensitive) class name -> code table.
const NAMED_CODES: &[(&str, Rgb)] = &[
    ("red", RED),
    ("green", GREEN),
    ("blue", BLUE),
    ("yellow", YELLOW),
    ("orange", ORANGE),
    ("purple", PURPLE),
    ("pink", PINK),
    ("brown", BROWN),
    ("white", WHITE),
    ("black", BLACK),
    ("gray", DEFAULT_GRAY),
    ("cyan", CYAN),
    ("ufo green", UFO_GREEN),
    ("lime", Rgb::hex(0x32CD32)),
    ("forest green", Rgb::hex(0x228B22)),
    ("dark green", DARK_GREEN),
    ("light green", LIGHT_GREEN),
    ("sea green", Rgb::hex(0x2E8B57)),
    ("olive", Rgb::hex(0x808000)),
    ("turquoise", Rgb::hex(0x40E0D0)),
    ("teal", Rgb::hex(0x008080)),
];

/// Keywords that pick a green variant, checked in order.
const GREEN_VARIANTS: &[(&str, Rgb)] = &[
    ("ufo", UFO_GREEN),
    ("lime", UFO_GREEN),
    ("dark", DARK_GREEN),
    ("light", LIGHT_GREEN),
];

/// Color-family keywords for names the table doesn't know, first match wins.
const FAMILY_CODES: &[(&str, Rgb)] = &[
    ("red", RED),
    ("blue", BLUE),
    ("yellow", YELLOW),
    ("orange", ORANGE),
    ("purple", PURPLE),
    ("violet", PURPLE),
    ("pink", PINK),
    ("brown", BROWN),
    ("white", WHITE),
    ("black", BLACK),
    ("cyan", CYAN),
];

/// Resolve a free-text color name to a display code.
///
/// Precedence: exact table match, then green-family disambiguation, then the
/// ordered family keyword list, then [`DEFAULT_GRAY`]. "lime" counts as
/// green-family on its own so names like "Lime Light" still land on the
/// bright green rather than the fallback.
pub fn resolve(name: &str) -> Rgb {
    let name = name.to_ascii_lowercase();

    if let Some((_, code)) = NAMED_CODES.iter().find(|(n, _)| *n == name) {
        return *code;
    }

    if name.contains("green") || name.contains("lime") {
        return GREEN_VARIANTS
            .iter()
            .find(|(keyword, _)| name.contains(keyword))
            .map(|(_, code)| *code)
            .unwrap_or(GREEN);
    }

    FAMILY_CODES
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map(|(_, code)| *code)
        .unwrap_or(DEFAULT_GRAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_case_insensitive() {
        assert_eq!(resolve("Red"), RED);
        assert_eq!(resolve("red"), RED);
        assert_eq!(resolve("RED"), RED);
    }

    #[test]
    fn ufo_and_lime_names_pick_the_bright_green() {
        assert_eq!(resolve("ufo green"), UFO_GREEN);
        assert_eq!(resolve("UFO Green"), UFO_GREEN);
        assert_eq!(resolve("Lime Light"), UFO_GREEN);
    }

    #[test]
    fn green_variants_stay_distinct() {
        assert_eq!(resolve("dark green"), DARK_GREEN);
        assert_ne!(resolve("dark green"), resolve("green"));
        assert_eq!(resolve("darkish green"), DARK_GREEN);
        assert_eq!(resolve("light spring green"), LIGHT_GREEN);
        assert_eq!(resolve("spring green"), GREEN);
    }

    #[test]
    fn family_keywords_match_by_substring() {
        assert_eq!(resolve("brick red"), RED);
        assert_eq!(resolve("navy blue"), BLUE);
        assert_eq!(resolve("violet haze"), PURPLE);
        assert_eq!(resolve("off-white"), WHITE);
    }

    #[test]
    fn unknown_names_fall_back_to_gray() {
        assert_eq!(resolve("mystery"), DEFAULT_GRAY);
        assert_eq!(resolve(""), DEFAULT_GRAY);
    }

    #[test]
    fn display_renders_uppercase_hex() {
        assert_eq!(Rgb::new(10, 20, 30).to_string(), "#0A141E");
        assert_eq!(DEFAULT_GRAY.to_string(), "#808080");
    }

    #[test]
    fn converts_into_terminal_color() {
        assert_eq!(Color::from(Rgb::new(1, 2, 3)), Color::Rgb(1, 2, 3));
    }
}
