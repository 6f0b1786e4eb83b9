//! Named colors.
//!
//! A compact subset of the X11 `rgb.txt` database plus the `grayN`/`greyN`
//! ramp. Lookups ignore case and embedded spaces, so `"Dark Slate Gray"`
//! and `"darkslategray"` are the same color. Larger tables can be read
//! from rgb.txt-style text with [`ColorDatabase::parse`].

use std::collections::HashMap;

use memchr::memchr_iter;

use crate::color::Color;

const fn c(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgb8(r, g, b)
}

static NAMED_COLORS: &[(&str, Color)] = &[
    ("black", c(0, 0, 0)),
    ("white", c(255, 255, 255)),
    ("red", c(255, 0, 0)),
    ("green", c(0, 255, 0)),
    ("blue", c(0, 0, 255)),
    ("yellow", c(255, 255, 0)),
    ("cyan", c(0, 255, 255)),
    ("magenta", c(255, 0, 255)),
    ("gray", c(190, 190, 190)),
    ("grey", c(190, 190, 190)),
    ("darkgray", c(169, 169, 169)),
    ("darkgrey", c(169, 169, 169)),
    ("dimgray", c(105, 105, 105)),
    ("dimgrey", c(105, 105, 105)),
    ("lightgray", c(211, 211, 211)),
    ("lightgrey", c(211, 211, 211)),
    ("slategray", c(112, 128, 144)),
    ("darkslategray", c(47, 79, 79)),
    ("lightslategray", c(119, 136, 153)),
    ("darkred", c(139, 0, 0)),
    ("red3", c(205, 0, 0)),
    ("red1", c(255, 0, 0)),
    ("firebrick", c(178, 34, 34)),
    ("brown", c(165, 42, 42)),
    ("orange", c(255, 165, 0)),
    ("darkorange", c(255, 140, 0)),
    ("orangered", c(255, 69, 0)),
    ("gold", c(255, 215, 0)),
    ("goldenrod", c(218, 165, 32)),
    ("darkgoldenrod", c(184, 134, 11)),
    ("lightyellow", c(255, 255, 224)),
    ("yellow3", c(205, 205, 0)),
    ("khaki", c(240, 230, 140)),
    ("darkgreen", c(0, 100, 0)),
    ("green3", c(0, 205, 0)),
    ("forestgreen", c(34, 139, 34)),
    ("seagreen", c(46, 139, 87)),
    ("limegreen", c(50, 205, 50)),
    ("palegreen", c(152, 251, 152)),
    ("darkolivegreen", c(85, 107, 47)),
    ("navy", c(0, 0, 128)),
    ("navyblue", c(0, 0, 128)),
    ("darkblue", c(0, 0, 139)),
    ("blue3", c(0, 0, 205)),
    ("mediumblue", c(0, 0, 205)),
    ("royalblue", c(65, 105, 225)),
    ("steelblue", c(70, 130, 180)),
    ("skyblue", c(135, 206, 235)),
    ("lightblue", c(173, 216, 230)),
    ("lightsteelblue", c(176, 196, 222)),
    ("dodgerblue", c(30, 144, 255)),
    ("deepskyblue", c(0, 191, 255)),
    ("darkcyan", c(0, 139, 139)),
    ("cyan3", c(0, 205, 205)),
    ("lightcyan", c(224, 255, 255)),
    ("turquoise", c(64, 224, 208)),
    ("aquamarine", c(127, 255, 212)),
    ("cadetblue", c(95, 158, 160)),
    ("darkmagenta", c(139, 0, 139)),
    ("magenta3", c(205, 0, 205)),
    ("purple", c(160, 32, 240)),
    ("violet", c(238, 130, 238)),
    ("orchid", c(218, 112, 214)),
    ("plum", c(221, 160, 221)),
    ("pink", c(255, 192, 203)),
    ("hotpink", c(255, 105, 180)),
    ("deeppink", c(255, 20, 147)),
    ("salmon", c(250, 128, 114)),
    ("tomato", c(255, 99, 71)),
    ("coral", c(255, 127, 80)),
    ("chocolate", c(210, 105, 30)),
    ("sienna", c(160, 82, 45)),
    ("tan", c(210, 180, 140)),
    ("beige", c(245, 245, 220)),
    ("wheat", c(245, 222, 179)),
    ("ivory", c(255, 255, 240)),
    ("linen", c(250, 240, 230)),
    ("snow", c(255, 250, 250)),
    ("honeydew", c(240, 255, 240)),
    ("azure", c(240, 255, 255)),
    ("lavender", c(230, 230, 250)),
    ("mintcream", c(245, 255, 250)),
    ("whitesmoke", c(245, 245, 245)),
    ("gainsboro", c(220, 220, 220)),
    ("antiquewhite", c(250, 235, 215)),
];

/// Lowercase and drop spaces, the way X color names are compared.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// `grayN` / `greyN` for N in 0..=100.
fn gray_ramp(name: &str) -> Option<Color> {
    let digits = name.strip_prefix("gray").or_else(|| name.strip_prefix("grey"))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let level: u32 = digits.parse().ok()?;
    if level > 100 {
        return None;
    }
    let v = ((level * 255 + 50) / 100) as u8;
    Some(Color::from_rgb8(v, v, v))
}

/// Look up a color name in the built-in table.
pub fn lookup(name: &str) -> Option<Color> {
    let key = normalize_name(name);
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == key)
        .map(|(_, color)| *color)
        .or_else(|| gray_ramp(&key))
}

/// Colors loaded from rgb.txt-style text, layered over the built-in table.
#[derive(Clone, Debug, Default)]
pub struct ColorDatabase {
    entries: HashMap<String, Color>,
}

impl ColorDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse lines of the form `R G B name` (8-bit decimal channels).
    /// Comment lines starting with `!` or `#` and malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut db = Self::new();
        let bytes = text.as_bytes();
        let mut start = 0;
        let ends = memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len()));
        for end in ends {
            if start > end {
                break;
            }
            let line = text[start..end].trim();
            start = end + 1;
            if line.is_empty() || line.starts_with('!') || line.starts_with('#') {
                continue;
            }
            match parse_rgb_line(line) {
                Some((name, color)) => db.insert(&name, color),
                None => tracing::debug!("skipping malformed color line: {line}"),
            }
        }
        db
    }

    pub fn insert(&mut self, name: &str, color: Color) {
        self.entries.insert(normalize_name(name), color);
    }

    /// Database entries first, then the built-in table.
    pub fn lookup(&self, name: &str) -> Option<Color> {
        self.entries
            .get(&normalize_name(name))
            .copied()
            .or_else(|| lookup(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_rgb_line(line: &str) -> Option<(String, Color)> {
    let mut fields = line.split_whitespace();
    let r: u8 = fields.next()?.parse().ok()?;
    let g: u8 = fields.next()?.parse().ok()?;
    let b: u8 = fields.next()?.parse().ok()?;
    let name = fields.collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return None;
    }
    Some((name, Color::from_rgb8(r, g, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case_and_spaces() {
        assert_eq!(lookup("Dark Slate Gray"), lookup("darkslategray"));
        assert_eq!(lookup("NAVY"), Some(Color::from_rgb8(0, 0, 128)));
        assert_eq!(lookup("nonexistent"), None);
    }

    #[test]
    fn test_gray_ramp() {
        assert_eq!(lookup("gray0"), Some(Color::BLACK));
        assert_eq!(lookup("grey100"), Some(Color::WHITE));
        assert_eq!(lookup("gray50"), Some(Color::from_rgb8(128, 128, 128)));
        assert_eq!(lookup("gray101"), None);
        assert_eq!(lookup("grayx"), None);
    }

    #[test]
    fn test_database_parse() {
        let text = "! comment\n255 250 250\t\tsnow\n  0 0 128 navy blue\nbroken line\n10 20 30 custom shade";
        let db = ColorDatabase::parse(text);
        assert_eq!(db.len(), 3);
        assert_eq!(db.lookup("navyblue"), Some(Color::from_rgb8(0, 0, 128)));
        assert_eq!(db.lookup("Custom Shade"), Some(Color::from_rgb8(10, 20, 30)));
        // Falls through to the built-in table.
        assert_eq!(db.lookup("red"), Some(Color::new(0xffff, 0, 0)));
    }
}
