//! Terminal color tables.
//!
//! A terminal exposes a small indexed palette. Faces name colors freely, so
//! a name is resolved to the nearest palette entry and both the palette's
//! RGB value and the name's standard RGB value are reported, which lets
//! callers judge how faithful the approximation is.

use crate::color::Color;
use crate::distance::color_distance;
use crate::named::{self, normalize_name};

/// Pixel index meaning "whatever the terminal's default foreground is".
pub const DEFAULT_FG_INDEX: i64 = -2;
/// Pixel index meaning "whatever the terminal's default background is".
pub const DEFAULT_BG_INDEX: i64 = -3;
/// Pixel index for "no color resolved yet".
pub const DEFAULT_INDEX: i64 = -1;

pub const UNSPECIFIED_FG: &str = "unspecified-fg";
pub const UNSPECIFIED_BG: &str = "unspecified-bg";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtyColor {
    pub name: String,
    pub index: i64,
    pub color: Color,
}

/// Result of resolving a name against a terminal palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtyColorDesc {
    /// Palette entry the name maps to.
    pub entry: TtyColor,
    /// The color the name denotes outside any palette. Equal to
    /// `entry.color` when the name is a palette entry itself.
    pub standard: Color,
}

#[derive(Clone, Debug, Default)]
pub struct TtyColorTable {
    entries: Vec<TtyColor>,
}

const ANSI_NAMES: [&str; 16] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
    "brightblack", "brightred", "brightgreen", "brightyellow",
    "brightblue", "brightmagenta", "brightcyan", "brightwhite",
];

const ANSI_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0), (205, 0, 0), (0, 205, 0), (205, 205, 0),
    (0, 0, 238), (205, 0, 205), (0, 205, 205), (229, 229, 229),
    (127, 127, 127), (255, 0, 0), (0, 255, 0), (255, 255, 0),
    (92, 92, 255), (255, 0, 255), (0, 255, 255), (255, 255, 255),
];

impl TtyColorTable {
    pub fn new(entries: Vec<TtyColor>) -> Self {
        Self { entries }
    }

    /// No colors at all (a monochrome terminal).
    pub fn monochrome() -> Self {
        Self::default()
    }

    /// The eight basic ANSI colors.
    pub fn ansi8() -> Self {
        Self::ansi(8)
    }

    /// Basic plus bright ANSI colors.
    pub fn ansi16() -> Self {
        Self::ansi(16)
    }

    fn ansi(count: usize) -> Self {
        let entries = ANSI_NAMES
            .iter()
            .zip(ANSI_RGB.iter())
            .take(count)
            .enumerate()
            .map(|(index, (name, &(r, g, b)))| TtyColor {
                name: (*name).to_string(),
                index: index as i64,
                color: Color::from_rgb8(r, g, b),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TtyColor] {
        &self.entries
    }

    /// Exact palette entry for `name`, ignoring case and spaces.
    pub fn entry(&self, name: &str) -> Option<&TtyColor> {
        let key = normalize_name(name);
        self.entries.iter().find(|e| normalize_name(&e.name) == key)
    }

    /// Resolve `name` to a palette entry: an exact entry when one exists,
    /// otherwise the entry nearest to the name's standard RGB value.
    pub fn lookup_by_name(&self, name: &str) -> Option<TtyColorDesc> {
        if let Some(entry) = self.entry(name) {
            let standard = named::lookup(name).unwrap_or(entry.color);
            return Some(TtyColorDesc { entry: entry.clone(), standard });
        }
        let standard = Color::parse(name).ok()?;
        self.nearest(standard).map(|entry| TtyColorDesc { entry: entry.clone(), standard })
    }

    pub fn lookup_by_index(&self, index: i64) -> Option<&str> {
        self.entries.iter().find(|e| e.index == index).map(|e| e.name.as_str())
    }

    pub fn nearest(&self, target: Color) -> Option<&TtyColor> {
        self.entries.iter().min_by_key(|e| color_distance(e.color, target))
    }

    /// Name for a pixel index, including the default-color sentinels.
    pub fn color_name(&self, index: i64) -> Option<&str> {
        match self.lookup_by_index(index) {
            Some(name) => Some(name),
            None if index == DEFAULT_FG_INDEX => Some(UNSPECIFIED_FG),
            None if index == DEFAULT_BG_INDEX => Some(UNSPECIFIED_BG),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_entry() {
        let table = TtyColorTable::ansi8();
        let desc = table.lookup_by_name("Red").unwrap();
        assert_eq!(desc.entry.index, 1);
        assert_eq!(desc.standard, Color::new(0xffff, 0, 0));
    }

    #[test]
    fn test_approximate_entry() {
        let table = TtyColorTable::ansi8();
        let desc = table.lookup_by_name("darkred").unwrap();
        assert_eq!(desc.entry.name, "red");
        let desc = table.lookup_by_name("#000010").unwrap();
        assert_eq!(desc.entry.name, "black");
    }

    #[test]
    fn test_unknown_and_empty_tables() {
        assert!(TtyColorTable::ansi16().lookup_by_name("not-a-color").is_none());
        assert!(TtyColorTable::monochrome().lookup_by_name("red").is_none());
    }

    #[test]
    fn test_index_names() {
        let table = TtyColorTable::ansi16();
        assert_eq!(table.lookup_by_index(12), Some("brightblue"));
        assert_eq!(table.color_name(DEFAULT_FG_INDEX), Some(UNSPECIFIED_FG));
        assert_eq!(table.color_name(DEFAULT_BG_INDEX), Some(UNSPECIFIED_BG));
        assert_eq!(table.color_name(99), None);
    }
}
