//! Installed font discovery.
//!
//! Font directories are scanned for TrueType and OpenType files. Family
//! and style come from the font's own name, falling back to the file
//! name. With the `font-discovery` feature on Linux, fontconfig can also
//! resolve a family name to a file directly.

use std::path::{Path, PathBuf};

use crate::attrs::{Slant, Weight, Width};

/// Where a font directory belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontLocation {
    System,
    User,
    Custom(PathBuf),
}

/// A font file found on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemFont {
    pub family: String,
    pub path: PathBuf,
    pub weight: Weight,
    pub slant: Slant,
    pub width: Width,
    pub location: FontLocation,
}

/// Platform font directories, most specific last.
pub fn default_search_paths() -> Vec<(PathBuf, FontLocation)> {
    let mut paths = Vec::new();

    #[cfg(target_os = "linux")]
    {
        paths.push((PathBuf::from("/usr/share/fonts"), FontLocation::System));
        paths.push((PathBuf::from("/usr/local/share/fonts"), FontLocation::System));
    }

    #[cfg(target_os = "macos")]
    {
        paths.push((PathBuf::from("/System/Library/Fonts"), FontLocation::System));
        paths.push((PathBuf::from("/Library/Fonts"), FontLocation::System));
    }

    #[cfg(target_os = "windows")]
    {
        paths.push((PathBuf::from("C:\\Windows\\Fonts"), FontLocation::System));
    }

    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        paths.push((home.join(".local/share/fonts"), FontLocation::User));
        paths.push((home.join(".fonts"), FontLocation::User));
    }

    paths
}

/// Scan `search_paths` recursively for font files. Directories that do
/// not exist or cannot be read are skipped.
pub fn discover_fonts(search_paths: &[PathBuf]) -> Vec<SystemFont> {
    let mut fonts = Vec::new();
    for path in search_paths {
        scan_dir(path, &FontLocation::Custom(path.clone()), &mut fonts, 0);
    }
    tracing::debug!("Discovered {} fonts in {} directories", fonts.len(), search_paths.len());
    fonts
}

/// Scan the platform font directories.
pub fn discover_system_fonts() -> Vec<SystemFont> {
    let mut fonts = Vec::new();
    for (path, location) in default_search_paths() {
        scan_dir(&path, &location, &mut fonts, 0);
    }
    tracing::debug!("Discovered {} system fonts", fonts.len());
    fonts
}

const MAX_SCAN_DEPTH: usize = 8;

fn scan_dir(dir: &Path, location: &FontLocation, fonts: &mut Vec<SystemFont>, depth: usize) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(&path, location, fonts, depth + 1);
        } else if is_font_file(&path) {
            if let Some(font) = analyze_font_file(&path, location.clone()) {
                fonts.push(font);
            }
        }
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
}

/// Read a font file and describe it. `None` if fontdue cannot parse it.
pub fn analyze_font_file(path: &Path, location: FontLocation) -> Option<SystemFont> {
    let data = std::fs::read(path).ok()?;
    let font = match fontdue::Font::from_bytes(data, fontdue::FontSettings::default()) {
        Ok(font) => font,
        Err(e) => {
            tracing::trace!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };
    let stem = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
    let name = font.name().map(str::to_string).unwrap_or(stem);
    let style = split_style(&name);

    Some(SystemFont {
        family: style.family,
        path: path.to_path_buf(),
        weight: style.weight,
        slant: style.slant,
        width: style.width,
        location,
    })
}

/// Family and style words of a full font name.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StyledName {
    pub family: String,
    pub weight: Weight,
    pub slant: Slant,
    pub width: Width,
}

/// Split trailing style words off a font name, as in
/// `DejaVu Sans Mono Bold Oblique` or `DejaVuSansMono-BoldOblique`.
pub(crate) fn split_style(name: &str) -> StyledName {
    let mut styled = StyledName {
        family: String::new(),
        weight: Weight::Normal,
        slant: Slant::Normal,
        width: Width::Normal,
    };
    let mut words: Vec<&str> = name.split([' ', '-', '_']).filter(|w| !w.is_empty()).collect();

    while words.len() > 1 {
        let Some(last) = words.last() else {
            break;
        };
        let mut rest = last.to_ascii_lowercase();
        let mut tentative = styled.clone();
        let mut matched = false;
        while let Some(stripped) = strip_style_suffix(&rest, &mut tentative) {
            rest = stripped;
            matched = true;
        }
        if !matched || !rest.is_empty() {
            break;
        }
        styled = tentative;
        words.pop();
    }

    styled.family = words.join(" ");
    styled
}

/// Style words, longest first so that `semibold` wins over `bold`.
const STYLE_WORDS: &[&str] = &[
    "ultracondensed",
    "extracondensed",
    "semicondensed",
    "ultraexpanded",
    "extraexpanded",
    "semiexpanded",
    "extralight",
    "ultralight",
    "extrabold",
    "ultrabold",
    "semilight",
    "condensed",
    "semibold",
    "demibold",
    "expanded",
    "oblique",
    "regular",
    "italic",
    "medium",
    "narrow",
    "black",
    "heavy",
    "light",
    "book",
    "bold",
    "thin",
];

fn strip_style_suffix(word: &str, styled: &mut StyledName) -> Option<String> {
    let style = STYLE_WORDS.iter().find(|style| word.ends_with(**style))?;
    if let Some(weight) = Weight::from_name(style) {
        if weight != Weight::Normal {
            styled.weight = weight;
        }
    } else if let Some(slant) = Slant::from_name(style) {
        styled.slant = slant;
    } else if let Some(width) = Width::from_name(style) {
        styled.width = width;
    }
    Some(word[..word.len() - style.len()].to_string())
}

/// Ask fontconfig for the file of `family`.
#[cfg(all(target_os = "linux", feature = "font-discovery"))]
pub fn find_with_fontconfig(family: &str) -> Option<SystemFont> {
    let fc = fontconfig::Fontconfig::new()?;
    let found = fc.find(family, None)?;
    tracing::debug!("fontconfig resolved {} to {}", family, found.path.display());
    let font = analyze_font_file(&found.path, FontLocation::System)?;
    if !font.family.eq_ignore_ascii_case(family) {
        tracing::trace!("fontconfig substituted {} for {}", font.family, family);
    }
    Some(font)
}

#[cfg(not(all(target_os = "linux", feature = "font-discovery")))]
pub fn find_with_fontconfig(_family: &str) -> Option<SystemFont> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_style_words() {
        let styled = split_style("DejaVu Sans Mono Bold Oblique");
        assert_eq!(styled.family, "DejaVu Sans Mono");
        assert_eq!(styled.weight, Weight::Bold);
        assert_eq!(styled.slant, Slant::Oblique);

        let styled = split_style("DejaVuSansMono-BoldOblique");
        assert_eq!(styled.family, "DejaVuSansMono");
        assert_eq!((styled.weight, styled.slant), (Weight::Bold, Slant::Oblique));

        let styled = split_style("Noto Sans SemiCondensed SemiBold");
        assert_eq!(styled.family, "Noto Sans");
        assert_eq!((styled.weight, styled.width), (Weight::SemiBold, Width::SemiCondensed));

        assert_eq!(split_style("Inconsolata Regular").family, "Inconsolata");
        assert_eq!(split_style("Bold").family, "Bold");
        assert_eq!(split_style("Sans Highlight").weight, Weight::Normal);
    }

    #[test]
    fn test_missing_directories_are_skipped() {
        let fonts = discover_fonts(&[PathBuf::from("/nonexistent/font/dir")]);
        assert!(fonts.is_empty());
    }

    #[test]
    fn test_font_file_extensions() {
        assert!(is_font_file(Path::new("a/DejaVuSans.ttf")));
        assert!(is_font_file(Path::new("a/Noto.OTF")));
        assert!(!is_font_file(Path::new("a/fonts.dir")));
        assert!(!is_font_file(Path::new("a/README")));
    }
}
