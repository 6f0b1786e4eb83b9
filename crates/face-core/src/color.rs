// src/color.rs
//! Color resolution for a surface.
//!
//! Graphical surfaces allocate pixels through their backend. Terminals map
//! names onto their palette; the default-color sentinels stand for
//! whatever the terminal itself draws with. Failures fall back to the
//! surface's own colors and are recorded as diagnostics.

use face_color::{color_distance, is_gray, Color, ColorParseError, DEFAULT_BG_INDEX, DEFAULT_FG_INDEX, UNSPECIFIED_BG, UNSPECIFIED_FG};

use crate::error::{FaceError, FaceResult};
use crate::surface::{Surface, SurfaceKind};
use crate::traits::{ColorDef, DisplayClass, Pixel};

/// What a resolved color is used for. Background colors fall back to the
/// surface background, everything else to its foreground.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorTarget {
    Foreground,
    Background,
    Underline,
    Overline,
    StrikeThrough,
    Box,
}

impl ColorTarget {
    fn is_background(self) -> bool {
        self == ColorTarget::Background
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedColor {
    pub pixel: Pixel,
    /// The surface's color was substituted.
    pub defaulted: bool,
}

/// A color argument given either by name or by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorArg<'a> {
    Name(&'a str),
    Rgb(Color),
}

impl Surface {
    /// Resolve `name` into a pixel for `target`.
    pub fn resolve_color(&mut self, name: &str, target: ColorTarget) -> ResolvedColor {
        match self.kind() {
            SurfaceKind::Graphical => self.load_color(name, target),
            SurfaceKind::Terminal => self.map_tty_color(name, target),
            SurfaceKind::Headless => ResolvedColor { pixel: self.fallback_pixel(target), defaulted: true },
        }
    }

    fn fallback_pixel(&self, target: ColorTarget) -> Pixel {
        if target.is_background() {
            self.background_pixel
        } else {
            self.foreground_pixel
        }
    }

    fn load_color(&mut self, name: &str, target: ColorTarget) -> ResolvedColor {
        let _guard = self.input.block();
        match self.display.alloc_color(name, target.is_background()) {
            Some(pixel) => ResolvedColor { pixel, defaulted: false },
            None => {
                self.diagnostics.record_error(&FaceError::ColorNotAllocated { name: name.to_string() });
                ResolvedColor { pixel: self.fallback_pixel(target), defaulted: true }
            }
        }
    }

    fn map_tty_color(&mut self, name: &str, target: ColorTarget) -> ResolvedColor {
        if name == UNSPECIFIED_FG {
            return ResolvedColor { pixel: DEFAULT_FG_INDEX, defaulted: false };
        }
        if name == UNSPECIFIED_BG {
            return ResolvedColor { pixel: DEFAULT_BG_INDEX, defaulted: false };
        }
        let index = self.display.tty_color_table().and_then(|table| table.lookup_by_name(name)).map(|desc| desc.entry.index);
        match index {
            Some(pixel) => ResolvedColor { pixel, defaulted: false },
            None => {
                self.diagnostics.record_error(&FaceError::ColorNotAllocated { name: name.to_string() });
                let pixel = if target.is_background() { DEFAULT_BG_INDEX } else { DEFAULT_FG_INDEX };
                ResolvedColor { pixel, defaulted: true }
            }
        }
    }

    /// Look a color up without allocating it.
    pub fn defined_color(&mut self, name: &str) -> Option<ColorDef> {
        match self.kind() {
            SurfaceKind::Terminal => {
                if name == UNSPECIFIED_FG {
                    return Some(ColorDef { color: Color::BLACK, pixel: DEFAULT_FG_INDEX });
                }
                if name == UNSPECIFIED_BG {
                    return Some(ColorDef { color: Color::BLACK, pixel: DEFAULT_BG_INDEX });
                }
                let desc = self.display.tty_color_table()?.lookup_by_name(name)?;
                Some(ColorDef { color: desc.entry.color, pixel: desc.entry.index })
            }
            _ => self.display.defined_color(name, false),
        }
    }

    /// Whether the surface can show `name`. Mono displays still show black
    /// and white, and gray backgrounds by dithering.
    pub fn color_supported_p(&mut self, name: &str, background: bool) -> bool {
        match self.kind() {
            SurfaceKind::Graphical => match self.display.display_class() {
                DisplayClass::Color => true,
                class => {
                    name.eq_ignore_ascii_case("black")
                        || name.eq_ignore_ascii_case("white")
                        || ((background || class == DisplayClass::Grayscale) && self.color_gray_p(name))
                }
            },
            SurfaceKind::Terminal => self.defined_color(name).is_some(),
            SurfaceKind::Headless => false,
        }
    }

    pub fn color_gray_p(&mut self, name: &str) -> bool {
        self.defined_color(name).is_some_and(|def| is_gray(def.color))
    }

    /// Perceptual distance between two colors. Names are resolved on this
    /// surface.
    pub fn color_distance_by_name(&mut self, a: ColorArg<'_>, b: ColorArg<'_>) -> FaceResult<i64> {
        let a = self.color_value(a)?;
        let b = self.color_value(b)?;
        Ok(color_distance(a, b))
    }

    fn color_value(&mut self, arg: ColorArg<'_>) -> FaceResult<Color> {
        match arg {
            ColorArg::Rgb(color) => Ok(color),
            ColorArg::Name(name) => self
                .defined_color(name)
                .map(|def| def.color)
                .or_else(|| Color::parse(name).ok())
                .ok_or_else(|| FaceError::InvalidColor(ColorParseError::UnknownName(name.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurfaceParams;
    use crate::dummy_backend::{DummyDisplay, DummyFontMatcher};
    use crate::traits::TtyCaps;
    use face_color::TtyColorTable;

    fn graphical(display: DummyDisplay) -> Surface {
        Surface::graphical(1, SurfaceParams::new(), Box::new(display), Box::new(DummyFontMatcher::new()))
    }

    fn terminal() -> Surface {
        Surface::terminal(2, SurfaceParams::new(), Box::new(DummyDisplay::terminal(TtyColorTable::ansi8(), TtyCaps::all())))
    }

    #[test]
    fn test_graphical_resolution_falls_back() {
        let mut surface = graphical(DummyDisplay::new().with_unallocatable("blue"));
        let red = surface.resolve_color("red", ColorTarget::Foreground);
        assert_eq!(red, ResolvedColor { pixel: 0xff0000, defaulted: false });

        let blue = surface.resolve_color("blue", ColorTarget::Background);
        assert!(blue.defaulted);
        assert_eq!(blue.pixel, surface.background_pixel());
        assert_eq!(surface.diagnostics().len(), 1);
    }

    #[test]
    fn test_terminal_mapping() {
        let mut surface = terminal();
        assert_eq!(surface.resolve_color("red", ColorTarget::Foreground).pixel, 1);
        assert_eq!(surface.resolve_color(UNSPECIFIED_BG, ColorTarget::Background).pixel, DEFAULT_BG_INDEX);
        let bad = surface.resolve_color("no-such-color", ColorTarget::Background);
        assert_eq!(bad, ResolvedColor { pixel: DEFAULT_BG_INDEX, defaulted: true });
    }

    #[test]
    fn test_supported_by_display_class() {
        // (name, as background, color, grayscale, mono)
        let cases = [
            ("black", false, true, true, true),
            ("black", true, true, true, true),
            ("White", false, true, true, true),
            ("white", true, true, true, true),
            ("gray50", false, true, true, false),
            ("gray50", true, true, true, true),
            ("red", false, true, false, false),
            ("red", true, true, false, false),
        ];
        let mut color = graphical(DummyDisplay::new());
        let mut grayscale = graphical(DummyDisplay::new().with_class(DisplayClass::Grayscale));
        let mut mono = graphical(DummyDisplay::new().with_class(DisplayClass::Mono));
        for (name, background, on_color, on_grayscale, on_mono) in cases {
            assert_eq!(color.color_supported_p(name, background), on_color, "{name} {background} on color");
            assert_eq!(grayscale.color_supported_p(name, background), on_grayscale, "{name} {background} on grayscale");
            assert_eq!(mono.color_supported_p(name, background), on_mono, "{name} {background} on mono");
        }
    }

    #[test]
    fn test_supported_on_terminal() {
        let mut surface = terminal();
        assert!(surface.color_supported_p("red", false));
        assert!(surface.color_supported_p(UNSPECIFIED_FG, false));
        assert!(surface.color_supported_p(UNSPECIFIED_BG, true));
        assert!(!surface.color_supported_p("no-such-color", true));
    }

    #[test]
    fn test_gray_and_distance() {
        let mut surface = graphical(DummyDisplay::new());
        assert!(surface.color_gray_p("gray50"));
        assert!(!surface.color_gray_p("red"));
        assert!(!surface.color_gray_p("no-such-color"));

        assert_eq!(surface.color_distance_by_name(ColorArg::Name("red"), ColorArg::Name("red")).unwrap(), 0);
        let d = surface.color_distance_by_name(ColorArg::Name("black"), ColorArg::Rgb(Color::WHITE)).unwrap();
        assert!(d > 0);
        assert!(surface.color_distance_by_name(ColorArg::Name("nope"), ColorArg::Name("red")).is_err());
    }
}
