// src/traits.rs
//! Collaborators the face core talks to: the display's resource
//! allocator, the font matcher, and the source of text and overlay
//! properties.

use face_color::{Color, TtyColorTable};

use crate::attrs::BitmapSpec;
use crate::font::{parse_font_name, FontHandle, FontObject, FontRequest, FontSpec};
use crate::keyword::FaceRef;

/// Backend color value. On terminals this is a palette index, which may
/// be one of the default-color sentinels.
pub type Pixel = i64;
pub type BitmapId = u32;
pub type DrawContext = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayClass {
    Color,
    Grayscale,
    Mono,
}

/// A color the display knows, with the pixel it maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorDef {
    pub color: Color,
    pub pixel: Pixel,
}

/// Values a drawing context is created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawValues {
    pub foreground: Pixel,
    pub background: Pixel,
    pub stipple: Option<BitmapId>,
}

/// Character attributes a text terminal may support.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TtyCaps {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
}

impl TtyCaps {
    /// True when every capability set in `wanted` is set in `self`.
    pub fn contains(&self, wanted: TtyCaps) -> bool {
        (!wanted.bold || self.bold)
            && (!wanted.dim || self.dim)
            && (!wanted.italic || self.italic)
            && (!wanted.underline || self.underline)
            && (!wanted.inverse || self.inverse)
    }

    pub fn all() -> Self {
        Self { bold: true, dim: true, italic: true, underline: true, inverse: true }
    }
}

/// Resource allocator of one display.
///
/// Failures are reported as `None`; the caller substitutes a default and
/// carries on.
pub trait DisplayBackend {
    fn display_class(&self) -> DisplayClass;

    /// Look up a color by name. With `alloc`, also allocate a pixel for it.
    fn defined_color(&mut self, name: &str, alloc: bool) -> Option<ColorDef>;

    fn alloc_color(&mut self, name: &str, _for_background: bool) -> Option<Pixel> {
        self.defined_color(name, true).map(|def| def.pixel)
    }

    fn free_colors(&mut self, pixels: &[Pixel]);

    fn create_draw_context(&mut self, values: &DrawValues) -> DrawContext;
    fn destroy_draw_context(&mut self, ctx: DrawContext);

    fn load_bitmap(&mut self, spec: &BitmapSpec) -> Option<BitmapId>;
    fn destroy_bitmap(&mut self, id: BitmapId);

    /// Palette of a text terminal.
    fn tty_color_table(&self) -> Option<&TtyColorTable> {
        None
    }

    /// Whether a text terminal can show all of `caps` at once.
    fn tty_capable(&self, _caps: TtyCaps) -> bool {
        false
    }
}

/// Finds and loads fonts.
pub trait FontMatcher {
    /// Best font for a request, or `None` if nothing acceptable exists.
    fn match_font(&mut self, request: &FontRequest) -> Option<FontObject>;

    fn open_by_name(&mut self, name: &str) -> Option<FontObject> {
        let spec = parse_font_name(name).ok()?;
        self.match_font(&FontRequest::new(FontSpec { name: None, ..spec }))
    }

    /// Properties of a loaded font.
    fn decompose(&self, handle: FontHandle) -> Option<FontSpec>;

    fn has_char(&self, handle: FontHandle, ch: char) -> bool;

    /// Font as close to `request` as possible that covers `ch`.
    fn font_for_char(&mut self, request: &FontRequest, ch: char) -> Option<FontObject>;

    fn loaded_font_count(&self) -> usize;

    /// Drop fonts no face is expected to need any more.
    fn prune(&mut self);
}

/// Which text property to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceProperty {
    Face,
    MouseFace,
}

/// An overlay covering a position.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub start: usize,
    pub end: usize,
    pub priority: i32,
    pub face: Option<FaceRef>,
    pub mouse_face: Option<FaceRef>,
}

impl Overlay {
    pub fn property(&self, prop: FaceProperty) -> Option<&FaceRef> {
        match prop {
            FaceProperty::Face => self.face.as_ref(),
            FaceProperty::MouseFace => self.mouse_face.as_ref(),
        }
    }
}

/// Text with face properties, as seen by the display engine.
pub trait PropertySource {
    /// Value of `prop` at `pos`, and the next position before `limit`
    /// where it changes.
    fn text_property(&self, pos: usize, prop: FaceProperty, limit: usize) -> (Option<FaceRef>, Option<usize>);

    /// Overlays covering `pos`, and the next position where the set of
    /// overlays changes.
    fn overlays_at(&self, pos: usize) -> (Vec<Overlay>, Option<usize>);

    fn end(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tty_caps_contains() {
        let supported = TtyCaps { bold: true, underline: true, ..TtyCaps::default() };
        assert!(supported.contains(TtyCaps::default()));
        assert!(supported.contains(TtyCaps { bold: true, ..TtyCaps::default() }));
        assert!(!supported.contains(TtyCaps { bold: true, italic: true, ..TtyCaps::default() }));
        assert!(TtyCaps::all().contains(supported));
    }

    #[test]
    fn test_overlay_property() {
        let overlay = Overlay {
            start: 0,
            end: 4,
            priority: 0,
            face: Some(FaceRef::named("bold")),
            mouse_face: None,
        };
        assert_eq!(overlay.property(FaceProperty::Face), Some(&FaceRef::named("bold")));
        assert_eq!(overlay.property(FaceProperty::MouseFace), None);
    }
}
