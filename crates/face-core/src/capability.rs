// src/capability.rs
//! Whether a surface can visibly distinguish some attributes from its
//! default face.

use face_color::{color_distance, Color, TtyColorDesc, UNSPECIFIED_BG, UNSPECIFIED_FG};

use crate::attrs::{Attr, AttrValue, Attrs, UnderlineStyle};
use crate::constants::DEFAULT_FACE_ID;
use crate::error::{FaceError, FaceResult};
use crate::keyword::FaceRef;
use crate::merge::Merger;
use crate::registry::FaceRegistry;
use crate::surface::{Surface, SurfaceKind};
use crate::traits::TtyCaps;

const NORMAL: i32 = 100;

/// Attributes a terminal can never show.
const TTY_UNSUPPORTED: [Attr; 8] = [
    Attr::Family,
    Attr::Foundry,
    Attr::Stipple,
    Attr::Height,
    Attr::Width,
    Attr::Overline,
    Attr::StrikeThrough,
    Attr::Box,
];

/// Attributes a window system draws without help from the font.
const GUI_DECORATIONS: [Attr; 9] = [
    Attr::Underline,
    Attr::Inverse,
    Attr::Foreground,
    Attr::DistantForeground,
    Attr::Background,
    Attr::Stipple,
    Attr::Overline,
    Attr::StrikeThrough,
    Attr::Box,
];

const GUI_FONT_ATTRS: [Attr; 5] = [Attr::Family, Attr::Foundry, Attr::Height, Attr::Weight, Attr::Slant];

impl Surface {
    /// True when text drawn with `attributes` would look different from
    /// text in the default face.
    pub fn supports_face_attributes(&mut self, registry: &FaceRegistry, attributes: &FaceRef) -> FaceResult<bool> {
        let mut attrs = Attrs::new();
        let mut diagnostics = {
            let mut merger = Merger::new(registry, &self.table).with_remap(&self.remap);
            merger.merge_face_ref(attributes, &mut attrs);
            merger.into_diagnostics()
        };
        self.diagnostics.append(&mut diagnostics);

        if self.cache.get(DEFAULT_FACE_ID).is_none() {
            self.realize_basic_faces(registry)?;
        }
        let default = self
            .cache
            .get(DEFAULT_FACE_ID)
            .map(|face| face.lface.clone())
            .ok_or_else(|| FaceError::DefaultFaceNotRealizable { reason: "no default face".to_string() })?;

        match self.kind() {
            SurfaceKind::Graphical => Ok(self.gui_supports(registry, &attrs, &default)),
            SurfaceKind::Terminal => Ok(self.tty_supports(&attrs, &default)),
            SurfaceKind::Headless => Ok(false),
        }
    }

    fn gui_supports(&mut self, registry: &FaceRegistry, attrs: &Attrs, default: &Attrs) -> bool {
        let same_as_default =
            |attr: Attr| attrs[attr].is_specified() && attrs[attr] == default[attr];
        if GUI_DECORATIONS.into_iter().any(same_as_default) {
            return false;
        }
        if !GUI_FONT_ATTRS.into_iter().any(|attr| attrs[attr].is_specified()) {
            return true;
        }

        let mut merged = default.clone();
        let mut diagnostics = {
            let mut merger = Merger::new(registry, &self.table);
            merger.merge_vectors(attrs, &mut merged);
            merger.into_diagnostics()
        };
        self.diagnostics.append(&mut diagnostics);
        let id = self.lookup_face(&merged);
        let font = self.cache.get(id).and_then(|face| face.font.as_ref());
        let default_font = self.cache.get(DEFAULT_FACE_ID).and_then(|face| face.font.as_ref());
        match (font, default_font) {
            (Some(font), Some(default_font)) => font.handle != default_font.handle && font.differs_from(default_font),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn tty_supports(&mut self, attrs: &Attrs, default: &Attrs) -> bool {
        if TTY_UNSUPPORTED.into_iter().any(|attr| attrs[attr].is_specified()) {
            return false;
        }
        let mut caps = TtyCaps::default();

        if let Some(weight) = attrs[Attr::Weight].weight().map(|w| w.numeric()) {
            let default_weight = default[Attr::Weight].weight().map_or(NORMAL, |w| w.numeric());
            if weight > NORMAL {
                if default_weight > NORMAL {
                    return false;
                }
                caps.bold = true;
            } else if weight < NORMAL {
                if default_weight < NORMAL {
                    return false;
                }
                caps.dim = true;
            } else if default_weight == NORMAL {
                return false;
            }
        }

        if let Some(slant) = attrs[Attr::Slant].slant().map(|s| s.numeric()) {
            let default_slant = default[Attr::Slant].slant().map_or(NORMAL, |s| s.numeric());
            if slant == NORMAL || slant == default_slant {
                return false;
            }
            caps.italic = true;
        }

        let underline = &attrs[Attr::Underline];
        if underline.is_specified() {
            let wavy = matches!(underline, AttrValue::Underline(spec) if spec.style == UnderlineStyle::Wave);
            if matches!(underline, AttrValue::Str(_)) || wavy || *underline == default[Attr::Underline] {
                return false;
            }
            caps.underline = true;
        }

        let inverse = &attrs[Attr::Inverse];
        if inverse.is_specified() {
            if *inverse == default[Attr::Inverse] {
                return false;
            }
            caps.inverse = true;
        }

        let threshold = self.config.tty_same_color_threshold;
        let fg = match self.tty_color_close_enough(attrs, default, Attr::Foreground, threshold) {
            Ok(fg) => fg,
            Err(()) => return false,
        };
        let bg = match self.tty_color_close_enough(attrs, default, Attr::Background, threshold) {
            Ok(bg) => bg,
            Err(()) => return false,
        };
        if let (Some(fg), Some(bg)) = (&fg, &bg) {
            let delta = color_distance(fg.standard, bg.standard) - color_distance(fg.entry.color, bg.entry.color);
            if delta.abs() > threshold {
                return false;
            }
        }

        self.display.tty_capable(caps)
    }

    /// Check one color slot. `Err` means the color cannot be shown apart
    /// from the default; `Ok(None)` that the slot holds no color name.
    fn tty_color_close_enough(
        &self,
        attrs: &Attrs,
        default: &Attrs,
        attr: Attr,
        threshold: i64,
    ) -> Result<Option<TtyColorDesc>, ()> {
        let Some(name) = attrs[attr].as_str() else {
            return Ok(None);
        };
        if attrs[attr] == default[attr] {
            return Err(());
        }
        let Some(table) = self.display.tty_color_table() else {
            return Err(());
        };
        let Some(desc) = table.lookup_by_name(name) else {
            return Err(());
        };
        if color_distance(desc.entry.color, desc.standard) > threshold {
            return Err(());
        }
        let default_color: Option<Color> = default[attr]
            .as_str()
            .filter(|name| *name != UNSPECIFIED_FG && *name != UNSPECIFIED_BG)
            .and_then(|name| table.lookup_by_name(name))
            .map(|desc| desc.entry.color);
        if default_color.is_some_and(|color| color_distance(desc.entry.color, color) <= threshold) {
            return Err(());
        }
        Ok(Some(desc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurfaceParams;
    use crate::dummy_backend::{DummyDisplay, DummyFontMatcher};
    use crate::keyword::Value;
    use face_color::TtyColorTable;

    fn graphical() -> (FaceRegistry, Surface) {
        let registry = FaceRegistry::new();
        let mut surface = Surface::graphical(
            1,
            SurfaceParams::new().with_colors("black", "white"),
            Box::new(DummyDisplay::new()),
            Box::new(DummyFontMatcher::new()),
        );
        registry.init_surface(&mut surface).unwrap();
        (registry, surface)
    }

    fn terminal(caps: TtyCaps) -> (FaceRegistry, Surface) {
        let registry = FaceRegistry::new();
        let mut surface =
            Surface::terminal(2, SurfaceParams::new(), Box::new(DummyDisplay::terminal(TtyColorTable::ansi8(), caps)));
        registry.init_surface(&mut surface).unwrap();
        (registry, surface)
    }

    fn attrs(pairs: &[(&str, Value)]) -> FaceRef {
        FaceRef::plist(pairs.iter().map(|(k, v)| (*k, v.clone())))
    }

    #[test]
    fn test_gui_colors_and_decorations() {
        let (registry, mut surface) = graphical();
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":foreground", Value::str("red"))])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":foreground", Value::str("black"))])).unwrap());
        // Names compare byte for byte against the default face.
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":foreground", Value::str("Black"))])).unwrap());
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":underline", Value::T)])).unwrap());
    }

    #[test]
    fn test_gui_font_attributes_need_a_different_font() {
        let (registry, mut surface) = graphical();
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":weight", Value::sym("bold"))])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":weight", Value::sym("normal"))])).unwrap());
    }

    #[test]
    fn test_gui_relative_height_resolves_against_default() {
        let (registry, mut surface) = graphical();
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":height", Value::Float(2.0))])).unwrap());
        assert!(surface.cache().iter().all(|face| matches!(face.lface[Attr::Height], AttrValue::Int(_))));

    }

    #[test]
    fn test_tty_inverse_and_underline_against_default() {
        let (registry, mut surface) = terminal(TtyCaps::all());
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":inverse-video", Value::T)])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":inverse-video", Value::Nil)])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":underline", Value::str("red"))])).unwrap());
    }

    #[test]
    fn test_tty_capabilities() {
        let (registry, mut surface) = terminal(TtyCaps::all());
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":weight", Value::sym("bold"))])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":weight", Value::sym("normal"))])).unwrap());
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":slant", Value::sym("italic"))])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":height", Value::Int(120))])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":family", Value::str("Serif"))])).unwrap());

        let (registry, mut plain) = terminal(TtyCaps { underline: true, ..TtyCaps::default() });
        assert!(!plain.supports_face_attributes(&registry, &attrs(&[(":weight", Value::sym("bold"))])).unwrap());
        assert!(plain.supports_face_attributes(&registry, &attrs(&[(":underline", Value::T)])).unwrap());
    }

    #[test]
    fn test_tty_colors() {
        let (registry, mut surface) = terminal(TtyCaps::all());
        assert!(surface.supports_face_attributes(&registry, &attrs(&[(":foreground", Value::str("red"))])).unwrap());
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":foreground", Value::str("no-such-color"))])).unwrap());
        // Orange has no close palette entry on an eight-color terminal.
        assert!(!surface.supports_face_attributes(&registry, &attrs(&[(":foreground", Value::str("orange"))])).unwrap());
    }
}
