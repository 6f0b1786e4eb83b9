// src/realize.rs
//! Turning fully specified attribute vectors into realized faces.
//!
//! Realization is where backend resources are acquired: a font on
//! graphical surfaces, colors, bitmaps and, lazily, a drawing context.
//! Terminals get palette indices and character attributes instead.

use face_color::{color_distance, DEFAULT_BG_INDEX, DEFAULT_FG_INDEX, UNSPECIFIED_BG, UNSPECIFIED_FG};

use crate::attrs::{Attr, AttrValue, Attrs, BitmapSpec, BoxStyle, Slant, UnderlineColor, UnderlineStyle, Weight, Width};
use crate::cache::{ColorOwnership, FaceBox, FaceId, Line, RealizedFace, Underline};
use crate::color::ColorTarget;
use crate::constants::{BasicFace, DEFAULT_FACE_ID, TTY_FAMILY};
use crate::error::{FaceError, FaceResult};
use crate::font::{load_font_for_lface, spec_for_attrs, FontObject, FontRequest, FontValue};
use crate::merge::Merger;
use crate::registry::{FaceRegistry, DEFAULT_FACE_NAME};
use crate::surface::{Surface, SurfaceKind};
use crate::traits::{DrawValues, Pixel, TtyCaps};

impl Surface {
    /// ID of the ASCII face realized from `attrs`, realizing it if needed.
    pub fn lookup_face(&mut self, attrs: &Attrs) -> FaceId {
        let hash = attrs.content_hash();
        if let Some(id) = self.cache.lookup(hash, attrs) {
            return id;
        }
        self.realize_face(attrs, None)
    }

    /// Realize `attrs` and cache the result. With `former`, that face is
    /// uncached and freed first and the new face takes over its ID.
    pub fn realize_face(&mut self, attrs: &Attrs, former: Option<FaceId>) -> FaceId {
        debug_assert!(attrs.is_fully_specified(), "realizing an incomplete face");
        if let Some(former) = former {
            for face in self.cache.uncache(former) {
                face.release(self.display.as_mut());
            }
        }

        let face = match self.kind() {
            SurfaceKind::Graphical => self.realize_gui_face(attrs),
            SurfaceKind::Terminal => self.realize_tty_face(attrs),
            SurfaceKind::Headless => {
                let mut face = RealizedFace::new(attrs.clone());
                face.colors = ColorOwnership::Palette;
                face.foreground = self.foreground_pixel;
                face.background = self.background_pixel;
                face.foreground_defaulted = true;
                face.background_defaulted = true;
                face
            }
        };
        let id = self.cache.insert(face, former);
        tracing::debug!("Realized face {} on surface {}", id, self.id());
        id
    }

    fn realize_gui_face(&mut self, attrs: &Attrs) -> RealizedFace {
        let _guard = self.input.block();
        let mut face = RealizedFace::new(attrs.clone());

        let shared = self
            .cache
            .get(DEFAULT_FACE_ID)
            .filter(|default| default.is_ascii() && attrs.same_font_attributes(&default.lface))
            .map(|default| default.font.clone());
        face.font = match shared {
            Some(font) => font,
            None => match attrs[Attr::Font].font() {
                Some(FontValue::Object(font)) => Some(font.clone()),
                spec => {
                    let spec = spec.map(FontValue::to_spec);
                    load_font_for_lface(self.fonts.as_mut(), attrs, spec.as_ref(), &self.font_prefs, &self.config)
                }
            },
        };
        if let (Some(font), Some(weight)) = (&face.font, attrs[Attr::Weight].weight()) {
            face.overstrike = weight.numeric() > Weight::Normal.numeric() && font.weight.numeric() <= Weight::Normal.numeric();
        }

        self.load_face_colors(&mut face, attrs);

        face.face_box = match &attrs[Attr::Box] {
            AttrValue::Int(width) if *width != 0 => Some(FaceBox {
                style: BoxStyle::Flat,
                line_width: *width,
                color: face.foreground,
                defaulted: true,
            }),
            AttrValue::Str(color) => {
                let resolved = self.resolve_color(color, ColorTarget::Box);
                Some(FaceBox { style: BoxStyle::Flat, line_width: 1, color: resolved.pixel, defaulted: resolved.defaulted })
            }
            AttrValue::Box(spec) => {
                let (color, defaulted) = match &spec.color {
                    Some(name) => {
                        let resolved = self.resolve_color(name, ColorTarget::Box);
                        (resolved.pixel, resolved.defaulted)
                    }
                    None => (face.foreground, true),
                };
                Some(FaceBox { style: spec.style, line_width: spec.line_width, color, defaulted })
            }
            _ => None,
        };

        face.underline = match &attrs[Attr::Underline] {
            AttrValue::True => Some(Underline { style: UnderlineStyle::Line, color: face.foreground, defaulted: true }),
            AttrValue::Str(color) => {
                let resolved = self.resolve_color(color, ColorTarget::Underline);
                Some(Underline { style: UnderlineStyle::Line, color: resolved.pixel, defaulted: resolved.defaulted })
            }
            AttrValue::Underline(spec) => {
                let (color, defaulted) = match &spec.color {
                    UnderlineColor::Foreground => (face.foreground, true),
                    UnderlineColor::Named(name) => {
                        let resolved = self.resolve_color(name, ColorTarget::Underline);
                        (resolved.pixel, resolved.defaulted)
                    }
                };
                Some(Underline { style: spec.style, color, defaulted })
            }
            _ => None,
        };

        face.overline = self.line_decoration(&attrs[Attr::Overline], face.foreground, ColorTarget::Overline);
        face.strike_through = self.line_decoration(&attrs[Attr::StrikeThrough], face.foreground, ColorTarget::StrikeThrough);

        if let AttrValue::Stipple(spec) = &attrs[Attr::Stipple] {
            match self.display.load_bitmap(spec) {
                Some(bitmap) => {
                    if let Some(old) = face.stipple.replace(bitmap) {
                        self.display.destroy_bitmap(old);
                    }
                }
                None => self.diagnostics.record_error(&FaceError::BitmapNotLoaded { spec: spec.describe() }),
            }
        }

        face
    }

    fn line_decoration(&mut self, value: &AttrValue, foreground: Pixel, target: ColorTarget) -> Option<Line> {
        match value {
            AttrValue::True => Some(Line { color: foreground, defaulted: true }),
            AttrValue::Str(color) => {
                let resolved = self.resolve_color(color, target);
                Some(Line { color: resolved.pixel, defaulted: resolved.defaulted })
            }
            _ => None,
        }
    }

    /// Foreground, background and default stipple of a graphical face.
    fn load_face_colors(&mut self, face: &mut RealizedFace, attrs: &Attrs) {
        let inverse = attrs[Attr::Inverse] == AttrValue::True;
        let (fg_attr, bg_attr) = if inverse {
            (Attr::Background, Attr::Foreground)
        } else {
            (Attr::Foreground, Attr::Background)
        };
        let fg_name = attrs[fg_attr].as_str().unwrap_or(UNSPECIFIED_FG).to_string();
        let bg_name = attrs[bg_attr].as_str().unwrap_or(UNSPECIFIED_BG).to_string();

        if !self.color_supported_p(&bg_name, false) {
            if let Some(stipple) = self.config.default_stipple.clone() {
                face.stipple = self.display.load_bitmap(&BitmapSpec::File(stipple));
            }
        }

        let background = self.resolve_color(&bg_name, ColorTarget::Background);
        face.background = background.pixel;
        face.background_defaulted = background.defaulted;
        let foreground = self.resolve_color(&fg_name, ColorTarget::Foreground);
        face.foreground = foreground.pixel;
        face.foreground_defaulted = foreground.defaulted;

        let Some(distant) = attrs[Attr::DistantForeground].as_str() else {
            return;
        };
        let too_close = match (self.defined_color(&fg_name), self.defined_color(&bg_name)) {
            (Some(fg), Some(bg)) => color_distance(fg.color, bg.color) < self.config.near_same_color_threshold,
            _ => false,
        };
        if !too_close {
            return;
        }
        tracing::trace!("Foreground {} too close to {}; using {}", fg_name, bg_name, distant);
        let distant = distant.to_string();
        if inverse {
            let resolved = self.resolve_color(&distant, ColorTarget::Background);
            if !face.background_defaulted {
                self.display.free_colors(&[face.background]);
            }
            face.background = resolved.pixel;
            face.background_defaulted = resolved.defaulted;
        } else {
            let resolved = self.resolve_color(&distant, ColorTarget::Foreground);
            if !face.foreground_defaulted {
                self.display.free_colors(&[face.foreground]);
            }
            face.foreground = resolved.pixel;
            face.foreground_defaulted = resolved.defaulted;
        }
    }

    fn realize_tty_face(&mut self, attrs: &Attrs) -> RealizedFace {
        let mut face = RealizedFace::new(attrs.clone());
        face.colors = ColorOwnership::Palette;

        let weight = attrs[Attr::Weight].weight().unwrap_or(Weight::Normal).numeric();
        face.tty = TtyCaps {
            bold: weight > Weight::Normal.numeric(),
            dim: weight < Weight::Normal.numeric(),
            italic: attrs[Attr::Slant].slant().is_some_and(|slant| slant != Slant::Normal),
            underline: !attrs[Attr::Underline].is_nil(),
            inverse: attrs[Attr::Inverse] == AttrValue::True,
        };

        let fg_name = attrs[Attr::Foreground].as_str().unwrap_or(UNSPECIFIED_FG).to_string();
        let bg_name = attrs[Attr::Background].as_str().unwrap_or(UNSPECIFIED_BG).to_string();
        let foreground = self.resolve_color(&fg_name, ColorTarget::Foreground);
        let background = self.resolve_color(&bg_name, ColorTarget::Background);
        face.foreground = foreground.pixel;
        face.foreground_defaulted = foreground.defaulted;
        face.background = background.pixel;
        face.background_defaulted = background.defaulted;

        if face.tty.inverse && !foreground.defaulted && !background.defaulted {
            std::mem::swap(&mut face.foreground, &mut face.background);
        }

        if self.config.tty_suppress_bold_inverse_default_colors
            && face.tty.bold
            && face.background == DEFAULT_FG_INDEX
            && face.foreground == DEFAULT_BG_INDEX
        {
            face.tty.bold = false;
        }

        face
    }

    /// Realize the default face and every other basic face. Input is
    /// blocked throughout.
    pub fn realize_basic_faces(&mut self, registry: &FaceRegistry) -> FaceResult<()> {
        let input = self.input.clone();
        let _guard = input.block();
        self.realize_default_face()?;
        for basic in BasicFace::ALL.iter().skip(1) {
            self.realize_named_face(registry, basic.name(), basic.id());
        }
        self.face_change = false;
        Ok(())
    }

    /// Complete the default face from the surface parameters and realize
    /// it under [`DEFAULT_FACE_ID`].
    pub fn realize_default_face(&mut self) -> FaceResult<FaceId> {
        self.table.ensure(DEFAULT_FACE_NAME);
        let mut lface = self.table.get(DEFAULT_FACE_NAME).cloned().unwrap_or_default();

        match self.kind() {
            SurfaceKind::Graphical => {
                let font = match &self.params.font {
                    Some(font) => Some(font.clone()),
                    None => {
                        let probe = Attrs::new()
                            .with(Attr::Family, AttrValue::Str(self.config.initial_font_family.clone()))
                            .with(Attr::Height, AttrValue::Int(self.config.initial_height));
                        load_font_for_lface(self.fonts.as_mut(), &probe, None, &self.font_prefs, &self.config)
                    }
                };
                let font = font.ok_or_else(|| FaceError::DefaultFaceNotRealizable {
                    reason: format!("no font for {}", self.config.initial_font_family),
                })?;
                lface.set_from_font(&font, self.default_face_done, &self.config);
                self.params.font.get_or_insert(font);
                self.default_face_done = true;
            }
            SurfaceKind::Terminal => {
                lface[Attr::Family] = AttrValue::str(TTY_FAMILY);
                lface[Attr::Foundry] = AttrValue::str(TTY_FAMILY);
                lface[Attr::Width] = AttrValue::Width(Width::Normal);
                lface[Attr::Height] = AttrValue::Int(1);
            }
            SurfaceKind::Headless => {
                fill_unspecified(&mut lface, Attr::Family, AttrValue::Str(self.config.initial_font_family.clone()));
                fill_unspecified(&mut lface, Attr::Foundry, AttrValue::str(TTY_FAMILY));
                fill_unspecified(&mut lface, Attr::Width, AttrValue::Width(Width::Normal));
                fill_unspecified(&mut lface, Attr::Height, AttrValue::Int(self.config.initial_height));
            }
        }
        fill_unspecified(&mut lface, Attr::Weight, AttrValue::Weight(Weight::Normal));
        fill_unspecified(&mut lface, Attr::Slant, AttrValue::Slant(Slant::Normal));
        for attr in [Attr::Underline, Attr::Overline, Attr::StrikeThrough, Attr::Box, Attr::Inverse, Attr::Stipple, Attr::Fontset] {
            fill_unspecified(&mut lface, attr, AttrValue::Nil);
        }
        for (attr, param, sentinel) in [
            (Attr::Foreground, self.params.foreground_color.clone(), UNSPECIFIED_FG),
            (Attr::Background, self.params.background_color.clone(), UNSPECIFIED_BG),
        ] {
            if !lface[attr].is_unspecified() && !lface[attr].is_ignore_default() {
                continue;
            }
            lface[attr] = match (param, self.kind()) {
                (Some(color), _) => AttrValue::Str(color),
                (None, SurfaceKind::Graphical) => {
                    return Err(FaceError::DefaultFaceNotRealizable { reason: format!("no {} color", attr) });
                }
                (None, _) => AttrValue::str(sentinel),
            };
        }

        if !lface.is_fully_specified() {
            let missing: Vec<&str> = lface
                .iter()
                .filter(|(attr, value)| !attr.is_optional() && !value.is_specified())
                .map(|(attr, _)| attr.keyword())
                .collect();
            return Err(FaceError::DefaultFaceNotRealizable { reason: format!("unspecified {}", missing.join(" ")) });
        }
        self.table.insert(DEFAULT_FACE_NAME, lface.clone());

        let id = self.realize_face(&lface, Some(DEFAULT_FACE_ID));
        if let Some(face) = self.cache.get(id) {
            self.foreground_pixel = face.foreground;
            self.background_pixel = face.background;
        }
        Ok(id)
    }

    /// Realize the basic face `name` as the default face with `name`'s own
    /// attributes merged on top, under the fixed ID `id`. Remapping is not
    /// applied here.
    pub fn realize_named_face(&mut self, registry: &FaceRegistry, name: &str, id: FaceId) -> FaceId {
        self.table.ensure(name);
        let mut attrs = match self.cache.get(DEFAULT_FACE_ID) {
            Some(default) => default.lface.clone(),
            None => self.table.get(DEFAULT_FACE_NAME).cloned().unwrap_or_default(),
        };
        let own = self.table.get(name).cloned().unwrap_or_default();
        let mut diagnostics = {
            let mut merger = Merger::new(registry, &self.table);
            merger.merge_vectors(&own, &mut attrs);
            merger.into_diagnostics()
        };
        self.diagnostics.append(&mut diagnostics);
        self.realize_face(&attrs, Some(id))
    }

    /// Re-realize the basic faces after drawing contexts were dropped or
    /// the font tables changed.
    pub fn recompute_basic_faces(&mut self, registry: &FaceRegistry) -> FaceResult<()> {
        self.release_draw_contexts();
        self.realize_basic_faces(registry)
    }

    /// Face like `face_id` but drawn with `ch`'s font. ASCII characters and
    /// non-graphical surfaces always use the ASCII face.
    pub fn face_for_char(&mut self, face_id: FaceId, ch: char) -> FaceResult<FaceId> {
        let face = self.cache.get(face_id).ok_or(FaceError::InvalidFaceId { id: face_id })?;
        let ascii = face.ascii_face();
        if ch.is_ascii() || !self.is_graphical() {
            return Ok(ascii);
        }
        if face.font_handle().is_some_and(|handle| self.fonts.has_char(handle, ch)) {
            return Ok(face_id);
        }
        let base = self.cache.get(ascii).ok_or(FaceError::InvalidFaceId { id: ascii })?;
        if base.font_handle().is_some_and(|handle| self.fonts.has_char(handle, ch)) {
            return Ok(ascii);
        }

        let existing = base.lface[Attr::Font].font().map(FontValue::to_spec);
        let mut spec = spec_for_attrs(&base.lface, existing.as_ref(), &self.config);
        spec.name = None;
        let request = FontRequest { spec, order: self.font_prefs.order };
        let font = self.fonts.font_for_char(&request, ch);
        if font.is_none() {
            tracing::debug!("No font covers {:?}; using face {}", ch, ascii);
        }
        self.face_for_font(font, ascii)
    }

    /// Variant of `base`'s ASCII face drawn with `font`, realized on first
    /// use.
    pub fn face_for_font(&mut self, font: Option<FontObject>, base: FaceId) -> FaceResult<FaceId> {
        let ascii = self.cache.get(base).ok_or(FaceError::InvalidFaceId { id: base })?.ascii_face();
        let base_face = self.cache.get(ascii).ok_or(FaceError::InvalidFaceId { id: ascii })?;
        let handle = font.as_ref().map(|font| font.handle);
        if base_face.font_handle() == handle {
            return Ok(ascii);
        }
        if let Some(id) = self.cache.lookup_variant(base_face.hash, ascii, handle) {
            return Ok(id);
        }
        self.realize_non_ascii_face(font, ascii)
    }

    /// Realize a variant of the ASCII face `base` that shares its colors
    /// and decorations.
    pub fn realize_non_ascii_face(&mut self, font: Option<FontObject>, base: FaceId) -> FaceResult<FaceId> {
        let base_face = self.cache.get(base).ok_or(FaceError::InvalidFaceId { id: base })?;
        let mut variant = base_face.derive_variant(font);
        if let (Some(font), Some(weight)) = (&variant.font, variant.lface[Attr::Weight].weight()) {
            variant.overstrike = weight.numeric() > Weight::Normal.numeric() && font.weight.numeric() <= Weight::Normal.numeric();
        }
        let id = self.cache.insert(variant, None);
        tracing::trace!("Realized variant {} of face {}", id, base);
        Ok(id)
    }

    /// Create the face's drawing context if it has none yet.
    pub fn prepare_face_for_display(&mut self, face_id: FaceId) -> FaceResult<()> {
        if !self.is_graphical() {
            return Ok(());
        }
        let face = self.cache.get_mut(face_id).ok_or(FaceError::InvalidFaceId { id: face_id })?;
        if face.draw_context.is_none() {
            let _guard = self.input.block();
            let values = DrawValues { foreground: face.foreground, background: face.background, stipple: face.stipple };
            face.draw_context = Some(self.display.create_draw_context(&values));
        }
        Ok(())
    }
}

fn fill_unspecified(lface: &mut Attrs, attr: Attr, value: AttrValue) {
    if lface[attr].is_unspecified() || lface[attr].is_ignore_default() {
        lface[attr] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurfaceParams;
    use crate::dummy_backend::{DummyDisplay, DummyFontMatcher};
    use crate::keyword::Value;
    use crate::registry::Scope;
    use face_color::TtyColorTable;

    fn gui_surface(display: DummyDisplay, fonts: DummyFontMatcher) -> Surface {
        let params = SurfaceParams::new().with_colors("black", "white");
        Surface::graphical(1, params, Box::new(display), Box::new(fonts))
    }

    fn tty_surface(caps: TtyCaps) -> Surface {
        Surface::terminal(2, SurfaceParams::new(), Box::new(DummyDisplay::terminal(TtyColorTable::ansi8(), caps)))
    }

    #[test]
    fn test_default_face_on_graphical_surface() {
        let registry = FaceRegistry::new();
        let mut surface = gui_surface(DummyDisplay::new(), DummyFontMatcher::new());
        registry.init_surface(&mut surface).unwrap();

        let default = surface.face(DEFAULT_FACE_ID).unwrap();
        assert_eq!(default.foreground, 0x000000);
        assert_eq!(default.background, 0xffffff);
        assert!(default.font.is_some());
        assert_eq!(surface.background_pixel(), 0xffffff);
        assert!(surface.params.font.is_some());
        assert!(surface.table().get(DEFAULT_FACE_NAME).unwrap().is_fully_specified());
        for basic in BasicFace::ALL {
            assert!(surface.face(basic.id()).is_some(), "{} not realized", basic.name());
        }
    }

    #[test]
    fn test_graphical_default_face_needs_colors() {
        let registry = FaceRegistry::new();
        let mut surface = Surface::graphical(
            1,
            SurfaceParams::new(),
            Box::new(DummyDisplay::new()),
            Box::new(DummyFontMatcher::new()),
        );
        assert!(matches!(
            registry.init_surface(&mut surface),
            Err(FaceError::DefaultFaceNotRealizable { .. })
        ));
    }

    #[test]
    fn test_graphical_default_face_needs_a_font() {
        let registry = FaceRegistry::new();
        let mut surface = gui_surface(DummyDisplay::new(), DummyFontMatcher::empty());
        assert!(registry.init_surface(&mut surface).is_err());
    }

    #[test]
    fn test_bold_face_gets_bold_font() {
        let mut registry = FaceRegistry::new();
        registry.set_attribute("bold", ":weight", &Value::sym("bold"), Scope::Global).unwrap();
        let mut surface = gui_surface(DummyDisplay::new(), DummyFontMatcher::new());
        registry.init_surface(&mut surface).unwrap();

        let bold_id = surface.lookup_named_face(&registry, "bold", true).unwrap();
        let bold = surface.face(bold_id).unwrap();
        assert_eq!(bold.font.as_ref().unwrap().weight, Weight::Bold);
        assert!(!bold.overstrike);
        let default = surface.face(DEFAULT_FACE_ID).unwrap();
        assert_ne!(default.font_handle(), bold.font_handle());
    }

    #[test]
    fn test_overstrike_when_no_bold_font() {
        let mut registry = FaceRegistry::new();
        registry.set_attribute("default", ":family", &Value::str("Plain"), Scope::Global).unwrap();
        registry.set_attribute("bold", ":weight", &Value::sym("bold"), Scope::Global).unwrap();
        let mut surface = gui_surface(DummyDisplay::new(), DummyFontMatcher::empty().with_plain_family("Plain", vec!['\0'..='\u{ff}']));
        registry.init_surface(&mut surface).unwrap();
        let bold_id = surface.lookup_named_face(&registry, "bold", true).unwrap();
        assert!(surface.face(bold_id).unwrap().overstrike);
    }

    #[test]
    fn test_decorations_and_inverse() {
        let registry = FaceRegistry::new();
        let mut surface = gui_surface(DummyDisplay::new(), DummyFontMatcher::new());
        registry.init_surface(&mut surface).unwrap();

        let mut attrs = surface.face(DEFAULT_FACE_ID).unwrap().lface.clone();
        attrs[Attr::Inverse] = AttrValue::True;
        attrs[Attr::Underline] = AttrValue::str("red");
        attrs[Attr::Box] = AttrValue::Int(2);
        attrs[Attr::Overline] = AttrValue::True;
        let id = surface.lookup_face(&attrs);
        let face = surface.face(id).unwrap();
        assert_eq!(face.foreground, 0xffffff);
        assert_eq!(face.background, 0x000000);
        assert_eq!(face.underline.as_ref().unwrap().color, 0xff0000);
        assert!(!face.underline.as_ref().unwrap().defaulted);
        let face_box = face.face_box.as_ref().unwrap();
        assert_eq!((face_box.line_width, face_box.color, face_box.defaulted), (2, 0xffffff, true));
        assert_eq!(face.overline, Some(Line { color: 0xffffff, defaulted: true }));
        assert_eq!(surface.lookup_face(&attrs), id);
    }

    #[test]
    fn test_distant_foreground() {
        let registry = FaceRegistry::new();
        let mut surface = gui_surface(DummyDisplay::new(), DummyFontMatcher::new());
        registry.init_surface(&mut surface).unwrap();

        let mut attrs = surface.face(DEFAULT_FACE_ID).unwrap().lface.clone();
        attrs[Attr::Foreground] = AttrValue::str("white");
        attrs[Attr::DistantForeground] = AttrValue::str("red");
        let id = surface.lookup_face(&attrs);
        assert_eq!(surface.face(id).unwrap().foreground, 0xff0000);

        attrs[Attr::Foreground] = AttrValue::str("blue");
        let id = surface.lookup_face(&attrs);
        assert_eq!(surface.face(id).unwrap().foreground, 0x0000ff);
    }

    #[test]
    fn test_default_stipple_on_mono() {
        let registry = FaceRegistry::new();
        let display = DummyDisplay::new().with_class(crate::traits::DisplayClass::Mono);
        let log = display.log();
        let mut surface = gui_surface(display, DummyFontMatcher::new());
        registry.init_surface(&mut surface).unwrap();

        let mut attrs = surface.face(DEFAULT_FACE_ID).unwrap().lface.clone();
        attrs[Attr::Background] = AttrValue::str("red");
        let id = surface.lookup_face(&attrs);
        assert!(surface.face(id).unwrap().stipple.is_some());
        assert!(log.borrow().loaded_bitmaps.iter().any(|(name, _)| name == "gray3"));
    }

    #[test]
    fn test_gray_background_on_mono_is_stippled() {
        let registry = FaceRegistry::new();
        let display = DummyDisplay::new().with_class(crate::traits::DisplayClass::Mono);
        let mut surface = gui_surface(display, DummyFontMatcher::new());
        registry.init_surface(&mut surface).unwrap();

        let mut attrs = surface.face(DEFAULT_FACE_ID).unwrap().lface.clone();
        attrs[Attr::Background] = AttrValue::str("gray50");
        let id = surface.lookup_face(&attrs);
        assert!(surface.face(id).unwrap().stipple.is_some());

        attrs[Attr::Background] = AttrValue::str("black");
        let id = surface.lookup_face(&attrs);
        assert!(surface.face(id).unwrap().stipple.is_none());
    }

    #[test]
    fn test_terminal_face() {
        let mut registry = FaceRegistry::new();
        registry.set_attribute("bold", ":weight", &Value::sym("bold"), Scope::Global).unwrap();
        let mut surface = tty_surface(TtyCaps::all());
        registry.init_surface(&mut surface).unwrap();
        let bold_id = surface.lookup_named_face(&registry, "bold", true).unwrap();
        assert!(surface.face(bold_id).unwrap().tty.bold);

        let default = surface.face(DEFAULT_FACE_ID).unwrap();
        assert_eq!((default.foreground, default.background), (DEFAULT_FG_INDEX, DEFAULT_BG_INDEX));
        assert_eq!(default.lface[Attr::Family], AttrValue::str(TTY_FAMILY));

        let mut attrs = default.lface.clone();
        attrs[Attr::Foreground] = AttrValue::str("red");
        attrs[Attr::Inverse] = AttrValue::True;
        attrs[Attr::Slant] = AttrValue::Slant(Slant::Italic);
        let id = surface.lookup_face(&attrs);
        let face = surface.face(id).unwrap();
        assert_eq!((face.foreground, face.background), (DEFAULT_BG_INDEX, 1));
        assert!(face.tty.italic && face.tty.inverse);
        assert_eq!(face.colors, ColorOwnership::Palette);
    }

    #[test]
    fn test_suppress_bold_on_inverted_defaults() {
        let registry = FaceRegistry::with_config(
            crate::config::FaceConfig::new().with_tty_suppress_bold_inverse_default_colors(true),
        );
        let mut surface = tty_surface(TtyCaps::all());
        registry.init_surface(&mut surface).unwrap();

        let mut attrs = surface.face(DEFAULT_FACE_ID).unwrap().lface.clone();
        attrs[Attr::Weight] = AttrValue::Weight(Weight::Bold);
        attrs[Attr::Inverse] = AttrValue::True;
        let id = surface.lookup_face(&attrs);
        let face = surface.face(id).unwrap();
        assert!(!face.tty.bold);
        assert!(face.tty.inverse);
    }

    #[test]
    fn test_headless_default_face() {
        let registry = FaceRegistry::new();
        let mut surface = Surface::headless(3, SurfaceParams::new());
        registry.init_surface(&mut surface).unwrap();
        let default = surface.face(DEFAULT_FACE_ID).unwrap();
        assert_eq!(default.lface[Attr::Height], AttrValue::Int(registry.config().initial_height));
        assert_eq!(default.lface[Attr::Foreground], AttrValue::str(UNSPECIFIED_FG));
        assert!(default.font.is_none());
    }

    #[test]
    fn test_face_for_char_makes_variants() {
        let registry = FaceRegistry::new();
        let fonts = DummyFontMatcher::new().with_family("Greek", vec!['\u{370}'..='\u{3ff}']);
        let mut surface = gui_surface(DummyDisplay::new(), fonts);
        registry.init_surface(&mut surface).unwrap();

        assert_eq!(surface.face_for_char(DEFAULT_FACE_ID, 'a').unwrap(), DEFAULT_FACE_ID);
        let alpha = surface.face_for_char(DEFAULT_FACE_ID, 'α').unwrap();
        assert_ne!(alpha, DEFAULT_FACE_ID);
        let variant = surface.face(alpha).unwrap();
        assert_eq!(variant.base, Some(DEFAULT_FACE_ID));
        assert_eq!(variant.colors, ColorOwnership::BorrowedFrom(DEFAULT_FACE_ID));
        assert_eq!(surface.face_for_char(DEFAULT_FACE_ID, 'β').unwrap(), alpha);
        assert_eq!(surface.face_for_char(alpha, 'β').unwrap(), alpha);
        assert_eq!(surface.face_for_char(alpha, 'b').unwrap(), DEFAULT_FACE_ID);
    }

    #[test]
    fn test_draw_context_is_lazy() {
        let registry = FaceRegistry::new();
        let display = DummyDisplay::new();
        let log = display.log();
        let mut surface = gui_surface(display, DummyFontMatcher::new());
        registry.init_surface(&mut surface).unwrap();
        assert!(log.borrow().created_contexts.is_empty());

        surface.prepare_face_for_display(DEFAULT_FACE_ID).unwrap();
        surface.prepare_face_for_display(DEFAULT_FACE_ID).unwrap();
        assert_eq!(log.borrow().created_contexts.len(), 1);
        assert!(surface.prepare_face_for_display(999).is_err());
    }

    #[test]
    fn test_allocation_happens_with_input_blocked() {
        let registry = FaceRegistry::new();
        let blocker = crate::input::InputBlocker::new();
        let display = DummyDisplay::new().with_input_blocker(blocker.clone());
        let log = display.log();
        let mut surface = gui_surface(display, DummyFontMatcher::new()).with_input_blocker(blocker.clone());
        registry.init_surface(&mut surface).unwrap();
        surface.prepare_face_for_display(DEFAULT_FACE_ID).unwrap();
        assert!(!log.borrow().allocated_colors.is_empty());
        assert_eq!(log.borrow().unblocked_allocations, 0);
        assert!(!blocker.is_blocked());
    }
}
