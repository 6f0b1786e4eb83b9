// src/lookup.rs
//! Face lookups used by the display engine.
//!
//! Every entry point starts from an already realized face (usually the
//! default face, which is fully specified), merges more attributes on top
//! and returns the ID of the matching realized face. Problems with the
//! merged references are recorded in the surface's diagnostics; they never
//! make a lookup fail.

use std::ops::Range;

use crate::attrs::{Attr, AttrValue, Attrs};
use crate::cache::FaceId;
use crate::constants::{BasicFace, DEFAULT_FACE_ID, FONT_STEP_DELTA, FONT_STEP_LIMIT, TTY_FONT_NAME};
use crate::error::{FaceError, FaceResult};
use crate::font::FontProp;
use crate::keyword::FaceRef;
use crate::merge::Merger;
use crate::registry::{FaceRegistry, DEFAULT_FACE_NAME};
use crate::surface::Surface;
use crate::traits::{FaceProperty, Overlay, PropertySource};

/// Name of the face merged over text inside the active region.
pub const REGION_FACE_NAME: &str = "region";

/// How [`Surface::merge_faces`] is told which face to merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceSelector<'a> {
    /// A face name, merged with its inheritance.
    Named(&'a str),
    /// A logical face ID from the registry.
    LfaceId(usize),
    /// An already realized face.
    Realized(FaceId),
}

/// A buffer position to find the face for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionQuery {
    pub pos: usize,
    /// Do not look for property changes past this position.
    pub limit: usize,
    /// Use `mouse-face` properties instead of `face`.
    pub mouse: bool,
    pub region: Option<Range<usize>>,
    /// Face to start from; the (possibly remapped) default face if unset.
    pub base_face: Option<FaceId>,
}

impl PositionQuery {
    pub fn new(pos: usize, limit: usize) -> Self {
        Self { pos, limit, mouse: false, region: None, base_face: None }
    }

    pub fn with_region(mut self, region: Range<usize>) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_mouse(mut self, mouse: bool) -> Self {
        self.mouse = mouse;
        self
    }

    pub fn with_base_face(mut self, face: FaceId) -> Self {
        self.base_face = Some(face);
        self
    }

    fn property(&self) -> FaceProperty {
        if self.mouse {
            FaceProperty::MouseFace
        } else {
            FaceProperty::Face
        }
    }
}

impl Surface {
    fn ensure_basic_faces(&mut self, registry: &FaceRegistry) -> FaceResult<()> {
        if self.cache.get(DEFAULT_FACE_ID).is_none() {
            self.realize_basic_faces(registry)?;
        }
        Ok(())
    }

    fn realized_lface(&self, id: FaceId) -> FaceResult<Attrs> {
        self.cache.get(id).map(|face| face.lface.clone()).ok_or(FaceError::InvalidFaceId { id })
    }

    fn merge_ref_into(&mut self, registry: &FaceRegistry, face_ref: &FaceRef, attrs: &mut Attrs) -> bool {
        let (ok, mut diagnostics) = {
            let mut merger = Merger::new(registry, &self.table).with_remap(&self.remap);
            let ok = merger.merge_face_ref(face_ref, attrs);
            (ok, merger.into_diagnostics())
        };
        self.diagnostics.append(&mut diagnostics);
        ok
    }

    fn merge_named_into(&mut self, registry: &FaceRegistry, name: &str, attrs: &mut Attrs) -> bool {
        let (ok, mut diagnostics) = {
            let mut merger = Merger::new(registry, &self.table).with_remap(&self.remap);
            let ok = merger.merge_named_face(name, attrs);
            (ok, merger.into_diagnostics())
        };
        self.diagnostics.append(&mut diagnostics);
        ok
    }

    /// Merge the (remapped) definition of `name` into `attrs`. False if
    /// there is no such face.
    fn merge_definition_into(&mut self, registry: &FaceRegistry, name: &str, attrs: &mut Attrs) -> bool {
        let mut diagnostics = {
            let mut merger = Merger::new(registry, &self.table).with_remap(&self.remap);
            match merger.lface_attributes(name) {
                Some(own) => {
                    merger.merge_vectors(&own, attrs);
                    Some(merger.into_diagnostics())
                }
                None => None,
            }
        };
        match diagnostics.as_mut() {
            Some(diagnostics) => {
                self.diagnostics.append(diagnostics);
                true
            }
            None => false,
        }
    }

    /// The default face with `name` merged on top. Without `signal`, an
    /// unknown face is recorded and the default face returned.
    pub fn lookup_named_face(&mut self, registry: &FaceRegistry, name: &str, signal: bool) -> FaceResult<FaceId> {
        self.ensure_basic_faces(registry)?;
        let mut attrs = self.realized_lface(DEFAULT_FACE_ID)?;
        if !self.merge_definition_into(registry, name, &mut attrs) {
            let error = FaceError::InvalidFace { name: name.to_string() };
            if signal {
                return Err(error);
            }
            self.diagnostics.record_error(&error);
            return Ok(DEFAULT_FACE_ID);
        }
        Ok(self.lookup_face(&attrs))
    }

    /// The face to draw the basic face `face_id` with, honoring remapping.
    pub fn lookup_basic_face(&mut self, registry: &FaceRegistry, face_id: FaceId) -> FaceResult<FaceId> {
        self.ensure_basic_faces(registry)?;
        let Some(basic) = BasicFace::from_id(face_id) else {
            return Ok(face_id);
        };
        if !self.remap.contains(basic.name()) {
            return Ok(face_id);
        }
        Ok(self.lookup_named_face(registry, basic.name(), false).unwrap_or(face_id))
    }

    /// The realized face `face_id` with `name` merged on top.
    pub fn lookup_derived_face(&mut self, registry: &FaceRegistry, name: &str, face_id: FaceId) -> FaceResult<FaceId> {
        let mut attrs = self.realized_lface(face_id)?;
        if !self.merge_definition_into(registry, name, &mut attrs) {
            return Err(FaceError::InvalidFace { name: name.to_string() });
        }
        Ok(self.lookup_face(&attrs))
    }

    /// Merge a face into the realized face `base`. Anything that cannot be
    /// merged leaves `base` as the answer.
    pub fn merge_faces(&mut self, registry: &FaceRegistry, selector: FaceSelector<'_>, base: FaceId) -> FaceId {
        let Ok(mut attrs) = self.realized_lface(base) else {
            return base;
        };
        match selector {
            FaceSelector::LfaceId(lface_id) => {
                let Some(name) = registry.lface_name(lface_id) else {
                    return base;
                };
                self.lookup_derived_face(registry, name, base).unwrap_or(base)
            }
            FaceSelector::Named(name) => {
                if !self.merge_named_into(registry, name, &mut attrs) {
                    return base;
                }
                self.lookup_face(&attrs)
            }
            FaceSelector::Realized(face_id) => {
                let Ok(lface) = self.realized_lface(face_id) else {
                    return base;
                };
                let mut diagnostics = {
                    let mut merger = Merger::new(registry, &self.table);
                    merger.merge_vectors(&lface, &mut attrs);
                    merger.into_diagnostics()
                };
                self.diagnostics.append(&mut diagnostics);
                self.lookup_face(&attrs)
            }
        }
    }

    /// `face_id` drawn at `height` (1/10 pt). Surfaces without fonts
    /// return `face_id` itself.
    pub fn face_with_height(&mut self, face_id: FaceId, height: i32) -> FaceId {
        if !self.is_graphical() || height <= 0 {
            return face_id;
        }
        let Ok(mut attrs) = self.realized_lface(face_id) else {
            return face_id;
        };
        attrs[Attr::Height] = AttrValue::Int(height);
        attrs.clear_font_prop(FontProp::Size);
        self.lookup_face(&attrs)
    }

    /// `face_id` with a font `steps` sizes larger (positive) or smaller
    /// (negative). Sizes are tried in steps of half a point, up to ten
    /// points away; a step counts once the rendered font height changes.
    pub fn smaller_or_larger_face(&mut self, face_id: FaceId, steps: i32) -> FaceId {
        if !self.is_graphical() || steps == 0 {
            return face_id;
        }
        let Some(face) = self.cache.get(face_id) else {
            return face_id;
        };
        let mut attrs = face.lface.clone();
        let Some(mut pt) = attrs[Attr::Height].as_int() else {
            return face_id;
        };
        let font_height = |surface: &Surface, id: FaceId| {
            surface.cache.get(id).and_then(|face| face.font.as_ref()).map_or(0, |font| font.height)
        };
        let mut last_height = font_height(self, face_id);
        let mut last_pt = pt;
        let delta = if steps > 0 { FONT_STEP_DELTA } else { -FONT_STEP_DELTA };
        let mut remaining = steps.unsigned_abs();
        let mut new_id = face_id;

        while remaining > 0 && pt + delta > 0 && (last_pt - pt).abs() < FONT_STEP_LIMIT {
            pt += delta;
            attrs[Attr::Height] = AttrValue::Int(pt);
            attrs.clear_font_prop(FontProp::Size);
            new_id = self.lookup_face(&attrs);
            let height = font_height(self, new_id);
            if (delta < 0 && height < last_height) || (delta > 0 && height > last_height) {
                remaining -= 1;
                last_height = height;
                last_pt = pt;
            }
        }
        new_id
    }

    /// Face for `ch` in the face `base` with `face_ref` merged on top.
    pub fn resolve_face_for_char(
        &mut self,
        registry: &FaceRegistry,
        base: FaceId,
        ch: char,
        face_ref: Option<&FaceRef>,
    ) -> FaceResult<FaceId> {
        let id = match face_ref {
            None => base,
            Some(face_ref) => {
                let mut attrs = self.realized_lface(base)?;
                self.merge_ref_into(registry, face_ref, &mut attrs);
                self.lookup_face(&attrs)
            }
        };
        self.face_for_char(id, ch)
    }

    /// Face of buffer text at `query.pos`: the text property, then the
    /// overlays by ascending priority, then the region. Also returns the
    /// next position where the face may change.
    pub fn resolve_face_at_position(
        &mut self,
        registry: &FaceRegistry,
        source: &dyn PropertySource,
        query: &PositionQuery,
    ) -> FaceResult<(FaceId, usize)> {
        self.ensure_basic_faces(registry)?;
        let prop = query.property();
        let mut endpos = source.end();

        let (text_face, next) = source.text_property(query.pos, prop, query.limit);
        if let Some(next) = next {
            endpos = endpos.min(next);
        }

        let (mut overlays, next) = source.overlays_at(query.pos);
        if let Some(next) = next {
            endpos = endpos.min(next);
        }
        overlays.sort_by_key(|overlay| overlay.priority);
        for overlay in &overlays {
            if overlay.end > query.pos {
                endpos = endpos.min(overlay.end);
            }
        }

        let mut in_region = false;
        if let Some(region) = &query.region {
            if region.contains(&query.pos) {
                in_region = true;
                endpos = endpos.min(region.end);
            } else if query.pos < region.start {
                endpos = endpos.min(region.start);
            }
        }

        let default_id = match query.base_face {
            Some(id) => id,
            None => self.lookup_basic_face(registry, DEFAULT_FACE_ID)?,
        };
        let has_overlay_face = overlays.iter().any(|overlay| overlay.property(prop).is_some());
        if text_face.is_none() && !has_overlay_face && !in_region {
            return Ok((default_id, endpos));
        }

        let default_lface = self.realized_lface(default_id)?;
        let mut attrs = default_lface.clone();
        if let Some(face_ref) = &text_face {
            self.merge_ref_into(registry, face_ref, &mut attrs);
        }
        if query.mouse {
            // Only the topmost overlay's mouse face counts, and it replaces
            // the text property.
            if let Some(face_ref) = overlays.iter().rev().find_map(|overlay| overlay.property(prop)) {
                attrs = default_lface;
                self.merge_ref_into(registry, face_ref, &mut attrs);
            }
        } else {
            for face_ref in overlays.iter().filter_map(|overlay| overlay.property(prop)) {
                self.merge_ref_into(registry, face_ref, &mut attrs);
            }
        }
        if in_region && (self.table.contains(REGION_FACE_NAME) || self.remap.contains(REGION_FACE_NAME)) {
            self.merge_named_into(registry, REGION_FACE_NAME, &mut attrs);
        }

        Ok((self.lookup_face(&attrs), endpos))
    }

    /// Face of a display string at `pos`, based on `base_face` (the face
    /// of the buffer text the string is shown for).
    pub fn face_at_string_position(
        &mut self,
        registry: &FaceRegistry,
        string: &dyn PropertySource,
        pos: usize,
        base_face: FaceId,
        mouse: bool,
    ) -> FaceResult<(FaceId, usize)> {
        let prop = if mouse { FaceProperty::MouseFace } else { FaceProperty::Face };
        let (face_ref, next) = string.text_property(pos, prop, string.end());
        let endpos = next.unwrap_or(string.end()).min(string.end());
        let mut attrs = self.realized_lface(base_face)?;
        let Some(face_ref) = face_ref else {
            return Ok((base_face, endpos));
        };
        self.merge_ref_into(registry, &face_ref, &mut attrs);
        Ok((self.lookup_face(&attrs), endpos))
    }

    /// Face of an overlay string at buffer position `pos`: the buffer's
    /// text property with the overlay's own face on top.
    pub fn face_for_overlay_string(
        &mut self,
        registry: &FaceRegistry,
        source: &dyn PropertySource,
        query: &PositionQuery,
        overlay: Option<&Overlay>,
    ) -> FaceResult<(FaceId, usize)> {
        self.ensure_basic_faces(registry)?;
        let prop = query.property();
        let (text_face, next) = source.text_property(query.pos, prop, query.limit);
        let endpos = next.unwrap_or(query.limit).min(source.end());
        let overlay_face = overlay.and_then(|overlay| overlay.property(prop));

        let default_id = self.lookup_basic_face(registry, DEFAULT_FACE_ID)?;
        if text_face.is_none() && overlay_face.is_none() {
            return Ok((DEFAULT_FACE_ID, endpos));
        }
        let mut attrs = self.realized_lface(default_id)?;
        if let Some(face_ref) = &text_face {
            self.merge_ref_into(registry, face_ref, &mut attrs);
        }
        if let Some(face_ref) = overlay_face {
            self.merge_ref_into(registry, face_ref, &mut attrs);
        }
        Ok((self.lookup_face(&attrs), endpos))
    }

    /// Name of the font the face `name` is drawn with, for `ch` if given.
    /// Terminals report their single font.
    pub fn face_font(&mut self, registry: &FaceRegistry, name: &str, ch: Option<char>) -> FaceResult<Option<String>> {
        let mut id = self.lookup_named_face(registry, name, true)?;
        if !self.is_graphical() {
            return Ok(Some(TTY_FONT_NAME.to_string()));
        }
        if let Some(ch) = ch {
            id = self.face_for_char(id, ch)?;
        }
        Ok(self.cache.get(id).and_then(|face| face.font.as_ref()).map(|font| font.name.clone()))
    }

    /// Apply a change of a color parameter to the face it mirrors:
    /// `foreground-color` and `background-color` to the default face,
    /// `border-color`, `cursor-color` and `mouse-color` to the background
    /// of `border`, `cursor` and `mouse`.
    pub fn update_face_from_parameter(&mut self, registry: &FaceRegistry, param: &str, value: Option<&str>) -> FaceResult<()> {
        let (name, attr) = match param {
            "foreground-color" => (DEFAULT_FACE_NAME, Attr::Foreground),
            "background-color" => (DEFAULT_FACE_NAME, Attr::Background),
            "border-color" => ("border", Attr::Background),
            "cursor-color" => ("cursor", Attr::Background),
            "mouse-color" => ("mouse", Attr::Background),
            _ => return Err(FaceError::InvalidAttributeName { keyword: param.to_string() }),
        };
        self.params.set_color(param, value);
        if !self.table.contains(DEFAULT_FACE_NAME) {
            return Ok(());
        }

        self.table.ensure(name);
        if let Some(lface) = self.table.get_mut(name) {
            lface[attr] = value.map_or(AttrValue::Unspecified, AttrValue::str);
        }
        tracing::debug!("Parameter {} changed face {} on surface {}", param, name, self.id());
        if name == DEFAULT_FACE_NAME {
            self.realize_basic_faces(registry)?;
        }
        if !registry.is_no_inherit(name) {
            self.face_change = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::Weight;
    use crate::config::SurfaceParams;
    use crate::dummy_backend::{DummyDisplay, DummyFontMatcher, DummyText};
    use crate::keyword::Value;
    use crate::registry::Scope;
    use crate::traits::TtyCaps;
    use face_color::TtyColorTable;

    fn setup() -> (FaceRegistry, Surface) {
        let mut registry = FaceRegistry::new();
        registry.set_attribute("bold", ":weight", &Value::sym("bold"), Scope::Global).unwrap();
        registry.set_attribute("warning", ":foreground", &Value::str("red"), Scope::Global).unwrap();
        registry.set_attribute("region", ":background", &Value::str("blue"), Scope::Global).unwrap();
        let params = SurfaceParams::new().with_colors("black", "white");
        let mut surface =
            Surface::graphical(1, params, Box::new(DummyDisplay::new()), Box::new(DummyFontMatcher::new()));
        registry.init_surface(&mut surface).unwrap();
        (registry, surface)
    }

    fn red() -> FaceRef {
        FaceRef::plist([(":foreground", Value::str("red"))])
    }

    #[test]
    fn test_lookup_named_face_hits_cache() {
        let (registry, mut surface) = setup();
        let bold = surface.lookup_named_face(&registry, "bold", true).unwrap();
        assert_ne!(bold, DEFAULT_FACE_ID);
        assert_eq!(surface.face(bold).unwrap().lface[Attr::Weight], AttrValue::Weight(Weight::Bold));
        assert_eq!(surface.lookup_named_face(&registry, "bold", true).unwrap(), bold);

        assert!(matches!(
            surface.lookup_named_face(&registry, "no-such-face", true),
            Err(FaceError::InvalidFace { .. })
        ));
        assert_eq!(surface.lookup_named_face(&registry, "no-such-face", false).unwrap(), DEFAULT_FACE_ID);
    }

    #[test]
    fn test_lookup_basic_face_honors_remapping() {
        let (registry, mut surface) = setup();
        let mode_line = BasicFace::ModeLine.id();
        assert_eq!(surface.lookup_basic_face(&registry, mode_line).unwrap(), mode_line);

        surface.set_face_remapping("mode-line", FaceRef::named("bold"));
        let remapped = surface.lookup_basic_face(&registry, mode_line).unwrap();
        assert_ne!(remapped, mode_line);
        assert_eq!(surface.face(remapped).unwrap().lface[Attr::Weight], AttrValue::Weight(Weight::Bold));
    }

    #[test]
    fn test_default_remapped_onto_itself() {
        let (registry, mut surface) = setup();
        surface.set_face_remapping("default", FaceRef::List(vec![red(), FaceRef::named("default")]));
        let id = surface.lookup_basic_face(&registry, DEFAULT_FACE_ID).unwrap();
        let face = surface.face(id).unwrap();
        assert_eq!(face.lface[Attr::Foreground], AttrValue::str("red"));
        assert_eq!(face.lface[Attr::Background], AttrValue::str("white"));
    }

    #[test]
    fn test_derived_and_merged_faces() {
        let (registry, mut surface) = setup();
        let bold = surface.lookup_named_face(&registry, "bold", true).unwrap();
        let bold_warning = surface.lookup_derived_face(&registry, "warning", bold).unwrap();
        let face = surface.face(bold_warning).unwrap();
        assert_eq!(face.lface[Attr::Weight], AttrValue::Weight(Weight::Bold));
        assert_eq!(face.foreground, 0xff0000);

        assert_eq!(surface.merge_faces(&registry, FaceSelector::Named("warning"), bold), bold_warning);
        let warning_id = registry.lface_id("warning").unwrap();
        assert_eq!(surface.merge_faces(&registry, FaceSelector::LfaceId(warning_id), bold), bold_warning);
        let warning = surface.lookup_named_face(&registry, "warning", true).unwrap();
        // A realized face is fully specified, so it replaces every slot.
        assert_eq!(surface.merge_faces(&registry, FaceSelector::Realized(warning), bold), warning);
        assert_eq!(surface.merge_faces(&registry, FaceSelector::Realized(DEFAULT_FACE_ID), bold), DEFAULT_FACE_ID);
        assert_eq!(surface.merge_faces(&registry, FaceSelector::Named("nope"), bold), bold);
        assert_eq!(surface.merge_faces(&registry, FaceSelector::Realized(999), bold), bold);
    }

    #[test]
    fn test_face_at_position() {
        let (registry, mut surface) = setup();
        let text = DummyText::new(10).with_face(0..5, FaceRef::named("bold")).with_overlay(Overlay {
            start: 2,
            end: 4,
            priority: 1,
            face: Some(red()),
            mouse_face: None,
        });

        let (id, next) = surface.resolve_face_at_position(&registry, &text, &PositionQuery::new(0, 10)).unwrap();
        assert_eq!(next, 2);
        assert_eq!(surface.face(id).unwrap().lface[Attr::Weight], AttrValue::Weight(Weight::Bold));

        let (id, next) = surface.resolve_face_at_position(&registry, &text, &PositionQuery::new(3, 10)).unwrap();
        assert_eq!(next, 4);
        let face = surface.face(id).unwrap();
        assert_eq!(face.lface[Attr::Weight], AttrValue::Weight(Weight::Bold));
        assert_eq!(face.foreground, 0xff0000);

        let (id, next) = surface.resolve_face_at_position(&registry, &text, &PositionQuery::new(6, 10)).unwrap();
        assert_eq!((id, next), (DEFAULT_FACE_ID, 10));
    }

    #[test]
    fn test_overlay_priority_and_mouse_face() {
        let (registry, mut surface) = setup();
        let overlay = |priority, color: &str| Overlay {
            start: 0,
            end: 8,
            priority,
            face: Some(FaceRef::plist([(":foreground", Value::str(color))])),
            mouse_face: Some(FaceRef::plist([(":background", Value::str(color))])),
        };
        let text = DummyText::new(8)
            .with_overlay(overlay(5, "green"))
            .with_overlay(overlay(1, "red"))
            .with_mouse_face(0..8, FaceRef::named("bold"));

        let (id, _) = surface.resolve_face_at_position(&registry, &text, &PositionQuery::new(1, 8)).unwrap();
        assert_eq!(surface.face(id).unwrap().lface[Attr::Foreground], AttrValue::str("green"));

        let query = PositionQuery::new(1, 8).with_mouse(true);
        let (id, _) = surface.resolve_face_at_position(&registry, &text, &query).unwrap();
        let face = surface.face(id).unwrap();
        assert_eq!(face.lface[Attr::Background], AttrValue::str("green"));
        assert_eq!(face.lface[Attr::Weight], AttrValue::Weight(Weight::Normal));
    }

    #[test]
    fn test_region_face() {
        let (registry, mut surface) = setup();
        let text = DummyText::new(20);
        let query = PositionQuery::new(2, 20).with_region(5..10);
        let (id, next) = surface.resolve_face_at_position(&registry, &text, &query).unwrap();
        assert_eq!((id, next), (DEFAULT_FACE_ID, 5));

        let query = PositionQuery::new(6, 20).with_region(5..10);
        let (id, next) = surface.resolve_face_at_position(&registry, &text, &query).unwrap();
        assert_eq!(next, 10);
        assert_eq!(surface.face(id).unwrap().background, 0x0000ff);
    }

    #[test]
    fn test_string_and_overlay_string_faces() {
        let (registry, mut surface) = setup();
        let bold = surface.lookup_named_face(&registry, "bold", true).unwrap();
        let string = DummyText::new(6).with_face(3..6, red());
        assert_eq!(surface.face_at_string_position(&registry, &string, 0, bold, false).unwrap(), (bold, 3));
        let (id, next) = surface.face_at_string_position(&registry, &string, 4, bold, false).unwrap();
        assert_eq!(next, 6);
        assert_eq!(surface.face(id).unwrap().lface[Attr::Weight], AttrValue::Weight(Weight::Bold));
        assert_eq!(surface.face(id).unwrap().foreground, 0xff0000);

        let buffer = DummyText::new(10);
        let overlay = Overlay { start: 0, end: 10, priority: 0, face: Some(FaceRef::named("bold")), mouse_face: None };
        let query = PositionQuery::new(2, 10);
        assert_eq!(surface.face_for_overlay_string(&registry, &buffer, &query, None).unwrap().0, DEFAULT_FACE_ID);
        let (id, _) = surface.face_for_overlay_string(&registry, &buffer, &query, Some(&overlay)).unwrap();
        assert_eq!(id, bold);
    }

    #[test]
    fn test_height_changes() {
        let (registry, mut surface) = setup();
        let tall = surface.face_with_height(DEFAULT_FACE_ID, 200);
        assert_eq!(surface.face(tall).unwrap().lface[Attr::Height], AttrValue::Int(200));
        assert_eq!(surface.face_with_height(DEFAULT_FACE_ID, 0), DEFAULT_FACE_ID);

        let base_height = surface.face(DEFAULT_FACE_ID).unwrap().font.as_ref().unwrap().height;
        let larger = surface.smaller_or_larger_face(DEFAULT_FACE_ID, 1);
        let smaller = surface.smaller_or_larger_face(DEFAULT_FACE_ID, -1);
        assert!(surface.face(larger).unwrap().font.as_ref().unwrap().height > base_height);
        assert!(surface.face(smaller).unwrap().font.as_ref().unwrap().height < base_height);
        assert_eq!(surface.smaller_or_larger_face(DEFAULT_FACE_ID, 0), DEFAULT_FACE_ID);

        let mut tty = Surface::terminal(
            2,
            SurfaceParams::new(),
            Box::new(DummyDisplay::terminal(TtyColorTable::ansi8(), TtyCaps::all())),
        );
        registry.init_surface(&mut tty).unwrap();
        assert_eq!(tty.face_with_height(DEFAULT_FACE_ID, 200), DEFAULT_FACE_ID);
        assert_eq!(tty.smaller_or_larger_face(DEFAULT_FACE_ID, 3), DEFAULT_FACE_ID);
        assert_eq!(tty.face_font(&registry, "default", None).unwrap().as_deref(), Some(TTY_FONT_NAME));
    }

    #[test]
    fn test_face_font_and_char_resolution() {
        let (registry, mut surface) = setup();
        let name = surface.face_font(&registry, "bold", None).unwrap().unwrap();
        assert!(name.contains("weight=bold"), "{name}");

        let id = surface.resolve_face_for_char(&registry, DEFAULT_FACE_ID, 'x', Some(&red())).unwrap();
        assert_eq!(surface.face(id).unwrap().foreground, 0xff0000);
        assert_eq!(surface.resolve_face_for_char(&registry, DEFAULT_FACE_ID, 'x', None).unwrap(), DEFAULT_FACE_ID);
    }

    #[test]
    fn test_update_face_from_parameter() {
        let (registry, mut surface) = setup();
        surface.update_face_from_parameter(&registry, "background-color", Some("blue")).unwrap();
        assert_eq!(surface.params.background_color.as_deref(), Some("blue"));
        assert_eq!(surface.face(DEFAULT_FACE_ID).unwrap().background, 0x0000ff);
        assert_eq!(surface.background_pixel(), 0x0000ff);

        surface.update_face_from_parameter(&registry, "cursor-color", Some("red")).unwrap();
        assert_eq!(surface.table().get("cursor").unwrap()[Attr::Background], AttrValue::str("red"));
        assert!(surface.face_change());
        assert!(surface.update_face_from_parameter(&registry, "font-color", None).is_err());
    }
}
