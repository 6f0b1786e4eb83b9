// src/merge.rs
//! Resolution of face references into attribute vectors.
//!
//! A reference is merged into a target vector: names go through alias
//! resolution, remapping and the face table; property lists are validated
//! keyword by keyword; lists are merged back to front so earlier entries
//! win. Inheritance is resolved through the same path, and a stack of
//! merge points stops every cycle. Problems are recorded and skipped.

use crate::attrs::{merge_height, Attr, AttrValue, Attrs};
use crate::error::{Diagnostics, FaceError};
use crate::font::{FontProp, FontValue};
use crate::keyword::{height_value, validate, FaceRef, Value};
use crate::registry::{FaceRegistry, FaceTable};
use crate::remap::RemapTable;

/// Whether a merge point was entered through a remapping or through a
/// plain name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeKind {
    Normal,
    Remap,
}

/// Faces currently being merged, innermost last.
#[derive(Clone, Debug, Default)]
pub struct MergePoints {
    stack: Vec<(String, MergeKind)>,
}

impl MergePoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `name`. Fails when `name` is already being merged with the
    /// same kind. A remap entry hides older entries for the same name, so
    /// a remapping may refer to the face it remaps.
    pub fn push(&mut self, name: &str, kind: MergeKind) -> bool {
        for (entered, entered_kind) in self.stack.iter().rev() {
            if entered == name {
                if *entered_kind == kind {
                    return false;
                }
                if *entered_kind == MergeKind::Remap {
                    break;
                }
            }
        }
        self.stack.push((name.to_string(), kind));
        true
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Merges references against one face table.
pub struct Merger<'a> {
    registry: &'a FaceRegistry,
    table: &'a FaceTable,
    remap: Option<&'a RemapTable>,
    diagnostics: Diagnostics,
}

impl<'a> Merger<'a> {
    pub fn new(registry: &'a FaceRegistry, table: &'a FaceTable) -> Self {
        Self { registry, table, remap: None, diagnostics: Diagnostics::new() }
    }

    pub fn with_remap(mut self, remap: &'a RemapTable) -> Self {
        self.remap = Some(remap);
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Merge `face_ref` into `to`. Returns false if any part of the
    /// reference was invalid; the valid parts are merged regardless.
    pub fn merge_face_ref(&mut self, face_ref: &FaceRef, to: &mut Attrs) -> bool {
        let mut points = MergePoints::new();
        self.merge_ref(face_ref, to, true, &mut points)
    }

    pub fn merge_named_face(&mut self, name: &str, to: &mut Attrs) -> bool {
        let mut points = MergePoints::new();
        self.merge_named(name, to, &mut points)
    }

    pub fn merge_vectors(&mut self, from: &Attrs, to: &mut Attrs) {
        let mut points = MergePoints::new();
        self.merge_vectors_with(from, to, &mut points);
    }

    /// Attributes of the face `name`, after alias resolution and
    /// remapping. `None` if there is no such face or its remapping is
    /// invalid.
    pub fn lface_attributes(&mut self, name: &str) -> Option<Attrs> {
        let mut points = MergePoints::new();
        self.get_lface_attributes(name, &mut points)
    }

    fn get_lface_attributes(&mut self, name: &str, points: &mut MergePoints) -> Option<Attrs> {
        let name = self.registry.resolve_face_name(name);

        if let Some(remapping) = self.remap.and_then(|remap| remap.get(&name)) {
            if points.push(&name, MergeKind::Remap) {
                let mut attrs = Attrs::new();
                let ok = self.merge_ref(remapping, &mut attrs, true, points);
                points.pop();
                return ok.then_some(attrs);
            }
        }

        self.table.get(&name).cloned()
    }

    fn merge_named(&mut self, name: &str, to: &mut Attrs, points: &mut MergePoints) -> bool {
        if !points.push(name, MergeKind::Normal) {
            self.diagnostics.record_error(&FaceError::InheritanceCycle { name: name.to_string() });
            return false;
        }
        let ok = match self.get_lface_attributes(name, points) {
            Some(from) => {
                self.merge_vectors_with(&from, to, points);
                true
            }
            None => false,
        };
        points.pop();
        ok
    }

    fn merge_ref(&mut self, face_ref: &FaceRef, to: &mut Attrs, err_msgs: bool, points: &mut MergePoints) -> bool {
        let ok = match face_ref {
            FaceRef::Named(name) => self.merge_named(name, to, points),
            FaceRef::Foreground(color) | FaceRef::Background(color) if color.is_empty() => false,
            FaceRef::Foreground(color) => {
                to[Attr::Foreground] = AttrValue::Str(color.clone());
                true
            }
            FaceRef::Background(color) => {
                to[Attr::Background] = AttrValue::Str(color.clone());
                true
            }
            FaceRef::Plist(pairs) => {
                let mut ok = true;
                for (keyword, value) in pairs {
                    if !self.merge_plist_entry(keyword, value, to, err_msgs, points) {
                        ok = false;
                    }
                }
                return ok;
            }
            FaceRef::List(refs) => {
                let mut ok = true;
                for face_ref in refs.iter().rev() {
                    if !self.merge_ref(face_ref, to, err_msgs, points) {
                        ok = false;
                    }
                }
                return ok;
            }
        };

        if !ok && err_msgs {
            self.diagnostics
                .record_error(&FaceError::InvalidFaceReference { reference: face_ref.describe() });
        }
        ok
    }

    fn merge_plist_entry(
        &mut self,
        keyword: &str,
        value: &Value,
        to: &mut Attrs,
        err_msgs: bool,
        points: &mut MergePoints,
    ) -> bool {
        let Some(attr) = Attr::from_keyword(keyword) else {
            if err_msgs {
                self.diagnostics
                    .record_error(&FaceError::InvalidAttributeName { keyword: keyword.to_string() });
            }
            return false;
        };
        if matches!(value, Value::Unspecified) {
            return true;
        }

        match attr {
            Attr::Inherit => match validate(attr, value, false) {
                Ok(AttrValue::Inherit(names)) => {
                    let inherited = FaceRef::List(names.into_iter().map(FaceRef::Named).collect());
                    self.merge_ref(&inherited, to, err_msgs, points)
                }
                Ok(_) => true,
                Err(err) => {
                    if err_msgs {
                        self.diagnostics.record_error(&err);
                    }
                    false
                }
            },
            Attr::Height => match height_value(value).and_then(|h| merge_height(&h, &to[Attr::Height])) {
                Some(height) => {
                    to[Attr::Height] = height;
                    to.clear_font_prop(FontProp::Size);
                    true
                }
                None => {
                    if err_msgs {
                        self.diagnostics.record_error(&FaceError::invalid_value(keyword, value));
                    }
                    false
                }
            },
            _ => match validate(attr, value, false) {
                Ok(converted) => {
                    if converted.is_specified() {
                        to[attr] = converted;
                        if let Some(prop) = attr.font_prop() {
                            to.clear_font_prop(prop);
                        }
                    }
                    true
                }
                Err(err) => {
                    if err_msgs {
                        self.diagnostics.record_error(&err);
                    }
                    false
                }
            },
        }
    }

    fn merge_vectors_with(&mut self, from: &Attrs, to: &mut Attrs, points: &mut MergePoints) {
        if let AttrValue::Inherit(names) = &from[Attr::Inherit] {
            let inherited = FaceRef::List(names.iter().cloned().map(FaceRef::Named).collect());
            self.merge_ref(&inherited, to, false, points);
        }

        if let AttrValue::Font(from_font) = &from[Attr::Font] {
            let merged = match &to[Attr::Font] {
                AttrValue::Font(to_font) => {
                    let from_spec = from_font.to_spec();
                    let mut spec = to_font.to_spec();
                    spec.merge_from(&from_spec);
                    spec.name = from_spec.name;
                    FontValue::Spec(spec)
                }
                _ => from_font.clone(),
            };
            to[Attr::Font] = AttrValue::Font(merged);
            to[Attr::Fontset] = AttrValue::Nil;
        }

        for (attr, value) in from.iter() {
            if !value.is_specified() {
                continue;
            }
            if attr == Attr::Height && !matches!(value, AttrValue::Int(_)) {
                if let Some(height) = merge_height(value, &to[Attr::Height]) {
                    to[Attr::Height] = height;
                }
                to.clear_font_prop(FontProp::Size);
            } else if attr != Attr::Font && to[attr] != *value {
                to[attr] = value.clone();
                if let Some(prop) = attr.font_prop() {
                    to.clear_font_prop(prop);
                }
            }
        }

        if let AttrValue::Font(font) = &from[Attr::Font] {
            let spec = font.to_spec();
            if let Some(family) = spec.family {
                to[Attr::Family] = AttrValue::Str(family);
            }
            if let Some(foundry) = spec.foundry {
                to[Attr::Foundry] = AttrValue::Str(foundry);
            }
            if let Some(weight) = spec.weight {
                to[Attr::Weight] = AttrValue::Weight(weight);
            }
            if let Some(slant) = spec.slant {
                to[Attr::Slant] = AttrValue::Slant(slant);
            }
            if let Some(width) = spec.width {
                to[Attr::Width] = AttrValue::Width(width);
            }
            to.clear_font_prop(FontProp::Size);
        }

        to[Attr::Inherit] = AttrValue::Nil;
    }
}
