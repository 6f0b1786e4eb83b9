// src/registry.rs
//! Named faces, their logical IDs and aliases.
//!
//! The registry owns the global face table (defaults for new surfaces)
//! and everything shared by all surfaces: aliases, logical IDs, font
//! preferences and configuration. Each [`Surface`] owns its own table;
//! operations that edit faces take a [`Scope`] saying which table to
//! touch.

use std::collections::{HashMap, HashSet};

use crate::attrs::{merge_height, Attr, AttrValue, Attrs, Slant, Weight};
use crate::config::FaceConfig;
use crate::error::{FaceError, FaceResult};
use crate::font::{load_font_for_lface, FontPreferences, FontValue};
use crate::keyword::{height_value, validate, FaceRef, Value};
use crate::merge::Merger;
use crate::surface::Surface;

/// Name of the face every other face falls back to.
pub const DEFAULT_FACE_NAME: &str = "default";

/// Attribute vectors by face name.
#[derive(Clone, Debug, Default)]
pub struct FaceTable {
    faces: HashMap<String, Attrs>,
}

impl FaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Attrs> {
        self.faces.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attrs> {
        self.faces.get_mut(name)
    }

    pub fn insert(&mut self, name: &str, attrs: Attrs) -> Option<Attrs> {
        self.faces.insert(name.to_string(), attrs)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.faces.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.faces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Add an all-unspecified entry for `name` unless one exists.
    /// Returns true if the entry was added.
    pub(crate) fn ensure(&mut self, name: &str) -> bool {
        if self.faces.contains_key(name) {
            return false;
        }
        self.faces.insert(name.to_string(), Attrs::new());
        true
    }
}

/// Tables an edit applies to.
pub enum Scope<'a> {
    /// The global defaults.
    Global,
    /// One surface.
    Surface(&'a mut Surface),
    /// Every given surface, then the global defaults.
    All(&'a mut [Surface]),
}

/// Table a query reads.
#[derive(Clone, Copy)]
pub enum ScopeRef<'a> {
    Global,
    Surface(&'a Surface),
}

pub struct FaceRegistry {
    names: Vec<String>,
    ids: HashMap<String, usize>,
    global: FaceTable,
    aliases: HashMap<String, String>,
    no_inherit: HashSet<String>,
    font_prefs: FontPreferences,
    config: FaceConfig,
    face_change: bool,
    clear_font_table_counter: u32,
}

impl Default for FaceRegistry {
    fn default() -> Self {
        Self::with_config(FaceConfig::default())
    }
}

impl FaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FaceConfig) -> Self {
        let mut registry = Self {
            names: Vec::new(),
            ids: HashMap::new(),
            global: FaceTable::new(),
            aliases: HashMap::new(),
            no_inherit: HashSet::new(),
            font_prefs: FontPreferences::default(),
            config,
            face_change: false,
            clear_font_table_counter: 0,
        };
        registry.ensure_global(DEFAULT_FACE_NAME);
        registry
    }

    pub fn config(&self) -> &FaceConfig {
        &self.config
    }

    pub fn font_preferences(&self) -> &FontPreferences {
        &self.font_prefs
    }

    pub fn global_table(&self) -> &FaceTable {
        &self.global
    }

    /// True when a global edit is waiting to invalidate the surfaces.
    pub fn face_change(&self) -> bool {
        self.face_change
    }

    pub(crate) fn table_for<'s>(&'s self, scope: ScopeRef<'s>) -> &'s FaceTable {
        match scope {
            ScopeRef::Global => &self.global,
            ScopeRef::Surface(surface) => surface.table(),
        }
    }

    // -- Logical IDs ---------------------------------------------------

    pub fn lface_id(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    pub fn lface_name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn next_lface_id(&self) -> usize {
        self.names.len()
    }

    /// Names of all faces, in order of creation.
    pub fn face_names(&self) -> &[String] {
        &self.names
    }

    fn ensure_global(&mut self, name: &str) -> bool {
        if !self.global.ensure(name) {
            return false;
        }
        if !self.ids.contains_key(name) {
            let id = self.names.len();
            self.names.push(name.to_string());
            self.ids.insert(name.to_string(), id);
            tracing::trace!("Face {} has logical id {}", name, id);
        }
        true
    }

    // -- Aliases -------------------------------------------------------

    /// Make `name` an alias of `target`, or remove the alias.
    pub fn face_alias(&mut self, name: &str, target: Option<&str>) {
        match target {
            Some(target) => {
                self.aliases.insert(name.to_string(), target.to_string());
            }
            None => {
                self.aliases.remove(name);
            }
        }
        self.face_change = true;
    }

    pub fn alias_of(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    /// Follow aliases from `name`. A cyclic chain resolves to the default
    /// face.
    pub fn resolve_face_name(&self, name: &str) -> String {
        match self.follow_aliases(name) {
            Some(resolved) => resolved.to_string(),
            None => {
                tracing::warn!("Alias cycle for face {}; using {}", name, DEFAULT_FACE_NAME);
                DEFAULT_FACE_NAME.to_string()
            }
        }
    }

    /// Like [`resolve_face_name`](Self::resolve_face_name), but a cyclic
    /// chain is an error.
    pub fn resolve_face_name_checked(&self, name: &str) -> FaceResult<String> {
        if name.is_empty() {
            return Err(FaceError::InvalidFace { name: name.to_string() });
        }
        self.follow_aliases(name)
            .map(str::to_string)
            .ok_or_else(|| FaceError::AliasCycle { name: name.to_string() })
    }

    fn follow_aliases<'s>(&'s self, name: &'s str) -> Option<&'s str> {
        let mut tortoise = name;
        let mut hare = name;
        loop {
            for _ in 0..2 {
                match self.aliases.get(hare) {
                    Some(next) => hare = next.as_str(),
                    None => return Some(hare),
                }
            }
            tortoise = self.aliases.get(tortoise).map(String::as_str)?;
            if tortoise == hare {
                return None;
            }
        }
    }

    // -- No-inherit faces ----------------------------------------------

    /// Exclude `name` from the redisplay its edits would trigger.
    pub fn set_no_inherit_invalidate(&mut self, name: &str, flag: bool) {
        if flag {
            self.no_inherit.insert(name.to_string());
        } else {
            self.no_inherit.remove(name);
        }
    }

    pub fn is_no_inherit(&self, name: &str) -> bool {
        self.no_inherit.contains(name)
    }

    // -- Face definitions ----------------------------------------------

    /// Attribute vector of `name` in `scope`, if the face exists there.
    pub fn face_definition<'s>(&'s self, name: &str, scope: ScopeRef<'s>) -> Option<&'s Attrs> {
        let name = self.resolve_face_name(name);
        self.table_for(scope).get(&name)
    }

    /// Create `name` in `scope` if it does not exist. An existing face is
    /// left as it is. The face gets a logical ID the first time it is
    /// created anywhere.
    pub fn make_face(&mut self, name: &str, scope: Scope<'_>) -> FaceResult<()> {
        let name = self.resolve_face_name_checked(name)?;
        self.ensure_global(&name);
        let invalidate = !self.no_inherit.contains(&name);
        match scope {
            Scope::Global => {
                if invalidate {
                    self.face_change = true;
                }
            }
            Scope::Surface(surface) => {
                surface.table.ensure(&name);
                if invalidate {
                    surface.face_change = true;
                }
            }
            Scope::All(surfaces) => {
                for surface in surfaces.iter_mut() {
                    surface.table.ensure(&name);
                    if invalidate {
                        surface.face_change = true;
                    }
                }
                if invalidate {
                    self.face_change = true;
                }
            }
        }
        Ok(())
    }

    /// Define `name` globally with the given attributes.
    pub fn define_global(&mut self, name: &str, attrs: Attrs) {
        self.ensure_global(name);
        self.global.insert(name, attrs);
        if !self.no_inherit.contains(name) {
            self.face_change = true;
        }
    }

    /// Set one attribute of `name` in `scope`, creating the face if needed.
    ///
    /// `:bold` and `:italic` are accepted as shorthands for `:weight` and
    /// `:slant`. In global scope, `unspecified` is stored as the
    /// ignore-default marker so the global value does not leak into
    /// surfaces. On a surface, editing the default face (and the
    /// backgrounds of `border`, `cursor` and `mouse`) updates the
    /// surface's parameters.
    pub fn set_attribute(&mut self, name: &str, keyword: &str, value: &Value, scope: Scope<'_>) -> FaceResult<()> {
        let name = self.resolve_face_name_checked(name)?;
        let (attr, value) = normalize_keyword(keyword, value)?;
        match scope {
            Scope::Global => self.set_global_attribute(&name, attr, &value),
            Scope::Surface(surface) => self.set_surface_attribute(&name, attr, &value, surface),
            Scope::All(surfaces) => {
                for surface in surfaces.iter_mut() {
                    self.set_surface_attribute(&name, attr, &value, surface)?;
                }
                self.set_global_attribute(&name, attr, &value)
            }
        }
    }

    fn set_global_attribute(&mut self, name: &str, attr: Attr, value: &Value) -> FaceResult<()> {
        let converted = match value {
            Value::Unspecified => AttrValue::IgnoreDefault,
            _ => validate(attr, value, name == DEFAULT_FACE_NAME)?,
        };
        self.ensure_global(name);
        let lface = self.global.get_mut(name).ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })?;
        lface[attr] = converted;
        if let Some(prop) = attr.font_prop() {
            lface.clear_font_prop(prop);
        }
        Ok(())
    }

    fn set_surface_attribute(&mut self, name: &str, attr: Attr, value: &Value, surface: &mut Surface) -> FaceResult<()> {
        let converted = validate(attr, value, name == DEFAULT_FACE_NAME)?;
        self.ensure_global(name);
        surface.table.ensure(name);

        let Surface { table, fonts, config, font_prefs, .. } = &mut *surface;
        let lface = table.get_mut(name).ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })?;
        let old = lface[attr].clone();

        match converted {
            AttrValue::Font(font) => {
                let loaded = match &font {
                    FontValue::Object(object) => Some(object.clone()),
                    FontValue::Spec(spec) => load_font_for_lface(fonts.as_mut(), lface, Some(spec), font_prefs, config),
                };
                let Some(loaded) = loaded else {
                    return Err(FaceError::FontNotFound { request: font.to_spec().describe() });
                };
                lface.set_from_font(&loaded, true, config);
            }
            converted => {
                lface[attr] = converted;
                if let Some(prop) = attr.font_prop() {
                    lface.clear_font_prop(prop);
                }
            }
        }

        let new = lface[attr].clone();
        if old == new {
            return Ok(());
        }
        if !self.no_inherit.contains(name) {
            surface.face_change = true;
        }
        if new.is_specified() {
            propagate_to_params(name, attr, surface);
        }
        Ok(())
    }

    /// Value of one attribute. The ignore-default marker reads as
    /// unspecified.
    pub fn get_attribute(&self, name: &str, keyword: &str, scope: ScopeRef<'_>) -> FaceResult<Value> {
        let resolved = self.resolve_face_name_checked(name)?;
        let attr = Attr::from_keyword(keyword)
            .ok_or_else(|| FaceError::InvalidAttributeName { keyword: keyword.to_string() })?;
        let lface = self
            .table_for(scope)
            .get(&resolved)
            .ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })?;
        Ok(match &lface[attr] {
            AttrValue::IgnoreDefault => Value::Unspecified,
            value => Value::from(value),
        })
    }

    /// Copy the definition of `from` to `to` within each table of `scope`.
    pub fn copy_face(&mut self, from: &str, to: &str, scope: Scope<'_>) -> FaceResult<()> {
        let from = self.resolve_face_name_checked(from)?;
        let to = self.resolve_face_name_checked(to)?;
        match scope {
            Scope::Global => self.copy_global(&from, &to),
            Scope::Surface(surface) => self.copy_within(&from, &to, surface),
            Scope::All(surfaces) => {
                for surface in surfaces.iter_mut() {
                    self.copy_within(&from, &to, surface)?;
                }
                self.copy_global(&from, &to)
            }
        }
    }

    fn copy_global(&mut self, from: &str, to: &str) -> FaceResult<()> {
        let attrs = self.global.get(from).cloned().ok_or_else(|| FaceError::InvalidFace { name: from.to_string() })?;
        self.ensure_global(to);
        self.global.insert(to, attrs);
        if !self.no_inherit.contains(to) {
            self.face_change = true;
        }
        Ok(())
    }

    fn copy_within(&mut self, from: &str, to: &str, surface: &mut Surface) -> FaceResult<()> {
        let attrs = surface.table.get(from).cloned().ok_or_else(|| FaceError::InvalidFace { name: from.to_string() })?;
        self.ensure_global(to);
        surface.table.insert(to, attrs);
        if !self.no_inherit.contains(to) {
            surface.face_change = true;
        }
        Ok(())
    }

    /// Copy `from` as defined on `src` to `to` on `dst`.
    pub fn copy_face_between(&mut self, from: &str, src: &Surface, to: &str, dst: &mut Surface) -> FaceResult<()> {
        let from = self.resolve_face_name_checked(from)?;
        let to = self.resolve_face_name_checked(to)?;
        let attrs = src.table.get(&from).cloned().ok_or_else(|| FaceError::InvalidFace { name: from.clone() })?;
        self.ensure_global(&to);
        dst.table.insert(&to, attrs);
        if !self.no_inherit.contains(&to) {
            dst.face_change = true;
        }
        Ok(())
    }

    /// Slot-by-slot equality of two faces.
    pub fn attribute_equal(&self, a: &str, b: &str, scope: ScopeRef<'_>) -> FaceResult<bool> {
        let table = self.table_for(scope);
        Ok(self.lookup_in(table, a)? == self.lookup_in(table, b)?)
    }

    fn lookup_in<'t>(&self, table: &'t FaceTable, name: &str) -> FaceResult<&'t Attrs> {
        let resolved = self.resolve_face_name_checked(name)?;
        table.get(&resolved).ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })
    }

    /// True when every attribute of `name` is unspecified.
    pub fn is_empty(&self, name: &str, scope: ScopeRef<'_>) -> FaceResult<bool> {
        let resolved = self.resolve_face_name_checked(name)?;
        self.table_for(scope)
            .get(&resolved)
            .map(Attrs::is_empty)
            .ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })
    }

    /// Copy the global definition of `name` over the surface's. Global
    /// values win here, and ignore-default clears the local slot.
    pub fn merge_global_into_local(&self, name: &str, surface: &mut Surface) -> FaceResult<()> {
        let resolved = self.resolve_face_name_checked(name)?;
        let global = self.global.get(&resolved).ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })?;

        surface.table.ensure(&resolved);
        let Surface { table, fonts, params, config, font_prefs, .. } = &mut *surface;
        let local = table.get_mut(&resolved).ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })?;
        for (attr, value) in global.iter() {
            if value.is_ignore_default() {
                local[attr] = AttrValue::Unspecified;
            } else if value.is_specified() {
                local[attr] = value.clone();
            }
        }

        if resolved == DEFAULT_FACE_NAME {
            let spec = local[Attr::Font].font().map(FontValue::to_spec);
            let has_font_attrs = Attr::ALL.iter().any(|a| a.is_font_related() && local[*a].is_specified());
            if spec.is_some() || has_font_attrs {
                if let Some(font) = load_font_for_lface(fonts.as_mut(), local, spec.as_ref(), font_prefs, config) {
                    params.font = Some(font);
                }
            }
        }
        surface.face_change = true;
        Ok(())
    }

    // -- Static helpers ------------------------------------------------

    /// True when `value` has to be merged with something else before it
    /// can be used.
    pub fn face_attribute_relative_p(keyword: &str, value: &Value) -> bool {
        match value {
            Value::Unspecified | Value::IgnoreDefault => true,
            _ if keyword == Attr::Height.keyword() => !matches!(value, Value::Int(_)),
            _ => false,
        }
    }

    /// Combine `v1` with `v2`: a relative `v1` is merged with `v2`,
    /// anything else wins outright.
    pub fn merge_face_attribute(keyword: &str, v1: &Value, v2: &Value) -> Value {
        if matches!(v1, Value::Unspecified | Value::IgnoreDefault) {
            return v2.clone();
        }
        if keyword == Attr::Height.keyword() {
            let merged = height_value(v1).and_then(|from| {
                let to = height_value(v2).unwrap_or(AttrValue::Unspecified);
                merge_height(&from, &to)
            });
            if let Some(height) = merged {
                return Value::from(&height);
            }
        }
        v1.clone()
    }

    /// Merge `face_ref` into an empty vector using the faces of `scope`.
    pub fn face_attributes_as_vector(&self, face_ref: &FaceRef, scope: ScopeRef<'_>) -> Attrs {
        let mut attrs = Attrs::new();
        let mut merger = match scope {
            ScopeRef::Global => Merger::new(self, &self.global),
            ScopeRef::Surface(surface) => Merger::new(self, surface.table()).with_remap(surface.remap()),
        };
        merger.merge_face_ref(face_ref, &mut attrs);
        attrs
    }

    /// `(bold italic)`-style summary of a global definition: which of
    /// the two it asks for, italic first.
    pub fn face_font_shorthand(&self, name: &str) -> FaceResult<Vec<&'static str>> {
        let resolved = self.resolve_face_name_checked(name)?;
        let lface = self.global.get(&resolved).ok_or_else(|| FaceError::InvalidFace { name: name.to_string() })?;
        let mut out = Vec::new();
        if lface[Attr::Slant].slant().is_some_and(|s| s != Slant::Normal) {
            out.push("italic");
        }
        if lface[Attr::Weight].weight().is_some_and(|w| w != Weight::Normal) {
            out.push("bold");
        }
        Ok(out)
    }

    // -- Font preferences ----------------------------------------------

    pub fn set_font_selection_order(&mut self, keywords: &[&str], surfaces: &mut [Surface]) -> FaceResult<()> {
        let order = FontPreferences::parse_order(keywords)?;
        if order != self.font_prefs.order {
            self.font_prefs.order = order;
            self.publish_font_prefs(surfaces);
        }
        Ok(())
    }

    pub fn set_alternative_font_family_alist(&mut self, alist: Vec<Vec<String>>, surfaces: &mut [Surface]) {
        self.font_prefs.alternative_families = alist;
        self.publish_font_prefs(surfaces);
    }

    pub fn set_alternative_font_registry_alist(&mut self, alist: Vec<Vec<String>>, surfaces: &mut [Surface]) {
        self.font_prefs.alternative_registries = alist;
        self.publish_font_prefs(surfaces);
    }

    fn publish_font_prefs(&mut self, surfaces: &mut [Surface]) {
        for surface in surfaces.iter_mut() {
            surface.font_prefs = self.font_prefs.clone();
            surface.invalidate_all();
        }
        self.face_change = true;
    }

    pub fn set_tty_suppress_bold_inverse_default_colors(&mut self, flag: bool, surfaces: &mut [Surface]) {
        self.config.tty_suppress_bold_inverse_default_colors = flag;
        for surface in surfaces.iter_mut() {
            surface.config.tty_suppress_bold_inverse_default_colors = flag;
            surface.face_change = true;
        }
    }

    // -- Surfaces ------------------------------------------------------

    /// Give a new surface the global faces and realize its basic faces.
    /// Fails when the default face cannot be realized.
    pub fn init_surface(&self, surface: &mut Surface) -> FaceResult<()> {
        surface.config = self.config.clone();
        surface.font_prefs = self.font_prefs.clone();
        for name in &self.names {
            self.merge_global_into_local(name, surface)?;
        }
        surface.face_change = false;
        surface.realize_basic_faces(self)
    }

    /// Bring every surface's realized faces up to date before a redraw.
    pub fn redisplay_surfaces(&mut self, surfaces: &mut [Surface]) -> FaceResult<()> {
        if std::mem::take(&mut self.face_change) {
            for surface in surfaces.iter_mut() {
                surface.face_change = true;
            }
        }
        for surface in surfaces.iter_mut() {
            surface.begin_redisplay(self)?;
        }
        Ok(())
    }

    /// Periodic maintenance. Every `clear_font_table_count` calls, or when
    /// `clear_fonts` is set, surfaces holding too many fonts drop all
    /// realized faces and prune their font tables. Other calls only
    /// release drawing contexts.
    pub fn clear_face_cache(&mut self, surfaces: &mut [Surface], clear_fonts: bool) {
        self.clear_font_table_counter += 1;
        if clear_fonts || self.clear_font_table_counter >= self.config.clear_font_table_count {
            self.clear_font_table_counter = 0;
            for surface in surfaces.iter_mut() {
                if surface.fonts.loaded_font_count() > surface.config.clear_font_table_nfonts {
                    tracing::debug!("Surface {} holds too many fonts; clearing faces", surface.id());
                    surface.invalidate_all();
                    surface.fonts.prune();
                }
            }
        } else {
            for surface in surfaces.iter_mut() {
                surface.release_draw_contexts();
            }
        }
    }
}

fn normalize_keyword(keyword: &str, value: &Value) -> FaceResult<(Attr, Value)> {
    let shorthand = |attr: Attr, on: &str| {
        let value = match value {
            Value::Unspecified | Value::IgnoreDefault => value.clone(),
            Value::Nil => Value::sym("normal"),
            _ => Value::sym(on),
        };
        (attr, value)
    };
    match keyword {
        ":bold" => Ok(shorthand(Attr::Weight, "bold")),
        ":italic" => Ok(shorthand(Attr::Slant, "italic")),
        _ => Attr::from_keyword(keyword)
            .map(|attr| (attr, value.clone()))
            .ok_or_else(|| FaceError::InvalidAttributeName { keyword: keyword.to_string() }),
    }
}

/// Write an edited face attribute back into the surface parameters it
/// mirrors.
fn propagate_to_params(name: &str, attr: Attr, surface: &mut Surface) {
    let Surface { table, fonts, params, config, font_prefs, .. } = surface;
    let Some(lface) = table.get(name) else {
        return;
    };
    match (name, attr) {
        (DEFAULT_FACE_NAME, Attr::Foreground) => {
            params.set_color("foreground-color", lface[attr].as_str());
        }
        (DEFAULT_FACE_NAME, Attr::Background) => {
            params.set_color("background-color", lface[attr].as_str());
        }
        (DEFAULT_FACE_NAME, attr) if attr.is_font_related() || attr == Attr::Font => {
            let spec = lface[Attr::Font].font().map(FontValue::to_spec);
            if let Some(font) = load_font_for_lface(fonts.as_mut(), lface, spec.as_ref(), font_prefs, config) {
                params.font = Some(font);
            }
        }
        ("border", Attr::Background) => {
            params.set_color("border-color", lface[attr].as_str());
        }
        ("cursor", Attr::Background) => {
            params.set_color("cursor-color", lface[attr].as_str());
        }
        ("mouse", Attr::Background) => {
            params.set_color("mouse-color", lface[attr].as_str());
        }
        _ => {}
    }
}
