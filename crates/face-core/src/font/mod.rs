//! Font specs, loaded fonts, and the request a face hands to a font
//! matcher.
//!
//! A face's `:font` slot holds either a [`FontSpec`] (a partial
//! description that still has to be matched) or a [`FontObject`] (a font
//! that has been loaded). Matching itself is done by a
//! [`FontMatcher`](crate::traits::FontMatcher); this module only builds
//! requests from attribute vectors and walks the alternative families and
//! registries.

pub mod discovery;
pub mod matcher;

pub use discovery::{discover_fonts, discover_system_fonts, FontLocation, SystemFont};
pub use matcher::SystemFontMatcher;

use crate::attrs::{Attr, Attrs, Slant, Weight, Width};
use crate::config::FaceConfig;
use crate::error::{FaceError, FaceResult};
use crate::traits::FontMatcher;

/// Identifies a font loaded by a matcher.
pub type FontHandle = u32;

/// Properties of a font spec that faces can clear individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontProp {
    Family,
    Foundry,
    Weight,
    Slant,
    Width,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FontSize {
    Pixels(i32),
    Points(f64),
}

impl FontSize {
    pub fn to_pixels(self, config: &FaceConfig) -> i32 {
        match self {
            FontSize::Pixels(px) => px,
            FontSize::Points(pt) => config.decipoints_to_pixel((pt * 10.0).round() as i32),
        }
    }
}

/// Partial font description. `None` fields are free.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontSpec {
    pub family: Option<String>,
    pub foundry: Option<String>,
    pub weight: Option<Weight>,
    pub slant: Option<Slant>,
    pub width: Option<Width>,
    pub size: Option<FontSize>,
    pub registry: Option<String>,
    /// Name the spec was parsed from, if any.
    pub name: Option<String>,
}

impl FontSpec {
    pub fn family(family: &str) -> Self {
        Self { family: Some(family.to_string()), ..Self::default() }
    }

    pub fn clear(&mut self, prop: FontProp) {
        match prop {
            FontProp::Family => self.family = None,
            FontProp::Foundry => self.foundry = None,
            FontProp::Weight => self.weight = None,
            FontProp::Slant => self.slant = None,
            FontProp::Width => self.width = None,
            FontProp::Size => self.size = None,
        }
    }

    /// Overlay every property `from` sets onto `self`.
    pub fn merge_from(&mut self, from: &FontSpec) {
        fn take<T: Clone>(to: &mut Option<T>, from: &Option<T>) {
            if from.is_some() {
                to.clone_from(from);
            }
        }
        take(&mut self.family, &from.family);
        take(&mut self.foundry, &from.foundry);
        take(&mut self.weight, &from.weight);
        take(&mut self.slant, &from.slant);
        take(&mut self.width, &from.width);
        take(&mut self.size, &from.size);
        take(&mut self.registry, &from.registry);
        take(&mut self.name, &from.name);
    }

    pub fn describe(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let mut out = self.family.clone().unwrap_or_else(|| "*".to_string());
        if let Some(size) = self.size {
            match size {
                FontSize::Pixels(px) => out.push_str(&format!(":pixelsize={px}")),
                FontSize::Points(pt) => out.push_str(&format!("-{pt}")),
            }
        }
        if let Some(weight) = self.weight {
            out.push_str(&format!(":weight={weight}"));
        }
        if let Some(slant) = self.slant {
            out.push_str(&format!(":slant={slant}"));
        }
        out
    }
}

/// A font a matcher has loaded, with its actual properties.
#[derive(Debug, Clone, PartialEq)]
pub struct FontObject {
    pub handle: FontHandle,
    pub name: String,
    pub family: String,
    pub foundry: String,
    pub weight: Weight,
    pub slant: Slant,
    pub width: Width,
    pub pixel_size: i32,
    /// Line height in pixels.
    pub height: i32,
    pub registry: String,
}

impl FontObject {
    pub fn to_spec(&self) -> FontSpec {
        FontSpec {
            family: Some(self.family.clone()),
            foundry: Some(self.foundry.clone()),
            weight: Some(self.weight),
            slant: Some(self.slant),
            width: Some(self.width),
            size: Some(FontSize::Pixels(self.pixel_size)),
            registry: Some(self.registry.clone()),
            name: Some(self.name.clone()),
        }
    }

    /// True when the two fonts differ in any matching property.
    /// Family, foundry and registry compare without case.
    pub fn differs_from(&self, other: &FontObject) -> bool {
        !self.family.eq_ignore_ascii_case(&other.family)
            || !self.foundry.eq_ignore_ascii_case(&other.foundry)
            || !self.registry.eq_ignore_ascii_case(&other.registry)
            || self.weight != other.weight
            || self.slant != other.slant
            || self.width != other.width
            || self.pixel_size != other.pixel_size
    }
}

/// Value of a face's `:font` slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FontValue {
    Spec(FontSpec),
    Object(FontObject),
}

impl FontValue {
    pub fn to_spec(&self) -> FontSpec {
        match self {
            FontValue::Spec(spec) => spec.clone(),
            FontValue::Object(font) => font.to_spec(),
        }
    }

    pub fn object(&self) -> Option<&FontObject> {
        match self {
            FontValue::Object(font) => Some(font),
            FontValue::Spec(_) => None,
        }
    }
}

/// Properties compared when ranking candidate fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Width,
    Height,
    Weight,
    Slant,
}

impl SortKey {
    pub fn from_keyword(keyword: &str) -> Option<SortKey> {
        match keyword {
            ":width" => Some(SortKey::Width),
            ":height" => Some(SortKey::Height),
            ":weight" => Some(SortKey::Weight),
            ":slant" => Some(SortKey::Slant),
            _ => None,
        }
    }
}

pub const DEFAULT_SORT_ORDER: [SortKey; 4] = [SortKey::Width, SortKey::Height, SortKey::Weight, SortKey::Slant];

/// What a matcher is asked for: a filled-in spec and the order in which
/// mismatching properties should be tolerated (first key matters most).
#[derive(Debug, Clone, PartialEq)]
pub struct FontRequest {
    pub spec: FontSpec,
    pub order: [SortKey; 4],
}

impl FontRequest {
    pub fn new(spec: FontSpec) -> Self {
        Self { spec, order: DEFAULT_SORT_ORDER }
    }
}

/// Font selection preferences shared by all surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct FontPreferences {
    pub order: [SortKey; 4],
    /// Each entry is a family followed by the families to try instead.
    pub alternative_families: Vec<Vec<String>>,
    /// Each entry is a registry followed by the registries to try instead.
    pub alternative_registries: Vec<Vec<String>>,
}

impl Default for FontPreferences {
    fn default() -> Self {
        Self {
            order: DEFAULT_SORT_ORDER,
            alternative_families: Vec::new(),
            alternative_registries: Vec::new(),
        }
    }
}

impl FontPreferences {
    /// Parse a sort order; it must name each of `:width`, `:height`,
    /// `:weight` and `:slant` exactly once.
    pub fn parse_order(keywords: &[&str]) -> FaceResult<[SortKey; 4]> {
        if keywords.len() != 4 {
            return Err(FaceError::InvalidSortOrder {
                reason: format!("expected 4 keys, got {}", keywords.len()),
            });
        }
        let mut order = DEFAULT_SORT_ORDER;
        for (slot, keyword) in order.iter_mut().zip(keywords) {
            *slot = SortKey::from_keyword(keyword).ok_or_else(|| FaceError::InvalidSortOrder {
                reason: format!("unknown key {keyword}"),
            })?;
        }
        for (i, key) in order.iter().enumerate() {
            if order[i + 1..].contains(key) {
                return Err(FaceError::InvalidSortOrder { reason: format!("duplicate key {key:?}") });
            }
        }
        Ok(order)
    }

    /// Families to try for `family`, most preferred first. A family taken
    /// from the face's attributes is followed by its alternatives and,
    /// last, by any family at all.
    pub fn family_candidates(&self, family: Option<&str>) -> Vec<Option<String>> {
        let Some(family) = family else {
            return vec![None];
        };
        let mut out: Vec<Option<String>> = match find_alternatives(&self.alternative_families, family) {
            Some(list) => list.iter().cloned().map(Some).collect(),
            None => vec![Some(family.to_string())],
        };
        out.push(None);
        out
    }

    pub fn registry_candidates(&self, registry: Option<&str>) -> Vec<Option<String>> {
        let Some(registry) = registry else {
            return vec![None];
        };
        match find_alternatives(&self.alternative_registries, registry) {
            Some(list) => list.iter().cloned().map(Some).collect(),
            None => vec![Some(registry.to_string())],
        }
    }
}

fn find_alternatives<'a>(alist: &'a [Vec<String>], key: &str) -> Option<&'a [String]> {
    alist
        .iter()
        .find(|entry| entry.first().is_some_and(|head| head.eq_ignore_ascii_case(key)))
        .map(Vec::as_slice)
}

/// Fill the unset properties of `spec` from a face's attributes.
pub fn spec_for_attrs(attrs: &Attrs, spec: Option<&FontSpec>, config: &FaceConfig) -> FontSpec {
    let mut out = spec.cloned().unwrap_or_default();
    if out.family.is_none() {
        out.family = attrs[Attr::Family].as_str().map(str::to_string);
    }
    if out.foundry.is_none() {
        out.foundry = attrs[Attr::Foundry].as_str().map(str::to_string);
    }
    if out.weight.is_none() {
        out.weight = attrs[Attr::Weight].weight();
    }
    if out.slant.is_none() {
        out.slant = attrs[Attr::Slant].slant();
    }
    if out.width.is_none() {
        out.width = attrs[Attr::Width].width();
    }
    if out.size.is_none() {
        out.size = attrs[Attr::Height].as_int().map(|h| FontSize::Pixels(config.decipoints_to_pixel(h)));
    }
    out
}

/// Load the font a face's attributes ask for. A named spec is opened by
/// name first; otherwise the face's family, its alternatives and finally
/// any family are tried, each with the registry and its alternatives.
pub fn load_font_for_lface(
    fonts: &mut dyn FontMatcher,
    attrs: &Attrs,
    spec: Option<&FontSpec>,
    prefs: &FontPreferences,
    config: &FaceConfig,
) -> Option<FontObject> {
    if let Some(name) = spec.and_then(|s| s.name.as_deref()) {
        if let Some(font) = fonts.open_by_name(name) {
            return Some(font);
        }
    }

    let explicit_family = spec.is_some_and(|s| s.family.is_some());
    let mut base = spec_for_attrs(attrs, spec, config);
    base.name = None;

    let families = if explicit_family {
        vec![base.family.clone()]
    } else {
        prefs.family_candidates(base.family.as_deref())
    };
    let registries = prefs.registry_candidates(base.registry.as_deref());

    for family in &families {
        for registry in &registries {
            let request = FontRequest {
                spec: FontSpec { family: family.clone(), registry: registry.clone(), ..base.clone() },
                order: prefs.order,
            };
            if let Some(font) = fonts.match_font(&request) {
                tracing::trace!("Loaded font {} for {}", font.name, request.spec.describe());
                return Some(font);
            }
        }
    }

    tracing::debug!("No font matches {}", base.describe());
    None
}

/// Parse a font name: an XLFD (`-foundry-family-weight-slant-...`) or a
/// fontconfig-style name (`Family-12:weight=bold:slant=italic`).
pub fn parse_font_name(name: &str) -> FaceResult<FontSpec> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FaceError::InvalidFontName { name: name.to_string() });
    }
    let mut spec = if trimmed.starts_with('-') {
        parse_xlfd(trimmed).ok_or_else(|| FaceError::InvalidFontName { name: name.to_string() })?
    } else {
        parse_fontconfig_name(trimmed)?
    };
    spec.name = Some(trimmed.to_string());
    Ok(spec)
}

fn wildcard(field: &str) -> Option<String> {
    if field.is_empty() || field == "*" {
        None
    } else {
        Some(field.to_string())
    }
}

fn parse_xlfd(name: &str) -> Option<FontSpec> {
    let fields: Vec<&str> = name[1..].split('-').collect();
    if fields.len() < 14 {
        return None;
    }
    let slant = match fields[3] {
        "r" | "R" => Some(Slant::Normal),
        "i" | "I" => Some(Slant::Italic),
        "o" | "O" => Some(Slant::Oblique),
        "ri" | "RI" => Some(Slant::ReverseItalic),
        "ro" | "RO" => Some(Slant::ReverseOblique),
        _ => None,
    };
    let size = match fields[6].parse::<i32>() {
        Ok(px) if px > 0 => Some(FontSize::Pixels(px)),
        _ => match fields[7].parse::<i32>() {
            Ok(deci) if deci > 0 => Some(FontSize::Points(deci as f64 / 10.0)),
            _ => None,
        },
    };
    let registry = match (wildcard(fields[12]), wildcard(fields[13])) {
        (Some(reg), Some(enc)) => Some(format!("{reg}-{enc}")),
        (Some(reg), None) => Some(reg),
        _ => None,
    };
    Some(FontSpec {
        foundry: wildcard(fields[0]),
        family: wildcard(fields[1]),
        weight: Weight::from_name(&fields[2].to_ascii_lowercase()),
        slant,
        width: Width::from_name(&fields[4].to_ascii_lowercase()),
        size,
        registry,
        name: None,
    })
}

fn parse_fontconfig_name(name: &str) -> FaceResult<FontSpec> {
    let invalid = || FaceError::InvalidFontName { name: name.to_string() };
    let mut parts = name.split(':');
    let head = parts.next().unwrap_or_default();

    let mut spec = FontSpec::default();
    let (family, size) = match head.rsplit_once('-') {
        Some((family, size)) => match size.parse::<f64>() {
            Ok(pt) if pt.is_finite() => (family, Some(pt)),
            _ => (head, None),
        },
        None => (head, None),
    };
    spec.family = wildcard(family.trim());
    if let Some(size) = size {
        if size <= 0.0 {
            return Err(invalid());
        }
        spec.size = Some(FontSize::Points(size));
    }

    for prop in parts.filter(|p| !p.is_empty()) {
        match prop.split_once('=') {
            Some(("weight", v)) => spec.weight = Some(Weight::from_name(v).ok_or_else(invalid)?),
            Some(("slant", v)) => spec.slant = Some(Slant::from_name(v).ok_or_else(invalid)?),
            Some(("width", v)) => spec.width = Some(Width::from_name(v).ok_or_else(invalid)?),
            Some(("foundry", v)) => spec.foundry = wildcard(v),
            Some(("registry", v)) => spec.registry = wildcard(v),
            Some(("pixelsize", v)) => {
                spec.size = Some(FontSize::Pixels(v.parse().map_err(|_| invalid())?));
            }
            Some(("size", v)) => spec.size = Some(FontSize::Points(v.parse().map_err(|_| invalid())?)),
            Some(_) => {
                tracing::debug!("Ignoring font name property {} in {}", prop, name);
            }
            None => {
                if let Some(weight) = Weight::from_name(prop) {
                    spec.weight = Some(weight);
                } else if let Some(slant) = Slant::from_name(prop) {
                    spec.slant = Some(slant);
                } else if let Some(width) = Width::from_name(prop) {
                    spec.width = Some(width);
                } else {
                    return Err(invalid());
                }
            }
        }
    }
    Ok(spec)
}
