// src/attrs.rs
//! Attribute vectors: the sparse style record every face is described by.
//!
//! A slot is either unspecified (take the value from somewhere else), the
//! ignore-default marker (stay unspecified even when global defaults are
//! merged in), or a concrete value. Merging walks these slots; realization
//! requires every slot except `:font`, `:inherit` and
//! `:distant-foreground` to be concrete.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::config::FaceConfig;
use crate::constants::LFACE_VECTOR_SIZE;
use crate::font::{FontObject, FontProp, FontValue};

macro_rules! style_scale {
    ($(#[$meta:meta])* $name:ident {
        $($variant:ident = $value:expr => [$($alias:literal),+]),+ $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Position on the numeric scale, where normal is 100.
            pub fn numeric(self) -> i32 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => style_scale!(@first $($alias),+)),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($($alias)|+ => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Variant closest to `value` on the numeric scale.
            pub fn from_numeric(value: i32) -> Self {
                let mut best = Self::ALL[0];
                for &candidate in Self::ALL {
                    if (candidate.numeric() - value).abs() < (best.numeric() - value).abs() {
                        best = candidate;
                    }
                }
                best
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Normal
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
    (@first $first:literal $(, $rest:literal)*) => { $first };
}

style_scale! {
    Weight {
        Thin = 0 => ["thin"],
        UltraLight = 20 => ["ultra-light", "ultralight"],
        ExtraLight = 40 => ["extra-light", "extralight"],
        Light = 50 => ["light"],
        SemiLight = 75 => ["semi-light", "semilight", "demilight", "book"],
        Normal = 100 => ["normal", "medium", "regular"],
        SemiBold = 180 => ["semi-bold", "semibold", "demibold", "demi"],
        Bold = 200 => ["bold"],
        ExtraBold = 205 => ["extra-bold", "extrabold"],
        UltraBold = 210 => ["ultra-bold", "ultrabold", "black", "heavy"],
    }
}

style_scale! {
    Slant {
        ReverseOblique = 0 => ["reverse-oblique"],
        ReverseItalic = 10 => ["reverse-italic"],
        Normal = 100 => ["normal", "roman"],
        Italic = 200 => ["italic"],
        Oblique = 210 => ["oblique"],
    }
}

style_scale! {
    Width {
        UltraCondensed = 50 => ["ultra-condensed", "ultracondensed"],
        ExtraCondensed = 63 => ["extra-condensed", "extracondensed"],
        Condensed = 75 => ["condensed", "compressed", "narrow"],
        SemiCondensed = 87 => ["semi-condensed", "semicondensed", "demicondensed"],
        Normal = 100 => ["normal", "medium", "regular"],
        SemiExpanded = 113 => ["semi-expanded", "semiexpanded", "demiexpanded"],
        Expanded = 125 => ["expanded"],
        ExtraExpanded = 150 => ["extra-expanded", "extraexpanded"],
        UltraExpanded = 200 => ["ultra-expanded", "ultraexpanded", "wide"],
    }
}

/// A height computed from the height it is merged onto.
#[derive(Clone)]
pub struct HeightFn(Rc<dyn Fn(&AttrValue) -> AttrValue>);

impl HeightFn {
    pub fn new(f: impl Fn(&AttrValue) -> AttrValue + 'static) -> Self {
        HeightFn(Rc::new(f))
    }

    pub fn call(&self, height: &AttrValue) -> AttrValue {
        (self.0)(height)
    }
}

impl PartialEq for HeightFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HeightFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HeightFn(..)")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoxStyle {
    #[default]
    Flat,
    /// `released-button`
    Raised,
    /// `pressed-button`
    Sunken,
}

/// Structured `:box` value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoxSpec {
    pub line_width: i32,
    /// `None` draws the box in the face's foreground.
    pub color: Option<String>,
    pub style: BoxStyle,
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self { line_width: 1, color: None, style: BoxStyle::Flat }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnderlineStyle {
    #[default]
    Line,
    Wave,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnderlineColor {
    #[default]
    Foreground,
    Named(String),
}

/// Structured `:underline` value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnderlineSpec {
    pub color: UnderlineColor,
    pub style: UnderlineStyle,
}

/// A stipple bitmap: a file name, or rows of packed bits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BitmapSpec {
    File(String),
    Bits { width: i32, height: i32, data: Vec<u8> },
}

impl BitmapSpec {
    /// Build an inline bitmap, checking that `data` holds `height` rows of
    /// `width` bits each.
    pub fn from_bits(width: i32, height: i32, data: Vec<u8>) -> Option<Self> {
        if width <= 0 || height <= 0 {
            return None;
        }
        let bytes_per_row = (width as usize).div_ceil(8);
        if height as usize > data.len() / bytes_per_row {
            return None;
        }
        Some(BitmapSpec::Bits { width, height, data })
    }

    pub fn describe(&self) -> String {
        match self {
            BitmapSpec::File(name) => name.clone(),
            BitmapSpec::Bits { width, height, .. } => format!("{width}x{height} bitmap"),
        }
    }
}

/// Contents of one attribute slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AttrValue {
    #[default]
    Unspecified,
    IgnoreDefault,
    Nil,
    True,
    Str(String),
    Int(i32),
    Scale(f64),
    HeightFn(HeightFn),
    Weight(Weight),
    Slant(Slant),
    Width(Width),
    Box(BoxSpec),
    Underline(UnderlineSpec),
    Stipple(BitmapSpec),
    Font(FontValue),
    Inherit(Vec<String>),
}

impl AttrValue {
    pub fn str(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, AttrValue::Unspecified)
    }

    pub fn is_ignore_default(&self) -> bool {
        matches!(self, AttrValue::IgnoreDefault)
    }

    /// Neither unspecified nor the ignore-default marker.
    pub fn is_specified(&self) -> bool {
        !matches!(self, AttrValue::Unspecified | AttrValue::IgnoreDefault)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, AttrValue::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn weight(&self) -> Option<Weight> {
        match self {
            AttrValue::Weight(w) => Some(*w),
            _ => None,
        }
    }

    pub fn slant(&self) -> Option<Slant> {
        match self {
            AttrValue::Slant(s) => Some(*s),
            _ => None,
        }
    }

    pub fn width(&self) -> Option<Width> {
        match self {
            AttrValue::Width(w) => Some(*w),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<&FontValue> {
        match self {
            AttrValue::Font(f) => Some(f),
            _ => None,
        }
    }

    /// Equality that ignores ASCII case for strings.
    pub fn eq_ignore_case(&self, other: &AttrValue) -> bool {
        match (self, other) {
            (AttrValue::Str(a), AttrValue::Str(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }

    fn identity_hash<H: Hasher>(&self, state: &mut H) {
        match self {
            AttrValue::Int(n) => n.hash(state),
            AttrValue::Scale(f) => f.to_bits().hash(state),
            AttrValue::Weight(w) => w.hash(state),
            AttrValue::Slant(s) => s.hash(state),
            AttrValue::Width(w) => w.hash(state),
            other => std::mem::discriminant(other).hash(state),
        }
    }
}

/// Slot names, in vector order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attr {
    Family,
    Foundry,
    Width,
    Height,
    Weight,
    Slant,
    Underline,
    Inverse,
    Foreground,
    Background,
    Stipple,
    Overline,
    StrikeThrough,
    Box,
    Font,
    Inherit,
    Fontset,
    DistantForeground,
}

impl Attr {
    pub const ALL: [Attr; LFACE_VECTOR_SIZE] = [
        Attr::Family,
        Attr::Foundry,
        Attr::Width,
        Attr::Height,
        Attr::Weight,
        Attr::Slant,
        Attr::Underline,
        Attr::Inverse,
        Attr::Foreground,
        Attr::Background,
        Attr::Stipple,
        Attr::Overline,
        Attr::StrikeThrough,
        Attr::Box,
        Attr::Font,
        Attr::Inherit,
        Attr::Fontset,
        Attr::DistantForeground,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Attr::Family => ":family",
            Attr::Foundry => ":foundry",
            Attr::Width => ":width",
            Attr::Height => ":height",
            Attr::Weight => ":weight",
            Attr::Slant => ":slant",
            Attr::Underline => ":underline",
            Attr::Inverse => ":inverse-video",
            Attr::Foreground => ":foreground",
            Attr::Background => ":background",
            Attr::Stipple => ":stipple",
            Attr::Overline => ":overline",
            Attr::StrikeThrough => ":strike-through",
            Attr::Box => ":box",
            Attr::Font => ":font",
            Attr::Inherit => ":inherit",
            Attr::Fontset => ":fontset",
            Attr::DistantForeground => ":distant-foreground",
        }
    }

    /// Slot named by `keyword`; `:reverse-video` is an alias of
    /// `:inverse-video`.
    pub fn from_keyword(keyword: &str) -> Option<Attr> {
        if keyword == ":reverse-video" {
            return Some(Attr::Inverse);
        }
        Attr::ALL.iter().copied().find(|attr| attr.keyword() == keyword)
    }

    /// Font property that goes stale when this slot changes.
    pub fn font_prop(self) -> Option<FontProp> {
        match self {
            Attr::Family => Some(FontProp::Family),
            Attr::Foundry => Some(FontProp::Foundry),
            Attr::Width => Some(FontProp::Width),
            Attr::Height => Some(FontProp::Size),
            Attr::Weight => Some(FontProp::Weight),
            Attr::Slant => Some(FontProp::Slant),
            _ => None,
        }
    }

    pub fn is_font_related(self) -> bool {
        self.font_prop().is_some()
    }

    /// Slots that may stay unspecified in a realizable vector.
    pub fn is_optional(self) -> bool {
        matches!(self, Attr::Font | Attr::Inherit | Attr::DistantForeground)
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One face's declared style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attrs {
    slots: [AttrValue; LFACE_VECTOR_SIZE],
}

impl Index<Attr> for Attrs {
    type Output = AttrValue;

    fn index(&self, attr: Attr) -> &AttrValue {
        &self.slots[attr.index()]
    }
}

impl IndexMut<Attr> for Attrs {
    fn index_mut(&mut self, attr: Attr) -> &mut AttrValue {
        &mut self.slots[attr.index()]
    }
}

impl Attrs {
    /// All slots unspecified.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attr: Attr, value: AttrValue) -> Self {
        self[attr] = value;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attr, &AttrValue)> {
        Attr::ALL.iter().copied().zip(self.slots.iter())
    }

    pub fn is_unspecified(&self, attr: Attr) -> bool {
        self[attr].is_unspecified()
    }

    pub fn is_fully_specified(&self) -> bool {
        self.iter().all(|(attr, value)| attr.is_optional() || value.is_specified())
    }

    /// Every slot unspecified.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(AttrValue::is_unspecified)
    }

    /// True when both vectors would select the same font.
    pub fn same_font_attributes(&self, other: &Attrs) -> bool {
        self[Attr::Family].eq_ignore_case(&other[Attr::Family])
            && self[Attr::Foundry].eq_ignore_case(&other[Attr::Foundry])
            && self[Attr::Height] == other[Attr::Height]
            && self[Attr::Width] == other[Attr::Width]
            && self[Attr::Weight] == other[Attr::Weight]
            && self[Attr::Slant] == other[Attr::Slant]
            && self[Attr::Font] == other[Attr::Font]
            && self[Attr::Fontset].eq_ignore_case(&other[Attr::Fontset])
    }

    /// Forget `prop` in the `:font` slot so the font is matched again from
    /// the scalar slots. A loaded font is demoted to a spec first.
    pub fn clear_font_prop(&mut self, prop: FontProp) {
        if let AttrValue::Font(font) = &self[Attr::Font] {
            let mut spec = font.to_spec();
            spec.name = None;
            spec.clear(prop);
            self[Attr::Font] = AttrValue::Font(FontValue::Spec(spec));
        }
    }

    /// Fill font-related slots from a loaded font. Without `force`, only
    /// unspecified slots are written.
    pub fn set_from_font(&mut self, font: &FontObject, force: bool, config: &FaceConfig) {
        let mut fill = |attr: Attr, value: AttrValue| {
            if force || self[attr].is_unspecified() {
                self[attr] = value;
            }
        };
        fill(Attr::Family, AttrValue::Str(font.family.clone()));
        fill(Attr::Foundry, AttrValue::Str(font.foundry.clone()));
        fill(Attr::Height, AttrValue::Int(config.pixel_to_decipoints(font.pixel_size).max(1)));
        fill(Attr::Weight, AttrValue::Weight(font.weight));
        fill(Attr::Slant, AttrValue::Slant(font.slant));
        fill(Attr::Width, AttrValue::Width(font.width));
        self[Attr::Font] = AttrValue::Font(FontValue::Object(font.clone()));
    }

    /// Bucket hash: case-insensitive family, foundry and colors, combined
    /// with the identity of weight, slant, width and height.
    pub fn content_hash(&self) -> u64 {
        let string_hash = |value: &AttrValue| -> u64 {
            let mut hasher = DefaultHasher::new();
            match value {
                AttrValue::Str(s) => {
                    for byte in s.bytes() {
                        byte.to_ascii_lowercase().hash(&mut hasher);
                    }
                }
                other => std::mem::discriminant(other).hash(&mut hasher),
            }
            hasher.finish()
        };
        let identity_hash = |value: &AttrValue| -> u64 {
            let mut hasher = DefaultHasher::new();
            value.identity_hash(&mut hasher);
            hasher.finish()
        };

        string_hash(&self[Attr::Family])
            ^ string_hash(&self[Attr::Foundry]).rotate_left(7)
            ^ string_hash(&self[Attr::Foreground]).rotate_left(13)
            ^ string_hash(&self[Attr::Background]).rotate_left(19)
            ^ identity_hash(&self[Attr::Weight]).rotate_left(29)
            ^ identity_hash(&self[Attr::Slant]).rotate_left(37)
            ^ identity_hash(&self[Attr::Width]).rotate_left(43)
            ^ identity_hash(&self[Attr::Height]).rotate_left(53)
    }
}

/// Merge height `from` onto height `to`.
///
/// An absolute `from` wins. A scale multiplies `to`: an absolute `to`
/// gives an absolute result, a scale `to` a compounded scale. A function
/// is called with `to`. An unspecified `from` leaves `to` unchanged.
/// Returns `None` when the result is not a positive height, or when an
/// absolute `to` would turn relative.
pub fn merge_height(from: &AttrValue, to: &AttrValue) -> Option<AttrValue> {
    let result = match from {
        AttrValue::Int(_) => from.clone(),
        AttrValue::Scale(scale) => match to {
            AttrValue::Int(height) => AttrValue::Int((scale * *height as f64) as i32),
            AttrValue::Scale(other) => AttrValue::Scale(scale * other),
            AttrValue::Unspecified => from.clone(),
            _ => return None,
        },
        AttrValue::HeightFn(f) => f.call(to),
        AttrValue::Unspecified => return Some(to.clone()),
        _ => return None,
    };

    if matches!(to, AttrValue::Int(_)) && !matches!(result, AttrValue::Int(_)) {
        return None;
    }
    match result {
        AttrValue::Int(n) if n > 0 => Some(result),
        AttrValue::Scale(s) if s > 0.0 => Some(result),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontSpec;

    fn sample_font() -> FontObject {
        FontObject {
            handle: 7,
            name: "Mono-12".into(),
            family: "Mono".into(),
            foundry: "test".into(),
            weight: Weight::Normal,
            slant: Slant::Normal,
            width: Width::Normal,
            pixel_size: 16,
            height: 19,
            registry: "iso10646-1".into(),
        }
    }

    #[test]
    fn test_scale_names_and_aliases() {
        assert_eq!(Weight::from_name("bold"), Some(Weight::Bold));
        assert_eq!(Weight::from_name("medium"), Some(Weight::Normal));
        assert_eq!(Weight::from_name("black"), Some(Weight::UltraBold));
        assert_eq!(Weight::from_name("book"), Some(Weight::SemiLight));
        assert_eq!(Weight::from_name("demibold"), Some(Weight::SemiBold));
        assert_eq!(Width::from_name("wide"), Some(Width::UltraExpanded));
        assert_eq!(Slant::from_name("oblique").map(Slant::numeric), Some(210));
        assert_eq!(Weight::from_name("heavy-ish"), None);
        assert_eq!(Weight::Bold.name(), "bold");
        assert_eq!(Weight::Normal.numeric(), 100);
        assert_eq!(Slant::Normal.numeric(), 100);
        assert_eq!(Width::Normal.numeric(), 100);
    }

    #[test]
    fn test_scale_from_numeric() {
        assert_eq!(Weight::from_numeric(198), Weight::Bold);
        assert_eq!(Weight::from_numeric(100), Weight::Normal);
        assert_eq!(Slant::from_numeric(205), Slant::Italic);
        assert_eq!(Width::from_numeric(-10), Width::UltraCondensed);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(Attr::from_keyword(":weight"), Some(Attr::Weight));
        assert_eq!(Attr::from_keyword(":reverse-video"), Some(Attr::Inverse));
        assert_eq!(Attr::from_keyword(":inverse-video"), Some(Attr::Inverse));
        assert_eq!(Attr::from_keyword(":colour"), None);
        for attr in Attr::ALL {
            assert_eq!(Attr::from_keyword(attr.keyword()), Some(attr));
            assert_eq!(Attr::ALL[attr.index()], attr);
        }
    }

    #[test]
    fn test_fully_specified_skips_optional_slots() {
        let mut attrs = Attrs::new();
        assert!(attrs.is_empty());
        assert!(!attrs.is_fully_specified());
        for attr in Attr::ALL {
            if !attr.is_optional() {
                attrs[attr] = AttrValue::Nil;
            }
        }
        assert!(attrs.is_fully_specified());

        attrs[Attr::Box] = AttrValue::IgnoreDefault;
        assert!(!attrs.is_fully_specified());
    }

    #[test]
    fn test_bitmap_spec_validation() {
        assert!(BitmapSpec::from_bits(8, 2, vec![0xff, 0x00]).is_some());
        assert!(BitmapSpec::from_bits(9, 2, vec![0xff, 0x00]).is_none());
        assert!(BitmapSpec::from_bits(9, 1, vec![0xff, 0x01]).is_some());
        assert!(BitmapSpec::from_bits(0, 1, vec![0xff]).is_none());
    }

    #[test]
    fn test_merge_height_laws() {
        let absolute = AttrValue::Int(120);
        assert_eq!(merge_height(&absolute, &AttrValue::Int(100)), Some(absolute.clone()));
        assert_eq!(merge_height(&absolute, &AttrValue::Scale(1.5)), Some(absolute.clone()));

        assert_eq!(merge_height(&AttrValue::Scale(2.0), &AttrValue::Int(10)), Some(AttrValue::Int(20)));
        assert_eq!(merge_height(&AttrValue::Scale(2.0), &AttrValue::Scale(1.5)), Some(AttrValue::Scale(3.0)));
        assert_eq!(
            merge_height(&AttrValue::Scale(1.2), &AttrValue::Unspecified),
            Some(AttrValue::Scale(1.2))
        );
        assert_eq!(merge_height(&AttrValue::Unspecified, &AttrValue::Int(90)), Some(AttrValue::Int(90)));
    }

    #[test]
    fn test_merge_height_functions() {
        let plus_ten = HeightFn::new(|to| match to {
            AttrValue::Int(n) => AttrValue::Int(n + 10),
            _ => AttrValue::Scale(1.0),
        });
        let from = AttrValue::HeightFn(plus_ten);
        assert_eq!(merge_height(&from, &AttrValue::Int(100)), Some(AttrValue::Int(110)));

        let relative = AttrValue::HeightFn(HeightFn::new(|_| AttrValue::Scale(1.1)));
        assert_eq!(merge_height(&relative, &AttrValue::Int(100)), None);
        assert_eq!(merge_height(&relative, &AttrValue::Scale(2.0)), Some(AttrValue::Scale(1.1)));
    }

    #[test]
    fn test_merge_height_rejects_non_positive() {
        assert_eq!(merge_height(&AttrValue::Int(0), &AttrValue::Int(10)), None);
        assert_eq!(merge_height(&AttrValue::Scale(-1.0), &AttrValue::Int(10)), None);
        assert_eq!(merge_height(&AttrValue::Scale(0.01), &AttrValue::Int(10)), None);
        assert_eq!(merge_height(&AttrValue::Nil, &AttrValue::Int(10)), None);
    }

    #[test]
    fn test_same_font_attributes_is_case_insensitive() {
        let a = Attrs::new()
            .with(Attr::Family, AttrValue::str("Mono"))
            .with(Attr::Foreground, AttrValue::str("red"));
        let b = Attrs::new()
            .with(Attr::Family, AttrValue::str("MONO"))
            .with(Attr::Foreground, AttrValue::str("blue"));
        assert!(a.same_font_attributes(&b));
        let c = b.clone().with(Attr::Weight, AttrValue::Weight(Weight::Bold));
        assert!(!a.same_font_attributes(&c));
    }

    #[test]
    fn test_clear_font_prop_demotes_object() {
        let mut attrs = Attrs::new().with(Attr::Font, AttrValue::Font(FontValue::Object(sample_font())));
        attrs.clear_font_prop(FontProp::Weight);
        match &attrs[Attr::Font] {
            AttrValue::Font(FontValue::Spec(spec)) => {
                assert_eq!(spec.weight, None);
                assert_eq!(spec.name, None);
                assert_eq!(spec.family.as_deref(), Some("Mono"));
            }
            other => panic!("expected a font spec, got {other:?}"),
        }

        let mut plain = Attrs::new();
        plain.clear_font_prop(FontProp::Family);
        assert!(plain[Attr::Font].is_unspecified());
    }

    #[test]
    fn test_set_from_font() {
        let config = FaceConfig::new().with_resolution_y(96.0);
        let mut attrs = Attrs::new().with(Attr::Weight, AttrValue::Weight(Weight::Bold));
        attrs.set_from_font(&sample_font(), false, &config);
        assert_eq!(attrs[Attr::Family], AttrValue::str("Mono"));
        assert_eq!(attrs[Attr::Height], AttrValue::Int(120));
        assert_eq!(attrs[Attr::Weight], AttrValue::Weight(Weight::Bold));

        attrs.set_from_font(&sample_font(), true, &config);
        assert_eq!(attrs[Attr::Weight], AttrValue::Weight(Weight::Normal));
        assert!(matches!(attrs[Attr::Font], AttrValue::Font(FontValue::Object(_))));
    }

    #[test]
    fn test_content_hash_ignores_case_of_strings() {
        let a = Attrs::new().with(Attr::Foreground, AttrValue::str("Red"));
        let b = Attrs::new().with(Attr::Foreground, AttrValue::str("red"));
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a, b);

        let spec = Attrs::new().with(Attr::Font, AttrValue::Font(FontValue::Spec(FontSpec::default())));
        assert_eq!(spec.content_hash(), Attrs::new().content_hash());
    }
}
