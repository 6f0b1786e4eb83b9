// src/keyword.rs
//! Face references and keyword validation.
//!
//! Callers describe faces with loosely typed [`Value`]s: property lists
//! such as `(:weight bold :box (:line-width 2 :color "red"))`. Each
//! keyword has a legal domain; [`validate`] checks a value against it and
//! converts it to the typed [`AttrValue`] stored in attribute vectors.

use crate::attrs::{
    merge_height, Attr, AttrValue, BitmapSpec, BoxSpec, BoxStyle, HeightFn, Slant, UnderlineColor, UnderlineSpec,
    UnderlineStyle, Weight, Width,
};
use crate::error::{FaceError, FaceResult};
use crate::font::{parse_font_name, FontValue};

/// Loosely typed input value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Unspecified,
    IgnoreDefault,
    Nil,
    T,
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    List(Vec<Value>),
    Func(HeightFn),
    Font(FontValue),
}

impl Value {
    pub fn sym(name: &str) -> Self {
        Value::Symbol(name.to_string())
    }

    pub fn str(s: &str) -> Self {
        Value::Str(s.to_string())
    }

    /// A property list `(:key value ...)`.
    pub fn plist<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let mut items = Vec::new();
        for (key, value) in pairs {
            items.push(Value::sym(key));
            items.push(value);
        }
        Value::List(items)
    }

    pub fn from_bool(flag: bool) -> Self {
        if flag {
            Value::T
        } else {
            Value::Nil
        }
    }

    fn symbol_name(&self) -> Option<&str> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

impl From<&AttrValue> for Value {
    fn from(value: &AttrValue) -> Self {
        match value {
            AttrValue::Unspecified => Value::Unspecified,
            AttrValue::IgnoreDefault => Value::IgnoreDefault,
            AttrValue::Nil => Value::Nil,
            AttrValue::True => Value::T,
            AttrValue::Str(s) => Value::Str(s.clone()),
            AttrValue::Int(n) => Value::Int(*n as i64),
            AttrValue::Scale(f) => Value::Float(*f),
            AttrValue::HeightFn(f) => Value::Func(f.clone()),
            AttrValue::Weight(w) => Value::sym(w.name()),
            AttrValue::Slant(s) => Value::sym(s.name()),
            AttrValue::Width(w) => Value::sym(w.name()),
            AttrValue::Box(spec) => {
                let style = match spec.style {
                    BoxStyle::Flat => Value::Nil,
                    BoxStyle::Raised => Value::sym("released-button"),
                    BoxStyle::Sunken => Value::sym("pressed-button"),
                };
                Value::plist([
                    (":line-width", Value::Int(spec.line_width as i64)),
                    (":color", spec.color.as_deref().map_or(Value::Nil, Value::str)),
                    (":style", style),
                ])
            }
            AttrValue::Underline(spec) => {
                let color = match &spec.color {
                    UnderlineColor::Foreground => Value::sym("foreground-color"),
                    UnderlineColor::Named(name) => Value::str(name),
                };
                let style = match spec.style {
                    UnderlineStyle::Line => Value::sym("line"),
                    UnderlineStyle::Wave => Value::sym("wave"),
                };
                Value::plist([(":color", color), (":style", style)])
            }
            AttrValue::Stipple(BitmapSpec::File(name)) => Value::str(name),
            AttrValue::Stipple(BitmapSpec::Bits { width, height, data }) => Value::List(vec![
                Value::Int(*width as i64),
                Value::Int(*height as i64),
                Value::Str(data.iter().map(|&b| b as char).collect()),
            ]),
            AttrValue::Font(font) => Value::Font(font.clone()),
            AttrValue::Inherit(names) if names.len() == 1 => Value::sym(&names[0]),
            AttrValue::Inherit(names) => Value::List(names.iter().map(|n| Value::sym(n)).collect()),
        }
    }
}

/// A reference to face attributes, as found in text properties, overlay
/// properties and face remappings.
#[derive(Clone, Debug, PartialEq)]
pub enum FaceRef {
    /// A face name (or alias).
    Named(String),
    /// `(:keyword value ...)` pairs.
    Plist(Vec<(String, Value)>),
    /// Legacy `(foreground-color . COLOR)`.
    Foreground(String),
    /// Legacy `(background-color . COLOR)`.
    Background(String),
    /// Several references; earlier ones take precedence.
    List(Vec<FaceRef>),
}

impl FaceRef {
    pub fn named(name: &str) -> Self {
        FaceRef::Named(name.to_string())
    }

    pub fn plist<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        FaceRef::Plist(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    pub fn describe(&self) -> String {
        match self {
            FaceRef::Named(name) => name.clone(),
            FaceRef::Plist(pairs) => {
                let inner: Vec<String> = pairs.iter().map(|(k, v)| format!("{k} {v:?}")).collect();
                format!("({})", inner.join(" "))
            }
            FaceRef::Foreground(c) => format!("(foreground-color . {c})"),
            FaceRef::Background(c) => format!("(background-color . {c})"),
            FaceRef::List(refs) => {
                let inner: Vec<String> = refs.iter().map(FaceRef::describe).collect();
                format!("({})", inner.join(" "))
            }
        }
    }
}

impl From<&str> for FaceRef {
    fn from(name: &str) -> Self {
        FaceRef::named(name)
    }
}

fn invalid(attr: Attr, value: &Value) -> FaceError {
    FaceError::invalid_value(attr.keyword(), value)
}

/// Split a list into `(:key value)` pairs.
fn plist_pairs(items: &[Value]) -> Option<Vec<(&str, &Value)>> {
    if items.len() % 2 != 0 {
        return None;
    }
    items.chunks(2).map(|pair| pair[0].symbol_name().map(|key| (key, &pair[1]))).collect()
}

fn non_empty_string(value: &Value) -> Option<String> {
    match value {
        Value::Str(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Convert a height value without checking its domain.
pub fn height_value(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Int(n) => i32::try_from(*n).ok().map(AttrValue::Int),
        Value::Float(f) => Some(AttrValue::Scale(*f)),
        Value::Func(f) => Some(AttrValue::HeightFn(f.clone())),
        _ => None,
    }
}

fn validate_height(value: &Value, default_face: bool) -> Option<AttrValue> {
    let height = height_value(value)?;
    if default_face {
        return match height {
            AttrValue::Int(n) if n > 0 => Some(height),
            _ => None,
        };
    }
    match merge_height(&height, &AttrValue::Int(10)) {
        Some(AttrValue::Int(n)) if n > 0 => Some(height),
        _ => None,
    }
}

fn validate_underline(value: &Value) -> Option<AttrValue> {
    match value {
        Value::T => Some(AttrValue::True),
        Value::Nil => Some(AttrValue::Nil),
        Value::Str(_) => non_empty_string(value).map(AttrValue::Str),
        Value::List(items) => {
            let mut spec = UnderlineSpec::default();
            for (key, v) in plist_pairs(items)? {
                match key {
                    ":color" => {
                        spec.color = match v {
                            Value::Symbol(s) if s == "foreground-color" => UnderlineColor::Foreground,
                            _ => UnderlineColor::Named(non_empty_string(v)?),
                        }
                    }
                    ":style" => {
                        spec.style = match v.symbol_name()? {
                            "line" => UnderlineStyle::Line,
                            "wave" => UnderlineStyle::Wave,
                            _ => return None,
                        }
                    }
                    _ => return None,
                }
            }
            Some(AttrValue::Underline(spec))
        }
        _ => None,
    }
}

fn validate_line(value: &Value) -> Option<AttrValue> {
    match value {
        Value::T => Some(AttrValue::True),
        Value::Nil => Some(AttrValue::Nil),
        _ => non_empty_string(value).map(AttrValue::Str),
    }
}

fn validate_box(value: &Value) -> Option<AttrValue> {
    match value {
        Value::T => Some(AttrValue::Int(1)),
        Value::Nil => Some(AttrValue::Nil),
        Value::Int(n) if *n != 0 => i32::try_from(*n).ok().map(AttrValue::Int),
        Value::Str(_) => non_empty_string(value).map(AttrValue::Str),
        Value::List(items) => {
            let mut spec = BoxSpec::default();
            for (key, v) in plist_pairs(items)? {
                match key {
                    ":line-width" => match v {
                        Value::Int(n) if *n != 0 => spec.line_width = i32::try_from(*n).ok()?,
                        _ => return None,
                    },
                    ":color" => {
                        spec.color = match v {
                            Value::Nil => None,
                            _ => Some(non_empty_string(v)?),
                        }
                    }
                    ":style" => {
                        spec.style = match v {
                            Value::Nil => BoxStyle::Flat,
                            Value::Symbol(s) if s == "released-button" => BoxStyle::Raised,
                            Value::Symbol(s) if s == "pressed-button" => BoxStyle::Sunken,
                            _ => return None,
                        }
                    }
                    _ => return None,
                }
            }
            Some(AttrValue::Box(spec))
        }
        _ => None,
    }
}

fn validate_stipple(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Nil => Some(AttrValue::Nil),
        Value::Str(_) => non_empty_string(value).map(|name| AttrValue::Stipple(BitmapSpec::File(name))),
        Value::List(items) => match items.as_slice() {
            [Value::Int(w), Value::Int(h), Value::Str(data)] => {
                let width = i32::try_from(*w).ok()?;
                let height = i32::try_from(*h).ok()?;
                let bytes = data.chars().map(|c| c as u32 as u8).collect();
                BitmapSpec::from_bits(width, height, bytes).map(AttrValue::Stipple)
            }
            _ => None,
        },
        _ => None,
    }
}

fn face_name(value: &Value) -> Option<String> {
    match value {
        Value::Symbol(name) | Value::Str(name) if !name.is_empty() => Some(name.clone()),
        _ => None,
    }
}

fn validate_inherit(value: &Value) -> Option<AttrValue> {
    match value {
        Value::Nil => Some(AttrValue::Nil),
        Value::List(items) => items.iter().map(face_name).collect::<Option<Vec<_>>>().map(AttrValue::Inherit),
        _ => face_name(value).map(|name| AttrValue::Inherit(vec![name])),
    }
}

/// Check `value` against the domain of `attr` and convert it.
///
/// `default_face` selects the stricter height domain of the default face,
/// which must have a positive absolute height.
pub fn validate(attr: Attr, value: &Value, default_face: bool) -> FaceResult<AttrValue> {
    match value {
        Value::Unspecified => return Ok(AttrValue::Unspecified),
        Value::IgnoreDefault => return Ok(AttrValue::IgnoreDefault),
        _ => {}
    }

    let converted = match attr {
        Attr::Family | Attr::Foundry => non_empty_string(value).map(AttrValue::Str),
        Attr::Height => validate_height(value, default_face),
        Attr::Weight => value.symbol_name().and_then(Weight::from_name).map(AttrValue::Weight),
        Attr::Slant => value.symbol_name().and_then(Slant::from_name).map(AttrValue::Slant),
        Attr::Width => value.symbol_name().and_then(Width::from_name).map(AttrValue::Width),
        Attr::Underline => validate_underline(value),
        Attr::Overline | Attr::StrikeThrough => validate_line(value),
        Attr::Box => validate_box(value),
        Attr::Inverse => match value {
            Value::T => Some(AttrValue::True),
            Value::Nil => Some(AttrValue::Nil),
            _ => None,
        },
        Attr::Foreground | Attr::Background | Attr::DistantForeground => match value {
            Value::Nil => Some(AttrValue::Unspecified),
            _ => non_empty_string(value).map(AttrValue::Str),
        },
        Attr::Stipple => validate_stipple(value),
        Attr::Font => match value {
            Value::Font(font) => Some(AttrValue::Font(font.clone())),
            Value::Str(name) => return parse_font_name(name).map(|spec| AttrValue::Font(FontValue::Spec(spec))),
            _ => None,
        },
        Attr::Fontset => match value {
            Value::Nil => Some(AttrValue::Nil),
            _ => non_empty_string(value).map(AttrValue::Str),
        },
        Attr::Inherit => validate_inherit(value),
    };

    converted.ok_or_else(|| invalid(attr, value))
}
