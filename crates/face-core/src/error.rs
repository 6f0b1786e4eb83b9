// src/error.rs
use face_color::ColorParseError;
use thiserror::Error;

/// Failures of face definition, merging and realization.
///
/// Only [`FaceError::DefaultFaceNotRealizable`] is fatal; the others are
/// returned by validating setters or absorbed into [`Diagnostics`] while
/// merging.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FaceError {
    // Invalid specifications
    #[error("Invalid face: {name}")]
    InvalidFace { name: String },

    #[error("Invalid face attribute name: {keyword}")]
    InvalidAttributeName { keyword: String },

    #[error("Invalid face {attribute} value: {value}")]
    InvalidAttributeValue { attribute: String, value: String },

    #[error("Invalid font name: {name}")]
    InvalidFontName { name: String },

    #[error("Invalid font sort order: {reason}")]
    InvalidSortOrder { reason: String },

    #[error("Invalid face reference: {reference}")]
    InvalidFaceReference { reference: String },

    #[error("Invalid color: {0}")]
    InvalidColor(#[from] ColorParseError),

    // Cycles
    #[error("Face alias chain of {name} is circular")]
    AliasCycle { name: String },

    #[error("Face inheritance results in inheritance cycle: {name}")]
    InheritanceCycle { name: String },

    // Resources
    #[error("Unable to load color {name}")]
    ColorNotAllocated { name: String },

    #[error("Unable to load font for {request}")]
    FontNotFound { request: String },

    #[error("Unable to load bitmap {spec}")]
    BitmapNotLoaded { spec: String },

    #[error("Invalid face id: {id}")]
    InvalidFaceId { id: usize },

    // Fatal
    #[error("Cannot realize default face: {reason}")]
    DefaultFaceNotRealizable { reason: String },
}

pub type FaceResult<T> = Result<T, FaceError>;

impl FaceError {
    pub fn invalid_value(attribute: &str, value: impl std::fmt::Debug) -> Self {
        FaceError::InvalidAttributeValue {
            attribute: attribute.to_string(),
            value: format!("{value:?}"),
        }
    }
}

/// Messages about specification problems that were skipped rather than
/// reported as errors, kept for display to the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.messages.push(message);
    }

    pub fn record_error(&mut self, error: &FaceError) {
        self.record(error.to_string());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn append(&mut self, other: &mut Diagnostics) {
        self.messages.append(&mut other.messages);
    }

    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}
