//! Face Core - backend-agnostic face resolution and realization
//!
//! A face is a named bundle of display attributes (font family, height,
//! weight, slant, colors, decorations). This crate keeps the global and
//! per-surface face definitions, merges face references into attribute
//! vectors, realizes those vectors against a display surface (allocated
//! colors, loaded fonts, terminal capabilities) and caches the results.
//!
//! Display and font access go through the [`DisplayBackend`] and
//! [`FontMatcher`] traits, so the same code serves window systems, text
//! terminals and headless surfaces.

pub mod attrs;
pub mod cache;
pub mod capability;
pub mod color;
pub mod config;
pub mod constants;
pub mod dummy_backend;
pub mod error;
pub mod font;
pub mod input;
pub mod keyword;
pub mod lookup;
pub mod merge;
pub mod realize;
pub mod registry;
pub mod remap;
pub mod surface;
pub mod traits;

// Re-export main types
pub use attrs::{Attr, AttrValue, Attrs, BitmapSpec, BoxSpec, BoxStyle, Slant, UnderlineSpec, UnderlineStyle, Weight, Width};
pub use cache::{FaceCache, FaceId, RealizedFace};
pub use color::{ColorArg, ColorTarget, ResolvedColor};
pub use config::{FaceConfig, SurfaceParams};
pub use constants::{BasicFace, DEFAULT_FACE_ID};
pub use error::{Diagnostics, FaceError, FaceResult};
pub use font::{FontObject, FontRequest, FontSpec, SystemFontMatcher};
pub use input::{InputBlocker, InputGuard};
pub use keyword::{FaceRef, Value};
pub use lookup::{FaceSelector, PositionQuery};
pub use merge::Merger;
pub use registry::{FaceRegistry, FaceTable, Scope, ScopeRef};
pub use remap::RemapTable;
pub use surface::{Surface, SurfaceId, SurfaceKind};

// Re-export traits and types
pub use traits::*;
