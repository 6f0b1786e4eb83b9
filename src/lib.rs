//! HugoFace - named display faces for text user interfaces
//!
//! This crate bundles:
//! - `face_color`: color parsing, perceptual distance, terminal palettes
//! - `face_core`: face definitions, merging, realization and caching
//!
//! and a helper that sets up a window-system surface on installed fonts.

use anyhow::Context;

pub use face_color;
pub use face_core;

// Re-export main types for convenience
pub use face_color::{color_distance, Color, ColorParseError, TtyColorTable};
pub use face_core::{
    Attr, AttrValue, Attrs, BasicFace, DisplayBackend, FaceConfig, FaceError, FaceId, FaceRef, FaceRegistry,
    FaceResult, FaceSelector, FontMatcher, PositionQuery, PropertySource, Scope, Surface, SurfaceKind, SurfaceParams,
    SystemFontMatcher, Value, DEFAULT_FACE_ID,
};

/// Create a window-system surface that loads fonts from the system font
/// directories, and realize its basic faces.
pub fn open_graphical_surface(
    registry: &FaceRegistry,
    id: face_core::SurfaceId,
    params: SurfaceParams,
    display: Box<dyn DisplayBackend>,
) -> anyhow::Result<Surface> {
    let fonts = SystemFontMatcher::with_system_fonts()?.with_config(registry.config().clone());
    tracing::info!("Opening surface {} with {} system fonts", id, fonts.fonts().len());
    let mut surface = Surface::graphical(id, params, display, Box::new(fonts));
    registry
        .init_surface(&mut surface)
        .with_context(|| format!("realizing the basic faces of surface {id}"))?;
    Ok(surface)
}
