// src/surface.rs
//! Display surfaces.
//!
//! A surface is one window or terminal frame. It owns its face table,
//! remapping table and cache of realized faces, together with the backend
//! that allocates colors and the matcher that loads fonts.

use face_color::{DEFAULT_BG_INDEX, DEFAULT_FG_INDEX};

use crate::attrs::BitmapSpec;
use crate::cache::{FaceCache, FaceId, RealizedFace};
use crate::config::{FaceConfig, SurfaceParams};
use crate::constants::DEFAULT_FACE_ID;
use crate::error::{Diagnostics, FaceResult};
use crate::font::{FontHandle, FontObject, FontPreferences, FontRequest, FontSpec};
use crate::input::InputBlocker;
use crate::keyword::FaceRef;
use crate::registry::{FaceRegistry, FaceTable};
use crate::remap::RemapTable;
use crate::traits::{BitmapId, ColorDef, DisplayBackend, DisplayClass, DrawContext, DrawValues, FontMatcher, Pixel};

pub type SurfaceId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Window system: allocated colors, fonts, drawing contexts.
    Graphical,
    /// Text terminal: palette indices and character attributes.
    Terminal,
    /// No output at all; faces only record their attributes.
    Headless,
}

pub struct Surface {
    id: SurfaceId,
    kind: SurfaceKind,
    pub params: SurfaceParams,
    pub(crate) display: Box<dyn DisplayBackend>,
    pub(crate) fonts: Box<dyn FontMatcher>,
    pub(crate) table: FaceTable,
    pub(crate) remap: RemapTable,
    pub(crate) cache: FaceCache,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) input: InputBlocker,
    /// Realized faces are stale and must be rebuilt before the next redraw.
    pub(crate) face_change: bool,
    pub(crate) config: FaceConfig,
    pub(crate) font_prefs: FontPreferences,
    /// Colors used when a face's own colors cannot be resolved.
    pub(crate) foreground_pixel: Pixel,
    pub(crate) background_pixel: Pixel,
    /// The default face has been filled from the surface font once.
    pub(crate) default_face_done: bool,
}

impl Surface {
    pub fn new(
        id: SurfaceId,
        kind: SurfaceKind,
        params: SurfaceParams,
        display: Box<dyn DisplayBackend>,
        fonts: Box<dyn FontMatcher>,
    ) -> Self {
        Surface {
            id,
            kind,
            params,
            display,
            fonts,
            table: FaceTable::new(),
            remap: RemapTable::new(),
            cache: FaceCache::new(),
            diagnostics: Diagnostics::new(),
            input: InputBlocker::new(),
            face_change: false,
            config: FaceConfig::default(),
            font_prefs: FontPreferences::default(),
            foreground_pixel: DEFAULT_FG_INDEX,
            background_pixel: DEFAULT_BG_INDEX,
            default_face_done: false,
        }
    }

    pub fn graphical(id: SurfaceId, params: SurfaceParams, display: Box<dyn DisplayBackend>, fonts: Box<dyn FontMatcher>) -> Self {
        Self::new(id, SurfaceKind::Graphical, params, display, fonts)
    }

    /// A text terminal. Terminals draw with a single font of their own.
    pub fn terminal(id: SurfaceId, params: SurfaceParams, display: Box<dyn DisplayBackend>) -> Self {
        Self::new(id, SurfaceKind::Terminal, params, display, Box::new(NoFonts))
    }

    pub fn headless(id: SurfaceId, params: SurfaceParams) -> Self {
        Self::new(id, SurfaceKind::Headless, params, Box::new(NullDisplay), Box::new(NoFonts))
    }

    /// Share an input blocker with the rest of the program.
    pub fn with_input_blocker(mut self, input: InputBlocker) -> Self {
        self.input = input;
        self
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn is_graphical(&self) -> bool {
        self.kind == SurfaceKind::Graphical
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SurfaceKind::Terminal
    }

    pub fn table(&self) -> &FaceTable {
        &self.table
    }

    pub fn remap(&self) -> &RemapTable {
        &self.remap
    }

    /// Make `name` display as `replacement` on this surface.
    pub fn set_face_remapping(&mut self, name: &str, replacement: FaceRef) -> Option<FaceRef> {
        self.face_change = true;
        self.remap.set(name, replacement)
    }

    pub fn remove_face_remapping(&mut self, name: &str) -> Option<FaceRef> {
        let old = self.remap.remove(name);
        if old.is_some() {
            self.face_change = true;
        }
        old
    }

    pub fn clear_face_remapping(&mut self) {
        if !self.remap.is_empty() {
            self.remap.clear();
            self.face_change = true;
        }
    }

    pub fn cache(&self) -> &FaceCache {
        &self.cache
    }

    pub fn face(&self, id: FaceId) -> Option<&RealizedFace> {
        self.cache.get(id)
    }

    pub fn config(&self) -> &FaceConfig {
        &self.config
    }

    pub fn font_preferences(&self) -> &FontPreferences {
        &self.font_prefs
    }

    pub fn input_blocker(&self) -> &InputBlocker {
        &self.input
    }

    pub fn face_change(&self) -> bool {
        self.face_change
    }

    pub fn foreground_pixel(&self) -> Pixel {
        self.foreground_pixel
    }

    pub fn background_pixel(&self) -> Pixel {
        self.background_pixel
    }

    pub fn display(&self) -> &dyn DisplayBackend {
        self.display.as_ref()
    }

    pub fn fonts(&self) -> &dyn FontMatcher {
        self.fonts.as_ref()
    }

    /// Problems noticed while merging and realizing faces.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<String> {
        self.diagnostics.take()
    }

    /// Free every realized face and schedule a rebuild.
    pub fn invalidate_all(&mut self) {
        self.free_faces();
        self.face_change = true;
    }

    /// Release all realized faces and their display resources.
    pub fn free_faces(&mut self) {
        if self.cache.is_empty() {
            return;
        }
        let _guard = self.input.block();
        let faces = self.cache.drain();
        tracing::debug!("Freeing {} faces on surface {}", faces.len(), self.id);
        for face in faces {
            face.release(self.display.as_mut());
        }
    }

    /// Drop drawing contexts; they are recreated on demand.
    pub(crate) fn release_draw_contexts(&mut self) {
        let _guard = self.input.block();
        self.cache.release_draw_contexts(self.display.as_mut());
    }

    /// Rebuild stale faces before a redraw. Returns whether anything was
    /// rebuilt.
    pub fn begin_redisplay(&mut self, registry: &FaceRegistry) -> FaceResult<bool> {
        if self.face_change {
            self.free_faces();
        } else if self.cache.get(DEFAULT_FACE_ID).is_some() {
            return Ok(false);
        }
        self.realize_basic_faces(registry)?;
        Ok(true)
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.free_faces();
    }
}

/// Font matcher of surfaces that have no fonts.
struct NoFonts;

impl FontMatcher for NoFonts {
    fn match_font(&mut self, _request: &FontRequest) -> Option<FontObject> {
        None
    }

    fn decompose(&self, _handle: FontHandle) -> Option<FontSpec> {
        None
    }

    fn has_char(&self, _handle: FontHandle, _ch: char) -> bool {
        false
    }

    fn font_for_char(&mut self, _request: &FontRequest, _ch: char) -> Option<FontObject> {
        None
    }

    fn loaded_font_count(&self) -> usize {
        0
    }

    fn prune(&mut self) {}
}

/// Backend of headless surfaces; knows no colors.
struct NullDisplay;

impl DisplayBackend for NullDisplay {
    fn display_class(&self) -> DisplayClass {
        DisplayClass::Mono
    }

    fn defined_color(&mut self, _name: &str, _alloc: bool) -> Option<ColorDef> {
        None
    }

    fn free_colors(&mut self, _pixels: &[Pixel]) {}

    fn create_draw_context(&mut self, _values: &DrawValues) -> DrawContext {
        0
    }

    fn destroy_draw_context(&mut self, _ctx: DrawContext) {}

    fn load_bitmap(&mut self, _spec: &BitmapSpec) -> Option<BitmapId> {
        None
    }

    fn destroy_bitmap(&mut self, _id: BitmapId) {}
}
