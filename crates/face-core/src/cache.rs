// src/cache.rs
//! Per-surface cache of realized faces.
//!
//! Faces are found by content hash and exact attribute equality. ASCII
//! faces sit at the head of their bucket and variants made for other
//! scripts at the tail, so a probe for an ASCII face stops at the first
//! variant. IDs index a dense array; a new face takes the lowest free
//! slot.

use crate::attrs::{Attrs, BoxStyle, UnderlineStyle};
use crate::constants::FACE_CACHE_BUCKETS_SIZE;
use crate::font::{FontHandle, FontObject};
use crate::traits::{BitmapId, DisplayBackend, DrawContext, Pixel, TtyCaps};

pub type FaceId = usize;

/// Who frees a face's colors and stipple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorOwnership {
    /// Allocated for this face.
    Owned,
    /// Shared with the base face; freed with it.
    BorrowedFrom(FaceId),
    /// Terminal palette indices; nothing to free.
    Palette,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Underline {
    pub style: UnderlineStyle,
    pub color: Pixel,
    /// Drawn in the foreground color rather than an allocated one.
    pub defaulted: bool,
}

/// Overline or strike-through.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub color: Pixel,
    pub defaulted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceBox {
    pub style: BoxStyle,
    /// Negative widths draw inside the character cell.
    pub line_width: i32,
    pub color: Pixel,
    pub defaulted: bool,
}

/// A face with backend resources, ready for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct RealizedFace {
    pub id: FaceId,
    /// The attributes the face was realized from.
    pub lface: Attrs,
    pub hash: u64,
    /// ASCII face this one was derived from, for variants.
    pub base: Option<FaceId>,
    pub font: Option<FontObject>,
    pub foreground: Pixel,
    pub background: Pixel,
    pub foreground_defaulted: bool,
    pub background_defaulted: bool,
    pub colors: ColorOwnership,
    pub underline: Option<Underline>,
    pub overline: Option<Line>,
    pub strike_through: Option<Line>,
    pub face_box: Option<FaceBox>,
    pub stipple: Option<BitmapId>,
    pub tty: TtyCaps,
    /// Draw bold by overstriking.
    pub overstrike: bool,
    pub draw_context: Option<DrawContext>,
}

impl RealizedFace {
    pub fn new(lface: Attrs) -> Self {
        let hash = lface.content_hash();
        Self {
            id: 0,
            lface,
            hash,
            base: None,
            font: None,
            foreground: 0,
            background: 0,
            foreground_defaulted: false,
            background_defaulted: false,
            colors: ColorOwnership::Owned,
            underline: None,
            overline: None,
            strike_through: None,
            face_box: None,
            stipple: None,
            tty: TtyCaps::default(),
            overstrike: false,
            draw_context: None,
        }
    }

    pub fn is_ascii(&self) -> bool {
        self.base.is_none()
    }

    pub fn ascii_face(&self) -> FaceId {
        self.base.unwrap_or(self.id)
    }

    pub fn font_handle(&self) -> Option<FontHandle> {
        self.font.as_ref().map(|font| font.handle)
    }

    /// A variant of this face using `font`. Colors and stipple stay with
    /// this face.
    pub fn derive_variant(&self, font: Option<FontObject>) -> Self {
        Self {
            base: Some(self.id),
            font,
            colors: match self.colors {
                ColorOwnership::Palette => ColorOwnership::Palette,
                _ => ColorOwnership::BorrowedFrom(self.id),
            },
            draw_context: None,
            overstrike: false,
            ..self.clone()
        }
    }

    /// Pixels this face allocated itself.
    pub fn owned_pixels(&self) -> Vec<Pixel> {
        if self.colors != ColorOwnership::Owned {
            return Vec::new();
        }
        let mut pixels = Vec::new();
        if !self.foreground_defaulted {
            pixels.push(self.foreground);
        }
        if !self.background_defaulted {
            pixels.push(self.background);
        }
        if let Some(underline) = self.underline.as_ref().filter(|u| !u.defaulted) {
            pixels.push(underline.color);
        }
        for line in [&self.overline, &self.strike_through].into_iter().flatten() {
            if !line.defaulted {
                pixels.push(line.color);
            }
        }
        if let Some(face_box) = self.face_box.as_ref().filter(|b| !b.defaulted) {
            pixels.push(face_box.color);
        }
        pixels
    }

    pub(crate) fn release_draw_context(&mut self, display: &mut dyn DisplayBackend) {
        if let Some(ctx) = self.draw_context.take() {
            display.destroy_draw_context(ctx);
        }
    }

    /// Give back every resource this face owns.
    pub(crate) fn release(mut self, display: &mut dyn DisplayBackend) {
        self.release_draw_context(display);
        if self.colors != ColorOwnership::Owned {
            return;
        }
        let pixels = self.owned_pixels();
        if !pixels.is_empty() {
            display.free_colors(&pixels);
        }
        if let Some(bitmap) = self.stipple.take() {
            display.destroy_bitmap(bitmap);
        }
    }
}

pub struct FaceCache {
    buckets: Vec<Vec<FaceId>>,
    faces: Vec<Option<RealizedFace>>,
}

impl Default for FaceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceCache {
    pub fn new() -> Self {
        Self { buckets: vec![Vec::new(); FACE_CACHE_BUCKETS_SIZE], faces: Vec::new() }
    }

    fn bucket(hash: u64) -> usize {
        (hash % FACE_CACHE_BUCKETS_SIZE as u64) as usize
    }

    /// Number of realized faces.
    pub fn len(&self) -> usize {
        self.faces.iter().filter(|face| face.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.iter().all(Option::is_none)
    }

    /// One past the highest ID in use.
    pub fn used(&self) -> usize {
        self.faces.len()
    }

    pub fn get(&self, id: FaceId) -> Option<&RealizedFace> {
        self.faces.get(id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: FaceId) -> Option<&mut RealizedFace> {
        self.faces.get_mut(id).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RealizedFace> {
        self.faces.iter().flatten()
    }

    /// ASCII face realized from exactly `attrs`.
    pub fn lookup(&self, hash: u64, attrs: &Attrs) -> Option<FaceId> {
        for &id in &self.buckets[Self::bucket(hash)] {
            let face = self.get(id)?;
            if !face.is_ascii() {
                break;
            }
            if face.hash == hash && face.lface == *attrs {
                return Some(id);
            }
        }
        None
    }

    /// Variant of `base` that uses the font `font`.
    pub fn lookup_variant(&self, hash: u64, base: FaceId, font: Option<FontHandle>) -> Option<FaceId> {
        self.buckets[Self::bucket(hash)].iter().copied().find(|&id| {
            self.get(id).is_some_and(|face| face.base == Some(base) && face.hash == hash && face.font_handle() == font)
        })
    }

    /// Store `face` and return its ID: `preferred` if that slot is free,
    /// else the lowest free slot.
    pub fn insert(&mut self, mut face: RealizedFace, preferred: Option<FaceId>) -> FaceId {
        let id = match preferred.filter(|&id| self.get(id).is_none()) {
            Some(id) => id,
            None => self.faces.iter().position(Option::is_none).unwrap_or(self.faces.len()),
        };
        if id >= self.faces.len() {
            self.faces.resize_with(id + 1, || None);
        }

        face.id = id;
        let bucket = &mut self.buckets[Self::bucket(face.hash)];
        if face.is_ascii() {
            bucket.insert(0, id);
        } else {
            bucket.push(id);
        }
        tracing::trace!("Cached face {} (hash {:#x}, ascii {})", id, face.hash, face.is_ascii());
        self.faces[id] = Some(face);
        id
    }

    /// Remove `id` and the variants derived from it. Returns the removed
    /// faces so their resources can be freed.
    pub fn uncache(&mut self, id: FaceId) -> Vec<RealizedFace> {
        let Some(face) = self.faces.get_mut(id).and_then(Option::take) else {
            return Vec::new();
        };
        self.buckets[Self::bucket(face.hash)].retain(|&other| other != id);

        let variants: Vec<FaceId> = self.iter().filter(|f| f.base == Some(id)).map(|f| f.id).collect();
        let mut removed = vec![face];
        for variant in variants {
            removed.extend(self.uncache(variant));
        }

        while matches!(self.faces.last(), Some(None)) {
            self.faces.pop();
        }
        removed
    }

    /// Empty the cache, returning every face.
    pub fn drain(&mut self) -> Vec<RealizedFace> {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.faces.drain(..).flatten().collect()
    }

    pub(crate) fn release_draw_contexts(&mut self, display: &mut dyn DisplayBackend) {
        for face in self.faces.iter_mut().flatten() {
            face.release_draw_context(display);
        }
    }
}
