//! Dummy backends for testing face realization without a window system

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ops::{Range, RangeInclusive};
use std::rc::Rc;

use face_color::{named::normalize_name, Color, ColorDatabase, TtyColorTable};

use crate::attrs::{BitmapSpec, Slant, Weight, Width};
use crate::font::{FontHandle, FontObject, FontRequest, FontSize, FontSpec, SortKey};
use crate::input::InputBlocker;
use crate::keyword::FaceRef;
use crate::traits::{
    BitmapId, ColorDef, DisplayBackend, DisplayClass, DrawContext, DrawValues, FaceProperty, FontMatcher, Overlay, Pixel,
    PropertySource, TtyCaps,
};

/// Everything a [`DummyDisplay`] was asked to do
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DisplayLog {
    pub allocated_colors: Vec<(String, Pixel)>,
    pub freed_colors: Vec<Pixel>,
    pub created_contexts: Vec<(DrawContext, DrawValues)>,
    pub destroyed_contexts: Vec<DrawContext>,
    pub loaded_bitmaps: Vec<(String, BitmapId)>,
    pub destroyed_bitmaps: Vec<BitmapId>,
    /// Allocations made while input was not blocked
    pub unblocked_allocations: usize,
}

impl DisplayLog {
    /// Colors still allocated, counting each allocation once
    pub fn live_colors(&self) -> usize {
        self.allocated_colors.len().saturating_sub(self.freed_colors.len())
    }

    pub fn clear(&mut self) {
        *self = DisplayLog::default();
    }
}

/// Dummy display - resolves colors from the built-in table and records
/// every allocation
pub struct DummyDisplay {
    class: DisplayClass,
    database: ColorDatabase,
    unallocatable: HashSet<String>,
    tty: Option<TtyColorTable>,
    tty_caps: TtyCaps,
    blocker: Option<InputBlocker>,
    log: Rc<RefCell<DisplayLog>>,
    next_context: DrawContext,
    next_bitmap: BitmapId,
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyDisplay {
    /// A color graphical display
    pub fn new() -> Self {
        DummyDisplay {
            class: DisplayClass::Color,
            database: ColorDatabase::new(),
            unallocatable: HashSet::new(),
            tty: None,
            tty_caps: TtyCaps::default(),
            blocker: None,
            log: Rc::new(RefCell::new(DisplayLog::default())),
            next_context: 1,
            next_bitmap: 1,
        }
    }

    /// A text terminal with the given palette and capabilities
    pub fn terminal(table: TtyColorTable, caps: TtyCaps) -> Self {
        DummyDisplay { tty: Some(table), tty_caps: caps, ..Self::new() }
    }

    pub fn with_class(mut self, class: DisplayClass) -> Self {
        self.class = class;
        self
    }

    /// Add a color name on top of the built-in table
    pub fn with_color(mut self, name: &str, color: Color) -> Self {
        self.database.insert(name, color);
        self
    }

    /// Make allocation of `name` fail, as on a full colormap
    pub fn with_unallocatable(mut self, name: &str) -> Self {
        self.unallocatable.insert(normalize_name(name));
        self
    }

    /// Count allocations made while `blocker` is not blocking input
    pub fn with_input_blocker(mut self, blocker: InputBlocker) -> Self {
        self.blocker = Some(blocker);
        self
    }

    /// Shared handle on the log, usable after the display is boxed
    pub fn log(&self) -> Rc<RefCell<DisplayLog>> {
        Rc::clone(&self.log)
    }

    fn note_allocation(&self) {
        if let Some(blocker) = &self.blocker {
            if !blocker.is_blocked() {
                self.log.borrow_mut().unblocked_allocations += 1;
            }
        }
    }

    fn pixel_for(color: Color) -> Pixel {
        let (r, g, b) = color.to_rgb8();
        ((r as Pixel) << 16) | ((g as Pixel) << 8) | b as Pixel
    }
}

impl DisplayBackend for DummyDisplay {
    fn display_class(&self) -> DisplayClass {
        self.class
    }

    fn defined_color(&mut self, name: &str, alloc: bool) -> Option<ColorDef> {
        if let Some(table) = &self.tty {
            let desc = table.lookup_by_name(name)?;
            return Some(ColorDef { color: desc.entry.color, pixel: desc.entry.index });
        }

        let color = self.database.lookup(name).or_else(|| Color::parse(name).ok())?;
        let pixel = Self::pixel_for(color);
        if alloc {
            if self.unallocatable.contains(&normalize_name(name)) {
                return None;
            }
            self.note_allocation();
            self.log.borrow_mut().allocated_colors.push((name.to_string(), pixel));
        }
        Some(ColorDef { color, pixel })
    }

    fn free_colors(&mut self, pixels: &[Pixel]) {
        self.log.borrow_mut().freed_colors.extend_from_slice(pixels);
    }

    fn create_draw_context(&mut self, values: &DrawValues) -> DrawContext {
        self.note_allocation();
        let ctx = self.next_context;
        self.next_context += 1;
        self.log.borrow_mut().created_contexts.push((ctx, *values));
        ctx
    }

    fn destroy_draw_context(&mut self, ctx: DrawContext) {
        self.log.borrow_mut().destroyed_contexts.push(ctx);
    }

    fn load_bitmap(&mut self, spec: &BitmapSpec) -> Option<BitmapId> {
        self.note_allocation();
        let id = self.next_bitmap;
        self.next_bitmap += 1;
        self.log.borrow_mut().loaded_bitmaps.push((spec.describe(), id));
        Some(id)
    }

    fn destroy_bitmap(&mut self, id: BitmapId) {
        self.log.borrow_mut().destroyed_bitmaps.push(id);
    }

    fn tty_color_table(&self) -> Option<&TtyColorTable> {
        self.tty.as_ref()
    }

    fn tty_capable(&self, caps: TtyCaps) -> bool {
        self.tty.is_some() && self.tty_caps.contains(caps)
    }
}

/// Requests a [`DummyFontMatcher`] has seen
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FontLog {
    pub requests: Vec<FontRequest>,
    pub char_requests: Vec<char>,
    pub prunes: usize,
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    family: String,
    weights: Vec<Weight>,
    slants: Vec<Slant>,
    width: Width,
    coverage: Vec<RangeInclusive<char>>,
}

type FontKey = (String, Weight, Slant, Width, i32);

/// Dummy font matcher - a catalog of scalable families, any size
pub struct DummyFontMatcher {
    catalog: Vec<CatalogEntry>,
    handles: HashMap<FontKey, FontHandle>,
    loaded: HashMap<FontHandle, FontObject>,
    log: Rc<RefCell<FontLog>>,
}

impl Default for DummyFontMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Pixel size used when a request names none
const DUMMY_PIXEL_SIZE: i32 = 16;

impl DummyFontMatcher {
    /// `Mono` and `Sans` in regular, bold and italic, covering Latin-1
    pub fn new() -> Self {
        let mut matcher = Self::empty();
        matcher.add_family("Mono", Width::Normal, vec!['\0'..='\u{ff}']);
        matcher.add_family("Sans", Width::Normal, vec!['\0'..='\u{ff}']);
        matcher
    }

    /// No fonts at all
    pub fn empty() -> Self {
        DummyFontMatcher {
            catalog: Vec::new(),
            handles: HashMap::new(),
            loaded: HashMap::new(),
            log: Rc::new(RefCell::new(FontLog::default())),
        }
    }

    /// Add a family with regular, bold and italic styles
    pub fn with_family(mut self, family: &str, coverage: Vec<RangeInclusive<char>>) -> Self {
        self.add_family(family, Width::Normal, coverage);
        self
    }

    /// Add a family that only exists in its regular style
    pub fn with_plain_family(mut self, family: &str, coverage: Vec<RangeInclusive<char>>) -> Self {
        self.catalog.push(CatalogEntry {
            family: family.to_string(),
            weights: vec![Weight::Normal],
            slants: vec![Slant::Normal],
            width: Width::Normal,
            coverage,
        });
        self
    }

    fn add_family(&mut self, family: &str, width: Width, coverage: Vec<RangeInclusive<char>>) {
        self.catalog.push(CatalogEntry {
            family: family.to_string(),
            weights: vec![Weight::Normal, Weight::Bold],
            slants: vec![Slant::Normal, Slant::Italic],
            width,
            coverage,
        });
    }

    pub fn log(&self) -> Rc<RefCell<FontLog>> {
        Rc::clone(&self.log)
    }

    fn covers(entry: &CatalogEntry, ch: char) -> bool {
        entry.coverage.iter().any(|range| range.contains(&ch))
    }

    /// Distance of a style from the request, most significant key first
    fn score(request: &FontRequest, weight: Weight, slant: Slant, width: Width) -> Vec<i32> {
        request
            .order
            .iter()
            .map(|key| match key {
                SortKey::Weight => request.spec.weight.map_or(0, |w| (w.numeric() - weight.numeric()).abs()),
                SortKey::Slant => request.spec.slant.map_or(0, |s| (s.numeric() - slant.numeric()).abs()),
                SortKey::Width => request.spec.width.map_or(0, |w| (w.numeric() - width.numeric()).abs()),
                SortKey::Height => 0,
            })
            .collect()
    }

    fn best_in(&mut self, request: &FontRequest, entries: &[CatalogEntry]) -> Option<FontObject> {
        let mut best: Option<(Vec<i32>, &CatalogEntry, Weight, Slant)> = None;
        for entry in entries {
            for &weight in &entry.weights {
                for &slant in &entry.slants {
                    let score = Self::score(request, weight, slant, entry.width);
                    if best.as_ref().map_or(true, |(current, ..)| score < *current) {
                        best = Some((score, entry, weight, slant));
                    }
                }
            }
        }
        let (_, entry, weight, slant) = best?;
        let pixel_size = match request.spec.size {
            Some(FontSize::Pixels(px)) if px > 0 => px,
            Some(FontSize::Points(pt)) if pt > 0.0 => (pt * 96.0 / 72.0).round() as i32,
            _ => DUMMY_PIXEL_SIZE,
        };
        let (family, width) = (entry.family.clone(), entry.width);
        Some(self.open(&family, weight, slant, width, pixel_size))
    }

    fn open(&mut self, family: &str, weight: Weight, slant: Slant, width: Width, pixel_size: i32) -> FontObject {
        let key = (family.to_ascii_lowercase(), weight, slant, width, pixel_size);
        let next = self.handles.len() as FontHandle + 1;
        let handle = *self.handles.entry(key).or_insert(next);
        let font = FontObject {
            handle,
            name: format!("{family}-{pixel_size}px:weight={weight}:slant={slant}"),
            family: family.to_string(),
            foundry: "dummy".to_string(),
            weight,
            slant,
            width,
            pixel_size,
            height: pixel_size + pixel_size / 4,
            registry: "iso10646-1".to_string(),
        };
        self.loaded.insert(handle, font.clone());
        font
    }
}

impl FontMatcher for DummyFontMatcher {
    fn match_font(&mut self, request: &FontRequest) -> Option<FontObject> {
        self.log.borrow_mut().requests.push(request.clone());
        let candidates: Vec<CatalogEntry> = self
            .catalog
            .iter()
            .filter(|entry| {
                request.spec.family.as_deref().map_or(true, |family| entry.family.eq_ignore_ascii_case(family))
            })
            .cloned()
            .collect();
        self.best_in(request, &candidates)
    }

    fn decompose(&self, handle: FontHandle) -> Option<FontSpec> {
        self.loaded.get(&handle).map(FontObject::to_spec)
    }

    fn has_char(&self, handle: FontHandle, ch: char) -> bool {
        let Some(font) = self.loaded.get(&handle) else {
            return false;
        };
        self.catalog
            .iter()
            .any(|entry| entry.family.eq_ignore_ascii_case(&font.family) && Self::covers(entry, ch))
    }

    fn font_for_char(&mut self, request: &FontRequest, ch: char) -> Option<FontObject> {
        self.log.borrow_mut().char_requests.push(ch);
        let covering: Vec<CatalogEntry> =
            self.catalog.iter().filter(|entry| Self::covers(entry, ch)).cloned().collect();
        let preferred: Vec<CatalogEntry> = covering
            .iter()
            .filter(|entry| {
                request.spec.family.as_deref().is_some_and(|family| entry.family.eq_ignore_ascii_case(family))
            })
            .cloned()
            .collect();
        if preferred.is_empty() {
            self.best_in(request, &covering)
        } else {
            self.best_in(request, &preferred)
        }
    }

    fn loaded_font_count(&self) -> usize {
        self.loaded.len()
    }

    fn prune(&mut self) {
        self.loaded.clear();
        self.log.borrow_mut().prunes += 1;
    }
}

/// Text of a fixed length with face properties in ranges and overlays
#[derive(Debug, Clone, Default)]
pub struct DummyText {
    len: usize,
    faces: Vec<(Range<usize>, FaceRef)>,
    mouse_faces: Vec<(Range<usize>, FaceRef)>,
    overlays: Vec<Overlay>,
}

impl DummyText {
    pub fn new(len: usize) -> Self {
        DummyText { len, ..Self::default() }
    }

    pub fn with_face(mut self, range: Range<usize>, face: FaceRef) -> Self {
        self.faces.push((range, face));
        self
    }

    pub fn with_mouse_face(mut self, range: Range<usize>, face: FaceRef) -> Self {
        self.mouse_faces.push((range, face));
        self
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.push(overlay);
        self
    }
}

impl PropertySource for DummyText {
    fn text_property(&self, pos: usize, prop: FaceProperty, limit: usize) -> (Option<FaceRef>, Option<usize>) {
        let runs = match prop {
            FaceProperty::Face => &self.faces,
            FaceProperty::MouseFace => &self.mouse_faces,
        };
        let value = runs.iter().find(|(range, _)| range.contains(&pos)).map(|(_, face)| face.clone());
        let next = runs
            .iter()
            .flat_map(|(range, _)| [range.start, range.end])
            .filter(|&boundary| boundary > pos)
            .min()
            .unwrap_or(self.len);
        (value, Some(next.min(limit).min(self.len)))
    }

    fn overlays_at(&self, pos: usize) -> (Vec<Overlay>, Option<usize>) {
        let covering = self.overlays.iter().filter(|o| o.start <= pos && pos < o.end).cloned().collect();
        let next = self.overlays.iter().flat_map(|o| [o.start, o.end]).filter(|&boundary| boundary > pos).min();
        (covering, next)
    }

    fn end(&self) -> usize {
        self.len
    }
}
