//! Font matcher over installed font files.
//!
//! Candidates are ranked by how far their weight, slant and width are
//! from the request, in the request's sort order. Font files are parsed
//! with fontdue on first use and shared between sizes.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use fontdue::{Font, FontSettings};

use super::discovery::{discover_system_fonts, find_with_fontconfig, SystemFont};
use super::{FontHandle, FontObject, FontRequest, FontSpec, SortKey};
use crate::config::FaceConfig;
use crate::traits::FontMatcher;

const FOUNDRY: &str = "system";
const REGISTRY: &str = "iso10646-1";

struct LoadedFont {
    object: FontObject,
    face: Arc<Font>,
}

/// Matches requests against a list of [`SystemFont`]s.
pub struct SystemFontMatcher {
    fonts: Vec<SystemFont>,
    config: FaceConfig,
    parsed: HashMap<PathBuf, Arc<Font>>,
    handles: HashMap<(usize, i32), FontHandle>,
    loaded: HashMap<FontHandle, LoadedFont>,
    next_handle: FontHandle,
    /// Families already looked up through fontconfig.
    asked_fontconfig: HashSet<String>,
}

impl SystemFontMatcher {
    pub fn new(fonts: Vec<SystemFont>) -> Self {
        Self {
            fonts,
            config: FaceConfig::default(),
            parsed: HashMap::new(),
            handles: HashMap::new(),
            loaded: HashMap::new(),
            next_handle: 1,
            asked_fontconfig: HashSet::new(),
        }
    }

    /// Matcher over every font in the platform font directories.
    pub fn with_system_fonts() -> anyhow::Result<Self> {
        let fonts = discover_system_fonts();
        if fonts.is_empty() {
            anyhow::bail!("no usable fonts found in the system font directories");
        }
        Ok(Self::new(fonts))
    }

    /// Use `config` for point to pixel conversion and the default size.
    pub fn with_config(mut self, config: FaceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fonts(&self) -> &[SystemFont] {
        &self.fonts
    }

    fn score(request: &FontRequest, font: &SystemFont) -> [i32; 4] {
        let mut score = [0; 4];
        for (slot, key) in score.iter_mut().zip(request.order) {
            *slot = match key {
                SortKey::Weight => request.spec.weight.map_or(0, |w| (w.numeric() - font.weight.numeric()).abs()),
                SortKey::Slant => request.spec.slant.map_or(0, |s| (s.numeric() - font.slant.numeric()).abs()),
                SortKey::Width => request.spec.width.map_or(0, |w| (w.numeric() - font.width.numeric()).abs()),
                // Scalable fonts come in every size.
                SortKey::Height => 0,
            };
        }
        score
    }

    fn family_matches(request: &FontRequest, font: &SystemFont) -> bool {
        request.spec.family.as_deref().map_or(true, |family| font.family.eq_ignore_ascii_case(family))
    }

    /// Candidate indices, best first.
    fn ranked(&self, request: &FontRequest, accept: impl Fn(&SystemFont) -> bool) -> Vec<usize> {
        let mut ranked: Vec<(bool, [i32; 4], usize)> = self
            .fonts
            .iter()
            .enumerate()
            .filter(|(_, font)| accept(font))
            .map(|(i, font)| (!Self::family_matches(request, font), Self::score(request, font), i))
            .collect();
        ranked.sort();
        ranked.into_iter().map(|(_, _, i)| i).collect()
    }

    fn pixel_size(&self, request: &FontRequest) -> i32 {
        request
            .spec
            .size
            .map(|size| size.to_pixels(&self.config))
            .filter(|px| *px > 0)
            .unwrap_or_else(|| self.config.decipoints_to_pixel(self.config.initial_height))
    }

    fn parse(&mut self, index: usize) -> Option<Arc<Font>> {
        let path = self.fonts.get(index)?.path.clone();
        if let Some(face) = self.parsed.get(&path) {
            return Some(Arc::clone(face));
        }
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to read font {}: {}", path.display(), e);
                return None;
            }
        };
        let face = match Font::from_bytes(data, FontSettings::default()) {
            Ok(face) => Arc::new(face),
            Err(e) => {
                tracing::warn!("Failed to parse font {}: {}", path.display(), e);
                return None;
            }
        };
        self.parsed.insert(path, Arc::clone(&face));
        Some(face)
    }

    fn open(&mut self, index: usize, pixel_size: i32) -> Option<FontObject> {
        if let Some(handle) = self.handles.get(&(index, pixel_size)) {
            if let Some(loaded) = self.loaded.get(handle) {
                return Some(loaded.object.clone());
            }
        }
        let face = self.parse(index)?;
        let font = self.fonts.get(index)?.clone();
        let height = face
            .horizontal_line_metrics(pixel_size as f32)
            .map(|metrics| metrics.new_line_size.ceil() as i32)
            .filter(|height| *height > 0)
            .unwrap_or(pixel_size + pixel_size / 4);

        let handle = self.next_handle;
        self.next_handle += 1;
        let object = FontObject {
            handle,
            name: format!("{}-{}px:weight={}:slant={}", font.family, pixel_size, font.weight, font.slant),
            family: font.family.clone(),
            foundry: FOUNDRY.to_string(),
            weight: font.weight,
            slant: font.slant,
            width: font.width,
            pixel_size,
            height,
            registry: REGISTRY.to_string(),
        };
        tracing::debug!("Opened font {} from {}", object.name, font.path.display());
        self.handles.insert((index, pixel_size), handle);
        self.loaded.insert(handle, LoadedFont { object: object.clone(), face });
        Some(object)
    }

    /// Add the fontconfig answer for `family` once, if it is not known yet.
    fn ask_fontconfig(&mut self, family: &str) {
        let key = family.to_ascii_lowercase();
        if !self.asked_fontconfig.insert(key) {
            return;
        }
        if let Some(font) = find_with_fontconfig(family) {
            if !self.fonts.iter().any(|known| known.path == font.path) {
                self.fonts.push(font);
            }
        }
    }
}

impl FontMatcher for SystemFontMatcher {
    fn match_font(&mut self, request: &FontRequest) -> Option<FontObject> {
        if let Some(family) = request.spec.family.as_deref() {
            if !self.fonts.iter().any(|font| font.family.eq_ignore_ascii_case(family)) {
                self.ask_fontconfig(family);
            }
        }
        let pixel_size = self.pixel_size(request);
        let candidates = self.ranked(request, |font| Self::family_matches(request, font));
        candidates.into_iter().find_map(|index| self.open(index, pixel_size))
    }

    fn decompose(&self, handle: FontHandle) -> Option<FontSpec> {
        self.loaded.get(&handle).map(|loaded| loaded.object.to_spec())
    }

    fn has_char(&self, handle: FontHandle, ch: char) -> bool {
        self.loaded.get(&handle).is_some_and(|loaded| loaded.face.lookup_glyph_index(ch) != 0)
    }

    fn font_for_char(&mut self, request: &FontRequest, ch: char) -> Option<FontObject> {
        let pixel_size = self.pixel_size(request);
        for index in self.ranked(request, |_| true) {
            let Some(face) = self.parse(index) else {
                continue;
            };
            if face.lookup_glyph_index(ch) != 0 {
                return self.open(index, pixel_size);
            }
        }
        tracing::debug!("No font covers U+{:04X}", ch as u32);
        None
    }

    fn loaded_font_count(&self) -> usize {
        self.loaded.len()
    }

    fn prune(&mut self) {
        tracing::debug!("Dropping {} loaded fonts", self.loaded.len());
        self.loaded.clear();
        self.handles.clear();
        self.parsed.clear();
    }
}
