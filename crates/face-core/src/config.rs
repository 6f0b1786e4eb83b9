// src/config.rs
use crate::constants::{
    CLEAR_FONT_TABLE_COUNT, CLEAR_FONT_TABLE_NFONTS, DEFAULT_FACE_HEIGHT, DEFAULT_FONT_FAMILY,
    DEFAULT_RESOLUTION_Y, DEFAULT_STIPPLE, NEAR_SAME_COLOR_THRESHOLD, TTY_SAME_COLOR_THRESHOLD,
};
use crate::font::FontObject;

#[derive(Clone, Debug, PartialEq)]
pub struct FaceConfig {
    pub near_same_color_threshold: i64,
    pub tty_same_color_threshold: i64,
    pub clear_font_table_count: u32,
    pub clear_font_table_nfonts: usize,
    /// Bitmap used for backgrounds the display cannot show. `None`
    /// disables the substitution.
    pub default_stipple: Option<String>,
    /// Drop the bold flag of terminal faces drawn in the inverted default
    /// colors.
    pub tty_suppress_bold_inverse_default_colors: bool,
    /// Family tried for the default face when a surface has no font.
    pub initial_font_family: String,
    /// Height in 1/10 pt for that fallback font.
    pub initial_height: i32,
    pub resolution_y: f64,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            near_same_color_threshold: NEAR_SAME_COLOR_THRESHOLD,
            tty_same_color_threshold: TTY_SAME_COLOR_THRESHOLD,
            clear_font_table_count: CLEAR_FONT_TABLE_COUNT,
            clear_font_table_nfonts: CLEAR_FONT_TABLE_NFONTS,
            default_stipple: Some(DEFAULT_STIPPLE.to_string()),
            tty_suppress_bold_inverse_default_colors: false,
            initial_font_family: DEFAULT_FONT_FAMILY.to_string(),
            initial_height: DEFAULT_FACE_HEIGHT,
            resolution_y: DEFAULT_RESOLUTION_Y,
        }
    }
}

impl FaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_near_same_color_threshold(mut self, threshold: i64) -> Self {
        self.near_same_color_threshold = threshold;
        self
    }

    pub fn with_tty_same_color_threshold(mut self, threshold: i64) -> Self {
        self.tty_same_color_threshold = threshold;
        self
    }

    pub fn with_clear_font_table(mut self, count: u32, nfonts: usize) -> Self {
        self.clear_font_table_count = count.max(1);
        self.clear_font_table_nfonts = nfonts;
        self
    }

    pub fn with_default_stipple(mut self, stipple: Option<&str>) -> Self {
        self.default_stipple = stipple.map(str::to_string);
        self
    }

    pub fn with_tty_suppress_bold_inverse_default_colors(mut self, enabled: bool) -> Self {
        self.tty_suppress_bold_inverse_default_colors = enabled;
        self
    }

    pub fn with_initial_font(mut self, family: &str, height: i32) -> Self {
        self.initial_font_family = family.to_string();
        self.initial_height = height.max(1);
        self
    }

    pub fn with_resolution_y(mut self, dpi: f64) -> Self {
        if dpi > 0.0 {
            self.resolution_y = dpi;
        }
        self
    }

    /// Convert a pixel size to 1/10 pt at this resolution.
    pub fn pixel_to_decipoints(&self, pixel_size: i32) -> i32 {
        (pixel_size as f64 * 10.0 * crate::constants::POINTS_PER_INCH / self.resolution_y).round() as i32
    }

    /// Convert 1/10 pt to a pixel size at this resolution.
    pub fn decipoints_to_pixel(&self, height: i32) -> i32 {
        (height as f64 / 10.0 * self.resolution_y / crate::constants::POINTS_PER_INCH).round() as i32
    }
}

/// Display parameters a surface is created with. Editing the default,
/// `border`, `cursor` or `mouse` faces writes back into these.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceParams {
    pub foreground_color: Option<String>,
    pub background_color: Option<String>,
    pub font: Option<FontObject>,
    pub border_color: Option<String>,
    pub cursor_color: Option<String>,
    pub mouse_color: Option<String>,
    pub reverse_video: bool,
}

impl SurfaceParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(mut self, foreground: &str, background: &str) -> Self {
        self.foreground_color = Some(foreground.to_string());
        self.background_color = Some(background.to_string());
        self
    }

    pub fn with_font(mut self, font: FontObject) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_reverse_video(mut self, enabled: bool) -> Self {
        self.reverse_video = enabled;
        self
    }

    /// Current value of a named color parameter.
    pub fn color(&self, param: &str) -> Option<&str> {
        match param {
            "foreground-color" => self.foreground_color.as_deref(),
            "background-color" => self.background_color.as_deref(),
            "border-color" => self.border_color.as_deref(),
            "cursor-color" => self.cursor_color.as_deref(),
            "mouse-color" => self.mouse_color.as_deref(),
            _ => None,
        }
    }

    /// Store a named color parameter. Returns false for unknown names.
    pub fn set_color(&mut self, param: &str, value: Option<&str>) -> bool {
        let slot = match param {
            "foreground-color" => &mut self.foreground_color,
            "background-color" => &mut self.background_color,
            "border-color" => &mut self.border_color,
            "cursor-color" => &mut self.cursor_color,
            "mouse-color" => &mut self.mouse_color,
            _ => return false,
        };
        *slot = value.map(str::to_string);
        true
    }
}
