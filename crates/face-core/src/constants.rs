// src/constants.rs

/// Number of slots in an attribute vector.
pub const LFACE_VECTOR_SIZE: usize = 18;

/// Number of hash buckets in a surface's face cache.
pub const FACE_CACHE_BUCKETS_SIZE: usize = 1001;

/// Foreground/background pairs closer than this are "too similar" and
/// trigger the distant-foreground substitution.
pub const NEAR_SAME_COLOR_THRESHOLD: i64 = 30_000;

/// How far a terminal palette color may stray from the requested color
/// and still count as displaying it.
pub const TTY_SAME_COLOR_THRESHOLD: i64 = 10_000;

/// Every this many cache clears, fonts are pruned as well.
pub const CLEAR_FONT_TABLE_COUNT: u32 = 100;

/// Font pruning only happens when more than this many fonts are loaded.
pub const CLEAR_FONT_TABLE_NFONTS: usize = 10;

pub const DEFAULT_STIPPLE: &str = "gray3";

pub const DEFAULT_RESOLUTION_Y: f64 = 96.0;
pub const POINTS_PER_INCH: f64 = 72.0;

pub const DEFAULT_FONT_FAMILY: &str = "Monospace";
/// Height in 1/10 pt.
pub const DEFAULT_FACE_HEIGHT: i32 = 100;

/// Step used when searching for a smaller or larger font, in 1/10 pt.
pub const FONT_STEP_DELTA: i32 = 5;
/// Give up searching once this far (in 1/10 pt) from the last hit.
pub const FONT_STEP_LIMIT: i32 = 100;

/// Family and foundry of the default face on text terminals.
pub const TTY_FAMILY: &str = "default";
pub const TTY_FONT_NAME: &str = "tty";

/// Faces realized at fixed IDs whenever a surface's faces are (re)built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BasicFace {
    Default,
    ModeLine,
    ModeLineInactive,
    ToolBar,
    Fringe,
    HeaderLine,
    ScrollBar,
    Border,
    Cursor,
    Mouse,
    Menu,
    VerticalBorder,
    WindowDivider,
    WindowDividerFirstPixel,
    WindowDividerLastPixel,
    InternalBorder,
}

impl BasicFace {
    pub const ALL: [BasicFace; 16] = [
        BasicFace::Default,
        BasicFace::ModeLine,
        BasicFace::ModeLineInactive,
        BasicFace::ToolBar,
        BasicFace::Fringe,
        BasicFace::HeaderLine,
        BasicFace::ScrollBar,
        BasicFace::Border,
        BasicFace::Cursor,
        BasicFace::Mouse,
        BasicFace::Menu,
        BasicFace::VerticalBorder,
        BasicFace::WindowDivider,
        BasicFace::WindowDividerFirstPixel,
        BasicFace::WindowDividerLastPixel,
        BasicFace::InternalBorder,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BasicFace::Default => "default",
            BasicFace::ModeLine => "mode-line",
            BasicFace::ModeLineInactive => "mode-line-inactive",
            BasicFace::ToolBar => "tool-bar",
            BasicFace::Fringe => "fringe",
            BasicFace::HeaderLine => "header-line",
            BasicFace::ScrollBar => "scroll-bar",
            BasicFace::Border => "border",
            BasicFace::Cursor => "cursor",
            BasicFace::Mouse => "mouse",
            BasicFace::Menu => "menu",
            BasicFace::VerticalBorder => "vertical-border",
            BasicFace::WindowDivider => "window-divider",
            BasicFace::WindowDividerFirstPixel => "window-divider-first-pixel",
            BasicFace::WindowDividerLastPixel => "window-divider-last-pixel",
            BasicFace::InternalBorder => "internal-border",
        }
    }

    pub fn from_id(id: usize) -> Option<BasicFace> {
        Self::ALL.get(id).copied()
    }
}

pub const DEFAULT_FACE_ID: usize = 0;
