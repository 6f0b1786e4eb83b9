//! # Face colors
//!
//! Color values and lookups shared by the face realization core: parsing
//! of color specifications, the named-color table, the perceptual
//! distance metric, and the indexed palettes of text terminals.

pub mod color;
pub mod distance;
pub mod named;
pub mod tty;

pub use color::{Color, ColorParseError};
pub use distance::{color_distance, is_gray};
pub use named::ColorDatabase;
pub use tty::{TtyColor, TtyColorDesc, TtyColorTable, DEFAULT_BG_INDEX, DEFAULT_FG_INDEX, UNSPECIFIED_BG, UNSPECIFIED_FG};
