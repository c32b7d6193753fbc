//! ensview-plot - Figures for ensemble analysis
//!
//! Every drawing function takes an explicit `plotters` drawing area, so
//! figures can be composed, rendered to files or kept in memory.
//!
//! # Key Components
//!
//! - **Lines**: [`show_lines`] with per-line variance bands and gaps
//! - **Matrix**: [`show_matrix`] heat maps with curve or tree side panels,
//!   percentile clipping and a colorbar
//! - **Dendrogram / Tree**: [`show_dendrogram`] and [`draw_tree`]
//! - **Export**: [`render_to_file`] picks SVG or PNG from the extension;
//!   PNG needs the `png` feature

mod chart;

pub mod axis;
pub mod colormap;
pub mod dendrogram;
pub mod error;
pub mod export;
pub mod layout;
pub mod lines;
pub mod matrix;
pub mod scale;
pub mod tree;

pub use axis::*;
pub use colormap::*;
pub use dendrogram::*;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use lines::*;
pub use matrix::*;
pub use scale::*;
pub use tree::*;
