//! Flowchart presentation: hit testing and SVG output.

pub mod hit;
pub mod svg;

pub use hit::{Hit, HitTolerance, hit_test};
pub use svg::{Overlay, render_svg};
