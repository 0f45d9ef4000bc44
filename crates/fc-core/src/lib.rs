pub mod id;
pub mod model;
pub mod viewport;
pub mod wire;

pub use id::{EdgeId, NodeId};
pub use model::*;
pub use viewport::{Viewport, ZoomDirection};
pub use wire::{GraphSnapshot, LayoutUpdate, SchemaError, WireEdge, WireNode, WirePoint};

// Re-export kurbo geometry so downstream crates share one vocabulary.
pub use kurbo::{Line, Point, Rect, Size, Vec2};
