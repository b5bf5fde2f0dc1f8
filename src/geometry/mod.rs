//! Immediate-mode geometry batching.

pub mod arena;
pub mod batch;
pub mod vertex;

pub use arena::FixedBuffer;
pub use batch::{BatchCapacity, BatchStats, FrameGeometry, GeometryBatch};
pub use vertex::{Vertex, VertexKey};
