//! Per-frame geometry accumulation.
//!
//! Scene code pushes lines, triangles and quads between `begin_frame` and the
//! draw. All primitives share one deduplicated vertex pool; triangles and
//! lines each get their own index list.

use log::warn;
use rustc_hash::FxHashMap;

use crate::error::{BufferKind, Result};
use crate::math::{Vec2, Vec3, Vec4};

use super::arena::FixedBuffer;
use super::vertex::{Vertex, VertexKey};

/// Most vertices a single push carries (a quad's two triangles).
const MAX_PRIMITIVE_VERTICES: usize = 6;

/// Sizes of the three fixed buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCapacity {
    pub vertices: usize,
    pub triangle_indices: usize,
    pub line_indices: usize,
}

impl Default for BatchCapacity {
    fn default() -> Self {
        Self {
            vertices: 16 * 1024 * 3,
            triangle_indices: 16 * 1024 * 3,
            line_indices: 4 * 1024,
        }
    }
}

/// Counters for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub vertices: usize,
    pub triangle_indices: usize,
    pub line_indices: usize,
    /// Pushed vertices that resolved to an existing pool entry.
    pub dedup_hits: usize,
    /// Primitives rejected for lack of capacity.
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topology {
    Triangles,
    Lines,
}

/// Read-only view of one frame's geometry, ready for a backend.
#[derive(Debug, Clone, Copy)]
pub struct FrameGeometry<'a> {
    pub vertices: &'a [Vertex],
    pub triangle_indices: &'a [u32],
    pub line_indices: &'a [u32],
}

impl<'a> FrameGeometry<'a> {
    pub fn vertex_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.vertices)
    }

    pub fn triangle_index_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.triangle_indices)
    }

    pub fn line_index_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.line_indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }

    pub fn line_count(&self) -> usize {
        self.line_indices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_indices.is_empty() && self.line_indices.is_empty()
    }
}

/// Deduplicating, fixed-capacity vertex/index accumulator.
///
/// Invariant: every stored index is `< vertices.len()`.
#[derive(Debug)]
pub struct GeometryBatch {
    vertices: FixedBuffer<Vertex>,
    triangle_indices: FixedBuffer<u32>,
    line_indices: FixedBuffer<u32>,
    lookup: FxHashMap<VertexKey, u32>,
    dedup_hits: usize,
    rejected: usize,
}

impl Default for GeometryBatch {
    fn default() -> Self {
        Self::new(BatchCapacity::default())
    }
}

impl GeometryBatch {
    pub fn new(capacity: BatchCapacity) -> Self {
        Self {
            vertices: FixedBuffer::with_capacity(BufferKind::Vertices, capacity.vertices),
            triangle_indices: FixedBuffer::with_capacity(
                BufferKind::TriangleIndices,
                capacity.triangle_indices,
            ),
            line_indices: FixedBuffer::with_capacity(BufferKind::LineIndices, capacity.line_indices),
            lookup: FxHashMap::with_capacity_and_hasher(capacity.vertices, Default::default()),
            dedup_hits: 0,
            rejected: 0,
        }
    }

    pub fn capacity(&self) -> BatchCapacity {
        BatchCapacity {
            vertices: self.vertices.capacity(),
            triangle_indices: self.triangle_indices.capacity(),
            line_indices: self.line_indices.capacity(),
        }
    }

    /// Empties all buffers for a new frame. Allocations are kept.
    pub fn begin_frame(&mut self) {
        self.vertices.clear();
        self.triangle_indices.clear();
        self.line_indices.clear();
        self.lookup.clear();
        self.dedup_hits = 0;
        self.rejected = 0;
    }

    /// Adds a white line segment between two points.
    pub fn push_line(&mut self, a: Vec3, b: Vec3, texture: u32) -> Result<()> {
        self.push_primitive(
            &[Vertex::line_point(a, texture), Vertex::line_point(b, texture)],
            Topology::Lines,
        )
    }

    pub fn push_triangle(&mut self, a: Vertex, b: Vertex, c: Vertex) -> Result<()> {
        self.push_primitive(&[a, b, c], Topology::Triangles)
    }

    /// Adds an axis-aligned quad in the XY plane at `bottom_left.z`, facing +Z.
    ///
    /// Both triangles are written or neither is.
    pub fn push_quad(
        &mut self,
        bottom_left: Vec3,
        color: Vec4,
        width: f32,
        height: f32,
        texture: u32,
    ) -> Result<()> {
        let Vec3 { x, y, z } = bottom_left;
        let normal = Vec3::BACK;
        let corner = |px: f32, py: f32, uv: Vec2| {
            Vertex::new(Vec3::new(px, py, z), color, uv, normal, texture)
        };

        let bl = corner(x, y, Vec2::new(0.0, 0.0));
        let br = corner(x + width, y, Vec2::new(1.0, 0.0));
        let tr = corner(x + width, y + height, Vec2::new(1.0, 1.0));
        let tl = corner(x, y + height, Vec2::new(0.0, 1.0));

        self.push_primitive(&[bl, br, tr, bl, tr, tl], Topology::Triangles)
    }

    /// Resolves each vertex to a pool index and appends the indices.
    ///
    /// Capacity for new pool entries and for the indices is checked before
    /// anything is written, so a failed push leaves the batch unchanged.
    fn push_primitive(&mut self, vertices: &[Vertex], topology: Topology) -> Result<()> {
        debug_assert!(vertices.len() <= MAX_PRIMITIVE_VERTICES);

        let mut keys = [VertexKey::default(); MAX_PRIMITIVE_VERTICES];
        for (key, vertex) in keys.iter_mut().zip(vertices) {
            *key = vertex.key();
        }
        let keys = &keys[..vertices.len()];

        // Distinct keys not yet in the pool.
        let mut new_keys = [VertexKey::default(); MAX_PRIMITIVE_VERTICES];
        let mut new_count = 0;
        for key in keys {
            if !self.lookup.contains_key(key) && !new_keys[..new_count].contains(key) {
                new_keys[new_count] = *key;
                new_count += 1;
            }
        }

        let indices = match topology {
            Topology::Triangles => &self.triangle_indices,
            Topology::Lines => &self.line_indices,
        };
        if let Err(err) = self
            .vertices
            .reserve_check(new_count)
            .and_then(|_| indices.reserve_check(vertices.len()))
        {
            self.rejected += 1;
            if self.rejected == 1 {
                warn!("dropping geometry this frame: {err}");
            }
            return Err(err);
        }

        let mut resolved = [0u32; MAX_PRIMITIVE_VERTICES];
        for (slot, (vertex, key)) in vertices.iter().zip(keys).enumerate() {
            let index = match self.lookup.get(key) {
                Some(&index) => {
                    self.dedup_hits += 1;
                    index
                }
                None => {
                    let index = self.vertices.len() as u32;
                    self.vertices.push(*vertex)?;
                    self.lookup.insert(*key, index);
                    index
                }
            };
            resolved[slot] = index;
        }

        let resolved = &resolved[..vertices.len()];
        match topology {
            Topology::Triangles => self.triangle_indices.extend_from_slice(resolved),
            Topology::Lines => self.line_indices.extend_from_slice(resolved),
        }
    }

    /// Read-only view of everything pushed since `begin_frame`.
    pub fn frame(&self) -> FrameGeometry<'_> {
        FrameGeometry {
            vertices: self.vertices.as_slice(),
            triangle_indices: self.triangle_indices.as_slice(),
            line_indices: self.line_indices.as_slice(),
        }
    }

    pub fn stats(&self) -> BatchStats {
        BatchStats {
            vertices: self.vertices.len(),
            triangle_indices: self.triangle_indices.len(),
            line_indices: self.line_indices.len(),
            dedup_hits: self.dedup_hits,
            rejected: self.rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn vertex(x: f32, y: f32) -> Vertex {
        Vertex::new(Vec3::new(x, y, 0.0), Vec4::ONE, Vec2::ZERO, Vec3::BACK, 0)
    }

    fn small(vertices: usize, triangle_indices: usize, line_indices: usize) -> GeometryBatch {
        GeometryBatch::new(BatchCapacity {
            vertices,
            triangle_indices,
            line_indices,
        })
    }

    fn assert_indices_in_range(batch: &GeometryBatch) {
        let frame = batch.frame();
        let n = frame.vertices.len() as u32;
        assert!(frame.triangle_indices.iter().all(|&i| i < n));
        assert!(frame.line_indices.iter().all(|&i| i < n));
    }

    #[test]
    fn identical_triangles_share_vertices() {
        let mut batch = GeometryBatch::default();
        for _ in 0..10 {
            batch
                .push_triangle(vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0))
                .unwrap();
        }

        let frame = batch.frame();
        assert_eq!(frame.vertices.len(), 3);
        assert_eq!(frame.triangle_indices.len(), 30);
        assert_eq!(&frame.triangle_indices[27..], &[0, 1, 2]);
        assert_eq!(batch.stats().dedup_hits, 27);
        assert_indices_in_range(&batch);
    }

    #[test]
    fn identical_points_share_one_entry() {
        let mut batch = GeometryBatch::default();
        let p = Vec3::new(1.0, 2.0, 3.0);
        for _ in 0..5 {
            batch.push_line(p, p, 0).unwrap();
        }
        let frame = batch.frame();
        assert_eq!(frame.vertices.len(), 1);
        assert_eq!(frame.line_indices, &[0; 10]);
    }

    #[test]
    fn distinct_vertices_are_all_kept() {
        let mut batch = GeometryBatch::default();
        for i in 0..4 {
            let x = i as f32 * 3.0;
            batch
                .push_triangle(vertex(x, 0.0), vertex(x + 1.0, 0.0), vertex(x + 2.0, 0.0))
                .unwrap();
        }
        assert_eq!(batch.frame().vertices.len(), 12);
        assert_eq!(batch.stats().dedup_hits, 0);
    }

    #[test]
    fn near_equal_vertices_are_not_merged() {
        let mut batch = GeometryBatch::default();
        let a = Vec3::new(0.1, 0.2, 0.3);
        let b = Vec3::new(0.1 + f32::EPSILON, 0.2, 0.3);
        batch.push_line(a, b, 0).unwrap();
        assert_eq!(batch.frame().vertices.len(), 2);
    }

    #[test]
    fn quad_layout() {
        let mut batch = GeometryBatch::default();
        let color = Vec4::new(1.0, 0.0, 0.0, 1.0);
        batch.push_quad(Vec3::new(1.0, 2.0, -1.0), color, 2.0, 3.0, 4).unwrap();

        let frame = batch.frame();
        assert_eq!(frame.vertices.len(), 4);
        assert_eq!(frame.triangle_indices, &[0, 1, 2, 0, 2, 3]);

        let positions: Vec<Vec3> = frame.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                Vec3::new(1.0, 2.0, -1.0),
                Vec3::new(3.0, 2.0, -1.0),
                Vec3::new(3.0, 5.0, -1.0),
                Vec3::new(1.0, 5.0, -1.0),
            ]
        );
        assert_eq!(frame.vertices[2].uv, Vec2::new(1.0, 1.0));
        assert!(frame.vertices.iter().all(|v| v.normal == Vec3::BACK && v.texture == 4));
    }

    #[test]
    fn line_vertices_are_white() {
        let mut batch = GeometryBatch::default();
        batch.push_line(Vec3::ZERO, Vec3::ONE, 2).unwrap();
        let frame = batch.frame();
        assert!(frame
            .vertices
            .iter()
            .all(|v| v.color == Vec4::ONE && v.uv == Vec2::ZERO && v.normal == Vec3::ZERO));
        assert_eq!(frame.line_count(), 1);
    }

    #[test]
    fn index_capacity_exceeded_leaves_state_intact() {
        let mut batch = small(64, 6, 4);
        batch.push_triangle(vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)).unwrap();
        batch.push_triangle(vertex(2.0, 0.0), vertex(3.0, 0.0), vertex(2.0, 1.0)).unwrap();

        let before = batch.stats();
        let err = batch
            .push_triangle(vertex(4.0, 0.0), vertex(5.0, 0.0), vertex(4.0, 1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityExceeded {
                buffer: BufferKind::TriangleIndices,
                capacity: 6
            }
        ));

        let after = batch.stats();
        assert_eq!(after.vertices, before.vertices);
        assert_eq!(after.triangle_indices, before.triangle_indices);
        assert_eq!(after.rejected, 1);
        assert_indices_in_range(&batch);

        // Lines have their own list.
        batch.push_line(Vec3::ZERO, Vec3::ONE, 0).unwrap();
    }

    #[test]
    fn vertex_capacity_exceeded_is_atomic() {
        let mut batch = small(5, 64, 64);
        batch.push_triangle(vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)).unwrap();

        // Needs four new vertices, only two slots remain.
        let err = batch
            .push_quad(Vec3::new(10.0, 10.0, 0.0), Vec4::ONE, 1.0, 1.0, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityExceeded {
                buffer: BufferKind::Vertices,
                capacity: 5
            }
        ));
        assert_eq!(batch.frame().vertices.len(), 3);
        assert_eq!(batch.frame().triangle_indices.len(), 3);

        // Reusing existing vertices still fits.
        batch.push_triangle(vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)).unwrap();
        assert_eq!(batch.frame().triangle_indices.len(), 6);
    }

    #[test]
    fn begin_frame_clears_everything() {
        let mut batch = GeometryBatch::default();
        batch.push_line(Vec3::ZERO, Vec3::ONE, 0).unwrap();
        batch.push_quad(Vec3::ZERO, Vec4::ONE, 1.0, 1.0, 0).unwrap();
        batch.begin_frame();

        assert!(batch.frame().is_empty());
        assert_eq!(batch.stats(), BatchStats::default());

        batch.push_line(Vec3::ZERO, Vec3::ONE, 0).unwrap();
        assert_eq!(batch.frame().line_indices, &[0, 1]);
    }

    #[test]
    fn byte_views_match_counts() {
        let mut batch = GeometryBatch::default();
        batch.push_quad(Vec3::ZERO, Vec4::ONE, 1.0, 1.0, 0).unwrap();
        let frame = batch.frame();
        assert_eq!(frame.vertex_bytes().len(), 4 * std::mem::size_of::<Vertex>());
        assert_eq!(frame.triangle_index_bytes().len(), 6 * 4);
        assert!(frame.line_index_bytes().is_empty());
    }

    /// Counts allocations made on threads that opted in, so other tests
    /// running in parallel do not disturb the count.
    mod counting {
        use std::alloc::{GlobalAlloc, Layout, System};
        use std::cell::Cell;

        pub struct CountingAllocator;

        thread_local! {
            static COUNT: Cell<Option<usize>> = const { Cell::new(None) };
        }

        unsafe impl GlobalAlloc for CountingAllocator {
            unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
                let _ = COUNT.try_with(|count| count.set(count.get().map(|n| n + 1)));
                System.alloc(layout)
            }

            unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
                System.dealloc(ptr, layout)
            }
        }

        /// Runs `f` and returns how many allocations it made on this thread.
        pub fn allocations_in(f: impl FnOnce()) -> usize {
            COUNT.with(|count| count.set(Some(0)));
            f();
            COUNT.with(|count| count.replace(None)).unwrap_or(0)
        }
    }

    #[global_allocator]
    static ALLOCATOR: counting::CountingAllocator = counting::CountingAllocator;

    #[test]
    fn pushes_do_not_allocate() {
        let mut batch = GeometryBatch::default();
        let allocations = counting::allocations_in(|| {
            for i in 0..100 {
                let x = i as f32;
                batch.push_line(Vec3::new(x, 0.0, 0.0), Vec3::new(x, 1.0, 0.0), 0).unwrap();
                batch.push_quad(Vec3::new(x, 2.0, 0.0), Vec4::ONE, 1.0, 1.0, 0).unwrap();
            }
            batch.begin_frame();
            batch.push_line(Vec3::ZERO, Vec3::ONE, 0).unwrap();
        });
        assert_eq!(allocations, 0);
        assert_eq!(batch.stats().line_indices, 2);
    }
}
