use wgpu::util::DeviceExt;

use crate::coords::Rect;
use crate::geometry::{StrokeGeometry, StrokeVertex};

/// Smallest dynamic buffer, in bytes.
const MIN_DYNAMIC_BYTES: u64 = 1024;

/// Upload hint: committed strokes rarely change, active ones change every frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MeshUsage {
    Static,
    Dynamic,
}

/// Device storage for one triangle list.
pub trait MeshBuffer {
    /// Frees the storage. The owning [`MeshRecord`] calls this exactly once.
    fn release(&mut self);
}

/// Creates and rewrites mesh storage on whichever thread owns the device.
pub trait MeshAllocator {
    type Buffer: MeshBuffer;

    /// `None` when the device cannot provide storage.
    fn allocate(&mut self, vertices: &[StrokeVertex], usage: MeshUsage) -> Option<Self::Buffer>;

    /// Overwrites `buffer` in place. Returns false when it cannot hold
    /// `vertices`; the caller then allocates a fresh buffer.
    fn rewrite(&mut self, buffer: &mut Self::Buffer, vertices: &[StrokeVertex]) -> bool;
}

/// One uploaded mesh, exclusively owned by a committed or in-flight stroke.
///
/// Dropping the record releases its buffer; replacing the geometry releases
/// the old buffer before the new one is stored.
pub struct MeshRecord<B: MeshBuffer> {
    buffer: Option<B>,
    vertex_count: u32,
    byte_size: u64,
    fingerprint: u64,
    bounds: Rect,
}

impl<B: MeshBuffer> MeshRecord<B> {
    /// Uploads `geometry`. Empty geometry yields a record with no buffer.
    pub fn upload<A>(alloc: &mut A, geometry: &StrokeGeometry, usage: MeshUsage) -> Self
    where
        A: MeshAllocator<Buffer = B>,
    {
        let buffer = if geometry.vertices.is_empty() {
            None
        } else {
            alloc.allocate(&geometry.vertices, usage)
        };
        let (vertex_count, byte_size) = match buffer {
            Some(_) => (geometry.vertex_count(), geometry.byte_size()),
            None => (0, 0),
        };
        Self {
            buffer,
            vertex_count,
            byte_size,
            fingerprint: geometry.fingerprint,
            bounds: geometry.bounds,
        }
    }

    /// Replaces the contents, rewriting in place when the buffer allows it.
    pub fn update<A>(&mut self, alloc: &mut A, geometry: &StrokeGeometry, usage: MeshUsage)
    where
        A: MeshAllocator<Buffer = B>,
    {
        let rewritten = match self.buffer.as_mut() {
            Some(buffer) if !geometry.vertices.is_empty() => alloc.rewrite(buffer, &geometry.vertices),
            _ => false,
        };
        if rewritten {
            self.vertex_count = geometry.vertex_count();
            self.byte_size = geometry.byte_size();
            self.fingerprint = geometry.fingerprint;
            self.bounds = geometry.bounds;
            return;
        }
        self.release();
        *self = Self::upload(alloc, geometry, usage);
    }

    pub fn buffer(&self) -> Option<&B> {
        self.buffer.as_ref()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Buffer and vertex count, when there is anything to draw.
    pub fn drawable(&self) -> Option<(&B, u32)> {
        match &self.buffer {
            Some(b) if self.vertex_count > 0 => Some((b, self.vertex_count)),
            _ => None,
        }
    }

    fn release(&mut self) {
        if let Some(mut buffer) = self.buffer.take() {
            buffer.release();
        }
        self.vertex_count = 0;
        self.byte_size = 0;
    }
}

impl<B: MeshBuffer> Drop for MeshRecord<B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: MeshBuffer> std::fmt::Debug for MeshRecord<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshRecord")
            .field("live", &self.buffer.is_some())
            .field("vertex_count", &self.vertex_count)
            .field("byte_size", &self.byte_size)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

// ── wgpu implementation ───────────────────────────────────────────────────

/// A vertex buffer on the GPU.
pub struct GpuMesh {
    buffer: wgpu::Buffer,
    capacity: u64,
    usage: MeshUsage,
}

impl GpuMesh {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl MeshBuffer for GpuMesh {
    fn release(&mut self) {
        self.buffer.destroy();
    }
}

/// Allocates stroke meshes on a wgpu device.
///
/// Static meshes are created initialized and never written again. Dynamic
/// meshes get power-of-two capacity and are rewritten with `write_buffer`.
pub struct GpuMeshAllocator<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
}

impl<'a> GpuMeshAllocator<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

impl MeshAllocator for GpuMeshAllocator<'_> {
    type Buffer = GpuMesh;

    fn allocate(&mut self, vertices: &[StrokeVertex], usage: MeshUsage) -> Option<GpuMesh> {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.is_empty() {
            return None;
        }
        let buffer = match usage {
            MeshUsage::Static => self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quill stroke vbo (static)"),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX,
            }),
            MeshUsage::Dynamic => {
                let capacity = (bytes.len() as u64).next_power_of_two().max(MIN_DYNAMIC_BYTES);
                let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("quill stroke vbo (dynamic)"),
                    size: capacity,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                self.queue.write_buffer(&buffer, 0, bytes);
                buffer
            }
        };
        Some(GpuMesh {
            capacity: buffer.size(),
            buffer,
            usage,
        })
    }

    fn rewrite(&mut self, mesh: &mut GpuMesh, vertices: &[StrokeVertex]) -> bool {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if mesh.usage != MeshUsage::Dynamic || bytes.is_empty() || bytes.len() as u64 > mesh.capacity {
            return false;
        }
        self.queue.write_buffer(&mesh.buffer, 0, bytes);
        true
    }
}

// ── test allocator ────────────────────────────────────────────────────────

/// Counting allocator for GPU-free tests.
#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct Ledger {
        pub next_id: u64,
        pub allocated: Vec<(u64, MeshUsage, usize)>,
        pub releases: HashMap<u64, usize>,
        pub rewrites: usize,
    }

    impl Ledger {
        pub fn live(&self) -> usize {
            self.allocated
                .iter()
                .filter(|(id, ..)| !self.releases.contains_key(id))
                .count()
        }

        pub fn released_more_than_once(&self) -> bool {
            self.releases.values().any(|n| *n > 1)
        }
    }

    #[derive(Debug)]
    pub(crate) struct FakeMesh {
        pub id: u64,
        pub capacity: usize,
        pub usage: MeshUsage,
        ledger: Rc<RefCell<Ledger>>,
    }

    impl MeshBuffer for FakeMesh {
        fn release(&mut self) {
            *self.ledger.borrow_mut().releases.entry(self.id).or_default() += 1;
        }
    }

    #[derive(Debug, Default, Clone)]
    pub(crate) struct FakeAllocator {
        pub ledger: Rc<RefCell<Ledger>>,
    }

    impl MeshAllocator for FakeAllocator {
        type Buffer = FakeMesh;

        fn allocate(&mut self, vertices: &[StrokeVertex], usage: MeshUsage) -> Option<FakeMesh> {
            let mut ledger = self.ledger.borrow_mut();
            let id = ledger.next_id;
            ledger.next_id += 1;
            ledger.allocated.push((id, usage, vertices.len()));
            Some(FakeMesh {
                id,
                capacity: vertices.len().next_power_of_two(),
                usage,
                ledger: Rc::clone(&self.ledger),
            })
        }

        fn rewrite(&mut self, buffer: &mut FakeMesh, vertices: &[StrokeVertex]) -> bool {
            if buffer.usage != MeshUsage::Dynamic || vertices.len() > buffer.capacity {
                return false;
            }
            self.ledger.borrow_mut().rewrites += 1;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeAllocator;
    use super::*;
    use crate::coords::Vec2;
    use crate::geometry::StrokeGeometryBuilder;

    fn geometry(n: usize) -> StrokeGeometry {
        let path: Vec<Vec2> = (0..n).map(|i| Vec2::new(i as f32 * 4.0, 0.0)).collect();
        StrokeGeometryBuilder::new().polyline(&path, 2.0).expect("geometry")
    }

    #[test]
    fn drop_releases_exactly_once() {
        let mut alloc = FakeAllocator::default();
        let record = MeshRecord::upload(&mut alloc, &geometry(3), MeshUsage::Static);
        assert_eq!(record.vertex_count(), 12);
        assert_eq!(record.byte_size(), 12 * 8);
        drop(record);
        let ledger = alloc.ledger.borrow();
        assert_eq!(ledger.releases.get(&0), Some(&1));
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn dynamic_update_rewrites_in_place_until_it_outgrows() {
        let mut alloc = FakeAllocator::default();
        let mut record = MeshRecord::upload(&mut alloc, &geometry(5), MeshUsage::Dynamic);
        // 24 vertices -> capacity 32.
        record.update(&mut alloc, &geometry(4), MeshUsage::Dynamic);
        assert_eq!(alloc.ledger.borrow().rewrites, 1);
        assert_eq!(alloc.ledger.borrow().allocated.len(), 1);

        record.update(&mut alloc, &geometry(12), MeshUsage::Dynamic);
        let ledger = alloc.ledger.borrow();
        assert_eq!(ledger.allocated.len(), 2);
        assert_eq!(ledger.releases.get(&0), Some(&1));
        assert_eq!(record.vertex_count(), 66);
    }

    #[test]
    fn static_update_reallocates() {
        let mut alloc = FakeAllocator::default();
        let mut record = MeshRecord::upload(&mut alloc, &geometry(3), MeshUsage::Static);
        record.update(&mut alloc, &geometry(3), MeshUsage::Static);
        drop(record);
        let ledger = alloc.ledger.borrow();
        assert_eq!(ledger.allocated.len(), 2);
        assert!(!ledger.released_more_than_once());
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn empty_geometry_allocates_nothing() {
        let mut alloc = FakeAllocator::default();
        let empty = StrokeGeometry {
            vertices: Vec::new(),
            bounds: Rect::default(),
            fingerprint: 7,
        };
        let record = MeshRecord::upload(&mut alloc, &empty, MeshUsage::Dynamic);
        assert!(record.drawable().is_none());
        assert_eq!(alloc.ledger.borrow().allocated.len(), 0);
    }
}
