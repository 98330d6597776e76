//! Write-once storage of original vertex positions.
//!
//! Every mesh of a freshly loaded model is captured here exactly once, in load
//! order. Deformation always starts from these baselines, so effects never
//! accumulate into the source geometry.

use crate::StageError;
use glam::Vec3;
use tracing::debug;

/// Opaque reference to a captured baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetHandle(usize);

impl OffsetHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Captured {
    positions: Box<[Vec3]>,
    count: usize,
}

#[derive(Debug, Default)]
pub struct VertexOffsetBuffer {
    entries: Vec<Captured>,
}

impl VertexOffsetBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deep copy of `positions` and return its handle.
    pub fn capture(&mut self, positions: &[Vec3]) -> OffsetHandle {
        let handle = OffsetHandle(self.entries.len());
        self.entries.push(Captured {
            positions: positions.into(),
            count: positions.len(),
        });
        debug!(
            "Captured baseline {} ({} vertices)",
            handle.0,
            positions.len()
        );
        handle
    }

    /// Original positions for `handle`.
    pub fn get(&self, handle: OffsetHandle) -> Result<&[Vec3], StageError> {
        self.entries
            .get(handle.0)
            .map(|c| &c.positions[..])
            .ok_or(StageError::NotCaptured(handle.0))
    }

    /// Vertex count recorded at capture time.
    pub fn count(&self, handle: OffsetHandle) -> Result<usize, StageError> {
        self.entries
            .get(handle.0)
            .map(|c| c.count)
            .ok_or(StageError::NotCaptured(handle.0))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_is_a_deep_copy() {
        let mut buffer = VertexOffsetBuffer::new();
        let mut source = vec![Vec3::ZERO, Vec3::X];
        let handle = buffer.capture(&source);
        source[1] = Vec3::splat(9.0);
        assert_eq!(buffer.get(handle).unwrap(), &[Vec3::ZERO, Vec3::X]);
        assert_eq!(buffer.count(handle).unwrap(), 2);
    }

    #[test]
    fn test_handles_follow_load_order() {
        let mut buffer = VertexOffsetBuffer::new();
        let a = buffer.capture(&[Vec3::X]);
        let b = buffer.capture(&[Vec3::Y, Vec3::Z]);
        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_get_before_capture_fails() {
        let mut other = VertexOffsetBuffer::new();
        let foreign = other.capture(&[Vec3::ONE]);
        let empty = VertexOffsetBuffer::new();
        assert_eq!(empty.get(foreign), Err(StageError::NotCaptured(0)));
    }
}
