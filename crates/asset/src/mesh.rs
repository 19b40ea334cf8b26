//! Welded, triangulated meshes as the OBJ loader hands them to the renderer.

/// One welded OBJ corner. Missing normals and texture coordinates are
/// filled with the loader's defaults, so every field is always set.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Triangle list with `u32` indices into `vertices`, three per triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Non-empty, a whole number of triangles, and every index in range.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty()
            && !self.indices.is_empty()
            && self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_checks_index_range() {
        let tri = MeshData::new(vec![MeshVertex::default(); 3], vec![0, 1, 2]);
        assert!(tri.is_valid());
        assert_eq!(tri.triangle_count(), 1);

        let dangling = MeshData::new(vec![MeshVertex::default(); 3], vec![0, 1, 3]);
        assert!(!dangling.is_valid());

        let partial = MeshData::new(vec![MeshVertex::default(); 3], vec![0, 1]);
        assert!(!partial.is_valid());
        assert!(!MeshData::default().is_valid());
    }
}
