use nalgebra::{Point3, Vector3};

/// A triangulated surface as produced by the SES mesher.
///
/// Vertex positions (Angstroms) and normals are kept exactly as the mesher emitted them. Face indices
/// are 0-based.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceMesh {
    pub positions: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl SurfaceMesh {
    pub fn new(
        positions: Vec<Point3<f64>>,
        normals: Vec<Vector3<f64>>,
        faces: Vec<[usize; 3]>,
    ) -> Self {
        Self {
            positions,
            normals,
            faces,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the first face that references a vertex outside the vertex list.
    pub fn find_dangling_face(&self) -> Option<(usize, [usize; 3])> {
        let n = self.vertex_count();
        self.faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&v| v >= n))
            .map(|(i, face)| (i, *face))
    }
}
