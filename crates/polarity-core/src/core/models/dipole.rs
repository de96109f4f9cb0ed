use nalgebra::Vector3;
use serde::{Serialize, Serializer, ser::SerializeStruct};

/// The dipole associated with one bond, in Debye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondDipole {
    /// 0-based index of the first bond endpoint.
    pub index_a: usize,
    /// 0-based index of the second bond endpoint.
    pub index_b: usize,
    /// The dipole vector in Debye.
    pub vector: Vector3<f64>,
    /// The Euclidean norm of `vector`.
    pub magnitude: f64,
}

impl BondDipole {
    pub fn new(index_a: usize, index_b: usize, vector: Vector3<f64>) -> Self {
        Self {
            index_a,
            index_b,
            vector,
            magnitude: vector.norm(),
        }
    }
}

impl Serialize for BondDipole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BondDipole", 6)?;
        state.serialize_field("indexA", &self.index_a)?;
        state.serialize_field("indexB", &self.index_b)?;
        state.serialize_field("x", &self.vector.x)?;
        state.serialize_field("y", &self.vector.y)?;
        state.serialize_field("z", &self.vector.z)?;
        state.serialize_field("magnitude", &self.magnitude)?;
        state.end()
    }
}
