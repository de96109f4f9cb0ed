use nalgebra::Point3;
use serde::{Serialize, Serializer, ser::SerializeStruct};

/// An atom as read from an XYZ file.
///
/// Atom order is significant: the index of an atom in its list must match the 1-based
/// atom numbering of the SDF file the bonds were read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The element symbol as written by the producing tool (e.g., "C", "Cl").
    pub symbol: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(symbol: &str, position: Point3<f64>) -> Self {
        Self {
            symbol: symbol.to_string(),
            position,
        }
    }
}

impl Serialize for Atom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Atom", 4)?;
        state.serialize_field("symbol", &self.symbol)?;
        state.serialize_field("x", &self.position.x)?;
        state.serialize_field("y", &self.position.y)?;
        state.serialize_field("z", &self.position.z)?;
        state.end()
    }
}

/// An unordered pair of 0-based atom indices.
///
/// Bonds carry no geometry of their own; directions are computed from atom
/// positions when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_idx: usize,
    pub atom2_idx: usize,
}

impl Bond {
    pub fn new(atom1_idx: usize, atom2_idx: usize) -> Self {
        Self {
            atom1_idx,
            atom2_idx,
        }
    }
}

impl Serialize for Bond {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.atom1_idx, self.atom2_idx].serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_serializes_as_flat_symbol_and_coordinates() {
        let atom = Atom::new("Cl", Point3::new(1.0, -2.5, 0.25));
        let json = serde_json::to_value(&atom).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "symbol": "Cl", "x": 1.0, "y": -2.5, "z": 0.25 })
        );
    }

    #[test]
    fn bond_serializes_as_index_pair() {
        let bond = Bond::new(0, 3);
        assert_eq!(serde_json::to_string(&bond).unwrap(), "[0,3]");
    }
}
