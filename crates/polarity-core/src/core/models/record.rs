use super::atom::{Atom, Bond};
use super::dipole::BondDipole;
use super::mesh::SurfaceMesh;
use nalgebra::Vector3;
use serde::{Serialize, Serializer, ser::SerializeStruct};
use std::collections::BTreeMap;

/// Everything the simulation needs to render one molecule.
///
/// A record is assembled once at the end of a molecule's pipeline run and is not mutated
/// afterwards. Its JSON form is the contract with the simulation front end.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// Molecular dipole in Debye.
    pub molecular_dipole: Vector3<f64>,
    pub bond_dipoles: Vec<BondDipole>,
    pub mesh: SurfaceMesh,
    /// Electrostatic potential at each mesh vertex (Hartree/e).
    pub vertex_esps: Vec<f64>,
    /// Electron density at each mesh vertex (e/a0³).
    pub vertex_densities: Vec<f64>,
}

/// The aggregate output of a batch, keyed by molecule name.
pub type MoleculeDataset = BTreeMap<String, MoleculeRecord>;

impl Serialize for MoleculeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let positions: Vec<[f64; 3]> = self.mesh.positions.iter().map(|p| [p.x, p.y, p.z]).collect();
        let normals: Vec<[f64; 3]> = self.mesh.normals.iter().map(|n| [n.x, n.y, n.z]).collect();
        let dipole = [
            self.molecular_dipole.x,
            self.molecular_dipole.y,
            self.molecular_dipole.z,
        ];

        let mut state = serializer.serialize_struct("MoleculeRecord", 9)?;
        state.serialize_field("atoms", &self.atoms)?;
        state.serialize_field("bonds", &self.bonds)?;
        state.serialize_field("molecularDipole", &dipole)?;
        state.serialize_field("bondDipoles", &self.bond_dipoles)?;
        state.serialize_field("vertexPositions", &positions)?;
        state.serialize_field("vertexNormals", &normals)?;
        state.serialize_field("faceIndices", &self.mesh.faces)?;
        state.serialize_field("vertexESPs", &self.vertex_esps)?;
        state.serialize_field("vertexDTs", &self.vertex_densities)?;
        state.end()
    }
}
