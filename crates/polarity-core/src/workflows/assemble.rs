use crate::core::field::ScalarField;
use crate::core::io::cube::CubeFile;
use crate::core::io::msms::{MsmsFaceFile, MsmsVertexFile};
use crate::core::io::psi4::{Psi4Log, Psi4Results};
use crate::core::io::sdf::SdfFile;
use crate::core::io::traits::TextFormat;
use crate::core::io::xyz::XyzFile;
use crate::core::models::atom::{Atom, Bond};
use crate::core::models::mesh::SurfaceMesh;
use crate::core::models::record::MoleculeRecord;
use crate::core::physics::constants::BOHR_CONVERSION;
use crate::core::physics::dipoles::compute_bond_dipoles;
use crate::engine::error::PipelineError;
use crate::engine::scratch::files;
use nalgebra::Point3;
use std::path::Path;
use tracing::{debug, info, instrument};

pub const ESP_FIELD: &str = "ESP";
pub const DENSITY_FIELD: &str = "density";

/// Everything a record needs besides the field samples.
#[derive(Debug, Clone)]
pub struct RecordInputs {
    /// Optimized geometry, in the same frame as the mesh.
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub psi4: Psi4Results,
    pub mesh: SurfaceMesh,
}

/// Per-vertex samples of the two cube fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexSamples {
    pub esps: Vec<f64>,
    pub densities: Vec<f64>,
}

/// Reads the MSMS vertex and face files into a mesh whose faces all reference real vertices.
pub fn load_mesh(vertices_path: &Path, faces_path: &Path) -> Result<SurfaceMesh, PipelineError> {
    let vertices = MsmsVertexFile::read_from_path(vertices_path)?;
    let faces = MsmsFaceFile::read_from_path(faces_path)?;
    let mesh = SurfaceMesh::new(vertices.positions, vertices.normals, faces);

    if let Some((face, indices)) = mesh.find_dangling_face() {
        return Err(PipelineError::DanglingFace {
            face,
            indices,
            vertices: mesh.vertex_count(),
        });
    }
    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Loaded surface mesh."
    );
    Ok(mesh)
}

/// Samples `field` at every mesh vertex.
///
/// Vertex coordinates are in Angstroms while the cube grid is in Bohr, so each position is
/// scaled by [`BOHR_CONVERSION`] before sampling. A vertex that falls outside the grid is an
/// error that reports the vertex at its Angstrom position.
pub fn sample_vertices(
    mesh: &SurfaceMesh,
    field: &ScalarField,
    label: &'static str,
) -> Result<Vec<f64>, PipelineError> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(vertex, position)| {
            let scaled = Point3::from(position.coords * BOHR_CONVERSION);
            let value = field.sample_at(&scaled);
            if value.is_nan() {
                Err(PipelineError::SampleOutsideGrid {
                    field: label,
                    vertex,
                    position: [position.x, position.y, position.z],
                })
            } else {
                Ok(value)
            }
        })
        .collect()
}

/// Parses the ESP and density cubes and samples both at every mesh vertex.
pub fn sample_fields(
    mesh: &SurfaceMesh,
    esp_cube: &Path,
    density_cube: &Path,
) -> Result<VertexSamples, PipelineError> {
    let esp = CubeFile::read_from_path(esp_cube)?;
    let density = CubeFile::read_from_path(density_cube)?;
    Ok(VertexSamples {
        esps: sample_vertices(mesh, &esp, ESP_FIELD)?,
        densities: sample_vertices(mesh, &density, DENSITY_FIELD)?,
    })
}

/// Combines parsed tool outputs and vertex samples into the final record.
///
/// # Errors
///
/// Returns [`PipelineError::Dipole`] if the charge count differs from the atom count or a
/// bond references a missing atom.
pub fn assemble_record(
    inputs: RecordInputs,
    samples: VertexSamples,
) -> Result<MoleculeRecord, PipelineError> {
    let positions: Vec<Point3<f64>> = inputs.atoms.iter().map(|a| a.position).collect();
    let bond_dipoles = compute_bond_dipoles(&positions, &inputs.psi4.charges, &inputs.bonds)?;

    Ok(MoleculeRecord {
        atoms: inputs.atoms,
        bonds: inputs.bonds,
        molecular_dipole: inputs.psi4.molecular_dipole,
        bond_dipoles,
        mesh: inputs.mesh,
        vertex_esps: samples.esps,
        vertex_densities: samples.densities,
    })
}

/// Rebuilds a molecule record from a directory that already holds every tool output.
///
/// The directory must use the scratch file names: `molecule.sdf`, `output.dat`, the
/// optimized XYZ named `optimized_xyz`, `mesh.vert`, `mesh.face`, `ESP.cube` and `Dt.cube`.
#[instrument(skip_all, name = "assemble_workflow", fields(dir = %dir.display()))]
pub fn assemble_from_directory(
    dir: &Path,
    optimized_xyz: &str,
) -> Result<MoleculeRecord, PipelineError> {
    let bonds = SdfFile::read_from_path(dir.join(files::INPUT_SDF))?;
    let atoms = XyzFile::read_from_path(dir.join(optimized_xyz))?;
    let psi4 = Psi4Log::read_from_path(dir.join(files::PSI4_OUTPUT))?;
    let mesh = load_mesh(
        &dir.join(files::MESH_VERTICES),
        &dir.join(files::MESH_FACES),
    )?;
    let samples = sample_fields(
        &mesh,
        &dir.join(files::ESP_CUBE),
        &dir.join(files::DENSITY_CUBE),
    )?;

    let record = assemble_record(
        RecordInputs {
            atoms,
            bonds,
            psi4,
            mesh,
        },
        samples,
    )?;
    info!(
        atoms = record.atoms.len(),
        vertices = record.mesh.vertex_count(),
        "Assembled record from existing tool outputs."
    );
    Ok(record)
}
