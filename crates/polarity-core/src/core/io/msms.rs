use super::Format;
use super::error::ParseError;
use super::traits::TextFormat;
use crate::core::models::atom::Atom;
use crate::core::physics::radii::{UnknownElementError, vdw_radius};
use nalgebra::{Point3, Vector3};
use std::fmt::Write;

/// Number of header lines MSMS writes at the top of `.vert` and `.face` files.
const HEADER_LINES: usize = 3;

/// Vertex positions and normals from an MSMS `.vert` file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshVertices {
    pub positions: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
}

pub struct MsmsVertexFile;

impl TextFormat for MsmsVertexFile {
    type Output = MeshVertices;

    fn parse(text: &str) -> Result<Self::Output, ParseError> {
        parse_vertices(text)
    }
}

pub struct MsmsFaceFile;

impl TextFormat for MsmsFaceFile {
    type Output = Vec<[usize; 3]>;

    fn parse(text: &str) -> Result<Self::Output, ParseError> {
        parse_faces(text)
    }
}

fn body_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(HEADER_LINES)
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parses an MSMS vertex file: each line after the header starts with `x y z nx ny nz`.
///
/// # Errors
///
/// Returns a [`ParseError`] if a vertex line has fewer than six fields or a non-finite number.
pub fn parse_vertices(text: &str) -> Result<MeshVertices, ParseError> {
    let mut vertices = MeshVertices::default();
    for (line_no, line) in body_lines(text) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(ParseError::line(
                Format::MsmsVertices,
                line_no,
                "vertex line needs a position and a normal",
            ));
        }
        let mut v = [0.0f64; 6];
        for (slot, token) in v.iter_mut().zip(&fields) {
            *slot = token
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| {
                    ParseError::line(
                        Format::MsmsVertices,
                        line_no,
                        format!("invalid number '{}'", token),
                    )
                })?;
        }
        vertices.positions.push(Point3::new(v[0], v[1], v[2]));
        vertices.normals.push(Vector3::new(v[3], v[4], v[5]));
    }
    Ok(vertices)
}

/// Parses an MSMS face file into 0-based vertex index triples.
///
/// # Errors
///
/// Returns a [`ParseError`] if a face line has fewer than three fields or an index that is
/// not a positive integer.
pub fn parse_faces(text: &str) -> Result<Vec<[usize; 3]>, ParseError> {
    let mut faces = Vec::new();
    for (line_no, line) in body_lines(text) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(ParseError::line(
                Format::MsmsFaces,
                line_no,
                "face line needs three vertex indices",
            ));
        }
        let mut face = [0usize; 3];
        for (slot, token) in face.iter_mut().zip(&fields) {
            *slot = token
                .parse::<usize>()
                .ok()
                .and_then(|i| i.checked_sub(1))
                .ok_or_else(|| {
                    ParseError::line(
                        Format::MsmsFaces,
                        line_no,
                        format!("invalid 1-based vertex index '{}'", token),
                    )
                })?;
        }
        faces.push(face);
    }
    Ok(faces)
}

/// Renders atoms in the XYZR format MSMS reads: `x y z radius`, one atom per line.
///
/// # Errors
///
/// Returns [`UnknownElementError`] if an atom's element has no Van der Waals radius.
pub fn render_xyzr(atoms: &[Atom]) -> Result<String, UnknownElementError> {
    let mut out = String::new();
    for atom in atoms {
        let radius = vdw_radius(&atom.symbol)?;
        let _ = writeln!(
            out,
            "{:>12.6} {:>12.6} {:>12.6} {:>6.2}",
            atom.position.x, atom.position.y, atom.position.z, radius
        );
    }
    Ok(out)
}
