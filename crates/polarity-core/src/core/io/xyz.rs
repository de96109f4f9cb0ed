use super::Format;
use super::error::ParseError;
use super::traits::TextFormat;
use crate::core::models::atom::Atom;
use nalgebra::Point3;

const HEADER_LINES: usize = 2;

pub struct XyzFile;

impl TextFormat for XyzFile {
    type Output = Vec<Atom>;

    fn parse(text: &str) -> Result<Self::Output, ParseError> {
        parse_xyz_atoms(text)
    }
}

/// Parses XYZ text into a list of atoms in file order.
///
/// The first line holds the atom count, the second is a free-form comment, and each of the
/// next N lines holds `symbol x y z`. Any trailing lines beyond the declared atoms are
/// ignored.
///
/// # Errors
///
/// Returns a [`ParseError`] if the atom count is not a non-negative integer, if fewer atom
/// lines than declared are present, if an atom line has fewer than four fields, or if a
/// coordinate is not a finite number.
pub fn parse_xyz_atoms(text: &str) -> Result<Vec<Atom>, ParseError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let count_line = lines
        .first()
        .ok_or_else(|| ParseError::content(Format::Xyz, "missing atom count line"))?;
    let atom_count: usize = count_line.parse().map_err(|_| {
        ParseError::line(
            Format::Xyz,
            1,
            format!("invalid atom count '{}'", count_line),
        )
    })?;

    let available = lines.len().saturating_sub(HEADER_LINES);
    if available < atom_count {
        return Err(ParseError::content(
            Format::Xyz,
            format!(
                "declared {} atoms but only {} atom lines are present",
                atom_count, available
            ),
        ));
    }

    let mut atoms = Vec::with_capacity(atom_count);
    for (offset, line) in lines[HEADER_LINES..HEADER_LINES + atom_count]
        .iter()
        .enumerate()
    {
        let line_no = HEADER_LINES + offset + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(ParseError::line(
                Format::Xyz,
                line_no,
                "atom line must contain a symbol and three coordinates",
            ));
        }
        let x = parse_coordinate(fields[1], line_no, "x")?;
        let y = parse_coordinate(fields[2], line_no, "y")?;
        let z = parse_coordinate(fields[3], line_no, "z")?;
        atoms.push(Atom::new(fields[0], Point3::new(x, y, z)));
    }

    Ok(atoms)
}

/// Parses XYZ text and keeps only the coordinates, in file order.
///
/// # Errors
///
/// Fails under exactly the same conditions as [`parse_xyz_atoms`].
pub fn parse_xyz_coordinates(text: &str) -> Result<Vec<Point3<f64>>, ParseError> {
    Ok(parse_xyz_atoms(text)?
        .into_iter()
        .map(|atom| atom.position)
        .collect())
}

/// Formats one atom as an XYZ body line, `symbol x y z` with fixed precision.
pub fn geometry_line(atom: &Atom) -> String {
    format!(
        "{:<3}{:>14.8}{:>14.8}{:>14.8}",
        atom.symbol, atom.position.x, atom.position.y, atom.position.z
    )
}

fn parse_coordinate(token: &str, line_no: usize, axis: &str) -> Result<f64, ParseError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ParseError::line(
                Format::Xyz,
                line_no,
                format!("invalid {} coordinate '{}'", axis, token),
            )
        })
}
