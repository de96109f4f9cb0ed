use super::Format;
use super::error::ParseError;
use super::traits::TextFormat;
use crate::core::field::{ScalarField, grid_len};
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

const COMMENT_LINES: usize = 2;
const HEADER_LINES: usize = 6;
/// Largest atom or grid-point count accepted on a header line.
const MAX_HEADER_COUNT: f64 = 1.0e9;

pub struct CubeFile;

impl TextFormat for CubeFile {
    type Output = ScalarField;

    fn parse(text: &str) -> Result<Self::Output, ParseError> {
        parse_cube(text)
    }
}

fn header_numbers(line: &str, line_no: usize, what: &str) -> Result<[f64; 4], ParseError> {
    let values: Vec<f64> = line
        .split_whitespace()
        .take(4)
        .map(|t| t.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| ParseError::line(Format::Cube, line_no, format!("invalid {} line", what)))?;
    match values.as_slice() {
        &[a, b, c, d] if values.iter().all(|v| v.is_finite()) => Ok([a, b, c, d]),
        _ => Err(ParseError::line(
            Format::Cube,
            line_no,
            format!("{} line needs a count and three finite numbers", what),
        )),
    }
}

fn header_count(value: f64, line_no: usize) -> Result<usize, ParseError> {
    if value.fract() != 0.0 {
        return Err(ParseError::line(
            Format::Cube,
            line_no,
            format!("count '{}' is not an integer", value),
        ));
    }
    if value.abs() > MAX_HEADER_COUNT {
        return Err(ParseError::line(
            Format::Cube,
            line_no,
            format!("count '{}' exceeds the limit of {}", value, MAX_HEADER_COUNT),
        ));
    }
    Ok(value.abs() as usize)
}

/// Parses a Gaussian cube file into a [`ScalarField`].
///
/// Lines 1-2 are comments. Line 3 holds the atom count and grid origin, and lines 4-6 hold
/// the point count and step vector of each grid axis. Counts are taken by absolute value
/// and the step vectors are used as written. The atom lines that follow are skipped and all
/// remaining whitespace-separated tokens are grid values, fastest along the third axis.
/// Tokens beyond the declared grid size are ignored.
///
/// Header counts above 10^9, or grids whose point count overflows `usize`, are rejected
/// before any data is read.
///
/// # Errors
///
/// Returns a [`ParseError`] if the file has fewer than six non-blank lines, a header line is
/// malformed or declares an oversized count, a data token is not a number, fewer than `nx * ny * nz` values are present,
/// or the grid axes are singular.
pub fn parse_cube(text: &str) -> Result<ScalarField, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
    if non_blank < HEADER_LINES || lines.len() < HEADER_LINES {
        return Err(ParseError::content(
            Format::Cube,
            format!(
                "cube file needs at least {} header lines, found {}",
                HEADER_LINES, non_blank
            ),
        ));
    }

    let [atoms_raw, ox, oy, oz] = header_numbers(lines[COMMENT_LINES], COMMENT_LINES + 1, "origin")?;
    let atom_count = header_count(atoms_raw, COMMENT_LINES + 1)?;
    let origin = Point3::new(ox, oy, oz);

    let mut dims = [0usize; 3];
    let mut axes = [Vector3::zeros(); 3];
    for axis in 0..3 {
        let idx = COMMENT_LINES + 1 + axis;
        let [n, vx, vy, vz] = header_numbers(lines[idx], idx + 1, "grid axis")?;
        dims[axis] = header_count(n, idx + 1)?;
        axes[axis] = Vector3::new(vx, vy, vz);
    }

    let data_start = HEADER_LINES.saturating_add(atom_count);
    if lines.len() < data_start {
        return Err(ParseError::content(
            Format::Cube,
            format!(
                "declared {} atoms but the file ends after {} lines",
                atom_count,
                lines.len()
            ),
        ));
    }

    let expected = grid_len(dims).ok_or_else(|| {
        ParseError::line(
            Format::Cube,
            COMMENT_LINES + 2,
            format!("grid {:?} has more points than can be addressed", dims),
        )
    })?;
    // Sized by the data actually present, not by the header.
    let mut values = Vec::new();
    'lines: for (offset, line) in lines[data_start..].iter().enumerate() {
        for token in line.split_whitespace() {
            if values.len() == expected {
                warn!("Cube file holds more values than its {:?} grid; ignoring the rest.", dims);
                break 'lines;
            }
            let value = token.parse::<f64>().map_err(|_| {
                ParseError::line(
                    Format::Cube,
                    data_start + offset + 1,
                    format!("invalid grid value '{}'", token),
                )
            })?;
            values.push(value);
        }
    }

    if values.len() != expected {
        return Err(ParseError::content(
            Format::Cube,
            format!(
                "grid {:?} needs {} values, found {}",
                dims,
                expected,
                values.len()
            ),
        ));
    }

    debug!(dims = ?dims, atoms = atom_count, "Parsed cube grid.");
    ScalarField::new(origin, axes, dims, values).map_err(|source| ParseError::Grid {
        format: Format::Cube,
        source,
    })
}
