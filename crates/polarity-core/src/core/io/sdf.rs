use super::Format;
use super::error::ParseError;
use super::traits::TextFormat;
use crate::core::models::atom::Bond;
use tracing::debug;

const COUNTS_LINE: usize = 3;
const FIELD_WIDTH: usize = 3;

pub struct SdfFile;

impl TextFormat for SdfFile {
    type Output = Vec<Bond>;

    fn parse(text: &str) -> Result<Self::Output, ParseError> {
        parse_sdf_bonds(text)
    }
}

/// Atom and bond counts from a V2000 counts line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdfCounts {
    pub atoms: usize,
    pub bonds: usize,
}

fn fixed_field(line: &str, index: usize) -> Option<&str> {
    line.get(index * FIELD_WIDTH..(index + 1) * FIELD_WIDTH)
        .map(str::trim)
}

/// Reads the fixed-width atom and bond counts from the counts line (line index 3).
///
/// # Errors
///
/// Returns a [`ParseError`] if the text has fewer than four lines, or if the counts line is
/// shorter than six characters or its first two fields are not integers.
pub fn parse_sdf_counts(text: &str) -> Result<SdfCounts, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    counts_from_lines(&lines)
}

fn counts_from_lines(lines: &[&str]) -> Result<SdfCounts, ParseError> {
    if lines.len() <= COUNTS_LINE {
        return Err(ParseError::content(
            Format::Sdf,
            "SDF block must contain at least a header and counts line",
        ));
    }

    let line_no = COUNTS_LINE + 1;
    let counts_line = lines[COUNTS_LINE];
    if counts_line.len() < 2 * FIELD_WIDTH {
        return Err(ParseError::line(
            Format::Sdf,
            line_no,
            "counts line is too short to hold atom and bond counts",
        ));
    }

    let parse_count = |index: usize, what: &str| -> Result<usize, ParseError> {
        fixed_field(counts_line, index)
            .and_then(|field| field.parse::<usize>().ok())
            .ok_or_else(|| ParseError::line(Format::Sdf, line_no, format!("invalid {} count", what)))
    };

    Ok(SdfCounts {
        atoms: parse_count(0, "atom")?,
        bonds: parse_count(1, "bond")?,
    })
}

/// Parses the bond block of a V2000 SDF file into 0-based bonds.
///
/// Exactly the declared number of bond lines is read, starting right after the atom block.
/// The first two 3-character fields of each bond line are the 1-based endpoint indices.
/// Individual bond lines that are too short, non-numeric or reference atom 0 are skipped
/// rather than failing the whole parse.
///
/// # Errors
///
/// Returns a [`ParseError`] if the counts line is missing or malformed, or if the file ends
/// before the declared bond lines.
pub fn parse_sdf_bonds(text: &str) -> Result<Vec<Bond>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let counts = counts_from_lines(&lines)?;

    let bond_start = COUNTS_LINE + 1 + counts.atoms;
    let bond_end = bond_start + counts.bonds;
    if lines.len() < bond_end {
        return Err(ParseError::content(
            Format::Sdf,
            format!(
                "declared {} bonds but the file ends after {} lines",
                counts.bonds,
                lines.len()
            ),
        ));
    }

    let mut bonds = Vec::with_capacity(counts.bonds);
    for (offset, line) in lines[bond_start..bond_end].iter().enumerate() {
        match parse_bond_line(line) {
            Some(bond) => bonds.push(bond),
            None => debug!(
                line = bond_start + offset + 1,
                "Skipping malformed SDF bond line: {:?}", line
            ),
        }
    }
    Ok(bonds)
}

fn parse_bond_line(line: &str) -> Option<Bond> {
    let a = fixed_field(line, 0)?.parse::<usize>().ok()?.checked_sub(1)?;
    let b = fixed_field(line, 1)?.parse::<usize>().ok()?.checked_sub(1)?;
    Some(Bond::new(a, b))
}
