use phf::{Map, phf_map};
use thiserror::Error;

/// Van der Waals radii in Angstroms, keyed by canonical element symbol.
static VDW_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.20,
    "He" => 1.40,
    "Li" => 1.82,
    "B" => 1.92,
    "C" => 1.70,
    "N" => 1.55,
    "O" => 1.52,
    "F" => 1.47,
    "Ne" => 1.54,
    "Na" => 2.27,
    "Si" => 2.10,
    "P" => 1.80,
    "S" => 1.80,
    "Cl" => 1.75,
    "Ar" => 1.88,
    "Br" => 1.85,
    "I" => 1.98,
    "Xe" => 2.16,
};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("No Van der Waals radius is defined for element '{0}'")]
pub struct UnknownElementError(pub String);

/// Rewrites an element symbol as one uppercase letter followed by lowercase letters.
///
/// Tools disagree on case (`CL`, `cl`, `Cl`); the radius table uses the canonical form.
pub fn normalize_symbol(symbol: &str) -> String {
    let mut chars = symbol.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Looks up the Van der Waals radius (Angstroms) for an element symbol of any case.
///
/// # Errors
///
/// Returns [`UnknownElementError`] if the element is not in the table.
pub fn vdw_radius(symbol: &str) -> Result<f64, UnknownElementError> {
    let canonical = normalize_symbol(symbol);
    VDW_RADII
        .get(canonical.as_str())
        .copied()
        .ok_or(UnknownElementError(symbol.to_string()))
}
