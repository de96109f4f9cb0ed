use super::Format;
use super::error::ParseError;
use super::traits::TextFormat;
use super::xyz::geometry_line;
use crate::core::models::atom::Atom;
use crate::core::physics::constants::AU_TO_DEBYE;
use nalgebra::Vector3;
use std::fmt::Write;
use tracing::warn;

const MULLIKEN_HEADER: &str = "Mulliken Charges";
const DIPOLE_MARKER: &str = "L = 1";
const DEBYE_MARKER: &str = "Debye";
const FACTOR_PREFIX: &str = "Multiply by";
const DIPOLE_SEARCH_WINDOW: usize = 10;
const MIN_CHARGE_FIELDS: usize = 6;

/// The quantities extracted from a Psi4 output log.
#[derive(Debug, Clone, PartialEq)]
pub struct Psi4Results {
    /// Mulliken charges (e) from the last charge block, one per atom.
    pub charges: Vec<f64>,
    /// Molecular dipole in Debye, or the zero vector if the multipole block is absent.
    pub molecular_dipole: Vector3<f64>,
}

pub struct Psi4Log;

impl TextFormat for Psi4Log {
    type Output = Psi4Results;

    fn parse(text: &str) -> Result<Self::Output, ParseError> {
        Ok(Psi4Results {
            charges: parse_mulliken_charges(text)?,
            molecular_dipole: parse_molecular_dipole(text),
        })
    }
}

/// Extracts the atom charges from the last Mulliken charge block.
///
/// Later optimization steps print newer blocks, so only the last one is used. Inside the
/// block, every line that starts with an integer atom index and has at least six fields
/// contributes its last field as the total charge. The block ends at the first blank or
/// non-data line after data has started.
///
/// # Errors
///
/// Returns a [`ParseError`] if no block exists, if a charge field is not a finite number,
/// or if the block contains no charges.
pub fn parse_mulliken_charges(text: &str) -> Result<Vec<f64>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_idx = lines
        .iter()
        .rposition(|line| line.contains(MULLIKEN_HEADER))
        .ok_or_else(|| ParseError::content(Format::Psi4Output, "no Mulliken charge block found"))?;

    let mut charges = Vec::new();
    for (offset, line) in lines[header_idx + 1..].iter().enumerate() {
        let line_no = header_idx + offset + 2;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let is_data = fields.len() >= MIN_CHARGE_FIELDS && fields[0].parse::<i64>().is_ok();

        if !is_data {
            if charges.is_empty() {
                continue;
            }
            break;
        }

        let token = fields[fields.len() - 1];
        let charge = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                ParseError::line(
                    Format::Psi4Output,
                    line_no,
                    format!("invalid Mulliken charge '{}'", token),
                )
            })?;
        charges.push(charge);
    }

    if charges.is_empty() {
        return Err(ParseError::content(
            Format::Psi4Output,
            "Mulliken charge block contains no charges",
        ));
    }
    Ok(charges)
}

/// Extracts the molecular dipole (Debye) from the L = 1 multipole block.
///
/// The conversion factor is read from the block header, falling back to [`AU_TO_DEBYE`].
/// This parser never fails: when the block or any of the three components cannot be found,
/// it returns the zero vector.
pub fn parse_molecular_dipole(text: &str) -> Vector3<f64> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(header_idx) = lines
        .iter()
        .position(|line| line.contains(DIPOLE_MARKER) && line.contains(DEBYE_MARKER))
    else {
        warn!("No L = 1 multipole block found; using a zero molecular dipole.");
        return Vector3::zeros();
    };

    let factor = parse_conversion_factor(lines[header_idx]).unwrap_or_else(|| {
        warn!(
            "Could not read the Debye conversion factor; using {}.",
            AU_TO_DEBYE
        );
        AU_TO_DEBYE
    });

    let mut components: [Option<f64>; 3] = [None; 3];
    let window_end = (header_idx + 1 + DIPOLE_SEARCH_WINDOW).min(lines.len());
    for line in &lines[header_idx + 1..window_end] {
        for (axis, label) in ["Dipole X", "Dipole Y", "Dipole Z"].iter().enumerate() {
            if line.contains(label) {
                components[axis] = line
                    .split_whitespace()
                    .last()
                    .and_then(|t| t.parse::<f64>().ok())
                    .filter(|v| v.is_finite());
            }
        }
    }

    match components {
        [Some(x), Some(y), Some(z)] => Vector3::new(x, y, z) * factor,
        _ => {
            warn!("Incomplete dipole components in multipole block; using a zero molecular dipole.");
            Vector3::zeros()
        }
    }
}

fn parse_conversion_factor(line: &str) -> Option<f64> {
    let rest = &line[line.find(FACTOR_PREFIX)? + FACTOR_PREFIX.len()..];
    rest.split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Settings embedded into the generated Psi4 input script.
#[derive(Debug, Clone, PartialEq)]
pub struct Psi4Job {
    pub method: String,
    pub basis: String,
    pub charge: i32,
    pub multiplicity: u32,
    pub memory: String,
    /// Cube grid spacing along each axis (Bohr).
    pub grid_spacing: f64,
    /// Extra space around the molecule covered by the cube grid (Bohr).
    pub grid_overage: f64,
    /// File name the optimized, reoriented geometry is saved to.
    pub optimized_xyz: String,
}

impl Default for Psi4Job {
    fn default() -> Self {
        Self {
            method: "scf".to_string(),
            basis: "6-31G**".to_string(),
            charge: 0,
            multiplicity: 1,
            memory: "2 GB".to_string(),
            grid_spacing: 0.2,
            grid_overage: 4.0,
            optimized_xyz: "optimized.xyz".to_string(),
        }
    }
}

/// Renders the Psi4 input script for optimizing `atoms` and writing charges, the dipole,
/// the ESP and density cubes and the reoriented geometry.
pub fn render_input_script(atoms: &[Atom], job: &Psi4Job) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "memory {}", job.memory);
    let _ = writeln!(out);
    let _ = writeln!(out, "molecule {{");
    let _ = writeln!(out, "{} {}", job.charge, job.multiplicity);
    for atom in atoms {
        let _ = writeln!(out, "{}", geometry_line(atom));
    }
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "set {{");
    let _ = writeln!(out, "    basis {}", job.basis);
    let _ = writeln!(out, "    g_convergence gau_tight");
    let _ = writeln!(out, "    cubeprop_tasks ['esp', 'density']");
    let s = job.grid_spacing;
    let _ = writeln!(out, "    cubic_grid_spacing [{s}, {s}, {s}]");
    let o = job.grid_overage;
    let _ = writeln!(out, "    cubic_grid_overage [{o}, {o}, {o}]");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "energy, wfn = optimize('{}', return_wfn=True)",
        job.method
    );
    let _ = writeln!(out, "oeprop(wfn, 'MULLIKEN_CHARGES', 'DIPOLE')");
    let _ = writeln!(out, "cubeprop(wfn)");
    let _ = writeln!(
        out,
        "wfn.molecule().save_xyz_file('{}', True)",
        job.optimized_xyz
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    const MULLIKEN_TWICE: &str = "\
  Mulliken Charges: (a.u.)
   Center  Symbol    Alpha    Beta     Spin     Total
       1     H     0.45000  0.45000  0.00000  0.10000
       2     F     4.55000  4.55000  0.00000 -0.10000

   Total alpha =  5.00000, Total beta =  5.00000, Total charge = -0.00000

  Optimization step 2
  Mulliken Charges: (a.u.)
   Center  Symbol    Alpha    Beta     Spin     Total
       1     H     0.40000  0.40000  0.00000  0.20000
       2     F     4.60000  4.60000  0.00000 -0.20000

   Total alpha =  5.00000, Total beta =  5.00000, Total charge = -0.00000
";

    const MULTIPOLES: &str = "\
 Multipole Moments:

 ------------------------------------------------------------------------------------
     Multipole            Electronic (a.u.)      Nuclear  (a.u.)        Total (a.u.)
 ------------------------------------------------------------------------------------

 L = 1.  Multiply by 2.5417464519 to convert [e a0] to [Debye]
 Dipole X            :          0.0000000            0.0000000            0.0000000
 Dipole Y            :          0.0000000            0.0000000            0.0000000
 Dipole Z            :         -0.2467264            1.0016287            0.7549023
";

    #[test]
    fn last_mulliken_block_wins() {
        let charges = parse_mulliken_charges(MULLIKEN_TWICE).unwrap();
        assert_eq!(charges, vec![0.2, -0.2]);
    }

    #[test]
    fn missing_mulliken_block_is_an_error() {
        assert!(matches!(
            parse_mulliken_charges("no charges here"),
            Err(ParseError::Content { .. })
        ));
    }

    #[test]
    fn empty_mulliken_block_is_an_error() {
        let text = "  Mulliken Charges: (a.u.)\n   Center  Symbol  Alpha  Beta  Spin  Total\n\n";
        assert!(parse_mulliken_charges(text).is_err());
    }

    #[test]
    fn non_numeric_charge_is_an_error() {
        let text = "  Mulliken Charges: (a.u.)\n       1     H     0.4  0.4  0.0  oops\n";
        assert!(matches!(
            parse_mulliken_charges(text),
            Err(ParseError::Line { line: 2, .. })
        ));
    }

    #[test]
    fn block_ends_at_first_non_data_line() {
        let text = "\
  Mulliken Charges: (a.u.)
       1     O     4.3  4.3  0.0  -0.6
       2     H     0.35 0.35 0.0   0.3
   Total alpha =  5.00000, Total beta =  5.00000, Total charge = 0.0
       3     H     0.35 0.35 0.0   0.3
";
        assert_eq!(parse_mulliken_charges(text).unwrap(), vec![-0.6, 0.3]);
    }

    #[test]
    fn molecular_dipole_is_scaled_by_file_factor() {
        let dipole = parse_molecular_dipole(MULTIPOLES);
        assert_eq!(dipole.x, 0.0);
        assert_eq!(dipole.y, 0.0);
        assert!((dipole.z - 0.7549023 * 2.5417464519).abs() < 1e-12);
    }

    #[test]
    fn unreadable_factor_falls_back_to_default() {
        let text = MULTIPOLES.replace("2.5417464519", "two-point-five");
        let dipole = parse_molecular_dipole(&text);
        assert!((dipole.z - 0.7549023 * AU_TO_DEBYE).abs() < 1e-12);
    }

    #[test]
    fn missing_multipole_block_yields_zero_vector() {
        assert_eq!(parse_molecular_dipole("nothing to see"), Vector3::zeros());
    }

    #[test]
    fn missing_component_yields_zero_vector() {
        let text = MULTIPOLES.replace(" Dipole Y", " Quadrupole YY");
        assert_eq!(parse_molecular_dipole(&text), Vector3::zeros());
    }

    #[test]
    fn components_beyond_search_window_are_ignored() {
        let text = MULTIPOLES.replace(
            " L = 1.  Multiply",
            " L = 1.  Multiply by 2.5 to convert [e a0] to [Debye]\n\n\n\n\n\n\n\n\n\n\n IGNORED",
        );
        assert_eq!(parse_molecular_dipole(&text), Vector3::zeros());
    }

    #[test]
    fn dipole_parser_is_lenient_while_charge_parser_is_strict() {
        let text = "Psi4 exited before printing any properties";
        assert_eq!(parse_molecular_dipole(text), Vector3::zeros());
        assert!(parse_mulliken_charges(text).is_err());
        assert!(Psi4Log::parse(text).is_err());
    }

    #[test]
    fn log_parse_collects_both_quantities() {
        let text = format!("{}\n{}", MULLIKEN_TWICE, MULTIPOLES);
        let results = Psi4Log::parse(&text).unwrap();
        assert_eq!(results.charges.len(), 2);
        assert!(results.molecular_dipole.z > 0.0);
    }

    #[test]
    fn input_script_embeds_geometry_and_settings() {
        let atoms = vec![
            Atom::new("H", Point3::origin()),
            Atom::new("F", Point3::new(0.92, 0.0, 0.0)),
        ];
        let job = Psi4Job {
            basis: "cc-pvdz".to_string(),
            grid_spacing: 0.25,
            ..Psi4Job::default()
        };
        let script = render_input_script(&atoms, &job);
        assert!(script.contains("molecule {\n0 1\n"));
        assert!(script.contains("basis cc-pvdz"));
        assert!(script.contains("cubic_grid_spacing [0.25, 0.25, 0.25]"));
        assert!(script.contains("F      0.92000000"));
        assert!(script.contains("save_xyz_file('optimized.xyz', True)"));
        assert!(script.contains("cubeprop(wfn)"));
    }
}
