use super::constants::EA_TO_DEBYE;
use crate::core::models::atom::Bond;
use crate::core::models::dipole::BondDipole;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DipoleError {
    #[error("Atom count ({atoms}) does not match charge count ({charges})")]
    CountMismatch { atoms: usize, charges: usize },

    #[error("Bond {bond} references atom index {index}, but only {atoms} atoms exist")]
    IndexOutOfRange {
        bond: usize,
        index: usize,
        atoms: usize,
    },
}

/// Computes one dipole per bond from Mulliken charges and atom positions.
///
/// For a bond `(a, b)` the dipole is `(q[b] - q[a]) * (r[b] - r[a]) * EA_TO_DEBYE`, in
/// Debye. The output follows the input bond order.
///
/// # Errors
///
/// Returns [`DipoleError::CountMismatch`] if `positions` and `charges` differ in length and
/// [`DipoleError::IndexOutOfRange`] if a bond references a missing atom.
pub fn compute_bond_dipoles(
    positions: &[Point3<f64>],
    charges: &[f64],
    bonds: &[Bond],
) -> Result<Vec<BondDipole>, DipoleError> {
    if positions.len() != charges.len() {
        return Err(DipoleError::CountMismatch {
            atoms: positions.len(),
            charges: charges.len(),
        });
    }

    bonds
        .iter()
        .enumerate()
        .map(|(i, bond)| {
            for index in [bond.atom1_idx, bond.atom2_idx] {
                if index >= positions.len() {
                    return Err(DipoleError::IndexOutOfRange {
                        bond: i,
                        index,
                        atoms: positions.len(),
                    });
                }
            }
            let (a, b) = (bond.atom1_idx, bond.atom2_idx);
            let displacement = positions[b] - positions[a];
            let charge_diff = charges[b] - charges[a];
            Ok(BondDipole::new(
                a,
                b,
                displacement * charge_diff * EA_TO_DEBYE,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn hydrogen_fluoride_bond_dipole_points_from_positive_to_negative() {
        let positions = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let charges = [0.2, -0.2];
        let dipoles = compute_bond_dipoles(&positions, &charges, &[Bond::new(0, 1)]).unwrap();

        assert_eq!(dipoles.len(), 1);
        let d = dipoles[0];
        assert_eq!((d.index_a, d.index_b), (0, 1));
        let expected = Vector3::new(-0.4 * EA_TO_DEBYE, 0.0, 0.0);
        assert!((d.vector - expected).norm() < 1e-12);
        assert!((d.magnitude - 1.921281708).abs() < 1e-6);
    }

    #[test]
    fn output_order_and_magnitudes_follow_input_bonds() {
        let positions = [
            Point3::new(0.0, 0.0, 0.117),
            Point3::new(0.0, 0.757, -0.467),
            Point3::new(0.0, -0.757, -0.467),
        ];
        let charges = [-0.6, 0.3, 0.3];
        let bonds = [Bond::new(0, 2), Bond::new(0, 1)];
        let dipoles = compute_bond_dipoles(&positions, &charges, &bonds).unwrap();

        assert_eq!(dipoles.len(), 2);
        assert_eq!((dipoles[0].index_a, dipoles[0].index_b), (0, 2));
        assert_eq!((dipoles[1].index_a, dipoles[1].index_b), (0, 1));
        for d in &dipoles {
            let norm = (d.vector.x.powi(2) + d.vector.y.powi(2) + d.vector.z.powi(2)).sqrt();
            assert!((d.magnitude - norm).abs() <= 1e-9 * norm.max(1.0));
        }
        assert!(dipoles[0].vector.y < 0.0);
        assert!(dipoles[1].vector.y > 0.0);
    }

    #[test]
    fn equal_charges_give_zero_dipole() {
        let positions = [Point3::origin(), Point3::new(0.0, 0.0, 1.1)];
        let dipoles = compute_bond_dipoles(&positions, &[0.0, 0.0], &[Bond::new(0, 1)]).unwrap();
        assert_eq!(dipoles[0].magnitude, 0.0);
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let result = compute_bond_dipoles(&[Point3::origin()], &[0.1, -0.1], &[]);
        assert_eq!(
            result,
            Err(DipoleError::CountMismatch {
                atoms: 1,
                charges: 2
            })
        );
    }

    #[test]
    fn out_of_range_bond_is_an_error() {
        let positions = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let result = compute_bond_dipoles(&positions, &[0.1, -0.1], &[Bond::new(0, 2)]);
        assert_eq!(
            result,
            Err(DipoleError::IndexOutOfRange {
                bond: 0,
                index: 2,
                atoms: 2
            })
        );
    }
}
