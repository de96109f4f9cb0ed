/// Debye per (elementary charge × Angstrom).
pub const EA_TO_DEBYE: f64 = 4.80320427;

/// Debye per atomic unit of dipole moment (e·a0); used when the output omits its own factor.
pub const AU_TO_DEBYE: f64 = 2.541746473;

/// Scale applied to mesh vertex coordinates before sampling the cube grids.
pub const BOHR_CONVERSION: f64 = 1.8897259886;
