//! Physical constants and the calculators derived from parsed quantum-chemistry data.

pub mod constants;
pub mod dipoles;
pub mod radii;
