use molpolarity::engine::config::{DEFAULT_AGGREGATE_FILE, FailurePolicy};

/// The molecules shipped with the simulation, in processing order.
pub const DEFAULT_MOLECULES: &[&str] = &[
    "H2", "N2", "O2", "F2", "HF", "H2O", "CO2", "HCN", "CH2O", "BH3", "NH3", "BF3", "CH4",
    "CH3F", "CH2F2", "CHF3", "CF4", "CHCl3", "O3",
];

pub struct DefaultsConfig {
    pub input_dir: String,
    pub output_dir: String,
    pub scratch_dir: String,
    pub aggregate_file: String,
    pub molecules: Vec<String>,
    pub failure_policy: FailurePolicy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input_dir: "sdf".to_string(),
            output_dir: "json".to_string(),
            scratch_dir: "scratch".to_string(),
            aggregate_file: DEFAULT_AGGREGATE_FILE.to_string(),
            molecules: DEFAULT_MOLECULES.iter().map(|s| s.to_string()).collect(),
            failure_policy: FailurePolicy::Halt,
        }
    }
}
