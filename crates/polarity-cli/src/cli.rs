use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan",
    version,
    about = "Molecule Polarity data generator - drives Open Babel, Psi4 and MSMS to produce per-molecule dipole, surface and electrostatic data as JSON.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline for a list of molecules and write their JSON records.
    Generate(GenerateArgs),
    /// Build one molecule record from tool outputs that already exist on disk.
    Assemble(AssembleArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the `<name>.sdf` inputs.
    #[arg(short, long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the per-molecule and aggregate JSON files are written to.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Working directory for tool outputs. Its contents are deleted before and after each molecule.
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// File name of the aggregate dataset inside the output directory.
    #[arg(long, value_name = "NAME")]
    pub aggregate_file: Option<String>,

    /// Molecules to process, in order. Repeat or separate with commas.
    /// Defaults to the built-in worklist.
    #[arg(short, long = "molecule", value_name = "NAME", value_delimiter = ',')]
    pub molecules: Vec<String>,

    // --- Psi4 Overrides ---
    /// Override the Psi4 basis set.
    #[arg(long, value_name = "NAME")]
    pub basis: Option<String>,

    /// Override the cube grid spacing (Bohr).
    #[arg(long, value_name = "FLOAT")]
    pub grid_spacing: Option<f64>,

    /// Override the cube grid overage (Bohr).
    #[arg(long, value_name = "FLOAT")]
    pub grid_overage: Option<f64>,

    // --- Mesh Overrides ---
    /// Override the MSMS probe radius (Angstrom).
    #[arg(long, value_name = "FLOAT")]
    pub probe_radius: Option<f64>,

    /// Override the MSMS vertex density.
    #[arg(long, value_name = "FLOAT")]
    pub density: Option<f64>,

    /// Keep going after a molecule fails instead of stopping the batch.
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S psi4.basis=cc-pvdz
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `assemble` subcommand.
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Directory holding molecule.sdf, output.dat, the optimized XYZ, mesh.vert/face and the cubes.
    #[arg(required = true, value_name = "DIR")]
    pub dir: PathBuf,

    /// Path of the JSON record to write. Defaults to `<DIR>/record.json`.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// File name of the optimized geometry inside the directory.
    #[arg(long, value_name = "NAME", default_value = "optimized.xyz")]
    pub optimized_xyz: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn molecules_accept_commas_and_repeats() {
        let cli = Cli::parse_from(["molpolarity", "generate", "-m", "HF,H2O", "-m", "CO2"]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.molecules, vec!["HF", "H2O", "CO2"]);
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::parse_from(["molpolarity", "assemble", "out/HF", "-vv"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Assemble(args) = cli.command else {
            panic!("expected assemble");
        };
        assert_eq!(args.optimized_xyz, "optimized.xyz");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["molpolarity", "-q", "-v", "generate"]).is_err());
    }
}
