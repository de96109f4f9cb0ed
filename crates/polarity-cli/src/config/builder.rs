use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileToolCommand};
use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use molpolarity::core::io::psi4::Psi4Job;
use molpolarity::engine::config::{
    FailurePolicy, MeshConfig, PipelineConfig, PipelineConfigBuilder, ToolCommand, ToolsConfig,
};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub fn build_config(args: &GenerateArgs) -> Result<PipelineConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let paths = file_config.paths.take().unwrap_or_default();
    let input_dir = args
        .input_dir
        .clone()
        .or(paths.input_dir)
        .unwrap_or_else(|| PathBuf::from(&defaults.input_dir));
    let output_dir = args
        .output_dir
        .clone()
        .or(paths.output_dir)
        .unwrap_or_else(|| PathBuf::from(&defaults.output_dir));
    let scratch_dir = args
        .scratch_dir
        .clone()
        .or(paths.scratch_dir)
        .unwrap_or_else(|| PathBuf::from(&defaults.scratch_dir));
    let aggregate_file = args
        .aggregate_file
        .clone()
        .or(paths.aggregate_file)
        .unwrap_or(defaults.aggregate_file);

    let molecules = if !args.molecules.is_empty() {
        args.molecules.clone()
    } else {
        file_config.molecules.take().unwrap_or(defaults.molecules)
    };

    let failure_policy = if args.keep_going {
        FailurePolicy::Continue
    } else {
        match file_config.failure_policy.as_deref() {
            Some(policy) => FailurePolicy::from_str(policy)?,
            None => defaults.failure_policy,
        }
    };

    let tools_file = file_config.tools.take().unwrap_or_default();
    let default_tools = ToolsConfig::default();
    let tools = ToolsConfig {
        geometry_converter: merge_tool(
            tools_file.geometry_converter,
            default_tools.geometry_converter,
        ),
        quantum_chemistry: merge_tool(
            tools_file.quantum_chemistry,
            default_tools.quantum_chemistry,
        ),
        surface_mesher: merge_tool(tools_file.surface_mesher, default_tools.surface_mesher),
    };

    let psi4_file = file_config.psi4.take().unwrap_or_default();
    let default_job = Psi4Job::default();
    let psi4 = Psi4Job {
        method: psi4_file.method.unwrap_or(default_job.method),
        basis: args
            .basis
            .clone()
            .or(psi4_file.basis)
            .unwrap_or(default_job.basis),
        charge: psi4_file.charge.unwrap_or(default_job.charge),
        multiplicity: psi4_file.multiplicity.unwrap_or(default_job.multiplicity),
        memory: psi4_file.memory.unwrap_or(default_job.memory),
        grid_spacing: args
            .grid_spacing
            .or(psi4_file.grid_spacing)
            .unwrap_or(default_job.grid_spacing),
        grid_overage: args
            .grid_overage
            .or(psi4_file.grid_overage)
            .unwrap_or(default_job.grid_overage),
        optimized_xyz: psi4_file.optimized_xyz.unwrap_or(default_job.optimized_xyz),
    };

    let mesh_file = file_config.mesh.take().unwrap_or_default();
    let default_mesh = MeshConfig::default();
    let mesh = MeshConfig {
        probe_radius: args
            .probe_radius
            .or(mesh_file.probe_radius)
            .unwrap_or(default_mesh.probe_radius),
        density: args
            .density
            .or(mesh_file.density)
            .unwrap_or(default_mesh.density),
    };

    let config = PipelineConfigBuilder::new()
        .input_dir(input_dir)
        .output_dir(output_dir)
        .scratch_dir(scratch_dir)
        .aggregate_file(aggregate_file)
        .tools(tools)
        .psi4(psi4)
        .mesh(mesh)
        .molecules(molecules)
        .failure_policy(failure_policy)
        .build()?;

    debug!("Resolved pipeline configuration: {:?}", config);
    Ok(config)
}

fn merge_tool(file: Option<FileToolCommand>, default: ToolCommand) -> ToolCommand {
    let Some(file) = file else {
        return default;
    };
    ToolCommand {
        program: file.program.unwrap_or(default.program),
        extra_args: file.extra_args.unwrap_or(default.extra_args),
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            kind, key, value_str
        ))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "molecules" => {
                config.molecules = Some(
                    value_str
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "failure-policy" => {
                config.failure_policy = Some(value_str.trim().to_string());
            }
            "paths.input-dir" => {
                config
                    .paths
                    .get_or_insert_with(Default::default)
                    .input_dir = Some(PathBuf::from(value_str));
            }
            "paths.output-dir" => {
                config
                    .paths
                    .get_or_insert_with(Default::default)
                    .output_dir = Some(PathBuf::from(value_str));
            }
            "paths.scratch-dir" => {
                config
                    .paths
                    .get_or_insert_with(Default::default)
                    .scratch_dir = Some(PathBuf::from(value_str));
            }
            "paths.aggregate-file" => {
                config
                    .paths
                    .get_or_insert_with(Default::default)
                    .aggregate_file = Some(value_str.to_string());
            }
            "tools.geometry-converter.program" => {
                config
                    .tools
                    .get_or_insert_with(Default::default)
                    .geometry_converter
                    .get_or_insert_with(Default::default)
                    .program = Some(value_str.to_string());
            }
            "tools.quantum-chemistry.program" => {
                config
                    .tools
                    .get_or_insert_with(Default::default)
                    .quantum_chemistry
                    .get_or_insert_with(Default::default)
                    .program = Some(value_str.to_string());
            }
            "tools.surface-mesher.program" => {
                config
                    .tools
                    .get_or_insert_with(Default::default)
                    .surface_mesher
                    .get_or_insert_with(Default::default)
                    .program = Some(value_str.to_string());
            }
            "psi4.method" => {
                config.psi4.get_or_insert_with(Default::default).method =
                    Some(value_str.to_string());
            }
            "psi4.basis" => {
                config.psi4.get_or_insert_with(Default::default).basis =
                    Some(value_str.to_string());
            }
            "psi4.memory" => {
                config.psi4.get_or_insert_with(Default::default).memory =
                    Some(value_str.to_string());
            }
            "psi4.charge" => {
                config.psi4.get_or_insert_with(Default::default).charge =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "psi4.multiplicity" => {
                config.psi4.get_or_insert_with(Default::default).multiplicity =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "psi4.grid-spacing" => {
                config.psi4.get_or_insert_with(Default::default).grid_spacing =
                    Some(parse_value(key, value_str, "float")?);
            }
            "psi4.grid-overage" => {
                config.psi4.get_or_insert_with(Default::default).grid_overage =
                    Some(parse_value(key, value_str, "float")?);
            }
            "psi4.optimized-xyz" => {
                config.psi4.get_or_insert_with(Default::default).optimized_xyz =
                    Some(value_str.to_string());
            }
            "mesh.probe-radius" => {
                config.mesh.get_or_insert_with(Default::default).probe_radius =
                    Some(parse_value(key, value_str, "float")?);
            }
            "mesh.density" => {
                config.mesh.get_or_insert_with(Default::default).density =
                    Some(parse_value(key, value_str, "float")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unknown configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
