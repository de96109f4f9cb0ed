use crate::cli::AssembleArgs;
use crate::error::{CliError, Result};
use molpolarity::core::io::json::write_json_file;
use molpolarity::engine::error::PipelineError;
use molpolarity::workflows;
use tracing::info;

pub async fn run(args: AssembleArgs) -> Result<()> {
    if !args.dir.is_dir() {
        return Err(CliError::Argument(format!(
            "'{}' is not a directory",
            args.dir.display()
        )));
    }

    info!("Assembling record from tool outputs in {:?}", &args.dir);
    let record = tokio::task::block_in_place(|| {
        workflows::assemble::assemble_from_directory(&args.dir, &args.optimized_xyz)
    })?;

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.dir.join("record.json"));
    write_json_file(&output_path, &record).map_err(PipelineError::from)?;

    println!(
        "✓ Record with {} atom(s), {} bond dipole(s) and {} surface vertices written to: {}",
        record.atoms.len(),
        record.bond_dipoles.len(),
        record.mesh.vertex_count(),
        output_path.display()
    );
    Ok(())
}
