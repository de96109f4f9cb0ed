use super::assemble::{RecordInputs, assemble_record, load_mesh, sample_fields};
use crate::core::io::json::write_json_file;
use crate::core::io::msms::render_xyzr;
use crate::core::io::psi4::{Psi4Log, render_input_script};
use crate::core::io::sdf::SdfFile;
use crate::core::io::traits::TextFormat;
use crate::core::io::xyz::XyzFile;
use crate::core::models::record::{MoleculeDataset, MoleculeRecord};
use crate::engine::config::{FailurePolicy, PipelineConfig};
use crate::engine::error::PipelineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scratch::{ScratchSpace, files};
use crate::engine::stage::Stage;
use crate::engine::tools::{ToolInvocation, ToolKind, ToolRunner};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// A molecule that failed while the batch kept going.
#[derive(Debug)]
pub struct MoleculeFailure {
    pub name: String,
    pub error: PipelineError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Completed molecules keyed by name.
    pub records: MoleculeDataset,
    /// Failures, in worklist order. Always empty under [`FailurePolicy::Halt`].
    pub failures: Vec<MoleculeFailure>,
    pub aggregate_path: PathBuf,
}

struct StageScope<'r, 'a> {
    molecule: &'r str,
    reporter: &'r ProgressReporter<'a>,
}

impl StageScope<'_, '_> {
    fn run<T>(
        &self,
        stage: Stage,
        body: impl FnOnce() -> Result<T, PipelineError>,
    ) -> Result<T, PipelineError> {
        self.reporter.report(Progress::StageStart { stage });
        info!(
            "Stage {}/{}: {}",
            stage.ordinal(),
            Stage::ALL.len(),
            stage
        );
        body().map_err(|e| e.in_stage(self.molecule, stage))
    }
}

fn write_text(path: &Path, text: &str) -> Result<(), PipelineError> {
    fs::write(path, text).map_err(|e| PipelineError::io(path, e))
}

/// Runs every stage for one molecule and returns its record.
///
/// The scratch directory is emptied before the first tool runs and again when this
/// function returns, whether or not a stage failed. Every error carries the molecule name
/// and the stage it happened in.
#[instrument(skip_all, name = "molecule", fields(name = %name))]
pub fn run_molecule(
    name: &str,
    config: &PipelineConfig,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<MoleculeRecord, PipelineError> {
    let stages = StageScope {
        molecule: name,
        reporter,
    };

    // === Stage 1: Prepare ===
    let (scratch, bonds) = stages.run(Stage::Prepare, || {
        let source = config.paths.input_dir.join(format!("{}.sdf", name));
        let bonds = SdfFile::read_from_path(&source)?;
        let scratch = ScratchSpace::acquire(&config.paths.scratch_dir)
            .map_err(|e| PipelineError::io(&config.paths.scratch_dir, e))?;
        let target = scratch.join(files::INPUT_SDF);
        fs::copy(&source, &target).map_err(|e| PipelineError::io(&target, e))?;
        debug!(bonds = bonds.len(), "Copied input SDF into scratch space.");
        Ok((scratch, bonds))
    })?;

    // === Stage 2: Convert geometry ===
    let initial_atoms = stages.run(Stage::ConvertGeometry, || {
        runner.run(&ToolInvocation::new(
            ToolKind::GeometryConverter,
            &config.tools.geometry_converter,
            [files::INPUT_SDF, "-O", files::INITIAL_XYZ],
            scratch.path(),
        ))?;
        Ok(XyzFile::read_from_path(scratch.join(files::INITIAL_XYZ))?)
    })?;

    // === Stage 3: Optimize ===
    let (atoms, psi4) = stages.run(Stage::Optimize, || {
        let script = render_input_script(&initial_atoms, &config.psi4);
        write_text(&scratch.join(files::PSI4_INPUT), &script)?;
        runner.run(&ToolInvocation::new(
            ToolKind::QuantumChemistry,
            &config.tools.quantum_chemistry,
            [files::PSI4_INPUT, files::PSI4_OUTPUT],
            scratch.path(),
        ))?;
        let results = Psi4Log::read_from_path(scratch.join(files::PSI4_OUTPUT))?;
        let atoms = XyzFile::read_from_path(scratch.join(&config.psi4.optimized_xyz))?;
        debug!(
            atoms = atoms.len(),
            charges = results.charges.len(),
            "Parsed optimization results."
        );
        Ok((atoms, results))
    })?;

    // === Stage 4: Build radii ===
    stages.run(Stage::BuildRadii, || {
        let xyzr = render_xyzr(&atoms)?;
        write_text(&scratch.join(files::XYZR), &xyzr)
    })?;

    // === Stage 5: Mesh ===
    let mesh = stages.run(Stage::Mesh, || {
        let probe_radius = config.mesh.probe_radius.to_string();
        let density = config.mesh.density.to_string();
        runner.run(&ToolInvocation::new(
            ToolKind::SurfaceMesher,
            &config.tools.surface_mesher,
            [
                "-if",
                files::XYZR,
                "-of",
                files::MESH_BASENAME,
                "-probe_radius",
                probe_radius.as_str(),
                "-density",
                density.as_str(),
            ],
            scratch.path(),
        ))?;
        load_mesh(
            &scratch.join(files::MESH_VERTICES),
            &scratch.join(files::MESH_FACES),
        )
    })?;

    // === Stage 6: Sample fields ===
    let samples = stages.run(Stage::SampleFields, || {
        sample_fields(
            &mesh,
            &scratch.join(files::ESP_CUBE),
            &scratch.join(files::DENSITY_CUBE),
        )
    })?;

    // === Stage 7: Assemble ===
    let record = stages.run(Stage::Assemble, || {
        assemble_record(
            RecordInputs {
                atoms,
                bonds,
                psi4,
                mesh,
            },
            samples,
        )
    })?;

    // === Stage 8: Cleanup ===
    stages.run(Stage::Cleanup, || {
        drop(scratch);
        Ok(())
    })?;

    info!(
        atoms = record.atoms.len(),
        bonds = record.bonds.len(),
        vertices = record.mesh.vertex_count(),
        "Molecule complete."
    );
    Ok(record)
}

/// Processes the configured worklist in order.
///
/// Each completed molecule is written to `<output_dir>/<name>.json` right away. The
/// aggregate dataset is written once, after the last molecule. Under
/// [`FailurePolicy::Halt`] the first failure is returned and no aggregate is written; under
/// [`FailurePolicy::Continue`] failures are collected in the report.
#[instrument(skip_all, name = "generate_workflow")]
pub fn run_batch(
    config: &PipelineConfig,
    runner: &dyn ToolRunner,
    reporter: &ProgressReporter,
) -> Result<BatchReport, PipelineError> {
    let output_dir = &config.paths.output_dir;
    fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;

    let total = config.molecules.len();
    info!(
        total,
        policy = %config.failure_policy,
        "Starting batch of {} molecules.",
        total
    );
    reporter.report(Progress::BatchStart {
        total: total as u64,
    });

    let mut report = BatchReport::default();
    for (index, name) in config.molecules.iter().enumerate() {
        reporter.report(Progress::MoleculeStart {
            name: name.clone(),
            index,
        });

        let outcome = run_molecule(name, config, runner, reporter).and_then(|record| {
            let path = output_dir.join(format!("{}.json", name));
            write_json_file(&path, &record)?;
            Ok(record)
        });

        match outcome {
            Ok(record) => {
                reporter.report(Progress::MoleculeFinish { name: name.clone() });
                report.records.insert(name.clone(), record);
            }
            Err(err) => {
                reporter.report(Progress::MoleculeFailed {
                    name: name.clone(),
                    reason: err.to_string(),
                });
                match config.failure_policy {
                    FailurePolicy::Halt => {
                        error!(molecule = %name, "Halting batch: {}", err);
                        return Err(err);
                    }
                    FailurePolicy::Continue => {
                        warn!(molecule = %name, "Skipping failed molecule: {}", err);
                        report.failures.push(MoleculeFailure {
                            name: name.clone(),
                            error: err,
                        });
                    }
                }
            }
        }
    }

    let aggregate_path = output_dir.join(&config.paths.aggregate_file);
    write_json_file(&aggregate_path, &report.records)?;
    info!(
        succeeded = report.records.len(),
        failed = report.failures.len(),
        "Wrote aggregate dataset to {}.",
        aggregate_path.display()
    );
    report.aggregate_path = aggregate_path;
    reporter.report(Progress::BatchFinish);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::physics::constants::EA_TO_DEBYE;
    use crate::engine::config::PipelineConfigBuilder;
    use crate::engine::tools::{ExitStatusLabel, ToolError, ToolOutput};
    use crate::workflows::assemble::tests::{
        HF_LOG, HF_SDF, HF_XYZ, MESH_FACE, MESH_VERT, density_cube, esp_cube,
    };
    use std::sync::Mutex;
    use tempfile::{TempDir, tempdir};

    /// Stands in for obabel, Psi4 and MSMS by writing canned outputs into the working dir.
    #[derive(Default)]
    struct ScriptedRunner {
        fail_kind: Option<ToolKind>,
        fail_in_dir_containing: Option<String>,
        calls: Mutex<Vec<ToolInvocation>>,
    }

    impl ScriptedRunner {
        fn failing(kind: ToolKind) -> Self {
            Self {
                fail_kind: Some(kind),
                ..Self::default()
            }
        }

        fn kinds(&self) -> Vec<ToolKind> {
            self.calls.lock().unwrap().iter().map(|c| c.kind).collect()
        }
    }

    impl ToolRunner for ScriptedRunner {
        fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
            self.calls.lock().unwrap().push(invocation.clone());
            let sdf = fs::read_to_string(invocation.working_dir.join(files::INPUT_SDF))
                .unwrap_or_default();
            let poisoned = self
                .fail_in_dir_containing
                .as_deref()
                .is_some_and(|marker| sdf.starts_with(marker));
            if self.fail_kind == Some(invocation.kind) || poisoned {
                return Err(ToolError::Failed {
                    kind: invocation.kind,
                    command: invocation.command_line(),
                    status: ExitStatusLabel(Some(1)),
                    stderr: "scripted failure".into(),
                });
            }

            let dir = &invocation.working_dir;
            match invocation.kind {
                ToolKind::GeometryConverter => {
                    fs::write(dir.join(files::INITIAL_XYZ), HF_XYZ).unwrap();
                }
                ToolKind::QuantumChemistry => {
                    assert!(dir.join(files::PSI4_INPUT).exists());
                    fs::write(dir.join(files::PSI4_OUTPUT), HF_LOG).unwrap();
                    fs::write(dir.join("optimized.xyz"), HF_XYZ).unwrap();
                    fs::write(dir.join(files::ESP_CUBE), esp_cube()).unwrap();
                    fs::write(dir.join(files::DENSITY_CUBE), density_cube()).unwrap();
                }
                ToolKind::SurfaceMesher => {
                    assert!(dir.join(files::XYZR).exists());
                    fs::write(dir.join(files::MESH_VERTICES), MESH_VERT).unwrap();
                    fs::write(dir.join(files::MESH_FACES), MESH_FACE).unwrap();
                }
            }
            Ok(ToolOutput {
                status_code: Some(0),
                ..ToolOutput::default()
            })
        }
    }

    struct Workspace {
        _root: TempDir,
        input: PathBuf,
        output: PathBuf,
        scratch: PathBuf,
    }

    fn workspace(names: &[&str]) -> Workspace {
        let root = tempdir().unwrap();
        let input = root.path().join("sdf");
        fs::create_dir(&input).unwrap();
        for name in names {
            fs::write(input.join(format!("{}.sdf", name)), HF_SDF).unwrap();
        }
        Workspace {
            input,
            output: root.path().join("out"),
            scratch: root.path().join("scratch"),
            _root: root,
        }
    }

    fn config(ws: &Workspace, names: &[&str], policy: FailurePolicy) -> PipelineConfig {
        PipelineConfigBuilder::new()
            .input_dir(ws.input.clone())
            .output_dir(ws.output.clone())
            .scratch_dir(ws.scratch.clone())
            .molecules(names.iter().copied())
            .failure_policy(policy)
            .build()
            .unwrap()
    }

    fn scratch_is_empty(ws: &Workspace) -> bool {
        fs::read_dir(&ws.scratch).unwrap().next().is_none()
    }

    #[test]
    fn hf_runs_end_to_end() {
        let ws = workspace(&["HF"]);
        let config = config(&ws, &["HF"], FailurePolicy::Halt);
        let runner = ScriptedRunner::default();

        let report = run_batch(&config, &runner, &ProgressReporter::new()).unwrap();

        assert_eq!(
            runner.kinds(),
            vec![
                ToolKind::GeometryConverter,
                ToolKind::QuantumChemistry,
                ToolKind::SurfaceMesher
            ]
        );
        let record = &report.records["HF"];
        assert_eq!(record.bond_dipoles.len(), 1);
        let dipole = &record.bond_dipoles[0];
        assert_eq!((dipole.index_a, dipole.index_b), (0, 1));
        assert!((dipole.vector.x + 0.4 * EA_TO_DEBYE).abs() < 1e-9);
        assert!((dipole.magnitude - 1.92).abs() < 0.01);
        assert!(scratch_is_empty(&ws));

        let single: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(ws.output.join("HF.json")).unwrap()).unwrap();
        assert_eq!(single["bondDipoles"][0]["indexA"], 0);
        assert_eq!(single["bonds"][0], serde_json::json!([0, 1]));

        let aggregate: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report.aggregate_path).unwrap()).unwrap();
        assert_eq!(aggregate["HF"], single);
        assert!(report.aggregate_path.ends_with("molecule-data.json"));
    }

    #[test]
    fn tool_invocations_use_configured_settings() {
        let ws = workspace(&["HF"]);
        let config = config(&ws, &["HF"], FailurePolicy::Halt);
        let runner = ScriptedRunner::default();
        run_molecule("HF", &config, &runner, &ProgressReporter::new()).unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls[0].program, "obabel");
        assert_eq!(calls[0].args, vec!["molecule.sdf", "-O", "initial.xyz"]);
        assert_eq!(calls[1].program, "psi4");
        assert_eq!(calls[2].program, "msms");
        assert!(calls[2].args.windows(2).any(|w| w == ["-probe_radius", "1.4"]));
        assert!(calls[2].args.windows(2).any(|w| w == ["-density", "3"]));
        assert!(calls.iter().all(|c| c.working_dir == ws.scratch));
    }

    #[test]
    fn stages_are_reported_in_order() {
        let ws = workspace(&["HF"]);
        let config = config(&ws, &["HF"], FailurePolicy::Halt);
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::StageStart { stage } = event {
                seen.lock().unwrap().push(stage);
            }
        }));
        run_molecule("HF", &config, &ScriptedRunner::default(), &reporter).unwrap();
        drop(reporter);
        assert_eq!(seen.into_inner().unwrap(), Stage::ALL.to_vec());
    }

    #[test]
    fn failed_tool_halts_with_stage_context_and_empties_scratch() {
        let ws = workspace(&["HF", "H2O"]);
        let config = config(&ws, &["HF", "H2O"], FailurePolicy::Halt);
        let runner = ScriptedRunner::failing(ToolKind::SurfaceMesher);

        let err = run_batch(&config, &runner, &ProgressReporter::new()).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Mesh));
        assert!(err.to_string().contains("'HF'"));
        assert!(scratch_is_empty(&ws));
        assert!(!ws.output.join("molecule-data.json").exists());
        assert_eq!(runner.kinds().len(), 3);
    }

    #[test]
    fn missing_input_fails_in_prepare() {
        let ws = workspace(&[]);
        let config = config(&ws, &["NH3"], FailurePolicy::Halt);
        let runner = ScriptedRunner::default();
        let err = run_molecule("NH3", &config, &runner, &ProgressReporter::new()).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Prepare));
        assert!(runner.kinds().is_empty());
    }

    #[test]
    fn continue_policy_records_failures_and_keeps_successes() {
        let ws = workspace(&["HF", "CO2", "N2"]);
        fs::write(ws.input.join("CO2.sdf"), format!("CO2-broken{}", HF_SDF)).unwrap();
        let config = config(&ws, &["HF", "CO2", "N2"], FailurePolicy::Continue);
        let runner = ScriptedRunner {
            fail_in_dir_containing: Some("CO2-broken".into()),
            ..ScriptedRunner::default()
        };

        let report = run_batch(&config, &runner, &ProgressReporter::new()).unwrap();

        assert_eq!(
            report.records.keys().collect::<Vec<_>>(),
            vec!["HF", "N2"]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "CO2");
        assert_eq!(report.failures[0].error.stage(), Some(Stage::ConvertGeometry));
        assert!(ws.output.join("HF.json").exists());
        assert!(!ws.output.join("CO2.json").exists());

        let aggregate: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report.aggregate_path).unwrap()).unwrap();
        let keys: Vec<&String> = aggregate.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["HF", "N2"]);
        assert!(scratch_is_empty(&ws));
    }

    #[test]
    fn unknown_element_fails_in_build_radii() {
        struct ExoticRunner(ScriptedRunner);
        impl ToolRunner for ExoticRunner {
            fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
                let out = self.0.run(invocation)?;
                if invocation.kind == ToolKind::QuantumChemistry {
                    let xyz = HF_XYZ.replace("F 1.0", "Og 1.0");
                    fs::write(invocation.working_dir.join("optimized.xyz"), xyz).unwrap();
                }
                Ok(out)
            }
        }

        let ws = workspace(&["HF"]);
        let config = config(&ws, &["HF"], FailurePolicy::Halt);
        let err = run_molecule(
            "HF",
            &config,
            &ExoticRunner(ScriptedRunner::default()),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::BuildRadii));
        assert!(err.to_string().contains("Og"));
    }
}
