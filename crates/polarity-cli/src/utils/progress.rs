use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use molpolarity::engine::progress::{Progress, ProgressCallback};
use molpolarity::engine::stage::Stage;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::bar_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::BatchStart { total } => {
                    pb_guard.reset();
                    pb_guard.set_length(total);
                    pb_guard.set_position(0);
                    pb_guard.set_style(Self::bar_style());
                    pb_guard.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                }
                Progress::MoleculeStart { name, .. } => {
                    pb_guard.set_prefix(name);
                    pb_guard.set_message("starting");
                }
                Progress::StageStart { stage } => {
                    pb_guard.set_message(format!(
                        "{} ({}/{})",
                        stage,
                        stage.ordinal(),
                        Stage::ALL.len()
                    ));
                }
                Progress::MoleculeFinish { name } => {
                    pb_guard.inc(1);
                    pb_guard.println(format!("  ✓ {}", name));
                }
                Progress::MoleculeFailed { name, reason } => {
                    pb_guard.inc(1);
                    pb_guard.println(format!("  ✗ {}: {}", name, reason));
                }
                Progress::BatchFinish => {
                    pb_guard.disable_steady_tick();
                    pb_guard.set_prefix("");
                    pb_guard.finish_with_message("✓ Done");
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {prefix:>8.bold} [{bar:30.cyan/blue}] {pos}/{len} {msg} ({elapsed})",
        )
        .expect("Failed to create bar style template")
        .with_key(
            "elapsed",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.elapsed().as_secs_f64());
            },
        )
        .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
