use super::stage::Stage;

#[derive(Debug, Clone)]
pub enum Progress {
    BatchStart { total: u64 },
    BatchFinish,

    MoleculeStart { name: String, index: usize },
    StageStart { stage: Stage },
    MoleculeFinish { name: String },
    MoleculeFailed { name: String, reason: String },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::BatchFinish);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::StageStart { stage } = event {
                seen.lock().unwrap().push(stage);
            }
        }));
        reporter.report(Progress::StageStart {
            stage: Stage::Prepare,
        });
        reporter.report(Progress::MoleculeFinish {
            name: "HF".into(),
        });
        reporter.report(Progress::StageStart { stage: Stage::Mesh });
        drop(reporter);
        assert_eq!(seen.into_inner().unwrap(), vec![Stage::Prepare, Stage::Mesh]);
    }
}
