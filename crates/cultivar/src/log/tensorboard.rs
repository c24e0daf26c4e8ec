//! TensorBoard metric sink.

use std::path::PathBuf;
use std::sync::Mutex;

use tensorboard_rs::summary_writer::SummaryWriter;

use super::MetricSink;

/// Sink that writes event files for one training run.
///
/// Event writes are buffered and flushed when the episode index advances
/// (and on `flush`), rather than per scalar, so a fast environment does
/// not thrash the event file.
pub struct TensorBoardSink {
    inner: Mutex<Inner>,
}

struct Inner {
    writer: SummaryWriter,
    last_step: Option<u64>,
}

impl TensorBoardSink {
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        let run_dir = run_dir.into();
        tracing::info!(dir = %run_dir.display(), "Writing TensorBoard events");

        Self {
            inner: Mutex::new(Inner {
                writer: SummaryWriter::new(run_dir.as_path()),
                last_step: None,
            }),
        }
    }
}

impl MetricSink for TensorBoardSink {
    fn scalar(&self, name: &str, value: f64, step: u64) {
        if let Ok(mut inner) = self.inner.lock() {
            if inner.last_step.is_some_and(|last| last != step) {
                let _ = inner.writer.flush();
            }
            inner.last_step = Some(step);
            inner.writer.add_scalar(name, value as f32, step as usize);
        }
    }

    fn flush(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = inner.writer.flush();
        }
    }
}
