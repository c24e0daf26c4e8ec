//! Metric emission.
//!
//! Provides:
//! - `MetricSink` trait for composable backends
//! - `ConsoleSink` for lightweight stdout logging
//! - `TensorBoardSink` for visualization (feature `tensorboard`)
//! - `MultiSink` for multi-backend fan-out

mod console;
#[cfg(feature = "tensorboard")]
mod tensorboard;

pub use console::ConsoleSink;
#[cfg(feature = "tensorboard")]
pub use tensorboard::TensorBoardSink;

/// Destination for scalar training metrics.
pub trait MetricSink: Send + Sync {
    /// Record one scalar value tagged with an episode index.
    fn scalar(&self, name: &str, value: f64, step: u64);

    /// Flush pending writes.
    fn flush(&self) {}
}

/// A sink that discards everything (default).
pub struct NullSink;

impl MetricSink for NullSink {
    fn scalar(&self, _name: &str, _value: f64, _step: u64) {}
}

/// A composite sink that dispatches to multiple backends.
pub struct MultiSink {
    sinks: Vec<Box<dyn MetricSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn MetricSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Box<dyn MetricSink>) {
        self.sinks.push(sink);
    }
}

impl MetricSink for MultiSink {
    fn scalar(&self, name: &str, value: f64, step: u64) {
        for sink in &self.sinks {
            sink.scalar(name, value, step);
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}
