//! Console metric sink.

use std::sync::Mutex;

use super::MetricSink;

/// Sink that prints one line per episode via tracing.
///
/// Scalars arrive one at a time but share an episode index, so the sink
/// buffers them until a scalar for a later episode (or a `flush`) closes
/// the line. Emitting grouped lines keeps a long run readable instead of
/// printing four lines per episode.
pub struct ConsoleSink {
    buffer: Mutex<LineBuffer>,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(LineBuffer::default()),
        }
    }
}

impl MetricSink for ConsoleSink {
    fn scalar(&self, name: &str, value: f64, step: u64) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if let Some(line) = buffer.push(name, value, step) {
                tracing::info!("{}", line.render());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if let Some(line) = buffer.take() {
                tracing::info!("{}", line.render());
            }
        }
    }
}

/// Accumulates the scalars of the episode currently being reported.
#[derive(Default)]
struct LineBuffer {
    current: Option<Line>,
}

struct Line {
    step: u64,
    fields: Vec<(String, f64)>,
}

impl LineBuffer {
    /// Record one scalar; returns the previous episode's finished line
    /// when `step` moves on.
    fn push(&mut self, name: &str, value: f64, step: u64) -> Option<Line> {
        match &mut self.current {
            Some(line) if line.step == step => {
                line.fields.push((name.to_string(), value));
                None
            }
            _ => {
                let finished = self.current.take();
                self.current = Some(Line {
                    step,
                    fields: vec![(name.to_string(), value)],
                });
                finished
            }
        }
    }

    fn take(&mut self) -> Option<Line> {
        self.current.take()
    }
}

impl Line {
    fn render(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(name, value)| format!("{}={:.3}", name, value))
            .collect::<Vec<_>>()
            .join("  ");

        format!("Episode {:>6}  {}", self.step, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_of_one_episode_share_a_line() {
        let mut buffer = LineBuffer::default();

        assert!(buffer.push("episode_reward", 5.0, 0).is_none());
        assert!(buffer.push("trailing_100_avg", 5.0, 0).is_none());

        // The first scalar of episode 1 closes episode 0's line.
        let line = buffer.push("episode_reward", 6.0, 1).unwrap();
        assert_eq!(line.step, 0);
        assert_eq!(line.fields.len(), 2);

        let line = buffer.take().unwrap();
        assert_eq!(line.step, 1);
        assert_eq!(line.fields.len(), 1);
        assert!(buffer.take().is_none());
    }

    #[test]
    fn test_render_format() {
        let line = Line {
            step: 12,
            fields: vec![("episode_reward".to_string(), 5.0), ("critic_loss".to_string(), 0.25)],
        };
        assert_eq!(
            line.render(),
            "Episode     12  episode_reward=5.000  critic_loss=0.250"
        );
    }
}
