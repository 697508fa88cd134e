use std::fmt;

/// Phases a file job moves through. No job moves backwards.
///
/// Queued → CacheHit | Materializing → Validating → Done | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Queued,
    /// A trusted local copy satisfied the job.
    CacheHit,
    /// No local copy; the media provider is transferring the file.
    Materializing,
    Validating,
    Done,
    Failed,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobPhase::Queued => "queued",
            JobPhase::CacheHit => "cache-hit",
            JobPhase::Materializing => "materializing",
            JobPhase::Validating => "validating",
            JobPhase::Done => "done",
            JobPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Batch progress passed to a [`ProgressSink`] after every top-level job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: u64,
    pub total:     u64,
}

impl Progress {
    pub fn new(total: u64) -> Self { Self { completed: 0, total } }

    /// Percentage of completed jobs; `None` for an empty batch.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        (self.total > 0).then(|| self.completed as f64 / self.total as f64 * 100.0)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool { self.completed >= self.total }
}

/// Receives progress reports. Returning `false` aborts the batch.
pub trait ProgressSink {
    fn report(&mut self, progress: &Progress) -> bool;
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress) -> bool,
{
    fn report(&mut self, progress: &Progress) -> bool { self(progress) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage() {
        let mut progress = Progress::new(4);
        assert_eq!(progress.percentage(), Some(0.0));
        progress.completed = 1;
        assert_eq!(progress.percentage(), Some(25.0));
        assert!(!progress.is_completed());
        progress.completed = 4;
        assert!(progress.is_completed());
        assert_eq!(Progress::new(0).percentage(), None);
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = |p: &Progress| {
            seen.push(p.completed);
            p.completed < 2
        };
        assert!(sink.report(&Progress { completed: 1, total: 3 }));
        assert!(!sink.report(&Progress { completed: 2, total: 3 }));
        assert_eq!(seen, vec![1, 2]);
    }
}
