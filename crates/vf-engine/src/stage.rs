//! Weighted progress across the stages of one operation

use std::ops::ControlFlow;

use vf_core::Checkpoint;

/// Maps a stage's own 0..1 progress onto `[start, start + weight]` of the
/// whole operation.
pub(crate) struct Stage<'a, C: ?Sized> {
    inner: &'a mut C,
    start: f64,
    weight: f64,
}

impl<'a, C: Checkpoint + ?Sized> Stage<'a, C> {
    pub(crate) fn new(inner: &'a mut C, start: f64, weight: f64) -> Self {
        Self { inner, start, weight }
    }
}

impl<C: Checkpoint + ?Sized> Checkpoint for Stage<'_, C> {
    fn checkpoint(&mut self, fraction: f64) -> ControlFlow<()> {
        self.inner.checkpoint(self.start + self.weight * fraction.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_rescales() {
        let mut seen = Vec::new();
        let mut record = |f: f64| {
            seen.push(f);
            ControlFlow::Continue(())
        };
        {
            let mut first = Stage::new(&mut record, 0.0, 0.25);
            let _ = first.checkpoint(0.5);
            let _ = first.checkpoint(1.0);
        }
        {
            let mut second = Stage::new(&mut record, 0.25, 0.75);
            let _ = second.checkpoint(1.0);
        }
        assert_eq!(seen, vec![0.125, 0.25, 1.0]);
    }
}
