//! Pressure-driven batch scheduling.
//!
//! The scheduler advances one leaf per `process_batch`: at every
//! container it prefers the *rightmost* child already holding a full
//! batch (draining near-complete work toward the output before filling
//! the head further), and otherwise the fullest child, leftmost on ties.
//! Pressure is the percentage of a full batch sitting in a segment's
//! pending queues, saturating above 100 when overfull.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::context::SegmentContext;
use super::error::PiperResult;
use super::node::NodeKind;
use super::pipeline::Pipeline;
use crate::util::SegmentId;

impl<T: fmt::Debug + 'static, A> Pipeline<T, A> {
    /// Scheduling pressure of a segment.
    ///
    /// A leaf with no backlog has pressure 0; any backlog yields at least
    /// 1; a full batch yields 100 and an overfull queue proportionally
    /// more. A container reports the maximum over its children.
    pub fn pressure(&self, id: SegmentId) -> u32 {
        match &self.nodes[id.index()].kind {
            NodeKind::Process { queue, .. } => {
                let pending = queue.ready();
                if pending == 0 {
                    return 0;
                }
                let batch_size = self.resolved_batch_size(id);
                let percent = pending.saturating_mul(100) / batch_size;
                u32::try_from(percent).unwrap_or(u32::MAX).max(1)
            }
            NodeKind::Container { children, .. } => children
                .iter()
                .map(|&child| self.pressure(child))
                .max()
                .unwrap_or(0),
        }
    }

    /// Run one handler invocation somewhere in the tree.
    ///
    /// Descends from the root choosing a child by pressure at each
    /// container, then dequeues up to one batch at the chosen leaf and
    /// invokes its handler once. A no-op when nothing is pending.
    ///
    /// # Errors
    ///
    /// Propagates handler and routing errors; the batch dequeued for a
    /// failing handler is lost.
    pub fn process_batch(&mut self) -> PiperResult<()> {
        self.process_batch_at(self.root)
    }

    fn process_batch_at(&mut self, id: SegmentId) -> PiperResult<()> {
        if self.nodes[id.index()].is_process() {
            return self.run_leaf(id);
        }
        let chosen = {
            let mut full_batch = None;
            let mut fullest: Option<(SegmentId, u32)> = None;
            for &child in self.nodes[id.index()].children() {
                let pressure = self.pressure(child);
                if pressure >= 100 {
                    full_batch = Some(child);
                }
                match fullest {
                    Some((_, best)) if best >= pressure => {}
                    _ => fullest = Some((child, pressure)),
                }
            }
            match (full_batch, fullest) {
                (Some(child), _) => Some(child),
                (None, Some((child, pressure))) if pressure > 0 => Some(child),
                _ => None,
            }
        };
        match chosen {
            Some(child) => self.process_batch_at(child),
            None => Ok(()),
        }
    }

    fn run_leaf(&mut self, id: SegmentId) -> PiperResult<()> {
        let batch_size = self.resolved_batch_size(id);

        // A leaf disabled after items reached its queue behaves like the
        // segment was removed: the backlog moves to the drain unprocessed.
        if !self.resolved_enabled(id) {
            let batch = match &mut self.nodes[id.index()].kind {
                NodeKind::Process { queue, .. } => queue.dequeue(batch_size),
                NodeKind::Container { .. } => Vec::new(),
            };
            if !batch.is_empty() {
                self.log_info(id, "segment disabled, passing batch through to drain", &batch);
                self.push_drain(id, batch);
            }
            return Ok(());
        }

        let batch = match &mut self.nodes[id.index()].kind {
            NodeKind::Process { queue, .. } => queue.dequeue(batch_size),
            NodeKind::Container { .. } => return Ok(()),
        };
        if batch.is_empty() {
            return Ok(());
        }

        let mut handler = {
            let taken = match &mut self.nodes[id.index()].kind {
                NodeKind::Process { handler, .. } => handler.take(),
                NodeKind::Container { .. } => None,
            };
            match taken {
                Some(handler) => handler,
                None => return Err(self.invariant(id, "handler missing or re-entered")),
            }
        };

        self.log_debug(id, &format!("processing batch of {} items", batch.len()), &batch);

        let result = {
            let mut ctx = SegmentContext::new(self, id);
            handler(&mut ctx, batch)
        };

        if let NodeKind::Process { handler: slot, .. } = &mut self.nodes[id.index()].kind {
            *slot = Some(handler);
        }
        result
    }

    /// Advance until at least `n` items are ready at the root drain or no
    /// work remains. Returns the ready count.
    ///
    /// # Errors
    ///
    /// Propagates the first handler or routing error.
    pub fn prepare(&mut self, n: usize) -> PiperResult<usize> {
        while self.has_pending() && self.ready() < n {
            self.process_batch()?;
        }
        Ok(self.ready())
    }

    /// [`prepare`](Self::prepare) for a single item.
    ///
    /// # Errors
    ///
    /// Propagates the first handler or routing error.
    pub fn prepare_one(&mut self) -> PiperResult<usize> {
        self.prepare(1)
    }

    /// Pull up to `n` ready items, advancing the pipeline first.
    ///
    /// # Errors
    ///
    /// Propagates the first handler or routing error.
    pub fn dequeue(&mut self, n: usize) -> PiperResult<Vec<T>> {
        self.prepare(n)?;
        Ok(self.root_drain.dequeue(n))
    }

    /// Pull a single ready item, advancing the pipeline first.
    ///
    /// # Errors
    ///
    /// Propagates the first handler or routing error.
    pub fn dequeue_one(&mut self) -> PiperResult<Option<T>> {
        self.prepare(1)?;
        Ok(self.root_drain.dequeue_one())
    }

    /// Run until no items are pending anywhere in the tree.
    ///
    /// # Errors
    ///
    /// Propagates the first handler or routing error.
    pub fn flush(&mut self) -> PiperResult<()> {
        while self.has_pending() {
            self.process_batch()?;
        }
        Ok(())
    }

    /// Whether no item will ever become ready without new input.
    ///
    /// # Errors
    ///
    /// Propagates the first handler or routing error.
    pub fn is_exhausted(&mut self) -> PiperResult<bool> {
        Ok(self.prepare(1)? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentDescriptor;

    fn emitter(label: &str) -> SegmentDescriptor<u32> {
        SegmentDescriptor::process(label, |ctx, batch| {
            ctx.emit(batch);
            Ok(())
        })
    }

    #[test]
    fn test_pressure_zero_when_empty() {
        let pipeline = Pipeline::init(emitter("a").with_batch_size(10), ()).unwrap();
        assert_eq!(pipeline.pressure(pipeline.root()), 0);
    }

    #[test]
    fn test_pressure_floors_at_one() {
        let mut pipeline = Pipeline::init(emitter("a").with_batch_size(1000), ()).unwrap();
        pipeline.enqueue([1]);
        assert_eq!(pipeline.pressure(pipeline.root()), 1);
    }

    #[test]
    fn test_pressure_is_percent_of_batch() {
        let mut pipeline = Pipeline::init(emitter("a").with_batch_size(10), ()).unwrap();
        pipeline.enqueue(1..=5);
        assert_eq!(pipeline.pressure(pipeline.root()), 50);
    }

    #[test]
    fn test_pressure_saturates_over_full() {
        let mut pipeline = Pipeline::init(emitter("a").with_batch_size(4), ()).unwrap();
        pipeline.enqueue(1..=10);
        assert_eq!(pipeline.pressure(pipeline.root()), 250);
    }

    #[test]
    fn test_container_pressure_is_max_of_children() {
        let desc = SegmentDescriptor::container(
            "main",
            vec![
                emitter("a").with_batch_size(10),
                emitter("b").with_batch_size(10),
            ],
        );
        let mut pipeline = Pipeline::init(desc, ()).unwrap();
        pipeline.enqueue(1..=3); // lands at `a`
        assert_eq!(pipeline.pressure(pipeline.root()), 30);
    }

    #[test]
    fn test_full_batch_child_is_preferred_rightmost() {
        // Both stages hold a full batch; one step must advance `b`, the
        // child closest to the drain.
        let desc = SegmentDescriptor::container(
            "main",
            vec![
                emitter("a").with_batch_size(2),
                emitter("b").with_batch_size(2),
            ],
        );
        let mut pipeline = Pipeline::init(desc, ()).unwrap();
        let a = pipeline.find_segment("a").unwrap();
        let b = pipeline.find_segment("b").unwrap();

        pipeline.enqueue([1, 2]);
        pipeline.process_batch().unwrap(); // a's handler forwards to b
        assert_eq!(pipeline.pending_of(b), 2);
        pipeline.enqueue([3, 4]);

        // a and b both at pressure 100 now
        assert_eq!(pipeline.pressure(a), 100);
        assert_eq!(pipeline.pressure(b), 100);
        pipeline.process_batch().unwrap();
        assert_eq!(pipeline.ready(), 2); // b drained to the output
        assert_eq!(pipeline.pending_of(a), 2);
    }

    #[test]
    fn test_fallback_picks_fullest_child() {
        let desc = SegmentDescriptor::container(
            "main",
            vec![
                emitter("a").with_batch_size(10),
                emitter("b").with_batch_size(10),
            ],
        );
        let mut pipeline = Pipeline::init(desc, ()).unwrap();
        let b = pipeline.find_segment("b").unwrap();

        pipeline.enqueue([1, 2]);
        pipeline.process_batch().unwrap(); // moves both to b
        pipeline.enqueue([3]); // a: pressure 10, b: pressure 20

        pipeline.process_batch().unwrap(); // must pick b
        assert_eq!(pipeline.ready(), 2);
        assert_eq!(pipeline.pending_of(b), 0);
    }

    #[test]
    fn test_prepare_stops_at_requested_count() {
        let mut pipeline = Pipeline::init(emitter("a").with_batch_size(1), ()).unwrap();
        pipeline.enqueue(1..=5);
        let ready = pipeline.prepare(2).unwrap();
        assert_eq!(ready, 2);
        assert_eq!(pipeline.pending(), 3);
    }

    #[test]
    fn test_flush_drains_everything() {
        let mut pipeline = Pipeline::init(emitter("a").with_batch_size(2), ()).unwrap();
        pipeline.enqueue(1..=7);
        pipeline.flush().unwrap();
        assert_eq!(pipeline.pending(), 0);
        assert_eq!(pipeline.ready(), 7);
    }

    #[test]
    fn test_is_exhausted_reflects_emptiness() {
        let mut pipeline = Pipeline::init(emitter("a"), ()).unwrap();
        assert!(pipeline.is_exhausted().unwrap());

        pipeline.enqueue([1]);
        assert!(!pipeline.is_exhausted().unwrap());

        let _ = pipeline.dequeue(1).unwrap();
        assert!(pipeline.is_exhausted().unwrap());
    }

    #[test]
    fn test_handler_error_loses_batch_and_propagates() {
        let desc: SegmentDescriptor<u32> = SegmentDescriptor::process("boom", |ctx, _batch| {
            Err(ctx.error("refused"))
        })
        .with_batch_size(2);
        let mut pipeline = Pipeline::init(desc, ()).unwrap();
        pipeline.enqueue(1..=3);

        let err = pipeline.process_batch().unwrap_err();
        assert!(err.to_string().contains("refused"));
        // The failing batch of two is gone; the third item is untouched.
        assert_eq!(pipeline.pending(), 1);
        assert_eq!(pipeline.ready(), 0);
    }
}
