use tracing::debug;

use crate::frame::Frame;

/// Opaque ticket returned by [`FrameLoop::register`].
///
/// The owner of a per-frame callback keeps this and passes it back to
/// [`FrameLoop::deregister`] when it is torn down, so no callback outlives
/// the state it was written against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackHandle(u64);

type Callback<S> = Box<dyn FnMut(Frame, &mut S)>;

struct Registration<S> {
    handle: CallbackHandle,
    id: &'static str,
    /// Smaller values run earlier.
    priority: i32,
    callback: Callback<S>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameRunSummary {
    pub ran_callbacks: usize,
}

/// Per-frame callback registry over a shared state `S`.
///
/// Callbacks run in a deterministic order: `(priority, registration order)`.
pub struct FrameLoop<S> {
    next_handle: u64,
    registrations: Vec<Registration<S>>,
}

impl<S> Default for FrameLoop<S> {
    fn default() -> Self {
        Self {
            next_handle: 0,
            registrations: Vec::new(),
        }
    }
}

impl<S> FrameLoop<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        id: &'static str,
        priority: i32,
        callback: impl FnMut(Frame, &mut S) + 'static,
    ) -> CallbackHandle {
        let handle = CallbackHandle(self.next_handle);
        self.next_handle += 1;

        // Handles grow monotonically, so sorting by (priority, handle) keeps
        // insertion order stable within a priority.
        let at = self
            .registrations
            .partition_point(|r| (r.priority, r.handle) <= (priority, handle));
        self.registrations.insert(
            at,
            Registration {
                handle,
                id,
                priority,
                callback: Box::new(callback),
            },
        );
        debug!(id, priority, ?handle, "frame callback registered");
        handle
    }

    /// Returns `true` if the handle was still registered.
    pub fn deregister(&mut self, handle: CallbackHandle) -> bool {
        let Some(pos) = self.registrations.iter().position(|r| r.handle == handle) else {
            return false;
        };
        let removed = self.registrations.remove(pos);
        debug!(id = removed.id, ?handle, "frame callback deregistered");
        true
    }

    pub fn is_registered(&self, handle: CallbackHandle) -> bool {
        self.registrations.iter().any(|r| r.handle == handle)
    }

    pub fn callback_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn run_frame(&mut self, frame: Frame, state: &mut S) -> FrameRunSummary {
        for registration in &mut self.registrations {
            (registration.callback)(frame, state);
        }
        FrameRunSummary {
            ran_callbacks: self.registrations.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FrameLoop;
    use crate::frame::Frame;

    #[test]
    fn runs_callbacks_in_priority_then_insertion_order() {
        let mut frame_loop: FrameLoop<Vec<&'static str>> = FrameLoop::new();
        frame_loop.register("late", 10, |_, log| log.push("late"));
        frame_loop.register("a", 0, |_, log| log.push("a"));
        frame_loop.register("b", 0, |_, log| log.push("b"));
        frame_loop.register("early", -1, |_, log| log.push("early"));

        let mut log = Vec::new();
        let summary = frame_loop.run_frame(Frame::fixed(0, 1.0), &mut log);
        assert_eq!(log, vec!["early", "a", "b", "late"]);
        assert_eq!(summary.ran_callbacks, 4);
    }

    #[test]
    fn deregistered_callbacks_stop_running() {
        let mut frame_loop: FrameLoop<u32> = FrameLoop::new();
        let keep = frame_loop.register("keep", 0, |_, n| *n += 1);
        let doomed = frame_loop.register("drop", 0, |_, n| *n += 100);

        let mut n = 0;
        frame_loop.run_frame(Frame::fixed(0, 1.0), &mut n);
        assert_eq!(n, 101);

        assert!(frame_loop.deregister(doomed));
        assert!(!frame_loop.deregister(doomed));
        assert!(frame_loop.is_registered(keep));
        assert!(!frame_loop.is_registered(doomed));

        frame_loop.run_frame(Frame::fixed(1, 1.0), &mut n);
        assert_eq!(n, 102);
        assert_eq!(frame_loop.callback_count(), 1);
    }

    #[test]
    fn callbacks_see_frame_delta() {
        let mut frame_loop: FrameLoop<f64> = FrameLoop::new();
        frame_loop.register("acc", 0, |frame, total| *total += frame.dt_s);

        let mut total = 0.0;
        for i in 0..4 {
            frame_loop.run_frame(Frame::fixed(i, 0.25), &mut total);
        }
        assert!((total - 1.0).abs() < 1e-12);
    }
}
