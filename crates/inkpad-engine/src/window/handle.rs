use std::fmt;
use std::sync::{mpsc, Arc, Mutex};

use winit::event_loop::EventLoopProxy;

/// Requests worker threads post to the event-loop thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    SetTitle(String),
}

trait EventSink: Send + Sync {
    fn post(&self, event: RuntimeEvent) -> bool;
}

impl EventSink for Mutex<EventLoopProxy<RuntimeEvent>> {
    fn post(&self, event: RuntimeEvent) -> bool {
        crate::sync::lock(self).send_event(event).is_ok()
    }
}

impl EventSink for mpsc::Sender<RuntimeEvent> {
    fn post(&self, event: RuntimeEvent) -> bool {
        self.send(event).is_ok()
    }
}

/// Cloneable, thread-safe way to reach the event-loop thread.
///
/// Posting never blocks and never touches the window; the runtime applies the
/// event on its own thread. Posting after the loop has exited is a no-op.
#[derive(Clone)]
pub struct RuntimeHandle {
    sink: Arc<dyn EventSink>,
}

impl RuntimeHandle {
    pub(crate) fn from_proxy(proxy: EventLoopProxy<RuntimeEvent>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(proxy)),
        }
    }

    /// A handle that delivers into a channel instead of an event loop.
    pub fn channel() -> (Self, mpsc::Receiver<RuntimeEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sink: Arc::new(sender),
            },
            receiver,
        )
    }

    /// Returns `false` if the event loop is gone.
    pub fn post(&self, event: RuntimeEvent) -> bool {
        self.sink.post(event)
    }

    pub fn set_title(&self, title: impl Into<String>) -> bool {
        self.post(RuntimeEvent::SetTitle(title.into()))
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn posts_from_another_thread() {
        let (handle, events) = RuntimeHandle::channel();
        let worker = {
            let handle = handle.clone();
            thread::spawn(move || handle.set_title("inkpad 60 fps"))
        };
        assert!(worker.join().unwrap());
        assert_eq!(
            events.recv().unwrap(),
            RuntimeEvent::SetTitle("inkpad 60 fps".to_owned())
        );
    }

    #[test]
    fn posting_after_loop_exit_does_not_block() {
        let (handle, events) = RuntimeHandle::channel();
        drop(events);
        assert!(!handle.set_title("late"));
    }
}
