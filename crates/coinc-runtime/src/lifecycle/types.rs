use tokio::task::JoinHandle;

use crate::error::{RuntimeError, RuntimeReason, RuntimeResult};

// ---------------------------------------------------------------------------
// TaskGroup — named collection of async tasks for ordered shutdown
// ---------------------------------------------------------------------------

/// A named group of async tasks that are shut down together.
///
/// [`super::Reactor::wait`] joins groups consumer-loop-first, then
/// alert-dispatcher: the consumer loop is the only cache mutator and the
/// only producer onto the alert channel, so joining it first guarantees no
/// new alert is produced after it exits, and the dispatcher can then drain
/// what's buffered and exit cleanly once the channel closes.
pub(crate) struct TaskGroup {
    pub(super) name: &'static str,
    handles: Vec<JoinHandle<RuntimeResult<()>>>,
}

impl TaskGroup {
    pub(super) fn new(name: &'static str) -> Self {
        Self { name, handles: Vec::new() }
    }

    pub(super) fn push(&mut self, handle: JoinHandle<RuntimeResult<()>>) {
        self.handles.push(handle);
    }

    /// Join all tasks in this group, returning the first error.
    pub(super) async fn wait(self) -> RuntimeResult<()> {
        for handle in self.handles {
            match handle.await {
                Ok(result) => result?,
                Err(join_err) => {
                    return Err(RuntimeError::from(RuntimeReason::Shutdown(format!(
                        "task join error: {join_err}"
                    ))));
                }
            }
        }
        Ok(())
    }
}
