//! Operator resume/abort signalling for the manual checkpoint.
//!
//! The controller blocks at the checkpoint until the operator resumes or
//! aborts. Abort stays latched, so it is also seen between prompts.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorSignal {
    Pending,
    Resume,
    Abort,
}

/// Operator side of the channel.
#[derive(Debug, Clone)]
pub struct CheckpointHandle {
    tx: Arc<watch::Sender<OperatorSignal>>,
}

impl CheckpointHandle {
    pub fn resume(&self) {
        // Abort is final.
        self.tx.send_if_modified(|signal| {
            if *signal == OperatorSignal::Pending {
                *signal = OperatorSignal::Resume;
                true
            } else {
                false
            }
        });
    }

    pub fn abort(&self) {
        self.tx.send_replace(OperatorSignal::Abort);
    }
}

/// Controller side of the channel.
#[derive(Debug)]
pub struct CheckpointListener {
    rx: watch::Receiver<OperatorSignal>,
}

impl CheckpointListener {
    /// Wait until the operator resumes or aborts. A dropped handle counts as
    /// abort, since nothing could ever resume the run.
    pub async fn wait(&mut self) -> OperatorSignal {
        match self.rx.wait_for(|s| *s != OperatorSignal::Pending).await {
            Ok(signal) => *signal,
            Err(_) => OperatorSignal::Abort,
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow() == OperatorSignal::Abort
    }
}

/// Create a connected handle/listener pair in the `Pending` state.
#[must_use]
pub fn checkpoint_channel() -> (CheckpointHandle, CheckpointListener) {
    let (tx, rx) = watch::channel(OperatorSignal::Pending);
    (
        CheckpointHandle { tx: Arc::new(tx) },
        CheckpointListener { rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resume_releases_waiter() {
        let (handle, mut listener) = checkpoint_channel();
        let waiter = tokio::spawn(async move { listener.wait().await });
        handle.resume();
        assert_eq!(waiter.await.unwrap(), OperatorSignal::Resume);
    }

    #[tokio::test]
    async fn abort_is_latched_over_resume() {
        let (handle, mut listener) = checkpoint_channel();
        handle.abort();
        handle.resume();
        assert_eq!(listener.wait().await, OperatorSignal::Abort);
        assert!(listener.is_aborted());
    }

    #[tokio::test]
    async fn abort_after_resume_is_visible() {
        let (handle, mut listener) = checkpoint_channel();
        handle.resume();
        assert_eq!(listener.wait().await, OperatorSignal::Resume);
        assert!(!listener.is_aborted());
        handle.abort();
        assert!(listener.is_aborted());
    }

    #[tokio::test]
    async fn dropped_handle_counts_as_abort() {
        let (handle, mut listener) = checkpoint_channel();
        drop(handle);
        assert_eq!(listener.wait().await, OperatorSignal::Abort);
    }
}
