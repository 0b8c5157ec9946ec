//! Change notification: wake an adapter whenever its hub broadcasts.

use std::future::Future;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::debug;

use wiserlink_domain::hub_update::HubUpdate;

/// A live registration of one callback against a hub's update channel.
///
/// The callback runs on a spawned task, one invocation at a time, in the
/// order updates were broadcast. Broadcasts are not coalesced. A receiver
/// that fell behind runs the callback once for everything it missed.
///
/// [`detach`](Self::detach) guarantees the callback never runs again;
/// dropping the subscription aborts it without waiting.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawn a task invoking `on_update` for every update on `receiver`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach<F, Fut>(receiver: broadcast::Receiver<HubUpdate>, on_update: F) -> Self
    where
        F: Fn(HubUpdate) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut updates = BroadcastStream::new(receiver);
            while let Some(item) = updates.next().await {
                match item {
                    Ok(update) => on_update(update).await,
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        debug!(skipped, "hub update receiver lagged");
                        on_update(HubUpdate::new(false)).await;
                    }
                }
            }
            debug!("hub update channel closed");
        });
        Self { task: Some(task) }
    }

    /// Whether the callback can still be invoked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Deregister the callback and wait until its task is gone.
    pub async fn detach(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // a cancelled task resolves to a JoinError, which is the expected outcome
            let _ = task.await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
