use std::future::Future;

use futures::future::AbortHandle;
use futures::StreamExt;

use crate::messaging::EventStream;
use crate::platform::runtime::{spawn_abortable, MaybeSend};

/// The three transport subscriptions an initialized session holds.
///
/// Owned as one value so teardown revokes every subscription at once.
#[derive(Debug, Default)]
pub(crate) struct ListenerSet {
    pub(crate) token_refresh: Option<AbortHandle>,
    pub(crate) foreground: Option<AbortHandle>,
    pub(crate) opened: Option<AbortHandle>,
}

impl ListenerSet {
    /// Aborts every subscription and returns how many were live.
    pub(crate) fn abort_all(self) -> usize {
        let mut aborted = 0;
        for handle in [self.token_refresh, self.foreground, self.opened]
            .into_iter()
            .flatten()
        {
            handle.abort();
            aborted += 1;
        }
        aborted
    }
}

/// Drives `events` in the background, awaiting each event's task in order.
///
/// The loop ends when the stream closes or `on_event` returns `None`.
pub(crate) fn spawn_listener<T, F, Fut>(mut events: EventStream<T>, mut on_event: F) -> AbortHandle
where
    T: MaybeSend + 'static,
    F: FnMut(T) -> Option<Fut> + MaybeSend + 'static,
    Fut: Future<Output = ()> + MaybeSend + 'static,
{
    spawn_abortable(async move {
        while let Some(event) = events.next().await {
            match on_event(event) {
                Some(task) => task.await,
                None => break,
            }
        }
    })
}
