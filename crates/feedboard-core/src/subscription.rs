use crate::intake::IntakeSender;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::any::TypeId;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

type Start<Msg> = Box<dyn FnOnce(IntakeSender<Msg>, CancellationToken) -> BoxFuture<'static, ()> + Send>;

/// A long-lived producer managed by the runtime.
///
/// Subscriptions are declared in [`Model::subscriptions`](crate::Model::subscriptions) and automatically
/// started or stopped through diffing: the runtime compares the set of
/// subscriptions returned on each update cycle and starts any new ones while
/// cancelling any that are no longer present.
///
/// A running subscription owns its own [`IntakeSender`] and pushes into the
/// bounded intake queue, waiting when it is full. It must return promptly once
/// its [`CancellationToken`] fires.
pub struct Subscription<Msg: Send + 'static> {
    pub(crate) id: SubscriptionId,
    pub(crate) start: Start<Msg>,
}

/// Identity for diffing subscriptions between update cycles.
///
/// Each subscription carries a `SubscriptionId` composed of a Rust [`TypeId`]
/// and a numeric discriminant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    type_id: TypeId,
    discriminant: u64,
}

impl SubscriptionId {
    /// Create an ID from a type and a numeric discriminant.
    pub fn new<T: 'static>(discriminant: u64) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            discriminant,
        }
    }

    /// Create an ID from a type alone (for singletons).
    pub fn of<T: 'static>() -> Self {
        Self::new::<T>(0)
    }

    /// Create an ID from a type and a string discriminant.
    pub fn with_str<T: 'static>(s: &str) -> Self {
        let mut hasher = std::hash::DefaultHasher::new();
        s.hash(&mut hasher);
        Self::new::<T>(hasher.finish())
    }
}

impl<Msg: Send + 'static> Subscription<Msg> {
    /// Create from a stream. The stream is built lazily, inside the spawned
    /// task, the first time the subscription starts.
    pub fn from_stream(
        id: SubscriptionId,
        stream: impl FnOnce() -> BoxStream<'static, Msg> + Send + 'static,
    ) -> Self {
        Self::from_worker(id, move |tx, cancel| {
            Box::pin(async move {
                let mut stream = stream();
                loop {
                    let msg = tokio::select! {
                        _ = cancel.cancelled() => break,
                        next = stream.next() => match next {
                            Some(msg) => msg,
                            None => break,
                        },
                    };
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        sent = tx.push(msg) => if sent.is_err() { break },
                    }
                }
            })
        })
    }

    /// Create from an async worker that pushes into the intake queue itself.
    ///
    /// Use this when the producer needs to run teardown after cancellation
    /// (closing a connection, for instance).
    pub fn from_worker(
        id: SubscriptionId,
        worker: impl FnOnce(IntakeSender<Msg>, CancellationToken) -> BoxFuture<'static, ()>
            + Send
            + 'static,
    ) -> Self {
        Subscription {
            id,
            start: Box::new(worker),
        }
    }

    /// The identity used for diffing.
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }
}

/// Manages active subscriptions, performing diffing between cycles.
pub(crate) struct SubscriptionManager<Msg: Send + 'static> {
    active: HashMap<SubscriptionId, CancellationToken>,
    tasks: JoinSet<()>,
    intake: IntakeSender<Msg>,
    root: CancellationToken,
}

impl<Msg: Send + 'static> SubscriptionManager<Msg> {
    pub fn new(intake: IntakeSender<Msg>) -> Self {
        Self {
            active: HashMap::new(),
            tasks: JoinSet::new(),
            intake,
            root: CancellationToken::new(),
        }
    }

    /// Diff new subscriptions against active ones.
    /// Start new ones, cancel removed ones, keep unchanged ones.
    pub fn reconcile(&mut self, new_subs: Vec<Subscription<Msg>>) {
        // Reap workers that already finished.
        while self.tasks.try_join_next().is_some() {}

        let mut new_ids: HashMap<SubscriptionId, Subscription<Msg>> = HashMap::new();
        for sub in new_subs {
            new_ids.insert(sub.id.clone(), sub);
        }

        let to_remove: Vec<SubscriptionId> = self
            .active
            .keys()
            .filter(|id| !new_ids.contains_key(id))
            .cloned()
            .collect();

        for id in to_remove {
            if let Some(token) = self.active.remove(&id) {
                tracing::debug!(?id, "stopping subscription");
                token.cancel();
            }
        }

        for (id, sub) in new_ids {
            if !self.active.contains_key(&id) {
                tracing::debug!(?id, "starting subscription");
                let token = self.root.child_token();
                self.tasks.spawn((sub.start)(self.intake.clone(), token.clone()));
                self.active.insert(id, token);
            }
        }
    }

    /// Cancel all active subscriptions.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        self.active.clear();
    }

    /// Wait up to `grace` for cancelled workers to finish, then abort the
    /// rest.
    pub async fn wait_stopped(&mut self, grace: Duration) {
        let tasks = &mut self.tasks;
        let drained = tokio::time::timeout(grace, async move {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::debug!(remaining = self.tasks.len(), "aborting subscription workers");
            self.tasks.abort_all();
        }
    }

    /// Number of active subscriptions.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl<Msg: Send + 'static> Drop for SubscriptionManager<Msg> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{intake, MIN_INTAKE_CAPACITY};
    use std::time::Duration;

    fn pending_sub(id: SubscriptionId) -> Subscription<i32> {
        Subscription::from_stream(id, || futures::stream::pending().boxed())
    }

    #[test]
    fn subscription_id_equality() {
        let id1 = SubscriptionId::of::<String>();
        let id2 = SubscriptionId::of::<String>();
        assert_eq!(id1, id2);
    }

    #[test]
    fn subscription_id_different_types() {
        let id1 = SubscriptionId::of::<String>();
        let id2 = SubscriptionId::of::<i32>();
        assert_ne!(id1, id2);
    }

    #[test]
    fn subscription_id_with_str() {
        let id1 = SubscriptionId::with_str::<String>("a");
        let id2 = SubscriptionId::with_str::<String>("b");
        assert_ne!(id1, id2);

        let id3 = SubscriptionId::with_str::<String>("a");
        assert_eq!(id1, id3);
    }

    #[tokio::test]
    async fn subscription_manager_starts_new() {
        let (tx, _rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx);

        manager.reconcile(vec![pending_sub(SubscriptionId::of::<String>())]);
        assert_eq!(manager.active_count(), 1);
    }

    #[tokio::test]
    async fn subscription_manager_stops_removed() {
        let (tx, _rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx);

        manager.reconcile(vec![pending_sub(SubscriptionId::of::<String>())]);
        assert_eq!(manager.active_count(), 1);

        manager.reconcile(vec![]);
        assert_eq!(manager.active_count(), 0);
    }

    #[tokio::test]
    async fn subscription_manager_keeps_existing() {
        let (tx, mut rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx);
        let id = SubscriptionId::of::<String>();

        manager.reconcile(vec![Subscription::from_stream(id.clone(), || {
            futures::stream::iter([1]).boxed()
        })]);
        // Same id again: the replacement is discarded, not started.
        manager.reconcile(vec![Subscription::from_stream(id, || {
            futures::stream::iter([2]).boxed()
        })]);
        assert_eq!(manager.active_count(), 1);

        assert_eq!(rx.recv().await.map(|a| a.msg), Some(1));
        let second = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn stream_items_reach_the_intake() {
        let (tx, mut rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx);

        manager.reconcile(vec![Subscription::from_stream(
            SubscriptionId::of::<u8>(),
            || futures::stream::iter(vec![1, 2, 3]).boxed(),
        )]);

        let mut got = Vec::new();
        for _ in 0..3 {
            got.push(rx.recv().await.unwrap().msg);
        }
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn shutdown_cancels_workers() {
        let (tx, _rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx);
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();

        manager.reconcile(vec![
            Subscription::from_worker(SubscriptionId::new::<String>(1), move |_tx, cancel| {
                Box::pin(async move {
                    cancel.cancelled().await;
                    let _ = done_tx.send(());
                })
            }),
            pending_sub(SubscriptionId::new::<String>(2)),
        ]);
        assert_eq!(manager.active_count(), 2);

        manager.shutdown();
        assert_eq!(manager.active_count(), 0);
        tokio::time::timeout(Duration::from_secs(1), done_rx)
            .await
            .expect("worker observed cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn wait_stopped_lets_teardown_finish() {
        let (tx, _rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx);
        let (done_tx, mut done_rx) = tokio::sync::oneshot::channel();

        manager.reconcile(vec![Subscription::from_worker(SubscriptionId::of::<u32>(), move |_tx, cancel| {
            Box::pin(async move {
                cancel.cancelled().await;
                tokio::time::sleep(Duration::from_millis(20)).await;
                let _ = done_tx.send(());
            })
        })]);

        manager.shutdown();
        manager.wait_stopped(Duration::from_secs(5)).await;
        assert!(done_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn wait_stopped_aborts_workers_that_ignore_cancellation() {
        let (tx, _rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx);
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();

        manager.reconcile(vec![Subscription::from_worker(SubscriptionId::of::<u64>(), move |_tx, _cancel| {
            Box::pin(async move {
                let _hold = done_tx;
                futures::future::pending::<()>().await;
            })
        })]);

        manager.shutdown();
        manager.wait_stopped(Duration::from_millis(20)).await;
        // Aborting drops the worker and with it the sender.
        let res = tokio::time::timeout(Duration::from_secs(1), done_rx).await;
        assert!(matches!(res, Ok(Err(_))));
    }

    #[tokio::test]
    async fn cancel_unblocks_producer_on_full_queue() {
        let (tx, _rx) = intake::<i32>(MIN_INTAKE_CAPACITY);
        let mut manager = SubscriptionManager::new(tx.clone());

        // Fill the queue so the subscription's first push must wait.
        for i in 0..MIN_INTAKE_CAPACITY as i32 {
            tx.push(i).await.unwrap();
        }

        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
        manager.reconcile(vec![Subscription::from_stream(
            SubscriptionId::of::<u16>(),
            move || {
                futures::stream::iter([1])
                    .chain(futures::stream::once(async move {
                        drop(done_tx);
                        2
                    }))
                    .boxed()
            },
        )]);

        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.shutdown();
        // The stream's sender half is dropped with the task once it exits.
        let res = tokio::time::timeout(Duration::from_secs(1), done_rx).await;
        assert!(res.is_ok(), "blocked producer exited after cancellation");
    }
}
