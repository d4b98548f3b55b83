use crate::error::BusError;
use crate::message::{Message, panic_message};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace, warn};

const MIN_CAPACITY: usize = 1;

type Handler<M> = Arc<dyn Fn(&M) + Send + Sync>;
type MessageHook<M> = Arc<dyn Fn(<M as Message>::Event, &M) + Send + Sync>;
type SubscribeHook<M> = Arc<dyn Fn(<M as Message>::Event) + Send + Sync>;
type PanicHook<M> = Arc<dyn Fn(<M as Message>::Event, &M, &(dyn Any + Send)) + Send + Sync>;

struct Hooks<M: Message> {
    on_publish: Option<MessageHook<M>>,
    on_drop: Option<MessageHook<M>>,
    on_subscribe: Option<SubscribeHook<M>>,
    on_panic: Option<PanicHook<M>>,
}

impl<M: Message> Default for Hooks<M> {
    fn default() -> Self {
        Self { on_publish: None, on_drop: None, on_subscribe: None, on_panic: None }
    }
}

struct Inner<M: Message> {
    capacity: usize,
    sender: mpsc::Sender<Arc<M>>,
    receiver: Mutex<Option<mpsc::Receiver<Arc<M>>>>,
    handlers: RwLock<FxHashMap<M::Event, Vec<Handler<M>>>>,
    hooks: RwLock<Hooks<M>>,
}

/// A bounded, single-dispatcher publish/subscribe bus over one closed message type.
///
/// Publishing never blocks: when the queue is full (or closed after the dispatcher
/// stopped) the message is dropped and the `on_drop` hook observes it. One task
/// drives [`Bus::run`], invoking every handler of a message's event in
/// registration order. A panicking handler is isolated and reported through the
/// `on_panic` hook.
///
/// Clones share the same queue, registry and hooks.
///
/// # Examples
/// ```rust
/// use busgen::{Bus, Message};
/// use std::fmt;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// struct Ping;
///
/// impl fmt::Display for Ping {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str("ping")
///     }
/// }
///
/// struct PingMessage(u32);
///
/// impl Message for PingMessage {
///     type Event = Ping;
///
///     fn event(&self) -> Ping {
///         Ping
///     }
/// }
///
/// # fn main() -> Result<(), busgen::BusError> {
/// let bus = Bus::<PingMessage>::new(8)?;
/// bus.subscribe(Ping, |message| assert_eq!(message.0, 1));
/// bus.publish(PingMessage(1));
/// assert_eq!(bus.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Bus<M: Message> {
    inner: Arc<Inner<M>>,
}

impl<M: Message> Bus<M> {
    /// Creates a bus whose queue holds at most `capacity` undelivered messages.
    ///
    /// # Errors
    /// Returns [`BusError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, BusError> {
        let capacity = validate_capacity(capacity)?;
        let (sender, receiver) = mpsc::channel(capacity);
        trace!(capacity, "Initializing bus queue");

        Ok(Self {
            inner: Arc::new(Inner {
                capacity,
                sender,
                receiver: Mutex::new(Some(receiver)),
                handlers: RwLock::new(FxHashMap::default()),
                hooks: RwLock::new(Hooks::default()),
            }),
        })
    }

    /// Enqueues `message` without blocking, or drops it if the queue is full or closed.
    pub fn publish(&self, message: M) {
        let message = Arc::new(message);
        let event = message.event();

        match self.inner.sender.try_send(Arc::clone(&message)) {
            Ok(()) => {
                trace!(%event, "Message queued");
                if let Some(hook) = self.hook(|hooks| hooks.on_publish.clone()) {
                    hook(event, &message);
                }
            },
            Err(err) => {
                let reason = match err {
                    TrySendError::Full(_) => "queue full",
                    TrySendError::Closed(_) => "queue closed",
                };
                debug!(%event, reason, "Message dropped");
                if let Some(hook) = self.hook(|hooks| hooks.on_drop.clone()) {
                    hook(event, &message);
                }
            },
        }
    }

    /// Registers `handler` for `event`, then reports the registration to `on_subscribe`.
    pub fn subscribe<F>(&self, event: M::Event, handler: F)
    where
        F: Fn(&M) + Send + Sync + 'static,
    {
        let count = {
            let mut handlers = self.inner.handlers.write();
            let slot = handlers.entry(event).or_default();
            slot.push(Arc::new(handler));
            slot.len()
        };
        trace!(%event, handlers = count, "Handler registered");

        if let Some(hook) = self.hook(|hooks| hooks.on_subscribe.clone()) {
            hook(event);
        }
    }

    /// Called after a message was accepted by the queue. Replaces any previous hook.
    pub fn on_publish<F>(&self, hook: F)
    where
        F: Fn(M::Event, &M) + Send + Sync + 'static,
    {
        self.inner.hooks.write().on_publish = Some(Arc::new(hook));
    }

    /// Called when a message was dropped because the queue was full or closed.
    pub fn on_drop<F>(&self, hook: F)
    where
        F: Fn(M::Event, &M) + Send + Sync + 'static,
    {
        self.inner.hooks.write().on_drop = Some(Arc::new(hook));
    }

    /// Called after every handler registration, on the registering task.
    pub fn on_subscribe<F>(&self, hook: F)
    where
        F: Fn(M::Event) + Send + Sync + 'static,
    {
        self.inner.hooks.write().on_subscribe = Some(Arc::new(hook));
    }

    /// Called on the dispatcher when a handler panics, with the caught panic value.
    ///
    /// A panic inside this hook is caught and discarded.
    pub fn on_panic<F>(&self, hook: F)
    where
        F: Fn(M::Event, &M, &(dyn Any + Send)) + Send + Sync + 'static,
    {
        self.inner.hooks.write().on_panic = Some(Arc::new(hook));
    }

    /// Drives dispatch until `shutdown` completes.
    ///
    /// Shutdown is observed between messages only. Messages still queued at that
    /// point are discarded and the queue is closed, so later publishes are dropped.
    ///
    /// # Errors
    /// Returns [`BusError::DispatcherUnavailable`] if another dispatcher owns the
    /// queue or a previous one already terminated.
    pub async fn run<S>(&self, shutdown: S) -> Result<(), BusError>
    where
        S: Future<Output = ()>,
    {
        let mut receiver =
            self.inner.receiver.lock().take().ok_or_else(|| BusError::DispatcherUnavailable {
                message: "the queue is owned by another dispatcher or already closed".into(),
                context: Some("Bus::run".into()),
            })?;
        debug!(capacity = self.inner.capacity, "Dispatcher started");

        let mut shutdown = pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                message = receiver.recv() => match message {
                    Some(message) => self.dispatch(&message),
                    None => break,
                },
            }
        }

        receiver.close();
        let discarded = receiver.len();
        drop(receiver);
        debug!(discarded, "Dispatcher stopped");
        Ok(())
    }

    /// Maximum number of undelivered messages.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of messages currently waiting in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sender.max_capacity() - self.inner.sender.capacity()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dispatch(&self, message: &M) {
        let event = message.event();
        let handlers = {
            let registry = self.inner.handlers.read();
            registry.get(&event).cloned().unwrap_or_default()
        };
        trace!(%event, handlers = handlers.len(), "Dispatching message");

        for (index, handler) in handlers.iter().enumerate() {
            let Err(fault) = catch_unwind(AssertUnwindSafe(|| handler(message))) else {
                continue;
            };
            warn!(
                %event,
                handler = index,
                panic = panic_message(fault.as_ref()).unwrap_or("<non-string panic value>"),
                "Handler panicked"
            );

            if let Some(hook) = self.hook(|hooks| hooks.on_panic.clone())
                && catch_unwind(AssertUnwindSafe(|| hook(event, message, fault.as_ref()))).is_err()
            {
                warn!(%event, "Panic hook panicked, ignoring");
            }
        }
    }

    fn hook<H>(&self, select: impl FnOnce(&Hooks<M>) -> Option<H>) -> Option<H> {
        select(&self.inner.hooks.read())
    }
}

impl<M: Message> Clone for Bus<M> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<M: Message> fmt::Debug for Bus<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("capacity", &self.inner.capacity)
            .field("queued", &self.len())
            .field("events", &self.inner.handlers.read().len())
            .field("dispatching", &self.inner.receiver.lock().is_none())
            .finish_non_exhaustive()
    }
}

fn validate_capacity(capacity: usize) -> Result<usize, BusError> {
    if capacity < MIN_CAPACITY {
        return Err(BusError::InvalidCapacity {
            message: format!("capacity must be >= {MIN_CAPACITY}").into(),
            context: Some("Bus::new".into()),
        });
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        A,
        B,
    }

    impl fmt::Display for Kind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Self::A => "a",
                Self::B => "b",
            })
        }
    }

    struct Msg(Kind);

    impl Message for Msg {
        type Event = Kind;

        fn event(&self) -> Kind {
            self.0
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = Bus::<Msg>::new(0).unwrap_err();
        assert!(matches!(err, BusError::InvalidCapacity { .. }));
    }

    #[test]
    fn len_tracks_queued_messages() {
        let bus = Bus::<Msg>::new(2).unwrap();
        assert!(bus.is_empty());

        bus.publish(Msg(Kind::A));
        bus.publish(Msg(Kind::B));
        bus.publish(Msg(Kind::A));

        assert_eq!(bus.len(), 2);
        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn clones_share_the_registry() {
        let bus = Bus::<Msg>::new(1).unwrap();
        let clone = bus.clone();
        clone.subscribe(Kind::A, |_| {});

        assert_eq!(bus.inner.handlers.read().get(&Kind::A).map(Vec::len), Some(1));
        assert!(format!("{bus:?}").contains("events: 1"));
    }
}
