#![allow(dead_code, unreachable_pub)]

use busgen::{Bus, BusError, Message};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Created,
    Shipped,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "order.created",
            Self::Shipped => "order.shipped",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    Created(u64),
    Shipped(u64),
}

impl Message for Note {
    type Event = Topic;

    fn event(&self) -> Topic {
        match self {
            Self::Created(_) => Topic::Created,
            Self::Shipped(_) => Topic::Shipped,
        }
    }
}

pub type Log<T> = Arc<Mutex<Vec<T>>>;

pub fn log<T>() -> Log<T> {
    Arc::new(Mutex::new(Vec::new()))
}

/// A running dispatcher and the switch that stops it.
#[derive(Debug)]
pub struct Dispatcher {
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), BusError>>,
}

impl Dispatcher {
    pub fn spawn(bus: &Bus<Note>) -> Self {
        let bus = bus.clone();
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            bus.run(async {
                let _ = stopped.await;
            })
            .await
        });
        Self { stop, task }
    }

    pub async fn stop(self) -> Result<(), BusError> {
        let _ = self.stop.send(());
        self.task.await.expect("dispatcher task panicked")
    }
}
