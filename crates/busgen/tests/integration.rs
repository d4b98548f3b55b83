pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use busgen::{Bus, BusError, panic_message};
    use std::future;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    async fn expect_signals(signals: &mut mpsc::UnboundedReceiver<()>, count: usize) {
        for _ in 0..count {
            timeout(WAIT, signals.recv())
                .await
                .expect("timed out waiting for delivery")
                .expect("signal channel closed");
        }
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = Bus::<Note>::new(0).unwrap_err();
        assert!(matches!(err, BusError::InvalidCapacity { .. }));
        assert!(err.to_string().contains("capacity must be >= 1"));
    }

    #[test]
    fn test_overflow_is_dropped_not_blocked() {
        let bus = Bus::<Note>::new(2).unwrap();
        let published = log();
        let dropped = log();

        let sink = published.clone();
        bus.on_publish(move |event, note| sink.lock().push((event, note.clone())));
        let sink = dropped.clone();
        bus.on_drop(move |event, note| sink.lock().push((event, note.clone())));

        for id in 0..5 {
            bus.publish(Note::Created(id));
        }

        assert_eq!(
            *published.lock(),
            [(Topic::Created, Note::Created(0)), (Topic::Created, Note::Created(1))]
        );
        assert_eq!(dropped.lock().len(), 3);
        assert_eq!(dropped.lock()[0], (Topic::Created, Note::Created(2)));
    }

    #[test]
    fn test_subscribe_hook_runs_before_return() {
        let bus = Bus::<Note>::new(1).unwrap();
        let seen = log();
        let sink = seen.clone();
        bus.on_subscribe(move |event| sink.lock().push(event));

        bus.subscribe(Topic::Shipped, |_| {});
        assert_eq!(*seen.lock(), [Topic::Shipped]);

        bus.subscribe(Topic::Created, |_| {});
        bus.subscribe(Topic::Shipped, |_| {});
        assert_eq!(*seen.lock(), [Topic::Shipped, Topic::Created, Topic::Shipped]);
    }

    #[tokio::test]
    async fn test_fifo_delivery_in_registration_order() {
        let bus = Bus::<Note>::new(16).unwrap();
        let seen = log();
        let (signal, mut signals) = mpsc::unbounded_channel();

        let sink = seen.clone();
        bus.subscribe(Topic::Created, move |note| sink.lock().push(("first", note.clone())));
        let sink = seen.clone();
        bus.subscribe(Topic::Created, move |note| {
            sink.lock().push(("second", note.clone()));
            let _ = signal.send(());
        });

        let dispatcher = Dispatcher::spawn(&bus);
        bus.publish(Note::Created(1));
        bus.publish(Note::Shipped(99));
        bus.publish(Note::Created(2));

        expect_signals(&mut signals, 2).await;
        dispatcher.stop().await.unwrap();

        assert_eq!(
            *seen.lock(),
            [
                ("first", Note::Created(1)),
                ("second", Note::Created(1)),
                ("first", Note::Created(2)),
                ("second", Note::Created(2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_panicking_handler_is_isolated() {
        let bus = Bus::<Note>::new(8).unwrap();
        let fragile = log();
        let sturdy = log();
        let faults = log();
        let (signal, mut signals) = mpsc::unbounded_channel();

        let sink = fragile.clone();
        bus.subscribe(Topic::Created, move |note| {
            assert!(*note != Note::Created(1), "boom on {note:?}");
            sink.lock().push(note.clone());
        });
        let sink = sturdy.clone();
        bus.subscribe(Topic::Created, move |note| {
            sink.lock().push(note.clone());
            let _ = signal.send(());
        });
        let sink = faults.clone();
        bus.on_panic(move |event, note, fault| {
            sink.lock().push((event, note.clone(), panic_message(fault).map(str::to_owned)));
        });

        let dispatcher = Dispatcher::spawn(&bus);
        bus.publish(Note::Created(1));
        bus.publish(Note::Created(2));

        expect_signals(&mut signals, 2).await;
        dispatcher.stop().await.unwrap();

        assert_eq!(*fragile.lock(), [Note::Created(2)]);
        assert_eq!(*sturdy.lock(), [Note::Created(1), Note::Created(2)]);
        assert_eq!(
            *faults.lock(),
            [(Topic::Created, Note::Created(1), Some("boom on Created(1)".to_owned()))]
        );
    }

    #[tokio::test]
    async fn test_panicking_panic_hook_is_swallowed() {
        let bus = Bus::<Note>::new(8).unwrap();
        let (signal, mut signals) = mpsc::unbounded_channel();
        let hook_calls = Arc::new(AtomicUsize::new(0));

        bus.subscribe(Topic::Shipped, |_| panic!("handler failed"));
        bus.subscribe(Topic::Created, move |_| {
            let _ = signal.send(());
        });
        let calls = hook_calls.clone();
        bus.on_panic(move |_, _, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            panic!("hook failed too");
        });

        let dispatcher = Dispatcher::spawn(&bus);
        bus.publish(Note::Shipped(1));
        bus.publish(Note::Created(2));

        expect_signals(&mut signals, 1).await;
        dispatcher.stop().await.unwrap();
        assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_discards_queue_and_closes_it() {
        let bus = Bus::<Note>::new(4).unwrap();
        let delivered = Arc::new(AtomicUsize::new(0));
        let dropped = log();

        let count = delivered.clone();
        bus.subscribe(Topic::Created, move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });
        let sink = dropped.clone();
        bus.on_drop(move |_, note| sink.lock().push(note.clone()));

        bus.publish(Note::Created(1));
        bus.publish(Note::Created(2));

        // Shutdown is already complete, so nothing is dequeued.
        bus.run(future::ready(())).await.unwrap();
        assert_eq!(delivered.load(Ordering::SeqCst), 0);

        bus.publish(Note::Created(3));
        assert_eq!(*dropped.lock(), [Note::Created(3)]);
    }

    #[tokio::test]
    async fn test_second_dispatcher_is_rejected() {
        let bus = Bus::<Note>::new(4).unwrap();
        let dispatcher = Dispatcher::spawn(&bus);
        tokio::task::yield_now().await;

        // Either the spawned task owns the queue, or it has not polled yet and this
        // call takes it; both ways exactly one dispatcher may run.
        let concurrent = bus.run(future::ready(())).await;
        let first = dispatcher.stop().await;
        assert!(concurrent.is_err() ^ first.is_err());

        let later = bus.run(future::ready(())).await;
        assert!(matches!(later, Err(BusError::DispatcherUnavailable { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishers_share_capacity() {
        let bus = Bus::<Note>::new(50).unwrap();
        let published = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicUsize::new(0));

        let count = published.clone();
        bus.on_publish(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        });
        let count = dropped.clone();
        bus.on_drop(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        });

        let publishers: Vec<_> = (0..4_u64)
            .map(|task| {
                let bus = bus.clone();
                tokio::spawn(async move {
                    for id in 0..25 {
                        bus.publish(Note::Shipped(task * 100 + id));
                    }
                })
            })
            .collect();
        for publisher in publishers {
            publisher.await.unwrap();
        }

        assert_eq!(published.load(Ordering::SeqCst), 50);
        assert_eq!(dropped.load(Ordering::SeqCst), 50);
        assert_eq!(bus.len(), 50);
    }
}
