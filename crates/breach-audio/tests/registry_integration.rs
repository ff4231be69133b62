//! Callback Registry Integration Tests
//!
//! Exercises the registry the way the game and the sound engine use it:
//! - Gameplay thread creating and cancelling packages
//! - Engine thread dispatching callbacks concurrently
//! - Object teardown with callbacks in flight

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, OnceLock};
use std::thread;
use std::time::Duration;

use breach_audio::{
    CallbackFlags, CallbackInfo, CallbackManager, CallbackManagerConfig, CallbackTarget,
    CallbackType, Cookie, DelegateDelivery, EventDelegate,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn immediate_manager() -> Arc<CallbackManager> {
    Arc::new(CallbackManager::new(
        CallbackManagerConfig::default().delegate_delivery(DelegateDelivery::Immediate),
    ))
}

fn counting_delegate() -> (EventDelegate, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let delegate = EventDelegate::new(move |_, _| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    (delegate, count)
}

fn noop(_: CallbackType, _: &CallbackInfo, _: Cookie) {}

// ═══════════════════════════════════════════════════════════════════════════════
// LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_cancel_by_cookie_example() {
    init_logging();
    let manager = immediate_manager();
    manager.register_game_object(42);

    let package = manager.create_callback_package(
        CallbackTarget::function(noop, Cookie(0xABCD)),
        CallbackFlags::END_OF_EVENT,
        42,
        false,
    );
    assert!(manager.has_active_events(42));

    assert_eq!(manager.cancel_event_callback(Cookie(0xABCD)), 1);
    assert!(!manager.has_active_events(42));
    assert!(!manager.remove_callback_package(&package, 42));
}

#[test]
fn test_unregister_then_late_dispatch_example() {
    init_logging();
    let manager = immediate_manager();
    manager.register_game_object(7);

    let (first, first_count) = counting_delegate();
    let (second, second_count) = counting_delegate();
    let packages = [
        manager.create_callback_package(
            CallbackTarget::delegate(first),
            CallbackFlags::END_OF_EVENT | CallbackFlags::MARKER,
            7,
            false,
        ),
        manager.create_callback_package(
            CallbackTarget::delegate(second),
            CallbackFlags::END_OF_EVENT | CallbackFlags::MARKER,
            7,
            false,
        ),
    ];

    assert_eq!(manager.unregister_game_object(7), 2);
    assert!(!manager.has_active_events(7));

    // Late callbacks arrive from the engine thread after teardown
    let engine = {
        let manager = manager.clone();
        thread::spawn(move || {
            let info = CallbackInfo::new(7, 1, 1);
            for package in &packages {
                manager.dispatch(package, CallbackType::Marker, &info);
                manager.dispatch(package, CallbackType::EndOfEvent, &info);
            }
        })
    };
    engine.join().unwrap();

    assert_eq!(first_count.load(Ordering::SeqCst), 0);
    assert_eq!(second_count.load(Ordering::SeqCst), 0);
    assert_eq!(manager.total_package_count(), 0);
}

#[test]
fn test_has_active_events_follows_engine_thread() {
    init_logging();
    let manager = immediate_manager();
    manager.register_game_object(3);

    let packages: Vec<_> = (0..16)
        .map(|i| {
            manager.create_callback_package(
                CallbackTarget::function(noop, Cookie(1000 + i)),
                CallbackFlags::END_OF_EVENT,
                3,
                false,
            )
        })
        .collect();
    assert_eq!(manager.active_package_count(3), 16);

    let (tx, rx) = crossbeam_channel::unbounded();
    for package in packages {
        tx.send(package).unwrap();
    }
    drop(tx);

    let engine = {
        let manager = manager.clone();
        thread::spawn(move || {
            for package in rx {
                manager.dispatch(&package, CallbackType::EndOfEvent, &CallbackInfo::new(3, 1, 1));
            }
        })
    };
    engine.join().unwrap();

    assert!(!manager.has_active_events(3));
    assert!(manager.is_registered(3));
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANCEL VS EXECUTE
// ═══════════════════════════════════════════════════════════════════════════════

static IN_FLIGHT_STARTED: AtomicBool = AtomicBool::new(false);
static IN_FLIGHT_FINISHED: AtomicBool = AtomicBool::new(false);

fn slow_handler(_: CallbackType, _: &CallbackInfo, _: Cookie) {
    IN_FLIGHT_STARTED.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    IN_FLIGHT_FINISHED.store(true, Ordering::SeqCst);
}

#[test]
fn test_in_flight_function_callback_completes() {
    init_logging();
    let manager = immediate_manager();
    let package = manager.create_callback_package(
        CallbackTarget::function(slow_handler, Cookie(0x51)),
        CallbackFlags::MARKER,
        11,
        false,
    );

    let engine = {
        let manager = manager.clone();
        let package = package.clone();
        thread::spawn(move || {
            manager.dispatch(&package, CallbackType::Marker, &CallbackInfo::default());
        })
    };

    while !IN_FLIGHT_STARTED.load(Ordering::SeqCst) {
        thread::yield_now();
    }

    // Blocks until the running callback returns
    assert_eq!(manager.cancel_event_callback(Cookie(0x51)), 1);
    assert!(IN_FLIGHT_FINISHED.load(Ordering::SeqCst));
    engine.join().unwrap();

    assert!(!package.should_execute());
}

static CANCELLED_FIRST_CALLS: AtomicUsize = AtomicUsize::new(0);

fn count_cancelled_first(_: CallbackType, _: &CallbackInfo, _: Cookie) {
    CANCELLED_FIRST_CALLS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_cancel_before_dispatch_never_invokes() {
    init_logging();
    let manager = immediate_manager();
    let package = manager.create_callback_package(
        CallbackTarget::function(count_cancelled_first, Cookie(0x52)),
        CallbackFlags::END_OF_EVENT,
        12,
        false,
    );

    let barrier = Arc::new(Barrier::new(2));
    let engine = {
        let manager = manager.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            manager.dispatch(&package, CallbackType::EndOfEvent, &CallbackInfo::default());
        })
    };

    assert_eq!(manager.cancel_event_callback(Cookie(0x52)), 1);
    barrier.wait();
    engine.join().unwrap();

    assert_eq!(CANCELLED_FIRST_CALLS.load(Ordering::SeqCst), 0);
}

static REENTRANT_MANAGER: OnceLock<Arc<CallbackManager>> = OnceLock::new();
static REENTRANT_CANCELLED: AtomicUsize = AtomicUsize::new(0);

fn cancel_self(_: CallbackType, _: &CallbackInfo, cookie: Cookie) {
    if let Some(manager) = REENTRANT_MANAGER.get() {
        REENTRANT_CANCELLED.fetch_add(manager.cancel_event_callback(cookie), Ordering::SeqCst);
    }
}

#[test]
fn test_handler_may_cancel_its_own_cookie() {
    init_logging();
    let manager = REENTRANT_MANAGER.get_or_init(immediate_manager).clone();
    let package = manager.create_callback_package(
        CallbackTarget::function(cancel_self, Cookie(0x53)),
        CallbackFlags::MARKER,
        13,
        false,
    );

    manager.dispatch(&package, CallbackType::Marker, &CallbackInfo::default());

    assert_eq!(REENTRANT_CANCELLED.load(Ordering::SeqCst), 1);
    assert!(!package.should_execute());
    assert!(!manager.has_active_events(13));
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRESS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_concurrent_dispatch_and_cancel_accounting() {
    init_logging();
    const OBJECTS: u64 = 4;
    const PER_OBJECT: usize = 250;

    let manager = immediate_manager();
    let invoked = Arc::new(AtomicUsize::new(0));
    let (engine_tx, engine_rx) = crossbeam_channel::unbounded();
    let (cancel_tx, cancel_rx) = crossbeam_channel::unbounded::<EventDelegate>();

    let producers: Vec<_> = (0..OBJECTS)
        .map(|object| {
            let manager = manager.clone();
            let invoked = invoked.clone();
            let engine_tx = engine_tx.clone();
            let cancel_tx = cancel_tx.clone();
            thread::spawn(move || {
                manager.register_game_object(object);
                for i in 0..PER_OBJECT {
                    let invoked = invoked.clone();
                    let delegate = EventDelegate::new(move |_, _| {
                        invoked.fetch_add(1, Ordering::SeqCst);
                    });
                    let package = manager.create_callback_package(
                        CallbackTarget::delegate(delegate.clone()),
                        CallbackFlags::END_OF_EVENT,
                        object,
                        false,
                    );
                    engine_tx.send(package).unwrap();
                    if i % 2 == 0 {
                        cancel_tx.send(delegate).unwrap();
                    }
                }
            })
        })
        .collect();
    drop(engine_tx);
    drop(cancel_tx);

    let engine = {
        let manager = manager.clone();
        thread::spawn(move || {
            for package in engine_rx {
                let info = CallbackInfo::new(package.game_object(), 1, 1);
                manager.dispatch(&package, CallbackType::EndOfEvent, &info);
            }
        })
    };

    let canceller = {
        let manager = manager.clone();
        thread::spawn(move || {
            cancel_rx
                .into_iter()
                .map(|delegate| manager.cancel_event_callback(&delegate))
                .sum::<usize>()
        })
    };

    for producer in producers {
        producer.join().unwrap();
    }
    engine.join().unwrap();
    let cancelled = canceller.join().unwrap();

    // Every package either ran its end of event or was cancelled, never both
    let total = OBJECTS as usize * PER_OBJECT;
    assert_eq!(invoked.load(Ordering::SeqCst) + cancelled, total);
    assert_eq!(manager.total_package_count(), 0);
    for object in 0..OBJECTS {
        assert!(!manager.has_active_events(object));
    }
}

#[test]
fn test_game_thread_delivery_across_threads() {
    init_logging();
    let manager = Arc::new(CallbackManager::new(CallbackManagerConfig::default()));
    let (delegate, count) = counting_delegate();
    let package = manager.create_callback_package(
        CallbackTarget::delegate(delegate),
        CallbackFlags::END_OF_EVENT | CallbackFlags::DURATION,
        20,
        false,
    );

    let engine = {
        let manager = manager.clone();
        thread::spawn(move || {
            let info = CallbackInfo::new(20, 5, 1);
            manager.dispatch(&package, CallbackType::Duration, &info);
            manager.dispatch(&package, CallbackType::EndOfEvent, &info);
        })
    };
    engine.join().unwrap();

    // Nothing ran on the engine thread, the package stays pending until pumped
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(manager.has_active_events(20));

    assert_eq!(manager.pump_game_thread(), 2);
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert!(!manager.has_active_events(20));
}

#[test]
fn test_unregister_before_game_thread_pump() {
    init_logging();
    let manager = Arc::new(CallbackManager::new(CallbackManagerConfig::default()));
    manager.register_game_object(7);
    let (delegate, count) = counting_delegate();
    let package = manager.create_callback_package(
        CallbackTarget::delegate(delegate),
        CallbackFlags::END_OF_EVENT | CallbackFlags::MARKER,
        7,
        false,
    );

    let engine = {
        let manager = manager.clone();
        thread::spawn(move || {
            let info = CallbackInfo::new(7, 3, 1);
            manager.dispatch(&package, CallbackType::Marker, &info);
            manager.dispatch(&package, CallbackType::EndOfEvent, &info);
        })
    };
    engine.join().unwrap();

    // Object torn down on the game thread before its queue is pumped
    assert!(manager.has_active_events(7));
    assert_eq!(manager.unregister_game_object(7), 1);

    assert_eq!(manager.pump_game_thread(), 2);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(manager.total_package_count(), 0);
}

#[test]
fn test_cancel_before_game_thread_pump() {
    init_logging();
    let manager = Arc::new(CallbackManager::new(CallbackManagerConfig::default()));
    let (delegate, count) = counting_delegate();
    let package = manager.create_callback_package(
        CallbackTarget::delegate(delegate.clone()),
        CallbackFlags::END_OF_EVENT,
        21,
        false,
    );

    let engine = {
        let manager = manager.clone();
        thread::spawn(move || {
            manager.dispatch(&package, CallbackType::EndOfEvent, &CallbackInfo::new(21, 4, 1));
        })
    };
    engine.join().unwrap();

    assert_eq!(manager.cancel_event_callback(&delegate), 1);
    assert_eq!(manager.pump_game_thread(), 1);
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!manager.has_active_events(21));
}
