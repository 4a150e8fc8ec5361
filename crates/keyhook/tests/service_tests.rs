//! Tests for the keyboard service lifecycle and delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use keyhook::{
    Bindings, ChannelSource, EventSink, HookError, KeyCombination, KeyboardService, Operation,
    RawEventSource, RawKeyCode, ServiceConfig,
};
use parking_lot::Mutex;

/// A source that can never be started, like a global hook without a display.
struct UnavailableSource;

impl RawEventSource for UnavailableSource {
    fn start(&mut self, _sink: EventSink) -> Result<(), HookError> {
        Err(HookError::Unavailable("no display".into()))
    }

    fn stop(&mut self) {}

    fn is_running(&self) -> bool {
        false
    }
}

/// A source whose `start` waits for the test to let it finish.
struct GatedSource {
    entered: Sender<()>,
    proceed: Receiver<()>,
    running: bool,
    stopped: Arc<AtomicBool>,
}

impl RawEventSource for GatedSource {
    fn start(&mut self, _sink: EventSink) -> Result<(), HookError> {
        let _ = self.entered.send(());
        let _ = self.proceed.recv();
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.stopped.store(true, Ordering::Release);
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

fn recorder(service: &KeyboardService) -> Arc<Mutex<Vec<Operation>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    service.on_operation(move |operation| sink.lock().push(operation));
    seen
}

#[test]
fn test_default_bindings_are_delivered() {
    let (service, mut ui) = KeyboardService::with_context(ServiceConfig::default());
    let seen = recorder(&service);

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    assert!(service.is_running());

    keys.press(RawKeyCode::LeftShift);
    keys.tap(RawKeyCode::F6);
    keys.release(RawKeyCode::LeftShift);
    keys.tap(RawKeyCode::F2);
    keys.tap(RawKeyCode::Delete);
    service.stop();
    assert!(!service.is_running());

    // Nothing runs until the consumer pumps its context.
    assert!(seen.lock().is_empty());
    ui.process_pending();

    assert_eq!(
        *seen.lock(),
        vec![Operation::Rename, Operation::Rename, Operation::Delete]
    );
}

#[test]
fn test_start_twice_is_rejected() {
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::default());

    let (first, _keys) = ChannelSource::new();
    service.start(first).unwrap();

    let (second, _more_keys) = ChannelSource::new();
    assert!(matches!(
        service.start(second),
        Err(HookError::AlreadyRunning)
    ));
}

#[test]
fn test_restart_after_stop() {
    let (service, mut ui) = KeyboardService::with_context(ServiceConfig::default());
    let seen = recorder(&service);

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F5);
    service.stop();

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F8);
    service.stop();

    ui.process_pending();
    assert_eq!(*seen.lock(), vec![Operation::Move, Operation::Delete]);
}

#[test]
fn test_disabled_service_dispatches_nothing() {
    let config = ServiceConfig::builder().start_disabled().build();
    let (service, mut ui) = KeyboardService::with_context(config);
    let seen = recorder(&service);
    assert!(!service.is_enabled());

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F5);
    service.stop();
    ui.process_pending();
    assert!(seen.lock().is_empty());

    service.set_enabled(true);
    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F5);
    service.stop();
    ui.process_pending();
    assert_eq!(*seen.lock(), vec![Operation::Move]);
}

#[test]
fn test_shutdown_is_idempotent_and_final() {
    let (service, mut ui) = KeyboardService::with_context(ServiceConfig::default());
    let seen = recorder(&service);

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();

    assert!(service.shutdown());
    assert!(!service.shutdown());
    assert!(service.is_shut_down());
    assert!(!service.is_running());

    // The sender outlives the source; sends are silently dropped.
    keys.tap(RawKeyCode::F5);
    ui.process_pending();
    assert!(seen.lock().is_empty());

    let (source, _keys) = ChannelSource::new();
    assert!(matches!(service.start(source), Err(HookError::ShutDown)));
}

#[test]
fn test_reload_replaces_bindings() {
    let (service, mut ui) = KeyboardService::with_context(ServiceConfig::default());
    let seen = recorder(&service);

    let report = service.reload(
        &[(Operation::Refresh, "ctrl+r"), (Operation::Copy, "ctrl+nonsense")]
            .into_iter()
            .collect(),
    );
    assert_eq!(report.malformed().count(), 1);
    assert_eq!(service.last_report().malformed().count(), 1);

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F5);
    keys.press(RawKeyCode::RightControl);
    keys.tap(RawKeyCode::R);
    service.stop();
    ui.process_pending();

    assert_eq!(*seen.lock(), vec![Operation::Refresh]);
}

#[test]
fn test_set_binding_reports_conflict() {
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::default());

    let report = service.set_binding(Operation::Refresh, "ctrl+c");
    assert_eq!(report.conflicts().count(), 1);
    assert_eq!(
        service
            .registry()
            .resolve(&KeyCombination::parse("ctrl+c").unwrap().unwrap()),
        Operation::Refresh
    );
    assert_eq!(service.registry().bindings().get(Operation::Refresh), Some("ctrl+c"));
}

#[test]
fn test_disconnect_subscription() {
    let (service, mut ui) = KeyboardService::with_context(ServiceConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = service.on_operation(move |operation| sink.lock().push(operation));
    let combos = Arc::new(Mutex::new(0usize));
    let counter = combos.clone();
    let observed = service.on_combination(move |_| *counter.lock() += 1);

    assert!(service.disconnect(subscription));
    assert!(!service.disconnect(subscription));

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F5);
    service.stop();
    ui.process_pending();

    assert!(seen.lock().is_empty());
    assert_eq!(*combos.lock(), 1);
    assert!(service.disconnect(observed));
}

#[test]
fn test_service_without_keymap_uses_defaults() {
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::default());
    assert_eq!(service.registry().bindings(), Bindings::defaults());
    assert!(service.last_report().is_clean());
}

#[test]
fn test_failed_start_is_reported() {
    let (service, mut ui) = KeyboardService::with_context(ServiceConfig::default());
    let seen = recorder(&service);

    match service.start(UnavailableSource) {
        Err(HookError::Unavailable(reason)) => assert_eq!(reason, "no display"),
        other => panic!("unexpected start result: {other:?}"),
    }
    assert!(!service.is_running());

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F5);
    service.stop();
    ui.process_pending();

    assert_eq!(*seen.lock(), vec![Operation::Move]);
}

#[test]
fn test_shutdown_during_start_stops_the_source() {
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::default());
    let (entered_tx, entered_rx) = crossbeam_channel::bounded(1);
    let (proceed_tx, proceed_rx) = crossbeam_channel::bounded(1);
    let stopped = Arc::new(AtomicBool::new(false));
    let source = GatedSource {
        entered: entered_tx,
        proceed: proceed_rx,
        running: false,
        stopped: stopped.clone(),
    };

    thread::scope(|scope| {
        let starter = scope.spawn(|| service.start(source));
        entered_rx.recv_timeout(Duration::from_secs(2)).unwrap();

        let closer = scope.spawn(|| service.shutdown());
        while !service.is_shut_down() {
            thread::yield_now();
        }
        proceed_tx.send(()).unwrap();

        assert!(matches!(starter.join().unwrap(), Err(HookError::ShutDown)));
        assert!(closer.join().unwrap());
    });

    assert!(stopped.load(Ordering::Acquire));
    assert!(!service.is_running());
}

#[test]
fn test_repeated_shutdown_still_stops() {
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::default());
    assert!(service.shutdown());
    assert!(!service.shutdown());
    assert!(!service.is_running());
}
