//! Barrier Tests
//!
//! Rendezvous behaviour across real threads.

use skewcheck_harness::{Barrier, Handshake};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn one_signal_releases_every_waiter() {
    let barrier = Barrier::shared();
    let released = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                barrier.wait();
                released.fetch_add(1, Ordering::SeqCst);
            });
        }
        thread::sleep(Duration::from_millis(20));
        assert_eq!(released.load(Ordering::SeqCst), 0);
        barrier.signal();
    });

    assert_eq!(released.load(Ordering::SeqCst), 8);
}

#[test]
fn wait_times_out_without_signal() {
    let barrier = Barrier::new();
    assert!(!barrier.wait_timeout(Duration::from_millis(10)));
    barrier.signal();
    assert!(barrier.wait_timeout(Duration::from_millis(10)));
}

#[test]
fn guard_signals_when_its_thread_panics() {
    let barrier = Barrier::shared();
    let guard = barrier.signal_on_drop();

    let handle = thread::spawn(move || {
        let _guard = guard;
        panic!("worker failed before its interleaving point");
    });
    assert!(handle.join().is_err());
    assert!(barrier.wait_timeout(Duration::from_secs(5)));
}

#[test]
fn handshake_orders_both_sides() {
    let (left, right) = Handshake::pair();
    let order = Arc::new(AtomicUsize::new(0));

    thread::scope(|s| {
        let order_left = Arc::clone(&order);
        s.spawn(move || {
            order_left.fetch_add(1, Ordering::SeqCst);
            left.arrive_and_wait();
            assert_eq!(order_left.load(Ordering::SeqCst), 2);
        });
        s.spawn(|| {
            thread::sleep(Duration::from_millis(10));
            order.fetch_add(1, Ordering::SeqCst);
            right.arrive_and_wait();
        });
    });
}

#[test]
fn dropped_party_releases_its_peer() {
    let (left, right) = Handshake::pair();
    thread::spawn(move || drop(left)).join().unwrap();
    right.arrive_and_wait();
    assert!(right.peer_arrived());
}
