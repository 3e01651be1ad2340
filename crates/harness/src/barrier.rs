//! Single-shot rendezvous between workers
//!
//! A [`Barrier`] is a latch: `signal` flips it once and wakes every waiter,
//! `wait` blocks until it has been flipped. A signal that arrives before the
//! wait is not lost, and signaling twice is harmless.
//!
//! Workers hold [`SignalOnDrop`] guards or [`Party`] handles so that a worker
//! failing before its interleaving point still releases its peer.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Single-use signal/await latch
#[derive(Debug, Default)]
pub struct Barrier {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl Barrier {
    /// Create an unsignaled barrier
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unsignaled barrier behind an `Arc`
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Mark arrival and wake every waiter
    ///
    /// Never blocks beyond the internal lock. Idempotent.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock();
        if !*signaled {
            *signaled = true;
            self.cond.notify_all();
        }
    }

    /// Block until the barrier has been signaled
    pub fn wait(&self) {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            self.cond.wait(&mut signaled);
        }
    }

    /// Block until signaled or `timeout` elapses
    ///
    /// Returns true if the barrier was signaled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut signaled = self.signaled.lock();
        while !*signaled {
            if self.cond.wait_until(&mut signaled, deadline).timed_out() {
                return *signaled;
            }
        }
        true
    }

    /// Whether the barrier has been signaled
    pub fn is_signaled(&self) -> bool {
        *self.signaled.lock()
    }

    /// Guard that signals this barrier when dropped
    pub fn signal_on_drop(self: &Arc<Self>) -> SignalOnDrop {
        SignalOnDrop {
            barrier: Arc::clone(self),
        }
    }
}

/// Signals its barrier when dropped
///
/// Holding one ties the signal to the end of a scope, including early
/// returns and unwinding.
#[derive(Debug)]
#[must_use = "the barrier is signaled as soon as the guard is dropped"]
pub struct SignalOnDrop {
    barrier: Arc<Barrier>,
}

impl SignalOnDrop {
    /// Signal now instead of at drop
    pub fn signal(&self) {
        self.barrier.signal();
    }
}

impl Drop for SignalOnDrop {
    fn drop(&mut self) {
        self.barrier.signal();
    }
}

/// Two-phase rendezvous: each side signals its arrival, then waits for the
/// other's
#[derive(Debug)]
pub struct Handshake;

impl Handshake {
    /// Create the two sides of a handshake
    pub fn pair() -> (Party, Party) {
        let left = Barrier::shared();
        let right = Barrier::shared();
        (
            Party {
                mine: Arc::clone(&left),
                theirs: Arc::clone(&right),
            },
            Party {
                mine: right,
                theirs: left,
            },
        )
    }
}

/// One side of a [`Handshake`]
///
/// Dropping a party counts as arriving, so a failed worker never leaves its
/// peer blocked.
#[derive(Debug)]
pub struct Party {
    mine: Arc<Barrier>,
    theirs: Arc<Barrier>,
}

impl Party {
    /// Signal our arrival, then wait for the peer's
    pub fn arrive_and_wait(&self) {
        self.mine.signal();
        self.theirs.wait();
    }

    /// Whether the peer has arrived
    pub fn peer_arrived(&self) -> bool {
        self.theirs.is_signaled()
    }
}

impl Drop for Party {
    fn drop(&mut self) {
        self.mine.signal();
    }
}
