//! Session lock
//!
//! A timeout-driven state machine gating access to an authenticated
//! ring. A background ticking thread compares wall-clock time to the
//! session expiry and flips `Unlocked` to `LockedTimedOut` on its own;
//! the foreground only ever reads the guarded state, never the thread.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;

use crate::ring::Ring;

/// How often the ticking thread re-checks the expiry
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Session lock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No password validated yet
    Unauthenticated,
    /// Authenticated until `expiry`
    Unlocked { expiry: DateTime<Utc> },
    /// Expired or explicitly locked; re-validation required
    LockedTimedOut,
}

struct Shared {
    state: SessionState,
    shutdown: bool,
}

/// Timeout worker wrapping an authenticated session
pub struct SessionLock {
    shared: Arc<(Mutex<Shared>, Condvar)>,
    timeout: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SessionLock {
    /// Start the lock in `Unauthenticated` state and spawn the ticking
    /// thread. `timeout` is the inactivity window applied on each
    /// `restart_timeout`.
    pub fn start(timeout: Duration) -> Self {
        let shared = Arc::new((
            Mutex::new(Shared {
                state: SessionState::Unauthenticated,
                shutdown: false,
            }),
            Condvar::new(),
        ));

        let ticker = Arc::clone(&shared);
        let handle = std::thread::spawn(move || {
            let (lock, cvar) = &*ticker;
            let mut guard = lock.lock().unwrap();
            loop {
                if guard.shutdown {
                    break;
                }
                if let SessionState::Unlocked { expiry } = guard.state {
                    if Utc::now() >= expiry {
                        debug!("session timed out");
                        guard.state = SessionState::LockedTimedOut;
                    }
                }
                let (next, _) = cvar.wait_timeout(guard, TICK_INTERVAL).unwrap();
                guard = next;
            }
        });

        Self {
            shared,
            timeout,
            handle: Some(handle),
        }
    }

    /// Move to `Unlocked` with a fresh expiry of now + timeout
    ///
    /// Called after every successful password validation and on user
    /// activity; while already unlocked it simply advances the expiry.
    pub fn restart_timeout(&self) {
        let (lock, _) = &*self.shared;
        let mut guard = lock.lock().unwrap();
        let expiry = Utc::now()
            + chrono::Duration::from_std(self.timeout).unwrap_or(chrono::Duration::seconds(60));
        guard.state = SessionState::Unlocked { expiry };
    }

    /// Force `LockedTimedOut` immediately
    ///
    /// Used for real expiry and for failed authentication attempts,
    /// which lock the session the same way a timeout does.
    pub fn set_timeout(&self) {
        let (lock, _) = &*self.shared;
        lock.lock().unwrap().state = SessionState::LockedTimedOut;
    }

    /// Current expiry, or `None` when not unlocked
    ///
    /// Callers must check this before acting on secret data.
    pub fn get_end_date(&self) -> Option<DateTime<Utc>> {
        match self.state() {
            SessionState::Unlocked { expiry } => Some(expiry),
            _ => None,
        }
    }

    pub fn state(&self) -> SessionState {
        let (lock, _) = &*self.shared;
        lock.lock().unwrap().state
    }

    pub fn is_locked(&self) -> bool {
        self.get_end_date().is_none()
    }

    /// Validate a password against a ring and update the lock state:
    /// success restarts the timeout, failure locks the session.
    pub fn authenticate(&self, ring: &mut Ring, password: &str) -> bool {
        if ring.validate_password(password) {
            self.restart_timeout();
            true
        } else {
            self.set_timeout();
            false
        }
    }

    /// Stop the ticking thread; safe to call more than once
    pub fn stop(&mut self) {
        let (lock, cvar) = &*self.shared;
        {
            let mut guard = lock.lock().unwrap();
            guard.shutdown = true;
        }
        cvar.notify_all();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        self.stop();
    }
}
