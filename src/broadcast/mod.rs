//! System-wide environment-change notification.
//!
//! After a PATH write, already-running processes only learn about the
//! change if someone tells them. The notifier sends the host OS's
//! environment-change message to every top-level window with a bounded
//! per-recipient timeout, so one hung window cannot stall the operation.
//!
//! The mechanism is inherently advisory: shells that never process the
//! message keep their stale value until restarted. Delivery is therefore
//! fire-and-forget: partial delivery counts as success, and total
//! failure is logged, never raised.

#[cfg(windows)]
pub mod windows;

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default per-recipient delivery timeout in milliseconds.
pub const DEFAULT_BROADCAST_TIMEOUT_MS: u32 = 5_000;

/// Fire-and-forget notification that environment variables changed.
///
/// `notify` must never block beyond its bounded timeout and must never
/// fail at the API surface.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self);
}

/// Notifier that does nothing. Used in tests, dry runs, and non-Windows
/// builds where no broadcast mechanism exists.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    fn notify(&self) {}
}

/// Notifier that counts invocations. Test double for asserting that
/// operations broadcast exactly when they mutate.
#[derive(Debug, Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
}

impl CountingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `notify` has been called.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ChangeNotifier for CountingNotifier {
    fn notify(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// The notifier for the platform this process runs on.
#[cfg(windows)]
pub fn platform_notifier(timeout_ms: u32) -> std::sync::Arc<dyn ChangeNotifier> {
    std::sync::Arc::new(windows::SettingChangeBroadcast::new(timeout_ms))
}

#[cfg(not(windows))]
pub fn platform_notifier(_timeout_ms: u32) -> std::sync::Arc<dyn ChangeNotifier> {
    std::sync::Arc::new(NullNotifier)
}
