//! Silencing of change notifications.
//!
//! When the injector pushes a value into the element, the element fires its
//! own change signal. Echoing that back as a `change` envelope would make
//! the injector re-fetch, push again, and so on. Programmatic mutations are
//! therefore made while a [`SilenceGuard`] is held, and the change callback
//! is wrapped so that it drops calls while any guard is alive.
//!
//! Guards nest and are released on drop, so early returns, `?` and panics
//! inside a silenced scope all leave the handler unsilenced afterwards.
//!
//! # Example
//!
//! ```
//! use injector_bridge::handler::Silencer;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let silencer = Silencer::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = hits.clone();
//! let on_change = silencer.wrap(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! silencer.execute_silenced(|| on_change.notify());
//! on_change.notify();
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared silencing state of one handler.
///
/// Cloning yields another view of the same state.
#[derive(Clone, Default)]
pub struct Silencer {
    /// Number of live guards.
    depth: Arc<AtomicUsize>,
}

impl Silencer {
    /// Create an unsilenced state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any guard is currently held.
    #[inline]
    pub fn is_silenced(&self) -> bool {
        self.depth.load(Ordering::Acquire) > 0
    }

    /// Acquire a guard. Silenced until it (and every other guard) is dropped.
    ///
    /// The guard is owned, so it can be moved into async work that waits for
    /// a late change signal before releasing.
    pub fn silence(&self) -> SilenceGuard {
        self.depth.fetch_add(1, Ordering::AcqRel);
        SilenceGuard {
            depth: self.depth.clone(),
        }
    }

    /// Run `f` with a guard held.
    pub fn execute_silenced<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.silence();
        f()
    }

    /// Wrap `f` so that it only runs while unsilenced.
    ///
    /// Calls made during a silenced scope are dropped, not replayed later.
    pub fn wrap<F>(&self, f: F) -> ChangeCallback
    where
        F: Fn() + Send + Sync + 'static,
    {
        let silencer = self.clone();
        ChangeCallback::new(move || {
            if silencer.is_silenced() {
                tracing::trace!("Change suppressed while silenced");
                return;
            }
            f();
        })
    }
}

impl fmt::Debug for Silencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Silencer")
            .field("depth", &self.depth.load(Ordering::Acquire))
            .finish()
    }
}

/// Scoped silence. Dropping it releases one level.
#[must_use = "silencing ends as soon as the guard is dropped"]
pub struct SilenceGuard {
    depth: Arc<AtomicUsize>,
}

impl Drop for SilenceGuard {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for SilenceGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SilenceGuard").finish_non_exhaustive()
    }
}

/// Argument-less callback an element invokes whenever its value changes.
#[derive(Clone)]
pub struct ChangeCallback {
    f: Arc<dyn Fn() + Send + Sync>,
}

impl ChangeCallback {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Signal a change.
    #[inline]
    pub fn notify(&self) {
        (self.f)()
    }
}

impl fmt::Debug for ChangeCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeCallback").finish_non_exhaustive()
    }
}
