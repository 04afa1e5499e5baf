//! Capability interface for bound elements.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use super::{ChangeCallback, Silencer};
use crate::error::Result;
use crate::protocol::UpdateOptions;

/// Boxed future for async hooks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler needs from the element it is bound to.
///
/// Read, write and change subscription are required. `load` and
/// `extension` have defaults.
pub trait ElementBinding: Send + 'static {
    /// Prepare the element before it becomes interactive.
    ///
    /// Runs once during `setup()`, before [`bind_change`](Self::bind_change).
    /// The default completes immediately.
    fn load(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    /// Read the current text value.
    fn get_value(&self) -> Result<String>;

    /// Write a value pushed by the injector.
    ///
    /// `value` is the payload's `text` when it is a string, `options` the
    /// full `setValue` payload (empty if it was not an object). Rejecting a
    /// payload shape is up to the implementation, e.g. with
    /// [`BridgeError::InvalidPayload`](crate::error::BridgeError::InvalidPayload).
    ///
    /// Implementations should make the mutation inside
    /// `silencer.execute_silenced` (or hold a guard from
    /// `silencer.silence()` until the element's change signal has fired) so
    /// the write is not echoed back as a `change`.
    fn set_value(
        &mut self,
        value: Option<&str>,
        options: &UpdateOptions,
        silencer: &Silencer,
    ) -> Result<()>;

    /// Subscribe `on_change` to the element's native change signal.
    ///
    /// It must be called with no arguments on every value change, whether
    /// caused by the user or programmatically.
    fn bind_change(&mut self, on_change: ChangeCallback) -> Result<()>;

    /// Optional capability descriptor reported in `ready`.
    fn extension(&self) -> Option<Value> {
        None
    }
}
