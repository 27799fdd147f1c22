//! User-facing notices for rejected cart operations.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// The fixed set of notices a cart operation can raise.
///
/// Only the category is part of the contract; [`CartNotice::message`] is a
/// default English rendering for sinks without their own translations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartNotice {
    StockExceeded,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl CartNotice {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartNotice::StockExceeded => "stock_exceeded",
            CartNotice::AddFailed => "add_failed",
            CartNotice::RemoveFailed => "remove_failed",
            CartNotice::UpdateFailed => "update_failed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CartNotice::StockExceeded => "Requested quantity is out of stock",
            CartNotice::AddFailed => "Error adding product",
            CartNotice::RemoveFailed => "Error removing product",
            CartNotice::UpdateFailed => "Error updating product quantity",
        }
    }
}

impl core::fmt::Display for CartNotice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Sink for notices (a toast, a status bar, a log line).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: CartNotice);
}

/// Writes notices to the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: CartNotice) {
        tracing::warn!(notice = notice.as_str(), "{}", notice.message());
    }
}

/// Collects notices so a UI loop can drain and render them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<CartNotice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices raised so far, oldest first.
    pub fn notices(&self) -> Vec<CartNotice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return every pending notice.
    pub fn drain(&self) -> Vec<CartNotice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: CartNotice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
