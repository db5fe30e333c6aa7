//! Open/closed lifecycle of a picker.
//!
//! A picker is resolved exactly once, by either [`ModalController::cancel`] or
//! [`ModalController::confirm`]. Both are terminal. Closing revokes the
//! picker's [`Liveness`] so background fetches started while it was open stop
//! delivering results.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;
use variant_picker_core::VariantKey;

use crate::error::PickerError;

/// Callback receiving the picker's result.
pub type OnClose = Box<dyn FnOnce(Vec<VariantKey>) + Send>;

/// Why a picker closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Cancelled,
    Confirmed,
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Open,
    Closed(CloseReason),
}

/// Shared flag telling background work whether its picker is still open.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the open/closed state and the caller's completion callback.
pub struct ModalController {
    state: ModalState,
    on_close: Option<OnClose>,
    liveness: Liveness,
}

impl fmt::Debug for ModalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalController")
            .field("state", &self.state)
            .field("liveness", &self.liveness)
            .finish_non_exhaustive()
    }
}

impl ModalController {
    /// Open a new modal that will resolve through `on_close`.
    #[must_use]
    pub fn open(on_close: OnClose) -> Self {
        Self {
            state: ModalState::Open,
            on_close: Some(on_close),
            liveness: Liveness::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> ModalState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open)
    }

    /// Token for background work scoped to this modal.
    #[must_use]
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Fail with [`PickerError::Closed`] unless the modal is open.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`] once the modal has been resolved.
    pub fn ensure_open(&self) -> Result<(), PickerError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(PickerError::Closed)
        }
    }

    /// Resolve with an empty result, whatever was selected.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`] if the modal was already resolved.
    pub fn cancel(&mut self) -> Result<(), PickerError> {
        self.close(CloseReason::Cancelled, Vec::new())
    }

    /// Resolve with `selection`.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`] if the modal was already resolved.
    pub fn confirm(&mut self, selection: Vec<VariantKey>) -> Result<(), PickerError> {
        self.close(CloseReason::Confirmed, selection)
    }

    fn close(&mut self, reason: CloseReason, result: Vec<VariantKey>) -> Result<(), PickerError> {
        self.ensure_open()?;
        let on_close = self.on_close.take().ok_or(PickerError::Closed)?;

        self.state = ModalState::Closed(reason);
        self.liveness.revoke();
        info!(reason = ?reason, selected = result.len(), "picker closed");

        on_close(result);
        Ok(())
    }
}
