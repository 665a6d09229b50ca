//! User confirmation before destructive operations.
//!
//! A confirmation is a `confirm` [`NotificationRequest`] with two buttons. The
//! presentation layer invokes one of the button actions later; whichever fires
//! first resolves the confirmation and every later press is ignored, so exactly
//! one outcome is delivered at most once.

use std::sync::Arc;

use futures::channel::oneshot;
use parking_lot::Mutex;
use tracing::debug;

use crate::ports::NotificationPort;
use crate::types::{NotificationButton, NotificationRequest, CANCEL_BUTTON_CLASS, CONFIRM_BUTTON_CLASS};

type Outcome = Box<dyn FnOnce(bool) + Send>;

/// Asks the user a yes/no question through the [`NotificationPort`].
#[derive(Clone)]
pub struct ConfirmationGate {
    notifier: Arc<dyn NotificationPort>,
}

impl ConfirmationGate {
    /// Creates a gate that asks through `notifier`.
    pub fn new(notifier: Arc<dyn NotificationPort>) -> Self {
        Self { notifier }
    }

    /// Emits the question and returns immediately.
    ///
    /// `on_confirm` runs when the affirmative button is pressed, `on_cancel`
    /// when the negative one is. Only the first press counts.
    pub fn confirm_action(
        &self,
        message: impl Into<String>,
        on_confirm: impl FnOnce() + Send + 'static,
        on_cancel: impl FnOnce() + Send + 'static,
    ) {
        self.ask(
            message.into(),
            Box::new(move |confirmed| {
                if confirmed {
                    on_confirm();
                } else {
                    on_cancel();
                }
            }),
        );
    }

    /// Emits the question and resolves to the user's answer.
    ///
    /// Resolves to `false` if the request is dropped without either button
    /// being pressed.
    pub async fn confirm(&self, message: impl Into<String>) -> bool {
        let (tx, rx) = oneshot::channel();
        self.ask(
            message.into(),
            Box::new(move |confirmed| {
                // The receiver is gone only if the caller stopped waiting.
                let _ = tx.send(confirmed);
            }),
        );
        match rx.await {
            Ok(confirmed) => confirmed,
            Err(oneshot::Canceled) => {
                debug!("Confirmation dismissed without an answer");
                false
            }
        }
    }

    fn ask(&self, message: String, outcome: Outcome) {
        let pending = Arc::new(Mutex::new(Some(outcome)));
        let buttons = vec![
            NotificationButton::new(CONFIRM_BUTTON_CLASS, "Confirm", resolver(&pending, true)),
            NotificationButton::new(CANCEL_BUTTON_CLASS, "Cancel", resolver(&pending, false)),
        ];
        debug!(%message, "Requesting confirmation");
        self.notifier.notify(NotificationRequest::confirm(message, buttons));
    }
}

fn resolver(pending: &Arc<Mutex<Option<Outcome>>>, confirmed: bool) -> impl Fn() + Send + Sync {
    let pending = Arc::clone(pending);
    move || {
        let outcome = pending.lock().take();
        if let Some(outcome) = outcome {
            outcome(confirmed);
        }
    }
}
