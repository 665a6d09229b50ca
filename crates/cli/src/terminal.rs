//! Terminal implementations of the presentation ports.

use std::sync::atomic::{AtomicU64, Ordering};

use media::{
    ImageManagerVisibility, LoadingHandle, NotificationKind, NotificationPort, NotificationRequest,
    TitleSource, CANCEL_BUTTON_CLASS, CONFIRM_BUTTON_CLASS,
};

/// Prints notifications and answers confirmations with an interactive prompt.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    next_handle: AtomicU64,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationPort for TerminalNotifier {
    fn notify(&self, request: NotificationRequest) {
        match request.kind {
            NotificationKind::Success => println!("✓ {}", request.message),
            NotificationKind::Error => eprintln!("✗ {}", request.message),
            NotificationKind::Confirm => {
                let confirmed = inquire::Confirm::new(&request.message)
                    .with_default(false)
                    .prompt()
                    .unwrap_or_else(|err| {
                        tracing::debug!(error = %err, "Confirmation prompt aborted");
                        false
                    });
                let class = if confirmed {
                    CONFIRM_BUTTON_CLASS
                } else {
                    CANCEL_BUTTON_CLASS
                };
                if let Some(button) = request.button(class) {
                    button.press();
                }
            }
        }
    }

    fn show_loading(&self, message: &str) -> LoadingHandle {
        eprintln!("{message}");
        LoadingHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn hide_loading(&self, handle: LoadingHandle) {
        tracing::trace!(handle = handle.as_u64(), "Loading finished");
    }
}

/// The CLI has no image manager panel; availability is only logged.
#[derive(Debug, Default)]
pub struct LoggedVisibility;

impl ImageManagerVisibility for LoggedVisibility {
    fn set_visible(&self, visible: bool) {
        tracing::info!(available = visible, "Image management availability changed");
    }
}

/// Title supplied on the command line.
#[derive(Debug)]
pub struct ArgumentTitle(pub Option<String>);

impl TitleSource for ArgumentTitle {
    fn current_title(&self) -> Option<String> {
        self.0.clone()
    }
}
