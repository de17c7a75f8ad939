use grove_app::facade::{Notification, NotificationLevel, Notifier};

/// Prints notifications to stderr so stdout carries only the cart.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let mark = match notification.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Failure => "✗",
        };

        eprintln!("{mark} {}", notification.message);
    }
}
