//! Desktop notifications for finished sessions.

use crate::timer::Notification;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::warn;

pub fn spawn_desktop_notifier(mut events: broadcast::Receiver<Notification>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(notification) => {
                    // notify-rust blocks on the notification daemon.
                    tokio::task::spawn_blocking(move || send_notification(&notification));
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "desktop notifier fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn send_notification(notification: &Notification) {
    if let Err(e) = notify_rust::Notification::new()
        .summary(&notification.title)
        .body(&notification.message)
        .appname("cadence")
        .show()
    {
        warn!("Failed to send notification: {}", e);
    }
}
