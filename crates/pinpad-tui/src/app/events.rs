//! Event handling for the TUI

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use pinpad_core::{LocalAuthResolution, PendingLocalAuth};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Events produced off the UI thread
#[derive(Debug)]
pub enum Event {
    /// A biometric attempt finished
    LocalAuth(LocalAuthResolution),
}

/// Bridges async work back into the synchronous draw loop
pub struct EventHandler {
    /// Sender for events
    sender: mpsc::UnboundedSender<Event>,
    /// Receiver for events
    receiver: mpsc::UnboundedReceiver<Event>,
    /// Runtime biometric prompts run on
    runtime: Handle,
}

impl EventHandler {
    pub fn new(runtime: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            runtime,
        }
    }

    /// Run a biometric attempt on the runtime and post its resolution
    pub fn spawn_local_auth(&self, pending: PendingLocalAuth) {
        let sender = self.sender.clone();
        tracing::debug!(ticket = ?pending.ticket(), "spawning local auth");
        self.runtime.spawn(async move {
            let resolution = pending.run().await;
            // Receiver gone means the app is shutting down
            let _ = sender.send(Event::LocalAuth(resolution));
        });
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Receive the next event
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

/// Poll for a key press with timeout
pub fn poll_keyboard(timeout: Duration) -> std::io::Result<Option<KeyEvent>> {
    if event::poll(timeout)? {
        if let CrosstermEvent::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(Some(key));
            }
        }
    }
    Ok(None)
}
