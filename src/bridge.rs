//! Message bridge between the view and the host controller.
//!
//! The view only ever holds a [`UiBridge`], which offers two verbs: `send` a
//! message to the host on a named channel and `receive` messages the host
//! posts on a named channel. The host side holds the [`HostEndpoint`].

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

pub mod channels {
    pub const DOWNLOAD: &str = "download";
    pub const DOWNLOAD_PROGRESS: &str = "download-progress";
    pub const DOWNLOAD_COMPLETE: &str = "download-complete";
    pub const DOWNLOAD_ERROR: &str = "download-error";
}

/// A message on a named channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub channel: String,
    pub args: Vec<Value>,
}

impl Envelope {
    pub fn new(channel: &str, payload: impl Serialize) -> Self {
        let arg = serde_json::to_value(payload).unwrap_or_else(|e| {
            log::error!("Could not encode payload for {}: {}", channel, e);
            Value::Null
        });

        Self {
            channel: channel.to_string(),
            args: vec![arg],
        }
    }
}

type Listener<E> = Box<dyn Fn(&[Value]) -> Option<E>>;

/// View-side half of the bridge.
pub struct UiBridge<E> {
    outbox: mpsc::UnboundedSender<Envelope>,
    listeners: HashMap<String, Vec<Listener<E>>>,
}

/// Host-side half of the bridge.
pub struct HostEndpoint {
    inbox: mpsc::UnboundedReceiver<Envelope>,
}

/// Creates a connected pair.
pub fn channel<E>() -> (UiBridge<E>, HostEndpoint) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        UiBridge {
            outbox: tx,
            listeners: HashMap::new(),
        },
        HostEndpoint { inbox: rx },
    )
}

impl<E> UiBridge<E> {
    /// Posts `data` to the host. Fire-and-forget.
    pub fn send(&self, channel: &str, data: impl Serialize) {
        if self.outbox.send(Envelope::new(channel, data)).is_err() {
            log::warn!("Host is gone, dropping message on {}", channel);
        }
    }

    /// Registers a persistent listener for messages the host posts on `channel`.
    pub fn receive(&mut self, channel: &str, handler: impl Fn(&[Value]) -> Option<E> + 'static) {
        self.listeners
            .entry(channel.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// Runs every listener of the envelope's channel, in registration order.
    pub fn deliver(&self, envelope: &Envelope) -> Vec<E> {
        match self.listeners.get(&envelope.channel) {
            Some(listeners) => listeners
                .iter()
                .filter_map(|listener| listener(&envelope.args))
                .collect(),
            None => {
                log::debug!("No listener on {}", envelope.channel);
                Vec::new()
            }
        }
    }
}

impl HostEndpoint {
    /// Takes every message the view has sent so far, oldest first.
    pub fn drain(&mut self) -> Vec<Envelope> {
        let mut pending = Vec::new();
        while let Ok(envelope) = self.inbox.try_recv() {
            pending.push(envelope);
        }
        pending
    }

    pub fn post(&self, channel: &str, payload: impl Serialize) -> Envelope {
        Envelope::new(channel, payload)
    }
}
