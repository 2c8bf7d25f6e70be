//! Host-to-watch messaging channel.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

use crate::{
    error::BridgeError,
    model::{InboundMessage, OutboundMessage},
};

/// Something that can deliver a dictionary to the watch.
#[async_trait]
pub trait DeviceBridge: Send + Sync + Debug {
    async fn send(&self, message: &OutboundMessage) -> Result<(), BridgeError>;
}

/// Inbound triggers raised by the bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum BridgeEvent {
    /// The watch link came up.
    Ready,
    /// The watch sent a dictionary.
    #[serde(rename = "appmessage")]
    AppMessage {
        #[serde(default)]
        payload: InboundMessage,
    },
}

impl BridgeEvent {
    /// Decode one JSON line, e.g. `{"event":"ready"}`.
    pub fn from_json_line(line: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(line).map_err(BridgeError::Decode)
    }
}

/// Writes each outbound dictionary as a single JSON line.
#[derive(Debug)]
pub struct JsonLinesBridge<W> {
    out: Mutex<W>,
}

impl<W> JsonLinesBridge<W>
where
    W: AsyncWrite + Unpin + Send + Debug,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> DeviceBridge for JsonLinesBridge<W>
where
    W: AsyncWrite + Unpin + Send + Debug,
{
    async fn send(&self, message: &OutboundMessage) -> Result<(), BridgeError> {
        let mut line = serde_json::to_vec(&message.to_dictionary()).map_err(BridgeError::Encode)?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line).await?;
        out.flush().await?;
        Ok(())
    }
}
