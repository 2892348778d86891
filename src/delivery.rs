//! Hand-off of extracted records to whatever ingests them.

use crate::error::{ImportError, Result};
use crate::extract::LoadRecord;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// Receives one record at a time.
///
/// An `Err` carries a human-readable reason; the scan loop reports it for
/// that card and moves on.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, record: &LoadRecord) -> Result<()>;
}

/// Writes each record as one line of JSON
pub struct JsonLinesDelivery<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesDelivery<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLinesDelivery<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

#[async_trait]
impl<W: Write + Send> Delivery for JsonLinesDelivery<W> {
    async fn deliver(&self, record: &LoadRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ImportError::DeliveryFailed("writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line).map_err(|e| ImportError::DeliveryFailed(e.to_string()))?;
        writer.flush().map_err(|e| ImportError::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}
