use crate::config::Config;
use crate::models::{Item, PopOrder};
use crate::store::{ItemStore, StoreError};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    pub total: i64,
}

/// The LIFO/FIFO view over the item store. Cloned into every request handler.
#[derive(Debug, Clone)]
pub struct ItemQueue {
    store: ItemStore,
    max_text_length: usize,
}

impl ItemQueue {
    pub fn new(store: ItemStore, config: &Config) -> Self {
        Self {
            store,
            max_text_length: config.max_text_length,
        }
    }

    pub async fn list(&self) -> Result<Vec<String>, QueueError> {
        let items = self.store.list().await?;
        Ok(items.iter().map(Item::to_string).collect())
    }

    pub async fn add(&self, text: &str) -> Result<Item, QueueError> {
        if text.trim().is_empty() {
            return Err(QueueError::Validation("text must not be empty".to_string()));
        }

        let length = text.chars().count();
        if length > self.max_text_length {
            return Err(QueueError::Validation(format!(
                "text must be at most {} characters, got {}",
                self.max_text_length, length
            )));
        }

        let item = self.store.insert(text, Utc::now()).await?;
        debug!("Added item {}", item.id);
        Ok(item)
    }

    /// Removes and returns the item at the `order` end of the queue.
    ///
    /// The read and the delete are separate statements. If another pop deletes
    /// the same item in between, this call reports nothing deleted.
    pub async fn pop(&self, order: PopOrder) -> Result<Option<Item>, QueueError> {
        let Some(item) = self.store.first(order).await? else {
            debug!("{:?} pop on empty queue", order);
            return Ok(None);
        };

        if !self.store.delete(item.id).await? {
            warn!("Item {} was removed by a concurrent pop", item.id);
            return Ok(None);
        }

        debug!("{:?} pop removed item {}", order, item.id);
        Ok(Some(item))
    }

    pub async fn lifo_pop(&self) -> Result<Option<Item>, QueueError> {
        self.pop(PopOrder::Lifo).await
    }

    pub async fn fifo_pop(&self) -> Result<Option<Item>, QueueError> {
        self.pop(PopOrder::Fifo).await
    }

    pub async fn stats(&self) -> Result<QueueStats, QueueError> {
        Ok(QueueStats {
            total: self.store.count().await?,
        })
    }

    pub async fn shutdown(&self) {
        info!("Closing item store");
        self.store.close().await;
    }
}
