//! In-memory data source.

use super::{ContentRow, DataSource, PaymentRow};
use crate::error::Result;

/// Rows held in memory, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    content: Vec<ContentRow>,
    payments: Vec<PaymentRow>,
}

impl InMemorySource {
    pub fn new(content: Vec<ContentRow>, payments: Vec<PaymentRow>) -> Self {
        Self { content, payments }
    }
}

impl DataSource for InMemorySource {
    fn content_rows(&self) -> Result<Vec<ContentRow>> {
        Ok(self.content.clone())
    }

    fn payment_rows(&self) -> Result<Vec<PaymentRow>> {
        Ok(self.payments.clone())
    }

    fn content_query(&self) -> &str {
        "memory:content"
    }

    fn payment_query(&self) -> &str {
        "memory:payments"
    }
}
