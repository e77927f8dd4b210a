//! Process-lifetime memoization of loaded rows.
//!
//! Entries are keyed by query text and never expire; staleness until restart
//! (or an explicit [`CachedSource::invalidate`]) is accepted.

use super::{ContentRow, DataSource, PaymentRow};
use crate::error::{EventError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Wraps a source and memoizes its rows by query text.
pub struct CachedSource<S> {
    inner: S,
    content: Mutex<HashMap<String, Arc<Vec<ContentRow>>>>,
    payments: Mutex<HashMap<String, Arc<Vec<PaymentRow>>>>,
}

fn memoize<T: Clone>(
    cache: &Mutex<HashMap<String, Arc<Vec<T>>>>,
    key: &str,
    load: impl FnOnce() -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let mut guard = cache
        .lock()
        .map_err(|_| EventError::Source("row cache lock poisoned".to_string()))?;

    if let Some(rows) = guard.get(key) {
        log::debug!("row cache hit: {}", key);
        return Ok(rows.as_ref().clone());
    }

    log::debug!("row cache miss: {}", key);
    let rows = Arc::new(load()?);
    guard.insert(key.to_string(), Arc::clone(&rows));
    Ok(rows.as_ref().clone())
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            content: Mutex::new(HashMap::new()),
            payments: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every memoized entry.
    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.content.lock() {
            guard.clear();
        }
        if let Ok(mut guard) = self.payments.lock() {
            guard.clear();
        }
    }

    /// Number of memoized queries.
    pub fn cached_queries(&self) -> usize {
        let content = self.content.lock().map(|g| g.len()).unwrap_or(0);
        let payments = self.payments.lock().map(|g| g.len()).unwrap_or(0);
        content + payments
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    fn content_rows(&self) -> Result<Vec<ContentRow>> {
        memoize(&self.content, self.inner.content_query(), || {
            self.inner.content_rows()
        })
    }

    fn payment_rows(&self) -> Result<Vec<PaymentRow>> {
        memoize(&self.payments, self.inner.payment_query(), || {
            self.inner.payment_rows()
        })
    }

    fn content_query(&self) -> &str {
        self.inner.content_query()
    }

    fn payment_query(&self) -> &str {
        self.inner.payment_query()
    }
}
