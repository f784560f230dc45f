//! Mock implementations of core traits for testing.
//!
//! These doubles let the orchestrator and pipeline be exercised without a
//! network or a cache server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::{
    error::BackendError,
    traits::{FreshnessResolver, SummaryBackend, SummaryCache},
    types::{expiry_from, CacheEntry, Fingerprint, Payload, SourceKind, DEFAULT_SUMMARY_TTL},
    Error, Result,
};

// =============================================================================
// Scripted Backend
// =============================================================================

/// One scripted backend reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed with this summary.
    Summary(String),
    /// Fail with this backend status.
    Status(u16),
    /// Fail with an undecodable reply.
    Malformed(String),
}

/// Backend that plays back a script of replies, repeating the last one.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    calls: AtomicUsize,
    kinds: Mutex<Vec<SourceKind>>,
}

impl ScriptedBackend {
    /// Create a backend with a queue of replies.
    pub fn new(script: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            kinds: Mutex::new(Vec::new()),
        }
    }

    /// A backend that always returns the same summary.
    pub fn constant(summary: &str) -> Self {
        Self::new(vec![Reply::Summary(summary.to_string())])
    }

    /// A backend that fails with `status` `failures` times, then succeeds.
    pub fn failing_then(status: u16, failures: usize, summary: &str) -> Self {
        let mut script = vec![Reply::Status(status); failures];
        script.push(Reply::Summary(summary.to_string()));
        Self::new(script)
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Source kinds of the payloads seen, in call order.
    pub fn kinds_seen(&self) -> Vec<SourceKind> {
        self.kinds.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummaryBackend for ScriptedBackend {
    async fn generate(&self, payload: &Payload) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().unwrap().push(payload.kind());

        let reply = {
            let mut script = self.script.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(next) = script.pop_front() {
                *last = Some(next.clone());
                next
            } else {
                last.clone()
                    .unwrap_or_else(|| Reply::Malformed("empty script".to_string()))
            }
        };

        match reply {
            Reply::Summary(s) => Ok(s),
            Reply::Status(code) => Err(BackendError::status(code, format!("scripted {}", code)).into()),
            Reply::Malformed(msg) => Err(Error::malformed_response(msg)),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

// =============================================================================
// Mock Summary Cache
// =============================================================================

/// In-memory cache with switchable read and write failures.
#[derive(Default)]
pub struct MockSummaryCache {
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    puts: AtomicUsize,
    refreshes: AtomicUsize,
}

impl MockSummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry directly, bypassing the write rules.
    pub fn seed(&self, entry: CacheEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.fingerprint.clone(), entry);
    }

    /// Make every `get` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every `put` and `refresh_expiry` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct read that ignores injected failures.
    pub fn peek(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(fingerprint).cloned()
    }

    /// Number of `put` calls that reached the store.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of `refresh_expiry` calls that reached the store.
    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummaryCache for MockSummaryCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::cache("injected read failure"));
        }
        Ok(self.peek(fingerprint))
    }

    async fn put(
        &self,
        fingerprint: &Fingerprint,
        source_url: &str,
        freshness: Option<DateTime<Utc>>,
        summary: Option<&str>,
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::cache("injected write failure"));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(entry) = CacheEntry::build(
            fingerprint,
            source_url,
            freshness,
            summary,
            DEFAULT_SUMMARY_TTL,
            Utc::now(),
        ) {
            self.seed(entry);
        }
        Ok(())
    }

    async fn refresh_expiry(&self, fingerprint: &Fingerprint) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::cache("injected write failure"));
        }
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if let Some(entry) = self.entries.lock().unwrap().get_mut(fingerprint) {
            entry.expires_at = expiry_from(Utc::now(), DEFAULT_SUMMARY_TTL);
        }
        Ok(())
    }
}

// =============================================================================
// Static Freshness Resolver
// =============================================================================

/// Resolver that answers every lookup with the same value.
pub struct StaticFreshnessResolver {
    answer: Option<DateTime<Utc>>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticFreshnessResolver {
    /// Always resolve to `answer`.
    pub fn new(answer: Option<DateTime<Utc>>) -> Self {
        Self {
            answer,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail the lookup.
    pub fn failing() -> Self {
        Self {
            answer: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FreshnessResolver for StaticFreshnessResolver {
    async fn resolve(&self, _source_url: &str) -> Result<Option<DateTime<Utc>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::invalid_input("metadata lookup failed"));
        }
        Ok(self.answer)
    }
}
