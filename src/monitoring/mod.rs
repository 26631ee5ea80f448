//! Performance metrics
//!
//! Latency and throughput tracking for the inference path. Simple counters
//! are lock-free atomics; the rolling latency window sits under a single
//! `RwLock`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Performance metrics collector
pub struct PerformanceMetrics {
    /// Window size for rolling latency metrics
    window_size: usize,
    /// Rolling latency window, milliseconds
    latencies: RwLock<VecDeque<f64>>,
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_items: AtomicU64,
}

impl PerformanceMetrics {
    /// Create a new metrics collector keeping the last `window_size`
    /// latency observations.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            latencies: RwLock::new(VecDeque::with_capacity(window_size)),
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            total_items: AtomicU64::new(0),
        }
    }

    /// Record a latency observation
    pub fn record_latency(&self, latency_ms: f64) {
        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push_back(latency_ms);
            if latencies.len() > self.window_size {
                latencies.pop_front();
            }
        }
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch of items processed
    pub fn record_items(&self, count: u64) {
        self.total_items.fetch_add(count, Ordering::Relaxed);
    }

    /// Record an error
    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Total successful requests observed
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Total items processed
    pub fn total_items(&self) -> u64 {
        self.total_items.load(Ordering::Relaxed)
    }

    /// Total errors observed
    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    /// Average latency over the rolling window, milliseconds
    pub fn avg_latency(&self) -> f64 {
        match self.latencies.read() {
            Ok(latencies) if !latencies.is_empty() => {
                latencies.iter().sum::<f64>() / latencies.len() as f64
            }
            _ => 0.0,
        }
    }

    /// 95th-percentile latency over the rolling window, milliseconds
    pub fn p95_latency(&self) -> f64 {
        self.percentile(0.95)
    }

    fn percentile(&self, q: f64) -> f64 {
        let latencies = match self.latencies.read() {
            Ok(l) => l,
            Err(_) => return 0.0,
        };
        if latencies.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = latencies.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let idx = ((sorted.len() as f64 - 1.0) * q).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }
}
