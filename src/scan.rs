//! Scan orchestration.
//!
//! A single long-lived loop receives [`ScanTrigger`]s over a channel and, for
//! each one, snapshots the page, locates cards nobody has processed yet,
//! extracts their records, marks them processed and hands the records to a
//! [`Delivery`]. Triggers are handled strictly one after another.

use crate::delivery::Delivery;
use crate::dom::{DomTree, ProcessedSet};
use crate::error::Result;
use crate::extract::{LoadRecord, extract, locate_new};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;

/// Why a re-scan was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    /// The page finished loading
    Ready,
    /// The page's DOM may have changed
    Mutation,
    /// Stop the loop after any pending scan
    Shutdown,
}

/// The page as seen at one instant
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub tree: DomTree,
}

/// Anything that can produce the current page
pub trait SnapshotSource {
    fn snapshot(&self) -> Result<PageSnapshot>;
}

/// A saved page; every snapshot is the same document
#[derive(Debug, Clone)]
pub struct StaticPage {
    snapshot: PageSnapshot,
}

impl StaticPage {
    pub fn from_html(url: impl Into<String>, html: &str) -> Self {
        Self {
            snapshot: PageSnapshot {
                url: url.into(),
                tree: DomTree::from_html(html),
            },
        }
    }
}

impl SnapshotSource for StaticPage {
    fn snapshot(&self) -> Result<PageSnapshot> {
        Ok(self.snapshot.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// How often the watcher re-scans the page
    pub poll_interval: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
        }
    }
}

impl ScanOptions {
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Totals over the lifetime of a scan loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub scans: usize,
    pub records: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
    pub failed_snapshots: usize,
}

/// Owns the processed side table across scans
#[derive(Debug, Default)]
pub struct Scanner {
    processed: ProcessedSet,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    /// Extract every card of the snapshot not processed before, marking
    /// each one as it goes.
    pub fn scan(&mut self, snapshot: &PageSnapshot, now: DateTime<Utc>) -> Vec<LoadRecord> {
        let tree = &snapshot.tree;

        let pruned = self.processed.prune(tree);
        if pruned > 0 {
            log::debug!("Forgot {} card(s) no longer on the page", pruned);
        }

        locate_new(tree, tree.root(), &self.processed)
            .into_iter()
            .map(|card| {
                let record = extract(tree, card.node, &snapshot.url, now);
                self.processed.mark(card.key);
                log::debug!("Extracted card {} ({:?})", card.dedup_key, card.key);
                record
            })
            .collect()
    }

    /// Snapshot, scan and deliver once. Failures are logged and counted.
    pub async fn scan_and_deliver<S, D>(&mut self, source: &S, delivery: &D, report: &mut ScanReport)
    where
        S: SnapshotSource + ?Sized,
        D: Delivery + ?Sized,
    {
        report.scans += 1;

        let snapshot = match source.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Snapshot failed: {}", e);
                report.failed_snapshots += 1;
                return;
            }
        };

        let records = self.scan(&snapshot, Utc::now());
        if !records.is_empty() {
            log::info!("Found {} new load(s) on {}", records.len(), snapshot.url);
        }
        report.records += records.len();

        for record in &records {
            match delivery.deliver(record).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    log::warn!("Import of {:?} failed: {}", record.dispatch_id, e);
                    report.failed_deliveries += 1;
                }
            }
        }
    }
}

/// Run until every trigger sender is dropped or `Shutdown` arrives.
///
/// Triggers that queued up while a scan was running collapse into one scan.
pub async fn run_scan_loop<S, D>(mut triggers: mpsc::Receiver<ScanTrigger>, source: &S, delivery: &D) -> ScanReport
where
    S: SnapshotSource + ?Sized,
    D: Delivery + ?Sized,
{
    let mut scanner = Scanner::new();
    let mut report = ScanReport::default();

    while let Some(trigger) = triggers.recv().await {
        if trigger == ScanTrigger::Shutdown {
            break;
        }

        let mut shutdown = false;
        while let Ok(queued) = triggers.try_recv() {
            if queued == ScanTrigger::Shutdown {
                shutdown = true;
                break;
            }
        }

        log::trace!("Scanning on {:?}", trigger);
        scanner.scan_and_deliver(source, delivery, &mut report).await;

        if shutdown {
            break;
        }
    }

    log::info!(
        "Scan loop finished: {} scan(s), {} record(s), {} delivered, {} failed",
        report.scans,
        report.records,
        report.delivered,
        report.failed_deliveries
    );
    report
}
