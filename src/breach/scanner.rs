use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{is_password_pwned, Breach, BreachLookup, CommonPasswords};

/// Pause between two calls to the breach service.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1600);

const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Entry data needed for a weak-password scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanItem {
    pub title: String,
    pub url: String,
    /// Account searched in breaches; skipped when empty
    pub account: String,
    pub password: String,
    pub password_modified: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanFinding {
    CommonPassword { item: usize, matched: String },
    PwnedPassword { item: usize },
    Breached { item: usize, breach: Breach },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Item `index` of `total` is about to be checked
    Checking { index: usize, total: usize },
    Found(ScanFinding),
    /// A lookup failed; the scan continues with the next check
    LookupFailed { item: usize, message: String },
    Finished { cancelled: bool },
}

/// Scans entries for common, pwned and breached passwords on a worker thread.
pub struct BreachScanner<L> {
    lookup: L,
    common: CommonPasswords,
    throttle: Duration,
    check_pwned: bool,
    cancel: Arc<AtomicBool>,
}

impl<L: BreachLookup + Send + 'static> BreachScanner<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            common: CommonPasswords::default(),
            throttle: DEFAULT_THROTTLE,
            check_pwned: true,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn common_passwords(mut self, common: CommonPasswords) -> Self {
        self.common = common;
        self
    }

    pub fn throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn check_pwned(mut self, check_pwned: bool) -> Self {
        self.check_pwned = check_pwned;
        self
    }

    /// Shares an existing cancellation flag, e.g. one owned by the caller's
    /// window.
    pub fn cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn start(self, items: Vec<ScanItem>) -> ScanTask {
        let cancel = self.cancel.clone();
        let (tx, rx) = mpsc::channel();
        let flag = cancel.clone();
        let handle = thread::spawn(move || {
            let mut worker = Worker { scanner: self, cancel: flag, tx, last_call: None, findings: Vec::new() };
            let cancelled = worker.run(&items);
            let _ = worker.tx.send(ScanEvent::Finished { cancelled });
            worker.findings
        });
        ScanTask { events: rx, cancel, handle }
    }
}

pub struct ScanTask {
    events: Receiver<ScanEvent>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Vec<ScanFinding>>,
}

impl ScanTask {
    pub fn events(&self) -> &Receiver<ScanEvent> {
        &self.events
    }

    /// Requests cancellation; honored before the next service call.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Findings collected until completion or cancellation.
    pub fn join(self) -> Vec<ScanFinding> {
        self.handle.join().unwrap_or_default()
    }
}

struct Worker<L> {
    scanner: BreachScanner<L>,
    cancel: Arc<AtomicBool>,
    tx: Sender<ScanEvent>,
    last_call: Option<Instant>,
    findings: Vec<ScanFinding>,
}

impl<L: BreachLookup> Worker<L> {
    // Returns whether the scan was cancelled
    fn run(&mut self, items: &[ScanItem]) -> bool {
        let mut accounts: HashMap<String, Vec<Breach>> = HashMap::new();
        let total = items.len();

        for (index, item) in items.iter().enumerate() {
            if self.is_cancelled() {
                return true;
            }
            self.emit(ScanEvent::Checking { index, total });

            if let Some(matched) = self.scanner.common.matched(&item.password) {
                let matched = matched.to_string();
                self.found(ScanFinding::CommonPassword { item: index, matched });
            }

            if self.scanner.check_pwned && !item.password.is_empty() {
                if !self.wait_turn() {
                    return true;
                }
                match is_password_pwned(&self.scanner.lookup, &item.password) {
                    Ok(true) => self.found(ScanFinding::PwnedPassword { item: index }),
                    Ok(false) => {}
                    Err(e) => self.failed(index, e.to_string()),
                }
            }

            if item.account.is_empty() {
                continue;
            }
            if !accounts.contains_key(&item.account) {
                if !self.wait_turn() {
                    return true;
                }
                match self.scanner.lookup.breaches_for_account(&item.account) {
                    Ok(breaches) => {
                        accounts.insert(item.account.clone(), breaches);
                    }
                    Err(e) => {
                        self.failed(index, e.to_string());
                        continue;
                    }
                }
            }
            let applicable: Vec<Breach> = accounts
                .get(&item.account)
                .into_iter()
                .flatten()
                .filter(|b| b.is_applicable(&item.url, item.password_modified, &item.title))
                .cloned()
                .collect();
            for breach in applicable {
                self.found(ScanFinding::Breached { item: index, breach });
            }
        }
        false
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    // Sleeps out the throttle; false when cancelled meanwhile
    fn wait_turn(&mut self) -> bool {
        if let Some(last) = self.last_call {
            let due = last + self.scanner.throttle;
            debug!("Throttling breach lookup for {:?}", due.saturating_duration_since(Instant::now()));
            while Instant::now() < due {
                if self.is_cancelled() {
                    break;
                }
                thread::sleep(CANCEL_POLL.min(due.saturating_duration_since(Instant::now())));
            }
        }
        if self.is_cancelled() {
            debug!("Breach scan cancelled");
            return false;
        }
        self.last_call = Some(Instant::now());
        true
    }

    fn emit(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }

    fn found(&mut self, finding: ScanFinding) {
        self.emit(ScanEvent::Found(finding.clone()));
        self.findings.push(finding);
    }

    fn failed(&self, item: usize, message: String) {
        warn!("Breach lookup for item {item} failed: {message}");
        self.emit(ScanEvent::LookupFailed { item, message });
    }
}
