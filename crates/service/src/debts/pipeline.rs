//! Refreshable, filtered view of the debt collection.
//!
//! A driver task owns the fetched collection and is the only writer of the
//! derived view. `refresh()` asks it to refetch the whole collection;
//! a newer refresh aborts the fetch in flight and results tagged with an
//! older generation are dropped, so consumers only ever see the latest
//! fetch. Filter changes re-derive the view from the held collection
//! without touching the network.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use models::{Debt, DebtFilter};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::repository::DebtRepository;

/// Keep the entries `filter` selects, in their original order.
pub fn apply_filter(debts: &[Debt], filter: DebtFilter) -> Vec<Debt> {
    match filter {
        DebtFilter::All => debts.to_vec(),
        _ => debts.iter().filter(|d| filter.matches(d.status)).cloned().collect(),
    }
}

#[derive(Clone)]
pub struct DebtListPipeline {
    triggers: mpsc::UnboundedSender<u64>,
    requested: Arc<AtomicU64>,
    filter: Arc<watch::Sender<DebtFilter>>,
    loading: Arc<watch::Sender<bool>>,
    view: watch::Receiver<Vec<Debt>>,
}

impl DebtListPipeline {
    /// Spawn the driver task and issue the first fetch.
    pub fn spawn<R: DebtRepository>(repo: Arc<R>, filter: DebtFilter) -> Self {
        let (triggers, trigger_rx) = mpsc::unbounded_channel();
        let (filter_tx, filter_rx) = watch::channel(filter);
        let (loading, _) = watch::channel(true);
        let (view_tx, view) = watch::channel(Vec::new());

        let pipeline = Self {
            triggers,
            requested: Arc::new(AtomicU64::new(0)),
            filter: Arc::new(filter_tx),
            loading: Arc::new(loading),
            view,
        };
        let driver = Driver {
            repo,
            requested: Arc::clone(&pipeline.requested),
            loading: Arc::clone(&pipeline.loading),
            view: view_tx,
        };
        tokio::spawn(driver.run(trigger_rx, filter_rx));
        pipeline.refresh();
        pipeline
    }

    /// Refetch the collection. Supersedes any fetch still in flight.
    pub fn refresh(&self) {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading.send_replace(true);
        if self.triggers.send(generation).is_err() {
            warn!("debt list driver is gone; refresh ignored");
            self.loading.send_replace(false);
        }
    }

    pub fn set_filter(&self, filter: DebtFilter) {
        self.filter.send_replace(filter);
    }

    pub fn filter(&self) -> DebtFilter {
        *self.filter.borrow()
    }

    /// Filtered collection, shared by every consumer.
    pub fn view(&self) -> watch::Receiver<Vec<Debt>> {
        self.view.clone()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Wait until the latest requested fetch has landed.
    pub async fn wait_idle(&self) {
        let mut loading = self.loading.subscribe();
        let _ = loading.wait_for(|busy| !*busy).await;
    }

    /// Refresh, wait for the result and return the filtered view.
    pub async fn reload(&self) -> Vec<Debt> {
        self.refresh();
        self.wait_idle().await;
        self.view.borrow().clone()
    }

    /// Current filtered view without waiting.
    pub fn snapshot(&self) -> Vec<Debt> {
        self.view.borrow().clone()
    }
}

struct Driver<R> {
    repo: Arc<R>,
    requested: Arc<AtomicU64>,
    loading: Arc<watch::Sender<bool>>,
    view: watch::Sender<Vec<Debt>>,
}

impl<R: DebtRepository> Driver<R> {
    fn latest(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// Clear `loading` unless a refresh was requested after `generation`.
    /// Checked under the watch lock, which `refresh()` also takes to raise
    /// the flag.
    fn settle(&self, generation: u64) {
        self.loading.send_if_modified(|busy| {
            if self.latest() != generation {
                debug!(generation, latest = self.latest(), "newer refresh pending; still loading");
                return false;
            }
            std::mem::replace(busy, false)
        });
    }

    fn fetch(&self, generation: u64, results: mpsc::UnboundedSender<(u64, Vec<Debt>)>) -> JoinHandle<()> {
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            let debts = match repo.list(DebtFilter::All).await {
                Ok(debts) => debts,
                Err(e) => {
                    warn!(error = %e, generation, "debt list fetch failed; showing an empty list");
                    Vec::new()
                }
            };
            let _ = results.send((generation, debts));
        })
    }

    async fn run(self, mut triggers: mpsc::UnboundedReceiver<u64>, mut filter: watch::Receiver<DebtFilter>) {
        let (results_tx, mut results) = mpsc::unbounded_channel::<(u64, Vec<Debt>)>();
        let mut collection: Vec<Debt> = Vec::new();
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                trigger = triggers.recv() => {
                    let Some(generation) = trigger else { break };
                    if generation != self.latest() {
                        // a newer trigger is already queued
                        continue;
                    }
                    if let Some(previous) = in_flight.take() {
                        debug!(generation, "superseding in-flight debt fetch");
                        previous.abort();
                    }
                    in_flight = Some(self.fetch(generation, results_tx.clone()));
                }
                Some((generation, debts)) = results.recv() => {
                    if generation != self.latest() {
                        debug!(generation, latest = self.latest(), "dropping stale debt list");
                        continue;
                    }
                    in_flight = None;
                    collection = debts;
                    let selected = *filter.borrow();
                    debug!(generation, total = collection.len(), filter = %selected, "debt list updated");
                    self.view.send_replace(apply_filter(&collection, selected));
                    self.settle(generation);
                }
                changed = filter.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let selected = *filter.borrow_and_update();
                    self.view.send_replace(apply_filter(&collection, selected));
                }
            }
        }

        if let Some(task) = in_flight {
            task.abort();
        }
        debug!("debt list driver stopped");
    }
}
