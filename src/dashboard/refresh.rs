//! Loading, fallback substitution and refresh triggers.

use chrono::Utc;
use sheetdash_core::aggregate::{
    CategoryEntry, FinancialSummary, category_entries, financial_summary, placeholder_categories,
};
use sheetdash_core::config::{DashboardConfig, RefreshPolicy};
use sheetdash_core::error::Result;
use sheetdash_core::fetch::{CsvExportClient, SheetSource};
use sheetdash_core::summary::DashboardSummary;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::state::DashboardState;

/// Result of one refresh trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Live data was loaded.
    Loaded,
    /// The load failed; placeholder data was stored along with this message.
    Fallback(String),
    /// Another refresh was in flight under [`RefreshPolicy::SingleFlight`].
    Skipped,
}

/// Data produced by one successful load.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedData {
    pub categories: Vec<CategoryEntry>,
    pub financial: FinancialSummary,
}

/// Owns the configuration, the sheet source and the shared state.
pub struct Dashboard<S> {
    config: DashboardConfig,
    source: S,
    state: RwLock<DashboardState>,
    in_flight: AtomicUsize,
}

impl Dashboard<CsvExportClient> {
    /// Dashboard reading the public CSV export configured in `config.export`.
    pub fn connect(config: DashboardConfig) -> Result<Self> {
        let client = CsvExportClient::new(&config.export)?;
        Ok(Dashboard::new(config, client))
    }
}

impl<S: SheetSource> Dashboard<S> {
    pub fn new(config: DashboardConfig, source: S) -> Self {
        Dashboard {
            config,
            source,
            state: RwLock::new(DashboardState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn summary(&self) -> DashboardSummary {
        self.snapshot().summary()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Clear the failure notice. The data shown stays as it is.
    pub fn dismiss_notice(&self) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).error = None;
    }

    /// Fetch the category grid and the financial grid concurrently.
    /// Fails if either fetch fails.
    pub async fn load(&self) -> Result<LoadedData> {
        let sheet = &self.config.sheet;
        let (category_grid, financial_grid) =
            tokio::try_join!(self.source.fetch(sheet), self.source.fetch(sheet))?;

        let categories = if category_grid.is_empty() {
            tracing::warn!("No data fetched from sheet, using sample data");
            placeholder_categories(&self.config.categories, &mut rand::thread_rng())
        } else {
            category_entries(&category_grid, &self.config.categories)
        };
        let financial = financial_summary(&financial_grid, &self.config.financial);

        Ok(LoadedData {
            categories,
            financial,
        })
    }

    /// Run one load and store its result, or placeholder data if it failed.
    ///
    /// Never fails. Under [`RefreshPolicy::Overlapping`] concurrent calls all
    /// fetch and the last one to finish wins.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(ticket) = self.begin_refresh() else {
            tracing::debug!("Refresh already in flight, skipping");
            return RefreshOutcome::Skipped;
        };

        let (data, outcome) = match self.load().await {
            Ok(data) => (data, RefreshOutcome::Loaded),
            Err(err) => {
                tracing::warn!("Error loading sheet data: {err}");
                let data = LoadedData {
                    categories: placeholder_categories(
                        &self.config.categories,
                        &mut rand::thread_rng(),
                    ),
                    financial: FinancialSummary::default(),
                };
                (data, RefreshOutcome::Fallback(err.to_string()))
            }
        };

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.categories = data.categories;
        state.financial = data.financial;
        state.error = match &outcome {
            RefreshOutcome::Fallback(message) => Some(message.clone()),
            _ => None,
        };
        state.refreshed_at = Some(Utc::now());
        state.generation += 1;
        state.loading = ticket.finish() > 0;
        tracing::info!(
            "Dashboard refreshed (generation {}, {} categories)",
            state.generation,
            state.categories.len()
        );
        outcome
    }

    fn begin_refresh(&self) -> Option<RefreshTicket<'_>> {
        let acquired = match self.config.refresh.policy {
            RefreshPolicy::Overlapping => {
                self.in_flight.fetch_add(1, Ordering::AcqRel);
                true
            }
            RefreshPolicy::SingleFlight => self
                .in_flight
                .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
        };
        if !acquired {
            return None;
        }
        self.state.write().unwrap_or_else(PoisonError::into_inner).loading = true;
        Some(RefreshTicket {
            in_flight: &self.in_flight,
            state: &self.state,
            done: false,
        })
    }
}

impl<S: SheetSource + 'static> Dashboard<S> {
    /// Refresh now and then every `refresh.interval_secs`, each tick on its
    /// own task. Aborting the handle stops future ticks; refreshes already
    /// started run to completion.
    pub fn spawn_auto_refresh(self: Arc<Self>) -> JoinHandle<()> {
        let dashboard = self;
        let period = dashboard.config.refresh.interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let dashboard = Arc::clone(&dashboard);
                tokio::spawn(async move {
                    dashboard.refresh().await;
                });
            }
        })
    }
}

/// Counts a refresh as in flight until finished or dropped.
struct RefreshTicket<'a> {
    in_flight: &'a AtomicUsize,
    state: &'a RwLock<DashboardState>,
    done: bool,
}

impl RefreshTicket<'_> {
    /// Release the ticket, returning how many refreshes are still in flight.
    fn finish(mut self) -> usize {
        self.done = true;
        self.in_flight.fetch_sub(1, Ordering::AcqRel) - 1
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // A refresh may have started between the decrement and the lock.
        if self.in_flight.load(Ordering::Acquire) == 0 {
            state.loading = false;
        }
        tracing::debug!("Refresh dropped before it finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetdash_core::config::CategoryMapping;
    use sheetdash_core::error::SheetError;
    use sheetdash_core::{Grid, SheetConfig};
    use std::future::Future;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn grid(text: &str) -> Grid {
        sheetdash_core::storage::split_rows(text, Default::default())
    }

    fn config(policy: RefreshPolicy) -> DashboardConfig {
        let mut config = DashboardConfig {
            categories: vec![
                CategoryMapping::new("Food", "B1"),
                CategoryMapping::new("Housing", "B2"),
            ],
            ..DashboardConfig::default()
        };
        config.financial.total_budget = "D1".to_string();
        config.refresh.policy = policy;
        config
    }

    /// Serves grids; the first `failures` calls fail with HTTP 503.
    struct FakeSource {
        grid: Grid,
        failures: usize,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(text: &str) -> Self {
            FakeSource {
                grid: grid(text),
                failures: 0,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_first(text: &str, failures: usize) -> Self {
            FakeSource {
                failures,
                ..FakeSource::new(text)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SheetSource for FakeSource {
        fn fetch(&self, _sheet: &SheetConfig) -> impl Future<Output = Result<Grid>> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if call < self.failures {
                Err(SheetError::FetchStatus { status: 503 })
            } else {
                Ok(self.grid.clone())
            };
            async move { result }
        }
    }

    /// Every fetch waits for a permit released by the test.
    struct GatedSource {
        gate: Semaphore,
        grid: Grid,
    }

    impl SheetSource for GatedSource {
        fn fetch(&self, _sheet: &SheetConfig) -> impl Future<Output = Result<Grid>> + Send {
            async move {
                if let Ok(permit) = self.gate.acquire().await {
                    permit.forget();
                }
                Ok(self.grid.clone())
            }
        }
    }

    /// Each refresh makes two fetches; refresh `n` gets `grids[n]` once
    /// `gates[n]` has two permits.
    struct SequencedSource {
        gates: [Semaphore; 2],
        grids: [Grid; 2],
        calls: AtomicUsize,
    }

    impl SheetSource for SequencedSource {
        fn fetch(&self, _sheet: &SheetConfig) -> impl Future<Output = Result<Grid>> + Send {
            let refresh = self.calls.fetch_add(1, Ordering::SeqCst) / 2;
            async move {
                if let Ok(permit) = self.gates[refresh].acquire().await {
                    permit.forget();
                }
                Ok(self.grids[refresh].clone())
            }
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_live_data() {
        let dashboard = Dashboard::new(
            config(RefreshPolicy::Overlapping),
            FakeSource::new("Food,650,,4200\nHousing,850"),
        );

        assert_eq!(dashboard.refresh().await, RefreshOutcome::Loaded);

        let state = dashboard.snapshot();
        assert_eq!(state.categories.len(), 2);
        assert_eq!(state.categories[0].value, 650.0);
        assert_eq!(state.categories[1].value, 850.0);
        assert_eq!(state.financial.total_budget, 4200.0);
        assert_eq!(state.financial.total_income, 6500.0);
        assert_eq!(state.error, None);
        assert!(!state.loading);
        assert_eq!(state.generation, 1);
        assert!(state.refreshed_at.is_some());
        assert_eq!(dashboard.source().calls(), 2);
        assert_eq!(dashboard.summary().spent, 1500.0);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_then_recovers() {
        // One of the two concurrent fetches fails: the whole load fails.
        let dashboard = Dashboard::new(
            config(RefreshPolicy::Overlapping),
            FakeSource::failing_first("Food,650\nHousing,850", 1),
        );

        let outcome = dashboard.refresh().await;
        assert_eq!(
            outcome,
            RefreshOutcome::Fallback("HTTP error! status: 503".to_string())
        );

        let state = dashboard.snapshot();
        assert_eq!(state.error.as_deref(), Some("HTTP error! status: 503"));
        assert_eq!(state.financial, FinancialSummary::default());
        assert_eq!(state.categories.len(), 2);
        assert!(
            state
                .categories
                .iter()
                .all(|c| (100.0..600.0).contains(&c.value))
        );
        assert!(state.notice().is_some());

        assert_eq!(dashboard.refresh().await, RefreshOutcome::Loaded);
        let state = dashboard.snapshot();
        assert_eq!(state.error, None);
        assert_eq!(state.categories[0].value, 650.0);
        assert_eq!(state.generation, 2);
    }

    #[tokio::test]
    async fn test_empty_grid_uses_placeholders_without_error() {
        let dashboard = Dashboard::new(
            config(RefreshPolicy::Overlapping),
            FakeSource {
                grid: Vec::new(),
                failures: 0,
                calls: AtomicUsize::new(0),
            },
        );

        assert_eq!(dashboard.refresh().await, RefreshOutcome::Loaded);
        let state = dashboard.snapshot();
        assert_eq!(state.error, None);
        assert!(
            state
                .categories
                .iter()
                .all(|c| (100.0..600.0).contains(&c.value))
        );
        assert_eq!(state.financial, FinancialSummary::default());
    }

    #[tokio::test]
    async fn test_dismiss_notice_keeps_data() {
        let dashboard = Dashboard::new(
            config(RefreshPolicy::Overlapping),
            FakeSource::failing_first("", 2),
        );
        dashboard.refresh().await;
        let before = dashboard.snapshot();
        assert!(before.error.is_some());

        dashboard.dismiss_notice();
        let after = dashboard.snapshot();
        assert_eq!(after.error, None);
        assert_eq!(after.categories, before.categories);
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_all_fetch() {
        let dashboard = Dashboard::new(
            config(RefreshPolicy::Overlapping),
            FakeSource::new("Food,1\nHousing,2"),
        );

        let (a, b) = tokio::join!(dashboard.refresh(), dashboard.refresh());
        assert_eq!(a, RefreshOutcome::Loaded);
        assert_eq!(b, RefreshOutcome::Loaded);
        assert_eq!(dashboard.source().calls(), 4);

        let state = dashboard.snapshot();
        assert_eq!(state.generation, 2);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_finishing_last_wins() {
        let dashboard = Arc::new(Dashboard::new(
            config(RefreshPolicy::Overlapping),
            SequencedSource {
                gates: [Semaphore::new(0), Semaphore::new(0)],
                grids: [grid("Food,111\nHousing,1"), grid("Food,222\nHousing,2")],
                calls: AtomicUsize::new(0),
            },
        ));
        let calls = |d: &Dashboard<SequencedSource>| d.source().calls.load(Ordering::SeqCst);

        let first = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.refresh().await }
        });
        while calls(&dashboard) < 2 {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.refresh().await }
        });
        while calls(&dashboard) < 4 {
            tokio::task::yield_now().await;
        }

        // The later trigger finishes first.
        dashboard.source().gates[1].add_permits(2);
        assert_eq!(second.await.unwrap(), RefreshOutcome::Loaded);
        let state = dashboard.snapshot();
        assert_eq!(state.categories[0].value, 222.0);
        assert!(state.loading);

        dashboard.source().gates[0].add_permits(2);
        assert_eq!(first.await.unwrap(), RefreshOutcome::Loaded);
        let state = dashboard.snapshot();
        assert_eq!(state.categories[0].value, 111.0);
        assert_eq!(state.categories[1].value, 1.0);
        assert_eq!(state.generation, 2);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_dropped_refresh_keeps_loading_while_another_runs() {
        let dashboard = Dashboard::new(
            config(RefreshPolicy::Overlapping),
            GatedSource {
                gate: Semaphore::new(0),
                grid: grid("Food,5"),
            },
        );

        let running = dashboard.refresh();
        tokio::pin!(running);
        let polled = tokio::time::timeout(Duration::from_millis(5), &mut running).await;
        assert!(polled.is_err());

        let dropped = tokio::time::timeout(Duration::from_millis(5), dashboard.refresh()).await;
        assert!(dropped.is_err());
        assert!(dashboard.is_refreshing());
        assert!(dashboard.snapshot().loading);

        dashboard.source().gate.add_permits(2);
        assert_eq!(running.await, RefreshOutcome::Loaded);
        assert!(!dashboard.snapshot().loading);
    }

    #[tokio::test]
    async fn test_single_flight_skips_concurrent_refresh() {
        let dashboard = Arc::new(Dashboard::new(
            config(RefreshPolicy::SingleFlight),
            GatedSource {
                gate: Semaphore::new(0),
                grid: grid("Food,5\nHousing,6"),
            },
        ));

        let first = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.refresh().await }
        });
        while !dashboard.is_refreshing() {
            tokio::task::yield_now().await;
        }
        assert!(dashboard.snapshot().loading);

        assert_eq!(dashboard.refresh().await, RefreshOutcome::Skipped);

        dashboard.source().gate.add_permits(2);
        assert_eq!(first.await.unwrap(), RefreshOutcome::Loaded);

        let state = dashboard.snapshot();
        assert_eq!(state.generation, 1);
        assert!(!state.loading);
        assert!(!dashboard.is_refreshing());
    }

    #[tokio::test]
    async fn test_dropped_refresh_releases_in_flight() {
        let dashboard = Dashboard::new(
            config(RefreshPolicy::SingleFlight),
            GatedSource {
                gate: Semaphore::new(0),
                grid: grid("Food,5"),
            },
        );

        let timed_out = tokio::time::timeout(Duration::from_millis(20), dashboard.refresh()).await;
        assert!(timed_out.is_err());
        assert!(!dashboard.is_refreshing());
        assert!(!dashboard.snapshot().loading);
        assert_eq!(dashboard.snapshot().generation, 0);

        dashboard.source().gate.add_permits(2);
        assert_eq!(dashboard.refresh().await, RefreshOutcome::Loaded);
    }

    #[tokio::test]
    async fn test_auto_refresh_runs_immediately() {
        let mut cfg = config(RefreshPolicy::Overlapping);
        cfg.refresh.interval_secs = 3600;
        let dashboard = Arc::new(Dashboard::new(cfg, FakeSource::new("Food,7\nHousing,8")));

        let handle = Arc::clone(&dashboard).spawn_auto_refresh();
        while dashboard.snapshot().generation == 0 {
            tokio::task::yield_now().await;
        }
        handle.abort();

        let state = dashboard.snapshot();
        assert_eq!(state.categories[0].value, 7.0);
        assert_eq!(state.generation, 1);
    }
}
