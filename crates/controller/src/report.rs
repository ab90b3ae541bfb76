//! Sales report screen: the table's query range and the companion chart.
//!
//! The table always shows the range the user picked. The chart shows a
//! window chosen by [`PeriodSyncPlanner`] and is only refetched when that
//! window differs from the one last loaded, or the last chart fetch failed.
//! Table and chart fetches are sequenced
//! independently; a late response for either is dropped if a newer request
//! for the same section has been issued.

use std::sync::Arc;

use backoffice_core::api::ReportApi;
use backoffice_core::error::{CoreError, RemoteError};
use backoffice_core::period::{
    default_window, ChartPlan, ChartSyncInput, ChartWindow, Granularity, PeriodRange,
    PeriodSyncPlanner, SyncDecision,
};
use backoffice_core::report::{ReportRequest, ReportResponse, ReportScope};
use chrono::NaiveDate;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Table,
    Chart,
}

impl Section {
    fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Chart => "chart",
        }
    }
}

/// One independently fetched report section.
#[derive(Debug, Clone, Default)]
struct ReportSlot {
    report: Option<ReportResponse>,
    is_loading: bool,
    error: Option<String>,
    latest_request: u64,
    /// Range the current `report` was fetched for.
    loaded_for: Option<PeriodRange>,
}

impl ReportSlot {
    fn begin(&mut self) -> u64 {
        self.latest_request += 1;
        self.is_loading = true;
        self.error = None;
        self.latest_request
    }

    /// Apply a response unless a newer request was issued since. Returns
    /// whether it was applied.
    fn apply(
        &mut self,
        request_seq: u64,
        range: PeriodRange,
        result: Result<ReportResponse, RemoteError>,
    ) -> bool {
        if request_seq != self.latest_request {
            return false;
        }
        self.is_loading = false;
        match result {
            Ok(report) => {
                self.report = Some(report);
                self.loaded_for = Some(range);
            }
            Err(e) => self.error = Some(e.user_message()),
        }
        true
    }

    /// Whether the slot needs a fetch to show `range`.
    fn is_stale_for(&self, range: PeriodRange) -> bool {
        self.loaded_for != Some(range) || self.error.is_some()
    }
}

/// Point-in-time copy of the report screen for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSnapshot {
    pub granularity: Granularity,
    pub query: PeriodRange,
    pub chart_window: ChartWindow,
    pub scope: ReportScope,
    /// Rule that picked the current chart window, once a range has been set.
    pub decision: Option<SyncDecision>,
    pub table: Option<ReportResponse>,
    pub is_table_loading: bool,
    pub table_error: Option<String>,
    pub chart: Option<ReportResponse>,
    pub is_chart_loading: bool,
    pub chart_error: Option<String>,
}

struct ReportState {
    query: PeriodRange,
    chart_window: ChartWindow,
    scope: ReportScope,
    is_first_load: bool,
    decision: Option<SyncDecision>,
    table: ReportSlot,
    chart: ReportSlot,
}

/// Controller for one sales-report screen at a fixed granularity.
pub struct SalesReportController {
    api: Arc<dyn ReportApi>,
    planner: PeriodSyncPlanner,
    granularity: Granularity,
    today: NaiveDate,
    state: RwLock<ReportState>,
}

impl SalesReportController {
    /// Screen starting on `initial_query`, with the chart on its default
    /// window. Nothing is fetched until [`load_initial`](Self::load_initial).
    pub fn new(api: Arc<dyn ReportApi>, initial_query: PeriodRange, today: NaiveDate) -> Self {
        let granularity = initial_query.granularity();
        Self {
            api,
            planner: PeriodSyncPlanner::default(),
            granularity,
            today,
            state: RwLock::new(ReportState {
                query: initial_query,
                chart_window: default_window(granularity, today),
                scope: ReportScope::All,
                is_first_load: true,
                decision: None,
                table: ReportSlot::default(),
                chart: ReportSlot::default(),
            }),
        }
    }

    /// Start scoped to `scope` instead of all stores.
    pub fn with_scope(mut self, scope: ReportScope) -> Self {
        self.state.get_mut().scope = scope;
        self
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub async fn snapshot(&self) -> ReportSnapshot {
        let state = self.state.read().await;
        ReportSnapshot {
            granularity: self.granularity,
            query: state.query,
            chart_window: state.chart_window,
            scope: state.scope,
            decision: state.decision,
            table: state.table.report.clone(),
            is_table_loading: state.table.is_loading,
            table_error: state.table.error.clone(),
            chart: state.chart.report.clone(),
            is_chart_loading: state.chart.is_loading,
            chart_error: state.chart.error.clone(),
        }
    }

    /// First fetch of the screen: table for the initial range, chart for
    /// the default window.
    pub async fn load_initial(&self) -> Result<ChartPlan, CoreError> {
        let query = self.state.read().await.query;
        self.set_query_range(query).await
    }

    /// Show `range` in the table and re-plan the chart window.
    ///
    /// Rejects a range at a different granularity from the screen's without
    /// touching state or the network.
    pub async fn set_query_range(&self, range: PeriodRange) -> Result<ChartPlan, CoreError> {
        if range.granularity() != self.granularity {
            return Err(CoreError::InvalidPeriod(format!(
                "{} screen cannot show a {} range",
                self.granularity,
                range.granularity()
            )));
        }

        let (plan, table_req, chart_req) = {
            let mut state = self.state.write().await;
            let is_first_load = std::mem::replace(&mut state.is_first_load, false);
            let plan = self
                .planner
                .plan(&ChartSyncInput::for_today(range, self.today, is_first_load));

            let chart_stale = state.chart.is_stale_for(plan.window);
            state.query = range;
            state.chart_window = plan.window;
            state.decision = Some(plan.decision);

            let table_req = (state.table.begin(), ReportRequest::new(range, state.scope));
            let chart_req = (is_first_load || chart_stale)
                .then(|| (state.chart.begin(), ReportRequest::new(plan.window, state.scope)));
            (plan, table_req, chart_req)
        };

        tracing::debug!(
            granularity = %self.granularity,
            query = %range,
            window = %plan.window,
            decision = ?plan.decision,
            refetch_chart = chart_req.is_some(),
            "Chart window planned",
        );

        tokio::join!(
            self.fetch(Section::Table, table_req),
            async {
                if let Some(req) = chart_req {
                    self.fetch(Section::Chart, req).await;
                }
            }
        );
        Ok(plan)
    }

    /// Re-request the chart for the current window, e.g. after a failed
    /// fetch.
    pub async fn retry_chart(&self) {
        let chart_req = {
            let mut state = self.state.write().await;
            let window = state.chart_window;
            let scope = state.scope;
            (state.chart.begin(), ReportRequest::new(window, scope))
        };
        self.fetch(Section::Chart, chart_req).await;
    }

    /// Switch between all stores and one store. Both sections refetch.
    pub async fn set_scope(&self, scope: ReportScope) {
        let (table_req, chart_req) = {
            let mut state = self.state.write().await;
            state.scope = scope;
            (
                (state.table.begin(), ReportRequest::new(state.query, scope)),
                (state.chart.begin(), ReportRequest::new(state.chart_window, scope)),
            )
        };

        tokio::join!(
            self.fetch(Section::Table, table_req),
            self.fetch(Section::Chart, chart_req)
        );
    }

    async fn fetch(&self, section: Section, (request_seq, request): (u64, ReportRequest)) {
        let result = self.api.fetch_report(&request).await;
        if let Err(e) = &result {
            tracing::warn!(
                section = section.as_str(),
                range = %request.range,
                error = %e,
                "Report fetch failed",
            );
        }

        let mut state = self.state.write().await;
        let slot = match section {
            Section::Table => &mut state.table,
            Section::Chart => &mut state.chart,
        };
        if !slot.apply(request_seq, request.range, result) {
            tracing::debug!(
                section = section.as_str(),
                request_seq,
                latest = slot.latest_request,
                "Discarding stale report response",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use backoffice_core::period::PeriodUnit;
    use backoffice_core::report::{ReportPoint, ReportSummary};
    use tokio::sync::oneshot;

    use super::*;

    /// Echoes each request back as a one-point series labelled with the
    /// requested range, so tests can tell which response landed where.
    #[derive(Default)]
    struct FakeReports {
        requests: Mutex<Vec<ReportRequest>>,
        gates: Mutex<Vec<(PeriodRange, oneshot::Receiver<()>)>>,
        fail: Mutex<bool>,
    }

    impl FakeReports {
        fn hold(&self, range: PeriodRange) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push((range, rx));
            tx
        }

        fn requests(&self) -> Vec<ReportRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.requests.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl ReportApi for FakeReports {
        async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, RemoteError> {
            self.requests.lock().unwrap().push(*request);
            let gate = {
                let mut gates = self.gates.lock().unwrap();
                gates
                    .iter()
                    .position(|(r, _)| *r == request.range)
                    .map(|i| gates.remove(i).1)
            };
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            if *self.fail.lock().unwrap() {
                return Err(RemoteError::status(502));
            }
            Ok(labelled(request.range))
        }
    }

    fn labelled(range: PeriodRange) -> ReportResponse {
        ReportResponse {
            series: vec![ReportPoint {
                period: range.to_string(),
                total_sales: 10.0,
                order_count: 1,
                target_amount: None,
            }],
            summary: ReportSummary::default(),
        }
    }

    fn label(report: &Option<ReportResponse>) -> Option<String> {
        report.as_ref().map(|r| r.series[0].period.clone())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn years(start: i32, end: i32) -> PeriodRange {
        PeriodRange::new(PeriodUnit::Year(start), PeriodUnit::Year(end)).unwrap()
    }

    fn yearly(initial: PeriodRange) -> (Arc<FakeReports>, SalesReportController) {
        let api = Arc::new(FakeReports::default());
        let c = SalesReportController::new(Arc::clone(&api) as Arc<dyn ReportApi>, initial, today());
        (api, c)
    }

    // -- initial load --------------------------------------------------------

    #[tokio::test]
    async fn initial_load_uses_default_chart_window() {
        let (api, c) = yearly(years(2024, 2024));

        let plan = c.load_initial().await.unwrap();

        assert_eq!(plan.decision, SyncDecision::FirstLoad);
        assert_eq!(plan.window, years(2022, 2026));
        let ranges: Vec<_> = api.requests().iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![years(2024, 2024), years(2022, 2026)]);

        let snap = c.snapshot().await;
        assert_eq!(label(&snap.table).as_deref(), Some("2024..2024"));
        assert_eq!(label(&snap.chart).as_deref(), Some("2022..2026"));
        assert!(!snap.is_table_loading);
        assert!(!snap.is_chart_loading);
    }

    // -- query changes -------------------------------------------------------

    #[tokio::test]
    async fn tracked_range_refetches_chart() {
        let (api, c) = yearly(years(2026, 2026));
        c.load_initial().await.unwrap();
        api.clear();

        let plan = c.set_query_range(years(2019, 2021)).await.unwrap();

        assert_eq!(plan.decision, SyncDecision::TrackQuery);
        let ranges: Vec<_> = api.requests().iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![years(2019, 2021), years(2019, 2021)]);
        assert_eq!(c.snapshot().await.chart_window, years(2019, 2021));
    }

    #[tokio::test]
    async fn unchanged_window_skips_chart_fetch() {
        let (api, c) = yearly(years(2026, 2026));
        c.load_initial().await.unwrap();
        api.clear();

        let plan = c.set_query_range(years(2010, 2020)).await.unwrap();

        assert_eq!(plan.decision, SyncDecision::SpanTooWide);
        let ranges: Vec<_> = api.requests().iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![years(2010, 2020)]);
        let snap = c.snapshot().await;
        assert_eq!(label(&snap.table).as_deref(), Some("2010..2020"));
        assert_eq!(label(&snap.chart).as_deref(), Some("2022..2026"));
    }

    #[tokio::test]
    async fn mismatched_granularity_is_rejected() {
        let (api, c) = yearly(years(2024, 2024));
        let months = PeriodRange::parse(Granularity::Month, "2024-01", "2024-03").unwrap();

        let err = c.set_query_range(months).await.unwrap_err();

        assert_matches!(err, CoreError::InvalidPeriod(_));
        assert!(api.requests().is_empty());
        assert_eq!(c.snapshot().await.query, years(2024, 2024));
    }

    #[tokio::test]
    async fn daily_screen_chart_stays_on_month_to_date() {
        let api = Arc::new(FakeReports::default());
        let initial = PeriodRange::parse(Granularity::Day, "2026-10-01", "2026-10-18").unwrap();
        let c = SalesReportController::new(Arc::clone(&api) as Arc<dyn ReportApi>, initial, today());
        c.load_initial().await.unwrap();

        let past = PeriodRange::parse(Granularity::Day, "2026-09-01", "2026-09-03").unwrap();
        let plan = c.set_query_range(past).await.unwrap();

        assert_eq!(plan.decision, SyncDecision::NoRule);
        assert_eq!(plan.window, initial);
    }

    // -- scope ---------------------------------------------------------------

    #[tokio::test]
    async fn scope_change_refetches_both_sections() {
        let (api, c) = yearly(years(2024, 2024));
        c.load_initial().await.unwrap();
        api.clear();

        c.set_scope(ReportScope::Store(4)).await;

        let reqs = api.requests();
        assert_eq!(reqs.len(), 2);
        assert!(reqs.iter().all(|r| r.scope == ReportScope::Store(4)));
        assert_eq!(reqs[0].range, years(2024, 2024));
        assert_eq!(reqs[1].range, years(2022, 2026));
    }

    // -- stale responses and failures ----------------------------------------

    #[tokio::test]
    async fn late_table_response_is_discarded() {
        let (api, c) = yearly(years(2026, 2026));
        c.load_initial().await.unwrap();

        let release = api.hold(years(2019, 2020));
        let first = c.set_query_range(years(2019, 2020));
        let second = async {
            c.set_query_range(years(2021, 2022)).await.unwrap();
            release.send(()).unwrap();
        };
        let (first, ()) = tokio::join!(first, second);
        first.unwrap();

        let snap = c.snapshot().await;
        assert_eq!(snap.query, years(2021, 2022));
        assert_eq!(label(&snap.table).as_deref(), Some("2021..2022"));
        assert_eq!(label(&snap.chart).as_deref(), Some("2021..2022"));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_report() {
        let (api, c) = yearly(years(2024, 2024));
        c.load_initial().await.unwrap();
        *api.fail.lock().unwrap() = true;

        c.set_query_range(years(2023, 2023)).await.unwrap();

        let snap = c.snapshot().await;
        assert_eq!(label(&snap.table).as_deref(), Some("2024..2024"));
        assert_eq!(
            snap.table_error.as_deref(),
            Some("The server encountered an error. Please try again later.")
        );
        assert_eq!(snap.chart_error, snap.table_error);
    }

    #[tokio::test]
    async fn failed_chart_is_refetched_when_same_range_is_reissued() {
        let (api, c) = yearly(years(2026, 2026));
        c.load_initial().await.unwrap();
        *api.fail.lock().unwrap() = true;
        c.set_query_range(years(2019, 2021)).await.unwrap();
        assert!(c.snapshot().await.chart_error.is_some());

        *api.fail.lock().unwrap() = false;
        api.clear();
        c.set_query_range(years(2019, 2021)).await.unwrap();

        let ranges: Vec<_> = api.requests().iter().map(|r| r.range).collect();
        assert_eq!(ranges, vec![years(2019, 2021), years(2019, 2021)]);
        let snap = c.snapshot().await;
        assert_eq!(snap.chart_window, years(2019, 2021));
        assert_eq!(label(&snap.chart).as_deref(), Some("2019..2021"));
        assert_eq!(snap.chart_error, None);
    }

    #[tokio::test]
    async fn retry_chart_refetches_current_window() {
        let (api, c) = yearly(years(2026, 2026));
        c.load_initial().await.unwrap();
        *api.fail.lock().unwrap() = true;
        c.set_query_range(years(2020, 2021)).await.unwrap();

        *api.fail.lock().unwrap() = false;
        api.clear();
        c.retry_chart().await;

        let reqs = api.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].range, years(2020, 2021));
        let snap = c.snapshot().await;
        assert_eq!(label(&snap.chart).as_deref(), Some("2020..2021"));
        assert_eq!(snap.chart_error, None);
        // The table keeps its own failure until the range is re-issued.
        assert!(snap.table_error.is_some());
    }
}
