//! Calendar periods for the sales-report screens and the chart-window planner.
//!
//! A report screen works at one [`Granularity`]. The table shows the user's
//! [`PeriodRange`]; the companion chart shows a [`ChartWindow`] that either
//! tracks the table range or stays on the screen's rolling default window.
//! [`PeriodSyncPlanner`] makes that decision. It is pure: same input, same
//! window.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Path segment of the report endpoint for this granularity.
    pub fn report_segment(self) -> &'static str {
        match self {
            Self::Day => "daily",
            Self::Month => "monthly",
            Self::Year => "yearly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            other => Err(CoreError::InvalidPeriod(format!(
                "unknown granularity '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PeriodUnit
// ---------------------------------------------------------------------------

/// A calendar month. `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidPeriod(format!(
                "month must be 1-12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }
}

/// One calendar unit at a screen's granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodUnit {
    Day(NaiveDate),
    Month(YearMonth),
    Year(i32),
}

impl PeriodUnit {
    /// The unit containing `today` at the given granularity.
    pub fn current(granularity: Granularity, today: NaiveDate) -> Self {
        match granularity {
            Granularity::Day => Self::Day(today),
            Granularity::Month => Self::Month(YearMonth {
                year: today.year(),
                month: today.month(),
            }),
            Granularity::Year => Self::Year(today.year()),
        }
    }

    pub fn granularity(self) -> Granularity {
        match self {
            Self::Day(_) => Granularity::Day,
            Self::Month(_) => Granularity::Month,
            Self::Year(_) => Granularity::Year,
        }
    }

    /// Position on a linear axis of same-granularity units.
    fn ordinal(self) -> i64 {
        match self {
            Self::Day(d) => i64::from(d.num_days_from_ce()),
            Self::Month(ym) => i64::from(ym.year) * 12 + i64::from(ym.month) - 1,
            Self::Year(y) => i64::from(y),
        }
    }

    fn from_ordinal(granularity: Granularity, ordinal: i64) -> Option<Self> {
        match granularity {
            Granularity::Day => {
                let days = i32::try_from(ordinal).ok()?;
                NaiveDate::from_num_days_from_ce_opt(days).map(Self::Day)
            }
            Granularity::Month => {
                let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
                let month = u32::try_from(ordinal.rem_euclid(12) + 1).ok()?;
                Some(Self::Month(YearMonth { year, month }))
            }
            Granularity::Year => i32::try_from(ordinal).ok().map(Self::Year),
        }
    }

    /// Shift by `n` units (negative moves back in time).
    pub fn offset(self, n: i64) -> Option<Self> {
        Self::from_ordinal(self.granularity(), self.ordinal().checked_add(n)?)
    }

    /// Parse a unit in the wire format of the given granularity:
    /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    pub fn parse_as(granularity: Granularity, s: &str) -> Result<Self, CoreError> {
        let s = s.trim();
        let invalid = || CoreError::InvalidPeriod(format!("'{s}' is not a valid {granularity}"));
        match granularity {
            Granularity::Year => s.parse::<i32>().map(Self::Year).map_err(|_| invalid()),
            Granularity::Month => {
                let (y, m) = s.split_once('-').ok_or_else(invalid)?;
                let year = y.parse::<i32>().map_err(|_| invalid())?;
                let month = m.parse::<u32>().map_err(|_| invalid())?;
                YearMonth::new(year, month)
                    .map(Self::Month)
                    .map_err(|_| invalid())
            }
            Granularity::Day => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Self::Day)
                .map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Month(ym) => write!(f, "{:04}-{:02}", ym.year, ym.month),
            Self::Year(y) => write!(f, "{y:04}"),
        }
    }
}

impl FromStr for PeriodUnit {
    type Err = CoreError;

    /// Infers the granularity from the shape of the string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let granularity = match s.trim().matches('-').count() {
            0 => Granularity::Year,
            1 => Granularity::Month,
            _ => Granularity::Day,
        };
        Self::parse_as(granularity, s)
    }
}

impl Serialize for PeriodUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// PeriodRange
// ---------------------------------------------------------------------------

/// An inclusive span of same-granularity units with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct PeriodRange {
    start: PeriodUnit,
    end: PeriodUnit,
}

/// The chart's display window. Same shape as the table range, but governed
/// by [`PeriodSyncPlanner`].
pub type ChartWindow = PeriodRange;

#[derive(Deserialize)]
struct RawRange {
    start: PeriodUnit,
    end: PeriodUnit,
}

impl TryFrom<RawRange> for PeriodRange {
    type Error = CoreError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl PeriodRange {
    pub fn new(start: PeriodUnit, end: PeriodUnit) -> Result<Self, CoreError> {
        if start.granularity() != end.granularity() {
            return Err(CoreError::InvalidPeriod(format!(
                "range mixes {} and {} units",
                start.granularity(),
                end.granularity()
            )));
        }
        if start > end {
            return Err(CoreError::InvalidPeriod(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one unit.
    pub fn single(unit: PeriodUnit) -> Self {
        Self {
            start: unit,
            end: unit,
        }
    }

    /// Parse both ends in the wire format of `granularity`.
    pub fn parse(granularity: Granularity, start: &str, end: &str) -> Result<Self, CoreError> {
        Self::new(
            PeriodUnit::parse_as(granularity, start)?,
            PeriodUnit::parse_as(granularity, end)?,
        )
    }

    pub fn start(&self) -> PeriodUnit {
        self.start
    }

    pub fn end(&self) -> PeriodUnit {
        self.end
    }

    pub fn granularity(&self) -> Granularity {
        self.start.granularity()
    }

    /// Number of units covered, inclusive of both ends.
    pub fn span(&self) -> i64 {
        self.end.ordinal() - self.start.ordinal() + 1
    }

    pub fn is_single(&self, unit: PeriodUnit) -> bool {
        self.start == unit && self.end == unit
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Default rolling windows
// ---------------------------------------------------------------------------

/// Number of years in the yearly screen's rolling window.
pub const YEARLY_WINDOW_YEARS: i64 = 5;

/// The chart window a screen starts on and falls back to.
///
/// - yearly: the last five years, ending with the current year
/// - monthly: January through December of the current year
/// - daily: the first day of the current month through today
pub fn default_window(granularity: Granularity, today: NaiveDate) -> ChartWindow {
    let current = PeriodUnit::current(granularity, today);
    let start = match granularity {
        Granularity::Year => current.offset(1 - YEARLY_WINDOW_YEARS).unwrap_or(current),
        Granularity::Month => PeriodUnit::Month(YearMonth {
            year: today.year(),
            month: 1,
        }),
        Granularity::Day => PeriodUnit::Day(today.with_day(1).unwrap_or(today)),
    };
    let end = match granularity {
        Granularity::Month => PeriodUnit::Month(YearMonth {
            year: today.year(),
            month: 12,
        }),
        _ => current,
    };
    PeriodRange { start, end }
}

// ---------------------------------------------------------------------------
// Synchronisation rules
// ---------------------------------------------------------------------------

/// Widest query span (in units) the chart will track for a granularity.
/// `None` means the chart never tracks the query at that granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncRule {
    pub granularity: Granularity,
    pub max_span: Option<u32>,
}

/// Rules used by the sales-report screens.
pub const DEFAULT_SYNC_RULES: [SyncRule; 3] = [
    SyncRule {
        granularity: Granularity::Day,
        max_span: None,
    },
    SyncRule {
        granularity: Granularity::Month,
        max_span: Some(12),
    },
    SyncRule {
        granularity: Granularity::Year,
        max_span: Some(5),
    },
];

/// Everything the planner looks at when the table's query range changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSyncInput {
    query: PeriodRange,
    current: PeriodUnit,
    default_window: ChartWindow,
    is_first_load: bool,
}

impl ChartSyncInput {
    /// All three periods must share one granularity.
    pub fn new(
        query: PeriodRange,
        current: PeriodUnit,
        default_window: ChartWindow,
        is_first_load: bool,
    ) -> Result<Self, CoreError> {
        let g = query.granularity();
        if current.granularity() != g || default_window.granularity() != g {
            return Err(CoreError::InvalidPeriod(format!(
                "query is {g} but current unit is {} and default window is {}",
                current.granularity(),
                default_window.granularity()
            )));
        }
        Ok(Self {
            query,
            current,
            default_window,
            is_first_load,
        })
    }

    /// Input for a screen using its standard default window.
    pub fn for_today(query: PeriodRange, today: NaiveDate, is_first_load: bool) -> Self {
        let g = query.granularity();
        Self {
            query,
            current: PeriodUnit::current(g, today),
            default_window: default_window(g, today),
            is_first_load,
        }
    }

    pub fn query(&self) -> PeriodRange {
        self.query
    }

    pub fn default_window(&self) -> ChartWindow {
        self.default_window
    }
}

/// Which rule decided the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// First render always uses the default window.
    FirstLoad,
    /// The user queried exactly the current unit; never narrow to it.
    CurrentUnitPinned,
    /// Span within the limit; the chart follows the query.
    TrackQuery,
    /// Span beyond the limit; the chart keeps its default window.
    SpanTooWide,
    /// No span rule exists for this granularity.
    NoRule,
}

/// The planner's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPlan {
    pub window: ChartWindow,
    pub decision: SyncDecision,
}

/// Decides a chart window from a table query range.
#[derive(Debug, Clone)]
pub struct PeriodSyncPlanner {
    rules: Vec<SyncRule>,
}

impl Default for PeriodSyncPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_RULES.to_vec())
    }
}

impl PeriodSyncPlanner {
    pub fn new(rules: Vec<SyncRule>) -> Self {
        Self { rules }
    }

    pub fn rule_for(&self, granularity: Granularity) -> Option<&SyncRule> {
        self.rules.iter().find(|r| r.granularity == granularity)
    }

    pub fn plan(&self, input: &ChartSyncInput) -> ChartPlan {
        let fallback = |decision| ChartPlan {
            window: input.default_window,
            decision,
        };

        if input.is_first_load {
            return fallback(SyncDecision::FirstLoad);
        }
        if input.query.is_single(input.current) {
            return fallback(SyncDecision::CurrentUnitPinned);
        }

        let max_span = self
            .rule_for(input.query.granularity())
            .and_then(|r| r.max_span);
        match max_span {
            None => fallback(SyncDecision::NoRule),
            Some(limit) if input.query.span() <= i64::from(limit) => ChartPlan {
                window: input.query,
                decision: SyncDecision::TrackQuery,
            },
            Some(_) => fallback(SyncDecision::SpanTooWide),
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn years(start: i32, end: i32) -> PeriodRange {
        PeriodRange::new(PeriodUnit::Year(start), PeriodUnit::Year(end)).unwrap()
    }

    fn months(start: &str, end: &str) -> PeriodRange {
        PeriodRange::parse(Granularity::Month, start, end).unwrap()
    }

    fn plan(query: PeriodRange, first_load: bool) -> ChartPlan {
        PeriodSyncPlanner::default().plan(&ChartSyncInput::for_today(query, today(), first_load))
    }

    // -- yearly screen -------------------------------------------------------

    #[test]
    fn single_past_year_is_tracked() {
        let p = plan(years(2023, 2023), false);
        assert_eq!(p.window, years(2023, 2023));
        assert_eq!(p.decision, SyncDecision::TrackQuery);
    }

    #[test]
    fn five_year_span_is_tracked() {
        assert_eq!(plan(years(2019, 2023), false).window, years(2019, 2023));
    }

    #[test]
    fn wide_year_span_keeps_default_window() {
        let p = plan(years(2015, 2023), false);
        assert_eq!(p.window, years(2022, 2026));
        assert_eq!(p.decision, SyncDecision::SpanTooWide);
    }

    #[test]
    fn current_year_only_keeps_default_window() {
        let p = plan(years(2026, 2026), false);
        assert_eq!(p.window, years(2022, 2026));
        assert_eq!(p.decision, SyncDecision::CurrentUnitPinned);
    }

    #[test]
    fn range_ending_in_current_year_is_tracked() {
        assert_eq!(plan(years(2025, 2026), false).window, years(2025, 2026));
    }

    // -- monthly screen ------------------------------------------------------

    #[test]
    fn twelve_months_are_tracked() {
        let q = months("2024-03", "2025-02");
        assert_eq!(q.span(), 12);
        assert_eq!(plan(q, false).window, q);
    }

    #[test]
    fn thirteen_months_keep_default_window() {
        let q = months("2024-03", "2025-03");
        let p = plan(q, false);
        assert_eq!(p.window, months("2026-01", "2026-12"));
        assert_eq!(p.decision, SyncDecision::SpanTooWide);
    }

    #[test]
    fn current_month_only_keeps_default_window() {
        let p = plan(months("2026-10", "2026-10"), false);
        assert_eq!(p.decision, SyncDecision::CurrentUnitPinned);
        assert_eq!(p.window, months("2026-01", "2026-12"));
    }

    // -- daily screen --------------------------------------------------------

    #[test]
    fn daily_screen_never_tracks() {
        let q = PeriodRange::parse(Granularity::Day, "2026-09-01", "2026-09-03").unwrap();
        let p = plan(q, false);
        assert_eq!(p.decision, SyncDecision::NoRule);
        assert_eq!(
            p.window,
            PeriodRange::parse(Granularity::Day, "2026-10-01", "2026-10-18").unwrap()
        );
    }

    // -- first load ----------------------------------------------------------

    #[test]
    fn first_load_always_uses_default_window() {
        for q in [years(2023, 2023), years(2015, 2023), years(2026, 2026)] {
            let p = plan(q, true);
            assert_eq!(p.window, years(2022, 2026));
            assert_eq!(p.decision, SyncDecision::FirstLoad);
        }
    }

    #[test]
    fn planning_is_idempotent() {
        let input = ChartSyncInput::for_today(years(2020, 2021), today(), false);
        let planner = PeriodSyncPlanner::default();
        assert_eq!(planner.plan(&input), planner.plan(&input));
        assert_eq!(planner.plan(&input).window, years(2020, 2021));
    }

    #[test]
    fn custom_rules_override_defaults() {
        let planner = PeriodSyncPlanner::new(vec![SyncRule {
            granularity: Granularity::Year,
            max_span: Some(10),
        }]);
        let input = ChartSyncInput::for_today(years(2015, 2023), today(), false);
        assert_eq!(planner.plan(&input).window, years(2015, 2023));
    }

    // -- ranges and units ----------------------------------------------------

    #[test]
    fn reversed_range_is_rejected() {
        assert_matches!(
            PeriodRange::new(PeriodUnit::Year(2024), PeriodUnit::Year(2020)),
            Err(CoreError::InvalidPeriod(_))
        );
    }

    #[test]
    fn mixed_granularity_is_rejected() {
        let month = PeriodUnit::parse_as(Granularity::Month, "2024-01").unwrap();
        assert_matches!(
            PeriodRange::new(PeriodUnit::Year(2020), month),
            Err(CoreError::InvalidPeriod(_))
        );
        assert_matches!(
            ChartSyncInput::new(years(2020, 2021), month, years(2022, 2026), false),
            Err(CoreError::InvalidPeriod(_))
        );
    }

    #[test]
    fn month_span_crosses_year_boundary() {
        assert_eq!(months("2023-11", "2024-02").span(), 4);
    }

    #[test]
    fn default_windows_per_granularity() {
        assert_eq!(default_window(Granularity::Year, today()), years(2022, 2026));
        assert_eq!(
            default_window(Granularity::Month, today()),
            months("2026-01", "2026-12")
        );
        assert_eq!(
            default_window(Granularity::Day, today()),
            PeriodRange::parse(Granularity::Day, "2026-10-01", "2026-10-18").unwrap()
        );
    }

    #[test]
    fn month_offset_wraps() {
        let unit = PeriodUnit::parse_as(Granularity::Month, "2024-01").unwrap();
        assert_eq!(unit.offset(-1).unwrap().to_string(), "2023-12");
        assert_eq!(unit.offset(12).unwrap().to_string(), "2025-01");
    }

    #[test]
    fn units_parse_by_shape() {
        assert_eq!("2023".parse::<PeriodUnit>().unwrap(), PeriodUnit::Year(2023));
        assert_eq!(
            "2023-04".parse::<PeriodUnit>().unwrap().granularity(),
            Granularity::Month
        );
        assert_eq!(
            "2023-04-05".parse::<PeriodUnit>().unwrap().to_string(),
            "2023-04-05"
        );
        assert!("2023-13".parse::<PeriodUnit>().is_err());
    }

    #[test]
    fn range_deserialization_enforces_order() {
        let ok: PeriodRange = serde_json::from_str(r#"{"start":"2020","end":"2022"}"#).unwrap();
        assert_eq!(ok.span(), 3);
        assert!(serde_json::from_str::<PeriodRange>(r#"{"start":"2022","end":"2020"}"#).is_err());
    }
}
