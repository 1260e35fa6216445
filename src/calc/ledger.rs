//! Dashboard figures derived from monthly ledger rows.

use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::fmt;

use crate::dates::parse_record_date;
use crate::models::LedgerEntry;
use crate::money::Money;

/// Most recent month first. Uses calendar dates, not string order; rows whose
/// month does not parse go last in their original order.
pub fn sort_by_month_desc(entries: &mut [LedgerEntry]) {
    entries.sort_by(|a, b| {
        match (parse_record_date(&a.month), parse_record_date(&b.month)) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

fn outgoings(entry: &LedgerEntry) -> Money {
    entry.teacher_pays + entry.expenses
}

/// Unrounded signed margin in percent; zero revenue gives zero.
fn raw_margin(entry: &LedgerEntry) -> Decimal {
    let revenue = entry.student_fees.amount();
    if revenue.is_zero() {
        return Decimal::ZERO;
    }
    (revenue - outgoings(entry).amount()) / revenue * Decimal::from(100)
}

/// Profit margin clamped to 0..=100, the dashboard health score.
pub fn health_score(entry: &LedgerEntry) -> Decimal {
    raw_margin(entry).clamp(Decimal::ZERO, Decimal::from(100))
}

/// Signed profit margin in percent, one decimal.
pub fn profit_margin(entry: &LedgerEntry) -> Decimal {
    round1(raw_margin(entry))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    pub fn of(score: Decimal) -> Self {
        if score >= Decimal::from(80) {
            HealthBand::Excellent
        } else if score >= Decimal::from(50) {
            HealthBand::Good
        } else if score >= Decimal::from(25) {
            HealthBand::Fair
        } else {
            HealthBand::Poor
        }
    }
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HealthBand::Excellent => "excellent",
            HealthBand::Good => "good",
            HealthBand::Fair => "fair",
            HealthBand::Poor => "poor",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    Value(Decimal),
    NotApplicable,
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Value(v) => write!(f, "{v:.2}"),
            Ratio::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Revenue divided by teacher pays plus expenses, two decimals.
pub fn revenue_expense_ratio(entry: &LedgerEntry) -> Ratio {
    let cost = outgoings(entry).amount();
    if cost.is_zero() {
        return Ratio::NotApplicable;
    }
    Ratio::Value(
        (entry.student_fees.amount() / cost)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Revenue,
    TeacherPays,
    Expenses,
    Profit,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Revenue,
        Metric::TeacherPays,
        Metric::Expenses,
        Metric::Profit,
    ];

    pub fn value(&self, entry: &LedgerEntry) -> Money {
        match self {
            Metric::Revenue => entry.student_fees,
            Metric::TeacherPays => entry.teacher_pays,
            Metric::Expenses => entry.expenses,
            Metric::Profit => entry.profit,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::TeacherPays => "Teacher Payments",
            Metric::Expenses => "Expenses",
            Metric::Profit => "Profit",
        }
    }

    /// Whether a rise in this figure is good news.
    pub fn higher_is_better(&self) -> bool {
        matches!(self, Metric::Revenue | Metric::Profit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub percent: Decimal,
    pub direction: Direction,
    pub favorable: bool,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            Direction::Up => "▲",
            Direction::Down => "▼",
        };
        write!(f, "{arrow} {:.1}%", self.percent.abs())
    }
}

/// `(current - previous) / previous * 100`, one decimal; zero when either row
/// is missing or the previous value is zero.
pub fn month_over_month(
    current: Option<&LedgerEntry>,
    previous: Option<&LedgerEntry>,
    metric: Metric,
) -> Decimal {
    let (Some(current), Some(previous)) = (current, previous) else {
        return Decimal::ZERO;
    };
    let prev = metric.value(previous).amount();
    if prev.is_zero() {
        return Decimal::ZERO;
    }
    let cur = metric.value(current).amount();
    round1((cur - prev) / prev * Decimal::from(100))
}

pub fn change(current: Option<&LedgerEntry>, previous: Option<&LedgerEntry>, metric: Metric) -> Change {
    let percent = month_over_month(current, previous, metric);
    let direction = if percent >= Decimal::ZERO {
        Direction::Up
    } else {
        Direction::Down
    };
    let favorable = (direction == Direction::Up) == metric.higher_is_better();
    Change {
        percent,
        direction,
        favorable,
    }
}

/// One point of the revenue/expense/profit trend.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub month: String,
    pub revenue: Money,
    pub expenses: Money,
    pub profit: Money,
}

/// The latest `months` rows of a month-descending list, oldest first.
pub fn trend(sorted_desc: &[LedgerEntry], months: usize) -> Vec<TrendPoint> {
    sorted_desc
        .iter()
        .take(months)
        .rev()
        .map(|e| TrendPoint {
            month: crate::dates::month_label(&e.month),
            revenue: e.student_fees,
            expenses: outgoings(e),
            profit: e.profit,
        })
        .collect()
}

/// Everything the dashboard shows for the current period.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub current: LedgerEntry,
    pub previous: Option<LedgerEntry>,
    pub health: Decimal,
    pub band: HealthBand,
    pub margin: Decimal,
    pub ratio: Ratio,
    pub changes: Vec<(Metric, Change)>,
    pub trend: Vec<TrendPoint>,
}

/// Build the dashboard from an unsorted ledger; `None` when there are no rows.
pub fn dashboard(mut entries: Vec<LedgerEntry>, months: usize) -> Option<Dashboard> {
    sort_by_month_desc(&mut entries);
    let current = entries.first()?.clone();
    let previous = entries.get(1).cloned();
    let health = health_score(&current);
    let changes = Metric::ALL
        .into_iter()
        .map(|m| (m, change(Some(&current), previous.as_ref(), m)))
        .collect();

    Some(Dashboard {
        band: HealthBand::of(health),
        health,
        margin: profit_margin(&current),
        ratio: revenue_expense_ratio(&current),
        changes,
        trend: trend(&entries, months),
        previous,
        current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn entry(month: &str, fees: i64, pays: i64, expenses: i64, profit: i64) -> LedgerEntry {
        LedgerEntry {
            id: 0,
            month: month.to_string(),
            student_fees: Money::from(fees),
            teacher_pays: Money::from(pays),
            expenses: Money::from(expenses),
            profit: Money::from(profit),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn sorts_across_year_boundary() {
        let mut rows = vec![
            entry("2024-12-01", 1, 0, 0, 0),
            entry("2025-01-01", 2, 0, 0, 0),
            entry("2024-11-01", 3, 0, 0, 0),
        ];
        sort_by_month_desc(&mut rows);
        let months: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, ["2025-01-01", "2024-12-01", "2024-11-01"]);
    }

    #[test]
    fn sorts_mixed_formats_by_calendar() {
        let mut rows = vec![
            entry("1/1/2025", 0, 0, 0, 0),
            entry("2025-04-01", 0, 0, 0, 0),
            entry("garbage", 0, 0, 0, 0),
            entry("12/1/2024", 0, 0, 0, 0),
        ];
        sort_by_month_desc(&mut rows);
        let months: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, ["2025-04-01", "1/1/2025", "12/1/2024", "garbage"]);
    }

    #[test]
    fn zero_revenue_scores_zero() {
        let row = entry("2025-04-01", 0, 90000, 93000, 0);
        assert_eq!(health_score(&row), Decimal::ZERO);
        assert_eq!(profit_margin(&row), Decimal::ZERO);
        assert_eq!(HealthBand::of(health_score(&row)), HealthBand::Poor);
    }

    #[test]
    fn margin_example() {
        let row = entry("2025-03-01", 350000, 35000, 10000, 100000);
        assert_eq!(profit_margin(&row), dec("87.1"));
        assert_eq!(health_score(&row).round_dp(1), dec("87.1"));
        assert_eq!(HealthBand::of(health_score(&row)), HealthBand::Excellent);
        assert_eq!(revenue_expense_ratio(&row).to_string(), "7.78");
    }

    #[test]
    fn losses_clamp_health_but_not_margin() {
        let row = entry("2025-02-01", 100, 150, 50, -100);
        assert_eq!(health_score(&row), Decimal::ZERO);
        assert_eq!(profit_margin(&row), dec("-100.0"));
    }

    #[test]
    fn ratio_not_applicable_without_costs() {
        let row = entry("2025-02-01", 100, 0, 0, 100);
        assert_eq!(revenue_expense_ratio(&row), Ratio::NotApplicable);
        assert_eq!(revenue_expense_ratio(&row).to_string(), "N/A");
    }

    #[test]
    fn month_over_month_rules() {
        let april = entry("2025-04-01", 0, 90000, 93000, 308000);
        let march = entry("2025-03-01", 350000, 35000, 10000, 100000);
        assert_eq!(
            month_over_month(Some(&april), Some(&march), Metric::TeacherPays),
            dec("157.1")
        );
        assert_eq!(
            month_over_month(Some(&april), Some(&march), Metric::Revenue),
            dec("-100.0")
        );
        assert_eq!(month_over_month(Some(&march), Some(&april), Metric::Revenue), Decimal::ZERO);
        assert_eq!(month_over_month(Some(&april), None, Metric::Revenue), Decimal::ZERO);
    }

    #[test]
    fn framing_depends_on_metric() {
        let april = entry("2025-04-01", 0, 90000, 93000, 308000);
        let march = entry("2025-03-01", 350000, 35000, 10000, 100000);
        let revenue = change(Some(&april), Some(&march), Metric::Revenue);
        assert_eq!(revenue.direction, Direction::Down);
        assert!(!revenue.favorable);
        let expenses = change(Some(&april), Some(&march), Metric::Expenses);
        assert_eq!(expenses.direction, Direction::Up);
        assert!(!expenses.favorable);
        assert_eq!(expenses.to_string(), "▲ 830.0%");
    }

    #[test]
    fn dashboard_uses_latest_month_and_chronological_trend() {
        let rows = vec![
            entry("2025-01-01", 350000, 10000, 25000, 150000),
            entry("2025-04-01", 0, 90000, 93000, 308000),
            entry("2025-02-01", 250000, 90000, 10000, 350000),
            entry("2025-03-01", 350000, 35000, 10000, 100000),
        ];
        let board = dashboard(rows, 3).unwrap();
        assert_eq!(board.current.month, "2025-04-01");
        assert_eq!(board.previous.as_ref().unwrap().month, "2025-03-01");
        let labels: Vec<&str> = board.trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(labels, ["February 2025", "March 2025", "April 2025"]);
        assert_eq!(board.trend[2].expenses.to_string(), "183000.00");
        assert!(dashboard(Vec::new(), 3).is_none());
    }
}
