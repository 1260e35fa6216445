use chrono::NaiveDate;

use crate::dates::{end_of_day, parse_record_date, start_of_day};
use crate::money::Money;

/// Case-insensitive substring match. Blank text matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter(Option<String>);

impl TextFilter {
    pub fn new(value: impl AsRef<str>) -> Self {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            TextFilter(None)
        } else {
            TextFilter(Some(trimmed.to_lowercase()))
        }
    }

    pub fn from_opt(value: Option<&str>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.0.is_some()
    }

    pub fn matches(&self, haystack: &str) -> bool {
        match &self.0 {
            Some(needle) => haystack.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    /// True if any of `fields` contains the needle.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        match &self.0 {
            Some(_) => fields.into_iter().any(|f| self.matches(f)),
            None => true,
        }
    }
}

/// Equality on a categorical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exact<V>(Option<V>);

impl<V> Default for Exact<V> {
    fn default() -> Self {
        Exact(None)
    }
}

impl<V: PartialEq> Exact<V> {
    pub fn new(value: Option<V>) -> Self {
        Exact(value)
    }

    pub fn is_active(&self) -> bool {
        self.0.is_some()
    }

    pub fn matches(&self, value: &V) -> bool {
        self.0.as_ref().is_none_or(|wanted| wanted == value)
    }
}

impl Exact<String> {
    /// Whole-value comparison without allocating.
    pub fn matches_text(&self, value: &str) -> bool {
        self.0.as_ref().is_none_or(|wanted| wanted == value)
    }
}

/// Inclusive bounds, each optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumRange {
    pub min: Option<Money>,
    pub max: Option<Money>,
}

impl NumRange {
    pub fn new(min: Option<Money>, max: Option<Money>) -> Self {
        Self { min, max }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: Money) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// `all | true | false` partition on a boolean field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriState {
    #[default]
    All,
    Yes,
    No,
}

impl TriState {
    pub fn is_active(&self) -> bool {
        *self != TriState::All
    }

    pub fn matches(&self, value: bool) -> bool {
        match self {
            TriState::All => true,
            TriState::Yes => value,
            TriState::No => !value,
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => TriState::All,
            Some(true) => TriState::Yes,
            Some(false) => TriState::No,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCheck {
    Inside,
    Outside,
    /// The record's date could not be read; callers keep the record.
    Unparseable,
}

/// Calendar-day range; `to` covers the whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn check(&self, raw: &str) -> DateCheck {
        if !self.is_active() {
            return DateCheck::Inside;
        }
        let Some(date) = parse_record_date(raw) else {
            return DateCheck::Unparseable;
        };
        let at = start_of_day(date);
        let after_from = self.from.is_none_or(|from| at >= start_of_day(from));
        let before_to = self.to.is_none_or(|to| at <= end_of_day(to));
        if after_from && before_to {
            DateCheck::Inside
        } else {
            DateCheck::Outside
        }
    }
}
