//! Filtering and sorting of the episode set.
//!
//! Everything here is pure: [`apply`] takes the episode set, the active
//! [`FilterSet`] and the [`SortState`] and returns a freshly built filtered
//! set. Nothing is mutated in place and nothing can fail.

use crate::error::{AppError, Result};
use crate::types::Episode;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A column the episode table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Rank,
    Title,
    Series,
    Era,
    Broadcast,
    Rating,
}

impl SortField {
    /// Every sortable field, in column order.
    pub const ALL: [SortField; 6] = [
        SortField::Rank,
        SortField::Title,
        SortField::Series,
        SortField::Era,
        SortField::Broadcast,
        SortField::Rating,
    ];

    /// Column header text.
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Rank => "Rank",
            SortField::Title => "Title",
            SortField::Series => "Series",
            SortField::Era => "Era",
            SortField::Broadcast => "Broadcast",
            SortField::Rating => "Rating",
        }
    }

    /// The field bound to a 1-based column number.
    pub fn from_column(column: usize) -> Option<Self> {
        column
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rank" => Ok(SortField::Rank),
            "title" => Ok(SortField::Title),
            "series" | "season" => Ok(SortField::Series),
            "era" => Ok(SortField::Era),
            "broadcast" | "date" | "broadcast_date" | "air_date" => Ok(SortField::Broadcast),
            "rating" => Ok(SortField::Rating),
            other => Err(AppError::InvalidInput(format!(
                "unknown sort field '{}'",
                other
            ))),
        }
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Rank,
            ascending: true,
        }
    }
}

impl SortState {
    /// Sort by `field`; choosing the current field again flips the direction.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.ascending = !self.ascending;
        } else {
            self.field = field;
            self.ascending = true;
        }
    }

    /// Compare two episodes under this sort state.
    ///
    /// Descending inverts the comparison, so equal keys still keep their
    /// source order under a stable sort.
    pub fn compare(&self, a: &Episode, b: &Episode) -> Ordering {
        let ordering = compare(a, b, self.field);
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }

    /// Arrow shown next to the sorted column header.
    pub fn indicator(&self) -> &'static str {
        if self.ascending { "▲" } else { "▼" }
    }
}

/// Compare two episodes on a single field, ascending.
///
/// Missing values order after present ones and text compares
/// case-insensitively.
pub fn compare(a: &Episode, b: &Episode, field: SortField) -> Ordering {
    match field {
        SortField::Rank => a.rank.cmp(&b.rank),
        SortField::Title => compare_text(&a.title, &b.title),
        SortField::Series => compare_present(a.series, b.series, |x, y| x.cmp(&y)),
        SortField::Era => compare_present(a.era.as_deref(), b.era.as_deref(), compare_text),
        SortField::Broadcast => {
            compare_present(a.broadcast_key(), b.broadcast_key(), |x, y| x.cmp(&y))
        }
        SortField::Rating => compare_present(a.rating, b.rating, |x, y| x.total_cmp(&y)),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn compare_present<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// An inclusive range with optional ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range. A missing value never does.
    pub fn contains(&self, value: Option<T>) -> bool {
        let Some(value) = value else {
            return false;
        };
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A value that can bound a range predicate.
pub trait RangeValue: FromStr + PartialOrd + Copy {
    /// Whether the parsed value is usable as a bound.
    fn is_valid(&self) -> bool {
        true
    }
}

impl RangeValue for i64 {}

impl RangeValue for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl<T: RangeValue> Bounds<T> {
    /// Parse `a-b`, `a-`, `-b` or a single value `a`. Ends may be negative:
    /// `-1-5`, `-3-`, `--1`.
    fn parse(text: &str) -> Option<Self> {
        let parse_end = |s: &str| -> Option<Option<T>> {
            let s = s.trim();
            if s.is_empty() {
                return Some(None);
            }
            let value: T = s.parse().ok()?;
            value.is_valid().then_some(Some(value))
        };

        let bounds = match split_range(text) {
            Some((min, max)) => Self::new(parse_end(min)?, parse_end(max)?),
            None => {
                let value = parse_end(text)??;
                Self::new(Some(value), Some(value))
            }
        };

        match (bounds.min, bounds.max) {
            (None, None) => None,
            (Some(min), Some(max)) if min > max => None,
            _ => Some(bounds),
        }
    }
}

/// Find the range separator: the first `-` that follows a digit or `.`,
/// else a leading `-`.
fn split_range(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let sep = (1..bytes.len())
        .find(|&i| bytes[i] == b'-' && (bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.'))
        .or_else(|| text.starts_with('-').then_some(0))?;
    Some((&text[..sep], &text[sep + 1..]))
}

impl<T: fmt::Display + PartialEq> fmt::Display for Bounds<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.min, &self.max) {
            (Some(min), Some(max)) if min == max => {
                // A lone negative value would read back as an upper bound
                let value = min.to_string();
                if value.starts_with('-') {
                    write!(f, "{}-{}", value, value)
                } else {
                    write!(f, "{}", value)
                }
            }
            (Some(min), Some(max)) => write!(f, "{}-{}", min, max),
            (Some(min), None) => write!(f, "{}-", min),
            (None, Some(max)) => write!(f, "-{}", max),
            (None, None) => Ok(()),
        }
    }
}

/// A boolean test applied to one episode.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Title contains the text, case-insensitively
    TitleContains(String),
    /// Era equals the text, case-insensitively
    EraIs(String),
    /// Any text field, including opaque ones, contains the text
    Search(String),
    /// Series number within range
    Series(Bounds<i64>),
    /// Broadcast year within range
    Year(Bounds<i64>),
    /// Rating within range
    Rating(Bounds<f64>),
}

impl Predicate {
    pub fn matches(&self, episode: &Episode) -> bool {
        match self {
            Predicate::TitleContains(needle) => contains_ci(&episode.title, needle),
            Predicate::EraIs(era) => episode
                .era
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(era)),
            Predicate::Search(needle) => episode
                .searchable_text()
                .iter()
                .any(|text| contains_ci(text, needle)),
            Predicate::Series(bounds) => bounds.contains(episode.series),
            Predicate::Year(bounds) => bounds.contains(episode.year()),
            Predicate::Rating(bounds) => bounds.contains(episode.rating),
        }
    }

    fn to_term(&self) -> String {
        match self {
            Predicate::TitleContains(text) => text.clone(),
            Predicate::EraIs(era) => format!("era:{}", era),
            Predicate::Search(text) => format!("any:{}", text),
            Predicate::Series(bounds) => format!("series:{}", bounds),
            Predicate::Year(bounds) => format!("year:{}", bounds),
            Predicate::Rating(bounds) => format!("rating:{}", bounds),
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The active predicates, combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether the episode satisfies every predicate. An empty set matches all.
    pub fn matches(&self, episode: &Episode) -> bool {
        self.predicates.iter().all(|p| p.matches(episode))
    }

    /// Parse filter-bar syntax.
    ///
    /// Terms are whitespace separated. `series:`, `year:`, `rating:`, `era:`
    /// and `any:` introduce qualified terms; all remaining words are joined
    /// into a single title match.
    ///
    /// # Examples
    ///
    /// ```
    /// use episode_explorer::query::{Bounds, FilterSet, Predicate};
    ///
    /// let filters = FilterSet::parse("dalek series:1-4").unwrap();
    /// assert_eq!(
    ///     filters.predicates,
    ///     vec![
    ///         Predicate::TitleContains("dalek".to_string()),
    ///         Predicate::Series(Bounds::new(Some(1), Some(4))),
    ///     ]
    /// );
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let mut predicates = Vec::new();
        let mut title_words = Vec::new();

        for term in input.split_whitespace() {
            let Some((key, value)) = term.split_once(':') else {
                title_words.push(term);
                continue;
            };

            let predicate = match key.to_lowercase().as_str() {
                "series" | "season" => Predicate::Series(parse_bounds(key, value)?),
                "year" => Predicate::Year(parse_bounds(key, value)?),
                "rating" => Predicate::Rating(parse_bounds(key, value)?),
                "era" => Predicate::EraIs(non_empty(key, value)?),
                "any" => Predicate::Search(non_empty(key, value)?),
                _ => {
                    title_words.push(term);
                    continue;
                }
            };
            predicates.push(predicate);
        }

        if !title_words.is_empty() {
            predicates.insert(0, Predicate::TitleContains(title_words.join(" ")));
        }

        Ok(Self { predicates })
    }

    /// Render back to filter-bar syntax.
    pub fn to_query(&self) -> String {
        self.predicates
            .iter()
            .map(Predicate::to_term)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn parse_bounds<T: RangeValue>(key: &str, value: &str) -> Result<Bounds<T>> {
    Bounds::parse(value).ok_or_else(|| {
        AppError::InvalidInput(format!("invalid range '{}' for '{}'", value, key))
    })
}

fn non_empty(key: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        Err(AppError::InvalidInput(format!("'{}:' needs a value", key)))
    } else {
        Ok(value.to_string())
    }
}

/// Produce the filtered set: every matching episode, stably sorted.
pub fn apply(episodes: &[Episode], filters: &FilterSet, sort: &SortState) -> Vec<Episode> {
    let mut filtered: Vec<Episode> = episodes
        .iter()
        .filter(|e| filters.matches(e))
        .cloned()
        .collect();
    // sort_by is stable
    filtered.sort_by(|a, b| sort.compare(a, b));
    filtered
}
