//! Type definitions for episode records.
//!
//! The remote dataset defines the exact shape of an episode. Only `rank` and
//! `title` are required; the commonly used descriptive fields are typed and
//! every other field is carried through untouched in [`Episode::extra`].

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is valid"));

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})").expect("iso date pattern is valid")
});

static DMY_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})").expect("dmy date pattern is valid")
});

static LONG_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\s+(\d{1,2}),?\s+(\d{4})").expect("long date pattern is valid")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

/// Keys tried, in order, when an opaque field is an object.
const OBJECT_LABEL_KEYS: [&str; 4] = ["name", "character", "actor", "incarnation"];

/// One record of the episode dataset.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Episode {
    /// Unique rank; the default sort key.
    pub rank: i64,

    /// Episode title.
    pub title: String,

    /// Series (season) number.
    #[serde(default, alias = "season", deserialize_with = "lenient_i64")]
    pub series: Option<i64>,

    /// Production era, e.g. "Classic" or "Modern".
    #[serde(default, deserialize_with = "lenient_string")]
    pub era: Option<String>,

    /// Original broadcast date as given by the source (formats vary).
    #[serde(default, alias = "air_date", deserialize_with = "lenient_string")]
    pub broadcast_date: Option<String>,

    /// Audience rating.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,

    /// Every other field of the source record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Episode {
    /// Create an episode with only the required fields set.
    pub fn new(rank: i64, title: impl Into<String>) -> Self {
        Self {
            rank,
            title: title.into(),
            series: None,
            era: None,
            broadcast_date: None,
            rating: None,
            extra: Map::new(),
        }
    }

    /// The first four-digit year found in the broadcast date.
    ///
    /// # Examples
    ///
    /// ```
    /// use episode_explorer::types::Episode;
    ///
    /// let mut ep = Episode::new(1, "An Unearthly Child");
    /// ep.broadcast_date = Some("23/11/1963".to_string());
    /// assert_eq!(ep.year(), Some(1963));
    /// ```
    pub fn year(&self) -> Option<i64> {
        let date = self.broadcast_date.as_deref()?;
        YEAR_RE
            .captures(date)
            .and_then(|caps| caps[1].parse().ok())
    }

    /// A sortable `(year, month, day)` key for the broadcast date.
    ///
    /// Understands `YYYY-MM-DD`, `DD/MM/YYYY` and `Month D, YYYY`; anything
    /// else containing a year sorts as the start of that year.
    pub fn broadcast_key(&self) -> Option<(i64, u32, u32)> {
        let date = self.broadcast_date.as_deref()?;

        if let Some(caps) = ISO_DATE_RE.captures(date) {
            return Some((caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?));
        }
        if let Some(caps) = DMY_DATE_RE.captures(date) {
            return Some((caps[3].parse().ok()?, caps[2].parse().ok()?, caps[1].parse().ok()?));
        }
        if let Some(caps) = LONG_DATE_RE.captures(date) {
            if let Some(month) = month_number(&caps[1]) {
                return Some((caps[3].parse().ok()?, month, caps[2].parse().ok()?));
            }
        }
        self.year().map(|year| (year, 0, 0))
    }

    /// Display text for an opaque field, if present and non-null.
    pub fn extra_text(&self, key: &str) -> Option<String> {
        self.extra.get(key).and_then(value_text)
    }

    /// Format the episode as a single line.
    ///
    /// # Examples
    ///
    /// ```
    /// use episode_explorer::types::Episode;
    ///
    /// let mut ep = Episode::new(3, "Blink");
    /// assert_eq!(ep.to_display(), "#3 Blink");
    ///
    /// ep.series = Some(3);
    /// assert_eq!(ep.to_display(), "#3 Blink (series 3)");
    /// ```
    pub fn to_display(&self) -> String {
        match self.series {
            Some(series) => format!("#{} {} (series {})", self.rank, self.title, series),
            None => format!("#{} {}", self.rank, self.title),
        }
    }

    /// All text this episode can be searched by.
    pub(crate) fn searchable_text(&self) -> Vec<String> {
        let mut text = vec![self.title.clone()];
        text.extend(self.era.clone());
        text.extend(self.broadcast_date.clone());
        text.extend(self.extra.values().filter_map(value_text));
        text
    }
}

/// Render an opaque JSON value as display text.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => OBJECT_LABEL_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(value_text)),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
