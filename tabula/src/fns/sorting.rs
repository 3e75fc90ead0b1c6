//! Sorting strategies

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::Value;

pub(crate) static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9]+").expect("Invalid regex pattern"));

/// Names of the built-in sorting strategies.
pub const BUILTIN_SORTING_FNS: &[&str] = &[
    "alphanumeric",
    "alphanumericCaseSensitive",
    "text",
    "textCaseSensitive",
    "datetime",
    "basic",
];

/// Compares two cell values in ascending order.
///
/// Direction, `invert_sorting` and missing-value placement are applied by the
/// sorted row model; the function only compares.
#[derive(Clone)]
pub struct SortingFn(Rc<dyn Fn(&Value, &Value) -> Ordering>);

impl SortingFn {
    /// Wraps a comparison.
    pub fn new(compare: impl Fn(&Value, &Value) -> Ordering + 'static) -> Self {
        Self(Rc::new(compare))
    }

    /// Compares two values.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        (self.0)(a, b)
    }

    /// Looks up a built-in strategy by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "alphanumeric" => Some(Self::alphanumeric()),
            "alphanumericCaseSensitive" => Some(Self::alphanumeric_case_sensitive()),
            "text" => Some(Self::text()),
            "textCaseSensitive" => Some(Self::text_case_sensitive()),
            "datetime" => Some(Self::datetime()),
            "basic" => Some(Self::basic()),
            _ => None,
        }
    }

    /// Natural order on lowercased text: digit runs compare as numbers.
    pub fn alphanumeric() -> Self {
        Self::new(|a, b| compare_alphanumeric(&sort_text(a).to_lowercase(), &sort_text(b).to_lowercase()))
    }

    /// Natural order on text, case-sensitive.
    pub fn alphanumeric_case_sensitive() -> Self {
        Self::new(|a, b| compare_alphanumeric(&sort_text(a), &sort_text(b)))
    }

    /// Lexicographic order on lowercased text.
    pub fn text() -> Self {
        Self::new(|a, b| sort_text(a).to_lowercase().cmp(&sort_text(b).to_lowercase()))
    }

    /// Lexicographic order on text, case-sensitive.
    pub fn text_case_sensitive() -> Self {
        Self::new(|a, b| sort_text(a).cmp(&sort_text(b)))
    }

    /// Chronological order; non-dates fall back to basic ordering.
    pub fn datetime() -> Self {
        Self::new(|a, b| match (a.as_datetime(), b.as_datetime()) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => a.compare(b),
        })
    }

    /// [`Value::compare`].
    pub fn basic() -> Self {
        Self::new(|a, b| a.compare(b))
    }
}

impl fmt::Debug for SortingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SortingFn(..)")
    }
}

/// Strings sort as-is, numbers by their text, everything else as empty.
fn sort_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Int(_) | Value::Float(_) => value.to_text(),
        _ => String::new(),
    }
}

/// Splits text into alternating non-digit and digit chunks.
fn chunks(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in DIGIT_RUNS.find_iter(text) {
        if m.start() > last {
            out.push(&text[last..m.start()]);
        }
        out.push(m.as_str());
        last = m.end();
    }
    if last < text.len() {
        out.push(&text[last..]);
    }
    out
}

/// Chunk-wise comparison: two digit chunks compare numerically, two text
/// chunks lexicographically, and a text chunk sorts before a digit chunk.
pub(crate) fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let a = chunks(a);
    let b = chunks(b);

    for (aa, bb) in a.iter().zip(b.iter()) {
        let an = aa.parse::<f64>().ok().filter(|_| aa.bytes().all(|c| c.is_ascii_digit()));
        let bn = bb.parse::<f64>().ok().filter(|_| bb.bytes().all(|c| c.is_ascii_digit()));

        let ord = match (an, bn) {
            (None, None) => aa.cmp(bb),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.total_cmp(&y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.len().cmp(&b.len())
}
