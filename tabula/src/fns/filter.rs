//! Filter strategies

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;

use crate::model::Value;

/// Names of the built-in filter strategies.
pub const BUILTIN_FILTER_FNS: &[&str] = &[
    "includesString",
    "includesStringSensitive",
    "equalsString",
    "equalsStringSensitive",
    "arrIncludes",
    "arrIncludesAll",
    "arrIncludesSome",
    "equals",
    "weakEquals",
    "inNumberRange",
    "greaterThan",
    "greaterThanOrEqualTo",
    "lessThan",
    "lessThanOrEqualTo",
    "fuzzy",
];

/// Decides whether a cell value passes a filter value.
///
/// Besides the predicate, a filter strategy may normalize the filter value
/// once per derivation (`resolve_filter_value`) and may declare which filter
/// values mean "no filter" (`auto_remove`); such filters are dropped from
/// state instead of being stored.
#[derive(Clone)]
pub struct FilterFn {
    predicate: Rc<dyn Fn(&Value, &Value) -> bool>,
    resolve_filter_value: Option<Rc<dyn Fn(&Value) -> Value>>,
    auto_remove: Option<Rc<dyn Fn(&Value) -> bool>>,
}

impl FilterFn {
    /// Wraps a predicate `(cell_value, filter_value) -> passes`.
    pub fn new(predicate: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        Self {
            predicate: Rc::new(predicate),
            resolve_filter_value: None,
            auto_remove: None,
        }
    }

    /// Sets the filter value normalizer.
    pub fn with_resolve_filter_value(mut self, resolve: impl Fn(&Value) -> Value + 'static) -> Self {
        self.resolve_filter_value = Some(Rc::new(resolve));
        self
    }

    /// Sets the "this value means no filter" test.
    pub fn with_auto_remove(mut self, auto_remove: impl Fn(&Value) -> bool + 'static) -> Self {
        self.auto_remove = Some(Rc::new(auto_remove));
        self
    }

    /// Runs the predicate.
    pub fn matches(&self, cell_value: &Value, filter_value: &Value) -> bool {
        (self.predicate)(cell_value, filter_value)
    }

    /// Normalizes a raw filter value.
    pub fn resolve_filter_value(&self, value: &Value) -> Value {
        match &self.resolve_filter_value {
            Some(resolve) => resolve(value),
            None => value.clone(),
        }
    }

    /// Returns `true` if a filter with this value should be removed.
    ///
    /// Missing values and empty strings always remove the filter.
    pub fn should_auto_remove(&self, value: &Value) -> bool {
        self.auto_remove.as_ref().is_some_and(|f| f(value)) || is_falsey(value)
    }

    /// Looks up a built-in strategy by name.
    pub fn builtin(name: &str) -> Option<Self> {
        let f = match name {
            "includesString" => Self::includes_string(),
            "includesStringSensitive" => Self::includes_string_sensitive(),
            "equalsString" => Self::equals_string(),
            "equalsStringSensitive" => Self::equals_string_sensitive(),
            "arrIncludes" => Self::arr_includes(),
            "arrIncludesAll" => Self::arr_includes_all(),
            "arrIncludesSome" => Self::arr_includes_some(),
            "equals" => Self::equals(),
            "weakEquals" => Self::weak_equals(),
            "inNumberRange" => Self::in_number_range(),
            "greaterThan" => Self::compare_with(|o| o == Ordering::Greater),
            "greaterThanOrEqualTo" => Self::compare_with(|o| o != Ordering::Less),
            "lessThan" => Self::compare_with(|o| o == Ordering::Less),
            "lessThanOrEqualTo" => Self::compare_with(|o| o != Ordering::Greater),
            "fuzzy" => Self::fuzzy(),
            _ => return None,
        };
        Some(f)
    }

    /// Case-insensitive substring match.
    pub fn includes_string() -> Self {
        Self::new(|cell, filter| {
            !cell.is_null() && cell.to_text().to_lowercase().contains(&filter.to_text().to_lowercase())
        })
    }

    /// Case-sensitive substring match.
    pub fn includes_string_sensitive() -> Self {
        Self::new(|cell, filter| !cell.is_null() && cell.to_text().contains(&filter.to_text()))
    }

    /// Case-insensitive whole-string match.
    pub fn equals_string() -> Self {
        Self::new(|cell, filter| {
            !cell.is_null() && cell.to_text().to_lowercase() == filter.to_text().to_lowercase()
        })
    }

    /// Case-sensitive whole-string match.
    pub fn equals_string_sensitive() -> Self {
        Self::new(|cell, filter| !cell.is_null() && cell.to_text() == filter.to_text())
    }

    /// The cell (a list or a string) contains the filter value.
    pub fn arr_includes() -> Self {
        Self::new(|cell, filter| contains(cell, filter)).with_auto_remove(is_empty_collection)
    }

    /// The cell contains every item of the filter list.
    pub fn arr_includes_all() -> Self {
        Self::new(|cell, filter| filter_items(filter).iter().all(|item| contains(cell, item)))
            .with_auto_remove(is_empty_collection)
    }

    /// The cell contains at least one item of the filter list.
    pub fn arr_includes_some() -> Self {
        Self::new(|cell, filter| filter_items(filter).iter().any(|item| contains(cell, item)))
            .with_auto_remove(is_empty_collection)
    }

    /// Strict equality; numbers compare by value.
    pub fn equals() -> Self {
        Self::new(same_value)
    }

    /// Loose equality, see [`Value::loose_eq`].
    pub fn weak_equals() -> Self {
        Self::new(|cell, filter| cell.loose_eq(filter))
    }

    /// The cell lies within `[min, max]`.
    ///
    /// The filter value is a two-item list. Missing or non-numeric bounds are
    /// open, and reversed bounds are swapped.
    pub fn in_number_range() -> Self {
        Self::new(|cell, filter| {
            let (Some(min), Some(max)) = (
                filter_items(filter).first().and_then(Value::as_f64),
                filter_items(filter).get(1).and_then(Value::as_f64),
            ) else {
                return false;
            };
            cell.to_number().is_some_and(|v| v >= min && v <= max)
        })
        .with_resolve_filter_value(resolve_number_range)
        .with_auto_remove(|value| {
            let items = filter_items(value);
            items.is_empty() || items.iter().all(is_falsey)
        })
    }

    /// Fuzzy subsequence match on the cell text.
    pub fn fuzzy() -> Self {
        Self::new(|cell, filter| {
            if cell.is_null() {
                return false;
            }
            let mut matcher = Matcher::new(Config::DEFAULT);
            let pattern = Pattern::new(
                &filter.to_text(),
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
            );
            let text = cell.to_text();
            let mut buf = Vec::new();
            pattern.score(Utf32Str::new(&text, &mut buf), &mut matcher).is_some()
        })
    }

    fn compare_with(accept: fn(Ordering) -> bool) -> Self {
        Self::new(move |cell, filter| {
            if cell.is_null() {
                return false;
            }
            let ord = match (cell.to_number(), filter.to_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => Some(cell.to_text().cmp(&filter.to_text())),
            };
            ord.is_some_and(accept)
        })
    }
}

impl fmt::Debug for FilterFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterFn")
            .field("resolves", &self.resolve_filter_value.is_some())
            .field("auto_removes", &self.auto_remove.is_some())
            .finish()
    }
}

fn is_falsey(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_empty_collection(value: &Value) -> bool {
    match value {
        Value::List(items) => items.is_empty(),
        _ => false,
    }
}

fn filter_items(value: &Value) -> &[Value] {
    match value {
        Value::List(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn contains(cell: &Value, item: &Value) -> bool {
    match cell {
        Value::List(items) => items.iter().any(|v| same_value(v, item)),
        Value::String(s) => item.as_str().is_some_and(|needle| s.contains(needle)),
        _ => false,
    }
}

fn resolve_number_range(value: &Value) -> Value {
    let items = filter_items(value);
    let bound = |item: Option<&Value>, open: f64| match item {
        None | Some(Value::Null) => open,
        Some(v) => v.to_number().filter(|n| !n.is_nan()).unwrap_or(open),
    };
    let mut min = bound(items.first(), f64::NEG_INFINITY);
    let mut max = bound(items.get(1), f64::INFINITY);
    if min > max {
        std::mem::swap(&mut min, &mut max);
    }
    Value::List(vec![Value::Float(min), Value::Float(max)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(f: &FilterFn, cell: impl Into<Value>, filter: impl Into<Value>) -> bool {
        let filter = f.resolve_filter_value(&filter.into());
        f.matches(&cell.into(), &filter)
    }

    #[test]
    fn test_includes_string_ignores_case() {
        let f = FilterFn::includes_string();
        assert!(run(&f, "Tanner Linsley", "tanner"));
        assert!(!run(&f, Value::Null, "a"));
        assert!(!run(&FilterFn::includes_string_sensitive(), "Tanner", "tanner"));
    }

    #[test]
    fn test_equals_string() {
        assert!(run(&FilterFn::equals_string(), "Done", "done"));
        assert!(!run(&FilterFn::equals_string_sensitive(), "Done", "done"));
    }

    #[test]
    fn test_equals_is_strict_weak_equals_is_loose() {
        assert!(!run(&FilterFn::equals(), "1", 1));
        assert!(run(&FilterFn::equals(), 1, 1.0));
        assert!(run(&FilterFn::weak_equals(), "1", 1));
    }

    #[test]
    fn test_arr_includes_variants() {
        let tags = Value::List(vec!["a".into(), "b".into()]);
        assert!(run(&FilterFn::arr_includes(), tags.clone(), "a"));
        assert!(run(
            &FilterFn::arr_includes_all(),
            tags.clone(),
            Value::List(vec!["a".into(), "b".into()])
        ));
        assert!(!run(
            &FilterFn::arr_includes_all(),
            tags.clone(),
            Value::List(vec!["a".into(), "c".into()])
        ));
        assert!(run(
            &FilterFn::arr_includes_some(),
            tags,
            Value::List(vec!["c".into(), "b".into()])
        ));
    }

    #[test]
    fn test_in_number_range_swaps_and_opens_bounds() {
        let f = FilterFn::in_number_range();
        assert!(run(&f, 5, Value::List(vec![10.into(), 1.into()])));
        assert!(run(&f, 500, Value::List(vec![10.into(), Value::Null])));
        assert!(run(&f, -3, Value::List(vec![Value::Null, 0.into()])));
        assert!(!run(&f, 11, Value::List(vec![1.into(), 10.into()])));
    }

    #[test]
    fn test_auto_remove() {
        assert!(FilterFn::includes_string().should_auto_remove(&"".into()));
        assert!(FilterFn::includes_string().should_auto_remove(&Value::Null));
        assert!(!FilterFn::includes_string().should_auto_remove(&"x".into()));
        assert!(FilterFn::arr_includes_some().should_auto_remove(&Value::List(vec![])));
        assert!(
            FilterFn::in_number_range()
                .should_auto_remove(&Value::List(vec![Value::Null, "".into()]))
        );
    }

    #[test]
    fn test_comparisons() {
        let gt = FilterFn::builtin("greaterThan").unwrap();
        assert!(run(&gt, 5, 3));
        assert!(!run(&gt, 3, 3));
        let lte = FilterFn::builtin("lessThanOrEqualTo").unwrap();
        assert!(run(&lte, 3, 3));
    }

    #[test]
    fn test_fuzzy() {
        let f = FilterFn::fuzzy();
        assert!(run(&f, "United States", "us"));
        assert!(!run(&f, "Germany", "xyz"));
    }

    #[test]
    fn test_builtin_lookup() {
        for name in BUILTIN_FILTER_FNS {
            assert!(FilterFn::builtin(name).is_some(), "{name}");
        }
        assert!(FilterFn::builtin("nope").is_none());
    }
}
