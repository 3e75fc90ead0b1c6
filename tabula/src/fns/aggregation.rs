//! Aggregation strategies

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::model::Value;

/// Names of the built-in aggregation strategies.
pub const BUILTIN_AGGREGATION_FNS: &[&str] = &[
    "sum",
    "min",
    "max",
    "extent",
    "mean",
    "median",
    "unique",
    "uniqueCount",
    "count",
];

/// Computes a group row's value for a non-grouped column.
///
/// Receives the column values of the group's leaf rows and of its direct
/// member rows.
#[derive(Clone)]
pub struct AggregationFn(Rc<dyn Fn(&[Value], &[Value]) -> Value>);

impl AggregationFn {
    /// Wraps an aggregation `(leaf_values, child_values) -> value`.
    pub fn new(aggregate: impl Fn(&[Value], &[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(aggregate))
    }

    /// Runs the aggregation.
    pub fn aggregate(&self, leaf_values: &[Value], child_values: &[Value]) -> Value {
        (self.0)(leaf_values, child_values)
    }

    /// Looks up a built-in strategy by name.
    pub fn builtin(name: &str) -> Option<Self> {
        let f = match name {
            "sum" => Self::sum(),
            "min" => Self::min(),
            "max" => Self::max(),
            "extent" => Self::extent(),
            "mean" => Self::mean(),
            "median" => Self::median(),
            "unique" => Self::unique(),
            "uniqueCount" => Self::unique_count(),
            "count" => Self::count(),
            _ => return None,
        };
        Some(f)
    }

    /// Sum of the numeric child values; non-numbers count as zero.
    pub fn sum() -> Self {
        Self::new(|_, children| {
            if children.iter().all(|v| matches!(v, Value::Int(_) | Value::Null)) {
                return Value::Int(children.iter().filter_map(Value::as_i64).sum());
            }
            Value::Float(children.iter().filter_map(Value::as_f64).sum())
        })
    }

    /// Smallest non-missing leaf value.
    pub fn min() -> Self {
        Self::new(|leaves, _| extreme(leaves, Ordering::Less))
    }

    /// Largest non-missing leaf value.
    pub fn max() -> Self {
        Self::new(|leaves, _| extreme(leaves, Ordering::Greater))
    }

    /// `[min, max]` of the leaf values.
    pub fn extent() -> Self {
        Self::new(|leaves, _| {
            Value::List(vec![extreme(leaves, Ordering::Less), extreme(leaves, Ordering::Greater)])
        })
    }

    /// Mean of the leaf values that coerce to numbers.
    pub fn mean() -> Self {
        Self::new(|leaves, _| {
            let numbers: Vec<f64> = leaves
                .iter()
                .filter_map(Value::to_number)
                .filter(|n| !n.is_nan())
                .collect();
            if numbers.is_empty() {
                return Value::Null;
            }
            Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
        })
    }

    /// Median of the leaf values; missing unless every value is a number.
    pub fn median() -> Self {
        Self::new(|leaves, _| {
            if leaves.is_empty() || !leaves.iter().all(Value::is_number) {
                return Value::Null;
            }
            if leaves.len() == 1 {
                return leaves[0].clone();
            }
            let mut numbers: Vec<f64> = leaves.iter().filter_map(Value::as_f64).collect();
            numbers.sort_by(f64::total_cmp);
            let mid = numbers.len() / 2;
            if numbers.len() % 2 == 1 {
                Value::Float(numbers[mid])
            } else {
                Value::Float((numbers[mid - 1] + numbers[mid]) / 2.0)
            }
        })
    }

    /// Distinct leaf values in first-seen order.
    pub fn unique() -> Self {
        Self::new(|leaves, _| Value::List(distinct(leaves)))
    }

    /// Number of distinct leaf values.
    pub fn unique_count() -> Self {
        Self::new(|leaves, _| Value::from(distinct(leaves).len()))
    }

    /// Number of leaf rows.
    pub fn count() -> Self {
        Self::new(|leaves, _| Value::from(leaves.len()))
    }
}

impl fmt::Debug for AggregationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AggregationFn(..)")
    }
}

fn extreme(values: &[Value], keep: Ordering) -> Value {
    let mut best: Option<&Value> = None;
    for value in values {
        if value.is_null() || value.as_f64().is_some_and(f64::is_nan) {
            continue;
        }
        match best {
            Some(current) if value.compare(current) != keep => {}
            _ => best = Some(value),
        }
    }
    best.cloned().unwrap_or_default()
}

fn distinct(values: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.identity()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[i64]) -> Vec<Value> {
        items.iter().map(|v| Value::Int(*v)).collect()
    }

    #[test]
    fn test_sum_uses_child_values() {
        let leaves = values(&[1, 2, 3]);
        let children = values(&[10, 20]);
        assert_eq!(AggregationFn::sum().aggregate(&leaves, &children), Value::Int(30));
        let mixed = vec![Value::Int(1), Value::Float(0.5), Value::from("x")];
        assert_eq!(AggregationFn::sum().aggregate(&[], &mixed), Value::Float(1.5));
    }

    #[test]
    fn test_min_max_extent_skip_missing() {
        let leaves = vec![Value::Int(4), Value::Null, Value::Int(-2), Value::Int(9)];
        assert_eq!(AggregationFn::min().aggregate(&leaves, &[]), Value::Int(-2));
        assert_eq!(AggregationFn::max().aggregate(&leaves, &[]), Value::Int(9));
        assert_eq!(
            AggregationFn::extent().aggregate(&leaves, &[]),
            Value::List(vec![Value::Int(-2), Value::Int(9)])
        );
    }

    #[test]
    fn test_mean_and_median() {
        let leaves = values(&[1, 2, 3, 10]);
        assert_eq!(AggregationFn::mean().aggregate(&leaves, &[]), Value::Float(4.0));
        assert_eq!(AggregationFn::median().aggregate(&leaves, &[]), Value::Float(2.5));
        assert_eq!(AggregationFn::median().aggregate(&values(&[7]), &[]), Value::Int(7));
        assert_eq!(
            AggregationFn::median().aggregate(&[Value::from("a")], &[]),
            Value::Null
        );
    }

    #[test]
    fn test_median_ranks_nan_last() {
        let leaves = vec![
            Value::Float(f64::NAN),
            Value::Int(1),
            Value::Int(5),
            Value::Float(3.0),
            Value::Int(2),
        ];
        assert_eq!(AggregationFn::median().aggregate(&leaves, &[]), Value::Float(3.0));
    }

    #[test]
    fn test_unique_and_counts() {
        let leaves = vec![Value::from("a"), Value::from("b"), Value::from("a")];
        assert_eq!(
            AggregationFn::unique().aggregate(&leaves, &[]),
            Value::List(vec!["a".into(), "b".into()])
        );
        assert_eq!(AggregationFn::unique_count().aggregate(&leaves, &[]), Value::Int(2));
        assert_eq!(AggregationFn::count().aggregate(&leaves, &[]), Value::Int(3));
    }
}
