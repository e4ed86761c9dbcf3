//! Top-K selection algorithms
//!
//! **Problem**: `ORDER BY ... LIMIT K` is O(N log N) and the standard
//! library's unstable sorts give no guarantee about equal keys.
//!
//! **Solution**: Bounded-heap Top-K selection, O(N log K), with the row
//! index as an explicit tie-breaker so equal keys keep input order.
//!
//! Missing keys (`None`) never enter the heap: they are excluded, not
//! ranked first or last.

use crate::{Error, Result};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Trait for Top-K selection over a slice of rows
pub trait TopKSelection<T> {
    /// Select the K rows with the largest numeric key
    ///
    /// # Arguments
    /// * `k` - Number of rows to select
    /// * `key` - Extracts the sort key; `None` excludes the row
    ///
    /// # Returns
    /// At most `k` rows in rank order; rows with equal keys stay in input
    /// order.
    ///
    /// # Errors
    /// Returns error if `k` is zero
    ///
    /// # Examples
    ///
    /// ```rust
    /// use statboard::topk::TopKSelection;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let scores = [Some(1.0), Some(5.0), None, Some(9.0), Some(5.0)];
    /// let top = scores.top_k_by(3, |s| *s)?;
    /// assert_eq!(top, vec![&Some(9.0), &Some(5.0), &Some(5.0)]);
    /// # Ok(())
    /// # }
    /// ```
    fn top_k_by<F>(&self, k: usize, key: F) -> Result<Vec<&T>>
    where
        F: Fn(&T) -> Option<f64>;
}

impl<T> TopKSelection<T> for [T] {
    fn top_k_by<F>(&self, k: usize, key: F) -> Result<Vec<&T>>
    where
        F: Fn(&T) -> Option<f64>,
    {
        let keys: Vec<Option<f64>> = self.iter().map(key).collect();
        let indices = select_top_k_indices(&keys, k)?;
        Ok(indices.into_iter().map(|i| &self[i]).collect())
    }
}

/// Select indices of the K largest present keys, best first
///
/// Time complexity: O(N log K) where N = number of rows, K = selection size
/// Space complexity: O(K) for the heap
///
/// # Errors
/// Returns error if `k` is zero
pub fn select_top_k_indices(keys: &[Option<f64>], k: usize) -> Result<Vec<usize>> {
    if k == 0 {
        return Err(Error::InvalidRequest("k must be greater than 0".to_string()));
    }

    let present = keys.iter().filter(|v| v.is_some_and(f64::is_finite)).count();
    if k >= present {
        return Ok(sort_all_indices(keys));
    }

    // Min-heap over rank: the weakest kept row sits on top
    let mut heap: BinaryHeap<Reverse<RankedItem>> = BinaryHeap::with_capacity(k);
    for (index, key) in keys.iter().enumerate() {
        let Some(value) = key.filter(|v| v.is_finite()) else {
            continue;
        };
        let item = RankedItem::new(value, index);

        if heap.len() < k {
            heap.push(Reverse(item));
        } else if let Some(Reverse(weakest)) = heap.peek() {
            if item > *weakest {
                heap.pop();
                heap.push(Reverse(item));
            }
        }
    }

    let mut result: Vec<RankedItem> = heap.into_iter().map(|Reverse(item)| item).collect();
    result.sort_by(|a, b| b.cmp(a));
    Ok(result.into_iter().map(|item| item.index).collect())
}

/// Fallback: sort every present key when k covers them all
fn sort_all_indices(keys: &[Option<f64>]) -> Vec<usize> {
    let mut items: Vec<RankedItem> = keys
        .iter()
        .enumerate()
        .filter_map(|(index, key)| {
            key.filter(|v| v.is_finite())
                .map(|value| RankedItem::new(value, index))
        })
        .collect();
    items.sort_by(|a, b| b.cmp(a));
    items.into_iter().map(|item| item.index).collect()
}

// Heap item ordered by rank: Greater means ranks higher. Equal values rank
// the earlier row higher, which makes selection stable.
#[derive(Debug, Clone, Copy)]
struct RankedItem {
    value: f64,
    index: usize,
}

impl RankedItem {
    // `total_cmp` orders -0.0 below 0.0; fold them so they tie
    fn new(value: f64, index: usize) -> Self {
        Self {
            value: value + 0.0,
            index,
        }
    }
}

impl PartialEq for RankedItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedItem {}

impl Ord for RankedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for RankedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
mod tests {
    use super::*;

    fn keys(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_top_k_descending_basic() {
        // Test: Get top 3 highest scores
        let result = select_top_k_indices(&keys(&[1.0, 5.0, 3.0, 9.0, 2.0]), 3).unwrap();
        assert_eq!(result, vec![3, 1, 2]);
    }

    #[test]
    fn test_top_k_k_greater_than_length() {
        // Edge case: k > number of rows (should return all rows sorted)
        let result =
            select_top_k_indices(&keys(&[3.0, 1.0, 2.0]), 10).unwrap();
        assert_eq!(result, vec![0, 2, 1]);
    }

    #[test]
    fn test_top_k_k_zero_fails() {
        let result = select_top_k_indices(&keys(&[1.0, 2.0, 3.0]), 0);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("must be greater than 0"));
    }

    #[test]
    fn test_missing_keys_are_excluded() {
        let input = vec![None, Some(2.0), None, Some(7.0), Some(f64::NAN)];
        assert_eq!(
            select_top_k_indices(&input, 5).unwrap(),
            vec![3, 1]
        );
        assert_eq!(select_top_k_indices(&input, 1).unwrap(), vec![3]);
    }

    #[test]
    fn test_ties_keep_input_order_in_heap_path() {
        // 6 rows, k = 3 forces the heap path; ties at 4.0 and 9.0
        let input = keys(&[4.0, 9.0, 4.0, 9.0, 1.0, 4.0]);
        assert_eq!(
            select_top_k_indices(&input, 3).unwrap(),
            vec![1, 3, 0]
        );
    }

    #[test]
    fn test_ties_keep_input_order_in_full_sort_path() {
        let input = keys(&[2.0, 2.0, 2.0]);
        assert_eq!(
            select_top_k_indices(&input, 3).unwrap(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_top_k_by_on_structs() {
        let rows = [("a", Some(1.0)), ("b", None), ("c", Some(3.0))];
        let top = rows.top_k_by(2, |r| r.1).unwrap();
        let names: Vec<_> = top.iter().map(|r| r.0).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_top_k_large_dataset() {
        let values: Vec<Option<f64>> = (0..100_000).map(|i| Some(f64::from(i))).collect();
        let result = select_top_k_indices(&values, 10).unwrap();
        let expected: Vec<usize> = (99_990..100_000).rev().collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_ranked_item_ord() {
        let a = RankedItem::new(10.0, 0);
        let b = RankedItem::new(20.0, 1);
        let c = RankedItem::new(10.0, 5);
        assert!(b > a);
        assert!(a > c); // earlier row wins ties
        assert_ne!(a, c);
    }

    #[test]
    fn test_signed_zeros_tie() {
        let input = vec![Some(-0.0), Some(-1.0), Some(0.0), Some(-0.0)];
        assert_eq!(select_top_k_indices(&input, 2).unwrap(), vec![0, 2]);
        assert_eq!(select_top_k_indices(&input, 4).unwrap(), vec![0, 2, 3, 1]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: Top-K returns min(k, present) rows
            #[test]
            fn prop_top_k_returns_k_rows(
                values in prop::collection::vec(prop::option::of(0.0f64..1000.0), 0..300),
                k in 1usize..100
            ) {
                let present = values.iter().filter(|v| v.is_some()).count();
                let result = select_top_k_indices(&values, k).unwrap();
                prop_assert_eq!(result.len(), k.min(present));
            }

            /// Property: heap path agrees with a stable full sort
            #[test]
            fn prop_top_k_matches_stable_sort(
                values in prop::collection::vec(0u8..10, 1..200),
                k in 1usize..50
            ) {
                let input: Vec<Option<f64>> = values.iter().map(|&v| Some(f64::from(v))).collect();
                let mut expected: Vec<usize> = (0..input.len()).collect();
                expected.sort_by(|&a, &b| values[b].cmp(&values[a]));
                expected.truncate(k);

                let result = select_top_k_indices(&input, k).unwrap();
                prop_assert_eq!(result, expected);
            }
        }
    }
}
