//! Combinatorics over column and parameter lists.
//!
//! Pipeline operations expand every declaration into the cartesian product of
//! its argument lists. These helpers keep that expansion deterministic: output
//! order always follows input order.

use std::collections::HashSet;
use std::hash::Hash;

/// Removes duplicates while keeping the first occurrence of every value.
///
/// # Examples
///
/// ```
/// use featurs_common::order_preserving_unique;
///
/// assert_eq!(order_preserving_unique(vec!["a", "b", "a"]), vec!["a", "b"]);
/// ```
pub fn order_preserving_unique<T, I>(values: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for value in values {
        if seen.insert(value.clone()) {
            result.push(value);
        }
    }
    result
}

/// Cartesian product of a list of lists, first list varying slowest.
///
/// The product of zero lists is a single empty combination, so zero-arity
/// transformers still get instantiated once.
///
/// # Examples
///
/// ```
/// use featurs_common::cartesian_product;
///
/// let product = cartesian_product(&[vec![1, 2], vec![3, 4]]);
/// assert_eq!(product, vec![vec![1, 3], vec![1, 4], vec![2, 3], vec![2, 4]]);
/// assert_eq!(cartesian_product::<i32>(&[]), vec![Vec::<i32>::new()]);
/// ```
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    lists.iter().fold(vec![Vec::new()], |acc, list| {
        acc.iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut combination = prefix.clone();
                    combination.push(item.clone());
                    combination
                })
            })
            .collect()
    })
}

/// Splits parameter options into the valid ones and a flag telling whether
/// every option was valid.
///
/// An option is invalid when it is `None` or empty. Callers use the flag to
/// decide whether the unwrapped variant must be kept next to the wrapped ones.
pub fn valid_param_options<T, F>(options: &[T], is_valid: F) -> (Vec<T>, bool)
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    let valid: Vec<T> = options.iter().filter(|o| is_valid(o)).cloned().collect();
    let all_valid = valid.len() == options.len();
    (valid, all_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_order_preserving_unique() {
        assert_eq!(order_preserving_unique(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(order_preserving_unique(Vec::<i32>::new()).is_empty());
    }

    #[test]
    fn test_cartesian_product_with_empty_list() {
        let product = cartesian_product(&[vec![1, 2], vec![]]);
        assert!(product.is_empty());
    }

    #[test]
    fn test_valid_param_options() {
        let options = vec![vec![], vec!["A"], vec!["A", "B"]];
        let (valid, all_valid) = valid_param_options(&options, |o| !o.is_empty());
        assert_eq!(valid, vec![vec!["A"], vec!["A", "B"]]);
        assert!(!all_valid);

        let windows = vec![Some("1d"), Some("2d")];
        let (valid, all_valid) = valid_param_options(&windows, Option::is_some);
        assert_eq!(valid.len(), 2);
        assert!(all_valid);
    }

    proptest! {
        #[test]
        fn product_size_is_product_of_sizes(a in 0usize..5, b in 0usize..5, c in 0usize..5) {
            let lists = vec![vec![0; a], vec![0; b], vec![0; c]];
            prop_assert_eq!(cartesian_product(&lists).len(), a * b * c);
        }

        #[test]
        fn unique_keeps_first_occurrences(values in proptest::collection::vec(0u8..10, 0..40)) {
            let unique = order_preserving_unique(values.clone());
            let mut seen = HashSet::new();
            let expected: Vec<u8> = values.into_iter().filter(|v| seen.insert(*v)).collect();
            prop_assert_eq!(unique, expected);
        }
    }
}
