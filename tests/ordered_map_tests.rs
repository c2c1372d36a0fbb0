//! Unit tests for OrderedMap through its public API.

use climate_extremes::ordered::{
    FloatOrder, KeyOrder, NaturalOrder, OrderBy, OrderedMap, OrderedMapError, ReverseOrder,
};
use rstest::{fixture, rstest};
use std::cmp::Ordering;

#[fixture]
fn numbers() -> OrderedMap<i32, String> {
    [50, 20, 80, 10, 30, 70, 90, 60, 40]
        .into_iter()
        .map(|key| (key, format!("v{key}")))
        .collect()
}

// =============================================================================
// Basic Construction Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: OrderedMap<i32, String> = OrderedMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.keys().next(), None);
}

#[rstest]
fn test_default_creates_empty_map() {
    let map: OrderedMap<i32, String> = OrderedMap::default();
    assert!(map.is_empty());
}

#[rstest]
fn test_with_order_keeps_ordering() {
    let map: OrderedMap<i32, ()> = OrderedMap::with_order(NaturalOrder);
    assert_eq!(map.order(), &NaturalOrder);
}

// =============================================================================
// Insert and Get Tests
// =============================================================================

#[rstest]
fn test_insert_multiple_entries(numbers: OrderedMap<i32, String>) {
    assert_eq!(numbers.len(), 9);
    for key in (10..=90).step_by(10) {
        assert_eq!(numbers.get(&key), Ok(Some(&format!("v{key}"))));
    }
}

#[rstest]
fn test_insert_overwrites_and_keeps_size(mut numbers: OrderedMap<i32, String>) {
    numbers.insert(30, "thirty".to_string()).unwrap();
    assert_eq!(numbers.len(), 9);
    assert_eq!(numbers.get(&30), Ok(Some(&"thirty".to_string())));
}

#[rstest]
#[case(0)]
#[case(35)]
#[case(100)]
fn test_get_absent_key(numbers: OrderedMap<i32, String>, #[case] key: i32) {
    assert_eq!(numbers.get(&key), Ok(None));
    assert!(!numbers.contains(&key));
}

#[rstest]
fn test_get_on_empty_map() {
    let map: OrderedMap<&str, i32> = OrderedMap::new();
    assert_eq!(map.get(&"anything"), Ok(None));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[rstest]
fn test_delete_every_key_in_insertion_order(mut numbers: OrderedMap<i32, String>) {
    for (removed, key) in [50, 20, 80, 10, 30, 70, 90, 60, 40].into_iter().enumerate() {
        assert_eq!(numbers.delete(&key), Ok(Some(format!("v{key}"))));
        assert_eq!(numbers.len(), 9 - removed - 1);
        assert!(!numbers.contains(&key));
    }
    assert!(numbers.is_empty());
}

#[rstest]
fn test_delete_absent_key_leaves_map_unchanged(mut numbers: OrderedMap<i32, String>) {
    let keys_before: Vec<i32> = numbers.keys().copied().collect();
    assert_eq!(numbers.delete(&55), Ok(None));
    let keys_after: Vec<i32> = numbers.keys().copied().collect();
    assert_eq!(keys_before, keys_after);
}

#[rstest]
fn test_delete_min_and_max(mut numbers: OrderedMap<i32, String>) {
    assert_eq!(numbers.delete_min(), Ok((10, "v10".to_string())));
    assert_eq!(numbers.delete_max(), Ok((90, "v90".to_string())));
    assert_eq!(numbers.min(), Ok(&20));
    assert_eq!(numbers.max(), Ok(&80));
    assert_eq!(numbers.len(), 7);
}

#[rstest]
fn test_extremal_operations_on_empty_map() {
    let mut map: OrderedMap<i32, i32> = OrderedMap::new();
    assert_eq!(
        map.min(),
        Err(OrderedMapError::Underflow { operation: "min" })
    );
    assert_eq!(
        map.max(),
        Err(OrderedMapError::Underflow { operation: "max" })
    );
    assert_eq!(
        map.delete_min(),
        Err(OrderedMapError::Underflow {
            operation: "delete_min"
        })
    );
    assert_eq!(
        map.delete_max(),
        Err(OrderedMapError::Underflow {
            operation: "delete_max"
        })
    );
}

// =============================================================================
// Example Scenario
// =============================================================================

#[rstest]
fn test_example_scenario() {
    let mut map = OrderedMap::new();
    map.insert(5, "five").unwrap();
    map.insert(3, "three").unwrap();
    map.insert(8, "eight").unwrap();
    map.insert(1, "one").unwrap();

    assert_eq!(map.min(), Ok(&1));
    assert_eq!(map.max(), Ok(&8));
    assert_eq!(map.get(&3), Ok(Some(&"three")));
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3, 5, 8]);

    map.delete(&5).unwrap();
    assert_eq!(map.get(&5), Ok(None));
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3, 8]);
    assert_eq!(map.len(), 3);

    map.delete_min().unwrap();
    map.delete_min().unwrap();
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![8]);

    assert!(map.delete_min().is_ok());
    assert!(map.delete_min().unwrap_err().is_underflow());
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[rstest]
fn test_iter_yields_sorted_pairs(numbers: OrderedMap<i32, String>) {
    let pairs: Vec<(i32, String)> = numbers
        .iter()
        .map(|(key, value)| (*key, value.clone()))
        .collect();
    let expected: Vec<(i32, String)> = (10..=90)
        .step_by(10)
        .map(|key| (key, format!("v{key}")))
        .collect();
    assert_eq!(pairs, expected);
}

#[rstest]
fn test_for_loop_over_reference(numbers: OrderedMap<i32, String>) {
    let mut previous = i32::MIN;
    for (key, _) in &numbers {
        assert!(*key > previous);
        previous = *key;
    }
}

#[rstest]
#[case(25, 65, vec![30, 40, 50, 60])]
#[case(10, 10, vec![10])]
#[case(0, 15, vec![10])]
#[case(85, 200, vec![90])]
#[case(91, 200, vec![])]
#[case(60, 40, vec![])]
fn test_keys_in_range(
    numbers: OrderedMap<i32, String>,
    #[case] lo: i32,
    #[case] hi: i32,
    #[case] expected: Vec<i32>,
) {
    let keys: Vec<i32> = numbers.keys_in(&lo, &hi).unwrap().copied().collect();
    assert_eq!(keys, expected);
}

#[rstest]
fn test_keys_in_on_empty_map() {
    let map: OrderedMap<i32, ()> = OrderedMap::new();
    assert_eq!(map.keys_in(&0, &10).unwrap().count(), 0);
}

// =============================================================================
// Key Ordering Tests
// =============================================================================

#[rstest]
fn test_float_keys() {
    let mut map = OrderedMap::with_order(FloatOrder);
    for (key, label) in [(0.25, "a"), (-1.5, "b"), (3.75, "c"), (0.0, "d")] {
        map.insert(key, label).unwrap();
    }
    assert_eq!(map.min(), Ok(&-1.5));
    assert_eq!(map.max(), Ok(&3.75));
    assert_eq!(map.get(&-0.0), Ok(Some(&"d")));
    assert_eq!(
        map.keys_in(&-1.0, &1.0).unwrap().copied().collect::<Vec<f64>>(),
        vec![0.0, 0.25]
    );
}

#[rstest]
fn test_float_nan_is_invalid_argument() {
    let mut map: OrderedMap<f64, i32, FloatOrder> = OrderedMap::with_order(FloatOrder);
    assert_eq!(
        map.insert(f64::NAN, 1),
        Err(OrderedMapError::InvalidArgument {
            operation: "insert"
        })
    );
    assert!(map.is_empty());
}

#[rstest]
fn test_reverse_order_flips_extremes() {
    let mut map = OrderedMap::with_order(ReverseOrder(NaturalOrder));
    for key in 1..=5 {
        map.insert(key, key * key).unwrap();
    }
    assert_eq!(map.min(), Ok(&5));
    assert_eq!(map.max(), Ok(&1));
    assert_eq!(map.keys_in(&4, &2).unwrap().copied().collect::<Vec<_>>(), vec![4, 3, 2]);
}

#[rstest]
fn test_order_by_case_insensitive() {
    let order = OrderBy(|left: &String, right: &String| {
        left.to_lowercase().cmp(&right.to_lowercase())
    });
    let mut map = OrderedMap::with_order(order);
    map.insert("Beta".to_string(), 1).unwrap();
    map.insert("alpha".to_string(), 2).unwrap();
    map.insert("BETA".to_string(), 3).unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&"beta".to_string()), Ok(Some(&3)));
    assert_eq!(map.min().map(String::as_str), Ok("alpha"));
}

/// Orders strings by length and rejects the empty string.
struct NonEmptyByLength;

impl KeyOrder<String> for NonEmptyByLength {
    fn compare(&self, left: &String, right: &String) -> Ordering {
        left.len().cmp(&right.len()).then_with(|| left.cmp(right))
    }

    fn admits(&self, key: &String) -> bool {
        !key.is_empty()
    }
}

#[rstest]
fn test_custom_order_with_admission() {
    let mut map = OrderedMap::with_order(NonEmptyByLength);
    map.insert("ccc".to_string(), ()).unwrap();
    map.insert("a".to_string(), ()).unwrap();
    map.insert("bb".to_string(), ()).unwrap();

    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "bb", "ccc"]);
    assert!(map.insert(String::new(), ()).is_err());
    assert!(map.delete(&String::new()).is_err());
    assert!(!map.contains(&String::new()));
}

// =============================================================================
// Trait Tests
// =============================================================================

#[rstest]
fn test_debug_output() {
    let map: OrderedMap<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
}

#[rstest]
fn test_extend_overwrites(mut numbers: OrderedMap<i32, String>) {
    numbers.extend([(10, "ten".to_string()), (15, "v15".to_string())]);
    assert_eq!(numbers.len(), 10);
    assert_eq!(numbers.get(&10), Ok(Some(&"ten".to_string())));
}

#[rstest]
fn test_clone_is_independent(numbers: OrderedMap<i32, String>) {
    let mut copy = numbers.clone();
    copy.delete(&50).unwrap();
    assert!(numbers.contains(&50));
    assert!(!copy.contains(&50));
    assert_ne!(numbers, copy);
}
