//! Integration tests: end-to-end scenarios over the public API.

use dynarr::DynArray;
use dynarr_test_utils::{counts, reset, Tracked};

fn values(array: &DynArray<Tracked>) -> Vec<i64> {
    array.iter().map(Tracked::value).collect()
}

#[test]
fn push_insert_erase_scenario() {
    let mut array = DynArray::new();
    array.push_back(1);
    array.push_back(2);
    array.insert(1, 10);
    assert_eq!(array, [1, 10, 2]);
    assert_eq!(array.len(), 3);

    array.erase(1);
    assert_eq!(array, [1, 2]);
    assert_eq!(array.len(), 2);
}

#[test]
fn sized_construction_then_resize_scenario() {
    reset();
    let mut array = DynArray::<Tracked>::with_len(3);
    array[0] = Tracked::new(42);
    let before = counts();

    array.resize(1);
    assert_eq!(array.len(), 1);
    assert_eq!(counts().dropped - before.dropped, 2);

    array.resize(4);
    assert_eq!(array.len(), 4);
    assert_eq!(values(&array), [42, 0, 0, 0]);
    assert_eq!(counts().constructed - before.constructed, 3);
}

#[test]
fn capacity_doubles_from_zero() {
    let mut array = DynArray::new();
    let mut history = vec![array.capacity()];
    for i in 0..100u32 {
        array.push_back(i);
        let cap = array.capacity();
        assert!(cap >= *history.last().unwrap(), "capacity never decreases");
        if cap != *history.last().unwrap() {
            history.push(cap);
        }
    }
    assert_eq!(history, [0, 1, 2, 4, 8, 16, 32, 64, 128]);
}

#[test]
fn copy_is_deep() {
    let a: DynArray<String> = ["x", "y", "z"].map(String::from).into();
    let mut b = a.clone();
    b[0].push('!');
    b.push_back(String::from("w"));
    b.erase(1);

    assert_eq!(a, ["x", "y", "z"]);
    assert_eq!(b, ["x!", "z", "w"]);
    assert_eq!(a.capacity(), 3);
}

#[test]
fn clone_has_exact_capacity() {
    let mut a = DynArray::with_capacity(16);
    a.extend([1, 2, 3]);
    let b = a.clone();
    assert_eq!(b.capacity(), 3);
    assert_eq!(b, a);
}

#[test]
fn move_leaves_source_empty() {
    let mut a = DynArray::from([1, 2, 3]);
    let base = a.as_ptr();
    let b = std::mem::take(&mut a);

    assert_eq!(b, [1, 2, 3]);
    assert_eq!(b.as_ptr(), base);
    assert!(a.is_empty());
    assert_eq!(a.capacity(), 0);

    a.push_back(9);
    assert_eq!(a, [9]);
}

#[test]
fn move_assignment_releases_previous_contents() {
    reset();
    let mut a = DynArray::from_fn(2, |i| Tracked::new(i as i64));
    let b = DynArray::from_fn(3, |i| Tracked::new(10 + i as i64));
    assert_eq!(values(&a), [0, 1]);
    assert_eq!(counts().dropped, 0);

    a = b;
    assert_eq!(counts().dropped, 2);
    assert_eq!(values(&a), [10, 11, 12]);
    drop(a);
    assert_eq!(counts().live(), 0);
}

#[test]
fn clone_from_shrinking_and_growing() {
    reset();
    let mut target = DynArray::from_fn(4, |i| Tracked::new(i as i64));
    let short = DynArray::from_fn(2, |i| Tracked::new(100 + i as i64));
    let long = DynArray::from_fn(3, |i| Tracked::new(200 + i as i64));

    target.clone_from(&short);
    assert_eq!(values(&target), [100, 101]);
    assert_eq!(target.capacity(), 4);

    target.clone_from(&long);
    assert_eq!(values(&target), [200, 201, 202]);
    assert_eq!(target.capacity(), 4);

    drop((target, short, long));
    assert_eq!(counts().live(), 0);
}

#[test]
fn insert_and_erase_preserve_relative_order() {
    let mut array: DynArray<u32> = (0..10).collect();
    array.insert(0, 100);
    array.insert(5, 200);
    array.insert(array.len(), 300);
    assert_eq!(array, [100, 0, 1, 2, 3, 200, 4, 5, 6, 7, 8, 9, 300]);

    array.erase(5);
    array.erase(0);
    array.erase(array.len() - 1);
    assert_eq!(array, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn every_element_dropped_exactly_once() {
    reset();
    {
        let mut array = DynArray::new();
        for i in 0..20 {
            array.push_back(Tracked::new(i));
        }
        array.insert(3, Tracked::new(-1));
        drop(array.erase(7));
        drop(array.pop_back());
        array.resize(30);
        array.truncate(5);
        array.reserve(64);
        let _ = array.clone();
    }
    let c = counts();
    assert_eq!(c.live(), 0, "{c:?}");
}

#[test]
fn emplace_back_returns_new_element() {
    let mut array = DynArray::new();
    *array.emplace_back(|| 5) += 1;
    array.emplace_back(|| 7);
    assert_eq!(array, [6, 7]);
}

#[test]
fn iteration_forms() {
    let mut array = DynArray::from([1, 2, 3]);
    for v in &mut array {
        *v *= 10;
    }
    let borrowed: Vec<i32> = (&array).into_iter().copied().collect();
    assert_eq!(borrowed, [10, 20, 30]);
    assert_eq!(array.iter().rev().next(), Some(&30));
    let owned: Vec<i32> = array.into_iter().collect();
    assert_eq!(owned, [10, 20, 30]);
}

#[test]
fn try_push_back_succeeds_normally() {
    let mut array = DynArray::new();
    array.try_push_back("a").unwrap();
    array.try_push_back("b").unwrap();
    assert_eq!(array, ["a", "b"]);
}

#[test]
fn arrays_are_send_and_sync_when_elements_are() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DynArray<u64>>();
    assert_send_sync::<dynarr::IntoIter<String>>();
}
