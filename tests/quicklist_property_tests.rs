use std::collections::VecDeque;

use proptest::prelude::*;
use quicklist::{Block, QuickList, QuickListError};

fn model_remove(
    model: &mut VecDeque<i32>,
    value: i32,
    count: isize,
) -> usize {
    let limit = if count == 0 {
        usize::MAX
    } else {
        count.unsigned_abs()
    };
    let mut removed = 0;

    if count >= 0 {
        let mut i = 0;
        while i < model.len() && removed < limit {
            if model[i] == value {
                model.remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
    } else {
        let mut i = model.len();
        while i > 0 && removed < limit {
            i -= 1;
            if model[i] == value {
                model.remove(i);
                removed += 1;
            }
        }
    }

    removed
}

proptest! {
    #[test]
    fn prop_behaves_like_vecdeque(
        capacity in 1usize..8,
        ops in prop::collection::vec((0u8..8, 0i32..6, -4isize..4), 0..300),
    ) {
        let mut list = QuickList::new(capacity);
        let mut model = VecDeque::new();

        for (op, value, arg) in ops {
            match op {
                0 => { // push
                    list.push(value);
                    model.push_back(value);
                }
                1 => { // unshift
                    list.unshift(value);
                    model.push_front(value);
                }
                2 => { // pop
                    prop_assert_eq!(list.pop().ok(), model.pop_back());
                }
                3 => { // shift
                    prop_assert_eq!(list.shift().ok(), model.pop_front());
                }
                4 => { // insert_after
                    let pos = model.iter().position(|&v| v == arg as i32);
                    prop_assert_eq!(list.insert_after(&(arg as i32), value), pos.is_some());
                    if let Some(pos) = pos {
                        model.insert(pos + 1, value);
                    }
                }
                5 => { // insert_before
                    let pos = model.iter().position(|&v| v == arg as i32);
                    prop_assert_eq!(list.insert_before(&(arg as i32), value), pos.is_some());
                    if let Some(pos) = pos {
                        model.insert(pos, value);
                    }
                }
                6 => { // remove_limited
                    let expected = model_remove(&mut model, value, arg);
                    prop_assert_eq!(list.remove_limited(&value, arg), expected);
                }
                7 => { // get
                    let index = value as isize - 3;
                    let pos = if index < 0 { model.len() as isize + index } else { index };
                    let expected = (pos >= 0).then(|| model.get(pos as usize)).flatten();
                    prop_assert_eq!(list.get(index).ok(), expected);
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(list.len(), model.len());
            prop_assert!(list.validate_invariants().is_ok());
        }

        let items: Vec<_> = list.iter().copied().collect();
        let expected: Vec<_> = model.into_iter().collect();
        prop_assert_eq!(items, expected);
    }
}

proptest! {
    #[test]
    fn prop_negative_index_matches_positive(
        capacity in 1usize..16,
        values in prop::collection::vec(any::<i32>(), 1..200),
    ) {
        let list: QuickList<i32> = {
            let mut list = QuickList::new(capacity);
            list.extend(values.iter().copied());
            list
        };
        let len = values.len() as isize;

        for i in 0..len {
            prop_assert_eq!(list.get(i - len), list.get(i));
            prop_assert_eq!(list.get(i), Ok(&values[i as usize]));
        }
        prop_assert_eq!(
            list.get(len),
            Err(QuickListError::IndexOutOfRange { index: len, len: values.len() })
        );
        prop_assert!(list.get(-len - 1).is_err());
    }
}

proptest! {
    #[test]
    fn prop_get_range_matches_slice(
        capacity in 1usize..16,
        values in prop::collection::vec(any::<i16>(), 1..200),
        a in 0usize..200,
        b in 0usize..200,
    ) {
        let mut list = QuickList::new(capacity);
        list.extend(values.iter().copied());

        let (start, stop) = (a.min(b), a.max(b));
        let result = list.get_range(start as isize, stop as isize);

        if start < stop && stop <= values.len() {
            prop_assert_eq!(result, Ok(values[start..stop].to_vec()));
        } else {
            prop_assert!(result.is_err());
        }
    }
}

proptest! {
    #[test]
    fn prop_block_split_merge_restores_order(
        values in prop::collection::vec(any::<u8>(), 1..32),
        offset in 0usize..32,
        keep_after in any::<bool>(),
    ) {
        let capacity = values.len();
        let mut block = Block::from_vec(capacity, values.clone()).unwrap();

        let mut rest = block.split_block(offset, keep_after);
        prop_assert_eq!(block.len() + rest.len(), values.len());
        prop_assert!(block.merge(&mut rest, keep_after).is_ok());

        prop_assert!(rest.is_empty());
        prop_assert_eq!(block.iter().copied().collect::<Vec<_>>(), values);
    }
}

proptest! {
    #[test]
    fn prop_remove_drops_every_occurrence(
        capacity in 2usize..10,
        values in prop::collection::vec(0i32..4, 0..200),
        target in 0i32..4,
    ) {
        let mut list = QuickList::new(capacity);
        list.extend(values.iter().copied());

        let expected = values.iter().filter(|&&v| v == target).count();
        prop_assert_eq!(list.remove(&target), expected);
        prop_assert!(!list.contains(&target));
        prop_assert!(list.validate_invariants().is_ok());

        let stats = list.statistics();
        prop_assert_eq!(stats.element_count, values.len() - expected);
        if stats.block_count > 0 {
            prop_assert!(stats.min_fill > 0);
        }
    }
}

proptest! {
    #[test]
    fn prop_clone_equivalent(
        capacity in 1usize..16,
        values in prop::collection::vec(any::<i32>(), 0..200),
    ) {
        let mut list = QuickList::new(capacity);
        list.extend(values.iter().copied());

        let cloned = list.clone();

        prop_assert_eq!(&list, &cloned);
        prop_assert!(cloned.validate_invariants().is_ok());
        prop_assert_eq!(list.into_iter().rev().collect::<Vec<_>>(),
            values.into_iter().rev().collect::<Vec<_>>());
    }
}

/// Проверяет границы длины цепочки для `len` элементов: блоков не меньше
/// `ceil(len / capacity)` и, раз в каждой паре соседей хотя бы один блок
/// заполнен наполовину, не больше `2 * len / half + 1`.
fn check_chain_bounds(list: &QuickList<i32>) -> Result<(), TestCaseError> {
    let capacity = list.block_capacity();
    let half = capacity.div_ceil(2);
    let len = list.len();

    prop_assert!(list.validate_invariants().is_ok());
    prop_assert!(list.length() >= len.div_ceil(capacity));
    prop_assert!(list.length() <= 2 * len / half + 1);
    if len == 0 {
        prop_assert_eq!(list.length(), 0);
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_removals_keep_chain_compact(
        capacity in 1usize..9,
        values in prop::collection::vec(0i32..5, 0..200),
        ops in prop::collection::vec((0u8..3, 0i32..5, -3isize..3), 0..60),
    ) {
        let mut list = QuickList::new(capacity);
        list.extend(values.iter().copied());
        check_chain_bounds(&list)?;

        for (op, value, count) in ops {
            match op {
                0 => {
                    list.remove_limited(&value, count);
                }
                1 => {
                    let _ = list.pop();
                }
                2 => {
                    let _ = list.shift();
                }
                _ => unreachable!(),
            }
            check_chain_bounds(&list)?;
        }
    }
}

proptest! {
    #[test]
    fn prop_cursor_walk_survives_mutation(
        capacity in 1usize..7,
        initial in 0i32..60,
        ops in prop::collection::vec((0u8..4, 0i32..80), 0..80),
    ) {
        let mut list = QuickList::new(capacity);
        list.extend(0..initial);
        let mut next_value = initial;

        let mut cursor = list.cursor();
        let mut seen = Vec::new();
        let mut dropped_unseen = Vec::new();

        for (op, value) in ops {
            let removed = match op {
                0 => (list.remove(&value) > 0).then_some(value),
                1 => list.pop().ok(),
                2 => list.shift().ok(),
                3 => {
                    list.push(next_value);
                    next_value += 1;
                    None
                }
                _ => unreachable!(),
            };
            if let Some(removed) = removed {
                if !seen.contains(&removed) {
                    dropped_unseen.push(removed);
                }
            }

            if let Some(&value) = cursor.next(&list) {
                seen.push(value);
            }
        }
        while let Some(&value) = cursor.next(&list) {
            seen.push(value);
        }

        prop_assert!(!cursor.is_lost());
        prop_assert!(seen.windows(2).all(|w| w[0] < w[1]), "seen: {:?}", seen);
        prop_assert!(list.iter().all(|v| seen.contains(v)));
        prop_assert!(dropped_unseen.iter().all(|v| !seen.contains(v)));
    }
}
