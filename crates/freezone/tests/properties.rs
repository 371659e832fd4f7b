//! Property tests: random allocate/free sequences against a shadow model.
//!
//! After every step the free list must be sorted, fully coalesced and
//! non-overlapping, and free bytes plus live bytes must equal the capacity.

use freezone::{round_to_minimum, Address, Heap, HeapConfig, HeapError};
use freezone_test_utils::free_layout;
use proptest::prelude::*;

const CAPACITY: usize = 8192;

#[derive(Clone, Debug)]
enum Op {
    Alloc(usize),
    /// Free the live allocation at this index (modulo the live count).
    Free(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..700).prop_map(Op::Alloc),
        2 => any::<usize>().prop_map(Op::Free),
    ]
}

fn check_layout(heap: &Heap, live: &[(Address, usize)]) -> Result<(), TestCaseError> {
    let layout = free_layout(heap);
    for pair in layout.windows(2) {
        let (a, a_size) = pair[0];
        let (b, _) = pair[1];
        prop_assert!(a < b, "free list not ascending: {layout:?}");
        prop_assert!(a + a_size < b, "free blocks overlap or touch: {layout:?}");
    }
    let free: usize = layout.iter().map(|&(_, size)| size).sum();
    let used: usize = live.iter().map(|&(_, size)| round_to_minimum(size)).sum();
    prop_assert_eq!(free + used, CAPACITY);
    prop_assert_eq!(heap.check_invariants(), Ok(()));
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(
        ops in proptest::collection::vec(op_strategy(), 1..120),
    ) {
        let mut heap = Heap::init(CAPACITY).unwrap();
        let mut live: Vec<(Address, usize)> = Vec::new();
        for op in ops {
            match op {
                Op::Alloc(size) => match heap.allocate(size) {
                    Ok(address) => live.push((address, size)),
                    Err(HeapError::NoSuitableBlock { .. }) => {}
                    Err(e) => prop_assert!(false, "unexpected error: {e}"),
                },
                Op::Free(pick) => {
                    if live.is_empty() {
                        continue;
                    }
                    let (address, size) = live.swap_remove(pick % live.len());
                    heap.free(address, size).unwrap();
                }
            }
            check_layout(&heap, &live)?;
        }
        for (address, size) in live.drain(..) {
            heap.free(address, size).unwrap();
        }
        prop_assert_eq!(free_layout(&heap), vec![(0, CAPACITY)]);
    }

    #[test]
    fn allocate_then_free_restores_exact_shape(
        setup in proptest::collection::vec(1usize..400, 0..20),
        holes in proptest::collection::vec(any::<bool>(), 0..20),
        size in 1usize..1000,
    ) {
        let mut heap = Heap::init(CAPACITY).unwrap();
        let mut live = Vec::new();
        for s in setup {
            if let Ok(address) = heap.allocate(s) {
                live.push((address, s));
            }
        }
        // Punch holes so the list has more than one block.
        for ((address, s), punch) in live.iter().zip(holes) {
            if punch {
                heap.free(*address, *s).unwrap();
            }
        }

        let before = free_layout(&heap);
        if let Ok(address) = heap.allocate(size) {
            heap.free(address, size).unwrap();
            prop_assert_eq!(free_layout(&heap), before);
        } else {
            prop_assert_eq!(free_layout(&heap), before);
        }
    }

    #[test]
    fn out_of_range_free_is_rejected_without_change(
        offset in CAPACITY..CAPACITY * 4,
        size in 1usize..64,
    ) {
        let mut heap = Heap::with_config(HeapConfig::new(CAPACITY).trusted()).unwrap();
        heap.allocate(128).unwrap();
        let before = free_layout(&heap);
        let rejected = matches!(
            heap.free(Address(offset), size),
            Err(HeapError::InvalidArgument { .. })
        );
        prop_assert!(rejected);
        prop_assert_eq!(free_layout(&heap), before);
    }

    #[test]
    fn allocations_never_overlap(
        sizes in proptest::collection::vec(1usize..500, 1..60),
    ) {
        let mut heap = Heap::init(CAPACITY).unwrap();
        let mut spans: Vec<(usize, usize)> = sizes
            .iter()
            .filter_map(|&s| heap.allocate(s).ok().map(|a| (a.offset(), round_to_minimum(s))))
            .collect();
        spans.sort_unstable();
        for pair in spans.windows(2) {
            prop_assert!(pair[0].0 + pair[0].1 <= pair[1].0);
        }
        prop_assert!(spans.last().is_none_or(|&(a, s)| a + s <= CAPACITY));
    }
}
