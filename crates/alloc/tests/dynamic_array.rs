use std::{cell::Cell, rc::Rc};

use proptest::prelude::*;
use tessera_alloc::{
    dynarr, growth::round_up_pow2, AllocError, Arena, ArenaConfig, ArrayError, DynamicArray,
    Tracking,
};

/// Element that records how many live instances share its counter.
#[derive(Debug)]
struct Live(Rc<Cell<isize>>, u32);

impl Live {
    fn new(counter: &Rc<Cell<isize>>, value: u32) -> Self {
        counter.set(counter.get() + 1);
        Self(counter.clone(), value)
    }
}

impl Clone for Live {
    fn clone(&self) -> Self {
        Self::new(&self.0, self.1)
    }
}

impl Drop for Live {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

#[derive(Clone, Debug)]
enum Op {
    Push(u32),
    Pop,
    Resize(usize),
    Reserve(usize),
    ShrinkToFit,
    Clear,
    Take,
    CloneAssign,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<u32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        1 => (0usize..40).prop_map(Op::Resize),
        1 => (0usize..40).prop_map(Op::Reserve),
        1 => Just(Op::ShrinkToFit),
        1 => Just(Op::Clear),
        1 => Just(Op::Take),
        1 => Just(Op::CloneAssign),
    ]
}

#[test]
fn strings_round_trip_through_an_arena() {
    let arena = Arena::new(ArenaConfig::new(64, 16)).unwrap();
    {
        let mut strs = DynamicArray::new_in(&arena);
        strs.emplace_back(|| String::from("Hello"));
        strs.push_back(String::from("World"));
        let copy = strs.clone();
        assert_eq!(copy, strs);
        assert_eq!(arena.used_blocks(), 2);
    }
    assert_eq!(arena.used_blocks(), 0);
}

#[test]
fn arena_exhaustion_surfaces_as_alloc_error() {
    let arena = Arena::new(ArenaConfig::new(8, 4)).unwrap();
    let mut values = DynamicArray::new_in(&arena);
    // 1, 2, then 4 slots of u32 all fit; growing to 8 slots needs 32 bytes while 16 are held
    for i in 0..4u32 {
        values.try_push_back(i).unwrap();
    }
    assert_eq!(values.try_push_back(4), Err(AllocError::OutOfMemory));
    assert_eq!(values.as_slice(), [0, 1, 2, 3]);

    values.clear();
    values.shrink_to_fit();
    assert_eq!(arena.used_blocks(), 0);
}

#[test]
fn sum_propagates_allocation_failure() {
    let tracking = Tracking::with_limit(32);
    let a = DynamicArray::from_slice_in(&[1u64, 2], tracking.clone());
    let b = DynamicArray::from_slice_in(&[3u64, 4], tracking.clone());
    assert_eq!(
        a.try_add(&b).unwrap_err(),
        ArrayError::Alloc(AllocError::OutOfMemory)
    );
}

#[test]
fn assignment_replaces_contents_and_allocator_state() {
    let mut target = dynarr![1, 2, 3];
    let source = DynamicArray::from_slice(&[9, 8]);
    target.assign(&source).unwrap();
    assert_eq!(target, source);
    assert_eq!(target.capacity(), 2);

    target.assign_slice(&[5]).unwrap();
    assert_eq!(target.as_slice(), [5]);

    let mut cloned = dynarr![0; 10];
    cloned.clone_from(&source);
    assert_eq!(cloned.as_slice(), [9, 8]);
}

proptest! {
    #[test]
    fn with_len_is_exact(n in 0usize..200) {
        let array = DynamicArray::<u16>::with_len(n);
        prop_assert_eq!(array.len(), n);
        prop_assert_eq!(array.capacity(), n);
        prop_assert_eq!(array.is_empty(), n == 0);
        prop_assert_eq!(array.data().is_null(), n == 0);
    }

    #[test]
    fn from_slice_is_exact(values in proptest::collection::vec(any::<i64>(), 0..100)) {
        let array = DynamicArray::from_slice(&values);
        prop_assert_eq!(array.len(), values.len());
        prop_assert_eq!(array.capacity(), values.len());
        prop_assert_eq!(array.as_slice(), values.as_slice());
    }

    #[test]
    fn at_fails_exactly_past_len(values in proptest::collection::vec(any::<u8>(), 0..50), index in 0usize..60) {
        let array = DynamicArray::from_slice(&values);
        match array.at(index) {
            Ok(value) => {
                prop_assert!(index < values.len());
                prop_assert_eq!(*value, values[index]);
            }
            Err(err) => {
                prop_assert!(index >= values.len());
                prop_assert_eq!(err, ArrayError::OutOfRange { index, len: values.len() });
            }
        }
    }

    #[test]
    fn push_growth_is_power_of_two(count in 1usize..300) {
        let mut array = DynamicArray::new();
        let mut reallocations = 0;
        for i in 0..count {
            let before = array.capacity();
            array.push_back(i);
            if array.capacity() != before {
                reallocations += 1;
                prop_assert!(array.capacity().is_power_of_two());
            }
        }
        prop_assert_eq!(Some(array.capacity()), round_up_pow2(count));
        prop_assert!(reallocations <= usize::BITS - count.leading_zeros() + 1);
    }

    #[test]
    fn shrinking_resize_keeps_capacity(values in proptest::collection::vec(any::<u32>(), 1..64), k in 0usize..64) {
        let mut array = DynamicArray::from_slice(&values);
        let k = k % values.len();
        array.resize(k);
        prop_assert_eq!(array.len(), k);
        prop_assert_eq!(array.capacity(), values.len());
        prop_assert_eq!(array.as_slice(), &values[..k]);
    }

    #[test]
    fn arithmetic_is_element_wise(
        pairs in proptest::collection::vec((-1000i32..1000, -1000i32..1000), 0..50),
        extra in 1usize..5,
    ) {
        let (l, r): (Vec<i32>, Vec<i32>) = pairs.into_iter().unzip();
        let a = DynamicArray::from_slice(&l);
        let b = DynamicArray::from_slice(&r);

        let sum = (&a + &b).unwrap();
        let diff = (&a - &b).unwrap();
        for i in 0..l.len() {
            prop_assert_eq!(sum[i], l[i] + r[i]);
            prop_assert_eq!(diff[i], l[i] - r[i]);
        }

        let mut longer = b.clone();
        for _ in 0..extra {
            longer.push_back(0);
        }
        prop_assert_eq!(
            (&a + &longer).unwrap_err(),
            ArrayError::SizeMismatch { left: l.len(), right: l.len() + extra }
        );
        prop_assert!((&longer - &a).is_err());
    }

    #[test]
    fn equality_follows_content(values in proptest::collection::vec(any::<u8>(), 1..30), extra: u8) {
        let a = DynamicArray::from_slice(&values);
        let mut b = a.clone();
        prop_assert!(a == b);
        prop_assert!(b == a);
        b.push_back(extra);
        prop_assert!(a != b);
    }

    #[test]
    fn take_moves_without_allocating(values in proptest::collection::vec(any::<u64>(), 0..40)) {
        let tracking = Tracking::new();
        let mut source = DynamicArray::from_slice_in(&values, tracking.clone());
        let allocations = tracking.stats().allocations();

        let moved = source.take();
        prop_assert_eq!(tracking.stats().allocations(), allocations);
        prop_assert_eq!(moved.as_slice(), values.as_slice());
        prop_assert_eq!(source.len(), 0);
        prop_assert_eq!(source.capacity(), 0);
        prop_assert!(source.data().is_null());
    }

    #[test]
    fn reverse_cursor_mirrors_forward_order(values in proptest::collection::vec(any::<i16>(), 0..40)) {
        let array = DynamicArray::from_slice(&values);
        let mut seen = Vec::new();
        let mut it = array.rbegin();
        while it != array.rend() {
            seen.push(*it.get().unwrap());
            it.advance();
        }
        seen.reverse();
        prop_assert_eq!(seen, values);
    }

    #[test]
    fn matches_vec_model_without_leaks(ops in proptest::collection::vec(arb_op(), 0..80)) {
        let live = Rc::new(Cell::new(0));
        let tracking = Tracking::new();
        {
            let mut array = DynamicArray::new_in(tracking.clone());
            let mut model: Vec<u32> = Vec::new();

            for op in ops {
                match op {
                    Op::Push(value) => {
                        array.push_back(Live::new(&live, value));
                        model.push(value);
                    }
                    Op::Pop => {
                        prop_assert_eq!(array.pop_back().map(|v| v.1), model.pop());
                    }
                    Op::Resize(len) => {
                        array.resize_with(len, || Live::new(&live, 7));
                        model.resize(len, 7);
                    }
                    Op::Reserve(capacity) => {
                        let before = array.capacity();
                        array.reserve(capacity);
                        prop_assert_eq!(array.capacity(), before.max(capacity));
                    }
                    Op::ShrinkToFit => {
                        array.shrink_to_fit();
                        prop_assert_eq!(array.capacity(), array.len());
                    }
                    Op::Clear => {
                        array.clear();
                        model.clear();
                    }
                    Op::Take => {
                        let taken = array.take();
                        prop_assert_eq!(array.capacity(), 0);
                        array = taken;
                    }
                    Op::CloneAssign => {
                        let copy = array.clone();
                        prop_assert_eq!(copy.capacity(), array.capacity());
                        array.assign(&copy).unwrap();
                    }
                }

                prop_assert!(array.len() <= array.capacity());
                prop_assert_eq!(array.data().is_null(), array.capacity() == 0);
                prop_assert_eq!(live.get(), model.len() as isize);
                let values: Vec<u32> = array.iter().map(|v| v.1).collect();
                prop_assert_eq!(&values, &model);
            }
        }
        prop_assert_eq!(live.get(), 0);
        prop_assert_eq!(tracking.stats().live_bytes(), 0);
        prop_assert_eq!(tracking.stats().live_allocations(), 0);
    }
}
