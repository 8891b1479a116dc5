// tests/pool_properties.rs
//! Property tests for buffer pool invariants

use framegrab_core::{BufferPool, PoolError};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    Checkout,
    ReturnOldest,
    ReturnNewest,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Checkout),
        1 => Just(Op::ReturnOldest),
        1 => Just(Op::ReturnNewest),
    ]
}

proptest! {
    /// For any interleaving of checkouts and returns, the pool never hands
    /// out more buffers than its capacity, the outstanding count never goes
    /// negative, and checked-out + available always equals capacity.
    #[test]
    fn pool_accounting_holds_for_any_op_sequence(
        capacity in 1usize..8,
        ops in proptest::collection::vec(op_strategy(), 1..64),
    ) {
        let pool = BufferPool::new(capacity, 32).unwrap();
        let mut held: VecDeque<_> = VecDeque::new();
        let mut last_sequence: Option<u64> = None;

        for op in ops {
            match op {
                Op::Checkout => match pool.checkout(Duration::from_millis(1)) {
                    Ok(buffer) => {
                        // Sequence numbers strictly increase across checkouts.
                        if let Some(last) = last_sequence {
                            prop_assert!(buffer.sequence() > last);
                        }
                        last_sequence = Some(buffer.sequence());
                        held.push_back(buffer);
                        prop_assert!(held.len() <= capacity);
                    }
                    Err(PoolError::Exhausted { .. }) => {
                        // Exhaustion may only happen with every buffer out.
                        prop_assert_eq!(held.len(), capacity);
                    }
                    Err(err) => {
                        prop_assert!(false, "unexpected pool error: {}", err);
                    }
                },
                Op::ReturnOldest => {
                    if let Some(buffer) = held.pop_front() {
                        pool.give_back(buffer).unwrap();
                    }
                }
                Op::ReturnNewest => {
                    if let Some(buffer) = held.pop_back() {
                        pool.give_back(buffer).unwrap();
                    }
                }
            }

            prop_assert_eq!(pool.outstanding(), held.len());
            prop_assert_eq!(pool.outstanding() + pool.available(), capacity);
        }

        // Returning everything restores full availability...
        while let Some(buffer) = held.pop_front() {
            pool.give_back(buffer).unwrap();
        }
        prop_assert_eq!(pool.available(), capacity);

        // ...and every buffer is checkout-able again exactly once.
        let mut reacquired = Vec::new();
        for _ in 0..capacity {
            reacquired.push(pool.checkout(Duration::from_millis(1)).unwrap());
        }
        let exhausted = matches!(
            pool.checkout(Duration::from_millis(1)),
            Err(PoolError::Exhausted { .. })
        );
        prop_assert!(exhausted);
        for buffer in reacquired {
            pool.give_back(buffer).unwrap();
        }
    }
}
