use proptest::prelude::*;

/// Member ages for a generated dataset
pub fn ages_strategy() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(0..100i32, 0..16)
}

/// An optional age bound
pub fn bound_strategy() -> impl Strategy<Value = Option<i32>> {
    prop::option::of(0..100i32)
}
