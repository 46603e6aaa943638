//! Property tests for the bounded-range adapter: whatever sequence of
//! mutations arrives, `min <= value <= value + extent <= max` holds.

use std::sync::Arc;

use proptest::prelude::*;
use tether::adapter::{BoundedRangeModel, RangeAdapter};
use tether::value::{ValueHolder, ValueModel};

#[derive(Clone, Debug)]
enum Mutation {
    Value(i32),
    Extent(i32),
    Minimum(i32),
    Maximum(i32),
    All(i32, i32, i32, i32),
    SubjectWrite(i32),
}

fn mutation() -> impl Strategy<Value = Mutation> {
    let n = any::<i32>();
    prop_oneof![
        n.prop_map(Mutation::Value),
        n.prop_map(Mutation::Extent),
        n.prop_map(Mutation::Minimum),
        n.prop_map(Mutation::Maximum),
        (n, n, n, n).prop_map(|(v, e, min, max)| Mutation::All(v, e, min, max)),
        n.prop_map(Mutation::SubjectWrite),
    ]
}

fn invariant_holds(adapter: &RangeAdapter) -> bool {
    let (value, extent, min, max) = (
        adapter.value(),
        adapter.extent(),
        adapter.minimum(),
        adapter.maximum(),
    );
    min <= value && extent >= 0 && value as i64 + extent as i64 <= max as i64
}

proptest! {
    #[test]
    fn range_invariant_survives_any_mutation_sequence(
        mutations in prop::collection::vec(mutation(), 1..40)
    ) {
        let subject = Arc::new(ValueHolder::new(0));
        let adapter = RangeAdapter::new(
            subject.clone() as Arc<dyn ValueModel<i32>>,
            0,
            0,
            100,
        )
        .expect("valid initial range");

        for mutation in mutations {
            match mutation {
                Mutation::Value(n) => adapter.set_value(n),
                Mutation::Extent(n) => adapter.set_extent(n),
                Mutation::Minimum(n) => adapter.set_minimum(n),
                Mutation::Maximum(n) => adapter.set_maximum(n),
                Mutation::All(v, e, min, max) => {
                    adapter.set_range_properties(v, e, min, max, false)
                }
                // External subject writes bypass the adapter's clamping;
                // the adapter's own mutators must still restore sanity.
                Mutation::SubjectWrite(n) => {
                    subject.set_value(Some(n));
                    adapter.set_value(n);
                }
            }
            prop_assert!(invariant_holds(&adapter));
        }
    }

    #[test]
    fn value_mutator_respects_fixed_bounds(value in any::<i32>()) {
        let subject = Arc::new(ValueHolder::new(50));
        let adapter = RangeAdapter::new(
            subject.clone() as Arc<dyn ValueModel<i32>>,
            10,
            0,
            100,
        )
        .expect("valid initial range");

        adapter.set_value(value);
        prop_assert_eq!(adapter.minimum(), 0);
        prop_assert_eq!(adapter.maximum(), 100);
        prop_assert!(adapter.value() >= 0);
        prop_assert!(adapter.value() + adapter.extent() <= 100);
    }
}
