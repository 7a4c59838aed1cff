use bitpack::BitTable;
use proptest::prelude::*;

fn arb_table(major: usize, minor: usize) -> impl Strategy<Value = BitTable> {
    proptest::collection::vec(any::<bool>(), major * minor).prop_map(move |bits| {
        let mut t = BitTable::zeros(major, minor);
        for (i, bit) in bits.into_iter().enumerate() {
            t.set(i / minor, i % minor, bit);
        }
        t
    })
}

proptest! {
    #[test]
    fn transpose_is_its_own_inverse(t in arb_table(37, 51)) {
        prop_assert_eq!(t.transposed().transposed(), t);
    }

    #[test]
    fn square_in_place_agrees_with_out_of_place(t in arb_table(64, 64)) {
        let mut by_value = t.clone();
        by_value.transpose_square_in_place();
        prop_assert_eq!(by_value, t.transposed());
    }

    #[test]
    fn non_square_out_of_place_swaps_dimensions(t in arb_table(19, 130)) {
        let out = t.transposed();
        prop_assert_eq!(out.major_len(), t.minor_len());
        prop_assert_eq!(out.minor_len(), t.major_len());
    }
}

#[test]
fn single_bit_table_transposes_trivially() {
    let mut t = BitTable::zeros(1, 1);
    t.set(0, 0, true);
    let out = t.transposed();
    assert!(out.get(0, 0));
}

#[test]
fn all_zero_table_stays_zero() {
    let t = BitTable::zeros(130, 130);
    let out = t.transposed();
    assert!(!out.not_zero());
}
