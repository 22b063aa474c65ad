use proptest::prelude::*;
use std::collections::BTreeMap;
use wpml_to_polylang::codec::PhpValue;
use wpml_to_polylang::models::{group_rows, GroupPayload, TranslationRow};
use wpml_to_polylang::processing::cursor::percentage;

fn language_code() -> impl Strategy<Value = String> {
    "[a-z]{2}(-[a-z]{2})?"
}

proptest! {
    /// Property: progress never exceeds 100 and never goes backwards
    #[test]
    fn percentage_is_bounded_and_monotonic(
        batch_size in 1u32..10_000,
        total in 1u64..1_000_000,
        step in 1u32..500,
    ) {
        let current = percentage(step, batch_size, total);
        let next = percentage(step + 1, batch_size, total);
        prop_assert!(current <= 100);
        prop_assert!(next >= current);
    }

    /// Property: the last page always reports 100
    #[test]
    fn final_step_reports_complete(batch_size in 1u32..10_000, total in 1u64..1_000_000) {
        let steps = total.div_ceil(u64::from(batch_size)) as u32;
        prop_assert_eq!(percentage(steps, batch_size, total), 100);
    }

    /// Property: payload bytes do not depend on row order
    #[test]
    fn payload_encoding_is_order_independent(
        members in prop::collection::btree_map(language_code(), 1i64..1_000_000, 1..6),
    ) {
        let rows: Vec<TranslationRow> = members
            .iter()
            .map(|(lang, id)| TranslationRow::new(7, lang, *id))
            .collect();
        let mut reversed = rows.clone();
        reversed.reverse();

        let forward = group_rows(&rows);
        let backward = group_rows(&reversed);
        let forward = forward.get("pll_wpml_7").unwrap().payload().encode();
        let backward = backward.get("pll_wpml_7").unwrap().payload().encode();
        prop_assert_eq!(&forward, &backward);

        let decoded = GroupPayload::decode(&forward).unwrap();
        prop_assert_eq!(decoded.0, members.into_iter().collect::<BTreeMap<_, _>>());
    }

    /// Property: any encoded value decodes back to itself
    #[test]
    fn php_strings_survive_encoding(text in "\\PC{0,40}") {
        let value = PhpValue::Str(text);
        prop_assert_eq!(PhpValue::decode(&value.encode()).unwrap(), value);
    }
}
