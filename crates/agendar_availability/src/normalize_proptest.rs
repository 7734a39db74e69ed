#[cfg(test)]
mod proptests {
    use crate::expand::DateWindow;
    use crate::normalize::{AdjacencyPolicy, Normalizer};
    use crate::slots::SlotCatalogue;
    use chrono::{Duration, NaiveDate};
    use chrono_tz::America::Sao_Paulo;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn normalizer() -> Normalizer {
        Normalizer::new(
            SlotCatalogue::default_catalogue(),
            Sao_Paulo,
            AdjacencyPolicy::Exact,
            "Atender",
            "confirmed",
        )
    }

    fn arb_date() -> impl Strategy<Value = NaiveDate> + Clone {
        (0i64..3650).prop_map(|off| {
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(off)
        })
    }

    fn arb_window() -> impl Strategy<Value = DateWindow> {
        (arb_date(), 0i64..14).prop_map(|(start, len)| {
            DateWindow::new(start, start + Duration::days(len)).unwrap()
        })
    }

    /// Raw payloads spanning every dialect plus garbage.
    fn arb_payload() -> impl Strategy<Value = Value> {
        let stamp = (arb_date(), prop::sample::select(vec![13u32, 15, 17, 19, 21]))
            .prop_map(|(d, h)| format!("{}T{:02}:30:00.000Z", d.format("%Y-%m-%d"), h));
        prop_oneof![
            stamp.clone().prop_map(|s| json!({
                "events": [{ "name": "Atender", "status": "confirmed", "start": s }]
            })),
            stamp.clone().prop_map(|s| json!({
                "events": { "value": format!("Atender,confirmed,{s}") }
            })),
            stamp.clone().prop_map(|s| json!({
                "occupied": { "busy": [{ "start": s, "end": s }] }
            })),
            stamp.prop_map(|s| json!({
                "events": [{ "start": { "dateTime": s } }]
            })),
            Just(json!({ "events": [] })),
            Just(json!({ "whatever": true })),
            Just(json!(null)),
            ".*".prop_map(|s| json!({ "events": s })),
        ]
    }

    proptest! {
        /// The output keys are exactly the window dates, in order, no matter
        /// what the payload looks like.
        #[test]
        fn output_covers_the_window_exactly(window in arb_window(), raw in arb_payload()) {
            let days = normalizer().normalize(&raw, &window);
            let expected: Vec<String> = window
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect();
            prop_assert_eq!(days.keys().cloned().collect::<Vec<_>>(), expected);
        }

        /// Available and booked slot lists never overlap and stay inside the
        /// catalogue whenever a dialect derived them.
        #[test]
        fn derived_slots_are_disjoint_and_from_the_catalogue(
            window in arb_window(),
            raw in arb_payload(),
        ) {
            let n = normalizer();
            let base = n.catalogue().base_slots().to_vec();
            for day in n.normalize(&raw, &window).values() {
                for slot in &day.available_slots {
                    prop_assert!(base.contains(slot));
                    prop_assert!(!day.booked_slots.contains(slot));
                }
                for slot in &day.booked_slots {
                    prop_assert!(base.contains(slot));
                }
            }
        }

        /// `hasAvailability` always agrees with the slot list.
        #[test]
        fn flag_matches_the_slot_list(window in arb_window(), raw in arb_payload()) {
            for day in normalizer().normalize(&raw, &window).values() {
                prop_assert_eq!(day.has_availability, !day.available_slots.is_empty());
            }
        }

        /// Normalizing twice gives the same answer.
        #[test]
        fn normalization_is_idempotent(window in arb_window(), raw in arb_payload()) {
            let n = normalizer();
            prop_assert_eq!(n.normalize(&raw, &window), n.normalize(&raw, &window));
        }

        /// Every day carries a non-empty diagnostic message.
        #[test]
        fn every_day_has_a_message(window in arb_window(), raw in arb_payload()) {
            for day in normalizer().normalize(&raw, &window).values() {
                prop_assert!(!day.message.is_empty());
            }
        }
    }
}
