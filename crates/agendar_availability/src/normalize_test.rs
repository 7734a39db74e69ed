#[cfg(test)]
mod tests {
    use crate::expand::{parse_date, DateWindow, NO_EVENTS_MESSAGE};
    use crate::normalize::{
        AdjacencyPolicy, Normalizer, CLOSED_DAY_MESSAGE, OPEN_DAY_MESSAGE, UNRECOGNIZED_MESSAGE,
    };
    use crate::slots::SlotCatalogue;
    use chrono_tz::America::Sao_Paulo;
    use serde_json::json;

    const BASE: [&str; 5] = ["13:30", "15:30", "17:30", "19:30", "21:30"];

    fn normalizer(adjacency: AdjacencyPolicy) -> Normalizer {
        Normalizer::new(
            SlotCatalogue::default_catalogue(),
            Sao_Paulo,
            adjacency,
            "Atender",
            "confirmed",
        )
    }

    fn window(start: &str, end: &str) -> DateWindow {
        DateWindow::new(parse_date(start).unwrap(), parse_date(end).unwrap()).unwrap()
    }

    #[test]
    fn compact_string_opens_the_attend_day() {
        let raw = json!({ "events": { "value": "Atender,confirmed,2025-08-25T13:30:00.000Z" } });
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-25"));

        assert_eq!(days.len(), 1);
        let day = &days["2025-08-25"];
        assert!(day.has_availability);
        assert_eq!(day.available_slots, BASE);
        assert_eq!(day.event_name.as_deref(), Some("Atender"));
        assert_eq!(day.message, OPEN_DAY_MESSAGE);
    }

    #[test]
    fn compact_string_with_other_marker_closes_the_day() {
        let raw = json!({ "events": { "value": "Outro,cancelled,2025-08-25T13:30:00.000Z" } });
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-25"));

        let day = &days["2025-08-25"];
        assert!(!day.has_availability);
        assert!(day.available_slots.is_empty());
        assert_eq!(day.event_name.as_deref(), Some("Outro"));
        assert_eq!(day.message, CLOSED_DAY_MESSAGE);
    }

    #[test]
    fn busy_interval_books_the_exact_slot_only() {
        let raw = json!({ "occupied": { "busy": [
            { "start": "2025-01-20T15:30:00-03:00", "end": "2025-01-20T16:30:00-03:00" }
        ]}});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-01-20", "2025-01-20"));

        let day = &days["2025-01-20"];
        assert_eq!(day.booked_slots, vec!["15:30"]);
        assert_eq!(day.available_slots, vec!["13:30", "17:30", "19:30", "21:30"]);
        assert!(day.has_availability);
    }

    #[test]
    fn adjacency_policy_also_closes_the_neighbours() {
        let raw = json!({ "occupied": { "busy": [
            { "start": "2025-01-20T15:30:00-03:00", "end": "2025-01-20T16:30:00-03:00" }
        ]}});
        let days = normalizer(AdjacencyPolicy::ExcludeNeighbors)
            .normalize(&raw, &window("2025-01-20", "2025-01-20"));

        let day = &days["2025-01-20"];
        assert_eq!(day.booked_slots, vec!["15:30"]);
        assert_eq!(day.available_slots, vec!["19:30", "21:30"]);
    }

    #[test]
    fn busy_starts_are_read_in_the_business_timezone() {
        // 20:30 UTC is 17:30 in São Paulo
        let raw = json!({ "occupied": { "busy": [
            { "start": "2025-01-20T20:30:00Z", "end": "2025-01-20T21:30:00Z" }
        ]}});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-01-20", "2025-01-20"));

        assert_eq!(days["2025-01-20"].booked_slots, vec!["17:30"]);
    }

    #[test]
    fn busy_interval_outside_the_grid_is_ignored() {
        // 14:30 has no catalogue slot; the day stays fully open
        let raw = json!({ "occupied": { "busy": [
            { "start": "2025-01-20T14:30:00-03:00", "end": "2025-01-20T15:00:00-03:00" }
        ]}});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-01-20", "2025-01-20"));

        let day = &days["2025-01-20"];
        assert!(day.booked_slots.is_empty());
        assert_eq!(day.available_slots, BASE);
    }

    #[test]
    fn precomputed_range_passes_through_unchanged() {
        let raw = json!({ "weeklyAvailability": {
            "2025-08-25": {
                "date": "2025-08-25",
                "hasAvailability": true,
                "availableSlots": ["13:30"],
                "bookedSlots": ["15:30"],
                "eventName": "Atender",
                "eventStatus": "confirmed",
                "message": "já calculado"
            }
        }});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-24", "2025-08-25"));

        let day = &days["2025-08-25"];
        // no re-derivation: the upstream slot lists are trusted as-is
        assert_eq!(day.available_slots, vec!["13:30"]);
        assert_eq!(day.booked_slots, vec!["15:30"]);
        assert_eq!(day.message, "já calculado");
        assert_eq!(days["2025-08-24"].message, NO_EVENTS_MESSAGE);
    }

    #[test]
    fn precomputed_day_payload_is_trusted() {
        let raw = json!({ "availableSlots": ["13:30", "17:30"], "bookedSlots": ["15:30"] });
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-01-20", "2025-01-20"));

        let day = &days["2025-01-20"];
        assert_eq!(day.available_slots, vec!["13:30", "17:30"]);
        assert_eq!(day.booked_slots, vec!["15:30"]);
    }

    #[test]
    fn available_list_extracts_open_slots() {
        let raw = json!({ "available": [
            { "start": "2025-01-20T13:30:00-03:00", "end": "2025-01-20T14:30:00-03:00" },
            { "start": "2025-01-20T19:30:00-03:00", "end": "2025-01-20T20:30:00-03:00" }
        ]});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-01-20", "2025-01-20"));

        let day = &days["2025-01-20"];
        assert_eq!(day.available_slots, vec!["13:30", "19:30"]);
        assert!(day.booked_slots.is_empty());
    }

    #[test]
    fn raw_calendar_events_mark_slots_booked() {
        let raw = json!({ "events": [
            { "start": { "dateTime": "2025-01-20T17:30:00-03:00" } }
        ]});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-01-20", "2025-01-20"));

        let day = &days["2025-01-20"];
        assert_eq!(day.booked_slots, vec!["17:30"]);
        assert_eq!(day.available_slots, vec!["13:30", "15:30", "19:30", "21:30"]);
    }

    #[test]
    fn attend_events_open_and_close_days() {
        let raw = json!({ "events": [
            { "name": "Atender", "status": "confirmed", "start": "2025-08-25T13:30:00.000Z" },
            { "name": "Folga", "status": "confirmed", "start": "2025-08-26T13:30:00.000Z" }
        ]});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-27"));

        assert!(days["2025-08-25"].has_availability);
        assert_eq!(days["2025-08-25"].available_slots, BASE);
        assert!(!days["2025-08-26"].has_availability);
        assert_eq!(days["2025-08-26"].event_name.as_deref(), Some("Folga"));
        assert_eq!(days["2025-08-27"].message, NO_EVENTS_MESSAGE);
    }

    #[test]
    fn doubly_quoted_markers_are_stripped_before_comparison() {
        let raw = json!({ "events": [
            { "name": "\"Atender\"", "status": "\"confirmed\"", "start": "2025-08-25T13:30:00.000Z" }
        ]});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-25"));

        let day = &days["2025-08-25"];
        assert!(day.has_availability);
        assert_eq!(day.event_name.as_deref(), Some("Atender"));
    }

    #[test]
    fn tagged_values_group_in_batches_of_three() {
        let raw = json!({ "events": [
            { "value": "Atender" },
            { "value": "confirmed" },
            { "value": "2025-08-25T13:30:00.000Z" },
            { "value": "Atender" },
            { "value": "cancelled" },
            { "value": "2025-08-26T13:30:00.000Z" }
        ]});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-26"));

        assert!(days["2025-08-25"].has_availability);
        // second batch is not confirmed: no entry, the filler takes over
        assert!(!days["2025-08-26"].has_availability);
        assert_eq!(days["2025-08-26"].message, NO_EVENTS_MESSAGE);
    }

    #[test]
    fn incomplete_tagged_batch_is_skipped() {
        let raw = json!({ "events": [
            { "value": "Atender" },
            { "value": "confirmed" }
        ]});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-25"));
        assert!(!days["2025-08-25"].has_availability);
    }

    #[test]
    fn stringly_events_are_reparsed_as_json() {
        let inner = r#"[{"value":"Atender"},{"value":"confirmed"},{"value":"2025-08-25T13:30:00.000Z"}]"#;
        let raw = json!({ "events": inner });
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-25"));
        assert!(days["2025-08-25"].has_availability);
    }

    #[test]
    fn stringly_events_fall_back_to_timestamp_harvesting() {
        let raw = json!({ "events": "ruído Atender 2025-08-25T13:30:00.000Z fim" });
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-25"));
        assert!(days["2025-08-25"].has_availability);
    }

    #[test]
    fn empty_events_array_means_no_events_not_unrecognized() {
        let raw = json!({ "events": [] });
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-26"));
        assert_eq!(days.len(), 2);
        for day in days.values() {
            assert!(!day.has_availability);
            assert_eq!(day.message, NO_EVENTS_MESSAGE);
        }
    }

    #[test]
    fn unrecognized_payload_never_throws() {
        for raw in [
            json!(null),
            json!(42),
            json!("banana"),
            json!({ "totally": { "unexpected": true } }),
            json!({ "events": { "nested": { "deep": [1, 2, 3] } } }),
        ] {
            let days = normalizer(AdjacencyPolicy::Exact)
                .normalize(&raw, &window("2025-08-25", "2025-08-27"));
            assert_eq!(days.len(), 3);
            for day in days.values() {
                assert!(!day.has_availability);
                assert_eq!(day.message, UNRECOGNIZED_MESSAGE);
                assert!(!day.message.is_empty());
            }
        }
    }

    #[test]
    fn malformed_precomputed_day_degrades_alone() {
        let raw = json!({ "weeklyAvailability": {
            "2025-08-25": { "date": "2025-08-25", "hasAvailability": true, "availableSlots": ["13:30"] },
            "2025-08-26": "isso não é um dia"
        }});
        let days = normalizer(AdjacencyPolicy::Exact)
            .normalize(&raw, &window("2025-08-25", "2025-08-26"));

        assert!(days["2025-08-25"].has_availability);
        assert!(!days["2025-08-26"].has_availability);
        assert_eq!(days["2025-08-26"].message, UNRECOGNIZED_MESSAGE);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = json!({ "events": [
            { "name": "Atender", "status": "confirmed", "start": "2025-08-25T13:30:00.000Z" }
        ]});
        let w = window("2025-08-24", "2025-08-27");
        let n = normalizer(AdjacencyPolicy::Exact);
        assert_eq!(n.normalize(&raw, &w), n.normalize(&raw, &w));
    }

    #[test]
    fn every_window_date_appears_exactly_once() {
        let raw = json!({ "events": [
            { "name": "Atender", "status": "confirmed", "start": "2025-08-25T13:30:00.000Z" }
        ]});
        let w = window("2025-08-20", "2025-08-27");
        let days = normalizer(AdjacencyPolicy::Exact).normalize(&raw, &w);
        let expected: Vec<String> = w.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        assert_eq!(days.keys().cloned().collect::<Vec<_>>(), expected);
    }
}
