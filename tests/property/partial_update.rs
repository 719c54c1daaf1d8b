//! Property-based tests for partial updates and keyword matching.
//!
//! Uses proptest to verify:
//! 1. Fields absent from an update keep their previous values exactly.
//! 2. Fields present in an update (including explicit `null`) are applied as given.
//! 3. `id` and `createdAt` never change, and `updatedAt >= createdAt`.
//! 4. Keyword matching agrees with a lowercase substring search.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use todo_proto::{Priority, Todo, TodoId, UpdateTodo};

// --- Strategies ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    // 2000-01-01 .. 2100-01-01, millisecond precision.
    (946_684_800_000_i64..4_102_444_800_000_i64)
        .prop_map(|ms| DateTime::from_timestamp_millis(ms).unwrap())
}

fn arb_todo() -> impl Strategy<Value = Todo> {
    (
        1..i64::MAX,
        "[a-zA-Z0-9 ]{1,40}",
        any::<bool>(),
        prop::option::of("[a-zA-Z0-9 ]{0,40}"),
        prop::option::of(arb_instant()),
        arb_priority(),
        arb_instant(),
    )
        .prop_map(
            |(id, title, completed, description, due_date, priority, created_at)| Todo {
                id: TodoId::new(id),
                title,
                completed,
                description,
                due_date,
                priority,
                created_at,
                updated_at: created_at,
            },
        )
}

fn arb_date_string() -> impl Strategy<Value = String> {
    (2000_i32..2100, 1_u32..=12, 1_u32..=28)
        .prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

/// Arbitrary valid patch: each key independently absent, null (where
/// allowed), or set.
fn arb_patch() -> impl Strategy<Value = UpdateTodo> {
    (
        prop::option::of("[a-zA-Z0-9 ]{1,40}".prop_map(Some)),
        prop::option::of(any::<bool>().prop_map(Some)),
        prop::option::of(prop::option::of("[a-zA-Z0-9 ]{0,40}")),
        prop::option::of(prop::option::of(arb_date_string())),
        prop::option::of(arb_priority().prop_map(Some)),
    )
        .prop_map(
            |(title, completed, description, due_date, priority)| UpdateTodo {
                title,
                completed,
                description,
                due_date,
                priority,
            },
        )
}

proptest! {
    #[test]
    fn absent_fields_are_preserved_and_present_fields_applied(
        original in arb_todo(),
        patch in arb_patch(),
        later_ms in 0_i64..1_000_000,
    ) {
        let now = original.created_at + chrono::Duration::milliseconds(later_ms);
        let changes = patch.clone().validate().expect("generated patches are valid");
        let mut updated = original.clone();
        changes.apply(&mut updated, now);

        prop_assert_eq!(updated.id, original.id);
        prop_assert_eq!(updated.created_at, original.created_at);
        prop_assert!(updated.updated_at >= updated.created_at);

        match &patch.title {
            None => prop_assert_eq!(&updated.title, &original.title),
            Some(value) => prop_assert_eq!(Some(&updated.title), value.as_ref()),
        }
        match patch.completed {
            None => prop_assert_eq!(updated.completed, original.completed),
            Some(value) => prop_assert_eq!(Some(updated.completed), value),
        }
        match &patch.description {
            None => prop_assert_eq!(&updated.description, &original.description),
            Some(value) => prop_assert_eq!(&updated.description, value),
        }
        match &patch.due_date {
            None => prop_assert_eq!(updated.due_date, original.due_date),
            Some(None) => prop_assert_eq!(updated.due_date, None),
            Some(Some(raw)) => {
                let expected = todo_proto::time::parse_due_date(raw).unwrap();
                prop_assert_eq!(updated.due_date, Some(expected));
            }
        }
        match patch.priority {
            None => prop_assert_eq!(updated.priority, original.priority),
            Some(value) => prop_assert_eq!(Some(updated.priority), value),
        }
    }

    #[test]
    fn patch_survives_the_wire(patch in arb_patch()) {
        let json = serde_json::to_string(&patch).unwrap();
        let decoded: UpdateTodo = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, patch);
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring(
        todo in arb_todo(),
        keyword in "[a-zA-Z]{1,4}",
    ) {
        let needle = keyword.to_lowercase();
        let expected = todo.title.to_lowercase().contains(&needle)
            || todo
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
        prop_assert_eq!(todo.matches_keyword(&keyword), expected);
        prop_assert_eq!(todo.matches_keyword(&keyword.to_uppercase()), expected);
    }
}

#[test]
fn timestamps_round_trip_through_the_wire_format() {
    let at = Utc.with_ymd_and_hms(2026, 1, 20, 12, 34, 56).unwrap()
        + chrono::Duration::milliseconds(789);
    let formatted = todo_proto::time::format(&at);
    assert_eq!(formatted, "2026-01-20T12:34:56.789Z");
    assert_eq!(todo_proto::time::parse_due_date(&formatted).unwrap(), at);
}
