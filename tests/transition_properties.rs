use fieldops_api::entities::work_order::{
    format_order_number, WorkOrderStatus, LEGAL_TRANSITIONS,
};
use proptest::prelude::*;

proptest! {
    // zero-padded sequences keep lexicographic and numeric order aligned
    #[test]
    fn order_numbers_sort_like_their_sequence(a in 1..=999_999i32, b in 1..=999_999i32) {
        let lhs = format_order_number(2026, a);
        let rhs = format_order_number(2026, b);
        prop_assert_eq!(a.cmp(&b), lhs.cmp(&rhs));
    }

    #[test]
    fn order_numbers_embed_year_and_sequence(seq in 1..=999_999i32) {
        let number = format_order_number(2026, seq);
        let parts: Vec<&str> = number.split('-').collect();
        prop_assert_eq!(parts.len(), 3);
        prop_assert_eq!(parts[0], "WO");
        prop_assert_eq!(parts[1], "2026");
        prop_assert_eq!(parts[2].parse::<i32>().unwrap(), seq);
    }
}

#[test]
fn no_transition_ever_leaves_completed() {
    assert!(LEGAL_TRANSITIONS
        .iter()
        .all(|(from, _)| *from != WorkOrderStatus::Completed));
}

#[test]
fn every_non_terminal_state_can_reach_cancellation_or_completion() {
    for from in [WorkOrderStatus::Pending, WorkOrderStatus::InProgress] {
        assert!(from.can_transition_to(WorkOrderStatus::Completed)
            || from.can_transition_to(WorkOrderStatus::Cancelled));
    }
}
