//! Property-based tests for the alerting and replenishment math.
//!
//! These tests use proptest to verify invariants across a wide range of
//! inputs, helping to catch edge cases that unit tests might miss.

use proptest::prelude::*;

use stockroom_api::entities::stock_alert::{overdue_priority_for, priority_for};
use stockroom_api::services::replenishment::{
    average_daily_consumption, days_until_stockout, suggested_order_quantity,
};

// Property: severity is monotone — draining stock never lowers the priority
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn priority_never_decreases_as_stock_drains(
        threshold in 0i32..1_000,
        stock in -100i32..1_000,
    ) {
        let before = priority_for(stock, threshold);
        let after = priority_for(stock - 1, threshold);
        prop_assert!(
            after >= before,
            "priority dropped from {:?} to {:?} when stock fell from {} to {}",
            before, after, stock, stock - 1
        );
    }

    #[test]
    fn overdue_priority_never_decreases_with_lateness(days in 0i64..10_000) {
        prop_assert!(overdue_priority_for(days + 1) >= overdue_priority_for(days));
    }
}

// Property: suggested order quantities are always actionable
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn suggestion_covers_reorder_point_when_history_exists(
        total_out in 1i64..100_000,
        window_days in 1i64..365,
        threshold in 0i32..10_000,
        reorder_point in 0i32..10_000,
        coverage_days in 1i64..90,
    ) {
        let avg = average_daily_consumption(total_out, window_days);
        prop_assert!(avg > 0.0);

        let suggested =
            suggested_order_quantity(avg, threshold, reorder_point, coverage_days);
        prop_assert!(
            suggested >= i64::from(reorder_point),
            "suggested {} below reorder point {}",
            suggested, reorder_point
        );
    }

    #[test]
    fn suggestion_is_always_positive(
        total_out in 0i64..100_000,
        window_days in 1i64..365,
        threshold in 0i32..10_000,
        reorder_point in 0i32..10_000,
        coverage_days in 1i64..90,
    ) {
        let avg = average_daily_consumption(total_out, window_days);
        let suggested =
            suggested_order_quantity(avg, threshold, reorder_point, coverage_days);
        prop_assert!(suggested > 0, "suggested quantity must never be zero");
    }
}

// Property: stockout projections are finite and non-negative
proptest! {
    #[test]
    fn stockout_projection_exists_exactly_when_history_does(
        stock in 0i32..100_000,
        total_out in 0i64..100_000,
        window_days in 1i64..365,
    ) {
        let avg = average_daily_consumption(total_out, window_days);
        let days = days_until_stockout(stock, avg);

        if total_out == 0 {
            prop_assert!(days.is_none(), "no history must mean no projection");
        } else {
            let days = days.expect("history implies a projection");
            prop_assert!(days >= 0, "projection {} must not be negative", days);
        }
    }
}
