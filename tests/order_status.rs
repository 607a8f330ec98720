use storefront_api::models::{FREE_SHIPPING_MIN, OrderStatus, OrderTotals, SHIPPING_FEE};

#[test]
fn status_strings_round_trip() {
    for status in OrderStatus::ALL {
        assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(OrderStatus::parse("Out for Delivery"), Some(OrderStatus::OutForDelivery));
    assert_eq!(OrderStatus::parse("out for delivery"), None);
    assert_eq!(OrderStatus::parse("Refunded"), None);
}

#[test]
fn status_serializes_as_dashboard_labels() {
    let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
    assert_eq!(json, r#""Out for Delivery""#);

    let parsed: OrderStatus = serde_json::from_str(r#""Cancelled""#).unwrap();
    assert_eq!(parsed, OrderStatus::Cancelled);
}

#[test]
fn terminal_states_lock_transitions() {
    assert!(OrderStatus::Delivered.is_terminal());
    assert!(OrderStatus::Cancelled.is_terminal());

    for status in OrderStatus::ALL {
        assert!(!OrderStatus::Delivered.can_transition_to(status));
        assert!(!OrderStatus::Cancelled.can_transition_to(status));
    }
}

#[test]
fn non_terminal_states_accept_any_other_status() {
    assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
    assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
    assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    assert!(OrderStatus::OutForDelivery.can_transition_to(OrderStatus::Pending));

    // A no-op "transition" to the same status is rejected.
    assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Shipped));
}

#[test]
fn totals_sum_price_times_quantity() {
    let totals = OrderTotals::compute(&[(10_000, 2), (5_000, 3)]);
    assert_eq!(totals.subtotal, 35_000);
    assert_eq!(totals.shipping, SHIPPING_FEE);
    assert_eq!(totals.total, 35_000 + SHIPPING_FEE);
}

#[test]
fn shipping_waived_above_threshold() {
    let totals = OrderTotals::compute(&[(FREE_SHIPPING_MIN, 1)]);
    assert_eq!(totals.shipping, 0);
    assert_eq!(totals.total, totals.subtotal);

    let below = OrderTotals::compute(&[(FREE_SHIPPING_MIN - 1, 1)]);
    assert_eq!(below.shipping, SHIPPING_FEE);
}
