#![allow(dead_code)]

mod shipping {
    #[derive(Debug, Default, PartialEq)]
    pub struct OrderShipped {
        pub carrier: String,
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct OrderCreated {
    pub id: u64,
}

#[derive(Debug, PartialEq)]
pub struct OrderCancelled {}

busgen::event_names! {
    pub ORDER_CREATED, ORDER_SHIPPED = "order.created", "order.shipped";
    ALIAS_CREATED, ALIAS_SHIPPED;
    pub(crate) ORDER_CANCELLED = "order.cancelled";
    LATEST;
}

const PLAIN: &str = "order.plain";

busgen::event_map! {
    pub Events = {
        ORDER_CREATED => OrderCreated::default(),
        String::from(ORDER_SHIPPED) => shipping::OrderShipped::default(),
        ORDER_CANCELLED.to_string() => OrderCancelled {},
    };
    pub(crate) OrderEvents = {
        "order.created" => <OrderCreated>::default(),
        PLAIN.to_owned() => <shipping::OrderShipped>::default(),
    }
}

busgen::event_map! {
    Empty = {};
}

#[test]
fn grouped_names_inherit_the_previous_value_list() {
    assert_eq!(ORDER_CREATED, "order.created");
    assert_eq!(ORDER_SHIPPED, "order.shipped");
    assert_eq!(ALIAS_CREATED, ORDER_CREATED);
    assert_eq!(ALIAS_SHIPPED, ORDER_SHIPPED);
    assert_eq!(LATEST, "order.cancelled");
}

#[test]
fn event_map_keeps_declaration_order_and_payloads() {
    assert_eq!(
        Events.names().collect::<Vec<_>>(),
        ["order.created", "order.shipped", "order.cancelled"]
    );
    assert_eq!(
        Events.get("order.shipped").and_then(|p| p.downcast_ref::<shipping::OrderShipped>()),
        Some(&shipping::OrderShipped::default())
    );
    assert!(Events.get("order.cancelled").is_some_and(|p| p.is::<OrderCancelled>()));

    assert_eq!(OrderEvents.len(), 2);
    assert!(OrderEvents.contains("order.plain"));
    assert!(Empty.is_empty());
}
