use crate::names::{USER_CREATED, USER_DELETED};

pub mod orders {
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct OrderShipped {
        pub id: u64,
        pub carrier: String,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCreated {
    pub id: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCreated {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDeleted {
    pub name: String,
}

busgen::event_map! {
    pub Events = {
        "order.shipped" => orders::OrderShipped::default(),
        "order.created" => OrderCreated::default(),
        USER_CREATED => UserCreated::default(),
        String::from(USER_DELETED) => UserDeleted::default(),
    };
}

mod eventbus {
    include!(concat!(env!("OUT_DIR"), "/eventbus.rs"));
}

pub use eventbus::{Bus, Event, Payload};
