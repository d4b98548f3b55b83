//! # busgen
//!
//! Runtime for event buses generated by the `busgen` compiler.
//!
//! ## Overview
//!
//! A schema is declared in ordinary Rust with [`event_map!`], mapping wire-level
//! event names to payload types. The compiler reads that declaration and emits a
//! module with an event enum, a payload enum implementing [`Message`] and a typed
//! bus wrapping [`Bus`]. All queueing, dispatch and fault isolation lives here,
//! so the emitted code stays a thin typed facade.
//!
//! ## Features
//!
//! * **Bounded**: publishing never blocks; overflow is dropped and observable.
//! * **Ordered**: a single dispatcher delivers messages in FIFO order.
//! * **Isolated**: a panicking handler never stops delivery to the others.
//! * **Observable**: `on_publish`, `on_drop`, `on_subscribe` and `on_panic` hooks.
//!
//! # Example
//!
//! ```rust
//! #[derive(Default)]
//! pub struct OrderCreated {
//!     pub id: u64,
//! }
//!
//! busgen::event_names! {
//!     pub ORDER_SHIPPED = "order.shipped";
//! }
//!
//! #[derive(Default)]
//! pub struct OrderShipped;
//!
//! busgen::event_map! {
//!     pub Events = {
//!         "order.created" => OrderCreated::default(),
//!         ORDER_SHIPPED => OrderShipped::default(),
//!     };
//! }
//!
//! assert_eq!(Events.names().collect::<Vec<_>>(), ["order.created", "order.shipped"]);
//! ```

mod bus;
mod error;
mod map;
mod message;

pub use bus::Bus;
pub use error::{BusError, UnknownEvent};
pub use map::EventMap;
pub use message::{Message, panic_message};
