use std::any::Any;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A message that can travel through a [`Bus`](crate::Bus).
///
/// Generated modules implement this for their payload enum: every variant
/// carries the statically known payload of exactly one event identifier.
pub trait Message: Send + Sync + 'static {
    /// The event identifier type, one value per declared event.
    type Event: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// The identifier of the event this message belongs to.
    fn event(&self) -> Self::Event;
}

/// Extracts a readable message from a caught panic value.
///
/// Works for the two payload shapes produced by `panic!`: `&'static str` and
/// `String`. Returns `None` for custom payloads passed to `std::panic::panic_any`.
#[must_use]
pub fn panic_message(fault: &(dyn Any + Send)) -> Option<&str> {
    fault
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| fault.downcast_ref::<String>().map(String::as_str))
}
