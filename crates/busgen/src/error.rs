use std::borrow::Cow;
use thiserror::Error;

/// Errors that can occur while building or running a bus.
#[derive(Debug, Error)]
pub enum BusError {
    /// Capacity must be greater than zero for the bounded queue.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The queue receiver is already owned by a dispatcher, or a previous
    /// dispatcher has terminated and closed the queue.
    #[error("Dispatcher unavailable{}: {message}", format_context(.context))]
    DispatcherUnavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Returned by the generated `FromStr` impls when a wire name is not part of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown event name: {name}")]
pub struct UnknownEvent {
    name: String,
}

impl UnknownEvent {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The rejected wire name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_rendered_in_parentheses() {
        let err = BusError::InvalidCapacity {
            message: "capacity must be >= 1".into(),
            context: Some("Bus::new".into()),
        };
        assert_eq!(err.to_string(), "Invalid capacity (Bus::new): capacity must be >= 1");

        let err = BusError::DispatcherUnavailable { message: "taken".into(), context: None };
        assert_eq!(err.to_string(), "Dispatcher unavailable: taken");
    }

    #[test]
    fn unknown_event_keeps_the_name() {
        let err = UnknownEvent::new("order.voided");
        assert_eq!(err.name(), "order.voided");
        assert_eq!(err.to_string(), "Unknown event name: order.voided");
    }
}
