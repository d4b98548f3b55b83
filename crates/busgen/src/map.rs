use std::any::Any;
use std::fmt;

/// The value behind a binding declared with [`event_map!`](crate::event_map).
///
/// Holds every `(event name, zero-value payload)` entry in declaration order.
/// The bus compiler reads the declaration from source; this value only exists so
/// that the declaration is compiled and its payload types are checked.
pub struct EventMap {
    entries: Vec<(String, Box<dyn Any + Send + Sync>)>,
}

impl EventMap {
    #[must_use]
    pub fn from_entries(entries: Vec<(String, Box<dyn Any + Send + Sync>)>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Event names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// The zero-value payload declared for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, payload)| payload.as_ref())
    }
}

impl fmt::Debug for EventMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Declares one or more event maps for the bus compiler.
///
/// Each binding maps event-name keys to a zero-value construction of the payload
/// type. Keys may be string literals, `&str` constants or a single-argument string
/// conversion of a constant (`String::from(NAME)`, `NAME.to_string()`).
///
/// A `// busgen:prefix <Name>` comment above the invocation or above a single
/// binding overrides the prefix of the generated types.
///
/// # Example
///
/// ```rust
/// #[derive(Default)]
/// pub struct OrderCreated {
///     pub id: u64,
/// }
///
/// pub struct OrderShipped {}
///
/// const ORDER_SHIPPED: &str = "order.shipped";
///
/// busgen::event_map! {
///     pub Events = {
///         "order.created" => OrderCreated::default(),
///         ORDER_SHIPPED => OrderShipped {},
///     };
/// }
///
/// assert_eq!(Events.len(), 2);
/// assert!(Events.contains("order.shipped"));
/// ```
#[macro_export]
macro_rules! event_map {
    ($($vis:vis $name:ident = { $($key:expr => $value:expr),* $(,)? });+ $(;)?) => {
        $(
            #[allow(non_upper_case_globals)]
            $vis static $name: ::std::sync::LazyLock<$crate::EventMap> =
                ::std::sync::LazyLock::new(|| {
                    $crate::EventMap::from_entries(::std::vec![
                        $((
                            ::std::string::String::from($key),
                            ::std::boxed::Box::new($value)
                                as ::std::boxed::Box<dyn ::std::any::Any + Send + Sync>,
                        )),*
                    ])
                });
        )+
    };
}

/// Declares grouped `&str` constants usable as [`event_map!`](crate::event_map) keys.
///
/// Each line binds several names to an equally long value list. A line without
/// values repeats the most recent value list of the group.
///
/// # Example
///
/// ```rust
/// busgen::event_names! {
///     pub ORDER_CREATED, ORDER_PAID = "order.created", "order.paid";
///     pub LEGACY_CREATED, LEGACY_PAID;
/// }
///
/// assert_eq!(ORDER_PAID, "order.paid");
/// assert_eq!(LEGACY_CREATED, "order.created");
/// ```
#[macro_export]
macro_rules! event_names {
    (@specs [$($prev:expr),*]) => {};
    (@specs [$($prev:expr),*] $vis:vis $($name:ident),+ = $($value:expr),+ ; $($rest:tt)*) => {
        $(
            #[allow(dead_code)]
            $vis const $name: &str = $value;
        )+
        $crate::event_names!(@specs [$($value),+] $($rest)*);
    };
    (@specs [$($prev:expr),*] $vis:vis $($name:ident),+ ; $($rest:tt)*) => {
        $(
            #[allow(dead_code)]
            $vis const $name: &str = $prev;
        )+
        $crate::event_names!(@specs [$($prev),*] $($rest)*);
    };
    ($($body:tt)+) => {
        $crate::event_names!(@specs [] $($body)+);
    };
}
