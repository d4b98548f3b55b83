use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Characters that separate the segments of an event name.
pub const SEPARATORS: [char; 3] = ['.', '-', '_'];

/// Binding compiled when no target is given.
pub const DEFAULT_BINDING: &str = "Events";

/// One event: its wire-level name and the payload type it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventDef {
    name: String,
    payload: String,
}

impl EventDef {
    /// `payload` is a type reference in dot form (`OrderCreated`, `orders.OrderCreated`).
    #[must_use]
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self { name: name.into(), payload: payload.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// PascalCase identifier of the event, see [`symbol`].
    #[must_use]
    pub fn symbol(&self) -> String {
        symbol(&self.name)
    }
}

/// An extracted event schema, ordered by name once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    source_path: PathBuf,
    source_module: String,
    binding: String,
    prefix: String,
    events: Vec<EventDef>,
}

impl Schema {
    #[must_use]
    pub fn new(
        source_path: impl Into<PathBuf>,
        source_module: impl Into<String>,
        binding: impl Into<String>,
        prefix: impl Into<String>,
        events: Vec<EventDef>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            source_module: source_module.into(),
            binding: binding.into(),
            prefix: prefix.into(),
            events,
        }
    }

    /// File holding the declaration.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Rust module holding the declaration (`events`, `orders::items`, `crate`).
    #[must_use]
    pub fn source_module(&self) -> &str {
        &self.source_module
    }

    #[must_use]
    pub fn binding(&self) -> &str {
        &self.binding
    }

    /// Prefix of the generated type names; may be empty.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn events(&self) -> &[EventDef] {
        &self.events
    }

    pub(crate) fn events_mut(&mut self) -> &mut Vec<EventDef> {
        &mut self.events
    }
}

/// Turns an event name into a PascalCase identifier.
///
/// The name is split on `.`, `-` and `_`, empty segments are skipped, and the first
/// character of every segment is uppercased: `shopping_list.cleanup` becomes
/// `ShoppingListCleanup`.
#[must_use]
pub fn symbol(name: &str) -> String {
    segments(name)
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
        })
        .collect()
}

/// Suffix of the per-event bus methods: segments with a lowercased first character,
/// joined by `_` (`order.created` gives `order_created`).
#[must_use]
pub fn method_suffix(name: &str) -> String {
    segments(name)
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| first.to_lowercase().chain(chars).collect())
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// A Rust identifier for the enum variant of `symbol`.
#[must_use]
pub fn variant_ident(symbol: &str) -> String {
    match symbol.chars().next() {
        None => "__".to_owned(),
        Some(first) if !is_ident_start(first) => format!("_{symbol}"),
        Some(_) if symbol == "Self" => "Self_".to_owned(),
        Some(_) => symbol.to_owned(),
    }
}

/// Prefix of the generated types for a binding without a directive.
///
/// `Events` yields an empty prefix, `<X>Events` yields `<X>`, anything else is kept.
#[must_use]
pub fn derive_prefix(binding: &str) -> &str {
    binding.strip_suffix(DEFAULT_BINDING).filter(|rest| !rest.is_empty()).unwrap_or_else(|| {
        if binding == DEFAULT_BINDING { "" } else { binding }
    })
}

/// File name of the module emitted for `prefix`.
#[must_use]
pub fn output_file_name(prefix: &str) -> String {
    if prefix.is_empty() { "eventbus.rs".to_owned() } else { format!("{}bus.rs", prefix.to_lowercase()) }
}

/// Whether `prefix` can be glued in front of `Event`, `Payload` and `Bus`.
pub(crate) fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    chars.next().is_none_or(|first| first == '_' || is_ident_start(first))
        && chars.all(is_ident_continue)
}

/// `XID_Start`, as the Rust lexer sees it.
pub(crate) fn is_ident_start(c: char) -> bool {
    syn::parse_str::<syn::Ident>(c.encode_utf8(&mut [0; 4])).is_ok()
}

/// `XID_Continue`, as the Rust lexer sees it.
pub(crate) fn is_ident_continue(c: char) -> bool {
    c == '_' || syn::parse_str::<syn::Ident>(&format!("_{c}")).is_ok()
}

fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(SEPARATORS).filter(|segment| !segment.is_empty())
}

/// What to compile: a source directory and the binding name inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    dir: PathBuf,
    binding: String,
}

impl Target {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, binding: impl Into<String>) -> Self {
        Self { dir: dir.into(), binding: binding.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn binding(&self) -> &str {
        &self.binding
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new(".", DEFAULT_BINDING)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dir.display(), self.binding)
    }
}

/// Rejected target spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid target `{spec}`: {reason}")]
pub struct TargetParseError {
    spec: String,
    reason: &'static str,
}

impl FromStr for Target {
    type Err = TargetParseError;

    /// Parses `dir.Binding`, splitting on the last `.`; an empty directory means `.`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| TargetParseError { spec: spec.to_owned(), reason };

        let (dir, binding) =
            spec.rsplit_once('.').ok_or_else(|| invalid("expected `<dir>.<Binding>`"))?;
        if binding.is_empty() {
            return Err(invalid("binding name is empty"));
        }
        if binding.contains(['/', '\\']) {
            return Err(invalid("binding name contains a path separator"));
        }

        Ok(Self::new(if dir.is_empty() { "." } else { dir }, binding))
    }
}
