use thiserror::Error;

/// A failed compilation, naming the target it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{target}: {kind}")]
pub struct CompileError {
    target: String,
    kind: ErrorKind,
}

impl CompileError {
    #[must_use]
    pub fn new(target: impl Into<String>, kind: ErrorKind) -> Self {
        Self { target: target.into(), kind }
    }

    /// The target spec (`dir.Binding`) that failed.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

/// Every way a compilation stage can reject its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("no `event_map!` binding named `{binding}` found")]
    DeclarationNotFound { binding: String },

    #[error("binding `{binding}` is declared more than once: {}", locations.join(", "))]
    AmbiguousDeclaration { binding: String, locations: Vec<String> },

    #[error("constant `{name}` does not resolve to a string value")]
    UnresolvedConstant { name: String },

    #[error("constant `{name}` is declared {declarations} times with different values")]
    AmbiguousConstant { name: String, declarations: usize },

    #[error(
        "unsupported event key `{expression}` (expected a string literal, a constant, or a conversion of a constant)"
    )]
    InvalidKeyExpression { expression: String },

    #[error(
        "unsupported payload `{expression}` for event `{event}` (expected `T {{}}` or `T::default()`)"
    )]
    InvalidValueExpression { event: String, expression: String },

    #[error("event map `{binding}` declares no events")]
    EmptySchema { binding: String },

    #[error("invalid prefix {prefix:?} for `{binding}` (expected an identifier)")]
    InvalidPrefix { binding: String, prefix: String },

    #[error("invalid event name {name:?}{}", describe_character(.character))]
    InvalidEventName { name: String, character: Option<char> },

    #[error("duplicate event name `{name}`")]
    DuplicateEventName { name: String },

    #[error("events `{first}` and `{second}` both normalize to `{symbol}`")]
    SymbolCollision { first: String, second: String, symbol: String },

    #[error("invalid payload type `{payload}` for event `{event}`")]
    InvalidPayloadIdentifier { event: String, payload: String },

    #[error("failed to parse {path}: {message}")]
    ParseFailure { path: String, message: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to render module: {message}")]
    Render { message: String },
}

fn describe_character(character: &Option<char>) -> String {
    character.map_or_else(|| ": name is empty".to_owned(), |c| format!(": unexpected character {c:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_target_and_offenders() {
        let err = CompileError::new(
            "./src.Events",
            ErrorKind::SymbolCollision {
                first: "a.b".into(),
                second: "a_b".into(),
                symbol: "AB".into(),
            },
        );
        assert_eq!(err.to_string(), "./src.Events: events `a.b` and `a_b` both normalize to `AB`");
        assert_eq!(err.target(), "./src.Events");
    }

    #[test]
    fn invalid_event_name_mentions_the_character() {
        let kind = ErrorKind::InvalidEventName { name: "a b".into(), character: Some(' ') };
        assert_eq!(kind.to_string(), "invalid event name \"a b\": unexpected character ' '");

        let kind = ErrorKind::InvalidEventName { name: String::new(), character: None };
        assert_eq!(kind.to_string(), "invalid event name \"\": name is empty");
    }

    #[test]
    fn ambiguous_declaration_lists_every_location() {
        let kind = ErrorKind::AmbiguousDeclaration {
            binding: "Events".into(),
            locations: vec!["src/a.rs:3".into(), "src/b.rs:9".into()],
        };
        assert_eq!(
            kind.to_string(),
            "binding `Events` is declared more than once: src/a.rs:3, src/b.rs:9"
        );
    }
}
