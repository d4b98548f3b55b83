use crate::error::ErrorKind;
use crate::schema::{self, EventDef, SEPARATORS, Schema};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Checks the schema and sorts its events by name.
///
/// Events are checked one at a time in declaration order, so the first offending
/// event decides the reported error.
pub fn validate(mut schema: Schema) -> Result<Schema, ErrorKind> {
    if schema.events().is_empty() {
        return Err(ErrorKind::EmptySchema { binding: schema.binding().to_owned() });
    }
    if !schema::is_valid_prefix(schema.prefix()) {
        return Err(ErrorKind::InvalidPrefix {
            binding: schema.binding().to_owned(),
            prefix: schema.prefix().to_owned(),
        });
    }

    let mut names = HashSet::new();
    let mut symbols: HashMap<String, &str> = HashMap::new();

    for event in schema.events() {
        check_name(event.name())?;

        if !names.insert(event.name()) {
            return Err(ErrorKind::DuplicateEventName { name: event.name().to_owned() });
        }

        let symbol = event.symbol();
        if let Some(first) = symbols.get(&symbol) {
            return Err(ErrorKind::SymbolCollision {
                first: (*first).to_owned(),
                second: event.name().to_owned(),
                symbol,
            });
        }
        symbols.insert(symbol, event.name());

        if !is_type_path(event.payload()) {
            return Err(ErrorKind::InvalidPayloadIdentifier {
                event: event.name().to_owned(),
                payload: event.payload().to_owned(),
            });
        }
    }

    schema.events_mut().sort_by(|a, b| a.name().cmp(b.name()));
    debug!(
        binding = schema.binding(),
        events = schema.events().len(),
        first = schema.events().first().map(EventDef::name),
        "Schema validated"
    );
    Ok(schema)
}

fn check_name(name: &str) -> Result<(), ErrorKind> {
    if name.is_empty() {
        return Err(ErrorKind::InvalidEventName { name: String::new(), character: None });
    }
    match name.chars().find(|c| !SEPARATORS.contains(c) && !is_name_char(*c)) {
        Some(c) => Err(ErrorKind::InvalidEventName { name: name.to_owned(), character: Some(c) }),
        None => Ok(()),
    }
}

/// Letters and digits that survive as identifier characters; `²` or `½` do not.
fn is_name_char(c: char) -> bool {
    (c.is_alphabetic() || c.is_numeric()) && schema::is_ident_continue(c)
}

/// `Ident` or `module.Ident`.
fn is_type_path(payload: &str) -> bool {
    let mut parts = payload.splitn(2, '.');
    parts.all(is_identifier) && !payload.is_empty()
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(events: &[(&str, &str)]) -> Schema {
        Schema::new(
            "src/events.rs",
            "events",
            "Events",
            "",
            events.iter().map(|(name, payload)| EventDef::new(*name, *payload)).collect(),
        )
    }

    #[test]
    fn valid_schema_is_sorted_by_name() {
        let validated = validate(schema(&[
            ("order.shipped", "OrderShipped"),
            ("Zoo.opened", "zoo.Opened"),
            ("order.created", "OrderCreated"),
        ]))
        .unwrap();

        let names: Vec<&str> = validated.events().iter().map(EventDef::name).collect();
        assert_eq!(names, ["Zoo.opened", "order.created", "order.shipped"]);
    }

    #[test]
    fn empty_schema_is_rejected() {
        assert_eq!(
            validate(schema(&[])).unwrap_err(),
            ErrorKind::EmptySchema { binding: "Events".into() }
        );
    }

    #[test]
    fn invalid_names_report_the_character() {
        assert_eq!(
            validate(schema(&[("order created", "A")])).unwrap_err(),
            ErrorKind::InvalidEventName { name: "order created".into(), character: Some(' ') }
        );
        assert_eq!(
            validate(schema(&[("", "A")])).unwrap_err(),
            ErrorKind::InvalidEventName { name: String::new(), character: None }
        );
        for (name, character) in [("level²", '²'), ("half½", '½'), ("order·created", '·')] {
            assert_eq!(
                validate(schema(&[(name, "A")])).unwrap_err(),
                ErrorKind::InvalidEventName { name: name.into(), character: Some(character) }
            );
        }
        assert!(validate(schema(&[("über.straße-1_x", "A")])).is_ok());
    }

    #[test]
    fn duplicates_and_collisions_are_rejected() {
        assert_eq!(
            validate(schema(&[("a.b", "A"), ("a.b", "B")])).unwrap_err(),
            ErrorKind::DuplicateEventName { name: "a.b".into() }
        );
        assert_eq!(
            validate(schema(&[("data-sync", "A"), ("data_sync", "B")])).unwrap_err(),
            ErrorKind::SymbolCollision {
                first: "data-sync".into(),
                second: "data_sync".into(),
                symbol: "DataSync".into(),
            }
        );
    }

    #[test]
    fn payloads_must_be_identifiers() {
        for payload in ["", "1Abc", "a.b.c", "a.", ".A", "r#type", "A<B>"] {
            let err = validate(schema(&[("x", payload)])).unwrap_err();
            assert_eq!(
                err,
                ErrorKind::InvalidPayloadIdentifier { event: "x".into(), payload: payload.into() },
                "{payload}"
            );
        }
        assert!(validate(schema(&[("x", "_private.Type9")])).is_ok());
    }

    #[test]
    fn prefix_must_be_identifier_shaped() {
        let bad = Schema::new("src/lib.rs", "crate", "Events", "Order Items", vec![EventDef::new("a", "A")]);
        assert_eq!(
            validate(bad).unwrap_err(),
            ErrorKind::InvalidPrefix { binding: "Events".into(), prefix: "Order Items".into() }
        );
    }

    #[test]
    fn first_offending_event_wins() {
        // The bad payload on the first event is reported before the later duplicate.
        let err = validate(schema(&[("a", "1Bad"), ("b", "B"), ("b", "B")])).unwrap_err();
        assert!(matches!(err, ErrorKind::InvalidPayloadIdentifier { .. }));
    }
}
