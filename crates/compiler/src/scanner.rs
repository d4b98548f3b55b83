use crate::decl::{self, MAP_MACRO, MapBinding, MapGroup};
use crate::error::ErrorKind;
use crate::source::{ParsedFile, SourceFile};
use syn::Item;
use tracing::{debug, trace};

/// The one `event_map!` binding a compilation works on.
pub(crate) struct Declaration<'a> {
    pub(crate) file: &'a SourceFile,
    /// First line of the enclosing `event_map!` item, attributes included.
    pub(crate) group_line: usize,
    pub(crate) binding: MapBinding,
}

impl Declaration<'_> {
    fn location(&self) -> String {
        format!("{}:{}", self.file.path().display(), self.binding.line)
    }
}

/// Finds the single binding named `binding` among non-generated, non-test files.
pub(crate) fn find_declaration<'a>(
    files: &[ParsedFile<'a>],
    binding: &str,
) -> Result<Declaration<'a>, ErrorKind> {
    let mut found = Vec::new();

    for file in files {
        if file.source.is_generated() {
            trace!(path = %file.source.path().display(), "Skipping generated file");
            continue;
        }

        for item in &file.syntax.items {
            let Item::Macro(item) = item else { continue };
            if !decl::invokes(item, MAP_MACRO) || decl::is_test_only(&item.attrs) {
                continue;
            }

            let group: MapGroup = item.mac.parse_body().map_err(|e| ErrorKind::ParseFailure {
                path: file.source.path().display().to_string(),
                message: format!("line {}: {MAP_MACRO}!: {e}", decl::line_of(e.span())),
            })?;
            let group_line = decl::first_line(item);

            found.extend(group.bindings.into_iter().filter(|b| b.name == binding).map(|b| {
                Declaration { file: file.source, group_line, binding: b }
            }));
        }
    }

    match found.len() {
        0 => Err(ErrorKind::DeclarationNotFound { binding: binding.to_owned() }),
        1 => {
            let declaration = found.remove(0);
            debug!(binding, location = %declaration.location(), "Declaration found");
            Ok(declaration)
        },
        _ => Err(ErrorKind::AmbiguousDeclaration {
            binding: binding.to_owned(),
            locations: found.iter().map(Declaration::location).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{GENERATED_MARKER, SourceSet};

    fn scan(files: &[(&str, &str)], binding: &str) -> Result<(String, usize), ErrorKind> {
        let set = SourceSet::new(files.iter().map(|(p, t)| SourceFile::new(*p, *t)).collect());
        let parsed = set.parse()?;
        find_declaration(&parsed, binding).map(|d| (d.location(), d.group_line))
    }

    const EVENTS: &str = r#"
busgen::event_map! {
    pub Events = { "order.created" => OrderCreated {} };
}
"#;

    #[test]
    fn single_binding_is_found() {
        let found = scan(&[("src/events.rs", EVENTS)], "Events").unwrap();
        assert_eq!(found, ("src/events.rs:3".to_owned(), 2));
    }

    #[test]
    fn missing_binding_is_reported() {
        let err = scan(&[("src/events.rs", EVENTS)], "OrderEvents").unwrap_err();
        assert_eq!(err, ErrorKind::DeclarationNotFound { binding: "OrderEvents".into() });
    }

    #[test]
    fn duplicates_across_modules_are_ambiguous() {
        let err = scan(&[("src/b.rs", EVENTS), ("src/a.rs", EVENTS)], "Events").unwrap_err();
        assert_eq!(
            err,
            ErrorKind::AmbiguousDeclaration {
                binding: "Events".into(),
                locations: vec!["src/a.rs:3".into(), "src/b.rs:3".into()],
            }
        );
    }

    #[test]
    fn generated_test_and_cfg_test_declarations_are_skipped() {
        let generated = format!("// {GENERATED_MARKER}. DO NOT EDIT.\n{EVENTS}");
        let cfg_test = format!("#[cfg(test)]\n{}", EVENTS.trim_start());
        let err = scan(
            &[
                ("src/events/eventbus.rs", generated.as_str()),
                ("tests/events.rs", EVENTS),
                ("src/fixtures.rs", cfg_test.as_str()),
            ],
            "Events",
        )
        .unwrap_err();
        assert!(matches!(err, ErrorKind::DeclarationNotFound { .. }));
    }

    #[test]
    fn malformed_group_is_a_parse_failure() {
        let err = scan(&[("src/lib.rs", "event_map! { Events => 1 }")], "Events").unwrap_err();
        assert!(matches!(err, ErrorKind::ParseFailure { ref path, .. } if path == "src/lib.rs"));
    }
}
