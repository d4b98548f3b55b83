use crate::decl::{self, NAMES_MACRO, NameGroup};
use crate::error::ErrorKind;
use crate::source::ParsedFile;
use std::collections::BTreeMap;
use syn::{Expr, Item, Lit};
use tracing::{debug, trace};

/// Number of passes over the declarations. References that need more hops than
/// this to reach a literal stay unresolved.
const PASSES: usize = 2;

/// Identifier to string value for every resolvable constant of a source set.
///
/// Constants are keyed by bare name. A name declared more than once resolves only
/// when every declaration yields the same value; otherwise it is recorded as a
/// conflict, since the table cannot tell which one a `use` brings into scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantTable {
    values: BTreeMap<String, String>,
    conflicts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Literal(String),
    Reference(String),
    Unsupported,
}

/// Names bound by one spec, each paired with its value slot.
type Spec = Vec<(String, Value)>;

impl ConstantTable {
    /// Resolves the constants declared at the top level of `files`.
    pub(crate) fn collect(files: &[ParsedFile<'_>]) -> Result<Self, ErrorKind> {
        let mut specs = Vec::new();
        for file in files {
            declarations(file, &mut specs)?;
        }
        let slots: Vec<(String, Value)> = specs.into_iter().flatten().collect();

        let mut resolved: Vec<Option<String>> = vec![None; slots.len()];
        for pass in 1..=PASSES {
            for (index, (name, value)) in slots.iter().enumerate() {
                if resolved[index].is_some() {
                    continue;
                }
                resolved[index] = match value {
                    Value::Literal(literal) => Some(literal.clone()),
                    Value::Reference(target) => unique(&slots, &resolved, target).map(str::to_owned),
                    Value::Unsupported => None,
                };
                if let Some(value) = &resolved[index] {
                    trace!(pass, constant = %name, %value, "Resolved constant");
                }
            }
        }

        let mut table = Self::default();
        for (name, _) in &slots {
            if table.values.contains_key(name) || table.conflicts.contains_key(name) {
                continue;
            }
            match unique(&slots, &resolved, name) {
                Some(value) => {
                    table.values.insert(name.clone(), value.to_owned());
                },
                None => {
                    let declarations = slots.iter().filter(|(n, _)| n == name).count();
                    if declarations > 1 {
                        debug!(constant = %name, declarations, "Conflicting constant declarations");
                        table.conflicts.insert(name.clone(), declarations);
                    }
                },
            }
        }

        Ok(table)
    }

    /// The value of `name`, if it resolved to exactly one value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get), but tells a conflicting name apart from a missing one.
    pub(crate) fn resolve(&self, name: &str) -> Result<&str, ErrorKind> {
        if let Some(&declarations) = self.conflicts.get(name) {
            return Err(ErrorKind::AmbiguousConstant { name: name.to_owned(), declarations });
        }
        self.get(name).ok_or_else(|| ErrorKind::UnresolvedConstant { name: name.to_owned() })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The value shared by every declaration of `name`, once all of them resolved.
fn unique<'a>(
    slots: &[(String, Value)],
    resolved: &'a [Option<String>],
    name: &str,
) -> Option<&'a str> {
    let mut values = slots.iter().zip(resolved).filter(|((n, _), _)| n == name).map(|(_, v)| v);
    let first = values.next()?.as_deref()?;
    values.all(|v| v.as_deref() == Some(first)).then_some(first)
}

fn declarations(file: &ParsedFile<'_>, specs: &mut Vec<Spec>) -> Result<(), ErrorKind> {
    for item in &file.syntax.items {
        match item {
            Item::Const(item) if !decl::is_test_only(&item.attrs) => {
                specs.push(vec![(item.ident.to_string(), value_of(&item.expr))]);
            },
            Item::Static(item) if !decl::is_test_only(&item.attrs) => {
                specs.push(vec![(item.ident.to_string(), value_of(&item.expr))]);
            },
            Item::Macro(item)
                if decl::invokes(item, NAMES_MACRO) && !decl::is_test_only(&item.attrs) =>
            {
                let group: NameGroup = item.mac.parse_body().map_err(|e| ErrorKind::ParseFailure {
                    path: file.source.path().display().to_string(),
                    message: format!("line {}: {NAMES_MACRO}!: {e}", decl::line_of(e.span())),
                })?;
                specs.extend(group_specs(group));
            },
            _ => {},
        }
    }
    Ok(())
}

/// Flattens a grouped declaration; a spec without values reuses the last explicit list.
fn group_specs(group: NameGroup) -> Vec<Spec> {
    let mut inherited: Vec<Value> = Vec::new();
    let mut specs = Vec::with_capacity(group.specs.len());

    for spec in group.specs {
        if let Some(values) = spec.values {
            inherited = values.iter().map(value_of).collect();
        }
        let spec = spec
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                (name.to_string(), inherited.get(i).cloned().unwrap_or(Value::Unsupported))
            })
            .collect();
        specs.push(spec);
    }

    specs
}

fn value_of(expr: &Expr) -> Value {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Value::Literal(s.value()),
            _ => Value::Unsupported,
        },
        Expr::Path(path) if path.qself.is_none() => {
            path.path.get_ident().map_or(Value::Unsupported, |ident| Value::Reference(ident.to_string()))
        },
        _ => Value::Unsupported,
    }
}
