use crate::constants::ConstantTable;
use crate::error::ErrorKind;
use crate::scanner::Declaration;
use crate::schema::{self, EventDef, Schema};
use quote::ToTokens;
use syn::{Expr, ExprPath, Lit, Path, Type};
use tracing::debug;

/// Comment marker that overrides the derived prefix.
pub const PREFIX_DIRECTIVE: &str = "busgen:prefix";

const MAX_TYPE_SEGMENTS: usize = 2;

/// Turns the matched binding into an unvalidated schema in declaration order.
pub(crate) fn extract(
    declaration: &Declaration<'_>,
    constants: &ConstantTable,
) -> Result<Schema, ErrorKind> {
    let binding = declaration.binding.name.to_string();

    let events = declaration
        .binding
        .entries
        .iter()
        .map(|entry| {
            let name = resolve_key(&entry.key, constants)?;
            let payload = payload_type(&name, &entry.value)?;
            Ok(EventDef::new(name, payload))
        })
        .collect::<Result<Vec<_>, ErrorKind>>()?;

    let file = declaration.file;
    let prefix = prefix_directive(&file.comments_above(declaration.binding.line))
        .or_else(|| prefix_directive(&file.comments_above(declaration.group_line)))
        .unwrap_or_else(|| schema::derive_prefix(&binding).to_owned());

    debug!(binding = %binding, prefix = %prefix, events = events.len(), "Schema extracted");
    Ok(Schema::new(file.path(), file.module_path(), binding, prefix, events))
}

/// Resolves a map key to its string value.
fn resolve_key(key: &Expr, constants: &ConstantTable) -> Result<String, ErrorKind> {
    let invalid = || ErrorKind::InvalidKeyExpression { expression: render(key) };

    match key {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            _ => Err(invalid()),
        },
        Expr::Path(_) => resolve_constant(key, constants).ok_or_else(invalid)?,
        Expr::Call(call) if call.args.len() == 1 && is_from(&call.func) => {
            resolve_constant(&call.args[0], constants).ok_or_else(invalid)?
        },
        Expr::MethodCall(call)
            if call.args.is_empty()
                && call.turbofish.is_none()
                && (call.method == "to_string" || call.method == "to_owned") =>
        {
            resolve_constant(&call.receiver, constants).ok_or_else(invalid)?
        },
        _ => Err(invalid()),
    }
}

/// Looks up a bare constant reference. `None` if `expr` is not one.
fn resolve_constant(expr: &Expr, constants: &ConstantTable) -> Option<Result<String, ErrorKind>> {
    let Expr::Path(path) = expr else { return None };
    let ident = path.qself.is_none().then(|| path.path.get_ident()).flatten()?;
    Some(constants.resolve(&ident.to_string()).map(str::to_owned))
}

fn is_from(func: &Expr) -> bool {
    matches!(func, Expr::Path(path) if path.path.segments.last().is_some_and(|s| s.ident == "from"))
}

/// Reads the payload type out of a zero-value construction, in dot form.
fn payload_type(event: &str, value: &Expr) -> Result<String, ErrorKind> {
    let dotted = match value {
        Expr::Struct(init)
            if init.fields.is_empty() && init.rest.is_none() && init.qself.is_none() =>
        {
            dotted(&init.path, 0)
        },
        Expr::Call(call) if call.args.is_empty() => match call.func.as_ref() {
            Expr::Path(func) => default_call_type(func),
            _ => None,
        },
        _ => None,
    };

    dotted.ok_or_else(|| ErrorKind::InvalidValueExpression {
        event: event.to_owned(),
        expression: render(value),
    })
}

/// `T::default`, `m::T::default`, `<T>::default` and `<m::T>::default`.
fn default_call_type(func: &ExprPath) -> Option<String> {
    let last = func.path.segments.last()?;
    if last.ident != "default" || !last.arguments.is_none() {
        return None;
    }

    match &func.qself {
        None => dotted(&func.path, 1),
        Some(qself) if qself.position == 0 && func.path.segments.len() == 1 => {
            match qself.ty.as_ref() {
                Type::Path(ty) if ty.qself.is_none() => dotted(&ty.path, 0),
                _ => None,
            }
        },
        Some(_) => None,
    }
}

/// Dot form of a relative type path without generics, minus `skip_last` segments.
fn dotted(path: &Path, skip_last: usize) -> Option<String> {
    if path.leading_colon.is_some() {
        return None;
    }
    let count = path.segments.len().checked_sub(skip_last)?;
    if !(1..=MAX_TYPE_SEGMENTS).contains(&count) {
        return None;
    }

    path.segments
        .iter()
        .take(count)
        .map(|segment| segment.arguments.is_none().then(|| segment.ident.to_string()))
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.join("."))
}

fn render(expr: &Expr) -> String {
    expr.to_token_stream().to_string()
}

/// Value of the last `busgen:prefix` line in `comments`; an empty value is an explicit empty prefix.
fn prefix_directive(comments: &[&str]) -> Option<String> {
    comments.iter().rev().find_map(|line| {
        let text = line.strip_prefix("//")?.trim_start();
        let rest = text.strip_prefix(PREFIX_DIRECTIVE)?;
        (rest.is_empty() || rest.starts_with(char::is_whitespace)).then(|| rest.trim().to_owned())
    })
}
