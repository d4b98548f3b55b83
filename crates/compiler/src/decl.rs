//! Syntax of the two declaration macros, parsed from their raw token bodies.

use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Ident, ItemMacro, Meta, Token, Visibility, braced};

pub(crate) const MAP_MACRO: &str = "event_map";
pub(crate) const NAMES_MACRO: &str = "event_names";

/// Body of one `event_map!` invocation.
pub(crate) struct MapGroup {
    pub(crate) bindings: Vec<MapBinding>,
}

/// `vis Name = { key => value, ... }`
pub(crate) struct MapBinding {
    pub(crate) name: Ident,
    /// Line of the first token of the binding.
    pub(crate) line: usize,
    pub(crate) entries: Vec<MapEntry>,
}

pub(crate) struct MapEntry {
    pub(crate) key: Expr,
    pub(crate) value: Expr,
}

impl Parse for MapGroup {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut bindings = Vec::new();
        while !input.is_empty() {
            bindings.push(input.parse()?);
            if input.is_empty() {
                break;
            }
            input.parse::<Token![;]>()?;
        }
        Ok(Self { bindings })
    }
}

impl Parse for MapBinding {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let vis: Visibility = input.parse()?;
        let name: Ident = input.parse()?;
        input.parse::<Token![=]>()?;

        let content;
        braced!(content in input);
        let entries = Punctuated::<MapEntry, Token![,]>::parse_terminated(&content)?;

        let first = match &vis {
            Visibility::Public(token) => token.span,
            Visibility::Restricted(restricted) => restricted.pub_token.span,
            Visibility::Inherited => name.span(),
        };

        Ok(Self { line: line_of(first), name, entries: entries.into_iter().collect() })
    }
}

impl Parse for MapEntry {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let key = input.parse()?;
        input.parse::<Token![=>]>()?;
        let value = input.parse()?;
        Ok(Self { key, value })
    }
}

/// Body of one `event_names!` invocation.
pub(crate) struct NameGroup {
    pub(crate) specs: Vec<NameSpec>,
}

/// `vis A, B = "a", "b";` or, inheriting the previous values, `vis A, B;`
pub(crate) struct NameSpec {
    pub(crate) names: Vec<Ident>,
    pub(crate) values: Option<Vec<Expr>>,
}

impl Parse for NameGroup {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut specs = Vec::new();
        while !input.is_empty() {
            input.parse::<Visibility>()?;
            let names = Punctuated::<Ident, Token![,]>::parse_separated_nonempty(input)?;
            let values = if input.peek(Token![=]) {
                input.parse::<Token![=]>()?;
                let values = Punctuated::<Expr, Token![,]>::parse_separated_nonempty(input)?;
                Some(values.into_iter().collect())
            } else {
                None
            };
            input.parse::<Token![;]>()?;
            specs.push(NameSpec { names: names.into_iter().collect(), values });
        }
        Ok(Self { specs })
    }
}

/// Whether `item` invokes the macro called `name`, through any path.
pub(crate) fn invokes(item: &ItemMacro, name: &str) -> bool {
    item.ident.is_none() && item.mac.path.segments.last().is_some_and(|s| s.ident == name)
}

/// Whether the item is compiled only for tests.
pub(crate) fn is_test_only(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && matches!(&attr.meta, Meta::List(list) if list.tokens.to_string() == "test")
    })
}

/// First line covered by a macro item, attributes included.
pub(crate) fn first_line(item: &ItemMacro) -> usize {
    item.attrs
        .iter()
        .map(|attr| line_of(attr.pound_token.spans[0]))
        .chain(item.mac.path.segments.first().map(|s| line_of(s.ident.span())))
        .chain(item.mac.path.leading_colon.map(|colon| line_of(colon.spans[0])))
        .min()
        .unwrap_or(1)
}

pub(crate) fn line_of(span: Span) -> usize {
    span.start().line
}
