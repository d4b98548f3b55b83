use crate::error::ErrorKind;
use crate::schema::{self, EventDef, Schema};
use crate::source::GENERATED_MARKER;
use std::fmt::{self, Write as FmtWrite};
use tracing::debug;

/// Path through which emitted modules reach the runtime crate.
pub const DEFAULT_RUNTIME_PATH: &str = "::busgen";

/// Knobs for rendering a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    runtime_path: String,
}

impl EmitOptions {
    /// Uses `path` (e.g. `::busgen` or `crate::runtime`) to reach the runtime.
    #[must_use]
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.runtime_path = path.trim().trim_end_matches("::").to_owned();
        self
    }

    #[must_use]
    pub fn runtime_path(&self) -> &str {
        &self.runtime_path
    }
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { runtime_path: DEFAULT_RUNTIME_PATH.to_owned() }
    }
}

/// Rendered source of one bus module and the file name it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    file_name: String,
    source: String,
}

impl GeneratedModule {
    /// `eventbus.rs` for an empty prefix, `<prefix>bus.rs` otherwise.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn into_source(self) -> String {
        self.source
    }
}

/// Renders a validated schema. Identical input gives byte-identical output.
///
/// The rendered text is parsed back before it is returned, so a module that would
/// not compile (an unchecked schema, a malformed runtime path) is never handed out.
pub fn emit(schema: &Schema, options: &EmitOptions) -> Result<GeneratedModule, ErrorKind> {
    let source =
        render(schema, options).map_err(|e| ErrorKind::Render { message: e.to_string() })?;
    syn::parse_file(&source).map_err(|e| ErrorKind::Render {
        message: format!("emitted module does not parse: {e}"),
    })?;
    let file_name = schema::output_file_name(schema.prefix());
    debug!(file = %file_name, bytes = source.len(), "Module rendered");
    Ok(GeneratedModule { file_name, source })
}

/// Per-event names used throughout the module.
struct Row<'a> {
    name: &'a str,
    variant: String,
    method: String,
    payload: String,
}

impl<'a> Row<'a> {
    fn new(event: &'a EventDef) -> Self {
        Self {
            name: event.name(),
            variant: schema::variant_ident(&event.symbol()),
            method: schema::method_suffix(event.name()),
            payload: format!("super::{}", event.payload().replace('.', "::")),
        }
    }
}

struct Names<'a> {
    binding: &'a str,
    event: String,
    payload: String,
    bus: String,
    rt: &'a str,
}

fn render(schema: &Schema, options: &EmitOptions) -> Result<String, fmt::Error> {
    let prefix = schema.prefix();
    let names = Names {
        binding: schema.binding(),
        event: format!("{prefix}Event"),
        payload: format!("{prefix}Payload"),
        bus: format!("{prefix}Bus"),
        rt: options.runtime_path(),
    };
    let rows: Vec<Row<'_>> = schema.events().iter().map(Row::new).collect();

    let mut w = String::new();
    writeln!(w, "// {GENERATED_MARKER}. DO NOT EDIT.")?;
    writeln!(w, "// Source: `{}` in module `{}`.", schema.binding(), schema.source_module())?;
    writeln!(w)?;

    render_event(&mut w, &names, &rows)?;
    render_payload(&mut w, &names, &rows)?;
    render_bus(&mut w, &names, &rows)?;

    Ok(w)
}

fn render_event(w: &mut String, n: &Names<'_>, rows: &[Row<'_>]) -> fmt::Result {
    let Names { binding, event, rt, .. } = n;

    writeln!(w, "/// Events declared by `{binding}`, ordered by name.")?;
    writeln!(w, "#[allow(non_camel_case_types)]")?;
    writeln!(w, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]")?;
    writeln!(w, "pub enum {event} {{")?;
    for row in rows {
        writeln!(w, "    /// `{}`", row.name)?;
        writeln!(w, "    {},", row.variant)?;
    }
    writeln!(w, "}}\n")?;

    writeln!(w, "impl {event} {{")?;
    writeln!(w, "    /// Every event, ordered by name.")?;
    writeln!(w, "    pub const ALL: [Self; {}] = [", rows.len())?;
    for row in rows {
        writeln!(w, "        Self::{},", row.variant)?;
    }
    writeln!(w, "    ];\n")?;
    writeln!(w, "    /// Wire-level name of the event.")?;
    writeln!(w, "    #[must_use]")?;
    writeln!(w, "    pub const fn as_str(self) -> &'static str {{")?;
    writeln!(w, "        match self {{")?;
    for row in rows {
        writeln!(w, "            Self::{} => {:?},", row.variant, row.name)?;
    }
    writeln!(w, "        }}")?;
    writeln!(w, "    }}")?;
    writeln!(w, "}}\n")?;

    writeln!(w, "impl ::std::fmt::Display for {event} {{")?;
    writeln!(w, "    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {{")?;
    writeln!(w, "        f.write_str(self.as_str())")?;
    writeln!(w, "    }}")?;
    writeln!(w, "}}\n")?;

    writeln!(w, "impl ::std::convert::AsRef<str> for {event} {{")?;
    writeln!(w, "    fn as_ref(&self) -> &str {{")?;
    writeln!(w, "        self.as_str()")?;
    writeln!(w, "    }}")?;
    writeln!(w, "}}\n")?;

    writeln!(w, "impl ::std::str::FromStr for {event} {{")?;
    writeln!(w, "    type Err = {rt}::UnknownEvent;\n")?;
    writeln!(w, "    fn from_str(name: &str) -> ::std::result::Result<Self, Self::Err> {{")?;
    writeln!(w, "        match name {{")?;
    for row in rows {
        writeln!(w, "            {:?} => ::std::result::Result::Ok(Self::{}),", row.name, row.variant)?;
    }
    writeln!(w, "            _ => ::std::result::Result::Err({rt}::UnknownEvent::new(name)),")?;
    writeln!(w, "        }}")?;
    writeln!(w, "    }}")?;
    writeln!(w, "}}\n")
}

fn render_payload(w: &mut String, n: &Names<'_>, rows: &[Row<'_>]) -> fmt::Result {
    let Names { binding, event, payload, rt, .. } = n;

    writeln!(w, "/// A payload of `{binding}`, tagged with its event.")?;
    writeln!(w, "#[allow(non_camel_case_types)]")?;
    writeln!(w, "pub enum {payload} {{")?;
    for row in rows {
        writeln!(w, "    /// `{}`", row.name)?;
        writeln!(w, "    {}({}),", row.variant, row.payload)?;
    }
    writeln!(w, "}}\n")?;

    writeln!(w, "impl {rt}::Message for {payload} {{")?;
    writeln!(w, "    type Event = {event};\n")?;
    writeln!(w, "    fn event(&self) -> {event} {{")?;
    writeln!(w, "        match self {{")?;
    for row in rows {
        writeln!(w, "            Self::{}(_) => {event}::{},", row.variant, row.variant)?;
    }
    writeln!(w, "        }}")?;
    writeln!(w, "    }}")?;
    writeln!(w, "}}\n")?;

    writeln!(w, "impl ::std::fmt::Debug for {payload} {{")?;
    writeln!(w, "    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {{")?;
    writeln!(w, "        f.debug_tuple({payload:?})")?;
    writeln!(w, "            .field(&{rt}::Message::event(self))")?;
    writeln!(w, "            .finish_non_exhaustive()")?;
    writeln!(w, "    }}")?;
    writeln!(w, "}}\n")
}

fn render_bus(w: &mut String, n: &Names<'_>, rows: &[Row<'_>]) -> fmt::Result {
    let Names { binding, event, payload, bus, rt } = n;
    let bound = "+ ::std::marker::Send + ::std::marker::Sync + 'static";

    writeln!(w, "/// Typed bus for the events declared by `{binding}`.")?;
    writeln!(w, "#[derive(Debug, Clone)]")?;
    writeln!(w, "pub struct {bus} {{")?;
    writeln!(w, "    inner: {rt}::Bus<{payload}>,")?;
    writeln!(w, "}}\n")?;

    writeln!(w, "#[allow(dead_code, irrefutable_let_patterns, non_snake_case)]")?;
    writeln!(w, "impl {bus} {{")?;
    writeln!(w, "    /// Creates a bus whose queue holds at most `capacity` undelivered messages.")?;
    writeln!(w, "    pub fn new(capacity: usize) -> ::std::result::Result<Self, {rt}::BusError> {{")?;
    writeln!(w, "        ::std::result::Result::Ok(Self {{ inner: {rt}::Bus::new(capacity)? }})")?;
    writeln!(w, "    }}\n")?;

    writeln!(w, "    /// Publishes a tagged payload without blocking; dropped if the queue is full.")?;
    writeln!(w, "    pub fn publish(&self, payload: {payload}) {{")?;
    writeln!(w, "        self.inner.publish(payload);")?;
    writeln!(w, "    }}\n")?;

    writeln!(w, "    /// Subscribes to every payload of `event`.")?;
    writeln!(w, "    pub fn subscribe<F>(&self, event: {event}, handler: F)")?;
    writeln!(w, "    where")?;
    writeln!(w, "        F: ::std::ops::Fn(&{payload}) {bound},")?;
    writeln!(w, "    {{")?;
    writeln!(w, "        self.inner.subscribe(event, handler);")?;
    writeln!(w, "    }}\n")?;

    for row in rows {
        let Row { name, variant, method, payload: ty } = row;

        writeln!(w, "    /// Publishes `{name}`.")?;
        writeln!(w, "    pub fn publish_{method}(&self, payload: {ty}) {{")?;
        writeln!(w, "        self.inner.publish({payload}::{variant}(payload));")?;
        writeln!(w, "    }}\n")?;

        writeln!(w, "    /// Subscribes to `{name}`.")?;
        writeln!(w, "    pub fn subscribe_{method}<F>(&self, handler: F)")?;
        writeln!(w, "    where")?;
        writeln!(w, "        F: ::std::ops::Fn(&{ty}) {bound},")?;
        writeln!(w, "    {{")?;
        writeln!(w, "        self.inner.subscribe({event}::{variant}, move |payload| {{")?;
        writeln!(w, "            if let {payload}::{variant}(payload) = payload {{")?;
        writeln!(w, "                handler(payload);")?;
        writeln!(w, "            }}")?;
        writeln!(w, "        }});")?;
        writeln!(w, "    }}\n")?;
    }

    let hooks = [
        ("on_publish", format!("{event}, &{payload}"), "after a payload was queued"),
        ("on_drop", format!("{event}, &{payload}"), "when a payload was dropped"),
        ("on_subscribe", event.clone(), "after a handler was registered"),
        (
            "on_panic",
            format!("{event}, &{payload}, &(dyn ::std::any::Any + ::std::marker::Send)"),
            "when a handler panicked",
        ),
    ];
    for (hook, args, when) in hooks {
        writeln!(w, "    /// Called {when}.")?;
        writeln!(w, "    pub fn {hook}<F>(&self, hook: F)")?;
        writeln!(w, "    where")?;
        writeln!(w, "        F: ::std::ops::Fn({args}) {bound},")?;
        writeln!(w, "    {{")?;
        writeln!(w, "        self.inner.{hook}(hook);")?;
        writeln!(w, "    }}\n")?;
    }

    writeln!(w, "    /// Dispatches queued payloads until `shutdown` completes.")?;
    writeln!(w, "    pub async fn run<S>(&self, shutdown: S) -> ::std::result::Result<(), {rt}::BusError>")?;
    writeln!(w, "    where")?;
    writeln!(w, "        S: ::std::future::Future<Output = ()>,")?;
    writeln!(w, "    {{")?;
    writeln!(w, "        self.inner.run(shutdown).await")?;
    writeln!(w, "    }}\n")?;

    for (method, ty, doc) in [
        ("capacity", "usize", "Maximum number of undelivered payloads."),
        ("len", "usize", "Number of payloads waiting in the queue."),
        ("is_empty", "bool", "Whether no payload is waiting in the queue."),
    ] {
        writeln!(w, "    /// {doc}")?;
        writeln!(w, "    #[must_use]")?;
        writeln!(w, "    pub fn {method}(&self) -> {ty} {{")?;
        writeln!(w, "        self.inner.{method}()")?;
        writeln!(w, "    }}")?;
        if method != "is_empty" {
            writeln!(w)?;
        }
    }
    writeln!(w, "}}")
}
