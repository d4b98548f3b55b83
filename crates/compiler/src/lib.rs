//! # Busgen compiler
//!
//! Scans a directory of Rust sources for one `event_map!` binding and turns it
//! into a typed event bus module.
//!
//! The pipeline runs in fixed stages over files parsed once:
//!
//! 1. string constants (`const`, `static`, `event_names!`) are collected;
//! 2. the single binding named by the [`Target`] is located;
//! 3. its entries become a [`Schema`] of event names and payload types;
//! 4. the schema is [validated](validate) and sorted by event name;
//! 5. [`emit`] renders the module text.
//!
//! ## Example
//!
//! ```rust
//! use busgen_compiler::{EmitOptions, SourceFile, SourceSet, Target};
//!
//! let sources = SourceSet::new(vec![SourceFile::new(
//!     "src/events.rs",
//!     r#"busgen::event_map! { pub OrderEvents = { "order.created" => OrderCreated {} }; }"#,
//! )]);
//! let target: Target = ".OrderEvents".parse().unwrap();
//!
//! let schema = busgen_compiler::compile(&sources, &target).unwrap();
//! assert_eq!(schema.prefix(), "Order");
//!
//! let module = busgen_compiler::emit(&schema, &target, &EmitOptions::default()).unwrap();
//! assert_eq!(module.file_name(), "orderbus.rs");
//! ```

mod constants;
mod decl;
mod emit;
mod error;
mod extract;
mod scanner;
mod schema;
mod source;
mod validate;

pub use crate::constants::ConstantTable;
pub use crate::emit::{DEFAULT_RUNTIME_PATH, EmitOptions, GeneratedModule};
pub use crate::error::{CompileError, ErrorKind};
pub use crate::extract::PREFIX_DIRECTIVE;
pub use crate::schema::{
    DEFAULT_BINDING, EventDef, SEPARATORS, Schema, Target, TargetParseError, derive_prefix,
    method_suffix, output_file_name, symbol, variant_ident,
};
pub use crate::source::{GENERATED_MARKER, SourceFile, SourceSet, module_dir};
pub use crate::validate::validate;

use tracing::{debug_span, info};

/// Builds the validated schema of `target` from already loaded sources.
pub fn compile(sources: &SourceSet, target: &Target) -> Result<Schema, CompileError> {
    let _span = debug_span!("compile", package = %target).entered();
    let wrap = |kind| CompileError::new(target.to_string(), kind);

    let parsed = sources.parse().map_err(wrap)?;
    let constants = ConstantTable::collect(&parsed).map_err(wrap)?;
    let declaration = scanner::find_declaration(&parsed, target.binding()).map_err(wrap)?;
    let schema = extract::extract(&declaration, &constants).map_err(wrap)?;
    let schema = validate(schema).map_err(wrap)?;

    info!(
        package = %target,
        prefix = schema.prefix(),
        events = schema.events().len(),
        constants = constants.len(),
        "Schema compiled"
    );
    Ok(schema)
}

/// Loads `target.dir()` from disk and compiles it.
pub fn compile_dir(target: &Target) -> Result<Schema, CompileError> {
    let sources = SourceSet::load_dir(target.dir())
        .map_err(|kind| CompileError::new(target.to_string(), kind))?;
    compile(&sources, target)
}

/// Renders the module for a schema compiled from `target`.
pub fn emit(
    schema: &Schema,
    target: &Target,
    options: &EmitOptions,
) -> Result<GeneratedModule, CompileError> {
    emit::emit(schema, options).map_err(|kind| CompileError::new(target.to_string(), kind))
}
