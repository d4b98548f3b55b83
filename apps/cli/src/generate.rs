use crate::args::GenerateArgs;
use crate::config::CliConfig;
use crate::error::CliError;
use busgen_compiler::{EmitOptions, Target, compile_dir, emit, module_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// A `generate` run with flags and configuration merged.
#[derive(Debug, Clone)]
pub struct Plan {
    targets: Vec<Target>,
    output: Option<PathBuf>,
    options: EmitOptions,
    keep_going: bool,
    check: bool,
}

impl Plan {
    /// Merges CLI flags over the loaded configuration. Flags win.
    ///
    /// # Errors
    /// [`CliError::InvalidTarget`] for a malformed target spec and
    /// [`CliError::OutputConflict`] when `--output` meets several targets.
    pub fn resolve(args: GenerateArgs, config: CliConfig) -> Result<Self, CliError> {
        let specs = if args.packages.is_empty() { config.targets } else { args.packages };
        let targets = if specs.is_empty() {
            vec![Target::default()]
        } else {
            specs.iter().map(|spec| spec.parse()).collect::<Result<Vec<Target>, _>>()?
        };

        let output = args.output.or(config.output);
        if output.is_some() && targets.len() > 1 {
            return Err(CliError::OutputConflict { count: targets.len() });
        }

        Ok(Self {
            targets,
            output,
            options: EmitOptions::default()
                .with_runtime_path(args.runtime_path.unwrap_or(config.runtime_path)),
            keep_going: args.keep_going || config.keep_going,
            check: args.check,
        })
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

/// What happened to one target's output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    Unchanged(PathBuf),
    Stale(PathBuf),
}

/// Compiles and writes (or checks) every target in order.
///
/// # Errors
/// The first failure, unless the plan keeps going; then [`CliError::Failed`]
/// once all targets ran. [`CliError::Stale`] lists outdated files in check mode.
pub fn run(plan: &Plan) -> Result<Vec<Outcome>, CliError> {
    let mut outcomes = Vec::with_capacity(plan.targets.len());
    let mut failed = 0;

    for target in &plan.targets {
        match generate(target, plan) {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) if plan.keep_going => {
                error!(package = %target, error = %err, "Target failed");
                failed += 1;
            },
            Err(err) => return Err(err),
        }
    }

    if failed > 0 {
        return Err(CliError::Failed { failed, total: plan.targets.len() });
    }

    let stale: Vec<PathBuf> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Stale(path) => Some(path.clone()),
            _ => None,
        })
        .collect();
    if !stale.is_empty() {
        return Err(CliError::Stale { paths: stale });
    }

    Ok(outcomes)
}

fn generate(target: &Target, plan: &Plan) -> Result<Outcome, CliError> {
    debug!(dir = %target.dir().display(), binding = target.binding(), "Parsing event definitions");
    let schema = compile_dir(target)?;
    let module = emit(&schema, target, &plan.options)?;

    let path = plan
        .output
        .clone()
        .unwrap_or_else(|| module_dir(schema.source_path()).join(module.file_name()));
    let current = fs::read_to_string(&path).ok();
    let up_to_date = current.as_deref() == Some(module.source());

    if plan.check {
        return Ok(if up_to_date {
            debug!(output = %path.display(), "Generated code is up to date");
            Outcome::Unchanged(path)
        } else {
            error!(output = %path.display(), "Generated code is out of date");
            Outcome::Stale(path)
        });
    }

    if up_to_date {
        debug!(output = %path.display(), "Generated code is up to date");
        return Ok(Outcome::Unchanged(path));
    }

    write(&path, module.source())?;
    info!(
        output = %path.display(),
        prefix = schema.prefix(),
        events = schema.events().len(),
        "Generated event bus"
    );
    Ok(Outcome::Written(path))
}

fn write(path: &Path, source: &str) -> Result<(), CliError> {
    let wrap = |source| CliError::Write { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, source).map_err(wrap)
}
