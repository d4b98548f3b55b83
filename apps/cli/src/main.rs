use busgen_cli::args::Cli;
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::process::ExitCode;

const RED: &str = "\x1b[38;2;215;95;107m";
const GRAY: &str = "\x1b[38;2;163;163;163m";
const RESET: &str = "\x1b[0m";

fn main() -> ExitCode {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    match busgen_cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, color);
            ExitCode::FAILURE
        },
    }
}

/// Prints `err` and its causes inside a frame on stderr.
fn report(err: &anyhow::Error, color: bool) {
    let (red, gray, reset) = if color { (RED, GRAY, RESET) } else { ("", "", "") };
    let mut stderr = std::io::stderr().lock();

    let _ = writeln!(stderr, "\n{red}╭ Error{reset}");
    for cause in err.chain() {
        let _ = writeln!(stderr, "{red}│{reset} {gray}{cause}{reset}");
    }
    let _ = writeln!(stderr, "{red}╵{reset}");
}
