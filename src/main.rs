//! The external surface (spec §6): a one-argument CLI. The argument is
//! either a path to a source file or the source program itself; the two are
//! disambiguated by trying to open it as a file first and falling back to
//! treating it as inline text, silently, exactly as the reader-abstraction
//! contract requires.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use oliver::config::EvalConfig;
use oliver::error::OliverError;
use oliver::value::Value;

/// Oliver: a small dynamically typed expression language.
#[derive(Parser, Debug)]
#[command(name = "oliver")]
#[command(version = oliver::config::VERSION)]
#[command(about = "Runs an Oliver program: lex, compile, evaluate")]
struct Cli {
    /// A path to a source file, or the source program itself.
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Evaluator value-stack / code-stack / return-stack capacity.
    #[arg(long = "stack-limit", value_name = "N", default_value_t = EvalConfig::default().stack_limit)]
    stack_limit: usize,
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let source = read_source(&cli.source);

    let config = EvalConfig { stack_limit: cli.stack_limit, ..EvalConfig::default() };
    let stack = oliver::run(&source, config);

    if let Err(err) = print_stack(&stack) {
        eprintln!("oliver: {err}");
        std::process::exit(1);
    }
}

/// `OLIVER_LOG` selects the `tracing` filter for the lexer/compiler/
/// evaluator's diagnostic spans (`trace!`/`debug!`); this is independent of
/// the language's own `EMIT`/`ENDL` I/O, which always goes straight to
/// stdout. Defaults to `warn` so a plain run stays quiet.
fn init_logging() {
    let filter = EnvFilter::try_from_env("OLIVER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// The reader-abstraction contract (§6): if the argument opens as a file,
/// read it; otherwise treat the argument itself as the program text. A
/// failed file read is not surfaced to the user — it's the signal to fall
/// back to inline-source treatment.
fn read_source(arg: &str) -> String {
    let path = PathBuf::from(arg);
    match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => arg.to_string(),
    }
}

/// Prints whatever values remain on the value stack after the run, one per
/// line, and flushes stdout. A flush failure is the one case
/// `OliverError::Output` exists for — everything about malformed *language*
/// input already became an `Error` value inside `stack` itself and does not
/// reach this function as a Rust-level error.
fn print_stack(stack: &[Value]) -> Result<(), OliverError> {
    let mut stdout = std::io::stdout();
    for value in stack {
        writeln!(stdout, "{value}").map_err(OliverError::Output)?;
    }
    stdout.flush().map_err(OliverError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_source_falls_back_to_inline_text_for_a_nonexistent_path() {
        assert_eq!(read_source("( 1 + 2 )"), "( 1 + 2 )");
    }

    #[test]
    fn read_source_reads_an_existing_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("oliver-main-test-{}.olv", std::process::id()));
        std::fs::write(&path, "( 2 + 2 )").unwrap();
        let text = read_source(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        assert_eq!(text, "( 2 + 2 )");
    }
}
