//! commandkit - dispatch command lines against a TOML command manifest.

use std::io::{self, BufRead};
use std::sync::Arc;

use commandkit::cli::Cli;
use commandkit::config::{CommandConfig, Config};
use commandkit::dispatch::{
    BoundArguments, Caller, CommandHandler, Dispatcher, Outcome, TokenStream,
};
use commandkit::error::{DispatchError, Result};
use commandkit::logging;
use serde_json::json;
use tracing::{error, info, warn};

fn main() {
    let cli = Cli::parse_args();

    match cli.log_path() {
        Some(path) => logging::init_file_logging(&path),
        None => logging::init_stderr_logging(),
    }

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            std::process::exit(1);
        }
    }
}

/// Runs the requested dispatch and returns the process exit status.
fn run(cli: &Cli) -> Result<i32> {
    let manifest_path = cli.manifest_path();
    info!("Loading manifest from: {}", manifest_path.display());
    let config = Config::load_from_file(&manifest_path)?;

    if config.commands.is_empty() {
        warn!("No commands declared in {}", manifest_path.display());
    }

    let json = cli.json;
    let sentinel = config.caller.sentinel.as_str();
    let dispatcher = config.build_dispatcher(|command| echo_handler(command, sentinel, json))?;

    if cli.list {
        for executable in dispatcher.registry().commands() {
            if executable.description().is_empty() {
                println!("{}", executable.usage());
            } else {
                println!("{:<40} {}", executable.usage(), executable.description());
            }
        }
        return Ok(0);
    }

    let caller = config.caller_for(cli.caller_name(&config));
    info!(
        "Dispatching as {} caller '{}'",
        caller.kind(),
        caller.display_name(sentinel)
    );

    if cli.has_inline_command() {
        let tokens = TokenStream::new(cli.tokens.iter().cloned());
        let outcome = dispatcher.dispatch(&mut tokens.clone(), &caller);
        report(&dispatcher, &cli.tokens.join(" "), tokens, outcome, json);
        return Ok(outcome.exit_code());
    }

    let mut exit_code = 0;
    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| DispatchError::internal(format!("Failed to read stdin: {e}")))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens = TokenStream::from_line(line);
        let outcome = dispatcher.dispatch(&mut tokens.clone(), &caller);
        report(&dispatcher, line, tokens, outcome, json);
        if !outcome.is_success() {
            exit_code = outcome.exit_code();
        }
    }
    Ok(exit_code)
}

/// Handler that prints the command name and its bound arguments.
fn echo_handler(command: &CommandConfig, sentinel: &str, json: bool) -> Arc<dyn CommandHandler> {
    let name = command.name.clone();
    let sentinel = sentinel.to_string();
    Arc::new(move |caller: &Caller, arguments: &BoundArguments| {
        if json {
            let event = json!({
                "command": name,
                "caller": caller.display_name(&sentinel),
                "arguments": arguments.to_json(),
            });
            println!("{event}");
        } else {
            let rendered: Vec<String> = arguments
                .iter()
                .map(|(param, value)| format!("{param}={value}"))
                .collect();
            if rendered.is_empty() {
                println!("{name}");
            } else {
                println!("{name}: {}", rendered.join(" "));
            }
        }
        Outcome::Success
    })
}

/// Prints the outcome of one dispatched line. `tokens` are the tokens that
/// were dispatched, used to look up the usage line.
fn report(dispatcher: &Dispatcher, line: &str, mut tokens: TokenStream, outcome: Outcome, json: bool) {
    if json {
        let event = json!({
            "line": line,
            "outcome": outcome,
            "message": outcome.message(),
            "exit_code": outcome.exit_code(),
        });
        println!("{event}");
        return;
    }

    if outcome.is_success() {
        return;
    }

    eprintln!("{line}: {outcome}");
    if matches!(
        outcome,
        Outcome::InvalidUsage | Outcome::MalformedArgument | Outcome::OutOfBounds
    ) {
        if let Some(executable) = dispatcher.registry().resolve(&mut tokens) {
            eprintln!("Usage: {}", executable.usage());
        }
    }
}
