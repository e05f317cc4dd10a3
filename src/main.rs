use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tally::calculator::{
    InputKind, classify_input, copy_to_clipboard, format_result, looks_like_expression,
};
use tally::{Config, HistoryLog, Session, calculate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally", version, about = "Keypad calculator with a shared history")]
struct Cli {
    /// Config file (default: <config dir>/tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a single expression and print the result
    Eval {
        expression: String,
    },
    /// Interactive calculator (default)
    Repl,
    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

const HELP: &str = "\
Type keys and press Enter. `=` evaluates, `<` erases, `C` clears.
Commands: history, clear, copy, export, help, quit";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command.unwrap_or(Command::Repl) {
        Command::Eval { expression } => {
            let config = Config::load(&config_path).context("Failed to load config")?;
            run_eval(&expression, &config)
        }
        Command::Repl => {
            let config = Config::load(&config_path).context("Failed to load config")?;
            run_repl(&config)
        }
        Command::Config { init } => {
            if init {
                Config::default()
                    .save(&config_path)
                    .context("Failed to write default config")?;
                info!(path = %config_path.display(), "wrote default config");
            }
            let config = Config::load(&config_path).context("Failed to load config")?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_eval(expression: &str, config: &Config) -> Result<()> {
    match calculate(expression, &config.display_options()) {
        Ok(calc) => {
            println!("{}", calc.display_result);
            Ok(())
        }
        Err(err) => anyhow::bail!("{}", err),
    }
}

fn run_repl(config: &Config) -> Result<()> {
    let history = Arc::new(HistoryLog::new());
    let mut session = Session::new(Arc::clone(&history), config.display_options());

    // The history view is refreshed from the event loop rather than from
    // inside the observer, like a second window would be.
    let history_updates = history.watch();
    let mut rendered_revision = history.revision();

    println!("{}", HELP);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print_prompt(&mut stdout, &session)?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }

        match classify_input(&line) {
            InputKind::Keys => {
                for outcome in session.feed(&line) {
                    match outcome {
                        Ok(calc) => println!("= {}", calc.display_result),
                        Err(err) => println!("Error: {}", err),
                    }
                }
                if !line.contains('=') && looks_like_expression(&line) {
                    println!("(press = to evaluate)");
                }
            }
            InputKind::Command(command) => match command.as_str() {
                "history" => print_history(&history),
                "clear" => history.clear(),
                "copy" => copy_last(&history, config),
                "export" => println!("{}", history.to_json()?),
                "help" => println!("{}", HELP),
                "quit" | "exit" => break,
                other => warn!(command = other, "unhandled command"),
            },
            InputKind::Unknown => {
                if !line.trim().is_empty() {
                    println!("Unknown input: {}", line.trim());
                }
            }
        }

        if history_updates.drain().count() > 0 && config.history.echo {
            let revision = history.revision();
            if revision != rendered_revision {
                print_history(&history);
                rendered_revision = revision;
            }
        }
    }

    Ok(())
}

fn print_prompt(stdout: &mut io::Stdout, session: &Session) -> Result<()> {
    let readout = session.readout();
    write!(stdout, "{}> ", readout.expression)?;
    stdout.flush()?;
    Ok(())
}

fn print_history(history: &HistoryLog) {
    let records = history.snapshot();
    if records.is_empty() {
        println!("-- history is empty --");
        return;
    }

    println!("-- history --");
    for record in &records {
        println!("{}", record);
    }
}

fn copy_last(history: &HistoryLog, config: &Config) {
    let Some(last) = history.snapshot().pop() else {
        println!("Nothing to copy");
        return;
    };

    let text = format_result(last.result(), &config.display_options().raw());
    match copy_to_clipboard(&text) {
        Ok(()) => println!("Copied {}", text),
        Err(err) => {
            warn!(error = %err, "clipboard copy failed");
            println!("{}", err);
        }
    }
}
