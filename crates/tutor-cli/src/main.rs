//! tutor - step-by-step math explanations in the terminal

mod config;
mod ui;

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tutor_ai::providers::google::GoogleProvider;
use tutor_core::{Block, ResponseMode, Tutor, TutorConfig, TutorHandle};

use crate::config::Config;

const SOLVING: &str = "Solving your equation...";

/// Exit status after SIGINT at an idle prompt
const INTERRUPTED_EXIT: i32 = 130;

/// tutor - a math tutor that explains every step
#[derive(Parser, Debug)]
#[command(name = "tutor")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Solve a single expression and exit (e.g. "2x + 5 = 15")
    #[arg(short, long)]
    expression: Option<String>,

    /// Model to use (default: gemini-2.0-flash-exp)
    #[arg(short, long)]
    model: Option<String>,

    /// Wait for the whole answer instead of streaming it
    #[arg(long)]
    single: bool,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Print the classified blocks as JSON (plain mode)
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// List known models
    #[arg(long)]
    list_models: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

impl Args {
    fn response_mode(&self, config: &Config) -> ResponseMode {
        if self.single || config.stream == Some(false) {
            ResponseMode::Single
        } else {
            ResponseMode::Stream
        }
    }

    fn use_tui(&self, config: &Config) -> bool {
        self.expression.is_none() && !self.no_tui && !self.json && config.tui.unwrap_or(true)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("tutor=debug")
            .with_writer(io::stderr)
            .init();
    }

    if args.init_config {
        match Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    if args.list_models {
        for model in tutor_ai::models::get_all_models() {
            println!("{:<24} {}", model.id, model.name);
        }
        return Ok(());
    }

    let config = Config::load();

    let model_id = args
        .model
        .clone()
        .or_else(|| config.model.clone())
        .unwrap_or_else(|| tutor_ai::models::DEFAULT_MODEL_ID.to_string());
    let model = tutor_ai::models::resolve_model(&model_id);

    let tutor_config = TutorConfig {
        model,
        mode: args.response_mode(&config),
        temperature: args.temperature.or(config.temperature),
    };

    // A missing key surfaces as a failed request, not a startup error
    let client = match GoogleProvider::with_optional_key(config.api_key.as_deref()) {
        Ok(provider) => provider,
        Err(e) if e.is_configuration() => {
            tracing::warn!(%e, "requests will fail");
            GoogleProvider::new("")
        }
        Err(e) => return Err(e.into()),
    };
    let client = Arc::new(client);

    let mut tutor = Tutor::new(tutor_config, client);

    if args.use_tui(&config) {
        return ui::run_tui(tutor).await;
    }

    let watcher = spawn_interrupt_watcher(tutor.handle());
    let result = match args.expression.as_deref() {
        Some(expression) => {
            if !solve_once(&mut tutor, expression, args.json).await {
                std::process::exit(1);
            }
            Ok(())
        }
        None => run_repl(&mut tutor, args.json).await,
    };
    watcher.abort();
    result
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Stop the request being solved and return to the prompt
    Abort,
    /// Nothing is running; leave the program
    Exit,
}

fn on_interrupt(handle: &TutorHandle) -> Interrupt {
    if handle.is_running() {
        handle.abort();
        Interrupt::Abort
    } else {
        Interrupt::Exit
    }
}

/// One SIGINT listener for the whole plain-mode session, covering Ctrl+C at
/// the prompt as well as during a request.
fn spawn_interrupt_watcher(handle: TutorHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if on_interrupt(&handle) == Interrupt::Exit {
                std::process::exit(INTERRUPTED_EXIT);
            }
            tracing::debug!("request interrupted");
        }
    })
}

/// Solve `expression` and print the result. Returns whether it succeeded.
async fn solve_once(tutor: &mut Tutor, expression: &str, json: bool) -> bool {
    if !json {
        eprintln!("{}", SOLVING);
    }
    let outcome = tutor.solve(expression).await;

    match outcome {
        Ok(_) => {
            let blocks = tutor.aggregator().blocks();
            if let Err(e) = print_blocks(&blocks, json) {
                eprintln!("Error writing output: {}", e);
                return false;
            }
            true
        }
        Err(e) => {
            eprintln!("⚠ {}", e);
            false
        }
    }
}

fn print_blocks(blocks: &[Block], json: bool) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, blocks)?;
        writeln!(stdout)?;
    } else {
        for block in blocks {
            writeln!(stdout, "{}", block.to_line())?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Read expressions from stdin, one per line
async fn run_repl(tutor: &mut Tutor, json: bool) -> anyhow::Result<()> {
    let interactive = !json;
    if interactive {
        println!("tutor - type an equation, empty line or Ctrl+D to quit");
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        if interactive {
            print!("> ");
            io::stdout().flush()?;
        }

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let expression = line.trim();
        if expression.is_empty() {
            break;
        }

        solve_once(tutor, expression, json).await;
        if interactive {
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tutor").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_expression_forces_plain_mode() {
        let config = Config::default();
        assert!(parse(&[]).use_tui(&config));
        assert!(!parse(&["-e", "2x+5=15"]).use_tui(&config));
        assert!(!parse(&["--no-tui"]).use_tui(&config));
        assert!(!parse(&["--json"]).use_tui(&config));
    }

    #[test]
    fn test_config_can_disable_tui() {
        let config = Config {
            tui: Some(false),
            ..Default::default()
        };
        assert!(!parse(&[]).use_tui(&config));
    }

    #[tokio::test]
    async fn test_interrupt_aborts_running_request_else_exits() {
        use async_trait::async_trait;
        use tutor_ai::{GenerationClient, GenerationEvent, GenerationEventStream, Request};

        /// Never yields, so the request stays in flight
        struct Silent;

        #[async_trait]
        impl GenerationClient for Silent {
            async fn stream(&self, _request: &Request) -> tutor_ai::Result<GenerationEventStream> {
                Ok(Box::pin(futures::stream::pending::<GenerationEvent>()))
            }
        }

        let mut tutor = Tutor::new(TutorConfig::default(), Arc::new(Silent));
        let handle = tutor.handle();
        assert_eq!(on_interrupt(&handle), Interrupt::Exit);

        let pending = tutor.begin("2x+5=15").unwrap();
        assert_eq!(on_interrupt(&handle), Interrupt::Abort);
        assert!(pending.cancel_token().is_cancelled());

        tutor.abort();
        assert_eq!(on_interrupt(&handle), Interrupt::Exit);
    }

    #[test]
    fn test_response_mode_precedence() {
        let streaming = Config::default();
        let single = Config {
            stream: Some(false),
            ..Default::default()
        };

        assert_eq!(parse(&[]).response_mode(&streaming), ResponseMode::Stream);
        assert_eq!(parse(&["--single"]).response_mode(&streaming), ResponseMode::Single);
        assert_eq!(parse(&[]).response_mode(&single), ResponseMode::Single);
    }
}
