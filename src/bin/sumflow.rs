//! CLI binary for sumflow.
//!
//! A thin shim over the library crate: one-shot mode feeds a file or
//! stdin through a [`Session`] and prints the summary; `--interactive`
//! drives the same session from a small command loop.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use sumflow::export::DEFAULT_EXPORT_FILENAME;
use sumflow::extract::{is_pdf_media_type, media_type_for_path};
use sumflow::{render_flowchart, Action, Pane, Session, SummaryConfig, SummaryOutput};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a text file
  sumflow notes.txt

  # Summarize from stdin
  cat notes.txt | sumflow -

  # Summarize a PDF and export the summary as PDF
  sumflow paper.pdf --export summary.pdf

  # Show the flowchart after the summary
  sumflow notes.txt --show-diagram

  # Structured JSON output
  sumflow notes.txt --json > summary.json

  # Pick a model and temperature
  sumflow notes.txt --model gemini-2.5-pro --temperature 0.4

  # Interactive session
  sumflow --interactive

RESPONSE SHAPE:
  The model is asked for a JSON object with exactly two fields:
    summary   bulleted summary of the input
    diagram   Mermaid-style flowchart derived from the summary
  A missing field is replaced by a fallback, never treated as an error.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       Google Gemini API key (required)
  SUMFLOW_MODEL        Override model ID
  SUMFLOW_TEMPERATURE  Override sampling temperature
  SUMFLOW_MAX_TOKENS   Override max output tokens
  SUMFLOW_PROMPT       Path to a custom prompt template

SETUP:
  1. Set API key:   export GEMINI_API_KEY=<your-key>
  2. Summarize:     sumflow notes.txt
"#;

/// Summarize text or PDFs into bullets plus a flowchart.
#[derive(Parser, Debug)]
#[command(
    name = "sumflow",
    version,
    about = "Summarize text and visualize it as a flowchart",
    long_about = "Summarize pasted text or a PDF with Gemini and visualize the summary as a \
Mermaid-style flowchart. Each summary is a single request with a declared JSON response \
shape; the summary text can be exported as a PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Text or PDF file to summarize, or `-` for stdin.
    #[arg(required_unless_present = "interactive")]
    input: Option<String>,

    /// Write the summary as a PDF to this file after summarizing.
    #[arg(short, long, env = "SUMFLOW_EXPORT")]
    export: Option<PathBuf>,

    /// Print the rendered flowchart after the summary.
    #[arg(long, env = "SUMFLOW_SHOW_DIAGRAM")]
    show_diagram: bool,

    /// Output the full result as JSON instead of text.
    #[arg(long, env = "SUMFLOW_JSON")]
    json: bool,

    /// Model ID (e.g. gemini-2.5-flash, gemini-2.5-pro).
    #[arg(long, env = "SUMFLOW_MODEL")]
    model: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "SUMFLOW_TEMPERATURE")]
    temperature: Option<f32>,

    /// Max output tokens for the summary request.
    #[arg(long, env = "SUMFLOW_MAX_TOKENS")]
    max_output_tokens: Option<usize>,

    /// Path to a custom prompt template (`{input}` marks the insert point).
    #[arg(long, env = "SUMFLOW_PROMPT")]
    prompt_file: Option<PathBuf>,

    /// Start an interactive session instead of one-shot mode.
    #[arg(short, long)]
    interactive: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "SUMFLOW_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SUMFLOW_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors and results.
    #[arg(short, long, env = "SUMFLOW_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active; the
    // spinner is the feedback that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config + session ───────────────────────────────────────────
    let config = build_config(&cli).await?;
    let mut session = Session::new(&config).context("Configuration error")?;

    if cli.interactive {
        return run_interactive(&mut session).await;
    }
    let input = cli.input.as_deref().context("missing input")?;

    let spinner = if show_progress { Some(make_spinner()) } else { None };

    // ── Feed the input in ────────────────────────────────────────────────
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        session.dispatch(Action::EditInput(text)).await;
    } else {
        let media_type = media_type_for_path(input);
        if is_pdf_media_type(&media_type) {
            if let Some(ref bar) = spinner {
                bar.set_message("Extracting text from PDF…");
            }
            let bytes = tokio::fs::read(input)
                .await
                .with_context(|| format!("Failed to read {input}"))?;
            session
                .dispatch(Action::LoadDocument { media_type, bytes })
                .await;
            if let Some(reason) = session.state().request.error_message() {
                if let Some(ref bar) = spinner {
                    bar.finish_and_clear();
                }
                anyhow::bail!("{reason}");
            }
        } else {
            let text = tokio::fs::read_to_string(input)
                .await
                .with_context(|| format!("Failed to read {input}"))?;
            session.dispatch(Action::EditInput(text)).await;
        }
    }

    // ── Summarize ────────────────────────────────────────────────────────
    if let Some(ref bar) = spinner {
        bar.set_message("Generating summary…");
    }
    session.dispatch(Action::Summarize).await;
    if let Some(ref bar) = spinner {
        bar.finish_and_clear();
    }

    if let Some(reason) = session.state().request.error_message() {
        anyhow::bail!("{reason}");
    }
    let result = session
        .state()
        .result
        .clone()
        .context("No summary was produced")?;

    // ── Print results ────────────────────────────────────────────────────
    if cli.json {
        let output = SummaryOutput {
            result: result.clone(),
            stats: session.last_stats().unwrap_or_default(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.summary.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure a trailing newline on stdout.
        if !result.summary.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        drop(handle);

        if cli.show_diagram {
            match render_flowchart(&result.diagram) {
                Ok(rendered) => {
                    println!("\n{}", bold("Diagram"));
                    print!("{rendered}");
                }
                Err(e) => eprintln!("{}", red(&e.to_string())),
            }
        }
    }

    // ── Export ───────────────────────────────────────────────────────────
    if let Some(ref path) = cli.export {
        if session.export_to_file(path) {
            if !cli.quiet {
                eprintln!(
                    "{} summary exported to {}",
                    green("✔"),
                    bold(&path.display().to_string())
                );
            }
        } else {
            let notice = session
                .view()
                .notice
                .clone()
                .unwrap_or_else(|| "Failed to generate PDF for download.".to_string());
            anyhow::bail!("{notice}");
        }
    }

    if !cli.quiet && !cli.json {
        if let Some(stats) = session.last_stats() {
            eprintln!(
                "   {} tokens in  /  {} tokens out  —  {}ms total",
                dim(&stats.prompt_tokens.to_string()),
                dim(&stats.completion_tokens.to_string()),
                stats.duration_ms,
            );
        }
    }

    Ok(())
}

fn make_spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Map CLI args to `SummaryConfig`.
async fn build_config(cli: &Cli) -> Result<SummaryConfig> {
    let mut config = SummaryConfig::from_env().context("Configuration error")?;

    if let Some(ref model) = cli.model {
        config.model = model.clone();
    }
    if let Some(t) = cli.temperature {
        config.temperature = t.clamp(0.0, 2.0);
    }
    if let Some(n) = cli.max_output_tokens {
        config.max_output_tokens = n;
    }
    if let Some(ref path) = cli.prompt_file {
        config.prompt_template = Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read prompt template from {:?}", path))?,
        );
    }

    Ok(config)
}

// ── Interactive session ──────────────────────────────────────────────────────

const REPL_HELP: &str = "\
Commands:
  input              enter text, finish with a line containing only `.`
  load <file.pdf>    load a PDF and extract its text
  summarize          summarize the current input
  view text|diagram  switch the result pane
  export [file]      write the summary as PDF (default summary.pdf)
  status             show the current screen
  help               this list
  quit               leave the session";

async fn run_interactive(session: &mut Session) -> Result<()> {
    println!("{}", bold("sumflow — interactive session"));
    println!("{}", dim("Type `help` for commands."));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        line.clear();
        if stdin.read_line(&mut line).context("Failed to read command")? == 0 {
            break; // EOF
        }
        let trimmed = line.trim().to_string();
        let (command, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (trimmed.as_str(), ""),
        };
        match command {
            "" => {}
            "help" => println!("{REPL_HELP}"),
            "quit" | "exit" => break,
            "input" => {
                println!(
                    "{}",
                    dim("Enter text; finish with a single `.` on its own line.")
                );
                let mut text = String::new();
                loop {
                    line.clear();
                    if stdin.read_line(&mut line)? == 0 {
                        break;
                    }
                    if line.trim_end() == "." {
                        break;
                    }
                    text.push_str(&line);
                }
                session
                    .dispatch(Action::EditInput(text.trim_end().to_string()))
                    .await;
                print!("{}", session.screen());
            }
            "load" => {
                if arg.is_empty() {
                    println!("{}", red("usage: load <file.pdf>"));
                    continue;
                }
                match std::fs::read(arg) {
                    Ok(bytes) => {
                        let media_type = media_type_for_path(arg);
                        session
                            .dispatch(Action::LoadDocument { media_type, bytes })
                            .await;
                        print!("{}", session.screen());
                    }
                    Err(e) => println!("{}", red(&format!("Failed to read {arg}: {e}"))),
                }
            }
            "summarize" => {
                session.dispatch(Action::Summarize).await;
                print!("{}", session.screen());
            }
            "view" => match arg.parse::<Pane>() {
                Ok(pane) => {
                    session.activate_pane(pane);
                    print!("{}", session.screen());
                }
                Err(e) => println!("{}", red(&e)),
            },
            "export" => {
                let path = if arg.is_empty() {
                    PathBuf::from(DEFAULT_EXPORT_FILENAME)
                } else {
                    PathBuf::from(arg)
                };
                if session.export_to_file(&path) {
                    println!(
                        "{} exported to {}",
                        green("✔"),
                        bold(&path.display().to_string())
                    );
                } else if let Some(notice) = &session.view().notice {
                    println!("{}", red(notice));
                } else {
                    println!("{}", red("Nothing to export yet."));
                }
            }
            "status" => {
                print!("{}", session.screen());
                if let Some(stats) = session.last_stats() {
                    println!(
                        "{}",
                        dim(&format!(
                            "tokens: {} in / {} out, {}ms",
                            stats.prompt_tokens, stats.completion_tokens, stats.duration_ms
                        ))
                    );
                }
            }
            other => println!("{}", red(&format!("unknown command `{other}` — try `help`"))),
        }
    }
    Ok(())
}
