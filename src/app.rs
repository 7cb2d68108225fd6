use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::fetcher::HttpSource;
use crate::render::{self, OutputFormat};
use crate::session::{LoadOutcome, Options, Session};
use crate::view::{Action, LoadRequest};

const COMMANDS_HELP: &str = "\
commands:
  n, next          next page
  p, prev          previous page
  i <N>            type a page number
  <enter>          go to the typed page
  g <N>            type and go to page N
  /                open or close the search bar
  /<TERM>, s <TERM> search the current page by name
  clear            clear the search term
  r                redraw
  h, help          show this help
  q, quit          exit";

fn print_banner() {
    const BANNER: &str = r#"
                 __            __
    ____  ____  / /_____  ____/ /__  _  __
   / __ \/ __ \/ //_/ _ \/ __  / _ \| |/_/
  / /_/ / /_/ / ,< /  __/ /_/ /  __/>  <
 / .___/\____/_/|_|\___/\__,_/\___/_/|_|
/_/
       creature catalog browser
    "#;
    print!("{}", BANNER.bold().red());
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    workers: usize,
    verbose: u8,
    no_color: bool,
    search: Option<String>,
    once: bool,
    output: Option<String>,
    output_format: Option<OutputFormat>,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let defaults = Options::default();
    let base_url = args
        .base_url
        .or(cfg.base_url)
        .map(|u| u.trim().to_string())
        .unwrap_or(defaults.base_url);
    reqwest::Url::parse(&base_url).map_err(|e| format!("invalid base URL '{base_url}': {e}"))?;

    let total_records = args
        .total_records
        .or(cfg.total_records)
        .unwrap_or(defaults.total_records);
    let page_size = args.page_size.or(cfg.page_size).unwrap_or(defaults.page_size);
    if total_records == 0 || page_size == 0 {
        return Err("total_records and page_size must be positive".to_string());
    }
    let start_page = args.page.or(cfg.start_page).unwrap_or(defaults.start_page);
    let last_page = total_records.div_ceil(page_size);
    if start_page == 0 || start_page > last_page {
        return Err(format!(
            "invalid start page {start_page}, expected 1..={last_page}"
        ));
    }

    let timeout_seconds = args
        .timeout
        .or(cfg.timeout)
        .unwrap_or(defaults.timeout_seconds);
    let rate = args.rate.or(cfg.rate).unwrap_or(defaults.rate);
    let proxy = args
        .proxy
        .or(cfg.proxy)
        .filter(|p| !p.trim().is_empty());

    let workers = args.workers.or(cfg.workers).unwrap_or(4);
    if workers == 0 {
        return Err("invalid workers, expected positive integer".to_string());
    }

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    if output.is_some() && !args.once {
        return Err("output requires --once (set in the config file or with -o)".to_string());
    }
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => Some(
            OutputFormat::parse(&raw)
                .ok_or_else(|| format!("invalid output format '{raw}', expected text or json"))?,
        ),
        None => None,
    };

    Ok(RunConfig {
        options: Options {
            base_url,
            total_records,
            page_size,
            start_page,
            timeout_seconds,
            rate,
            proxy,
        },
        workers,
        verbose: args.verbose,
        no_color: args.no_color || cfg.no_color.unwrap_or(false),
        search: args.search.filter(|s| !s.is_empty()),
        once: args.once,
        output,
        output_format,
    })
}

/// One line of interactive input.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Dispatch(Vec<Action>),
    Search(String),
    Redraw,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Dispatch(vec![Action::CommitInput]));
    }
    if line == "/" {
        return Ok(Command::Dispatch(vec![Action::ToggleSearch]));
    }
    if let Some(term) = line.strip_prefix('/') {
        return Ok(Command::Search(term.to_string()));
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head.to_lowercase().as_str() {
        "n" | "next" => Ok(Command::Dispatch(vec![Action::Next])),
        "p" | "prev" | "previous" => Ok(Command::Dispatch(vec![Action::Previous])),
        "i" | "input" if !rest.is_empty() => {
            Ok(Command::Dispatch(vec![Action::InputText(rest.to_string())]))
        }
        "g" | "goto" if !rest.is_empty() => Ok(Command::Dispatch(vec![
            Action::InputText(rest.to_string()),
            Action::CommitInput,
        ])),
        "s" | "search" => Ok(Command::Search(rest.to_string())),
        "clear" => Ok(Command::Search(String::new())),
        "r" | "redraw" => Ok(Command::Redraw),
        "h" | "help" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        _ => Err(format!("unknown command '{line}', type h for help")),
    }
}

fn search_actions(search_open: bool, term: String) -> Vec<Action> {
    let mut actions = Vec::with_capacity(2);
    if !search_open {
        actions.push(Action::ToggleSearch);
    }
    actions.push(Action::SetSearch(term));
    actions
}

fn loading_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("fetching records...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn spawn_load(
    session: &Session<HttpSource>,
    request: LoadRequest,
    tx: &mpsc::UnboundedSender<LoadOutcome>,
) {
    let task = session.load_task(request);
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = task.await;
        let _ = tx.send(outcome);
    });
}

fn redraw(session: &Session<HttpSource>) {
    print!("{}", render::render_view(session.state(), session.layout()));
}

fn print_summary(run: &RunConfig) {
    let layout_pages = run.options.total_records.div_ceil(run.options.page_size);
    format_kv_line("API", &run.options.base_url);
    format_kv_line(
        "Catalog",
        &format!(
            "records={} page_size={} pages={} start={}",
            run.options.total_records, run.options.page_size, layout_pages, run.options.start_page
        ),
    );
    format_kv_line(
        "HTTP",
        &format!(
            "rate={} timeout={}s proxy={} workers={}",
            if run.options.rate == 0 {
                "off".to_string()
            } else {
                run.options.rate.to_string()
            },
            run.options.timeout_seconds,
            if run.options.proxy.is_some() {
                "on"
            } else {
                "off"
            },
            run.workers
        ),
    );
    println!();
}

async fn write_output(
    path: &str,
    format: Option<OutputFormat>,
    session: &Session<HttpSource>,
) -> Result<(), String> {
    let format = format
        .or_else(|| render::infer_format_from_path(path))
        .unwrap_or(OutputFormat::Text);
    let rendered = render::render(format, &session.state().filtered);

    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|e| format!("failed to write output file: {e}"))?;
    Ok(())
}

async fn run_once(run: RunConfig) -> Result<(), String> {
    let mut session =
        Session::new(run.options.clone()).map_err(|e| format!("failed to start: {e}"))?;
    session.start().await;
    if let Some(term) = run.search.clone() {
        for action in search_actions(session.state().search_open, term) {
            session.apply(action).await;
        }
    }
    redraw(&session);

    if let Some(path) = run.output.as_deref() {
        write_output(path, run.output_format, &session).await?;
        format_kv_line("Output", path);
    }
    Ok(())
}

async fn run_interactive(run: RunConfig) -> Result<(), String> {
    let mut session =
        Session::new(run.options.clone()).map_err(|e| format!("failed to start: {e}"))?;
    let (tx, mut rx) = mpsc::unbounded_channel::<LoadOutcome>();

    let request = session.begin();
    spawn_load(&session, request, &tx);
    if let Some(term) = run.search.clone() {
        for action in search_actions(session.state().search_open, term) {
            session.dispatch(action);
        }
    }

    println!("{}", COMMANDS_HELP.dimmed());
    println!();
    let mut spinner = Some(loading_spinner());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => return Err(format!("failed to read input: {e}")),
                };
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e.yellow());
                        continue;
                    }
                };
                let actions = match command {
                    Command::Quit => break,
                    Command::Help => {
                        println!("{}", COMMANDS_HELP);
                        continue;
                    }
                    Command::Redraw => {
                        redraw(&session);
                        continue;
                    }
                    Command::Search(term) => search_actions(session.state().search_open, term),
                    Command::Dispatch(actions) => actions,
                };
                for action in actions {
                    if let Some(request) = session.dispatch(action) {
                        spawn_load(&session, request, &tx);
                    }
                }
                if !session.state().loading {
                    redraw(&session);
                } else if spinner.is_none() {
                    spinner = Some(loading_spinner());
                }
            }
            Some(outcome) = rx.recv() => {
                session.complete(outcome);
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                redraw(&session);
            }
        }
    }

    if let Some(pb) = spinner.take() {
        pb.finish_and_clear();
    }
    Ok(())
}

fn init_logging(verbose: u8) -> Result<(), String> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| crate::utils::verbosity_filter(verbose).into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        let path = match args.config.as_deref() {
            Some(p) => config::expand_tilde(p),
            None => config::default_config_path()
                .ok_or_else(|| "could not determine home directory".to_string())?,
        };
        if config::ensure_default_config_file(&path)? {
            println!("wrote default config to {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(p) => config::load_config(&config::expand_tilde(p), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_logging(run.verbose)?;
    if run.no_color {
        colored::control::set_override(false);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    if run.once {
        rt.block_on(run_once(run))
    } else {
        print_banner();
        print_summary(&run);
        rt.block_on(run_interactive(run))
    }
}
