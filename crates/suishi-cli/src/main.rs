mod config;
mod insight;
mod server;
mod svg;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::service::ServerInitializeError;
use rmcp::{ServiceExt, transport::stdio};
use suishi_core::{
    CalendarDate, Clock, FixedClock, InsightState, InteractionState, RingLayout, SystemClock,
    Term, TermPanel, TermTable, clock_face, format_anchor, layout, next_term,
    resolve_current_term,
};

use crate::config::Config;
use crate::insight::{HttpInsightSource, fetch_insight};

#[derive(Parser)]
#[command(name = "suishi", about = "Radial solar-term calendar and MCP server")]
struct Cli {
    /// Config file (default: $SUISHI_CONFIG, then $SUISHI_HOME/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<CalendarDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Show the solar term in effect today
    Now,

    /// List all terms
    Terms {
        /// Calendar order (January first) instead of table order
        #[arg(long)]
        chronological: bool,
    },

    /// Show the detail panel for one term
    Term {
        /// Term id (1-24), name or pinyin
        term: String,

        /// Also generate a poem, advice and seasonal food
        #[arg(long)]
        insight: bool,
    },

    /// Print the ring layout as JSON
    Layout {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Render the ring as SVG
    Svg {
        #[command(flatten)]
        view: ViewArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the hub clock once per second
    Clock {
        /// Stop after this many ticks (runs until Ctrl-C otherwise)
        #[arg(long)]
        ticks: Option<u64>,
    },
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Month (1-12) under the pointer
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    hover: Option<u32>,

    /// Selected term id or name (default: the current term)
    #[arg(long)]
    select: Option<String>,
}

fn parse_date(s: &str) -> std::result::Result<CalendarDate, String> {
    CalendarDate::parse(s).ok_or_else(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

/// Config, term table and clock shared by every command.
struct App {
    config: Config,
    table: TermTable,
    clock: Arc<dyn Clock>,
}

impl App {
    fn load(cli: &Cli) -> Result<Self> {
        let (config, path) = Config::load(cli.config.as_deref())?;
        if let Some(path) = &path {
            tracing::debug!("config: {}", path.display());
        }
        let table = config.load_table()?;
        let clock: Arc<dyn Clock> = match cli.today {
            Some(date) => Arc::new(FixedClock::on(date)),
            None => Arc::new(SystemClock::new(config.utc_offset_minutes)),
        };
        Ok(Self {
            config,
            table,
            clock,
        })
    }

    fn current_term(&self) -> &Term {
        resolve_current_term(self.clock.today().month_day(), &self.table)
    }

    fn find_term(&self, key: &str) -> Result<&Term> {
        self.table
            .lookup(key)
            .with_context(|| format!("unknown term: {key}"))
    }

    fn ring(&self, view: &ViewArgs) -> Result<RingLayout> {
        let today = self.clock.today().month_day();
        let current = self.current_term().id;
        let mut state = InteractionState::new(current);
        if let Some(key) = &view.select {
            state.on_select_term(self.find_term(key)?);
        }
        if let Some(month) = view.hover {
            state.on_hover_enter((month - 1) as usize);
        }
        let params = state.layout_params(&self.table, current, today);
        tracing::debug!("focus month {}", params.focus_month + 1);
        Ok(layout(&self.table, &params, &self.config.geometry))
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let app = App::load(&cli)?;

    match &cli.command {
        Commands::Serve => cmd_serve(app).await,
        Commands::Now => cmd_now(&app),
        Commands::Terms { chronological } => cmd_terms(&app, *chronological),
        Commands::Term { term, insight } => cmd_term(&app, term, *insight).await,
        Commands::Layout { view } => cmd_layout(&app, view),
        Commands::Svg { view, output } => cmd_svg(&app, view, output.as_deref()),
        Commands::Clock { ticks } => cmd_clock(&app, *ticks).await,
    }
}

async fn cmd_serve(app: App) -> Result<()> {
    tracing::info!("starting MCP server ({} terms)", app.table.len());
    let source = Arc::new(HttpInsightSource::from_config(&app.config.insight));
    let server = server::SuishiServer::new(app.table, app.config.geometry, app.clock, source);
    let service = match server.serve(stdio()).await {
        Ok(service) => service,
        Err(ServerInitializeError::ConnectionClosed(during)) => {
            tracing::info!("client closed stdio before initializing ({during})");
            return Ok(());
        }
        Err(e) => return Err(e).context("failed to start MCP server"),
    };

    tokio::select! {
        res = service.waiting() => {
            res.context("MCP server task failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }
    Ok(())
}

fn cmd_now(app: &App) -> Result<()> {
    let now = app.clock.now();
    let term = app.current_term();
    let next = next_term(term, &app.table);

    println!("{} {}", now.date, clock_face(app.clock.as_ref()));
    println!("当前节气  {}  {}", term.name, term.translation);
    println!("公历 {}", term.gregorian_label());
    println!("\"{}\"", term.description);
    println!("下一节气  {}  {}", next.name, next.gregorian_label());
    Ok(())
}

fn cmd_terms(app: &App, chronological: bool) -> Result<()> {
    let current = app.current_term().id;
    let terms: Vec<&Term> = if chronological {
        app.table.chronological().collect()
    } else {
        app.table.terms().iter().collect()
    };
    for term in terms {
        let marker = if term.id == current { "*" } else { " " };
        println!(
            "{marker} {:>2}  {}  {:<7} {:<12} {}",
            term.id,
            term.name,
            format_anchor(term.anchor),
            term.pinyin,
            term.translation
        );
    }
    Ok(())
}

async fn cmd_term(app: &App, key: &str, with_insight: bool) -> Result<()> {
    let term = app.find_term(key)?;
    let insight = if with_insight {
        let source = HttpInsightSource::from_config(&app.config.insight);
        InsightState::Ready(fetch_insight(&source, term).await)
    } else {
        InsightState::Idle
    };
    let panel = TermPanel::new(term, app.current_term().id, insight);
    print!("{}", panel.render_text());
    Ok(())
}

fn cmd_layout(app: &App, view: &ViewArgs) -> Result<()> {
    let ring = app.ring(view)?;
    let json = serde_json::to_string_pretty(&ring).context("failed to serialize layout")?;
    println!("{json}");
    Ok(())
}

fn cmd_svg(app: &App, view: &ViewArgs, output: Option<&Path>) -> Result<()> {
    let ring = app.ring(view)?;
    let svg = svg::render_svg(&ring, &clock_face(app.clock.as_ref()));
    match output {
        Some(path) => {
            std::fs::write(path, &svg)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => print!("{svg}"),
    }
    Ok(())
}

async fn cmd_clock(app: &App, ticks: Option<u64>) -> Result<()> {
    if ticks == Some(0) {
        return Ok(());
    }
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let mut printed = 0u64;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                println!("{}", clock_face(app.clock.as_ref()));
                printed += 1;
                if ticks.is_some_and(|n| printed >= n) {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("clock stopped after {printed} ticks");
                return Ok(());
            }
        }
    }
}
