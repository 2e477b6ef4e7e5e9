use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use tuneport::{cli, config, error, logging, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API and cache the user session
    Auth,

    /// Convert a playlist into a new Spotify playlist
    Convert(ConvertOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertOptions {
    /// Apple Music album/playlist URL or path to a JSON track list
    pub source: String,

    /// Name of the playlist to create (defaults to the source name)
    #[clap(long)]
    pub name: Option<String>,

    /// Maximum number of concurrent track searches
    #[clap(long)]
    pub concurrency: Option<usize>,

    /// Resolve tracks only, do not create a playlist
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if !matches!(cli.command, Command::Completions(_)) {
        if let Err(e) = logging::init() {
            warning!("Cannot open log file, diagnostics are disabled. Err: {}", e);
        }
    }

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Convert(opt) => {
            cli::convert(opt.source, opt.name, opt.concurrency, opt.dry_run).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
