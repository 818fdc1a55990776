mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, recipe::RecipeSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "assist",
    about = "AI assistant for questions, code, and file summaries, with a shell-command recipe book",
    version,
    propagate_version = true
)]
struct Cli {
    /// Working root (default: nearest directory with .assist/, else cwd)
    #[arg(long, global = true, env = "ASSIST_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Omit to start the interactive menu
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu
    Menu,

    /// Ask a question, grounded with web search
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Explain a code snippet read from FILE (or stdin)
    Explain { file: Option<PathBuf> },

    /// Generate code from a description
    Generate {
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,
    },

    /// Summarize a local file (text, PDF, office, archive, or image)
    Summarize { path: PathBuf },

    /// Manage the command recipe book
    Recipe {
        #[command(subcommand)]
        subcommand: RecipeSubcommand,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        None | Some(Commands::Menu) => cmd::menu::run(&root),
        Some(Commands::Ask { question }) => cmd::ask::run(&root, &question.join(" "), cli.json),
        Some(Commands::Explain { file }) => cmd::code::explain(&root, file.as_deref(), cli.json),
        Some(Commands::Generate { request }) => {
            cmd::code::generate(&root, &request.join(" "), cli.json)
        }
        Some(Commands::Summarize { path }) => cmd::summarize::run(&root, &path, cli.json),
        Some(Commands::Recipe { subcommand }) => cmd::recipe::run(&root, subcommand, cli.json),
        Some(Commands::Config { subcommand }) => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
