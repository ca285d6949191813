use anyhow::anyhow;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::Shell;
use clap_complete::generate;
use edu_cli::run_search;
use edu_cli::run_submit;
use edu_cli::run_theme;
use edu_core::protocol::FormRequest;
use edu_core::protocol::HttpMethod;
use edu_core::protocol::ResultsPanel;
use edu_tui::Cli as TuiCli;
use edu_tui::ConfigArgs;
use tracing_subscriber::EnvFilter;

/// EduPlatform UI controller
///
/// If no subcommand is specified, the interactive terminal UI starts.
#[derive(Debug, Parser)]
#[clap(
    author,
    name = "edu",
    version = env!("CARGO_PKG_VERSION"),
    subcommand_negates_reqs = true,
    bin_name = "edu"
)]
struct MultitoolCli {
    #[clap(flatten)]
    config: ConfigArgs,

    /// Print every controller event as a JSON line.
    #[arg(long = "json", global = true, default_value_t = false)]
    json: bool,

    #[clap(subcommand)]
    subcommand: Option<Subcommand>,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Query a search endpoint once and print the results.
    #[clap(visible_alias = "s")]
    Search(SearchCommand),

    /// Submit a form the way the page's AJAX forms do.
    Submit(SubmitCommand),

    /// Show or toggle the stored theme.
    Theme(ThemeCommand),

    /// Run the interactive terminal UI.
    Tui(TuiCommand),

    /// Generate shell completion scripts.
    Completion(CompletionCommand),
}

#[derive(Debug, Parser)]
struct SearchCommand {
    /// Text to search for.
    query: String,

    /// Search endpoint, resolved against the base URL.
    #[arg(long, value_name = "PATH", default_value = "/api/search")]
    endpoint: String,
}

#[derive(Debug, Parser)]
struct SubmitCommand {
    /// Form action, resolved against the base URL.
    action: String,

    /// HTTP method.
    #[arg(long, short = 'X', default_value = "POST")]
    method: HttpMethod,

    /// Form field, repeatable.
    #[arg(long = "field", short = 'f', value_name = "key=value")]
    fields: Vec<String>,
}

#[derive(Debug, Parser)]
struct ThemeCommand {
    /// Switch between light and dark.
    #[arg(long)]
    toggle: bool,
}

#[derive(Debug, Parser)]
struct TuiCommand {
    /// Search endpoint the input queries.
    #[arg(long, value_name = "PATH", default_value = "/api/search")]
    endpoint: String,
}

#[derive(Debug, Parser)]
struct CompletionCommand {
    /// Shell to generate completions for
    #[clap(value_enum, default_value_t = Shell::Bash)]
    shell: Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = MultitoolCli::parse();

    let subcommand = match cli.subcommand {
        None => Subcommand::Tui(TuiCommand {
            endpoint: "/api/search".to_string(),
        }),
        Some(subcommand) => subcommand,
    };

    match subcommand {
        Subcommand::Tui(tui_cli) => {
            edu_tui::run_main(TuiCli {
                config: cli.config,
                endpoint: tui_cli.endpoint,
            })
            .await?;
        }
        Subcommand::Completion(completion_cli) => {
            print_completion(completion_cli);
        }
        Subcommand::Search(search_cli) => {
            init_logging();
            let config = cli.config.load_config()?;
            let panel = run_search(config, &search_cli.endpoint, &search_cli.query, cli.json).await?;
            if !cli.json {
                print_panel(&panel);
            }
        }
        Subcommand::Submit(submit_cli) => {
            init_logging();
            let config = cli.config.load_config()?;
            let fields = submit_cli
                .fields
                .iter()
                .map(|field| {
                    field
                        .split_once('=')
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .ok_or_else(|| anyhow!("expected key=value, got `{field}`"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let request = FormRequest {
                action: Some(submit_cli.action),
                method: submit_cli.method,
                fields,
                submit_label: "Submit".to_string(),
            };

            let outcome = run_submit(config, request, cli.json).await?;
            if !cli.json {
                println!("{}: {}", outcome.kind, outcome.message);
                if let Some(redirect) = &outcome.redirect {
                    println!("redirect: {redirect}");
                }
            }
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
        Subcommand::Theme(theme_cli) => {
            init_logging();
            let config = cli.config.load_config()?;
            let theme = run_theme(config, theme_cli.toggle, cli.json).await?;
            if !cli.json {
                println!("{theme}");
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_panel(panel: &ResultsPanel) {
    match panel {
        ResultsPanel::NoResults => println!("No results found"),
        ResultsPanel::Results(results) => {
            for result in results {
                println!("{}  {}", result.title, result.url);
                if !result.description.is_empty() {
                    println!("    {}", result.description);
                }
            }
        }
    }
}

fn print_completion(cmd: CompletionCommand) {
    let mut app = MultitoolCli::command();
    let name = "edu";
    generate(cmd.shell, &mut app, name, &mut std::io::stdout());
}
