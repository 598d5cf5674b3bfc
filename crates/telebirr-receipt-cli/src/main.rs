//! telebirr-receipt — entry point.

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use telebirr_receipt_cli::commands::{
    label_rows, load_expected, load_fields, run_verify, unknown_keys,
};
use telebirr_receipt_cli::{resolve_base_url, resolve_insecure, FetchOptions, Input};

#[derive(Parser)]
#[command(
    name = "telebirr-receipt",
    about = "Fetch, parse, and verify telebirr payment receipts",
    version
)]
struct Cli {
    /// Receipt base URL (receipt numbers are appended to it).
    /// Also reads from TELEBIRR_RECEIPT_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Skip TLS certificate validation for the receipt request.
    /// Also reads from TELEBIRR_RECEIPT_INSECURE.
    #[arg(long, global = true)]
    insecure: bool,

    /// Request timeout in seconds (default: none).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Receipt number from the payment SMS.
    #[arg(short, long)]
    receipt_no: Option<String>,

    /// Full receipt URL.
    #[arg(short, long)]
    url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a receipt and print its fields as JSON.
    Fetch {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Extract fields from a saved receipt page.
    Parse {
        /// Path to the HTML file.
        file: PathBuf,
    },

    /// Verify a receipt against expected values.
    ///
    /// Exits with status 1 when any checked field differs.
    ///
    /// Examples:
    ///   telebirr-receipt verify -r CE12345678 --field to="Kebede Alemu" --only to
    ///   telebirr-receipt verify --html receipt.html --expected expected.json --exclude date
    Verify {
        #[command(flatten)]
        source: SourceArgs,

        /// Read the page from a local HTML file instead.
        #[arg(long)]
        html: Option<PathBuf>,

        /// JSON object of expected values.
        #[arg(short, long)]
        expected: Option<PathBuf>,

        /// Expected value as key=value; amounts are compared as numbers.
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Field to leave out of the full check.
        #[arg(long, conflicts_with = "only")]
        exclude: Vec<String>,

        /// Check only these fields.
        #[arg(long)]
        only: Vec<String>,
    },

    /// Print the label table.
    Labels,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   telebirr-receipt completions bash > ~/.local/share/bash-completion/completions/telebirr-receipt
    ///   telebirr-receipt completions zsh > ~/.zfunc/_telebirr-receipt
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = FetchOptions {
        base_url: resolve_base_url(cli.base_url.as_deref()),
        insecure: resolve_insecure(cli.insecure),
        timeout_secs: cli.timeout,
    };

    match cli.command {
        Commands::Fetch { source } => {
            let input =
                Input::from_options(source.receipt_no.as_deref(), source.url.as_deref(), None)?;
            let fields = load_fields(&input, &options).await?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }

        Commands::Parse { file } => {
            let fields = load_fields(&Input::File(file), &options).await?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }

        Commands::Verify {
            source,
            html,
            expected,
            fields,
            exclude,
            only,
        } => {
            let input = Input::from_options(
                source.receipt_no.as_deref(),
                source.url.as_deref(),
                html.as_deref(),
            )?;
            let named = fields
                .iter()
                .filter_map(|f| f.split_once('=').map(|(k, _)| k.trim()))
                .chain(exclude.iter().map(String::as_str))
                .chain(only.iter().map(String::as_str));
            for key in unknown_keys(named) {
                tracing::warn!(key, "not a receipt field; it will never be extracted");
            }

            let expected = load_expected(expected.as_deref(), &fields)?;
            let extracted = load_fields(&input, &options).await?;

            let report = run_verify(&extracted, &expected, &exclude, &only);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.matched {
                tracing::info!(
                    checked = report.checked,
                    mismatches = report.mismatches.len(),
                    "receipt did not verify"
                );
                std::process::exit(1);
            }
        }

        Commands::Labels => {
            println!("{}", serde_json::to_string_pretty(&label_rows())?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "telebirr-receipt", &mut std::io::stdout());
        }
    }

    Ok(())
}
