use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use enrollsync::{
    config::Config, import_raw_rows, xlsx, CancellationToken, Cancelled, CatalogClient,
    CourseCatalog, ImportOptions, ImportResult, InMemoryCatalog, RawRow,
};
use std::{env, path::PathBuf};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Import transcript spreadsheets as enrollment records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile a transcript export against the course catalog.
    Import(ImportArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// Spreadsheet export (xlsx, xls or ods).
    file: PathBuf,
    /// Sheet to read; defaults to the first one.
    #[arg(long)]
    sheet: Option<String>,
    /// YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// API base URL, overriding config and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Use a JSON catalog snapshot instead of the API.
    #[arg(long, conflicts_with = "apply")]
    snapshot: Option<PathBuf>,
    /// Replace the stored enrollments with the import result.
    #[arg(long)]
    apply: bool,
    /// Print the result as JSON instead of a summary.
    #[arg(long)]
    json: bool,
    /// Rows resolved concurrently.
    #[arg(long)]
    concurrency: Option<usize>,
}

async fn run_import<C: CourseCatalog>(
    rows: &[RawRow],
    cfg: &Config,
    catalog: &C,
    cancel: CancellationToken,
) -> Result<ImportResult> {
    let opts = ImportOptions {
        concurrency: cfg.import.concurrency,
        cancel,
    };
    import_raw_rows(rows, &cfg.columns, catalog, &opts).await
}

async fn import(args: ImportArgs) -> Result<()> {
    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        cfg.api.base_url = url;
    }
    if let Some(n) = args.concurrency {
        cfg.import.concurrency = n;
    }

    // offload the workbook read to the blocking pool
    let rows = tokio::task::spawn_blocking({
        let file = args.file.clone();
        let sheet = args.sheet.clone();
        let labels = cfg.columns.clone();
        move || xlsx::read_rows(&file, sheet.as_deref(), &labels)
    })
    .await??;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; stopping after the current row");
                cancel.cancel();
            }
        }
    });

    let (result, client) = match &args.snapshot {
        Some(path) => {
            info!(snapshot = %path.display(), "using catalog snapshot");
            let catalog = InMemoryCatalog::from_file(path)?;
            (run_import(&rows, &cfg, &catalog, cancel).await?, None)
        }
        None => {
            let client = CatalogClient::new(&cfg.api)?;
            info!(api = %client.base_url(), "using catalog API");
            let result = run_import(&rows, &cfg, &client, cancel).await?;
            (result, Some(client))
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.summary(cfg.import.sample_size));
    }

    if args.apply {
        let Some(client) = client else {
            bail!("--apply needs the catalog API");
        };
        if result.raw_enrollments.is_empty() {
            warn!("nothing matched; leaving stored enrollments untouched");
        } else {
            client.replace_enrollments(&result.raw_enrollments).await?;
            info!(count = result.raw_enrollments.len(), "stored enrollments replaced");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── init logging ────────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("").add_directive(log_level.parse().unwrap_or(Level::INFO.into()))
    });
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Import(args) => import(args).await,
    };

    if let Err(e) = outcome {
        if let Some(c) = e.downcast_ref::<Cancelled>() {
            warn!("{}; stored enrollments untouched", c);
            std::process::exit(130);
        }
        error!("import failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
