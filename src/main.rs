//! image-acquire: search the web for images and store them as normalized PNGs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;

use image_acquire::paths::{DEFAULT_SUFFIX, LOGO_SUFFIX, auto_filename};
use image_acquire::report::DEFAULT_FIGURE_WIDTH;
use image_acquire::{
    Acquirer, AcquisitionMode, AcquisitionRequest, Config, SearchFilters, SizeFilter, TypeFilter,
};

#[derive(Parser)]
#[command(
    name = "image-acquire",
    about = "Search the web for images and download them, with optional Typst output",
    version
)]
struct Cli {
    /// Search terms, company name/domain, or a label for a direct URL.
    query: String,

    /// Logo mode: treat the query as a company name or domain.
    #[arg(long, conflicts_with_all = ["stock", "url"])]
    logo: bool,

    /// Stock photo mode: license-clear providers first.
    #[arg(long, conflicts_with = "url")]
    stock: bool,

    /// Direct URL download mode.
    #[arg(long)]
    url: Option<String>,

    /// Output directory for generated filenames.
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,

    /// Explicit output path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of images to download.
    #[arg(short = 'n', long = "num", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    num: u32,

    /// Size filter (primary search only).
    #[arg(long, value_enum)]
    size: Option<SizeArg>,

    /// Type filter (primary search only).
    #[arg(long = "type", value_enum)]
    kind: Option<TypeArg>,

    /// Print Typst figure code after download.
    #[arg(long)]
    typst: bool,

    /// Typst image width.
    #[arg(long, default_value = DEFAULT_FIGURE_WIDTH)]
    width: String,

    /// Typst caption (derived from the query if omitted).
    #[arg(long)]
    caption: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    Large,
    Medium,
    Icon,
}

impl From<SizeArg> for SizeFilter {
    fn from(s: SizeArg) -> Self {
        match s {
            SizeArg::Large => SizeFilter::Large,
            SizeArg::Medium => SizeFilter::Medium,
            SizeArg::Icon => SizeFilter::Icon,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Photo,
    Clipart,
    Face,
    Lineart,
}

impl From<TypeArg> for TypeFilter {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::Photo => TypeFilter::Photo,
            TypeArg::Clipart => TypeFilter::Clipart,
            TypeArg::Face => TypeFilter::Face,
            TypeArg::Lineart => TypeFilter::Lineart,
        }
    }
}

impl Cli {
    fn mode(&self) -> AcquisitionMode {
        if self.url.is_some() {
            AcquisitionMode::DirectUrl
        } else if self.logo {
            AcquisitionMode::Logo
        } else if self.stock {
            AcquisitionMode::Stock
        } else {
            AcquisitionMode::GenericSearch
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<image_acquire::Error>()
                .map(|e| e.exit_code())
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::from_env();
    if let Some(dir) = &cli.dir {
        config.output.dir = dir.clone();
    }
    let config = Arc::new(config);

    let mode = cli.mode();
    let count = if mode == AcquisitionMode::Logo || mode == AcquisitionMode::DirectUrl {
        1
    } else {
        cli.num as usize
    };

    // Direct mode resolves the URL; the positional query only names the file
    let reference = match &cli.url {
        Some(url) => url.clone(),
        None => cli.query.clone(),
    };

    let filters = SearchFilters {
        size: cli.size.map(Into::into),
        kind: cli.kind.map(Into::into),
    };
    let request = AcquisitionRequest::new(mode, reference, count)?.with_filters(filters);

    let base_path = cli.output.clone().unwrap_or_else(|| {
        let suffix = if mode == AcquisitionMode::Logo {
            LOGO_SUFFIX
        } else {
            DEFAULT_SUFFIX
        };
        auto_filename(
            &cli.query,
            &config.output.dir,
            chrono::Local::now().date_naive(),
            suffix,
        )
    });

    let acquirer = Acquirer::new(config)?;

    let cancel = CancellationToken::new();
    let signal_task = image_acquire::cancel_on_signal(cancel.clone());

    let result = acquirer
        .acquire_with_cancel(&request, &base_path, &cancel)
        .await;
    cancel.cancel();
    signal_task.await.ok();

    let report = result?;

    for line in report.saved_lines() {
        println!("{}", line);
    }
    if let Some(line) = report.shortfall_line() {
        eprintln!("{}", line);
    }

    if cli.typst {
        // Figures caption the human query, not the URL
        let caption = cli
            .caption
            .clone()
            .unwrap_or_else(|| image_acquire::report::caption_from_query(&cli.query));
        println!("\nTypst:");
        for figure in report.typst_figures(&cli.width, Some(&caption)) {
            println!("{}", figure);
        }
    }

    Ok(ExitCode::from(report.exit_code() as u8))
}
