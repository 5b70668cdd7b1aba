extern crate clap;

use clap::{CommandFactory, FromArgMatches, Parser};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colored::Colorize;
use log::{error, info, warn, LevelFilter};
use speed_probe::config::{
    ProbeConfig, DEFAULT_DOWNLOAD_SIZE_MB, DEFAULT_JITTER_SAMPLES,
    DEFAULT_PING_COUNT, DEFAULT_TIMEOUT_SECONDS, DEFAULT_UPLOAD_SIZE_MB,
    DEFAULT_URL,
};
use speed_probe::errors::{exit_codes, format_error_for_display, ProbeError};
use speed_probe::http::HttpTransport;
use speed_probe::output::{self, OutputFormat};
use speed_probe::probes::Aggregator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL of the speed test server (must be https)
    #[arg(long, env = "SPEED_PROBE_URL", default_value = DEFAULT_URL)]
    url: String,

    /// Size of the download probe in MB
    #[arg(long, env = "SPEED_PROBE_DOWNLOAD_SIZE", default_value_t = DEFAULT_DOWNLOAD_SIZE_MB)]
    download_size: u32,

    /// Size of the upload probe in MB
    #[arg(long, env = "SPEED_PROBE_UPLOAD_SIZE", default_value_t = DEFAULT_UPLOAD_SIZE_MB)]
    upload_size: u32,

    /// Number of samples for the latency probe
    #[arg(long, env = "SPEED_PROBE_PING_COUNT", default_value_t = DEFAULT_PING_COUNT)]
    ping_count: u32,

    /// Number of samples for the jitter probe
    #[arg(long, env = "SPEED_PROBE_JITTER_SAMPLES", default_value_t = DEFAULT_JITTER_SAMPLES)]
    jitter_samples: u32,

    /// Deadline for each network operation in seconds
    #[arg(long, env = "SPEED_PROBE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    timeout: u64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Cli {
    fn parse_with_revision() -> Self {
        let mut command = Cli::command();
        if let Some(hash) = option_env!("SPEED_PROBE_BUILD_GIT_HASH") {
            command = command
                .version(format!("{} (rev {})", env!("CARGO_PKG_VERSION"), hash));
        }

        let matches = command.get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    fn probe_config(&self) -> Result<ProbeConfig, ProbeError> {
        ProbeConfig::new(
            &self.url,
            self.download_size,
            self.upload_size,
            self.ping_count,
            self.jitter_samples,
            self.timeout,
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_with_revision();

    init_logging(cli.verbose.log_level_filter());

    let code = run(&cli).await;
    std::process::exit(code);
}

async fn run(cli: &Cli) -> i32 {
    let config = match cli.probe_config() {
        Ok(config) => config,
        Err(e) => return report(&e),
    };

    for warning in config.warnings() {
        warn!("{}", warning);
    }

    let transport = match HttpTransport::new() {
        Ok(transport) => transport,
        Err(e) => return report(&e),
    };

    info!("Starting speed probes...");

    let aggregator = Aggregator::new(&transport);
    let Some(result) =
        aggregator.run_until(&config, tokio::signal::ctrl_c()).await
    else {
        info!("Speed probes interrupted by user");
        return exit_codes::INTERRUPTED;
    };

    if !result.errors.is_empty() {
        let failed: Vec<String> =
            result.failed_probes().iter().map(ToString::to_string).collect();
        warn!("No result for: {}", failed.join(", "));
    }

    match output::render(&result, cli.output) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            error!("Could not render results: {}", e);
            return exit_codes::UNKNOWN_ERROR;
        }
    }

    result.exit_code()
}

fn report(error: &ProbeError) -> i32 {
    eprintln!("{}", format_error_for_display(error).red());
    error.exit_code()
}

/// Log to stderr at `level`; `RUST_LOG` still overrides per module.
fn init_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_millis();

    // HTTP stack internals only show up at trace.
    if level < LevelFilter::Trace {
        for module in ["reqwest", "hyper", "hyper_util", "rustls"] {
            builder.filter_module(module, level.min(LevelFilter::Warn));
        }
    }

    builder.parse_default_env().init();
}
