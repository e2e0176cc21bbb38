use csv_each::{AppConfig, CsvEach, Entry, EntryConfig};
use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG: &str = "csv-each.toml";

/// Usage: `csv-each [file] [config.toml]`
///
/// Writes every entry of `file` to stdout as one JSON document per line.
/// Without `file`, `[entry] filename` from the configuration is used.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    // an explicit path must exist; the default one is optional
    let config = match args.get(2) {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(Some(DEFAULT_CONFIG))?,
    };

    let json = config.logging.format == "json";
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive(format!("csv_each={}", config.logging.level).parse()?),
        )
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    tracing::debug!(
        read_ahead = config.reader.read_ahead_lines,
        "Loaded configuration"
    );

    let call = EntryConfig {
        filename: args.get(1).map(Into::into),
        ..Default::default()
    };

    let csv = CsvEach::new(config.entry.clone()).with_read_ahead(config.reader.read_ahead_lines);

    csv.each_entry(call, |entry: Entry| async move {
        println!("{}", serde_json::to_string(&entry)?);
        Ok::<(), serde_json::Error>(())
    })
    .await?;

    Ok(())
}
