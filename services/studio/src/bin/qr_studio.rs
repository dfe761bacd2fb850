//! services/studio/src/bin/qr_studio.rs
//!
//! Command-line driver for the studio. Every failure is rendered here as a
//! one-line notice on stderr.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use qr_studio_core::domain::{Color, ErrorCorrectionLevel};
use qr_studio_core::ports::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use studio_lib::{
    adapters::{
        DirectoryFileSink, FileKeyValueStore, MemoryKeyValueStore, QrCodeEncoder, SystemClipboard,
    },
    config::Config,
    error::StudioError,
    Studio,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn export_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("png")
            .long("png")
            .action(ArgAction::SetTrue)
            .help("Save the PNG rendition"),
    )
    .arg(
        Arg::new("svg")
            .long("svg")
            .action(ArgAction::SetTrue)
            .help("Save the SVG rendition"),
    )
    .arg(
        Arg::new("copy")
            .long("copy")
            .action(ArgAction::SetTrue)
            .help("Copy the PNG rendition to the clipboard"),
    )
}

fn cli() -> Command {
    Command::new("qr-studio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate QR codes offline and keep a history of recent ones")
        .subcommand_required(true)
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Keep history in memory only"),
        )
        .subcommand(export_args(
            Command::new("generate")
                .about("Encode text into a QR code")
                .arg(Arg::new("text").required(true).help("Content to encode"))
                .arg(
                    Arg::new("size")
                        .long("size")
                        .value_parser(value_parser!(i64).range(64..=2000))
                        .help("Target width in pixels (64-2000)"),
                )
                .arg(
                    Arg::new("margin")
                        .long("margin")
                        .value_parser(value_parser!(i64).range(0..=10))
                        .help("Quiet zone in modules (0-10)"),
                )
                .arg(
                    Arg::new("ec")
                        .long("ec")
                        .value_parser(|s: &str| s.parse::<ErrorCorrectionLevel>())
                        .help("Error correction level: L, M, Q or H"),
                )
                .arg(
                    Arg::new("dark")
                        .long("dark")
                        .value_parser(|s: &str| s.parse::<Color>())
                        .help("Module color, e.g. #000000"),
                )
                .arg(
                    Arg::new("light")
                        .long("light")
                        .value_parser(|s: &str| s.parse::<Color>())
                        .help("Background color, e.g. #ffffff"),
                ),
        ))
        .subcommand(
            Command::new("history")
                .about("List recent codes, newest first")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(export_args(
            Command::new("replay")
                .about("Generate again from a history entry")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        ))
        .subcommand(
            Command::new("export-history")
                .about("Save or copy the PNG stored with a history entry")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("copy")
                        .long("copy")
                        .action(ArgAction::SetTrue)
                        .help("Copy to the clipboard instead of saving"),
                ),
        )
        .subcommand(Command::new("clear").about("Delete the history"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRow<'a> {
    id: i64,
    text: &'a str,
    generated_at: String,
}

async fn run_exports(studio: &Studio, matches: &ArgMatches) -> Result<(), StudioError> {
    if matches.get_flag("png") {
        let path = studio.export_raster().await?;
        println!("saved {}", path.display());
    }
    if matches.get_flag("svg") {
        let path = studio.export_vector().await?;
        println!("saved {}", path.display());
    }
    if matches.get_flag("copy") {
        studio.copy_raster_to_clipboard().await?;
        println!("copied to clipboard");
    }
    Ok(())
}

async fn run(config: Config, matches: ArgMatches) -> Result<(), StudioError> {
    let store: Arc<dyn KeyValueStore> = if matches.get_flag("ephemeral") {
        Arc::new(MemoryKeyValueStore::new())
    } else {
        Arc::new(FileKeyValueStore::new(config.data_dir.clone()))
    };
    let studio = Studio::new(
        Arc::new(QrCodeEncoder::new()),
        store,
        Arc::new(DirectoryFileSink::new(config.output_dir.clone())),
        Arc::new(SystemClipboard::new()),
        config.initial_configuration(),
    );

    match matches.subcommand() {
        Some(("generate", sub)) => {
            studio
                .configure(|cfg| {
                    if let Some(text) = sub.get_one::<String>("text") {
                        cfg.set_content(text.as_str());
                    }
                    if let Some(size) = sub.get_one::<i64>("size") {
                        cfg.set_pixel_size(*size);
                    }
                    if let Some(margin) = sub.get_one::<i64>("margin") {
                        cfg.set_margin(*margin);
                    }
                    if let Some(level) = sub.get_one::<ErrorCorrectionLevel>("ec") {
                        cfg.set_error_correction(*level);
                    }
                    if let Some(dark) = sub.get_one::<Color>("dark") {
                        cfg.set_dark_color(*dark);
                    }
                    if let Some(light) = sub.get_one::<Color>("light") {
                        cfg.set_light_color(*light);
                    }
                })
                .await;
            let pair = studio.generate().await?;
            println!(
                "generated {}x{} code for {:?}",
                pair.pixel_size, pair.pixel_size, pair.text
            );
            run_exports(&studio, sub).await?;
        }
        Some(("history", sub)) => {
            let entries = studio.history().await;
            if sub.get_flag("json") {
                let rows: Vec<HistoryRow<'_>> = entries
                    .iter()
                    .map(|e| HistoryRow {
                        id: e.id,
                        text: &e.text,
                        generated_at: e.created_at.to_rfc3339(),
                    })
                    .collect();
                let json = serde_json::to_string_pretty(&rows)
                    .map_err(|e| StudioError::Internal(e.to_string()))?;
                println!("{}", json);
            } else if entries.is_empty() {
                println!("history is empty");
            } else {
                for entry in &entries {
                    println!(
                        "{}  {}  {}",
                        entry.id,
                        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                        entry.text
                    );
                }
            }
        }
        Some(("replay", sub)) => {
            let id = sub.get_one::<i64>("id").copied().unwrap_or_default();
            let pair = studio.replay(id).await?;
            println!("regenerated code for {:?}", pair.text);
            run_exports(&studio, sub).await?;
        }
        Some(("export-history", sub)) => {
            let id = sub.get_one::<i64>("id").copied().unwrap_or_default();
            if sub.get_flag("copy") {
                studio.copy_history_raster(id).await?;
                println!("copied to clipboard");
            } else {
                let path = studio.export_history_raster(id).await?;
                println!("saved {}", path.display());
            }
        }
        Some(("clear", _)) => {
            studio.clear_history().await?;
            println!("history cleared");
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(data_dir = %config.data_dir.display(), "configuration loaded");

    // --- 2. Dispatch ---
    let matches = cli().get_matches();
    if let Err(e) = run(config, matches).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_generate_options() {
        let matches = cli()
            .try_get_matches_from([
                "qr-studio", "generate", "hello", "--size", "512", "--ec", "h", "--dark", "#123",
                "--png",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "generate");
        assert_eq!(sub.get_one::<i64>("size"), Some(&512));
        assert_eq!(
            sub.get_one::<ErrorCorrectionLevel>("ec"),
            Some(&ErrorCorrectionLevel::High)
        );
        assert_eq!(sub.get_one::<Color>("dark"), Some(&Color::rgb(0x11, 0x22, 0x33)));
        assert!(sub.get_flag("png"));
        assert!(!sub.get_flag("copy"));
    }

    #[test]
    fn rejects_size_and_margin_out_of_range() {
        for args in [
            ["qr-studio", "generate", "x", "--size", "100000"],
            ["qr-studio", "generate", "x", "--size", "63"],
            ["qr-studio", "generate", "x", "--margin", "11"],
            ["qr-studio", "generate", "x", "--margin", "-1"],
        ] {
            assert!(cli().try_get_matches_from(args).is_err(), "{:?}", args);
        }
        let matches = cli()
            .try_get_matches_from(["qr-studio", "generate", "x", "--size", "2000", "--margin", "0"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<i64>("size"), Some(&2000));
        assert_eq!(sub.get_one::<i64>("margin"), Some(&0));
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(cli()
            .try_get_matches_from(["qr-studio", "generate", "x", "--ec", "Z"])
            .is_err());
    }
}
