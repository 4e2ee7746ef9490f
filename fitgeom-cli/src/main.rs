//! Point d'entrée CLI pour fitgeom

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, CrsCommand};
use fitgeom_cli::Settings;

/// Ajuster des polygones à la surface stockée dans un champ
#[derive(Parser)]
#[command(name = "fitgeom")]
#[command(author, version)]
#[command(about = "Fit polygon geometries to the area stored in one of their fields")]
#[command(long_about = "Scale polygons about their centroid so that their area matches a target value.\n\nThe area is computed in a projected calculation CRS (default EPSG:29101); geometries stored in another CRS are reprojected back and forth.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Fichier de paramètres (défaut : env FITGEOM_SETTINGS / fitgeom-settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let settings_path = Settings::resolve_path(cli.settings.as_deref());
    debug!(settings = %settings_path.display(), "Using settings file");

    match cli.command {
        Commands::Fit {
            layer,
            output,
            report,
            read_only,
        } => cli::cmd_fit(
            &settings_path,
            &layer,
            output.as_deref(),
            report.as_deref(),
            read_only,
        )?,
        Commands::Preview { layer } => cli::cmd_preview(&settings_path, &layer)?,
        Commands::Wkt {
            wkt,
            area,
            crs,
            calc_crs,
        } => cli::cmd_wkt(
            &settings_path,
            &wkt,
            area,
            crs.as_deref(),
            calc_crs.as_deref(),
        )?,
        Commands::Crs { action } => match action {
            CrsCommand::Show => cli::cmd_crs_show(&settings_path)?,
            CrsCommand::Set { authid } => cli::cmd_crs_set(&settings_path, &authid)?,
        },
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Les résultats vont sur stdout, les journaux sur stderr
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
