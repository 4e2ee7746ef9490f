//! Définition et implémentation des commandes CLI
//!
//! - `fit` : ajuste les entités sélectionnées d'une couche GeoJSON
//! - `preview` : aperçu de la première entité sélectionnée
//! - `wkt` : ajuste un polygone WKT
//! - `crs` : SCR de calcul enregistré

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use fitgeom::{fit_in_crs, Crs, FeatureId, FitController, TransformContext, VectorLayer};
use fitgeom_cli::{FitReport, GeoJsonLayer, Settings, TracingNotifier};
use geozero::wkt::{Wkt, WktWriter};
use geozero::{GeozeroGeometry, ToGeo};
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the selected features of a GeoJSON layer to their target area
    Fit {
        #[command(flatten)]
        layer: LayerArgs,

        /// Output GeoJSON file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a JSON fit report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Open the layer read-only (nothing is fitted)
        #[arg(long)]
        read_only: bool,
    },

    /// Print the area change of the first selected feature
    Preview {
        #[command(flatten)]
        layer: LayerArgs,
    },

    /// Fit a single WKT polygon and print the result as WKT
    Wkt {
        /// Polygon or MultiPolygon in WKT
        #[arg(long)]
        wkt: String,

        /// Target area, in square units of the calculation CRS
        #[arg(long)]
        area: f64,

        /// CRS of the WKT coordinates (default: the calculation CRS)
        #[arg(long)]
        crs: Option<String>,

        /// Calculation CRS (default: stored setting)
        #[arg(long)]
        calc_crs: Option<String>,
    },

    /// Show or change the stored calculation CRS
    Crs {
        #[command(subcommand)]
        action: CrsCommand,
    },
}

#[derive(Subcommand)]
pub enum CrsCommand {
    /// Print the stored calculation CRS
    Show,
    /// Store a new calculation CRS (must be projected)
    Set {
        /// Authority id, e.g. EPSG:32722
        authid: String,
    },
}

/// Arguments communs aux commandes sur couche
#[derive(Args)]
pub struct LayerArgs {
    /// GeoJSON FeatureCollection
    #[arg(short, long)]
    pub input: PathBuf,

    /// Double field holding the target area
    #[arg(short, long)]
    pub field: String,

    /// Storage CRS of the layer (default: GeoJSON "crs" member, else EPSG:4326)
    #[arg(long)]
    pub crs: Option<String>,

    /// Calculation CRS (default: stored setting, or the layer CRS when projected)
    #[arg(long)]
    pub calc_crs: Option<String>,

    /// Selected feature ids, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<FeatureId>,
}

/// Couche et contrôleur prêts à l'emploi
struct Prepared {
    layer: GeoJsonLayer,
    controller: FitController<TracingNotifier>,
}

fn parse_crs(authid: &str) -> Result<Crs> {
    Crs::from_authid(authid).context(format!("Invalid CRS: {}", authid))
}

fn prepare(settings_path: &Path, args: &LayerArgs, editable: bool) -> Result<Prepared> {
    let settings = Settings::load(settings_path)?;

    let storage = args.crs.as_deref().map(parse_crs).transpose()?;
    let mut layer = GeoJsonLayer::open(&args.input, storage)?;
    if !args.ids.is_empty() {
        layer.select(&args.ids);
    }
    layer.set_editable(editable);

    // Un SCR de calcul explicite n'est jamais remplacé par celui de la couche
    let (calculation, follow) = match &args.calc_crs {
        Some(authid) => (parse_crs(authid)?, false),
        None => (settings.calculation_crs(), true),
    };

    let controller =
        FitController::new(calculation, TransformContext::default(), TracingNotifier::default())?
            .with_follow_layer_crs(follow);

    Ok(Prepared { layer, controller })
}

/// Commande fit
pub fn cmd_fit(
    settings_path: &Path,
    args: &LayerArgs,
    output: Option<&Path>,
    report_path: Option<&Path>,
    read_only: bool,
) -> Result<()> {
    let start = Instant::now();
    let Prepared {
        mut layer,
        mut controller,
    } = prepare(settings_path, args, !read_only)?;

    let mut outcome = None;
    if controller.on_fit_toggled(true, Some(&layer)) {
        outcome = controller.on_apply(&mut layer, &args.field);
    }

    let mut report = FitReport::new(
        layer.name(),
        &args.field,
        layer.crs().authid(),
        controller.calculation_crs().authid(),
    );
    for (_, message) in controller.notifier().messages() {
        report.record_message(message);
    }
    let started = outcome.is_some();
    if let Some(outcome) = outcome {
        report.record_outcome(outcome);
        let output = output.unwrap_or(&args.input);
        layer.save(output)?;
        info!(output = %output.display(), "Layer written");
    }
    report.set_duration(start.elapsed());
    report.finalize(started);

    info!("{}", report.summary());
    report.display();

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
    }

    Ok(())
}

/// Commande preview
pub fn cmd_preview(settings_path: &Path, args: &LayerArgs) -> Result<()> {
    let Prepared {
        layer,
        mut controller,
    } = prepare(settings_path, args, true)?;

    if !controller.on_fit_toggled(true, Some(&layer)) {
        return Ok(());
    }

    let label = controller.on_field_changed(&layer, &args.field);
    if label.is_empty() {
        info!(layer = layer.name(), "No feature to preview");
    } else {
        println!("{}", label);
    }
    Ok(())
}

/// Commande wkt
pub fn cmd_wkt(
    settings_path: &Path,
    wkt: &str,
    area: f64,
    crs: Option<&str>,
    calc_crs: Option<&str>,
) -> Result<()> {
    let calculation = match calc_crs {
        Some(authid) => parse_crs(authid)?,
        None => Settings::load(settings_path)?.calculation_crs(),
    };
    let storage = match crs {
        Some(authid) => parse_crs(authid)?,
        None => calculation.clone(),
    };

    let geometry = Wkt(wkt).to_geo().context("Failed to parse WKT")?;
    let fitted = fit_in_crs(
        &geometry,
        area,
        &storage,
        &calculation,
        &TransformContext::default(),
    )?;

    let mut wkt_buf = Vec::new();
    {
        let mut writer = WktWriter::new(&mut wkt_buf);
        fitted
            .process_geom(&mut writer)
            .context("Failed to encode geometry to WKT")?;
    }
    println!("{}", String::from_utf8_lossy(&wkt_buf));
    Ok(())
}

/// Commande crs show
pub fn cmd_crs_show(settings_path: &Path) -> Result<()> {
    let settings = Settings::load(settings_path)?;
    let crs = settings.calculation_crs();
    println!("{} ({}, area unit {})", crs, crs.name(), crs.area_unit_label());
    Ok(())
}

/// Commande crs set
pub fn cmd_crs_set(settings_path: &Path, authid: &str) -> Result<()> {
    let mut settings = Settings::load(settings_path)?;
    let crs = parse_crs(authid)?;
    settings.set_calculation_crs(&crs)?;
    settings.save()?;
    info!(crs = %crs, path = %settings.path().display(), "Calculation CRS saved");
    println!("{}", crs);
    Ok(())
}
