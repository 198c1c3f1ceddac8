//! Thermark command line entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use thermark::batch::BatchJob;
use thermark::config::{AppConfig, LogLevel};
use thermark::export::Exporter;
use thermark::metadata::{ExifTool, MetadataExtractor};
use thermark::report::{JsonReportWriter, ProjectInfo, ReportError, ReportGenerator, ReportRequest};
use thermark::{Colormap, Session};
use web_time::Instant;

#[derive(Parser)]
#[command(name = "thermark")]
#[command(version, about = "Annotate and export radiometric thermal images", long_about = None)]
struct Cli {
    /// Radiometric image (TIFF, NPY or 16-bit PNG)
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Annotation job file (JSON)
    #[arg(short, long, value_name = "FILE")]
    job: Option<PathBuf>,

    /// Colormap: magma, inferno, jet, hot, gray, viridis, plasma, cividis, turbo
    #[arg(long, value_name = "ID")]
    colormap: Option<String>,

    /// Low display level
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    low: Option<f32>,

    /// High display level
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    high: Option<f32>,

    /// Directory for the exported PNG
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip the PNG export
    #[arg(long)]
    no_export: bool,

    /// Project information (JSON) for report generation
    #[arg(short, long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Log level override: error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn load_config(path: Option<&Path>) -> thermark::Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::load_from_path(path)?),
        None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn init_logging(config: &AppConfig, cli: &Cli) {
    let level = cli
        .log_level
        .as_deref()
        .and_then(|s| match s.parse::<LogLevel>() {
            Ok(level) => Some(level),
            Err(e) => {
                eprintln!("{}, using the configured level", e);
                None
            }
        })
        .unwrap_or(config.preferences.log_level);
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();
}

fn load_project(path: &Path) -> Result<ProjectInfo, ReportError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn run(cli: &Cli, config: &AppConfig) -> thermark::Result<()> {
    let mut session = Session::new(config.session_settings());
    session.open(&cli.image)?;

    let metadata = ExifTool::new(config.preferences.exiftool_program.as_str()).extract(&cli.image);
    println!("📍 {}", metadata.gps_label());
    println!("📅 {}", metadata.date_label());
    if let Some(altitude) = &metadata.altitude {
        println!("Altitude ASL: {}", altitude);
    }
    if let Some(image) = session.image() {
        let (min, max) = image.value_range();
        println!("Min Temp: {:.2} °C, Max Temp: {:.2} °C", min, max);
    }

    if let Some(id) = &cli.colormap {
        session.set_colormap(id.parse::<Colormap>()?);
    }

    let job = cli.job.as_deref().map(BatchJob::load).transpose()?;
    if let Some(job) = &job {
        let outcome = job.apply(&mut session, Instant::now());
        for (name, reason) in &outcome.rejected {
            println!("Skipped '{}': {}", name, reason);
        }
    }

    if let Some(low) = cli.low {
        if !session.set_low(low) {
            log::warn!("Low level {} is outside the data range or above high, ignored", low);
        }
    }
    if let Some(high) = cli.high {
        if !session.set_high(high) {
            log::warn!("High level {} is outside the data range or below low, ignored", high);
        }
    }

    session.refresh_summary();
    print!("{}", session.summary());

    let project = match &cli.report {
        Some(path) => Some(load_project(path)?),
        None => job.and_then(|j| j.project),
    };

    if cli.no_export && project.is_none() {
        return Ok(());
    }

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.preferences.output_dir.clone());
    let exported = Exporter::new(output_dir, &config.export).export(&session)?;
    println!("Exported {}", exported.display());

    if let Some(project) = project {
        let request = ReportRequest::build(&project, &metadata, &session, &exported)?;
        let path = JsonReportWriter::new(&config.preferences.report_dir).generate(&request)?;
        println!("{} report generated successfully!", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config, &cli);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
