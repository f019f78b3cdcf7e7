use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use transit_consolidate::codec::{decode_station, encode_stations};
use transit_consolidate::directory::{StationDirectory, DEFAULT_LOOKUP_RADIUS_M};
use transit_consolidate::identifiers::LineIdentifier;
use transit_consolidate::models::{Category, GeoPoint};
use transit_consolidate::pipeline::{Consolidator, LineSource};

mod discover;
mod output;
mod settings;
mod stats;

use discover::{geojson_files, line_files, LineFile};
use output::{file_progress, read_collection, write_collection};
use settings::{load_config, Overrides};
use stats::{log_station_summary, SegmentStats};

#[derive(Parser, Debug)]
#[command(
    name = "geojson-consolidate",
    author,
    version,
    about = "Consolidate transit stations and route segments in GeoJSON files",
    long_about = "Merges the stops of different lines that stand at the same physical \
                  station into combined stations, joins route segments of a line that \
                  run within a few meters of each other, and combines per-line files \
                  into per-category line collections.\n\n\
                  Line data is read from <root>/<category dir>/<line>/*.geojson, with \
                  category directories such as 'Metro lines' or 'Tram lines'."
)]
struct Args {
    /// JSON file with consolidation thresholds
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Combine stops of all lines into stations
    Stations {
        /// Stop file of one line, as <category>:<line>=<path>
        #[arg(short, long, required_unless_present = "root", conflicts_with = "root")]
        source: Vec<LineFile>,

        /// Line data directory to read every line file from
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Output GeoJSON file for combined stations
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge close route segments in a file or a directory of files
    Segments {
        /// GeoJSON file, or directory searched recursively
        #[arg(short, long)]
        input: PathBuf,

        /// Write results here instead of rewriting the input files
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Combine line geometries into per-category files
    Lines {
        /// Line data directory
        #[arg(short, long)]
        root: PathBuf,

        /// Directory for combined_<category>_lines.geojson and final_all_lines.geojson
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Find the combined station nearest a coordinate
    Locate {
        /// Combined stations file written by `stations`
        #[arg(short, long)]
        stations: PathBuf,

        #[arg(long, allow_hyphen_values = true, required_unless_present = "line")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, required_unless_present = "line")]
        lon: Option<f64>,

        /// Search radius in meters
        #[arg(long, default_value_t = DEFAULT_LOOKUP_RADIUS_M)]
        radius: f64,

        /// List every station serving this line instead
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        line: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== Transit GeoJSON Consolidator ===");

    let config = load_config(args.config.as_deref(), &args.overrides)?;
    let consolidator = Consolidator::new(config).context("Invalid consolidation config")?;

    match args.command {
        Command::Stations { source, root, output } => {
            let files = match root {
                Some(root) => line_files(&root)?,
                None => source,
            };
            run_stations(&consolidator, &files, &output)
        }
        Command::Segments { input, output } => run_segments(&consolidator, &input, output.as_deref()),
        Command::Lines { root, output } => run_lines(&consolidator, &root, &output),
        Command::Locate {
            stations,
            lat,
            lon,
            radius,
            line,
        } => {
            let directory = load_directory(&stations)?;
            match (line, lat.zip(lon)) {
                (Some(line), _) => list_line(&directory, &LineIdentifier::new(line)),
                (None, Some((lat, lon))) => locate(&directory, lat, lon, radius),
                (None, None) => bail!("Either --line or both --lat and --lon are required"),
            }
        }
    }
}

fn read_source(file: &LineFile) -> Result<LineSource> {
    let decoded = read_collection(&file.path)?;
    Ok(LineSource::new(
        file.line.as_str(),
        file.category.clone(),
        decoded.into_collection(),
    ))
}

fn run_stations(consolidator: &Consolidator, files: &[LineFile], output: &Path) -> Result<()> {
    if files.is_empty() {
        bail!("No line files to read stops from");
    }

    log::info!("");
    log::info!("Phase 1: Reading {} line files...", files.len());
    let pb = file_progress(files.len());
    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        pb.set_message(format!("{} {}", file.category, file.line));
        sources.push(
            read_source(file)
                .with_context(|| format!("Failed to load {} line {}", file.category, file.line))?,
        );
        pb.inc(1);
    }
    pb.finish_and_clear();

    log::info!("");
    log::info!("Phase 2: Combining stations...");
    let report = consolidator.consolidate_stations(&sources);

    log::info!("");
    log::info!("Phase 3: Writing output...");
    write_collection(encode_stations(&report.stations), output)
        .context("Failed to write combined stations")?;

    log::info!("");
    log_station_summary(&report);
    log::info!("");
    log::info!("Output written to: {}", output.display());
    log::info!("Done!");

    Ok(())
}

/// Where the result for `file` goes: beside the input, or mirrored under
/// `output` relative to the input root.
fn segment_target(input: &Path, file: &Path, output: Option<&Path>) -> PathBuf {
    let Some(output) = output else {
        return file.to_path_buf();
    };

    let relative = file
        .strip_prefix(input)
        .ok()
        .filter(|r| !r.as_os_str().is_empty())
        .or_else(|| file.file_name().map(Path::new))
        .unwrap_or(file);

    output.join(relative)
}

fn run_segments(consolidator: &Consolidator, input: &Path, output: Option<&Path>) -> Result<()> {
    let files = geojson_files(input)?;
    if files.is_empty() {
        bail!("No GeoJSON files found in {}", input.display());
    }

    log::info!(
        "Segment radius: {}m",
        consolidator.config().segments.combination_radius_meters
    );
    log::info!("Found {} GeoJSON files to process", files.len());

    let mut stats = SegmentStats::default();
    let pb = file_progress(files.len());

    for file in &files {
        pb.set_message(file.display().to_string());
        log::info!("");
        log::info!("Processing: {}", file.display());

        let result = read_collection(file).and_then(|decoded| {
            // Rewriting would drop the features that could not be read
            if output.is_none() && !decoded.skipped.is_empty() {
                log::warn!("  Leaving {} untouched", file.display());
                stats.untouched_files += 1;
                return Ok(());
            }

            let report = consolidator.merge_collection(decoded.into_collection());
            stats.record(&report);

            if report.route_count == 0 && output.is_none() {
                return Ok(());
            }
            write_collection(report.collection, &segment_target(input, file, output))
        });

        if let Err(e) = result {
            log::error!("  {:#}", e);
            stats.failed_files += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    log::info!("");
    stats.log_summary();

    if stats.failed_files > 0 {
        bail!("{} of {} files could not be processed", stats.failed_files, files.len());
    }

    log::info!("Done!");
    Ok(())
}

fn run_lines(consolidator: &Consolidator, root: &Path, output: &Path) -> Result<()> {
    let files = line_files(root)?;

    log::info!("");
    log::info!("Phase 1: Reading {} line files...", files.len());
    let mut by_category: BTreeMap<Category, Vec<LineSource>> = BTreeMap::new();
    let pb = file_progress(files.len());
    for file in &files {
        pb.set_message(file.path.display().to_string());
        match read_source(file) {
            Ok(source) => by_category
                .entry(file.category.clone())
                .or_default()
                .push(source),
            Err(e) => log::error!("  Skipping {}: {:#}", file.path.display(), e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if by_category.is_empty() {
        bail!("No line files found under {}", root.display());
    }

    log::info!("");
    log::info!("Phase 2: Combining lines...");
    let mut all = Vec::new();
    for (category, sources) in &by_category {
        log::info!("Combining {} lines...", category);
        let combined = consolidator.combine_lines(sources);
        all.extend(combined.features.iter().cloned());

        let path = output.join(format!("combined_{}_lines.geojson", category.as_str()));
        write_collection(combined, &path)
            .with_context(|| format!("Failed to write {} lines", category))?;
    }

    let path = output.join("final_all_lines.geojson");
    write_collection(
        geojson::FeatureCollection {
            bbox: None,
            features: all,
            foreign_members: None,
        },
        &path,
    )
    .context("Failed to write combined lines")?;

    log::info!("");
    log::info!("Output written to: {}", output.display());
    log::info!("Done!");
    Ok(())
}

fn load_directory(stations: &Path) -> Result<StationDirectory> {
    let decoded = read_collection(stations)?;

    let mut combined = Vec::with_capacity(decoded.features.len());
    for (index, feature) in decoded.features.iter().enumerate() {
        match decode_station(feature, index) {
            Ok(station) => combined.push(station),
            Err(e) => log::warn!("  Skipping station #{}: {}", index, e),
        }
    }

    let directory = StationDirectory::new(combined);
    if directory.is_empty() {
        log::warn!("No stations in {}", stations.display());
    } else {
        log::info!(
            "Loaded {} stations ({} interchanges)",
            directory.len(),
            directory.interchanges().count()
        );
    }
    Ok(directory)
}

fn locate(directory: &StationDirectory, lat: f64, lon: f64, radius: f64) -> Result<()> {
    let point = GeoPoint::new(lat, lon).context("Invalid coordinate")?;

    match directory.find_near(point, radius) {
        Some(station) => println!("{}\t{}", station.name, station.lines_display()),
        None => println!("No station within {}m", radius),
    }

    Ok(())
}

fn list_line(directory: &StationDirectory, line: &LineIdentifier) -> Result<()> {
    let mut found = 0;
    for station in directory.serving(line) {
        println!("{}\t{}", station.name, station.lines_display());
        found += 1;
    }
    if found == 0 {
        println!("No station serves line {}", line);
    }
    Ok(())
}
