use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use gpx_prep::{parse_track, prepare_session, session_hull, Params, Point, PointHull};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const DELIMITER: u8 = b'^';
const TRACK_SUFFIXES: [&str; 2] = [".gpx", ".gpx.xml"];

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Ingest and transform GPX files where 1 session = 1 file.",
    long_about = None
)]
struct Cli {
    /// Directory containing the GPX files (searched recursively)
    #[arg(value_name = "IN", value_hint = ValueHint::DirPath)]
    input: PathBuf,

    /// Output file for the prepared data
    #[arg(value_name = "OUT", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Compute a hull for each session instead of the enriched points
    #[arg(long, action = ArgAction::SetTrue)]
    hull: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let params = Params::default();
    let files = discover_tracks(&cli.input)?;
    info!(
        "Found {} track files under {}",
        files.len(),
        cli.input.display()
    );

    let t_prepare = Instant::now();
    let sessions = prepare_sessions(&files, &params)?;
    info!(
        "Prepare stage: {:.1} ms ({} sessions)",
        t_prepare.elapsed().as_secs_f64() * 1000.0,
        sessions.len()
    );

    if cli.hull {
        let hulls: Vec<Vec<PointHull>> = sessions
            .par_iter()
            .zip(files.par_iter())
            .map(|(points, path)| {
                let hull = session_hull(points, &params);
                if hull.is_empty() {
                    warn!("No hull for {} ({} points)", path.display(), points.len());
                }
                hull
            })
            .collect();
        let rows = write_table(&cli.output, &PointHull::FIELDS, &hulls)?;
        info!("Wrote {} hull vertices: {}", rows, cli.output.display());
    } else {
        let rows = write_table(&cli.output, &Point::FIELDS, &sessions)?;
        info!("Wrote {} points: {}", rows, cli.output.display());
    }
    Ok(())
}

/// Track files below `root`, in a stable order.
fn discover_tracks(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to read directory {}", root.display()))?;
        if entry.file_type().is_file() && is_track_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_track_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| TRACK_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
        .unwrap_or(false)
}

/// Parse and prepare every session in parallel, keeping the file order.
fn prepare_sessions(files: &[PathBuf], params: &Params) -> Result<Vec<Vec<Point>>> {
    files
        .par_iter()
        .map(|path| -> Result<Vec<Point>> {
            let data =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let raw = parse_track(&data)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let raw_len = raw.len();
            let prepared = prepare_session(raw, params);
            debug!(
                "{}: {} raw points, {} after cleaning",
                path.display(),
                raw_len,
                prepared.len()
            );
            if prepared.len() < 2 {
                warn!(
                    "Degenerate session {} ({} points after cleaning)",
                    path.display(),
                    prepared.len()
                );
            }
            Ok(prepared)
        })
        .collect()
}

fn write_table<T: Serialize>(path: &Path, header: &[&str], sessions: &[Vec<T>]) -> Result<usize> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_rows(file, header, sessions)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Header first, then every session's rows back to back. The header is
/// written even when there are no rows.
fn write_rows<W: Write, T: Serialize>(
    out: W,
    header: &[&str],
    sessions: &[Vec<T>],
) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(out);
    writer.write_record(header)?;
    let mut rows = 0;
    for row in sessions.iter().flatten() {
        writer.serialize(row)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}
