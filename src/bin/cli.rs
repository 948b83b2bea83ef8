//! staymatch CLI - Debug tool for stationary/motion detection
//!
//! Usage:
//!   staymatch-cli replay <file> [--window <n>] [--count-based] [--delta <f>] [--eps <m>]
//!
//! Replays a recorded stream of fixes through a windowed clusterer and shows
//! every motion/stationary transition together with the place the stationary
//! episode was assigned to. Accepts a JSON array of timestamped fixes or a
//! GPX track (timed by its track point times, or spaced by `--interval`
//! seconds when the track has none).

use chrono::DateTime;
use clap::{Parser, Subcommand};
use gpx::{Gpx, Time, Waypoint, read};
use log::warn;
use serde::Deserialize;
use staymatch::{
    GpsObservation, GpsPoint, PlaceRegistry, PlaceRegistryConfig, Transition, WindowConfig,
    WindowedClusterer,
};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "staymatch-cli")]
#[command(about = "Debug tool for stationary/motion detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded stream through the clusterer
    Replay {
        /// JSON (`[{"timestamp", "latitude", "longitude"}]`) or GPX file
        file: PathBuf,

        /// Window length: seconds, or fixes with --count-based
        #[arg(short, long, default_value = "120")]
        window: u32,

        /// Use a fixed-size window instead of a time-based one
        #[arg(long)]
        count_based: bool,

        /// Distance matrix capacity (defaults to the window length)
        #[arg(long)]
        capacity: Option<usize>,

        /// Fraction of the window a fix needs as neighbors to be stationary
        #[arg(short, long, default_value = "0.5")]
        delta: f64,

        /// Neighbor radius in meters
        #[arg(short, long, default_value = "30")]
        eps: f64,

        /// Seconds between GPX track points that carry no time
        #[arg(long, default_value = "1")]
        interval: f64,

        /// Radius in meters for merging episodes into known places
        #[arg(long, default_value = "50")]
        merge_radius: f64,

        /// Write the final places as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// A timestamped fix as stored in JSON replay files.
#[derive(Deserialize)]
struct FixRecord {
    timestamp: f64,
    latitude: f64,
    longitude: f64,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            file,
            window,
            count_based,
            capacity,
            delta,
            eps,
            interval,
            merge_radius,
            output,
        } => {
            let config = if count_based {
                let mut config = WindowConfig::count_based(window, delta);
                if let Some(capacity) = capacity {
                    config.capacity = capacity;
                }
                config
            } else {
                WindowConfig::time_based(window, capacity.unwrap_or(window as usize), delta)
            };
            let registry = PlaceRegistry::new(PlaceRegistryConfig {
                merge_radius_meters: merge_radius,
            });

            if let Err(e) = run_replay(
                &file,
                config,
                registry,
                eps,
                interval,
                output.as_deref(),
                cli.verbose,
            ) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Load fixes from a JSON or GPX file.
fn load_fixes(path: &Path, interval: f64) -> Result<Vec<(f64, GpsPoint)>, String> {
    let is_gpx = path.extension().is_some_and(|ext| ext == "gpx");
    if is_gpx {
        return parse_gpx_file(path, interval);
    }

    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let records: Vec<FixRecord> = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    Ok(records
        .into_iter()
        .map(|r| (r.timestamp, GpsPoint::new(r.latitude, r.longitude)))
        .collect())
}

/// Parse a GPX file into timestamped fixes.
fn parse_gpx_file(path: &Path, interval: f64) -> Result<Vec<(f64, GpsPoint)>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);
    let gpx: Gpx = read(reader).map_err(|e| e.to_string())?;
    gpx_fixes(&gpx, interval)
}

/// Track points with their recorded times in epoch seconds. Falls back to
/// `interval` spacing when any point lacks a time.
fn gpx_fixes(gpx: &Gpx, interval: f64) -> Result<Vec<(f64, GpsPoint)>, String> {
    let waypoints: Vec<&Waypoint> = gpx
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
        .collect();

    if waypoints.is_empty() {
        return Err("No track points found".to_string());
    }

    let times: Option<Vec<f64>> = waypoints
        .iter()
        .map(|pt| pt.time.as_ref().and_then(epoch_seconds))
        .collect();
    let times = times.unwrap_or_else(|| {
        warn!(
            "track points without time, spacing fixes {}s apart",
            interval
        );
        (0..waypoints.len()).map(|i| i as f64 * interval).collect()
    });

    Ok(waypoints
        .iter()
        .zip(times)
        .map(|(pt, t)| {
            let p = pt.point();
            (t, GpsPoint::new(p.y(), p.x()))
        })
        .collect())
}

fn epoch_seconds(time: &Time) -> Option<f64> {
    let formatted = time.format().ok()?;
    let parsed = DateTime::parse_from_rfc3339(&formatted).ok()?;
    Some(parsed.timestamp_millis() as f64 / 1000.0)
}

/// Run the replay and print transitions.
fn run_replay(
    file: &Path,
    config: WindowConfig,
    registry: PlaceRegistry,
    eps: f64,
    interval: f64,
    output: Option<&Path>,
    verbose: bool,
) -> Result<(), String> {
    println!("\n{}", "=".repeat(60));
    println!("Replaying: {}", file.display());
    println!("{}", "=".repeat(60));

    let fixes = load_fixes(file, interval)?;
    println!("Loaded {} fixes", fixes.len());
    println!(
        "Window: {} {} (capacity {}), delta {}, eps {}m",
        config.window_length,
        if config.time_based_window { "s" } else { "fixes" },
        config.capacity,
        config.delta,
        eps
    );

    let mut clusterer = WindowedClusterer::new(config, registry).map_err(|e| e.to_string())?;
    let mut skipped = 0;
    let mut stops = 0;

    for (timestamp, point) in fixes {
        if !point.is_valid() {
            skipped += 1;
            continue;
        }

        let update = match clusterer.process(timestamp, GpsObservation::from_point(point, eps)) {
            Ok(update) => update,
            Err(e) => {
                eprintln!("  [ERR] t={}: {}", timestamp, e);
                skipped += 1;
                continue;
            }
        };

        if verbose {
            println!(
                "  t={:>10.1} pool={:>4} stationary={:>4} vote={:>5}",
                timestamp, update.pool_size, update.stationary_points, update.vote
            );
        }

        match update.transition {
            Some(Transition::Stopped) => {
                stops += 1;
                println!(
                    "  [STOP]   t={:.1} place={}",
                    timestamp,
                    update
                        .place_id
                        .map_or_else(|| "-".to_string(), |id| id.to_string())
                );
            }
            Some(Transition::Resumed) => println!("  [MOVE]   t={:.1}", timestamp),
            None => {}
        }
    }

    println!("\n{} stops, {} fixes skipped", stops, skipped);
    println!("\n{}", clusterer.cluster_status());

    if let Some(path) = output {
        let file = File::create(path).map_err(|e| e.to_string())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, clusterer.places().places())
            .map_err(|e| e.to_string())?;
        println!("Places written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpx_track(times: &[Option<&str>]) -> Gpx {
        let points: String = times
            .iter()
            .enumerate()
            .map(|(i, time)| {
                let time = time.map_or_else(String::new, |t| format!("<time>{}</time>", t));
                format!(
                    r#"<trkpt lat="{}" lon="8.55">{}</trkpt>"#,
                    47.37 + i as f64 * 1e-4,
                    time
                )
            })
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="staymatch" xmlns="http://www.topografix.com/GPX/1/1">
<trk><trkseg>{}</trkseg></trk>
</gpx>"#,
            points
        );
        read(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_gpx_uses_track_point_times() {
        let gpx = gpx_track(&[
            Some("2024-05-01T08:00:00Z"),
            Some("2024-05-01T08:00:05Z"),
            Some("2024-05-01T08:01:05Z"),
        ]);
        let fixes = gpx_fixes(&gpx, 1.0).unwrap();

        let start = DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z")
            .unwrap()
            .timestamp() as f64;
        let stamps: Vec<f64> = fixes.iter().map(|(t, _)| *t).collect();
        assert_eq!(stamps, vec![start, start + 5.0, start + 65.0]);
        assert!((fixes[1].1.latitude - 47.3701).abs() < 1e-9);
    }

    #[test]
    fn test_gpx_without_times_uses_interval() {
        let gpx = gpx_track(&[None, None, None]);
        let fixes = gpx_fixes(&gpx, 2.5).unwrap();
        let stamps: Vec<f64> = fixes.iter().map(|(t, _)| *t).collect();
        assert_eq!(stamps, vec![0.0, 2.5, 5.0]);
    }

    #[test]
    fn test_gpx_without_points_is_an_error() {
        assert!(gpx_fixes(&gpx_track(&[]), 1.0).is_err());
    }
}
