//! aflplot - renders afl-fuzz plot_data as time-series charts
//!
//! Reads the plot_data file an afl-fuzz instance writes (or an equivalent
//! CSV export), draws the pending-path and crash/hang counters as two fixed
//! 600x300 PNG charts plus one scalable dual-axis SVG chart, and can wrap
//! everything in a small HTML detail page.

mod charts;
mod data;
mod report;
mod stats;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use charts::{crashes_datasets, paths_datasets, CanvasChart, DualAxisChart, SvgContainer};
use data::SeriesLoader;
use stats::{load_snapshots, read_snapshot, summarize, SnapshotSummary};

#[derive(Parser, Debug)]
#[command(version, about = "Render afl-fuzz plot_data as time-series charts")]
struct Cli {
    /// plot_data file, CSV export, or afl-fuzz output directory
    input: PathBuf,

    /// Directory the charts are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Also write a details.html page embedding all charts
    #[arg(long)]
    report: bool,

    /// Print the loaded series and snapshot summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// fuzzer_stats file or sync directory for the summary; defaults to
    /// the file next to plot_data
    #[arg(long)]
    fuzzer_stats: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let plot_data = resolve_plot_data(&cli.input)?;
    info!("Loading series from {}", plot_data.display());
    let series = SeriesLoader::load(&plot_data)
        .with_context(|| format!("Failed to load {}", plot_data.display()))?;
    let labels = series.labels();
    info!(
        "{} samples from {} to {}",
        series.len(),
        labels.first().map(String::as_str).unwrap_or("-"),
        labels.last().map(String::as_str).unwrap_or("-")
    );

    let summary = snapshot_summary(cli, &plot_data);
    if let Some(summary) = &summary {
        info!("{}", summary);
    }

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("Failed to create {}", cli.out_dir.display()))?;

    // The two canvas charts are independent; render them in parallel
    let canvas = CanvasChart::new();
    let (paths_img, crashes_img) = rayon::join(
        || canvas.render(&labels, &paths_datasets(&series)),
        || canvas.render(&labels, &crashes_datasets(&series)),
    );

    let paths_path = cli.out_dir.join(report::PATHS_PNG);
    paths_img?
        .save(&paths_path)
        .with_context(|| format!("Failed to write {}", paths_path.display()))?;
    info!("Wrote {}", paths_path.display());

    let crashes_path = cli.out_dir.join(report::CRASHES_PNG);
    crashes_img?
        .save(&crashes_path)
        .with_context(|| format!("Failed to write {}", crashes_path.display()))?;
    info!("Wrote {}", crashes_path.display());

    let mut container = SvgContainer::new();
    DualAxisChart::new().render_into(&mut container, &series)?;
    let svg_path = cli.out_dir.join("graph.svg");
    fs::write(&svg_path, container.contents())
        .with_context(|| format!("Failed to write {}", svg_path.display()))?;
    info!("Wrote {}", svg_path.display());

    if cli.report {
        let title = summary
            .as_ref()
            .filter(|s| !s.afl_banner.is_empty())
            .map(|s| s.afl_banner.clone())
            .unwrap_or_else(|| "afl-fuzz".to_string());
        let html_path = cli.out_dir.join("details.html");
        let page = report::render_page(&title, summary.as_ref(), &container);
        fs::write(&html_path, page)
            .with_context(|| format!("Failed to write {}", html_path.display()))?;
        info!("Wrote {}", html_path.display());
    }

    if cli.json {
        let doc = serde_json::json!({
            "series": &series,
            "summary": &summary,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }

    Ok(())
}

/// Accept a direct file, a fuzzer instance directory, or a sync directory
/// holding exactly one instance.
fn resolve_plot_data(input: &Path) -> Result<PathBuf> {
    if input.is_file() {
        return Ok(input.to_path_buf());
    }
    if input.is_dir() {
        let direct = input.join("plot_data");
        if direct.is_file() {
            return Ok(direct);
        }
        let mut candidates = Vec::new();
        for entry in
            fs::read_dir(input).with_context(|| format!("Failed to read {}", input.display()))?
        {
            let path = entry?.path();
            if path.is_dir() && path.join("plot_data").is_file() {
                candidates.push(path.join("plot_data"));
            }
        }
        candidates.sort();
        return match candidates.len() {
            0 => bail!("No plot_data found under {}", input.display()),
            1 => Ok(candidates.remove(0)),
            _ => {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                bail!(
                    "{} holds several fuzzer instances, pass one of: {}",
                    input.display(),
                    names.join(", ")
                );
            }
        };
    }
    bail!("{} does not exist", input.display());
}

/// Summary from --fuzzer-stats (file or sync directory), or from the
/// fuzzer_stats file next to plot_data. A missing snapshot only logs.
fn snapshot_summary(cli: &Cli, plot_data: &Path) -> Option<SnapshotSummary> {
    let source = cli.fuzzer_stats.clone().or_else(|| {
        let sibling = plot_data.parent()?.join("fuzzer_stats");
        sibling.is_file().then_some(sibling)
    })?;

    let snapshots = if source.is_dir() {
        load_snapshots(&source)
    } else {
        read_snapshot(&source).map(|snapshot| vec![snapshot])
    };
    match snapshots {
        Ok(snapshots) => Some(summarize(&snapshots)),
        Err(err) => {
            warn!("{}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StatsSeries;
    use crate::stats::FuzzerSnapshot;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("aflplot-cli-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resolve_missing_input_fails() {
        let err = resolve_plot_data(Path::new("/nonexistent/aflplot-input")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_plot_data_inside_directory() {
        let dir = scratch_dir("direct");
        fs::write(dir.join("plot_data"), "").unwrap();
        let resolved = resolve_plot_data(&dir).unwrap();
        assert_eq!(resolved, dir.join("plot_data"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_resolve_single_sync_instance() {
        let dir = scratch_dir("one");
        fs::create_dir_all(dir.join("fuzzer00")).unwrap();
        fs::write(dir.join("fuzzer00").join("plot_data"), "").unwrap();
        let resolved = resolve_plot_data(&dir).unwrap();
        assert_eq!(resolved, dir.join("fuzzer00").join("plot_data"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_resolve_many_instances_lists_candidates() {
        let dir = scratch_dir("many");
        for name in ["fuzzer00", "fuzzer01"] {
            fs::create_dir_all(dir.join(name)).unwrap();
            fs::write(dir.join(name).join("plot_data"), "").unwrap();
        }
        let err = resolve_plot_data(&dir).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("several fuzzer instances"), "{}", message);
        assert!(message.contains("fuzzer00"), "{}", message);
        assert!(message.contains("fuzzer01"), "{}", message);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_dump_structure() {
        let mut series = StatsSeries::default();
        series.push_sample(1_700_000_000, Some(5.0), None, Some(1.0), Some(0.0));
        let summary = summarize(&[FuzzerSnapshot::parse("pending_total : 5\n")]);
        let doc = serde_json::json!({ "series": &series, "summary": &summary });
        let series_doc = &doc["series"];
        assert_eq!(series_doc["last_update"][0], 1_700_000_000_i64);
        assert_eq!(series_doc["pending_total"][0], 5.0);
        // A gap stays a JSON null, never a bridged number
        assert!(series_doc["pending_favs"][0].is_null());
        assert_eq!(doc["summary"]["pending_total"], 5.0);
        assert_eq!(doc["summary"]["fuzzers"], 1);
    }
}
