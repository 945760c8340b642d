//! Fuzzer Snapshot Module
//! Parses `fuzzer_stats` files and aggregates them across instances.

use log::warn;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No fuzzer_stats found under {}", .0.display())]
    NotFound(PathBuf),
}

/// One parsed `fuzzer_stats` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FuzzerSnapshot {
    /// Whether the fuzzer process behind `fuzzer_pid` still exists.
    pub alive: bool,
    pub execs_done: f64,
    pub execs_per_sec: f64,
    pub paths_total: f64,
    pub paths_favored: f64,
    pub pending_favs: f64,
    pub pending_total: f64,
    pub unique_crashes: f64,
    pub unique_hangs: f64,
    pub afl_banner: String,
}

impl FuzzerSnapshot {
    /// Parse the `key : value` lines of a fuzzer_stats file.
    ///
    /// Unknown keys and malformed lines are ignored; numeric values that do
    /// not parse count as zero.
    pub fn parse(text: &str) -> Self {
        let mut snapshot = Self::default();
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "fuzzer_pid" => {
                    snapshot.alive = value.parse::<i32>().map(pid_alive).unwrap_or(false);
                }
                "execs_done" => snapshot.execs_done = parse_number(value),
                "execs_per_sec" => snapshot.execs_per_sec = parse_number(value),
                "paths_total" => snapshot.paths_total = parse_number(value),
                "paths_favored" => snapshot.paths_favored = parse_number(value),
                "pending_favs" => snapshot.pending_favs = parse_number(value),
                "pending_total" => snapshot.pending_total = parse_number(value),
                "unique_crashes" => snapshot.unique_crashes = parse_number(value),
                "unique_hangs" => snapshot.unique_hangs = parse_number(value),
                "afl_banner" => snapshot.afl_banner = value.to_string(),
                _ => {}
            }
        }
        snapshot
    }
}

/// Read and parse one fuzzer_stats file.
pub fn read_snapshot(path: &Path) -> Result<FuzzerSnapshot, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FuzzerSnapshot::parse(&text))
}

/// Load the snapshots of a fuzzing job: `dir/fuzzer_stats` for a single
/// instance, otherwise every `dir/*/fuzzer_stats` of a sync directory.
/// Instances without a stats file are skipped with a warning.
pub fn load_snapshots(dir: &Path) -> Result<Vec<FuzzerSnapshot>, SnapshotError> {
    let single = dir.join("fuzzer_stats");
    if single.is_file() {
        return Ok(vec![read_snapshot(&single)?]);
    }

    let entries = fs::read_dir(dir).map_err(|source| SnapshotError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut instances: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SnapshotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            instances.push(path);
        }
    }
    instances.sort();

    let mut snapshots = Vec::new();
    for instance in instances {
        let stats_file = instance.join("fuzzer_stats");
        if stats_file.is_file() {
            snapshots.push(read_snapshot(&stats_file)?);
        } else {
            warn!("No fuzzer_stats in {}", instance.display());
        }
    }

    if snapshots.is_empty() {
        return Err(SnapshotError::NotFound(dir.to_path_buf()));
    }
    Ok(snapshots)
}

/// Field-wise sums across fuzzer instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub fuzzers: usize,
    pub alive: usize,
    pub execs_done: f64,
    pub execs_per_sec: f64,
    pub paths_total: f64,
    pub paths_favored: f64,
    pub pending_favs: f64,
    pub pending_total: f64,
    pub unique_crashes: f64,
    pub unique_hangs: f64,
    pub afl_banner: String,
}

/// Sum the snapshots; the banner comes from the last instance providing one.
pub fn summarize(snapshots: &[FuzzerSnapshot]) -> SnapshotSummary {
    let mut summary = SnapshotSummary {
        fuzzers: snapshots.len(),
        ..Default::default()
    };
    for snapshot in snapshots {
        if snapshot.alive {
            summary.alive += 1;
        }
        summary.execs_done += snapshot.execs_done;
        summary.execs_per_sec += snapshot.execs_per_sec;
        summary.paths_total += snapshot.paths_total;
        summary.paths_favored += snapshot.paths_favored;
        summary.pending_favs += snapshot.pending_favs;
        summary.pending_total += snapshot.pending_total;
        summary.unique_crashes += snapshot.unique_crashes;
        summary.unique_hangs += snapshot.unique_hangs;
        if !snapshot.afl_banner.is_empty() {
            summary.afl_banner = snapshot.afl_banner.clone();
        }
    }
    summary
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] alive: {}/{}, execs: {:.2}m, speed: {:.1}/s, pending: {:.0}/{:.0}, crashes: {:.0}, hangs: {:.0}",
            self.afl_banner,
            self.alive,
            self.fuzzers,
            self.execs_done / 1_000_000.0,
            self.execs_per_sec,
            self.pending_total,
            self.pending_favs,
            self.unique_crashes,
            self.unique_hangs
        )
    }
}

/// Parse a stats value, tolerating the `%` suffix some fields carry.
fn parse_number(value: &str) -> f64 {
    value.trim_end_matches('%').parse().unwrap_or(0.0)
}

/// Probe whether a process with this pid exists (procfs based).
#[cfg(target_os = "linux")]
fn pid_alive(pid: i32) -> bool {
    pid > 0 && Path::new("/proc").join(pid.to_string()).is_dir()
}

#[cfg(not(target_os = "linux"))]
fn pid_alive(pid: i32) -> bool {
    let _ = pid;
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUZZER_STATS: &str = "\
start_time        : 1699990000
last_update       : 1700000120
fuzzer_pid        : 0
cycles_done       : 1
execs_done        : 372033733
execs_per_sec     : 1546.82
paths_total       : 135
paths_favored     : 17
pending_favs      : 5
pending_total     : 95
stability         : 100.00%
bitmap_cvg        : 18.40%
unique_crashes    : 1
unique_hangs      : 2
afl_banner        : target_000
afl_version       : 2.52b
command_line      : afl-fuzz -i input -o output -- ./target @@
";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("aflplot-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_snapshot_fields() {
        let snapshot = FuzzerSnapshot::parse(FUZZER_STATS);
        assert_eq!(snapshot.execs_done, 372_033_733.0);
        assert_eq!(snapshot.execs_per_sec, 1546.82);
        assert_eq!(snapshot.paths_total, 135.0);
        assert_eq!(snapshot.paths_favored, 17.0);
        assert_eq!(snapshot.pending_favs, 5.0);
        assert_eq!(snapshot.pending_total, 95.0);
        assert_eq!(snapshot.unique_crashes, 1.0);
        assert_eq!(snapshot.unique_hangs, 2.0);
        assert_eq!(snapshot.afl_banner, "target_000");
        assert!(!snapshot.alive);
    }

    #[test]
    fn test_parse_ignores_unknown_lines() {
        let snapshot = FuzzerSnapshot::parse("not a stats line\nweird_key : 7\n");
        assert_eq!(snapshot, FuzzerSnapshot::default());
    }

    #[test]
    fn test_parse_number_tolerates_percent() {
        assert_eq!(parse_number("18.40%"), 18.4);
        assert_eq!(parse_number("1546.82"), 1546.82);
        assert_eq!(parse_number("garbage"), 0.0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_parse_detects_own_pid_alive() {
        let text = format!("fuzzer_pid : {}\n", std::process::id());
        let snapshot = FuzzerSnapshot::parse(&text);
        assert!(snapshot.alive);
    }

    #[test]
    fn test_summarize_sums_fields() {
        let mut a = FuzzerSnapshot::parse(FUZZER_STATS);
        a.alive = true;
        let b = FuzzerSnapshot::parse(FUZZER_STATS);
        let summary = summarize(&[a, b]);
        assert_eq!(summary.fuzzers, 2);
        assert_eq!(summary.alive, 1);
        assert_eq!(summary.execs_done, 2.0 * 372_033_733.0);
        assert_eq!(summary.pending_total, 190.0);
        assert_eq!(summary.afl_banner, "target_000");
    }

    #[test]
    fn test_summary_display_line() {
        let summary = summarize(&[FuzzerSnapshot::parse(FUZZER_STATS)]);
        let line = summary.to_string();
        assert!(line.starts_with("[target_000]"), "{}", line);
        assert!(line.contains("alive: 0/1"), "{}", line);
        assert!(line.contains("pending: 95/5"), "{}", line);
    }

    #[test]
    fn test_load_snapshots_single_instance() {
        let dir = scratch_dir("single");
        fs::write(dir.join("fuzzer_stats"), FUZZER_STATS).unwrap();
        let snapshots = load_snapshots(&dir).unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].afl_banner, "target_000");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_snapshots_sync_dir_skips_missing() {
        let dir = scratch_dir("sync");
        for name in ["fuzzer00", "fuzzer01", "fuzzer02"] {
            fs::create_dir_all(dir.join(name)).unwrap();
        }
        // fuzzer01 never wrote a stats file
        fs::write(dir.join("fuzzer00").join("fuzzer_stats"), FUZZER_STATS).unwrap();
        fs::write(dir.join("fuzzer02").join("fuzzer_stats"), FUZZER_STATS).unwrap();
        let snapshots = load_snapshots(&dir).unwrap();
        assert_eq!(snapshots.len(), 2);
        let summary = summarize(&snapshots);
        assert_eq!(summary.fuzzers, 2);
        assert_eq!(summary.pending_total, 190.0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_snapshots_empty_dir_errors() {
        let dir = scratch_dir("none");
        let err = load_snapshots(&dir).unwrap_err();
        assert!(matches!(err, SnapshotError::NotFound(_)));
        fs::remove_dir_all(&dir).unwrap();
    }
}
