//! YaraSentry — batch YARA scanner with structured alerting.
//!
//! Compiles a directory of YARA rule files once, scans every file in a
//! target directory against the compiled set, and emits one JSON alert per
//! matching file. Built to run once per invocation, e.g. inside a container
//! with the rule and target directories mounted as volumes.
//!
//! # Quick Start
//!
//! ```no_run
//! use yarasentry::alert::ConsoleSink;
//! use yarasentry::{run, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let mut sink = ConsoleSink;
//! let summary = run(&options, &mut sink).unwrap();
//! println!("Scanned: {}, alerts: {}", summary.files_scanned, summary.alerts_sent);
//! ```

pub mod aggregate;
pub mod alert;
pub mod config;
pub mod error;
pub mod rules;
pub mod scanner;

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, info};

use aggregate::MatchAggregator;
use alert::{AlertBuilder, AlertSink};
use config::Config;
use error::{Result, SentryError};
use scanner::Scanner;

/// Options for a scan run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory of YARA rule source files.
    pub rules_dir: PathBuf,
    /// Directory of files to scan.
    pub scan_dir: PathBuf,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Config::default().into()
    }
}

impl From<Config> for ScanOptions {
    fn from(config: Config) -> Self {
        Self {
            rules_dir: config.rules_dir,
            scan_dir: config.scan_dir,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub alerts_sent: usize,
}

/// Run a complete scan: compile rules once, then scan every file in the
/// target directory, alerting on each one with matches.
///
/// Fails fast — any compilation, listing, or scan error aborts the whole
/// run. Alerts already sent are not rolled back, and no alert is ever
/// emitted for a file whose scan failed.
pub fn run(options: &ScanOptions, sink: &mut dyn AlertSink) -> Result<RunSummary> {
    let rules = rules::compile_rules(&options.rules_dir)?;
    let scanner = Scanner::new(rules);

    let entries = fs::read_dir(&options.scan_dir)
        .map_err(|_| SentryError::DirectoryNotFound(options.scan_dir.clone()))?;

    let mut builder = AlertBuilder::new(sink);
    let mut summary = RunSummary {
        files_scanned: 0,
        alerts_sent: 0,
    };

    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            debug!("skipping non-file entry: {}", entry.path().display());
            continue;
        }

        // Fresh accumulator per file so no match state leaks across scans.
        let mut aggregator = MatchAggregator::new();
        scanner.scan_file(&entry.path(), &mut aggregator)?;
        summary.files_scanned += 1;

        if let Some(findings) = aggregator.into_findings() {
            let filename = entry.file_name().to_string_lossy().into_owned();
            builder.build_and_send(Local::now(), &filename, findings)?;
            summary.alerts_sent += 1;
        }
    }

    info!(
        "run complete: {} file(s) scanned, {} alert(s) sent",
        summary.files_scanned, summary.alerts_sent
    );
    Ok(summary)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use alert::Alert;
    use pretty_assertions::assert_eq;

    const MARKER_RULE: &str = r#"
rule evil_marker {
    meta:
        description = "Detects the evil marker"
        author = "unit tests"
        attack_id = "T1059"
    strings:
        $s1 = "evil"
        $s2 = "payload"
    condition:
        $s1 or $s2
}
"#;

    const PAIR_RULES: &str = r#"
rule first_rule {
    meta:
        description = "First of two"
        author = "unit tests"
        attack_id = "T1001"
    strings:
        $a = "alpha"
    condition:
        $a
}

rule second_rule {
    meta:
        description = "Second of two"
        author = "unit tests"
        attack_id = "T1002"
    strings:
        $b = "beta"
    condition:
        $b
}
"#;

    #[derive(Default)]
    struct CollectingSink {
        alerts: Vec<Alert>,
    }

    impl AlertSink for CollectingSink {
        fn send(&mut self, alert: &Alert) -> Result<()> {
            self.alerts.push(alert.clone());
            Ok(())
        }
    }

    struct Fixture {
        _rules_dir: tempfile::TempDir,
        _scan_dir: tempfile::TempDir,
        options: ScanOptions,
    }

    fn fixture(rule_files: &[(&str, &str)], scan_files: &[(&str, &str)]) -> Fixture {
        let rules_dir = tempfile::tempdir().unwrap();
        let scan_dir = tempfile::tempdir().unwrap();
        for (name, source) in rule_files {
            fs::write(rules_dir.path().join(name), source).unwrap();
        }
        for (name, content) in scan_files {
            fs::write(scan_dir.path().join(name), content).unwrap();
        }
        let options = ScanOptions {
            rules_dir: rules_dir.path().to_path_buf(),
            scan_dir: scan_dir.path().to_path_buf(),
        };
        Fixture {
            _rules_dir: rules_dir,
            _scan_dir: scan_dir,
            options,
        }
    }

    #[test]
    fn missing_rules_directory_aborts_before_scanning() {
        let scan_dir = tempfile::tempdir().unwrap();
        let options = ScanOptions {
            rules_dir: PathBuf::from("/no/such/rules"),
            scan_dir: scan_dir.path().to_path_buf(),
        };
        let mut sink = CollectingSink::default();
        let err = run(&options, &mut sink).unwrap_err();
        assert!(matches!(err, SentryError::DirectoryNotFound(_)));
        assert!(sink.alerts.is_empty());
    }

    #[test]
    fn missing_scan_directory_aborts_after_compilation() {
        let rules_dir = tempfile::tempdir().unwrap();
        fs::write(rules_dir.path().join("marker.yar"), MARKER_RULE).unwrap();
        let options = ScanOptions {
            rules_dir: rules_dir.path().to_path_buf(),
            scan_dir: PathBuf::from("/no/such/scan_files"),
        };
        let mut sink = CollectingSink::default();
        let err = run(&options, &mut sink).unwrap_err();
        assert!(matches!(err, SentryError::DirectoryNotFound(_)));
    }

    #[test]
    fn broken_rule_file_aborts_the_run() {
        let f = fixture(
            &[("broken.yar", "rule { nope }")],
            &[("target.bin", "anything")],
        );
        let mut sink = CollectingSink::default();
        let err = run(&f.options, &mut sink).unwrap_err();
        assert!(matches!(err, SentryError::Compilation { .. }));
        assert!(sink.alerts.is_empty());
    }

    #[test]
    fn non_matching_file_produces_no_alert() {
        let f = fixture(
            &[("marker.yar", MARKER_RULE)],
            &[("clean.txt", "nothing interesting here")],
        );
        let mut sink = CollectingSink::default();
        let summary = run(&f.options, &mut sink).unwrap();
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.alerts_sent, 0);
        assert!(sink.alerts.is_empty());
    }

    #[test]
    fn single_match_alert_carries_metadata_and_string_counts() {
        let f = fixture(
            &[("marker.yar", MARKER_RULE)],
            &[("dropper.bin", "evil bytes, twice evil, one payload")],
        );
        let mut sink = CollectingSink::default();
        let summary = run(&f.options, &mut sink).unwrap();

        assert_eq!(summary.alerts_sent, 1);
        let alert = &sink.alerts[0];
        assert_eq!(alert.filename, "dropper.bin");

        let results = &alert.yara_scan_results;
        assert_eq!(results.matched_rule, "evil_marker");
        assert_eq!(results.matched_rule_desc, "Detects the evil marker");
        assert_eq!(results.matched_rule_author, "unit tests");
        assert_eq!(results.attack_id, "T1059");
        assert_eq!(results.strings_matched["$s1"], 2);
        assert_eq!(results.strings_matched["$s2"], 1);
        assert_eq!(results.strings_matched.len(), 2);
    }

    #[test]
    fn two_matching_rules_yield_one_alert_with_last_match_only() {
        let f = fixture(
            &[("pair.yar", PAIR_RULES)],
            &[("both.bin", "alpha then beta")],
        );
        let mut sink = CollectingSink::default();
        let summary = run(&f.options, &mut sink).unwrap();

        // One alert per file, holding only the later rule's data.
        assert_eq!(summary.alerts_sent, 1);
        let results = &sink.alerts[0].yara_scan_results;
        assert_eq!(results.matched_rule, "second_rule");
        assert_eq!(results.matched_rule_desc, "Second of two");
        assert_eq!(results.attack_id, "T1002");
        assert_eq!(results.strings_matched.len(), 1);
        assert_eq!(results.strings_matched["$b"], 1);
        assert!(!results.strings_matched.contains_key("$a"));
    }

    #[test]
    fn match_state_does_not_leak_into_the_next_file() {
        let f = fixture(
            &[("marker.yar", MARKER_RULE)],
            &[
                ("a_hit.bin", "evil contents"),
                ("b_clean.txt", "harmless contents"),
            ],
        );
        let mut sink = CollectingSink::default();
        let summary = run(&f.options, &mut sink).unwrap();

        assert_eq!(summary.files_scanned, 2);
        assert_eq!(summary.alerts_sent, 1);
        assert_eq!(sink.alerts[0].filename, "a_hit.bin");
    }

    #[test]
    fn alerts_for_each_matching_file_in_the_directory() {
        let f = fixture(
            &[("marker.yar", MARKER_RULE)],
            &[
                ("one.bin", "evil"),
                ("two.bin", "payload"),
                ("three.txt", "clean"),
            ],
        );
        let mut sink = CollectingSink::default();
        let summary = run(&f.options, &mut sink).unwrap();

        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.alerts_sent, 2);
        let mut alerted: Vec<&str> = sink.alerts.iter().map(|a| a.filename.as_str()).collect();
        alerted.sort_unstable();
        assert_eq!(alerted, vec!["one.bin", "two.bin"]);
    }

    #[test]
    fn same_rule_name_across_files_stays_namespaced() {
        let dup_a = r#"rule dup { strings: $a = "alpha" condition: $a }"#;
        let dup_b = r#"rule dup { strings: $b = "beta" condition: $b }"#;
        let f = fixture(
            &[("a.yar", dup_a), ("b.yar", dup_b)],
            &[("target.bin", "alpha only")],
        );
        let mut sink = CollectingSink::default();
        let summary = run(&f.options, &mut sink).unwrap();

        assert_eq!(summary.alerts_sent, 1);
        let results = &sink.alerts[0].yara_scan_results;
        assert_eq!(results.matched_rule, "dup");
        assert_eq!(results.strings_matched["$a"], 1);
    }

    #[test]
    fn subdirectories_in_the_scan_directory_are_skipped() {
        let f = fixture(&[("marker.yar", MARKER_RULE)], &[("hit.bin", "evil")]);
        fs::create_dir(f.options.scan_dir.join("nested")).unwrap();

        let mut sink = CollectingSink::default();
        let summary = run(&f.options, &mut sink).unwrap();
        assert_eq!(summary.files_scanned, 1);
        assert_eq!(summary.alerts_sent, 1);
    }
}
