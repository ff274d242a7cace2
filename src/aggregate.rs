//! Per-file match aggregation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::scanner::{MatchEvent, MatchVisitor, ScanFlow};

/// Aggregated results for one scanned file.
///
/// Field names mirror the emitted alert schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanFindings {
    pub matched_rule: String,
    pub matched_rule_desc: String,
    pub matched_rule_author: String,
    pub attack_id: String,
    /// String identifier → occurrence count, from the most recent event only.
    pub strings_matched: BTreeMap<String, u64>,
}

/// Accumulates match events for a single file.
///
/// When several rules match the same file, the last event wins outright:
/// metadata and string counts are overwritten per event, never merged.
/// Downstream alert consumers depend on that shape, so it stays as is.
///
/// One instance per file — the orchestrator constructs a fresh aggregator
/// before each scan so nothing leaks across files.
#[derive(Debug, Default)]
pub struct MatchAggregator {
    findings: Option<ScanFindings>,
}

impl MatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The aggregated findings, or `None` when nothing matched.
    pub fn into_findings(self) -> Option<ScanFindings> {
        self.findings
    }
}

impl MatchVisitor for MatchAggregator {
    fn on_match(&mut self, event: MatchEvent) -> ScanFlow {
        let mut strings_matched = BTreeMap::new();
        for identifier in &event.strings {
            *strings_matched.entry(identifier.clone()).or_insert(0) += 1;
        }
        self.findings = Some(ScanFindings {
            matched_rule: event.rule,
            matched_rule_desc: event.description,
            matched_rule_author: event.author,
            attack_id: event.attack_id,
            strings_matched,
        });
        ScanFlow::Continue
    }
}
