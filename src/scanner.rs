//! Per-file scanning and the match-visitor protocol.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use yara_x::{MetaValue, Rules, Scanner as YaraScanner};

use crate::error::{Result, SentryError};

/// One rule's match against one file.
///
/// Ephemeral — built per matching rule during a single scan call and handed
/// straight to the visitor.
#[derive(Debug, Clone)]
pub struct MatchEvent {
    /// Rule identifier.
    pub rule: String,
    /// `description` metadata, empty when the rule omits it.
    pub description: String,
    /// `author` metadata, empty when the rule omits it.
    pub author: String,
    /// `attack_id` metadata, empty when the rule omits it.
    pub attack_id: String,
    /// Matched string identifiers, one entry per occurrence (duplicates
    /// allowed), in pattern declaration order.
    pub strings: Vec<String>,
}

/// Whether the scanner keeps delivering matches after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFlow {
    Continue,
    Stop,
}

/// A consumer of match events, invoked once per matching rule.
pub trait MatchVisitor {
    fn on_match(&mut self, event: MatchEvent) -> ScanFlow;
}

/// Runs a compiled rule set against individual files.
pub struct Scanner {
    rules: Rules,
}

impl Scanner {
    pub fn new(rules: Rules) -> Self {
        Self { rules }
    }

    /// Scan one file, feeding every matching rule to `visitor`.
    ///
    /// Evaluation does not short-circuit: a file can accumulate events from
    /// several distinct rules in one call, unless the visitor answers
    /// [`ScanFlow::Stop`]. Zero matches is success with the visitor never
    /// invoked.
    pub fn scan_file(&self, path: &Path, visitor: &mut dyn MatchVisitor) -> Result<()> {
        let contents = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SentryError::FileNotFound(path.to_path_buf())
            } else {
                SentryError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let mut engine = YaraScanner::new(&self.rules);
        let results = engine.scan(&contents).map_err(|e| {
            warn!("scan failed for {}: {}", path.display(), e);
            SentryError::Scan {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        for rule in results.matching_rules() {
            let event = Self::event_for(&rule);
            debug!(
                "rule {} matched {} ({} string occurrence(s))",
                event.rule,
                path.display(),
                event.strings.len()
            );
            if visitor.on_match(event) == ScanFlow::Stop {
                break;
            }
        }
        Ok(())
    }

    fn event_for(rule: &yara_x::Rule) -> MatchEvent {
        let mut strings = Vec::new();
        for pattern in rule.patterns() {
            for _ in pattern.matches() {
                strings.push(pattern.identifier().to_string());
            }
        }
        MatchEvent {
            rule: rule.identifier().to_string(),
            description: Self::meta_string(rule, "description").unwrap_or_default(),
            author: Self::meta_string(rule, "author").unwrap_or_default(),
            attack_id: Self::meta_string(rule, "attack_id").unwrap_or_default(),
            strings,
        }
    }

    fn meta_string(rule: &yara_x::Rule, key: &str) -> Option<String> {
        for (name, value) in rule.metadata() {
            if name == key {
                if let MetaValue::String(s) = value {
                    return Some(s.to_string());
                }
            }
        }
        None
    }
}
