//! Extraction rules used by the compiler.
//!
//! Each rule is a pure function over the bounded note window, oldest first.
//! All truncation counts Unicode scalar values.

use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::sync::OnceLock;

/// Markers that introduce a next step, matched case-insensitively.
pub const NEXT_STEP_MARKERS: [&str; 4] = ["next:", "todo:", "next ", "todo "];
/// Candidates after which no further (older) message is scanned.
pub const NEXT_STEP_SCAN_LIMIT: usize = 20;
pub const MAX_NEXT_STEPS: usize = 10;
pub const MAX_CONSTRAINTS: usize = 8;
pub const MAX_RISKS: usize = 5;
pub const RISK_KEYWORDS: [&str; 5] = ["risk", "problem", "blocked", "warning", "concern"];
pub const RISK_MAX_CHARS: usize = 120;
pub const CONTEXT_MAX_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

fn marker_patterns() -> &'static Vec<(&'static str, Regex)> {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        NEXT_STEP_MARKERS
            .iter()
            .filter_map(|marker| {
                let pattern = format!(r"(?i)^.*{}\s*:?\s*", regex::escape(marker));
                Regex::new(&pattern).ok().map(|re| (*marker, re))
            })
            .collect()
    })
}

fn ordered_item() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\s").ok()).as_ref()
}

fn bullet_prefix() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:-\s*|\d+\.\s*)").ok())
        .as_ref()
}

fn constraint_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"\$\d+",
            r"₪\d+",
            r"(?i)\d+\s*(?:days?|hours?|weeks?|months?)",
            r"(?i)budget\s*:?\s*\S+",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

fn budget_word() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bbudget\b").ok()).as_ref()
}

/// Keeps at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Truncates to `max` characters, ending with an ellipsis when cut.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.chars().count());
    format!("{}{}", truncate_chars(s, keep), ELLIPSIS)
}

/// Extracts the next-step text from a single trimmed line, if it is one.
///
/// Marker lines win over bullet lines; a line yields at most one candidate.
pub fn next_step_from_line(line: &str) -> Option<String> {
    let lower = line.to_lowercase();

    for (marker, re) in marker_patterns() {
        if lower.starts_with(marker) || lower.contains(&format!(" {}", marker)) {
            let rest = re.replace(line, "").trim().to_string();
            return if rest.is_empty() { None } else { Some(rest) };
        }
    }

    if lower.starts_with("- ") || ordered_item().is_some_and(|re| re.is_match(line)) {
        let rest = match bullet_prefix() {
            Some(re) => re.replace(line, "").trim().to_string(),
            None => line.trim_start_matches('-').trim().to_string(),
        };
        if !rest.is_empty() {
            return Some(rest);
        }
    }

    None
}

/// Next steps across the window.
///
/// Messages are scanned newest first and every new candidate goes to the
/// front, so older messages come first and a message's later lines precede
/// its earlier ones. The newest duplicate wins. The scan limit is checked
/// between messages only, so a message is never cut partway.
pub fn extract_next_steps(texts: &[&str]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: VecDeque<String> = VecDeque::new();

    for text in texts.iter().rev() {
        if out.len() >= NEXT_STEP_SCAN_LIMIT {
            break;
        }
        for line in text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(step) = next_step_from_line(line) {
                if seen.insert(step.clone()) {
                    out.push_front(step);
                }
            }
        }
    }

    out.into_iter().take(MAX_NEXT_STEPS).collect()
}

/// Money amounts, durations and budget phrases.
pub fn extract_constraints(texts: &[&str]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for text in texts {
        for re in constraint_patterns() {
            if let Some(m) = re.find(text) {
                let found = m.as_str().trim();
                if !found.is_empty() && seen.insert(found.to_string()) {
                    out.push(found.to_string());
                }
            }
        }

        if let Some(m) = budget_word().and_then(|re| re.find(text)) {
            let tail = text.get(m.start()..).unwrap_or_default();
            let snippet = tail.split(['.', '\n']).next().unwrap_or_default().trim();
            if !snippet.is_empty() && seen.insert(snippet.to_string()) {
                out.push(snippet.to_string());
            }
        }
    }

    out.truncate(MAX_CONSTRAINTS);
    out
}

/// First sentence per message mentioning a risk keyword.
pub fn extract_risks(texts: &[&str]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for text in texts {
        let lower = text.to_lowercase();
        let Some(keyword) = RISK_KEYWORDS.iter().find(|kw| lower.contains(*kw)) else {
            continue;
        };
        let sentence = text
            .split(['.', '\n'])
            .find(|s| s.to_lowercase().contains(keyword))
            .map(str::trim);
        if let Some(sentence) = sentence.filter(|s| !s.is_empty()) {
            let risk = truncate_chars(sentence, RISK_MAX_CHARS);
            if seen.insert(risk.clone()) {
                out.push(risk);
            }
        }
    }

    out.truncate(MAX_RISKS);
    out
}

/// The window's notes joined into one whitespace-collapsed paragraph.
pub fn build_context(texts: &[&str]) -> String {
    let parts: Vec<&str> = texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    let joined = parts.join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_with_ellipsis(&collapsed, CONTEXT_MAX_CHARS)
}

#[cfg(test)]
#[path = "tests/rules_tests.rs"]
mod tests;
