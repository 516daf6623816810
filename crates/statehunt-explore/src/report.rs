//! Format session reports for human consumption.

use crate::catalog::BugRecord;
use crate::explorer::StopReason;
use crate::fuzz::FuzzReport;
use crate::session::SessionReport;
use std::fmt::Display;

/// Format a session report for human consumption.
pub fn format_report<S: Display>(report: &SessionReport<S>) -> String {
    let mut output = String::new();
    let exploration = &report.exploration;

    output.push_str("═══════════════════════════════════════════════════════════════════════\n");
    output.push_str("  statehunt Session Report\n");
    output.push_str("═══════════════════════════════════════════════════════════════════════\n\n");

    output.push_str(&format!(
        "States visited:         {}\n",
        exploration.states_visited
    ));
    output.push_str(&format!(
        "Histories expanded:     {}\n",
        exploration.stats.histories_expanded
    ));
    output.push_str(&format!("Unique bugs:            {}\n", report.unique_bugs()));
    let stop = match exploration.stop_reason {
        StopReason::FrontierExhausted => "frontier exhausted",
        StopReason::StateCapReached => "state cap reached",
    };
    output.push_str(&format!("Stopped because:        {}\n", stop));
    output.push('\n');

    output.push_str("─── Search Statistics ─────────────────────────────────────────────────\n");
    let stats = &exploration.stats;
    output.push_str(&format!("Steps executed:         {}\n", stats.steps_executed));
    output.push_str(&format!("Successors added:       {}\n", stats.successors_added));
    output.push_str(&format!("Duplicate states:       {}\n", stats.duplicates));
    output.push_str(&format!(
        "Deepest expansion:      {}\n",
        stats.deepest_expanded
    ));
    if stats.skipped_too_deep > 0 {
        output.push_str(&format!(
            "Skipped (depth cap):    {}\n",
            stats.skipped_too_deep
        ));
    }
    if stats.refused_at_cap > 0 {
        output.push_str(&format!(
            "Refused (state cap):    {}\n",
            stats.refused_at_cap
        ));
    }
    if stats.diverged > 0 {
        output.push_str(&format!("Diverged branches:      {}\n", stats.diverged));
    }
    if exploration.frontier_remaining > 0 {
        output.push_str(&format!(
            "Left in frontier:       {}\n",
            exploration.frontier_remaining
        ));
    }
    output.push('\n');

    output.push_str("─── Random Walk ───────────────────────────────────────────────────────\n");
    match (&report.fuzz, &report.fuzz_error) {
        (Some(fuzz), _) => output.push_str(&format_fuzz(fuzz)),
        (None, error) => output.push_str(&format!(
            "Aborted:                {}\n",
            error.as_deref().unwrap_or("unknown error")
        )),
    }
    output.push('\n');

    output.push_str("─── Properties ────────────────────────────────────────────────────────\n");
    for property in &report.properties {
        let mark = if property.passed { "PASS" } else { "FAIL" };
        output.push_str(&format!(
            "[{}] {:<16} {}\n",
            mark, property.name, property.detail
        ));
    }
    output.push('\n');

    if !exploration.bugs.is_empty() {
        output
            .push_str("─── Bugs Found ─────────────────────────────────────────────────────────\n");
        for (i, bug) in exploration.bugs.iter().enumerate() {
            output.push_str(&format!("\n{}. Bug #{}\n", i + 1, bug.bug_id));
            output.push_str(&format_bug(bug));
        }
        output.push('\n');
    } else {
        output
            .push_str("─── No Bugs Found ──────────────────────────────────────────────────────\n");
        output.push_str("No target failures reached within the configured limits.\n\n");
    }

    output.push_str("═══════════════════════════════════════════════════════════════════════\n");

    output
}

/// Format a bug record with its crash path.
pub fn format_bug<S: Display>(bug: &BugRecord<S>) -> String {
    let mut output = String::new();

    output.push_str(&format!("   Failure:      {}\n", bug.message));
    output.push_str(&format!("   Depth:        {}\n", bug.depth));
    output.push_str(&format!("   Crash path:   {}\n", bug.crash_path));
    output.push_str(&format!("   State:        {}\n", bug.terminal_state));

    output
}

/// Format the fuzzer summary lines.
pub fn format_fuzz(fuzz: &FuzzReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Seed:                   {}\n", fuzz.seed));
    output.push_str(&format!(
        "Rounds completed:       {}/{}\n",
        fuzz.rounds_completed, fuzz.rounds_requested
    ));
    output.push_str(&format!("Steps executed:         {}\n", fuzz.steps_executed));
    output.push_str(&format!("Failures absorbed:      {}\n", fuzz.failures_seen));
    output.push_str(&format!("Longest walk:           {}\n", fuzz.longest_walk));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::{ExplorationReport, ExplorationStats};
    use crate::history::History;
    use crate::session::PropertyVerdict;

    fn make_bug(id: u64, message: &str, path: Vec<i32>) -> BugRecord<i32> {
        BugRecord {
            bug_id: id,
            message: message.to_string(),
            depth: path.len(),
            crash_path: History::from_symbols(path),
            terminal_state: "a1=20, a10=1, a19=9".to_string(),
        }
    }

    fn make_report(bugs: Vec<BugRecord<i32>>) -> SessionReport<i32> {
        let found = !bugs.is_empty();
        SessionReport {
            exploration: ExplorationReport {
                bugs,
                stop_reason: StopReason::FrontierExhausted,
                states_visited: 322,
                frontier_remaining: 0,
                stats: ExplorationStats {
                    histories_expanded: 305,
                    skipped_too_deep: 18,
                    ..Default::default()
                },
            },
            fuzz: Some(FuzzReport {
                seed: 42,
                rounds_requested: 100,
                rounds_completed: 100,
                steps_executed: 812,
                failures_seen: 97,
                longest_walk: 14,
            }),
            fuzz_error: None,
            properties: vec![PropertyVerdict {
                name: "bfs-found-bugs".to_string(),
                passed: found,
                detail: String::new(),
            }],
        }
    }

    #[test]
    fn test_format_report_no_bugs() {
        let formatted = format_report(&make_report(Vec::new()));
        assert!(formatted.contains("States visited:         322"));
        assert!(formatted.contains("Unique bugs:            0"));
        assert!(formatted.contains("Stopped because:        frontier exhausted"));
        assert!(formatted.contains("Skipped (depth cap):    18"));
        assert!(formatted.contains("Rounds completed:       100/100"));
        assert!(formatted.contains("[FAIL] bfs-found-bugs"));
        assert!(formatted.contains("No Bugs Found"));
        assert!(!formatted.contains("Diverged branches"));
    }

    #[test]
    fn test_format_report_with_bugs() {
        let bugs = vec![
            make_bug(0, "error_0", vec![6, 3]),
            make_bug(1, "error_1", vec![6, 5, 6, 5]),
        ];
        let formatted = format_report(&make_report(bugs));
        assert!(formatted.contains("Unique bugs:            2"));
        assert!(formatted.contains("[PASS] bfs-found-bugs"));
        assert!(formatted.contains("Bugs Found"));
        assert!(formatted.contains("1. Bug #0"));
        assert!(formatted.contains("2. Bug #1"));
        assert!(formatted.contains("Crash path:   [6, 5, 6, 5]"));
    }

    #[test]
    fn test_format_report_aborted_fuzz() {
        let mut report = make_report(vec![make_bug(0, "error_0", vec![6, 3])]);
        report.fuzz = None;
        report.fuzz_error = Some("Target error in fuzz round 2: Step failed: gone".to_string());
        report.properties.push(PropertyVerdict {
            name: "fuzz-survived".to_string(),
            passed: false,
            detail: "Target error in fuzz round 2: Step failed: gone".to_string(),
        });

        let formatted = format_report(&report);
        assert!(formatted.contains("Aborted:                Target error in fuzz round 2"));
        assert!(!formatted.contains("Rounds completed"));
        assert!(formatted.contains("[FAIL] fuzz-survived"));
        assert!(formatted.contains("1. Bug #0"));
    }

    #[test]
    fn test_format_bug() {
        let formatted = format_bug(&make_bug(3, "error_0", vec![6, 3]));
        assert!(formatted.contains("Failure:      error_0"));
        assert!(formatted.contains("Depth:        2"));
        assert!(formatted.contains("Crash path:   [6, 3]"));
        assert!(formatted.contains("State:        a1=20, a10=1, a19=9"));
    }
}
