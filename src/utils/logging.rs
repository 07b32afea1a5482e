// Logging utilities
// Custom action log lines: timestamp, level, fixed header, then the message with its
// [PHASE]/[STEP] tags lifted into a structured prefix.

use log::Level;

/// Header every custom action log line carries.
pub const CUSTOM_ACTION_HEADER: &str = "Installer Custom Action: ";

/// Split `[PHASE: ..]` and `[STEP: ..]` tags off a log message.
///
/// Returns `(phase, step, remaining message)`.
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let (phase, rest) = take_tag(message, "PHASE");
    let (step, rest) = take_tag(&rest, "STEP");
    (phase, step, rest)
}

/// Remove the first `[<name>: value]` tag, returning its trimmed value.
fn take_tag(message: &str, name: &str) -> (Option<String>, String) {
    let open = format!("[{}:", name);
    let Some(start) = message.find(&open) else {
        return (None, message.to_string());
    };
    let Some(len) = message[start..].find(']') else {
        return (None, message.to_string());
    };

    let value = message[start + open.len()..start + len].trim().to_string();
    let before = message[..start].trim_end();
    let after = message[start + len + 1..].trim_start();
    let rest = match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        _ => format!("{} {}", before, after),
    };
    (Some(value), rest)
}

/// Format one log line for the install log file.
pub fn format_custom_action_line(
    timestamp: &str,
    level: Level,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}] {}", timestamp, level.as_str(), CUSTOM_ACTION_HEADER);

    if let Some(phase) = phase {
        log_line.push_str(&format!("[PHASE: {}] ", phase));
    }

    if let Some(step) = step {
        log_line.push_str(&format!("[STEP: {}] ", step));
    }

    log_line.push_str(message);
    log_line
}

/// Render a raw record message the way the file chain writes it.
pub fn render_record(timestamp: &str, level: Level, raw_message: &str) -> String {
    let (phase, step, cleaned) = parse_log_metadata(raw_message);
    format_custom_action_line(
        timestamp,
        level,
        &cleaned,
        phase.as_deref(),
        step.as_deref(),
    )
}
