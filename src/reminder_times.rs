//! Reminder-time specification parser.
//!
//! A medicine's reminder times arrive as free text: either a bracketed
//! list of quoted tokens (`["08:00","12:00"]`, the stored form) or a
//! plain comma list (`08:00,12:00,18:00`, the typed form). Both the
//! record generator and the trigger scheduler call this one function so
//! they always agree on the same daily dose slots.

/// Split a reminder-time specification into its clock-time tokens.
///
/// Tokens are trimmed and stripped of surrounding quotes and brackets;
/// order is preserved and duplicates are kept. No HH:MM validation
/// happens here — consumers must tolerate malformed tokens. Input that
/// cannot be split degrades to a single-element vector holding the raw
/// string.
pub fn parse_reminder_times(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();

    let tokens: Vec<String> = if let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        inner
            .split(',')
            .map(|t| t.trim().trim_matches('"').to_string())
            .collect()
    } else {
        trimmed.split(',').map(|t| t.trim().to_string()).collect()
    };

    if tokens.is_empty() {
        return vec![raw.to_string()];
    }
    tokens
}

/// Render clock-time tokens into the stored bracketed form.
pub fn format_reminder_times(times: &[String]) -> String {
    serde_json::to_string(times).unwrap_or_default()
}
