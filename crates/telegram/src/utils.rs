//! Utility functions for formatting and parsing

/// Truncate `text` to at most `max_chars` characters, marking the cut with "..."
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// Greeting for the given local hour (0-23)
pub fn time_greeting(hour: u32) -> &'static str {
    match hour {
        5..=11 => "🌅 Good Morning",
        12..=16 => "☀️ Good Afternoon",
        17..=20 => "🌇 Good Evening",
        _ => "🌙 Good Night",
    }
}

/// Validate a chat id given as a command argument
pub fn parse_chat_id(arg: &str) -> Result<i64, String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err("Missing channel id argument".to_string());
    }
    arg.parse::<i64>()
        .map_err(|_| format!("Invalid channel id '{}'. Must be a number like -1001234567890", arg))
}

/// Parse a list of chat ids separated by whitespace or commas
pub fn parse_chat_ids(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(parse_chat_id)
        .collect()
}
