/// Text shown for a count-up: `prefix`, the current value, then `suffix`.
pub fn format_count(prefix: &str, value: u64, suffix: &str) -> String {
    format!("{prefix}{value}{suffix}")
}
