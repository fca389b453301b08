use regex::Regex;
use std::sync::OnceLock;

const RECORD_SEPARATOR: &str = "keychain: ";

fn service_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""svce"<blob>="([^"]+)"#).expect("static regex"))
}

/// Extracts the service names of every `security dump-keychain` record filed
/// under `account`. Records without a quoted service are skipped.
pub fn parse_dump(dump: &str, account: &str) -> Vec<String> {
    let account_marker = format!(r#""acct"<blob>="{}""#, account);
    dump.split(RECORD_SEPARATOR)
        .filter(|record| record.contains(&account_marker))
        .filter_map(|record| service_pattern().captures(record))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}
