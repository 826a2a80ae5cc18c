use regex::Regex;
use std::sync::OnceLock;

fn warning_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(error|warning):").expect("Invalid warning regex"))
}

/// Log lines reporting a warning or error that no ignore pattern matches
pub fn find_warnings<'a>(log: &'a str, ignore: &[Regex]) -> Vec<&'a str> {
    log.lines()
        .filter(|line| warning_line().is_match(line))
        .filter(|line| !ignore.iter().any(|re| re.is_match(line)))
        .collect()
}
