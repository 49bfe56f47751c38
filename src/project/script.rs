/// Split a script into segment texts: one per non-empty line, trimmed.
pub fn split_script(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Number of whitespace-separated words in `script`.
pub fn word_count(script: &str) -> usize {
    script.split_whitespace().count()
}

#[cfg(test)]
#[path = "../../tests/unit/project/script.rs"]
mod tests;
