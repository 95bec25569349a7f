//! Human-readable formatting of sizes and labels.

/// Format a byte count with binary (1024) units.
///
/// - `512` → `512 B`
/// - `1536` → `1.5 KiB`
/// - `7_365_960_935` → `6.9 GiB`
#[must_use]
#[allow(clippy::cast_precision_loss)] // Display only
pub fn human_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const SUFFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}iB", bytes as f64 / div as f64, SUFFIXES[exp])
}

/// Uppercase the first character of a word (`train` → `Train`).
#[must_use]
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
