//! Normalizing sharded filenames to a stable group name.

/// Strip an `-NNNNN-of-MMMMM` shard suffix from a filename stem.
///
/// All shards of one weight set map to the same stem:
/// - `model-00001-of-00005` → `model`
/// - `llama-3-8b-q4_k_m-00003-of-00008` → `llama-3-8b-q4_k_m`
///
/// The suffix is stripped only when it ends the stem.
pub fn base_shard_stem(stem: &str) -> &str {
    let mut parts = stem.rsplitn(3, '-');
    let total = parts.next();
    let of = parts.next();
    let rest = parts.next();

    match (total, of, rest) {
        (Some(m), Some("of"), Some(prefix_and_n)) if is_digits(m) => {
            match prefix_and_n.rsplit_once('-') {
                Some((prefix, n)) if is_digits(n) => prefix,
                _ => stem,
            }
        }
        _ => stem,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|ch| ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_shard_stem() {
        assert_eq!(base_shard_stem("model-00001-of-00005"), "model");
        assert_eq!(
            base_shard_stem("llama-3-8b-q4_k_m-00003-of-00008"),
            "llama-3-8b-q4_k_m"
        );

        // Non-sharded stems pass through unchanged
        assert_eq!(base_shard_stem("model"), "model");
        assert_eq!(base_shard_stem("has-numbers-123"), "has-numbers-123");
        assert_eq!(base_shard_stem("model-of-something"), "model-of-something");
        assert_eq!(base_shard_stem("model--of-2"), "model--of-2");
    }
}
