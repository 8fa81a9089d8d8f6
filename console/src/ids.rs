//! Collision-checked identifier allocation.

use parking_console_core::environment::IdGenerator;

/// Fresh tokens tried before falling back to a numeric suffix
const MAX_ATTEMPTS: usize = 8;

/// Returns `prefix` + a generated token that `exists` rejects as taken.
///
/// The generator does not promise uniqueness, so every candidate is checked
/// against the collection. A generator that keeps colliding (a broken RNG or a
/// test double) gets a `-n` suffix appended to its last token.
pub(crate) fn unique_id<F>(ids: &dyn IdGenerator, prefix: &str, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut candidate = String::new();
    for _ in 0..MAX_ATTEMPTS {
        candidate = format!("{prefix}{}", ids.next_token());
        if !exists(&candidate) {
            return candidate;
        }
        tracing::debug!(id = %candidate, "Generated id collides, retrying");
    }

    let mut n: usize = 2;
    loop {
        let suffixed = format!("{candidate}-{n}");
        if !exists(&suffixed) {
            return suffixed;
        }
        n += 1;
    }
}
