use crate::models::{Candidate, Provenance};

/// Title key used for collision checks: lowercase with all whitespace removed
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Containment check in either direction
///
/// Deliberately coarse: "Kimchi Stew" and "Kimchi Stew Deluxe" collide,
/// paraphrased titles do not.
fn titles_collide(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Collapses near-identical titles, preferring Local provenance
///
/// Expects Local candidates ahead of External ones. Each incoming candidate is
/// compared against the survivors in insertion order and settles on the first
/// collision: a Local candidate replaces an External survivor in place,
/// anything else is dropped. Same-provenance collisions keep the earlier entry.
pub fn deduplicate(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut survivors: Vec<(String, Candidate)> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let key = normalize_title(candidate.title());

        match survivors
            .iter_mut()
            .find(|(existing_key, _)| titles_collide(&key, existing_key))
        {
            Some((existing_key, existing)) => {
                if candidate.provenance() == Provenance::Local
                    && existing.provenance() == Provenance::External
                {
                    tracing::debug!(
                        kept = %candidate.id(),
                        dropped = %existing.id(),
                        "Local candidate replaces external duplicate"
                    );
                    *existing_key = key;
                    *existing = candidate;
                } else {
                    tracing::debug!(
                        kept = %existing.id(),
                        dropped = %candidate.id(),
                        "Duplicate candidate dropped"
                    );
                }
            }
            None => survivors.push((key, candidate)),
        }
    }

    survivors.into_iter().map(|(_, candidate)| candidate).collect()
}
