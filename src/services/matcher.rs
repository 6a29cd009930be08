use std::collections::HashSet;

/// Normalizes an ingredient name for comparison: trimmed and lowercased
pub fn normalize_ingredient(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A case-insensitive, duplicate-free set of ingredient names
///
/// Keeps first-seen order so candidates echo their ingredients predictably.
/// Blank names are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSet {
    names: Vec<String>,
}

impl IngredientSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(|n| normalize_ingredient(n.as_ref()))
            .filter(|n| !n.is_empty())
            .filter(|n| seen.insert(n.clone()))
            .collect();

        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Membership test on an already-normalized name
    pub fn contains(&self, normalized: &str) -> bool {
        self.names.iter().any(|n| n == normalized)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Search terms for the external lookup: names joined by a single space
    pub fn search_terms(&self) -> String {
        self.names.join(" ")
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

/// How much of a candidate's ingredient list the user already holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub count: usize,
    /// `count / |candidate ingredients|`, or 0 for an empty list
    pub percentage: f64,
}

/// Scores `candidate` against `user`
///
/// Both sides are sets, so duplicates and order have no effect. An empty
/// candidate list scores `(0, 0.0)`.
pub fn match_rate(candidate: &IngredientSet, user: &IngredientSet) -> MatchScore {
    if candidate.is_empty() {
        return MatchScore {
            count: 0,
            percentage: 0.0,
        };
    }

    let count = candidate.iter().filter(|name| user.contains(name)).count();

    MatchScore {
        count,
        percentage: count as f64 / candidate.len() as f64,
    }
}
