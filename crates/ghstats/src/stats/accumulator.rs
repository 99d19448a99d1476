//! Deduplicating fold over repository records.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::types::{LanguageShare, RepositoryRecord};

/// Accumulated byte size per language, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTotals {
    sizes: IndexMap<String, u64>,
}

impl LanguageTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `size` bytes to `name`, creating the entry if absent.
    pub fn add(&mut self, name: &str, size: u64) {
        let total = self.sizes.entry(name.to_string()).or_insert(0);
        *total = total.saturating_add(size);
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.sizes.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of all sizes; the denominator of every percentage.
    pub fn total(&self) -> u64 {
        self.sizes
            .values()
            .fold(0u64, |acc, size| acc.saturating_add(*size))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.sizes.iter().map(|(name, size)| (name.as_str(), *size))
    }

    /// Each language's percentage of the total, descending.
    ///
    /// Ties keep first-insertion order. When the total is zero every
    /// language is reported at `0.0`.
    pub fn proportions(&self) -> Vec<LanguageShare> {
        let total = self.total();

        let mut shares: Vec<LanguageShare> = self
            .iter()
            .map(|(name, size)| LanguageShare {
                name: name.to_string(),
                size,
                percentage: if total == 0 {
                    0.0
                } else {
                    100.0 * size as f64 / total as f64
                },
            })
            .collect();

        // Stable: equal percentages stay in insertion order.
        shares.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
        shares
    }
}

/// The result of folding every page of both repository streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoStats {
    /// Deduplicated repository names in first-seen order.
    pub repos: Vec<String>,
    pub stars: u64,
    pub forks: u64,
    pub languages: LanguageTotals,
    /// Derived once from `languages` when the fold finishes.
    pub proportions: Vec<LanguageShare>,
}

/// Mutable fold state. Lives only for the duration of one computation.
#[derive(Debug, Default)]
pub struct RepoAccumulator {
    seen: HashSet<String>,
    repos: Vec<String>,
    stars: u64,
    forks: u64,
    languages: LanguageTotals,
}

impl RepoAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record. Returns `false` if the record was a duplicate and
    /// was dropped.
    pub fn fold(&mut self, record: RepositoryRecord) -> bool {
        if self.seen.contains(&record.name_with_owner) {
            return false;
        }

        self.stars = self.stars.saturating_add(record.stars);
        self.forks = self.forks.saturating_add(record.forks);
        for (name, size) in &record.languages {
            self.languages.add(name, *size);
        }

        self.seen.insert(record.name_with_owner.clone());
        self.repos.push(record.name_with_owner);
        true
    }

    pub fn repo_count(&self) -> usize {
        self.repos.len()
    }

    /// Finish the fold and derive the language proportions.
    pub fn finish(self) -> RepoStats {
        let proportions = self.languages.proportions();
        RepoStats {
            repos: self.repos,
            stars: self.stars,
            forks: self.forks,
            languages: self.languages,
            proportions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, stars: u64, forks: u64) -> RepositoryRecord {
        RepositoryRecord::new(name, stars, forks)
    }

    #[test]
    fn duplicate_keys_are_counted_once_with_first_languages() {
        let mut acc = RepoAccumulator::new();

        assert!(acc.fold(record("me/a", 5, 1).with_language("Rust", 100)));
        assert!(!acc.fold(record("me/a", 50, 10).with_language("Go", 999)));
        assert!(acc.fold(record("org/b", 2, 0).with_language("Rust", 20)));

        let stats = acc.finish();
        assert_eq!(stats.repos, vec!["me/a".to_string(), "org/b".to_string()]);
        assert_eq!(stats.stars, 7);
        assert_eq!(stats.forks, 1);
        assert_eq!(stats.languages.get("Rust"), Some(120));
        assert_eq!(stats.languages.get("Go"), None);
    }

    #[test]
    fn folding_same_page_twice_is_idempotent() {
        let page = vec![
            record("me/a", 3, 1).with_language("Go", 10),
            record("me/b", 4, 2).with_language("C", 5),
        ];

        let mut once = RepoAccumulator::new();
        for r in page.clone() {
            once.fold(r);
        }

        let mut twice = RepoAccumulator::new();
        for r in page.iter().cloned().chain(page.iter().cloned()) {
            twice.fold(r);
        }

        assert_eq!(once.finish(), twice.finish());
    }

    #[test]
    fn proportions_match_size_shares_in_descending_order() {
        let mut totals = LanguageTotals::new();
        totals.add("Rust", 100);
        totals.add("Other", 0);
        totals.add("Go", 300);

        let shares = totals.proportions();
        let view: Vec<(&str, f64)> = shares
            .iter()
            .map(|s| (s.name.as_str(), s.percentage))
            .collect();
        assert_eq!(view, vec![("Go", 75.0), ("Rust", 25.0), ("Other", 0.0)]);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let mut totals = LanguageTotals::new();
        for (name, size) in [("A", 7), ("B", 13), ("C", 1), ("D", 999), ("E", 3)] {
            totals.add(name, size);
        }

        let sum: f64 = totals.proportions().iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn empty_totals_derive_to_empty_proportions() {
        assert!(LanguageTotals::new().proportions().is_empty());
        assert!(RepoAccumulator::new().finish().proportions.is_empty());
    }

    #[test]
    fn zero_total_yields_zero_percentages() {
        let mut totals = LanguageTotals::new();
        totals.add("Markdown", 0);
        totals.add("Text", 0);

        let shares = totals.proportions();
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|s| s.percentage == 0.0));
        assert_eq!(shares[0].name, "Markdown");
    }

    #[test]
    fn ties_keep_first_insertion_order() {
        let mut totals = LanguageTotals::new();
        totals.add("Zig", 50);
        totals.add("Ada", 50);
        totals.add("Nim", 100);

        let names: Vec<String> = totals.proportions().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Nim", "Zig", "Ada"]);
    }

    #[test]
    fn language_sizes_accumulate_across_repositories() {
        let mut acc = RepoAccumulator::new();
        acc.fold(record("a/1", 0, 0).with_language("Python", 10).with_language("Shell", 1));
        acc.fold(record("a/2", 0, 0).with_language("Python", 5));

        assert_eq!(acc.repo_count(), 2);
        let stats = acc.finish();
        let order: Vec<(&str, u64)> = stats.languages.iter().collect();
        assert_eq!(order, vec![("Python", 15), ("Shell", 1)]);
        assert_eq!(stats.languages.total(), 16);
    }
}
