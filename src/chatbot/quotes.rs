//! Motivational quote catalog for the daily schedule.

use crate::chatbot::picker::Picker;

/// Immutable, non-empty set of quotes. Built once at startup.
#[derive(Debug, Clone)]
pub struct QuoteCatalog {
    quotes: Vec<String>,
}

impl QuoteCatalog {
    /// Returns `None` if `quotes` is empty.
    pub fn new(quotes: Vec<String>) -> Option<Self> {
        if quotes.is_empty() {
            return None;
        }
        Some(Self { quotes })
    }

    /// Uniform random quote, independent draw per call.
    pub fn pick<'a>(&'a self, picker: &Picker) -> &'a str {
        picker.choose(&self.quotes).as_str()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn contains(&self, quote: &str) -> bool {
        self.quotes.iter().any(|q| q == quote)
    }
}

pub fn default_quotes() -> Vec<String> {
    [
        "Believe you can and you're halfway there.",
        "Success is the sum of small efforts repeated day in and day out.",
        "The best way to get started is to quit talking and begin doing.",
        "Don't watch the clock; do what it does. Keep going.",
        "Hard work beats talent when talent doesn't work hard.",
        "Every day is a new chance to get better.",
        "The secret of getting ahead is getting started.",
        "Small steps every day add up to big results.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert!(QuoteCatalog::new(Vec::new()).is_none());
    }

    #[test]
    fn test_pick_returns_member() {
        let catalog = QuoteCatalog::new(default_quotes()).unwrap();
        let picker = Picker::from_entropy();
        for _ in 0..50 {
            assert!(catalog.contains(catalog.pick(&picker)));
        }
    }

    #[test]
    fn test_pick_never_empty() {
        let catalog = QuoteCatalog::new(vec!["one".into()]).unwrap();
        let picker = Picker::with_seed(3);
        assert_eq!(catalog.pick(&picker), "one");
    }

    #[test]
    fn test_default_catalog_is_non_empty() {
        let quotes = default_quotes();
        assert!(!quotes.is_empty());
        assert!(quotes.iter().all(|q| !q.is_empty()));
    }
}
