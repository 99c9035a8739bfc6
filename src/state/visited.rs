use crate::url::CanonicalUrl;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Canonical URLs already scheduled in the current run
///
/// One instance belongs to exactly one run and is shared by reference with
/// every worker. `test_and_insert` is the single point of mutual exclusion in
/// the crawler: the membership test and the insertion happen under one lock,
/// so two workers presenting the same URL can never both win.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<CanonicalUrl>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url`, returning true only if it was not already present
    ///
    /// # Examples
    ///
    /// ```
    /// use sitecrawl::state::VisitedSet;
    /// use sitecrawl::url::normalize;
    ///
    /// let visited = VisitedSet::new();
    /// let url = normalize("http://example.com/a").unwrap();
    /// assert!(visited.test_and_insert(&url));
    /// assert!(!visited.test_and_insert(&url));
    /// ```
    pub fn test_and_insert(&self, url: &CanonicalUrl) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains(url) {
            return false;
        }
        seen.insert(url.clone())
    }

    /// Returns true if `url` has already been inserted
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Number of distinct URLs seen so far
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing has been inserted yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize;
    use std::sync::Arc;

    #[test]
    fn test_first_sighting_only() {
        let visited = VisitedSet::new();
        let url = normalize("http://www.example.com/a").unwrap();

        assert!(visited.test_and_insert(&url));
        assert!(!visited.test_and_insert(&url));
        assert!(!visited.test_and_insert(&url));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_variants_collapse_to_one_entry() {
        let visited = VisitedSet::new();
        let direct = normalize("http://www.example.com/page").unwrap();
        let variant = normalize("HTTPS://Example.com/Page/#top").unwrap();

        let wins = [
            visited.test_and_insert(&direct),
            visited.test_and_insert(&variant),
        ];
        assert_eq!(wins.iter().filter(|w| **w).count(), 1);
        assert!(visited.contains(&variant));
    }

    #[test]
    fn test_empty() {
        let visited = VisitedSet::new();
        assert!(visited.is_empty());
        assert_eq!(visited.len(), 0);
    }

    #[test]
    fn test_concurrent_callers_single_winner() {
        let visited = Arc::new(VisitedSet::new());
        let url = normalize("http://www.example.com/contended").unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = Arc::clone(&visited);
                let url = url.clone();
                std::thread::spawn(move || visited.test_and_insert(&url))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(visited.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_many_urls() {
        let visited = Arc::new(VisitedSet::new());
        let urls: Vec<_> = (0..50)
            .map(|i| normalize(&format!("http://www.example.com/p{}", i)).unwrap())
            .collect();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let visited = Arc::clone(&visited);
            let urls = urls.clone();
            tasks.push(tokio::spawn(async move {
                urls.iter().filter(|u| visited.test_and_insert(u)).count()
            }));
        }

        let mut total = 0;
        for task in tasks {
            total += task.await.unwrap();
        }

        assert_eq!(total, 50);
        assert_eq!(visited.len(), 50);
    }
}
