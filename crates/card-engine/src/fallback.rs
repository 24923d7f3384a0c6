//! Ranked fallback: try candidate providers in order until one loads.
//!
//! Used for both card backgrounds and caption fonts. Candidates are only
//! loaded when every higher-ranked candidate has failed.

use std::path::PathBuf;

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CandidateError {
    #[error("not configured")]
    NotConfigured,
    #[error("not found: {0}")]
    Missing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
}

/// A single provider in a fallback chain.
pub trait Candidate<T>: Send + Sync {
    /// Short label used in logs.
    fn label(&self) -> &str;

    fn load(&self) -> Result<T, CandidateError>;
}

/// Value produced by a [`RankedFallback`], tagged with its provider.
#[derive(Debug)]
pub struct Resolved<T> {
    pub value: T,
    pub source: String,
    /// Zero-based rank of the provider that succeeded.
    pub rank: usize,
}

pub struct RankedFallback<T> {
    candidates: Vec<Box<dyn Candidate<T>>>,
}

impl<T> Default for RankedFallback<T> {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }
}

impl<T> RankedFallback<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate at the lowest rank so far.
    pub fn then(mut self, candidate: impl Candidate<T> + 'static) -> Self {
        self.candidates.push(Box::new(candidate));
        self
    }

    /// Append a candidate only when `candidate` is `Some`.
    pub fn then_some(self, candidate: Option<impl Candidate<T> + 'static>) -> Self {
        match candidate {
            Some(c) => self.then(c),
            None => self,
        }
    }

    /// Load the highest-ranked candidate that succeeds.
    pub fn resolve(&self) -> Option<Resolved<T>> {
        for (rank, candidate) in self.candidates.iter().enumerate() {
            match candidate.load() {
                Ok(value) => {
                    debug!(source = candidate.label(), rank, "Fallback candidate resolved");
                    return Some(Resolved {
                        value,
                        source: candidate.label().to_string(),
                        rank,
                    });
                }
                Err(e) => {
                    debug!(source = candidate.label(), rank, error = %e, "Fallback candidate failed");
                }
            }
        }
        None
    }
}

/// Candidate backed by a closure.
pub struct FromFn<F> {
    label: String,
    f: F,
}

impl<F> FromFn<F> {
    pub fn new(label: impl Into<String>, f: F) -> Self {
        Self {
            label: label.into(),
            f,
        }
    }
}

impl<T, F> Candidate<T> for FromFn<F>
where
    F: Fn() -> Result<T, CandidateError> + Send + Sync,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn load(&self) -> Result<T, CandidateError> {
        (self.f)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn failing(label: &str) -> FromFn<impl Fn() -> Result<u32, CandidateError>> {
        FromFn::new(label, || Err(CandidateError::NotConfigured))
    }

    #[test]
    fn first_success_wins() {
        let chain = RankedFallback::new()
            .then(failing("a"))
            .then(FromFn::new("b", || Ok(2u32)))
            .then(FromFn::new("c", || Ok(3u32)));
        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.value, 2);
        assert_eq!(resolved.source, "b");
        assert_eq!(resolved.rank, 1);
    }

    #[test]
    fn lower_ranks_are_not_loaded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let chain = RankedFallback::new()
            .then(FromFn::new("a", || Ok(1u32)))
            .then(FromFn::new("b", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(2u32)
            }));
        assert_eq!(chain.resolve().unwrap().value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn all_failures_yield_none() {
        let chain = RankedFallback::new().then(failing("a")).then(failing("b"));
        assert!(chain.resolve().is_none());
        assert!(RankedFallback::<u32>::new().resolve().is_none());
    }

    #[test]
    fn then_some_skips_none() {
        let chain = RankedFallback::new()
            .then_some(None::<FromFn<fn() -> Result<u32, CandidateError>>>)
            .then(FromFn::new("x", || Ok(7u32)));
        let resolved = chain.resolve().unwrap();
        assert_eq!(resolved.rank, 0);
        assert_eq!(resolved.source, "x");
    }
}
