//! Profile source trait and first-success fallback chain.

use crate::logging::sanitize_message;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_ERROR_LOG_CHARS: usize = 200;

/// Profile fields a source may contribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileData {
    pub description: Option<String>,
    /// Photo URL.
    pub image_url: Option<String>,
}

impl ProfileData {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.image_url.is_none()
    }
}

/// Lookup failure from one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Transport failure or unexpected HTTP status.
    Http { source: &'static str, message: String },
    /// Response body could not be decoded.
    Parse { source: &'static str, message: String },
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http { source, message } => write!(f, "{source} request failed: {message}"),
            Self::Parse { source, message } => {
                write!(f, "{source} response could not be parsed: {message}")
            }
        }
    }
}

impl Error for SourceError {}

/// One strategy for finding author profile data.
pub trait ProfileSource: Send + Sync {
    /// Stable short id used in logs.
    fn name(&self) -> &'static str;
    /// `Ok(None)` means the source has nothing for `author_name`.
    fn lookup(&self, author_name: &str) -> Result<Option<ProfileData>, SourceError>;
}

/// Returns the first `Some` produced by `attempts`, in order.
///
/// Errors and empty results move on to the next attempt; iteration stops at
/// the first success.
pub fn first_success<T, I, F>(attempts: I) -> Option<T>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Result<Option<T>, SourceError>,
{
    for attempt in attempts {
        match attempt() {
            Ok(Some(value)) => return Some(value),
            Ok(None) => {}
            Err(err) => warn!(
                "event=enrich_source module=enrich status=error error={}",
                sanitize_message(&err.to_string(), MAX_ERROR_LOG_CHARS)
            ),
        }
    }
    None
}

/// Ordered list of profile sources.
#[derive(Default)]
pub struct SourceChain {
    sources: Vec<Box<dyn ProfileSource>>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source; earlier sources are tried first.
    pub fn with_source(mut self, source: impl ProfileSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the first non-empty profile any source yields.
    pub fn lookup(&self, author_name: &str) -> Option<ProfileData> {
        first_success(self.sources.iter().map(|source| {
            move || {
                let found = source
                    .lookup(author_name)?
                    .filter(|data| !data.is_empty());
                debug!(
                    "event=enrich_source module=enrich status=ok source={} found={}",
                    source.name(),
                    found.is_some()
                );
                Ok(found)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{first_success, ProfileData, ProfileSource, SourceChain, SourceError};
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedSource {
        name: &'static str,
        result: Result<Option<ProfileData>, SourceError>,
        calls: Arc<AtomicUsize>,
    }

    impl ProfileSource for FixedSource {
        fn name(&self) -> &'static str {
            self.name
        }

        fn lookup(&self, _author_name: &str) -> Result<Option<ProfileData>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn bio(text: &str) -> ProfileData {
        ProfileData {
            description: Some(text.to_string()),
            image_url: None,
        }
    }

    #[test]
    fn first_success_short_circuits() {
        let calls = Cell::new(0);
        let attempts: Vec<Box<dyn FnOnce() -> Result<Option<u32>, SourceError> + '_>> = vec![
            Box::new(|| {
                calls.set(calls.get() + 1);
                Ok(None)
            }),
            Box::new(|| {
                calls.set(calls.get() + 1);
                Ok(Some(7))
            }),
            Box::new(|| {
                calls.set(calls.get() + 1);
                Ok(Some(9))
            }),
        ];
        assert_eq!(first_success(attempts), Some(7));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn first_success_skips_errors_and_gives_up() {
        let attempts: Vec<Box<dyn FnOnce() -> Result<Option<u32>, SourceError>>> = vec![
            Box::new(|| {
                Err(SourceError::Http {
                    source: "a",
                    message: "timeout".to_string(),
                })
            }),
            Box::new(|| Ok(None)),
        ];
        assert_eq!(first_success(attempts), None);
    }

    #[test]
    fn chain_falls_back_past_failing_and_empty_sources() {
        let failing_calls = Arc::new(AtomicUsize::new(0));
        let empty_calls = Arc::new(AtomicUsize::new(0));
        let winner_calls = Arc::new(AtomicUsize::new(0));
        let unused_calls = Arc::new(AtomicUsize::new(0));

        let chain = SourceChain::new()
            .with_source(FixedSource {
                name: "failing",
                result: Err(SourceError::Parse {
                    source: "failing",
                    message: "bad json".to_string(),
                }),
                calls: Arc::clone(&failing_calls),
            })
            .with_source(FixedSource {
                name: "empty",
                result: Ok(Some(ProfileData::default())),
                calls: Arc::clone(&empty_calls),
            })
            .with_source(FixedSource {
                name: "winner",
                result: Ok(Some(bio("Poet."))),
                calls: Arc::clone(&winner_calls),
            })
            .with_source(FixedSource {
                name: "unused",
                result: Ok(Some(bio("Never used."))),
                calls: Arc::clone(&unused_calls),
            });

        assert_eq!(chain.len(), 4);
        assert_eq!(chain.lookup("Someone"), Some(bio("Poet.")));
        assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
        assert_eq!(empty_calls.load(Ordering::SeqCst), 1);
        assert_eq!(winner_calls.load(Ordering::SeqCst), 1);
        assert_eq!(unused_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_chain_finds_nothing() {
        let chain = SourceChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.lookup("Someone"), None);
    }
}
