//! Content view state.
//!
//! Provides [`ContentState`] and [`StateHandle`], the reactive container a
//! host UI subscribes to. The state machine has four states:
//!
//! ```text
//! Idle ──load──▶ Loading ──ok──▶ Ready
//!                   │  ▲            │
//!                   │  └───load─────┤
//!                   └──err──▶ Error ┘
//! ```
//!
//! Every load is tagged with a generation number. Only the outcome of the
//! most recent load is applied, so a slow earlier response can never
//! overwrite a newer one.
//!
//! # Usage
//!
//! ```rust
//! use docent_core::state::{ContentState, StateHandle};
//!
//! let handle = StateHandle::new();
//! assert!(matches!(handle.state(), ContentState::Idle));
//!
//! let generation = handle.begin_load("intro");
//! assert!(handle.state().is_loading());
//!
//! assert!(handle.fail(generation, "intro", "Article not found"));
//! assert_eq!(handle.state().error(), Some("Article not found"));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::types::{Article, NavigationState};

// ============================================================================
// ContentState
// ============================================================================

/// State of the article view.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentState {
    /// No article has been requested.
    Idle,
    /// A load is in flight.
    Loading {
        /// Requested article id.
        id: String,
    },
    /// An article is displayed.
    Ready {
        /// The loaded article.
        article: Arc<Article>,
        /// Navigation derived for it.
        navigation: NavigationState,
    },
    /// The last load failed. Retained until the next load starts.
    Error {
        /// Requested article id.
        id: String,
        /// User-visible message.
        message: String,
    },
}

impl ContentState {
    /// Returns `true` while a load is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Returns `true` when an article is displayed.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Returns `true` when no load is in flight.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    /// The displayed article, if ready.
    pub fn article(&self) -> Option<&Arc<Article>> {
        match self {
            Self::Ready { article, .. } => Some(article),
            _ => None,
        }
    }

    /// The navigation state, if ready.
    pub fn navigation(&self) -> Option<&NavigationState> {
        match self {
            Self::Ready { navigation, .. } => Some(navigation),
            _ => None,
        }
    }

    /// The error message, if the last load failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading { id } => write!(f, "loading: {id}"),
            Self::Ready { article, .. } => write!(f, "ready: {}", article.id),
            Self::Error { id, message } => write!(f, "error: {id}: {message}"),
        }
    }
}

// ============================================================================
// StateHandle
// ============================================================================

/// Thread-safe handle for observing and driving the content state.
///
/// Cheap to clone (Arc internals). Changes are broadcast to all
/// subscribers via a watch channel.
#[derive(Clone)]
pub struct StateHandle {
    inner: Arc<StateHandleInner>,
}

struct StateHandleInner {
    tx: watch::Sender<ContentState>,
    generation: AtomicU64,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHandle {
    /// Create a handle in the [`ContentState::Idle`] state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ContentState::Idle);
        Self {
            inner: Arc::new(StateHandleInner {
                tx,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> ContentState {
        self.inner.tx.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ContentState> {
        self.inner.tx.subscribe()
    }

    /// Generation of the most recent load.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Enter `Loading` for `id` and return the generation tag for this load.
    ///
    /// Any earlier load still in flight becomes stale.
    pub fn begin_load(&self, id: &str) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("content load #{generation} started for '{id}'");
        self.inner
            .tx
            .send_replace(ContentState::Loading { id: id.to_string() });
        generation
    }

    /// Enter `Ready` if `generation` is still current.
    ///
    /// Returns `false` (and leaves the state untouched) for stale loads.
    pub fn complete(
        &self,
        generation: u64,
        article: Arc<Article>,
        navigation: NavigationState,
    ) -> bool {
        self.apply(generation, || ContentState::Ready {
            article,
            navigation,
        })
    }

    /// Enter `Error` if `generation` is still current.
    pub fn fail(&self, generation: u64, id: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        self.apply(generation, || ContentState::Error {
            id: id.to_string(),
            message,
        })
    }

    /// Return to `Idle`, invalidating any load in flight.
    pub fn reset(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.tx.send_replace(ContentState::Idle);
    }

    fn apply(&self, generation: u64, next: impl FnOnce() -> ContentState) -> bool {
        if generation != self.generation() {
            log::debug!(
                "dropping stale content load #{generation} (current #{})",
                self.generation()
            );
            return false;
        }
        let state = next();
        log::debug!("content state → {state}");
        self.inner.tx.send_replace(state);
        true
    }

    /// Wait until no load is in flight, or until `timeout` elapses.
    pub async fn wait_settled(&self, timeout: Duration) -> Result<ContentState, String> {
        let mut rx = self.subscribe();
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        {
            let state = rx.borrow_and_update().clone();
            if state.is_settled() {
                return Ok(state);
            }
        }

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    return Err(format!("content still loading after {timeout:?} ({})", self.state()));
                }
                result = rx.changed() => {
                    if result.is_err() {
                        return Err("content state channel closed".to_string());
                    }
                    let state = rx.borrow().clone();
                    if state.is_settled() {
                        return Ok(state);
                    }
                }
            }
        }
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("generation", &self.generation())
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArticleMetadata, ContentFormat};

    fn article(id: &str) -> Arc<Article> {
        Arc::new(Article {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: None,
            content: String::new(),
            rendered_content: String::new(),
            metadata: ArticleMetadata::default(),
            format: ContentFormat::Markdown,
            toc: Vec::new(),
            assets: Vec::new(),
        })
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ContentState::Idle.to_string(), "idle");
        assert_eq!(
            ContentState::Loading { id: "a".into() }.to_string(),
            "loading: a"
        );
        assert_eq!(
            ContentState::Error {
                id: "a".into(),
                message: "boom".into()
            }
            .to_string(),
            "error: a: boom"
        );
    }

    #[test]
    fn test_happy_path_transitions() {
        let handle = StateHandle::new();
        let generation = handle.begin_load("a");
        assert!(handle.state().is_loading());

        assert!(handle.complete(generation, article("a"), NavigationState::default()));
        let state = handle.state();
        assert!(state.is_ready());
        assert_eq!(state.article().map(|a| a.id.as_str()), Some("a"));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_ready_clears_previous_error() {
        let handle = StateHandle::new();
        let g1 = handle.begin_load("missing");
        handle.fail(g1, "missing", "not found");
        assert_eq!(handle.state().error(), Some("not found"));

        let g2 = handle.begin_load("a");
        assert!(handle.state().error().is_none());
        handle.complete(g2, article("a"), NavigationState::default());
        assert!(handle.state().error().is_none());
        assert!(handle.state().is_ready());
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let handle = StateHandle::new();
        let slow = handle.begin_load("slow");
        let fast = handle.begin_load("fast");

        assert!(handle.complete(fast, article("fast"), NavigationState::default()));
        assert!(!handle.complete(slow, article("slow"), NavigationState::default()));

        assert_eq!(
            handle.state().article().map(|a| a.id.clone()),
            Some("fast".to_string())
        );
    }

    #[test]
    fn test_reset_invalidates_in_flight() {
        let handle = StateHandle::new();
        let generation = handle.begin_load("a");
        handle.reset();
        assert!(!handle.fail(generation, "a", "late"));
        assert_eq!(handle.state(), ContentState::Idle);
    }

    #[test]
    fn test_clone_shares_state() {
        let h1 = StateHandle::new();
        let h2 = h1.clone();
        let generation = h1.begin_load("x");
        assert_eq!(h2.generation(), generation);
        assert!(h2.state().is_loading());
    }

    #[tokio::test]
    async fn test_wait_settled_after_completion() {
        let handle = StateHandle::new();
        let generation = handle.begin_load("a");
        let h = handle.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            h.complete(generation, article("a"), NavigationState::default());
        });

        let state = handle.wait_settled(Duration::from_secs(1)).await.unwrap();
        assert!(state.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_settled_timeout() {
        let handle = StateHandle::new();
        handle.begin_load("stuck");
        let result = handle.wait_settled(Duration::from_millis(50)).await;
        assert!(result.unwrap_err().contains("still loading"));
    }

    #[tokio::test]
    async fn test_wait_settled_when_idle() {
        let handle = StateHandle::new();
        let state = handle.wait_settled(Duration::from_millis(10)).await.unwrap();
        assert_eq!(state, ContentState::Idle);
    }

    fn _assert_send_sync<T: Send + Sync>() {}
    #[test]
    fn test_state_handle_send_sync() {
        _assert_send_sync::<StateHandle>();
        _assert_send_sync::<ContentState>();
    }
}
