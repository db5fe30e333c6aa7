//! Async driver for a [`Picker`].
//!
//! A [`PickerSession`] owns a picker together with a [`CatalogSource`] and
//! runs fetches as background tasks. The caller keeps calling
//! [`PickerSession::next_update`] (usually from a `tokio::select!` loop) to
//! apply completions and fire debounced refetches.
//!
//! Superseded fetches are left to finish and are dropped as stale. Closing the
//! picker aborts whatever is still running and cancels a pending refetch; a
//! task that sees its picker closed before or after the request reports
//! nothing.

use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, warn};
use variant_picker_core::VariantKey;

use crate::catalog::{CatalogClient, CatalogSource};
use crate::config::{AppConfig, PickerOptions};
use crate::error::Result;
use crate::fetch::{FetchApplied, FetchGeneration, FetchOutcome};
use crate::picker::Picker;
use crate::search::SearchEffect;

/// Something that changed in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    /// A debounced refetch fired.
    FetchStarted { generation: FetchGeneration },
    /// A background fetch finished.
    FetchCompleted {
        generation: FetchGeneration,
        applied: FetchApplied,
    },
}

struct Completion {
    generation: FetchGeneration,
    outcome: FetchOutcome,
}

enum Wakeup {
    Joined(std::result::Result<Option<Completion>, JoinError>),
    RefetchDue,
}

/// A picker wired to a catalog source.
pub struct PickerSession<S: CatalogSource> {
    picker: Picker,
    source: Arc<S>,
    tasks: JoinSet<Option<Completion>>,
    refetch_at: Option<Instant>,
}

impl PickerSession<CatalogClient> {
    /// Build an HTTP catalog client from `config` and open a session on it.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Catalog`](crate::error::PickerError::Catalog) if
    /// the client cannot be constructed.
    pub fn connect<F>(config: &AppConfig, on_close: F) -> Result<Self>
    where
        F: FnOnce(Vec<VariantKey>) + Send + 'static,
    {
        let client = CatalogClient::new(&config.catalog)?;
        Ok(Self::open(client, config.picker.clone(), on_close))
    }
}

impl<S: CatalogSource> PickerSession<S> {
    /// Open a picker and start its initial fetch.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open<F>(source: S, options: PickerOptions, on_close: F) -> Self
    where
        F: FnOnce(Vec<VariantKey>) + Send + 'static,
    {
        let mut session = Self {
            picker: Picker::open(options, on_close),
            source: Arc::new(source),
            tasks: JoinSet::new(),
            refetch_at: None,
        };
        if let Err(e) = session.start_fetch() {
            debug!(error = %e, "initial fetch not started");
        }
        session
    }

    #[must_use]
    pub const fn picker(&self) -> &Picker {
        &self.picker
    }

    /// Mutable access for the synchronous selection operations.
    pub const fn picker_mut(&mut self) -> &mut Picker {
        &mut self.picker
    }

    /// True while a fetch is running or a refetch is scheduled.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        !self.tasks.is_empty() || self.refetch_at.is_some()
    }

    /// Start a fetch now with the picker's current request, cancelling any
    /// scheduled refetch.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`](crate::error::PickerError::Closed)
    /// after the picker was resolved.
    pub fn start_fetch(&mut self) -> Result<FetchGeneration> {
        let ticket = self.picker.begin_fetch()?;
        self.refetch_at = None;

        let generation = ticket.generation;
        let source = Arc::clone(&self.source);
        self.tasks.spawn(async move {
            if !ticket.liveness.is_alive() {
                debug!(generation, "picker closed before fetch started");
                return None;
            }
            let outcome = source.fetch(&ticket.request).await;
            if !ticket.liveness.is_alive() {
                debug!(generation, "dropping fetch finished after picker closed");
                return None;
            }
            Some(Completion {
                generation,
                outcome,
            })
        });
        Ok(generation)
    }

    /// Replace the search text, scheduling a refetch if the policy asks for
    /// one. A later edit pushes the scheduled refetch back.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`](crate::error::PickerError::Closed)
    /// after the picker was resolved.
    pub fn set_query(&mut self, query: impl Into<String>) -> Result<SearchEffect> {
        let effect = self.picker.set_query(query)?;
        if let SearchEffect::Refetch { debounce, .. } = &effect {
            self.refetch_at = Some(Instant::now() + *debounce);
        }
        Ok(effect)
    }

    /// Wait for the next completion or debounced refetch and apply it.
    ///
    /// Returns `None` when there is nothing left to wait for: the picker is
    /// closed, or no fetch is running and none is scheduled. Cancel safe.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            if !self.picker.is_open() {
                return None;
            }

            let deadline = self.refetch_at;
            let wakeup = tokio::select! {
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    Wakeup::Joined(joined)
                }
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    Wakeup::RefetchDue
                }
                else => return None,
            };

            match wakeup {
                Wakeup::Joined(Ok(None)) => {}
                Wakeup::Joined(Ok(Some(completion))) => {
                    let generation = completion.generation;
                    let applied = self.picker.complete_fetch(generation, completion.outcome);
                    return Some(SessionUpdate::FetchCompleted {
                        generation,
                        applied,
                    });
                }
                Wakeup::Joined(Err(e)) => {
                    if e.is_panic() {
                        error!(error = %e, "fetch task panicked");
                    }
                }
                Wakeup::RefetchDue => {
                    return self
                        .start_fetch()
                        .ok()
                        .map(|generation| SessionUpdate::FetchStarted { generation });
                }
            }
        }
    }

    /// Confirm the picker and stop background work.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`](crate::error::PickerError::Closed) if
    /// the picker was already resolved.
    pub fn confirm(&mut self) -> Result<()> {
        self.picker.confirm()?;
        self.shutdown();
        Ok(())
    }

    /// Cancel the picker and stop background work.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::Closed`](crate::error::PickerError::Closed) if
    /// the picker was already resolved.
    pub fn cancel(&mut self) -> Result<()> {
        self.picker.cancel()?;
        self.shutdown();
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.tasks.is_empty() {
            warn!(running = self.tasks.len(), "aborting fetches of closed picker");
        }
        // Dropping a JoinSet aborts every task still in it.
        self.tasks = JoinSet::new();
        self.refetch_at = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use variant_picker_core::{FetchStatus, Price, Product, Variant};

    use super::*;
    use crate::catalog::{CatalogError, PageRequest, ProductPage};
    use crate::error::PickerError;
    use crate::search::SearchPolicy;

    /// Answers each query with one product named after it, after a per-query
    /// delay. Queries starting with "fail" produce an API error.
    #[derive(Default)]
    struct FakeSource {
        delays: HashMap<String, Duration>,
        requests: Arc<Mutex<Vec<PageRequest>>>,
    }

    impl FakeSource {
        fn with_delay(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.to_string(), delay);
            self
        }
    }

    impl CatalogSource for FakeSource {
        async fn fetch(&self, request: &PageRequest) -> std::result::Result<ProductPage, CatalogError> {
            self.requests.lock().unwrap().push(request.clone());
            let delay = self
                .delays
                .get(&request.query)
                .copied()
                .unwrap_or(Duration::from_millis(10));
            tokio::time::sleep(delay).await;

            if request.query.starts_with("fail") {
                return Err(CatalogError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            let variant = Variant {
                id: None,
                size: "M".to_string(),
                color: "Blue".to_string(),
                material: "Wool".to_string(),
                available: 1,
                price: Price::new(Decimal::new(1000, 2)).unwrap(),
            };
            Ok(ProductPage {
                products: vec![Product::new(request.query.clone(), vec![variant])],
            })
        }
    }

    type Calls = Arc<Mutex<Vec<Vec<VariantKey>>>>;

    fn options(search: SearchPolicy) -> PickerOptions {
        PickerOptions {
            initial_query: "Hat".to_string(),
            page: 1,
            limit: 10,
            search,
        }
    }

    fn open(source: FakeSource, search: SearchPolicy) -> (PickerSession<FakeSource>, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let session = PickerSession::open(source, options(search), move |keys| {
            sink.lock().unwrap().push(keys);
        });
        (session, calls)
    }

    fn refetch_after(ms: u64) -> SearchPolicy {
        SearchPolicy::Refetch {
            debounce: Duration::from_millis(ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_populates_products() {
        let (mut session, _calls) = open(FakeSource::default(), SearchPolicy::ClearOnly);
        assert_eq!(session.picker().fetch_status(), FetchStatus::Loading);

        let update = session.next_update().await;
        assert_eq!(
            update,
            Some(SessionUpdate::FetchCompleted {
                generation: 1,
                applied: FetchApplied::Applied
            })
        );
        assert_eq!(session.picker().fetch_status(), FetchStatus::Ready);
        assert_eq!(session.picker().products()[0].name, "Hat");
        assert!(!session.has_pending_work());
        assert_eq!(session.next_update().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_reports_through_state() {
        let mut options = options(SearchPolicy::ClearOnly);
        options.initial_query = "failing".to_string();
        let mut session = PickerSession::open(FakeSource::default(), options, |_| {});

        session.next_update().await.unwrap();

        assert_eq!(session.picker().fetch_status(), FetchStatus::Failed);
        assert!(session.picker().products().is_empty());
        assert_eq!(session.picker().last_error(), Some("API error: 500 - boom"));
        assert!(session.picker().is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_debounce_into_one_refetch() {
        let source = FakeSource::default();
        let requests = Arc::clone(&source.requests);
        let (mut session, _calls) = open(source, refetch_after(300));
        session.next_update().await.unwrap();

        session.set_query("S").unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        session.set_query("So").unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        session.set_query("Sock").unwrap();
        assert!(session.picker().products().is_empty());

        // Each edit supersedes a generation; only the last one fetches.
        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::FetchStarted { generation: 5 })
        );
        session.next_update().await.unwrap();

        let queries: Vec<String> = requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.query.clone())
            .collect();
        assert_eq!(queries, vec!["Hat", "Sock"]);
        assert_eq!(session.picker().products()[0].name, "Sock");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_cannot_overwrite_newer() {
        let source = FakeSource::default().with_delay("Hat", Duration::from_millis(500));
        let (mut session, _calls) = open(source, refetch_after(300));

        session.set_query("Sock").unwrap();

        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::FetchStarted { generation: 3 })
        );
        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::FetchCompleted {
                generation: 3,
                applied: FetchApplied::Applied
            })
        );
        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::FetchCompleted {
                generation: 1,
                applied: FetchApplied::Stale
            })
        );
        assert_eq!(session.picker().products()[0].name, "Sock");
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_fetch_drops_old_results() {
        let source = FakeSource::default().with_delay("Hat", Duration::from_millis(50));
        let (mut session, _calls) = open(source, refetch_after(300));

        session.set_query("Sock").unwrap();

        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::FetchCompleted {
                generation: 1,
                applied: FetchApplied::Stale
            })
        );
        assert!(session.picker().products().is_empty());
        assert!(session.picker_mut().toggle_product("Hat").is_err());

        assert_eq!(
            session.next_update().await,
            Some(SessionUpdate::FetchStarted { generation: 3 })
        );
        session.next_update().await.unwrap();
        assert_eq!(session.picker().query(), "Sock");
        assert_eq!(session.picker().products()[0].name, "Sock");
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_survives_search() {
        let (mut session, calls) = open(FakeSource::default(), refetch_after(300));
        session.next_update().await.unwrap();
        session.picker_mut().toggle_product("Hat").unwrap();

        session.set_query("Sock").unwrap();
        session.next_update().await.unwrap();
        session.next_update().await.unwrap();
        session.picker_mut().toggle_variant("Sock", 0).unwrap();

        session.confirm().unwrap();

        let calls = calls.lock().unwrap();
        let mut keys: Vec<&str> = calls[0].iter().map(VariantKey::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["Hat-0", "Sock-0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_fetch_stops_updates() {
        let source = FakeSource::default().with_delay("Hat", Duration::from_millis(500));
        let (mut session, calls) = open(source, SearchPolicy::ClearOnly);

        session.cancel().unwrap();

        assert!(!session.has_pending_work());
        assert_eq!(session.next_update().await, None);
        assert_eq!(session.picker().fetch_status(), FetchStatus::Loading);
        assert_eq!(*calls.lock().unwrap(), vec![Vec::<VariantKey>::new()]);
        assert!(matches!(session.start_fetch(), Err(PickerError::Closed)));
        assert!(matches!(session.confirm(), Err(PickerError::Closed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drops_scheduled_refetch() {
        let source = FakeSource::default();
        let requests = Arc::clone(&source.requests);
        let (mut session, _calls) = open(source, refetch_after(300));
        session.next_update().await.unwrap();

        session.set_query("Sock").unwrap();
        session.confirm().unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        assert_eq!(session.next_update().await, None);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }
}
