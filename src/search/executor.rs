//! Search execution and orchestration

use super::error::SearchError;
use super::models::{Outcome, Query, QueryState};
use super::opener::{CommandOpener, Opener};
use crate::providers::{deadline_after, Provider, ProviderRegistry, SearchArgs, SearchContext};
use crate::results::{RawResult, Result as SearchResult};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Search executor that validates a query and dispatches it to one provider
#[derive(Clone)]
pub struct Search {
    /// Provider registry
    registry: Arc<ProviderRegistry>,
    /// Collaborator used for goto
    opener: Arc<dyn Opener>,
}

impl Search {
    /// Create a new search executor using the platform opener for goto
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            opener: Arc::new(CommandOpener::default()),
        }
    }

    /// Set the goto opener
    pub fn with_opener(mut self, opener: Arc<dyn Opener>) -> Self {
        self.opener = opener;
        self
    }

    /// Provider registry used by this executor
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Run a query to completion.
    ///
    /// The query is updated in place: status, timing, results and state.
    pub async fn run(&self, query: &mut Query) -> Result<Outcome, SearchError> {
        self.run_with_cancel(query, &CancellationToken::new()).await
    }

    /// Run a query that can be cancelled from outside through `cancel`
    pub async fn run_with_cancel(
        &self,
        query: &mut Query,
        cancel: &CancellationToken,
    ) -> Result<Outcome, SearchError> {
        let result = self.execute(query, cancel).await;

        if let Err(ref e) = result {
            if let Some(status) = e.status() {
                query.http_status = Some(status);
            }
        }

        result
    }

    async fn execute(
        &self,
        query: &mut Query,
        cancel: &CancellationToken,
    ) -> Result<Outcome, SearchError> {
        let provider = match self.validate(query) {
            Ok(provider) => provider,
            Err(e) => {
                query.state = QueryState::Invalid;
                return Err(e);
            }
        };
        query.state = QueryState::Validated;

        let raw = self.dispatch(&provider, query, cancel).await?;

        query.results = match normalize(&raw) {
            Ok(results) => results,
            Err(e) => {
                warn!("Provider {} returned a malformed result: {}", provider.name(), e);
                query.state = QueryState::BackendFailed;
                return Err(e);
            }
        };
        query.state = QueryState::Completed;

        debug!(
            "Provider {} returned {} results in {}ms",
            provider.name(),
            query.results.len(),
            query.elapsed_ms()
        );

        if query.goto_index == 0 {
            return Ok(Outcome::Results);
        }

        self.goto(query).await
    }

    /// Resolve the provider and check the query arguments
    fn validate(&self, query: &Query) -> Result<Arc<Provider>, SearchError> {
        let provider = self
            .registry
            .provider_by_name(&query.provider)
            .map_err(|_| SearchError::InvalidProvider {
                available: self.registry.providers(),
            })?;

        if query.keyword.is_empty() {
            return Err(SearchError::MissingKeyword);
        }

        if query.page < 1 {
            return Err(SearchError::InvalidPage);
        }

        Ok(provider)
    }

    /// Call the provider, racing it against the deadline and `cancel`
    async fn dispatch(
        &self,
        provider: &Provider,
        query: &mut Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawResult>, SearchError> {
        query.results.clear();
        query.start = Some(Utc::now());
        query.state = QueryState::Dispatched;

        let started = Instant::now();
        let token = cancel.child_token();
        let _guard = token.clone().drop_guard();
        let ctx = SearchContext::new(token, deadline_after(started, query.timeout));
        let args = SearchArgs::new(query.keyword.clone(), query.page);

        info!(
            "Searching '{}' on {} (page {}, timeout {:?})",
            query.keyword, provider.name(), query.page, query.timeout
        );

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Canceled),
            _ = sleep_until(ctx.deadline()) => Err(SearchError::Timeout),
            result = provider.searcher().search(&ctx, &args) => {
                query.elapsed = Some(started.elapsed());
                result.map_err(|e| classify(&ctx, e))
            }
        };

        if let Err(ref e) = result {
            warn!("Search on {} failed: {}", provider.name(), e);
            query.state = match e {
                SearchError::Timeout => QueryState::TimedOut,
                SearchError::Canceled => QueryState::Canceled,
                _ => QueryState::BackendFailed,
            };
        }

        result
    }

    /// Hand the selected result's link to the opener
    async fn goto(&self, query: &mut Query) -> Result<Outcome, SearchError> {
        let index = query.goto_index;
        if index > query.results.len() {
            query.state = QueryState::GotoFailed;
            return Err(SearchError::InvalidGotoIndex {
                max: query.results.len(),
            });
        }

        let link = query.results[index - 1].link.clone();
        if let Err(e) = self.opener.open(&link).await {
            query.state = QueryState::GotoFailed;
            return Err(SearchError::GotoCommandFailed {
                link,
                reason: format!("{:#}", e),
            });
        }

        query.state = QueryState::GotoResolved;
        Ok(Outcome::Opened { link })
    }
}

/// Map a provider error, preferring what the context says happened
fn classify(ctx: &SearchContext, error: anyhow::Error) -> SearchError {
    if ctx.is_cancelled() {
        SearchError::Canceled
    } else if ctx.is_expired() {
        SearchError::Timeout
    } else {
        SearchError::BackendFailure(format!("{:#}", error))
    }
}

fn normalize(raw: &[RawResult]) -> Result<Vec<SearchResult>, SearchError> {
    raw.iter()
        .map(|r| SearchResult::from_raw(r).map_err(|e| SearchError::BackendFailure(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderRegistration, Searcher};
    use crate::results::{DATE, TITLE};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Returns a fixed list of records
    struct Fixed(Vec<RawResult>);

    #[async_trait]
    impl Searcher for Fixed {
        async fn search(
            &self,
            _ctx: &SearchContext,
            _args: &SearchArgs,
        ) -> anyhow::Result<Vec<RawResult>> {
            Ok(self.0.clone())
        }
    }

    /// Sleeps before answering
    struct Slow(Duration);

    #[async_trait]
    impl Searcher for Slow {
        async fn search(
            &self,
            _ctx: &SearchContext,
            _args: &SearchArgs,
        ) -> anyhow::Result<Vec<RawResult>> {
            tokio::time::sleep(self.0).await;
            Ok(vec![RawResult::new("http://late", "Late")])
        }
    }

    struct Failing;

    #[async_trait]
    impl Searcher for Failing {
        async fn search(
            &self,
            _ctx: &SearchContext,
            _args: &SearchArgs,
        ) -> anyhow::Result<Vec<RawResult>> {
            Err(anyhow!("bad response: 502"))
        }
    }

    /// Remembers the arguments and context it was called with
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(SearchArgs, SearchContext)>>,
    }

    #[async_trait]
    impl Searcher for Recording {
        async fn search(
            &self,
            ctx: &SearchContext,
            args: &SearchArgs,
        ) -> anyhow::Result<Vec<RawResult>> {
            self.calls.lock().unwrap().push((args.clone(), ctx.clone()));
            Ok(vec![RawResult::new("http://a", "A")])
        }
    }

    /// Keeps the context it was handed, then fails or stalls
    #[derive(Default)]
    struct Watching {
        ctx: Mutex<Option<SearchContext>>,
        fail: bool,
    }

    #[async_trait]
    impl Searcher for Watching {
        async fn search(
            &self,
            ctx: &SearchContext,
            _args: &SearchArgs,
        ) -> anyhow::Result<Vec<RawResult>> {
            *self.ctx.lock().unwrap() = Some(ctx.clone());
            if self.fail {
                return Err(anyhow!("connection reset"));
            }
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Opener for RecordingOpener {
        async fn open(&self, link: &str) -> anyhow::Result<()> {
            self.opened.lock().unwrap().push(link.to_string());
            if self.fail {
                Err(anyhow!("exit status: 1"))
            } else {
                Ok(())
            }
        }
    }

    fn three_results() -> Vec<RawResult> {
        vec![
            RawResult::new("http://a", "A"),
            RawResult::new("http://b", "B").with_description("second"),
            RawResult::new("http://c", "C"),
        ]
    }

    fn search_with(name: &str, searcher: Arc<dyn Searcher>) -> (Search, Arc<RecordingOpener>) {
        let registry = ProviderRegistry::new();
        registry
            .register(ProviderRegistration::new(name).searcher(searcher))
            .unwrap();
        let opener = Arc::new(RecordingOpener::default());
        let search = Search::new(Arc::new(registry)).with_opener(opener.clone());
        (search, opener)
    }

    #[tokio::test]
    async fn test_demo_scenario() {
        let registry = ProviderRegistry::new();
        registry
            .register(
                ProviderRegistration::new("demo")
                    .title("Demo")
                    .searcher(Arc::new(Fixed(vec![
                        RawResult::new("http://a", "A"),
                        RawResult::new("http://b", "B"),
                    ]))),
            )
            .unwrap();
        let search = Search::new(Arc::new(registry));

        let mut query = Query::new("demo", "x");
        let outcome = search.run(&mut query).await.unwrap();

        assert_eq!(outcome, Outcome::Results);
        assert_eq!(
            query.results,
            vec![SearchResult::new("http://a", "A"), SearchResult::new("http://b", "B")]
        );
        assert!(query.results.iter().all(|r| r.description.is_empty() && r.date.is_none()));
        assert!(query.http_status.is_none());
        assert!(query.start.is_some());
        assert!(query.elapsed.is_some());
        assert_eq!(query.state, QueryState::Completed);
    }

    #[tokio::test]
    async fn test_preserves_order_and_length() {
        let raw: Vec<RawResult> = (0..25)
            .rev()
            .map(|i| RawResult::new(format!("http://{}", i), format!("T{}", i)))
            .collect();
        let (search, _) = search_with("demo", Arc::new(Fixed(raw.clone())));

        let mut query = Query::new("demo", "x");
        search.run(&mut query).await.unwrap();

        assert_eq!(query.results.len(), raw.len());
        for (result, raw) in query.results.iter().zip(&raw) {
            assert_eq!(Some(result.link.as_str()), raw.str_field("link"));
            assert_eq!(Some(result.title.as_str()), raw.str_field(TITLE));
        }
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let raw = vec![RawResult::new("http://a", "A"), RawResult::new("http://a", "A")];
        let (search, _) = search_with("demo", Arc::new(Fixed(raw)));

        let mut query = Query::new("demo", "x");
        search.run(&mut query).await.unwrap();

        assert_eq!(query.results.len(), 2);
    }

    #[tokio::test]
    async fn test_passes_arguments() {
        let recording = Arc::new(Recording::default());
        let (search, _) = search_with("demo", recording.clone());

        let mut query = Query::new("demo", "rust lang")
            .with_page(3)
            .with_timeout(Duration::from_secs(2));
        search.run(&mut query).await.unwrap();

        let calls = recording.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SearchArgs::new("rust lang", 3));
        // Context is released once the search returns
        assert!(calls[0].1.is_cancelled());
    }

    #[tokio::test]
    async fn test_invalid_page() {
        for page in [0, -1] {
            let (search, _) = search_with("demo", Arc::new(Fixed(three_results())));
            let mut query = Query::new("demo", "x").with_page(page);

            let err = search.run(&mut query).await.unwrap_err();

            assert_eq!(err, SearchError::InvalidPage);
            assert_eq!(query.http_status, Some(400));
            assert!(query.results.is_empty());
            assert!(query.start.is_none());
            assert_eq!(query.state, QueryState::Invalid);
        }
    }

    #[tokio::test]
    async fn test_missing_keyword() {
        let recording = Arc::new(Recording::default());
        let (search, _) = search_with("demo", recording.clone());

        let mut query = Query::new("demo", "");
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(err, SearchError::MissingKeyword);
        assert_eq!(query.http_status, Some(400));
        assert!(recording.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let (search, _) = search_with("demo", Arc::new(Fixed(three_results())));

        let mut query = Query::new("nope", "x").with_page(0);
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(
            err,
            SearchError::InvalidProvider {
                available: vec!["demo".to_string()]
            }
        );
        assert_eq!(query.http_status, Some(400));
        assert!(query.results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let (search, _) = search_with("slow", Arc::new(Slow(Duration::from_secs(10))));

        let mut query = Query::new("slow", "x").with_timeout(Duration::from_millis(50));
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(err, SearchError::Timeout);
        assert_eq!(query.http_status, Some(504));
        assert!(query.results.is_empty());
        assert!(query.elapsed.is_none());
        assert_eq!(query.state, QueryState::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_but_within_deadline() {
        let (search, _) = search_with("slow", Arc::new(Slow(Duration::from_millis(20))));

        let mut query = Query::new("slow", "x").with_timeout(Duration::from_secs(1));
        search.run(&mut query).await.unwrap();

        assert_eq!(query.results.len(), 1);
        assert!(query.elapsed.unwrap() >= Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancel() {
        let (search, _) = search_with("slow", Arc::new(Slow(Duration::from_secs(10))));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let mut query = Query::new("slow", "x").with_timeout(Duration::from_secs(60));
        let err = search.run_with_cancel(&mut query, &cancel).await.unwrap_err();

        assert_eq!(err, SearchError::Canceled);
        assert_eq!(query.http_status, Some(500));
        assert!(query.results.is_empty());
        assert_eq!(query.state, QueryState::Canceled);
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let (search, _) = search_with("broken", Arc::new(Failing));

        let mut query = Query::new("broken", "x");
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(err, SearchError::BackendFailure("bad response: 502".to_string()));
        assert_eq!(query.http_status, Some(500));
        assert!(query.results.is_empty());
        assert_eq!(query.state, QueryState::BackendFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_cancelled_after_timeout() {
        let watching = Arc::new(Watching::default());
        let (search, _) = search_with("stuck", watching.clone());

        let mut query = Query::new("stuck", "x").with_timeout(Duration::from_millis(50));
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(err, SearchError::Timeout);
        assert_eq!(query.http_status, Some(504));
        let ctx = watching.ctx.lock().unwrap().clone().unwrap();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_context_cancelled_after_backend_failure() {
        let watching = Arc::new(Watching {
            fail: true,
            ..Default::default()
        });
        let (search, _) = search_with("broken", watching.clone());

        let mut query = Query::new("broken", "x");
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(err, SearchError::BackendFailure("connection reset".to_string()));
        assert_eq!(query.http_status, Some(500));
        let ctx = watching.ctx.lock().unwrap().clone().unwrap();
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_huge_timeout_is_clamped() {
        let (search, _) = search_with("demo", Arc::new(Fixed(three_results())));

        let mut query = Query::new("demo", "x").with_timeout(Duration::MAX);
        search.run(&mut query).await.unwrap();
        assert_eq!(query.results.len(), 3);

        let timeout = crate::config::parse_timeout("500000000years", Duration::from_secs(5));
        let mut query = Query::new("demo", "x").with_timeout(timeout);
        search.run(&mut query).await.unwrap();
        assert_eq!(query.state, QueryState::Completed);
    }

    #[tokio::test]
    async fn test_malformed_record() {
        let raw = vec![
            RawResult::new("http://a", "A"),
            RawResult::default().with_field("link", "http://b"),
        ];
        let (search, _) = search_with("demo", Arc::new(Fixed(raw)));

        let mut query = Query::new("demo", "x");
        let err = search.run(&mut query).await.unwrap_err();

        assert!(matches!(err, SearchError::BackendFailure(_)));
        assert_eq!(query.http_status, Some(500));
        assert!(query.results.is_empty());
    }

    #[tokio::test]
    async fn test_bad_date_is_unknown() {
        let raw = vec![RawResult::new("http://a", "A").with_field(DATE, 1458000000)];
        let (search, _) = search_with("demo", Arc::new(Fixed(raw)));

        let mut query = Query::new("demo", "x");
        search.run(&mut query).await.unwrap();

        assert!(query.results[0].date.is_none());
    }

    #[tokio::test]
    async fn test_goto_opens_selected_link() {
        let (search, opener) = search_with("demo", Arc::new(Fixed(three_results())));

        let mut query = Query::new("demo", "x").with_goto(2);
        let outcome = search.run(&mut query).await.unwrap();

        assert_eq!(
            outcome,
            Outcome::Opened {
                link: "http://b".to_string()
            }
        );
        assert_eq!(*opener.opened.lock().unwrap(), vec!["http://b".to_string()]);
        assert_eq!(query.results.len(), 3);
        assert_eq!(query.state, QueryState::GotoResolved);
    }

    #[tokio::test]
    async fn test_goto_out_of_range() {
        let (search, opener) = search_with("demo", Arc::new(Fixed(three_results())));

        let mut query = Query::new("demo", "x").with_goto(4);
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(err, SearchError::InvalidGotoIndex { max: 3 });
        assert!(query.http_status.is_none());
        assert!(opener.opened.lock().unwrap().is_empty());
        assert_eq!(query.state, QueryState::GotoFailed);
    }

    #[tokio::test]
    async fn test_goto_command_failure() {
        let registry = ProviderRegistry::new();
        registry
            .register(ProviderRegistration::new("demo").searcher(Arc::new(Fixed(three_results()))))
            .unwrap();
        let opener = Arc::new(RecordingOpener {
            fail: true,
            ..Default::default()
        });
        let search = Search::new(Arc::new(registry)).with_opener(opener);

        let mut query = Query::new("demo", "x").with_goto(1);
        let err = search.run(&mut query).await.unwrap_err();

        assert_eq!(
            err,
            SearchError::GotoCommandFailed {
                link: "http://a".to_string(),
                reason: "exit status: 1".to_string(),
            }
        );
        assert!(err.to_string().contains("FERRET_GOTO_CMD"));
        assert!(query.http_status.is_none());
    }
}
