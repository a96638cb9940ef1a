#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use stockdesk_api::{ApiErrorKind, ClassifiedError, RemoteCall};
    use stockdesk_core::{Envelope, FETCH_FAILED_MESSAGE, PaginationMetadata, RetrievalPayload};
    use tokio::time::{Instant, sleep};

    use crate::{ListRetriever, RetrievalError, RetrieverOptions};

    #[derive(Debug, Clone, PartialEq)]
    struct Row(u32);

    type Reply = Result<Envelope<Vec<Row>>, ClassifiedError>;

    #[derive(Default)]
    struct ScriptedRemote {
        replies: Mutex<VecDeque<(Duration, Reply)>>,
        calls: Mutex<Vec<RetrievalPayload>>,
    }

    impl ScriptedRemote {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn reply(&self, reply: Reply) {
            self.reply_after(Duration::ZERO, reply);
        }

        fn reply_after(&self, delay: Duration, reply: Reply) {
            self.replies.lock().unwrap().push_back((delay, reply));
        }

        fn calls(&self) -> Vec<RetrievalPayload> {
            self.calls.lock().unwrap().clone()
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RemoteCall<Row> for ScriptedRemote {
        async fn call(&self, payload: &RetrievalPayload) -> Reply {
            self.calls.lock().unwrap().push(payload.clone());
            let next = self.replies.lock().unwrap().pop_front();
            let (delay, reply) = next.unwrap_or_else(|| (Duration::ZERO, rows(&[], 0)));
            if !delay.is_zero() {
                sleep(delay).await;
            }
            reply
        }
    }

    fn rows(ids: &[u32], total: usize) -> Reply {
        Ok(Envelope {
            code: 200,
            status: "success".to_owned(),
            message: String::new(),
            data: Some(ids.iter().copied().map(Row).collect()),
            pagination: Some(PaginationMetadata {
                limit: 5,
                offset: 0,
                count: Some(ids.len()),
                total,
            }),
        })
    }

    fn server_error() -> Reply {
        Err(ClassifiedError {
            kind: ApiErrorKind::ServerError,
            message: "Internal server error".to_owned(),
            status: Some(500),
        })
    }

    fn first_page() -> RetrievalPayload {
        RetrievalPayload::new(5, 0)
    }

    fn options() -> RetrieverOptions {
        RetrieverOptions::default().with_debounce(Duration::from_millis(500))
    }

    /// Spawns and lets the first fetch reach the remote so replies are
    /// consumed in a known order.
    async fn started(remote: &Arc<ScriptedRemote>) -> ListRetriever<Row> {
        let retriever = ListRetriever::spawn(remote.clone(), first_page(), options());
        sleep(Duration::from_millis(1)).await;
        retriever
    }

    async fn settled(remote: &Arc<ScriptedRemote>) -> ListRetriever<Row> {
        let retriever = ListRetriever::spawn(remote.clone(), first_page(), options());
        retriever.wait_until_settled().await;
        retriever
    }

    #[tokio::test(start_paused = true)]
    async fn initial_fetch_publishes_rows_and_pagination() {
        let remote = ScriptedRemote::new();
        remote.reply(rows(&[1, 2], 12));

        let retriever = ListRetriever::spawn(remote.clone(), first_page(), options());
        assert!(retriever.state().is_loading);

        let state = retriever.wait_until_settled().await;
        assert_eq!(state.items, vec![Row(1), Row(2)]);
        assert_eq!(state.total(), 12);
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert_eq!(remote.calls(), vec![first_page()]);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_search_edits_coalesce_into_one_fetch() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        for term in ["a", "ab", "abc"] {
            retriever.set_payload(first_page().with_search(term));
            sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(remote.call_count(), 1);

        sleep(Duration::from_millis(390)).await;
        assert_eq!(remote.call_count(), 1);

        retriever.wait_until_settled().await;
        let calls = remote.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].search, "abc");
    }

    #[tokio::test(start_paused = true)]
    async fn search_is_applied_after_quiet_period() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        let started = Instant::now();
        retriever.set_payload(first_page().with_search("bolt"));
        retriever.wait_until_settled().await;

        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(500));
        assert!(waited < Duration::from_millis(510));
        assert_eq!(remote.calls()[1].search, "bolt");
    }

    #[tokio::test(start_paused = true)]
    async fn page_change_fetches_without_waiting() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        let started = Instant::now();
        retriever.set_payload(RetrievalPayload::new(5, 5));
        retriever.wait_until_settled().await;

        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(remote.calls()[1], RetrievalPayload::new(5, 5));
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_fetches_without_waiting() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        retriever.set_payload(first_page().with_filter("godown", "North"));
        sleep(Duration::from_millis(1)).await;

        assert_eq!(remote.call_count(), 2);
        assert_eq!(remote.calls()[1].filters["godown"], "North");
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_fetch_uses_last_settled_search() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        retriever.set_payload(first_page().with_search("x"));
        retriever.set_payload(RetrievalPayload::new(5, 5).with_search("x"));
        retriever.wait_until_settled().await;

        let calls = remote.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].offset, 5);
        assert_eq!(calls[1].search, "");
        assert_eq!(calls[2].offset, 5);
        assert_eq!(calls[2].search, "x");
    }

    #[tokio::test(start_paused = true)]
    async fn reverting_search_within_window_does_not_fetch() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        retriever.set_payload(first_page().with_search("a"));
        sleep(Duration::from_millis(200)).await;
        retriever.set_payload(first_page());
        retriever.wait_until_settled().await;
        sleep(Duration::from_secs(2)).await;

        assert_eq!(remote.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_payload_does_not_fetch() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        retriever.set_payload(first_page());
        retriever.wait_until_settled().await;

        assert_eq!(remote.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_repeats_identical_payload() {
        let remote = ScriptedRemote::new();
        remote.reply(rows(&[1], 1));
        remote.reply(rows(&[1, 2], 2));
        let retriever = settled(&remote).await;

        retriever.refetch();
        let state = retriever.wait_until_settled().await;

        assert_eq!(remote.calls(), vec![first_page(), first_page()]);
        assert_eq!(state.items, vec![Row(1), Row(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_engine_never_fetches_until_enabled() {
        let remote = ScriptedRemote::new();
        remote.reply(rows(&[7], 1));
        let retriever = ListRetriever::spawn(remote.clone(), first_page(), options().disabled());

        let state = retriever.wait_until_settled().await;
        assert!(!state.is_loading);
        assert!(state.items.is_empty());

        retriever.set_payload(RetrievalPayload::new(5, 5));
        retriever.refetch();
        retriever.set_payload(RetrievalPayload::new(5, 5).with_search("q"));
        retriever.wait_until_settled().await;
        assert_eq!(remote.call_count(), 0);

        retriever.set_enabled(true);
        let state = retriever.wait_until_settled().await;
        assert_eq!(remote.calls(), vec![RetrievalPayload::new(5, 5).with_search("q")]);
        assert_eq!(state.items, vec![Row(7)]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_keeps_response_already_in_flight() {
        let remote = ScriptedRemote::new();
        remote.reply_after(Duration::from_millis(200), rows(&[3], 1));
        let retriever = ListRetriever::spawn(remote.clone(), first_page(), options());

        retriever.set_enabled(false);
        let state = retriever.wait_until_settled().await;

        assert_eq!(state.items, vec![Row(3)]);
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_clears_rows_and_records_error() {
        let remote = ScriptedRemote::new();
        remote.reply(rows(&[1, 2], 2));
        remote.reply(server_error());
        let retriever = settled(&remote).await;
        assert_eq!(retriever.state().items.len(), 2);

        retriever.refetch();
        let state = retriever.wait_until_settled().await;

        assert!(state.items.is_empty());
        assert!(state.pagination.is_none());
        assert!(!state.is_loading);
        let error = state.error.expect("error recorded");
        assert_eq!(error.message(), "Internal server error");
        assert!(matches!(error, RetrievalError::Api(ref e) if e.kind == ApiErrorKind::ServerError));
    }

    #[tokio::test(start_paused = true)]
    async fn next_fetch_resets_error() {
        let remote = ScriptedRemote::new();
        remote.reply(server_error());
        remote.reply_after(Duration::from_millis(100), rows(&[4], 1));
        let retriever = settled(&remote).await;
        assert!(retriever.state().error.is_some());

        retriever.refetch();
        sleep(Duration::from_millis(10)).await;
        let loading = retriever.state();
        assert!(loading.is_loading);
        assert!(loading.error.is_none());

        let state = retriever.wait_until_settled().await;
        assert!(state.error.is_none());
        assert_eq!(state.items, vec![Row(4)]);
    }

    #[tokio::test(start_paused = true)]
    async fn unsuccessful_envelope_is_a_failure() {
        let remote = ScriptedRemote::new();
        remote.reply(Ok(Envelope {
            code: 500,
            status: "error".to_owned(),
            message: String::new(),
            data: None,
            pagination: None,
        }));

        let retriever = ListRetriever::spawn(remote.clone(), first_page(), options());
        let state = retriever.wait_until_settled().await;

        assert!(state.items.is_empty());
        assert_eq!(
            state.error,
            Some(RetrievalError::Rejected {
                code: 500,
                status: "error".to_owned(),
                message: FETCH_FAILED_MESSAGE.to_owned(),
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_without_data_yields_empty_list() {
        let remote = ScriptedRemote::new();
        remote.reply(Ok(Envelope {
            code: 200,
            status: "success".to_owned(),
            message: "No rows".to_owned(),
            data: None,
            pagination: None,
        }));

        let retriever = ListRetriever::spawn(remote.clone(), first_page(), options());
        let state = retriever.wait_until_settled().await;

        assert!(state.items.is_empty());
        assert!(state.error.is_none());
        assert!(state.is_not_found("missing"));
        assert!(!state.is_not_found(""));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        let remote = ScriptedRemote::new();
        remote.reply_after(Duration::from_millis(300), rows(&[1], 1));
        remote.reply_after(Duration::from_millis(10), rows(&[2], 1));
        let retriever = started(&remote).await;

        retriever.set_payload(RetrievalPayload::new(5, 5));
        let state = retriever.wait_until_settled().await;
        assert_eq!(state.items, vec![Row(2)]);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(retriever.state().items, vec![Row(2)]);
        assert!(!retriever.state().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_failure_does_not_clobber_newer_rows() {
        let remote = ScriptedRemote::new();
        remote.reply_after(Duration::from_millis(300), server_error());
        remote.reply(rows(&[9], 1));
        let retriever = started(&remote).await;

        retriever.refetch();
        retriever.wait_until_settled().await;
        sleep(Duration::from_secs(1)).await;

        let state = retriever.state();
        assert_eq!(state.items, vec![Row(9)]);
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn loading_stays_set_while_newer_fetch_is_pending() {
        let remote = ScriptedRemote::new();
        remote.reply_after(Duration::from_millis(50), rows(&[1], 1));
        remote.reply_after(Duration::from_millis(300), rows(&[2], 1));
        let retriever = started(&remote).await;

        retriever.refetch();
        sleep(Duration::from_millis(100)).await;
        let state = retriever.state();
        assert!(state.is_loading);
        assert!(state.items.is_empty());

        let state = retriever.wait_until_settled().await;
        assert_eq!(state.items, vec![Row(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_loading_then_result() {
        let remote = ScriptedRemote::new();
        remote.reply(rows(&[1], 1));
        remote.reply_after(Duration::from_millis(100), rows(&[5], 1));
        let retriever = settled(&remote).await;
        let mut updates = retriever.subscribe();
        updates.mark_unchanged();

        retriever.refetch();
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_loading);

        updates.changed().await.unwrap();
        let state = updates.borrow_and_update().clone();
        assert!(!state.is_loading);
        assert_eq!(state.items, vec![Row(5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels_pending_search() {
        let remote = ScriptedRemote::new();
        let retriever = settled(&remote).await;

        retriever.set_payload(first_page().with_search("late"));
        sleep(Duration::from_millis(100)).await;
        drop(retriever);
        sleep(Duration::from_secs(2)).await;

        assert_eq!(remote.call_count(), 1);
    }
}
