//! End-to-end: use case -> data source -> scripted transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{
    AsyncUseCase, Callbacks, ExecutionPolicy, NetworkDataSource, UseCaseError, UseCaseRunner,
};
use crate::domain::codes::{NO_INTERNET, TIMEOUT};
use crate::domain::{ErrorDescriptor, Outcome, TransportError};
use crate::impls::{ConnectivityInterceptor, Reply, ScriptedTransport, StaticConnectivity};
use crate::ports::{ApiRequest, CancelScope, HttpTransport, fetch};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Article {
    title: String,
    descriapation: String,
    image: bool,
}

struct LoadArticle {
    source: NetworkDataSource<dyn HttpTransport>,
}

#[async_trait]
impl AsyncUseCase for LoadArticle {
    type Input = u32;
    type Output = Article;

    async fn run(&self, id: u32) -> Result<Outcome<Article>, UseCaseError> {
        self.run_scoped(id, self.source.scope()).await
    }

    async fn run_scoped(
        &self,
        id: u32,
        scope: &CancelScope,
    ) -> Result<Outcome<Article>, UseCaseError> {
        let outcome = self
            .source
            .scoped(scope.clone())
            .perform_request(|t| async move {
                fetch(&*t, ApiRequest::get(format!("articles/{id}"))).await
            })
            .await;
        Ok(outcome)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Loading,
    Success(Article),
    Empty,
    Error(ErrorDescriptor),
    Idle,
}

type Events = Arc<Mutex<Vec<Event>>>;

fn record(events: &Events) -> Callbacks<Article> {
    let push = |event: Event| {
        let events = events.clone();
        move || events.lock().unwrap().push(event)
    };
    let on_success = events.clone();
    let on_error = events.clone();
    Callbacks::new()
        .on_loading(push(Event::Loading))
        .on_success(move |a| on_success.lock().unwrap().push(Event::Success(a)))
        .on_empty(push(Event::Empty))
        .on_error(move |e| on_error.lock().unwrap().push(Event::Error(e)))
        .on_idle(push(Event::Idle))
}

fn runner(transport: Arc<dyn HttpTransport>) -> UseCaseRunner<LoadArticle> {
    UseCaseRunner::new(LoadArticle {
        source: NetworkDataSource::new(transport),
    })
}

async fn run_once(reply: Reply) -> Vec<Event> {
    let runner = runner(Arc::new(ScriptedTransport::with_replies([reply])));
    let events = Events::default();
    runner.execute(1, record(&events)).await;
    let events = events.lock().unwrap().clone();
    events
}

#[tokio::test(start_paused = true)]
async fn ok_response_delivers_the_article() {
    let events = run_once(Reply::json(
        200,
        json!({"title": "A1", "descriapation": "", "image": true}),
    ))
    .await;

    assert_eq!(
        events,
        vec![
            Event::Loading,
            Event::Success(Article {
                title: "A1".into(),
                descriapation: String::new(),
                image: true,
            }),
            Event::Idle,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn unauthorized_response_delivers_the_server_error() {
    let events = run_once(Reply::json(
        401,
        json!({"errorCode": "401", "errorMessage": "Unauthorized", "errorFieldList": []}),
    ))
    .await;

    assert_eq!(
        events,
        vec![
            Event::Loading,
            Event::Error(ErrorDescriptor::new(401, "Unauthorized")),
            Event::Idle,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_delivers_the_placeholder_with_timeout_code() {
    let events = run_once(Reply::fail(TransportError::Timeout("30s".into()))).await;
    assert_eq!(
        events,
        vec![
            Event::Loading,
            Event::Error(ErrorDescriptor::placeholder(TIMEOUT)),
            Event::Idle,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn no_content_delivers_empty() {
    let events = run_once(Reply::status(204)).await;
    assert_eq!(events, vec![Event::Loading, Event::Empty, Event::Idle]);
}

#[tokio::test(start_paused = true)]
async fn offline_device_reports_no_internet() {
    let transport = ScriptedTransport::with_replies([Reply::status(200)]).with_interceptor(
        Arc::new(ConnectivityInterceptor::new(Arc::new(StaticConnectivity::new(false)))),
    );
    let runner = runner(Arc::new(transport));
    let events = Events::default();
    runner.execute(1, record(&events)).await;

    let events = events.lock().unwrap().clone();
    assert_eq!(events[1], Event::Error(ErrorDescriptor::placeholder(NO_INTERNET)));
}

#[tokio::test(start_paused = true)]
async fn rapid_presses_only_deliver_the_latest_result() {
    let transport = Arc::new(ScriptedTransport::with_replies([
        Reply::json(200, json!({"title": "old", "descriapation": "", "image": false}))
            .after(Duration::from_millis(300)),
        Reply::json(200, json!({"title": "new", "descriapation": "", "image": false}))
            .after(Duration::from_millis(50)),
    ]));
    let runner = Arc::new(runner(transport).with_policy(ExecutionPolicy::CancelPrevious));
    let first_events = Events::default();
    let second_events = Events::default();

    let first = tokio::spawn({
        let runner = runner.clone();
        let callbacks = record(&first_events);
        async move { runner.execute(1, callbacks).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    runner.execute(2, record(&second_events)).await;
    first.await.unwrap();

    assert_eq!(
        *first_events.lock().unwrap(),
        vec![Event::Loading, Event::Idle]
    );
    let second = second_events.lock().unwrap().clone();
    assert!(matches!(&second[1], Event::Success(a) if a.title == "new"));
}

#[tokio::test(start_paused = true)]
async fn cancel_all_during_teardown_reports_empty() {
    let transport = Arc::new(ScriptedTransport::with_replies([Reply::status(200)
        .after(Duration::from_secs(5))]));
    let runner = Arc::new(runner(transport.clone()));
    let events = Events::default();

    let pending = tokio::spawn({
        let runner = runner.clone();
        let callbacks = record(&events);
        async move { runner.execute(1, callbacks).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    transport.cancel_all();
    pending.await.unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![Event::Loading, Event::Empty, Event::Idle]
    );
}
