use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use blueprint_core::app::{
    AsyncUseCase, Callbacks, NetworkDataSource, UseCaseError, UseCaseRunner, retry_outcome,
};
use blueprint_core::config::{AppConfig, RetrySettings};
use blueprint_core::domain::{Outcome, TransportError};
use blueprint_core::impls::{
    ConnectivityInterceptor, DefaultMessages, HeaderInterceptor, LoggingInterceptor, Reply,
    ReqwestTransport, ScriptedTransport, StaticConnectivity,
};
use blueprint_core::ports::{ApiRequest, CancelScope, HttpTransport, MessageLookup, fetch};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Article {
    title: String,
    descriapation: String,
    image: bool,
}

/// use case：記事を 1 件取得する（transient な失敗は呼び出し側でリトライ）
struct LoadArticle {
    source: NetworkDataSource<dyn HttpTransport>,
    retry: RetrySettings,
}

#[async_trait]
impl AsyncUseCase for LoadArticle {
    type Input = String;
    type Output = Article;

    async fn run(&self, path: String) -> Result<Outcome<Article>, UseCaseError> {
        self.run_scoped(path, self.source.scope()).await
    }

    async fn run_scoped(
        &self,
        path: String,
        scope: &CancelScope,
    ) -> Result<Outcome<Article>, UseCaseError> {
        if path.trim().is_empty() {
            return Err(UseCaseError::InvalidInput("empty article path".into()));
        }
        let source = self.source.scoped(scope.clone());
        let outcome = retry_outcome(&self.retry.policy(), |attempt| {
            let source = source.clone();
            let path = path.clone();
            async move {
                info!(attempt, path = %path, "loading article");
                source
                    .attempt_request(|t| async move { fetch(&*t, ApiRequest::get(path)).await })
                    .await
            }
        })
        .await;
        Ok(outcome)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).try_init() {
        eprintln!("tracing init failed: {e}");
    }
}

/// 台本：200 / 401 / timeout / 204 の 4 シナリオ
fn scripted_transport() -> ScriptedTransport {
    ScriptedTransport::with_replies([
        Reply::json(200, json!({"title": "A1", "descriapation": "", "image": true})),
        Reply::json(
            401,
            json!({"errorCode": "401", "errorMessage": "Unauthorized", "errorFieldList": []}),
        ),
        Reply::fail(TransportError::Timeout("scripted timeout".into())),
        Reply::status(204),
    ])
    .with_interceptor(Arc::new(HeaderInterceptor::new()))
    .with_interceptor(Arc::new(LoggingInterceptor))
}

fn callbacks(label: &str, messages: Arc<DefaultMessages>) -> Callbacks<Article> {
    let (l1, l2, l3, l4, l5) = (
        label.to_string(),
        label.to_string(),
        label.to_string(),
        label.to_string(),
        label.to_string(),
    );
    Callbacks::new()
        .on_loading(move || println!("[{l1}] loading"))
        .on_success(move |article| {
            let rendered = serde_json::to_string(&article).unwrap_or_default();
            println!("[{l2}] success: {rendered}");
        })
        .on_empty(move || println!("[{l3}] empty"))
        .on_error(move |error| {
            println!("[{l4}] error {}: {}", error.code, messages.describe(&error));
        })
        .on_idle(move || println!("[{l5}] idle"))
}

#[tokio::main]
async fn main() {
    init_tracing();

    // (A) 設定を読む（失敗しても既定値で続行）
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "configuration not loaded, using defaults");
            AppConfig::default()
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        std::process::exit(2);
    }

    // (B) transport を選ぶ：`--live <path>...` なら reqwest、それ以外は台本
    let args: Vec<String> = std::env::args().skip(1).collect();
    let live = args.first().map(String::as_str) == Some("--live");
    let connectivity = Arc::new(StaticConnectivity::default());
    let (transport, paths): (Arc<dyn HttpTransport>, Vec<String>) = if live {
        let transport = match ReqwestTransport::from_config(&config.http, connectivity.clone()) {
            Ok(transport) => transport,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        };
        info!(base_url = %transport.base_url(), "using live transport");
        (Arc::new(transport), args[1..].to_vec())
    } else {
        let transport = scripted_transport()
            .with_interceptor(Arc::new(ConnectivityInterceptor::new(connectivity.clone())));
        let paths = (1..=4).map(|n| format!("articles/{n}")).collect();
        (Arc::new(transport), paths)
    };

    // (C) use case を組み立てる（台本モードではリトライしない）
    let retry = if live {
        config.retry.clone()
    } else {
        RetrySettings {
            max_attempts: 1,
            ..config.retry.clone()
        }
    };
    let runner = UseCaseRunner::from_config(
        LoadArticle {
            source: NetworkDataSource::new(transport.clone()),
            retry,
        },
        &config.use_case,
    );

    // (D) 順番に実行
    let messages = Arc::new(DefaultMessages::new());
    for path in paths {
        runner.execute(path.clone(), callbacks(&path, messages.clone())).await;
    }

    // (E) 後始末：残っているリクエストを止める
    transport.cancel_all();
    runner.shutdown();
}
