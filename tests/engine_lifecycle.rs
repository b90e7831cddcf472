//! Host-facing lifecycle: translate / abort / init with callbacks.

use custom_engine::host::HostEvent;
use custom_engine::{
    CustomEngine, EngineOptions, Error, FailureStatus, Fetcher, FnCallbacks, FnFetcher, Progress,
    RateLimit, RecordingHost, TranslateOutcome, TranslationFailure, TranslationUnit,
    UnimplementedFetcher,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Records which callbacks fired, in order.
#[derive(Default)]
struct Recorder {
    loaded: Mutex<Vec<TranslationUnit>>,
    errors: Mutex<Vec<(TranslationFailure, String)>>,
    order: Mutex<Vec<&'static str>>,
}

impl Recorder {
    fn callbacks(self: &Arc<Self>) -> FnCallbacks {
        let (a, b, c) = (self.clone(), self.clone(), self.clone());
        FnCallbacks::new()
            .on_after_loading(move |unit| {
                a.order.lock().unwrap().push("loaded");
                a.loaded.lock().unwrap().push(unit);
            })
            .on_error(move |failure, message| {
                b.order.lock().unwrap().push("error");
                b.errors
                    .lock()
                    .unwrap()
                    .push((failure.clone(), message.to_string()));
            })
            .always(move || c.order.lock().unwrap().push("always"))
    }

    fn order(&self) -> Vec<&'static str> {
        self.order.lock().unwrap().clone()
    }
}

fn counting_echo() -> (Arc<dyn Fetcher>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let fetcher = FnFetcher::new(move |items: Vec<String>| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, Error>(items) }
    });
    (Arc::new(fetcher), calls)
}

fn engine_with(fetcher: Arc<dyn Fetcher>, host: Arc<RecordingHost>) -> CustomEngine {
    CustomEngine::builder(fetcher)
        .without_env()
        .with_options(EngineOptions::new().with_api_key("test-key"))
        .with_host(host)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_translate_delivers_unit_then_always() {
    let host = Arc::new(RecordingHost::new());
    let (fetcher, calls) = counting_echo();
    let engine = engine_with(fetcher, host.clone());
    let recorder = Arc::new(Recorder::default());

    let outcome = engine
        .translate(strings(&["a", "b", "c"]), &recorder.callbacks())
        .await;

    assert_eq!(outcome, TranslateOutcome::Translated(3));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.order(), vec!["loaded", "always"]);
    let loaded = recorder.loaded.lock().unwrap();
    assert_eq!(loaded[0].source_text, "a,b,c");
    assert_eq!(loaded[0].translation_text, "a,b,c");
    assert_eq!(host.logs(), vec!["\n\nBatch size: 3".to_string()]);
}

#[tokio::test]
async fn test_translate_without_api_key_aborts() {
    let host = Arc::new(RecordingHost::new());
    let (fetcher, calls) = counting_echo();
    let engine = CustomEngine::builder(fetcher)
        .without_env()
        .with_options(EngineOptions::new())
        .with_host(host.clone())
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let outcome = engine
        .translate(strings(&["a"]), &recorder.callbacks())
        .await;

    assert_eq!(outcome, TranslateOutcome::Aborted);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.progress(), Progress::WindowClosed);
    assert_eq!(
        host.events(),
        vec![
            HostEvent::Alert("No API key specified!".into()),
            HostEvent::AbortTranslation,
        ]
    );
    assert!(recorder.order().is_empty());
}

#[tokio::test]
async fn test_missing_key_clears_open_window() {
    let host = Arc::new(RecordingHost::new());
    let (fetcher, _) = counting_echo();
    let engine = CustomEngine::builder(fetcher)
        .without_env()
        .with_options(EngineOptions::new().with_api_key("k"))
        .with_host(host)
        .with_rate_limit(RateLimit::new(10, 60.0).unwrap())
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    engine.translate(strings(&["a"]), &recorder.callbacks()).await;
    assert!(engine.progress().is_open());

    engine.update("api_key", serde_json::Value::Null).unwrap();
    let outcome = engine.translate(strings(&["b"]), &recorder.callbacks()).await;
    assert_eq!(outcome, TranslateOutcome::Aborted);
    assert_eq!(engine.progress(), Progress::WindowClosed);
}

#[tokio::test]
async fn test_provider_failure_is_passed_through_without_logging() {
    let host = Arc::new(RecordingHost::new());
    let fetcher = FnFetcher::new(|_items: Vec<String>| async move {
        Err::<Vec<String>, _>(Error::from(
            TranslationFailure::new("Quota exceeded").with_status(456u16),
        ))
    });
    let engine = engine_with(Arc::new(fetcher), host.clone());
    let recorder = Arc::new(Recorder::default());

    let outcome = engine
        .translate(strings(&["a"]), &recorder.callbacks())
        .await;

    assert_eq!(outcome, TranslateOutcome::Failed);
    assert_eq!(recorder.order(), vec!["error", "always"]);
    let errors = recorder.errors.lock().unwrap();
    assert_eq!(errors[0].0.status, Some(FailureStatus::Code(456)));
    assert_eq!(errors[0].1, "Quota exceeded");
    // only the batch-size line, no failure detail
    assert_eq!(host.logs().len(), 1);
}

#[tokio::test]
async fn test_unexpected_failure_logs_detail() {
    let host = Arc::new(RecordingHost::new());
    let engine = engine_with(Arc::new(UnimplementedFetcher), host.clone());
    let recorder = Arc::new(Recorder::default());

    engine
        .translate(strings(&["a"]), &recorder.callbacks())
        .await;

    assert_eq!(recorder.order(), vec!["error", "always"]);
    let errors = recorder.errors.lock().unwrap();
    assert_eq!(errors[0].1, "Non implemented method!");
    assert!(errors[0].0.status.is_none());

    let logs = host.logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[1].contains("UnimplementedFetcher"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_reaches_error_callback() {
    let host = Arc::new(RecordingHost::new());
    let fetcher = FnFetcher::new(|_items: Vec<String>| async move {
        std::future::pending::<()>().await;
        Ok::<Vec<String>, Error>(Vec::new())
    });
    let engine = CustomEngine::builder(Arc::new(fetcher))
        .without_env()
        .with_options(EngineOptions::new().with_api_key("k").with_timeout(1.0))
        .with_host(host.clone())
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let started = tokio::time::Instant::now();
    engine
        .translate(strings(&["a"]), &recorder.callbacks())
        .await;

    assert!(started.elapsed() >= Duration::from_secs(1));
    let errors = recorder.errors.lock().unwrap();
    assert_eq!(errors[0].0.status, Some(FailureStatus::Code(200)));
    assert_eq!(errors[0].1, "Request timed out!");
    // timeout is an expected failure
    assert_eq!(host.logs().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_translate_across_batches() {
    let host = Arc::new(RecordingHost::new());
    let (fetcher, calls) = counting_echo();
    let engine = CustomEngine::builder(fetcher)
        .without_env()
        .with_options(EngineOptions::new().with_api_key("k"))
        .with_host(host.clone())
        .with_rate_limit(RateLimit::new(2, 2.0).unwrap())
        .with_max_batch_size(2)
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());

    let started = tokio::time::Instant::now();
    let outcome = engine
        .translate(strings(&["a", "b", "c", "d", "e", "f", "g"]), &recorder.callbacks())
        .await;

    // four batches: the third exhausts the window and waits two seconds
    assert_eq!(outcome, TranslateOutcome::Translated(7));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(
        host.logs(),
        vec!["\n\nBatch size: 7".to_string(), "Waiting 2s...".to_string()]
    );
    let loaded = recorder.loaded.lock().unwrap();
    assert_eq!(loaded[0].translation_text, "a,b,c,d,e,f,g");
}

#[tokio::test]
async fn test_abort_is_not_preemptive() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let first = Arc::new(AtomicUsize::new(0));

    let (s, r, f) = (started.clone(), release.clone(), first.clone());
    let fetcher = FnFetcher::new(move |items: Vec<String>| {
        let (s, r) = (s.clone(), r.clone());
        let is_first = f.fetch_add(1, Ordering::SeqCst) == 0;
        async move {
            if is_first {
                s.notify_one();
                r.notified().await;
            }
            Ok::<_, Error>(items)
        }
    });

    let host = Arc::new(RecordingHost::new());
    let engine = Arc::new(
        CustomEngine::builder(Arc::new(fetcher))
            .without_env()
            .with_options(EngineOptions::new().with_api_key("k"))
            .with_host(host.clone())
            .with_rate_limit(RateLimit::new(5, 60.0).unwrap())
            .with_max_batch_size(1)
            .build()
            .unwrap(),
    );
    let recorder = Arc::new(Recorder::default());

    let task = {
        let engine = engine.clone();
        let callbacks = Arc::new(recorder.callbacks());
        tokio::spawn(async move { engine.translate(strings(&["a", "b"]), &*callbacks).await })
    };

    started.notified().await;
    assert_eq!(engine.progress().step(), Some(2));

    engine.abort();
    assert_eq!(engine.progress(), Progress::WindowClosed);
    assert!(host.events().contains(&HostEvent::AbortTranslation));

    release.notify_one();
    let outcome = task.await.unwrap();

    // the in-flight request finished; the next batch opened a fresh window
    assert_eq!(outcome, TranslateOutcome::Translated(2));
    assert_eq!(engine.progress().step(), Some(2));
}

#[tokio::test]
async fn test_init_and_option_access() {
    let host = Arc::new(RecordingHost::new());
    let (fetcher, _) = counting_echo();
    let engine = engine_with(fetcher, host.clone());

    engine.init();
    assert_eq!(host.events(), vec![HostEvent::Init]);

    assert_eq!(engine.target_language(), "English - US");
    engine
        .update("target_language", serde_json::json!("Portuguese - BR"))
        .unwrap();
    assert_eq!(engine.target_language(), "Portuguese - BR");
    assert_eq!(
        engine.get_option("api_type").unwrap(),
        serde_json::json!("free")
    );
    assert!(engine.update("missing", serde_json::json!(1)).is_err());
}

#[tokio::test]
async fn test_oversized_timeout_is_rejected_and_never_panics() {
    let host = Arc::new(RecordingHost::new());
    let (fetcher, _) = counting_echo();
    let engine = engine_with(fetcher, host);

    assert!(engine.update("timeout", serde_json::json!(1e20)).is_err());
    assert_eq!(engine.timeout(), 0.0);

    let recorder = Arc::new(Recorder::default());
    let outcome = engine
        .translate(strings(&["a"]), &recorder.callbacks())
        .await;
    assert_eq!(outcome, TranslateOutcome::Translated(1));
    assert_eq!(recorder.order(), vec!["loaded", "always"]);

    // a builder-set value too large for a timer disables the race
    let (fetcher, _) = counting_echo();
    let engine = CustomEngine::builder(fetcher)
        .without_env()
        .with_options(EngineOptions::new().with_api_key("k").with_timeout(1e20))
        .build()
        .unwrap();
    let recorder = Arc::new(Recorder::default());
    let outcome = engine
        .translate(strings(&["a"]), &recorder.callbacks())
        .await;
    assert_eq!(outcome, TranslateOutcome::Translated(1));
    assert_eq!(recorder.order(), vec!["loaded", "always"]);
}

#[test]
fn test_builder_rejects_zero_batch_size() {
    let (fetcher, _) = counting_echo();
    let result = CustomEngine::builder(fetcher)
        .without_env()
        .with_options(EngineOptions::new())
        .with_max_batch_size(0)
        .build();
    assert!(matches!(result, Err(Error::Configuration { .. })));
}
