//! Delivery policies observed through a running Bloc.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blocflow::bloc::{Bloc, BlocBuilder};
use blocflow::transformer::Transformer;
use common::{debug_config, journal, screen_classifier, ScreenEvent, ScreenFactory};
use tokio::time::Instant;

fn builder() -> BlocBuilder<ScreenEvent, ScreenFactory> {
    let (classifier, _) = screen_classifier(debug_config());
    Bloc::builder("transformers", classifier)
}

fn search(query: &str) -> ScreenEvent {
    ScreenEvent::Search {
        query: query.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn debounce_delivers_only_latest_event_after_quiet_period() {
    let started = Instant::now();
    let calls = journal::<(String, Duration)>();
    let log = calls.clone();

    let bloc = builder()
        .on("search", Transformer::debounce_standard(), move |event, _ctx| {
            let log = log.clone();
            async move {
                if let ScreenEvent::Search { query } = event {
                    log.lock().push((query, started.elapsed()));
                }
                Ok(())
            }
        })
        .build()
        .unwrap();

    bloc.submit(search("f")).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    bloc.submit(search("fo")).unwrap();

    tokio::time::sleep(Duration::from_millis(1000)).await;

    let calls = calls.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "fo");
    assert!(calls[0].1 >= Duration::from_millis(450));
    assert!(calls[0].1 < Duration::from_millis(470));

    bloc.close().await;
}

#[tokio::test(start_paused = true)]
async fn debounce_fires_again_for_events_after_the_window() {
    let calls = journal::<String>();
    let log = calls.clone();

    let bloc = builder()
        .on("search", Transformer::debounce_fast(), move |event, _ctx| {
            let log = log.clone();
            async move {
                if let ScreenEvent::Search { query } = event {
                    log.lock().push(query);
                }
                Ok(())
            }
        })
        .build()
        .unwrap();

    bloc.submit(search("a")).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    bloc.submit(search("b")).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    bloc.submit(search("c")).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(*calls.lock(), vec!["a".to_string(), "c".to_string()]);
    bloc.close().await;
}

#[tokio::test(start_paused = true)]
async fn debounce_flushes_pending_event_on_close() {
    let calls = journal::<String>();
    let log = calls.clone();

    let bloc = builder()
        .on("search", Transformer::debounce_very_slow(), move |event, _ctx| {
            let log = log.clone();
            async move {
                if let ScreenEvent::Search { query } = event {
                    log.lock().push(query);
                }
                Ok(())
            }
        })
        .build()
        .unwrap();

    bloc.submit(search("pending")).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    bloc.close().await;

    assert_eq!(*calls.lock(), vec!["pending".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn debounce_discards_pending_event_on_cancel() {
    let calls = journal::<String>();
    let log = calls.clone();

    let bloc = builder()
        .on("search", Transformer::debounce_slow(), move |event, _ctx| {
            let log = log.clone();
            async move {
                if let ScreenEvent::Search { query } = event {
                    log.lock().push(query);
                }
                Ok(())
            }
        })
        .build()
        .unwrap();

    bloc.submit(search("dropped")).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    bloc.cancel().await;
    tokio::time::sleep(Duration::from_millis(2000)).await;

    assert!(calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn sequential_never_overlaps_and_keeps_order() {
    let started = Instant::now();
    let spans = journal::<(u32, Duration, Duration)>();
    let log = spans.clone();

    let bloc = builder()
        .on("submit", Transformer::sequential(), move |event, _ctx| {
            let log = log.clone();
            async move {
                let ScreenEvent::Submit { step } = event else {
                    return Ok(());
                };
                let begin = started.elapsed();
                tokio::time::sleep(Duration::from_millis(100)).await;
                log.lock().push((step, begin, started.elapsed()));
                Ok(())
            }
        })
        .build()
        .unwrap();

    bloc.submit(ScreenEvent::Submit { step: 1 }).unwrap();
    bloc.submit(ScreenEvent::Submit { step: 2 }).unwrap();
    bloc.close().await;

    let spans = spans.lock().clone();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].0, 1);
    assert_eq!(spans[1].0, 2);
    // handler 2 starts only after handler 1 resolved
    assert!(spans[1].1 >= spans[0].2);
    assert!(spans[1].2 >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn sequential_continues_after_failure_and_panic() {
    let completed = journal::<u32>();
    let log = completed.clone();

    let bloc = builder()
        .on("submit", Transformer::sequential(), move |event, _ctx| {
            let log = log.clone();
            async move {
                let ScreenEvent::Submit { step } = event else {
                    return Ok(());
                };
                tokio::time::sleep(Duration::from_millis(10)).await;
                match step {
                    1 => anyhow::bail!("step 1 rejected"),
                    2 => panic!("step 2 blew up"),
                    _ => {}
                }
                log.lock().push(step);
                Ok(())
            }
        })
        .build()
        .unwrap();

    for step in 1..=3 {
        bloc.submit(ScreenEvent::Submit { step }).unwrap();
    }
    bloc.close().await;

    assert_eq!(*completed.lock(), vec![3]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_handlers_overlap() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let (active_in, peak_in) = (active.clone(), peak.clone());

    let bloc = builder()
        .on("refresh", Transformer::Concurrent, move |_event, _ctx| {
            let active = active_in.clone();
            let peak = peak_in.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .build()
        .unwrap();

    let started = Instant::now();
    for _ in 0..3 {
        bloc.submit(ScreenEvent::Refresh).unwrap();
    }
    bloc.close().await;

    assert_eq!(peak.load(Ordering::SeqCst), 3);
    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(active.load(Ordering::SeqCst), 0);
}
