mod support;

use common::DigestConfig;
use infodigest::pipeline::{Pipeline, RunOutcome};
use infodigest::error::PipelineError;
use std::sync::Arc;
use support::*;

const TODAY: &str = "20 GEN 2026 Linee Vesuviane: sciopero dalle 9 alle 13";
const PAST: &str = "19 GEN 2026 Linee Vesuviane: lavori";

fn one_notice_site() -> MemoryFetcher {
    MemoryFetcher::new().with_page(
        page(1),
        listing(&[card("Sciopero", TODAY, None), card("Ieri", PAST, None)]),
    )
}

#[tokio::test]
async fn empty_day_sends_fixed_message_without_summarizing() {
    let fetcher = Arc::new(MemoryFetcher::new().with_page(page(1), listing(&[card("Ieri", PAST, None)])));
    let llm = Arc::new(RecordingLlm::replying("unused"));
    let delivery = Arc::new(RecordingDelivery::default());

    let pipeline = Pipeline::new(test_config(), fetcher, Some(llm.clone()), delivery.clone());
    let outcome = pipeline.run_once().await.unwrap();

    assert_eq!(outcome, RunOutcome::NothingToday);
    assert!(llm.requests().is_empty());
    assert_eq!(
        delivery.messages(),
        vec!["Nessuna comunicazione Infomobilità Ferrovia / Linee Vesuviane per oggi.".to_string()]
    );
}

#[tokio::test]
async fn summary_is_headed_and_sent() {
    let llm = Arc::new(RecordingLlm::replying("\n- Sciopero Linee Vesuviane 9-13\n"));
    let delivery = Arc::new(RecordingDelivery::default());

    let pipeline = Pipeline::new(
        test_config(),
        Arc::new(one_notice_site()),
        Some(llm.clone()),
        delivery.clone(),
    );
    let outcome = pipeline.run_once().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Delivered {
            articles: 1,
            summarized: true
        }
    );

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].system_prompt.as_deref(),
        Some(DigestConfig::default().system_prompt.as_str())
    );
    assert!(requests[0]
        .prompt
        .contains("NOTIZIA 1\nTitolo: Sciopero\nData: 2026-01-20\nTesto:\n"));
    assert!(!requests[0].prompt.contains("NOTIZIA 2"));

    let messages = delivery.messages();
    assert_eq!(
        messages,
        vec![format!(
            "{}\n\n- Sciopero Linee Vesuviane 9-13",
            DigestConfig::default().summary_header
        )]
    );
}

#[tokio::test]
async fn long_summary_is_cut_to_delivery_limit() {
    let llm = Arc::new(RecordingLlm::replying(&"ritardo ".repeat(1000)));
    let delivery = Arc::new(RecordingDelivery::default());

    let pipeline = Pipeline::new(test_config(), Arc::new(one_notice_site()), Some(llm), delivery.clone());
    pipeline.run_once().await.unwrap();

    let messages = delivery.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].chars().count(), 4000);
}

#[tokio::test]
async fn without_summarizer_notices_go_out_verbatim() {
    let delivery = Arc::new(RecordingDelivery::default());

    let pipeline = Pipeline::new(test_config(), Arc::new(one_notice_site()), None, delivery.clone());
    let outcome = pipeline.run_once().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Delivered {
            articles: 1,
            summarized: false
        }
    );
    let message = &delivery.messages()[0];
    assert!(message.starts_with(&DigestConfig::default().verbatim_header));
    assert!(message.contains("📅 2026-01-20\nSciopero\n"));
}

#[tokio::test]
async fn summarizer_failure_delivers_nothing() {
    let llm = Arc::new(RecordingLlm::failing(502, "bad gateway"));
    let delivery = Arc::new(RecordingDelivery::default());

    let pipeline = Pipeline::new(test_config(), Arc::new(one_notice_site()), Some(llm), delivery.clone());

    let err = pipeline.run_once().await.unwrap_err();
    assert!(matches!(err, PipelineError::Summarization(_)));
    assert!(err.to_string().contains("502"));

    assert_eq!(pipeline.run().await, None);
    assert!(delivery.messages().is_empty());
}

#[tokio::test]
async fn listing_failure_is_caught_by_run() {
    let fetcher = Arc::new(MemoryFetcher::new().with_status(page(1), 500));
    let delivery = Arc::new(RecordingDelivery::default());

    let pipeline = Pipeline::new(test_config(), fetcher, None, delivery.clone());

    assert_eq!(pipeline.run().await, None);
    assert!(delivery.messages().is_empty());
}
