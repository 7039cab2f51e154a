use std::sync::Arc;
use std::time::Duration;

use reelsense::inference::EngineState;
use reelsense::model::ModelKind;
use reelsense::tokenizer::{PAD, SEQUENCE_LENGTH};
use reelsense::{Sentiment, SentimentError};

use crate::support::{engine, engine_with, Options, EXAMPLE_IDS, EXAMPLE_REVIEW};

#[tokio::test]
async fn test_example_review_scored_by_both_models() {
    let (counters, engine) = engine();

    let prediction = engine.predict(EXAMPLE_REVIEW).await.unwrap();

    assert_eq!(prediction.lstm.sentiment, Sentiment::Positive);
    assert_eq!(prediction.lstm.confidence, 0.82);
    assert_eq!(prediction.lstm.score, 0.82);
    assert_eq!(prediction.rnn.sentiment, Sentiment::Negative);
    assert!((prediction.rnn.confidence - 0.87).abs() < 1e-6);
    assert_eq!(prediction.rnn.score, 0.13);

    // Both models see the same encoded review
    let scored = counters.scored();
    assert_eq!(scored.len(), 2);
    for (_, tokens) in &scored {
        assert_eq!(tokens.len(), SEQUENCE_LENGTH);
        assert_eq!(&tokens[..7], &EXAMPLE_IDS);
        assert!(tokens[7..].iter().all(|&t| t == PAD));
    }
    let mut kinds: Vec<_> = scored.iter().map(|(kind, _)| *kind).collect();
    kinds.sort_by_key(|kind| kind.to_string());
    assert_eq!(kinds, vec![ModelKind::Lstm, ModelKind::Rnn]);
}

#[tokio::test]
async fn test_empty_review_on_cold_engine_loads_then_rejects() {
    let (counters, engine) = engine();

    let err = engine.predict("").await.unwrap_err();
    assert_eq!(err, SentimentError::InvalidInput("No review text provided".to_string()));

    // Loading happened before the input check; nothing was scored
    assert_eq!(counters.fetches(), 1);
    assert_eq!(counters.loads(), 2);
    assert!(counters.scored().is_empty());
    assert_eq!(engine.state(), EngineState::Warm);
}

#[tokio::test]
async fn test_punctuation_only_review_is_scored_as_padding() {
    let (counters, engine) = engine();

    engine.predict("?!... 123").await.unwrap();

    let scored = counters.scored();
    assert_eq!(scored.len(), 2);
    assert!(scored[0].1.iter().all(|&t| t == PAD));
}

#[tokio::test]
async fn test_long_review_truncated_to_sequence_length() {
    let (counters, engine) = engine();
    let review = vec!["movie"; 750].join(" ");

    engine.predict(&review).await.unwrap();

    let (_, tokens) = &counters.scored()[0];
    assert_eq!(tokens.len(), SEQUENCE_LENGTH);
    assert!(tokens.iter().all(|&t| t == 20));
}

#[tokio::test]
async fn test_boundary_score_is_negative() {
    let (_, engine) = engine_with(Options { lstm_score: 0.5, rnn_score: 0.5, ..Options::default() });

    let prediction = engine.predict("the movie").await.unwrap();
    assert_eq!(prediction.lstm.sentiment, Sentiment::Negative);
    assert_eq!(prediction.lstm.confidence, 0.5);
    assert_eq!(prediction.rnn.sentiment, Sentiment::Negative);
}

#[tokio::test]
async fn test_models_may_disagree() {
    let (_, engine) = engine_with(Options { lstm_score: 0.08, rnn_score: 0.97, ..Options::default() });

    let prediction = engine.predict("terrible").await.unwrap();
    assert_eq!(prediction.lstm.sentiment, Sentiment::Negative);
    assert!((prediction.lstm.confidence - 0.92).abs() < 1e-6);
    assert_eq!(prediction.rnn.sentiment, Sentiment::Positive);
    assert_eq!(prediction.rnn.confidence, 0.97);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cold_requests_load_once() {
    let (counters, engine) = engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let review = if i % 2 == 0 { EXAMPLE_REVIEW } else { "terrible movie" };
                engine.predict(review).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(counters.fetches(), 1);
    assert_eq!(counters.loads(), 2);
    assert_eq!(counters.scored().len(), 32);
}

#[tokio::test]
async fn test_vocabulary_failure_leaves_engine_cold_and_retries() {
    let (counters, engine) = engine_with(Options { vocabulary_failures: 1, ..Options::default() });

    let err = engine.predict(EXAMPLE_REVIEW).await.unwrap_err();
    assert!(matches!(err, SentimentError::VocabularyUnavailable(_)), "{:?}", err);
    assert_eq!(counters.loads(), 0);
    assert_eq!(engine.state(), EngineState::Cold);
    assert!(!engine.status().vocabulary_loaded);

    // The next request tries again
    engine.predict(EXAMPLE_REVIEW).await.unwrap();
    assert_eq!(counters.fetches(), 2);
    assert_eq!(engine.state(), EngineState::Warm);
}

#[tokio::test]
async fn test_model_failure_reports_model_unavailable() {
    let (counters, engine) = engine_with(Options { failing_model: Some(ModelKind::Lstm), ..Options::default() });

    let err = engine.predict(EXAMPLE_REVIEW).await.unwrap_err();
    assert_eq!(err, SentimentError::ModelUnavailable("LSTM artifact missing".to_string()));

    let status = engine.status();
    assert!(status.vocabulary_loaded);
    assert!(!status.models_loaded);
    assert_eq!(status.state, EngineState::Cold);
    assert!(counters.scored().is_empty());
}

#[tokio::test]
async fn test_status_never_triggers_loading() {
    let (counters, engine) = engine();

    let status = engine.status();
    assert_eq!(status.state, EngineState::Cold);
    assert!(status.warm_since.is_none());
    assert_eq!(counters.fetches(), 0);
    assert_eq!(counters.loads(), 0);

    engine.ensure_loaded().await.unwrap();
    let status = engine.status();
    assert_eq!(status.state, EngineState::Warm);
    assert!(status.warm_since.is_some());

    // Warm timestamp is fixed at the first transition
    let since = status.warm_since;
    engine.predict("movie").await.unwrap();
    assert_eq!(engine.status().warm_since, since);
    assert_eq!(counters.fetches(), 1);
}

#[tokio::test]
async fn test_cancelled_cold_request_still_loads_once() {
    let (counters, engine) = engine();

    // Fetch takes ~20ms and both loads ~40ms more; the first caller gives up midway
    let first = tokio::time::timeout(Duration::from_millis(30), engine.predict(EXAMPLE_REVIEW)).await;
    assert!(first.is_err());

    engine.predict(EXAMPLE_REVIEW).await.unwrap();

    assert_eq!(counters.fetches(), 1);
    assert_eq!(counters.loads(), 2);
}
