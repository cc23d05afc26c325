//! End-to-end branching flows through `StoryService` with a scripted generator.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::Semaphore;
use uuid::Uuid;

use branching_tales::db::StoryStore;
use branching_tales::story::{CompletionReason, StoryView};
use branching_tales::{AppError, GenerationError};

use common::{
    harness, harness_with_timeout, story_request, wait_until_pending, ScriptedGenerator,
    BRANCHING_CHAPTER, ENDING_CHAPTER,
};

fn ok(text: &str) -> Result<String, GenerationError> {
    Ok(text.to_string())
}

// ============================================================================
// BRANCHING
// ============================================================================

#[tokio::test]
async fn test_start_offers_first_decision() {
    let h = harness(ScriptedGenerator::new(vec![ok(BRANCHING_CHAPTER)]));

    let view = h.service.start_story(story_request(true)).await.unwrap();

    assert_eq!(view.chapters[0].text, "Itzel cruza el Templo Mayor.");
    assert_eq!(view.options.len(), 2);
    assert_eq!(view.options[1].text, "Buscar a Quetzalcóatl");
    assert_eq!(view.decision_count, 0);
    assert!(!view.completed);

    let prompts = h.generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Tenochtitlan"));
    assert!(prompts[0].contains("FORMATO INTERACTIVO"));
}

#[tokio::test]
async fn test_tree_completes_after_three_decisions() {
    let h = harness(ScriptedGenerator::new(vec![ok(BRANCHING_CHAPTER); 4]));
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;

    let mut view: Option<StoryView> = None;
    for _ in 0..3 {
        view = Some(h.service.choose(id, "A").await.unwrap());
    }
    let view = view.unwrap();

    assert_eq!(view.decision_count, 3);
    assert_eq!(view.chapters.len(), 4);
    assert_eq!(view.completion, Some(CompletionReason::DecisionLimit));
    assert!(view.options.is_empty());

    let rejected = h.service.choose(id, "A").await;
    assert!(matches!(rejected, Err(AppError::SessionCompleted)));
    assert_eq!(h.service.view(id).await.unwrap().decision_count, 3);

    let prompts = h.generator.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[1].contains(BRANCHING_CHAPTER));
    assert!(prompts[1].contains("DECISIÓN ELEGIDA: A) Subir al altar"));
    assert!(!prompts[2].contains("DECISIÓN FINAL"));
    assert!(prompts[3].contains("DECISIÓN FINAL"));
}

#[tokio::test]
async fn test_story_ends_when_chapter_has_no_decision() {
    let h = harness(ScriptedGenerator::new(vec![ok(BRANCHING_CHAPTER), ok(ENDING_CHAPTER)]));
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;

    let view = h.service.choose(id, "b").await.unwrap();

    assert_eq!(view.completion, Some(CompletionReason::NoOptions));
    assert_eq!(view.chapters[1].text, ENDING_CHAPTER);
    assert_eq!(view.decision_count, 1);
}

#[tokio::test]
async fn test_failed_continuation_soft_terminates() {
    let h = harness(ScriptedGenerator::new(vec![
        ok(BRANCHING_CHAPTER),
        ok(BRANCHING_CHAPTER),
        Err(GenerationError::Inference { message: "quota".into() }),
    ]));
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;
    h.service.choose(id, "A").await.unwrap();

    let view = h.service.choose(id, "B").await.unwrap();

    assert_eq!(view.completion, Some(CompletionReason::GenerationFailed));
    assert_eq!(view.chapters.len(), 3);
    assert!(view.chapters[2].synthetic);
    assert!(view.chapters[2].text.contains("Buscar a Quetzalcóatl"));
    assert!(view.options.is_empty());
    assert_eq!(view.notice.as_deref(), Some("Inference error: quota"));
}

#[tokio::test]
async fn test_unknown_option_and_session_are_rejected() {
    let h = harness(ScriptedGenerator::new(vec![ok(BRANCHING_CHAPTER)]));
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;

    assert!(matches!(h.service.choose(id, "C").await, Err(AppError::UnknownOption { .. })));
    assert!(matches!(h.service.choose(id, "AB").await, Err(AppError::UnknownOption { .. })));
    assert!(matches!(
        h.service.choose(Uuid::new_v4(), "A").await,
        Err(AppError::SessionNotFound { .. })
    ));
    assert_eq!(h.generator.prompts().len(), 1);
}

#[tokio::test]
async fn test_linear_story_completes_at_once() {
    let h = harness(ScriptedGenerator::new(vec![ok(BRANCHING_CHAPTER)]));

    let view = h.service.start_story(story_request(false)).await.unwrap();

    assert_eq!(view.completion, Some(CompletionReason::Linear));
    assert!(view.options.is_empty());
    assert!(!h.generator.prompts()[0].contains("FORMATO INTERACTIVO"));
}

// ============================================================================
// IN-FLIGHT GUARD, ABANDONMENT, TIMEOUT
// ============================================================================

#[tokio::test]
async fn test_second_choice_while_pending_is_rejected() {
    let gate = Arc::new(Semaphore::new(1));
    let h = harness(ScriptedGenerator::gated(
        vec![ok(BRANCHING_CHAPTER), ok(BRANCHING_CHAPTER)],
        gate.clone(),
    ));
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;

    let service = h.service.clone();
    let first = tokio::spawn(async move { service.choose(id, "A").await });
    wait_until_pending(&h.service, id).await;

    let second = h.service.choose(id, "B").await;
    assert!(matches!(second, Err(AppError::GenerationPending)));

    let during = h.service.view(id).await.unwrap();
    assert_eq!(during.decision_count, 0);
    assert_eq!(during.chapters.len(), 1);
    assert!(during.options.is_empty());

    gate.add_permits(1);
    let view = first.await.unwrap().unwrap();
    assert_eq!(view.decision_count, 1);
    assert_eq!(view.chapters.len(), 2);
    assert_eq!(h.generator.prompts().len(), 2);
}

#[tokio::test]
async fn test_abandoned_session_discards_late_result() {
    let gate = Arc::new(Semaphore::new(1));
    let h = harness(ScriptedGenerator::gated(
        vec![ok(BRANCHING_CHAPTER), ok(BRANCHING_CHAPTER)],
        gate.clone(),
    ));
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;

    let service = h.service.clone();
    let pending = tokio::spawn(async move { service.choose(id, "A").await });
    wait_until_pending(&h.service, id).await;

    h.service.abandon(id).await.unwrap();
    gate.add_permits(1);

    assert!(matches!(pending.await.unwrap(), Err(AppError::SessionNotFound { .. })));
    assert!(matches!(h.service.view(id).await, Err(AppError::SessionNotFound { .. })));
}

#[tokio::test]
async fn test_hung_generator_times_out_into_fallback() {
    let gate = Arc::new(Semaphore::new(1));
    let h = harness_with_timeout(
        ScriptedGenerator::gated(vec![ok(BRANCHING_CHAPTER)], gate),
        Duration::from_millis(50),
    );
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;

    let view = h.service.choose(id, "A").await.unwrap();

    assert_eq!(view.completion, Some(CompletionReason::GenerationFailed));
    assert!(view.chapters[1].text.contains("Subir al altar"));
    assert!(view.notice.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_initial_failure_creates_no_session() {
    let h = harness(ScriptedGenerator::new(vec![Err(GenerationError::Unavailable {
        host: "http://localhost:11434".into(),
    })]));

    let err = h.service.start_story(story_request(true)).await.unwrap_err();

    assert!(err.is_agent_unavailable());
}

#[tokio::test]
async fn test_invalid_request_never_reaches_generator() {
    let h = harness(ScriptedGenerator::new(vec![ok(BRANCHING_CHAPTER)]));
    let mut request = story_request(true);
    request.theme = "   ".into();

    let err = h.service.start_story(request).await.unwrap_err();

    assert!(matches!(err, AppError::EmptyField { ref field_name } if field_name == "theme"));
    assert!(h.generator.prompts().is_empty());
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[tokio::test]
async fn test_save_list_stats_and_delete() {
    let h = harness(ScriptedGenerator::new(vec![ok(BRANCHING_CHAPTER), ok(ENDING_CHAPTER)]));
    let id = h.service.start_story(story_request(true)).await.unwrap().session_id;
    h.service.choose(id, "A").await.unwrap();

    let record = h.service.save_story(id, Some("El origen del cacao".into())).await.unwrap();
    assert_eq!(record.title, "El origen del cacao");
    assert_eq!(
        record.full_text,
        format!("Itzel cruza el Templo Mayor.\n\n{ENDING_CHAPTER}")
    );
    assert_eq!(record.decision_count, 1);
    assert!(record.is_interactive);

    let stories = h.service.list_stories().await.unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(h.service.get_story(&record.id).await.unwrap(), record);

    let stats = h.service.stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.distinct_cultures, 1);
    assert_eq!(stats.average_words, u64::try_from(record.word_count).unwrap());

    h.service.delete_story(&record.id).await.unwrap();
    assert!(matches!(
        h.service.delete_story(&record.id).await,
        Err(AppError::StoryNotFound { .. })
    ));
    assert!(h.service.list_stories().await.unwrap().is_empty());
    assert_eq!(h.store.list().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_saving_unknown_session_fails() {
    let h = harness(ScriptedGenerator::new(vec![]));
    let err = h.service.save_story(Uuid::new_v4(), None).await.unwrap_err();
    assert!(err.is_not_found());
}
