//! Session Manager — owns the Session lifecycle and drives the
//! question/answer/score loop.
//!
//! Invariants enforced here:
//! - at most one active session per user,
//! - a session is ended exactly once (conditional UPDATE on `is_active`),
//! - one open turn per session; a turn is answered exactly once,
//! - the resume context is retired whenever its session ends.
//!
//! Persistence goes through [`InterviewStore`] so the whole state machine
//! can be driven by an in-memory store in tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::context_store::{ResumeContext, ResumeContextStore};
use crate::interview::questions::generate_question;
use crate::interview::scoring::{improve_answer, score_answer, IMPROVEMENT_THRESHOLD};
use crate::interview::store::InterviewStore;
use crate::interview::timeout::spawn_session_watch;
use crate::llm_client::ReasoningEngine;
use crate::models::user::User;
use crate::resume::{self, ResumeFormat};

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub question: String,
    pub qna_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub score: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_qna_id: Option<Uuid>,
    pub session_ended: bool,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub session_id: Uuid,
    pub end_time: DateTime<Utc>,
}

/// Starts a new interview session for the user and issues the icebreaker
/// question.
pub async fn start_session(
    store: &Arc<dyn InterviewStore>,
    engine: &dyn ReasoningEngine,
    contexts: &Arc<ResumeContextStore>,
    user: &User,
) -> Result<StartSessionResponse, AppError> {
    if store.active_session(user.id).await?.is_some() {
        return Err(AppError::Conflict(
            "An interview session is already active".to_string(),
        ));
    }

    let upload = store
        .latest_resume_upload(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No resume uploaded for this user".to_string()))?;

    let format = ResumeFormat::from_extension(&upload.file_format).ok_or_else(|| {
        AppError::Validation(format!("Unsupported resume format '{}'", upload.file_format))
    })?;

    let resume_text = resume::extract_text(std::path::Path::new(&upload.file_path), format).await?;

    let session = match store.create_session(user.id).await {
        Ok(session) => session,
        // Two concurrent starts can both pass the active-session check
        // above; the loser is rejected by the one-active-session index
        // and gets the same Conflict as a sequential second start.
        Err(e) if duplicate_active_session(&e) => {
            return Err(AppError::Conflict(
                "An interview session is already active".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let context = contexts.insert(
        session.id,
        ResumeContext {
            resume_text,
            job_title: user.job_title.clone().unwrap_or_default(),
            job_description: user.job_description.clone().unwrap_or_default(),
        },
    );

    spawn_session_watch(
        store.clone(),
        contexts.clone(),
        session.id,
        session.start_time,
    );

    // First turn is the icebreaker. If the engine is down there is nothing
    // to interview with, so the just-created session is closed before the
    // error surfaces.
    let question = match generate_question(engine, &context, 1, None).await {
        Ok(q) => q,
        Err(e) => {
            if let Err(close_err) = close_session(store.as_ref(), contexts, session.id).await {
                warn!(
                    "Failed to close session {} after engine error: {close_err}",
                    session.id
                );
            }
            return Err(e);
        }
    };

    let qna = store.insert_open_turn(user.id, session.id, &question).await?;

    info!("Started interview session {} for user {}", session.id, user.id);

    Ok(StartSessionResponse {
        session_id: session.id,
        question,
        qna_id: qna.id,
    })
}

/// Records the answer for an open turn, scores it and issues the next
/// question — or ends the session when no next question can be produced.
pub async fn submit_answer(
    store: &dyn InterviewStore,
    engine: &dyn ReasoningEngine,
    contexts: &ResumeContextStore,
    user: &User,
    qna_id: Uuid,
    answer: &str,
) -> Result<SubmitAnswerResponse, AppError> {
    let session = store
        .active_session(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("No active interview session found".to_string()))?;

    let qna = store.find_turn(qna_id, session.id).await?.ok_or_else(|| {
        AppError::NotFound("Question not found in the active session".to_string())
    })?;

    if qna.answer_given.is_some() {
        return Err(AppError::Conflict(
            "This question has already been answered".to_string(),
        ));
    }

    // Absence here means the cache and the session table disagree — the
    // process restarted or the context was retired under us.
    let context = contexts.get(session.id).ok_or_else(|| {
        AppError::Conflict("Interview context is missing for the active session".to_string())
    })?;

    let score = score_answer(engine, answer).await;

    let generated_answer = if score < IMPROVEMENT_THRESHOLD {
        Some(improve_answer(engine, &qna.question_asked).await)
    } else {
        None
    };

    // One atomic update closes the turn.
    store
        .record_answer(qna.id, answer, score, generated_answer.as_deref())
        .await?;

    let next_turn = store.turn_count(session.id).await? + 1;

    let next_question = match generate_question(engine, &context, next_turn, Some(answer)).await {
        Ok(q) => q,
        Err(e) => {
            // No fallback question exists; a failed generation ends the
            // interview rather than retrying silently.
            warn!(
                "Next-question generation failed for session {} ({e}); ending session",
                session.id
            );
            close_session(store, contexts, session.id).await?;
            return Ok(SubmitAnswerResponse {
                score,
                generated_answer,
                next_question: None,
                next_qna_id: None,
                session_ended: true,
            });
        }
    };

    // The timeout sweeper may have expired the session while the engine
    // call was in flight. Re-check before opening the next turn; a stale
    // question is discarded, not inserted.
    if !store.is_session_active(session.id).await? {
        info!(
            "Session {} ended while generating the next question; discarding it",
            session.id
        );
        contexts.remove(session.id);
        return Ok(SubmitAnswerResponse {
            score,
            generated_answer,
            next_question: None,
            next_qna_id: None,
            session_ended: true,
        });
    }

    let next_qna = store
        .insert_open_turn(user.id, session.id, &next_question)
        .await?;

    Ok(SubmitAnswerResponse {
        score,
        generated_answer,
        next_question: Some(next_question),
        next_qna_id: Some(next_qna.id),
        session_ended: false,
    })
}

/// Ends a session explicitly. Fails with Conflict when it already ended.
pub async fn end_session(
    store: &dyn InterviewStore,
    contexts: &ResumeContextStore,
    user: &User,
    session_id: Uuid,
) -> Result<EndSessionResponse, AppError> {
    let session = store
        .session_for_user(session_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    if !session.is_active {
        return Err(AppError::Conflict("Session is already inactive".to_string()));
    }

    let end_time = close_session(store, contexts, session_id)
        .await?
        // Lost the race against the sweeper between the check and the update.
        .ok_or_else(|| AppError::Conflict("Session is already inactive".to_string()))?;

    info!("Session {session_id} ended by user {}", user.id);

    Ok(EndSessionResponse {
        session_id,
        end_time,
    })
}

/// Conditionally ends a session and retires its resume context.
///
/// Idempotent: returns `Ok(None)` when the session was already inactive.
pub async fn close_session(
    store: &dyn InterviewStore,
    contexts: &ResumeContextStore,
    session_id: Uuid,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let end_time = store.mark_session_ended(session_id).await?;
    contexts.remove(session_id);
    Ok(end_time)
}

/// A `create_session` insert rejected by the one-active-session index.
fn duplicate_active_session(e: &sqlx::Error) -> bool {
    e.as_database_error().and_then(|db| db.constraint()) == Some("sessions_one_active_per_user")
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::interview::store::testing::InMemoryStore;
    use crate::llm_client::testing::ScriptedEngine;
    use crate::llm_client::LlmError;

    const RESUME_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Senior backend engineer, 5 years of distributed systems</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn candidate() -> User {
        User {
            id: Uuid::new_v4(),
            email: "candidate@example.com".to_string(),
            name: "Candidate".to_string(),
            job_title: Some("Backend Engineer".to_string()),
            job_description: Some("Design and operate APIs".to_string()),
            created_at: Utc::now(),
        }
    }

    fn write_resume_docx(dir: &TempDir) -> String {
        let path = dir.path().join("resume.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut archive = zip::ZipWriter::new(file);
        archive
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        archive.write_all(RESUME_DOCUMENT.as_bytes()).unwrap();
        archive.finish().unwrap();
        path.to_string_lossy().into_owned()
    }

    struct Fixture {
        mem: Arc<InMemoryStore>,
        store: Arc<dyn InterviewStore>,
        contexts: Arc<ResumeContextStore>,
        user: User,
        _dir: TempDir,
    }

    fn fixture_with_resume() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mem = Arc::new(InMemoryStore::new());
        let user = candidate();
        mem.add_upload(user.id, &write_resume_docx(&dir), "docx");
        let store: Arc<dyn InterviewStore> = mem.clone();
        Fixture {
            mem,
            store,
            contexts: Arc::new(ResumeContextStore::new()),
            user,
            _dir: dir,
        }
    }

    async fn start(fx: &Fixture, first_question: &str) -> StartSessionResponse {
        let engine = ScriptedEngine::new(vec![Ok(first_question)]);
        start_session(&fx.store, &engine, &fx.contexts, &fx.user)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn start_opens_a_session_with_an_icebreaker_turn() {
        let fx = fixture_with_resume();
        let started = start(&fx, "What drew you to backend work?").await;

        assert_eq!(started.question, "Question 1: What drew you to backend work?");
        let turn = fx.mem.turn(started.qna_id).unwrap();
        assert_eq!(turn.session_id, started.session_id);
        assert!(turn.answer_given.is_none());
        assert!(fx.contexts.get(started.session_id).is_some());
    }

    #[tokio::test]
    async fn second_start_while_active_is_conflict() {
        let fx = fixture_with_resume();
        start(&fx, "First question").await;

        let engine = ScriptedEngine::new(vec![Ok("unused")]);
        let second = start_session(&fx.store, &engine, &fx.contexts, &fx.user).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn concurrent_start_loser_gets_conflict_not_internal_error() {
        // Both requests pass the active-session pre-check; the second
        // insert is rejected by the one-active-session index and must
        // surface as the same Conflict, not a database error.
        let fx = fixture_with_resume();
        fx.mem.fail_next_create_with_unique_violation();

        let engine = ScriptedEngine::new(vec![Ok("unused")]);
        let result = start_session(&fx.store, &engine, &fx.contexts, &fx.user).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn start_without_resume_is_not_found() {
        let mem = Arc::new(InMemoryStore::new());
        let store: Arc<dyn InterviewStore> = mem.clone();
        let contexts = Arc::new(ResumeContextStore::new());

        let engine = ScriptedEngine::new(vec![Ok("unused")]);
        let result = start_session(&store, &engine, &contexts, &candidate()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn engine_failure_on_start_closes_the_new_session() {
        let fx = fixture_with_resume();

        let engine = ScriptedEngine::failing();
        let result = start_session(&fx.store, &engine, &fx.contexts, &fx.user).await;
        assert!(matches!(result, Err(AppError::Engine(_))));

        // No half-open session or context is left behind.
        assert!(fx.store.active_session(fx.user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unusable_score_defaults_but_the_turn_is_still_answered() {
        let fx = fixture_with_resume();
        let started = start(&fx, "Icebreaker").await;

        // "9" is outside 1..=5, so the score falls back to the default;
        // recording the answer must not be skipped because of that.
        let engine = ScriptedEngine::new(vec![Ok("9"), Ok("Tell me about an API you built")]);
        let response = submit_answer(
            fx.store.as_ref(),
            &engine,
            &fx.contexts,
            &fx.user,
            started.qna_id,
            "I shipped three public APIs",
        )
        .await
        .unwrap();

        assert_eq!(response.score, 3);
        assert!(response.generated_answer.is_none());
        assert_eq!(
            response.next_question.as_deref(),
            Some("Question 2: Tell me about an API you built")
        );
        assert!(!response.session_ended);

        let turn = fx.mem.turn(started.qna_id).unwrap();
        assert_eq!(turn.answer_given.as_deref(), Some("I shipped three public APIs"));
        assert_eq!(turn.score, Some(3));
    }

    #[tokio::test]
    async fn weak_answer_gets_a_model_answer() {
        let fx = fixture_with_resume();
        let started = start(&fx, "Icebreaker").await;

        let engine = ScriptedEngine::new(vec![
            Ok("2"),
            Ok("A stronger answer would name concrete outcomes."),
            Ok("Next question"),
        ]);
        let response = submit_answer(
            fx.store.as_ref(),
            &engine,
            &fx.contexts,
            &fx.user,
            started.qna_id,
            "we did stuff",
        )
        .await
        .unwrap();

        assert_eq!(response.score, 2);
        assert_eq!(
            response.generated_answer.as_deref(),
            Some("A stronger answer would name concrete outcomes.")
        );
    }

    #[tokio::test]
    async fn answering_the_same_turn_twice_is_conflict() {
        let fx = fixture_with_resume();
        let started = start(&fx, "Icebreaker").await;

        let engine = ScriptedEngine::new(vec![Ok("4"), Ok("Next question")]);
        submit_answer(
            fx.store.as_ref(),
            &engine,
            &fx.contexts,
            &fx.user,
            started.qna_id,
            "first answer",
        )
        .await
        .unwrap();

        let engine = ScriptedEngine::new(vec![Ok("4"), Ok("unused")]);
        let again = submit_answer(
            fx.store.as_ref(),
            &engine,
            &fx.contexts,
            &fx.user,
            started.qna_id,
            "second answer",
        )
        .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn submit_without_active_session_is_not_found() {
        let fx = fixture_with_resume();

        let engine = ScriptedEngine::new(vec![Ok("unused")]);
        let result = submit_answer(
            fx.store.as_ref(),
            &engine,
            &fx.contexts,
            &fx.user,
            Uuid::new_v4(),
            "an answer",
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_next_question_ends_the_session() {
        let fx = fixture_with_resume();
        let started = start(&fx, "Icebreaker").await;

        // The score call succeeds, then the script runs dry for the
        // next-question call.
        let engine = ScriptedEngine::new(vec![Ok("4")]);
        let response = submit_answer(
            fx.store.as_ref(),
            &engine,
            &fx.contexts,
            &fx.user,
            started.qna_id,
            "a fine answer",
        )
        .await
        .unwrap();

        assert_eq!(response.score, 4);
        assert!(response.session_ended);
        assert!(response.next_question.is_none());
        assert!(!fx.store.is_session_active(started.session_id).await.unwrap());
        assert!(fx.contexts.get(started.session_id).is_none());
    }

    /// Scores the first call, then ends the session out-of-band while the
    /// next question is being generated, the way the timeout watcher can.
    struct ExpireMidTurn {
        mem: Arc<InMemoryStore>,
        session_id: Uuid,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReasoningEngine for ExpireMidTurn {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok("4".to_string())
            } else {
                self.mem.force_close(self.session_id);
                Ok("A question for a session that no longer exists".to_string())
            }
        }
    }

    #[tokio::test]
    async fn session_ending_mid_generation_discards_the_stale_question() {
        let fx = fixture_with_resume();
        let started = start(&fx, "Icebreaker").await;

        let engine = ExpireMidTurn {
            mem: fx.mem.clone(),
            session_id: started.session_id,
            calls: AtomicUsize::new(0),
        };
        let response = submit_answer(
            fx.store.as_ref(),
            &engine,
            &fx.contexts,
            &fx.user,
            started.qna_id,
            "an answer",
        )
        .await
        .unwrap();

        // The answer still counts, but no stale open turn is created.
        assert_eq!(response.score, 4);
        assert!(response.session_ended);
        assert!(response.next_question.is_none());
        assert_eq!(fx.store.turn_count(started.session_id).await.unwrap(), 1);
        assert!(fx.contexts.get(started.session_id).is_none());
    }

    #[tokio::test]
    async fn end_session_succeeds_once_then_conflicts() {
        let fx = fixture_with_resume();
        let started = start(&fx, "Icebreaker").await;

        let ended = end_session(
            fx.store.as_ref(),
            &fx.contexts,
            &fx.user,
            started.session_id,
        )
        .await
        .unwrap();
        assert_eq!(ended.session_id, started.session_id);
        assert!(fx.contexts.get(started.session_id).is_none());

        // end_time was written by the first call and stays put.
        let row = fx
            .store
            .session_for_user(started.session_id, fx.user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.end_time, Some(ended.end_time));

        let again = end_session(
            fx.store.as_ref(),
            &fx.contexts,
            &fx.user,
            started.session_id,
        )
        .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn end_session_for_unknown_id_is_not_found() {
        let fx = fixture_with_resume();

        let result = end_session(fx.store.as_ref(), &fx.contexts, &fx.user, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
