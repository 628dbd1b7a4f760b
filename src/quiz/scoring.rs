// src/quiz/scoring.rs

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::attempt::{AnswerFeedback, AttemptResponse, QuizAttempt, SubmittedAnswer};

/// Helper struct for fetching question text during grading.
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    question_text: String,
}

/// Helper struct for fetching option rows during grading.
#[derive(sqlx::FromRow)]
struct OptionRow {
    id: i64,
    option_text: String,
    is_correct: bool,
}

/// Percentage score over the answers that were actually gradable. Zero
/// gradable answers score 0 instead of dividing by zero.
pub fn compute_score(correct: usize, graded: usize) -> f64 {
    if graded == 0 {
        0.0
    } else {
        correct as f64 / graded as f64 * 100.0
    }
}

/// Grades a submission against the stored quiz.
///
/// The attempt row is inserted up front with score 0 and updated after
/// grading, so an interrupted grading pass still leaves a visible attempt.
/// Answers that do not resolve to a known question, or whose option does not
/// belong to that question, are skipped with a warning and stay out of the
/// denominator.
pub async fn score_attempt(
    pool: &PgPool,
    quiz_id: i64,
    user_id: i64,
    answers: &[SubmittedAnswer],
) -> Result<AttemptResponse, AppError> {
    let quiz_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM quizzes WHERE id = $1")
        .bind(quiz_id)
        .fetch_optional(pool)
        .await?;
    if quiz_exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let attempt = sqlx::query_as::<_, QuizAttempt>(
        "INSERT INTO quiz_attempts (quiz_id, user_id, score) VALUES ($1, $2, 0) RETURNING id, quiz_id, user_id, score, completed_at",
    )
    .bind(quiz_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let mut graded = 0usize;
    let mut correct_count = 0usize;
    let mut feedback = Vec::with_capacity(answers.len());

    for answer in answers {
        let question = match sqlx::query_as::<_, QuestionRow>(
            "SELECT id, question_text FROM quiz_questions WHERE id = $1",
        )
        .bind(answer.question_id)
        .fetch_optional(pool)
        .await?
        {
            Some(q) => q,
            None => {
                tracing::warn!(
                    attempt_id = attempt.id,
                    question_id = answer.question_id,
                    "skipping answer for unknown question"
                );
                continue;
            }
        };

        let option = match sqlx::query_as::<_, OptionRow>(
            "SELECT id, option_text, is_correct FROM quiz_options WHERE id = $1 AND question_id = $2",
        )
        .bind(answer.selected_option_id)
        .bind(question.id)
        .fetch_optional(pool)
        .await?
        {
            Some(o) => o,
            None => {
                tracing::warn!(
                    attempt_id = attempt.id,
                    question_id = question.id,
                    option_id = answer.selected_option_id,
                    "skipping answer with option not belonging to question"
                );
                continue;
            }
        };

        graded += 1;
        if option.is_correct {
            correct_count += 1;
        }

        // Snapshot row: keeps what was answered even if the quiz is edited
        // later.
        sqlx::query(
            "INSERT INTO quiz_attempt_answers (attempt_id, question_id, selected_option_id, is_correct) VALUES ($1, $2, $3, $4)",
        )
        .bind(attempt.id)
        .bind(question.id)
        .bind(option.id)
        .bind(option.is_correct)
        .execute(pool)
        .await?;

        let correct_option = sqlx::query_as::<_, OptionRow>(
            "SELECT id, option_text, is_correct FROM quiz_options WHERE question_id = $1 AND is_correct = TRUE ORDER BY id LIMIT 1",
        )
        .bind(question.id)
        .fetch_optional(pool)
        .await?;

        feedback.push(AnswerFeedback {
            question_id: question.id,
            question_text: question.question_text,
            selected_option_id: option.id,
            selected_option_text: option.option_text,
            is_correct: option.is_correct,
            correct_option_id: correct_option.as_ref().map(|opt| opt.id),
            correct_option_text: correct_option.map(|opt| opt.option_text),
        });
    }

    let score = compute_score(correct_count, graded);

    sqlx::query("UPDATE quiz_attempts SET score = $1 WHERE id = $2")
        .bind(score)
        .bind(attempt.id)
        .execute(pool)
        .await?;

    tracing::info!(
        attempt_id = attempt.id,
        quiz_id,
        user_id,
        score,
        graded,
        submitted = answers.len(),
        "attempt scored"
    );

    Ok(AttemptResponse {
        id: attempt.id,
        quiz_id,
        score,
        completed_at: attempt.completed_at,
        answers: feedback,
    })
}
