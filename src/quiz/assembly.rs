// src/quiz/assembly.rs

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::quiz::{
    OptionDetail, QuestionDetail, Quiz, QuizDetail, QuizOption, QuizQuestion, QuizQuestionInput,
};

/// Checks the single-correct-option rule for every question before anything
/// is written. Index in the error message is 1-based for the client.
pub fn validate_questions(questions: &[QuizQuestionInput]) -> Result<(), AppError> {
    for (idx, question) in questions.iter().enumerate() {
        if question.options.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Question {} has no options",
                idx + 1
            )));
        }

        let correct = question
            .options
            .iter()
            .filter(|opt| opt.is_correct)
            .count();
        if correct != 1 {
            return Err(AppError::BadRequest(format!(
                "Question {} must have exactly one correct option, found {}",
                idx + 1,
                correct
            )));
        }
    }

    Ok(())
}

/// Persists a quiz with all its questions and options in a single
/// transaction. All-or-nothing: a failure on any row rolls the whole quiz
/// back. BIGSERIAL ids grow in insertion order, so readers recover the
/// presentation order by sorting on id.
pub async fn create_quiz(
    pool: &PgPool,
    user_id: i64,
    title: &str,
    description: Option<&str>,
    questions: &[QuizQuestionInput],
) -> Result<i64, AppError> {
    validate_questions(questions)?;

    let mut tx = pool.begin().await?;

    let quiz_id: i64 = sqlx::query_scalar(
        "INSERT INTO quizzes (user_id, title, description) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user_id)
    .bind(title)
    .bind(description)
    .fetch_one(&mut *tx)
    .await?;

    for question in questions {
        let question_id: i64 = sqlx::query_scalar(
            "INSERT INTO quiz_questions (quiz_id, question_text) VALUES ($1, $2) RETURNING id",
        )
        .bind(quiz_id)
        .bind(&question.question_text)
        .fetch_one(&mut *tx)
        .await?;

        for option in &question.options {
            sqlx::query(
                "INSERT INTO quiz_options (question_id, option_text, is_correct) VALUES ($1, $2, $3)",
            )
            .bind(question_id)
            .bind(&option.option_text)
            .bind(option.is_correct)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(quiz_id, user_id, questions = questions.len(), "quiz created");

    Ok(quiz_id)
}

/// Loads one quiz with questions and options nested in insertion order.
pub async fn fetch_quiz(pool: &PgPool, quiz_id: i64) -> Result<QuizDetail, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT id, user_id, title, description, created_at FROM quizzes WHERE id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let question_rows = sqlx::query_as::<_, QuizQuestion>(
        "SELECT id, quiz_id, question_text, created_at FROM quiz_questions WHERE quiz_id = $1 ORDER BY id",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let mut questions = Vec::with_capacity(question_rows.len());
    for row in question_rows {
        let options = sqlx::query_as::<_, QuizOption>(
            "SELECT id, question_id, option_text, is_correct FROM quiz_options WHERE question_id = $1 ORDER BY id",
        )
        .bind(row.id)
        .fetch_all(pool)
        .await?;

        questions.push(QuestionDetail {
            id: row.id,
            question_text: row.question_text,
            options: options.into_iter().map(OptionDetail::from).collect(),
        });
    }

    Ok(QuizDetail {
        id: quiz.id,
        title: quiz.title,
        description: quiz.description,
        created_at: quiz.created_at,
        questions,
    })
}

/// All quizzes owned by a user, fully nested, newest first.
pub async fn list_quizzes(pool: &PgPool, user_id: i64) -> Result<Vec<QuizDetail>, AppError> {
    let quiz_ids: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM quizzes WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut quizzes = Vec::with_capacity(quiz_ids.len());
    for id in quiz_ids {
        quizzes.push(fetch_quiz(pool, id).await?);
    }

    Ok(quizzes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::QuizOptionInput;

    fn question(flags: &[bool]) -> QuizQuestionInput {
        QuizQuestionInput {
            question_text: "Q?".to_string(),
            options: flags
                .iter()
                .enumerate()
                .map(|(i, &is_correct)| QuizOptionInput {
                    option_text: format!("option {}", i),
                    is_correct,
                })
                .collect(),
        }
    }

    #[test]
    fn accepts_single_correct_option_per_question() {
        let questions = vec![
            question(&[true, false, false, false]),
            question(&[false, false, true, false]),
        ];
        assert!(validate_questions(&questions).is_ok());
    }

    #[test]
    fn rejects_question_without_correct_option() {
        let err = validate_questions(&[question(&[false, false])]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_question_with_two_correct_options() {
        let err = validate_questions(&[question(&[true, true, false])]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_question_without_options() {
        let err = validate_questions(&[question(&[])]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn reports_offending_question_index() {
        let questions = vec![
            question(&[true, false]),
            question(&[false, false]),
        ];
        match validate_questions(&questions) {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("Question 2")),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }
}
