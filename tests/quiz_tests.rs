// tests/quiz_tests.rs

use backend::{ai::AiClient, config::Config, routes, state::AppState, tasks};
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        ai_api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        ai_api_key: String::new(),
        ai_model: "test-model".to_string(),
        ai_timeout_secs: 2,
        upload_dir: std::env::temp_dir()
            .join("learnhub-test-uploads")
            .to_string_lossy()
            .into_owned(),
    };

    let ai = AiClient::new(&config);
    let summary_tx = tasks::spawn_summary_worker(pool.clone(), ai.clone());

    let state = AppState {
        pool,
        config,
        ai,
        summary_tx,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Registers a fresh user and returns their bearer token and user id.
async fn register_and_login_with_id(address: &str, client: &reqwest::Client) -> (String, i64) {
    let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    client
        .post(&format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password
        }))
        .send()
        .await
        .expect("Register failed");

    let login: serde_json::Value = client
        .post(&format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    let token = login["token"].as_str().expect("Token not found").to_string();
    let user_id = login["user_id"].as_i64().expect("User id not found");
    (token, user_id)
}

/// Registers a fresh user and returns their bearer token.
async fn register_and_login(address: &str, client: &reqwest::Client) -> String {
    register_and_login_with_id(address, client).await.0
}

/// Two-question quiz payload; correct options are "Paris" and "4".
fn sample_quiz_payload() -> serde_json::Value {
    serde_json::json!({
        "title": "Geography and arithmetic",
        "description": "Mixed basics",
        "questions": [
            {
                "question_text": "Capital of France?",
                "options": [
                    {"option_text": "Paris", "is_correct": true},
                    {"option_text": "Lyon", "is_correct": false},
                    {"option_text": "Nice", "is_correct": false},
                    {"option_text": "Lille", "is_correct": false}
                ]
            },
            {
                "question_text": "What is 2+2?",
                "options": [
                    {"option_text": "3", "is_correct": false},
                    {"option_text": "4", "is_correct": true},
                    {"option_text": "5", "is_correct": false},
                    {"option_text": "6", "is_correct": false}
                ]
            }
        ]
    })
}

/// Creates the sample quiz and returns its JSON body.
async fn create_sample_quiz(
    address: &str,
    client: &reqwest::Client,
    token: &str,
) -> serde_json::Value {
    let response = client
        .post(&format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&sample_quiz_payload())
        .send()
        .await
        .expect("Create quiz failed");

    assert_eq!(response.status().as_u16(), 201);
    response.json().await.expect("Failed to parse quiz json")
}

/// Picks the (question_id, option_id) pair for a question by correctness
/// flag.
fn option_id(question: &serde_json::Value, correct: bool) -> i64 {
    question["options"]
        .as_array()
        .unwrap()
        .iter()
        .find(|opt| opt["is_correct"].as_bool().unwrap() == correct)
        .expect("No option with requested correctness")["id"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn create_and_fetch_quiz_preserves_structure() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;

    // Act
    let quiz = create_sample_quiz(&address, &client, &token).await;
    let quiz_id = quiz["id"].as_i64().unwrap();

    let fetched: serde_json::Value = client
        .get(&format!("{}/api/quizzes/{}", address, quiz_id))
        .send()
        .await
        .expect("Fetch quiz failed")
        .json()
        .await
        .unwrap();

    // Assert: questions and options come back in insertion order
    let questions = fetched["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["question_text"], "Capital of France?");
    assert_eq!(questions[1]["question_text"], "What is 2+2?");

    let first_options = questions[0]["options"].as_array().unwrap();
    assert_eq!(first_options.len(), 4);
    assert_eq!(first_options[0]["option_text"], "Paris");
    assert_eq!(first_options[0]["is_correct"], true);
}

#[tokio::test]
async fn quiz_with_two_correct_options_is_rejected() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;

    // Act
    let response = client
        .post(&format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "Broken quiz",
            "questions": [
                {
                    "question_text": "Pick one",
                    "options": [
                        {"option_text": "a", "is_correct": true},
                        {"option_text": "b", "is_correct": true}
                    ]
                }
            ]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn quiz_without_correct_option_is_rejected() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;

    // Act
    let response = client
        .post(&format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "Broken quiz",
            "questions": [
                {
                    "question_text": "Pick one",
                    "options": [
                        {"option_text": "a", "is_correct": false},
                        {"option_text": "b", "is_correct": false}
                    ]
                }
            ]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn fetching_missing_quiz_is_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/api/quizzes/999999999", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn listing_quizzes_shows_only_own() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token_a = register_and_login(&address, &client).await;
    let token_b = register_and_login(&address, &client).await;

    create_sample_quiz(&address, &client, &token_a).await;

    // Act
    let quizzes_b: Vec<serde_json::Value> = client
        .get(&format!("{}/api/quizzes", address))
        .header("Authorization", format!("Bearer {}", token_b))
        .send()
        .await
        .expect("List quizzes failed")
        .json()
        .await
        .unwrap();

    // Assert
    assert!(quizzes_b.is_empty());
}

#[tokio::test]
async fn attempt_with_all_correct_answers_scores_100() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;
    let quiz = create_sample_quiz(&address, &client, &token).await;
    let quiz_id = quiz["id"].as_i64().unwrap();
    let questions = quiz["questions"].as_array().unwrap();

    let answers: Vec<serde_json::Value> = questions
        .iter()
        .map(|q| {
            serde_json::json!({
                "question_id": q["id"].as_i64().unwrap(),
                "selected_option_id": option_id(q, true)
            })
        })
        .collect();

    // Act
    let response = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": answers }))
        .send()
        .await
        .expect("Submit attempt failed");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let attempt: serde_json::Value = response.json().await.unwrap();
    assert_eq!(attempt["score"].as_f64().unwrap(), 100.0);
    assert_eq!(attempt["quiz_id"].as_i64().unwrap(), quiz_id);
    assert!(attempt["completed_at"].is_string());

    let feedback = attempt["answers"].as_array().unwrap();
    assert_eq!(feedback.len(), 2);
    assert!(feedback.iter().all(|a| a["is_correct"] == true));
}

#[tokio::test]
async fn attempt_with_one_wrong_answer_scores_half() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;
    let quiz = create_sample_quiz(&address, &client, &token).await;
    let quiz_id = quiz["id"].as_i64().unwrap();
    let questions = quiz["questions"].as_array().unwrap();

    let answers = serde_json::json!([
        {
            "question_id": questions[0]["id"].as_i64().unwrap(),
            "selected_option_id": option_id(&questions[0], true)
        },
        {
            "question_id": questions[1]["id"].as_i64().unwrap(),
            "selected_option_id": option_id(&questions[1], false)
        }
    ]);

    // Act
    let attempt: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": answers }))
        .send()
        .await
        .expect("Submit attempt failed")
        .json()
        .await
        .unwrap();

    // Assert: wrong answer carries pointer to the correct option
    assert_eq!(attempt["score"].as_f64().unwrap(), 50.0);
    let feedback = attempt["answers"].as_array().unwrap();
    let wrong = &feedback[1];
    assert_eq!(wrong["is_correct"], false);
    assert_eq!(
        wrong["correct_option_id"].as_i64().unwrap(),
        option_id(&questions[1], true)
    );
    assert_eq!(wrong["correct_option_text"], "4");
}

#[tokio::test]
async fn unknown_ids_are_skipped_and_do_not_drag_the_score() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;
    let quiz = create_sample_quiz(&address, &client, &token).await;
    let quiz_id = quiz["id"].as_i64().unwrap();
    let questions = quiz["questions"].as_array().unwrap();

    // One real correct answer, one answer against a question that does not
    // exist, one whose option id does not exist.
    let answers = serde_json::json!([
        {
            "question_id": questions[0]["id"].as_i64().unwrap(),
            "selected_option_id": option_id(&questions[0], true)
        },
        {
            "question_id": 999999999,
            "selected_option_id": option_id(&questions[1], true)
        },
        {
            "question_id": questions[1]["id"].as_i64().unwrap(),
            "selected_option_id": 999999999
        }
    ]);

    // Act
    let attempt: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": answers }))
        .send()
        .await
        .expect("Submit attempt failed")
        .json()
        .await
        .unwrap();

    // Assert: only the valid answer was graded
    assert_eq!(attempt["score"].as_f64().unwrap(), 100.0);
    assert_eq!(attempt["answers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn option_borrowed_from_another_question_is_skipped() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;
    let quiz = create_sample_quiz(&address, &client, &token).await;
    let quiz_id = quiz["id"].as_i64().unwrap();
    let questions = quiz["questions"].as_array().unwrap();

    // Answer question 1 with question 2's correct option: not gradable.
    let answers = serde_json::json!([
        {
            "question_id": questions[0]["id"].as_i64().unwrap(),
            "selected_option_id": option_id(&questions[1], true)
        },
        {
            "question_id": questions[1]["id"].as_i64().unwrap(),
            "selected_option_id": option_id(&questions[1], true)
        }
    ]);

    // Act
    let attempt: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": answers }))
        .send()
        .await
        .expect("Submit attempt failed")
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(attempt["score"].as_f64().unwrap(), 100.0);
    assert_eq!(attempt["answers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn attempt_with_no_answers_scores_zero() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&address, &client).await;
    let quiz = create_sample_quiz(&address, &client, &token).await;
    let quiz_id = quiz["id"].as_i64().unwrap();

    // Act
    let attempt: serde_json::Value = client
        .post(&format!("{}/api/quizzes/{}/attempt", address, quiz_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": [] }))
        .send()
        .await
        .expect("Submit attempt failed")
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(attempt["score"].as_f64().unwrap(), 0.0);
    assert!(attempt["answers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn attempt_on_missing_quiz_is_404_and_leaves_no_row() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, user_id) = register_and_login_with_id(&address, &client).await;

    // Act
    let response = client
        .post(&format!("{}/api/quizzes/999999999/attempt", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "answers": [] }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert: rejected before any attempt row is written for this user
    assert_eq!(response.status().as_u16(), 404);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"))
        .await
        .expect("Failed to connect to Postgres");
    let attempts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .expect("Count query failed");
    assert_eq!(attempts, 0);
}
