//! Integration tests for the Lingo backend.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::store::{init_database, seed_defaults, KeyValueStore, SqliteStore};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize the store
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(pool));
        seed_defaults(store.as_ref()).await.expect("Failed to seed store");

        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            leaderboard_size: 10,
            timed_challenge: Duration::from_secs(60),
            reveal_delay: Duration::from_millis(50),
        };

        let app = create_router(AppState::new(store, &config));

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn signup(&self, name: &str, email: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/auth/signup",
                json!({
                    "name": name,
                    "email": email,
                    "password": "Passw0rd",
                    "confirmPassword": "Passw0rd"
                }),
            )
            .await;
        assert_eq!(status, 200, "{}", body);
        body["data"].clone()
    }

    async fn login(&self, email: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/auth/login",
                json!({ "email": email, "password": "Passw0rd" }),
            )
            .await;
        assert_eq!(status, 200, "{}", body);
        body["data"].clone()
    }

    async fn act(&self, run_id: &str, action: Value) -> Value {
        let (status, body) = self
            .post(&format!("/api/runs/{}/actions", run_id), action)
            .await;
        assert_eq!(status, 200, "{}", body);
        body["data"].clone()
    }

    /// Play the grammar quiz, answering the first `correct` questions right.
    async fn play_grammar_quiz(&self, correct: usize) -> Value {
        let answers = [0, 1, 1, 1, 1];
        let (status, body) = self.post("/api/modules/grammar-quiz/runs", json!({})).await;
        assert_eq!(status, 200, "{}", body);
        let run_id = body["data"]["runId"].as_str().unwrap().to_string();

        let mut view = Value::Null;
        for (i, answer) in answers.iter().enumerate() {
            let option = if i < correct { *answer } else { (*answer + 2) % 4 };
            self.act(&run_id, json!({ "action": "select", "option": option }))
                .await;
            self.act(&run_id, json!({ "action": "submit" })).await;
            view = self.act(&run_id, json!({ "action": "next" })).await;
        }
        view
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_signup_then_login() {
    let fixture = TestFixture::new().await;

    let user = fixture.signup("Ana", "a@x.com").await;
    assert_eq!(user["name"], "Ana");
    assert_eq!(user["email"], "a@x.com");
    assert!(user.get("password").is_none());

    // Signing up does not start a session
    let (_, body) = fixture.get("/api/auth/session").await;
    assert_eq!(body["data"], Value::Null);

    let session = fixture.login("a@x.com").await;
    assert_eq!(session["id"], user["id"]);

    let (status, body) = fixture.get("/api/auth/session").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Ana");
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/auth/signup",
            json!({
                "name": "A1",
                "email": "not-an-email",
                "password": "short",
                "confirmPassword": "different"
            }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let fields: Vec<&str> = body["error"]["details"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password", "confirmPassword"]);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let fixture = TestFixture::new().await;
    fixture.signup("Ana", "a@x.com").await;

    let (status, body) = fixture
        .post(
            "/api/auth/signup",
            json!({
                "name": "Other",
                "email": "a@x.com",
                "password": "Passw0rd",
                "confirmPassword": "Passw0rd"
            }),
        )
        .await;

    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "DUPLICATE_EMAIL");
    assert_eq!(body["error"]["details"]["fields"][0]["field"], "email");
}

#[tokio::test]
async fn test_taken_email_reported_with_other_errors() {
    let fixture = TestFixture::new().await;
    fixture.signup("Ana", "a@x.com").await;

    let (status, body) = fixture
        .post(
            "/api/auth/signup",
            json!({
                "name": "Other",
                "email": "a@x.com",
                "password": "weak",
                "confirmPassword": "weak"
            }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields = body["error"]["details"]["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field"], "email");
    assert_eq!(fields[0]["message"], "This email is already registered");
    assert_eq!(fields[1]["field"], "password");
}

#[tokio::test]
async fn test_malformed_body_gets_error_envelope() {
    let fixture = TestFixture::new().await;

    for path in ["/api/auth/signup", "/api/auth/login", "/api/contact"] {
        let resp = fixture
            .client
            .post(fixture.url(path))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "{}", path);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let fixture = TestFixture::new().await;
    fixture.signup("Ana", "a@x.com").await;

    let (status, body) = fixture
        .post(
            "/api/auth/login",
            json!({ "email": "a@x.com", "password": "wrong" }),
        )
        .await;

    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["error"]["message"], "Incorrect email or password");

    let (_, body) = fixture.get("/api/auth/session").await;
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_modules_listing() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/modules").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    let (_, body) = fixture.get("/api/modules?level=advanced").await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["timed-challenge", "vocabulary-advanced"]);

    let (status, body) = fixture.get("/api/modules?level=expert").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = fixture.get("/api/modules/pronunciation").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["title"], "Pronunciation Practice");

    let (status, body) = fixture.get("/api/modules/cooking").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_grammar_run_updates_profile_and_leaderboard() {
    let fixture = TestFixture::new().await;
    let ana = fixture.signup("Ana", "a@x.com").await;
    fixture.login("a@x.com").await;

    let view = fixture.play_grammar_quiz(3).await;
    assert_eq!(view["phase"]["state"], "finished");
    assert_eq!(view["phase"]["score"], 3);
    assert_eq!(view["phase"]["total"], 5);
    assert_eq!(view["percentage"], 60);

    let (status, body) = fixture.get("/api/profile").await;
    assert_eq!(status, 200);
    let profile = &body["data"];
    assert_eq!(profile["modulesCompleted"], 1);
    assert_eq!(profile["averageScore"], 60);
    assert_eq!(profile["progress"][0]["moduleId"], "grammar-quiz");
    assert_eq!(profile["progress"][0]["moduleName"], "Grammar Quizzes");

    let (status, body) = fixture.get("/api/leaderboard").await;
    assert_eq!(status, 200);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["userId"], ana["id"]);
    assert_eq!(rows[0]["score"], 60);
    assert_eq!(rows[0]["modulesCompleted"], 1);
    assert_eq!(rows[0]["isCurrentUser"], true);
}

#[tokio::test]
async fn test_repeat_completion_overwrites_result() {
    let fixture = TestFixture::new().await;
    fixture.signup("Ana", "a@x.com").await;
    fixture.login("a@x.com").await;

    fixture.play_grammar_quiz(1).await;
    fixture.play_grammar_quiz(5).await;

    let (_, body) = fixture.get("/api/profile").await;
    assert_eq!(body["data"]["modulesCompleted"], 1);
    assert_eq!(body["data"]["progress"][0]["score"], 100);
}

#[tokio::test]
async fn test_leaderboard_ranks_users() {
    let fixture = TestFixture::new().await;
    fixture.signup("Ana", "a@x.com").await;
    fixture.signup("Ben", "b@x.com").await;

    fixture.login("a@x.com").await;
    fixture.play_grammar_quiz(2).await;
    fixture.login("b@x.com").await;
    fixture.play_grammar_quiz(4).await;

    let (_, body) = fixture.get("/api/leaderboard").await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Ben");
    assert_eq!(rows[0]["score"], 80);
    assert_eq!(rows[0]["isCurrentUser"], true);
    assert_eq!(rows[1]["name"], "Ana");
    assert_eq!(rows[1]["score"], 40);
    assert_eq!(rows[1]["rank"], 2);
}

#[tokio::test]
async fn test_run_rejects_invalid_actions() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.post("/api/modules/grammar-quiz/runs", json!({})).await;
    let run_id = body["data"]["runId"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["phase"]["state"], "presenting");
    assert!(body["data"].get("correctOption").is_none());

    let (status, body) = fixture
        .post(
            &format!("/api/runs/{}/actions", run_id),
            json!({ "action": "submit" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "INVALID_ACTION");

    let (status, body) = fixture
        .post(
            &format!("/api/runs/{}/actions", run_id),
            json!({ "action": "fly" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = fixture.get("/api/runs/missing").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_timed_challenge_auto_advances() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .post("/api/modules/timed-challenge/runs", json!({}))
        .await;
    let run_id = body["data"]["runId"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["timeLeft"], 60);

    let view = fixture
        .act(&run_id, json!({ "action": "select", "option": 0 }))
        .await;
    assert_eq!(view["phase"]["state"], "revealed");
    assert_eq!(view["phase"]["wasCorrect"], true);
    assert_eq!(view["correctOption"], 0);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let (_, body) = fixture.get(&format!("/api/runs/{}", run_id)).await;
    assert_eq!(body["data"]["phase"]["state"], "presenting");
    assert_eq!(body["data"]["phase"]["index"], 1);
}

#[tokio::test]
async fn test_abandon_run() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .post("/api/modules/timed-challenge/runs", json!({}))
        .await;
    let run_id = body["data"]["runId"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/runs/{}", run_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = fixture.get(&format!("/api/runs/{}", run_id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_anonymous_run_is_not_recorded() {
    let fixture = TestFixture::new().await;
    fixture.signup("Ana", "a@x.com").await;

    fixture.play_grammar_quiz(5).await;
    fixture.login("a@x.com").await;

    let (_, body) = fixture.get("/api/profile").await;
    assert_eq!(body["data"]["modulesCompleted"], 0);
    let (_, body) = fixture.get("/api/leaderboard").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_requires_session() {
    let fixture = TestFixture::new().await;
    fixture.signup("Ana", "a@x.com").await;
    fixture.login("a@x.com").await;

    let (status, body) = fixture.post("/api/auth/logout", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let (status, body) = fixture.get("/api/profile").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_contact_message() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/contact",
            json!({
                "name": "Ana",
                "email": "a@x.com",
                "subject": "Hello",
                "message": "Short"
            }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["fields"][0]["field"], "message");

    let (status, body) = fixture
        .post(
            "/api/contact",
            json!({
                "name": "Ana",
                "email": "a@x.com",
                "subject": "Hello",
                "message": "I would like more Spanish lessons."
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["subject"], "Hello");
    assert!(body["data"]["id"].is_string());
}
