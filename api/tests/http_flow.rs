use std::sync::Arc;

use ai_llm_service::{
    BoxFuture, TextEmbedder, TextGenerator,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider, retry_policy::RetryPolicy},
    service_profiles::LlmServiceProfiles,
};
use api::AppState;
use contextor::{Contextor, ContextorConfig};
use doc_rag::DocRetriever;
use quiz_grader::{AnswerGrader, GraderConfig, QuizGenerator, QuizScorer};
use serde_json::{Value, json};

struct Canned(&'static str);

impl TextGenerator for Canned {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
        _system: Option<&'a str>,
        _temperature: f32,
    ) -> BoxFuture<'a, String> {
        Box::pin(async move { self.0.to_string() })
    }

    fn generate_with_images<'a>(
        &'a self,
        prompt: &'a str,
        system: Option<&'a str>,
        temperature: f32,
        _images: &'a [String],
    ) -> BoxFuture<'a, String> {
        self.generate(prompt, system, temperature)
    }
}

struct NoEmbeddings;

impl TextEmbedder for NoEmbeddings {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move { vec![Vec::new(); texts.len()] })
    }
}

/// Serves the router with in-process fakes; health probes hit a closed port.
async fn spawn() -> String {
    let profile = LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: "llama3.1:8b".into(),
        endpoint: "http://127.0.0.1:9".into(),
        api_key: None,
        max_tokens: None,
        top_p: None,
        timeout_secs: Some(1),
    };
    let llm_profiles = Arc::new(
        LlmServiceProfiles::new(
            profile.clone(),
            profile,
            Vec::new(),
            RetryPolicy::immediate(1),
            Some(1),
        )
        .unwrap(),
    );

    let generator: Arc<dyn TextGenerator> = Arc::new(Canned("CORRECT"));
    let embedder: Arc<dyn TextEmbedder> = Arc::new(NoEmbeddings);
    let ccfg = ContextorConfig::default();
    let state = AppState {
        contextor: Contextor::new(
            DocRetriever::new(embedder.clone(), ccfg.retrieval.clone()),
            generator.clone(),
            ccfg,
        ),
        scorer: QuizScorer::new(AnswerGrader::new(embedder, generator.clone(), 0.78), 2),
        quiz_generator: QuizGenerator::new(generator, &GraderConfig::default()),
        llm_profiles,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(Arc::new(state)))
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

async fn post(base: &str, path: &str, body: Value) -> (u16, Value) {
    let res = reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn scores_a_submitted_quiz() {
    let base = spawn().await;
    let (status, body) = post(
        &base,
        "/quiz/score",
        json!({
            "questions": [
                {"id": "q1", "type": "MCQ", "text": "Pick C", "options": ["A","B","C","D"], "answerIndex": 2},
                {"id": "q2", "type": "SAQ", "text": "Why is the sky blue?", "expectedAnswer": "Rayleigh scattering"}
            ],
            "answers": [2, "Light scatters off air molecules"]
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["score"], 2);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["questionResults"][0]["questionId"], "q1");
    assert_eq!(body["data"]["questionResults"][1]["graderOutput"], "CORRECT");
}

#[tokio::test]
async fn decimal_answer_is_accepted() {
    let base = spawn().await;
    let (status, body) = post(
        &base,
        "/quiz/score",
        json!({
            "questions": [
                {"id": "q1", "type": "ONEWORD", "text": "Pi to two places?", "expectedAnswer": "3.14"}
            ],
            "answers": [3.14]
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["score"], 1);
    assert_eq!(body["data"]["questionResults"][0]["userAnswer"], "3.14");
    assert_eq!(body["data"]["questionResults"][0]["stage"], "numeric");
}

#[tokio::test]
async fn invalid_questions_are_reported_by_position() {
    let base = spawn().await;
    let (status, body) = post(
        &base,
        "/quiz/score",
        json!({
            "questions": [
                {"type": "ONEWORD", "text": "Capital of France?", "expectedAnswer": "Paris"},
                {"type": "MCQ", "text": "Only two options", "options": ["A","B"], "answerIndex": 0}
            ],
            "answers": ["Paris", 0]
        }),
    )
    .await;

    assert_eq!(status, 422);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_QUESTIONS");
    assert_eq!(body["error"]["details"][0]["path"], "questions[1]");
}

#[tokio::test]
async fn json_rejections_use_the_envelope() {
    let base = spawn().await;
    let (status, body) = post(
        &base,
        "/quiz/score",
        json!({"questions": [], "answers": {"not": "a list"}}),
    )
    .await;

    assert_eq!(status, 422);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
    assert_eq!(body["error"]["details"][0]["path"], "answers");
}

#[tokio::test]
async fn handler_errors_pass_through_unchanged() {
    let base = spawn().await;
    let (status, body) = post(
        &base,
        "/quiz/generate",
        json!({
            "document": {"document_id": "d1", "title": "Notes", "chunks": []},
            "counts": {}
        }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["details"].is_null());
}

#[tokio::test]
async fn general_question_without_documents() {
    let base = spawn().await;
    let (status, body) = post(
        &base,
        "/ask",
        json!({"question": "What causes tides?", "depth": "in-depth"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["intent"], "general");
    assert_eq!(body["data"]["used_general"], true);
    assert_eq!(body["data"]["history"][0]["role"], "user");
    assert_eq!(body["data"]["history"][1]["text"], "CORRECT");
}

#[tokio::test]
async fn health_reports_unreachable_provider() {
    let base = spawn().await;
    let res = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"][0]["ok"], false);
}
