//! Integration tests for the answer phase
//!
//! Stub oracles exercise the answering logic; wiremock stands in for the
//! chat-completions API, the pages of link-following mode, the question
//! endpoint and the report endpoint.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sitequery::answer::{
    fetch_questions, parse_questions, LinkFollower, Question, QuestionAnswerer, NO_LINK_TO_FOLLOW,
};
use sitequery::config::{CrawlerConfig, OracleConfig, ReportConfig};
use sitequery::crawler::PageFetcher;
use sitequery::oracle::{AnswerCheck, AnswerOracle, OpenAiOracle, OracleError};
use sitequery::report::ReportClient;
use sitequery::state::{PageStatus, QuestionStatus};
use sitequery::storage::{Page, PageMetadata, PageStore, SqliteStorage};
use sitequery::{AnswerSheet, SiteQueryError};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn contact_page() -> Page {
    Page {
        id: "page-1".to_string(),
        url: "https://example.org/contact".to_string(),
        title: "Contact".to_string(),
        content: "Get in touch. contact: foo@bar.com".to_string(),
        links: vec![],
        is_root: true,
        is_leaf: true,
        parent_id: None,
        relevance_score: 0.0,
        metadata: PageMetadata {
            last_visited: Utc::now(),
            depth: 0,
            status: PageStatus::Processed,
            error: None,
        },
    }
}

fn store_with_contact_page() -> SqliteStorage {
    let mut store = SqliteStorage::open_in_memory().unwrap();
    store.put(&contact_page()).unwrap();
    store
}

/// Finds the email on the contact page only
struct ContactOracle;

#[async_trait]
impl AnswerOracle for ContactOracle {
    async fn check_for_answer(
        &self,
        content: &str,
        _question: &str,
    ) -> Result<AnswerCheck, OracleError> {
        if content.contains("contact: foo@bar.com") {
            Ok(AnswerCheck::found("foo@bar.com"))
        } else {
            Ok(AnswerCheck::none())
        }
    }

    async fn select_next_link(
        &self,
        _content: &str,
        _question: &str,
        links: &[String],
    ) -> Result<Option<String>, OracleError> {
        Ok(links.iter().find(|l| l.ends_with("/contact")).cloned())
    }
}

/// Never finds anything
struct SilentOracle;

#[async_trait]
impl AnswerOracle for SilentOracle {
    async fn check_for_answer(
        &self,
        _content: &str,
        _question: &str,
    ) -> Result<AnswerCheck, OracleError> {
        Ok(AnswerCheck::none())
    }

    async fn select_next_link(
        &self,
        _content: &str,
        _question: &str,
        _links: &[String],
    ) -> Result<Option<String>, OracleError> {
        Ok(None)
    }
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

fn oracle_config(server: &MockServer) -> OracleConfig {
    OracleConfig {
        base_url: format!("{}/v1", server.uri()),
        ..OracleConfig::default()
    }
}

#[tokio::test]
async fn test_batch_answered_from_store() {
    let store = store_with_contact_page();
    let answerer = QuestionAnswerer::new(&store, &ContactOracle);

    let mut questions = parse_questions(r#"[{"id": "1", "text": "What is the contact email?"}]"#)
        .unwrap();
    let sheet = answerer.answer_all(&mut questions).await;

    assert_eq!(
        serde_json::to_value(&sheet).unwrap(),
        json!({"1": "foo@bar.com"})
    );
    assert_eq!(questions[0].status(), QuestionStatus::Answered);
}

#[tokio::test]
async fn test_unanswered_batch_maps_to_empty_strings() {
    let store = store_with_contact_page();
    let answerer = QuestionAnswerer::new(&store, &SilentOracle);

    let mut questions = vec![Question::new("1", "What is the contact email?")];
    let sheet = answerer.answer_all(&mut questions).await;

    assert_eq!(serde_json::to_value(&sheet).unwrap(), json!({"1": ""}));
    assert_eq!(questions[0].status(), QuestionStatus::Failed);
}

#[tokio::test]
async fn test_openai_oracle_extracts_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "max_tokens": 150
        })))
        .respond_with(chat_reply("  foo@bar.com\n"))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = OpenAiOracle::new(&oracle_config(&server), "test-key");
    let check = oracle
        .check_for_answer("contact: foo@bar.com", "What is the contact email?")
        .await
        .unwrap();

    assert_eq!(check, AnswerCheck::found("foo@bar.com"));
}

#[tokio::test]
async fn test_openai_oracle_no_answer_sentinel() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("NO_ANSWER"))
        .mount(&server)
        .await;

    let oracle = OpenAiOracle::new(&oracle_config(&server), "test-key");
    let check = oracle
        .check_for_answer("some text", "What is the contact email?")
        .await
        .unwrap();

    assert_eq!(check, AnswerCheck::none());
}

#[tokio::test]
async fn test_openai_oracle_selects_link() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 50})))
        .respond_with(chat_reply("https://example.org/contact"))
        .mount(&server)
        .await;

    let oracle = OpenAiOracle::new(&oracle_config(&server), "test-key");
    let links = vec![
        "https://example.org/blog".to_string(),
        "https://example.org/contact".to_string(),
    ];
    let link = oracle
        .select_next_link("home page", "What is the contact email?", &links)
        .await
        .unwrap();

    assert_eq!(link.as_deref(), Some("https://example.org/contact"));
}

#[tokio::test]
async fn test_openai_oracle_no_link_sentinel() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("NO_LINK"))
        .mount(&server)
        .await;

    let oracle = OpenAiOracle::new(&oracle_config(&server), "test-key");
    let links = vec!["https://example.org/blog".to_string()];
    let link = oracle
        .select_next_link("home page", "What is the contact email?", &links)
        .await
        .unwrap();

    assert_eq!(link, None);
}

#[tokio::test]
async fn test_openai_failure_is_error_and_answer_stays_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let oracle = OpenAiOracle::new(&oracle_config(&server), "test-key");
    let result = oracle.check_for_answer("content", "question").await;
    assert!(matches!(result, Err(OracleError::Api { status: 500, .. })));

    let store = store_with_contact_page();
    let answerer = QuestionAnswerer::new(&store, &oracle);
    let mut questions = vec![Question::new("1", "What is the contact email?")];
    let sheet = answerer.answer_all(&mut questions).await;

    assert_eq!(sheet.get("1"), Some(""));
}

#[tokio::test]
async fn test_follow_mode_fetches_and_answers() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(
                r#"<html><head><title>Home</title></head><body>
                <a href="/blog">Blog</a> <a href="/contact">Contact</a>
                </body></html>"#,
            ),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Contact</title></head><body>contact: foo@bar.com</body></html>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    let fetcher = PageFetcher::new(&CrawlerConfig::default()).unwrap();

    let mut questions = vec![
        Question::new("1", "What is the contact email?"),
        Question::new("2", "And the email again?"),
    ];
    let sheet = {
        let mut follower = LinkFollower::new(&mut store, &fetcher, &ContactOracle);
        follower.follow_all(&base_url, &mut questions).await
    };

    assert_eq!(sheet.get("1"), Some("foo@bar.com"));
    // the second question reuses the stored pages
    assert_eq!(sheet.get("2"), Some("foo@bar.com"));

    let contact = store
        .get_by_url(&format!("{}/contact", base_url))
        .unwrap()
        .expect("followed page stored");
    assert_eq!(contact.depth(), 1);
    let home = store.get_by_url(&format!("{}/", base_url)).unwrap().unwrap();
    assert_eq!(contact.parent_id.as_deref(), Some(home.id.as_str()));
}

#[tokio::test]
async fn test_follow_mode_without_links_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Dead end</p>"))
        .mount(&server)
        .await;

    let mut store = SqliteStorage::open_in_memory().unwrap();
    let fetcher = PageFetcher::new(&CrawlerConfig::default()).unwrap();
    let mut follower = LinkFollower::new(&mut store, &fetcher, &SilentOracle);

    let mut question = Question::new("1", "Anything?");
    follower.follow(&server.uri(), &mut question).await.unwrap();

    assert_eq!(question.status(), QuestionStatus::Failed);
    assert_eq!(question.error(), Some(NO_LINK_TO_FOLLOW));
}

#[tokio::test]
async fn test_fetch_questions_from_object_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/questions.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"01": "What is the contact email?", "02": "Which certificates?"}"#,
        ))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let questions = fetch_questions(&client, &format!("{}/data/questions.json", server.uri()))
        .await
        .unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].id, "01");
    assert_eq!(questions[1].text, "Which certificates?");
}

#[tokio::test]
async fn test_fetch_questions_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let result = fetch_questions(&client, &format!("{}/data/questions.json", server.uri())).await;

    assert!(matches!(result, Err(SiteQueryError::Http { .. })));
}

fn report_config(server: &MockServer) -> ReportConfig {
    ReportConfig {
        url: format!("{}/report", server.uri()),
        task: "softo".to_string(),
        api_key_env: "API_KEY".to_string(),
    }
}

fn answered_sheet() -> AnswerSheet {
    let mut first = Question::new("01", "What is the contact email?");
    first.mark_answered("foo@bar.com").unwrap();
    AnswerSheet::from_questions(&[first, Question::new("02", "Which certificates?")])
}

#[tokio::test]
async fn test_report_submission_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .and(body_json(json!({
            "task": "softo",
            "apikey": "report-key",
            "answer": {"01": "foo@bar.com", "02": ""}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 0, "message": "{FLG:DONE}"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = ReportClient::new(&report_config(&server), "report-key");
    let outcome = client.submit(&answered_sheet()).await.unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.message, "{FLG:DONE}");
    assert!(outcome.incorrect_question_ids.is_empty());
}

#[tokio::test]
async fn test_report_submission_rejected_lists_incorrect_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": -340,
            "message": "Answer for question 02 is incorrect"
        })))
        .mount(&server)
        .await;

    let client = ReportClient::new(&report_config(&server), "report-key");
    let outcome = client.submit(&answered_sheet()).await.unwrap();

    assert!(!outcome.accepted);
    assert_eq!(outcome.status, 400);
    assert_eq!(outcome.incorrect_question_ids, vec!["02"]);
}
