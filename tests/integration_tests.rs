use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_test::{assert_err, assert_ok};

use prompt_enhancer::config::{validate_temperature, CompletionConfig, EnhancerConfig};
use prompt_enhancer::flow::{FlowOutcome, FlowState, PromptFlow};
use prompt_enhancer::providers::{
  ChatRequest, ChatResponse, ChatTransport, Choice, ResponseMessage
};
use prompt_enhancer::request::{CompletionResult, PromptRequest};
use prompt_enhancer::template::{build_prompt, STRUCTURE_INSTRUCTIONS};
use prompt_enhancer::{ChatModel, CompletionClient, Complexity, EnhancerBackend, Error};

/// Transport that answers from a canned reply and records what it saw
struct MockTransport
{   reply: Result<ChatResponse, Error>
  , calls: Arc<AtomicUsize>
  , last_request: Arc<Mutex<Option<ChatRequest>>>
}

#[async_trait]
impl ChatTransport for MockTransport
{   async fn send(
      &self
    , request: &ChatRequest
    , _api_key: &str
    ) -> Result<ChatResponse, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.reply.clone()
    }
}

struct Harness
{   client: CompletionClient
  , calls: Arc<AtomicUsize>
  , last_request: Arc<Mutex<Option<ChatRequest>>>
}

impl Harness
{   fn new(reply: Result<ChatResponse, Error>) -> Self
    {   let calls = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));
        let transport = MockTransport
        {   reply
          , calls: calls.clone()
          , last_request: last_request.clone()
        };
        Harness
        {   client: CompletionClient::new(Arc::new(transport))
          , calls
          , last_request
        }
    }

    fn replying(text: &str) -> Self
    {   Harness::new(Ok(response_with(text)))
    }

    fn calls(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> ChatRequest
    {   self.last_request.lock().unwrap().clone()
          .expect("transport was never called")
    }
}

fn response_with(text: &str) -> ChatResponse
{   ChatResponse
    {   choices: vec![
          Choice
          {   message: ResponseMessage
              {   role: Some("assistant".to_string())
                , content: Some(text.to_string())
              }
            , finish_reason: Some("stop".to_string())
          }
        ]
    }
}

fn keyed_config() -> CompletionConfig
{   CompletionConfig::default().with_api_key("sk-test")
}

fn biology_request() -> PromptRequest
{   PromptRequest::role_task(
      "Teacher"
    , "high school biology"
    , "explain photosynthesis"
    )
}

// ===== Template =====

#[test]
fn test_role_task_template_contains_fields_and_instructions()
{   let prompt = build_prompt(&biology_request());
    let text = prompt.text();
    assert!(text.contains("Teacher"));
    assert!(text.contains("high school biology"));
    assert!(text.contains("explain photosynthesis"));
    for line in STRUCTURE_INSTRUCTIONS
    {   assert!(text.contains(line), "missing instruction: {}", line);
    }
    assert!(text.contains("Clarify assumptions"));
    assert_eq!(prompt.system_message(), "You are a helpful AI assistant.");
}

#[test]
fn test_template_is_deterministic()
{   let request = PromptRequest::prompt_design(
      "Code review"
    , "gpt-4o"
    , Complexity::Advanced
    , "check error handling"
    );
    assert_eq!(build_prompt(&request), build_prompt(&request));
    assert_eq!(
      build_prompt(&biology_request()).text(),
      build_prompt(&biology_request()).text()
    );
}

#[test]
fn test_prompt_design_template_embeds_fields_verbatim()
{   let request = PromptRequest::prompt_design(
      "  Socratic tutor  "
    , "llama-3 70B"
    , Complexity::Moderate
    , "Ask one question at a time.\nNever give the answer: {x}"
    );
    let text = build_prompt(&request).text().to_string();
    assert!(text.contains("  Socratic tutor  "));
    assert!(text.contains("llama-3 70B"));
    assert!(text.contains("Moderate"));
    assert!(text.contains("Ask one question at a time.\nNever give the answer: {x}"));
    for line in STRUCTURE_INSTRUCTIONS
    {   assert!(text.contains(line));
    }
}

#[test]
fn test_missing_fields_treats_whitespace_as_empty()
{   let request = PromptRequest::role_task("Teacher", "   ", "");
    assert_eq!(request.missing_fields(), vec!["context", "task"]);
    assert_eq!(
      request.validate(),
      Err(Error::MissingInput(vec![
        "context".to_string(),
        "task".to_string()
      ]))
    );
    assert_ok!(biology_request().validate());
}

#[test]
fn test_complexity_is_ordered_and_parses()
{   assert!(Complexity::Simple < Complexity::Moderate);
    assert!(Complexity::Moderate < Complexity::Complex);
    assert!(Complexity::Complex < Complexity::Advanced);
    assert_eq!("advanced".parse::<Complexity>(), Ok(Complexity::Advanced));
    assert_err!("extreme".parse::<Complexity>());
}

#[test]
fn test_model_identifiers()
{   assert_eq!(ChatModel::default(), ChatModel::Gpt35Turbo);
    assert_eq!("gpt-4o-mini".parse::<ChatModel>(), Ok(ChatModel::Gpt4oMini));
    assert_eq!(ChatModel::Gpt4o.to_string(), "gpt-4o");
    assert_eq!(
      "gpt-5".parse::<ChatModel>(),
      Err(Error::UnknownModel("gpt-5".to_string()))
    );
}

// ===== Temperature =====

#[test]
fn test_temperature_bounds()
{   assert_eq!(validate_temperature(0.0), Ok(0.0));
    assert_eq!(validate_temperature(1.0), Ok(1.0));
    assert_eq!(validate_temperature(0.7), Ok(0.7));
    assert_err!(validate_temperature(-0.01));
    assert_err!(validate_temperature(1.01));
    assert_err!(validate_temperature(f32::NAN));
    assert_err!(CompletionConfig::default().with_temperature(2.0));
}

#[tokio::test]
async fn test_temperature_passed_through_at_boundaries()
{   for t in [0.0_f32, 1.0_f32]
    {   let harness = Harness::replying("ok");
        let config = assert_ok!(keyed_config().with_temperature(t));
        let result = harness.client
          .complete(&config, "system", "user")
          .await;
        assert!(result.is_success());
        assert_eq!(harness.last_request().temperature, Some(t));
    }
}

#[tokio::test]
async fn test_out_of_range_temperature_never_reaches_transport()
{   let harness = Harness::replying("ok");
    let mut config = keyed_config();
    config.temperature = 1.5;
    let result = harness.client
      .complete(&config, "system", "user")
      .await;
    assert!(result.display_text().starts_with("Error: "));
    assert_eq!(harness.calls(), 0);
}

// ===== Completion adapter =====

#[tokio::test]
async fn test_completion_trims_reply()
{   let harness = Harness::replying("  \n Hello world \n\n");
    let result = harness.client
      .complete(&keyed_config(), "system", "user")
      .await;
    assert_eq!(
      result,
      CompletionResult::Success { text: "Hello world".to_string() }
    );
}

#[tokio::test]
async fn test_completion_request_shape()
{   let harness = Harness::replying("ok");
    let config = keyed_config().with_model(ChatModel::Gpt4o);
    let _ = harness.client
      .complete(&config, "be brief", "hi there")
      .await;
    let request = harness.last_request();
    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.temperature, Some(0.7));
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert_eq!(request.messages[0].content, "be brief");
    assert_eq!(request.messages[1].role, "user");
    assert_eq!(request.messages[1].content, "hi there");
}

#[tokio::test]
async fn test_completion_failure_becomes_error_text()
{   let harness = Harness::new(Err(Error::HttpError(
      "connection reset".to_string()
    )));
    let result = harness.client
      .complete(&keyed_config(), "system", "user")
      .await;
    assert!(!result.is_success());
    assert_eq!(result.display_text(), "Error: HTTP error: connection reset");
}

#[tokio::test]
async fn test_completion_without_choices()
{   let harness = Harness::new(Ok(ChatResponse { choices: vec![] }));
    let result = harness.client
      .try_complete(&keyed_config(), "system", "user")
      .await;
    assert_eq!(result, Err(Error::NoChoicesInResponse));
}

#[tokio::test]
async fn test_completion_without_key_never_reaches_transport()
{   let harness = Harness::replying("ok");
    let config = CompletionConfig::default().with_api_key("   ");
    let result = harness.client
      .complete(&config, "system", "user")
      .await;
    assert_eq!(
      result.display_text(),
      "Error: Missing API key for the completion service"
    );
    assert_eq!(harness.calls(), 0);
}

// ===== Flow =====

#[tokio::test]
async fn test_flow_warns_on_empty_field_without_calling_adapter()
{   let harness = Harness::replying("ok");
    let mut flow = PromptFlow::new(harness.client.clone(), keyed_config());
    let request = PromptRequest::role_task("Teacher", "", "explain");
    let outcome = flow.submit(&request).await;

    assert!(matches!(outcome, FlowOutcome::Warning(Error::MissingInput(_))));
    assert_eq!(harness.calls(), 0);
    assert_eq!(flow.state(), FlowState::Idle);
    assert_eq!(
      flow.last_transitions(),
      &[
        FlowState::Idle,
        FlowState::Validating,
        FlowState::Warned,
        FlowState::Idle
      ]
    );
}

#[tokio::test]
async fn test_flow_blocks_without_credential()
{   let harness = Harness::replying("ok");
    let mut flow = PromptFlow::new(
      harness.client.clone(),
      CompletionConfig::default()
    );
    let outcome = flow.submit(&biology_request()).await;

    assert_eq!(outcome, FlowOutcome::Blocked(Error::MissingApiKey));
    assert!(outcome.display_text().starts_with("Error: "));
    assert_eq!(harness.calls(), 0);
    assert!(flow.last_transitions().contains(&FlowState::Blocked));
    assert_eq!(flow.state(), FlowState::Idle);
}

#[tokio::test]
async fn test_flow_success_path()
{   let harness = Harness::replying(" 1. Assumptions... ");
    let mut flow = PromptFlow::new(harness.client.clone(), keyed_config());
    let outcome = flow.submit(&biology_request()).await;

    match &outcome
    {   FlowOutcome::Completed { prompt, result } => {
          assert!(prompt.text().contains("explain photosynthesis"));
          assert_eq!(result.display_text(), "1. Assumptions...");
        }
      , other => panic!("unexpected outcome: {:?}", other)
    }
    assert_eq!(harness.calls(), 1);
    let request = harness.last_request();
    assert_eq!(request.messages[0].content, "You are a helpful AI assistant.");
    assert_eq!(
      request.messages[1].content,
      outcome.prompt().unwrap().text()
    );
    assert_eq!(
      flow.last_transitions(),
      &[
        FlowState::Idle,
        FlowState::Validating,
        FlowState::Building,
        FlowState::Requesting,
        FlowState::Displaying,
        FlowState::Idle
      ]
    );
}

#[tokio::test]
async fn test_flow_remote_failure_is_displayed()
{   let harness = Harness::new(Err(Error::RateLimitExceeded));
    let mut flow = PromptFlow::new(harness.client.clone(), keyed_config());
    let outcome = flow.submit(&biology_request()).await;

    assert_eq!(
      outcome.display_text(),
      "Error: API rate limit or quota exceeded"
    );
    assert!(flow.last_transitions().contains(&FlowState::DisplayingError));
    assert_eq!(flow.state(), FlowState::Idle);
}

#[tokio::test]
async fn test_flow_system_message_override()
{   let harness = Harness::replying("ok");
    let mut config = keyed_config();
    config.system_message = Some("Answer in French.".to_string());
    let mut flow = PromptFlow::new(harness.client.clone(), config);
    let request = PromptRequest::prompt_design(
      "Translation", "gpt-4o-mini", Complexity::Simple, "menus"
    );
    let _ = flow.submit(&request).await;
    assert_eq!(
      harness.last_request().messages[0].content,
      "Answer in French."
    );
}

// ===== Backend =====

#[tokio::test]
async fn test_backend_initialization()
{   let harness = Harness::replying("ok");
    let backend = EnhancerBackend::new(
      PromptFlow::new(harness.client, keyed_config())
    );
    assert_ok!(backend.shutdown().await);
}

#[tokio::test]
async fn test_backend_set_api_key_then_submit()
{   let harness = Harness::replying("Hello world");
    let backend = EnhancerBackend::new(
      PromptFlow::new(harness.client.clone(), CompletionConfig::default())
    );

    let mut rx = assert_ok!(backend.submit(biology_request()).await);
    let outcome = assert_ok!(rx.recv().await.unwrap());
    assert_eq!(outcome, FlowOutcome::Blocked(Error::MissingApiKey));

    let mut rx = assert_ok!(backend.set_api_key("  ".to_string()).await);
    assert_eq!(rx.recv().await, Some(Err(Error::MissingApiKey)));

    let mut rx = assert_ok!(backend.set_api_key("sk-test".to_string()).await);
    assert_eq!(rx.recv().await, Some(Ok(())));

    let mut rx = assert_ok!(backend.submit(biology_request()).await);
    let outcome = assert_ok!(rx.recv().await.unwrap());
    assert_eq!(outcome.display_text(), "Hello world");
    assert_eq!(harness.calls(), 1);

    assert_ok!(backend.shutdown().await);
}

#[tokio::test]
async fn test_backend_serializes_submissions()
{   let harness = Harness::replying("done");
    let backend = EnhancerBackend::new(
      PromptFlow::new(harness.client.clone(), keyed_config())
    );

    let mut receivers = Vec::new();
    for _ in 0..5
    {   receivers.push(assert_ok!(backend.submit(biology_request()).await));
    }
    for rx in receivers.iter_mut()
    {   let outcome = assert_ok!(rx.recv().await.unwrap());
        assert_eq!(outcome.display_text(), "done");
    }
    assert_eq!(harness.calls(), 5);
    assert_ok!(backend.shutdown().await);
}

#[tokio::test]
async fn test_backend_get_model_list()
{   let harness = Harness::replying("ok");
    let backend = EnhancerBackend::new(
      PromptFlow::new(harness.client, keyed_config())
    );
    let mut rx = assert_ok!(backend.get_model_list().await);
    assert_eq!(rx.recv().await, Some(Ok(ChatModel::ALL.to_vec())));
    assert_ok!(backend.shutdown().await);
}

// ===== Config & export =====

#[test]
fn test_config_load_and_env_overlay()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enhancer.json");
    std::fs::write(
      &path,
      r#"{ "completion": { "model": "gpt-4o-mini", "temperature": 0.2 } }"#
    ).unwrap();

    let mut config = assert_ok!(EnhancerConfig::load(&path));
    assert_eq!(config.completion.model, ChatModel::Gpt4oMini);
    assert_eq!(config.completion.temperature, 0.2);
    assert_eq!(config.export_path, std::path::PathBuf::from("ai_prompt.txt"));
    assert!(config.completion.api_key.is_none());

    config.apply_env_with(|name| match name
    {   "OPENAI_API_KEY" => Some("sk-env".to_string())
      , "OPENAI_BASE_URL" => Some("http://localhost:9999/v1".to_string())
      , _ => None
    });
    assert_eq!(config.completion.credential(), Some("sk-env"));
    assert_eq!(
      config.completion.api_base.as_deref(),
      Some("http://localhost:9999/v1")
    );

    config.apply_env_with(|_| Some("sk-other".to_string()));
    assert_eq!(config.completion.credential(), Some("sk-env"));

    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("sk-env"));
}

#[test]
fn test_config_rejects_bad_temperature()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enhancer.json");
    std::fs::write(&path, r#"{ "completion": { "temperature": 1.5 } }"#)
      .unwrap();
    assert_eq!(
      EnhancerConfig::load(&path).unwrap_err(),
      Error::InvalidTemperature(1.5)
    );
}

#[test]
fn test_export_writes_plain_text()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ai_prompt.txt");
    let written = assert_ok!(prompt_enhancer::export::save_text(
      Some(&path),
      "Hello world\n"
    ));
    assert_eq!(written, path);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello world\n");
}

#[test]
fn test_export_reports_unwritable_path()
{   let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("ai_prompt.txt");
    let err = prompt_enhancer::export::save_text(Some(&path), "x")
      .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_samples_cover_both_forms()
{   let samples = prompt_enhancer::samples::example_requests();
    assert!(samples.iter().any(|s| matches!(
      s.request, PromptRequest::RoleTask { .. }
    )));
    assert!(samples.iter().any(|s| matches!(
      s.request, PromptRequest::PromptDesign { .. }
    )));
    for sample in &samples
    {   assert_ok!(sample.request.validate());
    }
}

// ===== Live API =====

#[tokio::test]
#[ignore]
async fn test_openai_send_prompt()
{   let api_key = match std::env::var("OPENAI_API_KEY")
    {   Ok(k) => k
      , Err(_) => {
          println!("Skipping: OPENAI_API_KEY not set");
          return;
        }
    };

    let client = CompletionClient::openai(None);
    let config = CompletionConfig::default()
      .with_api_key(api_key)
      .with_model(ChatModel::Gpt4oMini);
    match client.try_complete(&config, "Be brief.", "Say hello").await
    {   Ok(text) => {
          println!("Response: {}", text);
          assert!(!text.is_empty());
          assert_eq!(text, text.trim());
        }
      , Err(e) => {
          println!("API Error: {}", e);
        }
    }
}
