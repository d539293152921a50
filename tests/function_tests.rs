//! Function-call loop inside a single turn.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use aibitat::prelude::*;
use common::MockProvider;

fn add_function(calls: Arc<AtomicUsize>) -> FunctionDefinition {
    FunctionDefinition::new(
        "add",
        "Add two integers",
        FunctionParameters::object()
            .integer("a", "left operand", true)
            .integer("b", "right operand", true)
            .build(),
        move |args, _ctx| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let sum = args.get_i64("a")? + args.get_i64("b")?;
                Ok::<_, AibitatError>(sum.to_string())
            }
        },
    )
}

/// 🧑 pauses after every 🤖 reply, so each test observes exactly one turn.
fn engine(provider: Arc<MockProvider>, config: AibitatConfig, functions: &[&str]) -> Aibitat {
    let mut aibitat = Aibitat::new(config, provider);
    aibitat
        .agent("🧑", AgentConfig::builder().interrupt(InterruptPolicy::Always).build())
        .unwrap()
        .agent(
            "🤖",
            AgentConfig::builder()
                .functions(functions.iter().map(|f| f.to_string()).collect())
                .build(),
        )
        .unwrap();
    aibitat
}

async fn run(aibitat: &mut Aibitat) {
    aibitat
        .start(StartMessage::new("🧑", "🤖", "What is 2 + 2?"))
        .await
        .unwrap();
}

#[tokio::test]
async fn function_result_is_fed_back_until_text() {
    let provider = MockProvider::new()
        .queue_function_call("add", r#"{"a": 2, "b": 2}"#)
        .queue_text("2 + 2 = 4")
        .into_arc();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut aibitat = engine(provider.clone(), AibitatConfig::default(), &["add"]);
    aibitat.function(add_function(calls.clone()));

    run(&mut aibitat).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(aibitat.chats()[1].text(), "2 + 2 = 4");
    // Function traffic stays out of the ledger.
    assert_eq!(aibitat.chats().len(), 3);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let offered: Vec<_> = requests[0]
        .functions
        .as_ref()
        .unwrap()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(offered, vec!["add"]);
    assert_eq!(
        requests[1].messages.last(),
        Some(&Message::function("add", "4"))
    );
}

#[tokio::test]
async fn unknown_function_asks_model_to_try_again() {
    let provider = MockProvider::new()
        .queue_function_call("multiply", "{}")
        .queue_text("sorry")
        .into_arc();
    let mut aibitat = engine(provider.clone(), AibitatConfig::default(), &["add"]);
    aibitat.function(add_function(Arc::new(AtomicUsize::new(0))));

    run(&mut aibitat).await;

    let requests = provider.requests();
    assert_eq!(
        requests[1].messages.last(),
        Some(&Message::function(
            "multiply",
            "Function \"multiply\" not found. Try again."
        ))
    );
    assert_eq!(aibitat.chats()[1].text(), "sorry");
}

#[tokio::test]
async fn unparseable_arguments_are_reported_without_calling_handler() {
    let provider = MockProvider::new()
        .queue_function_call("add", "{a: 2")
        .queue_text("oops")
        .into_arc();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut aibitat = engine(provider.clone(), AibitatConfig::default(), &["add"]);
    aibitat.function(add_function(calls.clone()));

    run(&mut aibitat).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let feedback = provider.requests()[1].messages.last().unwrap().clone();
    assert_eq!(feedback.role, Role::Function);
    assert!(feedback.text().starts_with("Invalid arguments for \"add\""));
}

#[tokio::test]
async fn schema_violations_are_reported_without_calling_handler() {
    let provider = MockProvider::new()
        .queue_function_call("add", r#"{"a": 2}"#)
        .queue_text("oops")
        .into_arc();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut aibitat = engine(provider.clone(), AibitatConfig::default(), &["add"]);
    aibitat.function(add_function(calls.clone()));

    run(&mut aibitat).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let feedback = provider.requests()[1].messages.last().unwrap().clone();
    assert!(feedback.text().contains("missing required argument 'b'"));
}

#[tokio::test]
async fn function_failures_are_fed_back() {
    let provider = MockProvider::new()
        .queue_function_call("lookup", r#"{"key": "x"}"#)
        .queue_text("could not find it")
        .into_arc();
    let mut aibitat = engine(provider.clone(), AibitatConfig::default(), &["lookup"]);
    aibitat.function(FunctionDefinition::new(
        "lookup",
        "Look up a key",
        FunctionParameters::object().string("key", "key", true).build(),
        |args, _ctx| async move {
            Err::<String, _>(AibitatError::function(
                "lookup",
                format!("no entry for {}", args.get_str("key")?),
            ))
        },
    ));

    run(&mut aibitat).await;

    assert_eq!(
        provider.requests()[1].messages.last(),
        Some(&Message::function("lookup", "Error: no entry for x"))
    );
    assert_eq!(aibitat.chats()[1].text(), "could not find it");
}

#[tokio::test]
async fn other_handler_errors_propagate() {
    let provider = MockProvider::new()
        .queue_function_call("explode", "{}")
        .into_arc();
    let mut aibitat = engine(provider, AibitatConfig::default(), &["explode"]);
    aibitat.function(FunctionDefinition::new(
        "explode",
        "Always fails",
        FunctionParameters::empty(),
        |_args, _ctx| async { Err::<String, _>(AibitatError::InvalidState("handler bug".into())) },
    ));

    let err = aibitat
        .start(StartMessage::new("🧑", "🤖", "go"))
        .await
        .unwrap_err();

    assert!(matches!(err, AibitatError::InvalidState(_)));
    assert_eq!(aibitat.chats().len(), 1);
}

#[tokio::test]
async fn call_limit_halts_turn_with_error_record() {
    let provider = MockProvider::new()
        .with_responder(|_| Ok(Completion::function_call("add", r#"{"a": 1, "b": 1}"#)))
        .into_arc();
    let calls = Arc::new(AtomicUsize::new(0));
    let config = AibitatConfig::builder().max_function_calls(2).build();
    let mut aibitat = engine(provider.clone(), config, &["add"]);
    aibitat.function(add_function(calls.clone()));

    run(&mut aibitat).await;

    assert_eq!(provider.calls(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let last = aibitat.chats().last().unwrap();
    assert_eq!(last.state, ChatState::Error);
    assert_eq!(last.route(), Route::new("🤖", "🧑"));
    assert_eq!(aibitat.last_error_kind(), Some(ApiErrorKind::Unknown));
}

#[tokio::test]
async fn undeclared_and_unregistered_functions_are_not_offered() {
    let provider = MockProvider::always("fine").into_arc();
    let mut aibitat = engine(provider.clone(), AibitatConfig::default(), &["ghost"]);
    aibitat.function(add_function(Arc::new(AtomicUsize::new(0))));

    run(&mut aibitat).await;

    assert!(provider.requests()[0].functions.is_none());
    assert_eq!(aibitat.chats()[1].text(), "fine");
}

#[tokio::test]
async fn handler_sees_calling_participant() {
    let provider = MockProvider::new()
        .queue_function_call("whoami", "")
        .queue_text("done")
        .into_arc();
    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let mut aibitat = engine(provider, AibitatConfig::default(), &["whoami"]);
    aibitat.function(FunctionDefinition::new(
        "whoami",
        "Report the caller",
        FunctionParameters::empty(),
        move |_args, ctx| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(ctx.caller.clone());
                Ok::<_, AibitatError>(ctx.caller)
            }
        },
    ));

    run(&mut aibitat).await;

    assert_eq!(seen.lock().unwrap().as_deref(), Some("🤖"));
}
