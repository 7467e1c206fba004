//! Property tests for the turn loop and history reconciliation.

use augment_core::test_utils::{ScriptedProvider, response, text_response};
use augment_core::{ContentBlock, Message, RequestParams, StopReason, ToolError, ToolOutput};
use augment_loop::{Session, SessionOutcome, TurnOrchestrator};
use augment_tool::{ToolFn, ToolRegistry};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

/// One scripted reply: `Some(n)` requests `n` tool calls, `None` ends the turn.
fn reply_strategy() -> impl Strategy<Value = Option<usize>> {
    prop_oneof![Just(None), (1usize..4).prop_map(Some)]
}

fn echo_registry() -> Arc<ToolRegistry> {
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(ToolFn::new(
        "echo",
        "Echo the input",
        json!({"type": "object"}),
        |input: serde_json::Value| async move { Ok::<_, ToolError>(ToolOutput::json(input)) },
    )));
    registry
}

fn scripted(script: &[Option<usize>]) -> ScriptedProvider {
    let provider = ScriptedProvider::new();
    for (turn, reply) in script.iter().enumerate() {
        match reply {
            None => provider.push_response(text_response("done")),
            Some(n) => {
                let blocks = (0..*n)
                    .map(|i| ContentBlock::ToolUse {
                        // Repeats across turns on purpose.
                        id: format!("call_{i}"),
                        name: "echo".into(),
                        input: json!({"turn": turn, "i": i}),
                    })
                    .collect();
                provider.push_response(response(blocks, StopReason::ToolUse));
            }
        }
    }
    // Never run dry before the bound.
    for _ in 0..16 {
        provider.push_response(text_response("done"));
    }
    provider
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn run(
    script: &[Option<usize>],
    max_iterations: u32,
    prompt_segment: Vec<Message>,
) -> (Session<ScriptedProvider>, SessionOutcome) {
    let orchestrator = TurnOrchestrator::new(scripted(script)).with_tools(echo_registry());
    let mut session = Session::new(orchestrator);
    session.history_mut().extend(prompt_segment, true);
    let outcome = block_on(session.generate_with(
        "start",
        RequestParams::default().with_max_iterations(max_iterations),
    ))
    .unwrap();
    (session, outcome)
}

proptest! {
    #[test]
    fn invocations_never_exceed_the_bound(
        script in prop::collection::vec(reply_strategy(), 0..12),
        max_iterations in 1u32..8,
    ) {
        let (session, outcome) = run(&script, max_iterations, vec![]);
        let calls = session.orchestrator().provider().call_count();
        prop_assert!(calls <= max_iterations as usize);
        prop_assert_eq!(calls, outcome.responses.len());
        prop_assert_eq!(outcome.iterations as usize, calls);
    }

    #[test]
    fn history_is_the_prompt_independent_suffix(
        script in prop::collection::vec(reply_strategy(), 0..6),
        prompt_len in 0usize..4,
    ) {
        let prompt: Vec<Message> = (0..prompt_len)
            .map(|i| if i % 2 == 0 { Message::user(format!("p{i}")) } else { Message::assistant(format!("p{i}")) })
            .collect();
        let (session, outcome) = run(&script, 10, prompt.clone());

        prop_assert_eq!(session.history().prompt(), prompt.as_slice());
        prop_assert_eq!(session.history().conversation(), &outcome.transcript[prompt_len..]);
    }

    #[test]
    fn tool_results_answer_every_call_in_order(
        script in prop::collection::vec(reply_strategy(), 1..6),
    ) {
        let (_, outcome) = run(&script, 10, vec![]);
        let transcript = &outcome.transcript;
        let mut seen = HashSet::new();

        for (i, message) in transcript.iter().enumerate() {
            let calls = message.tool_calls();
            if calls.is_empty() {
                continue;
            }
            let next = transcript.get(i + 1);
            prop_assert!(next.is_some(), "tool calls without results");
            let result_ids: Vec<String> = next
                .map(|m| {
                    m.content
                        .iter()
                        .filter_map(|b| match b {
                            ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.clone()),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();
            let call_ids: Vec<String> = calls.into_iter().map(|c| c.id).collect();
            prop_assert_eq!(&result_ids, &call_ids);
            for id in call_ids {
                prop_assert!(seen.insert(id), "call id reused within a session");
            }
        }
    }
}
