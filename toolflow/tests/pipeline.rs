use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use toolflow::registry::export::{ToolSchema, chunk_tools};
use toolflow::registry::function::{FunctionDescriptor, FunctionError};
use toolflow::registry::registry::FunctionRegistry;
use toolflow::registry::remote::{
    ForwardError, ForwardResult, RemoteCall, RemoteForwarder, RemoteFunctionManifest,
};
use toolflow::schema::Descriptor;
use toolflow::verifier::{VerifyWorkflow, ViolationKind, WorkflowVerifier};

const PARAMETER_ISSUE: &str = "There was an issue with the parameters";

fn survey_registry() -> FunctionRegistry {
    let registry = FunctionRegistry::new();

    registry.register(
        FunctionDescriptor::builder("createSurvey")
            .description("Create a new survey and return its id")
            .param(Descriptor::string("title").with_description("Survey title"))
            .param(Descriptor::string("description").optional())
            .returns(Descriptor::object(
                "result",
                vec![
                    Descriptor::boolean("success"),
                    Descriptor::string("message"),
                    Descriptor::string("surveyId"),
                ],
            ))
            .handler(|args: Vec<Value>| async move {
                let title = args[0].as_str().unwrap_or_default().to_owned();
                Ok::<_, FunctionError>(json!({
                    "success": true,
                    "message": format!("Created {title}"),
                    "surveyId": "s-1"
                }))
            })
            .build()
            .unwrap(),
    );

    registry.register(
        FunctionDescriptor::builder("addQuestion")
            .description("Append a question to a survey")
            .param(Descriptor::string("surveyId"))
            .param(Descriptor::string("question"))
            .param(Descriptor::enumeration("type", ["text", "rating", "choice"]).unwrap())
            .param(Descriptor::number("maxScore").optional())
            .param(Descriptor::array("choices", Descriptor::string("choice")).unwrap().optional())
            .sync_handler(|args| Ok(json!({ "accepted": args.len() })))
            .build()
            .unwrap(),
    );

    registry.register(
        FunctionDescriptor::builder("listSurveys")
            .description("List every survey")
            .sync_handler(|_| Ok(json!([])))
            .build()
            .unwrap(),
    );

    registry
}

#[tokio::test]
async fn matching_arguments_return_the_implementation_result() {
    let registry = survey_registry();

    let created = registry
        .invoke("createSurvey", vec![json!("Onboarding")])
        .await
        .unwrap();
    assert_eq!(
        created,
        json!({ "success": true, "message": "Created Onboarding", "surveyId": "s-1" })
    );

    let added = registry
        .invoke(
            "addQuestion",
            vec![
                json!("s-1"),
                json!("How was your first week?"),
                json!("rating"),
                json!("5"),
                json!("[\"good\", \"bad\"]"),
            ],
        )
        .await
        .unwrap();
    assert_eq!(added, json!({ "accepted": 5 }));
}

#[tokio::test]
async fn uncoercible_arguments_report_a_parameter_issue() {
    let registry = survey_registry();

    for args in [
        vec![json!("s-1"), json!("Q"), json!("rating"), json!("five")],
        vec![json!("s-1"), json!("Q"), json!("video")],
        vec![json!(null), json!("Q"), json!("text")],
        vec![json!("s-1"), json!("Q"), json!("text"), json!(1), json!("not an array")],
    ] {
        let result = registry.invoke("addQuestion", args).await.unwrap();
        let message = result.as_str().unwrap();
        assert!(message.contains(PARAMETER_ISSUE), "{message}");
        assert!(message.contains("\"addQuestion\""));
    }
}

#[tokio::test]
async fn named_invocation_matches_positional() {
    let registry = survey_registry();
    let mut args = serde_json::Map::new();
    args.insert("title".into(), json!("Exit interview"));
    args.insert("unrelated".into(), json!(true));

    let result = registry.invoke_named("createSurvey", args).await.unwrap();
    assert_eq!(result["message"], "Created Exit interview");
}

#[test]
fn exported_no_argument_function_verifies_in_a_trivial_workflow() {
    let registry = survey_registry();
    let exported = registry.describe_all();

    for tool in exported.iter().filter(|tool| tool.required().is_empty()) {
        let document = json!({
            "type": "workflow",
            "description": "single step",
            "actions": [{ "id": "only", "tool": tool.name(), "parameters": {} }]
        });
        let report = registry.verify_workflow(&document);
        assert!(report.is_valid(), "{}: {:?}", tool.name(), report.errors());
    }
}

#[test]
fn chunking_preserves_order_and_content() {
    let registry = survey_registry();
    let tools = registry.describe_all();
    let largest = tools.iter().map(ToolSchema::serialized_len).max().unwrap();

    for budget in [largest, largest + 1, largest * 2, usize::MAX] {
        let chunks = chunk_tools(tools.clone(), budget);
        let flattened: Vec<_> = chunks.into_iter().flat_map(|chunk| chunk.into_tools()).collect();
        assert_eq!(flattened, tools, "budget {budget}");
    }

    let budget = largest + 2;
    let chunks = registry.describe_chunked(budget);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        let encoded = serde_json::to_string(chunk.tools()).unwrap();
        assert!(encoded.chars().count() <= budget, "{encoded}");
    }
}

#[test]
fn forward_references_are_rejected() {
    let registry = survey_registry();
    let document = json!({
        "type": "workflow",
        "actions": [
            {
                "id": "addQuestion",
                "tool": "addQuestion",
                "parameters": { "surveyId": "createSurvey.surveyId", "question": "Q", "type": "text" }
            },
            { "id": "createSurvey", "tool": "createSurvey", "parameters": { "title": "T" } }
        ]
    });

    let report = registry.verify_workflow(&document);
    assert!(!report.is_valid());
    assert!(
        report
            .errors()
            .iter()
            .any(|error| error.contains("cannot reference action \"createSurvey\" that comes after it"))
    );
}

#[test]
fn undeclared_return_fields_are_rejected_with_alternatives() {
    let registry = survey_registry();
    let document = json!({
        "type": "workflow",
        "actions": [
            { "id": "createSurvey", "tool": "createSurvey", "parameters": { "title": "T" } },
            {
                "id": "addQuestion",
                "tool": "addQuestion",
                "parameters": { "surveyId": "createSurvey.id", "question": "Q", "type": "text" }
            }
        ]
    });

    let report = registry.verify_workflow(&document);
    assert_eq!(report.violations().len(), 1);
    let error = report.errors()[0];
    assert!(error.contains("\"id\""));
    assert!(error.contains("success, message, surveyId"));
}

fn nested_array(depth: usize) -> Value {
    let mut component = json!({ "key": "leaf", "label": "Leaf", "type": "string" });
    for level in 0..depth {
        component = json!({
            "key": format!("level{level}"),
            "label": format!("Level {level}"),
            "type": "array",
            "subFields": [component]
        });
    }
    component
}

#[test]
fn array_components_need_valid_sub_fields_at_every_depth() {
    let registry = survey_registry();
    let with_component = |component: Value| {
        json!({
            "type": "workflow",
            "actions": [{ "id": "list", "tool": "listSurveys" }],
            "ui": { "inputComponents": [component] }
        })
    };

    for depth in 1..=4 {
        let report = registry.verify_workflow(&with_component(nested_array(depth)));
        assert!(report.is_valid(), "depth {depth}: {:?}", report.errors());
    }

    let empty = json!({ "key": "rows", "label": "Rows", "type": "array", "subFields": [] });
    let missing = json!({ "key": "rows", "label": "Rows", "type": "array" });
    let mut deep_invalid = nested_array(3);
    deep_invalid["subFields"][0]["subFields"][0]["subFields"][0]["type"] = json!("array");

    for component in [empty, missing, deep_invalid] {
        let report = registry.verify_workflow(&with_component(component));
        assert!(report.has(ViolationKind::MalformedUiComponent));
    }
}

#[test]
fn duplicate_ids_are_reported_alongside_other_errors() {
    let registry = survey_registry();
    let document = json!({
        "type": "workflow",
        "actions": [
            { "id": "step", "tool": "createSurvey", "parameters": { "title": "T" } },
            { "id": "step", "tool": "publishSurvey" },
            {
                "id": "question",
                "tool": "addQuestion",
                "parameters": { "surveyId": "missing.surveyId", "question": "Q", "type": "text" }
            }
        ]
    });

    let report = registry.verify_workflow(&document);
    assert!(report.has(ViolationKind::DuplicateActionId));
    assert!(report.has(ViolationKind::UnknownTool));
    assert!(report.has(ViolationKind::InvalidActionReference));
    assert_eq!(report.violations().len(), 3);
}

#[test]
fn verification_is_safe_to_share_across_threads() {
    let registry = survey_registry();
    let verifier = WorkflowVerifier::new(&registry);
    let valid = json!({
        "type": "workflow",
        "actions": [
            { "id": "create", "tool": "createSurvey", "parameters": { "title": "userInput.title" } },
            {
                "id": "ask",
                "tool": "addQuestion",
                "parameters": { "surveyId": "create.surveyId", "question": "Q", "type": "text" }
            }
        ],
        "ui": {
            "inputComponents": [{ "key": "userInput.title", "label": "Title", "type": "string" }],
            "outputComponents": [{ "actionId": "ask", "component": "dataCard" }]
        }
    });

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| verifier.verify(&valid)))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_valid());
        }
    });
}

#[derive(Default)]
struct RecordingForwarder {
    calls: Mutex<Vec<RemoteCall>>,
    fail: bool,
}

#[async_trait]
impl RemoteForwarder for RecordingForwarder {
    async fn forward(&self, call: RemoteCall) -> ForwardResult<Value> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(ForwardError::Timeout);
        }
        Ok(json!({ "sent": true, "extra": ["returned", "verbatim"] }))
    }
}

fn email_manifest() -> RemoteFunctionManifest {
    serde_json::from_value(json!({
        "name": "sendInvites",
        "description": "Email survey invitations",
        "params": [
            { "kind": "field", "name": "surveyId", "type": "string" },
            { "kind": "field", "name": "limit", "type": "number" }
        ],
        "handle": "mailer-7",
        "needsConfirmation": true
    }))
    .unwrap()
}

#[tokio::test]
async fn remote_functions_forward_coerced_arguments() {
    let forwarder = Arc::new(RecordingForwarder::default());
    let registry = survey_registry().with_forwarder(forwarder.clone());
    registry.register_remote(email_manifest()).unwrap();

    assert!(registry.confirmation_required("sendInvites").unwrap());
    let result = registry
        .invoke("sendInvites", vec![json!("s-1"), json!("25")])
        .await
        .unwrap();
    assert_eq!(result, json!({ "sent": true, "extra": ["returned", "verbatim"] }));

    let calls = forwarder.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        serde_json::to_value(&calls[0]).unwrap(),
        json!({ "name": "sendInvites", "args": ["s-1", 25], "handle": "mailer-7" })
    );
}

#[tokio::test]
async fn forwarding_failures_become_messages() {
    let forwarder = Arc::new(RecordingForwarder {
        fail: true,
        ..RecordingForwarder::default()
    });
    let registry = FunctionRegistry::new().with_forwarder(forwarder);
    registry.register_remote(email_manifest()).unwrap();

    let result = registry
        .invoke("sendInvites", vec![json!("s-1"), json!(3)])
        .await
        .unwrap();
    assert_eq!(
        result,
        json!(
            "An unexpected error occurred while forwarding the function \"sendInvites\" to its remote host. Please try again."
        )
    );

    let unconfigured = FunctionRegistry::new();
    unconfigured.register_remote(email_manifest()).unwrap();
    let result = unconfigured
        .invoke("sendInvites", vec![json!("s-1"), json!(3)])
        .await
        .unwrap();
    assert!(result.as_str().unwrap().contains("remote host"));
}

#[tokio::test]
async fn inactive_functions_leave_the_export_and_refuse_calls() {
    let registry = survey_registry();
    assert!(!registry.toggle_active("listSurveys").unwrap());

    assert!(registry.describe_all().iter().all(|tool| tool.name() != "listSurveys"));
    let result = registry.invoke("listSurveys", Vec::new()).await.unwrap();
    assert_eq!(result, json!("The function \"listSurveys\" is currently not active."));

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.invoke("listSurveys", Vec::new()).await.is_err());
}
