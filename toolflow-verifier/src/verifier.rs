//! Layered workflow verification.
//!
//! Layers run in a fixed order so that violations are reported
//! deterministically: document shape, action identity, per-action tool and
//! parameter checks, cross-action references, then UI bindings. Only a shape
//! failure stops verification early.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use toolflow_registry::registry::FunctionRegistry;
use toolflow_schema::Descriptor;
use tracing::debug;

use crate::document::{InputKind, OutputKind, WorkflowDocument};
use crate::parameter::{ParameterValue, Reference, collect_placeholders, placeholder_key};
use crate::report::{VerificationReport, ViolationKind};

/// Checks workflow documents against a registry without executing anything.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowVerifier<'r> {
    registry: &'r FunctionRegistry,
}

struct ActionView<'a> {
    position: usize,
    id: Option<&'a str>,
    body: Option<&'a Map<String, Value>>,
}

impl<'a> ActionView<'a> {
    fn label(&self) -> String {
        match self.id {
            Some(id) => format!("Action \"{id}\""),
            None => format!("Action at index {}", self.position),
        }
    }

    fn tool(&self) -> Option<&'a str> {
        self.body?.get("tool").and_then(Value::as_str)
    }

    fn parameters(&self) -> Option<&'a Map<String, Value>> {
        self.body?.get("parameters").and_then(Value::as_object)
    }
}

impl<'r> WorkflowVerifier<'r> {
    /// Creates a verifier reading from `registry`.
    #[must_use]
    pub const fn new(registry: &'r FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Verifies a typed document.
    #[must_use]
    pub fn verify_document(&self, document: &WorkflowDocument) -> VerificationReport {
        match serde_json::to_value(document) {
            Ok(value) => self.verify(&value),
            Err(err) => {
                let mut report = VerificationReport::default();
                report.push(
                    ViolationKind::InvalidShape,
                    format!("Workflow document could not be encoded: {err}"),
                );
                report
            }
        }
    }

    /// Verifies a raw JSON document, collecting every violation found.
    #[must_use]
    pub fn verify(&self, document: &Value) -> VerificationReport {
        let mut report = VerificationReport::default();

        let Some(actions) = check_shape(document, &mut report) else {
            debug!(errors = report.violations().len(), "workflow rejected by shape check");
            return report;
        };

        let views = collect_actions(actions, &mut report);
        let mut positions = HashMap::new();
        for view in &views {
            if let Some(id) = view.id {
                positions.entry(id).or_insert(view.position);
            }
        }

        for view in &views {
            self.check_action(view, &mut report);
        }
        for view in &views {
            self.check_references(view, &views, &positions, &mut report);
        }
        check_ui(document, &views, &positions, &mut report);

        debug!(
            actions = views.len(),
            valid = report.is_valid(),
            errors = report.violations().len(),
            "workflow verified"
        );
        report
    }

    fn check_action(&self, view: &ActionView<'_>, report: &mut VerificationReport) {
        let Some(body) = view.body else {
            return;
        };
        let label = view.label();

        let Some(tool) = view.tool() else {
            report.push(
                ViolationKind::UnknownTool,
                format!("{label} must name a \"tool\""),
            );
            return;
        };
        let Some(descriptor) = self.registry.get(tool) else {
            report.push(
                ViolationKind::UnknownTool,
                format!("{label}: Unknown tool \"{tool}\""),
            );
            return;
        };

        let parameters = match body.get("parameters") {
            None | Some(Value::Null) => None,
            Some(Value::Object(parameters)) => Some(parameters),
            Some(_) => {
                report.push(
                    ViolationKind::InvalidShape,
                    format!("{label}: \"parameters\" must be an object"),
                );
                return;
            }
        };

        for param in descriptor.params() {
            let name = param.name();
            match parameters.and_then(|parameters| parameters.get(name)) {
                None | Some(Value::Null) => {
                    if param.is_required() {
                        report.push(
                            ViolationKind::MissingRequiredParameter,
                            format!(
                                "{label}: Missing required parameter \"{name}\" for tool \"{tool}\""
                            ),
                        );
                    }
                }
                Some(value) => {
                    if ParameterValue::classify(value).is_deferred() {
                        continue;
                    }
                    if let Err(err) = param.check(value.clone()) {
                        report.push(
                            ViolationKind::InvalidParameterValue,
                            format!("{label}: Invalid value for parameter \"{name}\": {err}"),
                        );
                    }
                }
            }
        }
    }

    fn check_references(
        &self,
        view: &ActionView<'_>,
        views: &[ActionView<'_>],
        positions: &HashMap<&str, usize>,
        report: &mut VerificationReport,
    ) {
        let Some(parameters) = view.parameters() else {
            return;
        };
        let label = view.label();

        for (name, value) in parameters {
            let ParameterValue::Reference(reference) = ParameterValue::classify(value) else {
                continue;
            };
            let target = reference.action_id();

            let Some(&target_position) = positions.get(target) else {
                report.push(
                    ViolationKind::InvalidActionReference,
                    format!("{label}: Parameter \"{name}\" references non-existent action \"{target}\""),
                );
                continue;
            };

            if target_position == view.position {
                report.push(
                    ViolationKind::InvalidActionReference,
                    format!("{label}: Parameter \"{name}\" cannot reference its own action"),
                );
            } else if target_position > view.position {
                report.push(
                    ViolationKind::InvalidActionReference,
                    format!(
                        "{label}: Parameter \"{name}\" cannot reference action \"{target}\" that comes after it"
                    ),
                );
            }

            self.check_referenced_field(&label, name, reference, &views[target_position], report);
        }
    }

    /// Only the leading path segment is checked against the callee's declared
    /// object fields; nested and indexed segments are accepted as written.
    fn check_referenced_field(
        &self,
        label: &str,
        name: &str,
        reference: Reference<'_>,
        target: &ActionView<'_>,
        report: &mut VerificationReport,
    ) {
        let Some(tool) = target.tool() else {
            return;
        };
        let Some(descriptor) = self.registry.get(tool) else {
            return;
        };
        let Some(object) = descriptor.returns().and_then(Descriptor::as_object) else {
            return;
        };

        let field = reference.leading_field();
        if object.field(field).is_none() {
            report.push(
                ViolationKind::InvalidActionReference,
                format!(
                    "{label}: Parameter \"{name}\" references field \"{field}\" that does not exist in the output of action \"{}\" (tool \"{tool}\"). Available fields: {}",
                    reference.action_id(),
                    object.field_names().join(", ")
                ),
            );
        }
    }
}

/// Verification entry point on the registry itself.
pub trait VerifyWorkflow {
    /// Verifies `document` against `self`.
    fn verify_workflow(&self, document: &Value) -> VerificationReport;
}

impl VerifyWorkflow for FunctionRegistry {
    fn verify_workflow(&self, document: &Value) -> VerificationReport {
        WorkflowVerifier::new(self).verify(document)
    }
}

fn check_shape<'a>(document: &'a Value, report: &mut VerificationReport) -> Option<&'a [Value]> {
    let Some(root) = document.as_object() else {
        report.push(
            ViolationKind::InvalidShape,
            "Workflow document must be a JSON object",
        );
        return None;
    };

    if root.get("type").and_then(Value::as_str) != Some("workflow") {
        report.push(
            ViolationKind::InvalidShape,
            "Workflow \"type\" must be \"workflow\"",
        );
    }

    let actions = root
        .get("actions")
        .and_then(Value::as_array)
        .filter(|actions| !actions.is_empty());
    if actions.is_none() {
        report.push(
            ViolationKind::InvalidShape,
            "Workflow must contain a non-empty \"actions\" array",
        );
    }

    if report.is_valid() {
        actions.map(Vec::as_slice)
    } else {
        None
    }
}

fn collect_actions<'a>(actions: &'a [Value], report: &mut VerificationReport) -> Vec<ActionView<'a>> {
    let mut seen = HashSet::new();
    let mut views = Vec::with_capacity(actions.len());

    for (position, raw) in actions.iter().enumerate() {
        let Some(body) = raw.as_object() else {
            report.push(
                ViolationKind::InvalidShape,
                format!("Action at index {position} must be an object"),
            );
            views.push(ActionView {
                position,
                id: None,
                body: None,
            });
            continue;
        };

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty());
        match id {
            None => report.push(
                ViolationKind::InvalidActionId,
                format!("Action at index {position} must have a non-empty string \"id\""),
            ),
            Some(id) if !seen.insert(id) => report.push(
                ViolationKind::DuplicateActionId,
                format!("Duplicate action id \"{id}\""),
            ),
            Some(_) => {}
        }

        views.push(ActionView {
            position,
            id,
            body: Some(body),
        });
    }

    views
}

fn check_ui(
    document: &Value,
    views: &[ActionView<'_>],
    positions: &HashMap<&str, usize>,
    report: &mut VerificationReport,
) {
    let ui = match document.get("ui") {
        None | Some(Value::Null) => None,
        Some(Value::Object(ui)) => Some(ui),
        Some(_) => {
            report.push(ViolationKind::InvalidShape, "Workflow \"ui\" must be an object");
            None
        }
    };

    let mut keys = HashSet::new();
    if let Some(components) = ui.and_then(|ui| ui.get("inputComponents")) {
        match components.as_array() {
            Some(components) => {
                for (index, component) in components.iter().enumerate() {
                    if let Some(key) = component.get("key").and_then(Value::as_str) {
                        keys.insert(key);
                    }
                    check_input_component(component, &format!("inputComponents[{index}]"), report);
                }
            }
            None => report.push(
                ViolationKind::InvalidShape,
                "\"ui.inputComponents\" must be an array",
            ),
        }
    }

    check_placeholders(views, &keys, report);

    if let Some(components) = ui.and_then(|ui| ui.get("outputComponents")) {
        match components.as_array() {
            Some(components) => {
                for (index, component) in components.iter().enumerate() {
                    check_output_component(component, index, positions, report);
                }
            }
            None => report.push(
                ViolationKind::InvalidShape,
                "\"ui.outputComponents\" must be an array",
            ),
        }
    }
}

fn check_input_component(component: &Value, path: &str, report: &mut VerificationReport) {
    let Some(body) = component.as_object() else {
        report.push(
            ViolationKind::MalformedUiComponent,
            format!("Input component at {path} must be an object"),
        );
        return;
    };

    let key = non_empty_str(body, "key");
    let subject = match key {
        Some(key) => format!("Input component \"{key}\" at {path}"),
        None => {
            report.push(
                ViolationKind::MalformedUiComponent,
                format!("Input component at {path} must have a non-empty string \"key\""),
            );
            format!("Input component at {path}")
        }
    };

    if non_empty_str(body, "label").is_none() {
        report.push(
            ViolationKind::MalformedUiComponent,
            format!("{subject} must have a non-empty string \"label\""),
        );
    }

    let kind = match body.get("type").or_else(|| body.get("kind")).and_then(Value::as_str) {
        None => {
            report.push(
                ViolationKind::MalformedUiComponent,
                format!("{subject} must have a \"type\""),
            );
            return;
        }
        Some(name) => match InputKind::parse(name) {
            Some(kind) => kind,
            None => {
                let expected: Vec<_> = InputKind::ALL.iter().map(|kind| kind.as_str()).collect();
                report.push(
                    ViolationKind::MalformedUiComponent,
                    format!(
                        "{subject} has invalid type \"{name}\". Expected one of: {}",
                        expected.join(", ")
                    ),
                );
                return;
            }
        },
    };

    match kind {
        InputKind::Enum => {
            if !non_empty_string_array(body, "enumValues") {
                report.push(
                    ViolationKind::MalformedUiComponent,
                    format!("{subject} of type \"enum\" must have a non-empty \"enumValues\" array"),
                );
            }
        }
        InputKind::Csv => {
            if body.get("expectedColumns").is_some_and(|columns| {
                !columns
                    .as_array()
                    .is_some_and(|columns| columns.iter().all(Value::is_string))
            }) {
                report.push(
                    ViolationKind::MalformedUiComponent,
                    format!("{subject} has \"expectedColumns\" that is not an array of strings"),
                );
            }
        }
        InputKind::Array => match body
            .get("subFields")
            .and_then(Value::as_array)
            .filter(|fields| !fields.is_empty())
        {
            Some(fields) => {
                for (index, field) in fields.iter().enumerate() {
                    check_input_component(field, &format!("{path}.subFields[{index}]"), report);
                }
            }
            None => report.push(
                ViolationKind::MalformedUiComponent,
                format!("{subject} of type \"array\" must have a non-empty \"subFields\" array"),
            ),
        },
        InputKind::String | InputKind::Number | InputKind::Boolean | InputKind::Text => {}
    }
}

fn check_placeholders(
    views: &[ActionView<'_>],
    keys: &HashSet<&str>,
    report: &mut VerificationReport,
) {
    let mut found = Vec::new();
    for view in views {
        if let Some(parameters) = view.body.and_then(|body| body.get("parameters")) {
            collect_placeholders(parameters, &mut found);
        }
    }

    let mut reported = HashSet::new();
    for placeholder in found {
        let key = placeholder_key(placeholder);
        if !keys.contains(key) && reported.insert(key) {
            report.push(
                ViolationKind::MissingInputComponent,
                format!("User input \"{placeholder}\" has no input component with key \"{key}\""),
            );
        }
    }
}

fn check_output_component(
    component: &Value,
    index: usize,
    positions: &HashMap<&str, usize>,
    report: &mut VerificationReport,
) {
    let Some(body) = component.as_object() else {
        report.push(
            ViolationKind::MalformedUiComponent,
            format!("Output component at outputComponents[{index}] must be an object"),
        );
        return;
    };

    match body.get("actionId").and_then(Value::as_str) {
        None => report.push(
            ViolationKind::UnknownOutputAction,
            format!("Output component at outputComponents[{index}] must have a string \"actionId\""),
        ),
        Some(action_id) if !positions.contains_key(action_id) => report.push(
            ViolationKind::UnknownOutputAction,
            format!(
                "Output component at outputComponents[{index}] references non-existent action \"{action_id}\""
            ),
        ),
        Some(_) => {}
    }

    let component = body.get("component").and_then(Value::as_str);
    if component.and_then(OutputKind::parse).is_none() {
        let expected: Vec<_> = OutputKind::ALL.iter().map(|kind| kind.as_str()).collect();
        report.push(
            ViolationKind::MalformedUiComponent,
            format!(
                "Output component at outputComponents[{index}] has invalid component {}. Expected one of: {}",
                component.map_or_else(|| "(missing)".to_owned(), |name| format!("\"{name}\"")),
                expected.join(", ")
            ),
        );
    }
}

fn non_empty_str<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn non_empty_string_array(body: &Map<String, Value>, key: &str) -> bool {
    body.get(key)
        .and_then(Value::as_array)
        .is_some_and(|values| !values.is_empty() && values.iter().all(Value::is_string))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use toolflow_registry::function::FunctionDescriptor;

    use super::*;
    use crate::document::{Action, InputComponent, OutputComponent, WorkflowUi};

    fn registry() -> FunctionRegistry {
        let registry = FunctionRegistry::new();
        registry.register(
            FunctionDescriptor::builder("createSurvey")
                .description("Create a survey")
                .param(Descriptor::string("title"))
                .param(Descriptor::string("description").optional())
                .returns(Descriptor::object(
                    "result",
                    vec![
                        Descriptor::boolean("success"),
                        Descriptor::string("message"),
                        Descriptor::string("surveyId"),
                    ],
                ))
                .sync_handler(|_| Ok(json!({ "success": true })))
                .build()
                .unwrap(),
        );
        registry.register(
            FunctionDescriptor::builder("addQuestion")
                .param(Descriptor::string("surveyId"))
                .param(Descriptor::string("question"))
                .param(Descriptor::enumeration("type", ["text", "rating"]).unwrap())
                .param(Descriptor::number("maxScore").optional())
                .sync_handler(|_| Ok(json!({ "success": true })))
                .build()
                .unwrap(),
        );
        registry
    }

    fn verify(document: &Value) -> VerificationReport {
        let registry = registry();
        WorkflowVerifier::new(&registry).verify(document)
    }

    #[test]
    fn accepts_backward_references_and_bound_inputs() {
        let document = WorkflowDocument::new(
            "Survey with one question",
            vec![
                Action::new("createSurvey", "createSurvey")
                    .with_parameter("title", json!("userInput.title")),
                Action::new("addQuestion", "addQuestion")
                    .with_parameter("surveyId", json!("createSurvey.surveyId"))
                    .with_parameter("question", json!("How was it?"))
                    .with_parameter("type", json!("rating"))
                    .with_parameter("maxScore", json!("5")),
            ],
        )
        .with_ui(WorkflowUi {
            input_components: vec![
                InputComponent::new("userInput.title", "Title", InputKind::String).required(),
            ],
            output_components: vec![OutputComponent::new("addQuestion", OutputKind::DataCard)],
        });

        let registry = registry();
        let report = WorkflowVerifier::new(&registry).verify_document(&document);
        assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn shape_failure_short_circuits() {
        let report = verify(&json!({ "type": "plan", "actions": [] }));
        assert_eq!(
            report.errors(),
            [
                "Workflow \"type\" must be \"workflow\"",
                "Workflow must contain a non-empty \"actions\" array"
            ]
        );

        let report = verify(&json!([1, 2]));
        assert_eq!(report.errors(), ["Workflow document must be a JSON object"]);
    }

    #[test]
    fn forward_reference_is_rejected() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                {
                    "id": "addQuestion",
                    "tool": "addQuestion",
                    "parameters": { "surveyId": "createSurvey.surveyId", "question": "Q", "type": "text" }
                },
                { "id": "createSurvey", "tool": "createSurvey", "parameters": { "title": "T" } }
            ]
        }));

        assert_eq!(
            report.errors(),
            [
                "Action \"addQuestion\": Parameter \"surveyId\" cannot reference action \"createSurvey\" that comes after it"
            ]
        );
    }

    #[test]
    fn undeclared_return_field_lists_available_fields() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } },
                {
                    "id": "add",
                    "tool": "addQuestion",
                    "parameters": { "surveyId": "create.id", "question": "Q", "type": "text" }
                }
            ]
        }));

        assert_eq!(report.violations().len(), 1);
        let message = report.errors()[0];
        assert!(message.contains("references field \"id\" that does not exist"));
        assert!(message.ends_with("Available fields: success, message, surveyId"));
    }

    #[test]
    fn nested_and_indexed_paths_are_checked_shallowly() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } },
                {
                    "id": "add",
                    "tool": "addQuestion",
                    "map": true,
                    "parameters": {
                        "surveyId": "create.surveyId.value",
                        "question": "create[*].message",
                        "type": "text"
                    }
                }
            ]
        }));
        assert!(report.is_valid(), "{:?}", report.errors());
    }

    #[test]
    fn missing_and_self_references() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                {
                    "id": "add",
                    "tool": "addQuestion",
                    "parameters": { "surveyId": "ghost.surveyId", "question": "add.question", "type": "text" }
                }
            ]
        }));

        assert_eq!(
            report.errors(),
            [
                "Action \"add\": Parameter \"surveyId\" references non-existent action \"ghost\"",
                "Action \"add\": Parameter \"question\" cannot reference its own action"
            ]
        );
    }

    #[test]
    fn tool_and_parameter_violations() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "a", "tool": "deleteEverything" },
                { "id": "b", "tool": "addQuestion", "parameters": { "question": "Q", "type": "video", "maxScore": "lots" } },
                { "id": "c", "tool": "addQuestion", "parameters": { "surveyId": "s", "question": "Q", "type": "text", "maxScore": { "generate": "pick a score" } } }
            ]
        }));

        assert_eq!(
            report.errors(),
            [
                "Action \"a\": Unknown tool \"deleteEverything\"",
                "Action \"b\": Missing required parameter \"surveyId\" for tool \"addQuestion\"",
                "Action \"b\": Invalid value for parameter \"type\": type: Invalid enum value. Expected 'text' | 'rating', received \"video\"",
                "Action \"b\": Invalid value for parameter \"maxScore\": maxScore: Expected a number, received \"lots\""
            ]
        );
    }

    #[test]
    fn numeric_strings_are_literals_not_references() {
        let registry = registry();
        registry.register(
            FunctionDescriptor::builder("rate")
                .param(Descriptor::number("score"))
                .param(Descriptor::string("site"))
                .sync_handler(|_| Ok(Value::Null))
                .build()
                .unwrap(),
        );

        let report = WorkflowVerifier::new(&registry).verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "a", "tool": "rate", "parameters": { "score": "2.5", "site": "homepage" } }
            ]
        }));
        assert!(report.is_valid(), "{:?}", report.errors());

        let report = WorkflowVerifier::new(&registry).verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "a", "tool": "rate", "parameters": { "score": "high", "site": "example.com" } }
            ]
        }));
        assert_eq!(
            report.errors(),
            [
                "Action \"a\": Invalid value for parameter \"score\": score: Expected a number, received \"high\"",
                "Action \"a\": Parameter \"site\" references non-existent action \"example\""
            ]
        );
    }

    #[test]
    fn explicit_null_counts_as_missing() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                {
                    "id": "add",
                    "tool": "addQuestion",
                    "parameters": { "surveyId": null, "question": "Q", "type": "text", "maxScore": null }
                }
            ]
        }));

        assert_eq!(
            report.errors(),
            ["Action \"add\": Missing required parameter \"surveyId\" for tool \"addQuestion\""]
        );
        assert!(report.has(ViolationKind::MissingRequiredParameter));
        assert!(!report.has(ViolationKind::InvalidParameterValue));
    }

    #[test]
    fn non_object_sections_are_shape_errors() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [{ "id": "create", "tool": "createSurvey", "parameters": ["T"] }]
        }));
        assert_eq!(
            report.errors(),
            ["Action \"create\": \"parameters\" must be an object"]
        );
        assert!(report.has(ViolationKind::InvalidShape));

        let report = verify(&json!({
            "type": "workflow",
            "actions": [{ "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } }],
            "ui": "form"
        }));
        assert_eq!(report.errors(), ["Workflow \"ui\" must be an object"]);
    }

    #[test]
    fn csv_columns_must_be_strings() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [{ "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } }],
            "ui": {
                "inputComponents": [
                    { "key": "userInput.rows", "label": "Rows", "type": "csv", "expectedColumns": ["email", 3] },
                    { "key": "userInput.more", "label": "More", "type": "csv", "expectedColumns": "email" }
                ]
            }
        }));

        assert_eq!(
            report.errors(),
            [
                "Input component \"userInput.rows\" at inputComponents[0] has \"expectedColumns\" that is not an array of strings",
                "Input component \"userInput.more\" at inputComponents[1] has \"expectedColumns\" that is not an array of strings"
            ]
        );
        assert!(report.has(ViolationKind::MalformedUiComponent));
    }

    #[test]
    fn duplicate_ids_do_not_stop_later_layers() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } },
                { "id": "create", "tool": "unknownTool" },
                { "tool": "createSurvey", "parameters": { "title": "later.value" } }
            ]
        }));

        assert_eq!(
            report.errors(),
            [
                "Duplicate action id \"create\"",
                "Action at index 2 must have a non-empty string \"id\"",
                "Action \"create\": Unknown tool \"unknownTool\"",
                "Action at index 2: Parameter \"title\" references non-existent action \"later\""
            ]
        );
        assert!(report.has(ViolationKind::DuplicateActionId));
    }

    #[test]
    fn array_components_validate_recursively() {
        let nested = json!({
            "type": "workflow",
            "actions": [
                { "id": "create", "tool": "createSurvey", "parameters": { "title": "userInput.sections" } }
            ],
            "ui": {
                "inputComponents": [
                    {
                        "key": "userInput.sections",
                        "label": "Sections",
                        "type": "array",
                        "subFields": [
                            { "key": "heading", "label": "Heading", "type": "string" },
                            {
                                "key": "questions",
                                "label": "Questions",
                                "type": "array",
                                "subFields": [
                                    { "key": "kind", "label": "Kind", "type": "enum", "enumValues": ["text", "rating"] }
                                ]
                            }
                        ]
                    }
                ]
            }
        });
        assert!(verify(&nested).is_valid());

        let broken = json!({
            "type": "workflow",
            "actions": [{ "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } }],
            "ui": {
                "inputComponents": [
                    {
                        "key": "userInput.sections",
                        "label": "Sections",
                        "type": "array",
                        "subFields": [
                            { "key": "questions", "label": "Questions", "type": "array", "subFields": [] },
                            { "key": "mood", "label": "", "type": "enum" },
                            { "label": "Colour", "type": "colour" }
                        ]
                    },
                    { "key": "userInput.rows", "label": "Rows", "type": "array" }
                ]
            }
        });

        assert_eq!(
            verify(&broken).errors(),
            [
                "Input component \"questions\" at inputComponents[0].subFields[0] of type \"array\" must have a non-empty \"subFields\" array",
                "Input component \"mood\" at inputComponents[0].subFields[1] must have a non-empty string \"label\"",
                "Input component \"mood\" at inputComponents[0].subFields[1] of type \"enum\" must have a non-empty \"enumValues\" array",
                "Input component at inputComponents[0].subFields[2] must have a non-empty string \"key\"",
                "Input component at inputComponents[0].subFields[2] has invalid type \"colour\". Expected one of: string, number, boolean, enum, text, csv, array",
                "Input component \"userInput.rows\" at inputComponents[1] of type \"array\" must have a non-empty \"subFields\" array"
            ]
        );
    }

    #[test]
    fn placeholders_need_input_components() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "create", "tool": "createSurvey", "parameters": { "title": "userInput.title", "description": "userInput.description" } },
                {
                    "id": "add",
                    "tool": "addQuestion",
                    "map": true,
                    "parameters": {
                        "surveyId": "create.surveyId",
                        "question": "userInput.csvData[*].question",
                        "type": "userInput.csvData[*].type"
                    }
                }
            ],
            "ui": {
                "inputComponents": [
                    { "key": "userInput.title", "label": "Title", "type": "string" },
                    { "key": "userInput.csvData", "label": "Questions", "type": "csv", "expectedColumns": ["question", "type"] }
                ]
            }
        }));

        assert_eq!(
            report.errors(),
            ["User input \"userInput.description\" has no input component with key \"userInput.description\""]
        );
    }

    #[test]
    fn output_components_must_bind_existing_actions() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [{ "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } }],
            "ui": {
                "outputComponents": [
                    { "actionId": "create", "component": "table", "props": {} },
                    { "actionId": "publish", "component": "dataCard" },
                    { "actionId": "create", "component": "chart" }
                ]
            }
        }));

        assert_eq!(
            report.errors(),
            [
                "Output component at outputComponents[1] references non-existent action \"publish\"",
                "Output component at outputComponents[2] has invalid component \"chart\". Expected one of: table, dataCard"
            ]
        );
    }

    #[test]
    fn errors_follow_layer_order() {
        let report = verify(&json!({
            "type": "workflow",
            "actions": [
                { "id": "x", "tool": "addQuestion", "parameters": { "surveyId": "y.surveyId", "question": "userInput.q", "type": "text" } },
                { "id": "x", "tool": "nope" },
                { "id": "y", "tool": "createSurvey", "parameters": {} }
            ],
            "ui": { "outputComponents": [{ "actionId": "z", "component": "table" }] }
        }));

        let kinds: Vec<_> = report.violations().iter().map(|v| v.kind()).collect();
        assert_eq!(
            kinds,
            [
                ViolationKind::DuplicateActionId,
                ViolationKind::UnknownTool,
                ViolationKind::MissingRequiredParameter,
                ViolationKind::InvalidActionReference,
                ViolationKind::MissingInputComponent,
                ViolationKind::UnknownOutputAction
            ]
        );
    }

    #[test]
    fn registry_extension_trait_verifies() {
        let registry = registry();
        let report = registry.verify_workflow(&json!({
            "type": "workflow",
            "actions": [{ "id": "create", "tool": "createSurvey", "parameters": { "title": "T" } }]
        }));
        assert!(report.is_valid());
    }
}
