//! In-memory survey backend exposed through the function registry.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};
use toolflow::registry::function::{FunctionDescriptor, FunctionError, FunctionResult};
use toolflow::registry::registry::FunctionRegistry;
use toolflow::schema::Descriptor;

#[derive(Debug, Clone, Serialize)]
struct Question {
    text: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Serialize)]
struct Survey {
    id: String,
    title: String,
    description: String,
    questions: Vec<Question>,
}

/// Shared survey storage.
#[derive(Debug, Clone, Default)]
pub struct SurveyStore {
    surveys: Arc<Mutex<Vec<Survey>>>,
}

impl SurveyStore {
    fn create(&self, title: &str, description: &str) -> String {
        let mut surveys = self.surveys.lock().unwrap_or_else(PoisonError::into_inner);
        let id = format!("survey-{}", surveys.len() + 1);
        surveys.push(Survey {
            id: id.clone(),
            title: title.to_owned(),
            description: description.to_owned(),
            questions: Vec::new(),
        });
        id
    }

    fn add_question(&self, survey_id: &str, text: &str, kind: &str) -> FunctionResult<usize> {
        let mut surveys = self.surveys.lock().unwrap_or_else(PoisonError::into_inner);
        let survey = surveys
            .iter_mut()
            .find(|survey| survey.id == survey_id)
            .ok_or_else(|| FunctionError::failed(format!("survey {survey_id} does not exist")))?;
        survey.questions.push(Question {
            text: text.to_owned(),
            kind: kind.to_owned(),
        });
        Ok(survey.questions.len())
    }

    fn snapshot(&self) -> FunctionResult<Value> {
        let surveys = self.surveys.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_value(&*surveys).map_err(|err| FunctionError::failed(err.to_string()))
    }
}

fn text(args: &[Value], index: usize) -> &str {
    args.get(index).and_then(Value::as_str).unwrap_or_default()
}

/// Registers `createSurvey`, `addQuestion` and `listSurveys` backed by `store`.
///
/// # Errors
///
/// Propagates descriptor construction failures.
pub fn register(registry: &FunctionRegistry, store: &SurveyStore) -> Result<()> {
    let create_store = store.clone();
    registry.register(
        FunctionDescriptor::builder("createSurvey")
            .description("Create a new survey and return its identifier")
            .param(Descriptor::string("title").with_description("Title shown to respondents"))
            .param(
                Descriptor::string("description")
                    .with_description("Introduction shown above the first question")
                    .optional(),
            )
            .returns(Descriptor::object(
                "result",
                vec![
                    Descriptor::boolean("success"),
                    Descriptor::string("message"),
                    Descriptor::string("surveyId"),
                ],
            ))
            .sync_handler(move |args| {
                let title = text(&args, 0);
                let id = create_store.create(title, text(&args, 1));
                Ok(json!({
                    "success": true,
                    "message": format!("Survey \"{title}\" created"),
                    "surveyId": id
                }))
            })
            .build()?,
    );

    let question_store = store.clone();
    registry.register(
        FunctionDescriptor::builder("addQuestion")
            .description("Append a question to an existing survey")
            .param(Descriptor::string("surveyId"))
            .param(Descriptor::string("question"))
            .param(
                Descriptor::enumeration("type", ["text", "rating", "yesNo"])?
                    .with_description("How respondents answer"),
            )
            .returns(Descriptor::object(
                "result",
                vec![Descriptor::boolean("success"), Descriptor::number("position")],
            ))
            .sync_handler(move |args| {
                let position =
                    question_store.add_question(text(&args, 0), text(&args, 1), text(&args, 2))?;
                Ok(json!({ "success": true, "position": position }))
            })
            .build()?,
    );

    let list_store = store.clone();
    registry.register(
        FunctionDescriptor::builder("listSurveys")
            .description("List every survey with its questions")
            .produces_visualization(true)
            .sync_handler(move |_| list_store.snapshot())
            .build()?,
    );

    Ok(())
}
