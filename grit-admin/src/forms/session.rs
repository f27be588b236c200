//! Interactive form sessions
//!
//! A session walks a form field by field through a [`FieldPrompter`],
//! coerces and validates what comes back, and only yields values once the
//! whole form validates. Relationship candidates and uploads go through
//! [`FieldServices`].

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::builder::FormBuilder;
use super::overlay::Rect;
use super::relationship::{RelationshipPicker, SEARCH_THRESHOLD};
use super::renderer::FieldView;
use super::richtext::RichTextEditor;
use super::stepper::{FormStepper, StepMove};
use super::upload::{UploadCheck, apply_uploaded, check_upload};
use super::validation::FieldErrors;
use super::FormValues;
use crate::api::{ApiClient, ApiError, Upload};
use crate::render::format::truthy;
use crate::resource::{FieldDefinition, FieldType, FormDefinition};

/// Remote operations some inputs need
#[async_trait]
pub trait FieldServices: Send + Sync {
    /// Candidate records for a relationship picker
    async fn load_options(&self, url: &str) -> Result<Vec<Value>, ApiError>;

    async fn upload(&self, path: &Path) -> Result<Upload, ApiError>;
}

#[async_trait]
impl FieldServices for ApiClient {
    async fn load_options(&self, url: &str) -> Result<Vec<Value>, ApiError> {
        let body: Value = self.get_json(url).await?;
        let items = match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        Ok(items)
    }

    async fn upload(&self, path: &Path) -> Result<Upload, ApiError> {
        self.upload_file(path).await
    }
}

/// Navigation choice at the end of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepChoice {
    Back,
    Forward,
}

/// Asks the user for one value at a time
pub trait FieldPrompter {
    fn text(&mut self, view: &FieldView, initial: &str) -> Result<String>;

    fn confirm(&mut self, view: &FieldView, initial: bool) -> Result<bool>;

    /// Pick one item; `None` when the user picks nothing
    fn select(&mut self, view: &FieldView, items: &[String], initial: Option<usize>) -> Result<Option<usize>>;

    fn multi_select(&mut self, view: &FieldView, items: &[String], checked: &[bool]) -> Result<Vec<usize>>;

    /// Search text narrowing a long candidate list; empty keeps everything
    fn search(&mut self, view: &FieldView) -> Result<String>;

    /// Edit rich text as plain-text markup
    fn rich_text(&mut self, view: &FieldView, initial: &str) -> Result<String>;

    /// Step header with progress, e.g. "Contact (Step 2 of 3)"
    fn step_header(&mut self, title: &str, label: &str, progress: f64);

    fn step_choice(&mut self, back: &str, forward: &str) -> Result<StepChoice>;

    /// Validation failed on submit; `false` abandons the form
    fn retry(&mut self, errors: &FieldErrors) -> Result<bool>;

    fn notice(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Submitted(FormValues),
    Cancelled,
}

pub struct FormSession<'a> {
    form: &'a FormDefinition,
    prompter: &'a mut dyn FieldPrompter,
    services: &'a dyn FieldServices,
    submit_label: String,
}

impl<'a> FormSession<'a> {
    pub fn new(
        form: &'a FormDefinition,
        prompter: &'a mut dyn FieldPrompter,
        services: &'a dyn FieldServices,
    ) -> Self {
        Self {
            form,
            prompter,
            services,
            submit_label: super::builder::DEFAULT_SUBMIT_LABEL.to_string(),
        }
    }

    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Fill every field on one page, then submit
    pub async fn run(&mut self, record: &Map<String, Value>) -> Result<FormOutcome> {
        let form = self.form;
        let mut builder = FormBuilder::new(form, record).submit_label(self.submit_label.clone());
        let mut pending: Vec<&FieldDefinition> = form.fields.iter().collect();

        loop {
            for field in pending {
                self.fill_field(&mut builder, field).await?;
            }
            match builder.submit() {
                Ok(values) => return Ok(FormOutcome::Submitted(values)),
                Err(errors) => {
                    if !self.report(&errors)? {
                        return Ok(FormOutcome::Cancelled);
                    }
                    pending = form
                        .fields
                        .iter()
                        .filter(|f| errors.get(&f.key).is_some())
                        .collect();
                }
            }
        }
    }

    /// Walk the form one step at a time, then submit
    pub async fn run_steps(&mut self, record: &Map<String, Value>) -> Result<FormOutcome> {
        let form = self.form;
        let mut stepper = FormStepper::new(form, record).submit_label(self.submit_label.clone());
        if stepper.steps().is_empty() {
            return self.run(record).await;
        }

        loop {
            let Some(step) = stepper.current_step().cloned() else {
                return Ok(FormOutcome::Cancelled);
            };
            self.prompter
                .step_header(&step.title, &stepper.label(), stepper.progress());
            for field in &step.fields {
                self.fill_field(stepper.builder_mut(), field).await?;
            }

            let choice = self
                .prompter
                .step_choice(stepper.back_label(), stepper.forward_label())?;
            match choice {
                StepChoice::Back if stepper.is_first() => return Ok(FormOutcome::Cancelled),
                StepChoice::Back => {
                    stepper.back();
                }
                StepChoice::Forward if stepper.is_last() => match stepper.submit() {
                    Ok(values) => return Ok(FormOutcome::Submitted(values)),
                    Err(errors) => {
                        if !self.report(&errors)? {
                            return Ok(FormOutcome::Cancelled);
                        }
                        if let Some(idx) = first_step_with_error(&stepper, &errors) {
                            stepper.click(idx);
                        }
                    }
                },
                StepChoice::Forward => {
                    if stepper.next() == StepMove::Blocked {
                        let errors = stepper.builder().errors().clone();
                        for (_, message) in errors.iter() {
                            self.prompter.notice(message);
                        }
                    }
                }
            }
        }
    }

    fn report(&mut self, errors: &FieldErrors) -> Result<bool> {
        for (_, message) in errors.iter() {
            self.prompter.notice(message);
        }
        self.prompter.retry(errors)
    }

    async fn fill_field(&mut self, builder: &mut FormBuilder<'_>, field: &FieldDefinition) -> Result<()> {
        let Some(view) = builder.view(field) else {
            return Ok(());
        };
        let current = builder.value(&field.key).cloned().unwrap_or(Value::Null);

        match field.field_type {
            FieldType::Toggle | FieldType::Checkbox => {
                let answer = self.prompter.confirm(&view, truthy(&current))?;
                builder.set_value(&field.key, Value::Bool(answer));
            }
            FieldType::Select | FieldType::Radio if !field.options.is_empty() => {
                let items: Vec<String> = field.options.iter().map(|o| o.label.clone()).collect();
                let initial = field
                    .options
                    .iter()
                    .position(|o| Some(o.value.as_str()) == current.as_str());
                let picked = self.prompter.select(&view, &items, initial)?;
                let value = picked
                    .and_then(|i| field.options.get(i))
                    .map(|o| Value::String(o.value.clone()))
                    .unwrap_or_else(|| Value::String(String::new()));
                builder.set_value(&field.key, value);
            }
            FieldType::RelationshipSelect | FieldType::MultiRelationshipSelect => {
                self.fill_relationship(builder, field, &view, &current).await?;
            }
            FieldType::Richtext => {
                let mut editor = RichTextEditor::new(current.as_str().unwrap_or_default());
                let text = self.prompter.rich_text(&view, &editor.plain_text())?;
                if let Some(html) = editor.edit_plain(&text) {
                    builder.set_value(&field.key, Value::String(html));
                }
            }
            FieldType::Image
            | FieldType::Images
            | FieldType::Video
            | FieldType::Videos
            | FieldType::File
            | FieldType::Files => {
                self.fill_upload(builder, field, &view, &current).await?;
            }
            _ => self.fill_text(builder, field, view)?,
        }
        Ok(())
    }

    fn fill_text(&mut self, builder: &mut FormBuilder<'_>, field: &FieldDefinition, mut view: FieldView) -> Result<()> {
        loop {
            let raw = self.prompter.text(&view, &view.display)?;
            match builder.input(&field.key, &raw) {
                Ok(()) => return Ok(()),
                Err(message) => {
                    view.error = Some(message);
                    view.description = None;
                }
            }
        }
    }

    async fn fill_relationship(
        &mut self,
        builder: &mut FormBuilder<'_>,
        field: &FieldDefinition,
        view: &FieldView,
        current: &Value,
    ) -> Result<()> {
        let mut picker = RelationshipPicker::new(field, Some(current));
        if let Err(err) = picker.load(self.services).await {
            debug!("Loading candidates for {} failed: {}", field.key, err);
            self.prompter.notice(&err.user_message("Failed to load options"));
            return self.fill_text(builder, field, view.clone());
        }

        picker.open(&Rect::new(0, 0, view.label.chars().count() as u16, 1));
        if picker.filtered().len() > SEARCH_THRESHOLD {
            loop {
                let term = self.prompter.search(view)?;
                picker.set_search(term.trim());
                if !picker.filtered().is_empty() {
                    break;
                }
                self.prompter.notice("No results found");
            }
        }

        let candidates: Vec<Value> = picker.filtered().into_iter().cloned().collect();
        let items: Vec<String> = candidates.iter().map(|c| picker.label_of(c)).collect();
        let ids: Vec<Option<i64>> = candidates.iter().map(crate::render::path::record_id).collect();

        if field.field_type.is_multi() {
            let checked: Vec<bool> = ids
                .iter()
                .map(|id| id.is_some_and(|id| picker.is_selected(id)))
                .collect();
            let picked = self.prompter.multi_select(view, &items, &checked)?;
            // Selections hidden by the search stay as they were
            for (idx, id) in ids.iter().enumerate() {
                let Some(id) = *id else { continue };
                if picked.contains(&idx) != picker.is_selected(id) {
                    picker.select(id);
                }
            }
        } else {
            let initial = ids
                .iter()
                .position(|id| id.is_some_and(|id| picker.is_selected(id)));
            match self.prompter.select(view, &items, initial)? {
                Some(i) => match ids.get(i).copied().flatten() {
                    Some(id) => picker.select(id),
                    None => picker.clear(),
                },
                None => picker.clear(),
            }
        }
        picker.close();
        builder.set_value(&field.key, picker.value().clone());
        Ok(())
    }

    async fn fill_upload(
        &mut self,
        builder: &mut FormBuilder<'_>,
        field: &FieldDefinition,
        view: &FieldView,
        current: &Value,
    ) -> Result<()> {
        let raw = self.prompter.text(view, "")?;
        let paths: Vec<PathBuf> = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
        if paths.is_empty() {
            return Ok(());
        }

        let mut urls = Vec::new();
        for path in paths {
            let size = match tokio::fs::metadata(&path).await {
                Ok(meta) => meta.len(),
                Err(err) => {
                    self.prompter.notice(&format!("{}: {}", path.display(), err));
                    continue;
                }
            };
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
            if let UploadCheck::Rejected(reason) = check_upload(field, &file_name, &mime, size) {
                self.prompter.notice(&reason);
                continue;
            }
            match self.services.upload(&path).await {
                Ok(upload) => urls.push(upload.url),
                Err(err) => self.prompter.notice(&err.user_message("Upload failed")),
            }
            if !field.field_type.is_multi() {
                break;
            }
        }
        if !urls.is_empty() {
            builder.set_value(&field.key, apply_uploaded(field, Some(current), urls));
        }
        Ok(())
    }
}

fn first_step_with_error(stepper: &FormStepper<'_>, errors: &FieldErrors) -> Option<usize> {
    stepper
        .steps()
        .iter()
        .position(|step| step.fields.iter().any(|f| errors.get(&f.key).is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{ScriptedTransport, json_response, scripted_client};
    use crate::forms::testing::{Answer, ScriptedPrompter};
    use crate::resource::{FormLayout, SelectOption, StepDefinition, StepVariant};
    use reqwest::Method;
    use serde_json::json;

    fn form(fields: Vec<FieldDefinition>, steps: Vec<StepDefinition>) -> FormDefinition {
        FormDefinition {
            fields,
            layout: FormLayout::Single,
            steps,
            fields_per_step: 4,
            step_variant: StepVariant::Horizontal,
        }
    }

    fn no_network() -> ScriptedTransport {
        ScriptedTransport::new(|_| json_response(500, json!({})))
    }

    #[tokio::test]
    async fn test_single_page_session_coerces_values() {
        let def = form(
            vec![
                FieldDefinition::new("title", "Title", FieldType::Text).required(),
                FieldDefinition::new("qty", "Quantity", FieldType::Number),
                FieldDefinition::new("active", "Active", FieldType::Toggle),
                FieldDefinition::new("role", "Role", FieldType::Select)
                    .options(vec![SelectOption::new("Admin", "ADMIN"), SelectOption::new("User", "USER")]),
            ],
            Vec::new(),
        );
        let (_, client) = scripted_client(no_network());
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("Widget".into()),
            Answer::Text("lots".into()),
            Answer::Text("12".into()),
            Answer::Confirm(true),
            Answer::Select(Some(1)),
        ]);
        let outcome = FormSession::new(&def, &mut prompter, &client)
            .run(&Map::new())
            .await
            .unwrap();
        let FormOutcome::Submitted(values) = outcome else {
            panic!("form was not submitted");
        };
        assert_eq!(values["qty"], json!(12));
        assert_eq!(values["active"], json!(true));
        assert_eq!(values["role"], json!("USER"));
        assert_eq!(prompter.errors_shown(), vec!["Quantity must be a number"]);
    }

    #[tokio::test]
    async fn test_invalid_form_reprompts_only_failing_fields() {
        let def = form(
            vec![
                FieldDefinition::new("first_name", "First Name", FieldType::Text).required(),
                FieldDefinition::new("email", "Email", FieldType::Text).required(),
            ],
            Vec::new(),
        );
        let (_, client) = scripted_client(no_network());
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("Ada".into()),
            Answer::Text("".into()),
            Answer::Retry(true),
            Answer::Text("ada@example.com".into()),
        ]);
        let outcome = FormSession::new(&def, &mut prompter, &client)
            .run(&Map::new())
            .await
            .unwrap();
        assert!(matches!(outcome, FormOutcome::Submitted(_)));
        assert_eq!(prompter.notices(), vec!["Email is required"]);
    }

    #[tokio::test]
    async fn test_relationship_field_loads_candidates() {
        let def = form(
            vec![
                FieldDefinition::new("label_ids", "Labels", FieldType::MultiRelationshipSelect)
                    .related("/api/labels", "name")
                    .relationship_key("labels"),
            ],
            Vec::new(),
        );
        let (transport, client) = scripted_client(ScriptedTransport::new(|_| {
            json_response(200, json!({"data": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}, {"id": 3, "name": "c"}]}))
        }));
        let record = json!({"labels": [{"id": 2}]}).as_object().cloned().unwrap();
        let mut prompter = ScriptedPrompter::new(vec![Answer::Multi(vec![0, 2])]);
        let outcome = FormSession::new(&def, &mut prompter, &client)
            .run(&record)
            .await
            .unwrap();
        assert_eq!(outcome, FormOutcome::Submitted(json!({"label_ids": [1, 3]}).as_object().cloned().unwrap()));
        assert_eq!(prompter.last_checked(), Some(vec![false, true, false]));
        assert_eq!(transport.requests()[0].path, "/api/labels?page_size=100");
        assert_eq!(transport.count(&Method::GET, "/api/labels"), 1);
    }

    fn many_labels() -> ScriptedTransport {
        ScriptedTransport::new(|_| {
            let items: Vec<Value> = (0..12).map(|i| json!({"id": i, "name": format!("label {i}")})).collect();
            json_response(200, json!({ "data": items }))
        })
    }

    #[tokio::test]
    async fn test_long_candidate_lists_are_searched_first() {
        let def = form(
            vec![FieldDefinition::new("label_id", "Label", FieldType::RelationshipSelect).related("/api/labels", "name")],
            Vec::new(),
        );
        let (_, client) = scripted_client(many_labels());
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("zzz".into()),
            Answer::Text("LABEL 1".into()),
            Answer::Select(Some(1)),
        ]);
        let outcome = FormSession::new(&def, &mut prompter, &client)
            .run(&Map::new())
            .await
            .unwrap();
        assert_eq!(outcome, FormOutcome::Submitted(json!({"label_id": 10}).as_object().cloned().unwrap()));
        assert_eq!(prompter.notices(), vec!["No results found"]);
    }

    #[tokio::test]
    async fn test_search_keeps_selections_outside_the_matches() {
        let def = form(
            vec![
                FieldDefinition::new("label_ids", "Labels", FieldType::MultiRelationshipSelect)
                    .related("/api/labels", "name")
                    .relationship_key("labels"),
            ],
            Vec::new(),
        );
        let (_, client) = scripted_client(many_labels());
        let record = json!({"labels": [{"id": 0}]}).as_object().cloned().unwrap();
        let mut prompter = ScriptedPrompter::new(vec![Answer::Text("label 1".into()), Answer::Multi(vec![0])]);
        let outcome = FormSession::new(&def, &mut prompter, &client)
            .run(&record)
            .await
            .unwrap();
        assert_eq!(outcome, FormOutcome::Submitted(json!({"label_ids": [0, 1]}).as_object().cloned().unwrap()));
        assert_eq!(prompter.last_checked(), Some(vec![false, false, false]));
    }

    #[tokio::test]
    async fn test_stepped_session_gates_and_submits() {
        let def = form(
            vec![
                FieldDefinition::new("first_name", "First Name", FieldType::Text).required(),
                FieldDefinition::new("email", "Email", FieldType::Text).required(),
            ],
            vec![
                StepDefinition::new("Name", &["first_name"]),
                StepDefinition::new("Contact", &["email"]),
            ],
        );
        let (_, client) = scripted_client(no_network());
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("".into()),
            Answer::Step(StepChoice::Forward),
            Answer::Text("Ada".into()),
            Answer::Step(StepChoice::Forward),
            Answer::Text("ada@example.com".into()),
            Answer::Step(StepChoice::Forward),
        ]);
        let outcome = FormSession::new(&def, &mut prompter, &client)
            .run_steps(&Map::new())
            .await
            .unwrap();
        assert!(matches!(outcome, FormOutcome::Submitted(_)));
        assert_eq!(prompter.notices(), vec!["First Name is required"]);
        assert_eq!(
            prompter.headers(),
            vec!["Name (Step 1 of 2)", "Name (Step 1 of 2)", "Contact (Step 2 of 2)"]
        );
    }

    #[tokio::test]
    async fn test_back_on_first_step_cancels() {
        let def = form(
            vec![FieldDefinition::new("first_name", "First Name", FieldType::Text)],
            vec![StepDefinition::new("Name", &["first_name"])],
        );
        let (_, client) = scripted_client(no_network());
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("x".into()),
            Answer::Step(StepChoice::Back),
        ]);
        let outcome = FormSession::new(&def, &mut prompter, &client)
            .run_steps(&Map::new())
            .await
            .unwrap();
        assert_eq!(outcome, FormOutcome::Cancelled);
    }
}
