//! Multi-step form flow
//!
//! Steps come from the definition's explicit list, or from chunking the
//! fields. Moving forward validates only the fields of the step being left;
//! moving back never validates. The final submit validates everything.

use serde_json::{Map, Value};

use super::builder::FormBuilder;
use super::validation::FieldErrors;
use super::FormValues;
use crate::resource::{FieldDefinition, FormDefinition, StepVariant};

/// A step with its fields resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStep<'a> {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<&'a FieldDefinition>,
}

impl ComputedStep<'_> {
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_str()).collect()
    }
}

/// Resolve the steps of a form.
///
/// Explicit steps keep their order and drop keys naming no field. Without
/// explicit steps the fields are chunked `fields_per_step` at a time into
/// steps titled "Step N".
pub fn compute_steps(form: &FormDefinition) -> Vec<ComputedStep<'_>> {
    if !form.steps.is_empty() {
        return form
            .steps
            .iter()
            .map(|step| ComputedStep {
                title: step.title.clone(),
                description: step.description.clone(),
                fields: step.fields.iter().filter_map(|key| form.field(key)).collect(),
            })
            .collect();
    }
    form.fields
        .chunks(form.fields_per_step.max(1))
        .enumerate()
        .map(|(i, chunk)| ComputedStep {
            title: format!("Step {}", i + 1),
            description: None,
            fields: chunk.iter().collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Active,
    Upcoming,
}

/// Result of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMove {
    Moved(usize),
    /// The current step failed validation; errors are set on its fields
    Blocked,
    /// The move is not allowed from here (e.g. skipping ahead)
    Ignored,
}

#[derive(Debug, Clone)]
pub struct FormStepper<'a> {
    builder: FormBuilder<'a>,
    steps: Vec<ComputedStep<'a>>,
    current: usize,
}

impl<'a> FormStepper<'a> {
    pub fn new(form: &'a FormDefinition, record: &Map<String, Value>) -> Self {
        Self {
            builder: FormBuilder::new(form, record),
            steps: compute_steps(form),
            current: 0,
        }
    }

    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.builder = self.builder.submit_label(label);
        self
    }

    pub fn builder(&self) -> &FormBuilder<'a> {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut FormBuilder<'a> {
        &mut self.builder
    }

    pub fn steps(&self) -> &[ComputedStep<'a>] {
        &self.steps
    }

    pub fn variant(&self) -> StepVariant {
        self.builder.definition().step_variant
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> Option<&ComputedStep<'a>> {
        self.steps.get(self.current)
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.steps.len()
    }

    /// Fraction of the progress bar, `(current + 1) / total`
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 1.0;
        }
        (self.current + 1) as f64 / self.steps.len() as f64
    }

    pub fn label(&self) -> String {
        format!("Step {} of {}", self.current + 1, self.steps.len())
    }

    pub fn step_state(&self, idx: usize) -> StepState {
        if idx < self.current {
            StepState::Completed
        } else if idx == self.current {
            StepState::Active
        } else {
            StepState::Upcoming
        }
    }

    /// Label of the left-hand button: Cancel on the first step
    pub fn back_label(&self) -> &'static str {
        if self.is_first() { "Cancel" } else { "Previous" }
    }

    /// Label of the right-hand button: the submit label on the last step
    pub fn forward_label(&self) -> &str {
        if self.is_last() { self.builder.label() } else { "Next" }
    }

    fn validate_current(&mut self) -> bool {
        let keys: Vec<String> = self
            .current_step()
            .map(|s| s.fields.iter().map(|f| f.key.clone()).collect())
            .unwrap_or_default();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.builder.trigger(&keys)
    }

    /// Advance one step if the current step's fields are valid
    pub fn next(&mut self) -> StepMove {
        if self.is_last() {
            return StepMove::Ignored;
        }
        if !self.validate_current() {
            return StepMove::Blocked;
        }
        self.current += 1;
        StepMove::Moved(self.current)
    }

    /// Go back one step; never validates
    pub fn back(&mut self) -> StepMove {
        if self.current == 0 {
            return StepMove::Ignored;
        }
        self.current -= 1;
        StepMove::Moved(self.current)
    }

    /// Click on a step indicator.
    ///
    /// Earlier steps are always reachable. The immediately following step is
    /// reachable when the current one validates. Anything else is ignored.
    pub fn click(&mut self, idx: usize) -> StepMove {
        if idx < self.current {
            self.current = idx;
            return StepMove::Moved(idx);
        }
        if idx == self.current + 1 && idx < self.steps.len() {
            return self.next();
        }
        StepMove::Ignored
    }

    /// Validate every field and hand back the values when valid
    pub fn submit(&mut self) -> Result<FormValues, FieldErrors> {
        self.builder.submit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{FieldType, FormLayout, StepDefinition};
    use serde_json::json;

    fn stepped_form() -> FormDefinition {
        FormDefinition {
            fields: vec![
                FieldDefinition::new("first_name", "First Name", FieldType::Text).required(),
                FieldDefinition::new("last_name", "Last Name", FieldType::Text),
                FieldDefinition::new("email", "Email", FieldType::Text).required(),
                FieldDefinition::new("bio", "Bio", FieldType::Textarea),
                FieldDefinition::new("active", "Active", FieldType::Toggle),
            ],
            layout: FormLayout::Single,
            steps: vec![
                StepDefinition::new("Name", &["first_name", "last_name"]),
                StepDefinition::new("Contact", &["email", "ghost"]),
                StepDefinition::new("Profile", &["bio", "active"]),
            ],
            fields_per_step: 4,
            step_variant: StepVariant::Horizontal,
        }
    }

    #[test]
    fn test_explicit_steps_drop_unknown_keys() {
        let form = stepped_form();
        let steps = compute_steps(&form);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].keys(), vec!["email"]);
    }

    #[test]
    fn test_implicit_steps_chunk_fields() {
        let mut form = stepped_form();
        form.steps.clear();
        form.fields_per_step = 2;
        let steps = compute_steps(&form);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].title, "Step 1");
        assert_eq!(steps[2].keys(), vec!["active"]);
    }

    #[test]
    fn test_step_gating() {
        let form = stepped_form();
        let mut stepper = FormStepper::new(&form, &Map::new());
        assert_eq!(stepper.label(), "Step 1 of 3");
        assert_eq!(stepper.back_label(), "Cancel");

        // first_name empty blocks, and only step 0 fields get errors
        assert_eq!(stepper.next(), StepMove::Blocked);
        assert_eq!(stepper.current(), 0);
        assert_eq!(stepper.builder().error("first_name"), Some("First Name is required"));
        assert!(stepper.builder().error("email").is_none());

        stepper.builder_mut().input("first_name", "Ada").unwrap();
        assert_eq!(stepper.next(), StepMove::Moved(1));
        assert_eq!(stepper.step_state(0), StepState::Completed);
        assert_eq!(stepper.step_state(1), StepState::Active);
        assert_eq!(stepper.step_state(2), StepState::Upcoming);
        assert_eq!(stepper.back_label(), "Previous");

        // skipping ahead is ignored, clicking the next step validates
        assert_eq!(stepper.click(2), StepMove::Blocked);
        assert_eq!(stepper.builder().error("email"), Some("Email is required"));

        // going back never validates
        assert_eq!(stepper.click(0), StepMove::Moved(0));
        assert_eq!(stepper.click(2), StepMove::Ignored);
        assert_eq!(stepper.next(), StepMove::Moved(1));

        stepper.builder_mut().input("email", "ada@example.com").unwrap();
        assert_eq!(stepper.click(2), StepMove::Moved(2));
        assert!(stepper.is_last());
        assert_eq!(stepper.forward_label(), "Save");
        assert!((stepper.progress() - 1.0).abs() < f64::EPSILON);

        let values = stepper.submit().unwrap();
        assert_eq!(values["active"], json!(false));
    }

    #[test]
    fn test_final_submit_validates_every_field() {
        let mut form = stepped_form();
        form.fields.push(FieldDefinition::new("code", "Code", FieldType::Text).required());
        let mut stepper = FormStepper::new(&form, &Map::new());
        stepper.builder_mut().input("first_name", "Ada").unwrap();
        stepper.next();
        stepper.builder_mut().input("email", "ada@example.com").unwrap();
        stepper.next();
        let errors = stepper.submit().unwrap_err();
        assert_eq!(errors.get("code"), Some("Code is required"));
    }

    #[test]
    fn test_back_on_first_step_is_ignored() {
        let form = stepped_form();
        let mut stepper = FormStepper::new(&form, &Map::new());
        assert_eq!(stepper.back(), StepMove::Ignored);
        assert!((stepper.progress() - 1.0 / 3.0).abs() < 1e-9);
    }
}
