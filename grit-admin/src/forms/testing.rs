//! Scripted prompter for form tests

use anyhow::{Result, anyhow};
use std::collections::VecDeque;

use super::renderer::FieldView;
use super::session::{FieldPrompter, StepChoice};
use super::validation::FieldErrors;

#[derive(Debug, Clone)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Select(Option<usize>),
    Multi(Vec<usize>),
    Step(StepChoice),
    Retry(bool),
}

/// Answers prompts from a fixed script and records what it was shown
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    notices: Vec<String>,
    errors_shown: Vec<String>,
    headers: Vec<String>,
    last_checked: Option<Vec<bool>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            ..Self::default()
        }
    }

    pub fn notices(&self) -> Vec<&str> {
        self.notices.iter().map(String::as_str).collect()
    }

    /// Inline errors shown on re-prompted inputs
    pub fn errors_shown(&self) -> Vec<&str> {
        self.errors_shown.iter().map(String::as_str).collect()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.headers.iter().map(String::as_str).collect()
    }

    pub fn last_checked(&self) -> Option<Vec<bool>> {
        self.last_checked.clone()
    }

    fn next(&mut self, view: Option<&FieldView>) -> Result<Answer> {
        if let Some(error) = view.and_then(|v| v.error.clone()) {
            self.errors_shown.push(error);
        }
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("prompt script exhausted"))
    }
}

impl FieldPrompter for ScriptedPrompter {
    fn text(&mut self, view: &FieldView, _initial: &str) -> Result<String> {
        match self.next(Some(view))? {
            Answer::Text(text) => Ok(text),
            other => Err(anyhow!("expected text for {}, script had {other:?}", view.key)),
        }
    }

    fn confirm(&mut self, view: &FieldView, _initial: bool) -> Result<bool> {
        match self.next(Some(view))? {
            Answer::Confirm(value) => Ok(value),
            other => Err(anyhow!("expected confirm for {}, script had {other:?}", view.key)),
        }
    }

    fn select(&mut self, view: &FieldView, _items: &[String], _initial: Option<usize>) -> Result<Option<usize>> {
        match self.next(Some(view))? {
            Answer::Select(value) => Ok(value),
            other => Err(anyhow!("expected select for {}, script had {other:?}", view.key)),
        }
    }

    fn multi_select(&mut self, view: &FieldView, _items: &[String], checked: &[bool]) -> Result<Vec<usize>> {
        self.last_checked = Some(checked.to_vec());
        match self.next(Some(view))? {
            Answer::Multi(value) => Ok(value),
            other => Err(anyhow!("expected multi select for {}, script had {other:?}", view.key)),
        }
    }

    fn search(&mut self, view: &FieldView) -> Result<String> {
        self.text(view, "")
    }

    fn rich_text(&mut self, view: &FieldView, _initial: &str) -> Result<String> {
        self.text(view, "")
    }

    fn step_header(&mut self, title: &str, label: &str, _progress: f64) {
        self.headers.push(format!("{title} ({label})"));
    }

    fn step_choice(&mut self, _back: &str, _forward: &str) -> Result<StepChoice> {
        match self.next(None)? {
            Answer::Step(choice) => Ok(choice),
            other => Err(anyhow!("expected step choice, script had {other:?}")),
        }
    }

    fn retry(&mut self, _errors: &FieldErrors) -> Result<bool> {
        match self.next(None)? {
            Answer::Retry(value) => Ok(value),
            other => Err(anyhow!("expected retry, script had {other:?}")),
        }
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
