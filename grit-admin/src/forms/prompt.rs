//! Terminal prompter backed by dialoguer

use anyhow::Result;
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Editor, Input, MultiSelect, Select};

use super::renderer::FieldView;
use super::session::{FieldPrompter, StepChoice};
use super::validation::FieldErrors;

/// Width of the step progress bar, in cells
const PROGRESS_WIDTH: usize = 30;

pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn prompt_for(view: &FieldView) -> String {
        let mut prompt = view.label.clone();
        if let Some(footer) = view.footer() {
            let footer = if view.error.is_some() {
                footer.red().to_string()
            } else {
                footer.dimmed().to_string()
            };
            prompt = format!("{prompt} ({footer})");
        }
        prompt
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldPrompter for TerminalPrompter {
    fn text(&mut self, view: &FieldView, initial: &str) -> Result<String> {
        let mut prompt = Self::prompt_for(view);
        if let (true, Some(placeholder)) = (initial.is_empty(), &view.placeholder) {
            prompt = format!("{prompt} [{}]", placeholder.dimmed());
        }
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if !initial.is_empty() {
            input = input.with_initial_text(initial);
        }
        Ok(input.interact_text()?)
    }

    fn confirm(&mut self, view: &FieldView, initial: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(Self::prompt_for(view))
            .default(initial)
            .interact()?)
    }

    fn select(&mut self, view: &FieldView, items: &[String], initial: Option<usize>) -> Result<Option<usize>> {
        if items.is_empty() {
            println!("{} {}", view.label, "(no options)".dimmed());
            return Ok(None);
        }
        let mut select = Select::with_theme(&self.theme)
            .with_prompt(format!("{} (Esc for none)", Self::prompt_for(view)))
            .items(items);
        if let Some(initial) = initial {
            select = select.default(initial);
        }
        Ok(select.interact_opt()?)
    }

    fn multi_select(&mut self, view: &FieldView, items: &[String], checked: &[bool]) -> Result<Vec<usize>> {
        if items.is_empty() {
            println!("{} {}", view.label, "(no options)".dimmed());
            return Ok(Vec::new());
        }
        Ok(MultiSelect::with_theme(&self.theme)
            .with_prompt(Self::prompt_for(view))
            .items(items)
            .defaults(checked)
            .interact()?)
    }

    fn search(&mut self, view: &FieldView) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(format!("Search {}", view.label.to_lowercase()))
            .allow_empty(true)
            .interact_text()?)
    }

    fn rich_text(&mut self, view: &FieldView, initial: &str) -> Result<String> {
        println!("{}", Self::prompt_for(view));
        let edited = Editor::new().extension(".md").edit(initial)?;
        Ok(edited.unwrap_or_else(|| initial.to_string()))
    }

    fn step_header(&mut self, title: &str, label: &str, progress: f64) {
        let filled = ((progress * PROGRESS_WIDTH as f64).round() as usize).min(PROGRESS_WIDTH);
        println!();
        println!("{}  {}", title.bold(), label.dimmed());
        println!(
            "{}{}",
            "█".repeat(filled).green(),
            "░".repeat(PROGRESS_WIDTH - filled).dimmed()
        );
    }

    fn step_choice(&mut self, back: &str, forward: &str) -> Result<StepChoice> {
        let picked = Select::with_theme(&self.theme)
            .items(&[forward, back])
            .default(0)
            .interact()?;
        Ok(if picked == 0 {
            StepChoice::Forward
        } else {
            StepChoice::Back
        })
    }

    fn retry(&mut self, errors: &FieldErrors) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(format!("Fix {} invalid field(s)?", errors.len()))
            .default(true)
            .interact()?)
    }

    fn notice(&mut self, message: &str) {
        println!("{} {}", "✗".red(), message);
    }
}
