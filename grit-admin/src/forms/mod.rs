//! Headless form engine
//!
//! Everything a create/edit form needs that does not touch a terminal:
//! initial values, validation, per-field views, grid layout, the multi-step
//! flow and the stateful widgets (relationship picker, rich text, uploads).
//! [`session::FormSession`] drives it interactively through a
//! [`session::FieldPrompter`].

pub mod builder;
pub mod defaults;
pub mod input;
pub mod overlay;
pub mod prompt;
pub mod relationship;
pub mod renderer;
pub mod richtext;
pub mod session;
pub mod stepper;
pub mod upload;
pub mod validation;

#[cfg(test)]
pub mod testing;

/// Field key to current value
pub type FormValues = serde_json::Map<String, serde_json::Value>;

pub use builder::{FormBuilder, LayoutRow};
pub use defaults::build_defaults;
pub use input::coerce_input;
pub use overlay::{OverlayAnchor, PositionedOverlay, Rect};
pub use prompt::TerminalPrompter;
pub use relationship::{RelationshipPicker, candidate_label};
pub use renderer::{ControlKind, FieldRenderer, FieldView};
pub use richtext::RichTextEditor;
pub use session::{FieldPrompter, FieldServices, FormOutcome, FormSession, StepChoice};
pub use stepper::{FormStepper, StepMove, StepState};
pub use upload::{UploadCheck, check_upload};
pub use validation::{FieldErrors, is_empty_value, validate_field, validate_fields};
