// Presentation layer
// Section/row model of the bookmark lists screen and the controller that
// forwards gestures into it.

pub mod list_model;
pub mod screen;
pub mod sections;

pub use list_model::{ListPresentationModel, ModelConfig, ShareOutcome, SharedStore};
pub use sections::SectionLayout;
