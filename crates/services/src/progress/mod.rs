mod controller;
mod evaluator;
mod model;
mod notifier;
mod view;

// Public API of the progress subsystem.
pub use controller::ProgressController;
pub use evaluator::PhaseCompletionEvaluator;
pub use model::ProgressModel;
pub use notifier::{NoticeHandle, NotifierConfig, ResumptionNotifier};
pub use view::{DismissReason, ProgressView, ViewEvent};
