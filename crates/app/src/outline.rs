use std::path::Path;

use anyhow::Context;
use tutorial_core::model::{OutlineDraft, TutorialOutline};

/// Read and validate a JSON outline file.
///
/// # Errors
///
/// Returns an error when the file is unreadable, not valid JSON, or fails
/// outline validation.
pub fn load_outline(path: &Path) -> anyhow::Result<TutorialOutline> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading outline {}", path.display()))?;
    parse_outline(&raw).with_context(|| format!("parsing outline {}", path.display()))
}

/// # Errors
///
/// Returns an error for invalid JSON or an invalid outline.
pub fn parse_outline(raw: &str) -> anyhow::Result<TutorialOutline> {
    let draft: OutlineDraft = serde_json::from_str(raw)?;
    Ok(draft.validate()?)
}
