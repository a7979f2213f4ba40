//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use scout_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders the system template and, when present, the user template with
/// the same variables. Missing variables render as empty strings.
///
/// # Example
/// ```no_run
/// use scout_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("query".to_string(), "What is Rust?".to_string());
///
/// let built = build_prompt(&def, &vars)?;
/// println!("System prompt: {}", built.system);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("system", &definition.system)
        .map_err(|e| template_error(&definition.id, "register", e))?;
    let system = handlebars
        .render("system", variables)
        .map_err(|e| template_error(&definition.id, "render", e))?;

    let user = match &definition.user {
        Some(template) => {
            handlebars
                .register_template_string("user", template)
                .map_err(|e| template_error(&definition.id, "register", e))?;
            Some(
                handlebars
                    .render("user", variables)
                    .map_err(|e| template_error(&definition.id, "render", e))?,
            )
        }
        None => None,
    };

    let mut resolved: Vec<String> = variables.keys().cloned().collect();
    resolved.sort();

    Ok(BuiltPrompt::new(
        system.trim_end().to_string(),
        user.map(|u| u.trim_end().to_string()),
        definition.id.clone(),
        resolved,
    ))
}

fn template_error(id: &str, action: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Prompt(format!("Failed to {} template '{}': {}", action, id, err))
}
