//! Prompt loader for built-in and workspace YAML prompt definitions.

use crate::types::{PromptDefinition, PromptOrigin, PromptSummary};
use scout_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prompt used for the first turn of a conversation.
pub const ANSWER_INITIAL: &str = "answer.initial";
/// Prompt used once the conversation has an earlier answer.
pub const ANSWER_FOLLOWUP: &str = "answer.followup";
/// Prompt asking for follow-up question suggestions.
pub const FOLLOWUPS_GENERATE: &str = "followups.generate";

const BUILT_IN: [(&str, &str); 3] = [
    (ANSWER_INITIAL, include_str!("../prompts/answer.initial.yml")),
    (ANSWER_FOLLOWUP, include_str!("../prompts/answer.followup.yml")),
    (
        FOLLOWUPS_GENERATE,
        include_str!("../prompts/followups.generate.yml"),
    ),
];

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".scout/prompts")
}

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `.scout/prompts/` overrides the built-in
/// definition of the same id.
///
/// # Example
/// ```no_run
/// use scout_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "answer.initial")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);
        let definition = read_prompt_file(&prompt_file)?;
        if definition.id != prompt_id {
            return Err(AppError::Prompt(format!(
                "Prompt file {:?} declares id '{}', expected '{}'",
                prompt_file, definition.id, prompt_id
            )));
        }
        return Ok(definition);
    }

    let source = BUILT_IN
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, source)| *source)
        .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)))?;

    parse_prompt(source, prompt_id)
}

fn read_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    parse_prompt(&contents, &format!("{:?}", path))
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;

    Ok(definition)
}

/// List built-in prompts plus any workspace overrides or additions.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<PromptSummary>> {
    let mut prompts: BTreeMap<String, PromptSummary> = BTreeMap::new();

    for (id, source) in BUILT_IN {
        let definition = parse_prompt(source, id)?;
        prompts.insert(
            id.to_string(),
            PromptSummary {
                id: id.to_string(),
                title: definition.title,
                origin: PromptOrigin::BuiltIn,
            },
        );
    }

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("yml") {
                continue;
            }
            match read_prompt_file(path) {
                Ok(definition) => {
                    prompts.insert(
                        definition.id.clone(),
                        PromptSummary {
                            id: definition.id,
                            title: definition.title,
                            origin: PromptOrigin::Workspace,
                        },
                    );
                }
                Err(e) => tracing::warn!("Skipping invalid prompt {:?}: {}", path, e),
            }
        }
    }

    Ok(prompts.into_values().collect())
}

/// The three prompts one answer turn needs, loaded once.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    pub initial: PromptDefinition,
    pub followup: PromptDefinition,
    pub suggestions: PromptDefinition,
}

impl PromptLibrary {
    /// Load from the workspace, falling back to built-ins.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        Ok(Self {
            initial: load_prompt(workspace_path, ANSWER_INITIAL)?,
            followup: load_prompt(workspace_path, ANSWER_FOLLOWUP)?,
            suggestions: load_prompt(workspace_path, FOLLOWUPS_GENERATE)?,
        })
    }

    /// Built-in definitions only.
    pub fn built_in() -> AppResult<Self> {
        Ok(Self {
            initial: parse_prompt(BUILT_IN[0].1, ANSWER_INITIAL)?,
            followup: parse_prompt(BUILT_IN[1].1, ANSWER_FOLLOWUP)?,
            suggestions: parse_prompt(BUILT_IN[2].1, FOLLOWUPS_GENERATE)?,
        })
    }
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.system.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt system template cannot be empty".to_string(),
        ));
    }

    let mut parts = def.api_version.split('.');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None)
            if !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );
    if !well_formed {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, file_id: &str, content: &str) {
        let prompts_dir = dir.join(".scout/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", file_id)), content).unwrap();
    }

    fn override_yaml(id: &str) -> String {
        format!(
            r#"
id: {}
title: "Custom"
apiVersion: "1.1"
system: "Be terse. {{{{context}}}}"
"#,
            id
        )
    }

    #[test]
    fn test_built_ins_parse() {
        let library = PromptLibrary::built_in().unwrap();
        assert_eq!(library.initial.id, ANSWER_INITIAL);
        assert!(library.initial.system.contains("{{context}}"));
        assert_eq!(library.followup.id, ANSWER_FOLLOWUP);
        assert_eq!(library.suggestions.output.format, "lines");
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), ANSWER_INITIAL, &override_yaml(ANSWER_INITIAL));

        let prompt = load_prompt(temp_dir.path(), ANSWER_INITIAL).unwrap();
        assert_eq!(prompt.title, "Custom");

        let library = PromptLibrary::load(temp_dir.path()).unwrap();
        assert_eq!(library.initial.title, "Custom");
        assert_ne!(library.followup.title, "Custom");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "invalid", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "invalid").is_err());
    }

    #[test]
    fn test_override_with_mismatched_id() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), ANSWER_INITIAL, &override_yaml("other.id"));
        assert!(load_prompt(temp_dir.path(), ANSWER_INITIAL).is_err());
    }

    #[test]
    fn test_list_prompts_merges_overrides() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), ANSWER_FOLLOWUP, &override_yaml(ANSWER_FOLLOWUP));
        write_prompt(temp_dir.path(), "custom.extra", &override_yaml("custom.extra"));

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 4);

        let followup = prompts.iter().find(|p| p.id == ANSWER_FOLLOWUP).unwrap();
        assert_eq!(followup.origin, PromptOrigin::Workspace);
        let initial = prompts.iter().find(|p| p.id == ANSWER_INITIAL).unwrap();
        assert_eq!(initial.origin, PromptOrigin::BuiltIn);
    }

    #[test]
    fn test_api_version_validation() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "bad.version",
            "id: bad.version\ntitle: Bad\napiVersion: \"1\"\nsystem: hi\n",
        );
        assert!(load_prompt(temp_dir.path(), "bad.version").is_err());
    }
}
