use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_project_description")]
    pub project_description: String,
}

fn default_project_name() -> String {
    "New Project".to_string()
}

fn default_project_description() -> String {
    "No description".to_string()
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            project_description: default_project_description(),
        }
    }
}
