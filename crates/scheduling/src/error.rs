use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template is not a recognized shape: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Template validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
