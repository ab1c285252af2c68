use std::path::PathBuf;

use mapwright_engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("read '{}': {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
