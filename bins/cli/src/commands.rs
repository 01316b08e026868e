//! Subcommand implementations.

use std::path::{Path, PathBuf};

use clap::Args;
use consolidator_core::consolidation::{
    ConsolidationEngine, ConsolidationGroup, InterCompanyElimination,
    suggest_eliminations,
};
use consolidator_shared::types::EntityId;
use consolidator_shared::{AppError, AppResult, ConsolidationConfig};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::provider::FileEntityProvider;

/// Arguments for generating a consolidated statement.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Consolidation group JSON file
    #[arg(long, value_name = "FILE")]
    pub group: PathBuf,

    /// Directory holding `<entity id>.json` trial balances
    #[arg(long, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Exit non-zero when the result does not balance
    #[arg(long)]
    pub fail_on_unbalanced: bool,
}

/// Arguments for suggesting eliminations.
#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Directory holding `<entity id>.json` trial balances
    #[arg(long, value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Entities to match against each other
    #[arg(required = true, num_args = 2..)]
    pub entity_ids: Vec<EntityId>,
}

/// What a command produced: JSON for stdout, plus an error to report after
/// printing it.
pub struct Outcome {
    /// Serialized result.
    pub json: String,
    /// Failure that still leaves output worth printing.
    pub error: Option<AppError>,
}

/// Generates a consolidated statement from files.
pub async fn run_generate(args: GenerateArgs, config: ConsolidationConfig) -> AppResult<Outcome> {
    let group: ConsolidationGroup = read_json(&args.group).await?;
    let engine = ConsolidationEngine::new(FileEntityProvider::new(&args.data_dir), config);

    let data = engine.generate(&group).await?;
    if !data.warnings.is_empty() {
        warn!(count = data.warnings.len(), "Consolidation produced warnings");
    }

    let error = if args.fail_on_unbalanced {
        data.validate().err().map(AppError::from)
    } else {
        None
    };

    Ok(Outcome {
        json: to_json(&data, args.pretty)?,
        error,
    })
}

/// Suggests receivable/payable eliminations among entities.
pub async fn run_suggest(args: SuggestArgs, config: ConsolidationConfig) -> AppResult<Outcome> {
    let engine = ConsolidationEngine::new(FileEntityProvider::new(&args.data_dir), config);

    let mut entities = Vec::with_capacity(args.entity_ids.len());
    for result in engine.fetch_all(&args.entity_ids).await {
        entities.push(result.map_err(|e| AppError::DataUnavailable(e.to_string()))?);
    }

    let suggestions: Vec<InterCompanyElimination> =
        suggest_eliminations(&entities, engine.config());
    info!(count = suggestions.len(), "Elimination suggestions ready");

    Ok(Outcome {
        json: to_json(&suggestions, args.pretty)?,
        error: None,
    })
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::NotFound(format!("Failed to read '{}': {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| AppError::Validation(format!("Failed to parse '{}': {e}", path.display())))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> AppResult<String> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| AppError::Internal(format!("JSON serialization error: {e}")))
}
