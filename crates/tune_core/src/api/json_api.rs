// Session replay JSON API
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::config_env::load_config_from_env;
use crate::engine::{ControlCommand, EngineConfig, Frame, PlanePos, TuningEngine};
use crate::error::{Result, TuningError};
use crate::SCHEMA_VERSION;

/// Replay request - sent by a front end
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SessionRequest {
    pub schema_version: u8,
    pub seed: u64,
    /// Fixed starting origin; drawn from `seed` when absent
    #[serde(default)]
    pub origin: Option<PlanePos>,
    /// Engine config; falls back to `TUNE_CONFIG_PATH`, then defaults
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub commands: Vec<CommandInput>,
    /// Include the full reflection grid of the final frame
    #[serde(default)]
    pub include_grid: bool,
}

/// Button code (1..=8) or command name (`tune-up`, `M>>`, ...)
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CommandInput {
    Code(i64),
    Name(String),
}

impl CommandInput {
    pub fn resolve(&self) -> Result<ControlCommand> {
        match self {
            CommandInput::Code(code) => ControlCommand::from_code(*code),
            CommandInput::Name(name) => name.parse(),
        }
    }
}

/// Replay response - sent back to the front end
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub schema_version: u8,
    pub steps: Vec<StepSummary>,
    pub final_frame: FrameExport,
}

#[derive(Debug, Serialize)]
pub struct StepSummary {
    pub index: usize,
    pub command: ControlCommand,
    pub probe: PlanePos,
    pub center_reflection: f64,
    pub best_reflection: f64,
}

#[derive(Debug, Serialize)]
pub struct FrameExport {
    pub probe: PlanePos,
    pub trace: Vec<PlanePos>,
    pub center_reflection: f64,
    pub best_reflection: f64,
    pub quadrant: u8,
    pub checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridExport>,
}

#[derive(Debug, Serialize)]
pub struct GridExport {
    pub axis: Vec<f64>,
    /// Row-major, row = y index
    pub values: Vec<f64>,
}

impl FrameExport {
    pub fn from_frame(frame: &Frame, include_grid: bool) -> Self {
        Self {
            probe: frame.probe,
            trace: frame.trace.clone(),
            center_reflection: frame.center_reflection,
            best_reflection: frame.best_reflection,
            quadrant: frame.quadrant,
            checksum: frame.checksum(),
            grid: include_grid.then(|| GridExport {
                axis: frame.grid.axis().to_vec(),
                values: frame.grid.values().to_vec(),
            }),
        }
    }
}

/// Replay a command list and return the steps and final frame as JSON.
///
/// Unknown codes or names fail the whole request before anything is simulated.
pub fn simulate_session_json(request_json: &str) -> Result<String> {
    let request: SessionRequest = serde_json::from_str(request_json)?;
    let response = simulate_session(request)?;
    Ok(serde_json::to_string(&response)?)
}

pub fn simulate_session(request: SessionRequest) -> Result<SessionResponse> {
    if request.schema_version != SCHEMA_VERSION {
        return Err(TuningError::SchemaVersion {
            found: request.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let commands =
        request.commands.iter().map(CommandInput::resolve).collect::<Result<Vec<_>>>()?;

    let config = match request.config {
        Some(config) => config,
        None => load_config_from_env()?.unwrap_or_default(),
    };

    let mut engine = match request.origin {
        Some(origin) => TuningEngine::with_origin(config, request.seed, origin)?,
        None => TuningEngine::new(config, request.seed)?,
    };

    let steps = commands
        .into_iter()
        .enumerate()
        .map(|(index, command)| {
            let frame = engine.apply(command);
            StepSummary {
                index,
                command,
                probe: frame.probe,
                center_reflection: frame.center_reflection,
                best_reflection: frame.best_reflection,
            }
        })
        .collect();

    let final_frame = FrameExport::from_frame(&engine.current_frame(), request.include_grid);
    Ok(SessionResponse { schema_version: SCHEMA_VERSION, steps, final_frame })
}

/// JSON Schema of [`SessionRequest`]
pub fn session_request_schema_json() -> Result<String> {
    let schema = schemars::schema_for!(SessionRequest);
    Ok(serde_json::to_string_pretty(&schema)?)
}
