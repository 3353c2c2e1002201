pub mod config_env;
pub mod json_api;

pub use config_env::{load_config_file, load_config_from_env, CONFIG_PATH_ENV};
pub use json_api::{
    session_request_schema_json, simulate_session, simulate_session_json, CommandInput,
    FrameExport, SessionRequest, SessionResponse, StepSummary,
};
