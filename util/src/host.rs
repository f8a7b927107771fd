//! Host platform utility functions

use std::{env, path::PathBuf};

/// Environment variable holding the root directory of the software, under which the `params` and
/// `sessions` directories are found.
pub const ROOT_ENV_VAR: &str = "SURVEY_PLAN_ROOT";

/// Get the software root directory from the environment.
pub fn get_survey_root() -> Result<PathBuf, env::VarError> {
    env::var(ROOT_ENV_VAR).map(PathBuf::from)
}
