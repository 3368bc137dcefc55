use serde::{Deserialize, Serialize};
use strippack::io::ext_repr::{ExtInstance, ExtSolution};

use crate::config::SolveConfig;

#[derive(Serialize, Deserialize, Clone)]
pub struct SPOutput {
    #[serde(flatten)]
    pub instance: ExtInstance,
    pub solution: ExtSolution,
    pub config: SolveConfig,
}
