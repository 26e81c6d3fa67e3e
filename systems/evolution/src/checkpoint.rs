//! JSON checkpoints holding the best network found during training.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{EvolutionError, FeedForwardNetwork};

/// Serialised snapshot of a trained policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Evolution steps completed when the checkpoint was written.
    pub generation: u64,
    /// Fitness the network earned.
    pub fitness: f32,
    /// Trained network.
    pub network: FeedForwardNetwork,
}

impl Checkpoint {
    /// Writes the checkpoint to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), EvolutionError> {
        let encoded = serde_json::to_string_pretty(self)?;
        fs::write(path, encoded).map_err(|source| EvolutionError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Reads a checkpoint written by [`Checkpoint::save`] and validates its network.
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint, EvolutionError> {
    let contents = fs::read_to_string(path).map_err(|source| EvolutionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let checkpoint: Checkpoint = serde_json::from_str(&contents)?;
    checkpoint.network.validate()?;
    Ok(checkpoint)
}
