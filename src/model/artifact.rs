use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SentimentError};
use super::network::{Activation, DenseLayer, GateActivation, RecurrentCell, RecurrentNetwork};
use super::ModelKind;

/// Weights of the recurrent layer, stored row-major as `[input][unit]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrentWeights {
    pub kernel: Vec<Vec<f32>>,
    pub recurrent_kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    /// LSTM gate activation; ignored for RNN artifacts
    #[serde(default)]
    pub recurrent_activation: GateActivation,
}

/// One dense layer of the classification head
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseWeights {
    pub kernel: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub activation: Activation,
}

/// On-disk model artifact (`model_lstm.json`, `model_rnn.json`).
///
/// ```json
/// {
///   "architecture": "lstm",
///   "mask_zero": false,
///   "embedding": [[...], ...],
///   "recurrent": { "kernel": [[...]], "recurrent_kernel": [[...]], "bias": [...] },
///   "dense": [{ "kernel": [[...]], "bias": [...], "activation": "sigmoid" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub architecture: ModelKind,
    #[serde(default)]
    pub mask_zero: bool,
    pub embedding: Vec<Vec<f32>>,
    pub recurrent: RecurrentWeights,
    pub dense: Vec<DenseWeights>,
}

fn matrix(name: &str, rows: &[Vec<f32>]) -> Result<Array2<f32>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(SentimentError::ModelUnavailable(format!("{} is not rectangular", name)));
    }

    let flat: Vec<f32> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), flat)
        .map_err(|e| SentimentError::ModelUnavailable(format!("{}: {}", name, e)))
}

impl ModelArtifact {
    /// Reads an artifact from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read(path).map_err(|e| SentimentError::ModelUnavailable(
            format!("Failed to read {}: {}", path.display(), e)
        ))?;

        serde_json::from_slice(&content).map_err(|e| SentimentError::ModelUnavailable(
            format!("Malformed model artifact {}: {}", path.display(), e)
        ))
    }

    /// Builds the runtime network, validating every shape.
    pub fn into_network(self) -> Result<RecurrentNetwork> {
        let embedding = matrix("embedding", &self.embedding)?;
        let kernel = matrix("recurrent kernel", &self.recurrent.kernel)?;
        let recurrent_kernel = matrix("recurrent recurrent_kernel", &self.recurrent.recurrent_kernel)?;
        let bias = Array1::from(self.recurrent.bias);

        let cell = match self.architecture {
            ModelKind::Lstm => RecurrentCell::Lstm {
                kernel,
                recurrent_kernel,
                bias,
                gate: self.recurrent.recurrent_activation,
            },
            ModelKind::Rnn => RecurrentCell::Simple { kernel, recurrent_kernel, bias },
        };

        let head = self.dense
            .into_iter()
            .enumerate()
            .map(|(i, layer)| {
                Ok(DenseLayer {
                    kernel: matrix(&format!("dense[{}] kernel", i), &layer.kernel)?,
                    bias: Array1::from(layer.bias),
                    activation: layer.activation,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Building {} network: embedding {:?}, {} dense layer(s)",
            self.architecture,
            embedding.dim(),
            head.len()
        );

        RecurrentNetwork::new(embedding, self.mask_zero, cell, head)
    }
}
