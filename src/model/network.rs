use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};
use crate::tokenizer::{EncodedSequence, PAD, SEQUENCE_LENGTH};
use super::{ModelKind, SequenceScorer};

/// Output activation of a dense layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    pub fn apply(self, v: f32) -> f32 {
        match self {
            Activation::Linear => v,
            Activation::Relu => v.max(0.0),
            Activation::Sigmoid => sigmoid(v),
            Activation::Tanh => v.tanh(),
        }
    }
}

/// Gate activation of an LSTM cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateActivation {
    #[default]
    Sigmoid,
    /// Piecewise-linear `clip(0.2 * x + 0.5, 0, 1)`
    HardSigmoid,
}

impl GateActivation {
    pub fn apply(self, v: f32) -> f32 {
        match self {
            GateActivation::Sigmoid => sigmoid(v),
            GateActivation::HardSigmoid => (0.2 * v + 0.5).clamp(0.0, 1.0),
        }
    }
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Recurrent layer weights.
///
/// LSTM matrices pack the four gates column-wise in the order
/// input, forget, cell, output.
#[derive(Debug, Clone)]
pub enum RecurrentCell {
    Lstm {
        kernel: Array2<f32>,
        recurrent_kernel: Array2<f32>,
        bias: Array1<f32>,
        gate: GateActivation,
    },
    Simple {
        kernel: Array2<f32>,
        recurrent_kernel: Array2<f32>,
        bias: Array1<f32>,
    },
}

impl RecurrentCell {
    pub fn hidden_size(&self) -> usize {
        match self {
            RecurrentCell::Lstm { recurrent_kernel, .. } => recurrent_kernel.nrows(),
            RecurrentCell::Simple { recurrent_kernel, .. } => recurrent_kernel.nrows(),
        }
    }

    fn kind(&self) -> ModelKind {
        match self {
            RecurrentCell::Lstm { .. } => ModelKind::Lstm,
            RecurrentCell::Simple { .. } => ModelKind::Rnn,
        }
    }
}

/// A fully connected layer
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub kernel: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: Activation,
}

/// Embedding → recurrent layer → dense head ending in one sigmoid unit.
#[derive(Debug, Clone)]
pub struct RecurrentNetwork {
    embedding: Array2<f32>,
    mask_zero: bool,
    cell: RecurrentCell,
    head: Vec<DenseLayer>,
}

fn shape_error(msg: String) -> SentimentError {
    SentimentError::ModelUnavailable(msg)
}

fn expect_shape(name: &str, actual: &[usize], expected: &[usize]) -> Result<()> {
    if actual != expected {
        return Err(shape_error(format!(
            "{} has shape {:?}, expected {:?}", name, actual, expected
        )));
    }
    Ok(())
}

impl RecurrentNetwork {
    /// Assembles a network, checking that every weight lines up.
    pub fn new(
        embedding: Array2<f32>,
        mask_zero: bool,
        cell: RecurrentCell,
        head: Vec<DenseLayer>,
    ) -> Result<Self> {
        let (vocab_rows, embed_dim) = embedding.dim();
        if vocab_rows == 0 || embed_dim == 0 {
            return Err(shape_error("embedding table is empty".to_string()));
        }

        let hidden = cell.hidden_size();
        if hidden == 0 {
            return Err(shape_error("recurrent layer has no units".to_string()));
        }

        let (kernel, recurrent_kernel, bias, gates) = match &cell {
            RecurrentCell::Lstm { kernel, recurrent_kernel, bias, .. } => (kernel, recurrent_kernel, bias, 4),
            RecurrentCell::Simple { kernel, recurrent_kernel, bias } => (kernel, recurrent_kernel, bias, 1),
        };
        expect_shape("recurrent kernel", kernel.shape(), &[embed_dim, gates * hidden])?;
        expect_shape("recurrent recurrent_kernel", recurrent_kernel.shape(), &[hidden, gates * hidden])?;
        expect_shape("recurrent bias", bias.shape(), &[gates * hidden])?;

        let mut width = hidden;
        for (i, layer) in head.iter().enumerate() {
            if layer.kernel.nrows() != width {
                return Err(shape_error(format!(
                    "dense[{}] kernel has {} inputs, expected {}", i, layer.kernel.nrows(), width
                )));
            }
            expect_shape(&format!("dense[{}] bias", i), layer.bias.shape(), &[layer.kernel.ncols()])?;
            width = layer.kernel.ncols();
        }

        match head.last() {
            Some(last) if width == 1 && last.activation == Activation::Sigmoid => {}
            _ => return Err(shape_error(
                "network must end in a single sigmoid unit".to_string()
            )),
        }

        let weights = std::iter::once(embedding.iter())
            .chain([kernel.iter(), recurrent_kernel.iter()])
            .flatten()
            .chain(bias.iter())
            .chain(head.iter().flat_map(|l| l.kernel.iter().chain(l.bias.iter())));
        for w in weights {
            if !w.is_finite() {
                return Err(shape_error("weights contain non-finite values".to_string()));
            }
        }

        Ok(Self { embedding, mask_zero, cell, head })
    }

    pub fn hidden_size(&self) -> usize {
        self.cell.hidden_size()
    }

    pub fn vocabulary_rows(&self) -> usize {
        self.embedding.nrows()
    }

    /// Runs the network over `tokens` and returns the output unit.
    ///
    /// With `mask_zero`, padding steps are skipped and the state carries over.
    pub fn forward(&self, tokens: &[u32]) -> Result<f32> {
        let hidden = self.cell.hidden_size();
        let mut h = Array1::<f32>::zeros(hidden);
        let mut c = Array1::<f32>::zeros(hidden);

        for (pos, &token) in tokens.iter().enumerate() {
            if self.mask_zero && token == PAD {
                continue;
            }

            let idx = token as usize;
            if idx >= self.embedding.nrows() {
                return Err(SentimentError::InferenceFailure(format!(
                    "token {} at position {} is outside the embedding table ({} rows)",
                    token, pos, self.embedding.nrows()
                )));
            }
            let x = self.embedding.row(idx);

            match &self.cell {
                RecurrentCell::Lstm { kernel, recurrent_kernel, bias, gate } => {
                    let z = x.dot(kernel) + h.dot(recurrent_kernel) + bias;
                    let i = z.slice(s![0..hidden]).mapv(|v| gate.apply(v));
                    let f = z.slice(s![hidden..2 * hidden]).mapv(|v| gate.apply(v));
                    let g = z.slice(s![2 * hidden..3 * hidden]).mapv(f32::tanh);
                    let o = z.slice(s![3 * hidden..]).mapv(|v| gate.apply(v));
                    c = &f * &c + &i * &g;
                    h = &o * &c.mapv(f32::tanh);
                }
                RecurrentCell::Simple { kernel, recurrent_kernel, bias } => {
                    h = (x.dot(kernel) + h.dot(recurrent_kernel) + bias).mapv(f32::tanh);
                }
            }
        }

        let mut out = h;
        for layer in &self.head {
            out = (out.dot(&layer.kernel) + &layer.bias).mapv(|v| layer.activation.apply(v));
        }

        Ok(out[0])
    }
}

impl SequenceScorer for RecurrentNetwork {
    fn kind(&self) -> ModelKind {
        self.cell.kind()
    }

    fn score(&self, sequence: &EncodedSequence) -> Result<f32> {
        if sequence.len() != SEQUENCE_LENGTH {
            return Err(SentimentError::InferenceFailure(format!(
                "expected input of shape [1, {}], got [1, {}]",
                SEQUENCE_LENGTH,
                sequence.len()
            )));
        }

        let score = self.forward(sequence.tokens())?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(SentimentError::InferenceFailure(format!(
                "{} produced an out-of-range score: {}", self.kind(), score
            )));
        }

        Ok(score)
    }
}
