use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::parser::RgbReading;

/// Model inputs are the three normalized color channels.
const INPUT_CHANNELS: usize = 3;

/// Result of classifying one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub name: String,
    /// Maximum class probability as a percentage.
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Activation {
    Relu,
    Softmax,
}

#[derive(Debug, Deserialize)]
struct DenseLayer {
    /// One row per output unit, one column per input.
    weights: Vec<Vec<f32>>,
    biases: Vec<f32>,
    activation: Activation,
}

impl DenseLayer {
    fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut out: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                bias + row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>()
            })
            .collect();

        match self.activation {
            Activation::Relu => {
                for v in &mut out {
                    *v = v.max(0.0);
                }
            }
            Activation::Softmax => softmax(&mut out),
        }

        out
    }
}

fn softmax(values: &mut [f32]) {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    layers: Vec<DenseLayer>,
}

/// The pretrained color classifier: a small dense network and the label
/// vocabulary it was trained against. Loaded once at startup and read-only
/// for the rest of the process lifetime.
#[derive(Debug)]
pub struct ColorClassifier {
    layers: Vec<DenseLayer>,
    labels: Vec<String>,
}

impl ColorClassifier {
    /// Load both model artifacts. Any missing file, malformed JSON or shape
    /// mismatch is an error; there is no fallback model.
    pub fn load(model_path: &Path, labels_path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(model_path).with_context(|| {
            format!("failed to read model weights from {}", model_path.display())
        })?;
        let model: ModelFile = serde_json::from_str(&raw)
            .with_context(|| format!("malformed model weights in {}", model_path.display()))?;

        let raw = fs::read_to_string(labels_path).with_context(|| {
            format!(
                "failed to read label vocabulary from {}",
                labels_path.display()
            )
        })?;
        let labels: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("malformed label vocabulary in {}", labels_path.display()))?;

        Self::from_parts(model.layers, labels)
    }

    fn from_parts(layers: Vec<DenseLayer>, labels: Vec<String>) -> Result<Self> {
        if layers.is_empty() {
            bail!("model has no layers");
        }
        if labels.is_empty() {
            bail!("label vocabulary is empty");
        }

        let mut width = INPUT_CHANNELS;
        for (i, layer) in layers.iter().enumerate() {
            if layer.weights.is_empty() {
                bail!("layer {i} has no output units");
            }
            if layer.weights.iter().any(|row| row.len() != width) {
                bail!("layer {i} expects {width} inputs but its weight rows disagree");
            }
            if layer.biases.len() != layer.weights.len() {
                bail!(
                    "layer {i} has {} biases for {} output units",
                    layer.biases.len(),
                    layer.weights.len()
                );
            }
            width = layer.weights.len();
        }

        if width != labels.len() {
            bail!(
                "model produces {width} classes but the label vocabulary has {}",
                labels.len()
            );
        }

        Ok(Self { layers, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classify one reading: normalize each channel by 255, run the network
    /// and take the argmax class. Out-of-range channels are normalized the
    /// same way and simply land above 1.0.
    pub fn predict(&self, reading: &RgbReading) -> Prediction {
        let mut activations = vec![
            reading.r as f32 / 255.0,
            reading.g as f32 / 255.0,
            reading.b as f32 / 255.0,
        ];
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }

        // Shapes were validated at load time, so the output is non-empty and
        // lines up with the vocabulary.
        let (best, probability) = activations
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .expect("validated model has at least one output class");

        Prediction {
            name: self.labels[best].clone(),
            confidence: probability * 100.0,
        }
    }
}
