//! Mood classification over the loaded ONNX session.
//!
//! The artifact contract: input tensor `features` of shape `[1, 23]` (f32),
//! first output a `[1, n_classes]` f32 score tensor, and the class labels
//! stored as a JSON string array under the `class_labels` custom metadata key.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use thiserror::Error;
use tracing::info;

use super::ArtifactError;
use crate::features::{FeatureVector, FEATURE_DIM};

/// Input tensor name expected by the artifact
const INPUT_NAME: &str = "features";

/// ONNX custom metadata key carrying the label vocabulary
const LABELS_METADATA_KEY: &str = "class_labels";

/// Per-prediction failures. These surface as server errors at the boundary.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("inference failed: {0}")]
    Inference(String),

    /// The artifact disagrees with its own vocabulary about class count
    #[error("artifact produced {got} scores for {expected} labels")]
    OutputShape { expected: usize, got: usize },
}

/// Classification seam: feature vector in, mood label out.
///
/// Implementations must be deterministic for a fixed artifact — the same
/// vector yields the same label on every call, concurrent or not.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError>;

    /// Label vocabulary discovered from the artifact at load time
    fn labels(&self) -> &[String];
}

/// ONNX-backed mood classifier.
pub struct MoodClassifier {
    // Session::run requires &mut; the mutex serializes calls
    session: Mutex<Session>,
    labels: Vec<String>,
}

// Safety: ort sessions are Send+Sync by design
unsafe impl Send for MoodClassifier {}
unsafe impl Sync for MoodClassifier {}

impl MoodClassifier {
    /// Load the artifact file and discover its label vocabulary.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| ArtifactError::Load(e.to_string()))?;

        let labels = read_labels(&session)?;
        info!(
            path = %path.display(),
            labels = labels.len(),
            "Classifier artifact loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }
}

impl Classifier for MoodClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        let input = Array2::from_shape_vec((1, FEATURE_DIM), features.to_vec())
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let tensor =
            Tensor::from_array(input).map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("classifier lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![INPUT_NAME => tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (_, value) = outputs
            .iter()
            .next()
            .ok_or_else(|| ClassifierError::Inference("artifact produced no output".to_string()))?;

        let (_shape, scores) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        if scores.len() != self.labels.len() {
            return Err(ClassifierError::OutputShape {
                expected: self.labels.len(),
                got: scores.len(),
            });
        }

        let best = argmax(scores).ok_or_else(|| {
            ClassifierError::Inference("artifact produced an empty score tensor".to_string())
        })?;

        Ok(self.labels[best].clone())
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Read the label vocabulary from the session's custom metadata.
fn read_labels(session: &Session) -> Result<Vec<String>, ArtifactError> {
    let metadata = session
        .metadata()
        .map_err(|e| ArtifactError::Load(e.to_string()))?;

    let raw = metadata
        .custom(LABELS_METADATA_KEY)
        .ok_or_else(|| {
            ArtifactError::Vocabulary(format!("metadata key `{LABELS_METADATA_KEY}` missing"))
        })?;

    let labels: Vec<String> = serde_json::from_str(&raw)
        .map_err(|e| ArtifactError::Vocabulary(format!("`{LABELS_METADATA_KEY}` not a JSON string array: {e}")))?;

    if labels.is_empty() {
        return Err(ArtifactError::Vocabulary("empty label list".to_string()));
    }

    Ok(labels)
}

/// Index of the highest score.
fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_highest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.9, 0.05, 0.05]), Some(0));
    }

    #[test]
    fn argmax_of_empty_is_none() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_prefers_later_slot_on_tie() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(1));
    }
}
