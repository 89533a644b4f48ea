//! Pipeline stages that apply extinction corrections to streamed data
//!
//! A stage is fed items, processes them one at a time and hands the results
//! back through [`PipelineStage::extract`]. [`Pipeline`] chains stages.

pub mod driver;
pub mod stage;

pub use driver::Pipeline;
pub use stage::{ExtinctionStage, PipelineStage, ProcessOutcome, StageConfig, StageState};

use ndarray::Array1;
use thiserror::Error;

use crate::laws::ExtinctionError;
use crate::photometry::spectrum::SampledSpectrum;

/// Payload passed between pipeline stages
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineItem {
    Spectrum(SampledSpectrum),
    /// Magnitudes measured in a single named band
    Photometry {
        band: String,
        magnitudes: Array1<f64>,
    },
}

impl PipelineItem {
    /// Short name of the payload kind, used in errors and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineItem::Spectrum(_) => "spectrum",
            PipelineItem::Photometry { .. } => "photometry",
        }
    }

    pub fn into_spectrum(self) -> Option<SampledSpectrum> {
        match self {
            PipelineItem::Spectrum(spectrum) => Some(spectrum),
            _ => None,
        }
    }
}

/// Errors raised by pipeline stages and the driver
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Stage {stage} cannot accept {kind} input (from {origin})")]
    UnrecognizedInput {
        stage: String,
        kind: &'static str,
        origin: String,
    },

    #[error("Stage {stage} dropped an item from {origin} after {attempts} failed attempts")]
    Processing {
        stage: String,
        origin: String,
        attempts: usize,
        #[source]
        source: ExtinctionError,
    },

    #[error("Pipeline has no stages")]
    NoStages,
}
