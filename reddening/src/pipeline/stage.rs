//! Extinction correction stage
//!
//! The stage keeps two FIFO queues: fed spectra waiting to be corrected and
//! corrected spectra waiting to be extracted. A spectrum whose correction
//! fails goes back to the front of the waiting queue and is tried again on
//! the next [`PipelineStage::process`] call, up to
//! [`StageConfig::max_retries`] attempts. Delivery is at least once: nothing
//! deduplicates an item that is fed twice.

use std::collections::VecDeque;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{PipelineError, PipelineItem};
use crate::laws::ExtinctionLaw;
use crate::photometry::correction::PhotometricCorrection;
use crate::photometry::spectrum::SampledSpectrum;

/// Operations a pipeline driver needs from a stage
///
/// Drivers call them in the order feed, process, extract. Several items may
/// be fed before any is processed.
pub trait PipelineStage {
    fn name(&self) -> &str;

    /// Queue an item for processing; `source` names where it came from
    fn feed(&mut self, item: PipelineItem, source: &str) -> Result<(), PipelineError>;

    /// Process the oldest queued item
    fn process(&mut self) -> Result<ProcessOutcome, PipelineError>;

    /// Take the oldest processed item, `None` when nothing is ready
    fn extract(&mut self) -> Option<PipelineItem>;

    /// Drop every queued and processed item
    fn clear(&mut self);
}

/// Result of a single [`PipelineStage::process`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No item was waiting
    Idle,
    /// An item was processed and is ready for extraction
    Processed,
    /// Processing failed and the item was queued again
    Retrying { attempts: usize },
}

/// Whether a stage holds any item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Empty,
    Ready,
}

/// Stage settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Attempts per item before it is dropped with [`PipelineError::Processing`]
    pub max_retries: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

#[derive(Debug)]
struct PendingEntry {
    source: String,
    spectrum: SampledSpectrum,
    attempts: usize,
}

/// Pipeline stage correcting spectra with an extinction law
#[derive(Debug)]
pub struct ExtinctionStage<L> {
    name: String,
    law: L,
    config: StageConfig,
    pending: VecDeque<PendingEntry>,
    ready: VecDeque<PipelineItem>,
}

impl<L: ExtinctionLaw> ExtinctionStage<L> {
    pub fn new(law: L) -> Self {
        Self::with_config(law, StageConfig::default())
    }

    pub fn with_config(law: L, config: StageConfig) -> Self {
        Self {
            name: format!("extinction[{}]", law.name()),
            law,
            config,
            pending: VecDeque::new(),
            ready: VecDeque::new(),
        }
    }

    pub fn law(&self) -> &L {
        &self.law
    }

    /// Mutable access to the law, e.g. to recalibrate between batches
    pub fn law_mut(&mut self) -> &mut L {
        &mut self.law
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn state(&self) -> StageState {
        if self.pending.is_empty() && self.ready.is_empty() {
            StageState::Empty
        } else {
            StageState::Ready
        }
    }

    /// Number of items waiting to be processed
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of processed items waiting to be extracted
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }
}

impl<L: ExtinctionLaw> PipelineStage for ExtinctionStage<L> {
    fn name(&self) -> &str {
        &self.name
    }

    fn feed(&mut self, item: PipelineItem, source: &str) -> Result<(), PipelineError> {
        match item {
            PipelineItem::Spectrum(spectrum) => {
                self.pending.push_back(PendingEntry {
                    source: source.to_string(),
                    spectrum,
                    attempts: 0,
                });
                debug!("{}: queued spectrum from {source}", self.name);
                Ok(())
            }
            other => Err(PipelineError::UnrecognizedInput {
                stage: self.name.clone(),
                kind: other.kind(),
                origin: source.to_string(),
            }),
        }
    }

    fn process(&mut self) -> Result<ProcessOutcome, PipelineError> {
        let Some(mut entry) = self.pending.pop_front() else {
            return Ok(ProcessOutcome::Idle);
        };

        match self.law.correct_spectrum(&entry.spectrum) {
            Ok(corrected) => {
                debug!("{}: corrected spectrum from {}", self.name, entry.source);
                self.ready.push_back(PipelineItem::Spectrum(corrected));
                Ok(ProcessOutcome::Processed)
            }
            Err(err) => {
                entry.attempts += 1;
                if entry.attempts >= self.config.max_retries.max(1) {
                    info!(
                        "{}: dropping spectrum from {} after {} attempts: {err}",
                        self.name, entry.source, entry.attempts
                    );
                    return Err(PipelineError::Processing {
                        stage: self.name.clone(),
                        origin: entry.source,
                        attempts: entry.attempts,
                        source: err,
                    });
                }
                warn!(
                    "{}: attempt {} on spectrum from {} failed, queued again: {err}",
                    self.name, entry.attempts, entry.source
                );
                let attempts = entry.attempts;
                self.pending.push_front(entry);
                Ok(ProcessOutcome::Retrying { attempts })
            }
        }
    }

    fn extract(&mut self) -> Option<PipelineItem> {
        self.ready.pop_front()
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.ready.clear();
    }
}
