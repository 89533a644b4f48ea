//! Sequential driver for a chain of pipeline stages

use std::collections::VecDeque;

use log::{debug, warn};

use super::stage::{PipelineStage, ProcessOutcome};
use super::{PipelineError, PipelineItem};

/// An item extracted from one stage and waiting to be fed to the next
struct Handoff {
    to: usize,
    item: PipelineItem,
    source: String,
}

/// Ordered chain of stages; the output of each stage feeds the next
///
/// Items between stages and finished outputs are held by the driver, so an
/// error from one stage never discards work another stage already did.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn PipelineStage>>,
    handoffs: VecDeque<Handoff>,
    completed: VecDeque<PipelineItem>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the end of the chain
    pub fn with_stage(mut self, stage: impl PipelineStage + 'static) -> Self {
        self.add_stage(Box::new(stage));
        self
    }

    pub fn add_stage(&mut self, stage: Box<dyn PipelineStage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Finished items not yet returned by [`Pipeline::run`]
    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    /// Items extracted from a stage but not yet accepted by the next one
    pub fn handoff_len(&self) -> usize {
        self.handoffs.len()
    }

    /// Feed an item to the first stage
    pub fn push(&mut self, item: PipelineItem, source: &str) -> Result<(), PipelineError> {
        let first = self.stages.first_mut().ok_or(PipelineError::NoStages)?;
        first.feed(item, source)
    }

    /// Deliver waiting handoffs in order; a rejected item stays at the front
    fn flush_handoffs(&mut self) -> Result<bool, PipelineError> {
        let mut delivered = false;
        while let Some(handoff) = self.handoffs.pop_front() {
            let stage = &mut self.stages[handoff.to];
            if let Err(e) = stage.feed(handoff.item.clone(), &handoff.source) {
                warn!(
                    "Stage {} rejected a {} item from {}, keeping it for the next run",
                    stage.name(),
                    handoff.item.kind(),
                    handoff.source
                );
                self.handoffs.push_front(handoff);
                return Err(e);
            }
            delivered = true;
        }
        Ok(delivered)
    }

    /// Drive every stage until none makes progress
    ///
    /// Returns every finished item in order, including items finished by an
    /// earlier run that stopped on an error. An error from any stage stops
    /// the run; finished items and items between stages are kept by the
    /// driver and unprocessed items stay in their stages, so a later call
    /// continues from there.
    pub fn run(&mut self) -> Result<Vec<PipelineItem>, PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::NoStages);
        }

        let last = self.stages.len() - 1;
        let mut rounds = 0usize;

        loop {
            let mut progress = self.flush_handoffs()?;
            for i in 0..=last {
                if self.stages[i].process()? != ProcessOutcome::Idle {
                    progress = true;
                }
                while let Some(item) = self.stages[i].extract() {
                    if i == last {
                        self.completed.push_back(item);
                    } else {
                        self.handoffs.push_back(Handoff {
                            to: i + 1,
                            item,
                            source: self.stages[i].name().to_string(),
                        });
                    }
                }
                if self.flush_handoffs()? {
                    progress = true;
                }
            }
            if !progress {
                break;
            }
            rounds += 1;
        }

        let outputs: Vec<PipelineItem> = self.completed.drain(..).collect();
        debug!(
            "Pipeline of {} stages produced {} items in {rounds} rounds",
            self.stages.len(),
            outputs.len()
        );
        Ok(outputs)
    }

    /// Clear every stage and drop held items
    pub fn clear(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
        self.handoffs.clear();
        self.completed.clear();
    }
}
