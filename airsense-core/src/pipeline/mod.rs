//! Message processing pipeline with composable stages
//!
//! ## Overview
//!
//! Every decoded sample travels through a fixed sequence of processing
//! stages: calibrate, persist, log, broadcast, and so on. This module owns
//! the stage contract and the pipeline that drives it; the calibration
//! stage lives in [`stages`], while persistence, broadcast and forwarding
//! stages are provided by the composing application against the same trait.
//!
//! ```text
//! Listener → publish → [calibrate] → [persist] → [log] → [broadcast]
//! ```
//!
//! The pipeline is an explicit ordered list of stages, built once at
//! startup through [`PipelineBuilder`] and never mutated afterwards.
//! Stages do not know about each other; ordering is entirely the
//! composition's concern.
//!
//! ## Failure policy
//!
//! A stage failure is a property of that stage, not of the message: the
//! error is logged with the stage name and the message continues to the
//! remaining stages. A calibration problem must never cost a sample its
//! trip to storage. `publish` still reports the first failure to the
//! caller once the message has been through the whole chain.
//!
//! ## Concurrency
//!
//! Listeners publish from independent threads, so stages process messages
//! through `&self` and carry their own interior synchronization where they
//! have state (see [`CalibrateStage`]). The pipeline adds none of its own.

use thiserror_no_std::Error;

use crate::{
    errors::{CacheError, TransformError},
    message::Message,
};

pub mod stages;

pub use stages::{CalibrateStage, LogStage};

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error raised by a single stage while processing one message.
#[derive(Error, Debug)]
pub enum StageError {
    /// Calibration cache access failed.
    #[error("calibration cache: {0}")]
    Cache(#[from] CacheError),

    /// Sensor value derivation failed.
    #[error("transform: {0}")]
    Transform(#[from] TransformError),

    /// Failure in an externally implemented stage.
    #[error("{0}")]
    Other(String),
}

/// Pipeline-level processing error.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage reported a failure while the message was in flight. The
    /// message still visited every stage.
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: &'static str,
        /// The underlying stage error.
        source: StageError,
    },
}

/// One processing stage.
///
/// A stage performs its effect on the message — deriving values, storing,
/// logging, forwarding — and reports how it went. It must be safe to call
/// from multiple producer threads at once.
pub trait Stage: Send + Sync {
    /// Process one message, possibly mutating it in place.
    fn process(&self, message: &mut Message) -> Result<(), StageError>;

    /// Stage name for logs and error reports.
    fn name(&self) -> &'static str;
}

/// The composed processing pipeline.
///
/// Cheap to share behind an `Arc`; `publish` takes `&self`.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Start building a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Run one message through every stage, in composition order.
    ///
    /// A failing stage is logged and skipped over — the message always
    /// reaches the remaining stages and is never dropped here. If any
    /// stage failed, the first failure is returned after the full pass.
    pub fn publish(&self, message: &mut Message) -> PipelineResult<()> {
        let mut first_failure = None;

        for stage in &self.stages {
            if let Err(source) = stage.process(message) {
                log::warn!("stage '{}' failed: {source}", stage.name());
                if first_failure.is_none() {
                    first_failure = Some(PipelineError::Stage {
                        stage: stage.name(),
                        source,
                    });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Number of stages in the pipeline.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Builder assembling the stage list in publish order.
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage. Stages run in the order they are added.
    pub fn add_stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Finish composition.
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records the stage names a message has passed through, in its own
    /// payload-visible way: each recorder appends its tag to the device id.
    struct Recorder {
        tag: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Stage for Recorder {
        fn process(&self, message: &mut Message) -> Result<(), StageError> {
            self.seen.lock().unwrap().push(self.tag);
            message.device_id.push_str(self.tag);
            Ok(())
        }

        fn name(&self) -> &'static str {
            self.tag
        }
    }

    struct Failing;

    impl Stage for Failing {
        fn process(&self, _message: &mut Message) -> Result<(), StageError> {
            Err(StageError::Other("boom".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn stages_run_once_each_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = |tag| Recorder {
            tag,
            seen: seen.clone(),
        };

        let pipeline = Pipeline::builder()
            .add_stage(recorder("a"))
            .add_stage(recorder("b"))
            .add_stage(recorder("c"))
            .build();
        assert_eq!(pipeline.len(), 3);

        let mut msg = Message::default();
        pipeline.publish(&mut msg).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(msg.device_id, "abc");
    }

    #[test]
    fn shorter_chain_terminates_cleanly() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = |tag| Recorder {
            tag,
            seen: seen.clone(),
        };

        // Same composition minus the tail stage
        let pipeline = Pipeline::builder()
            .add_stage(recorder("a"))
            .add_stage(recorder("b"))
            .build();

        let mut msg = Message::default();
        pipeline.publish(&mut msg).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn failing_stage_does_not_stop_propagation() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let pipeline = Pipeline::builder()
            .add_stage(Recorder {
                tag: "before",
                seen: seen.clone(),
            })
            .add_stage(Failing)
            .add_stage(Recorder {
                tag: "after",
                seen: seen.clone(),
            })
            .build();

        let mut msg = Message::default();
        let err = pipeline.publish(&mut msg).unwrap_err();

        // Downstream stages still saw the message...
        assert_eq!(*seen.lock().unwrap(), vec!["before", "after"]);
        // ...and the failure was reported to the caller.
        assert!(matches!(
            err,
            PipelineError::Stage {
                stage: "failing",
                ..
            }
        ));
    }

    #[test]
    fn empty_pipeline_is_a_no_op() {
        let pipeline = Pipeline::builder().build();
        assert!(pipeline.is_empty());

        let mut msg = Message::default();
        pipeline.publish(&mut msg).unwrap();
    }
}
