//! Property-based test generators using proptest.
//!
//! Provides strategies for write/rotate plans and a reference model of the
//! on-disk backlog those plans should produce.

use proptest::prelude::*;
use rotalog_core::{RotatingFileSink, SinkResult};
use std::collections::VecDeque;

/// Strategy for generating arbitrary write payloads.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for generating printable log lines (newline terminated).
pub fn log_line_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::string::string_regex("[ -~]{0,80}")
        .expect("Invalid regex")
        .prop_map(|line| format!("{line}\n").into_bytes())
}

/// Strategy for generating retention counts.
pub fn retention_strategy() -> impl Strategy<Value = usize> {
    0usize..6
}

/// One step of a sink plan.
#[derive(Debug, Clone)]
pub enum SinkOperation {
    /// Append bytes to the current file.
    Write {
        /// Payload to append.
        data: Vec<u8>,
    },
    /// Rotate the current file into the backlog.
    Rotate,
}

/// Strategy for generating sink operations (writes are more common).
pub fn sink_operation_strategy() -> impl Strategy<Value = SinkOperation> {
    prop_oneof![
        4 => payload_strategy().prop_map(|data| SinkOperation::Write { data }),
        1 => Just(SinkOperation::Rotate),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<SinkOperation>> {
    prop::collection::vec(sink_operation_strategy(), min_ops..max_ops)
}

/// In-memory model of what an opened sink should hold on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacklogModel {
    retention: usize,
    /// Expected content of the current file.
    pub current: Vec<u8>,
    /// Expected archive contents, newest (`.1`) first.
    pub archives: VecDeque<Vec<u8>>,
}

impl BacklogModel {
    /// Creates an empty model for a freshly opened sink.
    #[must_use]
    pub fn new(retention: usize) -> Self {
        Self {
            retention,
            ..Self::default()
        }
    }

    /// Applies one operation to the model.
    pub fn apply(&mut self, op: &SinkOperation) {
        match op {
            SinkOperation::Write { data } => self.current.extend_from_slice(data),
            SinkOperation::Rotate => {
                let previous = std::mem::take(&mut self.current);
                if self.retention > 0 {
                    self.archives.push_front(previous);
                    self.archives.truncate(self.retention);
                }
            }
        }
    }
}

/// Applies `ops` to both `sink` and a fresh model, returning the model.
///
/// # Errors
///
/// Returns the first sink error.
pub fn run_plan(sink: &RotatingFileSink, ops: &[SinkOperation]) -> SinkResult<BacklogModel> {
    let mut model = BacklogModel::new(sink.retention());
    for op in ops {
        match op {
            SinkOperation::Write { data } => {
                sink.write(data)?;
            }
            SinkOperation::Rotate => sink.rotate()?,
        }
        model.apply(op);
    }
    Ok(model)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TempSink;

    #[test]
    fn model_drops_history_without_retention() {
        let mut model = BacklogModel::new(0);
        model.apply(&SinkOperation::Write { data: b"a".to_vec() });
        model.apply(&SinkOperation::Rotate);
        assert!(model.current.is_empty());
        assert!(model.archives.is_empty());
    }

    #[test]
    fn model_bounds_archives() {
        let mut model = BacklogModel::new(2);
        for byte in [b'a', b'b', b'c'] {
            model.apply(&SinkOperation::Write { data: vec![byte] });
            model.apply(&SinkOperation::Rotate);
        }
        assert_eq!(model.archives, VecDeque::from(vec![b"c".to_vec(), b"b".to_vec()]));
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn log_lines_end_with_newline(line in log_line_strategy()) {
            prop_assert_eq!(line.last(), Some(&b'\n'));
            prop_assert_eq!(line.iter().filter(|b| **b == b'\n').count(), 1);
        }

        #[test]
        fn sink_matches_model(
            retention in retention_strategy(),
            ops in operation_sequence_strategy(0, 40),
        ) {
            let fixture = TempSink::new(retention);
            let model = run_plan(&fixture, &ops).unwrap();
            fixture.close().unwrap();

            prop_assert_eq!(fixture.read_current(), model.current.clone());
            prop_assert_eq!(fixture.read_archives(), Vec::from(model.archives.clone()));
            prop_assert!(fixture.archives().len() <= retention);
        }
    }
}
