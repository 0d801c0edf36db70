//! Pipeline execution.

use crate::error::Result;
use crate::pipeline::steps::{Auxiliary, CompiledStep, StepContext};

/// Run input through a compiled pipeline.
///
/// A strict left fold: each step consumes the previous step's output, and
/// auxiliaries accumulate in emission order. No step is skipped or
/// reordered; branching happens later, at effect resolution. A zero-step
/// pipeline returns the input unchanged with no auxiliaries.
pub fn run(
    steps: &[CompiledStep],
    input: &str,
    ctx: &StepContext<'_>,
) -> Result<(String, Vec<Auxiliary>)> {
    let mut current = input.to_string();
    let mut auxiliaries = Vec::new();

    for step in steps {
        let (output, mut extra) = step.apply(&current, ctx)?;
        current = output;
        auxiliaries.append(&mut extra);
    }

    Ok((current, auxiliaries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTracker;
    use crate::pipeline::compile::compile;
    use crate::pipeline::steps::WaitMessagePicker;
    use crate::process::fake::RecordingRunner;
    use proptest::prelude::*;
    use serde_json::json;

    struct Fixture {
        tracker: EventTracker,
        picker: WaitMessagePicker,
        process: RecordingRunner,
    }

    impl Fixture {
        fn new() -> Self {
            Self::seeded(0)
        }

        fn seeded(seed: u64) -> Self {
            Self {
                tracker: EventTracker::new(),
                picker: WaitMessagePicker::seeded(seed),
                process: RecordingRunner::default(),
            }
        }

        fn ctx(&self) -> StepContext<'_> {
            StepContext {
                process: &self.process,
                tracker: &self.tracker,
                picker: &self.picker,
            }
        }
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let fixture = Fixture::new();
        let (output, auxiliaries) = run(&[], "echo hello", &fixture.ctx()).unwrap();
        assert_eq!(output, "echo hello");
        assert!(auxiliaries.is_empty());
    }

    #[test]
    fn test_steps_thread_output_forward() {
        let fixture = Fixture::new();
        let steps = compile(
            &[json!("input"), json!({"type": "regex", "value": "^yes$"})],
            "l",
            "t",
        )
        .unwrap();

        let (output, auxiliaries) = run(&steps, "yes", &fixture.ctx()).unwrap();
        assert_eq!(output, "success");
        assert!(auxiliaries.is_empty());
    }

    #[test]
    fn test_auxiliaries_accumulate_in_order() {
        let fixture = Fixture::new();
        let steps = compile(
            &[json!("wrapped_output"), json!("wait_message")],
            "l",
            "t",
        )
        .unwrap();

        let (output, auxiliaries) = run(&steps, "hi", &fixture.ctx()).unwrap();
        assert_eq!(output, "hi");
        assert_eq!(auxiliaries.len(), 2);

        let first = auxiliaries[0].clone().into_response();
        let second = auxiliaries[1].clone().into_response();
        assert_eq!(first["type"], "wrapped");
        assert_eq!(second["type"], "scroll_wait");
    }

    #[test]
    fn test_step_error_aborts_run() {
        let fixture = Fixture::new();
        // The event-check step fails when nothing is armed.
        let steps = compile(
            &[json!("check_external_events"), json!("wrapped_output")],
            "l",
            "t",
        )
        .unwrap();

        let err = run(&steps, "", &fixture.ctx()).unwrap_err();
        assert_eq!(err.kind(), "no-output-satisfied");
    }

    #[test]
    fn test_run_is_deterministic_under_fixed_seed() {
        let collect = |seed| {
            let fixture = Fixture::seeded(seed);
            let steps = compile(
                &[json!("wait_message"), json!("wait_message")],
                "l",
                "t",
            )
            .unwrap();
            let (_, auxiliaries) = run(&steps, "x", &fixture.ctx()).unwrap();
            auxiliaries
                .into_iter()
                .map(|a| a.into_response())
                .collect::<Vec<_>>()
        };

        assert_eq!(collect(99), collect(99));
    }

    proptest! {
        #[test]
        fn prop_identity_chain_returns_input(input in ".*", len in 0usize..8) {
            let fixture = Fixture::new();
            let specs: Vec<serde_json::Value> = (0..len).map(|_| json!("input")).collect();
            let steps = compile(&specs, "l", "t").unwrap();

            let (output, auxiliaries) = run(&steps, &input, &fixture.ctx()).unwrap();
            prop_assert_eq!(output, input);
            prop_assert!(auxiliaries.is_empty());
        }

        #[test]
        fn prop_wrapped_output_chain_emits_one_fragment_per_step(len in 1usize..8) {
            let fixture = Fixture::new();
            let specs: Vec<serde_json::Value> =
                (0..len).map(|_| json!("wrapped_output")).collect();
            let steps = compile(&specs, "l", "t").unwrap();

            let (output, auxiliaries) = run(&steps, "echo", &fixture.ctx()).unwrap();
            prop_assert_eq!(output, "echo");
            prop_assert_eq!(auxiliaries.len(), len);
        }
    }
}
