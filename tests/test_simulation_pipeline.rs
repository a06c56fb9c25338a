//! Integration tests for the live simulation: handle → task → machine → scorer
//!
//! A scripted scorer stands in for the HTTP API. Its probability is tenure/100
//! so each response can be traced back to the input that produced it, and its
//! latency is chosen per call to force out-of-order completions.
//!
//! All tests run on paused tokio time, so quiet periods and latencies are
//! exact and the suite runs instantly.

#[cfg(test)]
mod simulation_pipeline_tests {
    use async_trait::async_trait;
    use churnscope::profile;
    use churnscope::record::{EditValue, ObservationRecord};
    use churnscope::simulation::{
        Outcome, Phase, PredictedClass, ScoredProfile, Scorer, ScoringError, SimulationHandle, SimulationMachine,
        SimulationSettings,
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::sync::{Arc, Mutex};
    use tokio::time::{sleep, Duration};

    type DelayFn = Box<dyn Fn(usize, f64) -> Duration + Send + Sync>;

    struct ScriptedScorer {
        /// Tenure of every record scored, in call order
        calls: Mutex<Vec<f64>>,
        delay: DelayFn,
        fail_tenure: Option<f64>,
    }

    impl ScriptedScorer {
        fn new(delay: DelayFn) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                delay,
                fail_tenure: None,
            })
        }

        fn failing_at(tenure: f64) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                delay: Box::new(|_, _| Duration::from_millis(5)),
                fail_tenure: Some(tenure),
            })
        }

        fn calls(&self) -> Vec<f64> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Scorer for ScriptedScorer {
        async fn score(&self, record: &ObservationRecord) -> Result<ScoredProfile, ScoringError> {
            let tenure = record.get_f64("tenure").unwrap_or(0.0);
            let delay = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(tenure);
                (self.delay)(calls.len(), tenure)
            };
            sleep(delay).await;

            if self.fail_tenure == Some(tenure) {
                return Err(ScoringError::Status(503));
            }
            let probability = tenure / 100.0;
            Ok(ScoredProfile {
                outcome: Outcome {
                    predicted_class: PredictedClass::from_code((probability > 0.5) as i64),
                    probability,
                },
                factors: Vec::new(),
            })
        }
    }

    fn spawn(scorer: Arc<ScriptedScorer>) -> (SimulationHandle, tokio::task::JoinHandle<SimulationMachine>) {
        let settings = SimulationSettings {
            quiet_period: Duration::from_millis(50),
            ..Default::default()
        };
        let (machine, inbox) = SimulationMachine::new(profile::default_profile(), scorer, settings);
        SimulationHandle::spawn(machine, inbox, 64)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_scores_default_profile() {
        let scorer = ScriptedScorer::new(Box::new(|_, _| Duration::from_millis(20)));
        let (handle, _join) = spawn(scorer.clone());

        sleep(Duration::from_millis(5)).await;
        assert_eq!(handle.snapshot().await.phase, Phase::PendingFirstLoad);

        sleep(Duration::from_millis(50)).await;
        let state = handle.snapshot().await;
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.accepted_generation, 1);
        assert_eq!(state.pending_generation, None);
        assert_eq!(scorer.calls(), vec![1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_burst_coalesces_into_one_request() {
        let scorer = ScriptedScorer::new(Box::new(|_, _| Duration::from_millis(5)));
        let (handle, _join) = spawn(scorer.clone());
        sleep(Duration::from_millis(20)).await;

        // edits at t=0/10/20/30ms with a 50ms quiet period
        for tenure in [10.0, 20.0, 30.0, 40.0] {
            handle.edit("tenure", EditValue::Number(tenure)).await;
            sleep(Duration::from_millis(10)).await;
        }

        // input reflects every edit right away
        assert_eq!(handle.snapshot().await.input.get_f64("tenure"), Some(40.0));

        sleep(Duration::from_millis(200)).await;

        // the initial load plus exactly one request carrying the last value
        assert_eq!(scorer.calls(), vec![1.0, 40.0]);
        let state = handle.snapshot().await;
        assert_eq!(state.accepted_generation, 2);
        assert_eq!(state.accepted_result.unwrap().outcome.probability, 0.4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shuffled_completions_never_regress() {
        let rng = Mutex::new(StdRng::seed_from_u64(7));
        let scorer = ScriptedScorer::new(Box::new(move |_, _| {
            Duration::from_millis(rng.lock().unwrap().gen_range(0..400))
        }));
        let (handle, _join) = spawn(scorer.clone());

        let mut last_seen = 0;
        let mut observe = |state: &churnscope::simulation::SimulationState| {
            assert!(
                state.accepted_generation >= last_seen,
                "accepted generation went from {} to {}",
                last_seen,
                state.accepted_generation
            );
            if let Some(result) = &state.accepted_result {
                assert_eq!(result.generation, state.accepted_generation);
            }
            last_seen = state.accepted_generation;
        };

        // one request per edit: edits are further apart than the quiet period
        for tenure in 2..=11 {
            handle.edit("tenure", EditValue::Number(tenure as f64)).await;
            for _ in 0..6 {
                sleep(Duration::from_millis(10)).await;
                observe(&handle.snapshot().await);
            }
        }

        for _ in 0..100 {
            sleep(Duration::from_millis(10)).await;
            observe(&handle.snapshot().await);
        }

        assert_eq!(scorer.calls().len(), 11);
        let state = handle.snapshot().await;
        assert_eq!(state.accepted_generation, 11);
        assert_eq!(state.accepted_result.unwrap().outcome.probability, 11.0 / 100.0);
        assert_eq!(state.pending_generation, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_incomplete_input_is_withheld() {
        let scorer = ScriptedScorer::new(Box::new(|_, _| Duration::from_millis(5)));
        let (handle, _join) = spawn(scorer.clone());
        sleep(Duration::from_millis(20)).await;

        handle.edit("Contract", EditValue::Clear).await;
        handle.edit("tenure", EditValue::Number(30.0)).await;
        sleep(Duration::from_millis(200)).await;

        let state = handle.snapshot().await;
        assert_eq!(scorer.calls(), vec![1.0]);
        assert_eq!(state.phase, Phase::Ready);
        assert!(state.last_error.is_none());
        assert_eq!(state.accepted_generation, 1);

        handle.edit("Contract", EditValue::from("One year")).await;
        sleep(Duration::from_millis(200)).await;

        assert_eq!(scorer.calls(), vec![1.0, 30.0]);
        assert_eq!(handle.snapshot().await.accepted_generation, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_result_until_next_success() {
        let scorer = ScriptedScorer::failing_at(13.0);
        let (handle, _join) = spawn(scorer.clone());
        sleep(Duration::from_millis(20)).await;

        handle.edit("tenure", EditValue::Number(13.0)).await;
        sleep(Duration::from_millis(100)).await;

        let state = handle.snapshot().await;
        assert_eq!(state.phase, Phase::ErrorDisplayed);
        assert_eq!(state.accepted_generation, 1);
        assert_eq!(state.accepted_result.as_ref().unwrap().outcome.probability, 0.01);
        let failure = state.last_error.unwrap();
        assert_eq!(failure.generation, 2);
        assert_eq!(failure.error, ScoringError::Status(503));

        handle.edit("tenure", EditValue::Number(14.0)).await;
        sleep(Duration::from_millis(100)).await;

        let state = handle.snapshot().await;
        assert_eq!(state.phase, Phase::Ready);
        assert!(state.last_error.is_none());
        assert_eq!(state.accepted_generation, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_ignores_responses_from_before() {
        // first call is slow, everything after is fast
        let scorer = ScriptedScorer::new(Box::new(|call, _| {
            if call == 1 {
                Duration::from_millis(300)
            } else {
                Duration::from_millis(10)
            }
        }));
        let (handle, _join) = spawn(scorer.clone());

        handle.edit("tenure", EditValue::Number(50.0)).await;
        handle.reset().await;

        let mut saw_first = false;
        for _ in 0..50 {
            sleep(Duration::from_millis(10)).await;
            let state = handle.snapshot().await;
            saw_first |= state.accepted_generation == 1;
        }

        let state = handle.snapshot().await;
        assert!(!saw_first, "response issued before reset was applied");
        assert_eq!(state.accepted_generation, 2);
        assert_eq!(state.input, profile::default_profile());
        // the pre-reset edit never reached the scorer
        assert_eq!(scorer.calls(), vec![1.0, 1.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_tears_down_machine() {
        let scorer = ScriptedScorer::new(Box::new(|_, _| Duration::from_millis(5)));
        let (handle, join) = spawn(scorer.clone());
        sleep(Duration::from_millis(20)).await;

        handle.edit("tenure", EditValue::Number(9.0)).await;
        handle.shutdown().await;

        let machine = join.await.unwrap();
        assert!(machine.is_torn_down());

        sleep(Duration::from_millis(200)).await;
        // the pending debounce was cancelled
        assert_eq!(scorer.calls(), vec![1.0]);
    }
}
