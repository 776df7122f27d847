//! End-to-end monitoring scenarios through the public API.

use u_mspc::engine::{ConfigUpdate, EngineRegistry, MonitorConfig, SpcEngine};
use u_mspc::linalg::Matrix;
use u_mspc::mspc::{Baseline, ChartState, ChartType, Status};
use u_mspc::simulation::ProcessSimulator;
use u_mspc::MspcError;

/// n=8 sample with mean [100, 50] and covariance diag(25, 9) exactly.
fn orthogonal_sample() -> Vec<Vec<f64>> {
    let a = (25.0_f64 * 7.0 / 8.0).sqrt();
    let b = (9.0_f64 * 7.0 / 8.0).sqrt();
    let s1 = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
    let s2 = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0];
    s1.iter()
        .zip(&s2)
        .map(|(x, y)| vec![100.0 + a * x, 50.0 + b * y])
        .collect()
}

fn univariate_engine(chart_type: ChartType) -> SpcEngine {
    let config = MonitorConfig {
        chart_type,
        ..MonitorConfig::default()
    };
    let mut engine = SpcEngine::with_config(config).expect("valid config");
    let baseline =
        Baseline::from_parameters(vec![0.0], Matrix::identity(1), 30).expect("valid baseline");
    engine.initialize_with_baseline(baseline).expect("installable");
    engine
}

#[test]
fn baseline_converges_to_generating_parameters() {
    let mut sim = ProcessSimulator::demo(2024);
    let mut engine = SpcEngine::new();
    engine
        .initialize_phase_i(&sim.phase_i(10_000))
        .expect("non-singular");
    let baseline = engine.baseline().expect("initialized");
    for (i, &mean) in sim.means().iter().enumerate() {
        let est = baseline.means()[i];
        assert!((est - mean).abs() / mean < 0.05, "var {i}: {est} vs {mean}");
    }
}

#[test]
fn t_squared_at_the_mean_is_zero() {
    let mut engine = SpcEngine::new();
    engine
        .initialize_phase_i(&orthogonal_sample())
        .expect("non-singular");
    let result = engine.process_observation(&[100.0, 50.0]).expect("valid");
    assert!(result.statistic.abs() < 1e-9, "T² = {}", result.statistic);
    assert_eq!(result.status, Status::Normal);
}

#[test]
fn univariate_t_squared_is_squared_z_score() {
    let mut engine = SpcEngine::new();
    let baseline = Baseline::from_parameters(vec![100.0], Matrix::diagonal(&[25.0]), 30)
        .expect("valid baseline");
    engine.initialize_with_baseline(baseline).expect("installable");
    let result = engine.process_observation(&[110.0]).expect("valid");
    assert!((result.statistic - 4.0).abs() < 1e-12);
}

#[test]
fn mewma_recursion_carries_smoothed_vector() {
    let mut engine = univariate_engine(ChartType::Mewma);

    let first = engine.process_observation(&[10.0]).expect("valid");
    match engine.chart_state() {
        Some(ChartState::Mewma {
            previous: Some(z),
        }) => assert!((z[0] - 2.0).abs() < 1e-12),
        other => panic!("unexpected state {other:?}"),
    }
    // Z = 2, scaled variance lambda/(2-lambda) = 1/9.
    assert!((first.statistic - 36.0).abs() < 1e-9);

    engine.process_observation(&[0.0]).expect("valid");
    match engine.chart_state() {
        Some(ChartState::Mewma {
            previous: Some(z),
        }) => assert!((z[0] - 1.6).abs() < 1e-12),
        other => panic!("unexpected state {other:?}"),
    }
}

#[test]
fn mcusum_stays_at_zero_for_on_target_observations() {
    let mut engine = univariate_engine(ChartType::Mcusum);
    for _ in 0..5 {
        let result = engine.process_observation(&[0.0]).expect("valid");
        assert_eq!(result.statistic, 0.0);
    }
    assert_eq!(
        engine.chart_state(),
        Some(&ChartState::Mcusum { cusum: vec![0.0] })
    );
}

#[test]
fn contributions_account_for_the_whole_deviation() {
    let mut sim = ProcessSimulator::demo(5);
    let mut engine = SpcEngine::new();
    engine.initialize_phase_i(&sim.phase_i(200)).expect("non-singular");

    for _ in 0..20 {
        let obs = sim.sample_shifted(2, 8.0).expect("in range");
        let result = engine.process_observation(&obs).expect("valid");
        let total: f64 = result.contributions.iter().map(|c| c.percentage).sum();
        assert!((total - 100.0).abs() < 1e-6, "total = {total}");
        assert!(result
            .contributions
            .windows(2)
            .all(|w| w[0].contribution >= w[1].contribution));
    }
}

#[test]
fn statistic_grows_with_distance_from_the_mean() {
    let mut engine = SpcEngine::new();
    engine
        .initialize_phase_i(&orthogonal_sample())
        .expect("non-singular");

    let mut previous = -1.0;
    for step in 0..10 {
        let t = step as f64;
        let result = engine
            .process_observation(&[100.0 + 2.0 * t, 50.0 - t])
            .expect("valid");
        assert!(result.statistic > previous || step == 0);
        previous = result.statistic;
    }
}

#[test]
fn reset_requires_a_new_phase_i_and_starts_cold() {
    let mut engine = SpcEngine::new();
    engine
        .update_configuration(ConfigUpdate {
            chart_type: Some(ChartType::Mcusum),
            ..ConfigUpdate::default()
        })
        .expect("valid update");
    engine
        .initialize_phase_i(&orthogonal_sample())
        .expect("non-singular");
    engine.process_observation(&[120.0, 60.0]).expect("valid");
    assert_eq!(engine.processed_count(), 1);

    engine.reset();
    assert!(!engine.is_initialized());
    assert_eq!(
        engine.process_observation(&[100.0, 50.0]),
        Err(MspcError::NotInitialized)
    );
    assert_eq!(engine.configuration().chart_type, ChartType::Mcusum);

    engine
        .initialize_phase_i(&orthogonal_sample())
        .expect("non-singular");
    assert_eq!(
        engine.chart_state(),
        Some(&ChartState::Mcusum {
            cusum: vec![0.0, 0.0]
        })
    );
    let result = engine.process_observation(&[100.0, 50.0]).expect("valid");
    assert_eq!(result.index, 0);
    assert_eq!(result.statistic, 0.0);
}

#[test]
fn mewma_history_does_not_survive_reset() {
    let mut engine = univariate_engine(ChartType::Mewma);
    for _ in 0..5 {
        engine.process_observation(&[3.0]).expect("valid");
    }

    engine.reset();
    let baseline =
        Baseline::from_parameters(vec![0.0], Matrix::identity(1), 30).expect("valid baseline");
    engine.initialize_with_baseline(baseline).expect("installable");
    assert_eq!(
        engine.chart_state(),
        Some(&ChartState::Mewma { previous: None })
    );

    // Cold start: Z = lambda · x = 2, statistic = 4 / (0.2 / 1.8).
    let result = engine.process_observation(&[10.0]).expect("valid");
    assert!((result.statistic - 36.0).abs() < 1e-9, "got {}", result.statistic);
}

#[test]
fn constant_variable_is_rejected_as_singular() {
    let samples: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, 7.0]).collect();
    let mut engine = SpcEngine::new();
    assert!(matches!(
        engine.initialize_phase_i(&samples),
        Err(MspcError::SingularMatrix { .. })
    ));
    assert!(!engine.is_initialized());
}

#[test]
fn two_sigma_shift_on_one_variable_stays_normal() {
    let mut engine = SpcEngine::new();
    engine
        .initialize_phase_i(&orthogonal_sample())
        .expect("non-singular");

    let result = engine.process_observation(&[110.0, 50.0]).expect("valid");
    assert!((result.statistic - 4.0).abs() < 1e-9);
    assert_eq!(result.status, Status::Normal);
    assert!(result.alert().is_none());
    assert_eq!(result.top_contributor(), Some("Variable 1"));
    assert!((result.contributions[0].percentage - 100.0).abs() < 1e-9);
}

#[test]
fn large_shift_raises_a_critical_alert() {
    let mut engine = SpcEngine::new();
    engine
        .initialize_phase_i(&orthogonal_sample())
        .expect("non-singular");

    let result = engine.process_observation(&[130.0, 50.0]).expect("valid");
    assert_eq!(result.status, Status::Critical);
    assert!(result.escalated);
    let alert = result.alert().expect("critical results alert");
    assert_eq!(alert.severity, Status::Critical);
    assert!(alert
        .message
        .starts_with("Process critical: hotellingT2 statistic = 36.0000"));
}

#[test]
fn failed_observation_leaves_state_untouched() {
    let mut engine = univariate_engine(ChartType::Mewma);
    engine.process_observation(&[10.0]).expect("valid");
    let before = engine.chart_state().cloned();

    assert!(matches!(
        engine.process_observation(&[f64::NAN]),
        Err(MspcError::InvalidInput(_))
    ));
    assert!(matches!(
        engine.process_observation(&[1.0, 2.0]),
        Err(MspcError::InvalidInput(_))
    ));
    assert_eq!(engine.chart_state().cloned(), before);
    assert_eq!(engine.processed_count(), 1);
}

#[test]
fn mcusum_overflow_keeps_the_accumulated_sum() {
    let mut engine = univariate_engine(ChartType::Mcusum);
    engine.process_observation(&[2.0]).expect("valid");
    engine.process_observation(&[2.0]).expect("valid");
    let before = engine.chart_state().cloned();
    assert_eq!(before, Some(ChartState::Mcusum { cusum: vec![6.0] }));

    assert!(matches!(
        engine.process_observation(&[1e300]),
        Err(MspcError::Computation(_))
    ));
    assert_eq!(engine.chart_state().cloned(), before);
    assert_eq!(engine.processed_count(), 2);

    // Accumulation resumes from the last good sum: 6 + 1.5 · 2.
    let result = engine.process_observation(&[2.0]).expect("valid");
    assert!((result.statistic - 9.0).abs() < 1e-12, "got {}", result.statistic);
}

#[test]
fn mixed_unit_variables_initialize() {
    // Pressure in Pa next to film thickness in m.
    let mut sim =
        ProcessSimulator::independent(vec![101_325.0, 0.005], &[500.0, 0.001], 9).expect("valid");
    let mut engine = SpcEngine::new();
    engine
        .initialize_phase_i(&sim.phase_i(500))
        .expect("independent variables on different scales");

    let baseline = engine.baseline().expect("initialized");
    let sd = baseline.std_devs();
    assert!((sd[0] - 500.0).abs() / 500.0 < 0.1, "pressure sd {}", sd[0]);
    assert!((sd[1] - 0.001).abs() / 0.001 < 0.1, "thickness sd {}", sd[1]);

    let result = engine.process_observation(&sim.sample()).expect("valid");
    assert!(result.statistic.is_finite());
}

#[test]
fn registry_keeps_streams_independent() {
    let mut registry = EngineRegistry::new();
    registry
        .register("line-a", MonitorConfig::default())
        .expect("new stream");
    registry
        .register(
            "line-b",
            MonitorConfig {
                chart_type: ChartType::Mcusum,
                ..MonitorConfig::default()
            },
        )
        .expect("new stream");

    registry
        .initialize_phase_i("line-a", &orthogonal_sample())
        .expect("non-singular");
    registry
        .process("line-a", &[110.0, 50.0])
        .expect("initialized");

    assert_eq!(
        registry.process("line-b", &[110.0, 50.0]),
        Err(MspcError::NotInitialized)
    );
    assert!(matches!(
        registry.process("line-c", &[1.0]),
        Err(MspcError::UnknownStream(_))
    ));
    assert_eq!(registry.stream_ids(), vec!["line-a", "line-b"]);
}

#[test]
fn result_serializes_with_camel_case_fields() {
    let mut engine = SpcEngine::new();
    engine
        .initialize_phase_i(&orthogonal_sample())
        .expect("non-singular");
    let result = engine.process_observation(&[110.0, 50.0]).expect("valid");
    let json = serde_json::to_value(&result).expect("serializable");
    assert_eq!(json["chartType"], "hotellingT2");
    assert_eq!(json["status"], "normal");
    assert!(json["contributions"].is_array());
}
