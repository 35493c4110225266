//! Integration tests for polyflow-steps.

use std::path::PathBuf;

use polyflow_io::text::{format_scalar, matrix_to_string, parse_matrix};
use polyflow_io::{FlowFile, Workspace};
use polyflow_math::{Matrix, SvdMode};
use polyflow_steps::compare::{self, compare};
use polyflow_steps::config::FlowConfig;
use polyflow_steps::decompose::{self, decompose};
use polyflow_steps::descent::{self, decide, Descent};
use polyflow_steps::generate::{self, generate};
use polyflow_steps::recompose::{self, recompose};
use polyflow_telemetry::sinks::VecSink;
use polyflow_telemetry::{EventBus, EventKind};
use polyflow_types::FlowError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

struct TempWorkspace {
    dir: PathBuf,
    ws: Workspace,
}

impl TempWorkspace {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("polyflow-steps-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let ws = Workspace::new(&dir);
        Self { dir, ws }
    }

    fn write(&self, file: FlowFile, content: &str) {
        std::fs::write(self.ws.path(file), content).unwrap();
    }

    fn read(&self, file: FlowFile) -> String {
        std::fs::read_to_string(self.ws.path(file)).unwrap()
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn bus_with_sink() -> (EventBus, VecSink) {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    (bus, sink)
}

const SAMPLE: &str = "4 1 -2\n0.5 3 1\n-1 2 5\n";

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn default_config() {
    let config = FlowConfig::default();
    assert_eq!(config.compare_tolerance, 1e-5);
    assert_eq!(config.grad_threshold, 1e-3);
    assert_eq!(config.learning_rate, 0.1);
    assert_eq!(config.svd_mode, SvdMode::Full);
    assert!(config.validate().is_ok());
}

#[test]
fn config_toml_round_trip() {
    let mut config = FlowConfig::default();
    config.learning_rate = 0.05;
    config.svd_mode = SvdMode::Thin;
    let text = config.to_toml_string().unwrap();
    let recovered = FlowConfig::from_toml_str(&text).unwrap();
    assert_eq!(recovered, config);
}

#[test]
fn partial_toml_keeps_defaults() {
    let config = FlowConfig::from_toml_str(
        "svd_mode = \"thin\"\n[files]\nsolution = \"answer\"\n",
    )
    .unwrap();
    assert_eq!(config.svd_mode, SvdMode::Thin);
    assert_eq!(config.files.solution, "answer");
    assert_eq!(config.files.grad, "grad");
    assert_eq!(config.grad_threshold, 1e-3);
}

#[test]
fn invalid_config_rejected() {
    assert!(matches!(
        FlowConfig::from_toml_str("learning_rate = -0.1"),
        Err(FlowError::InvalidConfig(_))
    ));
    assert!(matches!(
        FlowConfig::from_toml_str("compare_tolerance = 0.0"),
        Err(FlowError::InvalidConfig(_))
    ));
    assert!(matches!(
        FlowConfig::from_toml_str("svd_mode = \"sideways\""),
        Err(FlowError::Serialization(_))
    ));
}

#[test]
fn config_workspace_uses_file_names() {
    let config = FlowConfig::from_toml_str("[files]\nfactor_u = \"left\"").unwrap();
    let ws = config.workspace("run");
    assert_eq!(ws.path(FlowFile::FactorU), PathBuf::from("run/left"));
}

// ─── Decompose / Recompose Tests ──────────────────────────────

#[test]
fn identity_round_trip_is_exact_to_tolerance() {
    let a = Matrix::identity(2);
    let f = decompose(&a, SvdMode::Full).unwrap();
    assert_eq!(f.s.shape(), (2, 2));
    let back = recompose(&f.u, &f.s, &f.vt).unwrap();
    assert!(compare(&back, &a, 1e-12).is_ok());
}

#[test]
fn decompose_writes_three_factor_files() {
    let tmp = TempWorkspace::new();
    let (mut bus, sink) = bus_with_sink();

    let factors = decompose::run(SAMPLE.as_bytes(), &tmp.ws, SvdMode::Full, &bus).unwrap();
    for file in [FlowFile::FactorU, FlowFile::FactorS, FlowFile::FactorVt] {
        assert!(tmp.ws.exists(file));
    }
    assert_eq!(tmp.ws.read_matrix(FlowFile::FactorS).unwrap(), factors.s);

    // S is square diagonal.
    let s = &factors.s;
    for i in 0..3 {
        for j in 0..3 {
            if i != j {
                assert_eq!(s.get(i, j), 0.0);
            }
        }
    }

    bus.flush();
    let events = sink.events();
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, EventKind::Decomposed { rank_bound: 3, .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::MatrixWritten { .. }))
            .count(),
        3
    );
}

#[test]
fn file_round_trip_passes_comparator() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();

    decompose::run(SAMPLE.as_bytes(), &tmp.ws, SvdMode::Full, &bus).unwrap();
    let mut stdout = Vec::new();
    recompose::run(&tmp.ws, &mut stdout, &bus).unwrap();

    // Wire the recomposed output and the original into the comparator.
    tmp.write(FlowFile::MatrixIn, &String::from_utf8(stdout).unwrap());
    tmp.write(FlowFile::MatrixOut, SAMPLE);
    let norm = compare::run(&tmp.ws, 1e-5, &bus).unwrap();
    assert!(norm < 1e-10);
}

#[test]
fn random_round_trip_within_tolerance() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in [1, 4, 9] {
        let a = generate(n, &mut rng).unwrap();
        let f = decompose(&a, SvdMode::Full).unwrap();
        let back = recompose(&f.u, &f.s, &f.vt).unwrap();
        assert!(compare(&back, &a, 1e-5).is_ok(), "n = {n}");
    }
}

#[test]
fn thin_mode_round_trips_rectangular() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();
    let wide = "1 2 0 -1\n3 -1 4 2\n";

    decompose::run(wide.as_bytes(), &tmp.ws, SvdMode::Thin, &bus).unwrap();
    let mut stdout = Vec::new();
    let back = recompose::run(&tmp.ws, &mut stdout, &bus).unwrap();
    assert!(compare(&back, &parse_matrix(wide).unwrap(), 1e-5).is_ok());
}

#[test]
fn full_mode_rectangular_is_not_conformant() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();

    decompose::run("1 2 3\n4 5 6\n".as_bytes(), &tmp.ws, SvdMode::Full, &bus).unwrap();
    let err = recompose::run(&tmp.ws, Vec::new(), &bus).unwrap_err();
    assert!(matches!(err, FlowError::ShapeMismatch { .. }));
}

#[test]
fn decompose_rejects_ragged_input_without_writing() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();

    let err = decompose::run("1 2\n3\n".as_bytes(), &tmp.ws, SvdMode::Full, &bus).unwrap_err();
    assert!(matches!(err, FlowError::RaggedRow { line: 2, .. }));
    assert!(!tmp.ws.exists(FlowFile::FactorU));
}

#[test]
fn failed_factor_write_keeps_previous_triple() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();
    tmp.write(FlowFile::FactorU, "7.0\n");
    tmp.write(FlowFile::FactorS, "8.0\n");
    tmp.write(FlowFile::FactorVt, "9.0\n");

    // A directory in the way makes the VT write fail.
    std::fs::create_dir(tmp.ws.staging_path(FlowFile::FactorVt)).unwrap();

    let err = decompose::run(SAMPLE.as_bytes(), &tmp.ws, SvdMode::Full, &bus).unwrap_err();
    assert!(matches!(err, FlowError::File { .. }));
    assert_eq!(tmp.read(FlowFile::FactorU), "7.0\n");
    assert_eq!(tmp.read(FlowFile::FactorS), "8.0\n");
    assert_eq!(tmp.read(FlowFile::FactorVt), "9.0\n");
    assert!(!tmp.ws.staging_path(FlowFile::FactorU).exists());
    assert!(!tmp.ws.staging_path(FlowFile::FactorS).exists());
}

#[test]
fn successful_decompose_leaves_no_staging_files() {
    let tmp = TempWorkspace::new();
    decompose::run(SAMPLE.as_bytes(), &tmp.ws, SvdMode::Full, &EventBus::disabled()).unwrap();
    for file in [FlowFile::FactorU, FlowFile::FactorS, FlowFile::FactorVt] {
        assert!(tmp.ws.exists(file));
        assert!(!tmp.ws.staging_path(file).exists());
    }
}

#[test]
fn recompose_output_is_one_row_per_line() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();
    let u = Matrix::identity(2);
    let s = Matrix::from_diagonal(&[2.0, 3.0]);
    tmp.ws.write_matrix(FlowFile::FactorU, &u).unwrap();
    tmp.ws.write_matrix(FlowFile::FactorS, &s).unwrap();
    tmp.ws.write_matrix(FlowFile::FactorVt, &u).unwrap();

    let mut stdout = Vec::new();
    recompose::run(&tmp.ws, &mut stdout, &bus).unwrap();
    assert_eq!(String::from_utf8(stdout).unwrap(), "2.0 0.0\n0.0 3.0\n");
}

#[test]
fn recompose_missing_factor_fails() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();
    let err = recompose::run(&tmp.ws, Vec::new(), &bus).unwrap_err();
    assert!(matches!(err, FlowError::File { .. }));
}

// ─── Compare Tests ────────────────────────────────────────────

#[test]
fn comparator_boundary() {
    let a = Matrix::zeros(1, 2);
    let b = Matrix::from_rows(vec![vec![3e-6, 4e-6]]).unwrap();
    let norm = a.frobenius_distance(&b).unwrap();

    // Exactly at the tolerance fails.
    assert!(matches!(
        compare(&a, &b, norm),
        Err(FlowError::ToleranceExceeded { .. })
    ));
    // Strictly above the norm passes.
    assert!(compare(&a, &b, norm * 1.000_001).is_ok());
    // Below the norm fails.
    assert!(compare(&a, &b, norm * 0.5).is_err());
}

#[test]
fn comparator_default_tolerance() {
    let a = Matrix::zeros(2, 2);
    let near = Matrix::from_rows(vec![vec![9e-6, 0.0], vec![0.0, 0.0]]).unwrap();
    let far = Matrix::from_rows(vec![vec![2e-5, 0.0], vec![0.0, 0.0]]).unwrap();
    assert!(compare(&a, &near, 1e-5).is_ok());
    assert!(compare(&a, &far, 1e-5).is_err());
}

#[test]
fn comparator_nan_never_passes() {
    let a = Matrix::zeros(1, 1);
    let b = Matrix::from_rows(vec![vec![f64::NAN]]).unwrap();
    assert!(compare(&a, &b, 1e-5).is_err());
}

#[test]
fn comparator_files_fail_and_report() {
    let tmp = TempWorkspace::new();
    let (mut bus, sink) = bus_with_sink();
    tmp.write(FlowFile::MatrixIn, "1 0\n0 1\n");
    tmp.write(FlowFile::MatrixOut, "1 0\n0 1.001\n");

    let err = compare::run(&tmp.ws, 1e-5, &bus).unwrap_err();
    assert!(matches!(err, FlowError::ToleranceExceeded { .. }));

    bus.flush();
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].kind,
        EventKind::Compared { passed: false, .. }
    ));
}

#[test]
fn comparator_shape_mismatch() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();
    tmp.write(FlowFile::MatrixIn, "1 2\n");
    tmp.write(FlowFile::MatrixOut, "1\n2\n");
    assert!(matches!(
        compare::run(&tmp.ws, 1e-5, &bus),
        Err(FlowError::ShapeMismatch { .. })
    ));
}

// ─── Descent Tests ────────────────────────────────────────────

#[test]
fn decide_continue_example() {
    let step = decide(5.0, 0.02, 1e-3, 0.1);
    match step {
        Descent::Continue { old, new } => {
            assert_eq!(old, 5.0);
            assert!((new - 4.998).abs() < 1e-12);
        }
        other => panic!("expected Continue, got {other:?}"),
    }
}

#[test]
fn descent_continues_on_large_gradient() {
    let tmp = TempWorkspace::new();
    let (mut bus, sink) = bus_with_sink();
    tmp.write(FlowFile::ApproxOld, "5.0\n");
    tmp.write(FlowFile::Grad, "0.02\n");

    let step = descent::run(&tmp.ws, 1e-3, 0.1, &bus).unwrap();
    let Descent::Continue { new, .. } = step else {
        panic!("expected Continue, got {step:?}");
    };

    let written = tmp.ws.read_scalar(FlowFile::ApproxNew).unwrap();
    assert_eq!(written, new);
    assert!((written - 4.998).abs() < 1e-12);
    assert!(!tmp.ws.exists(FlowFile::Solution));

    let log = tmp.read(FlowFile::ApproxLog);
    assert_eq!(log, format!("old: 5.0\nnew: {}\n", format_scalar(new)));

    bus.flush();
    assert!(matches!(
        sink.events()[0].kind,
        EventKind::Descent { converged: false, .. }
    ));
}

#[test]
fn descent_converges_on_small_gradient() {
    let tmp = TempWorkspace::new();
    tmp.write(FlowFile::ApproxOld, "5.0\n");
    tmp.write(FlowFile::Grad, "0.0001\n");

    let step = descent::run(&tmp.ws, 1e-3, 0.1, &EventBus::disabled()).unwrap();
    assert_eq!(step, Descent::Converged { value: 5.0 });
    assert_eq!(tmp.read(FlowFile::Solution), "5.0\n");
    assert!(!tmp.ws.exists(FlowFile::ApproxNew));
    assert_eq!(tmp.read(FlowFile::ApproxLog), "old: 5.0\n");
}

#[test]
fn descent_log_accumulates_across_runs() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();
    tmp.write(FlowFile::ApproxLog, "previous run\n");

    tmp.write(FlowFile::ApproxOld, "1.0\n");
    tmp.write(FlowFile::Grad, "2.0\n");
    descent::run(&tmp.ws, 1e-3, 0.1, &bus).unwrap();

    // Feed the new approximation back in, as the next iteration would.
    let next = tmp.read(FlowFile::ApproxNew);
    tmp.write(FlowFile::ApproxOld, &next);
    tmp.write(FlowFile::Grad, "0.0\n");
    descent::run(&tmp.ws, 1e-3, 0.1, &bus).unwrap();

    let log = tmp.read(FlowFile::ApproxLog);
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "previous run");
    assert_eq!(lines[1], "old: 1.0");
    assert_eq!(lines[2], format!("new: {}", next.trim()));
    assert_eq!(lines[3], format!("old: {}", next.trim()));
}

#[test]
fn descent_bad_gradient_leaves_log_untouched() {
    let tmp = TempWorkspace::new();
    tmp.write(FlowFile::ApproxOld, "1.0\n");
    tmp.write(FlowFile::Grad, "steep\n");

    let err = descent::run(&tmp.ws, 1e-3, 0.1, &EventBus::disabled()).unwrap_err();
    assert!(matches!(err, FlowError::Parse { .. }));
    assert!(!tmp.ws.exists(FlowFile::ApproxLog));
}

#[test]
fn descent_missing_input_fails() {
    let tmp = TempWorkspace::new();
    tmp.write(FlowFile::Grad, "1.0\n");
    let err = descent::run(&tmp.ws, 1e-3, 0.1, &EventBus::disabled()).unwrap_err();
    assert!(err.to_string().contains("approx_old"));
}

// ─── Generate Tests ───────────────────────────────────────────

#[test]
fn generated_values_in_unit_interval() {
    let mut rng = StdRng::seed_from_u64(1);
    let m = generate(5, &mut rng).unwrap();
    assert_eq!(m.shape(), (5, 5));
    assert!(m.as_slice().iter().all(|&v| (0.0..1.0).contains(&v)));
}

#[test]
fn oversized_dimension_is_an_error() {
    // n * n overflows usize.
    let n = 1usize << (usize::BITS / 2);
    let mut out = Vec::new();
    let err = generate::run(n, Some(1), &mut out, &EventBus::disabled()).unwrap_err();
    assert!(matches!(err, FlowError::TooLarge { .. }));
    assert!(out.is_empty());
}

#[test]
fn seeded_generation_is_reproducible() {
    let bus = EventBus::disabled();
    let mut first = Vec::new();
    let mut second = Vec::new();
    generate::run(3, Some(42), &mut first, &bus).unwrap();
    generate::run(3, Some(42), &mut second, &bus).unwrap();
    assert_eq!(first, second);

    let parsed = parse_matrix(&String::from_utf8(first).unwrap()).unwrap();
    assert_eq!(parsed.shape(), (3, 3));
}

#[test]
fn generated_matrix_feeds_decomposer() {
    let tmp = TempWorkspace::new();
    let bus = EventBus::disabled();
    let m = generate(4, &mut StdRng::seed_from_u64(3)).unwrap();

    decompose::run(matrix_to_string(&m).as_bytes(), &tmp.ws, SvdMode::Full, &bus).unwrap();
    let back = recompose::run(&tmp.ws, Vec::new(), &bus).unwrap();
    assert!(compare(&back, &m, 1e-5).is_ok());
}
