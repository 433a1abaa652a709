mod common;

use std::cell::RefCell;
use std::sync::Once;

use carbonate_rs::{AlkalinityModel, CarbonateSolver, SolverOptions};
use common::conditions;
use log::{Level, LevelFilter, Log, Metadata, Record};
use ndarray::array;

thread_local! {
    static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture;
static INIT: Once = Once::new();

/// Runs `f` and returns the warnings it logged on this thread.
fn warnings_from<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Warn);
    });
    WARNINGS.with(|w| w.borrow_mut().clear());
    let out = f();
    (out, WARNINGS.with(|w| w.borrow_mut().drain(..).collect()))
}

#[test]
fn impossible_fco2_gives_nan_and_one_warning() {
    let cond = conditions(3);
    let solver = CarbonateSolver::new(&cond);
    let (ph, warnings) = warnings_from(|| {
        solver
            .ph_from_tc_fco2(
                &array![100e-6, 2000e-6, 100e-6],
                &array![4000e-6, 400e-6, 5000e-6],
            )
            .unwrap()
    });
    assert!(ph[0].is_nan() && ph[2].is_nan());
    assert!((ph[1] - 8.0).abs() < 0.1);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("impossibly high"));
    assert!(warnings[0].contains("2 of 3"));
}

#[test]
fn impossible_ions_are_reported_per_call() {
    let cond = conditions(2);
    let solver = CarbonateSolver::new(&cond);
    let tc = array![100e-6, 2000e-6];
    let (_, warnings) = warnings_from(|| {
        solver.ph_from_tc_carb(&tc, &array![150e-6, 200e-6]).unwrap();
        solver.ph_from_tc_hco3(&tc, &array![100e-6, 1800e-6]).unwrap();
    });
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("CO3"));
    assert!(warnings[1].contains("HCO3"));
}

#[test]
fn negative_dic_from_alkalinity_is_reported() {
    let cond = conditions(1);
    let solver = CarbonateSolver::new(&cond);
    let (tc, warnings) =
        warnings_from(|| solver.tc_from_ta_ph(&array![50e-6], &array![9.0]).unwrap());
    assert!(tc[0].is_nan());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("pH"));
}

#[test]
fn nan_inputs_are_propagated_silently() {
    let cond = conditions(2);
    let solver = CarbonateSolver::new(&cond);
    let (out, warnings) = warnings_from(|| {
        (
            solver
                .ph_from_tc_fco2(&array![f64::NAN, 2000e-6], &array![400e-6, 400e-6])
                .unwrap(),
            solver
                .ph_from_ta_tc(&array![f64::NAN, 2300e-6], &array![2000e-6, 2000e-6])
                .unwrap(),
        )
    });
    assert!(out.0[0].is_nan() && out.1[0].is_nan());
    assert!(out.0[1].is_finite() && out.1[1].is_finite());
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn iteration_cap_warns_once_and_returns_nan() {
    let cond = conditions(2);
    let solver = CarbonateSolver::new(&cond).with_options(SolverOptions {
        alkalinity_model: AlkalinityModel::ScaleCorrected,
        max_iterations: 1,
        ..Default::default()
    });
    let (ph, warnings) = warnings_from(|| {
        solver
            .ph_from_ta_tc(&array![2300e-6, 2200e-6], &array![2000e-6, 2000e-6])
            .unwrap()
    });
    assert!(ph.iter().all(|p| p.is_nan()));
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("did not converge for 2 of 2"));
}

#[test]
fn solvable_batch_logs_nothing() {
    let cond = conditions(2);
    let solver = CarbonateSolver::new(&cond);
    let (_, warnings) = warnings_from(|| {
        let ph = solver
            .ph_from_ta_tc(&array![2300e-6, 2200e-6], &array![2000e-6, 2000e-6])
            .unwrap();
        solver.tc_from_ta_ph(&array![2300e-6, 2200e-6], &ph).unwrap()
    });
    assert!(warnings.is_empty(), "{warnings:?}");
}
