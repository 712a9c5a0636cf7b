use std::fs;

use mallows_core::{Ranking, RankingMatrix};
use mallows_mcmc::{run_mcmc, ErrorModel, RunConfig, RunInfo, Trace, TraceRecorder};
use mallows_rank::{distance_cardinalities, Metric};

fn sample_info() -> RunInfo {
    RunInfo {
        seed: 5,
        n_items: 3,
        n_assessors: 2,
        n_clusters: 1,
        metric: Metric::Footrule,
        error_model: ErrorModel::None,
        nmc: 10,
        created_at: "2026-08-24T00:00:00+00:00".to_string(),
    }
}

fn small_run() -> Trace {
    let data = RankingMatrix::new(vec![
        Ranking::new(vec![1, 2, 3]).unwrap(),
        Ranking::new(vec![2, 1, 3]).unwrap(),
        Ranking::new(vec![1, 3, 2]).unwrap(),
    ])
    .unwrap();
    let cardinalities = distance_cardinalities(3, Metric::Footrule).unwrap();
    let mut config = RunConfig::default();
    config.nmc = 12;
    config.thinning = 3;
    run_mcmc(&data, &[], &cardinalities, &config, 40).unwrap()
}

#[test]
fn csv_layout_matches_the_documented_header() {
    let mut recorder = TraceRecorder::new();
    recorder.push_alpha(10, 0, 1.5);
    recorder.push_rho(10, 0, 1.5, 4, &Ranking::new(vec![2, 1, 3]).unwrap());

    let trace = recorder.finalize(sample_info(), vec![0.5], vec![0.25], Vec::new());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    trace.write_csv(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "sweep,cluster,alpha,distance,rho");
    assert_eq!(lines[1], "10,0,1.500000,4,2-1-3");
}

#[test]
fn csv_rows_parse_back_to_the_recorded_ranks() {
    let trace = small_run();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.csv");
    trace.write_csv(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), trace.rho.len() + 1);

    for (line, sample) in lines.iter().skip(1).zip(&trace.rho) {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0].parse::<usize>().unwrap(), sample.sweep);
        let ranks: Vec<usize> = fields[4]
            .split('-')
            .map(|rank| rank.parse().unwrap())
            .collect();
        assert_eq!(ranks, sample.rho.as_slice());
    }
}

#[test]
fn traces_round_trip_through_json() {
    let trace = small_run();
    let encoded = serde_json::to_string(&trace).unwrap();
    let decoded: Trace = serde_json::from_str(&encoded).unwrap();
    assert_eq!(trace, decoded);
}

#[test]
fn json_keeps_every_float_bit() {
    // Dispersion samples carry full-precision doubles; decoding must not
    // drift by even one ULP or trace equality checks break.
    let awkward = 0.9033236825686387f64;
    let third = 1.0f64 / 3.0;

    let mut recorder = TraceRecorder::new();
    recorder.push_alpha(1, 0, awkward);
    recorder.push_rho(1, 0, awkward, 2, &Ranking::new(vec![2, 1, 3]).unwrap());
    let trace = recorder.finalize(sample_info(), vec![third], vec![0.0], Vec::new());

    let encoded = serde_json::to_string(&trace).unwrap();
    let decoded: Trace = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.alpha[0].alpha.to_bits(), awkward.to_bits());
    assert_eq!(decoded.rho[0].alpha.to_bits(), awkward.to_bits());
    assert_eq!(decoded.alpha_acceptance[0].to_bits(), third.to_bits());
}

#[test]
fn coverage_summarizes_the_alpha_chain() {
    let mut recorder = TraceRecorder::new();
    recorder.push_alpha(1, 0, 1.0);
    recorder.push_alpha(2, 0, 3.0);

    let consensus_a = Ranking::new(vec![1, 2, 3]).unwrap();
    let consensus_b = Ranking::new(vec![2, 1, 3]).unwrap();
    recorder.push_rho(1, 0, 1.0, 2, &consensus_a);
    recorder.push_rho(2, 0, 3.0, 2, &consensus_a);
    recorder.push_rho(3, 0, 3.0, 0, &consensus_b);
    assert_eq!(recorder.rho_samples(), 3);

    let trace = recorder.finalize(sample_info(), vec![1.0], vec![1.0], Vec::new());

    assert_eq!(trace.coverage.unique_consensus_states, 2);
    assert!((trace.coverage.mean_alpha[0] - 2.0).abs() < 1e-12);
    assert!((trace.coverage.alpha_variance[0] - 1.0).abs() < 1e-12);
}

#[test]
fn empty_recordings_finalize_cleanly() {
    let recorder = TraceRecorder::new();
    let trace = recorder.finalize(sample_info(), vec![0.0], vec![0.0], Vec::new());

    assert_eq!(trace.coverage.unique_consensus_states, 0);
    assert_eq!(trace.coverage.mean_alpha, vec![0.0]);
    assert_eq!(trace.coverage.alpha_variance, vec![0.0]);
    assert!(trace.alpha.is_empty());
}
