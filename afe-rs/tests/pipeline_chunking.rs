//! Filterbank into ratemap, fed whole or in pieces.

use afe_rs::auditory::{
    ChannelLayout, Filterbank, FilterbankConfig, FilterbankParams, Ratemap, RatemapConfig,
    RatemapParams,
};
use afe_rs::kernel::KernelLifecycle;
use afe_rs::signal::filter::design::IrType;
use afe_rs::signal::traits::{ChunkProcessor, HasParameters};
use approx::assert_abs_diff_eq;
use ndarray::{concatenate, s, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FS: f64 = 16000.0;

fn filterbank_params() -> FilterbankParams<f64> {
    FilterbankParams {
        low_hz: Some(80.0),
        high_hz: Some(6000.0),
        num_channels: Some(16),
        ir_type: Some(IrType::Iir),
        ..Default::default()
    }
    .resolved()
}

fn ratemap_params() -> RatemapParams<f64> {
    RatemapParams {
        scaling: Some("magnitude".into()),
        ..Default::default()
    }
    .resolved()
}

fn pipeline() -> (Filterbank<f64>, Ratemap<f64>) {
    let filterbank = Filterbank::try_new(
        FilterbankConfig::from_params(FS, &filterbank_params()).expect("filterbank params"),
    )
    .expect("filterbank");
    let ratemap =
        Ratemap::try_new(RatemapConfig::from_params(FS, &ratemap_params()).expect("ratemap params"))
            .expect("ratemap");
    (filterbank, ratemap)
}

fn run(
    filterbank: &mut Filterbank<f64>,
    ratemap: &mut Ratemap<f64>,
    chunk: ndarray::ArrayView2<f64>,
) -> Array2<f64> {
    let channels = filterbank.process_chunk(chunk).expect("filterbank chunk");
    // Half-wave rectification stands in for the hair-cell stage.
    let rectified = channels.mapv(|v| v.max(0.0));
    ratemap.process_chunk(rectified.view()).expect("ratemap chunk")
}

#[test]
fn chunked_pipeline_matches_single_pass() {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 12000;
    let signal = Array2::from_shape_fn((n, 1), |(i, _)| {
        let t = i as f64 / FS;
        (2.0 * std::f64::consts::PI * 440.0 * t).sin() + 0.1 * rng.random_range(-1.0..1.0)
    });

    let (mut fb, mut rm) = pipeline();
    let expected = run(&mut fb, &mut rm, signal.view());
    // (12000 - (320 - 160)) / 160
    assert_eq!(expected.dim(), (74, 16));

    let (mut fb, mut rm) = pipeline();
    let mut bounds = vec![0, 320, 1000, 1700, 4096, 5000, 9000, n];
    bounds.dedup();
    let parts: Vec<Array2<f64>> = bounds
        .windows(2)
        .map(|w| run(&mut fb, &mut rm, signal.slice(s![w[0]..w[1], ..])))
        .collect();
    let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
    let actual = concatenate(Axis(0), &views).expect("same channel count");

    assert_eq!(actual.dim(), expected.dim());
    actual
        .iter()
        .zip(expected.iter())
        .for_each(|(a, e)| assert_abs_diff_eq!(*a, *e, epsilon = 1e-12));
    assert_eq!(rm.buffered_samples(), n - 74 * 160);
}

#[test]
fn stages_report_their_parameters() {
    let (fb, rm) = pipeline();
    assert!(fb.has_parameters(&filterbank_params()));
    assert!(rm.has_parameters(&ratemap_params()));
    assert!(matches!(fb.layout(), ChannelLayout::RangeCount { .. }));

    let rebuilt = FilterbankParams {
        center_freqs: Some(fb.center_frequencies().to_vec()),
        ..filterbank_params()
    };
    assert!(fb.has_parameters(&rebuilt));
    assert!(!rm.has_parameters(&RatemapParams::default()));
}

#[test]
fn reset_pipeline_repeats_output() {
    let signal = Array2::from_shape_fn((4000, 1), |(i, _)| ((i % 50) as f64 / 25.0) - 1.0);
    let (mut fb, mut rm) = pipeline();
    let first = run(&mut fb, &mut rm, signal.view());
    fb.reset().expect("filterbank reset");
    rm.reset().expect("ratemap reset");
    let second = run(&mut fb, &mut rm, signal.view());
    assert_eq!(first, second);
}
