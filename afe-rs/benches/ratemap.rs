use afe_rs::auditory::{
    ChannelLayout, Filterbank, FilterbankConfig, Ratemap, RatemapConfig, Scaling,
};
use afe_rs::kernel::KernelLifecycle;
use afe_rs::signal::filter::design::IrType;
use afe_rs::signal::traits::ChunkProcessor;
use afe_rs::signal::windows::WindowName;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{s, Array2};
use rand::rngs::ThreadRng;
use std::num::NonZeroUsize;

const FS: f64 = 16000.0;

/// Sum of a few random sinusoids plus a little noise, as a `samples x 1` matrix.
fn randomized_signal(mut rng: ThreadRng, num_data_points: NonZeroUsize) -> Array2<f64> {
    use rand::Rng;

    let n: usize = num_data_points.into();
    let tones: Vec<(f64, f64, f64)> = (0..6)
        .map(|_| {
            (
                rng.random_range(0.1..1.0),
                rng.random_range(80.0..6000.0),
                rng.random_range(0.0..std::f64::consts::PI),
            )
        })
        .collect();
    Array2::from_shape_fn((n, 1), |(i, _)| {
        let t = i as f64 / FS;
        tones
            .iter()
            .map(|(a, f, p)| a * (2.0 * std::f64::consts::PI * f * t + p).sin())
            .sum::<f64>()
            + 0.01 * rng.random_range(-1.0..1.0)
    })
}

fn stages() -> (Filterbank<f64>, Ratemap<f64>) {
    let filterbank = Filterbank::try_new(FilterbankConfig {
        fs: FS,
        layout: ChannelLayout::RangeCount {
            low_hz: 80.0,
            high_hz: 7000.0,
            num_channels: 32,
        },
        ir_type: IrType::Iir,
        order: 4,
        bandwidth_erb: 1.08,
        align: false,
        duration_sec: 0.128,
        decimation: 1,
    })
    .expect("filterbank config should be valid");
    let ratemap = Ratemap::try_new(RatemapConfig {
        fs: FS,
        window: WindowName::Hann,
        window_sec: 0.02,
        hop_sec: 0.01,
        scaling: Scaling::Power,
        decay_sec: 0.008,
    })
    .expect("ratemap config should be valid");
    (filterbank, ratemap)
}

/// One second of audio through a 32-channel gammatone bank and the ratemap,
/// fed in chunks of different sizes.
fn chunked_ratemap(c: &mut Criterion) {
    let signal = randomized_signal(rand::rng(), NonZeroUsize::new(FS as usize).unwrap());

    for chunk in [512usize, 2048, 16000] {
        c.bench_with_input(BenchmarkId::new("ratemap", chunk), &signal, |bench, sig| {
            bench.iter(|| {
                let (mut filterbank, mut ratemap) = stages();
                let mut frames = 0;
                let mut start = 0;
                while start < sig.nrows() {
                    let end = (start + chunk).min(sig.nrows());
                    let channels = filterbank
                        .process_chunk(black_box(sig.slice(s![start..end, ..])))
                        .expect("filterbank chunk");
                    frames += ratemap
                        .process_chunk(channels.view())
                        .expect("ratemap chunk")
                        .nrows();
                    start = end;
                }
                frames
            })
        });
    }
}

criterion_group!(benches, chunked_ratemap);
criterion_main!(benches);
