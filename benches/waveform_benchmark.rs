/// Profile, decode and rasterize costs for typical recordings.
/// The profile is a single linear pass, so the decode step dominates the
/// end-to-end time for every length measured here.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use waveform_player::audio::codec::{WavCodec, CODEC_FACTORY};
use waveform_player::audio::{compute_amplitude_profile, DecodedAudio, BUCKET_COUNT};
use waveform_player::render::{Rasterizer, WaveformRenderer};

fn tone(sample_rate: u32, seconds: u32) -> Vec<f32> {
    (0..sample_rate * seconds)
        .map(|i| (i as f32 * 440.0 * 2.0 * std::f32::consts::PI / sample_rate as f32).sin() * 0.5)
        .collect()
}

fn benchmark_profile(c: &mut Criterion) {
    let sample_rate = 44_100;

    for &duration in &[10, 60, 600] {
        let samples = tone(sample_rate, duration);
        let wav = WavCodec::default()
            .encode(&DecodedAudio::mono(samples.clone(), sample_rate))
            .unwrap();

        let mut group = c.benchmark_group(format!("profile_{}hz_{}s", sample_rate, duration));
        group.bench_function("compute", |b| {
            b.iter(|| compute_amplitude_profile(black_box(&samples), BUCKET_COUNT))
        });
        group.bench_function("decode_and_compute", |b| {
            b.iter(|| {
                let audio = CODEC_FACTORY.decode(black_box(&wav), Some("wav")).unwrap();
                compute_amplitude_profile(audio.first_channel(), BUCKET_COUNT)
            })
        });
        group.finish();
    }
}

fn benchmark_rasterize(c: &mut Criterion) {
    let profile = compute_amplitude_profile(&tone(16_000, 30), BUCKET_COUNT);
    let renderer = WaveformRenderer::default();
    let rasterizer = Rasterizer::default();

    for &(width, height) in &[(800, 120), (1920, 300)] {
        let mut group = c.benchmark_group(format!("rasterize_{}x{}", width, height));
        let true_list = renderer.render_true_waveform(&profile, width, height);
        let fallback_list = renderer.render_fallback_waveform(width, height);

        group.bench_function("true_waveform", |b| {
            b.iter(|| rasterizer.rasterize(black_box(&true_list), width, height).unwrap())
        });
        group.bench_function("fallback", |b| {
            b.iter(|| rasterizer.rasterize(black_box(&fallback_list), width, height).unwrap())
        });
        group.finish();
    }
}

criterion_group!(benches, benchmark_profile, benchmark_rasterize);
criterion_main!(benches);
