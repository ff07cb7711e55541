#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use waveform_player::audio::codec::{AudioDecoder, ProbingDecoder};
use waveform_player::audio::DecodedAudio;
use waveform_player::error::RenderError;
use waveform_player::render::{DrawList, ProgressOverlay, Surface};
use waveform_player::prelude::*;

pub const TONE_RATE: u32 = 16_000;

/// Mono 16-bit WAV of a sine tone.
pub fn tone_wav(freq: f32, amplitude: f32, seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TONE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = (TONE_RATE as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / TONE_RATE as f32;
            let sample = (2.0 * std::f32::consts::PI * freq * t).sin() * amplitude;
            writer.write_sample((sample * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Seeded bytes that no decoder accepts.
pub fn garbage_bytes(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    (0..len).map(|_| rng.gen_range(0x00..0x80)).collect()
}

pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Blocks its first decode until released, then decodes normally.
#[derive(Debug)]
pub struct GatedDecoder {
    gate: Mutex<Option<mpsc::Receiver<()>>>,
    entered: AtomicBool,
}

impl GatedDecoder {
    pub fn new() -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let decoder = Self {
            gate: Mutex::new(Some(rx)),
            entered: AtomicBool::new(false),
        };
        (decoder, tx)
    }

    pub fn entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }
}

impl AudioDecoder for GatedDecoder {
    fn decode(&self, data: &[u8]) -> Result<DecodedAudio> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            self.entered.store(true, Ordering::SeqCst);
            let _ = gate.recv();
        }
        ProbingDecoder::default().decode(data)
    }

    fn probe_duration(&self, data: &[u8]) -> Option<Duration> {
        ProbingDecoder::default().probe_duration(data)
    }
}

/// Shared between a `GatedSurface` and the test driving it.
#[derive(Debug)]
pub struct DrawGate {
    entered: AtomicBool,
    timed_out: AtomicBool,
    release: Mutex<mpsc::Sender<()>>,
    wait: Mutex<mpsc::Receiver<()>>,
}

impl DrawGate {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::channel();
        Arc::new(Self {
            entered: AtomicBool::new(false),
            timed_out: AtomicBool::new(false),
            release: Mutex::new(tx),
            wait: Mutex::new(rx),
        })
    }

    pub fn entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }

    /// True when a draw gave up waiting instead of being released.
    pub fn timed_out(&self) -> bool {
        self.timed_out.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        let _ = self.release.lock().unwrap().send(());
    }
}

/// Surface whose draws park until the gate is released, or five seconds pass.
#[derive(Debug)]
pub struct GatedSurface {
    size: (u32, u32),
    gate: Arc<DrawGate>,
    pub draws: usize,
}

impl GatedSurface {
    pub fn new(width: u32, height: u32, gate: Arc<DrawGate>) -> Self {
        Self {
            size: (width, height),
            gate,
            draws: 0,
        }
    }
}

impl Surface for GatedSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw(&mut self, _list: &DrawList) -> std::result::Result<(), RenderError> {
        self.gate.entered.store(true, Ordering::SeqCst);
        let released = self.gate.wait.lock().unwrap().recv_timeout(Duration::from_secs(5));
        if released.is_err() {
            self.gate.timed_out.store(true, Ordering::SeqCst);
        }
        self.draws += 1;
        Ok(())
    }

    fn set_overlay(&mut self, _overlay: ProgressOverlay) {}
}
