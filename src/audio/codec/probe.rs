use crate::audio::codec::traits::{Codec, CodecImpl};
use crate::audio::DecodedAudio;
use crate::error::{AudioError, CodecError};
use crate::prelude::*;
use std::io::Cursor;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// General-purpose decoder covering every container symphonia can probe.
#[derive(Debug, Default)]
pub struct SymphoniaCodec;

impl Codec for SymphoniaCodec {
    fn name(&self) -> &'static str {
        "symphonia"
    }

    fn mime_type(&self) -> &'static str {
        "audio/*"
    }

    fn extension(&self) -> &'static str {
        "*"
    }
}

impl CodecImpl for SymphoniaCodec {
    fn recognizes(&self, _data: &[u8]) -> bool {
        // The probe is the only reliable sniff.
        true
    }

    fn decode_audio(&self, data: &[u8]) -> Result<DecodedAudio> {
        decode_with_hint(data, None)
    }

    fn header_duration(&self, data: &[u8]) -> Option<Duration> {
        probe_duration(data, None)
    }
}

fn open_format(data: &[u8], extension: Option<&str>) -> Result<Box<dyn FormatReader>> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;
    Ok(probed.format)
}

fn audio_track(format: &dyn FormatReader) -> Result<&Track> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::UnsupportedFormat("no decodable audio track".into()).into())
}

/// Duration from the container's frame count, when the container records one.
pub fn probe_duration(data: &[u8], extension: Option<&str>) -> Option<Duration> {
    let format = open_format(data, extension).ok()?;
    let params = &audio_track(&*format).ok()?.codec_params;
    let frames = params.n_frames?;
    let sample_rate = params.sample_rate.filter(|rate| *rate > 0)?;
    Some(Duration::from_secs_f64(frames as f64 / sample_rate as f64))
}

pub fn decode_with_hint(data: &[u8], extension: Option<&str>) -> Result<DecodedAudio> {
    let mut format = open_format(data, extension)?;

    let track = audio_track(&*format)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channel_count = track.codec_params.channels.map_or(0, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CodecError::Decoding(format!("failed to create decoder: {e}")))?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => {
                return Err(CodecError::Decoding("track list changed during decoding".into()).into())
            }
            Err(e) => return Err(CodecError::Decoding(e.to_string()).into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping corrupt packet: {}", e);
                continue;
            }
            Err(SymphoniaError::IoError(_)) => continue,
            Err(e) => return Err(CodecError::Decoding(e.to_string()).into()),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channel_count = spec.channels.count();

        let buf = sample_buf.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
        if buf.capacity() < decoded.capacity() * channel_count {
            *buf = SampleBuffer::new(decoded.capacity() as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(buf.samples());
    }

    Ok(DecodedAudio::from_interleaved(&interleaved, channel_count, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::codec::WavCodec;

    #[test]
    fn decodes_wav_through_the_probe() {
        let samples: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let bytes = WavCodec::default()
            .encode(&DecodedAudio::mono(samples, 8000))
            .unwrap();

        let audio = SymphoniaCodec.decode(&bytes).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channel_count(), 1);
        assert_eq!(audio.frames(), 4000);
    }

    #[test]
    fn duration_is_read_without_decoding() {
        let bytes = WavCodec::default()
            .encode(&DecodedAudio::mono(vec![0.0; 12_000], 8000))
            .unwrap();
        assert_eq!(probe_duration(&bytes, Some("wav")), Some(Duration::from_millis(1500)));
        assert_eq!(SymphoniaCodec.header_duration(&[0x13; 4096]), None);
    }

    #[test]
    fn garbage_is_unsupported() {
        let err = SymphoniaCodec.decode(&[0x13; 4096]).unwrap_err();
        assert!(matches!(err, Error::Audio(_)));
    }
}
