use crate::audio::codec::traits::{invalid, Codec, CodecImpl};
use crate::audio::DecodedAudio;
use crate::error::{AudioError, CodecError};
use crate::prelude::*;
use std::time::Duration;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

#[derive(Debug)]
pub struct WavCodec {
    bits_per_sample: u16,
}

impl Default for WavCodec {
    fn default() -> Self {
        Self {
            bits_per_sample: 16,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FormatChunk {
    format: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl Codec for WavCodec {
    fn name(&self) -> &'static str {
        "WAV"
    }

    fn mime_type(&self) -> &'static str {
        "audio/wav"
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}

impl CodecImpl for WavCodec {
    fn recognizes(&self, data: &[u8]) -> bool {
        data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE"
    }

    fn decode_audio(&self, data: &[u8]) -> Result<DecodedAudio> {
        let (format, body) = self.locate_data(data)?;
        decode_pcm(body, format)
    }

    fn header_duration(&self, data: &[u8]) -> Option<Duration> {
        let (format, body) = self.locate_data(data).ok()?;
        let frame_bytes = usize::from(format.bits_per_sample / 8) * usize::from(format.channels);
        if frame_bytes == 0 || format.sample_rate == 0 {
            return None;
        }
        let frames = body.len() / frame_bytes;
        Some(Duration::from_secs_f64(frames as f64 / format.sample_rate as f64))
    }
}

impl WavCodec {
    /// Walks the RIFF chunks up to `data`, returning it with the preceding format.
    fn locate_data<'a>(&self, data: &'a [u8]) -> Result<(FormatChunk, &'a [u8])> {
        if data.len() < 44 {
            return Err(invalid("WAV header too short"));
        }

        if !self.recognizes(data) {
            return Err(invalid("Invalid WAV header"));
        }

        let mut format: Option<FormatChunk> = None;
        let mut offset = 12;
        while offset + 8 <= data.len() {
            let chunk_id = &data[offset..offset + 4];
            let chunk_size = u32::from_le_bytes(
                data[offset + 4..offset + 8]
                    .try_into()
                    .map_err(|_| CodecError::InvalidData("Invalid chunk size"))?,
            ) as usize;
            let body_start = offset + 8;
            let body_end = body_start.saturating_add(chunk_size).min(data.len());
            let body = &data[body_start..body_end];

            match chunk_id {
                b"fmt " => format = Some(parse_format(body)?),
                b"data" => {
                    let format = format.ok_or_else(|| invalid("data chunk before fmt chunk"))?;
                    return Ok((format, body));
                }
                _ => {}
            }

            // Chunks are word aligned.
            offset = body_start.saturating_add(chunk_size).saturating_add(chunk_size & 1);
        }

        Err(invalid("No data chunk found"))
    }

    pub fn new(bits_per_sample: u16) -> Result<Self> {
        match bits_per_sample {
            16 | 32 => Ok(Self { bits_per_sample }),
            _ => Err(Error::Audio(AudioError::Codec(
                CodecError::InvalidConfiguration("WAV only supports 16 or 32 bits per sample"),
            ))),
        }
    }

    /// Writes interleaved integer PCM at this codec's bit depth.
    pub fn encode(&self, audio: &DecodedAudio) -> Result<Vec<u8>> {
        let channels = u16::try_from(audio.channel_count())
            .map_err(|_| CodecError::Encoding("too many channels".into()))?;
        if channels == 0 {
            return Err(CodecError::Encoding("no channels to encode".into()).into());
        }
        let frames = audio.frames();
        if audio.channels.iter().any(|c| c.len() != frames) {
            return Err(CodecError::Encoding("channels differ in length".into()).into());
        }

        let bytes_per_sample = self.bits_per_sample / 8;
        let block_align = channels * bytes_per_sample;
        let byte_rate = audio.sample_rate * u32::from(block_align);
        let data_size = (frames * block_align as usize) as u32;
        let file_size = 36 + data_size;

        let mut buffer = Vec::with_capacity(44 + data_size as usize);

        buffer.extend_from_slice(b"RIFF");
        buffer.extend_from_slice(&file_size.to_le_bytes());
        buffer.extend_from_slice(b"WAVE");
        buffer.extend_from_slice(b"fmt ");
        buffer.extend_from_slice(&16u32.to_le_bytes());
        buffer.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        buffer.extend_from_slice(&channels.to_le_bytes());
        buffer.extend_from_slice(&audio.sample_rate.to_le_bytes());
        buffer.extend_from_slice(&byte_rate.to_le_bytes());
        buffer.extend_from_slice(&block_align.to_le_bytes());
        buffer.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        buffer.extend_from_slice(b"data");
        buffer.extend_from_slice(&data_size.to_le_bytes());

        for frame in 0..frames {
            for channel in &audio.channels {
                let sample = channel[frame].clamp(-1.0, 1.0);
                if self.bits_per_sample == 32 {
                    buffer.extend_from_slice(&((sample * 2147483647.0) as i32).to_le_bytes());
                } else {
                    buffer.extend_from_slice(&((sample * 32767.0) as i16).to_le_bytes());
                }
            }
        }

        Ok(buffer)
    }
}

fn parse_format(body: &[u8]) -> Result<FormatChunk> {
    if body.len() < 16 {
        return Err(invalid("fmt chunk too short"));
    }
    let read_u16 = |at: usize| u16::from_le_bytes([body[at], body[at + 1]]);
    let mut format = read_u16(0);
    if format == FORMAT_EXTENSIBLE && body.len() >= 26 {
        // Sub-format GUID starts with the actual format tag.
        format = read_u16(24);
    }

    let chunk = FormatChunk {
        format,
        channels: read_u16(2),
        sample_rate: u32::from_le_bytes([body[4], body[5], body[6], body[7]]),
        bits_per_sample: read_u16(14),
    };
    if chunk.channels == 0 {
        return Err(invalid("WAV declares zero channels"));
    }
    Ok(chunk)
}

fn decode_pcm(body: &[u8], format: FormatChunk) -> Result<DecodedAudio> {
    let bytes_per_sample = usize::from(format.bits_per_sample / 8);
    let unsupported = || {
        AudioError::Codec(CodecError::UnsupportedSampleFormat(format!(
            "format {} with {} bits",
            format.format, format.bits_per_sample
        )))
    };

    let convert: fn(&[u8]) -> f32 = match (format.format, format.bits_per_sample) {
        (FORMAT_PCM, 8) => |b| (b[0] as f32 - 128.0) / 128.0,
        (FORMAT_PCM, 16) => |b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0,
        (FORMAT_PCM, 24) => |b| {
            let value = i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8;
            value as f32 / 8_388_608.0
        },
        (FORMAT_PCM, 32) => |b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2_147_483_648.0,
        (FORMAT_IEEE_FLOAT, 32) => |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        _ => return Err(unsupported().into()),
    };

    let samples: Vec<f32> = body.chunks_exact(bytes_per_sample).map(convert).collect();
    Ok(DecodedAudio::from_interleaved(
        &samples,
        usize::from(format.channels),
        format.sample_rate,
    ))
}
