use super::probe::{decode_with_hint, probe_duration, SymphoniaCodec};
use super::traits::{AudioDecoder, Codec, CodecImpl};
use super::wav::WavCodec;
use crate::audio::DecodedAudio;
use crate::error::AudioError;
use crate::prelude::*;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct CodecFactory {
    /// Probed in registration order; the catch-all decoder goes last.
    codecs: Vec<(String, Arc<dyn Codec>)>,
}

impl CodecFactory {
    pub fn new() -> Self {
        // Built-in codecs, most specific first
        let codecs: Vec<(String, Arc<dyn Codec>)> = vec![
            ("wav".to_string(), Arc::new(WavCodec::default())),
            ("symphonia".to_string(), Arc::new(SymphoniaCodec)),
        ];
        Self { codecs }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.iter().map(|(name, _)| name.as_str())
    }

    /// Registers ahead of the built-ins so custom codecs win the probe.
    pub fn register<C: Codec + 'static>(&mut self, name: &str, codec: C) {
        self.codecs.retain(|(key, _)| key != name);
        let at = self
            .codecs
            .iter()
            .position(|(key, _)| key == "wav" || key == "symphonia")
            .unwrap_or(self.codecs.len());
        self.codecs
            .insert(at, (name.to_string(), Arc::new(codec) as Arc<dyn Codec>));
    }

    pub fn probe(&self, data: &[u8]) -> Option<Arc<dyn Codec>> {
        self.codecs
            .iter()
            .find(|(_, codec)| codec.can_decode(data))
            .map(|(_, codec)| codec.clone())
    }

    /// Hints that no sniffing codec claims go straight to symphonia.
    fn general_hint<'a>(&self, extension: Option<&'a str>) -> Option<&'a str> {
        extension.filter(|ext| !self.codecs.iter().any(|(_, codec)| codec.extension() == *ext))
    }

    /// Decodes with the first codec that claims the bytes. An extension hint
    /// no registered codec owns bypasses sniffing and goes straight to the
    /// general decoder.
    pub fn decode(&self, data: &[u8], extension: Option<&str>) -> Result<DecodedAudio> {
        if data.is_empty() {
            return Err(AudioError::UnsupportedFormat("empty input".into()).into());
        }
        if let Some(extension) = self.general_hint(extension) {
            debug!("Decoding with extension hint {}", extension);
            let audio = decode_with_hint(data, Some(extension))?;
            if audio.is_empty() {
                return Err(AudioError::EmptyAudio.into());
            }
            return Ok(audio);
        }

        let codec = self
            .probe(data)
            .ok_or_else(|| AudioError::UnsupportedFormat("no codec recognised the input".into()))?;
        debug!(
            "Decoding {} bytes with {} codec ({})",
            data.len(),
            codec.name(),
            codec.mime_type()
        );
        codec.decode(data)
    }

    /// Duration from container metadata alone, if the format records it.
    pub fn probe_duration(&self, data: &[u8], extension: Option<&str>) -> Option<Duration> {
        if data.is_empty() {
            return None;
        }
        match self.general_hint(extension) {
            Some(extension) => probe_duration(data, Some(extension)),
            None => self.probe(data)?.header_duration(data),
        }
    }
}

impl Default for CodecFactory {
    fn default() -> Self {
        Self::new()
    }
}

pub static CODEC_FACTORY: Lazy<CodecFactory> = Lazy::new(CodecFactory::default);

/// Default player decoder: sniffs the bytes through the global factory.
#[derive(Debug, Default, Clone)]
pub struct ProbingDecoder {
    extension: Option<String>,
}

impl ProbingDecoder {
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: Some(extension.into()),
        }
    }
}

impl AudioDecoder for ProbingDecoder {
    fn decode(&self, data: &[u8]) -> Result<DecodedAudio> {
        CODEC_FACTORY.decode(data, self.extension.as_deref())
    }

    fn probe_duration(&self, data: &[u8]) -> Option<Duration> {
        CODEC_FACTORY.probe_duration(data, self.extension.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_bytes_are_claimed_by_the_wav_codec() {
        let bytes = WavCodec::default()
            .encode(&DecodedAudio::mono(vec![0.1; 100], 8000))
            .unwrap();
        let codec = CODEC_FACTORY.probe(&bytes).unwrap();
        assert_eq!(codec.name(), "WAV");
    }

    #[test]
    fn unknown_bytes_fall_through_to_symphonia() {
        let codec = CODEC_FACTORY.probe(b"ID3\x04rest-of-an-mp3").unwrap();
        assert_eq!(codec.name(), "symphonia");
    }

    #[test]
    fn empty_input_is_rejected_before_probing() {
        assert!(ProbingDecoder::default().decode(&[]).is_err());
        assert_eq!(ProbingDecoder::default().probe_duration(&[]), None);
    }

    #[test]
    fn wav_duration_is_known_before_decoding() {
        let bytes = WavCodec::default()
            .encode(&DecodedAudio::mono(vec![0.0; 4000], 8000))
            .unwrap();
        let decoder = ProbingDecoder::with_extension("wav");
        assert_eq!(decoder.probe_duration(&bytes), Some(Duration::from_millis(500)));
        assert_eq!(decoder.decode(&bytes).unwrap().frames(), 4000);
    }

    #[test]
    fn registered_codecs_are_probed_first() {
        #[derive(Debug)]
        struct Silence;
        impl CodecImpl for Silence {
            fn decode_audio(&self, _data: &[u8]) -> Result<DecodedAudio> {
                Ok(DecodedAudio::mono(vec![0.0; 10], 10))
            }
            fn recognizes(&self, data: &[u8]) -> bool {
                data.starts_with(b"SIL")
            }
        }
        impl Codec for Silence {
            fn name(&self) -> &'static str {
                "silence"
            }
            fn mime_type(&self) -> &'static str {
                "audio/x-silence"
            }
            fn extension(&self) -> &'static str {
                "sil"
            }
        }

        let mut factory = CodecFactory::new();
        factory.register("silence", Silence);
        assert_eq!(factory.names().collect::<Vec<_>>(), vec!["silence", "wav", "symphonia"]);
        assert_eq!(factory.decode(b"SIL...", None).unwrap().frames(), 10);
    }
}
