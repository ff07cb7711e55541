use crate::audio::DecodedAudio;
use crate::error::{AudioError, CodecError};
use crate::prelude::*;
use std::fmt::Debug;
use std::time::Duration;

pub trait CodecImpl: Send + Sync + Debug {
    fn decode_audio(&self, data: &[u8]) -> Result<DecodedAudio>;

    /// Cheap header sniff; a `false` here skips the codec during probing.
    fn recognizes(&self, data: &[u8]) -> bool;

    /// Duration read from container metadata, without decoding any samples.
    fn header_duration(&self, _data: &[u8]) -> Option<Duration> {
        None
    }
}

pub trait Codec: CodecImpl {
    fn name(&self) -> &'static str;
    fn mime_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;

    fn can_decode(&self, data: &[u8]) -> bool {
        !data.is_empty() && self.recognizes(data)
    }

    fn decode(&self, data: &[u8]) -> Result<DecodedAudio> {
        let audio = self.decode_audio(data)?;
        if audio.is_empty() {
            return Err(AudioError::EmptyAudio.into());
        }
        Ok(audio)
    }
}

/// Seam the player decodes through. Anything that turns bytes into PCM fits.
pub trait AudioDecoder: Send + Sync + Debug {
    fn decode(&self, data: &[u8]) -> Result<DecodedAudio>;

    /// Asset duration when it is known before decoding.
    fn probe_duration(&self, _data: &[u8]) -> Option<Duration> {
        None
    }
}

pub(crate) fn invalid(reason: &'static str) -> Error {
    Error::Audio(AudioError::Codec(CodecError::InvalidData(reason)))
}
