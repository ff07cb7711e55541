pub mod codec;
pub mod decoded;
pub mod profile;
pub mod source;

pub use decoded::DecodedAudio;
pub use profile::{compute_amplitude_profile, AmplitudeProfile, BUCKET_COUNT};
pub use source::AudioSource;
