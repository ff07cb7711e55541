pub mod factory;
pub mod probe;
pub mod traits;

mod wav;

pub use factory::{CodecFactory, ProbingDecoder, CODEC_FACTORY};
pub use probe::SymphoniaCodec;
pub use traits::{AudioDecoder, Codec, CodecImpl};
pub use wav::WavCodec;
