//! Media provider implementations for Storyreel.
//!
//! - [`OpenAiImageProvider`]: visuals from the OpenAI image generation API
//! - [`ElevenLabsNarrationProvider`]: narration from the ElevenLabs
//!   text-to-speech API
//! - [`FakeVisualProvider`] / [`FakeNarrationProvider`]: deterministic
//!   providers with injectable failures, latency and missing configuration
//!
//! Live providers store the bytes they receive in a
//! [`MediaStorage`](storyreel_storage::MediaStorage) and return its reference.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod elevenlabs;
mod fake;
mod http;
mod openai;

pub use elevenlabs::{ELEVENLABS_API_KEY_VAR, ElevenLabsConfig, ElevenLabsNarrationProvider};
pub use fake::{FakeBehavior, FakeNarrationProvider, FakeVisualProvider};
pub use openai::{OPENAI_API_KEY_VAR, OpenAiImageConfig, OpenAiImageProvider};
