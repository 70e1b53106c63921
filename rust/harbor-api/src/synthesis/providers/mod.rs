//! Synthesis provider driver implementations.

pub mod elevenlabs;

pub use elevenlabs::ElevenLabsDriver;
