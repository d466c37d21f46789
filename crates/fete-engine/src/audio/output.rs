//! Platform audio seam.
//!
//! The engine core never opens a device itself. Playback goes through the
//! `AudioOutput` trait; the default backend is rodio (feature
//! `rodio-output`), and `NullOutput` stands in when no device exists so
//! every audio path degrades to silence instead of failing.

use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::assets::cache::AudioBuffer;

/// Errors from starting playback. Callers log these; they never propagate
/// past the playback manager.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("failed to decode media data: {0}")]
    Decode(String),
    #[error("failed to start playback: {0}")]
    Output(String),
}

/// One playback start: which buffer, how loud, looping or one-shot.
pub struct PlayRequest<'a> {
    pub buffer: &'a AudioBuffer,
    pub volume: f32,
    pub looped: bool,
}

/// A live playback instance. Dropping the handle releases the underlying
/// voice, so the playback manager keeps handles alive until they finish.
pub trait TrackHandle {
    /// Stop immediately: pause and reset position to zero.
    fn stop(&self);
    /// Whether playback has run to completion (or was stopped).
    fn is_finished(&self) -> bool;
}

/// Audio backend contract.
pub trait AudioOutput {
    /// Backend identifier (e.g., "rodio", "null").
    fn backend(&self) -> &'static str;

    /// Start playing a buffer. Returns a handle controlling the instance.
    fn play(&self, request: &PlayRequest<'_>) -> Result<Box<dyn TrackHandle>, PlaybackError>;
}

/// Silent backend: accepts every request and produces no sound.
#[derive(Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn backend(&self) -> &'static str {
        "null"
    }

    fn play(&self, _request: &PlayRequest<'_>) -> Result<Box<dyn TrackHandle>, PlaybackError> {
        Ok(Box::new(NullHandle::default()))
    }
}

#[derive(Debug, Default)]
struct NullHandle {
    stopped: AtomicBool,
}

impl TrackHandle for NullHandle {
    fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    fn is_finished(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

/// The best available backend: rodio on the default device when the
/// feature is enabled and a device exists, the silent backend otherwise.
pub fn default_output() -> Box<dyn AudioOutput> {
    #[cfg(feature = "rodio-output")]
    {
        match RodioOutput::try_default() {
            Ok(output) => return Box::new(output),
            Err(e) => log::warn!("no audio device ({e}), running silent"),
        }
    }
    Box::new(NullOutput)
}

#[cfg(feature = "rodio-output")]
pub use rodio_backend::RodioOutput;

#[cfg(feature = "rodio-output")]
mod rodio_backend {
    use super::{AudioOutput, PlayRequest, PlaybackError, TrackHandle};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    /// Rodio-backed output: one `Sink` per playback instance.
    pub struct RodioOutput {
        // Keeps the device stream alive for the lifetime of the output.
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl RodioOutput {
        /// Open the default output device.
        pub fn try_default() -> Result<Self, PlaybackError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|_| PlaybackError::NoDevice)?;
            Ok(Self {
                _stream: stream,
                handle,
            })
        }
    }

    impl AudioOutput for RodioOutput {
        fn backend(&self) -> &'static str {
            "rodio"
        }

        fn play(
            &self,
            request: &PlayRequest<'_>,
        ) -> Result<Box<dyn TrackHandle>, PlaybackError> {
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| PlaybackError::Output(e.to_string()))?;
            let source = Decoder::new(request.buffer.reader())
                .map_err(|e| PlaybackError::Decode(e.to_string()))?;

            sink.set_volume(request.volume);
            if request.looped {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }

            Ok(Box::new(RodioHandle { sink }))
        }
    }

    struct RodioHandle {
        sink: Sink,
    }

    impl TrackHandle for RodioHandle {
        fn stop(&self) {
            self.sink.stop();
        }

        fn is_finished(&self) -> bool {
            self.sink.empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::cache::AudioBuffer;

    #[test]
    fn null_output_always_plays() {
        let output = NullOutput;
        let buffer = AudioBuffer::new("click", vec![0; 16]);
        let handle = output
            .play(&PlayRequest {
                buffer: &buffer,
                volume: 0.5,
                looped: false,
            })
            .unwrap();
        assert!(!handle.is_finished());
        handle.stop();
        assert!(handle.is_finished());
    }
}
