use crate::error::AppError;

/// Where played-back speech goes. Loading a clip releases the previous one.
pub trait AudioOutput: Send {
    fn play(&mut self, audio: Vec<u8>) -> Result<(), AppError>;

    fn stop(&mut self);

    /// Blocks until the loaded clip has finished.
    fn wait_until_done(&self) {}
}

/// Output for builds or hosts without a sound device.
#[derive(Debug, Default)]
pub struct MutedOutput;

impl AudioOutput for MutedOutput {
    fn play(&mut self, _audio: Vec<u8>) -> Result<(), AppError> {
        Err(AppError::Playback(
            "audio playback is not available; use --download instead".into(),
        ))
    }

    fn stop(&mut self) {}
}

#[cfg(feature = "audio-playback")]
pub use rodio_output::RodioOutput;

#[cfg(feature = "audio-playback")]
mod rodio_output {
    use std::io::Cursor;
    use std::sync::mpsc;
    use std::thread;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::AudioOutput;
    use crate::error::AppError;

    /// Plays clips on the default output device. The device stream lives on
    /// its own thread for as long as this value exists.
    pub struct RodioOutput {
        handle: OutputStreamHandle,
        current: Option<Sink>,
        _keepalive: mpsc::Sender<()>,
    }

    impl RodioOutput {
        pub fn open() -> Result<Self, AppError> {
            let (handle_tx, handle_rx) = mpsc::channel();
            let (keepalive, shutdown) = mpsc::channel::<()>();

            thread::Builder::new()
                .name("audio-output".into())
                .spawn(move || match OutputStream::try_default() {
                    Ok((stream, handle)) => {
                        let _ = handle_tx.send(Ok(handle));
                        // Returns once the owning RodioOutput is dropped.
                        let _ = shutdown.recv();
                        drop(stream);
                    }
                    Err(e) => {
                        let _ = handle_tx.send(Err(e.to_string()));
                    }
                })?;

            let handle = handle_rx
                .recv()
                .map_err(|_| AppError::Playback("audio thread exited early".into()))?
                .map_err(|e| AppError::Playback(format!("No audio device: {}", e)))?;

            Ok(Self {
                handle,
                current: None,
                _keepalive: keepalive,
            })
        }
    }

    impl AudioOutput for RodioOutput {
        fn play(&mut self, audio: Vec<u8>) -> Result<(), AppError> {
            self.stop();

            let source = Decoder::new(Cursor::new(audio))
                .map_err(|e| AppError::Playback(format!("Failed to decode audio: {}", e)))?;
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| AppError::Playback(format!("Failed to open sink: {}", e)))?;
            sink.append(source);
            sink.play();

            self.current = Some(sink);
            Ok(())
        }

        fn stop(&mut self) {
            if let Some(previous) = self.current.take() {
                previous.stop();
                tracing::debug!("Released previous clip");
            }
        }

        fn wait_until_done(&self) {
            if let Some(sink) = &self.current {
                sink.sleep_until_end();
            }
        }
    }
}
