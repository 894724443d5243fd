//! Bridge between the game thread and the background audio thread.
//!
//! Use [`setup_audio`] once during initialization to spawn the audio thread
//! and obtain an [`AudioBridge`]. Call [`shutdown_audio`] during teardown to
//! stop the thread and join it.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::error;

use crate::error::EngineError;
use crate::events::audio::{AudioCmd, AudioMessage};
use crate::systems::audio::audio_thread;

/// Channels to and from the audio thread, plus its join handle.
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (game -> audio thread).
    pub tx_cmd: Sender<AudioCmd>,
    /// Receiver for [`AudioMessage`] messages (audio thread -> game).
    pub rx_msg: Receiver<AudioMessage>,
    /// Join handle for the background audio thread.
    pub handle: std::thread::JoinHandle<()>,
}

impl AudioBridge {
    /// Drain every message the audio thread has sent so far.
    pub fn poll_messages(&self) -> Vec<AudioMessage> {
        self.rx_msg.try_iter().collect()
    }
}

/// Spawn the audio thread and return the bridge to it.
pub fn setup_audio() -> AudioBridge {
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let (tx_msg, rx_msg) = unbounded::<AudioMessage>();

    let handle = std::thread::spawn(move || audio_thread(rx_cmd, tx_msg));

    AudioBridge {
        tx_cmd,
        rx_msg,
        handle,
    }
}

/// Ask the audio thread to stop and wait for it to exit.
pub fn shutdown_audio(bridge: AudioBridge) -> Result<(), EngineError> {
    let sent = bridge.tx_cmd.send(AudioCmd::Shutdown);
    if bridge.handle.join().is_err() {
        error!("Audio thread panicked");
    }
    sent.map_err(|_| EngineError::AudioDisconnected)
}
