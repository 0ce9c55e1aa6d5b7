// Sound cues for correct and wrong answers
// Audio is optional: any failure while loading leaves the player silent

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::xtq_config::Config;
use crate::xtq_error::Result;

pub const CORRECT_FILE: &str = "correct.wav";
pub const WRONG_FILE: &str = "wrong.wav";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Wrong,
}

/// An encoded sound kept in memory and decoded on each play
struct Clip {
    bytes: Arc<[u8]>,
    volume: f32,
}

impl Clip {
    fn load(path: &Path, volume: f32) -> Result<Clip> {
        let bytes: Arc<[u8]> = fs::read(path)?.into();
        // decode once up front so a broken file disables audio at startup
        Decoder::new(Cursor::new(bytes.clone()))?;
        Ok(Clip { bytes, volume })
    }
}

struct Output {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    correct: Clip,
    wrong: Clip,
}

/// Fire-and-forget cue player
pub struct Sounds {
    output: Option<Output>,
}

impl Sounds {
    /// A player that never makes a sound
    pub fn disabled() -> Self {
        Sounds { output: None }
    }

    /// Open the default output device and load both cues from `cfg.sounds_dir`
    pub fn load(cfg: &Config) -> Self {
        if !cfg.sound {
            info!("sound disabled by config");
            return Sounds::disabled();
        }
        match Sounds::try_load(cfg) {
            Ok(output) => {
                info!(dir = %cfg.sounds_dir.display(), "sound cues loaded");
                Sounds { output: Some(output) }
            }
            Err(e) => {
                warn!(error = %e, dir = %cfg.sounds_dir.display(), "audio unavailable, continuing without sound");
                Sounds::disabled()
            }
        }
    }

    fn try_load(cfg: &Config) -> Result<Output> {
        let correct = Clip::load(&cfg.sounds_dir.join(CORRECT_FILE), cfg.correct_volume)?;
        let wrong = Clip::load(&cfg.sounds_dir.join(WRONG_FILE), cfg.wrong_volume)?;
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Output {
            _stream: stream,
            handle,
            correct,
            wrong,
        })
    }

    pub fn enabled(&self) -> bool {
        self.output.is_some()
    }

    /// Start a cue and return immediately; playback errors are only logged
    pub fn play(&self, cue: Cue) {
        let Some(out) = &self.output else {
            return;
        };
        let clip = match cue {
            Cue::Correct => &out.correct,
            Cue::Wrong => &out.wrong,
        };
        if let Err(e) = play_clip(&out.handle, clip) {
            debug!(error = %e, ?cue, "cue playback failed");
        }
    }
}

fn play_clip(handle: &OutputStreamHandle, clip: &Clip) -> Result<()> {
    let sink = Sink::try_new(handle)?;
    sink.set_volume(clip.volume);
    sink.append(Decoder::new(Cursor::new(clip.bytes.clone()))?);
    sink.detach();
    Ok(())
}
