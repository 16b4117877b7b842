use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossbeam::channel::{Receiver, Sender, TryRecvError};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Commands sent from the tui to the player thread.
pub enum PlayerCommand {
    Load(PathBuf),
    Play,
    TogglePause,
    Stop,
    /// Absolute offset in seconds.
    Seek(f64),
    /// Slider value, 0..=100.
    SetVolume(u8),
}

/// Snapshots sent back from the player thread to the tui.
pub enum PlayerUpdate {
    Loaded {
        name: String,
        duration: f64,
    },
    Position {
        position: f64,
        duration: f64,
        playing: bool,
        paused: bool,
    },
    Error(String),
}

/// Maps a 0..=100 slider value to a sink gain.
pub fn volume_to_gain(volume: u8) -> f32 {
    f32::from(volume.min(100)) / 100.0
}

pub struct AudioPlayer {
    // playback stops when the stream handle is dropped
    _stream_handle: rodio::OutputStream,
    sink: rodio::Sink,
    current_track: Option<PathBuf>,
    paused: bool,
    // track length in seconds, 0.0 while no track is loaded or length is unknown
    duration: f64,
}

impl AudioPlayer {
    pub fn new() -> Result<Self> {
        let _stream_handle = rodio::OutputStreamBuilder::open_default_stream()?;
        let sink = rodio::Sink::connect_new(_stream_handle.mixer());
        Ok(Self {
            _stream_handle,
            sink,
            current_track: None,
            paused: false,
            duration: 0.0,
        })
    }

    /// Command loop. Emits one position snapshot per second while a track is
    /// playing and not paused, plus an immediate one after every command that
    /// moves the playhead.
    pub fn run(mut self, command_rx: Receiver<PlayerCommand>, update_tx: Sender<PlayerUpdate>) {
        let mut last_tick = Instant::now();
        let mut was_playing = false;
        loop {
            match command_rx.try_recv() {
                Ok(cmd) => {
                    self.handle_command(cmd, &update_tx);
                    last_tick = Instant::now();
                }
                // tui is gone, nothing left to do
                Err(TryRecvError::Disconnected) => return,
                Err(TryRecvError::Empty) => {}
            }

            let playing = self.is_playing();
            if playing && last_tick.elapsed() >= Duration::from_secs(1) {
                self.send_position(&update_tx);
                last_tick = Instant::now();
            }
            // the track ran out on its own
            if was_playing && !playing && self.sink.empty() {
                self.paused = false;
                self.send_position(&update_tx);
            }
            was_playing = playing;

            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn handle_command(&mut self, cmd: PlayerCommand, update_tx: &Sender<PlayerUpdate>) {
        match cmd {
            PlayerCommand::Load(path) => match self.load(&path) {
                Ok(()) => {
                    let name = path.file_name().map_or_else(
                        || path.display().to_string(),
                        |n| n.to_string_lossy().into_owned(),
                    );
                    let _ = update_tx.send(PlayerUpdate::Loaded {
                        name,
                        duration: self.duration,
                    });
                    self.send_position(update_tx);
                }
                Err(err) => {
                    let _ = update_tx
                        .send(PlayerUpdate::Error(format!("Could not load file: {err}")));
                }
            },
            PlayerCommand::Play => {
                if let Err(err) = self.play() {
                    let _ = update_tx
                        .send(PlayerUpdate::Error(format!("Could not play file: {err}")));
                }
                self.send_position(update_tx);
            }
            PlayerCommand::TogglePause => {
                self.toggle_pause();
                self.send_position(update_tx);
            }
            PlayerCommand::Stop => {
                self.stop();
                self.send_position(update_tx);
            }
            PlayerCommand::Seek(position) => {
                if let Err(err) = self.seek(position) {
                    let _ = update_tx.send(PlayerUpdate::Error(format!("Could not seek: {err}")));
                }
                self.send_position(update_tx);
            }
            PlayerCommand::SetVolume(volume) => {
                self.sink.set_volume(volume_to_gain(volume));
            }
        }
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let duration = probe_duration(path)?;
        let source = decode(path)?;

        // clear the sink and append the new file, but do not start it yet
        self.sink.stop();
        self.sink.clear();
        self.sink.append(source);
        self.sink.pause();

        self.current_track = Some(path.to_path_buf());
        self.paused = false;
        self.duration = duration;
        Ok(())
    }

    /// Restarts from the beginning, even while already playing.
    fn play(&mut self) -> Result<()> {
        let Some(path) = self.current_track.clone() else {
            return Ok(());
        };
        let source = decode(&path)?;
        self.sink.stop();
        self.sink.clear();
        self.sink.append(source);
        self.sink.play();
        self.paused = false;
        Ok(())
    }

    fn toggle_pause(&mut self) {
        if self.current_track.is_none() {
            return;
        }
        if self.is_playing() {
            self.sink.pause();
            self.paused = true;
        } else if self.paused {
            self.sink.play();
            self.paused = false;
        }
    }

    fn stop(&mut self) {
        if self.current_track.is_none() {
            return;
        }
        self.sink.stop();
        self.sink.clear();
        self.paused = false;
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        if self.current_track.is_none() || self.sink.empty() {
            return Ok(());
        }
        let position = position.clamp(0.0, self.duration);
        self.sink
            .try_seek(Duration::from_secs_f64(position))
            .map_err(|err| eyre!("{err}"))
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty() && !self.sink.is_paused()
    }

    fn position(&self) -> f64 {
        if self.sink.empty() {
            0.0
        } else {
            self.sink.get_pos().as_secs_f64()
        }
    }

    fn send_position(&self, update_tx: &Sender<PlayerUpdate>) {
        let _ = update_tx.send(PlayerUpdate::Position {
            position: self.position(),
            duration: self.duration,
            playing: self.is_playing(),
            paused: self.paused,
        });
    }
}

fn decode(path: &Path) -> Result<rodio::Decoder<std::io::BufReader<File>>> {
    let file = File::open(path)?;
    Ok(rodio::Decoder::try_from(file)?)
}

/// Probes the file with symphonia to learn the total track length in seconds.
/// Returns 0.0 when the container does not report one.
fn probe_duration(path: &Path) -> Result<f64> {
    // Open the media source.
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    // Create a probe hint using the file's extension.
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    // Use the default options for metadata and format readers.
    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    // Probe the media source.
    let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
    let format = probed.format;

    // Find the first audio track with a known (decodeable) codec.
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| eyre!("No supported audio tracks found"))?;

    let params = &track.codec_params;
    match (params.time_base, params.n_frames) {
        (Some(time_base), Some(n_frames)) => {
            let time = time_base.calc_time(n_frames);
            Ok(time.seconds as f64 + time.frac)
        }
        _ => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::volume_to_gain;

    #[test]
    fn volume_maps_linearly() {
        assert_eq!(volume_to_gain(0), 0.0);
        assert_eq!(volume_to_gain(50), 0.5);
        assert_eq!(volume_to_gain(100), 1.0);
        assert_eq!(volume_to_gain(25), 0.25);
    }

    #[test]
    fn volume_above_range_is_clamped() {
        assert_eq!(volume_to_gain(101), 1.0);
        assert_eq!(volume_to_gain(u8::MAX), 1.0);
    }
}
