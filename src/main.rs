mod audio_player;
mod builtin_themes;
mod config;
mod tui;

use std::thread;

use color_eyre::Result;
use crossbeam::channel::{bounded, unbounded};

use crate::audio_player::{AudioPlayer, PlayerCommand, PlayerUpdate};
use crate::config::Config;

fn main() -> Result<()> {
    color_eyre::install()?;

    // a broken config is not fatal, report it and fall back to defaults
    let (config, config_warning) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(format!("Bad config file: {err}"))),
    };

    // tui sends transport commands, the player answers with snapshots
    let (command_tx, command_rx) = bounded::<PlayerCommand>(1);
    let (update_tx, update_rx) = unbounded::<PlayerUpdate>();

    // the output stream lives on the player thread
    thread::spawn(move || match AudioPlayer::new() {
        Ok(player) => player.run(command_rx, update_tx),
        Err(err) => {
            let _ = update_tx.send(PlayerUpdate::Error(format!("No audio output: {err}")));
        }
    });

    tui::run(config, config_warning, command_tx, update_rx)
}
