use std::fmt;
use std::time::Duration;

use color_eyre::Result;
use crossbeam::channel::{Receiver, Sender};
use ratatui::{
    DefaultTerminal,
    crossterm::event::{Event, KeyCode, KeyEventKind, poll, read},
    layout::Flex,
    prelude::*,
    widgets::{Block, Clear, FrameExt, Gauge, LineGauge, Paragraph, Wrap},
};
use ratatui_explorer::FileExplorer;

use crate::audio_player::{PlayerCommand, PlayerUpdate};
use crate::config::Config;

/// Extensions the player hands to the decoder.
const SUPPORTED_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

const SEEK_STEP_SECS: f64 = 5.0;
const VOLUME_STEP: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnsupportedFile(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedFile(path) => {
                write!(f, "Not an mp3/wav/ogg file: {path}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Colors shared by every widget of one screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            highlight: Color::Cyan,
        }
    }
}

struct App {
    explorer: FileExplorer,
    command_tx: Sender<PlayerCommand>,
    update_rx: Receiver<PlayerUpdate>,
    theme: Theme,
    show_explorer: bool,
    error: Option<String>,
    track_name: Option<String>,
    // mirror of the last snapshot from the player thread
    position: f64,
    duration: f64,
    playing: bool,
    paused: bool,
    volume: u8,
}

impl App {
    fn new(
        explorer: FileExplorer,
        command_tx: Sender<PlayerCommand>,
        update_rx: Receiver<PlayerUpdate>,
        theme: Theme,
        volume: u8,
    ) -> Self {
        Self {
            explorer,
            command_tx,
            update_rx,
            theme,
            show_explorer: false,
            error: None,
            track_name: None,
            position: 0.0,
            duration: 0.0,
            playing: false,
            paused: false,
            volume,
        }
    }

    fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        // the slider starts at the configured value, the sink has to match it
        self.send(PlayerCommand::SetVolume(self.volume));

        loop {
            terminal.draw(|f| self.draw(f))?;

            // drain snapshots from the player thread
            while let Ok(update) = self.update_rx.try_recv() {
                self.apply_update(update);
            }

            // event reader
            if poll(Duration::from_millis(100))? {
                let event = read()?;
                if let Event::Key(key) = &event {
                    if key.kind == KeyEventKind::Press && !self.handle_key(key.code) {
                        return Ok(());
                    }
                }
                if self.show_explorer && self.error.is_none() {
                    self.explorer.handle(&event)?;
                }
            }
        }
    }

    fn apply_update(&mut self, update: PlayerUpdate) {
        match update {
            PlayerUpdate::Loaded { name, duration } => {
                self.track_name = Some(name);
                self.duration = duration;
                self.position = 0.0;
            }
            PlayerUpdate::Position {
                position,
                duration,
                playing,
                paused,
            } => {
                self.position = position;
                self.duration = duration;
                self.playing = playing;
                self.paused = paused;
            }
            PlayerUpdate::Error(message) => {
                self.show_explorer = false;
                self.error = Some(message);
            }
        }
    }

    /// Returns `false` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        // a modal error eats every key
        if self.error.is_some() {
            self.error = None;
            return true;
        }
        // the explorer is modal too: while it is open, everything except
        // quit/close/select belongs to the explorer, not to the transport
        if self.show_explorer {
            match code {
                KeyCode::Char('q') => return false,
                KeyCode::Char('o') | KeyCode::Esc => self.show_explorer = false,
                KeyCode::Enter => self.select_file(),
                _ => (),
            }
            return true;
        }
        match code {
            KeyCode::Char('q') => return false,
            KeyCode::Char('o') => self.show_explorer = true,
            KeyCode::Char('p') => self.send(PlayerCommand::Play),
            KeyCode::Char(' ') => self.send(PlayerCommand::TogglePause),
            KeyCode::Char('s') => self.send(PlayerCommand::Stop),
            KeyCode::Left => self.seek_by(-SEEK_STEP_SECS),
            KeyCode::Right => self.seek_by(SEEK_STEP_SECS),
            KeyCode::Up => self.change_volume(VOLUME_STEP as i16),
            KeyCode::Down => self.change_volume(-(VOLUME_STEP as i16)),
            _ => (),
        }
        true
    }

    fn select_file(&mut self) {
        let file = self.explorer.current();
        if !file.is_file() {
            return;
        }
        let path = file.path().to_path_buf();
        if !is_supported(&path) {
            self.show_explorer = false;
            self.error = Some(Error::UnsupportedFile(path.display().to_string()).to_string());
            return;
        }
        self.show_explorer = false;
        self.send(PlayerCommand::Load(path));
    }

    // the slider is inert until a track with a known length is loaded;
    // the readout only moves when a snapshot confirms the new position
    fn seek_by(&mut self, delta: f64) {
        if self.duration <= 0.0 {
            return;
        }
        let target = (self.position + delta).clamp(0.0, self.duration);
        self.send(PlayerCommand::Seek(target));
    }

    fn change_volume(&mut self, delta: i16) {
        self.volume = (i16::from(self.volume) + delta).clamp(0, 100) as u8;
        self.send(PlayerCommand::SetVolume(self.volume));
    }

    fn send(&mut self, cmd: PlayerCommand) {
        if self.command_tx.send(cmd).is_err() {
            self.error = Some("Player thread is gone".to_string());
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        f.render_widget(
            Block::default().style(
                Style::default()
                    .bg(self.theme.background)
                    .fg(self.theme.foreground),
            ),
            area,
        );

        let [column] = Layout::horizontal([Constraint::Max(70)])
            .flex(Flex::Center)
            .areas(area);
        let [track, state, progress, volume, time, help] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .flex(Flex::Center)
        .areas(column);

        let track_line = self.track_name.as_deref().unwrap_or("No track loaded");
        f.render_widget(Paragraph::new(track_line).bold().centered(), track);
        f.render_widget(Paragraph::new(self.state_line()).centered(), state);

        self.render_progress(f, progress);
        self.render_volume(f, volume);

        let time_line = format!(
            "{} / {}",
            format_time(self.position),
            format_time(self.duration)
        );
        f.render_widget(Paragraph::new(time_line).centered(), time);
        f.render_widget(
            Paragraph::new("o open  p play  space pause  s stop  ←/→ seek  ↑/↓ volume  q quit")
                .dim()
                .centered(),
            help,
        );

        // render explorer
        if self.show_explorer {
            let area = Self::popup_area(area, 50, 70);
            f.render_widget(Clear, area);
            f.render_widget_ref(self.explorer.widget(), area);
        }

        // modal error popup on top of everything
        if let Some(message) = &self.error {
            let area = Self::popup_area(area, 50, 30);
            f.render_widget(Clear, area);
            f.render_widget(
                Paragraph::new(message.as_str())
                    .wrap(Wrap { trim: true })
                    .centered()
                    .block(
                        Block::bordered()
                            .title(" Error ")
                            .title_bottom(" press any key "),
                    )
                    .style(Style::default().fg(Color::Red)),
                area,
            );
        }
    }

    fn state_line(&self) -> &'static str {
        if self.playing {
            "Playing"
        } else if self.paused {
            "Paused"
        } else if self.track_name.is_some() {
            "Stopped"
        } else {
            ""
        }
    }

    fn render_progress(&self, f: &mut Frame, area: Rect) {
        let ratio = if self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let style = if self.duration > 0.0 {
            Style::default().fg(self.theme.highlight)
        } else {
            Style::default().fg(self.theme.foreground).dim()
        };
        f.render_widget(
            Gauge::default()
                .block(Block::bordered())
                .gauge_style(style)
                .label(format_time(self.position))
                .ratio(ratio),
            area,
        );
    }

    fn render_volume(&self, f: &mut Frame, area: Rect) {
        f.render_widget(
            LineGauge::default()
                .label(format!("Volume {:3}%", self.volume))
                .filled_style(Style::default().fg(self.theme.highlight))
                .unfilled_style(Style::default().fg(self.theme.foreground).dim())
                .ratio(f64::from(self.volume) / 100.0),
            area,
        );
    }

    fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
        let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
        let [area] = vertical.areas(area);
        let [area] = horizontal.areas(area);
        area
    }
}

// Both warnings can be present at once (broken config file and an unknown
// theme name); neither may swallow the other.
fn combine_warnings(first: Option<String>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(first), Some(second)) => Some(format!("{first}\n{second}")),
        (first, second) => first.or(second),
    }
}

/// Formats a second count as zero-padded minutes:seconds.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn is_supported(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

pub fn run(
    config: Config,
    startup_warning: Option<String>,
    command_tx: Sender<PlayerCommand>,
    update_rx: Receiver<PlayerUpdate>,
) -> Result<()> {
    let (theme, theme_warning) = match crate::builtin_themes::get_by_name(&config.theme) {
        Some(theme) => (theme, None),
        None => (
            Theme::default(),
            Some(format!("Unknown theme: {}", config.theme)),
        ),
    };

    let terminal = ratatui::init();
    let explorer_theme = ratatui_explorer::Theme::default()
        .add_default_title()
        .with_item_style(Style::default().fg(theme.foreground))
        .with_highlight_item_style(Style::default().fg(theme.highlight));
    let file_explorer = FileExplorer::with_theme(explorer_theme)?;

    let mut app = App::new(
        file_explorer,
        command_tx,
        update_rx,
        theme,
        config.volume(),
    );
    app.error = combine_warnings(startup_warning, theme_warning);
    let app_result = app.run(terminal);
    ratatui::restore();
    app_result
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crossbeam::channel::{Receiver, bounded, unbounded};
    use ratatui::crossterm::event::KeyCode;
    use ratatui_explorer::FileExplorer;

    use super::{App, Theme, combine_warnings, format_time, is_supported};
    use crate::audio_player::PlayerCommand;

    fn test_app() -> (App, Receiver<PlayerCommand>) {
        let (command_tx, command_rx) = bounded(8);
        let (_, update_rx) = unbounded();
        let explorer = FileExplorer::new().unwrap();
        let app = App::new(explorer, command_tx, update_rx, Theme::default(), 50);
        (app, command_rx)
    }

    #[test]
    fn open_explorer_makes_transport_keys_inert() {
        let (mut app, command_rx) = test_app();
        assert!(app.handle_key(KeyCode::Char('o')));
        assert!(app.show_explorer);

        // explorer navigation keys must not touch volume, seek or transport
        for code in [
            KeyCode::Up,
            KeyCode::Down,
            KeyCode::Left,
            KeyCode::Right,
            KeyCode::Char('p'),
            KeyCode::Char(' '),
            KeyCode::Char('s'),
        ] {
            assert!(app.handle_key(code));
        }
        assert!(command_rx.try_recv().is_err());
        assert_eq!(app.volume, 50);
        assert!(app.show_explorer);
    }

    #[test]
    fn explorer_closes_on_esc_and_o() {
        let (mut app, _command_rx) = test_app();
        app.show_explorer = true;
        assert!(app.handle_key(KeyCode::Esc));
        assert!(!app.show_explorer);
        app.show_explorer = true;
        assert!(app.handle_key(KeyCode::Char('o')));
        assert!(!app.show_explorer);
    }

    #[test]
    fn quit_works_while_explorer_is_open() {
        let (mut app, _command_rx) = test_app();
        app.show_explorer = true;
        assert!(!app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn seek_keys_send_a_command_but_leave_the_readout_alone() {
        let (mut app, command_rx) = test_app();
        app.duration = 125.0;
        app.position = 10.0;

        assert!(app.handle_key(KeyCode::Right));
        assert!(matches!(
            command_rx.try_recv(),
            Ok(PlayerCommand::Seek(target)) if target == 15.0
        ));
        // the position only moves once a snapshot confirms it
        assert_eq!(app.position, 10.0);
    }

    #[test]
    fn seek_is_inert_without_a_known_length() {
        let (mut app, command_rx) = test_app();
        assert!(app.handle_key(KeyCode::Left));
        assert!(app.handle_key(KeyCode::Right));
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn warnings_are_stacked_not_swallowed() {
        assert_eq!(combine_warnings(None, None), None);
        assert_eq!(
            combine_warnings(Some("bad config".into()), None),
            Some("bad config".into())
        );
        assert_eq!(
            combine_warnings(None, Some("unknown theme".into())),
            Some("unknown theme".into())
        );
        assert_eq!(
            combine_warnings(Some("bad config".into()), Some("unknown theme".into())),
            Some("bad config\nunknown theme".into())
        );
    }

    #[test]
    fn format_time_zero_pads() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(5.0), "00:05");
        assert_eq!(format_time(59.0), "00:59");
    }

    #[test]
    fn format_time_carries_minutes() {
        assert_eq!(format_time(60.0), "01:00");
        assert_eq!(format_time(125.0), "02:05");
        assert_eq!(format_time(3599.0), "59:59");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn format_time_ignores_fraction_and_sign() {
        assert_eq!(format_time(125.9), "02:05");
        assert_eq!(format_time(-3.0), "00:00");
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported(Path::new("song.mp3")));
        assert!(is_supported(Path::new("song.WAV")));
        assert!(is_supported(Path::new("/tmp/some dir/song.Ogg")));
        assert!(!is_supported(Path::new("song.flac")));
        assert!(!is_supported(Path::new("song")));
        assert!(!is_supported(Path::new("mp3")));
    }
}
