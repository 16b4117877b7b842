//! Counter demo: a big readout and one increment action.

use color_eyre::Result;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{Event, KeyCode, KeyEventKind, read},
    layout::Flex,
    prelude::*,
    widgets::Paragraph,
};
use tui_big_text::{BigText, PixelSize};

#[derive(Debug, Default)]
struct Counter {
    count: u64,
}

impl Counter {
    fn increment(&mut self) {
        self.count += 1;
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let terminal = ratatui::init();
    let app_result = run(terminal);
    ratatui::restore();
    app_result
}

fn run(mut terminal: DefaultTerminal) -> Result<()> {
    let mut counter = Counter::default();
    loop {
        terminal.draw(|f| draw(f, &counter))?;

        // no timers here, blocking on the next key is enough
        if let Event::Key(key) = read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char(' ') | KeyCode::Char('+') | KeyCode::Enter => counter.increment(),
                _ => (),
            }
        }
    }
}

fn draw(f: &mut Frame, counter: &Counter) {
    let area = f.area();
    let [label, readout, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(8),
        Constraint::Length(1),
    ])
    .flex(Flex::Center)
    .areas(area);

    f.render_widget(
        Paragraph::new(format!("Count: {}", counter.count)).centered(),
        label,
    );

    let digits = BigText::builder()
        .pixel_size(PixelSize::Full)
        .style(Style::default().fg(Color::Cyan))
        .lines(vec![counter.count.to_string().into()])
        .alignment(Alignment::Center)
        .build();
    f.render_widget(digits, readout);

    f.render_widget(
        Paragraph::new("space/enter/+ increment  q quit")
            .dim()
            .centered(),
        help,
    );
}

#[cfg(test)]
mod tests {
    use super::Counter;

    #[test]
    fn starts_at_zero() {
        assert_eq!(Counter::default().count, 0);
    }

    #[test]
    fn increments_by_exactly_one() {
        let mut counter = Counter::default();
        counter.increment();
        assert_eq!(counter.count, 1);
        counter.increment();
        assert_eq!(counter.count, 2);
    }

    #[test]
    fn never_decreases() {
        let mut counter = Counter::default();
        let mut last = counter.count;
        for _ in 0..1000 {
            counter.increment();
            assert!(counter.count > last);
            last = counter.count;
        }
    }
}
