use anyhow::Result;
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::Stdout;

use super::{ArtworkView, InfoDisplay};
use crate::artwork::Artwork;
use crate::identify::IdentificationResult;

/// The two-panel terminal surface. Each draw fully replaces the previous
/// frame; there is no render history.
pub struct TerminalDisplay<B: Backend> {
    terminal: Terminal<B>,
    owns_terminal: bool,
}

impl TerminalDisplay<CrosstermBackend<Stdout>> {
    /// Take over stdout: raw mode, alternate screen, hidden cursor. The
    /// terminal is restored on drop.
    pub fn stdout() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = std::io::stdout();
        execute!(out, EnterAlternateScreen, Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(out))?;
        Ok(Self {
            terminal,
            owns_terminal: true,
        })
    }
}

impl<B: Backend> TerminalDisplay<B> {
    /// Wrap an arbitrary backend without touching the real terminal. This is
    /// how tests drive the display against `TestBackend`.
    pub fn with_backend(backend: B) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            owns_terminal: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    fn canvas_style() -> Style {
        Style::default().bg(Color::Black).fg(Color::White)
    }
}

impl<B: Backend> InfoDisplay for TerminalDisplay<B> {
    fn render_blank(&mut self) -> Result<()> {
        self.terminal.draw(|frame| {
            let canvas = Block::default().style(Self::canvas_style());
            frame.render_widget(canvas, frame.size());
        })?;
        Ok(())
    }

    fn render_result(&mut self, info: &IdentificationResult, artwork: &Artwork) -> Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.size();
            let canvas = Block::default().style(Self::canvas_style());
            frame.render_widget(canvas, area);

            let panels = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);

            frame.render_widget(ArtworkView::new(&artwork.image), panels[0]);

            let lines = vec![
                Line::from(""),
                Line::from(""),
                Line::from(format!("Song: {}", info.song)),
                Line::from(""),
                Line::from(format!("Artist: {}", info.artist)),
                Line::from(""),
                Line::from(format!("Album: {}", info.album)),
            ];
            let panel = Paragraph::new(lines)
                .style(Self::canvas_style())
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title("Now Spinning")
                        .title_alignment(Alignment::Center)
                        .style(Self::canvas_style()),
                );
            frame.render_widget(panel, panels[1]);
        })?;
        Ok(())
    }
}

impl<B: Backend> Drop for TerminalDisplay<B> {
    fn drop(&mut self) {
        if self.owns_terminal {
            let _ = disable_raw_mode();
            let _ = execute!(std::io::stdout(), LeaveAlternateScreen, Show);
        }
    }
}
