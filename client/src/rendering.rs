//! Terminal drawing of received frames

use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{self, ClearType},
};
use shared::{FrameLayout, StateFrame};
use std::io::{self, Stdout, Write};

const WINNER_TEXT: &str = "WINNER!";

/// Screen lines for one frame: the grid rows, then the status line.
pub fn frame_lines(frame: &StateFrame, layout: FrameLayout) -> Vec<String> {
    match frame {
        StateFrame::GameOver => {
            let column = (layout.width() / 2).saturating_sub(WINNER_TEXT.len() / 2);
            let banner = format!("{:column$}{}", "", WINNER_TEXT, column = column);
            vec![banner; layout.height()]
        }
        StateFrame::Board { message, .. } => {
            let mut lines = frame.rows(layout);
            lines.push(message.clone().unwrap_or_default());
            lines
        }
    }
}

/// Owns the terminal while the client runs; restores it on drop.
pub struct Renderer {
    stdout: Stdout,
    layout: FrameLayout,
}

impl Renderer {
    pub fn new(layout: FrameLayout) -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

        let (columns, rows) = terminal::size()?;
        if (columns as usize) < layout.width() || (rows as usize) <= layout.height() {
            queue!(
                stdout,
                cursor::MoveTo(0, 0),
                Print("Your terminal window is too small to display the board"),
                cursor::MoveTo(0, 2),
                Print("Please resize it and restart this program"),
            )?;
            stdout.flush()?;
        }

        Ok(Self { stdout, layout })
    }

    pub fn draw(&mut self, frame: &StateFrame) -> io::Result<()> {
        queue!(self.stdout, terminal::Clear(ClearType::All))?;
        for (row, line) in frame_lines(frame, self.layout).iter().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, row as u16), Print(line))?;
        }
        self.stdout.flush()
    }

    /// Shown under the board when the connection misbehaves.
    pub fn draw_notice(&mut self, notice: &str) -> io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, self.layout.height() as u16),
            terminal::Clear(ClearType::CurrentLine),
            Print(notice),
        )?;
        self.stdout.flush()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, terminal::LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}
