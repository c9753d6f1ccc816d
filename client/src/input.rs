//! Maps key presses to commands for the server

use crossterm::event::KeyCode;
use shared::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Quit,
}

/// W/A/S/D and the arrow keys move; q or Esc quits. Everything else is ignored.
pub fn command_for_key(code: KeyCode) -> Option<Command> {
    let direction = match code {
        KeyCode::Char('w') | KeyCode::Up => Direction::Up,
        KeyCode::Char('a') | KeyCode::Left => Direction::Left,
        KeyCode::Char('s') | KeyCode::Down => Direction::Down,
        KeyCode::Char('d') | KeyCode::Right => Direction::Right,
        KeyCode::Char('q') | KeyCode::Esc => return Some(Command::Quit),
        _ => return None,
    };
    Some(Command::Move(direction))
}
