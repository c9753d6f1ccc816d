//! Client network loop: receives frames, forwards key presses

use crate::input::{command_for_key, Command};
use crate::rendering::Renderer;
use crossterm::event::{self, Event, KeyEventKind};
use log::{info, warn};
use shared::{Direction, FrameError, FrameLayout, StateFrame};
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("bad frame from server: {0}")]
    Frame(#[from] FrameError),
}

/// Reads exactly one payload. Returns None when the server closed the connection.
pub async fn read_frame<R>(reader: &mut R, layout: FrameLayout) -> Result<Option<StateFrame>, ClientError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; layout.frame_len()];
    match reader.read_exact(&mut buffer).await {
        Ok(_) => Ok(Some(StateFrame::decode(&buffer, layout)?)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Bytes sent for one move: the direction token and a newline terminator
pub fn move_line(direction: Direction) -> Vec<u8> {
    format!("{}\n", direction.token()).into_bytes()
}

pub struct Client {
    stream: TcpStream,
    layout: FrameLayout,
}

impl Client {
    pub async fn connect(server_addr: &str, layout: FrameLayout) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(server_addr).await?;
        // Key presses are tiny writes; send each one immediately
        stream.set_nodelay(true)?;
        info!("Connected to {}", server_addr);
        Ok(Client { stream, layout })
    }

    pub async fn run(self) -> Result<(), ClientError> {
        let layout = self.layout;
        let (mut reader, mut writer) = self.stream.into_split();
        let mut renderer = Renderer::new(layout)?;

        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            loop {
                match read_frame(&mut reader, layout).await {
                    Ok(Some(frame)) => {
                        if frame_tx.send(Ok(frame)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = frame_tx.send(Err(e));
                        break;
                    }
                }
            }
        });

        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || loop {
            match event::poll(INPUT_POLL_INTERVAL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(_) => break,
            }
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = command_for_key(key.code) {
                if command_tx.send(command).is_err() || command == Command::Quit {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                frame = frame_rx.recv() => match frame {
                    Some(Ok(frame)) => renderer.draw(&frame)?,
                    Some(Err(e)) => {
                        warn!("Error while receiving data from server: {}", e);
                        renderer.draw_notice("Error while receiving data from server")?;
                    }
                    None => {
                        info!("Server closed the connection");
                        break;
                    }
                },
                command = command_rx.recv() => match command {
                    Some(Command::Move(direction)) => {
                        writer.write_all(&move_line(direction)).await?;
                    }
                    Some(Command::Quit) | None => break,
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Cell;
    use tokio_test::io::Builder;

    #[test]
    fn test_move_line_is_newline_terminated() {
        assert_eq!(move_line(Direction::Right), b"right\n".to_vec());
        assert_eq!(move_line(Direction::Up), b"up\n".to_vec());
    }

    #[tokio::test]
    async fn test_read_frame_across_partial_reads() {
        let layout = FrameLayout::new(2, 1).unwrap();
        let mut reader = Builder::new().read(b"#").read(b"1").read(b"ok").build();

        let frame = read_frame(&mut reader, layout).await.unwrap();

        assert_eq!(
            frame,
            Some(StateFrame::Board {
                cells: vec![Cell::Wall, Cell::Player(shared::PlayerId::One)],
                message: Some("ok".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_read_frame_game_over() {
        let layout = FrameLayout::new(2, 1).unwrap();
        let mut reader = Builder::new().read(b"WWWW").build();

        let frame = read_frame(&mut reader, layout).await.unwrap();
        assert_eq!(frame, Some(StateFrame::GameOver));
    }

    #[tokio::test]
    async fn test_read_frame_eof() {
        let layout = FrameLayout::new(2, 1).unwrap();
        let mut reader = Builder::new().read(b"#").build();

        let frame = read_frame(&mut reader, layout).await.unwrap();
        assert_eq!(frame, None);
    }

    #[tokio::test]
    async fn test_read_frame_rejects_garbage() {
        let layout = FrameLayout::new(2, 1).unwrap();
        let mut reader = Builder::new().read(b"#?@@").build();

        let result = read_frame(&mut reader, layout).await;
        assert!(matches!(result, Err(ClientError::Frame(FrameError::UnknownSymbol { offset: 1, .. }))));
    }
}
