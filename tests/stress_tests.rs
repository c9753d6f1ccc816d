//! Stress tests for board generation and turn serialization

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use server::broadcast::Broadcaster;
use server::coordinator::TurnCoordinator;
use server::generator::{PuzzleGenerator, SPAWNS};
use server::registry::SessionRegistry;
use shared::{Cell, Direction, FrameLayout, PlayerId, StateFrame};
use std::sync::Arc;
use std::time::Instant;

/// Generates many seeded boards and checks every structural invariant
#[test]
fn stress_seeded_generation() {
    let generator = PuzzleGenerator::new(80, 30);
    let layout = FrameLayout::default();
    let iterations = 200;
    let start = Instant::now();

    for seed in 0..iterations {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = generator.initialize(&mut rng).unwrap();
        let StateFrame::Board { cells, message } = state.snapshot() else {
            panic!("Fresh game reported a winner");
        };

        assert_eq!(message, None);
        assert_eq!(cells.len(), layout.grid_len());
        assert_eq!(cells.iter().filter(|c| **c == Cell::Key).count(), 2);
        assert_eq!(cells.iter().filter(|c| **c == Cell::Gate).count(), 2);
        assert_eq!(cells.iter().filter(|c| **c == Cell::Goal).count(), 1);

        for (player, spawn) in PlayerId::ALL.into_iter().zip(SPAWNS) {
            assert_eq!(state.board().get(spawn), Some(Cell::Player(player)));
        }

        // Keys and obstacles never land inside the treasure structure
        let (board, structure) = generator.build_board(&mut StdRng::seed_from_u64(seed)).unwrap();
        for key in board.positions_of(Cell::Key) {
            assert!(!structure.reserves(key), "seed {} key {} inside structure", seed, key);
        }
        assert_eq!(board.get(structure.approach()), Some(Cell::Empty));
        assert_eq!(board.get(structure.goal()), Some(Cell::Goal));
    }

    let duration = start.elapsed();
    println!(
        "Board generation: {} boards in {:?} ({:.2} ms/board)",
        iterations,
        duration,
        duration.as_secs_f64() * 1000.0 / iterations as f64
    );

    assert!(duration.as_secs() < 10);
}

/// The same seed always produces the same board
#[test]
fn stress_generation_is_deterministic() {
    let generator = PuzzleGenerator::new(60, 25).with_obstacles(80);

    for seed in 0..50 {
        let first = generator.initialize(&mut StdRng::seed_from_u64(seed)).unwrap();
        let second = generator.initialize(&mut StdRng::seed_from_u64(seed)).unwrap();
        assert_eq!(first.board(), second.board());
    }
}

/// Hammers the turn lock from both players with random tokens
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_concurrent_turns() {
    let state = PuzzleGenerator::new(80, 30)
        .initialize(&mut StdRng::seed_from_u64(7))
        .unwrap();
    let walls = state.board().count(Cell::Wall);
    let coordinator = Arc::new(TurnCoordinator::new(
        state,
        Broadcaster::new(Arc::new(SessionRegistry::new())),
    ));

    let iterations = 2_000;
    let start = Instant::now();

    let handles: Vec<_> = PlayerId::ALL
        .into_iter()
        .map(|player| {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(player.index() as u64);
                for _ in 0..iterations {
                    let token = match rng.gen_range(0..5) {
                        4 => "sideways",
                        i => Direction::ALL[i].token(),
                    };
                    coordinator.submit(player, token).await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Concurrent turns: {} submissions in {:?} ({:.2} μs/turn)",
        iterations * 2,
        duration,
        duration.as_micros() as f64 / (iterations * 2) as f64
    );

    coordinator
        .inspect(|state| {
            // Walls are never created or destroyed by moves
            assert_eq!(state.board().count(Cell::Wall), walls);
            if !state.winner() {
                for player in state.players() {
                    assert_eq!(state.board().get(player.position), Some(Cell::Player(player.id)));
                    assert_eq!(state.board().positions_of(Cell::Player(player.id)).len(), 1);
                }
            }
        })
        .await;
}
