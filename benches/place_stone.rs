//! Criterion benchmarks for the place-stone / win-scan hot path.
//!
//! Run with:
//!     cargo bench --bench place_stone

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sixstones_server::game::{Board, Color, GameSession, Point, BOARD_SIZE};

/// A board crowded with short same-color runs, so every scan walks a bit.
fn crowded_board() -> Board {
    let mut board = Board::new();
    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            if (x + 2 * y) % 7 < 4 {
                let color = if (x / 3 + y) % 2 == 0 { Color::Black } else { Color::White };
                board.place(Point::new(x, y), color);
            }
        }
    }
    board
}

fn bench_find_win_line(c: &mut Criterion) {
    let board = crowded_board();
    let mut group = c.benchmark_group("find_win_line");
    for &(x, y) in &[(0usize, 0usize), (9, 9), (18, 4)] {
        let origin = Point::new(x, y);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{x},{y}")),
            &origin,
            |b, &origin| {
                b.iter(|| black_box(board.find_win_line(black_box(origin), Color::Black)));
            },
        );
    }
    group.finish();
}

fn bench_opening_sequence(c: &mut Criterion) {
    c.bench_function("session_40_moves", |b| {
        b.iter(|| {
            let mut session = GameSession::new();
            session.assign_first_participant("b");
            session.assign_second_participant("w");
            for i in 0..40i64 {
                let who = if session.current_color() == Color::Black { "b" } else { "w" };
                let _ = session.place_stone(who, (i * 7) % 19, (i * 5 + i / 19) % 19);
            }
            black_box(session.total_moves())
        });
    });
}

criterion_group!(benches, bench_find_win_line, bench_opening_sequence);
criterion_main!(benches);
