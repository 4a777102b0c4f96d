//! Tests for sub-board winners, the forced sub-board and notation decoding.

use strictly_ultimate::{BoardState, Mark, Move, Notation, Square, rules::LINES};

fn mv(board: usize, cell: usize) -> Move {
    Move::new(board, cell).expect("valid move")
}

#[test]
fn test_empty_board_has_no_winners() {
    let board = BoardState::new();
    assert_eq!(board.winners(), [None; 9]);
}

#[test]
fn test_every_line_wins_for_either_mark() {
    for mark in [Mark::X, Mark::O] {
        for line in LINES {
            let mut board = BoardState::new();
            for cell in line {
                board = board.with_mark(mv(7, cell), mark).expect("empty cell");
            }
            assert_eq!(board.winner_of(7), Some(mark), "line {:?}", line);
            for other in (0..9).filter(|&b| b != 7) {
                assert_eq!(board.winner_of(other), None);
            }
        }
    }
}

#[test]
fn test_two_of_three_is_not_a_win() {
    for line in LINES {
        let mut board = BoardState::new();
        for &cell in &line[..2] {
            board = board.with_mark(mv(2, cell), Mark::X).expect("empty cell");
        }
        board = board.with_mark(mv(2, line[2]), Mark::O).expect("empty cell");
        assert_eq!(board.winner_of(2), None);
    }
}

#[test]
fn test_won_board_frozen_by_first_line() {
    // X completes a column, then O fills a row in the same sub-board.
    let mut board = BoardState::new();
    for cell in [0, 3, 6] {
        board = board.with_mark(mv(4, cell), Mark::X).expect("empty cell");
    }
    for cell in [1, 2] {
        board = board.with_mark(mv(4, cell), Mark::O).expect("empty cell");
    }
    assert_eq!(board.winner_of(4), Some(Mark::X));
}

#[test]
fn test_active_subboard_none_exactly_when_unconstrained() {
    let board = BoardState::new();
    assert_eq!(board.active_subboard(None), None);
    for cell in 0..9 {
        assert_eq!(board.active_subboard(Some(mv(0, cell))), Some(cell));
    }

    let mut won = BoardState::new();
    for cell in [2, 4, 6] {
        won = won.with_mark(mv(8, cell), Mark::O).expect("empty cell");
    }
    assert_eq!(won.active_subboard(Some(mv(1, 8))), None);
    assert_eq!(won.active_subboard(Some(mv(1, 7))), Some(7));
}

#[test]
fn test_notation_round_trip() {
    let moves = [mv(0, 4), mv(4, 0), mv(0, 0), mv(0, 8), mv(8, 8), mv(8, 0)];
    let mut board = BoardState::new();
    let mut to_move = Mark::X;
    for m in moves {
        board = board.with_mark(m, to_move).expect("empty cell");
        to_move = to_move.opponent();
    }
    let last = moves.last().copied();
    let original = Notation::new(to_move, board, last);

    let decoded: Notation = original.to_string().parse().expect("decodes");
    assert_eq!(decoded, original);
    assert_eq!(decoded.board().winners(), board.winners());
    assert_eq!(decoded.active(), board.active_subboard(last));
    assert_eq!(decoded.to_move(), to_move);
    assert_eq!(decoded.board().square(mv(0, 4)), Square::Occupied(Mark::X));
}

#[test]
fn test_notation_round_trip_with_won_subboard() {
    let mut board = BoardState::new();
    for cell in [0, 1, 2] {
        board = board.with_mark(mv(3, cell), Mark::X).expect("empty cell");
    }
    let original = Notation::new(Mark::O, board, Some(mv(6, 3)));
    let text = original.to_string();
    assert!(text.starts_with("O;...X.....;"), "{}", text);
    assert_eq!(text.parse::<Notation>().expect("decodes"), original);
}

#[test]
fn test_distinct_positions_serialize_differently() {
    let a = BoardState::new().with_mark(mv(0, 1), Mark::X).expect("empty cell");
    let b = BoardState::new().with_mark(mv(1, 0), Mark::X).expect("empty cell");
    let na = Notation::new(Mark::O, a, Some(mv(0, 1))).to_string();
    let nb = Notation::new(Mark::O, b, Some(mv(1, 0))).to_string();
    assert_ne!(na, nb);
    let turn_flipped = Notation::new(Mark::X, a, Some(mv(0, 1))).to_string();
    assert_ne!(na, turn_flipped);
}
