//! A chess engine built on magic-bitboard move generation and a fixed-depth
//! alpha-beta search over a hand-tuned static evaluation.
//!
//! The crate is organized in three layers:
//! - [`board`] - position state, legal move generation, make/unmake with
//!   incremental Zobrist keys
//! - [`engine`] - the searcher: negamax with alpha-beta, move ordering,
//!   and a threshold-with-jitter pick among near-equal root moves
//! - [`perft`] - the legal-move-count validator used as the correctness
//!   oracle for the board layer
//!
//! # Quick start
//!
//! ```
//! use fianchetto::board::{Color, START_FEN};
//! use fianchetto::engine::Engine;
//!
//! let mut engine = Engine::new(START_FEN, Color::White, 4).unwrap();
//! let mv = engine.make_move().expect("white has moves");
//! println!("engine plays {mv}");
//! ```
//!
//! # Driving a game
//!
//! ```
//! use fianchetto::board::{Color, START_FEN};
//! use fianchetto::engine::Engine;
//!
//! let mut engine = Engine::new(START_FEN, Color::Black, 2).unwrap();
//! // the host replays the full move line; already-seen moves are skipped
//! engine.apply_moves("e2e4").unwrap();
//! let reply = engine.make_move().unwrap();
//! engine.apply_moves(&format!("e2e4 {reply}")).unwrap();
//! ```
//!
//! # Features
//!
//! - `serde` - serialization for the small value types (`Color`,
//!   `PieceType`, `Square`, `Move`, `CastlingRights`)

#![warn(clippy::pedantic)]
// bitboard and square index casts are pervasive and safe by construction
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
// evaluation and movegen naturally name things eval_mg-style
#![allow(clippy::similar_names)]
// attack tables and move lists live in large fixed arrays
#![allow(clippy::large_stack_arrays)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod board;
pub mod engine;
pub mod perft;
pub(crate) mod zobrist;
