//! Cross-module board tests.

mod draw;
mod edge_cases;
