pub mod constants;
pub mod engine;
pub mod entities;
pub mod eval;
pub mod state;
