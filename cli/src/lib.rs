pub mod commands;
pub mod logging;
pub mod repl;
pub mod world;

pub use repl::readline;
pub use world::World;

#[cfg(test)]
mod world_tests;
