pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod output;
pub mod page;
pub mod query;
pub mod render;

#[cfg(test)]
mod testing;
