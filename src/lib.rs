pub mod app;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod palette;
pub mod render;
pub mod session;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
