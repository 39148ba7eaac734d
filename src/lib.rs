//! Burrito Bob — group food-order bot.

pub mod bot;
pub mod classify;
pub mod config;
pub mod error;
pub mod gateway;
pub mod round;
pub mod server;
