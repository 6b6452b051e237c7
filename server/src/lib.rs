mod booking;
mod clock;
mod data_store;
mod setup;

pub mod cli;
pub mod cli_error;
pub mod web;
