pub mod api;
pub mod calendar;
pub mod chart;
pub mod display;
pub mod error;
pub mod menu;
pub mod models;
pub mod period;
pub mod scanner;
pub mod universe;
pub mod utils;
pub mod validate;
