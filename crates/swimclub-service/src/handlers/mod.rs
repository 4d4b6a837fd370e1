//! HTTP request handlers.

pub mod activities;
pub mod health;
pub mod interactions;
pub mod moments;
pub mod points;
pub mod rankings;
pub mod relations;
pub mod users;
