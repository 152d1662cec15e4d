pub mod admin;
pub mod auth;
pub mod challenges;
pub mod health;
pub mod leaderboard;
pub mod questions;
