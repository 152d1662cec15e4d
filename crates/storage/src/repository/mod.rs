pub mod admin_user;
pub mod challenge;
pub mod leaderboard;
pub mod question;

#[cfg(test)]
pub(crate) mod memory;
