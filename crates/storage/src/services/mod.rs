pub mod leaderboard_ranking;
