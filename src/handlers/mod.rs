pub mod auth;
pub mod chat;
pub mod comments;
pub mod communities;
pub mod leaderboard;
pub mod notifications;
pub mod nutrition;
pub mod social;
pub mod users;
pub mod votes;
pub mod workouts;
