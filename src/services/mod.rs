pub mod achievement_service;
pub mod assistant_service;
pub mod comment_service;
pub mod community_service;
pub mod leaderboard_service;
pub mod notification_service;
pub mod nutrition_service;
pub mod social_service;
pub mod streak_service;
pub mod user_service;
pub mod vote_service;
pub mod workout_service;
