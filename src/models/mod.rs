pub mod achievement;
pub mod chat;
pub mod comment;
pub mod community;
pub mod leaderboard;
pub mod notification;
pub mod nutrition;
pub mod post;
pub mod user;
pub mod vote;
pub mod workout;

pub use achievement::*;
pub use chat::*;
pub use comment::*;
pub use community::*;
pub use leaderboard::*;
pub use notification::*;
pub use nutrition::*;
pub use post::*;
pub use user::*;
pub use vote::*;
pub use workout::*;
