/// Database models
///
/// Each module owns one entity (or one family of relation tables) and the
/// sqlx queries against it.
///
/// # Models
///
/// - `user`: user accounts and avatar state
/// - `tag`: recipe tags
/// - `ingredient`: the canonical ingredient reference list
/// - `recipe`: recipes with their ingredient amounts and tags
/// - `relation`: per-user (user, recipe) relations - favorites and the
///   shopping cart - plus the cart aggregation queries
/// - `subscription`: (follower, author) relations between users

pub mod ingredient;
pub mod recipe;
pub mod relation;
pub mod subscription;
pub mod tag;
pub mod user;
