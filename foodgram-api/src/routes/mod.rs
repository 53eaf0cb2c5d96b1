/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: registration, login, token refresh
/// - `users`: profiles, avatars, subscriptions
/// - `recipes`: recipe CRUD, favorites, shopping cart, short links
/// - `tags`: tag read endpoints
/// - `ingredients`: ingredient read endpoints
/// - `short_link`: short-link redirect target

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod short_link;
pub mod tags;
pub mod users;
