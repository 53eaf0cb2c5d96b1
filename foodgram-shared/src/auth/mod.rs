/// Authentication primitives
///
/// - `jwt`: HS256 access/refresh token creation and validation
/// - `password`: Argon2id password hashing and strength checks
/// - `middleware`: request auth context types and bearer-token extraction

pub mod jwt;
pub mod middleware;
pub mod password;
