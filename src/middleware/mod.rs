pub mod auth;

pub use auth::{auth_middleware, relay_auth_middleware};
