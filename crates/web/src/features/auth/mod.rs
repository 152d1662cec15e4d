pub mod handlers;
pub mod password;
pub mod routes;
pub mod services;
