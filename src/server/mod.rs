pub mod headers;
pub mod routes;
pub mod server;
