pub mod client;
pub mod service;
pub mod users;

pub use service::Service;
