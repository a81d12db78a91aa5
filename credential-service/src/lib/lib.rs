pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::credential;
pub use domain::subject;
pub use outbound::mail;
pub use outbound::repositories;
