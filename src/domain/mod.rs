pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod ports;
pub mod record;
pub mod signature;
pub mod subscription;
