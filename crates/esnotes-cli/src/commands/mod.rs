pub mod context;
pub mod record;
pub mod sessions;
pub mod transfer;
