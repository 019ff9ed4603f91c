mod access;
mod client_ctx;

pub use access::AccessGate;
pub use client_ctx::ClientCtx;
