//! HTTP middleware

pub mod hits;

pub use hits::fileserver_hits_middleware;
