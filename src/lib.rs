//! Rate-limit aware client for the document Q&A API.
//!
//! Every request flows through a shared [`http::Interceptor`]. When the
//! backend answers 429, the interceptor broadcasts a
//! [`limit::RateLimitInfo`] snapshot to every subscriber on the
//! [`limit::RateLimitHub`] and fails the call with a distinguished error.
//! Each consumer holds a [`limit::RateLimitWatch`] that projects those
//! notifications into a self-expiring local state, and renders a
//! [`notice::CountdownNotice`] while the wait runs down.

pub mod api;
pub mod cli;
pub mod config;
pub mod http;
pub mod limit;
pub mod notice;
pub mod views;
