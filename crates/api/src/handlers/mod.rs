//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod group;
pub mod invitation;
pub mod join_request;
pub mod notification;
pub mod proposal;
