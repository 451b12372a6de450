//! Access-control resources managed by pvectl
//!
//! Each resource pairs a deserializable desired state (`*Spec`) with a
//! [`declarative::Resource`] implementation bound to a [`pveapi::Client`].

mod group;
mod role;

pub use group::{GroupResource, GroupSpec};
pub use role::{RoleResource, RoleSpec};
