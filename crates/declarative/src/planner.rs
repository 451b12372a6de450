//! Planner - decides the corrective action for a resource

use crate::resource::Resource;
use crate::types::{Action, Ensure};

/// Decide what to do given the desired presence and the current state
///
/// `needs_update` is only consulted when the resource exists and should.
pub fn plan<C>(ensure: Ensure, current: Option<&C>, needs_update: impl FnOnce(&C) -> bool) -> Action {
    match (ensure, current) {
        (Ensure::Present, None) => Action::Create,
        (Ensure::Present, Some(current)) => {
            if needs_update(current) {
                Action::Update
            } else {
                Action::NoChange
            }
        }
        (Ensure::Absent, Some(_)) => Action::Delete,
        (Ensure::Absent, None) => Action::NoChange,
    }
}

/// Plan a resource against an already fetched state
pub fn plan_resource<R: Resource + ?Sized>(resource: &R, current: Option<&R::Current>) -> Action {
    plan(resource.ensure(), current, |c| resource.needs_update(c))
}
