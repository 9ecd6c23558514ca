//! Authorization collaborator contracts.
//!
//! # Responsibility
//! - Answer yes/no authorization questions for one actor, action and target.
//!
//! # Invariants
//! - Policies are pure predicates: no I/O, no mutation of the target.

use crate::model::actor::Actor;
use crate::model::record::Record;

/// Action a runner asks the policy about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    /// Stable string id used in log events and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Authorization predicate set, parameterized by actor and target.
pub trait Policy {
    fn permits(&self, actor: &Actor, action: Action, target: &Record) -> bool;

    fn can_create(&self, actor: &Actor, target: &Record) -> bool {
        self.permits(actor, Action::Create, target)
    }

    fn can_read(&self, actor: &Actor, target: &Record) -> bool {
        self.permits(actor, Action::Read, target)
    }

    fn can_update(&self, actor: &Actor, target: &Record) -> bool {
        self.permits(actor, Action::Update, target)
    }

    fn can_delete(&self, actor: &Actor, target: &Record) -> bool {
        self.permits(actor, Action::Delete, target)
    }
}

impl<P: Policy + ?Sized> Policy for &P {
    fn permits(&self, actor: &Actor, action: Action, target: &Record) -> bool {
        (**self).permits(actor, action, target)
    }
}

/// Default policy: owners and admins may do anything, everybody may create.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerPolicy;

impl Policy for OwnerPolicy {
    fn permits(&self, actor: &Actor, action: Action, target: &Record) -> bool {
        if action == Action::Create || actor.is_admin() {
            return true;
        }
        target.owner == Some(actor.id)
    }
}

/// Policy that permits every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Policy for AllowAll {
    fn permits(&self, _actor: &Actor, _action: Action, _target: &Record) -> bool {
        true
    }
}
