use std::collections::BTreeSet;
use verireg_token::Address;

/// Capability check gating the administrative setters.
pub trait AccessControl: Send + Sync {
    fn is_admin(&self, caller: &Address) -> bool;
}

/// The deploying identity is the only administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerAccessControl {
    owner: Address,
}

impl OwnerAccessControl {
    pub fn new(owner: impl Into<Address>) -> Self {
        OwnerAccessControl {
            owner: owner.into(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }
}

impl AccessControl for OwnerAccessControl {
    fn is_admin(&self, caller: &Address) -> bool {
        *caller == self.owner
    }
}

/// Fixed set of administrators.
#[derive(Debug, Clone, Default)]
pub struct AdminSet {
    admins: BTreeSet<Address>,
}

impl AdminSet {
    pub fn new<I, A>(admins: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Address>,
    {
        AdminSet {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }
}

impl AccessControl for AdminSet {
    fn is_admin(&self, caller: &Address) -> bool {
        self.admins.contains(caller)
    }
}
