//! Account switching orchestration.
//!
//! [`AccountSwitcher`] is the only entry point the command layer uses. It
//! combines the [`AccountStore`] with an [`IdentityGateway`] and caches the
//! last identity git reported, re-reading it after every successful write.
//! It holds no other state between calls.

use log::{debug, info, warn};

use crate::error::SwitchError;
use crate::gateway::IdentityGateway;
use crate::profile::{Identity, Profile};
use crate::store::AccountStore;

pub struct AccountSwitcher<G: IdentityGateway> {
    store: AccountStore,
    gateway: G,
    active: Identity,
}

impl<G: IdentityGateway> AccountSwitcher<G> {
    /// Build the switcher and read git's current identity
    pub fn new(store: AccountStore, gateway: G) -> Self {
        let mut switcher = Self {
            store,
            gateway,
            active: Identity::unknown(),
        };
        switcher.refresh_active_identity();
        switcher
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Re-read git's global identity into the cache
    pub fn refresh_active_identity(&mut self) -> &Identity {
        self.active = self.gateway.global_identity();
        debug!("Active identity: {}", self.active);
        &self.active
    }

    pub fn list_accounts(&self) -> &[Profile] {
        self.store.list()
    }

    /// Last identity observed from git
    pub fn current_identity(&self) -> &Identity {
        &self.active
    }

    /// Stored account matching the cached identity, if any
    pub fn active_account_index(&self) -> Option<usize> {
        self.store.list().iter().position(|p| p.matches(&self.active))
    }

    pub fn find_account(&self, email: &str) -> Option<usize> {
        self.store.find_by_email(email)
    }

    pub fn add_account(&mut self, name: &str, email: &str) -> Result<(), SwitchError> {
        self.store.add(name, email)
    }

    /// Make the account at `index` git's global identity.
    ///
    /// On failure the cached identity is left as it was; git may still hold a
    /// partial write, which the next refresh will show.
    pub fn apply_account(&mut self, index: usize) -> Result<&Identity, SwitchError> {
        let profile = self
            .store
            .get(index)
            .cloned()
            .ok_or(SwitchError::IndexOutOfRange {
                index,
                len: self.store.len(),
            })?;

        if let Err(e) = self.gateway.set_global_identity(&profile.name, &profile.email) {
            warn!("Failed to apply {}: {}", profile, e);
            return Err(e);
        }

        info!("Applied {} as global git identity", profile);
        Ok(self.refresh_active_identity())
    }

    /// Forget a stored account. git's global identity is not touched, even
    /// if it currently matches the removed account.
    pub fn delete_account(&mut self, index: usize) -> Result<Profile, SwitchError> {
        self.store.remove(index)
    }
}
