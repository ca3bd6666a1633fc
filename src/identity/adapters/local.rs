//! Self-contained identity provider with local accounts.
//!
//! Accounts are keyed by display name. A new account takes the HOD role when
//! the roster marks the matching member as Head of Department. Passwords and
//! security answers are stored as salted SHA-256 digests; a forgotten
//! password can be reset by answering the security question.
//!
//! [`LocalIdentityProvider::open`] keeps accounts in `accounts.json` next to
//! the other file stores. Sessions are never written out, so every start
//! begins signed out.

use crate::identity::{
    domain::{Actor, MemberName, Role, UserId},
    ports::{IdentityError, IdentityProvider, IdentityResult, TeamDirectory},
};
use crate::storage::{JsonFile, JsonFileError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Document file holding local accounts.
const ACCOUNTS_FILE: &str = "accounts.json";

/// Salted one-way digest of a secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaltedDigest {
    salt: Uuid,
    digest: String,
}

impl SaltedDigest {
    fn new(secret: &str) -> Self {
        let salt = Uuid::new_v4();
        Self {
            salt,
            digest: digest_secret(salt, secret),
        }
    }

    fn verify(&self, secret: &str) -> bool {
        digest_secret(self.salt, secret) == self.digest
    }
}

fn digest_secret(salt: Uuid, secret: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(secret.as_bytes())
        .finalize();
    format!("{digest:x}")
}

fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    id: UserId,
    name: MemberName,
    role: Role,
    password: SaltedDigest,
    security_answer: Option<SaltedDigest>,
    created_at: DateTime<Utc>,
}

impl Account {
    fn actor(&self) -> Actor {
        Actor::new(self.id, self.name.clone(), self.role)
    }
}

#[derive(Debug, Default)]
struct LocalIdentityState {
    accounts: HashMap<UserId, Account>,
    session: Option<UserId>,
}

impl LocalIdentityState {
    fn find_by_name(&self, name: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|account| account.name.matches(name))
    }
}

/// In-process [`IdentityProvider`] holding accounts and a single session.
pub struct LocalIdentityProvider<D, C>
where
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    directory: Arc<D>,
    clock: Arc<C>,
    state: RwLock<LocalIdentityState>,
    file: Option<JsonFile<Vec<Account>>>,
}

impl<D, C> LocalIdentityProvider<D, C>
where
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a provider resolving roles from `directory`. Accounts live
    /// only as long as the provider.
    #[must_use]
    pub fn new(directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            directory,
            clock,
            state: RwLock::new(LocalIdentityState::default()),
            file: None,
        }
    }

    /// Creates a provider whose accounts persist in `accounts.json` inside
    /// `data_dir`, loading the accounts already stored there.
    ///
    /// # Errors
    ///
    /// Returns [`JsonFileError`] when the directory cannot be opened or the
    /// account file cannot be read.
    pub fn open(directory: Arc<D>, clock: Arc<C>, data_dir: &str) -> Result<Self, JsonFileError> {
        let file: JsonFile<Vec<Account>> = JsonFile::open(data_dir, ACCOUNTS_FILE)?;
        let accounts = file
            .load()?
            .into_iter()
            .map(|account: Account| (account.id, account))
            .collect();
        Ok(Self {
            directory,
            clock,
            state: RwLock::new(LocalIdentityState {
                accounts,
                session: None,
            }),
            file: Some(file),
        })
    }

    /// Registers an account and signs it in.
    ///
    /// The roster spelling of the name is adopted when the member exists.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::AccountExists`] for a duplicate name,
    /// [`IdentityError::EmptyPassword`] for an empty password, or a
    /// validation error for an invalid name.
    pub async fn sign_up(
        &self,
        name: &str,
        password: &str,
        security_answer: Option<&str>,
    ) -> IdentityResult<Actor> {
        let requested = MemberName::new(name)?;
        if password.is_empty() {
            return Err(IdentityError::EmptyPassword);
        }
        let member = self.directory.find_by_name(requested.as_str()).await?;
        let (display_name, role) = match member {
            Some(member) if member.is_hod() => (member.name().clone(), Role::Hod),
            Some(member) => (member.name().clone(), Role::TeamMember),
            None => (requested, Role::TeamMember),
        };

        let mut state = self.write_state()?;
        if state.find_by_name(display_name.as_str()).is_some() {
            return Err(IdentityError::AccountExists(display_name.to_string()));
        }
        let account = Account {
            id: UserId::new(),
            name: display_name,
            role,
            password: SaltedDigest::new(password),
            security_answer: security_answer
                .map(normalize_answer)
                .filter(|answer| !answer.is_empty())
                .map(|answer| SaltedDigest::new(&answer)),
            created_at: self.clock.utc(),
        };
        let actor = account.actor();
        self.commit(&mut state, account)?;
        state.session = Some(actor.id());
        info!(user = %actor.display_name(), role = %actor.role(), "account created");
        Ok(actor)
    }

    /// Signs in with name and password.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`] when no account matches.
    pub fn sign_in(&self, name: &str, password: &str) -> IdentityResult<Actor> {
        let mut state = self.write_state()?;
        let account = state
            .find_by_name(name)
            .filter(|account| account.password.verify(password))
            .ok_or(IdentityError::InvalidCredentials)?;
        let actor = account.actor();
        state.session = Some(actor.id());
        debug!(user = %actor.display_name(), "signed in");
        Ok(actor)
    }

    /// Ends the current session.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] when session state is
    /// inaccessible.
    pub fn sign_out(&self) -> IdentityResult<()> {
        self.write_state()?.session = None;
        Ok(())
    }

    /// Replaces a password after verifying the security answer.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::SecurityAnswerMismatch`] when the account has
    /// no security answer or it does not match, and
    /// [`IdentityError::EmptyPassword`] for an empty new password.
    pub fn reset_password(
        &self,
        name: &str,
        security_answer: &str,
        new_password: &str,
    ) -> IdentityResult<()> {
        if new_password.is_empty() {
            return Err(IdentityError::EmptyPassword);
        }
        let mut state = self.write_state()?;
        let mut account = state
            .find_by_name(name)
            .filter(|account| {
                account
                    .security_answer
                    .as_ref()
                    .is_some_and(|digest| digest.verify(&normalize_answer(security_answer)))
            })
            .cloned()
            .ok_or(IdentityError::SecurityAnswerMismatch)?;
        account.password = SaltedDigest::new(new_password);
        self.commit(&mut state, account)?;
        info!(user = name, "password reset");
        Ok(())
    }

    /// Changes an account's role. Only a Head of Department may do this.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Forbidden`] for non-HOD actors and
    /// [`IdentityError::UnknownAccount`] when the account does not exist.
    pub fn set_role(&self, acting: &Actor, user: UserId, role: Role) -> IdentityResult<Actor> {
        acting.require_role(Role::Hod)?;
        let mut state = self.write_state()?;
        let mut account = state
            .accounts
            .get(&user)
            .cloned()
            .ok_or(IdentityError::UnknownAccount)?;
        account.role = role;
        let updated = account.actor();
        self.commit(&mut state, account)?;
        info!(
            user = %updated.display_name(),
            role = %role,
            by = %acting.display_name(),
            "role changed"
        );
        Ok(updated)
    }

    /// Lists accounts, oldest first. Only a Head of Department may do this.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Forbidden`] for non-HOD actors.
    pub fn accounts(&self, acting: &Actor) -> IdentityResult<Vec<Actor>> {
        acting.require_role(Role::Hod)?;
        let state = self.read_state()?;
        let mut accounts: Vec<&Account> = state.accounts.values().collect();
        accounts.sort_by_key(|account| account.created_at);
        Ok(accounts.into_iter().map(Account::actor).collect())
    }

    /// Stores `account`, writing the account file first when one is open.
    fn commit(&self, state: &mut LocalIdentityState, account: Account) -> IdentityResult<()> {
        if let Some(file) = &self.file {
            let mut document: Vec<Account> = state
                .accounts
                .values()
                .filter(|existing| existing.id != account.id)
                .cloned()
                .collect();
            document.push(account.clone());
            document.sort_by_key(|existing| existing.created_at);
            file.save(&document).map_err(IdentityError::persistence)?;
        }
        state.accounts.insert(account.id, account);
        Ok(())
    }

    fn read_state(&self) -> IdentityResult<RwLockReadGuard<'_, LocalIdentityState>> {
        self.state
            .read()
            .map_err(|err| IdentityError::Unavailable(err.to_string()))
    }

    fn write_state(&self) -> IdentityResult<RwLockWriteGuard<'_, LocalIdentityState>> {
        self.state
            .write()
            .map_err(|err| IdentityError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl<D, C> IdentityProvider for LocalIdentityProvider<D, C>
where
    D: TeamDirectory + ?Sized,
    C: Clock + Send + Sync,
{
    async fn current_actor(&self) -> IdentityResult<Option<Actor>> {
        let state = self.read_state()?;
        Ok(state
            .session
            .and_then(|id| state.accounts.get(&id))
            .map(Account::actor))
    }
}
