use std::sync::RwLock;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use mongodb::{
    bson::{doc, Document},
    Collection, Database,
};

use crate::{
    metrics::track_db_operation,
    models::{user::UserAccount, user_count::TimeWindow},
    utils::time::chrono_to_bson,
};

/// Read access to user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Number of accounts that logged in within `window` (inclusive on both
    /// ends) and are neither deleted nor suspended.
    async fn count_active_users(&self, window: &TimeWindow) -> Result<u64>;

    /// Connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}

pub struct MongoUserStore {
    mongo: Database,
    collection: String,
}

impl MongoUserStore {
    pub fn new(mongo: Database, collection: impl Into<String>) -> Self {
        Self {
            mongo,
            collection: collection.into(),
        }
    }

    fn users(&self) -> Collection<UserAccount> {
        self.mongo.collection::<UserAccount>(&self.collection)
    }
}

/// Accounts whose `lastLoginAt` lies in `window`. Documents without the
/// `deleted`/`suspended` flags match.
pub(crate) fn active_users_filter(window: &TimeWindow) -> Document {
    doc! {
        "lastLoginAt": {
            "$gte": chrono_to_bson(window.start),
            "$lte": chrono_to_bson(window.end),
        },
        "deleted": { "$ne": true },
        "suspended": { "$ne": true },
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn count_active_users(&self, window: &TimeWindow) -> Result<u64> {
        track_db_operation("count", &self.collection, async {
            self.users()
                .count_documents(active_users_filter(window))
                .await
                .context("Failed to count active users")
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.mongo
            .run_command(doc! { "ping": 1 })
            .await
            .context("MongoDB ping failed")?;
        Ok(())
    }
}

/// Keeps accounts in memory. Backs the unit and router tests.
pub struct InMemoryUserStore {
    accounts: RwLock<Vec<UserAccount>>,
    unavailable: bool,
}

impl InMemoryUserStore {
    pub fn with_accounts(accounts: Vec<UserAccount>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
            unavailable: false,
        }
    }

    /// A store whose every operation fails, for exercising error paths.
    pub fn unavailable() -> Self {
        Self {
            accounts: RwLock::default(),
            unavailable: true,
        }
    }

    pub fn insert(&self, account: UserAccount) -> Result<()> {
        self.accounts
            .write()
            .map_err(|_| anyhow!("User store lock poisoned"))?
            .push(account);
        Ok(())
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(anyhow!("User store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn count_active_users(&self, window: &TimeWindow) -> Result<u64> {
        self.check_available()?;
        let accounts = self
            .accounts
            .read()
            .map_err(|_| anyhow!("User store lock poisoned"))?;
        let count = accounts
            .iter()
            .filter(|account| account.is_active_in(window))
            .count();
        Ok(count as u64)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}
