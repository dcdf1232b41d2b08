//! Spending goals, kept only in device-local storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, UserId, ValidationError, client::LocalStorage};

/// Identifier of a goal: its creation time in milliseconds since the Unix epoch.
pub type GoalId = i64;

/// A spending limit for a category.
///
/// The category is free text and is not checked against the transaction
/// categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// When the goal was created, unique within a user's goals.
    pub id: GoalId,
    /// The category the limit applies to.
    pub category: String,
    /// The spending limit, always a positive finite number.
    pub limit: f64,
}

/// The storage key of `owner`'s goals.
pub fn goals_key(owner: &UserId) -> String {
    format!("goals_{owner}")
}

/// Creates, lists and deletes goals in a [LocalStorage].
///
/// Every mutation writes the user's full goal list back to storage as a JSON
/// array.
#[derive(Debug)]
pub struct GoalStore<S> {
    storage: S,
}

impl<S: LocalStorage> GoalStore<S> {
    /// Create a goal store on top of `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get `owner`'s goals in the order they were created.
    ///
    /// # Errors
    /// Returns an [Error::LocalStorage] if the storage cannot be read or holds
    /// something other than a list of goals.
    pub fn list(&self, owner: &UserId) -> Result<Vec<Goal>, Error> {
        let key = goals_key(owner);

        match self.storage.get(&key)? {
            Some(json) => serde_json::from_str(&json).map_err(|error| {
                Error::LocalStorage(format!("could not parse the goals in {key}: {error}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Add a goal for `owner` from the raw form input.
    ///
    /// Nothing is written if the input is invalid.
    ///
    /// # Errors
    /// Returns a [ValidationError::InvalidGoal] if `category` is blank or
    /// `limit` is not a positive number, or an [Error::LocalStorage] if the
    /// storage cannot be read or written.
    pub fn create(&self, owner: &UserId, category: &str, limit: &str) -> Result<Goal, Error> {
        let category = category.trim();
        let limit = limit
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|limit| limit.is_finite() && *limit > 0.0);

        let Some(limit) = limit.filter(|_| !category.is_empty()) else {
            return Err(ValidationError::InvalidGoal.into());
        };

        let mut goals = self.list(owner)?;
        let id = next_goal_id(&goals, now_millis());
        let goal = Goal {
            id,
            category: category.to_owned(),
            limit,
        };
        goals.push(goal.clone());
        self.save(owner, &goals)?;

        tracing::debug!("Created goal {id} for user {owner}");

        Ok(goal)
    }

    /// Remove the goal `id` from `owner`'s goals.
    ///
    /// Deleting a goal that does not exist is not an error.
    ///
    /// # Errors
    /// Returns an [Error::LocalStorage] if the storage cannot be read or written.
    pub fn delete(&self, owner: &UserId, id: GoalId) -> Result<(), Error> {
        let mut goals = self.list(owner)?;
        goals.retain(|goal| goal.id != id);

        self.save(owner, &goals)
    }

    fn save(&self, owner: &UserId, goals: &[Goal]) -> Result<(), Error> {
        let json = serde_json::to_string(goals)
            .map_err(|error| Error::LocalStorage(format!("could not serialize goals: {error}")))?;

        self.storage.set(&goals_key(owner), &json)
    }
}

fn now_millis() -> GoalId {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as GoalId
}

/// Two goals created within the same millisecond get consecutive IDs.
fn next_goal_id(goals: &[Goal], now: GoalId) -> GoalId {
    match goals.iter().map(|goal| goal.id).max() {
        Some(latest) if latest >= now => latest + 1,
        _ => now,
    }
}
