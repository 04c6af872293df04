//! SQLite-backed signal store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};

use super::{Interaction, InteractionAction, SignalStore, SignalStoreError};
use crate::identity::UserIdentity;

/// SQLite-backed signal store.
pub struct SqliteSignalStore {
    conn: Mutex<Connection>,
}

impl SqliteSignalStore {
    /// Create a new SQLite signal store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, SignalStoreError> {
        let conn = Connection::open(path).map_err(|e| SignalStoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite signal store (useful for testing).
    pub fn in_memory() -> Result<Self, SignalStoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SignalStoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SignalStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS user_interests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                genre_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_movie_interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                movie_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                rating INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_searches (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                query TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_interests_user ON user_interests(user_id);
            CREATE INDEX IF NOT EXISTS idx_interactions_user_action
                ON user_movie_interactions(user_id, action);
            CREATE INDEX IF NOT EXISTS idx_searches_user ON user_searches(user_id);
            "#,
        )
        .map_err(|e| SignalStoreError::Database(e.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SignalStoreError> {
        self.conn
            .lock()
            .map_err(|_| SignalStoreError::Database("connection lock poisoned".to_string()))
    }

    fn movie_ids_for_action(
        &self,
        user: &UserIdentity,
        action: InteractionAction,
    ) -> Result<Vec<u32>, SignalStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT movie_id FROM user_movie_interactions
                 WHERE user_id = ? AND action = ?
                 ORDER BY id DESC",
            )
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user.user_id(), action.as_str()], |row| {
                row.get::<_, u32>(0)
            })
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SignalStoreError::Database(e.to_string()))
    }
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    async fn interest_genres(&self, user: &UserIdentity) -> Result<Vec<u32>, SignalStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT genre_id FROM user_interests WHERE user_id = ? ORDER BY id ASC")
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user.user_id()], |row| row.get::<_, u32>(0))
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SignalStoreError::Database(e.to_string()))
    }

    async fn favorited_movie_ids(
        &self,
        user: &UserIdentity,
    ) -> Result<Vec<u32>, SignalStoreError> {
        self.movie_ids_for_action(user, InteractionAction::Favorited)
    }

    async fn watched_movie_ids(&self, user: &UserIdentity) -> Result<Vec<u32>, SignalStoreError> {
        self.movie_ids_for_action(user, InteractionAction::Watched)
    }

    async fn recent_searches(&self, user: &UserIdentity) -> Result<Vec<String>, SignalStoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT query FROM user_searches WHERE user_id = ? ORDER BY id DESC")
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user.user_id()], |row| row.get::<_, String>(0))
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SignalStoreError::Database(e.to_string()))
    }

    async fn replace_interests(
        &self,
        user: &UserIdentity,
        genre_ids: &[u32],
    ) -> Result<(), SignalStoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        tx.execute(
            "DELETE FROM user_interests WHERE user_id = ?",
            params![user.user_id()],
        )
        .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        for genre_id in genre_ids {
            tx.execute(
                "INSERT INTO user_interests (user_id, genre_id, created_at) VALUES (?, ?, ?)",
                params![user.user_id(), genre_id, now],
            )
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| SignalStoreError::Database(e.to_string()))
    }

    async fn record_interaction(
        &self,
        user: &UserIdentity,
        interaction: &Interaction,
    ) -> Result<(), SignalStoreError> {
        interaction.validate()?;

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;

        if matches!(
            interaction.action,
            InteractionAction::Favorited | InteractionAction::Unfavorited
        ) {
            tx.execute(
                "DELETE FROM user_movie_interactions
                 WHERE user_id = ? AND movie_id = ? AND action = ?",
                params![
                    user.user_id(),
                    interaction.movie_id,
                    InteractionAction::Favorited.as_str()
                ],
            )
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;
        }

        if interaction.action != InteractionAction::Unfavorited {
            tx.execute(
                "INSERT INTO user_movie_interactions (user_id, movie_id, action, rating, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    user.user_id(),
                    interaction.movie_id,
                    interaction.action.as_str(),
                    interaction.rating,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| SignalStoreError::Database(e.to_string()))
    }

    async fn record_search(&self, user: &UserIdentity, term: &str) -> Result<(), SignalStoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(SignalStoreError::InvalidInput(
                "search term cannot be empty".to_string(),
            ));
        }

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO user_searches (user_id, query, created_at) VALUES (?, ?, ?)",
            params![user.user_id(), term, Utc::now().to_rfc3339()],
        )
        .map_err(|e| SignalStoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn has_interaction(
        &self,
        user: &UserIdentity,
        movie_id: u32,
        action: InteractionAction,
    ) -> Result<bool, SignalStoreError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_movie_interactions
                 WHERE user_id = ? AND movie_id = ? AND action = ?",
                params![user.user_id(), movie_id, action.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| SignalStoreError::Database(e.to_string()))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn user(id: &str) -> UserIdentity {
        UserIdentity::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_replace_interests_keeps_pick_order() {
        let store = SqliteSignalStore::in_memory().unwrap();
        let alice = user("alice");

        store.replace_interests(&alice, &[28, 12, 35]).await.unwrap();
        assert_eq!(store.interest_genres(&alice).await.unwrap(), vec![28, 12, 35]);

        store.replace_interests(&alice, &[18]).await.unwrap();
        assert_eq!(store.interest_genres(&alice).await.unwrap(), vec![18]);
    }

    #[tokio::test]
    async fn test_interests_isolated_per_user() {
        let store = SqliteSignalStore::in_memory().unwrap();
        store.replace_interests(&user("alice"), &[28]).await.unwrap();

        assert!(store.interest_genres(&user("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_favorites_most_recent_first_without_duplicates() {
        let store = SqliteSignalStore::in_memory().unwrap();
        let alice = user("alice");

        for movie_id in [10, 20, 30] {
            let interaction = Interaction::new(movie_id, InteractionAction::Favorited);
            store.record_interaction(&alice, &interaction).await.unwrap();
        }
        // Re-favoriting moves the movie to the front instead of duplicating it.
        store
            .record_interaction(&alice, &Interaction::new(10, InteractionAction::Favorited))
            .await
            .unwrap();

        assert_eq!(
            store.favorited_movie_ids(&alice).await.unwrap(),
            vec![10, 30, 20]
        );
    }

    #[tokio::test]
    async fn test_unfavorite_removes_favorite() {
        let store = SqliteSignalStore::in_memory().unwrap();
        let alice = user("alice");

        store
            .record_interaction(&alice, &Interaction::new(10, InteractionAction::Favorited))
            .await
            .unwrap();
        assert!(store
            .has_interaction(&alice, 10, InteractionAction::Favorited)
            .await
            .unwrap());

        store
            .record_interaction(&alice, &Interaction::new(10, InteractionAction::Unfavorited))
            .await
            .unwrap();
        assert!(!store
            .has_interaction(&alice, 10, InteractionAction::Favorited)
            .await
            .unwrap());
        assert!(!store
            .has_interaction(&alice, 10, InteractionAction::Unfavorited)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_watched_history_allows_repeats() {
        let store = SqliteSignalStore::in_memory().unwrap();
        let alice = user("alice");

        for movie_id in [1, 2, 1] {
            store
                .record_interaction(&alice, &Interaction::new(movie_id, InteractionAction::Watched))
                .await
                .unwrap();
        }

        assert_eq!(store.watched_movie_ids(&alice).await.unwrap(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_invalid_rating_rejected() {
        let store = SqliteSignalStore::in_memory().unwrap();
        let result = store
            .record_interaction(
                &user("alice"),
                &Interaction::new(1, InteractionAction::Favorited).with_rating(0),
            )
            .await;
        assert!(matches!(result, Err(SignalStoreError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_record_search_trims_and_rejects_blank() {
        let store = SqliteSignalStore::in_memory().unwrap();
        let alice = user("alice");

        store.record_search(&alice, "  alien ").await.unwrap();
        store.record_search(&alice, "heat").await.unwrap();
        assert!(store.record_search(&alice, "   ").await.is_err());

        assert_eq!(
            store.recent_searches(&alice).await.unwrap(),
            vec!["heat".to_string(), "alien".to_string()]
        );
    }

    #[tokio::test]
    async fn test_profile_reads_all_signals() {
        let store = SqliteSignalStore::in_memory().unwrap();
        let alice = user("alice");

        store.replace_interests(&alice, &[28]).await.unwrap();
        store
            .record_interaction(&alice, &Interaction::new(5, InteractionAction::Favorited))
            .await
            .unwrap();
        store
            .record_interaction(&alice, &Interaction::new(6, InteractionAction::Watched))
            .await
            .unwrap();
        store.record_search(&alice, "dune").await.unwrap();

        let profile = store.profile(&alice).await.unwrap();
        assert_eq!(profile.interest_genre_ids, vec![28]);
        assert_eq!(profile.favorited_movie_ids, vec![5]);
        assert_eq!(profile.watched_movie_ids, vec![6]);
        assert_eq!(profile.recent_search_terms, vec!["dune".to_string()]);
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("signals.db");
        let alice = user("alice");

        {
            let store = SqliteSignalStore::new(&path).unwrap();
            store.replace_interests(&alice, &[878]).await.unwrap();
        }

        let reopened = SqliteSignalStore::new(&path).unwrap();
        assert_eq!(reopened.interest_genres(&alice).await.unwrap(), vec![878]);
    }
}
