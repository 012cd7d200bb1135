use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: Uuid, // generated once at registration, never reused
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    pub email: String,
    pub created_at: OffsetDateTime,
    pub edited_at: Option<OffsetDateTime>, // set by profile edits only
}

impl User {
    /// Find a user by email. Email is unique, so at most one row matches.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password_hash, email, created_at, edited_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user row. The unique constraint on email is the only
    /// duplicate check; when two registrations race, the loser surfaces the
    /// constraint violation here.
    pub async fn insert(db: &PgPool, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, password_hash, email, created_at, edited_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.edited_at)
        .execute(db)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(username: &str, email: &str) -> User {
        User {
            user_id: Uuid::new_v4(),
            username: username.into(),
            password_hash: "$argon2id$v=19$stub".into(),
            email: email.into(),
            created_at: OffsetDateTime::now_utc(),
            edited_at: None,
        }
    }

    #[tokio::test]
    #[ignore = "needs a migrated database via DATABASE_URL"]
    async fn concurrent_duplicate_registrations_one_wins() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .expect("connect");
        sqlx::migrate!("./migrations").run(&db).await.expect("migrate");

        let email = format!("race-{}@x.com", Uuid::new_v4());
        let a = make_user("first", &email);
        let b = make_user("second", &email);

        let (ra, rb) = tokio::join!(User::insert(&db, &a), User::insert(&db, &b));
        assert!(
            ra.is_ok() != rb.is_ok(),
            "exactly one concurrent insert should win"
        );

        let loser = ra.err().or(rb.err()).unwrap();
        let db_err = loser.as_database_error().expect("database-level error");
        assert!(db_err.is_unique_violation());
    }

    #[test]
    fn serialization_hides_password_hash() {
        let user = make_user("alice", "a@x.com");

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
