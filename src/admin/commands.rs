use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::User;
use crate::repositories::{ListingRepository, NewUser, UserRepository, VerificationTokenRepository};
use crate::services::auth::hash_password;

const DEFAULT_ROLE: &str = "USER";
const TEST_USER_EMAIL: &str = "test+autotest1@example.com";
const SMOKE_PASSWORD: &str = "P@ssw0rd123";

pub async fn create_user(pool: &PgPool, email: &str) -> anyhow::Result<()> {
    let user_repo = UserRepository::new(pool.clone());

    let user = match user_repo.find_by_email(email).await? {
        Some(user) => user,
        None => {
            user_repo
                .create_user(&NewUser {
                    email,
                    name: Some("CI User"),
                    role: DEFAULT_ROLE,
                    ..NewUser::default()
                })
                .await?
        }
    };

    println!(
        "{}",
        serde_json::json!({ "id": user.id, "email": user.email })
    );
    Ok(())
}

pub async fn create_test_user(pool: &PgPool) -> anyhow::Result<()> {
    let user = UserRepository::new(pool.clone())
        .create_user(&NewUser {
            email: TEST_USER_EMAIL,
            name: Some("Auto Test"),
            role: DEFAULT_ROLE,
            phone_number: Some("+15555550123"),
            password_hash: None,
        })
        .await
        .context("failed to create test user")?;

    println!("Created user:");
    print_user(&user);
    Ok(())
}

pub async fn delete_user(pool: &PgPool, email: &str) -> anyhow::Result<()> {
    let user_repo = UserRepository::new(pool.clone());

    let Some(user) = user_repo.find_by_email(email).await? else {
        println!("No user found with email: {email}");
        return Ok(());
    };

    println!("Found user: {} (ID: {})", user.email, user.id);

    let deleted = user_repo
        .delete_with_related(&user)
        .await
        .with_context(|| format!("failed to delete user {email}"))?;

    println!("Deleted {} waitlist signup(s)", deleted.waitlist_signups);
    println!("Deleted {} account(s)", deleted.accounts);
    println!("Deleted {} session(s)", deleted.sessions);
    println!("Deleted {} verification token(s)", deleted.verification_tokens);
    println!("Successfully deleted user: {email}");
    Ok(())
}

pub async fn delete_test_users(pool: &PgPool) -> anyhow::Result<()> {
    let count = UserRepository::new(pool.clone())
        .delete_where_email_contains("test")
        .await
        .context("failed to delete test users")?;

    println!("Deleted {count} test users.");
    Ok(())
}

pub async fn delete_test_listings(pool: &PgPool) -> anyhow::Result<()> {
    let count = ListingRepository::new(pool.clone())
        .delete_test_listings()
        .await
        .context("failed to delete test listings")?;

    println!("Deleted {count} test/demo listings.");
    Ok(())
}

pub async fn delete_all_listings(pool: &PgPool) -> anyhow::Result<()> {
    let count = ListingRepository::new(pool.clone())
        .delete_all()
        .await
        .context("failed to delete listings")?;

    println!("Deleted {count} listings (all listings removed).");
    Ok(())
}

pub async fn set_password(pool: &PgPool, email: &str, password: &str) -> anyhow::Result<()> {
    let password_hash = hash_password(password)?;

    let updated = UserRepository::new(pool.clone())
        .update_password_by_email(email, &password_hash)
        .await?;

    if !updated {
        anyhow::bail!("no user found with email: {email}");
    }

    println!("Password set for {email}. Ask the user to change it after signing in.");
    Ok(())
}

pub async fn query_agreements(pool: &PgPool, listing_id: Uuid) -> anyhow::Result<()> {
    let agreements = ListingRepository::new(pool.clone())
        .find_agreements(listing_id)
        .await?;

    println!("Agreements for {listing_id}: {}", agreements.len());
    for agreement in agreements {
        println!(
            "  {}  {}  {}",
            agreement.id, agreement.status, agreement.created_at
        );
    }
    Ok(())
}

pub async fn list_users(pool: &PgPool, limit: u32) -> anyhow::Result<()> {
    let users = UserRepository::new(pool.clone()).list_recent(limit).await?;

    println!("Found {} users:", users.len());
    for user in &users {
        println!("\n---");
        print_user(user);
    }
    Ok(())
}

/// 作成 → 削除が通ることを確認する
pub async fn smoke_user(pool: &PgPool) -> anyhow::Result<()> {
    let user_repo = UserRepository::new(pool.clone());
    let email = smoke_email(OffsetDateTime::now_utc());
    let password_hash = hash_password(SMOKE_PASSWORD)?;

    let user = user_repo
        .create_user(&NewUser {
            email: &email,
            name: Some("Smoke Test"),
            role: DEFAULT_ROLE,
            password_hash: Some(&password_hash),
            ..NewUser::default()
        })
        .await
        .context("smoke test failed: create")?;
    println!("Created user OK: {} ({})", user.email, user.id);

    if !user_repo
        .delete(user.id)
        .await
        .context("smoke test failed: delete")?
    {
        anyhow::bail!("smoke test failed: user {} vanished before delete", user.id);
    }
    println!("Deleted user OK: {}", user.id);
    Ok(())
}

pub async fn purge_expired_tokens(pool: &PgPool) -> anyhow::Result<()> {
    let count = VerificationTokenRepository::new(pool.clone())
        .delete_expired(OffsetDateTime::now_utc())
        .await?;

    println!("Deleted {count} expired verification tokens.");
    Ok(())
}

fn print_user(user: &User) {
    println!("Email: {}", user.email);
    println!("Name: {}", user.name.as_deref().unwrap_or("N/A"));
    println!("Role: {}", user.role);
    println!(
        "Email verified: {}",
        user.email_verified
            .map_or_else(|| "no".to_string(), |at| at.to_string())
    );
    println!("Created: {}", user.created_at);
}

fn smoke_email(now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("smoke+{millis}@example.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_email_uses_unix_millis() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(smoke_email(now), "smoke+1700000000000@example.com");
    }
}
