//! Profiles migration for upload quota bookkeeping.
//!
//! On a Supabase project `profiles` usually exists already (one row per
//! `auth.users` entry); the statements only add what is missing.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(PROFILES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "ALTER TABLE profiles DROP COLUMN IF EXISTS upload_limit_mb, \
             DROP COLUMN IF EXISTS total_uploaded_mb;",
        )
        .await?;
        Ok(())
    }
}

const PROFILES_SQL: &str = r"
CREATE TABLE IF NOT EXISTS profiles (
    id UUID PRIMARY KEY,
    email TEXT,
    full_name TEXT,
    is_admin BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Quota columns; NULL limit means the application default (500 MB)
ALTER TABLE profiles ADD COLUMN IF NOT EXISTS upload_limit_mb NUMERIC(12, 2);
ALTER TABLE profiles ADD COLUMN IF NOT EXISTS total_uploaded_mb NUMERIC(14, 2) DEFAULT 0;

ALTER TABLE profiles DROP CONSTRAINT IF EXISTS chk_profiles_limit_non_negative;
ALTER TABLE profiles ADD CONSTRAINT chk_profiles_limit_non_negative
    CHECK (upload_limit_mb IS NULL OR upload_limit_mb >= 0);

ALTER TABLE profiles DROP CONSTRAINT IF EXISTS chk_profiles_usage_non_negative;
ALTER TABLE profiles ADD CONSTRAINT chk_profiles_usage_non_negative
    CHECK (total_uploaded_mb >= 0);

-- Usage overview sorts by consumption
CREATE INDEX IF NOT EXISTS idx_profiles_usage ON profiles(total_uploaded_mb DESC);
";
