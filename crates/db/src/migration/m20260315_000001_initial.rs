//! Initial database migration.
//!
//! Creates the unified ledger schema: enums, the three logical tables
//! (groups, participants, entries with their materialized splits), the
//! consolidation idempotency ledger, indexes, and the updated_at trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CORE TABLES
        // ============================================================
        db.execute_unprepared(LEDGER_GROUPS_SQL).await?;
        db.execute_unprepared(PARTICIPANTS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(ENTRY_SPLITS_SQL).await?;

        // ============================================================
        // PART 3: CONSOLIDATION BOOKKEEPING
        // ============================================================
        db.execute_unprepared(LEGACY_MIGRATIONS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Group modes: the two legacy subsystems unified under one tag
CREATE TYPE group_mode AS ENUM ('one_to_one', 'multi_party');

-- Group category tags
CREATE TYPE group_kind AS ENUM (
    'personal_debt',
    'group_expense',
    'trip',
    'household'
);

-- Originating direction of a one-to-one debt (descriptive metadata)
CREATE TYPE debt_direction AS ENUM ('lend', 'borrow');

-- Participant roles (authorization metadata, never balance-relevant)
CREATE TYPE participant_role AS ENUM ('owner', 'admin', 'member');

-- Split strategies
CREATE TYPE split_type AS ENUM (
    'equal',
    'custom',
    'percentage',
    'shares',
    'full'
);
";

const LEDGER_GROUPS_SQL: &str = r"
CREATE TABLE ledger_groups (
    id UUID PRIMARY KEY,
    mode group_mode NOT NULL,
    kind group_kind NOT NULL,
    name TEXT,
    other_party_name TEXT,
    other_party_email TEXT,
    debt_direction debt_direction,
    currency CHAR(3) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- One-to-one groups carry counterpart identity and a direction;
    -- multi-party groups carry a display name.
    CONSTRAINT chk_mode_fields CHECK (
        (mode = 'one_to_one'
            AND other_party_name IS NOT NULL
            AND debt_direction IS NOT NULL)
        OR
        (mode = 'multi_party'
            AND name IS NOT NULL
            AND other_party_name IS NULL
            AND debt_direction IS NULL)
    )
);

CREATE INDEX idx_ledger_groups_created_by ON ledger_groups(created_by);
CREATE INDEX idx_ledger_groups_active ON ledger_groups(is_active);
";

const PARTICIPANTS_SQL: &str = r"
CREATE TABLE participants (
    id UUID PRIMARY KEY,
    group_id UUID NOT NULL REFERENCES ledger_groups(id),
    user_id UUID,
    contact_name TEXT,
    contact_email TEXT,
    role participant_role NOT NULL DEFAULT 'member',
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- A participant is a registered user or an external contact, never both.
    CONSTRAINT chk_party CHECK (
        (user_id IS NOT NULL AND contact_name IS NULL)
        OR
        (user_id IS NULL AND contact_name IS NOT NULL)
    )
);

CREATE INDEX idx_participants_group ON participants(group_id);
CREATE INDEX idx_participants_user ON participants(user_id);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    group_id UUID NOT NULL REFERENCES ledger_groups(id),
    description TEXT NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    currency CHAR(3) NOT NULL,
    entry_date DATE NOT NULL,
    paid_by UUID NOT NULL REFERENCES participants(id),
    split_type split_type NOT NULL,
    category_id UUID,
    notes TEXT,
    is_settlement BOOLEAN NOT NULL DEFAULT FALSE,
    deleted_at TIMESTAMPTZ,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledger_entries_group ON ledger_entries(group_id);
CREATE INDEX idx_ledger_entries_group_date
    ON ledger_entries(group_id, entry_date, created_at);
CREATE INDEX idx_ledger_entries_live
    ON ledger_entries(group_id) WHERE deleted_at IS NULL;
";

const ENTRY_SPLITS_SQL: &str = r"
CREATE TABLE entry_splits (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES ledger_entries(id) ON DELETE CASCADE,
    participant_id UUID NOT NULL REFERENCES participants(id),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_entry_participant UNIQUE (entry_id, participant_id)
);

CREATE INDEX idx_entry_splits_entry ON entry_splits(entry_id);
CREATE INDEX idx_entry_splits_participant ON entry_splits(participant_id);
";

const LEGACY_MIGRATIONS_SQL: &str = r"
CREATE TABLE legacy_migrations (
    legacy_id TEXT PRIMARY KEY,
    group_id UUID REFERENCES ledger_groups(id),
    migrated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_ledger_groups_updated_at
    BEFORE UPDATE ON ledger_groups
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_participants_updated_at
    BEFORE UPDATE ON participants
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_ledger_entries_updated_at
    BEFORE UPDATE ON ledger_entries
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS legacy_migrations;
DROP TABLE IF EXISTS entry_splits;
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS participants;
DROP TABLE IF EXISTS ledger_groups;

DROP FUNCTION IF EXISTS set_updated_at();

DROP TYPE IF EXISTS split_type;
DROP TYPE IF EXISTS participant_role;
DROP TYPE IF EXISTS debt_direction;
DROP TYPE IF EXISTS group_kind;
DROP TYPE IF EXISTS group_mode;
";
