//! Initial database migration.
//!
//! Creates enums, tables, indexes and the invoice amount guard.

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
        // PART 2: OWNERS
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: PIPELINE
        // ============================================================
        db.execute_unprepared(DEALS_SQL).await?;
        db.execute_unprepared(LINE_ITEMS_SQL).await?;
        db.execute_unprepared(CONTACTS_SQL).await?;
        db.execute_unprepared(DEAL_CONTACTS_SQL).await?;

        // ============================================================
        // PART 4: TAGS
        // ============================================================
        db.execute_unprepared(TAGS_SQL).await?;

        // ============================================================
        // PART 5: CATALOG, BILLING, NOTES
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(NOTES_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS
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
// SQL DEFINITIONS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE deal_status AS ENUM ('PENDING', 'OPEN', 'WON', 'LOST');

CREATE TYPE invoice_status AS ENUM ('DRAFT', 'SENT', 'PAID', 'OVERDUE', 'CANCELLED');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id                  UUID PRIMARY KEY,
    external_id         VARCHAR(255) NOT NULL UNIQUE,
    email               VARCHAR(255) NOT NULL,
    name                VARCHAR(255) NOT NULL,
    handle              VARCHAR(50) UNIQUE CHECK (handle ~ '^[a-z0-9-]{3,50}$'),
    payment_settings    JSONB CHECK (payment_settings IS NULL OR jsonb_typeof(payment_settings) = 'object'),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const DEALS_SQL: &str = r"
CREATE TABLE deals (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title           VARCHAR(200) NOT NULL,
    amount          NUMERIC NOT NULL DEFAULT 0,
    stage           VARCHAR(50) NOT NULL DEFAULT 'Lead',
    status          deal_status NOT NULL DEFAULT 'PENDING',
    probability     SMALLINT NOT NULL DEFAULT 10 CHECK (probability BETWEEN 0 AND 100),
    portal_views    INTEGER NOT NULL DEFAULT 0 CHECK (portal_views >= 0),
    share_token     VARCHAR(128) NOT NULL UNIQUE,
    signature       TEXT,
    signed_at       TIMESTAMPTZ,
    close_date      DATE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_deals_user_created ON deals(user_id, created_at DESC);
CREATE INDEX idx_deals_user_status ON deals(user_id, status);
";

const LINE_ITEMS_SQL: &str = r"
CREATE TABLE line_items (
    id              UUID PRIMARY KEY,
    deal_id         UUID NOT NULL REFERENCES deals(id) ON DELETE CASCADE,
    name            VARCHAR(255) NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    quantity        INTEGER NOT NULL CHECK (quantity >= 0),
    price           NUMERIC NOT NULL CHECK (price >= 0),
    position        INTEGER NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_line_items_deal ON line_items(deal_id, position);
";

const CONTACTS_SQL: &str = r"
CREATE TABLE contacts (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name            VARCHAR(255) NOT NULL,
    email           VARCHAR(255) NOT NULL,
    phone           VARCHAR(50),
    company         VARCHAR(255),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_contacts_user_email UNIQUE (user_id, email)
);
";

const DEAL_CONTACTS_SQL: &str = r"
CREATE TABLE deal_contacts (
    deal_id         UUID NOT NULL REFERENCES deals(id) ON DELETE CASCADE,
    contact_id      UUID NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    PRIMARY KEY (deal_id, contact_id)
);

CREATE INDEX idx_deal_contacts_contact ON deal_contacts(contact_id);
";

const TAGS_SQL: &str = r"
CREATE TABLE tags (
    id              UUID PRIMARY KEY,
    name            VARCHAR(64) NOT NULL UNIQUE CHECK (name <> '' AND name = lower(btrim(name))),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE deal_tags (
    deal_id         UUID NOT NULL REFERENCES deals(id) ON DELETE CASCADE,
    tag_id          UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (deal_id, tag_id)
);

CREATE TABLE contact_tags (
    contact_id      UUID NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    tag_id          UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (contact_id, tag_id)
);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name            VARCHAR(255) NOT NULL,
    description     TEXT,
    unit_price      NUMERIC NOT NULL CHECK (unit_price >= 0),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_products_user ON products(user_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    deal_id         UUID REFERENCES deals(id) ON DELETE SET NULL,
    number          VARCHAR(64) NOT NULL UNIQUE,
    amount          NUMERIC NOT NULL CHECK (amount >= 0),
    status          invoice_status NOT NULL DEFAULT 'DRAFT',
    issue_date      DATE NOT NULL,
    due_date        DATE,
    items           JSONB NOT NULL DEFAULT '[]',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_invoice_dates CHECK (due_date IS NULL OR due_date >= issue_date)
);

CREATE INDEX idx_invoices_user_created ON invoices(user_id, created_at DESC);
CREATE INDEX idx_invoices_deal ON invoices(deal_id) WHERE deal_id IS NOT NULL;
";

const NOTES_SQL: &str = r"
CREATE TABLE notes (
    id              UUID PRIMARY KEY,
    user_id         UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    deal_id         UUID REFERENCES deals(id) ON DELETE SET NULL,
    contact_id      UUID REFERENCES contacts(id) ON DELETE SET NULL,
    body            TEXT NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_notes_deal ON notes(deal_id) WHERE deal_id IS NOT NULL;
";

const TRIGGERS_SQL: &str = r"
-- Invoice amounts are fixed at creation
CREATE OR REPLACE FUNCTION prevent_invoice_amount_change()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.amount IS DISTINCT FROM OLD.amount THEN
        RAISE EXCEPTION 'Invoice amount is immutable (invoice %)', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_invoice_amount_immutable
    BEFORE UPDATE ON invoices
    FOR EACH ROW
    EXECUTE FUNCTION prevent_invoice_amount_change();

-- Portal views never go down
CREATE OR REPLACE FUNCTION prevent_portal_views_decrease()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.portal_views < OLD.portal_views THEN
        RAISE EXCEPTION 'portal_views cannot decrease (deal %)', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_portal_views_monotonic
    BEFORE UPDATE OF portal_views ON deals
    FOR EACH ROW
    EXECUTE FUNCTION prevent_portal_views_decrease();

-- Ownership and share tokens are fixed at creation
CREATE OR REPLACE FUNCTION prevent_deal_identity_change()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.user_id <> OLD.user_id OR NEW.share_token <> OLD.share_token THEN
        RAISE EXCEPTION 'Deal owner and share token are immutable (deal %)', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_deal_identity_immutable
    BEFORE UPDATE ON deals
    FOR EACH ROW
    EXECUTE FUNCTION prevent_deal_identity_change();
";

const DROP_ALL_SQL: &str = r"
-- Drop triggers
DROP TRIGGER IF EXISTS trg_deal_identity_immutable ON deals;
DROP TRIGGER IF EXISTS trg_portal_views_monotonic ON deals;
DROP TRIGGER IF EXISTS trg_invoice_amount_immutable ON invoices;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_deal_identity_change();
DROP FUNCTION IF EXISTS prevent_portal_views_decrease();
DROP FUNCTION IF EXISTS prevent_invoice_amount_change();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS notes CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS contact_tags CASCADE;
DROP TABLE IF EXISTS deal_tags CASCADE;
DROP TABLE IF EXISTS tags CASCADE;
DROP TABLE IF EXISTS deal_contacts CASCADE;
DROP TABLE IF EXISTS contacts CASCADE;
DROP TABLE IF EXISTS line_items CASCADE;
DROP TABLE IF EXISTS deals CASCADE;
DROP TABLE IF EXISTS users CASCADE;

-- Drop enums
DROP TYPE IF EXISTS invoice_status CASCADE;
DROP TYPE IF EXISTS deal_status CASCADE;
";
