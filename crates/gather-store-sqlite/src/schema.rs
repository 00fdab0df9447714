//! SQL schema for the Gather SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE … IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Location reference data.
CREATE TABLE IF NOT EXISTS countries (
    country_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    code        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS regions (
    region_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    country_id  TEXT REFERENCES countries(country_id)
);

CREATE TABLE IF NOT EXISTS cities (
    city_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    region_id   TEXT REFERENCES regions(region_id),
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL
);

-- One row per identity.
CREATE TABLE IF NOT EXISTS profiles (
    profile_id         TEXT PRIMARY KEY,
    username           TEXT NOT NULL UNIQUE,
    real_name          TEXT NOT NULL DEFAULT '',
    tz                 TEXT NOT NULL DEFAULT 'UTC',
    avatar             TEXT,
    city_id            TEXT REFERENCES cities(city_id) ON DELETE SET NULL,
    web_url            TEXT,
    twitter            TEXT,
    facebook           TEXT,
    send_notifications INTEGER NOT NULL DEFAULT 1,
    secret_key         TEXT NOT NULL,
    categories         TEXT NOT NULL DEFAULT '[]',   -- JSON array of category ids
    topics             TEXT NOT NULL DEFAULT '[]'    -- JSON array of topic ids
);

CREATE TABLE IF NOT EXISTS organizations (
    org_id           TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    slug             TEXT NOT NULL UNIQUE,
    owner_profile_id TEXT REFERENCES profiles(profile_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    slug        TEXT NOT NULL,
    img_url     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS topics (
    topic_id    TEXT PRIMARY KEY,
    category_id TEXT NOT NULL REFERENCES categories(category_id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

-- region_id/country_id are rewritten from city_id on every save.
CREATE TABLE IF NOT EXISTS teams (
    team_id             TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    organization_id     TEXT REFERENCES organizations(org_id) ON DELETE SET NULL,
    description         TEXT,
    country_id          TEXT NOT NULL REFERENCES countries(country_id),
    region_id           TEXT REFERENCES regions(region_id),
    city_id             TEXT REFERENCES cities(city_id),
    web_url             TEXT,
    email               TEXT,
    cover_img           TEXT,
    created_date        TEXT NOT NULL,   -- YYYY-MM-DD
    owner_profile_id    TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    admin_profile_ids   TEXT NOT NULL DEFAULT '[]',
    contact_profile_ids TEXT NOT NULL DEFAULT '[]',
    category_id         TEXT REFERENCES categories(category_id) ON DELETE SET NULL,
    topic_ids           TEXT NOT NULL DEFAULT '[]',
    active              INTEGER NOT NULL DEFAULT 1,
    tz                  TEXT NOT NULL DEFAULT 'UTC',
    is_premium          INTEGER NOT NULL DEFAULT 0,
    premium_by          TEXT REFERENCES profiles(profile_id) ON DELETE SET NULL,
    premium_started     TEXT,
    premium_expires     TEXT
);

CREATE TABLE IF NOT EXISTS memberships (
    membership_id TEXT PRIMARY KEY,
    team_id       TEXT NOT NULL REFERENCES teams(team_id) ON DELETE CASCADE,
    profile_id    TEXT NOT NULL REFERENCES profiles(profile_id) ON DELETE CASCADE,
    role          INTEGER NOT NULL DEFAULT 0,   -- 0 normal | 1 moderator | 2 admin
    joined_at     TEXT NOT NULL,
    UNIQUE (team_id, profile_id),
    CHECK  (role IN (0, 1, 2))
);

CREATE TABLE IF NOT EXISTS series (
    series_id  TEXT PRIMARY KEY,
    team_id    TEXT NOT NULL REFERENCES teams(team_id) ON DELETE CASCADE,
    name       TEXT NOT NULL,
    created_by TEXT REFERENCES profiles(profile_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id   TEXT PRIMARY KEY,
    team_id    TEXT NOT NULL REFERENCES teams(team_id) ON DELETE CASCADE,
    series_id  TEXT REFERENCES series(series_id) ON DELETE SET NULL,
    name       TEXT NOT NULL,
    created_by TEXT REFERENCES profiles(profile_id) ON DELETE SET NULL,
    start_time TEXT NOT NULL,
    end_time   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS common_events (
    common_event_id TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL REFERENCES organizations(org_id) ON DELETE CASCADE,
    name            TEXT NOT NULL,
    created_by      TEXT REFERENCES profiles(profile_id) ON DELETE SET NULL,
    start_time      TEXT NOT NULL,
    end_time        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS memberships_team_role_idx    ON memberships(team_id, role);
CREATE INDEX IF NOT EXISTS memberships_profile_role_idx ON memberships(profile_id, role);
CREATE INDEX IF NOT EXISTS teams_org_idx                ON teams(organization_id);
CREATE INDEX IF NOT EXISTS events_team_start_idx        ON events(team_id, start_time);
CREATE INDEX IF NOT EXISTS common_events_org_start_idx  ON common_events(organization_id, start_time);

PRAGMA user_version = 1;
";
