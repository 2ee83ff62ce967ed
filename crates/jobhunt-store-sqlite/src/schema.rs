//! SQL schema for the jobhunt SQLite store.
//!
//! Executed once at connection startup. The code tables are filled from
//! [`jobhunt_core::codes`] right after, see `SqliteStore::init_schema`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    fname         TEXT NOT NULL,
    lname         TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    phone         TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS companies (
    company_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL,      -- not unique; two 'Acme' rows are allowed
    street     TEXT NOT NULL DEFAULT '',
    city       TEXT NOT NULL DEFAULT '',
    state      TEXT NOT NULL DEFAULT '',
    zipcode    TEXT NOT NULL DEFAULT '',
    website    TEXT,
    notes      TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS jobs (
    job_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id    INTEGER NOT NULL REFERENCES companies(company_id),
    title         TEXT NOT NULL,
    link          TEXT NOT NULL DEFAULT '',
    notes         TEXT NOT NULL DEFAULT '',
    avg_salary    INTEGER,
    active_status INTEGER NOT NULL DEFAULT 1   -- cache of the latest event
);

CREATE TABLE IF NOT EXISTS contacts (
    contact_id INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id INTEGER NOT NULL REFERENCES companies(company_id),
    fname      TEXT NOT NULL,
    lname      TEXT NOT NULL,
    email      TEXT NOT NULL DEFAULT '',
    phone      TEXT NOT NULL DEFAULT '',
    notes      TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS todos (
    todo_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL,
    job_id      INTEGER REFERENCES jobs(job_id)
);

CREATE TABLE IF NOT EXISTS job_codes (
    job_code    INTEGER PRIMARY KEY,
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_codes (
    contact_code INTEGER PRIMARY KEY,
    description  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS todo_codes (
    todo_code   INTEGER PRIMARY KEY,
    description TEXT NOT NULL
);

-- Event tables are strictly append-only.
-- No UPDATE or DELETE is ever issued against them.
CREATE TABLE IF NOT EXISTS job_events (
    job_event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      INTEGER NOT NULL REFERENCES users(user_id),
    job_id       INTEGER NOT NULL REFERENCES jobs(job_id),
    job_code     INTEGER NOT NULL REFERENCES job_codes(job_code),
    date_created TEXT NOT NULL      -- fixed-width RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS contact_events (
    contact_event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER NOT NULL REFERENCES users(user_id),
    contact_id       INTEGER NOT NULL REFERENCES contacts(contact_id),
    contact_code     INTEGER NOT NULL REFERENCES contact_codes(contact_code),
    date_created     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS todo_events (
    todo_event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL REFERENCES users(user_id),
    todo_id       INTEGER NOT NULL REFERENCES todos(todo_id),
    todo_code     INTEGER NOT NULL REFERENCES todo_codes(todo_code),
    date_created  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS salaries (
    salary_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    metro      TEXT NOT NULL,
    job_title  TEXT NOT NULL,
    avg_salary INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS job_events_user_idx     ON job_events(user_id);
CREATE INDEX IF NOT EXISTS job_events_job_idx      ON job_events(job_id, date_created);
CREATE INDEX IF NOT EXISTS contact_events_user_idx ON contact_events(user_id);
CREATE INDEX IF NOT EXISTS todo_events_user_idx    ON todo_events(user_id);
CREATE INDEX IF NOT EXISTS jobs_company_idx        ON jobs(company_id);
CREATE INDEX IF NOT EXISTS contacts_company_idx    ON contacts(company_id);
CREATE INDEX IF NOT EXISTS salaries_lookup_idx     ON salaries(metro, job_title);

PRAGMA user_version = 1;
";
