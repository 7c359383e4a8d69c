//! Relational schema. The `ON DELETE` clauses carry the cascade and set-null
//! rules; lookup-table references have none and so refuse deletion while used.

pub const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS offices (
        office_id SERIAL PRIMARY KEY,
        city VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        role_id SERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS device_types (
        type_id SERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS incident_statuses (
        status_id SERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id SERIAL PRIMARY KEY,
        office_id INTEGER REFERENCES offices (office_id) ON DELETE CASCADE,
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(150) NOT NULL,
        email VARCHAR(150) NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role_id INTEGER NOT NULL REFERENCES user_roles (role_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS devices (
        device_id SERIAL PRIMARY KEY,
        office_id INTEGER NOT NULL REFERENCES offices (office_id) ON DELETE CASCADE,
        owner_id INTEGER REFERENCES users (user_id) ON DELETE SET NULL,
        type_id INTEGER NOT NULL REFERENCES device_types (type_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS incidents (
        incident_id SERIAL PRIMARY KEY,
        opened_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        status_id INTEGER NOT NULL REFERENCES incident_statuses (status_id),
        description TEXT NOT NULL,
        reporter_id INTEGER REFERENCES users (user_id) ON DELETE SET NULL,
        resolver_id INTEGER REFERENCES users (user_id) ON DELETE SET NULL,
        office_id INTEGER NOT NULL REFERENCES offices (office_id) ON DELETE CASCADE,
        device_id INTEGER REFERENCES devices (device_id) ON DELETE SET NULL,
        resolved_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS incident_history (
        history_id SERIAL PRIMARY KEY,
        incident_id INTEGER NOT NULL REFERENCES incidents (incident_id) ON DELETE CASCADE,
        status_id INTEGER NOT NULL REFERENCES incident_statuses (status_id),
        date TIMESTAMPTZ NOT NULL DEFAULT now(),
        comment TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS users_office_id_idx ON users (office_id)",
    "CREATE INDEX IF NOT EXISTS devices_office_id_idx ON devices (office_id)",
    "CREATE INDEX IF NOT EXISTS devices_owner_id_idx ON devices (owner_id)",
    "CREATE INDEX IF NOT EXISTS incidents_office_id_idx ON incidents (office_id)",
    "CREATE INDEX IF NOT EXISTS incidents_reporter_id_idx ON incidents (reporter_id)",
    "CREATE INDEX IF NOT EXISTS incidents_resolver_id_idx ON incidents (resolver_id)",
    "CREATE INDEX IF NOT EXISTS incidents_device_id_idx ON incidents (device_id)",
    "CREATE INDEX IF NOT EXISTS incident_history_incident_id_idx ON incident_history (incident_id)",
];
