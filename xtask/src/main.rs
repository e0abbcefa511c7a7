// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! `cargo xtask <command>` wraps the lint, build, test and coverage
//! tooling used in CI, plus `verify-schema`, which applies the embedded
//! persistence migrations to a scratch `SQLite` database and checks that
//! the registration backstops are in place.
//!
//! - `cargo test` — Runs all standard tests against in-memory `SQLite`
//! - `cargo xtask verify-schema` — Checks the migrated schema
//! - `cargo xtask ci` — Everything CI runs

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{collections::BTreeSet, fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use color_eyre::eyre::eyre;
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Check if README.md is up-to-date
    #[command(visible_alias = "cr")]
    CheckReadme,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    // Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Lint markdown files
    #[command(visible_alias = "md")]
    LintMarkdown,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in the project
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables every registration database must have.
const REQUIRED_TABLES: [&str; 4] = [
    "audit_events",
    "registration_history",
    "registrations",
    "resources",
];

/// The partial index that allows one non-cancelled registration per pair.
const ACTIVE_PAIR_INDEX: &str = "idx_registrations_active_pair";
const ACTIVE_PAIR_COLUMNS: [&str; 3] = ["resource_kind", "resource_id", "registrant_id"];

/// Triggers that keep approvals within capacity.
const CAPACITY_TRIGGERS: [&str; 2] = [
    "trg_registrations_capacity_insert",
    "trg_registrations_capacity_update",
];

#[derive(QueryableByName)]
struct SchemaObject {
    #[diesel(sql_type = Text)]
    name: String,
}

#[derive(QueryableByName)]
struct IndexInfo {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = Integer)]
    unique: i32,
    #[diesel(sql_type = Integer)]
    partial: i32,
}

#[derive(QueryableByName)]
struct IndexColumnInfo {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Verify the migrated schema carries the registration backstops
///
/// Applies the embedded migrations to a scratch in-memory `SQLite`
/// database, then checks:
///
/// - every registration table exists
/// - `idx_registrations_active_pair` is a unique partial index on
///   (`resource_kind`, `resource_id`, `registrant_id`)
/// - both capacity triggers exist on `registrations`
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-schema
/// ```
fn verify_schema() -> Result<()> {
    tracing::info!("Starting schema verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply SQLite migrations: {}", e))?;
    tracing::info!("Migrations applied successfully");

    let tables = schema_objects(&mut conn, "table")?;
    for table in REQUIRED_TABLES {
        if !tables.contains(table) {
            return Err(eyre!("Missing table: {table}"));
        }
    }

    verify_active_pair_index(&mut conn)?;

    let triggers = schema_objects(&mut conn, "trigger")?;
    for trigger in CAPACITY_TRIGGERS {
        if !triggers.contains(trigger) {
            return Err(eyre!("Missing capacity trigger: {trigger}"));
        }
    }

    tracing::info!("✓ Schema verification passed");
    Ok(())
}

/// Names of the schema objects of one type (`table`, `trigger`, ...).
fn schema_objects(conn: &mut SqliteConnection, object_type: &str) -> Result<BTreeSet<String>> {
    let objects: Vec<SchemaObject> = diesel::sql_query(format!(
        "SELECT name FROM sqlite_master WHERE type = '{object_type}' AND name NOT LIKE 'sqlite_%'"
    ))
    .load(conn)
    .wrap_err(format!("Failed to query SQLite {object_type}s"))?;

    Ok(objects.into_iter().map(|o| o.name).collect())
}

fn verify_active_pair_index(conn: &mut SqliteConnection) -> Result<()> {
    let indexes: Vec<IndexInfo> = diesel::sql_query("PRAGMA index_list(registrations)")
        .load(conn)
        .wrap_err("Failed to get indexes for table registrations")?;

    let index = indexes
        .into_iter()
        .find(|idx| idx.name == ACTIVE_PAIR_INDEX)
        .ok_or_else(|| eyre!("Missing index: {ACTIVE_PAIR_INDEX}"))?;

    if index.unique == 0 {
        return Err(eyre!("{ACTIVE_PAIR_INDEX} is not unique"));
    }
    if index.partial == 0 {
        return Err(eyre!(
            "{ACTIVE_PAIR_INDEX} must be partial so cancelled rows are excluded"
        ));
    }

    let columns: Vec<IndexColumnInfo> =
        diesel::sql_query(format!("PRAGMA index_info({ACTIVE_PAIR_INDEX})"))
            .load(conn)
            .wrap_err(format!("Failed to get index columns for {ACTIVE_PAIR_INDEX}"))?;
    let column_names: Vec<String> = columns.into_iter().map(|c| c.name).collect();

    if column_names != ACTIVE_PAIR_COLUMNS {
        return Err(eyre!(
            "{ACTIVE_PAIR_INDEX} covers {column_names:?}, expected {ACTIVE_PAIR_COLUMNS:?}"
        ));
    }

    tracing::debug!(index = ACTIVE_PAIR_INDEX, "Active pair index verified");
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
