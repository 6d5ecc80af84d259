//! Habit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable persistence APIs over `habits` and `checkins` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Habit::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `record_check_in` persists the mutated habit row and the receipt row in
//!   one transaction.
//! - Habit deletion is a hard delete and never touches issued receipts.

use crate::db::DbError;
use crate::model::checkin::{CheckIn, CheckInId};
use crate::model::habit::{ActorId, GoalType, Habit, HabitId, HabitValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    owner,
    name,
    description,
    emoji,
    created_at,
    goal_type,
    goal_count,
    total_checkins,
    current_streak,
    longest_streak,
    last_checkin_date,
    is_public
FROM habits";

const CHECKIN_SELECT_SQL: &str = "SELECT
    id,
    habit_id,
    owner,
    date,
    notes
FROM checkins";

const CHECKINS_DEFAULT_LIMIT: u32 = 50;
const CHECKINS_LIMIT_MAX: u32 = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for habit persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(HabitValidationError),
    Db(DbError),
    NotFound(HabitId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "habit not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HabitValidationError> for RepoError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing check-in receipts.
///
/// Receipts have no owner-independent listing use-case in this core, but the
/// filter fields are each optional so callers can slice by owner, by habit,
/// or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInListQuery {
    pub owner: Option<ActorId>,
    pub habit_id: Option<HabitId>,
    /// Maximum rows to return. Defaults to 50 and clamps to 500.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for habit and receipt persistence.
pub trait HabitRepository {
    /// Persists a freshly created habit record.
    fn create_habit(&mut self, habit: &Habit) -> RepoResult<HabitId>;
    /// Gets one habit by id.
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    /// Overwrites the stored habit row with the given record state.
    fn update_habit(&mut self, habit: &Habit) -> RepoResult<()>;
    /// Persists a check-in outcome: the mutated habit row and the issued
    /// receipt, atomically.
    fn record_check_in(&mut self, habit: &Habit, receipt: &CheckIn) -> RepoResult<()>;
    /// Permanently removes one habit row. Issued receipts are untouched.
    fn delete_habit(&mut self, id: HabitId) -> RepoResult<()>;
    /// Gets one receipt by id.
    fn get_check_in(&self, id: CheckInId) -> RepoResult<Option<CheckIn>>;
    /// Lists receipts using owner/habit filters + pagination.
    fn list_check_ins(&self, query: &CheckInListQuery) -> RepoResult<Vec<CheckIn>>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Rejects unmigrated connections and schemas missing the tables or
    /// columns this repository depends on.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&mut self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        self.conn.execute(
            "INSERT INTO habits (
                id,
                owner,
                name,
                description,
                emoji,
                created_at,
                goal_type,
                goal_count,
                total_checkins,
                current_streak,
                longest_streak,
                last_checkin_date,
                is_public
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                habit.id.to_string(),
                habit.owner.to_string(),
                habit.name.as_str(),
                habit.description.as_str(),
                habit.emoji.as_str(),
                habit.created_at,
                goal_type_to_db(habit.goal_type),
                habit.goal_count,
                habit.total_checkins,
                habit.current_streak,
                habit.longest_streak,
                habit.last_checkin_date,
                bool_to_int(habit.is_public),
            ],
        )?;

        Ok(habit.id)
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }

        Ok(None)
    }

    fn update_habit(&mut self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                name = ?1,
                description = ?2,
                emoji = ?3,
                goal_type = ?4,
                goal_count = ?5,
                total_checkins = ?6,
                current_streak = ?7,
                longest_streak = ?8,
                last_checkin_date = ?9,
                is_public = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?11;",
            params![
                habit.name.as_str(),
                habit.description.as_str(),
                habit.emoji.as_str(),
                goal_type_to_db(habit.goal_type),
                habit.goal_count,
                habit.total_checkins,
                habit.current_streak,
                habit.longest_streak,
                habit.last_checkin_date,
                bool_to_int(habit.is_public),
                habit.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(habit.id));
        }

        Ok(())
    }

    fn record_check_in(&mut self, habit: &Habit, receipt: &CheckIn) -> RepoResult<()> {
        habit.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE habits
             SET
                total_checkins = ?1,
                current_streak = ?2,
                longest_streak = ?3,
                last_checkin_date = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?5;",
            params![
                habit.total_checkins,
                habit.current_streak,
                habit.longest_streak,
                habit.last_checkin_date,
                habit.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(habit.id));
        }

        tx.execute(
            "INSERT INTO checkins (id, habit_id, owner, date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                receipt.id.to_string(),
                receipt.habit_id.to_string(),
                receipt.owner.to_string(),
                receipt.date,
                receipt.notes.as_deref(),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn delete_habit(&mut self, id: HabitId) -> RepoResult<()> {
        // Hard delete. Receipts keep their habit_id back-reference as a
        // historical record.
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_check_in(&self, id: CheckInId) -> RepoResult<Option<CheckIn>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHECKIN_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_checkin_row(row)?));
        }

        Ok(None)
    }

    fn list_check_ins(&self, query: &CheckInListQuery) -> RepoResult<Vec<CheckIn>> {
        let mut sql = format!("{CHECKIN_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = query.owner {
            sql.push_str(" AND owner = ?");
            bind_values.push(Value::Text(owner.to_string()));
        }

        if let Some(habit_id) = query.habit_id {
            sql.push_str(" AND habit_id = ?");
            bind_values.push(Value::Text(habit_id.to_string()));
        }

        sql.push_str(" ORDER BY date DESC, id ASC");

        let limit = normalize_checkin_limit(query.limit);
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut receipts = Vec::new();

        while let Some(row) = rows.next()? {
            receipts.push(parse_checkin_row(row)?);
        }

        Ok(receipts)
    }
}

/// Normalizes list limit according to the receipts contract.
pub fn normalize_checkin_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => CHECKINS_DEFAULT_LIMIT,
        Some(value) if value > CHECKINS_LIMIT_MAX => CHECKINS_LIMIT_MAX,
        Some(value) => value,
        None => CHECKINS_DEFAULT_LIMIT,
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let id = parse_uuid(&row.get::<_, String>("id")?, "habits.id")?;
    let owner = parse_uuid(&row.get::<_, String>("owner")?, "habits.owner")?;

    let goal_type_text: String = row.get("goal_type")?;
    let goal_type = parse_goal_type(&goal_type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid goal type `{goal_type_text}` in habits.goal_type"
        ))
    })?;

    let habit = Habit {
        id,
        owner,
        name: row.get("name")?,
        description: row.get("description")?,
        emoji: row.get("emoji")?,
        created_at: row.get("created_at")?,
        goal_type,
        goal_count: row.get("goal_count")?,
        total_checkins: row.get("total_checkins")?,
        current_streak: row.get("current_streak")?,
        longest_streak: row.get("longest_streak")?,
        last_checkin_date: row.get("last_checkin_date")?,
        is_public: int_to_bool(row.get("is_public")?, "habits.is_public")?,
    };
    habit.validate()?;
    Ok(habit)
}

fn parse_checkin_row(row: &Row<'_>) -> RepoResult<CheckIn> {
    Ok(CheckIn {
        id: parse_uuid(&row.get::<_, String>("id")?, "checkins.id")?,
        habit_id: parse_uuid(&row.get::<_, String>("habit_id")?, "checkins.habit_id")?,
        owner: parse_uuid(&row.get::<_, String>("owner")?, "checkins.owner")?,
        date: row.get("date")?,
        notes: row.get("notes")?,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn goal_type_to_db(goal_type: GoalType) -> &'static str {
    match goal_type {
        GoalType::Daily => "daily",
        GoalType::Weekly => "weekly",
        GoalType::Monthly => "monthly",
    }
}

fn parse_goal_type(value: &str) -> Option<GoalType> {
    match value {
        "daily" => Some(GoalType::Daily),
        "weekly" => Some(GoalType::Weekly),
        "monthly" => Some(GoalType::Monthly),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["habits", "checkins"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for column in [
        "id",
        "owner",
        "name",
        "description",
        "emoji",
        "created_at",
        "goal_type",
        "goal_count",
        "total_checkins",
        "current_streak",
        "longest_streak",
        "last_checkin_date",
        "is_public",
    ] {
        if !table_has_column(conn, "habits", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "habits",
                column,
            });
        }
    }

    for column in ["id", "habit_id", "owner", "date", "notes"] {
        if !table_has_column(conn, "checkins", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "checkins",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
