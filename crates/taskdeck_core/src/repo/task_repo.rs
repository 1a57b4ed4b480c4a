//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered listing over `tasks`.
//! - Insert recurrence expansions as one atomic batch.
//!
//! # Invariants
//! - Batch inserts are all-or-nothing.
//! - Listing order is deterministic: `created_at ASC, due_at ASC, uuid ASC`,
//!   with undated tasks after dated ones inside the same creation instant.

use super::{ensure_connection_ready, parse_flag, parse_instant, parse_uuid, RepoError, RepoResult};
use crate::db::{bool_to_db, instant_to_db};
use crate::model::project::ProjectId;
use crate::model::task::{Cadence, Priority, Task, TaskId, TaskStatus};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    title,
    status,
    priority,
    due_at,
    is_recurring,
    recurrence,
    recurrence_end,
    created_at
FROM tasks";

const TASK_ORDER_SQL: &str = " ORDER BY created_at ASC, due_at IS NULL ASC, due_at ASC, uuid ASC";

/// Query options for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub project_id: Option<ProjectId>,
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring filter on title.
    pub title_contains: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl TaskListQuery {
    pub fn for_project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }
}

/// Repository interface for task operations.
pub trait TaskRepository {
    /// Inserts all tasks in one transaction, returning their IDs in order.
    fn create_tasks(&self, tasks: &[Task]) -> RepoResult<Vec<TaskId>>;
    /// Replaces title, due date and priority.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn set_task_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Counts rows matching the query filters, ignoring limit/offset.
    fn count_tasks(&self, query: &TaskListQuery) -> RepoResult<u32>;
    fn list_recent_tasks(&self, limit: u32) -> RepoResult<Vec<Task>>;
    fn count_tasks_created_since(&self, since: NaiveDateTime) -> RepoResult<u32>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_tasks(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_tasks(&self, tasks: &[Task]) -> RepoResult<Vec<TaskId>> {
        for task in tasks {
            task.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (
                    uuid,
                    project_uuid,
                    title,
                    status,
                    priority,
                    due_at,
                    is_recurring,
                    recurrence,
                    recurrence_end,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            )?;
            for task in tasks {
                stmt.execute(params![
                    task.id.to_string(),
                    task.project_id.to_string(),
                    task.title.trim(),
                    task.status.code(),
                    task.priority.code(),
                    task.due_at.map(instant_to_db),
                    bool_to_db(task.is_recurring),
                    task.recurrence.code(),
                    task.recurrence_end.map(instant_to_db),
                    instant_to_db(task.created_at),
                ])?;
            }
        }
        tx.commit()?;

        Ok(tasks.iter().map(|task| task.id).collect())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?2,
                due_at = ?3,
                priority = ?4
             WHERE uuid = ?1;",
            params![
                task.id.to_string(),
                task.title.trim(),
                task.due_at.map(instant_to_db),
                task.priority.code(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }
        Ok(())
    }

    fn set_task_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET status = ?2 WHERE uuid = ?1;",
            params![id.to_string(), status.code()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let sql = format!("{TASK_SELECT_SQL} WHERE uuid = ?;");
        Ok(self
            .query_tasks(&sql, vec![Value::Text(id.to_string())])?
            .into_iter()
            .next())
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let (filter_sql, mut bind_values) = build_filter(query);
        let mut sql = format!("{TASK_SELECT_SQL}{filter_sql}{TASK_ORDER_SQL}");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        self.query_tasks(&sql, bind_values)
    }

    fn count_tasks(&self, query: &TaskListQuery) -> RepoResult<u32> {
        let (filter_sql, bind_values) = build_filter(query);
        let sql = format!("SELECT COUNT(*) FROM tasks{filter_sql};");
        let count = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), |row| row.get::<_, u32>(0))?;
        Ok(count)
    }

    fn list_recent_tasks(&self, limit: u32) -> RepoResult<Vec<Task>> {
        let sql = format!("{TASK_SELECT_SQL} ORDER BY created_at DESC, uuid ASC LIMIT ?;");
        self.query_tasks(&sql, vec![Value::Integer(i64::from(limit))])
    }

    fn count_tasks_created_since(&self, since: NaiveDateTime) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE created_at >= ?1;",
            [instant_to_db(since)],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }
}

fn build_filter(query: &TaskListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values = Vec::new();

    if let Some(project_id) = query.project_id {
        sql.push_str(" AND project_uuid = ?");
        bind_values.push(Value::Text(project_id.to_string()));
    }
    if let Some(status) = query.status {
        sql.push_str(" AND status = ?");
        bind_values.push(Value::Text(status.code().to_string()));
    }
    if let Some(needle) = query
        .title_contains
        .as_deref()
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
    {
        sql.push_str(" AND instr(lower(title), lower(?)) > 0");
        bind_values.push(Value::Text(needle.to_string()));
    }

    (sql, bind_values)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: String = row.get("project_uuid")?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::from_code(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::from_code(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid priority `{priority_text}` in tasks.priority"))
    })?;

    let recurrence_text: String = row.get("recurrence")?;
    let recurrence = Cadence::from_code(&recurrence_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid recurrence `{recurrence_text}` in tasks.recurrence"
        ))
    })?;

    let due_at = match row.get::<_, Option<i64>>("due_at")? {
        Some(millis) => Some(parse_instant(millis, "tasks.due_at")?),
        None => None,
    };
    let recurrence_end = match row.get::<_, Option<i64>>("recurrence_end")? {
        Some(millis) => Some(parse_instant(millis, "tasks.recurrence_end")?),
        None => None,
    };

    let task = Task {
        id: parse_uuid(&uuid_text, "tasks.uuid")?,
        project_id: parse_uuid(&project_text, "tasks.project_uuid")?,
        title: row.get("title")?,
        status,
        priority,
        due_at,
        is_recurring: parse_flag(row.get("is_recurring")?, "tasks.is_recurring")?,
        recurrence,
        recurrence_end,
        created_at: parse_instant(row.get("created_at")?, "tasks.created_at")?,
    };
    task.validate()?;
    Ok(task)
}
