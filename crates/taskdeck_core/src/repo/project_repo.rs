//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and trash lifecycle APIs over `projects`.
//! - Own tag-set replacement with atomic semantics.
//!
//! # Invariants
//! - Trash/restore never remove rows; only `purge_project` does, and only for
//!   projects already in trash.
//! - Tag names are stored normalized (lowercase, trimmed).
//! - Purging cascades to the project's tasks, notes and tags via foreign keys.

use super::{
    ensure_connection_ready, parse_flag, parse_instant, parse_uuid, RepoError, RepoResult,
};
use crate::db::{bool_to_db, date_from_db, date_to_db, instant_to_db};
use crate::model::project::{normalize_tag, Project, ProjectId};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    reminder_date,
    notify,
    is_deleted,
    deleted_at,
    created_at
FROM projects";

/// Which side of the trash a project listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectScope {
    #[default]
    Active,
    Trashed,
    All,
}

/// Query options for listing projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    pub scope: ProjectScope,
    /// Optional exact tag filter (case-insensitive).
    pub tag: Option<String>,
}

/// Repository interface for project operations.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    /// Replaces editable fields and the full tag set.
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId, include_deleted: bool) -> RepoResult<Option<Project>>;
    /// Lists projects ordered by `created_at DESC, uuid ASC`.
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    /// Moves a project to the trash; an already-trashed project keeps its
    /// first `deleted_at`.
    fn trash_project(&self, id: ProjectId, at: NaiveDateTime) -> RepoResult<()>;
    fn restore_project(&self, id: ProjectId) -> RepoResult<()>;
    /// Permanently removes a trashed project with its tasks and notes.
    fn purge_project(&self, id: ProjectId) -> RepoResult<()>;
    /// Distinct tags across every project, trashed ones included.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
    /// Active projects with `notify` set whose reminder falls on `date`.
    fn list_reminders(&self, date: NaiveDate) -> RepoResult<Vec<Project>>;
    /// Most recently created projects, trashed included.
    fn list_recent_projects(&self, limit: u32) -> RepoResult<Vec<Project>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn project_exists(&self, id: ProjectId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM projects WHERE uuid = ?1;",
                [id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn query_projects(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            let mut project = parse_project_row(row)?;
            project.tags = load_tags(self.conn, project.id)?;
            projects.push(project);
        }
        Ok(projects)
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO projects (
                uuid,
                title,
                description,
                reminder_date,
                notify,
                is_deleted,
                deleted_at,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                project.id.to_string(),
                project.title.trim(),
                project.description.as_str(),
                project.reminder_date.map(date_to_db),
                bool_to_db(project.notify),
                bool_to_db(project.is_deleted),
                project.deleted_at.map(instant_to_db),
                instant_to_db(project.created_at),
            ],
        )?;
        replace_tags(&tx, project.id, &project.tags)?;
        tx.commit()?;

        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE projects
             SET
                title = ?2,
                description = ?3,
                reminder_date = ?4,
                notify = ?5
             WHERE uuid = ?1;",
            params![
                project.id.to_string(),
                project.title.trim(),
                project.description.as_str(),
                project.reminder_date.map(date_to_db),
                bool_to_db(project.notify),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }
        replace_tags(&tx, project.id, &project.tags)?;
        tx.commit()?;

        Ok(())
    }

    fn get_project(&self, id: ProjectId, include_deleted: bool) -> RepoResult<Option<Project>> {
        let sql = format!(
            "{PROJECT_SELECT_SQL}
             WHERE uuid = ?
               AND (? = 1 OR is_deleted = 0);"
        );
        let bind_values = vec![
            Value::Text(id.to_string()),
            Value::Integer(bool_to_db(include_deleted)),
        ];
        Ok(self.query_projects(&sql, bind_values)?.into_iter().next())
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match query.scope {
            ProjectScope::Active => sql.push_str(" AND is_deleted = 0"),
            ProjectScope::Trashed => sql.push_str(" AND is_deleted = 1"),
            ProjectScope::All => {}
        }

        if let Some(tag) = query.tag.as_deref().and_then(normalize_tag) {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM project_tags pt
                    WHERE pt.project_uuid = projects.uuid
                      AND pt.name = ?
                )",
            );
            bind_values.push(Value::Text(tag));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");
        self.query_projects(&sql, bind_values)
    }

    fn trash_project(&self, id: ProjectId, at: NaiveDateTime) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                is_deleted = 1,
                deleted_at = ?2
             WHERE uuid = ?1
               AND is_deleted = 0;",
            params![id.to_string(), instant_to_db(at)],
        )?;
        if changed == 0 && !self.project_exists(id)? {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn restore_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                is_deleted = 0,
                deleted_at = NULL
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn purge_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM projects WHERE uuid = ?1 AND is_deleted = 1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT name FROM project_tags ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(row.get::<_, String>(0)?);
        }
        Ok(tags)
    }

    fn list_reminders(&self, date: NaiveDate) -> RepoResult<Vec<Project>> {
        let sql = format!(
            "{PROJECT_SELECT_SQL}
             WHERE reminder_date = ?
               AND notify = 1
               AND is_deleted = 0
             ORDER BY created_at DESC, uuid ASC;"
        );
        self.query_projects(&sql, vec![Value::Text(date_to_db(date))])
    }

    fn list_recent_projects(&self, limit: u32) -> RepoResult<Vec<Project>> {
        let sql = format!("{PROJECT_SELECT_SQL} ORDER BY created_at DESC, uuid ASC LIMIT ?;");
        self.query_projects(&sql, vec![Value::Integer(i64::from(limit))])
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "projects.uuid")?;

    let reminder_date = match row.get::<_, Option<String>>("reminder_date")? {
        Some(value) => Some(date_from_db(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid reminder date `{value}` in projects.reminder_date"
            ))
        })?),
        None => None,
    };

    let deleted_at = match row.get::<_, Option<i64>>("deleted_at")? {
        Some(millis) => Some(parse_instant(millis, "projects.deleted_at")?),
        None => None,
    };

    let project = Project {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        tags: Vec::new(),
        reminder_date,
        notify: parse_flag(row.get("notify")?, "projects.notify")?,
        is_deleted: parse_flag(row.get("is_deleted")?, "projects.is_deleted")?,
        deleted_at,
        created_at: parse_instant(row.get("created_at")?, "projects.created_at")?,
    };
    project.validate()?;
    Ok(project)
}

fn load_tags(conn: &Connection, id: ProjectId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM project_tags
         WHERE project_uuid = ?1
         ORDER BY name ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get::<_, String>(0)?);
    }
    Ok(tags)
}

fn replace_tags(conn: &Connection, id: ProjectId, tags: &[String]) -> RepoResult<()> {
    let id_text = id.to_string();
    conn.execute(
        "DELETE FROM project_tags WHERE project_uuid = ?1;",
        [id_text.as_str()],
    )?;
    for tag in tags.iter().filter_map(|tag| normalize_tag(tag)) {
        conn.execute(
            "INSERT OR IGNORE INTO project_tags (project_uuid, name) VALUES (?1, ?2);",
            params![id_text.as_str(), tag],
        )?;
    }
    Ok(())
}
