use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, name, email, password_hash, autosave_on, vim_on, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                user.autosave_on,
                user.vim_on,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, email, password_hash, autosave_on, vim_on, created_at, updated_at
             FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    autosave_on: row.get(4)?,
                    vim_on: row.get(5)?,
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                    updated_at: parse_datetime(&row.get::<_, String>(7)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, email, password_hash, autosave_on, vim_on, created_at, updated_at
             FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    autosave_on: row.get(4)?,
                    vim_on: row.get(5)?,
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                    updated_at: parse_datetime(&row.get::<_, String>(7)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET name = ?1, email = ?2, password_hash = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                user.name,
                user.email,
                user.password_hash,
                format_datetime(&Utc::now()),
                user.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn update_user_settings(&self, id: &str, settings: EditorSettings) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET autosave_on = ?1, vim_on = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                settings.autosave_on,
                settings.vim_on,
                format_datetime(&Utc::now()),
                id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Workspace operations

    fn create_workspace(&self, workspace: &Workspace) -> Result<()> {
        self.conn().execute(
            "INSERT INTO workspaces (id, name, owner_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                workspace.id,
                workspace.name,
                workspace.owner_id,
                format_datetime(&workspace.created_at),
                format_datetime(&workspace.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, owner_id, created_at, updated_at FROM workspaces WHERE id = ?1",
            params![id],
            |row| {
                Ok(Workspace {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    owner_id: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_workspaces(&self, owner_id: &str) -> Result<Vec<Workspace>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, owner_id, created_at, updated_at
             FROM workspaces WHERE owner_id = ?1 ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![owner_id], |row| {
            Ok(Workspace {
                id: row.get(0)?,
                name: row.get(1)?,
                owner_id: row.get(2)?,
                created_at: parse_datetime(&row.get::<_, String>(3)?),
                updated_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_workspace(&self, workspace: &Workspace) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE workspaces SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![
                workspace.name,
                format_datetime(&Utc::now()),
                workspace.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_workspace(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM workspaces WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Folder operations

    fn create_folder(&self, folder: &Folder) -> Result<()> {
        self.conn().execute(
            "INSERT INTO folders (id, workspace_id, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                folder.id,
                folder.workspace_id,
                folder.name,
                format_datetime(&folder.created_at),
                format_datetime(&folder.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_folder(&self, id: &str) -> Result<Option<Folder>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, workspace_id, name, created_at, updated_at FROM folders WHERE id = ?1",
            params![id],
            |row| {
                Ok(Folder {
                    id: row.get(0)?,
                    workspace_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_folders(&self, workspace_id: &str) -> Result<Vec<Folder>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, name, created_at, updated_at
             FROM folders WHERE workspace_id = ?1 ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(Folder {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                name: row.get(2)?,
                created_at: parse_datetime(&row.get::<_, String>(3)?),
                updated_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_folder(&self, folder: &Folder) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE folders SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![folder.name, format_datetime(&Utc::now()), folder.id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_folder(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM files WHERE folder_id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        if count > 0 {
            return Err(Error::Conflict(
                "Cannot delete folder with files. Move or delete files first.".to_string(),
            ));
        }

        let rows = tx.execute("DELETE FROM folders WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    fn count_folder_files(&self, folder_id: &str) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM files WHERE folder_id = ?1",
            params![folder_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }

    // File operations

    fn create_file(&self, file: &File) -> Result<()> {
        self.conn().execute(
            "INSERT INTO files (id, workspace_id, folder_id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                file.id,
                file.workspace_id,
                file.folder_id,
                file.title,
                file.content,
                format_datetime(&file.created_at),
                format_datetime(&file.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_file(&self, id: &str) -> Result<Option<File>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, workspace_id, folder_id, title, content, created_at, updated_at
             FROM files WHERE id = ?1",
            params![id],
            |row| {
                Ok(File {
                    id: row.get(0)?,
                    workspace_id: row.get(1)?,
                    folder_id: row.get(2)?,
                    title: row.get(3)?,
                    content: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    updated_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_files(&self, workspace_id: &str) -> Result<Vec<File>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, workspace_id, folder_id, title, content, created_at, updated_at
             FROM files WHERE workspace_id = ?1 ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![workspace_id], |row| {
            Ok(File {
                id: row.get(0)?,
                workspace_id: row.get(1)?,
                folder_id: row.get(2)?,
                title: row.get(3)?,
                content: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
                updated_at: parse_datetime(&row.get::<_, String>(6)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_file(&self, file: &File) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE files SET title = ?1, content = ?2, folder_id = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                file.title,
                file.content,
                file.folder_id,
                format_datetime(&Utc::now()),
                file.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_file(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM files WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(temp: &TempDir) -> SqliteStore {
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        store
    }

    fn test_user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            autosave_on: true,
            vim_on: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_workspace(id: &str, owner_id: &str) -> Workspace {
        Workspace {
            id: id.to_string(),
            name: "Personal".to_string(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_folder(id: &str, workspace_id: &str, name: &str) -> Folder {
        Folder {
            id: id.to_string(),
            workspace_id: workspace_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_file(id: &str, workspace_id: &str, folder_id: Option<&str>, title: &str) -> File {
        File {
            id: id.to_string(),
            workspace_id: workspace_id.to_string(),
            folder_id: folder_id.map(String::from),
            title: title.to_string(),
            content: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"workspaces".to_string()));
        assert!(tables.contains(&"folders".to_string()));
        assert!(tables.contains(&"files".to_string()));
    }

    #[test]
    fn test_user_crud() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();

        let fetched = store.get_user("user-1").unwrap().unwrap();
        assert_eq!(fetched.email, "a@b.c");
        assert!(fetched.autosave_on);
        assert!(!fetched.vim_on);

        let by_email = store.get_user_by_email("a@b.c").unwrap().unwrap();
        assert_eq!(by_email.id, "user-1");

        let mut updated = fetched;
        updated.name = "Renamed".to_string();
        store.update_user(&updated).unwrap();
        assert_eq!(store.get_user("user-1").unwrap().unwrap().name, "Renamed");

        assert!(store.delete_user("user-1").unwrap());
        assert!(store.get_user("user-1").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();
        let result = store.create_user(&test_user("user-2", "a@b.c"));
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[test]
    fn test_update_user_settings() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();
        store
            .update_user_settings(
                "user-1",
                EditorSettings {
                    autosave_on: false,
                    vim_on: true,
                },
            )
            .unwrap();

        let user = store.get_user("user-1").unwrap().unwrap();
        assert!(!user.autosave_on);
        assert!(user.vim_on);

        let missing = store.update_user_settings("nope", EditorSettings::default());
        assert!(matches!(missing, Err(Error::NotFound)));
    }

    #[test]
    fn test_workspace_crud_and_listing_order() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();

        let mut first = test_workspace("ws-1", "user-1");
        first.name = "Personal".to_string();
        store.create_workspace(&first).unwrap();

        let mut second = test_workspace("ws-2", "user-1");
        second.name = "Work".to_string();
        store.create_workspace(&second).unwrap();

        let listed = store.list_workspaces("user-1").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Personal");
        assert_eq!(listed[1].name, "Work");

        let mut renamed = listed[1].clone();
        renamed.name = "Contracts".to_string();
        store.update_workspace(&renamed).unwrap();
        assert_eq!(
            store.get_workspace("ws-2").unwrap().unwrap().name,
            "Contracts"
        );

        assert!(store.delete_workspace("ws-1").unwrap());
        assert!(!store.delete_workspace("ws-1").unwrap());
    }

    #[test]
    fn test_user_delete_cascades() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();
        store.create_workspace(&test_workspace("ws-1", "user-1")).unwrap();
        store
            .create_folder(&test_folder("folder-1", "ws-1", "Notes"))
            .unwrap();
        store
            .create_file(&test_file("file-1", "ws-1", Some("folder-1"), "Todo"))
            .unwrap();

        store.delete_user("user-1").unwrap();

        assert!(store.get_workspace("ws-1").unwrap().is_none());
        assert!(store.get_folder("folder-1").unwrap().is_none());
        assert!(store.get_file("file-1").unwrap().is_none());
    }

    #[test]
    fn test_delete_folder_with_files_conflicts() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();
        store.create_workspace(&test_workspace("ws-1", "user-1")).unwrap();
        store
            .create_folder(&test_folder("folder-1", "ws-1", "Notes"))
            .unwrap();
        store
            .create_file(&test_file("file-1", "ws-1", Some("folder-1"), "Todo"))
            .unwrap();

        let blocked = store.delete_folder("folder-1");
        assert!(matches!(blocked, Err(Error::Conflict(_))));
        assert!(store.get_folder("folder-1").unwrap().is_some());

        store.delete_file("file-1").unwrap();
        assert!(store.delete_folder("folder-1").unwrap());
        assert!(store.get_folder("folder-1").unwrap().is_none());
    }

    #[test]
    fn test_file_crud_and_reparenting() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();
        store.create_workspace(&test_workspace("ws-1", "user-1")).unwrap();
        store
            .create_folder(&test_folder("folder-1", "ws-1", "Notes"))
            .unwrap();

        store
            .create_file(&test_file("file-1", "ws-1", None, "loose"))
            .unwrap();

        let mut file = store.get_file("file-1").unwrap().unwrap();
        assert!(file.folder_id.is_none());

        file.folder_id = Some("folder-1".to_string());
        file.content = "buy milk".to_string();
        store.update_file(&file).unwrap();

        let moved = store.get_file("file-1").unwrap().unwrap();
        assert_eq!(moved.folder_id.as_deref(), Some("folder-1"));
        assert_eq!(moved.content, "buy milk");

        file.folder_id = None;
        store.update_file(&file).unwrap();
        assert!(store.get_file("file-1").unwrap().unwrap().folder_id.is_none());

        assert!(store.delete_file("file-1").unwrap());
        assert!(store.get_file("file-1").unwrap().is_none());
    }

    #[test]
    fn test_list_files_scoped_to_workspace() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        store.create_user(&test_user("user-1", "a@b.c")).unwrap();
        store.create_workspace(&test_workspace("ws-1", "user-1")).unwrap();
        store.create_workspace(&test_workspace("ws-2", "user-1")).unwrap();

        store
            .create_file(&test_file("file-1", "ws-1", None, "one"))
            .unwrap();
        store
            .create_file(&test_file("file-2", "ws-2", None, "two"))
            .unwrap();

        let files = store.list_files("ws-1").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, "file-1");

        assert_eq!(store.count_folder_files("nope").unwrap(), 0);
    }
}
