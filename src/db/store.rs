use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

use super::{course_from_row, parse_datetime, snapshot_from_row, unknown_value};
use crate::engine::Container;
use crate::error::Result;
use crate::models::*;
use crate::store::{NewItem, StructureStore};

const ITEM_COLUMNS: &str = "id, container_kind, container_id, parent_id, name, is_folder, \
                            depth, leaf_payload_ref, created_at, updated_at";

const RELATION_COLUMNS: &str =
    "id, container_kind, container_id, from_item_id, to_item_id, created_at";

/// [`StructureStore`] over one open SQLite connection or transaction.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn course(&self, id: i64) -> Result<Option<Course>> {
        let course = self
            .conn
            .query_row(
                "SELECT id, title, created_at, updated_at FROM courses WHERE id = ?",
                [id],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    pub fn snapshot(&self, id: i64) -> Result<Option<Snapshot>> {
        let snapshot = self
            .conn
            .query_row(
                "SELECT id, course_id, version, status, created_at, updated_at
                 FROM snapshots WHERE id = ?",
                [id],
                snapshot_from_row,
            )
            .optional()?;
        Ok(snapshot)
    }

    /// Inserts the next draft snapshot of a course.
    pub fn insert_snapshot(&mut self, course_id: i64) -> Result<Snapshot> {
        let now = Utc::now();
        let version: u32 = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM snapshots WHERE course_id = ?",
            [course_id],
            |row| row.get(0),
        )?;

        self.conn.execute(
            "INSERT INTO snapshots (course_id, version, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                course_id,
                version,
                SnapshotStatus::Draft.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        let id = self.conn.last_insert_rowid();
        let snapshot = self.conn.query_row(
            "SELECT id, course_id, version, status, created_at, updated_at
             FROM snapshots WHERE id = ?",
            [id],
            snapshot_from_row,
        )?;
        Ok(snapshot)
    }
}

impl StructureStore for SqliteStore<'_> {
    fn container(&self, scope: ContainerRef) -> Result<Option<Box<dyn Container>>> {
        Ok(match scope.kind {
            ContainerKind::Course => self
                .course(scope.id)?
                .map(|course| Box::new(course) as Box<dyn Container>),
            ContainerKind::Snapshot => self
                .snapshot(scope.id)?
                .map(|snapshot| Box::new(snapshot) as Box<dyn Container>),
        })
    }

    fn items(&self, scope: ContainerRef) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE container_kind = ? AND container_id = ? ORDER BY id"
        ))?;

        let items = stmt
            .query_map((scope.kind.as_str(), scope.id), item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn item(&self, id: i64) -> Result<Option<Item>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"),
                [id],
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    fn items_by_ids(&self, scope: ContainerRef, ids: &[i64]) -> Result<Vec<Item>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE container_kind = ? AND container_id = ? AND id IN ({placeholders})
             ORDER BY id"
        ))?;

        let mut params = vec![
            Value::Text(scope.kind.as_str().to_string()),
            Value::Integer(scope.id),
        ];
        params.extend(ids.iter().map(|id| Value::Integer(*id)));

        let items = stmt
            .query_map(params_from_iter(params), item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn insert_item(&mut self, scope: ContainerRef, item: NewItem) -> Result<Item> {
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO items (container_kind, container_id, parent_id, name, is_folder, depth,
                                leaf_payload_ref, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                scope.kind.as_str(),
                scope.id,
                item.parent_id,
                &item.name,
                item.is_folder,
                item.depth,
                item.leaf_payload_ref,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Item {
            id: self.conn.last_insert_rowid(),
            container_kind: scope.kind,
            container_id: scope.id,
            parent_id: item.parent_id,
            name: item.name,
            is_folder: item.is_folder,
            depth: item.depth,
            leaf_payload_ref: item.leaf_payload_ref,
            created_at: now,
            updated_at: now,
        })
    }

    fn update_item(&mut self, item: &Item) -> Result<()> {
        self.conn.execute(
            "UPDATE items SET name = ?, parent_id = ?, depth = ?, leaf_payload_ref = ?, updated_at = ?
             WHERE id = ?",
            (
                &item.name,
                item.parent_id,
                item.depth,
                item.leaf_payload_ref,
                item.updated_at.to_rfc3339(),
                item.id,
            ),
        )?;
        Ok(())
    }

    fn delete_items(&mut self, ids: &[i64]) -> Result<usize> {
        let mut stmt = self.conn.prepare("DELETE FROM items WHERE id = ?")?;
        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute([id])?;
        }
        Ok(deleted)
    }

    fn relations(&self, scope: ContainerRef) -> Result<Vec<Relation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RELATION_COLUMNS} FROM relations
             WHERE container_kind = ? AND container_id = ? ORDER BY id"
        ))?;

        let relations = stmt
            .query_map((scope.kind.as_str(), scope.id), relation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(relations)
    }

    fn relation(&self, id: i64) -> Result<Option<Relation>> {
        let relation = self
            .conn
            .query_row(
                &format!("SELECT {RELATION_COLUMNS} FROM relations WHERE id = ?"),
                [id],
                relation_from_row,
            )
            .optional()?;
        Ok(relation)
    }

    fn insert_relation(&mut self, scope: ContainerRef, edge: RelationInput) -> Result<Relation> {
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO relations (container_kind, container_id, from_item_id, to_item_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                scope.kind.as_str(),
                scope.id,
                edge.from_item_id,
                edge.to_item_id,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Relation {
            id: self.conn.last_insert_rowid(),
            container_kind: scope.kind,
            container_id: scope.id,
            from_item_id: edge.from_item_id,
            to_item_id: edge.to_item_id,
            created_at: now,
        })
    }

    fn retarget_relation(&mut self, id: i64, to_item_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE relations SET to_item_id = ? WHERE id = ?",
            (to_item_id, id),
        )?;
        Ok(())
    }

    fn delete_relations(&mut self, ids: &[i64]) -> Result<usize> {
        let mut stmt = self.conn.prepare("DELETE FROM relations WHERE id = ?")?;
        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute([id])?;
        }
        Ok(deleted)
    }

    fn delete_all_relations(&mut self, scope: ContainerRef) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM relations WHERE container_kind = ? AND container_id = ?",
            (scope.kind.as_str(), scope.id),
        )?;
        Ok(deleted)
    }
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        container_kind: kind_column(row, 1)?,
        container_id: row.get(2)?,
        parent_id: row.get(3)?,
        name: row.get(4)?,
        is_folder: row.get(5)?,
        depth: row.get(6)?,
        leaf_payload_ref: row.get(7)?,
        created_at: parse_datetime(row.get::<_, String>(8)?),
        updated_at: parse_datetime(row.get::<_, String>(9)?),
    })
}

fn relation_from_row(row: &Row<'_>) -> rusqlite::Result<Relation> {
    Ok(Relation {
        id: row.get(0)?,
        container_kind: kind_column(row, 1)?,
        container_id: row.get(2)?,
        from_item_id: row.get(3)?,
        to_item_id: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn kind_column(row: &Row<'_>, column: usize) -> rusqlite::Result<ContainerKind> {
    let raw: String = row.get(column)?;
    ContainerKind::from_str(&raw).ok_or_else(|| unknown_value(column, "container kind", &raw))
}
