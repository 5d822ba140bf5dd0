//! Course item repository: pages, assignments and their parent tree.

use std::collections::HashSet;

use chrono::Utc;
use euclid_identity::Identifier;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::entities::{
    page_text_path, CourseItem, ItemContent, ItemKind, NewCourseItem, NewItemContent,
    DEFAULT_VISIBLE_ROLE,
};
use crate::types::{DatabaseError, DatabaseResult};

const ITEM_COLUMNS: &str = "id, course_id, name, creation_date, creator_id, kind, visible_role, \
     parent_id, text_path, number_of_problems, number_submissions, sum_of_grades";

#[derive(Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new page or assignment.
    ///
    /// A parent, when given, must exist and belong to the same course.
    pub async fn create(&self, request: &NewCourseItem) -> DatabaseResult<CourseItem> {
        let id = Identifier::generate()?;
        let content = match request.content {
            NewItemContent::Page => ItemContent::Page {
                text_path: page_text_path(&id),
            },
            NewItemContent::Assignment { number_of_problems } => ItemContent::Assignment {
                number_of_problems,
                number_submissions: 0,
                sum_of_grades: 0.0,
            },
        };
        let item = CourseItem {
            id,
            course_id: request.course_id,
            name: request.name.clone(),
            creation_date: Utc::now().to_rfc3339(),
            creator_id: request.creator_id,
            visible_role: request.visible_role.unwrap_or(DEFAULT_VISIBLE_ROLE),
            parent_id: request.parent_id,
            content,
        };

        let mut tx = self.pool.begin().await?;

        if let Some(parent_id) = &item.parent_id {
            let parent = fetch_item(&mut tx, parent_id)
                .await?
                .ok_or(DatabaseError::NotFound("parent item"))?;
            if parent.course_id != item.course_id {
                return Err(DatabaseError::InvalidHierarchy(
                    "parent belongs to a different course",
                ));
            }
        }

        let (text_path, problems, submissions, grades) = match &item.content {
            ItemContent::Page { text_path } => (Some(text_path.as_str()), None, None, None),
            ItemContent::Assignment {
                number_of_problems,
                number_submissions,
                sum_of_grades,
            } => (
                None,
                Some(*number_of_problems),
                Some(*number_submissions),
                Some(*sum_of_grades),
            ),
        };

        sqlx::query(
            "INSERT INTO course_items (id, course_id, name, creation_date, creator_id, kind, visible_role,
                 parent_id, text_path, number_of_problems, number_submissions, sum_of_grades)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(item.course_id)
        .bind(&item.name)
        .bind(&item.creation_date)
        .bind(item.creator_id)
        .bind(item.kind().as_str())
        .bind(item.visible_role)
        .bind(item.parent_id)
        .bind(text_path)
        .bind(problems)
        .bind(submissions)
        .bind(grades)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    pub async fn find_by_id(&self, id: &Identifier) -> DatabaseResult<Option<CourseItem>> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM course_items WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| map_item(&row)).transpose()
    }

    pub async fn list_by_course(&self, course_id: &Identifier) -> DatabaseResult<Vec<CourseItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM course_items WHERE course_id = ? ORDER BY creation_date, name"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_item).collect()
    }

    /// Identifiers of the item's direct children.
    pub async fn children_ids(&self, id: &Identifier) -> DatabaseResult<Vec<Identifier>> {
        Ok(sqlx::query_scalar(
            "SELECT id FROM course_items WHERE parent_id = ? ORDER BY creation_date, name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Move an item under a new parent, or to the top level with `None`.
    ///
    /// Rejects moves that would make the item its own ancestor or attach it
    /// to an item in another course.
    pub async fn set_parent(
        &self,
        id: &Identifier,
        parent_id: Option<&Identifier>,
    ) -> DatabaseResult<CourseItem> {
        let mut tx = self.pool.begin().await?;

        let mut item = fetch_item(&mut tx, id)
            .await?
            .ok_or(DatabaseError::NotFound("item"))?;

        if let Some(parent_id) = parent_id {
            let parent = fetch_item(&mut tx, parent_id)
                .await?
                .ok_or(DatabaseError::NotFound("parent item"))?;
            if parent.course_id != item.course_id {
                return Err(DatabaseError::InvalidHierarchy(
                    "parent belongs to a different course",
                ));
            }
            ensure_not_ancestor(&mut tx, id, parent_id).await?;
        }

        sqlx::query("UPDATE course_items SET parent_id = ? WHERE id = ?")
            .bind(parent_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        item.parent_id = parent_id.copied();
        Ok(item)
    }

    /// Record one graded submission against an assignment.
    pub async fn record_submission(&self, id: &Identifier, grade: f64) -> DatabaseResult<CourseItem> {
        let result = sqlx::query(
            "UPDATE course_items
             SET number_submissions = number_submissions + 1, sum_of_grades = sum_of_grades + ?
             WHERE id = ? AND kind = 'Assignment'",
        )
        .bind(grade)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => Err(DatabaseError::Unsupported(
                    "submissions are only accepted for assignments",
                )),
                None => Err(DatabaseError::NotFound("item")),
            };
        }

        self.find_by_id(id)
            .await?
            .ok_or(DatabaseError::NotFound("item"))
    }

    /// Delete an item, handing its children to its own parent.
    pub async fn delete(&self, id: &Identifier) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        let item = fetch_item(&mut tx, id)
            .await?
            .ok_or(DatabaseError::NotFound("item"))?;
        let moved = remove_item(&mut tx, &item.id, item.parent_id.as_ref()).await?;

        tx.commit().await?;

        debug!(item = %id, reparented = moved, "course item deleted");
        Ok(())
    }

    pub async fn count(&self) -> DatabaseResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM course_items")
            .fetch_one(&self.pool)
            .await?)
    }
}

/// Delete an item after handing its children to `parent_id`. Returns how many children moved.
pub(crate) async fn remove_item(
    tx: &mut Transaction<'_, Sqlite>,
    id: &Identifier,
    parent_id: Option<&Identifier>,
) -> DatabaseResult<u64> {
    let moved = sqlx::query("UPDATE course_items SET parent_id = ? WHERE parent_id = ?")
        .bind(parent_id)
        .bind(id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM course_items WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(moved)
}

async fn fetch_item(
    tx: &mut Transaction<'_, Sqlite>,
    id: &Identifier,
) -> DatabaseResult<Option<CourseItem>> {
    let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM course_items WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    row.map(|row| map_item(&row)).transpose()
}

/// Walk up from `start` and fail if `id` appears on the way to the root.
async fn ensure_not_ancestor(
    tx: &mut Transaction<'_, Sqlite>,
    id: &Identifier,
    start: &Identifier,
) -> DatabaseResult<()> {
    let mut seen = HashSet::new();
    let mut current = Some(*start);

    while let Some(node) = current {
        if node == *id {
            return Err(DatabaseError::InvalidHierarchy(
                "an item cannot become its own descendant",
            ));
        }
        if !seen.insert(node) {
            return Err(DatabaseError::InvalidHierarchy("item tree contains a cycle"));
        }

        current = sqlx::query_scalar::<_, Option<Identifier>>(
            "SELECT parent_id FROM course_items WHERE id = ?",
        )
        .bind(node)
        .fetch_optional(&mut **tx)
        .await?
        .flatten();
    }

    Ok(())
}

fn map_item(row: &SqliteRow) -> DatabaseResult<CourseItem> {
    let kind: String = row.try_get("kind")?;
    let content = match ItemKind::parse(&kind) {
        Some(ItemKind::Page) => ItemContent::Page {
            text_path: row.try_get("text_path")?,
        },
        Some(ItemKind::Assignment) => ItemContent::Assignment {
            number_of_problems: row.try_get("number_of_problems")?,
            number_submissions: row.try_get("number_submissions")?,
            sum_of_grades: row.try_get("sum_of_grades")?,
        },
        None => {
            return Err(DatabaseError::QueryError(sqlx::Error::Decode(
                format!("unknown course item kind {kind}").into(),
            )))
        }
    };

    Ok(CourseItem {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        name: row.try_get("name")?,
        creation_date: row.try_get("creation_date")?,
        creator_id: row.try_get("creator_id")?,
        visible_role: row.try_get("visible_role")?,
        parent_id: row.try_get("parent_id")?,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_course, test_pool};

    fn page(course_id: Identifier, creator_id: Identifier, parent_id: Option<Identifier>) -> NewCourseItem {
        NewCourseItem {
            course_id,
            creator_id,
            name: "Notes".into(),
            visible_role: None,
            parent_id,
            content: NewItemContent::Page,
        }
    }

    #[tokio::test]
    async fn test_create_page_and_assignment() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, owner) = create_course(&pool, "bob").await;
        let repo = ItemRepository::new(pool);

        let notes = repo.create(&page(course.id, owner.user_id, None)).await.unwrap();
        assert_eq!(notes.visible_role, DEFAULT_VISIBLE_ROLE);
        assert_eq!(
            notes.content,
            ItemContent::Page {
                text_path: page_text_path(&notes.id)
            }
        );

        let homework = repo
            .create(&NewCourseItem {
                name: "Homework".into(),
                visible_role: Some(10),
                content: NewItemContent::Assignment {
                    number_of_problems: 3,
                },
                ..page(course.id, owner.user_id, Some(notes.id))
            })
            .await
            .unwrap();

        let found = repo.find_by_id(&homework.id).await.unwrap().unwrap();
        assert_eq!(found.kind(), ItemKind::Assignment);
        assert_eq!(found.visible_role, 10);
        assert_eq!(found.parent_id, Some(notes.id));
        assert_eq!(repo.children_ids(&notes.id).await.unwrap(), vec![homework.id]);
        assert_eq!(repo.list_by_course(&course.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_parent_rejects_cycles() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, owner) = create_course(&pool, "bob").await;
        let repo = ItemRepository::new(pool);

        let root = repo.create(&page(course.id, owner.user_id, None)).await.unwrap();
        let child = repo.create(&page(course.id, owner.user_id, Some(root.id))).await.unwrap();
        let grandchild = repo.create(&page(course.id, owner.user_id, Some(child.id))).await.unwrap();

        assert!(matches!(
            repo.set_parent(&root.id, Some(&grandchild.id)).await,
            Err(DatabaseError::InvalidHierarchy(_))
        ));
        assert!(matches!(
            repo.set_parent(&root.id, Some(&root.id)).await,
            Err(DatabaseError::InvalidHierarchy(_))
        ));

        let moved = repo.set_parent(&grandchild.id, Some(&root.id)).await.unwrap();
        assert_eq!(moved.parent_id, Some(root.id));

        let detached = repo.set_parent(&child.id, None).await.unwrap();
        assert_eq!(detached.parent_id, None);
    }

    #[tokio::test]
    async fn test_parent_must_share_course() {
        let (pool, _temp_dir) = test_pool().await;
        let (algebra, bob) = create_course(&pool, "bob").await;
        let (topology, alice) = create_course(&pool, "alice").await;
        let repo = ItemRepository::new(pool);

        let foreign = repo.create(&page(topology.id, alice.user_id, None)).await.unwrap();
        assert!(matches!(
            repo.create(&page(algebra.id, bob.user_id, Some(foreign.id))).await,
            Err(DatabaseError::InvalidHierarchy(_))
        ));

        let local = repo.create(&page(algebra.id, bob.user_id, None)).await.unwrap();
        assert!(matches!(
            repo.set_parent(&local.id, Some(&foreign.id)).await,
            Err(DatabaseError::InvalidHierarchy(_))
        ));
    }

    #[tokio::test]
    async fn test_submissions_accumulate_on_assignments_only() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, owner) = create_course(&pool, "bob").await;
        let repo = ItemRepository::new(pool);

        let notes = repo.create(&page(course.id, owner.user_id, None)).await.unwrap();
        let homework = repo
            .create(&NewCourseItem {
                content: NewItemContent::Assignment {
                    number_of_problems: 2,
                },
                ..page(course.id, owner.user_id, None)
            })
            .await
            .unwrap();

        repo.record_submission(&homework.id, 3.0).await.unwrap();
        let graded = repo.record_submission(&homework.id, 5.0).await.unwrap();
        assert_eq!(graded.average_grade(), Some(4.0));

        assert!(matches!(
            repo.record_submission(&notes.id, 1.0).await,
            Err(DatabaseError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_reparents_children() {
        let (pool, _temp_dir) = test_pool().await;
        let (course, owner) = create_course(&pool, "bob").await;
        let repo = ItemRepository::new(pool);

        let root = repo.create(&page(course.id, owner.user_id, None)).await.unwrap();
        let middle = repo.create(&page(course.id, owner.user_id, Some(root.id))).await.unwrap();
        let leaf = repo.create(&page(course.id, owner.user_id, Some(middle.id))).await.unwrap();

        repo.delete(&middle.id).await.unwrap();

        assert!(repo.find_by_id(&middle.id).await.unwrap().is_none());
        let leaf = repo.find_by_id(&leaf.id).await.unwrap().unwrap();
        assert_eq!(leaf.parent_id, Some(root.id));
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
