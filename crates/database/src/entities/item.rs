//! Course item entities: pages and assignments arranged in a per-course tree

use euclid_identity::Identifier;
use serde::Serialize;

use super::course::identity_eq;

/// Items with this visibility threshold are visible to every member.
pub const DEFAULT_VISIBLE_ROLE: i64 = -1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemKind {
    Page,
    Assignment,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Page => "Page",
            ItemKind::Assignment => "Assignment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Page" => Some(ItemKind::Page),
            "Assignment" => Some(ItemKind::Assignment),
            _ => None,
        }
    }
}

/// Kind-specific payload of an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ItemContent {
    Page {
        text_path: String,
    },
    Assignment {
        number_of_problems: i64,
        number_submissions: i64,
        sum_of_grades: f64,
    },
}

impl ItemContent {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemContent::Page { .. } => ItemKind::Page,
            ItemContent::Assignment { .. } => ItemKind::Assignment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseItem {
    pub id: Identifier,
    pub course_id: Identifier,
    pub name: String,
    pub creation_date: String,
    pub creator_id: Identifier,
    pub visible_role: i64,
    pub parent_id: Option<Identifier>,
    #[serde(flatten)]
    pub content: ItemContent,
}

identity_eq!(CourseItem);

impl CourseItem {
    pub fn kind(&self) -> ItemKind {
        self.content.kind()
    }

    /// Mean grade over all submissions, if any were recorded.
    pub fn average_grade(&self) -> Option<f64> {
        match self.content {
            ItemContent::Assignment {
                number_submissions,
                sum_of_grades,
                ..
            } if number_submissions > 0 => Some(sum_of_grades / number_submissions as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NewItemContent {
    Page,
    Assignment { number_of_problems: i64 },
}

#[derive(Debug, Clone)]
pub struct NewCourseItem {
    pub course_id: Identifier,
    pub creator_id: Identifier,
    pub name: String,
    pub visible_role: Option<i64>,
    pub parent_id: Option<Identifier>,
    pub content: NewItemContent,
}

/// Location of a page's markdown body.
pub fn page_text_path(id: &Identifier) -> String {
    format!("/static/c_page/{id}.md")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(submissions: i64, sum: f64) -> CourseItem {
        let id = Identifier::from_bytes([3; 18]);
        CourseItem {
            id,
            course_id: id,
            name: "Homework".into(),
            creation_date: String::new(),
            creator_id: id,
            visible_role: DEFAULT_VISIBLE_ROLE,
            parent_id: None,
            content: ItemContent::Assignment {
                number_of_problems: 4,
                number_submissions: submissions,
                sum_of_grades: sum,
            },
        }
    }

    #[test]
    fn average_grade_requires_submissions() {
        assert_eq!(assignment(0, 0.0).average_grade(), None);
        assert_eq!(assignment(4, 10.0).average_grade(), Some(2.5));
    }

    #[test]
    fn page_text_path_embeds_the_encoded_identifier() {
        let id = Identifier::from_bytes([0; 18]);
        assert_eq!(page_text_path(&id), "/static/c_page/AAAAAAAAAAAAAAAAAAAAAAAA.md");
    }

    #[test]
    fn kind_names_match_the_stored_column_values() {
        for kind in [ItemKind::Page, ItemKind::Assignment] {
            assert_eq!(ItemKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ItemKind::parse("Quiz"), None);
    }
}
