//! Category schema and per-text info structures

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A comparison dimension between a resume and a job description.
///
/// Variants are declared in lexicographic order of their names so that the
/// derived `Ord` (and therefore every `BTreeMap<Category, _>`) iterates
/// categories alphabetically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Education,
    Experience,
    Industry,
    JobTitle,
    JobType,
    Location,
    Skills,
    YearsOfExperience,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Education,
        Category::Experience,
        Category::Industry,
        Category::JobTitle,
        Category::JobType,
        Category::Location,
        Category::Skills,
        Category::YearsOfExperience,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Education => "education",
            Category::Experience => "experience",
            Category::Industry => "industry",
            Category::JobTitle => "job_title",
            Category::JobType => "job_type",
            Category::Location => "location",
            Category::Skills => "skills",
            Category::YearsOfExperience => "years_of_experience",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected items of one category, as derived from a job description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaValue {
    Items(BTreeSet<String>),
    Years(u32),
}

/// Mapping category -> expected items. Built once from the job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySchema {
    entries: BTreeMap<Category, SchemaValue>,
}

impl CategorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items of a set-valued category, creating the empty set on first access
    pub(crate) fn items_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        let entry = self
            .entries
            .entry(category)
            .or_insert_with(|| SchemaValue::Items(BTreeSet::new()));
        if let SchemaValue::Years(_) = entry {
            *entry = SchemaValue::Items(BTreeSet::new());
        }
        match entry {
            SchemaValue::Items(items) => items,
            SchemaValue::Years(_) => unreachable!("entry was just replaced by an item set"),
        }
    }

    /// Insert a normalized (trimmed, lowercased) item; blank items are dropped
    pub fn add_item(&mut self, category: Category, item: &str) {
        let normalized = item.trim().to_lowercase();
        if !normalized.is_empty() {
            self.items_mut(category).insert(normalized);
        }
    }

    pub fn set_years(&mut self, years: u32) {
        self.entries
            .insert(Category::YearsOfExperience, SchemaValue::Years(years));
    }

    pub fn get(&self, category: Category) -> Option<&SchemaValue> {
        self.entries.get(&category)
    }

    pub fn items(&self, category: Category) -> Option<&BTreeSet<String>> {
        match self.entries.get(&category) {
            Some(SchemaValue::Items(items)) => Some(items),
            _ => None,
        }
    }

    pub fn years(&self) -> Option<u32> {
        match self.entries.get(&Category::YearsOfExperience) {
            Some(SchemaValue::Years(years)) => Some(*years),
            _ => None,
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        self.entries.contains_key(&category)
    }

    /// Entries in lexicographic category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &SchemaValue)> {
        self.entries.iter().map(|(c, v)| (*c, v))
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-category union of two schemas; years take the larger value
    pub fn merge(&self, other: &CategorySchema) -> CategorySchema {
        let mut merged = self.clone();
        for (category, value) in other.iter() {
            match value {
                SchemaValue::Items(items) => {
                    let target = merged.items_mut(category);
                    target.extend(items.iter().cloned());
                }
                SchemaValue::Years(years) => {
                    let current = merged.years().unwrap_or(0);
                    merged.set_years(current.max(*years));
                }
            }
        }
        merged
    }
}

/// Items of one category found in a specific text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    Items(Vec<String>),
    Years(u32),
}

/// Mapping category -> items verifiably present in one text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoStructure {
    entries: BTreeMap<Category, InfoValue>,
}

impl InfoStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, value: InfoValue) {
        self.entries.insert(category, value);
    }

    pub fn get(&self, category: Category) -> Option<&InfoValue> {
        self.entries.get(&category)
    }

    /// Items of a set-valued category; empty for missing or numeric entries
    pub fn items(&self, category: Category) -> &[String] {
        match self.entries.get(&category) {
            Some(InfoValue::Items(items)) => items,
            _ => &[],
        }
    }

    pub fn years(&self) -> Option<u32> {
        match self.entries.get(&Category::YearsOfExperience) {
            Some(InfoValue::Years(years)) => Some(*years),
            _ => None,
        }
    }

    pub fn contains(&self, category: Category) -> bool {
        self.entries.contains_key(&category)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &InfoValue)> {
        self.entries.iter().map(|(c, v)| (*c, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_is_lexicographic() {
        let mut names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        let declared = names.clone();
        names.sort();
        assert_eq!(names, declared);
    }

    #[test]
    fn test_category_name_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_name("text_similarity"), None);
    }

    #[test]
    fn test_add_item_normalizes() {
        let mut schema = CategorySchema::new();
        schema.add_item(Category::Skills, "  Python ");
        schema.add_item(Category::Skills, "PYTHON");
        schema.add_item(Category::Skills, "   ");

        let skills = schema.items(Category::Skills).unwrap();
        assert_eq!(skills.len(), 1);
        assert!(skills.contains("python"));
    }

    #[test]
    fn test_merge_unions_items_and_keeps_max_years() {
        let mut a = CategorySchema::new();
        a.add_item(Category::Skills, "rust");
        a.set_years(3);

        let mut b = CategorySchema::new();
        b.add_item(Category::Skills, "go");
        b.add_item(Category::Location, "berlin");
        b.set_years(5);

        let merged = a.merge(&b);
        assert_eq!(merged.items(Category::Skills).unwrap().len(), 2);
        assert!(merged.items(Category::Location).unwrap().contains("berlin"));
        assert_eq!(merged.years(), Some(5));
    }

    #[test]
    fn test_info_serializes_with_snake_case_keys() {
        let mut info = InfoStructure::new();
        info.insert(Category::JobTitle, InfoValue::Items(vec!["engineer".to_string()]));
        info.insert(Category::YearsOfExperience, InfoValue::Years(4));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["job_title"][0], "engineer");
        assert_eq!(json["years_of_experience"], 4);
    }
}
