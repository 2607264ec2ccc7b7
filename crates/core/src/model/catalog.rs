use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::model::category::{CategoryError, Difficulty, Question, QuestionError, QuizCategory};
use crate::model::ids::{CategoryId, QuestionId};

/// Built-in category set shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog repeats category id {0}")]
    DuplicateCategory(CategoryId),

    #[error(transparent)]
    Category(#[from] CategoryError),
}

//
// ─── CATALOG FILE SHAPE ────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct CategoryEntry {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    difficulty: Difficulty,
    time_limit_secs: u32,
    questions: Vec<QuestionEntry>,
}

#[derive(Debug, Deserialize)]
struct QuestionEntry {
    id: u32,
    prompt: String,
    options: Vec<String>,
    correct_option: usize,
    #[serde(default)]
    explanation: String,
}

impl CategoryEntry {
    fn into_category(self) -> Result<QuizCategory, CategoryError> {
        let id = self.id;
        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                Question::new(
                    QuestionId::new(q.id),
                    q.prompt,
                    q.options,
                    q.correct_option,
                    q.explanation,
                )
            })
            .collect::<Result<Vec<_>, QuestionError>>()
            .map_err(|source| CategoryError::InvalidQuestion {
                id: id.clone(),
                source,
            })?;

        QuizCategory::new(
            CategoryId::new(id),
            self.title,
            self.description,
            self.difficulty,
            questions,
            self.time_limit_secs,
        )
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Immutable, ordered set of quiz categories.
///
/// Categories are handed out as `Arc`s and never mutated after construction, so
/// an attempt holding one sees exactly the questions it started with.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Arc<QuizCategory>>,
}

impl Catalog {
    /// Builds a catalog from already-validated categories.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateCategory` if two categories share an id.
    pub fn new(categories: Vec<QuizCategory>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(categories.len());
        for category in &categories {
            if !seen.insert(category.id().clone()) {
                return Err(CatalogError::DuplicateCategory(category.id().clone()));
            }
        }
        Ok(Self {
            categories: categories.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parses a JSON array of categories.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed or any category fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CategoryEntry> = serde_json::from_str(json)?;
        let categories = entries
            .into_iter()
            .map(CategoryEntry::into_category)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(categories)
    }

    /// The catalog embedded at build time.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded data fails validation.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn categories(&self) -> &[Arc<QuizCategory>] {
        &self.categories
    }

    #[must_use]
    pub fn get(&self, id: &CategoryId) -> Option<Arc<QuizCategory>> {
        self.categories.iter().find(|c| c.id() == id).cloned()
    }

    /// Question-bank search across the catalog, in catalog order.
    #[must_use]
    pub fn search<'a>(&'a self, filter: &QuestionFilter) -> Vec<QuestionHit<'a>> {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.categories
            .iter()
            .filter(|c| filter.category.as_ref().is_none_or(|id| c.id() == id))
            .filter(|c| filter.difficulty.is_none_or(|d| c.difficulty() == d))
            .flat_map(|c| {
                c.questions().iter().map(move |q| QuestionHit {
                    category: c.as_ref(),
                    question: q,
                })
            })
            .filter(|hit| match &needle {
                None => true,
                Some(needle) => {
                    hit.question.prompt().to_lowercase().contains(needle)
                        || hit
                            .question
                            .options()
                            .iter()
                            .any(|o| o.to_lowercase().contains(needle))
                }
            })
            .collect()
    }
}

/// Filter for browsing the question bank. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub category: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
}

/// A question found by `Catalog::search`, with the category it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct QuestionHit<'a> {
    pub category: &'a QuizCategory,
    pub question: &'a Question,
}
