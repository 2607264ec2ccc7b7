use std::sync::Arc;

use prep_core::model::{Catalog, CategoryId, Difficulty, QuestionFilter};

/// Owned row of the question-bank browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBankItem {
    pub category_id: CategoryId,
    pub category_title: String,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
    pub explanation: String,
}

impl QuestionBankItem {
    /// Text of the correct option.
    #[must_use]
    pub fn correct_text(&self) -> &str {
        self.options
            .get(self.correct_option)
            .map_or("", String::as_str)
    }
}

/// Read-only browsing over the catalog.
#[derive(Clone)]
pub struct QuestionBankService {
    catalog: Arc<Catalog>,
}

impl QuestionBankService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Questions matching `filter`, in catalog order.
    #[must_use]
    pub fn browse(&self, filter: &QuestionFilter) -> Vec<QuestionBankItem> {
        self.catalog
            .search(filter)
            .into_iter()
            .map(|hit| QuestionBankItem {
                category_id: hit.category.id().clone(),
                category_title: hit.category.title().to_string(),
                difficulty: hit.category.difficulty(),
                prompt: hit.question.prompt().to_string(),
                options: hit.question.options().to_vec(),
                correct_option: hit.question.correct_option(),
                explanation: hit.question.explanation().to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> QuestionBankService {
        QuestionBankService::new(Arc::new(Catalog::builtin().unwrap()))
    }

    #[test]
    fn empty_filter_lists_everything() {
        let items = service().browse(&QuestionFilter::default());
        assert_eq!(items.len(), 100);
        assert_eq!(items[0].category_id.as_str(), "coding");
    }

    #[test]
    fn filters_by_category_and_difficulty() {
        let service = service();
        let coding = service.browse(&QuestionFilter {
            category: Some(CategoryId::new("coding")),
            ..QuestionFilter::default()
        });
        assert_eq!(coding.len(), 10);
        assert!(coding.iter().all(|item| item.difficulty == Difficulty::Medium));

        let hard = service.browse(&QuestionFilter {
            difficulty: Some(Difficulty::Hard),
            ..QuestionFilter::default()
        });
        assert!(hard.iter().all(|item| item.difficulty == Difficulty::Hard));
    }

    #[test]
    fn search_is_case_insensitive() {
        let items = service().browse(&QuestionFilter {
            search: Some("BINARY SEARCH".into()),
            ..QuestionFilter::default()
        });
        assert!(!items.is_empty());
        assert!(
            items
                .iter()
                .all(|item| item.prompt.to_lowercase().contains("binary search")
                    || item.explanation.to_lowercase().contains("binary search")
                    || item.options.iter().any(|o| o.to_lowercase().contains("binary search")))
        );
        assert!(!items[0].correct_text().is_empty());
    }
}
