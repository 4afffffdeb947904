use crate::db::repository::{ItemFilter, ItemRepository, RepositoryError};
use crate::models::CostItem;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// 内存仓库 (并发安全)；键为 (项目ID, 条目ID)，记录插入序号以保证列表顺序稳定
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: DashMap<(String, String), (u64, CostItem)>,
    seq: AtomicU64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemRepository for MemoryRepository {
    fn list(&self, filter: &ItemFilter) -> Result<Vec<CostItem>, RepositoryError> {
        let mut rows: Vec<(u64, CostItem)> = self
            .items
            .iter()
            .filter(|entry| filter.matches(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, item)| item).collect())
    }

    fn insert(&self, item: CostItem) -> Result<CostItem, RepositoryError> {
        match self.items.entry((item.project_id.clone(), item.id.clone())) {
            Entry::Occupied(_) => Err(RepositoryError::DuplicateId(item.id)),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::SeqCst);
                slot.insert((seq, item.clone()));
                Ok(item)
            }
        }
    }

    fn update(&self, id: &str, item: CostItem) -> Result<CostItem, RepositoryError> {
        if item.id != id {
            return Err(RepositoryError::Backend(format!(
                "record id {} does not match {}",
                item.id, id
            )));
        }
        match self.items.get_mut(&(item.project_id.clone(), id.to_string())) {
            Some(mut row) => {
                row.1 = item.clone();
                Ok(item)
            }
            None => Err(RepositoryError::UnknownId(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, project: &str, group: &str) -> CostItem {
        CostItem::new(id, project, group, format!("{group}.1"))
    }

    #[test]
    fn list_filters_and_keeps_insert_order() {
        let repo = MemoryRepository::new();
        repo.insert(item("b", "p1", "610")).unwrap();
        repo.insert(item("a", "p1", "611")).unwrap();
        repo.insert(item("c", "p2", "610")).unwrap();

        let ids: Vec<String> = repo
            .list(&ItemFilter::project("p1"))
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);

        let filter = ItemFilter {
            project_id: "p1".to_string(),
            cost_group: Some("611".to_string()),
        };
        assert_eq!(repo.list(&filter).unwrap().len(), 1);
    }

    #[test]
    fn insert_rejects_duplicates_and_update_requires_existing() {
        let repo = MemoryRepository::new();
        repo.insert(item("a", "p1", "610")).unwrap();
        assert_eq!(
            repo.insert(item("a", "p1", "610")),
            Err(RepositoryError::DuplicateId("a".to_string()))
        );
        assert_eq!(
            repo.update("x", item("x", "p1", "610")),
            Err(RepositoryError::UnknownId("x".to_string()))
        );

        let mut changed = item("a", "p1", "610");
        changed.description = "Tisch".to_string();
        repo.update("a", changed).unwrap();
        // 同一ID在另一个项目中是独立记录
        repo.insert(item("a", "p2", "610")).unwrap();
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.list(&ItemFilter::project("p1")).unwrap()[0].description, "Tisch");
    }
}
