use crate::models::CostItem;

/// 列表查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub project_id: String,
    pub cost_group: Option<String>,
}

impl ItemFilter {
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            cost_group: None,
        }
    }

    pub fn matches(&self, item: &CostItem) -> bool {
        item.project_id == self.project_id
            && self
                .cost_group
                .as_ref()
                .map_or(true, |group| &item.cost_group == group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    DuplicateId(String),
    UnknownId(String),
    Backend(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate item id: {id}"),
            Self::UnknownId(id) => write!(f, "unknown item id: {id}"),
            Self::Backend(message) => write!(f, "storage backend: {message}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 持久层协作者：只依赖这组 CRUD 形状，不关心具体存储
pub trait ItemRepository: Send + Sync {
    /// 按条件列出条目，顺序为插入顺序
    fn list(&self, filter: &ItemFilter) -> Result<Vec<CostItem>, RepositoryError>;

    fn insert(&self, item: CostItem) -> Result<CostItem, RepositoryError>;

    /// 以完整记录覆盖指定ID的条目
    fn update(&self, id: &str, item: CostItem) -> Result<CostItem, RepositoryError>;
}
