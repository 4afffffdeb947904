use crate::config::{PaymentConfig, PricingConfig};
use crate::db::{ItemFilter, ItemRepository, RepositoryError};
use crate::error::EngineError;
use crate::models::{
    Action, Actor, CostItem, Field, GroupComparison, ItemPatch, PaymentRequest, ProjectReport,
};
use crate::service::csv_io::{self, ImportReport, RowError};
use crate::service::policy::{self, ItemView};
use crate::service::store::ItemStore;
use crate::service::{aggregator, budget, comparison, payment};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub enum ServiceError {
    Engine(EngineError),
    Repository(RepositoryError),
    Csv(csv::Error),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "{err}"),
            Self::Repository(err) => write!(f, "repository: {err}"),
            Self::Csv(err) => write!(f, "csv: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl From<csv::Error> for ServiceError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// 项目服务：按项目加锁，读入条目 -> 在 ItemStore 上执行操作 -> 写回被修改的条目
pub struct ProjectService {
    repo: Arc<dyn ItemRepository>,
    /// 写锁在项目首次写入时创建
    locks: DashMap<String, Arc<Mutex<()>>>,
    /// 项目级 FF&E 预算上限，未设置时使用配置值
    budgets: DashMap<String, f64>,
    pricing: PricingConfig,
    payment: PaymentConfig,
}

impl ProjectService {
    pub fn new(repo: Arc<dyn ItemRepository>, pricing: PricingConfig, payment: PaymentConfig) -> Self {
        Self {
            repo,
            locks: DashMap::new(),
            budgets: DashMap::new(),
            pricing,
            payment,
        }
    }

    fn project_lock(&self, project_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 在项目锁内执行一次修改，并把返回的条目写回仓库
    fn mutate<F>(&self, project_id: &str, op: F) -> Result<CostItem, ServiceError>
    where
        F: FnOnce(&mut ItemStore) -> Result<CostItem, EngineError>,
    {
        let lock = self.project_lock(project_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut store = self.load(project_id)?;
        let known: Vec<String> = store.items().iter().map(|i| i.id.clone()).collect();

        let item = op(&mut store)?;
        if known.contains(&item.id) {
            self.repo.update(&item.id, item.clone())?;
        } else {
            self.repo.insert(item.clone())?;
        }
        Ok(item)
    }

    fn load(&self, project_id: &str) -> Result<ItemStore, ServiceError> {
        let items = self.repo.list(&ItemFilter::project(project_id))?;
        Ok(ItemStore::from_items(project_id, items, self.pricing.item_defaults()))
    }

    /// 只读快照：项目已有写锁时在锁内读取，从未写入的项目不创建锁
    fn snapshot(&self, project_id: &str) -> Result<ItemStore, ServiceError> {
        let existing = self.locks.get(project_id).map(|entry| entry.value().clone());
        let _guard = existing
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
        self.load(project_id)
    }

    /// 项目当前生效的 FF&E 预算上限
    pub fn ffe_budget_limit(&self, project_id: &str) -> f64 {
        self.budgets
            .get(project_id)
            .map(|limit| *limit)
            .unwrap_or(self.pricing.ffe_budget_limit)
    }

    /// 设置项目级 FF&E 预算上限 (仅 ADMIN)
    pub fn set_ffe_budget_limit(
        &self,
        project_id: &str,
        actor: &Actor,
        limit: f64,
    ) -> Result<f64, ServiceError> {
        policy::require(actor.role, Action::SetBudget)?;
        if !limit.is_finite() || limit < 0.0 {
            return Err(EngineError::invalid(format!(
                "budget limit must be a non-negative number, got {}",
                limit
            ))
            .into());
        }
        self.budgets.insert(project_id.to_string(), limit);
        tracing::info!("项目 {} FF&E 预算上限设为 {:.2}", project_id, limit);
        Ok(limit)
    }

    pub fn list_items(&self, project_id: &str, actor: &Actor) -> Result<Vec<ItemView>, ServiceError> {
        let store = self.snapshot(project_id)?;
        Ok(aggregator::visible_items(store.items(), actor.role)
            .map(|item| policy::redact(item, actor.role))
            .collect())
    }

    pub fn add_item(&self, project_id: &str, actor: &Actor, cost_group: &str) -> Result<CostItem, ServiceError> {
        let item = self.mutate(project_id, |store| store.add_item_as(actor, cost_group))?;
        tracing::info!(
            "项目 {} 新增条目 {} (KG {}, 位置 {})",
            project_id, item.id, item.cost_group, item.cost_group_position
        );
        Ok(item)
    }

    pub fn update_item(
        &self,
        project_id: &str,
        actor: &Actor,
        id: &str,
        patch: &ItemPatch,
    ) -> Result<CostItem, ServiceError> {
        let item = self.mutate(project_id, |store| store.update_item_as(actor, id, patch))?;
        tracing::debug!(
            "项目 {} 条目 {} 已更新: EK总价 {:.2}, VK总价 {:.2}, 状态 {:?}",
            project_id, item.id, item.total_purchase_price(), item.total_selling_price(), item.status
        );
        Ok(item)
    }

    pub fn approve_for_client(&self, project_id: &str, actor: &Actor, id: &str) -> Result<CostItem, ServiceError> {
        let item = self.mutate(project_id, |store| store.approve_for_client_as(actor, id))?;
        tracing::info!(
            "项目 {} 条目 {} 客户放行: {}",
            project_id, item.id, item.approved_for_client
        );
        Ok(item)
    }

    pub fn select_vendor(
        &self,
        project_id: &str,
        actor: &Actor,
        id: &str,
        vendor_id: &str,
    ) -> Result<CostItem, ServiceError> {
        let item = self.mutate(project_id, |store| store.select_vendor_as(actor, id, vendor_id))?;
        tracing::info!("项目 {} 条目 {} 选定供应商 {}", project_id, item.id, vendor_id);
        Ok(item)
    }

    /// 汇总：成本组、合计、概览、项目总价与 FF&E 预算
    pub fn report(&self, project_id: &str, actor: &Actor) -> Result<ProjectReport, ServiceError> {
        let store = self.snapshot(project_id)?;
        let items = store.items();
        let role = actor.role;

        let ffe_budget = policy::can_see_field(role, Field::TotalSellingPrice)
            .then(|| budget::check_ffe_budget(items, role, self.ffe_budget_limit(project_id)));
        let ffe_alert = ffe_budget.as_ref().and_then(budget::alert_message);
        if let Some(alert) = &ffe_alert {
            tracing::warn!("项目 {}: {}", project_id, alert);
        }

        Ok(ProjectReport {
            groups: aggregator::summarize(items, role),
            aggregate: aggregator::aggregate(items, role),
            summary: aggregator::project_summary(items, role),
            client_total: aggregator::client_total(items, role),
            ffe_budget,
            ffe_alert,
        })
    }

    pub fn comparison(&self, project_id: &str, actor: &Actor) -> Result<Vec<GroupComparison>, ServiceError> {
        policy::require(actor.role, Action::CompareOffers)?;
        let store = self.snapshot(project_id)?;
        Ok(comparison::comparison(store.items(), actor.role))
    }

    /// 批量导入在一把项目锁内完成，成功的行逐条写入仓库
    pub fn import_csv(&self, project_id: &str, actor: &Actor, data: &str) -> Result<ImportReport, ServiceError> {
        let lock = self.project_lock(project_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut store = self.load(project_id)?;
        let mut report = csv_io::import_items(&mut store, actor, data.as_bytes())?;

        // 写入失败的行转入错误列表，报告只列出已落库的条目
        for created in std::mem::take(&mut report.created) {
            let Some(item) = store.get(&created.id) else {
                continue;
            };
            match self.repo.insert(item.clone()) {
                Ok(_) => report.created.push(created),
                Err(err) => report.errors.push(RowError {
                    row: created.row,
                    message: format!("repository: {err}"),
                }),
            }
        }
        report.errors.sort_by_key(|err| err.row);
        tracing::info!(
            "项目 {} CSV 导入: 新增 {} 行, 失败 {} 行",
            project_id,
            report.created.len(),
            report.errors.len()
        );
        for err in &report.errors {
            tracing::warn!("项目 {} CSV 第 {} 行: {}", project_id, err.row, err.message);
        }
        Ok(report)
    }

    pub fn export_csv(&self, project_id: &str, actor: &Actor) -> Result<String, ServiceError> {
        policy::require(actor.role, Action::ExportCsv)?;
        let store = self.snapshot(project_id)?;
        let mut out = Vec::new();
        csv_io::export_items(store.items(), actor.role, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn payment_request(
        &self,
        project_id: &str,
        actor: &Actor,
        project_name: &str,
        client_email: Option<&str>,
    ) -> Result<PaymentRequest, ServiceError> {
        policy::require(actor.role, Action::RequestPayment)?;
        let store = self.snapshot(project_id)?;
        let request = payment::payment_request(
            project_id,
            project_name,
            store.items(),
            client_email,
            &self.payment,
        )?;
        tracing::info!(
            "项目 {} 生成支付请求: {} {}",
            project_id, request.amount.value, request.amount.currency
        );
        Ok(request)
    }
}
