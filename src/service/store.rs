use crate::error::EngineError;
use crate::models::{Action, Actor, Category, CostItem, ItemPatch, ItemStatus};
use crate::service::{calculator, policy};
use chrono::Utc;

/// 新条目默认值
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefaults {
    pub quantity: f64,
    pub unit: String,
    pub markup_percent: f64,
    pub category: Category,
}

impl Default for ItemDefaults {
    fn default() -> Self {
        Self {
            quantity: 1.0,
            unit: "Stk".to_string(),
            markup_percent: 25.0,
            category: Category::Standard,
        }
    }
}

/// 单个项目的条目集合 (权威数据)
///
/// 每次修改只影响一个条目；校验全部通过后才写入，失败时集合保持不变。
/// 非线程安全，并发场景由调用方加锁 (见 `ProjectService`)。
#[derive(Debug, Clone)]
pub struct ItemStore {
    project_id: String,
    items: Vec<CostItem>,
    defaults: ItemDefaults,
}

impl ItemStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_defaults(project_id, ItemDefaults::default())
    }

    pub fn with_defaults(project_id: impl Into<String>, defaults: ItemDefaults) -> Self {
        Self {
            project_id: project_id.into(),
            items: Vec::new(),
            defaults,
        }
    }

    /// 从持久化记录重建，派生字段一律重算
    pub fn from_items(
        project_id: impl Into<String>,
        mut items: Vec<CostItem>,
        defaults: ItemDefaults,
    ) -> Self {
        calculator::recompute_all(&mut items);
        Self {
            project_id: project_id.into(),
            items,
            defaults,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn items(&self) -> &[CostItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<CostItem> {
        self.items
    }

    pub fn get(&self, id: &str) -> Option<&CostItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 下一个位置号：组内最大序号 + 1 (不回填空缺)
    pub fn next_position(&self, cost_group: &str) -> String {
        let max_suffix = self
            .items
            .iter()
            .filter(|item| item.cost_group == cost_group)
            .filter_map(CostItem::position_suffix)
            .max()
            .unwrap_or(0);
        format!("{}.{}", cost_group, max_suffix + 1)
    }

    fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.items.iter().any(|item| item.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    fn index_of(&self, id: &str) -> Result<usize, EngineError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| EngineError::not_found(id))
    }

    /// 在成本组中新增一条默认条目
    pub fn add_item(&mut self, cost_group: &str) -> Result<CostItem, EngineError> {
        self.add_item_with(cost_group, &ItemPatch::default())
    }

    /// 新增条目并立即合并初始字段 (批量导入用)，任一字段非法则不新增
    pub fn add_item_with(
        &mut self,
        cost_group: &str,
        patch: &ItemPatch,
    ) -> Result<CostItem, EngineError> {
        let cost_group = cost_group.trim();
        if cost_group.is_empty() {
            return Err(EngineError::invalid("cost group must not be empty"));
        }

        let now = Utc::now();
        let mut item = CostItem::new(
            self.next_id(),
            self.project_id.clone(),
            cost_group,
            self.next_position(cost_group),
        );
        item.quantity = self.defaults.quantity;
        item.unit = self.defaults.unit.clone();
        item.markup_percent = self.defaults.markup_percent;
        item.category = self.defaults.category;
        item.created_at = Some(now);
        item.updated_at = Some(now);
        calculator::recompute(&mut item);

        self.apply_patch(&mut item, patch)?;
        self.items.push(item.clone());
        Ok(item)
    }

    /// 合并部分字段；修改定价输入时重算，有供应商的条目改 EK 后转为 SUBMITTED
    pub fn update_item(&mut self, id: &str, patch: &ItemPatch) -> Result<CostItem, EngineError> {
        let idx = self.index_of(id)?;
        let mut updated = self.items[idx].clone();
        self.apply_patch(&mut updated, patch)?;
        updated.updated_at = Some(Utc::now());
        self.items[idx] = updated.clone();
        Ok(updated)
    }

    /// 切换客户放行：放行 -> APPROVED，撤回 -> DRAFT (覆盖之前的任何状态)
    pub fn approve_for_client(&mut self, id: &str) -> Result<CostItem, EngineError> {
        let idx = self.index_of(id)?;
        let item = &mut self.items[idx];
        item.approved_for_client = !item.approved_for_client;
        item.status = if item.approved_for_client {
            ItemStatus::Approved
        } else {
            ItemStatus::Draft
        };
        item.updated_at = Some(Utc::now());
        Ok(item.clone())
    }

    /// 选定供应商：状态置为 APPROVED，不改变 `approved_for_client`
    pub fn select_vendor(&mut self, id: &str, vendor_id: &str) -> Result<CostItem, EngineError> {
        let vendor_id = vendor_id.trim();
        if vendor_id.is_empty() {
            return Err(EngineError::invalid("vendor id must not be empty"));
        }
        let idx = self.index_of(id)?;
        let item = &mut self.items[idx];
        item.selected_vendor = Some(vendor_id.to_string());
        item.status = ItemStatus::Approved;
        item.updated_at = Some(Utc::now());
        Ok(item.clone())
    }

    pub fn add_item_as(&mut self, actor: &Actor, cost_group: &str) -> Result<CostItem, EngineError> {
        policy::require(actor.role, Action::AddItem)?;
        self.add_item(cost_group)
    }

    pub fn update_item_as(
        &mut self,
        actor: &Actor,
        id: &str,
        patch: &ItemPatch,
    ) -> Result<CostItem, EngineError> {
        let item = self.get(id).ok_or_else(|| EngineError::not_found(id))?;
        policy::check_patch(actor, item, patch)?;
        self.update_item(id, patch)
    }

    pub fn approve_for_client_as(&mut self, actor: &Actor, id: &str) -> Result<CostItem, EngineError> {
        policy::require(actor.role, Action::ApproveForClient)?;
        self.approve_for_client(id)
    }

    pub fn select_vendor_as(
        &mut self,
        actor: &Actor,
        id: &str,
        vendor_id: &str,
    ) -> Result<CostItem, EngineError> {
        policy::require(actor.role, Action::SelectVendor)?;
        self.select_vendor(id, vendor_id)
    }

    /// 把 patch 合并进 target (target 不在集合中，失败时调用方丢弃)
    fn apply_patch(&self, target: &mut CostItem, patch: &ItemPatch) -> Result<(), EngineError> {
        validate_patch(patch)?;
        let previous_vendor = target.vendor_id.clone();

        if let Some(group) = &patch.cost_group {
            let group = group.trim();
            if group != target.cost_group {
                target.cost_group = group.to_string();
                if patch.cost_group_position.is_none() {
                    target.cost_group_position = self.next_position(group);
                }
            }
        }
        if let Some(position) = &patch.cost_group_position {
            let position = position.trim();
            self.check_position(target, position)?;
            target.cost_group_position = position.to_string();
        }
        if let Some(description) = &patch.description {
            target.description = description.clone();
        }
        if let Some(unit) = &patch.unit {
            target.unit = unit.clone();
        }
        if let Some(quantity) = patch.quantity {
            target.quantity = quantity;
        }
        if let Some(purchase_price) = patch.purchase_price {
            target.purchase_price = purchase_price;
        }
        if let Some(markup_percent) = patch.markup_percent {
            target.markup_percent = markup_percent;
        }
        if let Some(category) = patch.category {
            target.category = category;
        }
        if let Some(vendor_id) = &patch.vendor_id {
            let vendor_id = vendor_id.trim();
            target.vendor_id = (!vendor_id.is_empty()).then(|| vendor_id.to_string());
        }
        if let Some(pdf_url) = &patch.pdf_url {
            target.pdf_url = (!pdf_url.trim().is_empty()).then(|| pdf_url.clone());
        }

        if patch.touches_pricing() {
            calculator::recompute(target);
        }
        if patch.purchase_price.is_some() && previous_vendor.is_some() {
            target.status = ItemStatus::Submitted;
        }
        Ok(())
    }

    /// 位置号必须以 "<成本组>." 开头且在组内唯一
    fn check_position(&self, target: &CostItem, position: &str) -> Result<(), EngineError> {
        let prefix = format!("{}.", target.cost_group);
        if !position.starts_with(&prefix) || position.len() == prefix.len() {
            return Err(EngineError::invalid(format!(
                "position '{}' does not belong to cost group {}",
                position, target.cost_group
            )));
        }
        let taken = self.items.iter().any(|other| {
            other.id != target.id
                && other.cost_group == target.cost_group
                && other.cost_group_position == position
        });
        if taken {
            return Err(EngineError::invalid(format!(
                "position '{}' already used in cost group {}",
                position, target.cost_group
            )));
        }
        Ok(())
    }
}

fn require_finite(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid(format!("{} must be a finite number", name)))
    }
}

/// patch 的静态校验 (不依赖集合状态)
pub fn validate_patch(patch: &ItemPatch) -> Result<(), EngineError> {
    if let Some(group) = &patch.cost_group {
        if group.trim().is_empty() {
            return Err(EngineError::invalid("cost group must not be empty"));
        }
    }
    if let Some(quantity) = patch.quantity {
        require_finite("quantity", quantity)?;
        if quantity < 0.0 {
            return Err(EngineError::invalid("quantity must not be negative"));
        }
    }
    if let Some(price) = patch.purchase_price {
        require_finite("purchasePrice", price)?;
        if price < 0.0 {
            return Err(EngineError::invalid("purchasePrice must not be negative"));
        }
    }
    if let Some(markup) = patch.markup_percent {
        require_finite("markupPercent", markup)?;
    }
    Ok(())
}
