use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个成本组的汇总 (展示用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub cost_group: String,
    pub name: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_purchase: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_selling: Option<f64>,
}

/// 按角色口径的成本组合计 (ADMIN/CLIENT 按 VK, PARTNER/VENDOR 按 EK)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub per_group_totals: BTreeMap<String, f64>,
    pub grand_total: f64,
}

/// 利润 (VK - EK)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margin {
    pub amount: f64,
    pub percent: f64,
}

/// 项目概览卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub total_items: usize,
    pub approved_items: usize,
    pub ffe_items: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_purchase: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_selling: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
}

/// 预算检查结果，仅作提示，不阻止任何修改
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCheck {
    pub total: f64,
    pub limit: f64,
    pub remaining: f64,
    pub over_budget: bool,
}

/// 某供应商在一个成本组内的报价
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorOffer {
    pub vendor_id: String,
    pub item_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_purchase: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_selling: Option<f64>,
}

/// 成本组报价比较
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupComparison {
    pub cost_group: String,
    pub offers: Vec<VendorOffer>,
    pub submitted_item_ids: Vec<String>,
}

/// 汇总接口的完整返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub groups: Vec<GroupSummary>,
    pub aggregate: Aggregate,
    pub summary: ProjectSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffe_budget: Option<BudgetCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffe_alert: Option<String>,
}
