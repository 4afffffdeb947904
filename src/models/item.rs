use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 成本类别：FF&E 受预算上限监控
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "FF&E")]
    Ffe,
    #[default]
    Standard,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ffe => "FF&E",
            Self::Standard => "Standard",
        }
    }

    /// 解析 CSV/表单中的类别文本，空串返回 None
    pub fn parse(raw: &str) -> Option<Result<Self, String>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let parsed = match raw.to_ascii_uppercase().as_str() {
            "FF&E" | "FFE" => Ok(Self::Ffe),
            "STANDARD" => Ok(Self::Standard),
            _ => Err(format!("unknown category '{}'", raw)),
        };
        Some(parsed)
    }
}

/// 条目状态 (供应商报价 / 管理员审批流转)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
}

/// 成本条目 (Kostenposition)
///
/// `total_purchase_price`、`selling_price_unit`、`total_selling_price` 为派生字段，
/// 只能由 `service::calculator::recompute` 写入，外部只读。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    pub id: String,
    pub project_id: String,
    pub cost_group: String,
    pub cost_group_position: String,
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub purchase_price: f64,
    pub markup_percent: f64,
    #[serde(default)]
    pub(crate) total_purchase_price: f64,
    #[serde(default)]
    pub(crate) selling_price_unit: f64,
    #[serde(default)]
    pub(crate) total_selling_price: f64,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub approved_for_client: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CostItem {
    /// 创建价格字段为零的草稿条目
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        cost_group: impl Into<String>,
        cost_group_position: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            cost_group: cost_group.into(),
            cost_group_position: cost_group_position.into(),
            description: String::new(),
            unit: String::new(),
            quantity: 0.0,
            purchase_price: 0.0,
            markup_percent: 0.0,
            total_purchase_price: 0.0,
            selling_price_unit: 0.0,
            total_selling_price: 0.0,
            category: Category::Standard,
            status: ItemStatus::Draft,
            approved_for_client: false,
            vendor_id: None,
            selected_vendor: None,
            pdf_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// EK 总价
    pub fn total_purchase_price(&self) -> f64 {
        self.total_purchase_price
    }

    /// VK 单价
    pub fn selling_price_unit(&self) -> f64 {
        self.selling_price_unit
    }

    /// VK 总价
    pub fn total_selling_price(&self) -> f64 {
        self.total_selling_price
    }

    pub fn is_ffe(&self) -> bool {
        self.category == Category::Ffe
    }

    /// 位置号最后一段的数字 ("610.3" -> 3)，非数字返回 None
    pub fn position_suffix(&self) -> Option<u64> {
        let mut parts = self.cost_group_position.split('.');
        let last = parts.next_back()?;
        // 至少需要 "组号.序号" 两段
        parts.next()?;
        last.trim().parse().ok()
    }
}

/// 部分更新 (PATCH)：只有出现的字段才会合并
///
/// 派生字段、状态、`approved_for_client`、`selected_vendor` 不在此列，
/// 只能通过 `ItemStore` 的状态流转修改。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_group_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl ItemPatch {
    /// 是否修改了定价输入 (数量 / EK / 加价率)
    pub fn touches_pricing(&self) -> bool {
        self.quantity.is_some() || self.purchase_price.is_some() || self.markup_percent.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
