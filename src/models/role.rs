use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 调用方角色，每次请求显式传入，不做持久化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin = 0,
    Partner = 1,
    Vendor = 2,
    Client = 3,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Partner, Role::Vendor, Role::Client];

    /// 在策略表中的列下标
    pub(crate) fn column(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Partner => "PARTNER",
            Self::Vendor => "VENDOR",
            Self::Client => "CLIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "PARTNER" => Ok(Self::Partner),
            "VENDOR" => Ok(Self::Vendor),
            "CLIENT" => Ok(Self::Client),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// 可见性策略表中的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CostGroup,
    CostGroupPosition,
    Description,
    Quantity,
    Unit,
    PurchasePrice,
    TotalPurchasePrice,
    MarkupPercent,
    SellingPriceUnit,
    TotalSellingPrice,
    Category,
    VendorId,
    PdfUrl,
}

impl Field {
    /// 表格顺序
    pub const ALL: [Field; 13] = [
        Field::CostGroup,
        Field::CostGroupPosition,
        Field::Description,
        Field::Quantity,
        Field::Unit,
        Field::PurchasePrice,
        Field::TotalPurchasePrice,
        Field::MarkupPercent,
        Field::SellingPriceUnit,
        Field::TotalSellingPrice,
        Field::Category,
        Field::VendorId,
        Field::PdfUrl,
    ];

    /// JSON / CSV 中的键名
    pub fn key(&self) -> &'static str {
        match self {
            Self::CostGroup => "costGroup",
            Self::CostGroupPosition => "costGroupPosition",
            Self::Description => "description",
            Self::Quantity => "quantity",
            Self::Unit => "unit",
            Self::PurchasePrice => "purchasePrice",
            Self::TotalPurchasePrice => "totalPurchasePrice",
            Self::MarkupPercent => "markupPercent",
            Self::SellingPriceUnit => "sellingPriceUnit",
            Self::TotalSellingPrice => "totalSellingPrice",
            Self::Category => "category",
            Self::VendorId => "vendorId",
            Self::PdfUrl => "pdfUrl",
        }
    }

    pub fn is_money(&self) -> bool {
        matches!(
            self,
            Self::PurchasePrice
                | Self::TotalPurchasePrice
                | Self::SellingPriceUnit
                | Self::TotalSellingPrice
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 受角色限制的整体操作 (非字段级)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddItem,
    ApproveForClient,
    SelectVendor,
    CompareOffers,
    ImportCsv,
    ExportCsv,
    RequestPayment,
    SetBudget,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddItem => "add item",
            Self::ApproveForClient => "approve for client",
            Self::SelectVendor => "select vendor",
            Self::CompareOffers => "compare vendor offers",
            Self::ImportCsv => "import csv",
            Self::ExportCsv => "export csv",
            Self::RequestPayment => "request payment",
            Self::SetBudget => "set budget limit",
        };
        f.write_str(name)
    }
}

/// 调用方身份：角色 + 供应商ID (仅 VENDOR 需要)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
}

impl Actor {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            vendor_id: None,
        }
    }

    pub fn vendor(vendor_id: impl Into<String>) -> Self {
        Self {
            role: Role::Vendor,
            vendor_id: Some(vendor_id.into()),
        }
    }
}
