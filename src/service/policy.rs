use crate::error::EngineError;
use crate::models::{Action, Actor, CostItem, Field, ItemPatch, Role};
use serde_json::{json, Map, Value};

/// 字段编辑权限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    No,
    Yes,
    /// 仅限报价供应商本人 (item.vendor_id == actor.vendor_id)
    OwnOffer,
}

#[derive(Debug, Clone, Copy)]
struct Access {
    see: bool,
    edit: Edit,
}

const HIDDEN: Access = Access { see: false, edit: Edit::No };
const READ: Access = Access { see: true, edit: Edit::No };
const WRITE: Access = Access { see: true, edit: Edit::Yes };
const OWN: Access = Access { see: true, edit: Edit::OwnOffer };

/// 字段策略表，列顺序: ADMIN, PARTNER, VENDOR, CLIENT
const FIELD_POLICY: [(Field, [Access; 4]); 13] = [
    (Field::CostGroup, [WRITE, READ, READ, READ]),
    (Field::CostGroupPosition, [WRITE, READ, READ, READ]),
    (Field::Description, [WRITE, READ, READ, READ]),
    (Field::Quantity, [WRITE, WRITE, READ, READ]),
    (Field::Unit, [WRITE, READ, READ, READ]),
    (Field::PurchasePrice, [WRITE, WRITE, OWN, HIDDEN]),
    (Field::TotalPurchasePrice, [READ, READ, READ, HIDDEN]),
    (Field::MarkupPercent, [WRITE, HIDDEN, HIDDEN, READ]),
    (Field::SellingPriceUnit, [READ, HIDDEN, HIDDEN, READ]),
    (Field::TotalSellingPrice, [READ, HIDDEN, HIDDEN, READ]),
    (Field::Category, [WRITE, READ, HIDDEN, HIDDEN]),
    (Field::VendorId, [WRITE, READ, READ, HIDDEN]),
    (Field::PdfUrl, [WRITE, READ, READ, HIDDEN]),
];

/// 操作权限表，列顺序同上
const ACTION_POLICY: [(Action, [bool; 4]); 8] = [
    (Action::AddItem, [true, true, false, false]),
    (Action::ApproveForClient, [true, false, false, false]),
    (Action::SelectVendor, [true, false, false, false]),
    (Action::CompareOffers, [true, true, false, false]),
    (Action::ImportCsv, [true, true, false, false]),
    (Action::ExportCsv, [true, true, false, true]),
    (Action::RequestPayment, [true, false, false, false]),
    (Action::SetBudget, [true, false, false, false]),
];

fn access(role: Role, field: Field) -> Access {
    FIELD_POLICY
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, row)| row[role.column()])
        .unwrap_or(HIDDEN)
}

pub fn can_see_field(role: Role, field: Field) -> bool {
    access(role, field).see
}

pub fn can_edit_field(actor: &Actor, field: Field, item: &CostItem) -> bool {
    match access(actor.role, field).edit {
        Edit::No => false,
        Edit::Yes => true,
        Edit::OwnOffer => match (&actor.vendor_id, &item.vendor_id) {
            (Some(caller), Some(owner)) => caller == owner,
            _ => false,
        },
    }
}

pub fn can_perform(role: Role, action: Action) -> bool {
    ACTION_POLICY
        .iter()
        .find(|(a, _)| *a == action)
        .map(|(_, row)| row[role.column()])
        .unwrap_or(false)
}

pub fn require(role: Role, action: Action) -> Result<(), EngineError> {
    if can_perform(role, action) {
        Ok(())
    } else {
        Err(EngineError::policy(role, action.to_string()))
    }
}

/// 某角色可见的字段 (表格顺序)
pub fn visible_fields(role: Role) -> Vec<Field> {
    FIELD_POLICY
        .iter()
        .filter(|(_, row)| row[role.column()].see)
        .map(|(field, _)| *field)
        .collect()
}

/// patch 涉及的字段
pub fn touched_fields(patch: &ItemPatch) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut mark = |present: bool, field: Field| {
        if present {
            fields.push(field);
        }
    };
    mark(patch.cost_group.is_some(), Field::CostGroup);
    mark(patch.cost_group_position.is_some(), Field::CostGroupPosition);
    mark(patch.description.is_some(), Field::Description);
    mark(patch.quantity.is_some(), Field::Quantity);
    mark(patch.unit.is_some(), Field::Unit);
    mark(patch.purchase_price.is_some(), Field::PurchasePrice);
    mark(patch.markup_percent.is_some(), Field::MarkupPercent);
    mark(patch.category.is_some(), Field::Category);
    mark(patch.vendor_id.is_some(), Field::VendorId);
    mark(patch.pdf_url.is_some(), Field::PdfUrl);
    fields
}

/// 检查 patch 中的每个字段，返回第一个越权字段
pub fn check_patch(actor: &Actor, item: &CostItem, patch: &ItemPatch) -> Result<(), EngineError> {
    match touched_fields(patch)
        .into_iter()
        .find(|field| !can_edit_field(actor, *field, item))
    {
        Some(field) => Err(EngineError::policy(actor.role, format!("edit {field}"))),
        None => Ok(()),
    }
}

fn field_value(item: &CostItem, field: Field) -> Value {
    match field {
        Field::CostGroup => json!(item.cost_group),
        Field::CostGroupPosition => json!(item.cost_group_position),
        Field::Description => json!(item.description),
        Field::Quantity => json!(item.quantity),
        Field::Unit => json!(item.unit),
        Field::PurchasePrice => json!(item.purchase_price),
        Field::TotalPurchasePrice => json!(item.total_purchase_price()),
        Field::MarkupPercent => json!(item.markup_percent),
        Field::SellingPriceUnit => json!(item.selling_price_unit()),
        Field::TotalSellingPrice => json!(item.total_selling_price()),
        Field::Category => json!(item.category),
        Field::VendorId => json!(item.vendor_id),
        Field::PdfUrl => json!(item.pdf_url),
    }
}

/// 按角色裁剪后的条目视图：不可见字段直接缺席
pub type ItemView = Map<String, Value>;

pub fn redact(item: &CostItem, role: Role) -> ItemView {
    let mut view = Map::new();
    view.insert("id".to_string(), json!(item.id));
    view.insert("projectId".to_string(), json!(item.project_id));
    view.insert("status".to_string(), json!(item.status));
    view.insert("approvedForClient".to_string(), json!(item.approved_for_client));
    for field in visible_fields(role) {
        view.insert(field.key().to_string(), field_value(item, field));
    }
    if can_see_field(role, Field::VendorId) {
        view.insert("selectedVendor".to_string(), json!(item.selected_vendor));
    }
    view
}
