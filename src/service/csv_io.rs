use crate::models::{Action, Actor, Category, CostItem, Field, ItemPatch, Role};
use crate::service::aggregator::visible_items;
use crate::service::format::{format_de, format_quantity, parse_decimal};
use crate::service::policy;
use crate::service::store::ItemStore;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// 导入文件的一行 (分号分隔，首行为表头)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRow {
    cost_group: String,
    #[serde(default)]
    description: String,
    quantity: String,
    #[serde(default)]
    unit: Option<String>,
    purchase_price: String,
    #[serde(default)]
    markup_percent: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    vendor_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 数据行号，从 1 开始 (不含表头)
    pub row: usize,
    pub message: String,
}

/// 成功导入的行及新条目ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRow {
    pub row: usize,
    pub id: String,
}

/// 导入报告：单行失败不影响其他行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: Vec<CreatedRow>,
    pub errors: Vec<RowError>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ImportRow {
    fn into_patch(self) -> Result<(String, ItemPatch), String> {
        let quantity = parse_decimal(&self.quantity).map_err(|e| format!("quantity: {}", e))?;
        let purchase_price =
            parse_decimal(&self.purchase_price).map_err(|e| format!("purchasePrice: {}", e))?;
        let markup_percent = non_empty(self.markup_percent)
            .map(|raw| parse_decimal(&raw).map_err(|e| format!("markupPercent: {}", e)))
            .transpose()?;
        let category = non_empty(self.category)
            .and_then(|raw| Category::parse(&raw))
            .transpose()?;

        let patch = ItemPatch {
            description: non_empty(Some(self.description)),
            unit: non_empty(self.unit),
            quantity: Some(quantity),
            purchase_price: Some(purchase_price),
            markup_percent,
            category,
            vendor_id: non_empty(self.vendor_id),
            ..ItemPatch::default()
        };
        Ok((self.cost_group, patch))
    }
}

/// 批量导入：每行新增一个条目，错误逐行收集
///
/// 每行的字段与手工修改走同一张字段策略表，越权的行整行拒绝。
pub fn import_items<R: Read>(
    store: &mut ItemStore,
    actor: &Actor,
    input: R,
) -> Result<ImportReport, EngineError> {
    policy::require(actor.role, Action::ImportCsv)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut report = ImportReport::default();
    for (idx, record) in reader.deserialize::<ImportRow>().enumerate() {
        let row = idx + 1;
        let outcome = record
            .map_err(|e| e.to_string())
            .and_then(ImportRow::into_patch)
            .and_then(|(cost_group, patch)| {
                let draft = CostItem::new("", store.project_id(), cost_group.trim(), "");
                policy::check_patch(actor, &draft, &patch).map_err(|e| e.to_string())?;
                store
                    .add_item_with(&cost_group, &patch)
                    .map_err(|e| e.to_string())
            });
        match outcome {
            Ok(item) => report.created.push(CreatedRow { row, id: item.id }),
            Err(message) => report.errors.push(RowError { row, message }),
        }
    }
    Ok(report)
}

fn cell(item: &CostItem, field: Field) -> String {
    match field {
        Field::CostGroup => item.cost_group.clone(),
        Field::CostGroupPosition => item.cost_group_position.clone(),
        Field::Description => item.description.clone(),
        Field::Quantity => format_quantity(item.quantity),
        Field::Unit => item.unit.clone(),
        Field::PurchasePrice => format_de(item.purchase_price, 2),
        Field::TotalPurchasePrice => format_de(item.total_purchase_price(), 2),
        Field::MarkupPercent => format_de(item.markup_percent, 2),
        Field::SellingPriceUnit => format_de(item.selling_price_unit(), 2),
        Field::TotalSellingPrice => format_de(item.total_selling_price(), 2),
        Field::Category => item.category.as_str().to_string(),
        Field::VendorId => item.vendor_id.clone().unwrap_or_default(),
        Field::PdfUrl => item.pdf_url.clone().unwrap_or_default(),
    }
}

/// 导出角色可见的条目与字段 (德式数字格式，只在这里舍入到两位)
pub fn export_items<W: Write>(items: &[CostItem], role: Role, output: W) -> Result<(), csv::Error> {
    let fields = policy::visible_fields(role);
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(output);

    writer.write_record(fields.iter().map(|f| f.key()))?;
    for item in visible_items(items, role) {
        writer.write_record(fields.iter().map(|f| cell(item, *f)))?;
    }
    writer.flush()?;
    Ok(())
}
