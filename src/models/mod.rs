pub mod item;
pub mod payment;
pub mod role;
pub mod summary;

pub use item::{Category, CostItem, ItemPatch, ItemStatus};
pub use payment::{Amount, PaymentMetadata, PaymentRequest};
pub use role::{Action, Actor, Field, Role};
pub use summary::{
    Aggregate, BudgetCheck, GroupComparison, GroupSummary, Margin, ProjectReport,
    ProjectSummary, VendorOffer,
};
