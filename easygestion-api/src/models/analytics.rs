use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Money in and out of the salon for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub total_sales: f64,
    pub total_receipts: f64,
    pub total_expenses: f64,
    pub total_salaries: f64,
    pub total_admin_charges: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmployeePerformance {
    pub id: i32,
    pub name: String,
    pub total_sales: f64,
    pub total_receipts: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PackagePopularity {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub sales_count: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardAnalytics {
    pub current_month: MonthlySummary,
    pub employee_performance: Vec<EmployeePerformance>,
    pub popular_packages: Vec<PackagePopularity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RevenuePoint {
    /// `YYYY-MM`
    pub month: String,
    pub sales: f64,
    pub receipts: f64,
    pub expenses: f64,
    pub total_revenue: f64,
}
