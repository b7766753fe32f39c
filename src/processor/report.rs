use serde::Serialize;

use crate::{
    config::DashboardConfig,
    processor::{
        aggregates::{
            DepartmentRate, DepartmentStats, GenderCount, KpiStatus, PromotionCount,
            RetrenchmentCount, department_promotion_pct, department_retrenchment_pct,
            department_stats, gender_count, kpi_status, promo_count, retrench_count,
        },
        employee_table::EmployeeTable,
        filter_options::{FilterOptionSet, filter_options},
    },
};

/// Everything one dashboard rendering pass needs, computed in one go
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub gender: GenderCount,
    pub promotion: PromotionCount,
    pub retrenchment: RetrenchmentCount,
    pub departments: Vec<DepartmentStats>,
    pub department_promotion: Vec<DepartmentRate>,
    pub department_retrenchment: Vec<DepartmentRate>,
    pub kpi: KpiStatus,
    pub filters: FilterOptionSet,
}

impl DashboardReport {
    pub fn build(table: &EmployeeTable, config: &DashboardConfig) -> Self {
        DashboardReport {
            gender: gender_count(table),
            promotion: promo_count(table),
            retrenchment: retrench_count(table),
            departments: department_stats(table, config.join_mode),
            department_promotion: department_promotion_pct(table),
            department_retrenchment: department_retrenchment_pct(table),
            kpi: kpi_status(table, &config.targets),
            filters: filter_options(table, false),
        }
    }
}
