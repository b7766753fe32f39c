//! Dashboard aggregates over an [`EmployeeTable`].
//!
//! Every function is a pure read of the table: results are computed fresh
//! on each call and nothing is retained between calls. Percentages are
//! rounded to two decimals (ties to even) and are 0 when the denominator
//! is 0.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    config::{JoinMode, KpiTargets},
    helpers::stats_helpers::{MeanAccumulator, percentage},
    processor::{
        employee::{EmployeeRecord, Retrenchment},
        employee_table::EmployeeTable,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenderCount {
    /// Every row of the table
    pub total: usize,
    pub male: usize,
    pub female: usize,
    pub male_pct: f64,
    pub female_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PromotionCount {
    pub promoted: usize,
    pub not_promoted: usize,
    pub promoted_pct: f64,
    pub not_promoted_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetrenchmentCount {
    pub retrench: usize,
    pub not_retrench: usize,
    pub retrench_pct: f64,
    pub not_retrench_pct: f64,
}

/// Per-department means and overtime headcount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentStats {
    pub department: String,
    pub headcount: usize,
    pub avg_monthly_income: f64,
    pub avg_percent_salary_hike: f64,
    pub avg_total_working_years: f64,
    pub avg_years_at_company: f64,
    pub avg_training_times_last_year: f64,
    /// Rows with `OverTime == "Yes"`
    pub overtime_count: usize,
}

/// Share of a department's headcount that carries a flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentRate {
    pub department: String,
    pub headcount: usize,
    pub count: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiCheck {
    pub rate: f64,
    pub target: f64,
    pub met: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiStatus {
    /// Met when the promotion rate is at least the minimum target
    pub promotion: KpiCheck,
    /// Met when the retrenchment rate does not exceed the maximum target
    pub retrenchment: KpiCheck,
}

/// Employee total and Male/Female split
pub fn gender_count(table: &EmployeeTable) -> GenderCount {
    let (male, female) = table
        .iter()
        .fold((0, 0), |(male, female), r| match r.gender.as_str() {
            "Male" => (male + 1, female),
            "Female" => (male, female + 1),
            _ => (male, female),
        });
    let total = table.row_count();
    GenderCount {
        total,
        male,
        female,
        male_pct: percentage(male, total),
        female_pct: percentage(female, total),
    }
}

/// Employees due and not due for promotion.
///
/// The denominator is the employee total reported by [`gender_count`].
pub fn promo_count(table: &EmployeeTable) -> PromotionCount {
    let groups = count_by(table, |r| r.to_be_promoted());
    let promoted = groups.get(&true).copied().unwrap_or(0);
    let not_promoted = groups.get(&false).copied().unwrap_or(0);
    let total = gender_count(table).total;
    PromotionCount {
        promoted,
        not_promoted,
        promoted_pct: percentage(promoted, total),
        not_promoted_pct: percentage(not_promoted, total),
    }
}

/// Employees due and not due for retrenchment, over the table's row count
pub fn retrench_count(table: &EmployeeTable) -> RetrenchmentCount {
    let groups = count_by(table, |r| r.to_be_retrenched().is_yes());
    let retrench = groups.get(&true).copied().unwrap_or(0);
    let not_retrench = groups.get(&false).copied().unwrap_or(0);
    let total = table.row_count();
    RetrenchmentCount {
        retrench,
        not_retrench,
        retrench_pct: percentage(retrench, total),
        not_retrench_pct: percentage(not_retrench, total),
    }
}

/// Per-department means joined with overtime counts, sorted by department.
///
/// With [`JoinMode::Inner`] departments without a single overtime row are
/// left out; with [`JoinMode::Left`] they are kept with a count of 0.
pub fn department_stats(table: &EmployeeTable, join: JoinMode) -> Vec<DepartmentStats> {
    #[derive(Default)]
    struct Acc {
        headcount: usize,
        monthly_income: MeanAccumulator,
        percent_salary_hike: MeanAccumulator,
        total_working_years: MeanAccumulator,
        years_at_company: MeanAccumulator,
        training_times_last_year: MeanAccumulator,
    }

    let mut means: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in table.iter() {
        let entry = means.entry(r.department.as_str()).or_default();
        entry.headcount += 1;
        entry.monthly_income.push(r.monthly_income);
        entry.percent_salary_hike.push(r.percent_salary_hike);
        entry.total_working_years.push(r.total_working_years);
        entry.years_at_company.push(r.years_at_company as f64);
        entry.training_times_last_year.push(r.training_times_last_year);
    }

    let mut overtime: BTreeMap<&str, usize> = BTreeMap::new();
    for r in table.iter().filter(|r| r.over_time == "Yes") {
        *overtime.entry(r.department.as_str()).or_insert(0) += 1;
    }

    means
        .into_iter()
        .filter_map(|(department, acc)| {
            let overtime_count = match (overtime.get(department), join) {
                (Some(&count), _) => count,
                (None, JoinMode::Left) => 0,
                (None, JoinMode::Inner) => return None,
            };
            Some(DepartmentStats {
                department: department.to_string(),
                headcount: acc.headcount,
                avg_monthly_income: acc.monthly_income.mean(),
                avg_percent_salary_hike: acc.percent_salary_hike.mean(),
                avg_total_working_years: acc.total_working_years.mean(),
                avg_years_at_company: acc.years_at_company.mean(),
                avg_training_times_last_year: acc.training_times_last_year.mean(),
                overtime_count,
            })
        })
        .collect()
}

/// Promotion rate within each department
pub fn department_promotion_pct(table: &EmployeeTable) -> Vec<DepartmentRate> {
    department_rate(table, |r| r.to_be_promoted())
}

/// Retrenchment rate within each department
pub fn department_retrenchment_pct(table: &EmployeeTable) -> Vec<DepartmentRate> {
    department_rate(table, |r| r.to_be_retrenched() == Retrenchment::Yes)
}

/// Checks the overall rates against the dashboard targets
pub fn kpi_status(table: &EmployeeTable, targets: &KpiTargets) -> KpiStatus {
    let promo = promo_count(table);
    let retrench = retrench_count(table);
    KpiStatus {
        promotion: KpiCheck {
            rate: promo.promoted_pct,
            target: targets.min_promotion_pct,
            met: promo.promoted_pct >= targets.min_promotion_pct,
        },
        retrenchment: KpiCheck {
            rate: retrench.retrench_pct,
            target: targets.max_retrenchment_pct,
            met: retrench.retrench_pct <= targets.max_retrenchment_pct,
        },
    }
}

fn count_by(table: &EmployeeTable, key: impl Fn(&EmployeeRecord) -> bool) -> BTreeMap<bool, usize> {
    let mut groups = BTreeMap::new();
    for r in table.iter() {
        *groups.entry(key(r)).or_insert(0) += 1;
    }
    groups
}

fn department_rate(
    table: &EmployeeTable,
    flag: impl Fn(&EmployeeRecord) -> bool,
) -> Vec<DepartmentRate> {
    // (headcount, flagged)
    let mut map: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in table.iter() {
        let entry = map.entry(r.department.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if flag(r) {
            entry.1 += 1;
        }
    }
    map.into_iter()
        .map(|(department, (headcount, count))| DepartmentRate {
            department: department.to_string(),
            headcount,
            count,
            pct: percentage(count, headcount),
        })
        .collect()
}
