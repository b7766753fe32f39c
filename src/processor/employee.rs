use std::fmt;

use serde::Serialize;

use crate::processor::column::{ColumnType, format_number};

/// Name of the derived promotion column in exports
pub const PROMOTION_COLUMN: &str = "ToBePromoted";
/// Name of the derived retrenchment column in exports
pub const RETRENCHMENT_COLUMN: &str = "ToBeRetrenched";

/// Source columns the table is built from.
///
/// Every variant is required at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeField {
    Gender,
    Department,
    EducationField,
    JobRole,
    Age,
    YearsAtCompany,
    YearsSinceLastPromotion,
    PerformanceRating,
    YearsInCurrentRole,
    OverTime,
    MonthlyIncome,
    PercentSalaryHike,
    TotalWorkingYears,
    TrainingTimesLastYear,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 14] = [
        EmployeeField::Gender,
        EmployeeField::Department,
        EmployeeField::EducationField,
        EmployeeField::JobRole,
        EmployeeField::Age,
        EmployeeField::YearsAtCompany,
        EmployeeField::YearsSinceLastPromotion,
        EmployeeField::PerformanceRating,
        EmployeeField::YearsInCurrentRole,
        EmployeeField::OverTime,
        EmployeeField::MonthlyIncome,
        EmployeeField::PercentSalaryHike,
        EmployeeField::TotalWorkingYears,
        EmployeeField::TrainingTimesLastYear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EmployeeField::Gender => "Gender",
            EmployeeField::Department => "Department",
            EmployeeField::EducationField => "EducationField",
            EmployeeField::JobRole => "JobRole",
            EmployeeField::Age => "Age",
            EmployeeField::YearsAtCompany => "YearsAtCompany",
            EmployeeField::YearsSinceLastPromotion => "YearsSinceLastPromotion",
            EmployeeField::PerformanceRating => "PerformanceRating",
            EmployeeField::YearsInCurrentRole => "YearsInCurrentRole",
            EmployeeField::OverTime => "OverTime",
            EmployeeField::MonthlyIncome => "MonthlyIncome",
            EmployeeField::PercentSalaryHike => "PercentSalaryHike",
            EmployeeField::TotalWorkingYears => "TotalWorkingYears",
            EmployeeField::TrainingTimesLastYear => "TrainingTimesLastYear",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == header)
    }

    pub fn column_type(self) -> ColumnType {
        match self {
            EmployeeField::Gender
            | EmployeeField::Department
            | EmployeeField::EducationField
            | EmployeeField::JobRole
            | EmployeeField::OverTime => ColumnType::Str,
            EmployeeField::Age
            | EmployeeField::YearsAtCompany
            | EmployeeField::YearsSinceLastPromotion
            | EmployeeField::PerformanceRating
            | EmployeeField::YearsInCurrentRole => ColumnType::Int64,
            EmployeeField::MonthlyIncome
            | EmployeeField::PercentSalaryHike
            | EmployeeField::TotalWorkingYears
            | EmployeeField::TrainingTimesLastYear => ColumnType::Float64,
        }
    }

    /// Position of this field in [`EmployeeField::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Retrenchment flag, rendered as `"Yes"` / `"No"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Retrenchment {
    Yes,
    No,
}

impl Retrenchment {
    pub fn as_str(self) -> &'static str {
        match self {
            Retrenchment::Yes => "Yes",
            Retrenchment::No => "No",
        }
    }

    pub fn is_yes(self) -> bool {
        self == Retrenchment::Yes
    }
}

impl From<bool> for Retrenchment {
    fn from(flag: bool) -> Self {
        if flag { Retrenchment::Yes } else { Retrenchment::No }
    }
}

impl fmt::Display for Retrenchment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Due for promotion: at least five years since the last one and a
/// rating above 2.
pub fn to_be_promoted(years_since_last_promotion: i64, performance_rating: i64) -> bool {
    years_since_last_promotion >= 5 && performance_rating > 2
}

/// Due for retrenchment: ten or more years in role with a rating below 3,
/// or three to nine years in role with the lowest rating.
pub fn to_be_retrenched(years_in_current_role: i64, performance_rating: i64) -> Retrenchment {
    let long_tenure = years_in_current_role >= 10 && performance_rating < 3;
    let mid_tenure = (3..10).contains(&years_in_current_role) && performance_rating == 1;
    Retrenchment::from(long_tenure || mid_tenure)
}

/// One employee row with its derived attributes.
///
/// Derived attributes are computed once when the record is built and are
/// not settable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeRecord {
    pub gender: String,
    pub department: String,
    pub education_field: String,
    pub job_role: String,
    pub age: i64,
    pub years_at_company: i64,
    pub years_since_last_promotion: i64,
    pub performance_rating: i64,
    pub years_in_current_role: i64,
    pub over_time: String,
    pub monthly_income: f64,
    pub percent_salary_hike: f64,
    pub total_working_years: f64,
    pub training_times_last_year: f64,
    to_be_promoted: bool,
    to_be_retrenched: Retrenchment,
}

/// Source values of one row, before derivation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFields {
    pub gender: String,
    pub department: String,
    pub education_field: String,
    pub job_role: String,
    pub age: i64,
    pub years_at_company: i64,
    pub years_since_last_promotion: i64,
    pub performance_rating: i64,
    pub years_in_current_role: i64,
    pub over_time: String,
    pub monthly_income: f64,
    pub percent_salary_hike: f64,
    pub total_working_years: f64,
    pub training_times_last_year: f64,
}

impl From<EmployeeFields> for EmployeeRecord {
    fn from(f: EmployeeFields) -> Self {
        let to_be_promoted = to_be_promoted(f.years_since_last_promotion, f.performance_rating);
        let to_be_retrenched = to_be_retrenched(f.years_in_current_role, f.performance_rating);
        EmployeeRecord {
            gender: f.gender,
            department: f.department,
            education_field: f.education_field,
            job_role: f.job_role,
            age: f.age,
            years_at_company: f.years_at_company,
            years_since_last_promotion: f.years_since_last_promotion,
            performance_rating: f.performance_rating,
            years_in_current_role: f.years_in_current_role,
            over_time: f.over_time,
            monthly_income: f.monthly_income,
            percent_salary_hike: f.percent_salary_hike,
            total_working_years: f.total_working_years,
            training_times_last_year: f.training_times_last_year,
            to_be_promoted,
            to_be_retrenched,
        }
    }
}

impl EmployeeRecord {
    pub fn to_be_promoted(&self) -> bool {
        self.to_be_promoted
    }

    pub fn to_be_retrenched(&self) -> Retrenchment {
        self.to_be_retrenched
    }

    pub fn categorical(&self, field: EmployeeField) -> Option<&str> {
        match field {
            EmployeeField::Gender => Some(&self.gender),
            EmployeeField::Department => Some(&self.department),
            EmployeeField::EducationField => Some(&self.education_field),
            EmployeeField::JobRole => Some(&self.job_role),
            EmployeeField::OverTime => Some(&self.over_time),
            _ => None,
        }
    }

    pub fn integer(&self, field: EmployeeField) -> Option<i64> {
        match field {
            EmployeeField::Age => Some(self.age),
            EmployeeField::YearsAtCompany => Some(self.years_at_company),
            EmployeeField::YearsSinceLastPromotion => Some(self.years_since_last_promotion),
            EmployeeField::PerformanceRating => Some(self.performance_rating),
            EmployeeField::YearsInCurrentRole => Some(self.years_in_current_role),
            _ => None,
        }
    }

    /// Cell text for export
    pub fn field_text(&self, field: EmployeeField) -> String {
        match field.column_type() {
            ColumnType::Str => self.categorical(field).unwrap_or_default().to_string(),
            ColumnType::Int64 => self.integer(field).unwrap_or_default().to_string(),
            ColumnType::Float64 => format_number(match field {
                EmployeeField::MonthlyIncome => self.monthly_income,
                EmployeeField::PercentSalaryHike => self.percent_salary_hike,
                EmployeeField::TotalWorkingYears => self.total_working_years,
                _ => self.training_times_last_year,
            }),
        }
    }
}
