use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::processor::{
    FilterPredicate,
    employee::{EmployeeField, EmployeeRecord},
    employee_table::EmployeeTable,
};

/// Inclusive integer range, serialized as `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct NumericRange {
    pub min: i64,
    pub max: i64,
}

impl NumericRange {
    pub fn new(min: i64, max: i64) -> Self {
        NumericRange { min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    fn observed(values: impl Iterator<Item = i64>) -> Option<Self> {
        values.fold(None, |range, v| match range {
            None => Some(NumericRange::new(v, v)),
            Some(r) => Some(NumericRange::new(r.min.min(v), r.max.max(v))),
        })
    }
}

impl From<[i64; 2]> for NumericRange {
    fn from([min, max]: [i64; 2]) -> Self {
        NumericRange::new(min, max)
    }
}

impl From<NumericRange> for [i64; 2] {
    fn from(range: NumericRange) -> Self {
        [range.min, range.max]
    }
}

/// Values a caller may pick from to restrict the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterOptionSet {
    pub gender: Vec<String>,
    pub department: Vec<String>,
    pub education_field: Vec<String>,
    pub job_role: Vec<String>,
    /// `None` only for a table without rows
    pub age: Option<NumericRange>,
    pub years_at_company: Option<NumericRange>,
}

/// Filter options derived from the table.
///
/// Categorical values keep the order they are first seen in. With `empty`
/// set the categorical lists are cleared but the numeric ranges still span
/// the table, so a cleared selection stays within valid bounds.
pub fn filter_options(table: &EmployeeTable, empty: bool) -> FilterOptionSet {
    let distinct = |field: EmployeeField| {
        if empty {
            Vec::new()
        } else {
            unique_in_order(table.iter().filter_map(|r| r.categorical(field)))
        }
    };
    let range = |value: fn(&EmployeeRecord) -> i64| NumericRange::observed(table.iter().map(value));

    FilterOptionSet {
        gender: distinct(EmployeeField::Gender),
        department: distinct(EmployeeField::Department),
        education_field: distinct(EmployeeField::EducationField),
        job_role: distinct(EmployeeField::JobRole),
        age: range(|r| r.age),
        years_at_company: range(|r| r.years_at_company),
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// A caller's picks from a [`FilterOptionSet`].
///
/// An empty categorical list leaves that column unrestricted; a missing
/// range leaves the column unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct FilterSelection {
    pub gender: Vec<String>,
    pub department: Vec<String>,
    pub education_field: Vec<String>,
    pub job_role: Vec<String>,
    pub age: Option<NumericRange>,
    pub years_at_company: Option<NumericRange>,
}

impl FilterSelection {
    /// Predicates for every constrained column
    pub fn predicates(&self) -> Vec<(EmployeeField, FilterPredicate)> {
        let categorical = [
            (EmployeeField::Gender, &self.gender),
            (EmployeeField::Department, &self.department),
            (EmployeeField::EducationField, &self.education_field),
            (EmployeeField::JobRole, &self.job_role),
        ];
        let ranges = [
            (EmployeeField::Age, self.age),
            (EmployeeField::YearsAtCompany, self.years_at_company),
        ];

        categorical
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(field, values)| (field, FilterPredicate::OneOf(values.clone())))
            .chain(ranges.into_iter().filter_map(|(field, range)| {
                range.map(|r| (field, FilterPredicate::Between(r.min, r.max)))
            }))
            .collect()
    }
}

impl From<FilterOptionSet> for FilterSelection {
    fn from(options: FilterOptionSet) -> Self {
        FilterSelection {
            gender: options.gender,
            department: options.department,
            education_field: options.education_field,
            job_role: options.job_role,
            age: options.age,
            years_at_company: options.years_at_company,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::aggregates::gender_count;
    use crate::processor::employee_table::tests::{HEADER, make_table, row};

    fn sample() -> EmployeeTable {
        let mut rows = vec![
            row("Male", "Sales", 1, 3, 2, "No", 1.0),
            row("Female", "Research & Development", 1, 3, 2, "No", 1.0),
            row("Male", "Human Resources", 1, 3, 2, "No", 1.0),
        ];
        rows[1] = rows[1].replacen("35,", "22,", 1).replacen(",8,", ",1,", 1);
        rows[2] = rows[2].replacen("35,", "58,", 1).replacen(",8,", ",30,", 1);
        make_table(&rows)
    }

    #[test]
    fn test_options_in_first_seen_order() {
        let options = filter_options(&sample(), false);
        assert_eq!(options.gender, vec!["Male", "Female"]);
        assert_eq!(
            options.department,
            vec!["Sales", "Research & Development", "Human Resources"]
        );
        assert_eq!(options.education_field, vec!["Life Sciences"]);
        assert_eq!(options.job_role, vec!["Sales Executive"]);
        assert_eq!(options.age, Some(NumericRange::new(22, 58)));
        assert_eq!(options.years_at_company, Some(NumericRange::new(1, 30)));
    }

    #[test]
    fn test_empty_options_keep_ranges() {
        let table = sample();
        let options = filter_options(&table, true);
        assert!(options.gender.is_empty());
        assert!(options.department.is_empty());
        assert!(options.education_field.is_empty());
        assert!(options.job_role.is_empty());
        assert_eq!(options.age, filter_options(&table, false).age);
    }

    #[test]
    fn test_options_on_empty_table() {
        let table = EmployeeTable::from_bytes(HEADER.as_bytes(), &Default::default()).unwrap();
        let options = filter_options(&table, false);
        assert!(options.department.is_empty());
        assert_eq!(options.age, None);
    }

    #[test]
    fn test_options_serialize_like_column_names() {
        let json = serde_json::to_value(filter_options(&sample(), true)).unwrap();
        assert_eq!(json["Department"], serde_json::json!([]));
        assert_eq!(json["Age"], serde_json::json!([22, 58]));
        assert_eq!(json["YearsAtCompany"], serde_json::json!([1, 30]));
    }

    #[test]
    fn test_restrict_by_selection() {
        let table = sample();
        let selection = FilterSelection {
            gender: vec!["Male".into()],
            age: Some(NumericRange::new(30, 60)),
            ..Default::default()
        };
        let restricted = table.restrict(&selection).unwrap();
        assert_eq!(restricted.row_count(), 2);
        assert_eq!(gender_count(&restricted).male, 2);
        assert_eq!(table.row_count(), 3);

        let selection = FilterSelection {
            department: vec!["Human Resources".into()],
            years_at_company: Some(NumericRange::new(0, 10)),
            ..Default::default()
        };
        assert!(table.restrict(&selection).unwrap().is_empty());
    }

    #[test]
    fn test_full_selection_keeps_everything() {
        let table = sample();
        let selection = FilterSelection::from(filter_options(&table, false));
        assert_eq!(table.restrict(&selection).unwrap(), table);
        assert_eq!(table.restrict(&FilterSelection::default()).unwrap(), table);
    }

    #[test]
    fn test_selection_from_json() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{"Gender": ["Female"], "Age": [20, 30]}"#).unwrap();
        assert_eq!(selection.age, Some(NumericRange::new(20, 30)));
        assert_eq!(selection.predicates().len(), 2);
    }
}
