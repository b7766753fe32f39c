use pyo3::exceptions;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

use crate::config::{FillDefaults, JoinMode};
use crate::processor::{
    ProcessorError,
    aggregates::{department_stats, gender_count, promo_count, retrench_count},
    employee_table::EmployeeTable,
    export::table_to_csv,
    filter_options::filter_options,
};

/// Convert Rust errors to Python exceptions
impl From<ProcessorError> for PyErr {
    fn from(err: ProcessorError) -> PyErr {
        match err {
            ProcessorError::Io(e) => exceptions::PyIOError::new_err(e.to_string()),
            other => exceptions::PyValueError::new_err(other.to_string()),
        }
    }
}

/// Employee table handed to the Python presentation layer.
///
/// Aggregates come back as the plain tuples and dicts the dashboard widgets
/// consume.
#[pyclass(name = "EmployeeTable", frozen)]
pub struct PyEmployeeTable {
    inner: EmployeeTable,
}

#[pymethods]
impl PyEmployeeTable {
    #[new]
    #[pyo3(signature = (path, numeric_fill = 0.0, categorical_fill = "Unknown".to_string()))]
    pub fn new(path: &str, numeric_fill: f64, categorical_fill: String) -> PyResult<Self> {
        let fill = FillDefaults {
            numeric: numeric_fill,
            categorical: categorical_fill,
        };
        Ok(PyEmployeeTable {
            inner: EmployeeTable::load_csv(path, &fill)?,
        })
    }

    #[staticmethod]
    pub fn from_csv_text(text: &str) -> PyResult<Self> {
        Ok(PyEmployeeTable {
            inner: EmployeeTable::from_bytes(text.as_bytes(), &FillDefaults::default())?,
        })
    }

    fn __len__(&self) -> usize {
        self.inner.row_count()
    }

    /// (total, male, female, male_pct, female_pct)
    pub fn gender_count(&self) -> (usize, usize, usize, f64, f64) {
        let g = gender_count(&self.inner);
        (g.total, g.male, g.female, g.male_pct, g.female_pct)
    }

    /// (promoted, not_promoted, promoted_pct, not_promoted_pct)
    pub fn promo_count(&self) -> (usize, usize, f64, f64) {
        let p = promo_count(&self.inner);
        (p.promoted, p.not_promoted, p.promoted_pct, p.not_promoted_pct)
    }

    /// (retrench, not_retrench, retrench_pct, not_retrench_pct)
    pub fn retrench_count(&self) -> (usize, usize, f64, f64) {
        let r = retrench_count(&self.inner);
        (r.retrench, r.not_retrench, r.retrench_pct, r.not_retrench_pct)
    }

    #[pyo3(signature = (inner_join = false))]
    pub fn department_stats<'py>(
        &self,
        py: Python<'py>,
        inner_join: bool,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let join = if inner_join { JoinMode::Inner } else { JoinMode::Left };
        department_stats(&self.inner, join)
            .into_iter()
            .map(|s| {
                let row = PyDict::new(py);
                row.set_item("Department", s.department)?;
                row.set_item("MonthlyIncome", s.avg_monthly_income)?;
                row.set_item("PercentSalaryHike", s.avg_percent_salary_hike)?;
                row.set_item("TotalWorkingYears", s.avg_total_working_years)?;
                row.set_item("YearsAtCompany", s.avg_years_at_company)?;
                row.set_item("TrainingTimesLastYear", s.avg_training_times_last_year)?;
                row.set_item("OverTime", s.overtime_count)?;
                Ok(row)
            })
            .collect()
    }

    #[pyo3(signature = (empty = false))]
    pub fn filter_options<'py>(&self, py: Python<'py>, empty: bool) -> PyResult<Bound<'py, PyDict>> {
        let options = filter_options(&self.inner, empty);
        let dict = PyDict::new(py);
        dict.set_item("Gender", options.gender)?;
        dict.set_item("Department", options.department)?;
        dict.set_item("EducationField", options.education_field)?;
        dict.set_item("JobRole", options.job_role)?;
        dict.set_item("Age", options.age.map(<[i64; 2]>::from))?;
        dict.set_item("YearsAtCompany", options.years_at_company.map(<[i64; 2]>::from))?;
        Ok(dict)
    }

    /// CSV bytes for a download button
    pub fn to_csv<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &table_to_csv(&self.inner))
    }
}
