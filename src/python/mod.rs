#![cfg(feature = "python-bindings")]

use pyo3::types::PyModuleMethods;
use pyo3::{Bound, PyResult, Python, pymodule, types::PyModule};

pub mod py_employee_table;

#[pymodule]
fn hr_dashboard(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<py_employee_table::PyEmployeeTable>()?;
    Ok(())
}
