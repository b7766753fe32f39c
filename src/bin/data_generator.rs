use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};

const DEPARTMENTS: [&str; 3] = ["Sales", "Research & Development", "Human Resources"];
const EDUCATION: [&str; 6] = [
    "Life Sciences",
    "Medical",
    "Marketing",
    "Technical Degree",
    "Human Resources",
    "Other",
];
const ROLES: [&str; 6] = [
    "Sales Executive",
    "Research Scientist",
    "Laboratory Technician",
    "Manager",
    "Human Resources",
    "Sales Representative",
];

/// Writes a synthetic employee dataset.
///
/// Usage: `data_generator [path] [rows]`, defaults `data/hr_data.csv` and 1470.
fn main() -> std::io::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "data/hr_data.csv".to_string());
    let rows: usize = args.next().and_then(|r| r.parse().ok()).unwrap_or(1470);

    if let Some(dir) = std::path::Path::new(&path).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "EmployeeNumber,Age,Attrition,Department,EducationField,Gender,JobRole,MonthlyIncome,\
OverTime,PercentSalaryHike,PerformanceRating,TotalWorkingYears,TrainingTimesLastYear,\
YearsAtCompany,YearsInCurrentRole,YearsSinceLastPromotion"
    )?;

    let mut rng = rand::rng();
    for i in 0..rows {
        let age = rng.random_range(18..61);
        let total_working_years = rng.random_range(0..=(age - 18));
        let years_at_company = rng.random_range(0..=total_working_years);
        let years_in_role = rng.random_range(0..=years_at_company);
        let years_since_promo = rng.random_range(0..=years_at_company);
        let rating = if rng.random_bool(0.15) { rng.random_range(1..3) } else { rng.random_range(3..5) };
        // A few blank cells so loads exercise the fill path
        let income = if rng.random_bool(0.01) {
            String::new()
        } else {
            rng.random_range(1000..20000).to_string()
        };

        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            i + 1,
            age,
            if rng.random_bool(0.16) { "Yes" } else { "No" },
            DEPARTMENTS[rng.random_range(0..DEPARTMENTS.len())],
            EDUCATION[rng.random_range(0..EDUCATION.len())],
            if rng.random_bool(0.6) { "Male" } else { "Female" },
            ROLES[rng.random_range(0..ROLES.len())],
            income,
            if rng.random_bool(0.28) { "Yes" } else { "No" },
            rng.random_range(11..26),
            rating,
            total_working_years,
            rng.random_range(0..7),
            years_at_company,
            years_in_role,
            years_since_promo,
        )?;
    }
    writer.flush()?;

    println!("Sample CSV generated: {} ({} rows)", path, rows);
    Ok(())
}
