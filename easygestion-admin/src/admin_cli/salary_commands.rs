use chrono::NaiveDate;
use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use easygestion_api::dates::month_days;
use easygestion_api::models::Salary;
use easygestion_api::orm::employee::list_employees;
use easygestion_api::orm::salary::{generate_salaries, list_salaries_for_employee};

#[derive(Subcommand)]
pub enum SalaryAction {
    #[command(about = "Generate one salary per employee for a period")]
    Generate {
        #[arg(long, help = "First day of the period (YYYY-MM-DD)", requires = "end", conflicts_with = "month")]
        start: Option<NaiveDate>,
        #[arg(long, help = "Last day of the period, inclusive (YYYY-MM-DD)", requires = "start")]
        end: Option<NaiveDate>,
        #[arg(long, help = "Whole calendar month (YYYY-MM) instead of --start/--end")]
        month: Option<String>,
    },
    #[command(about = "List salaries, optionally for one employee")]
    Ls {
        #[arg(short, long, help = "Employee ID")]
        employee_id: Option<i32>,
    },
}

pub fn handle_salary_command_with_conn(
    conn: &mut SqliteConnection,
    action: SalaryAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SalaryAction::Generate { start, end, month } => {
            let (start, end) = resolve_period(start, end, month.as_deref())?;
            generate_salaries_impl(conn, start, end)?;
        }
        SalaryAction::Ls { employee_id } => list_salaries_impl(conn, employee_id)?,
    }
    Ok(())
}

/// Parses `YYYY-MM` into the first and last day of that month.
pub fn parse_month(value: &str) -> Result<(NaiveDate, NaiveDate), Box<dyn std::error::Error>> {
    let invalid = || format!("Invalid month '{}': expected YYYY-MM", value);
    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    month_days(year, month).ok_or_else(|| invalid().into())
}

fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    month: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), Box<dyn std::error::Error>> {
    match (start, end, month) {
        (Some(start), Some(end), None) => Ok((start, end)),
        (None, None, Some(month)) => parse_month(month),
        _ => Err("Pass either --start and --end, or --month".into()),
    }
}

pub fn generate_salaries_impl(
    conn: &mut SqliteConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Salary>, Box<dyn std::error::Error>> {
    if start > end {
        return Err("Period start must not be after period end".into());
    }

    let salaries = generate_salaries(conn, start, end)?;
    if salaries.is_empty() {
        println!("No employees; no salaries generated.");
        return Ok(salaries);
    }

    println!("Generated {} salary record(s) for {} to {}:", salaries.len(), start, end);
    for salary in &salaries {
        println!(
            "  Employee: {}, Base: {:.2}, Deduction: {}%, Total: {:.2}",
            salary.employee_id, salary.base_salary, salary.commission_percentage, salary.total_salary
        );
    }
    Ok(salaries)
}

pub fn list_salaries_impl(
    conn: &mut SqliteConnection,
    employee_id: Option<i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let employee_ids = match employee_id {
        Some(id) => vec![id],
        None => list_employees(conn)?.into_iter().map(|e| e.id).collect(),
    };

    let mut found = false;
    for id in employee_ids {
        for salary in list_salaries_for_employee(conn, id)? {
            found = true;
            println!(
                "  ID: {}, Employee: {}, Period: {} to {}, Total: {:.2}",
                salary.id, salary.employee_id, salary.period_start, salary.period_end, salary.total_salary
            );
        }
    }
    if !found {
        println!("No salaries found.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use easygestion_api::orm::testing::{at, insert_test_sale, seeded_employee, setup_test_db};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-02").unwrap(), (day(2025, 2, 1), day(2025, 2, 28)));
        assert_eq!(parse_month("2024-02").unwrap(), (day(2024, 2, 1), day(2024, 2, 29)));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("February").is_err());
    }

    #[test]
    fn test_resolve_period() {
        let range = resolve_period(Some(day(2025, 3, 1)), Some(day(2025, 3, 15)), None).unwrap();
        assert_eq!(range, (day(2025, 3, 1), day(2025, 3, 15)));
        assert!(resolve_period(None, None, None).is_err());
        assert!(resolve_period(Some(day(2025, 3, 1)), None, Some("2025-03")).is_err());
    }

    #[test]
    fn test_generate_salaries_for_month() {
        let mut conn = setup_test_db();
        let (employee, package) = seeded_employee(&mut conn);
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 31, 18));

        let (start, end) = parse_month("2025-03").unwrap();
        let salaries = generate_salaries_impl(&mut conn, start, end).unwrap();
        assert_eq!(salaries.len(), 1);
        assert_eq!(salaries[0].base_salary, 12.0);
        assert_eq!(salaries[0].total_salary, 7.2);
    }

    #[test]
    fn test_generate_rejects_reversed_period() {
        let mut conn = setup_test_db();
        assert!(generate_salaries_impl(&mut conn, day(2025, 3, 2), day(2025, 3, 1)).is_err());
    }
}
