//! TypeScript type generation module.
//!
//! This module exports TypeScript type definitions for all the structs
//! annotated with `#[ts(export)]`. When this file is compiled (typically
//! during testing), it generates .ts files in the specified output directory.

#[cfg(test)]
mod tests {
    use std::{env, path::Path};

    use ts_rs::TS;

    #[test]
    fn generate_typescript_types() {
        // Output directory: $EASYGESTION_TS_OUTPUT_DIR, else ../ts-bindings
        let output_dir_str = env::var("EASYGESTION_TS_OUTPUT_DIR")
            .unwrap_or_else(|_| "../ts-bindings".to_string());
        let output_dir = Path::new(&output_dir_str);

        if !output_dir.exists() {
            std::fs::create_dir_all(output_dir).expect("Failed to create output directory");
        }

        // Remove stale definitions so renamed types do not linger
        for entry in std::fs::read_dir(output_dir).expect("Failed to read output directory") {
            let path = entry.expect("Failed to read directory entry").path();
            if path.extension().and_then(|s| s.to_str()) == Some("ts") {
                std::fs::remove_file(&path)
                    .unwrap_or_else(|e| panic!("Failed to remove {:?}: {}", path, e));
            }
        }

        unsafe {
            env::set_var("TS_RS_EXPORT_DIR", output_dir);
        }

        use crate::api::{
            ErrorResponse,
            admin_charge::{ChargeFields, CreateAdminChargeRequest},
            auth::{LoginRequest, RegisterRequest},
            employee::UpdateEmployeeRequest,
            expense::{CreateExpenseRequest, UpdateExpenseRequest},
            receipt::{CreateReceiptRequest, UpdateReceiptRequest},
            sale::{CreateSaleRequest, UpdateSaleRequest},
            status::HealthStatus,
            user::{DeductionPercentageRequest, UpdateUserRequest},
        };
        use crate::models::*;

        // Accounts
        Role::export().expect("Failed to export Role type");
        UserProfile::export().expect("Failed to export UserProfile type");
        UserSummary::export().expect("Failed to export UserSummary type");
        UserWithEmployee::export().expect("Failed to export UserWithEmployee type");
        Employee::export().expect("Failed to export Employee type");
        EmployeeWithUser::export().expect("Failed to export EmployeeWithUser type");

        // Catalogue and ledger
        Package::export().expect("Failed to export Package type");
        PackageInput::export().expect("Failed to export PackageInput type");
        UpdatePackageRequest::export().expect("Failed to export UpdatePackageRequest type");
        Sale::export().expect("Failed to export Sale type");
        SaleWithPackage::export().expect("Failed to export SaleWithPackage type");
        Receipt::export().expect("Failed to export Receipt type");
        Expense::export().expect("Failed to export Expense type");
        ExpenseWithCreator::export().expect("Failed to export ExpenseWithCreator type");

        // Payroll and overhead
        Salary::export().expect("Failed to export Salary type");
        GenerateSalariesRequest::export().expect("Failed to export GenerateSalariesRequest type");
        AdminCharge::export().expect("Failed to export AdminCharge type");
        ChargeBreakdown::export().expect("Failed to export ChargeBreakdown type");

        // Goals and alerts
        Goal::export().expect("Failed to export Goal type");
        GoalInput::export().expect("Failed to export GoalInput type");
        Alert::export().expect("Failed to export Alert type");
        AlertType::export().expect("Failed to export AlertType type");
        AlertInput::export().expect("Failed to export AlertInput type");

        // Analytics
        MonthlySummary::export().expect("Failed to export MonthlySummary type");
        EmployeePerformance::export().expect("Failed to export EmployeePerformance type");
        PackagePopularity::export().expect("Failed to export PackagePopularity type");
        DashboardAnalytics::export().expect("Failed to export DashboardAnalytics type");
        RevenuePoint::export().expect("Failed to export RevenuePoint type");

        // Request bodies
        ErrorResponse::export().expect("Failed to export ErrorResponse type");
        RegisterRequest::export().expect("Failed to export RegisterRequest type");
        LoginRequest::export().expect("Failed to export LoginRequest type");
        UpdateUserRequest::export().expect("Failed to export UpdateUserRequest type");
        DeductionPercentageRequest::export()
            .expect("Failed to export DeductionPercentageRequest type");
        UpdateEmployeeRequest::export().expect("Failed to export UpdateEmployeeRequest type");
        CreateSaleRequest::export().expect("Failed to export CreateSaleRequest type");
        UpdateSaleRequest::export().expect("Failed to export UpdateSaleRequest type");
        CreateReceiptRequest::export().expect("Failed to export CreateReceiptRequest type");
        UpdateReceiptRequest::export().expect("Failed to export UpdateReceiptRequest type");
        CreateExpenseRequest::export().expect("Failed to export CreateExpenseRequest type");
        UpdateExpenseRequest::export().expect("Failed to export UpdateExpenseRequest type");
        ChargeFields::export().expect("Failed to export ChargeFields type");
        CreateAdminChargeRequest::export()
            .expect("Failed to export CreateAdminChargeRequest type");

        // Status API types
        HealthStatus::export().expect("Failed to export HealthStatus type");

        println!("TypeScript types generated successfully in {:?}", output_dir);
    }
}
