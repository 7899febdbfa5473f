use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use easygestion_api::models::{Package, PackageInput, UpdatePackageRequest};
use easygestion_api::orm::package::{
    deactivate_package, get_package, insert_package, list_all_packages, seed_default_packages,
    update_package,
};

#[derive(Subcommand)]
pub enum PackageAction {
    #[command(about = "List every package, active ones first")]
    Ls,
    #[command(about = "Add a package to the catalogue")]
    Add {
        #[arg(short, long, help = "Package name")]
        name: String,
        #[arg(short, long, help = "Price; 0 lets staff enter the amount per sale")]
        price: f64,
    },
    #[command(about = "Change a package's name or price")]
    Edit {
        #[arg(short, long, help = "Package ID to edit")]
        id: i32,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New price")]
        price: Option<f64>,
    },
    #[command(about = "Hide a package from new sales (past sales keep it)")]
    Deactivate {
        #[arg(short, long, help = "Package ID")]
        id: i32,
    },
    #[command(about = "Install the default catalogue if no packages exist")]
    Seed,
}

pub fn handle_package_command_with_conn(
    conn: &mut SqliteConnection,
    action: PackageAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PackageAction::Ls => list_packages_impl(conn)?,
        PackageAction::Add { name, price } => {
            add_package_impl(conn, &name, price)?;
        }
        PackageAction::Edit { id, name, price } => {
            edit_package_impl(conn, id, name, price)?;
        }
        PackageAction::Deactivate { id } => deactivate_package_impl(conn, id)?,
        PackageAction::Seed => {
            seed_packages_impl(conn)?;
        }
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), Box<dyn std::error::Error>> {
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Price must be a non-negative number, got {}", price).into());
    }
    Ok(())
}

pub fn list_packages_impl(conn: &mut SqliteConnection) -> Result<(), Box<dyn std::error::Error>> {
    let packages = list_all_packages(conn)?;
    if packages.is_empty() {
        println!("No packages found. Run `package seed` to install the defaults.");
        return Ok(());
    }
    println!("Packages:");
    for package in packages {
        println!(
            "  ID: {}, Name: {}, Price: {:.2}, Active: {}",
            package.id, package.name, package.price, package.is_active
        );
    }
    Ok(())
}

pub fn add_package_impl(
    conn: &mut SqliteConnection,
    name: &str,
    price: f64,
) -> Result<Package, Box<dyn std::error::Error>> {
    if name.trim().is_empty() {
        return Err("Package name cannot be empty".into());
    }
    check_price(price)?;

    let package = insert_package(
        conn,
        PackageInput {
            name: name.to_string(),
            price,
        },
    )?;
    println!("Package created successfully!");
    println!("ID: {}", package.id);
    println!("Name: {}", package.name);
    println!("Price: {:.2}", package.price);
    Ok(package)
}

pub fn edit_package_impl(
    conn: &mut SqliteConnection,
    id: i32,
    name: Option<String>,
    price: Option<f64>,
) -> Result<Package, Box<dyn std::error::Error>> {
    if name.is_none() && price.is_none() {
        return Err("Nothing to change: pass --name and/or --price".into());
    }
    if let Some(price) = price {
        check_price(price)?;
    }
    if get_package(conn, id)?.is_none() {
        return Err(format!("Package with ID {} not found", id).into());
    }

    let package = update_package(
        conn,
        id,
        UpdatePackageRequest {
            name,
            price,
            ..Default::default()
        },
    )?;
    println!("Package {} updated: {} at {:.2}", package.id, package.name, package.price);
    Ok(package)
}

pub fn deactivate_package_impl(
    conn: &mut SqliteConnection,
    id: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    if deactivate_package(conn, id)? == 0 {
        return Err(format!("Package with ID {} not found", id).into());
    }
    println!("Package {} deactivated", id);
    Ok(())
}

pub fn seed_packages_impl(conn: &mut SqliteConnection) -> Result<usize, Box<dyn std::error::Error>> {
    let created = seed_default_packages(conn)?;
    if created == 0 {
        println!("Packages already present; nothing seeded.");
    } else {
        println!("Seeded {} default package(s).", created);
    }
    Ok(created)
}
