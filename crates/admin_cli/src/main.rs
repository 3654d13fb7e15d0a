use std::{error::Error, io::Write, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use engine::{
    CatalogVariant, Currency, CurrencyPair, Engine, Packaging, PriceTiers, UnitCosts, Worksheet,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "landed_admin")]
#[command(about = "Admin utilities for the landed cost worksheet (catalog and saved scenarios)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./landed.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Catalog(Catalog),
    Scenario(Scenario),
}

#[derive(Args, Debug)]
struct Catalog {
    #[command(subcommand)]
    command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Insert or replace variants from a CSV file.
    Import(ImportArgs),
    List,
}

#[derive(Args, Debug)]
struct ImportArgs {
    file: PathBuf,
}

#[derive(Args, Debug)]
struct Scenario {
    #[command(subcommand)]
    command: ScenarioCommand,
}

#[derive(Subcommand, Debug)]
enum ScenarioCommand {
    List,
    /// Print a saved scenario as a fixed-width table.
    Show(ShowArgs),
    /// Write the derived rows of a saved scenario as CSV.
    Export(ExportArgs),
    /// Whole-carton shipment report of a saved scenario.
    Report(IdArgs),
    Delete(IdArgs),
}

#[derive(Args, Debug)]
struct IdArgs {
    id: Uuid,
}

#[derive(Args, Debug)]
struct ShowArgs {
    id: Uuid,
    #[arg(long)]
    title: Option<String>,
    /// Currency of catalog costs.
    #[arg(long, default_value = "USD", value_parser = parse_currency)]
    foreign_currency: Currency,
    /// Currency of landed costs and prices.
    #[arg(long, default_value = "MYR", value_parser = parse_currency)]
    local_currency: Currency,
}

fn parse_currency(value: &str) -> Result<Currency, String> {
    Currency::try_from(value).map_err(|err| err.to_string())
}

#[derive(Args, Debug)]
struct ExportArgs {
    id: Uuid,
    /// Output file; stdout when missing.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// One record of a catalog CSV file. A missing `id` creates a new variant.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    id: Option<Uuid>,
    brand: String,
    model: String,
    code: String,
    #[serde(default)]
    description: String,
    units_per_carton: u32,
    length_cm: f64,
    width_cm: f64,
    height_cm: f64,
    unit_cost_foreign: f64,
    #[serde(default)]
    unit_cost_local: f64,
    price_standard: f64,
    price_online: f64,
    price_proposal: f64,
}

impl From<CatalogRecord> for CatalogVariant {
    fn from(record: CatalogRecord) -> Self {
        Self {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            brand: record.brand,
            model: record.model,
            code: record.code,
            description: record.description,
            packaging: Packaging {
                units_per_carton: record.units_per_carton,
                length_cm: record.length_cm,
                width_cm: record.width_cm,
                height_cm: record.height_cm,
            },
            costs: UnitCosts {
                foreign: record.unit_cost_foreign,
                local: record.unit_cost_local,
            },
            prices: PriceTiers {
                standard: record.price_standard,
                online: record.price_online,
                proposal: record.price_proposal,
            },
        }
    }
}

fn read_catalog(
    reader: impl std::io::Read,
) -> Result<Vec<CatalogVariant>, Box<dyn Error + Send + Sync>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut variants = Vec::new();
    for record in reader.deserialize::<CatalogRecord>() {
        let variant = CatalogVariant::from(record?);
        variant.validate()?;
        variants.push(variant);
    }
    Ok(variants)
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn load_worksheet(
    engine: &Engine,
    id: Uuid,
) -> Result<(Worksheet, String), Box<dyn Error + Send + Sync>> {
    let scenario = engine.load_scenario(id).await?;
    let name = scenario.name.clone();
    let mut worksheet = Worksheet::new();
    worksheet.begin_load(true)?;
    worksheet.finish_load(Ok(scenario))?;
    Ok((worksheet, name))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Catalog(Catalog {
            command: CatalogCommand::Import(args),
        }) => {
            let file = std::fs::File::open(&args.file)?;
            let variants = read_catalog(file)?;
            let count = engine.upsert_variants(&variants).await?;
            println!("imported {count} variant(s) from {}", args.file.display());
        }
        Command::Catalog(Catalog {
            command: CatalogCommand::List,
        }) => {
            for variant in engine.list_purchasable_variants().await? {
                println!(
                    "{}  {:<12} {} {}  {}/carton  {:.2} / {:.2} / {:.2}",
                    variant.id,
                    variant.code,
                    variant.brand,
                    variant.model,
                    variant.packaging.units_per_carton,
                    variant.prices.standard,
                    variant.prices.online,
                    variant.prices.proposal,
                );
            }
        }
        Command::Scenario(Scenario {
            command: ScenarioCommand::List,
        }) => {
            for summary in engine.list_saved_scenarios().await? {
                println!(
                    "{}  {}  {} line(s)  {}",
                    summary.id,
                    summary.created_at.format("%Y-%m-%d %H:%M"),
                    summary.line_count,
                    summary.name
                );
            }
        }
        Command::Scenario(Scenario {
            command: ScenarioCommand::Show(args),
        }) => {
            let (worksheet, name) = load_worksheet(&engine, args.id).await?;
            let title = args.title.unwrap_or(name);
            let currencies = CurrencyPair {
                foreign: args.foreign_currency,
                local: args.local_currency,
            };
            let text = engine::render_print(
                &title,
                worksheet.computation(),
                worksheet.controls(),
                currencies,
            )?;
            print!("{text}");
        }
        Command::Scenario(Scenario {
            command: ScenarioCommand::Export(args),
        }) => {
            let (worksheet, _) = load_worksheet(&engine, args.id).await?;
            let data = engine::export_csv(worksheet.computation())?;
            match args.output {
                Some(path) => {
                    std::fs::write(&path, data)?;
                    println!("wrote {}", path.display());
                }
                None => std::io::stdout().write_all(&data)?,
            }
        }
        Command::Scenario(Scenario {
            command: ScenarioCommand::Report(args),
        }) => {
            let (worksheet, _) = load_worksheet(&engine, args.id).await?;
            let report = engine::shipment_report(worksheet.lines());
            for line in &report.lines {
                println!(
                    "{:<12} {:>6} x {:<4} -> {:>4} carton(s)  {:.4} m3",
                    line.code, line.quantity, line.units_per_carton, line.cartons, line.volume_m3
                );
            }
            println!(
                "total: {} carton(s), {:.4} m3",
                report.total_cartons, report.total_volume_m3
            );
        }
        Command::Scenario(Scenario {
            command: ScenarioCommand::Delete(args),
        }) => {
            engine.delete_scenario(args.id).await?;
            println!("deleted scenario: {}", args.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_csv_with_and_without_ids() {
        let id = Uuid::new_v4();
        let data = format!(
            "id,brand,model,code,description,units_per_carton,length_cm,width_cm,height_cm,\
             unit_cost_foreign,unit_cost_local,price_standard,price_online,price_proposal\n\
             {id},Acme,Kettle,AC-K1,1.7l,4,40,30,20,10,0,120,99,90\n\
             ,Acme,Toaster,AC-T2,,6,30,30,30,8.5,1.5,80,75,70\n"
        );
        let variants = read_catalog(data.as_bytes()).unwrap();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].id, id);
        assert_eq!(variants[0].packaging.units_per_carton, 4);
        assert_eq!(variants[0].prices.online, 99.0);
        assert_ne!(variants[1].id, id);
        assert_eq!(variants[1].description, "");
        assert_eq!(variants[1].costs.local, 1.5);
    }

    #[test]
    fn catalog_csv_with_infinite_cost_is_rejected() {
        let data = "brand,model,code,units_per_carton,length_cm,width_cm,height_cm,\
                    unit_cost_foreign,price_standard,price_online,price_proposal\n\
                    Acme,Kettle,AC-K1,4,40,30,20,inf,120,99,90\n";
        let err = read_catalog(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("foreign unit cost"));
    }

    #[test]
    fn show_accepts_currency_aliases() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "landed_admin",
            "scenario",
            "show",
            &id.to_string(),
            "--foreign-currency",
            "rmb",
        ])
        .unwrap();
        match cli.command {
            Command::Scenario(Scenario {
                command: ScenarioCommand::Show(args),
            }) => {
                assert_eq!(args.foreign_currency, Currency::Cny);
                assert_eq!(args.local_currency, Currency::Myr);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(
            Cli::try_parse_from([
                "landed_admin",
                "scenario",
                "show",
                &id.to_string(),
                "--local-currency",
                "GBP",
            ])
            .is_err()
        );
    }

    #[test]
    fn cli_parses_scenario_export() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "landed_admin",
            "--database-url",
            "sqlite::memory:",
            "scenario",
            "export",
            &id.to_string(),
            "-o",
            "out.csv",
        ])
        .unwrap();
        match cli.command {
            Command::Scenario(Scenario {
                command: ScenarioCommand::Export(args),
            }) => {
                assert_eq!(args.id, id);
                assert_eq!(args.output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
