use anyhow::Context;
use api_client::{CatalogClient, RetryingSource};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use configuration::settings::Config;
use configuration::{init_tracing, load_config};
use core_types::{Product, UpsertOutcome};
use database::{close, connect, run_migrations, DbError, ProductRepository, SqlitePool};
use importer::{ProductImporter, SharedStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// The main entry point for the catalog importer.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    // Initialize the database connection and run migrations
    let db_pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::debug!(url = %config.database.url, "Product store ready.");

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Import(args) => handle_import(args, &config, &db_pool).await,
        Commands::List(args) => handle_list(args, &db_pool).await,
        Commands::Show { id } => handle_show(id, &db_pool).await,
    };

    close(&db_pool).await;
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Imports products from a remote catalog into a local SQLite store.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the whole catalog, or a single product with --id.
    Import(ImportArgs),
    /// List stored products, optionally filtered.
    List(ListArgs),
    /// Print one stored product as JSON.
    Show {
        /// The product id.
        id: i64,
    },
}

#[derive(Parser)]
struct ImportArgs {
    /// Catalog id of a single product to import. Omitted or 0 imports everything.
    #[arg(long, allow_negative_numbers = true)]
    id: Option<i64>,
}

#[derive(Parser)]
struct ListArgs {
    /// Only products whose name contains this text.
    #[arg(long)]
    name: Option<String>,

    /// Only products whose category contains this text.
    #[arg(long)]
    category: Option<String>,

    /// Only products with (true) or without (false) an image.
    #[arg(long)]
    has_image: Option<bool>,
}

// ==============================================================================
// Import Command Logic
// ==============================================================================

/// Handles the orchestration of the import process.
async fn handle_import(args: ImportArgs, config: &Config, db_pool: &SqlitePool) -> anyhow::Result<()> {
    let client = CatalogClient::new(&config.source)?;
    let source = RetryingSource::new(
        client,
        config.source.retry_attempts,
        config.source.retry_backoff(),
    );
    let store = SharedStore::new(ProductRepository::new(db_pool.clone()));
    let importer = ProductImporter::new(source, store, config.importer.max_concurrency);

    match args.id.filter(|id| *id != 0) {
        Some(id) => {
            println!("Importing product {id}...");
            match importer.import_one(id).await? {
                UpsertOutcome::Inserted => println!("Product {id} imported."),
                UpsertOutcome::Unchanged => println!("Product {id} was already imported."),
            }
        }
        None => {
            println!("Importing all products from {}...", config.source.base_url);

            // Set up the progress bar
            let progress_bar = ProgressBar::new(0);
            progress_bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-"),
            );

            let summary = importer.with_progress(progress_bar).import_all().await?;
            println!("Import complete: {summary}.");
        }
    }

    Ok(())
}

// ==============================================================================
// Query Commands
// ==============================================================================

async fn handle_list(args: ListArgs, db_pool: &SqlitePool) -> anyhow::Result<()> {
    let repo = ProductRepository::new(db_pool.clone());

    let mut products = match (&args.name, &args.category, args.has_image) {
        (None, None, None) => repo.list_products().await?,
        (None, None, Some(has_image)) => repo.search_by_image(has_image).await?,
        (Some(name), category, _) => {
            repo.search_by_name_and_category(name, category.as_deref().unwrap_or(""))
                .await?
        }
        (None, Some(category), _) => repo.search_by_category(category).await?,
    };
    if let Some(has_image) = args.has_image {
        products.retain(|p| p.has_image() == has_image);
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    println!("{}", render_table(&products));
    Ok(())
}

async fn handle_show(id: i64, db_pool: &SqlitePool) -> anyhow::Result<()> {
    let repo = ProductRepository::new(db_pool.clone());

    let product = match repo.get_product(id).await {
        Ok(product) => product,
        Err(DbError::NotFound) => anyhow::bail!("Product {id} is not in the store"),
        Err(e) => return Err(e.into()),
    };
    println!("{}", serde_json::to_string_pretty(&product)?);
    Ok(())
}

fn render_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Price", "Category", "Image"]);
    for product in products {
        table.add_row(vec![
            product.id.to_string(),
            product.name.clone(),
            format_minor_units(product.price),
            product.category.clone(),
            product.image_url.clone().unwrap_or_default(),
        ]);
    }
    table
}

/// Renders minor units as a major-unit amount, e.g. `1999` as `19.99`.
fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_render_with_two_decimals() {
        assert_eq!(format_minor_units(1999), "19.99");
        assert_eq!(format_minor_units(950), "9.50");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(0), "0.00");
        assert_eq!(format_minor_units(-125), "-1.25");
    }

    #[test]
    fn import_id_is_optional() {
        let cli = Cli::try_parse_from(["catalog-import", "import"]).unwrap();
        assert!(matches!(cli.command, Commands::Import(ImportArgs { id: None })));

        let cli = Cli::try_parse_from(["catalog-import", "import", "--id", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Import(ImportArgs { id: Some(7) })));

        let cli = Cli::try_parse_from(["catalog-import", "import", "--id", "-3"]).unwrap();
        assert!(matches!(cli.command, Commands::Import(ImportArgs { id: Some(-3) })));
    }

    #[test]
    fn list_filters_parse() {
        let cli = Cli::try_parse_from([
            "catalog-import",
            "--config",
            "other.toml",
            "list",
            "--category",
            "jewelery",
            "--has-image",
            "false",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.category.as_deref(), Some("jewelery"));
                assert_eq!(args.has_image, Some(false));
                assert!(args.name.is_none());
            }
            _ => panic!("expected the list command"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
