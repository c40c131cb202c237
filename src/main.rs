//! Quarry demo binary
//!
//! Loads the localized-name sample into an in-memory backend and pages
//! through `select distinct e.Id, coalesce(e.EnglishName, e.GermanName) as
//! LocalizedName from Entity e order by LocalizedName`.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quarry::backend::MemoryBackend;
use quarry::catalog::DataType;
use quarry::config::{EngineConfig, NullOrdering};
use quarry::fixtures::load_localized_names;
use quarry::projection::{OrderDirective, ProjectionList, Projections};
use quarry::transform::{AliasToRecord, FieldDef, TargetRecordType};
use quarry::{QueryOver, Session};

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Page through a distinct, function-ordered projection")]
struct Cli {
    /// Rows per page
    #[arg(long, default_value_t = 20, env = "QUARRY_PAGE_SIZE")]
    page_size: u64,

    /// Offset of the first page
    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// Number of pages to print
    #[arg(long, default_value_t = 3)]
    pages: u64,

    /// Copies of the sample data to load
    #[arg(long, default_value_t = 1)]
    copies: usize,

    /// Sort NULL names last instead of first
    #[arg(long)]
    nulls_last: bool,

    /// Print the plan and exit
    #[arg(long)]
    explain: bool,
}

/// Offset of the `page`-th page after `first`, saturating on huge arguments
fn page_offset(first: u64, page: u64, page_size: u64) -> u64 {
    first.saturating_add(page.saturating_mul(page_size))
}

fn localized_page<'s>(
    session: &'s Session,
    columns: &ProjectionList,
    target: &TargetRecordType,
    offset: u64,
    page_size: u64,
) -> QueryOver<'s, AliasToRecord> {
    session
        .query_over("Entity", "e")
        .select(Projections::distinct(columns.clone()))
        .order_by(OrderDirective::alias("LocalizedName"))
        .skip(offset)
        .take(page_size)
        .transform_using(AliasToRecord::new(target.clone()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env()?;
    if cli.nulls_last {
        config = config.null_ordering(NullOrdering::Last);
    }

    let backend = MemoryBackend::new();
    load_localized_names(&backend, cli.copies)?;
    tracing::info!(rows = backend.row_count("Entity"), "sample data loaded");

    let session = Session::new(Arc::new(backend), config);

    let columns = Projections::list()
        .add_as(Projections::property("e", "Id"), "Id")
        .add_as(
            Projections::sql_function(
                "coalesce",
                DataType::Text,
                vec![
                    Projections::property("e", "EnglishName"),
                    Projections::property("e", "GermanName"),
                ],
            ),
            "LocalizedName",
        );
    let target = TargetRecordType::new("LocalizedEntity")
        .field(FieldDef::new("Id", DataType::Uuid).nullable(false))
        .field(FieldDef::new("LocalizedName", DataType::Text));

    if cli.explain {
        let page = localized_page(&session, &columns, &target, cli.offset, cli.page_size);
        println!("{}", page.explain()?);
        return Ok(());
    }

    for page in 0..cli.pages {
        let offset = page_offset(cli.offset, page, cli.page_size);
        let records = localized_page(&session, &columns, &target, offset, cli.page_size)
            .list()
            .await?;
        println!("-- offset {} ({} rows)", offset, records.len());
        for record in &records {
            println!("{}", record);
        }
        if records.is_empty() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(5, 2, 20), 45);
        assert_eq!(page_offset(u64::MAX - 1, 1, 20), u64::MAX);
        assert_eq!(page_offset(0, u64::MAX, 2), u64::MAX);
    }
}
