use std::path::PathBuf;

use anyhow::Result;
use catalog::pager::PAGE_SIZES;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::api_client::{ApiClient, FilterInput, Resource};
use crate::config::load_config;

pub mod commands;

use commands::{browse, create, delete, list, update, Context, CreateOptions, ListOptions};

#[derive(Parser)]
#[command(name = "tienda-admin")]
#[command(about = "Store administration: catalogs, inventory, sales and cash")]
#[command(version)]
pub struct Cli {
    /// Backend base URL, e.g. http://localhost:3000/api
    ///
    /// Overrides api_host, api_port, api_path and api_use_https from the
    /// configuration.
    #[arg(long, env = "TIENDA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Configuration file (defaults to ./tienda-admin.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Period and status filters. Only the ones a collection supports are sent.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Year filter (purchases, sales, cash movements)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month filter, 1-12 (purchases, sales, cash movements)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Order status filter (online orders)
    #[arg(long)]
    pub status: Option<String>,
}

impl From<FilterArgs> for FilterInput {
    fn from(args: FilterArgs) -> Self {
        FilterInput {
            year: args.year,
            month: args.month,
            status: args.status,
        }
    }
}

fn parse_page_size(value: &str) -> std::result::Result<usize, String> {
    let size: usize = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {:?}", PAGE_SIZES))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one page of a collection
    List {
        resource: Resource,

        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Rows per page (5, 10, 15 or 25)
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<usize>,

        /// Free-text search
        #[arg(short, long, default_value = "")]
        search: String,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Create a record from a JSON object
    ///
    /// Example:
    ///   tienda-admin create brands --data '{"name": "Bosch"}'
    Create {
        resource: Resource,

        /// JSON body sent to the backend as-is
        #[arg(short, long)]
        data: String,

        /// Product picture to upload after creating (products only)
        #[arg(long)]
        image: Option<PathBuf>,

        /// PDF datasheet to upload after creating (products only)
        #[arg(long)]
        datasheet: Option<PathBuf>,
    },
    /// Update a record with a JSON object
    Update {
        resource: Resource,

        #[arg(long)]
        id: i64,

        /// JSON body sent to the backend as-is
        #[arg(short, long)]
        data: String,
    },
    /// Delete a record after confirmation
    Delete {
        resource: Resource,

        #[arg(long)]
        id: i64,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Interactive screen over a collection
    Browse {
        resource: Resource,

        /// Rows per page (5, 10, 15 or 25)
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<usize>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let base_url = self
            .api_url
            .clone()
            .unwrap_or_else(|| config.api_base_url());
        debug!("Using backend at {}", base_url);

        let client = ApiClient::new(base_url, config.request_timeout())?;
        let ctx = Context { client, config };

        match self.command {
            Commands::List {
                resource,
                page,
                page_size,
                search,
                filters,
            } => {
                let options = ListOptions {
                    page,
                    page_size,
                    search,
                    filters: filters.into(),
                };
                list(&ctx, resource, options).await?;
            }
            Commands::Create {
                resource,
                data,
                image,
                datasheet,
            } => {
                let options = CreateOptions {
                    data,
                    image,
                    datasheet,
                };
                create(&ctx, resource, options).await?;
            }
            Commands::Update { resource, id, data } => {
                update(&ctx, resource, id, &data).await?;
            }
            Commands::Delete {
                resource,
                id,
                yes,
                filters,
            } => {
                delete(&ctx, resource, id, yes, filters.into()).await?;
            }
            Commands::Browse {
                resource,
                page_size,
                filters,
            } => {
                browse(&ctx, resource, page_size, filters.into()).await?;
            }
        }
        Ok(())
    }
}
