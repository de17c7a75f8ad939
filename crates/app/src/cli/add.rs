use std::{fs, path::PathBuf};

use clap::{Args, Subcommand};
use grove::{
    ids::{PlanPriceId, SiteId, SubjectId, VariantId},
    requests::AddItemRequest,
    sources::ItemSources,
};
use grove_app::facade::CartFacade;

use crate::cli::{CliError, item::DedicationArgs};

#[derive(Debug, Args)]
pub(crate) struct AddCommand {
    #[command(subcommand)]
    command: AddSubcommand,
}

#[derive(Debug, Subcommand)]
enum AddSubcommand {
    /// Add a product variant
    Product(ProductArgs),

    /// Sponsor a tree
    Sponsorship(PlanArgs),

    /// Adopt a tree
    Adoption(PlanArgs),
}

#[derive(Debug, Args)]
struct SourcesArgs {
    /// JSON file with the catalog records for the item; needed for guest carts
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Preferred image, may be repeated
    #[arg(long = "image")]
    images: Vec<String>,
}

impl SourcesArgs {
    fn load(&self) -> Result<ItemSources, CliError> {
        let Some(path) = &self.sources else {
            return Ok(ItemSources::default());
        };

        let text = fs::read_to_string(path).map_err(|source| CliError::ReadSources {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| CliError::ParseSources {
            path: path.clone(),
            source,
        })
    }
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Variant id
    #[arg(long)]
    variant: VariantId,

    /// Quantity to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    #[command(flatten)]
    sources: SourcesArgs,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Tree id (tree instance id for adoptions)
    #[arg(long)]
    tree: SubjectId,

    /// Chosen plan-price (duration and price)
    #[arg(long)]
    plan_price: PlanPriceId,

    /// Quantity to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Planting site
    #[arg(long)]
    site: Option<SiteId>,

    #[command(flatten)]
    dedication: DedicationArgs,

    #[command(flatten)]
    sources: SourcesArgs,
}

pub(crate) async fn run(facade: &CartFacade, command: AddCommand) -> Result<(), CliError> {
    let (request, sources) = match command.command {
        AddSubcommand::Product(args) => (
            AddItemRequest::product(args.variant, args.quantity),
            args.sources,
        ),
        AddSubcommand::Sponsorship(args) => plan_request(AddItemRequest::sponsorship, args),
        AddSubcommand::Adoption(args) => plan_request(AddItemRequest::adoption, args),
    };

    let request = request.with_images(sources.images.iter().cloned());

    facade.add(&request, &sources.load()?).await?;

    Ok(())
}

fn plan_request(
    build: fn(SubjectId, PlanPriceId, u32) -> AddItemRequest,
    args: PlanArgs,
) -> (AddItemRequest, SourcesArgs) {
    let mut request = build(args.tree, args.plan_price, args.quantity);

    if let Some(dedication) = args.dedication.into_dedication() {
        request = request.with_dedication(dedication);
    }

    if let Some(site) = args.site {
        request = request.with_site(site);
    }

    (request, args.sources)
}
