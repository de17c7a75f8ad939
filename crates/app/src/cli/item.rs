use clap::Args;
use grove::{
    ids::{PlanPriceId, SiteId},
    items::{Dedication, ItemPatch, LineItemId},
};
use grove_app::facade::CartFacade;

use crate::cli::CliError;

/// Dedication text for a sponsorship or adoption.
#[derive(Debug, Args)]
pub(crate) struct DedicationArgs {
    /// Name the tree is dedicated to
    #[arg(long)]
    dedication_name: Option<String>,

    /// Occasion, e.g. "Birthday"
    #[arg(long)]
    dedication_occasion: Option<String>,

    /// Personal message
    #[arg(long)]
    dedication_message: Option<String>,
}

impl DedicationArgs {
    pub(crate) fn into_dedication(self) -> Option<Dedication> {
        if self.dedication_name.is_none()
            && self.dedication_occasion.is_none()
            && self.dedication_message.is_none()
        {
            return None;
        }

        Some(Dedication {
            name: self.dedication_name,
            occasion: self.dedication_occasion,
            message: self.dedication_message,
        })
    }
}

#[derive(Debug, Args)]
pub(crate) struct UpdateArgs {
    /// Cart item id, as shown by `show`
    id: LineItemId,

    /// New quantity; values below one count as one
    #[arg(long)]
    quantity: Option<u32>,

    /// Switch to another plan duration
    #[arg(long)]
    plan_price: Option<PlanPriceId>,

    /// Planting site
    #[arg(long)]
    site: Option<SiteId>,

    #[command(flatten)]
    dedication: DedicationArgs,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    /// Cart item id, as shown by `show`
    id: LineItemId,
}

pub(crate) async fn update(facade: &CartFacade, args: UpdateArgs) -> Result<(), CliError> {
    let patch = ItemPatch {
        quantity: args.quantity,
        dedication: args.dedication.into_dedication(),
        plan_price_id: args.plan_price,
        site_id: args.site,
    };

    facade.update(&args.id, &patch).await?;

    Ok(())
}

pub(crate) async fn remove(facade: &CartFacade, args: RemoveArgs) -> Result<(), CliError> {
    facade.remove(&args.id).await?;

    Ok(())
}
