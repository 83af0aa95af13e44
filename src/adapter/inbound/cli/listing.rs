//! Handlers for `stockex listing`.

use super::command::ListingCommand;
use super::exchange::render_exchange;
use super::output;
use super::run::Caller;
use crate::application::{ListingService, Operation};
use crate::domain::id::{ExchangeId, StockId};
use crate::domain::listing::ListingSummary;
use crate::error::Result;
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

fn render_summary(summary: &ListingSummary) {
    output::field("Exchange", &summary.exchange.name);
    output::field("Stock", &summary.stock.name);
    output::field("Listed", summary.listed_at.to_rfc3339());
    output::field("Live", output::live_badge(summary.exchange.live_in_market));
}

/// Execute a listing subcommand.
///
/// # Errors
/// Returns authorization and service errors.
pub fn execute<S: Store, H: PasswordHasher>(
    service: &ListingService<S>,
    caller: &Caller<'_, S, H>,
    command: &ListingCommand,
) -> Result<()> {
    match command {
        ListingCommand::Add(args) => {
            caller.authorize(Operation::AddListing)?;
            let summary = service.add(ExchangeId::new(args.exchange), StockId::new(args.stock))?;
            output::success(&format!(
                "Listed {} on {}",
                summary.stock.name, summary.exchange.name
            ));
            output::result("listing", &summary, render_summary)
        }
        ListingCommand::Remove(args) => {
            caller.authorize(Operation::RemoveListing)?;
            let exchange =
                service.remove(ExchangeId::new(args.exchange), StockId::new(args.stock))?;
            output::success(&format!(
                "Delisted stock {} from {}",
                args.stock, exchange.name
            ));
            output::result("exchange", &exchange, render_exchange)
        }
        ListingCommand::Recompute { exchange } => {
            caller.authorize(Operation::RecomputeLiveStatus)?;
            let exchange = service.recompute(ExchangeId::new(*exchange))?;
            output::result("exchange", &exchange, render_exchange)
        }
    }
}
