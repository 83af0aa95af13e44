//! Handlers for `stockex exchange`.

use tabled::Tabled;

use super::command::ExchangeCommand;
use super::output;
use super::run::Caller;
use super::stock::render_stock_page;
use crate::application::{ExchangeService, Operation};
use crate::domain::exchange::{ExchangeUpdate, NewExchange, StockExchange};
use crate::domain::id::ExchangeId;
use crate::domain::page::StockSort;
use crate::error::Result;
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

#[derive(Tabled)]
pub(super) struct ExchangeRow {
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Live")]
    live: String,
    #[tabled(rename = "Version")]
    version: i32,
}

impl From<&StockExchange> for ExchangeRow {
    fn from(exchange: &StockExchange) -> Self {
        Self {
            id: exchange.id.get(),
            name: exchange.name.clone(),
            description: exchange.description.clone(),
            live: output::live_badge(exchange.live_in_market),
            version: exchange.version,
        }
    }
}

pub(super) fn render_exchange(exchange: &StockExchange) {
    output::field("ID", exchange.id);
    output::field("Name", &exchange.name);
    output::field("Description", &exchange.description);
    output::field("Live", output::live_badge(exchange.live_in_market));
    output::field("Version", exchange.version);
}

/// Execute an exchange subcommand.
///
/// # Errors
/// Returns authorization, validation and service errors.
pub fn execute<S: Store, H: PasswordHasher>(
    service: &ExchangeService<S>,
    caller: &Caller<'_, S, H>,
    command: &ExchangeCommand,
) -> Result<()> {
    match command {
        ExchangeCommand::List { live, page } => {
            let request = page.request()?;
            let exchanges = if *live {
                caller.authorize(Operation::ListLiveExchanges)?;
                service.list_live(&request)?
            } else {
                caller.authorize(Operation::ListExchanges)?;
                service.list(&request)?
            };
            output::result("exchanges", &exchanges, |page| {
                output::table(page.items.iter().map(ExchangeRow::from).collect());
                output::page_footer(page);
            })
        }
        ExchangeCommand::Get(arg) => {
            caller.authorize(Operation::GetExchange)?;
            let exchange = service.get(ExchangeId::new(arg.id))?;
            output::result("exchange", &exchange, render_exchange)
        }
        ExchangeCommand::Create(args) => {
            caller.authorize(Operation::CreateExchange)?;
            let request = NewExchange::try_new(&args.name, &args.description)?;
            let exchange = service.create(&request)?;
            output::success(&format!(
                "Created exchange {} ({})",
                exchange.name, exchange.id
            ));
            output::result("exchange", &exchange, render_exchange)
        }
        ExchangeCommand::Update(args) => {
            caller.authorize(Operation::UpdateExchange)?;
            let update = ExchangeUpdate::try_new(
                args.name.as_deref(),
                args.description.as_deref(),
                args.live_in_market,
                args.expected_version,
            )?;
            let exchange = service.update(ExchangeId::new(args.id), &update)?;
            output::success(&format!("Updated exchange {}", exchange.id));
            output::result("exchange", &exchange, render_exchange)
        }
        ExchangeCommand::Delete(arg) => {
            caller.authorize(Operation::DeleteExchange)?;
            let exchange = service.delete(ExchangeId::new(arg.id))?;
            output::success(&format!(
                "Deleted exchange {} ({})",
                exchange.name, exchange.id
            ));
            output::result("exchange", &exchange, render_exchange)
        }
        ExchangeCommand::Stocks { id, page } => {
            caller.authorize(Operation::StocksListedOnExchange)?;
            let request = page.request(StockSort::Name)?;
            let stocks = service.stocks_listed(ExchangeId::new(*id), &request)?;
            output::result("stocks", &stocks, render_stock_page)
        }
    }
}
