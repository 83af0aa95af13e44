//! Handlers for `stockex stock`.

use tabled::Tabled;

use super::command::StockCommand;
use super::exchange::ExchangeRow;
use super::output;
use super::run::Caller;
use crate::application::{Operation, StockService};
use crate::domain::id::StockId;
use crate::domain::page::{Page, StockSort};
use crate::domain::stock::{NewStock, PriceUpdate, Stock};
use crate::error::Result;
use crate::port::outbound::credential::PasswordHasher;
use crate::port::outbound::store::Store;

#[derive(Tabled)]
pub(super) struct StockRow {
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Updated")]
    updated_at: String,
    #[tabled(rename = "Version")]
    version: i32,
}

impl From<&Stock> for StockRow {
    fn from(stock: &Stock) -> Self {
        Self {
            id: stock.id.get(),
            name: stock.name.clone(),
            description: stock.description.clone(),
            price: stock.current_price.to_string(),
            updated_at: stock.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            version: stock.version,
        }
    }
}

pub(super) fn render_stock(stock: &Stock) {
    output::field("ID", stock.id);
    output::field("Name", &stock.name);
    output::field("Description", &stock.description);
    output::field("Price", output::highlight(stock.current_price));
    output::field("Updated", stock.updated_at.to_rfc3339());
    output::field("Version", stock.version);
}

pub(super) fn render_stock_page(page: &Page<Stock>) {
    output::table(page.items.iter().map(StockRow::from).collect());
    output::page_footer(page);
}

/// Execute a stock subcommand.
///
/// # Errors
/// Returns authorization, validation and service errors.
pub fn execute<S: Store, H: PasswordHasher>(
    service: &StockService<S>,
    caller: &Caller<'_, S, H>,
    command: &StockCommand,
) -> Result<()> {
    match command {
        StockCommand::List(page) => {
            caller.authorize(Operation::ListStocks)?;
            let stocks = service.list(&page.request(StockSort::Id)?)?;
            output::result("stocks", &stocks, render_stock_page)
        }
        StockCommand::Get(arg) => {
            caller.authorize(Operation::GetStock)?;
            let stock = service.get(StockId::new(arg.id))?;
            output::result("stock", &stock, render_stock)
        }
        StockCommand::Create(args) => {
            caller.authorize(Operation::CreateStock)?;
            let request = NewStock::try_new(&args.name, &args.description, args.price)?;
            let stock = service.create(&request)?;
            output::success(&format!("Created stock {} ({})", stock.name, stock.id));
            output::result("stock", &stock, render_stock)
        }
        StockCommand::Price(args) => {
            caller.authorize(Operation::UpdateStockPrice)?;
            let update = PriceUpdate::try_new(args.price, args.expected_version)?;
            let stock = service.update_price(StockId::new(args.id), &update)?;
            output::success(&format!("Price of {} is now {}", stock.name, stock.current_price));
            output::result("stock", &stock, render_stock)
        }
        StockCommand::Delete(arg) => {
            caller.authorize(Operation::DeleteStock)?;
            let stock = service.delete(StockId::new(arg.id))?;
            output::success(&format!("Deleted stock {} ({})", stock.name, stock.id));
            output::result("stock", &stock, render_stock)
        }
        StockCommand::Exchanges { id, page } => {
            caller.authorize(Operation::ExchangesListingStock)?;
            let exchanges = service.exchanges_listing(StockId::new(*id), &page.request()?)?;
            output::result("exchanges", &exchanges, |page| {
                output::table(page.items.iter().map(ExchangeRow::from).collect());
                output::page_footer(page);
            })
        }
    }
}
