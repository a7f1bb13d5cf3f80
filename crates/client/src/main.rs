//! `ironmonger` - command-line shell for the hardware store.
//!
//! # Usage
//!
//! ```bash
//! ironmonger login -e cajero@ferreteria.gt -p secreto
//! ironmonger catalog --search martillo
//! ironmonger cart add 12 --qty 2
//! ironmonger checkout --name "Ana Lopez" --email ana@correo.gt --payment card --receipt-dir .
//! ironmonger stock-report --status low --min 1 --dir reports/
//! ironmonger dashboard --from 2026-10-01 --to 2026-10-19
//! ```
//!
//! Every command first navigates to its page through the route guard, so
//! the same authentication and admin rules apply as in the storefront.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Days, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use ironmonger_client::{AppState, ClientConfig, NavigationDecision};
use ironmonger_core::ProductId;
use ironmonger_documents::format_currency;
use ironmonger_inventory::{StockFilters, StockLevel};
use ironmonger_sales::{CustomerInfo, DeliveryMethod, Payment, PaymentMethod};

#[derive(Parser)]
#[command(name = "ironmonger")]
#[command(author, version, about = "Hardware store client")]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List products
    Catalog {
        /// Filter by name or SKU
        #[arg(short, long)]
        search: Option<String>,
        /// Use the cached catalog without contacting the API
        #[arg(long)]
        offline: bool,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Reconcile the cart with the server and pay
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Tax id for the receipt (defaults to CF)
        #[arg(long)]
        nit: Option<String>,
        /// `pickup` or `home-delivery`
        #[arg(long, default_value = "pickup")]
        delivery: DeliveryMethod,
        /// `cash`, `card` or `transfer`
        #[arg(long, default_value = "cash")]
        payment: PaymentMethod,
        /// Card voucher or transfer number
        #[arg(long)]
        reference: Option<String>,
        /// Write the receipt PDF into this directory
        #[arg(long)]
        receipt_dir: Option<PathBuf>,
    },
    /// Generate the stock report PDF (admin)
    StockReport {
        /// Matches id or name
        #[arg(short, long)]
        q: Option<String>,
        /// Id contains
        #[arg(long)]
        id: Option<String>,
        /// Name contains
        #[arg(long)]
        name: Option<String>,
        /// `no-stock`, `low`, `medium` or `high`
        #[arg(long)]
        status: Option<StockLevel>,
        #[arg(long)]
        min: Option<i64>,
        #[arg(long)]
        max: Option<i64>,
        #[arg(long)]
        title: Option<String>,
        /// File name (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Back-office summary (admin)
    Dashboard {
        /// First day (defaults to 30 days before `to`)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (defaults to today)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Run the route guard for a path and print where it lands
    Navigate { path: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product from the catalog
    Add {
        id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set a line's quantity (minimum 1)
    Set { id: ProductId, qty: i64 },
    Remove { id: ProductId },
    Show,
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    ironmonger_observability::tracing::init_with_default(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli).await {
        tracing::error!("command failed: {e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("invalid configuration")?;
    let mut app = AppState::build(config).await?;

    let route = match &cli.command {
        Commands::Login { .. } => "/login",
        Commands::Logout | Commands::Whoami => "/",
        Commands::Catalog { .. } => "/catalog",
        Commands::Cart { .. } => "/cart",
        Commands::Checkout { .. } => "/checkout",
        Commands::StockReport { .. } => "/admin/stock-report",
        Commands::Dashboard { .. } => "/admin",
        Commands::Navigate { path } => path.as_str(),
    };
    let route = route.to_string();

    if let NavigationDecision::Redirect(to) = app.navigate(&route).await {
        if matches!(cli.command, Commands::Navigate { .. }) {
            println!("{to}");
            return Ok(());
        }
        if matches!(cli.command, Commands::Login { .. }) {
            println!("Already signed in.");
            return Ok(());
        }
        anyhow::bail!("not allowed here; redirected to {to}");
    }

    match cli.command {
        Commands::Login { email, password } => {
            match app.session.login(&email, &password).await {
                Ok(user) => println!("Signed in as {}", user.display_name()),
                Err(err) => {
                    let message = app.session.last_error().unwrap_or("login failed").to_string();
                    return Err(anyhow::Error::new(err).context(message));
                }
            }
        }
        Commands::Logout => {
            app.session.logout().await;
            println!("Signed out.");
        }
        Commands::Whoami => match app.session.snapshot().await.user() {
            Some(user) => {
                let roles: Vec<_> = user.roles.iter().map(|r| r.to_string()).collect();
                println!("{} <{}> [{}]", user.display_name(), user.email, roles.join(", "));
            }
            None => println!("Not signed in."),
        },
        Commands::Catalog { search, offline } => {
            if offline {
                app.catalog.hydrate().await?;
            } else {
                app.catalog.refresh_or_hydrate(&app.products).await?;
            }
            let term = search.unwrap_or_default();
            for product in app.catalog.catalog().search(&term) {
                println!(
                    "{:>5}  {:<10} {:<40} {:>12}  stock {}",
                    product.id,
                    product.sku.as_deref().unwrap_or("-"),
                    product.name,
                    format_currency(product.price),
                    product
                        .stock
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".into())
                );
            }
        }
        Commands::Cart { action } => {
            match action {
                CartAction::Add { id, qty } => {
                    let item = app.add_to_cart(id, qty).await?;
                    println!("Added {} x{}", item.name, qty.max(1));
                }
                CartAction::Set { id, qty } => {
                    if !app.cart.set_quantity(id, qty).await? {
                        println!("Product {id} is not in the cart.");
                    }
                }
                CartAction::Remove { id } => {
                    if app.cart.remove(id).await?.is_none() {
                        println!("Product {id} is not in the cart.");
                    }
                }
                CartAction::Clear => app.cart.clear().await?,
                CartAction::Show => {}
            }
            print_cart(&app);
        }
        Commands::Checkout {
            name,
            email,
            phone,
            address,
            nit,
            delivery,
            payment,
            reference,
            receipt_dir,
        } => {
            let customer = CustomerInfo {
                phone,
                address,
                nit,
                ..CustomerInfo::new(name, email)
            };
            let payment = match reference {
                Some(reference) => Payment::with_reference(payment, reference),
                None => Payment::from(payment),
            };
            let outcome = app.checkout(customer, delivery, payment).await?;
            if !outcome.is_paid() {
                anyhow::bail!("checkout finished with status {:?}", outcome.result.status);
            }
            println!(
                "Paid. Order #{} total {}",
                outcome.result.sale_id,
                format_currency(outcome.result.total)
            );
            if let Some(dir) = receipt_dir {
                let path = outcome.receipt(Utc::now())?.save_in(&dir)?;
                println!("Receipt written to {}", path.display());
            }
        }
        Commands::StockReport {
            q,
            id,
            name,
            status,
            min,
            max,
            title,
            output,
            dir,
        } => {
            let filters = StockFilters {
                q,
                id_filter: id,
                name_filter: name,
                status,
                stock_min: min,
                stock_max: max,
            };
            let path = app
                .stock_report(filters, title, output)
                .await?
                .save_in(&dir)?;
            println!("Stock report written to {}", path.display());
        }
        Commands::Dashboard { from, to } => {
            let to = to.unwrap_or_else(|| Utc::now().date_naive());
            let from = from.unwrap_or_else(|| to.checked_sub_days(Days::new(30)).unwrap_or(to));
            let d = app.admin.dashboard(from, to).await?;
            println!("Orders:          {}", d.summary.orders);
            println!("Revenue:         {}", format_currency(d.summary.revenue));
            println!("Gross sales:     {}", format_currency(d.summary.gross_sales));
            println!("Discounts:       {}", format_currency(d.summary.discounts));
            println!("Taxes:           {}", format_currency(d.summary.taxes));
            println!("Avg order value: {}", format_currency(d.summary.avg_order_value));
            for p in &d.top_products {
                println!(
                    "  #{:<6} {:<40} {:>5} u  {:>12}",
                    p.product_id,
                    p.product_name,
                    p.units,
                    format_currency(p.revenue)
                );
            }
            for c in &d.by_channel {
                println!("  {:?}: {} orders, {}", c.channel, c.orders, format_currency(c.revenue));
            }
        }
        Commands::Navigate { .. } => println!("{}", app.navigator.current().await),
    }

    Ok(())
}

fn print_cart(app: &AppState) {
    let items = app.cart.items();
    if items.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for item in items {
        println!(
            "{:>5}  {:<40} {:>4} x {:>12} = {:>12}",
            item.id,
            item.name,
            item.quantity,
            format_currency(item.unit_price),
            format_currency(item.line_total())
        );
    }
    let s = app.cart.summary();
    println!("Items:    {}", s.count);
    println!("Subtotal: {}", format_currency(s.subtotal));
    println!("Tax:      {}", format_currency(s.tax));
    println!("Shipping: {}", format_currency(s.shipping));
    println!("Total:    {}", format_currency(s.total));
}
