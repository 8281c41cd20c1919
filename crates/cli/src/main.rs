//! Tryla CLI - browse the storefront, manage the cart and run the admin
//! dashboard from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! tryla products list
//! tryla products search kurta
//! tryla categories show 64f0c2
//!
//! # Account and cart
//! tryla login -e asha@tryla.in -p '...'
//! tryla cart add 64f0c3 --size M --quantity 2
//! tryla checkout --full-name "Asha Rao" --street "12 MG Road" --city Bengaluru \
//!     --state Karnataka --postal-code 560001
//!
//! # Admin
//! tryla admin products create --title "Cotton Kurta" --price 1299 --stock 10 --category 64f0c2
//! tryla admin orders set-status 6501aa shipped
//! ```
//!
//! The session is kept in `TRYLA_SESSION_FILE` (default
//! `~/.tryla/session.json`). Ctrl-C cancels the request in flight.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tryla_client::types::PaymentMethod;
use tryla_core::OrderStatus;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "tryla")]
#[command(version, about = "Tryla storefront and admin client")]
struct Cli {
    /// Base URL of the REST backend
    #[arg(long, global = true, env = "TRYLA_API_URL")]
    api_url: Option<String>,

    /// Where the login session is stored
    #[arg(long, global = true, env = "TRYLA_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Browse categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage the cart (requires login)
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Turn the cart into an order
    Checkout(CheckoutArgs),
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "TRYLA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Signup {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "TRYLA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Update the logged-in user's profile
    Profile(ProfileArgs),
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Admin dashboard (requires an admin login)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List every product
    List,
    /// Show one product
    Show { id: String },
    /// Products featured on the home page
    Featured,
    /// Filter by category, availability and size
    Filter {
        #[arg(short, long)]
        category: Option<String>,
        /// Only products in stock
        #[arg(long, conflicts_with = "out_of_stock")]
        in_stock: bool,
        /// Only products out of stock
        #[arg(long)]
        out_of_stock: bool,
        /// Size to match; repeatable
        #[arg(short, long = "size")]
        sizes: Vec<String>,
    },
    /// Match title and description, ignoring case
    Search { query: String },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List every category
    List,
    /// Show one category
    Show { id: String },
    /// Products in a category
    Products { id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a product
    Add {
        product_id: String,
        #[arg(short, long)]
        size: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Update { product_id: String, quantity: u32 },
    /// Remove a line
    Remove { product_id: String },
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    postal_code: String,
    #[arg(long, default_value = "India")]
    country: String,
    #[arg(long)]
    phone: Option<String>,
    /// cod, card or upi
    #[arg(long, default_value = "cod", value_parser = commands::account::parse_payment)]
    payment: PaymentMethod,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long)]
    email: Option<String>,
    #[arg(short, long)]
    phone: Option<String>,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Manage products
    Products {
        #[command(subcommand)]
        action: AdminProductAction,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: AdminCategoryAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: AdminOrderAction,
    },
}

/// Product form fields. On update, omitted fields keep their current value.
#[derive(Args, Default)]
struct ProductFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Price in rupees, e.g. 1299.50
    #[arg(long, allow_hyphen_values = true)]
    price: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    stock: Option<String>,
    /// Category id
    #[arg(long)]
    category: Option<String>,
    /// Comma-separated image URLs
    #[arg(long)]
    images: Option<String>,
    /// Comma-separated sizes
    #[arg(long)]
    sizes: Option<String>,
    /// Comma-separated feature bullets
    #[arg(long)]
    features: Option<String>,
    #[arg(long)]
    care: Option<String>,
    #[arg(long)]
    fit: Option<String>,
    #[arg(long)]
    material: Option<String>,
}

#[derive(Subcommand)]
enum AdminProductAction {
    /// List every product
    List,
    /// Create a product
    Create(ProductFields),
    /// Update a product
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Category form fields. On update, omitted fields keep their current value.
#[derive(Args, Default)]
struct CategoryFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Image URL
    #[arg(long)]
    image: Option<String>,
}

#[derive(Subcommand)]
enum AdminCategoryAction {
    /// List every category
    List,
    /// Create a category
    Create(CategoryFields),
    /// Update a category
    Update {
        id: String,
        #[command(flatten)]
        fields: CategoryFields,
    },
    /// Delete a category
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AdminOrderAction {
    /// List every order
    List {
        /// Only orders in this status
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Move an order to another status
    SetStatus { id: String, status: OrderStatus },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tryla_cli=info,tryla_client=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load .env first so clap sees TRYLA_* variables from it.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::new(
        cli.api_url.as_deref(),
        cli.session_file.as_deref(),
        cli.json,
    )?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List => commands::catalog::list_products(&ctx).await?,
            ProductAction::Show { id } => commands::catalog::show_product(&ctx, &id).await?,
            ProductAction::Featured => commands::catalog::featured(&ctx).await?,
            ProductAction::Filter {
                category,
                in_stock,
                out_of_stock,
                sizes,
            } => {
                commands::catalog::filter(&ctx, category, in_stock, out_of_stock, sizes).await?;
            }
            ProductAction::Search { query } => commands::catalog::search(&ctx, &query).await?,
        },
        Commands::Categories { action } => match action {
            CategoryAction::List => commands::catalog::list_categories(&ctx).await?,
            CategoryAction::Show { id } => commands::catalog::show_category(&ctx, &id).await?,
            CategoryAction::Products { id } => {
                commands::catalog::category_products(&ctx, &id).await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Add {
                product_id,
                size,
                quantity,
            } => commands::cart::add(&ctx, &product_id, quantity, &size).await?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&ctx, &product_id, quantity).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, &product_id).await?,
            CartAction::Clear => commands::cart::clear(&ctx).await?,
        },
        Commands::Checkout(args) => commands::account::checkout(&ctx, args).await?,
        Commands::Login { email, password } => {
            commands::account::login(&ctx, &email, password).await?;
        }
        Commands::Signup {
            name,
            email,
            password,
        } => commands::account::signup(&ctx, &name, &email, password).await?,
        Commands::Logout => commands::account::logout(&ctx).await?,
        Commands::Whoami => commands::account::whoami(&ctx).await?,
        Commands::Profile(args) => commands::account::update_profile(&ctx, args).await?,
        Commands::Orders { action } => match action {
            OrderAction::List => commands::account::list_orders(&ctx).await?,
            OrderAction::Show { id } => commands::account::show_order(&ctx, &id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Products { action } => match action {
                AdminProductAction::List => commands::admin::list_products(&ctx).await?,
                AdminProductAction::Create(fields) => {
                    commands::admin::create_product(&ctx, fields).await?;
                }
                AdminProductAction::Update { id, fields } => {
                    commands::admin::update_product(&ctx, &id, fields).await?;
                }
                AdminProductAction::Delete { id, yes } => {
                    commands::admin::delete_product(&ctx, &id, yes).await?;
                }
            },
            AdminAction::Categories { action } => match action {
                AdminCategoryAction::List => commands::admin::list_categories(&ctx).await?,
                AdminCategoryAction::Create(fields) => {
                    commands::admin::create_category(&ctx, fields).await?;
                }
                AdminCategoryAction::Update { id, fields } => {
                    commands::admin::update_category(&ctx, &id, fields).await?;
                }
                AdminCategoryAction::Delete { id, yes } => {
                    commands::admin::delete_category(&ctx, &id, yes).await?;
                }
            },
            AdminAction::Orders { action } => match action {
                AdminOrderAction::List { status } => {
                    commands::admin::list_orders(&ctx, status).await?;
                }
                AdminOrderAction::SetStatus { id, status } => {
                    commands::admin::set_order_status(&ctx, &id, status).await?;
                }
            },
        },
    }
    Ok(())
}
