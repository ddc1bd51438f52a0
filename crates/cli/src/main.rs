//! Bazaryo CLI - Storefront, shopkeeper and admin workflows from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the token is kept in the session file)
//! bz login -e asha@bazaryo.in -p mango123
//!
//! # Fill the cart and check out
//! bz cart add 65a1f0c2e4b0a1b2c3d4e5f6 -q 2
//! bz cart show
//! bz cart checkout
//!
//! # Attach a delivery agent to an order (admin)
//! bz orders assign 65a1f0c2e4b0a1b2c3d4e5f7
//! bz orders assign 65a1f0c2e4b0a1b2c3d4e5f7 --agent 65a1f0c2e4b0a1b2c3d4e5f8
//! ```
//!
//! # Environment Variables
//!
//! - `BAZARYO_API_URL` - Backend base URL
//! - `BAZARYO_API_TOKEN` - Bearer token (overrides the session file)
//! - `BAZARYO_SESSION_FILE` - Where `login` keeps the token
//! - `BAZARYO_LOG_JSON` - Emit logs as JSON
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Optional error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod context;
mod output;

use config::CliConfig;
use context::Context;

#[derive(Parser)]
#[command(name = "bz")]
#[command(author, version, about = "Bazaryo storefront CLI")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Page to land on instead of the role's dashboard
        #[arg(long)]
        from: Option<String>,
    },
    /// Create an account and sign in
    Register(commands::account::RegisterArgs),
    /// Show the signed-in user
    Whoami,
    /// Update name and address
    Profile(commands::account::ProfileArgs),
    /// Sign out and forget the stored token
    Logout,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List and assign orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Admin dashboard and moderation
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart grouped by shop
    Show,
    /// Add a product
    Add {
        product: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Set { product: String, quantity: u32 },
    /// Remove a line
    Remove { product: String },
    /// Place one order per shop
    Checkout,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// The signed-in customer's orders
    Mine,
    /// Every order (admin)
    List {
        /// Only orders that can get a delivery agent
        #[arg(long)]
        assignable: bool,
    },
    /// List available agents for an order, or assign one
    Assign {
        order: String,

        #[arg(short, long)]
        agent: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List(commands::products::ListArgs),
    /// List the signed-in shopkeeper's products
    Mine,
    /// Create a product in the signed-in shopkeeper's shop
    Create(commands::products::CreateArgs),
    /// Add stock to one of the shopkeeper's products
    AddStock {
        product: String,

        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Delete one of the shopkeeper's products
    Delete { product: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Headline numbers and charts
    Stats,
    /// Every shop with its verification state
    Shops,
    /// Flip a shop's verification
    Verify { shop: String },
    /// Every user
    Users,
    /// Delete a user
    DeleteUser { user: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(config: &CliConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaryo_cli=info,bazaryo_client=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    // Logs go to stderr; stdout carries command output.
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = CliConfig::from_env();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load(config, cli.json).await?;

    match cli.command {
        Commands::Login {
            email,
            password,
            from,
        } => commands::account::login(&ctx, email, password, from).await?,
        Commands::Register(args) => commands::account::register(&ctx, args).await?,
        Commands::Whoami => commands::account::whoami(&ctx).await?,
        Commands::Profile(args) => commands::account::profile(&ctx, args).await?,
        Commands::Logout => commands::account::logout(&ctx).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx).await?,
            CartAction::Add { product, quantity } => {
                commands::cart::add(&ctx, &product, quantity).await?;
            }
            CartAction::Set { product, quantity } => {
                commands::cart::set(&ctx, &product, quantity).await?;
            }
            CartAction::Remove { product } => commands::cart::remove(&ctx, &product).await?,
            CartAction::Checkout => commands::cart::checkout(&ctx).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::Mine => commands::orders::mine(&ctx).await?,
            OrdersAction::List { assignable } => commands::orders::list(&ctx, assignable).await?,
            OrdersAction::Assign { order, agent } => {
                commands::orders::assign(&ctx, &order, agent.as_deref()).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductsAction::List(args) => commands::products::list(&ctx, args).await?,
            ProductsAction::Mine => commands::products::mine(&ctx).await?,
            ProductsAction::Create(args) => commands::products::create(&ctx, args).await?,
            ProductsAction::AddStock { product, amount } => {
                commands::products::add_stock(&ctx, &product, amount).await?;
            }
            ProductsAction::Delete { product } => {
                commands::products::delete(&ctx, &product).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Stats => commands::admin::stats(&ctx).await?,
            AdminAction::Shops => commands::admin::shops(&ctx).await?,
            AdminAction::Verify { shop } => commands::admin::verify(&ctx, &shop).await?,
            AdminAction::Users => commands::admin::users(&ctx).await?,
            AdminAction::DeleteUser { user } => commands::admin::delete_user(&ctx, &user).await?,
        },
    }
    Ok(())
}
