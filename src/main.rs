use anyhow::Context;
use clap::Parser;
use rocket_cart::core::ConfigProvider;
use rocket_cart::utils::error::ErrorSeverity;
use rocket_cart::utils::{logger, validation::Validate};
use rocket_cart::{
    ApiClient, Cart, CartEvent, CartStore, CliConfig, Command, LocalStorage,
    UpdateProductAmount,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(e.severity()));
    }

    let storage = LocalStorage::new(config.storage_path());
    let client = ApiClient::from_config(&config).context("could not build the API client")?;
    let mut store = CartStore::with_key(storage, client.clone(), client, config.cart_key());

    let outcome = match cli.command {
        Command::Add { product_id } => Some(store.add_product(product_id).await),
        Command::Remove { product_id } => Some(store.remove_product(product_id)),
        Command::Update { product_id, amount } => Some(
            store
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await,
        ),
        Command::Show => None,
    };

    let failed = match outcome {
        Some(Ok(event)) => {
            report(&event);
            false
        }
        Some(Err(failure)) => {
            tracing::debug!("Operation failed: {}", failure);
            eprintln!("❌ {}", failure.notification());
            true
        }
        None => false,
    };

    print_cart(store.cart());

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report(event: &CartEvent) {
    match event {
        CartEvent::Added { product_id } => println!("✅ Product {} added", product_id),
        CartEvent::Removed { product_id } => println!("✅ Product {} removed", product_id),
        CartEvent::AmountUpdated { product_id, amount } => {
            println!("✅ Product {} amount set to {}", product_id, amount)
        }
        CartEvent::Ignored => {}
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("🛒 Cart is empty");
        return;
    }

    println!("🛒 {} items", cart.total_items());
    for product in cart.items() {
        let title = product.title().unwrap_or("(untitled)");
        match product.price() {
            Some(price) => println!(
                "  #{:<4} {:<40} {:>3} x {:>9.2}",
                product.id, title, product.amount, price
            ),
            None => println!("  #{:<4} {:<40} {:>3}", product.id, title, product.amount),
        }
    }
    println!("  Subtotal: {:.2}", cart.subtotal());
}
