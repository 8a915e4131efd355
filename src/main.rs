//! Instrument Store - command line front end
//!
//! Each invocation loads the data directory, runs one command, and writes
//! the record files back if anything changed. `shell` keeps one session
//! open across many commands, read line by line from stdin or a script.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! instrument-store products --by-type
//! instrument-store find-product --type Brass
//!
//! # Customers
//! instrument-store signup --username alice --password pw --first Alice --last Smith
//! instrument-store order --username alice --password pw --product Tuba --shipping rush
//! instrument-store my-orders --username alice --password pw
//!
//! # Employees and managers
//! instrument-store queue --username ed --password pw --all
//! instrument-store ship --username ed --password pw
//!
//! # Managers
//! instrument-store update-product --username mia --password pw --name Tuba --add-stock 2
//!
//! # Several commands against one session
//! instrument-store shell --script nightly.txt
//! ```
//!
//! Shell lines are the subcommands above without the program name. Words
//! split on spaces; double quotes group a value that contains spaces
//! (`--description "Open hole"`). Blank lines and `#` comments are ignored
//! and `exit` ends the session.
//!
//! Logging goes to stderr; set `RUST_LOG` to change the level (default
//! `info`).

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use instrument_store::store::users::DEFAULT_BUCKETS;
use instrument_store::types::price::to_cents;
use instrument_store::{
    Capability, Order, Product, ProductUpdate, Role, ShippingMethod, StoreConfig, StoreError,
    StoreSession,
};

/// Anything that can stop one command
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("cannot split command line: {0}")]
    Words(#[from] csv::Error),

    #[error("already in a shell")]
    NestedShell,
}

#[derive(Parser)]
#[command(name = "instrument-store")]
#[command(author, version, about = "Musical instrument store")]
struct Cli {
    /// Directory holding the record files
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Bucket count for the user index
    #[arg(long, global = true, default_value_t = DEFAULT_BUCKETS)]
    buckets: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Credentials {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog
    Products {
        /// Group by instrument type instead of sorting by name
        #[arg(long)]
        by_type: bool,
    },
    /// Look up a product by name or by type
    FindProduct {
        #[arg(long, conflicts_with = "kind", required_unless_present = "kind")]
        name: Option<String>,

        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Create a customer account
    Signup {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        first: String,

        #[arg(long)]
        last: String,
    },
    /// Place an order (customers)
    Order {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        product: String,

        /// overnight, rush or standard
        #[arg(long, default_value = "standard")]
        shipping: ShippingMethod,
    },
    /// Show your shipped and unshipped orders (customers)
    MyOrders {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Look up orders by ID or by customer name (employees, managers)
    FindOrder {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long, conflicts_with_all = ["first", "last"], required_unless_present_all = ["first", "last"])]
        id: Option<u32>,

        #[arg(long, requires = "last")]
        first: Option<String>,

        #[arg(long, requires = "first")]
        last: Option<String>,
    },
    /// Show the next order to ship (employees, managers)
    Queue {
        #[command(flatten)]
        credentials: Credentials,

        /// List every unshipped order by priority
        #[arg(long)]
        all: bool,
    },
    /// Ship the highest-priority order (employees, managers)
    Ship {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Add a product (managers)
    AddProduct {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        name: String,

        #[arg(long = "type")]
        kind: String,

        #[arg(long, value_parser = parse_price)]
        price: u64,

        #[arg(long)]
        brand: String,

        #[arg(long, default_value_t = 0)]
        quantity: u32,

        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change a product's price, description or stock (managers)
    UpdateProduct {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        name: String,

        #[arg(long, value_parser = parse_price, required_unless_present_any = ["description", "add_stock"])]
        price: Option<u64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        add_stock: Option<u32>,
    },
    /// Remove a product (managers)
    RemoveProduct {
        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        name: String,
    },
    /// Run many commands against one session, saving once at the end
    Shell {
        /// Read commands from this file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

/// One shell line: a subcommand without the program name
#[derive(Parser)]
#[command(name = "instrument-store", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

fn parse_price(s: &str) -> Result<u64, StoreError> {
    to_cents(s).ok_or_else(|| StoreError::InvalidPrice(s.to_string()))
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::new()
        .data_dir(cli.data_dir)
        .user_buckets(cli.buckets);

    // A failed load exits before anything is written
    let mut session = match StoreSession::open(config) {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to load store: {e}");
            return ExitCode::FAILURE;
        }
    };
    let loaded = session.fingerprint();

    let clean = match cli.command {
        Command::Shell { script } => match run_shell(&mut session, script.as_deref()) {
            Ok(0) => true,
            Ok(failed) => {
                warn!(failed, "shell finished with failed commands");
                false
            }
            Err(e) => {
                error!("Shell stopped: {e}");
                false
            }
        },
        command => {
            if let Err(e) = run(&mut session, command, &mut io::stdout().lock()) {
                error!("Command failed: {e}");
                return ExitCode::FAILURE;
            }
            true
        }
    };

    if session.fingerprint() == loaded {
        debug!("store unchanged, skipping save");
    } else if let Err(e) = session.save() {
        error!("Failed to save store: {e}");
        return ExitCode::FAILURE;
    }

    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_shell(session: &mut StoreSession, script: Option<&Path>) -> Result<usize, CliError> {
    let mut out = io::stdout().lock();
    match script {
        Some(path) => {
            let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
            shell(session, BufReader::new(file), &mut out, None)
        }
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal().then_some("> ");
            shell(session, stdin.lock(), &mut out, prompt)
        }
    }
}

/// Run every line of `input` as a command against `session`.
///
/// A failing line is logged and the next one runs. Stops early only when
/// `input` or `out` fails.
///
/// # Returns
///
/// The number of lines that failed.
fn shell<R, W>(
    session: &mut StoreSession,
    input: R,
    out: &mut W,
    prompt: Option<&str>,
) -> Result<usize, CliError>
where
    R: BufRead,
    W: Write,
{
    let mut failed = 0;
    let mut lines = input.lines().enumerate();

    loop {
        if let Some(prompt) = prompt {
            write!(out, "{prompt}")?;
            out.flush()?;
        }
        let Some((index, line)) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| StoreError::io("<input>", e))?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let outcome = split_words(line)
            .and_then(|words| Ok(ShellLine::try_parse_from(words)?))
            .and_then(|parsed| run(session, parsed.command, out));

        match outcome {
            Ok(()) => {}
            Err(CliError::Usage(e)) => {
                write!(out, "{}", e.render())?;
                if e.use_stderr() {
                    failed += 1;
                }
            }
            Err(e @ CliError::Output(_)) => return Err(e),
            Err(e) => {
                error!(line = index + 1, "Command failed: {e}");
                failed += 1;
            }
        }
    }

    Ok(failed)
}

/// Split a shell line on spaces, keeping double-quoted groups together
fn split_words(line: &str) -> Result<Vec<String>, CliError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record
        .iter()
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect())
}

fn run<W: Write>(
    session: &mut StoreSession,
    command: Command,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        Command::Products { by_type } => {
            let products = if by_type {
                session.products_by_type()
            } else {
                session.products_by_name()
            };
            if products.is_empty() {
                writeln!(out, "No products.")?;
            }
            for product in products {
                writeln!(out, "{product}")?;
            }
        }
        Command::FindProduct { name, kind } => {
            let found = match (&name, &kind) {
                (Some(name), _) => session.search_product_by_name(name),
                (None, Some(kind)) => session.search_product_by_type(kind),
                (None, None) => None,
            };
            match found {
                Some(product) => writeln!(out, "{product}")?,
                None => {
                    let wanted = name.or(kind).unwrap_or_default();
                    return Err(StoreError::ProductNotFound(wanted).into());
                }
            }
        }
        Command::Signup {
            credentials,
            first,
            last,
        } => {
            let user = session.create_customer(
                &credentials.username,
                &credentials.password,
                &first,
                &last,
            )?;
            writeln!(out, "Welcome, {} {}.", user.first_name, user.last_name)?;
        }
        Command::Order {
            credentials,
            product,
            shipping,
        } => {
            session.login(&credentials.username, &credentials.password, Role::Customer)?;
            let id = session.place_order(&credentials.username, &product, shipping)?;
            writeln!(out, "Order {id} placed ({shipping}).")?;
        }
        Command::MyOrders { credentials } => {
            let user = session.login(&credentials.username, &credentials.password, Role::Customer)?;
            let username = user.username.clone();

            print_orders(out, "Shipped", &session.shipped_orders_for(&username))?;
            print_orders(out, "Unshipped", &session.unshipped_orders_for(&username))?;
        }
        Command::FindOrder {
            credentials,
            id,
            first,
            last,
        } => {
            session.authorize(&credentials.username, &credentials.password, Capability::Fulfill)?;
            match (id, first, last) {
                (Some(id), _, _) => {
                    let order = session.find_order(id).ok_or(StoreError::OrderNotFound(id))?;
                    writeln!(out, "{order}")?;
                }
                (None, Some(first), Some(last)) => {
                    print_orders(out, "Orders", &session.orders_for_customer_name(&first, &last))?;
                }
                _ => {}
            }
        }
        Command::Queue { credentials, all } => {
            session.authorize(&credentials.username, &credentials.password, Capability::Fulfill)?;
            if all {
                let orders = session.orders_by_priority();
                print_orders(out, "Unshipped", &orders.iter().collect::<Vec<_>>())?;
            } else {
                let next = session.highest_priority_order().ok_or(StoreError::QueueEmpty)?;
                writeln!(out, "{next}")?;
            }
        }
        Command::Ship { credentials } => {
            session.authorize(&credentials.username, &credentials.password, Capability::Fulfill)?;
            let order = session.ship_next_order()?;
            writeln!(out, "Shipped {order}")?;
        }
        Command::AddProduct {
            credentials,
            name,
            kind,
            price,
            brand,
            quantity,
            description,
        } => {
            session.authorize(&credentials.username, &credentials.password, Capability::ManageCatalog)?;
            session.add_product(Product::new(name, kind, price, brand, quantity, description))?;
            writeln!(out, "Product added.")?;
        }
        Command::UpdateProduct {
            credentials,
            name,
            price,
            description,
            add_stock,
        } => {
            session.authorize(&credentials.username, &credentials.password, Capability::ManageCatalog)?;

            let updates = price
                .map(ProductUpdate::Price)
                .into_iter()
                .chain(description.map(ProductUpdate::Description))
                .chain(add_stock.map(ProductUpdate::AddStock));
            for update in updates {
                session.update_product(&name, update)?;
            }
            if let Some(product) = session.search_product_by_name(&name) {
                writeln!(out, "{product}")?;
            }
        }
        Command::RemoveProduct { credentials, name } => {
            session.authorize(&credentials.username, &credentials.password, Capability::ManageCatalog)?;
            let removed = session.remove_product(&name)?;
            writeln!(out, "Removed {removed}")?;
        }
        Command::Shell { .. } => return Err(CliError::NestedShell),
    }
    Ok(())
}

fn print_orders<W: Write>(out: &mut W, title: &str, orders: &[&Order]) -> io::Result<()> {
    writeln!(out, "{title}:")?;
    if orders.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for order in orders {
        writeln!(out, "  {order}")?;
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================
