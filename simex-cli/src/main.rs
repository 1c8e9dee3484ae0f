//! Simex CLI — replay order schedules against recorded bar sequences.
//!
//! Commands:
//! - `run` — replay a CSV order schedule against a CSV bar file
//! - `bars` — inspect a bar file: row count, period, close range, sanity
//!
//! Bar files are CSV with a `time,open,high,low,close,volume` header and
//! epoch-millisecond times. Schedules are CSV with
//! `time,action,side,type,price,quantity,order_id` where `action` is
//! `submit` or `cancel` and `side`/`type` use the wire spelling
//! (`BUY`/`SELL`, `LIMIT`/`MARKET`); each row is applied once the engine
//! clock reaches its time, in file order.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use simex_core::domain::{Bar, Order, OrderId, OrderSide, OrderStatus, OrderType, ReferencePrice};
use simex_core::engine::{Balances, Exchange, ExchangeConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "simex", about = "Simex CLI — deterministic exchange replay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a CSV order schedule against a CSV bar file.
    Run {
        /// Bar file (time,open,high,low,close,volume).
        #[arg(long)]
        bars: PathBuf,

        /// Order schedule (time,action,side,type,price,quantity,order_id).
        #[arg(long)]
        orders: PathBuf,

        /// TOML exchange config. Mutually exclusive with the inline
        /// balance and fee flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Starting asset balance. Defaults to 0.
        #[arg(long)]
        balance_asset: Option<f64>,

        /// Starting quote balance. Defaults to 10000.
        #[arg(long)]
        balance_quote: Option<f64>,

        /// Fee rate applied to fills. Defaults to 0.001.
        #[arg(long)]
        fee: Option<f64>,

        /// Bar field used as the match price: open, high, low or close.
        #[arg(long)]
        price: Option<String>,

        /// Write the full run report as JSON to this path.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Inspect a bar file: row count, period, close range, sanity.
    Bars {
        /// Bar file to inspect.
        file: PathBuf,
    },
}

/// Raw schedule row as it appears in the CSV. Optional columns are left
/// empty for the actions that do not use them.
#[derive(Debug, Deserialize)]
struct ScheduleRow {
    time: i64,
    action: ScheduleAction,
    side: Option<OrderSide>,
    #[serde(rename = "type")]
    order_type: Option<OrderType>,
    price: Option<f64>,
    quantity: Option<f64>,
    order_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ScheduleAction {
    Submit,
    Cancel,
}

/// Validated schedule row, ready to apply.
struct ScheduleEntry {
    time: i64,
    op: ScheduleOp,
}

enum ScheduleOp {
    Submit {
        side: OrderSide,
        order_type: OrderType,
        price: f64,
        quantity: f64,
    },
    Cancel {
        order_id: OrderId,
    },
}

#[derive(Serialize)]
struct RunReport {
    bars_processed: usize,
    bars_stale: usize,
    schedule_applied: usize,
    schedule_rejected: usize,
    schedule_pending: usize,
    balances: Balances,
    orders: Vec<Order>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            bars,
            orders,
            config,
            balance_asset,
            balance_quote,
            fee,
            price,
            json,
        } => run_replay(
            &bars,
            &orders,
            config.as_deref(),
            balance_asset,
            balance_quote,
            fee,
            price.as_deref(),
            json.as_deref(),
        ),
        Commands::Bars { file } => run_bars_report(&file),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_replay(
    bars_path: &Path,
    orders_path: &Path,
    config_path: Option<&Path>,
    balance_asset: Option<f64>,
    balance_quote: Option<f64>,
    fee: Option<f64>,
    price_field: Option<&str>,
    json_path: Option<&Path>,
) -> Result<()> {
    let mut config: ExchangeConfig = match config_path {
        Some(path) => {
            if balance_asset.is_some() || balance_quote.is_some() || fee.is_some() {
                bail!("--config and the inline balance/fee flags are mutually exclusive");
            }
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => ExchangeConfig::new(
            balance_asset.unwrap_or(0.0),
            balance_quote.unwrap_or(10000.0),
            fee.unwrap_or(0.001),
        ),
    };
    if let Some(field) = price_field {
        config.reference_price = parse_price_field(field)?;
    }

    let bars = load_bars(bars_path)?;
    if bars.is_empty() {
        bail!("bar file {} has no rows", bars_path.display());
    }
    let first_time = bars[0].time;
    let last_time = bars[bars.len() - 1].time;

    let schedule = load_schedule(orders_path)?;
    let start_asset = config.balance_asset;
    let start_quote = config.balance_quote;
    let mut exchange = Exchange::with_bars(config, bars);

    let mut cursor = 0usize;
    let mut applied = 0usize;
    let mut rejected = 0usize;
    let mut stale = 0usize;

    // Rows dated at or before the engine's start apply before the first bar.
    apply_due_entries(
        &mut exchange,
        &schedule,
        &mut cursor,
        &mut applied,
        &mut rejected,
    );

    loop {
        let clock = exchange.time();
        match exchange.next_bar()? {
            Some(_) => {
                if exchange.time() == clock {
                    stale += 1;
                }
                apply_due_entries(
                    &mut exchange,
                    &schedule,
                    &mut cursor,
                    &mut applied,
                    &mut rejected,
                );
            }
            None => break,
        }
    }

    let pending = schedule.len() - cursor;
    print_summary(
        &exchange,
        first_time,
        last_time,
        (start_asset, start_quote),
        applied,
        rejected,
        pending,
        stale,
    );

    if let Some(path) = json_path {
        let report = RunReport {
            bars_processed: exchange.bars_consumed(),
            bars_stale: stale,
            schedule_applied: applied,
            schedule_rejected: rejected,
            schedule_pending: pending,
            balances: exchange.balances(),
            orders: exchange.orders().to_vec(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Apply every schedule row whose time has come, in file order. Rejections
/// are reported and counted, never fatal: a replay mirrors what a live
/// strategy would have seen.
fn apply_due_entries(
    exchange: &mut Exchange,
    schedule: &[ScheduleEntry],
    cursor: &mut usize,
    applied: &mut usize,
    rejected: &mut usize,
) {
    while let Some(entry) = schedule.get(*cursor) {
        if entry.time > exchange.time() {
            break;
        }
        *cursor += 1;

        match entry.op {
            ScheduleOp::Submit {
                side,
                order_type,
                price,
                quantity,
            } => match exchange.create_order(side, order_type, price, quantity) {
                Ok(_) => *applied += 1,
                Err(err) => {
                    *rejected += 1;
                    println!("Rejected submit at t={}: {err}", entry.time);
                }
            },
            ScheduleOp::Cancel { order_id } => match exchange.cancel_order(order_id) {
                Ok(_) => *applied += 1,
                Err(err) => {
                    *rejected += 1;
                    println!("Rejected cancel at t={}: {err}", entry.time);
                }
            },
        }
    }
}

fn parse_price_field(field: &str) -> Result<ReferencePrice> {
    match field {
        "open" => Ok(ReferencePrice::Open),
        "high" => Ok(ReferencePrice::High),
        "low" => Ok(ReferencePrice::Low),
        "close" => Ok(ReferencePrice::Close),
        _ => bail!("unknown price field '{field}'. Valid: open, high, low, close"),
    }
}

fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open bar file {}", path.display()))?;

    let mut bars = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let bar: Bar = row.with_context(|| format!("bad bar row {line}"))?;
        if !bar.is_sane() {
            bail!("bar row {line} (t={}) fails the sanity check", bar.time);
        }
        bars.push(bar);
    }
    Ok(bars)
}

fn load_schedule(path: &Path) -> Result<Vec<ScheduleEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open schedule {}", path.display()))?;

    let mut entries = Vec::new();
    let mut last_time = i64::MIN;
    for (i, row) in reader.deserialize().enumerate() {
        let line = i + 2;
        let row: ScheduleRow = row.with_context(|| format!("bad schedule row {line}"))?;
        if row.time < last_time {
            bail!("schedule row {line} goes back in time");
        }
        last_time = row.time;

        let op = match row.action {
            ScheduleAction::Submit => match (row.side, row.order_type, row.price, row.quantity) {
                (Some(side), Some(order_type), Some(price), Some(quantity)) => {
                    ScheduleOp::Submit {
                        side,
                        order_type,
                        price,
                        quantity,
                    }
                }
                _ => bail!("schedule row {line}: submit needs side, type, price and quantity"),
            },
            ScheduleAction::Cancel => match row.order_id {
                Some(id) => ScheduleOp::Cancel {
                    order_id: OrderId(id),
                },
                None => bail!("schedule row {line}: cancel needs order_id"),
            },
        };
        entries.push(ScheduleEntry { time: row.time, op });
    }
    Ok(entries)
}

#[allow(clippy::too_many_arguments)]
fn print_summary(
    exchange: &Exchange,
    first_time: i64,
    last_time: i64,
    start_balances: (f64, f64),
    applied: usize,
    rejected: usize,
    pending: usize,
    stale: usize,
) {
    let mut open = 0;
    let mut filled = 0;
    let mut canceled = 0;
    for order in exchange.orders() {
        match order.status {
            OrderStatus::New => open += 1,
            OrderStatus::Filled => filled += 1,
            OrderStatus::Canceled => canceled += 1,
        }
    }

    println!();
    println!("=== Run Result ===");
    println!(
        "Period:         {} to {}",
        format_time(first_time),
        format_time(last_time)
    );
    println!(
        "Bars:           {} processed ({stale} stale)",
        exchange.bars_consumed()
    );
    println!("Schedule:       {applied} applied, {rejected} rejected, {pending} never due");
    println!(
        "Orders:         {} total ({open} open, {filled} filled, {canceled} canceled)",
        exchange.orders().len()
    );
    println!();
    println!("--- Balances ---");
    println!(
        "Asset:          {} -> {}",
        start_balances.0,
        exchange.balance_asset()
    );
    println!(
        "Quote:          {} -> {}",
        start_balances.1,
        exchange.balance_quote()
    );

    if !exchange.orders().is_empty() {
        println!();
        println!("--- Orders ---");
        println!(
            "{:<5} {:<5} {:<7} {:>12} {:>10} {:<9} {:<21} {:<21}",
            "Id", "Side", "Type", "Price", "Qty", "Status", "Created", "Updated"
        );
        println!("{}", "-".repeat(97));
        for order in exchange.orders() {
            println!(
                "{:<5} {:<5} {:<7} {:>12} {:>10} {:<9} {:<21} {:<21}",
                order.id,
                format!("{:?}", order.side),
                format!("{:?}", order.order_type),
                order.price,
                order.orig_qty,
                format!("{:?}", order.status),
                format_time(order.time),
                format_time(order.update_time),
            );
        }
    }
    println!();
}

fn run_bars_report(path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open bar file {}", path.display()))?;

    let mut count = 0usize;
    let mut first_time = None;
    let mut last_time = 0i64;
    let mut close_min = f64::INFINITY;
    let mut close_max = f64::NEG_INFINITY;
    let mut insane: Vec<usize> = Vec::new();

    for (i, row) in reader.deserialize().enumerate() {
        let line = i + 2;
        let bar: Bar = row.with_context(|| format!("bad bar row {line}"))?;
        count += 1;
        if first_time.is_none() {
            first_time = Some(bar.time);
        }
        last_time = bar.time;
        close_min = close_min.min(bar.close);
        close_max = close_max.max(bar.close);
        if !bar.is_sane() {
            insane.push(line);
        }
    }

    if count == 0 {
        println!("Bar file is empty: {}", path.display());
        return Ok(());
    }

    println!("Bar file: {}", path.display());
    println!("Rows:           {count}");
    if let Some(first) = first_time {
        println!(
            "Period:         {} to {}",
            format_time(first),
            format_time(last_time)
        );
    }
    println!("Close range:    {close_min} to {close_max}");
    if insane.is_empty() {
        println!("Sanity:         all rows pass");
    } else {
        println!("Sanity:         {} row(s) fail:", insane.len());
        for line in &insane {
            println!("  row {line}");
        }
    }

    Ok(())
}

fn format_time(ms: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => format!("{ms} ms"),
    }
}
