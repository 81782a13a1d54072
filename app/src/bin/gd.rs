use std::path::PathBuf;

use anyhow::Result;
use structopt::StructOpt;

use grubdash::config::{read_toml, Config, Overrides};
use grubdash::dishes::ListDishes;
use grubdash::orders::ListOrders;
use grubdash::services::Queryable;

#[derive(Debug, StructOpt)]
#[structopt(name = "gd", about = "GrubDash CLI")]
struct Opt {
    /// Input file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "show-dishes", about = "Show seeded dishes")]
    ShowDishes,
    #[structopt(name = "show-orders", about = "Show seeded orders")]
    ShowOrders,
}

fn main() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let opt = Opt::from_args();

    let mut config: Config = read_toml(&opt.config)?;
    config.apply(&Overrides::from_env()?);

    let gd = grubdash::GrubDash::new(&config)?;

    match opt.command {
        Commands::ShowDishes => {
            for dish in gd.dishes().query(ListDishes)? {
                println!("{}: {} ({:.2})", dish.id, dish.name, dish.price);
            }
        }
        Commands::ShowOrders => {
            for order in gd.orders().query(ListOrders)? {
                let count: u64 = order.dishes.iter().map(|l| l.quantity).sum();
                println!(
                    "{}: {} -> {} [{} items]",
                    order.id, order.status, order.deliver_to, count
                );
            }
        }
    }

    Ok(())
}
