use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::{middleware, App, HttpServer};
use anyhow::{Context, Result};
use log::*;
use serde::Deserialize;
use structopt::StructOpt;

use grubdash::config::{read_toml, EnvLogger, Overrides};

#[derive(Debug, StructOpt)]
#[structopt(name = "serve", about = "Serve GrubDash.")]
struct Opt {
    /// Input file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    grubdash: grubdash::config::Config,
    listener: Listener,
    #[serde(default)]
    env_logger: EnvLogger,
}

#[derive(Deserialize, Debug)]
struct Listener {
    addr: SocketAddr,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config: Config = read_toml(&opt.config)?;
    config.env_logger.builder().init();
    debug!("Options: {:?}", opt);

    let overrides = Overrides::from_env()?;
    config.grubdash.apply(&overrides);
    let addr = overrides.listen_addr.unwrap_or(config.listener.addr);

    let app = grubdash::GrubDash::new(&config.grubdash).context("build app")?;

    let srv = HttpServer::new(move || {
        let app = app.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(move |cfg| app.configure(cfg))
    })
    .bind(addr)
    .with_context(|| format!("bind {}", addr))?;
    info!("Listening on: {:?}", srv.addrs());

    srv.run().await.context("run server")?;
    Ok(())
}
