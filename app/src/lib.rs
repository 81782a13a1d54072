use std::sync::Arc;

use actix_web::web;
use anyhow::{Context, Result};
use log::*;

use infra::persistence::{MemStore, Storage};

pub mod config;
pub mod dishes;
mod error;
pub mod orders;
mod payload;
mod responses;
pub mod services;
mod validation;

pub use crate::error::ApiError;
pub use crate::payload::{Envelope, Payload};

#[derive(Clone)]
pub struct GrubDash {
    dishes: dishes::Dishes,
    orders: orders::Orders,
}

impl GrubDash {
    /// Builds the service over fresh in-memory stores, seeded as the config
    /// says.
    pub fn new(config: &config::Config) -> Result<Self> {
        let seed = config.load_seed()?;

        let dish_store = MemStore::new();
        for dish in seed.dishes {
            dish_store.append(dish).context("seed dish")?;
        }
        let order_store = MemStore::new();
        for order in seed.orders {
            order_store.append(order).context("seed order")?;
        }

        Ok(Self::with_stores(
            Arc::new(dish_store),
            Arc::new(order_store),
            &config.orders,
        ))
    }

    pub fn with_stores(
        dish_store: Arc<dyn Storage<dishes::Dish>>,
        order_store: Arc<dyn Storage<orders::Order>>,
        rules: &config::OrderRules,
    ) -> Self {
        let dishes = dishes::Dishes::new(dish_store);
        let orders = orders::Orders::new(order_store, rules);
        GrubDash { dishes, orders }
    }

    pub fn dishes(&self) -> &dishes::Dishes {
        &self.dishes
    }

    pub fn orders(&self) -> &orders::Orders {
        &self.orders
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        info!("Configuring grubdash routes");
        cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
            debug!("Bad body for {}: {}", req.path(), err);
            ApiError::invalid(format!("Invalid request body: {}", err)).into()
        }));
        self.dishes.configure(cfg);
        self.orders.configure(cfg);
        cfg.service(web::resource("/{tail:.*}").to(responses::not_found));
    }
}
