use std::sync::Arc;

use log::*;

use infra::ids::{Id, IdGen};
use infra::persistence::Storage;

use crate::config::OrderRules;
use crate::error::ApiError;
use crate::payload::Payload;
use crate::services::{Commandable, Queryable, Request};
use crate::validation::{ensure_id_matches, Chain};

mod models;
mod resources;

use self::models::OrderForm;
pub use self::models::{Order, OrderLine, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrders;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrder(pub Payload);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowOrder(pub Id<Order>);

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOrder {
    pub id: Id<Order>,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOrder(pub Id<Order>);

#[derive(Clone)]
pub struct Orders {
    store: Arc<dyn Storage<Order>>,
    idgen: IdGen,
    create_checks: Arc<Chain<Payload>>,
    update_checks: Arc<Chain<Payload>>,
}

impl Orders {
    pub fn new(store: Arc<dyn Storage<Order>>, rules: &OrderRules) -> Self {
        let idgen = IdGen::new();
        let create_checks = Arc::new(models::create_checks());
        let update_checks = Arc::new(models::update_checks(rules.allow_delivered_status));
        Orders {
            store,
            idgen,
            create_checks,
            update_checks,
        }
    }

    fn load(&self, id: &Id<Order>) -> Result<Order, ApiError> {
        let res = self.store.find(id)?;
        debug!("Load {} -> {:?}", id, res);
        res.ok_or_else(|| ApiError::not_found(id))
    }
}

impl Request for ListOrders {
    type Resp = Vec<Order>;
}

impl Queryable<ListOrders> for Orders {
    fn query(&self, _: ListOrders) -> Result<Vec<Order>, ApiError> {
        Ok(self.store.list()?)
    }
}

impl Request for ShowOrder {
    type Resp = Order;
}

impl Queryable<ShowOrder> for Orders {
    fn query(&self, ShowOrder(id): ShowOrder) -> Result<Order, ApiError> {
        self.load(&id)
    }
}

impl Request for PlaceOrder {
    type Resp = Order;
}

impl Commandable<PlaceOrder> for Orders {
    fn execute(&self, PlaceOrder(payload): PlaceOrder) -> Result<Order, ApiError> {
        self.create_checks.run(&payload)?;
        let order = Order::new(self.idgen.generate(), OrderForm::from_payload(&payload)?);
        self.store.append(order.clone())?;
        info!(
            "Placed order {} for {} dishes ({})",
            order.id,
            order.dishes.len(),
            order.status
        );
        Ok(order)
    }
}

impl Request for UpdateOrder {
    type Resp = Order;
}

impl Commandable<UpdateOrder> for Orders {
    fn execute(&self, UpdateOrder { id, payload }: UpdateOrder) -> Result<Order, ApiError> {
        let mut order = self.load(&id)?;
        self.update_checks.run(&payload)?;
        ensure_id_matches(&id, &payload)?;

        let previous = order.status;
        order.apply(OrderForm::from_payload(&payload)?);
        self.store.replace(order.clone())?;
        info!("Updated order {} ({} -> {})", order.id, previous, order.status);
        Ok(order)
    }
}

impl Request for DeleteOrder {
    type Resp = ();
}

impl Commandable<DeleteOrder> for Orders {
    fn execute(&self, DeleteOrder(id): DeleteOrder) -> Result<(), ApiError> {
        let order = self.load(&id)?;
        if order.status != OrderStatus::Pending {
            warn!("Refusing to delete order {} in state {}", id, order.status);
            return Err(ApiError::conflict(
                "An order cannot be deleted unless it is pending",
            ));
        }
        self.store
            .remove(&id)?
            .ok_or_else(|| ApiError::not_found(&id))?;
        info!("Deleted order {}", id);
        Ok(())
    }
}
