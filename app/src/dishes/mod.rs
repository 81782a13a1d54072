use std::sync::Arc;

use log::*;

use infra::ids::{Id, IdGen};
use infra::persistence::Storage;

use crate::error::ApiError;
use crate::payload::Payload;
use crate::services::{Commandable, Queryable, Request};
use crate::validation::{ensure_id_matches, Chain};

mod models;
mod resources;

pub use self::models::Dish;
use self::models::DishForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListDishes;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateDish(pub Payload);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowDish(pub Id<Dish>);

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateDish {
    pub id: Id<Dish>,
    pub payload: Payload,
}

#[derive(Clone)]
pub struct Dishes {
    store: Arc<dyn Storage<Dish>>,
    idgen: IdGen,
    checks: Arc<Chain<Payload>>,
}

impl Dishes {
    pub fn new(store: Arc<dyn Storage<Dish>>) -> Self {
        let idgen = IdGen::new();
        let checks = Arc::new(models::checks());
        Dishes {
            store,
            idgen,
            checks,
        }
    }

    fn load(&self, id: &Id<Dish>) -> Result<Dish, ApiError> {
        let res = self.store.find(id)?;
        debug!("Load {} -> {:?}", id, res);
        res.ok_or_else(|| ApiError::not_found(id))
    }
}

impl Request for ListDishes {
    type Resp = Vec<Dish>;
}

impl Queryable<ListDishes> for Dishes {
    fn query(&self, _: ListDishes) -> Result<Vec<Dish>, ApiError> {
        Ok(self.store.list()?)
    }
}

impl Request for ShowDish {
    type Resp = Dish;
}

impl Queryable<ShowDish> for Dishes {
    fn query(&self, ShowDish(id): ShowDish) -> Result<Dish, ApiError> {
        self.load(&id)
    }
}

impl Request for CreateDish {
    type Resp = Dish;
}

impl Commandable<CreateDish> for Dishes {
    fn execute(&self, CreateDish(payload): CreateDish) -> Result<Dish, ApiError> {
        self.checks.run(&payload)?;
        let form = DishForm::from_payload(&payload)?;
        let dish = Dish::new(self.idgen.generate(), form);
        self.store.append(dish.clone())?;
        info!("Created dish {}: {:?}", dish.id, dish.name);
        Ok(dish)
    }
}

impl Request for UpdateDish {
    type Resp = Dish;
}

impl Commandable<UpdateDish> for Dishes {
    fn execute(&self, UpdateDish { id, payload }: UpdateDish) -> Result<Dish, ApiError> {
        let mut dish = self.load(&id)?;
        self.checks.run(&payload)?;
        ensure_id_matches(&id, &payload)?;

        dish.apply(DishForm::from_payload(&payload)?);
        self.store.replace(dish.clone())?;
        info!("Updated dish {}", dish.id);
        Ok(dish)
    }
}
