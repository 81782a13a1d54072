use serde::{Deserialize, Serialize};
use serde_json::Value;

use infra::documents::Document;
use infra::ids::{Entity, Id};

use crate::error::ApiError;
use crate::payload::Payload;
use crate::validation::Chain;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Dish {
    pub id: Id<Dish>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
}

/// The client supplied part of a dish.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DishForm {
    name: String,
    description: String,
    price: f64,
    image_url: String,
}

impl Dish {
    pub(super) fn new(id: Id<Dish>, form: DishForm) -> Self {
        let DishForm {
            name,
            description,
            price,
            image_url,
        } = form;
        Dish {
            id,
            name,
            description,
            price,
            image_url,
        }
    }

    /// Replaces everything but the id.
    pub(super) fn apply(&mut self, form: DishForm) {
        *self = Dish::new(self.id.clone(), form);
    }
}

fn price(payload: &Payload) -> Option<f64> {
    payload
        .get("price")
        .and_then(Value::as_f64)
        .filter(|p| *p > 0.0)
}

fn required(field: &'static str) -> impl Fn(&Payload) -> Result<(), ApiError> {
    move |payload: &Payload| match payload.non_empty_str(field) {
        Some(_) => Ok(()),
        None => Err(missing(field)),
    }
}

fn missing(field: &str) -> ApiError {
    ApiError::invalid(format!("Dish must include {}", field))
}

/// Fields are checked in the order name, description, price, image_url;
/// the first one missing is the one reported.
pub(super) fn checks() -> Chain<Payload> {
    Chain::<Payload>::new("dish")
        .check(required("name"))
        .check(required("description"))
        .check(|payload| price(payload).map(|_| ()).ok_or_else(|| missing("price")))
        .check(required("image_url"))
}

impl DishForm {
    pub(super) fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        let text = |field| {
            payload
                .non_empty_str(field)
                .map(str::to_string)
                .ok_or_else(|| missing(field))
        };
        Ok(DishForm {
            name: text("name")?,
            description: text("description")?,
            price: price(payload).ok_or_else(|| missing("price"))?,
            image_url: text("image_url")?,
        })
    }
}

impl Entity for Dish {
    const NAME: &'static str = "Dish";
}

impl Document for Dish {
    fn id(&self) -> &Id<Self> {
        &self.id
    }
}
