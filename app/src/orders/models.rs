use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use infra::documents::Document;
use infra::ids::{Entity, Id};

use crate::error::ApiError;
use crate::payload::{as_integer, loose_number, truthy, Payload};
use crate::validation::Chain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    OutForDelivery,
    Delivered,
}

/// One dish within an order. Whatever the client sent about the dish is
/// kept as-is next to the quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(flatten)]
    pub dish: Map<String, Value>,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Id<Order>,
    pub deliver_to: String,
    pub mobile_number: String,
    pub status: OrderStatus,
    pub dishes: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct OrderForm {
    deliver_to: String,
    mobile_number: String,
    status: Option<OrderStatus>,
    dishes: Vec<OrderLine>,
}

const STATUS_MSG: &str =
    "Order must have a status of pending, preparing, out-for-delivery, delivered";

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|st| st.as_str() == s)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

impl Order {
    pub(super) fn new(id: Id<Order>, form: OrderForm) -> Self {
        let OrderForm {
            deliver_to,
            mobile_number,
            status,
            dishes,
        } = form;
        Order {
            id,
            deliver_to,
            mobile_number,
            status: status.unwrap_or(OrderStatus::Pending),
            dishes,
        }
    }

    /// Replaces everything but the id.
    pub(super) fn apply(&mut self, form: OrderForm) {
        let status = form.status.unwrap_or(self.status);
        let form = OrderForm {
            status: Some(status),
            ..form
        };
        *self = Order::new(self.id.clone(), form);
    }
}

fn invalid(msg: &str) -> ApiError {
    ApiError::invalid(msg)
}

fn bad_quantity(index: usize) -> ApiError {
    ApiError::invalid(format!(
        "Dish {} must have a quantity that is an integer greater than 0",
        index
    ))
}

fn required(field: &'static str, msg: &'static str) -> impl Fn(&Payload) -> Result<(), ApiError> {
    move |payload: &Payload| match payload.non_empty_str(field) {
        Some(_) => Ok(()),
        None => Err(invalid(msg)),
    }
}

fn dish_entries(payload: &Payload) -> &[Value] {
    payload
        .get("dishes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn quantity(entry: &Value) -> Option<&Value> {
    entry.as_object().and_then(|dish| dish.get("quantity"))
}

/// Reports the first entry for which `bad` holds.
fn each_quantity<F>(bad: F) -> impl Fn(&Payload) -> Result<(), ApiError>
where
    F: Fn(Option<&Value>) -> bool,
{
    move |payload: &Payload| match dish_entries(payload)
        .iter()
        .position(|entry| bad(quantity(entry)))
    {
        Some(index) => Err(bad_quantity(index)),
        None => Ok(()),
    }
}

/// The checks shared by create and update, in the order they run.
pub(super) fn order_checks() -> Chain<Payload> {
    Chain::<Payload>::new("order")
        .check(required("deliverTo", "Order must include a deliverTo"))
        .check(required("mobileNumber", "Order must include a mobileNumber"))
        .check(|payload| {
            if payload.has("dishes") {
                Ok(())
            } else {
                Err(invalid("Order must include a dish"))
            }
        })
        .check(|payload| match payload.get("dishes") {
            Some(Value::Array(_)) => Ok(()),
            _ => Err(invalid("Order must include at least one dish")),
        })
        .check(|payload| {
            if dish_entries(payload).is_empty() {
                Err(invalid("Order must include at least one dish"))
            } else {
                Ok(())
            }
        })
        .check(each_quantity(|q| !q.map(truthy).unwrap_or(false)))
        .check(each_quantity(|q| {
            q.and_then(loose_number).map(|n| n <= 0.0).unwrap_or(false)
        }))
        .check(each_quantity(|q| {
            q.and_then(as_integer).map(|n| n <= 0).unwrap_or(true)
        }))
}

/// Create leaves the status optional; a new order is pending unless told
/// otherwise.
pub(super) fn create_checks() -> Chain<Payload> {
    order_checks().then(Chain::<Payload>::new("order status").check(|payload| {
        if !payload.has("status") {
            return Ok(());
        }
        match payload.get("status").and_then(Value::as_str).and_then(OrderStatus::parse) {
            Some(_) => Ok(()),
            None => Err(invalid(STATUS_MSG)),
        }
    }))
}

/// Update insists on a status. `delivered` is only accepted when
/// `allow_delivered` is set.
pub(super) fn update_checks(allow_delivered: bool) -> Chain<Payload> {
    order_checks().then(
        Chain::<Payload>::new("order status")
            .check(|payload| {
                if payload.has("status") {
                    Ok(())
                } else {
                    Err(invalid(STATUS_MSG))
                }
            })
            .check(|payload| match payload.get("status") {
                Some(Value::String(s)) if s.is_empty() => Err(invalid(STATUS_MSG)),
                _ => Ok(()),
            })
            .check(move |payload| {
                let status = payload
                    .get("status")
                    .and_then(Value::as_str)
                    .and_then(OrderStatus::parse);
                match status {
                    Some(OrderStatus::Delivered) if !allow_delivered => Err(invalid(STATUS_MSG)),
                    Some(_) => Ok(()),
                    None => Err(invalid(STATUS_MSG)),
                }
            }),
    )
}

impl OrderForm {
    pub(super) fn from_payload(payload: &Payload) -> Result<Self, ApiError> {
        let text = |field, msg| {
            payload
                .non_empty_str(field)
                .map(str::to_string)
                .ok_or_else(|| invalid(msg))
        };
        let dishes = dish_entries(payload)
            .iter()
            .enumerate()
            .map(|(index, entry)| -> Result<OrderLine, ApiError> {
                let mut dish = entry.as_object().cloned().unwrap_or_default();
                let quantity = dish
                    .remove("quantity")
                    .as_ref()
                    .and_then(as_integer)
                    .and_then(|n| u64::try_from(n).ok())
                    .filter(|n| *n > 0)
                    .ok_or_else(|| bad_quantity(index))?;
                Ok(OrderLine { dish, quantity })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let status = payload
            .get("status")
            .and_then(Value::as_str)
            .and_then(OrderStatus::parse);

        Ok(OrderForm {
            deliver_to: text("deliverTo", "Order must include a deliverTo")?,
            mobile_number: text("mobileNumber", "Order must include a mobileNumber")?,
            status,
            dishes,
        })
    }
}

impl Entity for Order {
    const NAME: &'static str = "Order";
}

impl Document for Order {
    fn id(&self) -> &Id<Self> {
        &self.id
    }
}
