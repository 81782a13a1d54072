use std::future::ready;

use actix_web::{web, HttpResponse};
use log::*;
use serde_json::Value;

use infra::ids::Id;

use crate::error::ApiError;
use crate::payload::Envelope;
use crate::responses::{method_not_allowed, no_content, not_found, DataResponse};
use crate::services::{Commandable, Queryable};

use super::{DeleteOrder, ListOrders, Order, Orders, PlaceOrder, ShowOrder, UpdateOrder};

const PREFIX: &str = "/orders";

impl Orders {
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let scope = web::scope(PREFIX)
            .service(
                web::resource("")
                    .route(web::get().to({
                        let me = self.clone();
                        move || ready(me.list())
                    }))
                    .route(web::post().to({
                        let me = self.clone();
                        move |body: web::Json<Envelope<Value>>| ready(me.submit(body.into_inner()))
                    }))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/{order_id}")
                    .route(web::get().to({
                        let me = self.clone();
                        move |id: web::Path<String>| ready(me.show(id.into_inner().into()))
                    }))
                    .route(web::put().to({
                        let me = self.clone();
                        move |id: web::Path<String>, body: web::Json<Envelope<Value>>| {
                            ready(me.update(id.into_inner().into(), body.into_inner()))
                        }
                    }))
                    .route(web::delete().to({
                        let me = self.clone();
                        move |id: web::Path<String>| ready(me.delete(id.into_inner().into()))
                    }))
                    .default_service(web::to(method_not_allowed)),
            )
            .default_service(web::to(not_found));

        cfg.service(scope);
    }

    fn list(&self) -> Result<DataResponse<Vec<Order>>, ApiError> {
        info!("Handle order list");
        let orders = self.query(ListOrders)?;
        Ok(DataResponse::of(orders))
    }

    fn submit(&self, body: Envelope<Value>) -> Result<DataResponse<Order>, ApiError> {
        debug!("Submit order: {:?}", body);
        let order = self.execute(PlaceOrder(body.into()))?;
        Ok(DataResponse::created(order))
    }

    fn show(&self, id: Id<Order>) -> Result<DataResponse<Order>, ApiError> {
        let order = self.query(ShowOrder(id))?;
        Ok(DataResponse::of(order))
    }

    fn update(&self, id: Id<Order>, body: Envelope<Value>) -> Result<DataResponse<Order>, ApiError> {
        debug!("Update order {}: {:?}", id, body);
        let payload = body.into();
        let order = self.execute(UpdateOrder { id, payload })?;
        Ok(DataResponse::of(order))
    }

    fn delete(&self, id: Id<Order>) -> Result<HttpResponse, ApiError> {
        debug!("Delete order {}", id);
        self.execute(DeleteOrder(id))?;
        Ok(no_content())
    }
}
