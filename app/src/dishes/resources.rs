use std::future::ready;

use actix_web::web;
use log::*;
use serde_json::Value;

use infra::ids::Id;

use crate::error::ApiError;
use crate::payload::Envelope;
use crate::responses::{method_not_allowed, not_found, DataResponse};
use crate::services::{Commandable, Queryable};

use super::{CreateDish, Dish, Dishes, ListDishes, ShowDish, UpdateDish};

const PREFIX: &str = "/dishes";

impl Dishes {
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let scope = web::scope(PREFIX)
            .service(
                web::resource("")
                    .route(web::get().to({
                        let me = self.clone();
                        move || ready(me.index())
                    }))
                    .route(web::post().to({
                        let me = self.clone();
                        move |body: web::Json<Envelope<Value>>| ready(me.create(body.into_inner()))
                    }))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/{dish_id}")
                    .route(web::get().to({
                        let me = self.clone();
                        move |id: web::Path<String>| ready(me.detail(id.into_inner().into()))
                    }))
                    .route(web::put().to({
                        let me = self.clone();
                        move |id: web::Path<String>, body: web::Json<Envelope<Value>>| {
                            ready(me.update(id.into_inner().into(), body.into_inner()))
                        }
                    }))
                    .default_service(web::to(method_not_allowed)),
            )
            .default_service(web::to(not_found));

        cfg.service(scope);
    }

    fn index(&self) -> Result<DataResponse<Vec<Dish>>, ApiError> {
        info!("Handle dish index");
        let dishes = self.query(ListDishes)?;
        Ok(DataResponse::of(dishes))
    }

    fn create(&self, body: Envelope<Value>) -> Result<DataResponse<Dish>, ApiError> {
        debug!("Create dish: {:?}", body);
        let dish = self.execute(CreateDish(body.into()))?;
        Ok(DataResponse::created(dish))
    }

    fn detail(&self, id: Id<Dish>) -> Result<DataResponse<Dish>, ApiError> {
        let dish = self.query(ShowDish(id))?;
        Ok(DataResponse::of(dish))
    }

    fn update(&self, id: Id<Dish>, body: Envelope<Value>) -> Result<DataResponse<Dish>, ApiError> {
        debug!("Update dish {}: {:?}", id, body);
        let payload = body.into();
        let dish = self.execute(UpdateDish { id, payload })?;
        Ok(DataResponse::of(dish))
    }
}
