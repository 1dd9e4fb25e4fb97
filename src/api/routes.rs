use crate::domain::model::{
    CarFeatures, PredictionResponse, CAR_TYPES, FUELS, MODEL_KEYS, PAINT_COLORS,
};
use crate::inference::ModelStore;
use crate::utils::error::{PricingError, Result};
use actix_web::{web, HttpResponse};
use serde_json::json;
use std::time::Instant;

pub struct AppState {
    pub store: ModelStore,
    pub max_batch_size: usize,
}

impl AppState {
    pub fn new(store: ModelStore, max_batch_size: usize) -> Self {
        Self {
            store,
            max_batch_size,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/model", web::get().to(model_info))
        .route("/prediction", web::post().to(predict))
        .route("/prediction/batch", web::post().to(predict_batch));
}

async fn index() -> HttpResponse {
    let list = |values: &[&str]| values.join(", ");
    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Getaround Pricing Optimizer API</title></head>
<body>
    <h1>Getaround Pricing Optimizer</h1>
    <p>POST a car to <strong>/prediction</strong> (or a list of cars to <strong>/prediction/batch</strong>) to get an estimated daily rental price.</p>
    <ul>
        <li><code>model_key</code>: {}</li>
        <li><code>mileage</code>, <code>engine_power</code>: integer (mileage must be non-zero)</li>
        <li><code>fuel</code>: {}</li>
        <li><code>paint_color</code>: {}</li>
        <li><code>car_type</code>: {}</li>
        <li><code>private_parking_available</code>, <code>has_gps</code>, <code>has_air_conditioning</code>, <code>automatic_car</code>, <code>has_getaround_connect</code>, <code>has_speed_regulator</code>, <code>winter_tires</code>: boolean</li>
    </ul>
</body>
</html>"#,
        list(&MODEL_KEYS),
        list(&FUELS),
        list(&PAINT_COLORS),
        list(&CAR_TYPES),
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model_loaded": state.store.is_loaded(),
    }))
}

async fn model_info(state: web::Data<AppState>) -> Result<HttpResponse> {
    let info = web::block(move || {
        let model = state.store.get()?;
        Ok::<_, PricingError>(model.info(state.store.policy().as_str()))
    })
    .await
    .map_err(|e| PricingError::processing(format!("blocking task failed: {}", e)))??;

    Ok(HttpResponse::Ok().json(info))
}

async fn predict(
    state: web::Data<AppState>,
    car: web::Json<CarFeatures>,
) -> Result<HttpResponse> {
    let car = car.into_inner();
    car.validate()?;

    let prediction = score(state, vec![car]).await?;
    Ok(HttpResponse::Ok().json(PredictionResponse { prediction }))
}

async fn predict_batch(
    state: web::Data<AppState>,
    cars: web::Json<Vec<CarFeatures>>,
) -> Result<HttpResponse> {
    let cars = cars.into_inner();

    if cars.is_empty() {
        return Err(PricingError::validation("body", "batch cannot be empty"));
    }
    if cars.len() > state.max_batch_size {
        return Err(PricingError::validation(
            "body",
            format!("batch of {} exceeds the limit of {}", cars.len(), state.max_batch_size),
        ));
    }
    for (i, car) in cars.iter().enumerate() {
        car.validate().map_err(|e| match e {
            PricingError::ValidationError { field, message } => {
                PricingError::validation(&format!("[{}].{}", i, field), message)
            }
            other => other,
        })?;
    }

    let prediction = score(state, cars).await?;
    Ok(HttpResponse::Ok().json(PredictionResponse { prediction }))
}

async fn score(state: web::Data<AppState>, cars: Vec<CarFeatures>) -> Result<Vec<f64>> {
    let started = Instant::now();
    let count = cars.len();

    // 推論在 blocking pool 執行
    let predictions = web::block(move || {
        let model = state.store.get()?;
        model.predict(&cars)
    })
    .await
    .map_err(|e| PricingError::processing(format!("blocking task failed: {}", e)))?
    .inspect_err(|e| tracing::error!("Prediction failed: {}", e))?;

    tracing::info!(
        "Predicted {} car(s) in {}ms",
        count,
        started.elapsed().as_millis()
    );
    Ok(predictions)
}
