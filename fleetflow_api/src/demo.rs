use axum::Json;
use serde_json::{Value, json};

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/demo-data: a ready-to-post request covering the Andhra Pradesh
/// delivery network the frontend demos with.
pub async fn demo_data_handler() -> Json<Value> {
    Json(json!({
        "depot": {
            "lat": 16.5744,
            "lon": 80.6556,
            "address": "Amaravati, Andhra Pradesh, India"
        },
        "destinations": [
            { "lat": 16.5062, "lon": 80.6480, "address": "Vijayawada, Andhra Pradesh, India" },
            { "lat": 16.2991, "lon": 80.4575, "address": "Guntur, Andhra Pradesh, India" },
            { "lat": 14.4426, "lon": 79.9865, "address": "Nellore, Andhra Pradesh, India" },
            { "lat": 15.8281, "lon": 78.0373, "address": "Kurnool, Andhra Pradesh, India" },
            { "lat": 14.6819, "lon": 77.6006, "address": "Anantapur, Andhra Pradesh, India" },
            { "lat": 14.4753, "lon": 78.8215, "address": "Kadapa, Andhra Pradesh, India" },
            { "lat": 13.6288, "lon": 79.4192, "address": "Tirupati, Andhra Pradesh, India" },
            { "lat": 17.6868, "lon": 83.2185, "address": "Visakhapatnam, Andhra Pradesh, India" },
            { "lat": 17.0005, "lon": 81.8040, "address": "Rajahmundry, Andhra Pradesh, India" },
            { "lat": 16.9604, "lon": 82.2389, "address": "Kakinada, Andhra Pradesh, India" }
        ],
        "vehicle_count": 3
    }))
}
