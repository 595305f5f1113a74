//! Pincode validation and delivery area administration.

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::utils::{admin, public, test_app};

#[tokio::test]
async fn test_pincode_lookup_rules() -> Result<()> {
    let app = test_app();
    let (status, _) = admin(
        &app,
        Method::POST,
        "/admin/delivery-areas",
        Some(json!({ "pincode": "400053", "areaName": "Andheri", "district": "Mumbai Suburban", "deliveryCharges": 75 })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = public(
        &app,
        Method::GET,
        "/validate-pincode?pincode=400053&orderAmount=500",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);
    assert_eq!(body["deliveryCharges"], json!(75.0));
    assert_eq!(body["appliedRule"], "EXACT_MATCH");
    assert_eq!(body["area"]["district"], "Mumbai Suburban");

    let (_, body) = public(
        &app,
        Method::POST,
        "/validate-pincode",
        Some(json!({ "pincode": "400053", "orderAmount": 2500 })),
    )
    .await?;
    assert_eq!(body["deliveryCharges"], json!(0.0));
    assert_eq!(body["appliedRule"], "FREE_DELIVERY");

    let (_, body) = public(&app, Method::GET, "/validate-pincode?pincode=110001", None).await?;
    assert_eq!(body["isValid"], true);
    assert_eq!(body["exists"], false);
    assert_eq!(body["deliveryCharges"], json!(500.0));
    assert_eq!(body["appliedRule"], "DEFAULT_CHARGES");

    let (_, body) = public(&app, Method::GET, "/validate-pincode?pincode=12AB", None).await?;
    assert_eq!(body["isValid"], false);
    assert!(!body["validationErrors"].as_array().map(Vec::is_empty).unwrap_or(true));

    let (status, _) = public(&app, Method::POST, "/validate-pincode", Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_area_admin_lifecycle() -> Result<()> {
    let app = test_app();

    let (status, body) = admin(
        &app,
        Method::POST,
        "/admin/delivery-areas/bulk-import",
        Some(json!({ "areas": [
            { "pincode": "400001", "areaName": "Fort", "district": "Mumbai City" },
            { "pincode": "400708", "areaName": "Airoli", "district": "Thane", "deliveryCharges": 150 },
            { "pincode": "4007", "areaName": "Broken", "district": "Thane" }
        ]})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 2);
    assert_eq!(body["updated"], 0);
    assert_eq!(body["failed"][0]["pincode"], "4007");

    let (status, _) = admin(
        &app,
        Method::POST,
        "/admin/delivery-areas",
        Some(json!({ "pincode": "400001", "areaName": "Fort", "district": "Mumbai City" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = admin(
        &app,
        Method::PATCH,
        "/admin/delivery-areas/400708",
        Some(json!({ "deliveryCharges": 90, "isActive": false })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"]["deliveryCharges"], json!(90.0));

    let (_, body) = public(&app, Method::GET, "/validate-pincode?pincode=400708", None).await?;
    assert_eq!(body["exists"], false);

    let (_, body) = admin(&app, Method::GET, "/admin/delivery-areas", None).await?;
    assert_eq!(body["areas"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["areas"][0]["pincode"], "400001");

    let (status, _) = admin(&app, Method::DELETE, "/admin/delivery-areas/400001", None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = admin(&app, Method::DELETE, "/admin/delivery-areas/400001", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
