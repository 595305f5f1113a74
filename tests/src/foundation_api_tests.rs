//! Foundation registry, fee settings and breakdown preview over HTTP.

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::utils::{admin, foundation_id, public, seed_defaults, test_app};

#[tokio::test]
async fn test_settings_seed_default_foundations() -> Result<()> {
    let app = test_app();
    let (status, body) = admin(&app, Method::GET, "/admin/foundation-settings", None).await?;
    assert_eq!(status, StatusCode::OK);

    let settings = body["settings"].as_array().expect("settings array");
    assert_eq!(settings.len(), 2);
    assert_eq!(settings[0]["foundationCode"], "vsf");
    assert_eq!(settings[0]["platformFeePercent"], json!(12.0));
    assert_eq!(settings[0]["foundationSharePercent"], json!(65.0));
    assert_eq!(settings[0]["companySharePercent"], json!(35.0));
    assert_eq!(settings[1]["foundationCode"], "cf");
    assert_eq!(settings[1]["platformFeePercent"], json!(8.0));

    // Seeding happens once.
    let (_, again) = admin(&app, Method::GET, "/admin/foundation-settings", None).await?;
    assert_eq!(again["settings"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_preview_breakdown() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let (status, body) = public(
        &app,
        Method::POST,
        "/foundation-settings/preview",
        Some(json!({ "amount": 100, "foundationCode": "vsf" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["foundationName"], "Vishnu Shakti Foundation");
    assert_eq!(body["breakdown"]["grossAmount"], json!(100.0));
    assert_eq!(body["breakdown"]["platformFee"], json!(12.0));
    assert_eq!(body["breakdown"]["afterPlatformFee"], json!(88.0));
    assert_eq!(body["breakdown"]["foundationShare"], json!(57.2));
    assert_eq!(body["breakdown"]["companyShare"], json!(30.8));
    assert_eq!(body["companySharePercent"], json!(35.0));
    Ok(())
}

#[tokio::test]
async fn test_preview_rejections() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let (status, body) = public(
        &app,
        Method::POST,
        "/foundation-settings/preview",
        Some(json!({ "amount": 0, "foundationCode": "vsf" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = public(
        &app,
        Method::POST,
        "/foundation-settings/preview",
        Some(json!({ "amount": 100, "foundationCode": "nope" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = public(
        &app,
        Method::POST,
        "/foundation-settings/preview",
        Some(json!({ "amount": "lots" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Invalid JSON body"));
    Ok(())
}

#[tokio::test]
async fn test_settings_update_changes_preview() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let (status, body) = admin(
        &app,
        Method::POST,
        "/admin/foundation-settings",
        Some(json!({ "foundationCode": "cf", "platformFeePercent": 10, "foundationSharePercent": 70 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settings"]["companySharePercent"], json!(30.0));

    let (_, preview) = public(
        &app,
        Method::POST,
        "/foundation-settings/preview",
        Some(json!({ "amount": 1000, "foundationCode": "cf" })),
    )
    .await?;
    assert_eq!(preview["breakdown"]["platformFee"], json!(100.0));
    assert_eq!(preview["breakdown"]["foundationShare"], json!(630.0));
    assert_eq!(preview["breakdown"]["companyShare"], json!(270.0));

    let (status, _) = admin(
        &app,
        Method::POST,
        "/admin/foundation-settings",
        Some(json!({ "foundationCode": "cf", "platformFeePercent": 120 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = admin(
        &app,
        Method::POST,
        "/admin/foundation-settings",
        Some(json!({ "foundationCode": "zz", "platformFeePercent": 5 })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_foundation_crud() -> Result<()> {
    let app = test_app();

    let (status, body) = admin(
        &app,
        Method::POST,
        "/admin/foundations",
        Some(json!({
            "foundationName": "Helping Hands Trust",
            "foundationSharePercent": 60,
            "platformFeePercent": 5,
            "isActive": true
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["foundation"]["code"], "hht");
    assert_eq!(body["foundation"]["companySharePercent"], json!(40.0));
    let id = body["foundation"]["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = admin(
        &app,
        Method::POST,
        "/admin/foundations",
        Some(json!({ "foundationName": "Happy Hearts Trust", "foundationSharePercent": 50 })),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = admin(
        &app,
        Method::POST,
        "/admin/foundations",
        Some(json!({
            "foundationName": "Bad Split",
            "foundationSharePercent": 60,
            "companySharePercent": 30
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Foundation share (60%) + Company share (30%) must equal 100%"
    );

    let (status, body) = admin(
        &app,
        Method::PATCH,
        &format!("/admin/foundations/{id}"),
        Some(json!({ "foundationSharePercent": 80, "tagline": "Every rupee counts" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["foundation"]["companySharePercent"], json!(20.0));
    assert_eq!(body["foundation"]["tagline"], "Every rupee counts");

    let (status, body) = admin(&app, Method::GET, &format!("/admin/foundations/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["foundation"]["foundationSharePercent"], json!(80.0));

    let (status, body) = public(&app, Method::GET, "/foundations/active", None).await?;
    assert_eq!(status, StatusCode::OK);
    let active = body["foundations"].as_array().expect("foundations array");
    assert_eq!(active.len(), 1);
    assert!(active[0].get("stats").is_none());

    let (status, _) = admin(&app, Method::DELETE, &format!("/admin/foundations/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = admin(&app, Method::GET, &format!("/admin/foundations/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_inactive_foundation_hidden_from_public() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;
    let cf = foundation_id(&app, "cf").await?;

    admin(
        &app,
        Method::PATCH,
        &format!("/admin/foundations/{cf}"),
        Some(json!({ "isActive": false })),
    )
    .await?;

    let (_, body) = public(&app, Method::GET, "/foundations/active", None).await?;
    let codes: Vec<&str> = body["foundations"]
        .as_array()
        .map(|l| l.iter().filter_map(|f| f["code"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(codes, vec!["vsf"]);

    let (status, _) = public(
        &app,
        Method::POST,
        "/foundation-settings/preview",
        Some(json!({ "amount": 100, "foundationCode": "cf" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
