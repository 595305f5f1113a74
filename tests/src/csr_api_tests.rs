//! CSR donation records: breakdown, override, audit trail, filters.

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use crate::utils::{admin, seed_defaults, test_app};

async fn create_csr(app: &axum::Router, body: Value) -> Result<Value> {
    let (status, body) = admin(app, Method::POST, "/admin/csr-donations", Some(body)).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    Ok(body["donation"].clone())
}

#[tokio::test]
async fn test_create_computes_breakdown() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let record = create_csr(
        &app,
        json!({
            "companyName": "Acme Industries",
            "amount": 100000,
            "numberOfPeople": 40,
            "foundation": "vsf",
            "date": "2024-03-15"
        }),
    )
    .await?;

    assert_eq!(record["platformFee"], json!(12000.0));
    assert_eq!(record["foundationShare"], json!(57200.0));
    assert_eq!(record["companyShare"], json!(30800.0));
    assert_eq!(record["breakdownSource"], "calculated");
    assert_eq!(record["percentages"]["platformFeePercent"], json!(12.0));
    assert_eq!(record["status"], "pending");
    assert_eq!(record["createdBy"], "ops@example.org");
    assert_eq!(record["auditLog"][0]["changes"][0]["field"], "created");
    assert!(record["date"].as_str().unwrap_or_default().starts_with("2024-03-15"));
    Ok(())
}

#[tokio::test]
async fn test_full_fee_override_is_flagged() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let record = create_csr(
        &app,
        json!({
            "companyName": "Globex",
            "amount": 1000,
            "numberOfPeople": 5,
            "foundation": "cf",
            "platformFee": 50,
            "foundationShare": 700,
            "companyShare": 250
        }),
    )
    .await?;
    assert_eq!(record["breakdownSource"], "override");
    assert_eq!(record["platformFee"], json!(50.0));
    assert!(record.get("percentages").is_none());

    // A zero among the supplied fees means the calculator runs.
    let record = create_csr(
        &app,
        json!({
            "companyName": "Globex",
            "amount": 1000,
            "numberOfPeople": 5,
            "foundation": "cf",
            "platformFee": 0,
            "foundationShare": 700,
            "companyShare": 300
        }),
    )
    .await?;
    assert_eq!(record["breakdownSource"], "calculated");
    assert_eq!(record["platformFee"], json!(80.0));
    Ok(())
}

#[tokio::test]
async fn test_create_validation() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let cases = [
        json!({ "amount": 1000, "numberOfPeople": 5, "foundation": "vsf" }),
        json!({ "companyName": "Acme", "amount": 0.5, "numberOfPeople": 5, "foundation": "vsf" }),
        json!({ "companyName": "Acme", "amount": 1000, "numberOfPeople": 0, "foundation": "vsf" }),
        json!({ "companyName": "Acme", "amount": 1000, "numberOfPeople": 5, "foundation": "unknown" }),
    ];
    for case in cases {
        let (status, body) = admin(&app, Method::POST, "/admin/csr-donations", Some(case)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["success"], false);
    }
    Ok(())
}

#[tokio::test]
async fn test_patch_records_audit_entry() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;
    let record = create_csr(
        &app,
        json!({ "companyName": "Initech", "amount": 5000, "numberOfPeople": 3, "foundation": "vsf" }),
    )
    .await?;
    let id = record["id"].as_str().unwrap_or_default().to_string();
    let uri = format!("/admin/csr-donations/{id}");

    let (status, body) = admin(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "companyName": "Initech", "status": "verified", "foundation": "cf" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let changes = body["changes"].as_array().expect("changes");
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["field"], "foundation");
    assert_eq!(changes[0]["oldValue"], "Vishnu Shakti Foundation");
    assert_eq!(changes[0]["newValue"], "Chetana Foundation");
    assert_eq!(changes[1]["oldValue"], "pending");
    assert_eq!(body["donation"]["lastEditedBy"], "ops@example.org");
    assert_eq!(body["donation"]["auditLog"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["donation"]["breakdownSource"], "override");
    assert!(body["donation"].get("percentages").is_none());
    assert_eq!(body["donation"]["platformFee"], json!(600.0));

    let (status, body) = admin(&app, Method::PATCH, &uri, Some(json!({ "status": "verified" }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No changes detected");
    assert_eq!(body["donation"]["auditLog"].as_array().map(Vec::len), Some(2));

    let (_, body) = admin(&app, Method::PATCH, &uri, Some(json!({ "companyShare": 1000 }))).await?;
    assert_eq!(body["donation"]["companyShare"], json!(1000.0));

    let (status, _) = admin(&app, Method::PATCH, &uri, Some(json!({ "status": "archived" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_list_filters_and_delete() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;
    for (foundation, date) in [("vsf", "2024-01-05"), ("cf", "2024-02-05"), ("vsf", "2024-03-05")] {
        create_csr(
            &app,
            json!({
                "companyName": "Umbrella",
                "amount": 2000,
                "numberOfPeople": 2,
                "foundation": foundation,
                "date": date
            }),
        )
        .await?;
    }

    let (_, body) = admin(&app, Method::GET, "/admin/csr-donations?status=all", None).await?;
    let all = body["donations"].as_array().expect("donations");
    assert_eq!(all.len(), 3);
    assert!(all[0]["date"].as_str().unwrap_or_default().starts_with("2024-03-05"));
    assert_eq!(all[0]["foundationInfo"]["code"], "vsf");

    let (_, body) = admin(&app, Method::GET, "/admin/csr-donations?foundation=vsf", None).await?;
    assert_eq!(body["count"], 2);

    let (_, body) = admin(
        &app,
        Method::GET,
        "/admin/csr-donations?startDate=2024-02-01&endDate=2024-02-28",
        None,
    )
    .await?;
    assert_eq!(body["count"], 1);

    let id = all[0]["id"].as_str().unwrap_or_default().to_string();
    let (status, _) = admin(&app, Method::DELETE, &format!("/admin/csr-donations/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = admin(&app, Method::DELETE, &format!("/admin/csr-donations/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
