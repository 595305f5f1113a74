//! Donation pool summary and the public donor wall.

use anyhow::Result;
use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};

use crate::utils::{admin, public, seed_defaults, test_app};

async fn completed_donation(app: &Router, email: &str, amount: f64, foundation: &str, anonymous: bool) -> Result<()> {
    let (status, body) = public(
        app,
        Method::POST,
        "/donations",
        Some(json!({
            "name": "Nila Menon",
            "email": email,
            "phone": "9000011111",
            "amount": amount,
            "foundation": foundation,
            "isAnonymous": anonymous
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["donationId"].as_str().unwrap_or_default().to_string();
    let (status, _) = admin(
        app,
        Method::PATCH,
        &format!("/admin/donations/{id}/status"),
        Some(json!({ "status": "completed" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

async fn csr_record(app: &Router, foundation: &str, amount: f64, people: u32, date: &str, status: &str) -> Result<()> {
    let (code, body) = admin(
        app,
        Method::POST,
        "/admin/csr-donations",
        Some(json!({
            "companyName": "Wayne Enterprises",
            "amount": amount,
            "numberOfPeople": people,
            "foundation": foundation,
            "date": date
        })),
    )
    .await?;
    assert_eq!(code, StatusCode::CREATED, "{body}");
    let id = body["donation"]["id"].as_str().unwrap_or_default().to_string();
    let (code, _) = admin(
        app,
        Method::PATCH,
        &format!("/admin/csr-donations/{id}"),
        Some(json!({ "status": status })),
    )
    .await?;
    assert_eq!(code, StatusCode::OK);
    Ok(())
}

async fn seeded_app() -> Result<Router> {
    let app = test_app();
    seed_defaults(&app).await?;
    completed_donation(&app, "nila@example.org", 1000.0, "vsf", false).await?;
    completed_donation(&app, "arun@example.org", 500.0, "cf", true).await?;
    let (status, _) = public(
        &app,
        Method::POST,
        "/donations",
        Some(json!({
            "name": "Pending Person",
            "email": "pending@example.org",
            "phone": "9000022222",
            "amount": 300
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    csr_record(&app, "vsf", 10000.0, 20, "2024-03-01", "verified").await?;
    csr_record(&app, "cf", 2000.0, 4, "2024-05-10", "received").await?;
    csr_record(&app, "cf", 5000.0, 8, "2024-05-12", "pending").await?;
    Ok(app)
}

fn pool_for<'a>(body: &'a Value, code: &str) -> Option<&'a Value> {
    body["pool"]["byFoundation"]
        .as_array()?
        .iter()
        .find(|p| p["foundation"]["code"] == code)
}

#[tokio::test]
async fn test_pool_aggregates_settled_donations() -> Result<()> {
    let app = seeded_app().await?;

    let (status, body) = admin(&app, Method::GET, "/admin/donation-pool", None).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    let pool = &body["pool"];
    assert_eq!(pool["online"]["amount"], json!(1500.0));
    assert_eq!(pool["online"]["donations"], 2);
    assert_eq!(pool["csr"]["amount"], json!(12000.0));
    assert_eq!(pool["csr"]["companyCount"], 2);
    assert_eq!(pool["totalAmount"], json!(13500.0));
    assert_eq!(pool["totalCompanyShare"], json!(3963.0));
    assert_eq!(pool["uniqueDonors"], 2);
    assert_eq!(pool["beneficiaries"], 24);

    let vsf = pool_for(&body, "vsf").expect("vsf pool");
    assert_eq!(vsf["amount"], json!(11000.0));
    assert_eq!(vsf["csr"]["beneficiaries"], 20);
    let cf = pool_for(&body, "cf").expect("cf pool");
    assert_eq!(cf["amount"], json!(2500.0));
    assert_eq!(cf["online"]["companyShare"], json!(115.0));
    Ok(())
}

#[tokio::test]
async fn test_pool_date_range_and_auth() -> Result<()> {
    let app = seeded_app().await?;

    let (status, body) = admin(
        &app,
        Method::GET,
        "/admin/donation-pool?startDate=2024-05-01&endDate=2024-05-31",
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pool"]["totalAmount"], json!(2000.0));
    assert_eq!(body["pool"]["online"]["donations"], 0);
    assert_eq!(body["pool"]["beneficiaries"], 4);

    let (status, _) = admin(&app, Method::GET, "/admin/donation-pool?range=fortnight", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = public(&app, Method::GET, "/admin/donation-pool", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_donor_wall_hides_contact_details() -> Result<()> {
    let app = seeded_app().await?;

    let (status, body) = public(&app, Method::GET, "/donations/donors?limit=1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalDonations"], 2);
    assert_eq!(body["stats"]["totalAmount"], json!(1500.0));
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["donations"].as_array().map(Vec::len), Some(1));
    assert!(body["donations"][0].get("email").is_none());
    assert!(body["donations"][0].get("pan").is_none());

    let top = body["topDonors"].as_array().expect("topDonors");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["donorName"], "Nila Menon");

    let (_, body) = public(&app, Method::GET, "/donations/donors?foundation=cf", None).await?;
    assert_eq!(body["donations"][0]["donorName"], "Anonymous Donor");

    let (status, body) = public(&app, Method::GET, "/donations/leaderboard", None).await?;
    assert_eq!(status, StatusCode::OK);
    let donors = body["donors"].as_array().expect("donors");
    assert_eq!(donors.len(), 1);
    assert_eq!(donors[0]["amount"], json!(1000.0));
    Ok(())
}
