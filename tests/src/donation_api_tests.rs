//! Online donations and foundation stats.

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use crate::utils::{admin, foundation_id, public, seed_defaults, test_app};

fn donor(amount: f64, foundation: Option<&str>) -> Value {
    let mut body = json!({
        "name": "Meera Iyer",
        "email": "Meera@Example.org",
        "phone": "9123456780",
        "amount": amount,
        "pan": "abcpe1234k"
    });
    if let Some(code) = foundation {
        body["foundation"] = json!(code);
    }
    body
}

#[tokio::test]
async fn test_donation_defaults_to_first_active_foundation() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let (status, body) = public(&app, Method::POST, "/donations", Some(donor(2998.0, None))).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["foundation"]["code"], "vsf");
    assert_eq!(body["sticksEquivalent"], json!(2.0));
    assert_eq!(body["breakdown"]["grossAmount"], json!(2998.0));

    let (status, body) = public(&app, Method::POST, "/donations", Some(donor(500.0, Some("cf")))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["foundation"]["code"], "cf");
    assert_eq!(body["breakdown"]["platformFee"], json!(40.0));
    assert_eq!(body["sticksEquivalent"].as_f64(), Some(500.0 / 1499.0));
    Ok(())
}

#[tokio::test]
async fn test_donation_validation() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;

    let mut short_phone = donor(100.0, None);
    short_phone["phone"] = json!("98765");
    let mut bad_name = donor(100.0, None);
    bad_name["name"] = json!("M");

    for body in [short_phone, bad_name, donor(0.0, None), donor(1_000_001.0, None)] {
        let (status, response) = public(&app, Method::POST, "/donations", Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{response}");
    }
    Ok(())
}

#[tokio::test]
async fn test_completed_donations_update_stats() -> Result<()> {
    let app = test_app();
    seed_defaults(&app).await?;
    let vsf = foundation_id(&app, "vsf").await?;

    let mut ids = Vec::new();
    for amount in [1000.0, 499.5] {
        let (_, body) = public(&app, Method::POST, "/donations", Some(donor(amount, Some("vsf")))).await?;
        ids.push(body["donationId"].as_str().unwrap_or_default().to_string());
    }

    for id in &ids {
        let (status, body) = admin(
            &app,
            Method::PATCH,
            &format!("/admin/donations/{id}/status"),
            Some(json!({ "status": "completed", "paymentId": "pay_001" })),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["donation"]["status"], "completed");
        assert_eq!(body["donation"]["email"], "meera@example.org");
        assert_eq!(body["donation"]["pan"], "ABCPE1234K");
    }

    let (_, body) = admin(&app, Method::GET, &format!("/admin/foundations/{vsf}"), None).await?;
    let stats = &body["foundation"]["stats"];
    assert_eq!(stats["totalDonations"], 2);
    assert_eq!(stats["totalAmount"], json!(1499.5));
    assert_eq!(stats["donorCount"], 1);

    let (_, body) = admin(&app, Method::GET, "/admin/donations?status=completed", None).await?;
    assert_eq!(body["donations"].as_array().map(Vec::len), Some(2));

    // Referenced foundations cannot be deleted.
    let (status, _) = admin(&app, Method::DELETE, &format!("/admin/foundations/{vsf}"), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_status_updates_keep_every_donation() -> Result<()> {
    const N: usize = 24;
    let app = test_app();
    seed_defaults(&app).await?;
    let cf = foundation_id(&app, "cf").await?;

    let mut creates = Vec::new();
    for i in 0..N {
        let app = app.clone();
        creates.push(tokio::spawn(async move {
            let mut body = donor(200.0, Some("cf"));
            body["email"] = json!(format!("donor{i}@example.org"));
            public(&app, Method::POST, "/donations", Some(body)).await
        }));
    }
    let mut ids = Vec::new();
    for task in creates {
        let (status, body) = task.await??;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        ids.push(body["donationId"].as_str().unwrap_or_default().to_string());
    }

    let mut updates = Vec::new();
    for id in ids {
        let app = app.clone();
        updates.push(tokio::spawn(async move {
            admin(
                &app,
                Method::PATCH,
                &format!("/admin/donations/{id}/status"),
                Some(json!({ "status": "completed" })),
            )
            .await
        }));
    }
    for task in updates {
        let (status, _) = task.await??;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = admin(&app, Method::GET, "/admin/donations?status=completed", None).await?;
    assert_eq!(body["donations"].as_array().map(Vec::len), Some(N));

    let (_, body) = admin(&app, Method::GET, &format!("/admin/foundations/{cf}"), None).await?;
    let stats = &body["foundation"]["stats"];
    assert_eq!(stats["totalDonations"], json!(N));
    assert_eq!(stats["donorCount"], json!(N));
    assert_eq!(stats["totalAmount"], json!(200.0 * N as f64));
    Ok(())
}
