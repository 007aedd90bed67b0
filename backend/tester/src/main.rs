use anyhow::{Context, Result, bail};
use clap::Parser;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Registers a sample KOC and Brand against a running server, then lists them back.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:1111")]
    url: String,

    /// Industry label used for the filtered listing.
    #[arg(long, default_value = "Làm đẹp")]
    industry: String,
}

fn sample_koc() -> Value {
    json!({
        "full_name": "Nguyễn Văn A",
        "phone": "0912345678",
        "email": "tester@example.com",
        "channel_link": "https://www.tiktok.com/@tester",
        "channel_id": "@tester",
        "industries": ["Thời trang", "Làm đẹp"],
        "sales_method": "Video",
        "follower_count": "12500",
        "shipping_address": "12 Lý Thường Kiệt, Hoàn Kiếm, Hà Nội",
        "short_description": "Tài khoản thử nghiệm"
    })
}

fn sample_brand() -> Value {
    json!({
        "brand_name": "Tester Brand",
        "contact_person": "Trần Thị B",
        "phone": "0987654321",
        "email": "brand@example.com",
        "industry": "Làm đẹp",
        "expected_budget": "15000000"
    })
}

async fn register(client: &Client, url: &str, kind: &str, payload: Value) -> Result<()> {
    let response = client
        .post(format!("{url}/register"))
        .query(&[("type", kind)])
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("registering {kind}"))?;

    let status = response.status();
    let body: Value = response.json().await?;
    println!("register {kind}: {status} {body}");

    if status != StatusCode::CREATED {
        bail!("{kind} registration returned {status}");
    }

    Ok(())
}

async fn list(client: &Client, url: &str, path: &str, industry: &str) -> Result<()> {
    let body: Value = client
        .get(format!("{url}/{path}"))
        .query(&[("industry", industry)])
        .send()
        .await
        .with_context(|| format!("listing {path}"))?
        .json()
        .await?;

    println!("{path} in {industry}: {}", body["total"]);
    for item in body["items"].as_array().into_iter().flatten() {
        println!("  {item}");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let url = args.url.trim_end_matches('/');
    let client = Client::new();

    register(&client, url, "koc", sample_koc()).await?;
    register(&client, url, "brand", sample_brand()).await?;

    list(&client, url, "kocs", &args.industry).await?;
    list(&client, url, "brands", &args.industry).await?;

    Ok(())
}
