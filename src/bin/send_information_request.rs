//! Information Request Demo Client
//!
//! Demonstrates calling the information-request endpoint, which triggers a
//! notification email asking a client for documents and information.
//!
//! Usage:
//!   API_URL="http://localhost:8080" CLIENT_ID="<uuid>" \
//!     cargo run --bin send_information_request

use std::env;

use serde_json::json;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📨 Information Request Demo");
    println!("===========================");

    let api_url = env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let client_id: Uuid = match env::var("CLIENT_ID") {
        Ok(raw) => raw.parse()?,
        Err(_) => {
            let generated = Uuid::new_v4();
            println!("⚠️  CLIENT_ID not set, using random id {}", generated);
            generated
        }
    };

    let body = json!({
        "client_id": client_id,
        "request_details": {
            "documents": ["PASSPORT", "PROOF-OF-ADDRESS"],
            "required_information": ["tax residency", "source of funds"],
            "deadline": "2026-09-30",
            "notes": "Required to complete the annual documentation review"
        }
    });

    let url = format!("{}/client/send-information-request", api_url);
    println!("➡️  POST {}", url);

    let response = reqwest::Client::new().post(&url).json(&body).send().await?;

    let status = response.status();
    let response_body: serde_json::Value = response.json().await?;

    if status.is_success() {
        println!("✅ {} - {}", status, response_body);
    } else {
        println!("❌ {} - {}", status, response_body);
    }

    Ok(())
}
