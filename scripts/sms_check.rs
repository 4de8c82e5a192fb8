// Quick diagnostic: verify Twilio credentials and send one test SMS
// Run: cargo run --bin sms_check

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let account_sid = std::env::var("TWILIO_ACCOUNT_SID").expect("TWILIO_ACCOUNT_SID");
    let auth_token = std::env::var("TWILIO_AUTH_TOKEN").expect("TWILIO_AUTH_TOKEN");
    let from_number = std::env::var("TWILIO_FROM_NUMBER").expect("TWILIO_FROM_NUMBER");
    let to_number = std::env::var("TO_NUMBER").expect("TO_NUMBER");
    let api_base = std::env::var("TWILIO_API_BASE")
        .unwrap_or_else(|_| "https://api.twilio.com".to_string());
    let api_base = api_base.trim_end_matches('/');

    let client = reqwest::Client::new();
    let auth = BASE64_STANDARD.encode(format!("{}:{}", account_sid, auth_token));
    let account_path = format!(
        "{}/2010-04-01/Accounts/{}",
        api_base,
        urlencoding::encode(&account_sid)
    );

    // 1. Fetch the account (verifies SID + token)
    println!("1. Fetching account {}...", account_sid);
    let account_resp = client
        .get(format!("{}.json", account_path))
        .header("Authorization", format!("Basic {}", auth))
        .send()
        .await
        .expect("account request failed");

    let account_status = account_resp.status();
    let account_body = account_resp.text().await.unwrap_or_default();

    if !account_status.is_success() {
        println!(
            "   FAIL: Account lookup returned {}:\n{}",
            account_status, account_body
        );
        return;
    }

    let account: serde_json::Value =
        serde_json::from_str(&account_body).unwrap_or(serde_json::json!({}));
    println!(
        "   OK. Account: \"{}\" (status: {}, type: {})",
        account["friendly_name"].as_str().unwrap_or("?"),
        account["status"].as_str().unwrap_or("?"),
        account["type"].as_str().unwrap_or("?")
    );
    if account["type"].as_str() == Some("Trial") {
        println!("       ⚠️  Trial account - TO_NUMBER must be a verified caller ID.");
    }

    // 2. Send a test message
    let body = std::env::var("SMS_CHECK_BODY").unwrap_or_else(|_| {
        "📊 Pulsetic Alert: sms_check\n\nURL: https://example.com\nAlert Type: test".to_string()
    });
    println!(
        "\n2. Sending test SMS from {} to {} (POST)...",
        from_number, to_number
    );

    let send_resp = client
        .post(format!("{}/Messages.json", account_path))
        .header("Authorization", format!("Basic {}", auth))
        .form(&[
            ("To", to_number.as_str()),
            ("From", from_number.as_str()),
            ("Body", body.as_str()),
        ])
        .send()
        .await
        .expect("send request failed");

    let send_status = send_resp.status();
    let send_body = send_resp.text().await.unwrap_or_default();

    println!("   Status: {}", send_status);
    println!("   Body: {}", send_body);

    if send_status.is_success() {
        let sent: serde_json::Value =
            serde_json::from_str(&send_body).unwrap_or(serde_json::json!({}));
        println!(
            "\n   SUCCESS - message {} is {}",
            sent["sid"].as_str().unwrap_or("?"),
            sent["status"].as_str().unwrap_or("?")
        );
    } else {
        println!("\n   FAILED - check the output above.");
    }
}
