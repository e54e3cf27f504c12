/// Paystack client: the single point of entry for all payment gateway calls.
///
/// Every response arrives in the `{status, message, data}` envelope; `status ==
/// false` is a gateway-level failure whatever the HTTP status code says.
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::payments::{
    from_minor_units, to_minor_units, validate_reference, PaymentError, PaymentGateway,
    PaymentSession, PaymentVerification,
};

pub const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
const MAX_RETRIES: u32 = 3;
const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Serialize)]
struct InitializeRequest<'a> {
    email: &'a str,
    /// Minor units.
    amount: u64,
    currency: &'a str,
    metadata: Metadata<'a>,
}

#[derive(Debug, Serialize)]
struct Metadata<'a> {
    custom_fields: Vec<CustomField<'a>>,
}

#[derive(Debug, Serialize)]
struct CustomField<'a> {
    display_name: &'a str,
    variable_name: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: String,
    access_code: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    reference: String,
    /// Minor units.
    amount: u64,
    #[serde(default)]
    currency: String,
}

#[derive(Clone)]
pub struct PaystackClient {
    client: Client,
    base_url: String,
    secret_key: String,
    currency: String,
}

impl PaystackClient {
    pub fn new(secret_key: String, base_url: String, currency: String) -> Result<Self, PaymentError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
            currency,
        })
    }

    /// GET with retries on 429 and 5xx, exponential backoff.
    async fn get_with_retry<T: DeserializeOwned>(&self, url: &str) -> Result<T, PaymentError> {
        let mut last_error: Option<PaymentError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Paystack call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .get(url)
                .bearer_auth(&self.secret_key)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(PaymentError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            let body = response.text().await?;

            if status.as_u16() == 429 || status.is_server_error() {
                warn!("Paystack returned {}: {}", status, body);
                last_error = Some(PaymentError::Gateway {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            return parse_envelope(status.as_u16(), &body);
        }

        Err(last_error.unwrap_or(PaymentError::Gateway {
            status: 429,
            message: format!("rate limited after {MAX_RETRIES} retries"),
        }))
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    /// Not retried: a repeated initialize would open a second checkout.
    async fn initialize(
        &self,
        email: &str,
        full_name: &str,
        amount: f64,
    ) -> Result<PaymentSession, PaymentError> {
        let request_body = InitializeRequest {
            email,
            amount: to_minor_units(amount),
            currency: &self.currency,
            metadata: Metadata {
                custom_fields: vec![CustomField {
                    display_name: "Customer Name",
                    variable_name: "customer_name",
                    value: full_name,
                }],
            },
        };

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&request_body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let data: InitializeData = parse_envelope(status, &body)?;
        info!(reference = %data.reference, "payment initialized");
        Ok(PaymentSession {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    async fn verify(&self, reference: &str) -> Result<PaymentVerification, PaymentError> {
        let reference = validate_reference(reference)?;
        let url = format!("{}/transaction/verify/{reference}", self.base_url);
        let data: VerifyData = self.get_with_retry(&url).await?;
        let verification = verification_from(data);
        debug!(
            reference = %verification.reference,
            status = %verification.status,
            amount = verification.amount,
            currency = %verification.currency,
            "payment verified"
        );
        Ok(verification)
    }
}

fn verification_from(data: VerifyData) -> PaymentVerification {
    PaymentVerification {
        verified: data.status == SUCCESS_STATUS,
        amount: from_minor_units(data.amount),
        currency: data.currency,
        reference: data.reference,
        status: data.status,
    }
}

/// Unwraps the `{status, message, data}` envelope.
fn parse_envelope<T: DeserializeOwned>(http_status: u16, body: &str) -> Result<T, PaymentError> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        // Non-JSON error pages still carry a useful status code.
        Err(_) if !(200..300).contains(&http_status) => {
            return Err(PaymentError::Gateway {
                status: http_status,
                message: body.to_string(),
            })
        }
        Err(e) => return Err(PaymentError::Parse(e)),
    };

    if !envelope.status {
        return Err(PaymentError::Gateway {
            status: http_status,
            message: envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_string()),
        });
    }
    envelope.data.ok_or(PaymentError::MissingData)
}
