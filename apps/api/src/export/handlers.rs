//! Axum route handlers for the CV layout, payment and export API.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::{content_disposition, run_blocking};
use crate::layout::{
    analyze_pages, generate_document, Page, PageFillAnalysis, PageFillVerdict, ThemeName,
};
use crate::models::cv::{present, DocumentModel};
use crate::payments::{PaymentSession, PaymentVerification};
use crate::render::render_pdf;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub cv: DocumentModel,
    #[serde(default)]
    pub theme: Option<ThemeName>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub file_name: String,
    pub page_count: usize,
    pub pages: Vec<Page>,
    pub page_fill: Vec<PageFillAnalysis>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentRequest {
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentResponse {
    #[serde(flatten)]
    pub session: PaymentSession,
    pub amount: f64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub reference: String,
    pub cv: DocumentModel,
    #[serde(default)]
    pub theme: Option<ThemeName>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/layout
/// Lays out the CV without charging for it: pages of draw commands plus the fill report.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(req): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let theme = state.theme(req.theme);
    let geometry = state.geometry.clone();
    let measurer = state.measurer.clone();

    let (document, page_fill) = run_blocking(move || {
        let document = generate_document(&req.cv, &geometry, &theme, measurer.as_ref())?;
        let page_fill = analyze_pages(&document, &geometry);
        Ok((document, page_fill))
    })
    .await?;

    for page in page_fill
        .iter()
        .filter(|p| p.verdict != PageFillVerdict::Acceptable)
    {
        warn!(
            page = page.page,
            fill = page.fill_fraction,
            verdict = ?page.verdict,
            "page fill outside acceptable range"
        );
    }

    Ok(Json(LayoutResponse {
        file_name: document.file_name,
        page_count: document.pages.len(),
        pages: document.pages,
        page_fill,
    }))
}

/// POST /api/v1/payments/initialize
/// Opens a checkout for one export at the configured fee.
pub async fn handle_initialize_payment(
    State(state): State<AppState>,
    Json(req): Json<InitializePaymentRequest>,
) -> Result<Json<InitializePaymentResponse>, AppError> {
    let email = present(&req.email)
        .filter(|e| e.contains('@'))
        .ok_or_else(|| AppError::Validation("A valid email address is required".to_string()))?;
    let full_name = present(&req.full_name).unwrap_or("");

    let fee = state.config.export_fee;
    let session = state.payments.initialize(email, full_name, fee).await?;
    Ok(Json(InitializePaymentResponse {
        session,
        amount: fee,
        currency: state.config.payment_currency.clone(),
    }))
}

/// GET /api/v1/payments/verify/:reference
pub async fn handle_verify_payment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<PaymentVerification>, AppError> {
    let verification = state.payments.verify(&reference).await?;
    Ok(Json(verification))
}

/// POST /api/v1/cv/export
/// Verifies the payment, then lays out and serializes the PDF in one blocking job.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let reference = present(&req.reference)
        .ok_or_else(|| AppError::Validation("A payment reference is required".to_string()))?;

    let verification = state.payments.verify(reference).await?;
    if !verification.covers(state.config.export_fee, &state.config.payment_currency) {
        warn!(
            reference = %verification.reference,
            status = %verification.status,
            amount = verification.amount,
            currency = %verification.currency,
            "export refused: payment not verified, short or in another currency"
        );
        return Err(AppError::PaymentRequired(format!(
            "Payment {} has not been completed for {:.2} {}",
            verification.reference, state.config.export_fee, state.config.payment_currency
        )));
    }

    let theme = state.theme(req.theme);
    let geometry = state.geometry.clone();
    let measurer = state.measurer.clone();
    let cv = req.cv;

    let (file_name, page_count, bytes) = run_blocking(move || {
        let document = generate_document(&cv, &geometry, &theme, measurer.as_ref())?;
        let bytes = render_pdf(&document, &geometry)?;
        Ok((document.file_name, document.pages.len(), bytes))
    })
    .await?;

    info!(
        reference = %verification.reference,
        pages = page_count,
        bytes = bytes.len(),
        "exported {file_name}"
    );

    let disposition = HeaderValue::from_str(&content_disposition(&file_name))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid Content-Disposition: {e}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
