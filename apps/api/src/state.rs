use std::sync::Arc;

use crate::config::Config;
use crate::layout::{PageGeometry, TextMeasurer, Theme, ThemeName};
use crate::payments::PaymentGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable gateway. Default: PaystackClient; tests swap in a fake.
    pub payments: Arc<dyn PaymentGateway>,
    /// A4 portrait unless overridden.
    pub geometry: PageGeometry,
    /// Must agree with the fonts the PDF surface draws with.
    pub measurer: Arc<dyn TextMeasurer>,
}

impl AppState {
    /// The theme for one request: the requested preset (or the configured
    /// default) with the configured date style and footer applied.
    pub fn theme(&self, requested: Option<ThemeName>) -> Theme {
        Theme::named(requested.unwrap_or(self.config.default_theme))
            .with_date_style(self.config.date_style)
            .with_footer(self.config.footer_caption.clone())
    }
}
