//! Token icon locations.
//!
//! Icons are purely cosmetic: a missing icon is replaced by a neutral
//! placeholder and never affects quoting.
use crate::symbol::Symbol;

/// Inline SVG of a neutral dark circle, used when an icon cannot be loaded.
pub const PLACEHOLDER_ICON: &str = "data:image/svg+xml;utf8,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%20width%3D%2224%22%20height%3D%2224%22%3E%3Crect%20width%3D%2224%22%20height%3D%2224%22%20rx%3D%2212%22%20fill%3D%22%232a2f45%22%2F%3E%3C%2Fsvg%3E";

/// Where an icon should be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    /// Remote asset under the icon base.
    Remote(String),
    /// Asset unavailable; use [`PLACEHOLDER_ICON`].
    Placeholder,
}

impl IconSource {
    /// URL to hand to a renderer.
    pub fn url(&self) -> &str {
        match self {
            IconSource::Remote(url) => url,
            IconSource::Placeholder => PLACEHOLDER_ICON,
        }
    }
}

/// `<base><SYMBOL>.svg`, with the symbol percent-encoded.
pub fn icon_url(base: &str, symbol: &Symbol) -> String {
    format!("{}{}.svg", base, urlencoding::encode(symbol.as_str()))
}
