use serde::{Deserialize, Serialize};

/// Kind-specific identity of a tradable instrument.
///
/// Stocks and funds were historically described by different record shapes
/// (`short`/`ticker` vs `code`); they are unified here and resolved once when
/// the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InstrumentKind {
    /// Listed equity, traded in whole shares
    Stock {
        /// Exchange ticker (e.g., "RELIANCE")
        ticker: String,
        /// Short badge shown in lists (e.g., "RE")
        short: String,
    },
    /// Mutual fund, traded in (possibly fractional) units
    Fund {
        /// Scheme code (e.g., "HDFCMID")
        code: String,
    },
}

impl InstrumentKind {
    /// Label used when grouping instruments (snapshot sections, list headers).
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentKind::Stock { .. } => "Stock",
            InstrumentKind::Fund { .. } => "Fund",
        }
    }
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Immutable reference data for something the user can buy or sell.
///
/// Price updates replace the whole value through the catalog; nothing in the
/// core mutates an `Instrument` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Catalog-unique identifier (e.g., "RELI")
    pub id: String,

    /// Human-readable name (e.g., "Reliance Industries Ltd")
    pub name: String,

    /// Current reference price per share/unit (non-negative)
    pub price: f64,

    /// Stock or fund identity
    #[serde(flatten)]
    pub kind: InstrumentKind,
}

impl Instrument {
    pub fn stock(
        id: impl Into<String>,
        name: impl Into<String>,
        ticker: impl Into<String>,
        short: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            kind: InstrumentKind::Stock {
                ticker: ticker.into(),
                short: short.into(),
            },
        }
    }

    pub fn fund(
        id: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            kind: InstrumentKind::Fund { code: code.into() },
        }
    }

    /// Display symbol: the ticker for stocks, the scheme code for funds.
    pub fn symbol(&self) -> &str {
        match &self.kind {
            InstrumentKind::Stock { ticker, .. } => ticker,
            InstrumentKind::Fund { code } => code,
        }
    }

    /// Two-letter avatar badge.
    pub fn badge(&self) -> String {
        match &self.kind {
            InstrumentKind::Stock { short, .. } => short.clone(),
            InstrumentKind::Fund { code } => code.chars().take(2).collect(),
        }
    }

    pub fn is_fund(&self) -> bool {
        matches!(self.kind, InstrumentKind::Fund { .. })
    }

    /// Whether fractional quantities may be held (funds only).
    pub fn allows_fractional(&self) -> bool {
        self.is_fund()
    }

    /// Copy of this instrument with a new reference price.
    pub fn with_price(&self, price: f64) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }
}
