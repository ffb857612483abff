use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::CoreError;

use super::instrument::{Instrument, InstrumentKind};

/// Static reference catalog of tradable instruments.
///
/// Loaded once at startup. The only supported change is replacing an
/// instrument's price wholesale via [`Catalog::set_price`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Instruments in catalog order (stocks first, then funds)
    instruments: Vec<Instrument>,

    /// id → position in `instruments`
    index: HashMap<String, usize>,
}

/// On-disk / bundled catalog shape.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    stocks: Vec<StockRecord>,
    #[serde(default)]
    funds: Vec<FundRecord>,
}

#[derive(Debug, Deserialize)]
struct StockRecord {
    id: String,
    name: String,
    ticker: String,
    #[serde(default)]
    short: Option<String>,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct FundRecord {
    id: String,
    name: String,
    code: String,
    price: f64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of instruments.
    /// Rejects duplicate ids and negative or non-finite prices.
    pub fn from_instruments(instruments: Vec<Instrument>) -> Result<Self, CoreError> {
        let mut catalog = Self::new();
        for instrument in instruments {
            catalog.insert(instrument)?;
        }
        Ok(catalog)
    }

    /// Parse a catalog from JSON:
    /// `{ "stocks": [{id, name, ticker, short?, price}], "funds": [{id, name, code, price}] }`.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();

        for s in file.stocks {
            let short = s
                .short
                .unwrap_or_else(|| s.ticker.chars().take(2).collect());
            catalog.insert(Instrument::stock(s.id, s.name, s.ticker, short, s.price))?;
        }
        for f in file.funds {
            catalog.insert(Instrument::fund(f.id, f.name, f.code, f.price))?;
        }

        Ok(catalog)
    }

    /// The bundled demo catalog: 7 stocks and 8 funds.
    pub fn demo() -> Self {
        let instruments = vec![
            Instrument::stock("RELI", "Reliance Industries Ltd", "RELIANCE", "RE", 1398.07),
            Instrument::stock("TATM", "Tata Motors", "TATAMOTORS", "TM", 1006.98),
            Instrument::stock("ADGN", "Adani Green", "ADANIGREEN", "AG", 1181.45),
            Instrument::stock("WIPR", "Wipro", "WIPRO", "W", 1485.01),
            Instrument::stock("MRF", "MRF", "MRF", "M", 1898.78),
            Instrument::stock("HDFC", "HDFC", "HDFC", "H", 1846.28),
            Instrument::stock("AFFL", "Affle 3i Ltd", "AFFLE", "AF", 410.22),
            Instrument::fund(
                "EDEL",
                "Edelweiss Nifty Midcap150 Momentum 50 Index Fund",
                "EDEL",
                232.4,
            ),
            Instrument::fund("HDFM", "HDFC Mid Cap Fund", "HDFCMID", 132.76),
            Instrument::fund("HDFSC", "HDFC Small Cap Fund", "HDFCSM", 276.12),
            Instrument::fund("NIPL", "Nippon India Large Cap Fund", "NIPPL", 219.33),
            Instrument::fund("SBIL", "SBI Large Cap Fund", "SBIL", 189.44),
            Instrument::fund("NIPM", "Nippon India Mid Cap Fund", "NIPPM", 160.55),
            Instrument::fund("NIPS", "Nippon India Small Cap Fund", "NIPPS", 102.97),
            Instrument::fund("HDFLC", "HDFC Large Cap Fund", "HDFLC", 321.21),
        ];

        let mut catalog = Self::new();
        for instrument in instruments {
            let idx = catalog.instruments.len();
            catalog.index.insert(instrument.id.clone(), idx);
            catalog.instruments.push(instrument);
        }
        catalog
    }

    fn insert(&mut self, instrument: Instrument) -> Result<(), CoreError> {
        if instrument.id.trim().is_empty() {
            return Err(CoreError::InvalidCatalog("instrument id must not be empty".into()));
        }
        if self.index.contains_key(&instrument.id) {
            return Err(CoreError::InvalidCatalog(format!(
                "duplicate instrument id '{}'",
                instrument.id
            )));
        }
        if let Some(clash) = self.identity_clash(&instrument) {
            return Err(CoreError::InvalidCatalog(format!(
                "instrument '{}' reuses the {} of '{}'",
                instrument.id,
                match instrument.kind {
                    InstrumentKind::Stock { .. } => "short badge",
                    InstrumentKind::Fund { .. } => "scheme code",
                },
                clash
            )));
        }
        if !instrument.price.is_finite() || instrument.price < 0.0 {
            return Err(CoreError::InvalidCatalog(format!(
                "instrument '{}' has invalid price {}",
                instrument.id, instrument.price
            )));
        }
        self.index.insert(instrument.id.clone(), self.instruments.len());
        self.instruments.push(instrument);
        Ok(())
    }

    /// Id of an existing instrument of the same kind sharing the new one's
    /// short badge (stocks) or scheme code (funds). Stored snapshots may be
    /// keyed by either, so they must resolve to a single instrument.
    fn identity_clash(&self, instrument: &Instrument) -> Option<&str> {
        self.instruments
            .iter()
            .find(|existing| match (&existing.kind, &instrument.kind) {
                (InstrumentKind::Stock { short: a, .. }, InstrumentKind::Stock { short: b, .. }) => {
                    a == b
                }
                (InstrumentKind::Fund { code: a }, InstrumentKind::Fund { code: b }) => a == b,
                _ => false,
            })
            .map(|existing| existing.id.as_str())
    }

    /// Look up an instrument by id.
    pub fn get(&self, id: &str) -> Option<&Instrument> {
        self.index.get(id).map(|&idx| &self.instruments[idx])
    }

    /// Look up an instrument by id, failing with `UnknownInstrument`.
    pub fn require(&self, id: &str) -> Result<&Instrument, CoreError> {
        self.get(id)
            .ok_or_else(|| CoreError::UnknownInstrument(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Replace an instrument's reference price.
    pub fn set_price(&mut self, id: &str, price: f64) -> Result<(), CoreError> {
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::InvalidPrice(format!(
                "price for '{id}' must be a non-negative number, got {price}"
            )));
        }
        let idx = *self
            .index
            .get(id)
            .ok_or_else(|| CoreError::UnknownInstrument(id.to_string()))?;
        self.instruments[idx] = self.instruments[idx].with_price(price);
        Ok(())
    }

    /// All instruments in catalog order.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn stocks(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(|i| !i.is_fund())
    }

    pub fn funds(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(|i| i.is_fund())
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Resolve a stock key from a stored snapshot: the instrument id, or the
    /// short badge older snapshots were keyed by.
    pub fn resolve_stock_key(&self, key: &str) -> Option<&Instrument> {
        if let Some(instrument) = self.get(key).filter(|i| !i.is_fund()) {
            return Some(instrument);
        }
        self.stocks().find(|i| match &i.kind {
            InstrumentKind::Stock { short, .. } => short == key,
            InstrumentKind::Fund { .. } => false,
        })
    }

    /// Resolve a fund key from a stored snapshot: the instrument id, or the
    /// scheme code older snapshots were keyed by.
    pub fn resolve_fund_key(&self, key: &str) -> Option<&Instrument> {
        if let Some(instrument) = self.get(key).filter(|i| i.is_fund()) {
            return Some(instrument);
        }
        self.funds().find(|i| match &i.kind {
            InstrumentKind::Fund { code } => code == key,
            InstrumentKind::Stock { .. } => false,
        })
    }
}
