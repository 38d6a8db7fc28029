//! The selection catalogue: flavours, energies, and per-energy event limits.
//!
//! The catalogue is a small static JSON document (`select.json` by default)
//! describing what the events form offers:
//!
//! ```json
//! {
//!     "flavours":   { "name": ["nu_e", ...], "symbol": ["νₑ", ...] },
//!     "background": { "energy": ["N/A"], "evs": [30] },
//!     "neutrino":   { "energy": ["0.5", "1", "2"], "evs": [100, 100, 50] }
//! }
//! ```
//!
//! `flavours.name` holds the internal identifiers and `flavours.symbol` the
//! Greek display strings, index-aligned. `energy` and `evs` are index-aligned
//! as well: the entry at position `i` of `energy` is capped at `evs[i]`
//! events. Energy labels may be written as strings or bare numbers in the
//! file; they are normalised to strings on load so later lookups compare a
//! single textual representation.
//!
//! The catalogue is loaded once at startup into this immutable structure and
//! shape-validated up front — a misaligned or empty table fails fast with a
//! descriptive [`AppError::Catalog`] rather than surfacing as a confusing
//! lookup failure mid-interaction. Re-reading the file happens only through
//! an explicit reload action.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, AppResult};

/// Sentinel category label for background events.
///
/// It is not listed in `flavours.name`; the events form appends it to the
/// flavour dropdown after the configured symbols.
pub const BACKGROUND: &str = "Background";

/// The full selection catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionCatalog {
    /// Flavour identifiers and their display symbols.
    pub flavours: FlavourTable,
    /// Energy/limit table for background events.
    pub background: EnergyTable,
    /// Energy/limit table shared by all neutrino flavours.
    pub neutrino: EnergyTable,
}

/// Index-aligned flavour names and display symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavourTable {
    /// Internal flavour identifiers (e.g. `nu_e`).
    pub name: Vec<String>,
    /// Display symbols (e.g. `νₑ`), index-aligned with `name`.
    pub symbol: Vec<String>,
}

/// Index-aligned energy labels and event-count limits for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyTable {
    /// Ordered energy labels. The sentinel `"N/A"` is allowed.
    #[serde(deserialize_with = "de_energy_labels")]
    pub energy: Vec<String>,
    /// Inclusive event-count limit for the energy at the same index.
    pub evs: Vec<u32>,
}

/// Accept energy labels written as strings or bare numbers, normalising
/// everything to strings.
fn de_energy_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLabel {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let raw = Vec::<RawLabel>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|label| match label {
            RawLabel::Text(s) => s,
            RawLabel::Int(n) => n.to_string(),
            RawLabel::Float(x) => x.to_string(),
        })
        .collect())
}

impl EnergyTable {
    /// Limit for the energy label at `index`, if in range.
    pub fn limit_at(&self, index: usize) -> Option<u32> {
        self.evs.get(index).copied()
    }

    /// Position of `label` in the energy list (exact string match).
    pub fn position(&self, label: &str) -> Option<usize> {
        self.energy.iter().position(|e| e == label)
    }
}

impl SelectionCatalog {
    /// Load and validate the catalogue from a JSON file.
    ///
    /// A missing or malformed file is a fatal startup condition for the
    /// events screen; the error carries the underlying cause.
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parse and validate the catalogue from a JSON string.
    pub fn from_json(text: &str) -> AppResult<Self> {
        let catalog: Self = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Shape validation, run once after parsing.
    ///
    /// Checks:
    /// - `flavours.name` and `flavours.symbol` are non-empty and index-aligned
    /// - flavour names are unique and none collides with the background sentinel
    /// - both energy tables are non-empty with `energy`/`evs` index-aligned
    pub fn validate(&self) -> AppResult<()> {
        if self.flavours.name.is_empty() {
            return Err(AppError::Catalog("flavour list is empty".to_string()));
        }
        if self.flavours.name.len() != self.flavours.symbol.len() {
            return Err(AppError::Catalog(format!(
                "flavours.name has {} entries but flavours.symbol has {}",
                self.flavours.name.len(),
                self.flavours.symbol.len()
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.flavours.name {
            if name == BACKGROUND {
                return Err(AppError::Catalog(format!(
                    "flavour name '{name}' collides with the background sentinel"
                )));
            }
            if !seen.insert(name) {
                return Err(AppError::Catalog(format!("duplicate flavour name '{name}'")));
            }
        }

        for (label, table) in [("background", &self.background), ("neutrino", &self.neutrino)] {
            if table.energy.is_empty() {
                return Err(AppError::Catalog(format!("{label}.energy is empty")));
            }
            if table.energy.len() != table.evs.len() {
                return Err(AppError::Catalog(format!(
                    "{label}.energy has {} entries but {label}.evs has {}",
                    table.energy.len(),
                    table.evs.len()
                )));
            }
        }

        Ok(())
    }

    /// The energy table backing `flavour`.
    ///
    /// The background sentinel has its own table; every configured neutrino
    /// flavour shares the `neutrino` table.
    pub fn table(&self, flavour: &str) -> &EnergyTable {
        if flavour == BACKGROUND {
            &self.background
        } else {
            &self.neutrino
        }
    }

    /// Ordered energy labels offered for `flavour`.
    pub fn energies(&self, flavour: &str) -> &[String] {
        &self.table(flavour).energy
    }

    /// Map a display symbol back to its internal flavour name.
    ///
    /// Returns the input unchanged when it is not a configured symbol —
    /// this is how the background sentinel (which has no symbol) passes
    /// through the dropdown unchanged.
    pub fn name_for_symbol<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.flavours
            .symbol
            .iter()
            .position(|s| s == symbol)
            .and_then(|idx| self.flavours.name.get(idx))
            .map_or(symbol, String::as_str)
    }

    /// Display symbol for an internal flavour name, if configured.
    pub fn symbol_for_name(&self, name: &str) -> Option<&str> {
        self.flavours
            .name
            .iter()
            .position(|n| n == name)
            .and_then(|idx| self.flavours.symbol.get(idx))
            .map(String::as_str)
    }

    /// Dropdown entries for the flavour selector: every configured display
    /// symbol followed by the background sentinel.
    pub fn flavour_options(&self) -> Vec<String> {
        let mut options = self.flavours.symbol.clone();
        options.push(BACKGROUND.to_string());
        options
    }
}
