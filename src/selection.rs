//! The selection validator: entry grammar, limit resolution, and the
//! per-row state machine behind the events form.
//!
//! ## Architecture
//!
//! Each line of the events form is an owned [`Row`] record — chosen flavour,
//! chosen energy, the raw text typed into the event-number field, and the
//! limit resolved for that flavour/energy pair. The GUI mutates rows through
//! the methods here and never stores validation state in widget closures, so
//! the whole flow is testable without a window.
//!
//! ## Validation rules
//!
//! The event-number grammar accepts, in this fixed precedence order:
//!
//! 1. text containing `-`: an inclusive range, split on the FIRST dash
//! 2. text containing `,`: a comma-separated list
//! 3. anything else: a single event number
//!
//! Every parsed value must be at or below the row's limit; ranges must not
//! be inverted. Values are parsed as unsigned integers, which rejects
//! negative event numbers outright. On rejection the stored text is cleared
//! — an empty field is the only signal the operator gets. Empty input is
//! rejected without clearing.
//!
//! ## Limit resolution
//!
//! The limit comes from the catalogue: for the background sentinel it is
//! always the first (and only) background limit, otherwise the limit
//! index-aligned with the chosen energy. A failed lookup is recovered
//! locally by substituting [`DEFAULT_EVENT_LIMIT`]; this permissive
//! fallback is long-standing behaviour and the tests pin it down.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{SelectionCatalog, BACKGROUND};

/// Limit substituted when the flavour/energy pair cannot be resolved
/// against the catalogue.
pub const DEFAULT_EVENT_LIMIT: u32 = 30;

/// A successfully parsed event-number entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventEntry {
    /// A single event number.
    Single(u32),
    /// An inclusive range of event numbers.
    Range {
        /// First event in the range.
        start: u32,
        /// Last event in the range.
        end: u32,
    },
    /// An explicit list of event numbers.
    List(Vec<u32>),
}

impl fmt::Display for EventEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventEntry::Single(n) => write!(f, "{n}"),
            EventEntry::Range { start, end } => write!(f, "{start}-{end}"),
            EventEntry::List(values) => {
                let mut first = true;
                for value in values {
                    if !first {
                        write!(f, ",")?;
                    }
                    write!(f, "{value}")?;
                    first = false;
                }
                Ok(())
            }
        }
    }
}

/// Why an entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// The field was empty or whitespace-only.
    #[error("empty input")]
    Empty,
    /// A token did not parse as an unsigned integer.
    #[error("'{0}' is not a valid event number")]
    Parse(String),
    /// A parsed value exceeds the row limit.
    #[error("event {value} exceeds the limit of {limit}")]
    OverLimit {
        /// The offending value.
        value: u32,
        /// The limit in force.
        limit: u32,
    },
    /// A range runs backwards.
    #[error("range {start}-{end} is inverted")]
    Inverted {
        /// Range start.
        start: u32,
        /// Range end.
        end: u32,
    },
}

/// Why a limit lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The category has no limits configured at all.
    #[error("no limits configured for '{flavour}'")]
    EmptyTable {
        /// The category that was looked up.
        flavour: String,
    },
    /// The energy is not listed for the category.
    #[error("energy '{energy}' is not listed for '{flavour}'")]
    UnknownEnergy {
        /// The category that was looked up.
        flavour: String,
        /// The energy label that could not be found.
        energy: String,
    },
}

/// Parse `text` against the entry grammar and check every value against
/// `limit`.
///
/// This is the pure half of validation: no state, no clearing. [`Row`]
/// wraps it with the clear-on-reject contract.
pub fn validate_entry(text: &str, limit: u32) -> Result<EventEntry, EntryError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EntryError::Empty);
    }

    // Dash takes precedence over comma: "1-3,5" is a malformed range, not
    // a list containing a range.
    if let Some((start_text, end_text)) = trimmed.split_once('-') {
        let start = parse_number(start_text)?;
        let end = parse_number(end_text)?;
        if start > limit {
            return Err(EntryError::OverLimit { value: start, limit });
        }
        if end > limit {
            return Err(EntryError::OverLimit { value: end, limit });
        }
        if start > end {
            return Err(EntryError::Inverted { start, end });
        }
        Ok(EventEntry::Range { start, end })
    } else if trimmed.contains(',') {
        let mut values = Vec::new();
        for token in trimmed.split(',') {
            let value = parse_number(token)?;
            if value > limit {
                return Err(EntryError::OverLimit { value, limit });
            }
            values.push(value);
        }
        Ok(EventEntry::List(values))
    } else {
        let value = parse_number(trimmed)?;
        if value > limit {
            return Err(EntryError::OverLimit { value, limit });
        }
        Ok(EventEntry::Single(value))
    }
}

fn parse_number(token: &str) -> Result<u32, EntryError> {
    let token = token.trim();
    token
        .parse::<u32>()
        .map_err(|_| EntryError::Parse(token.to_string()))
}

/// Resolve the event-count limit for a flavour/energy pair.
///
/// The background sentinel always yields the first background limit,
/// whatever the sub-option says (its only energy label is `"N/A"`).
/// Everything else is located in the shared neutrino energy list by exact
/// string match and mapped to the index-aligned limit.
pub fn resolve_limit(
    catalog: &SelectionCatalog,
    flavour: &str,
    energy: &str,
) -> Result<u32, LookupError> {
    let table = catalog.table(flavour);
    if flavour == BACKGROUND {
        return table.limit_at(0).ok_or_else(|| LookupError::EmptyTable {
            flavour: flavour.to_string(),
        });
    }
    table
        .position(energy)
        .and_then(|index| table.limit_at(index))
        .ok_or_else(|| LookupError::UnknownEnergy {
            flavour: flavour.to_string(),
            energy: energy.to_string(),
        })
}

/// Where a row sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    /// No flavour chosen yet; energy and text entry are disabled.
    Unselected,
    /// Flavour chosen; energy list is offered, text entry still disabled.
    FlavourChosen,
    /// Energy chosen and limit resolved; text entry enabled but empty.
    EnergyChosen,
    /// Text present and awaiting (re)validation.
    TextEntered,
}

/// One line of the events form.
#[derive(Debug, Clone, Default)]
pub struct Row {
    flavour: Option<String>,
    energy: Option<String>,
    /// Raw event-number text as typed. Cleared when validation rejects it.
    pub text: String,
    limit: Option<u32>,
}

impl Row {
    /// A fresh, fully unselected row.
    pub fn new() -> Self {
        Self::default()
    }

    /// The chosen flavour (internal name), if any.
    pub fn flavour(&self) -> Option<&str> {
        self.flavour.as_deref()
    }

    /// The chosen energy label, if any.
    pub fn energy(&self) -> Option<&str> {
        self.energy.as_deref()
    }

    /// The limit in force for this row.
    ///
    /// [`DEFAULT_EVENT_LIMIT`] until an energy has been chosen, and also
    /// when resolution against the catalogue failed.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_EVENT_LIMIT)
    }

    /// Current lifecycle phase, derived from the stored state.
    pub fn phase(&self) -> RowPhase {
        match (&self.flavour, &self.energy) {
            (None, _) => RowPhase::Unselected,
            (Some(_), None) => RowPhase::FlavourChosen,
            (Some(_), Some(_)) if self.text.trim().is_empty() => RowPhase::EnergyChosen,
            (Some(_), Some(_)) => RowPhase::TextEntered,
        }
    }

    /// Choose a flavour, resetting the energy selection and cached limit.
    ///
    /// Re-selecting the current flavour is a no-op so an open dropdown does
    /// not wipe a completed row.
    pub fn select_flavour(&mut self, name: &str) {
        if self.flavour.as_deref() == Some(name) {
            return;
        }
        self.flavour = Some(name.to_string());
        self.energy = None;
        self.limit = None;
    }

    /// Choose an energy and resolve the limit for it.
    ///
    /// The limit is cached on the row until the flavour or energy changes
    /// again. A failed lookup falls back to [`DEFAULT_EVENT_LIMIT`] with a
    /// warning — the row stays usable.
    pub fn select_energy(&mut self, catalog: &SelectionCatalog, energy: &str) {
        let Some(flavour) = self.flavour.as_deref() else {
            // The energy selector is disabled until a flavour is chosen;
            // ignore stray selections.
            return;
        };
        let limit = match resolve_limit(catalog, flavour, energy) {
            Ok(limit) => limit,
            Err(err) => {
                warn!("Failed to resolve event limit for energy {energy}: {err}. Using default {DEFAULT_EVENT_LIMIT}.");
                DEFAULT_EVENT_LIMIT
            }
        };
        self.energy = Some(energy.to_string());
        self.limit = Some(limit);
    }

    /// Validate the stored text against the row limit.
    ///
    /// On acceptance the text is left untouched and the parsed entry is
    /// returned. On rejection the text is cleared — except for empty input,
    /// which is rejected as-is.
    pub fn entry(&mut self) -> Result<EventEntry, EntryError> {
        match validate_entry(&self.text, self.limit()) {
            Ok(entry) => Ok(entry),
            Err(EntryError::Empty) => Err(EntryError::Empty),
            Err(err) => {
                warn!("Rejected event entry '{}': {err}", self.text);
                self.text.clear();
                Err(err)
            }
        }
    }

    /// Edit-commit hook for the GUI: validate and report acceptance.
    pub fn commit_text(&mut self) -> bool {
        self.entry().is_ok()
    }
}

/// Which launch path a submission targets. Forwarded opaquely downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// Pre-rendered display sequence.
    Static,
    /// Live, regenerated display sequence.
    Dynamic,
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitMode::Static => write!(f, "Static"),
            SubmitMode::Dynamic => write!(f, "Dynamic"),
        }
    }
}

/// How strictly a submission treats invalid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// Invalid rows are skipped; one valid row is enough. The designed
    /// behaviour and the default.
    #[default]
    AnyValid,
    /// A single invalid row fails the whole submission.
    AllValid,
}

/// One accepted row of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEvents {
    /// Internal flavour name (or the background sentinel).
    pub flavour: String,
    /// Chosen energy label.
    pub energy: String,
    /// The validated event entry.
    pub events: EventEntry,
}

/// A validated submission ready for dispatch.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Identifier attached to the downstream hand-off.
    pub id: Uuid,
    /// Launch path requested by the operator.
    pub mode: SubmitMode,
    /// Accepted rows, in form order.
    pub rows: Vec<SelectedEvents>,
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// No row survived validation.
    #[error("no valid rows in submission")]
    NoValidRows,
    /// Under [`SubmitPolicy::AllValid`], the first row that failed.
    #[error("row {index} rejected: {reason}")]
    RowRejected {
        /// Zero-based index of the offending row.
        index: usize,
        /// What validation objected to.
        reason: EntryError,
    },
}

/// Re-validate every row with its current limit and collect the survivors.
///
/// Invalid rows are cleared (the usual contract), logged, and — under
/// [`SubmitPolicy::AnyValid`] — skipped. Under [`SubmitPolicy::AllValid`]
/// the first invalid row aborts the submission.
pub fn submit(
    rows: &mut [Row],
    mode: SubmitMode,
    policy: SubmitPolicy,
) -> Result<Submission, SubmitError> {
    let mut accepted = Vec::new();

    for (index, row) in rows.iter_mut().enumerate() {
        let (flavour, energy) = match (row.flavour(), row.energy()) {
            (Some(flavour), Some(energy)) => (flavour.to_string(), energy.to_string()),
            _ => {
                warn!("Invalid input for row {index}: selection incomplete");
                if policy == SubmitPolicy::AllValid {
                    return Err(SubmitError::RowRejected {
                        index,
                        reason: EntryError::Empty,
                    });
                }
                continue;
            }
        };

        match row.entry() {
            Ok(events) => accepted.push(SelectedEvents {
                flavour,
                energy,
                events,
            }),
            Err(reason) => {
                warn!("Invalid input for: {flavour}, {energy}");
                if policy == SubmitPolicy::AllValid {
                    return Err(SubmitError::RowRejected { index, reason });
                }
            }
        }
    }

    if accepted.is_empty() {
        return Err(SubmitError::NoValidRows);
    }

    Ok(Submission {
        id: Uuid::new_v4(),
        mode,
        rows: accepted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> SelectionCatalog {
        SelectionCatalog::from_json(
            r#"{
                "flavours": {
                    "name": ["nu_e", "nu_mu"],
                    "symbol": ["νₑ", "νμ"]
                },
                "background": { "energy": ["N/A"], "evs": [30] },
                "neutrino": { "energy": ["1", "5"], "evs": [10, 50] }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_limit_index_aligned() {
        let catalog = catalog();
        assert_eq!(resolve_limit(&catalog, "nu_e", "1"), Ok(10));
        assert_eq!(resolve_limit(&catalog, "nu_e", "5"), Ok(50));
        assert_eq!(resolve_limit(&catalog, "nu_mu", "5"), Ok(50));
    }

    #[test]
    fn test_resolve_limit_background_ignores_energy() {
        let catalog = catalog();
        // Background always yields its single limit, whatever the sub-option.
        assert_eq!(resolve_limit(&catalog, BACKGROUND, "N/A"), Ok(30));
        assert_eq!(resolve_limit(&catalog, BACKGROUND, "5"), Ok(30));
        assert_eq!(resolve_limit(&catalog, BACKGROUND, ""), Ok(30));
    }

    #[test]
    fn test_resolve_limit_unknown_energy() {
        let catalog = catalog();
        assert_eq!(
            resolve_limit(&catalog, "nu_e", "7"),
            Err(LookupError::UnknownEnergy {
                flavour: "nu_e".to_string(),
                energy: "7".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(validate_entry("", 10), Err(EntryError::Empty));
        assert_eq!(validate_entry("   ", 10), Err(EntryError::Empty));
    }

    #[test]
    fn test_validate_single() {
        assert_eq!(validate_entry("5", 10), Ok(EventEntry::Single(5)));
        assert_eq!(validate_entry("10", 10), Ok(EventEntry::Single(10)));
        assert_eq!(
            validate_entry("15", 10),
            Err(EntryError::OverLimit { value: 15, limit: 10 })
        );
        assert!(matches!(validate_entry("abc", 10), Err(EntryError::Parse(_))));
    }

    #[test]
    fn test_validate_range() {
        assert_eq!(
            validate_entry("1-10", 10),
            Ok(EventEntry::Range { start: 1, end: 10 })
        );
        assert_eq!(
            validate_entry(" 1 - 10 ", 10),
            Ok(EventEntry::Range { start: 1, end: 10 })
        );
        assert_eq!(
            validate_entry("1-11", 10),
            Err(EntryError::OverLimit { value: 11, limit: 10 })
        );
        assert_eq!(
            validate_entry("10-1", 10),
            Err(EntryError::Inverted { start: 10, end: 1 })
        );
    }

    #[test]
    fn test_validate_list() {
        assert_eq!(
            validate_entry("1,2,3", 5),
            Ok(EventEntry::List(vec![1, 2, 3]))
        );
        assert_eq!(
            validate_entry("1, 2, 3", 5),
            Ok(EventEntry::List(vec![1, 2, 3]))
        );
        assert_eq!(
            validate_entry("1,2,9", 5),
            Err(EntryError::OverLimit { value: 9, limit: 5 })
        );
        assert!(matches!(validate_entry("1,x,3", 5), Err(EntryError::Parse(_))));
    }

    #[test]
    fn test_dash_takes_precedence_over_comma() {
        // "1,-2" contains a dash, so it is treated as a (malformed) range.
        assert!(matches!(validate_entry("1,-2", 10), Err(EntryError::Parse(_))));
    }

    #[test]
    fn test_negative_numbers_rejected() {
        // "-3" splits on its dash into an empty start token.
        assert!(matches!(validate_entry("-3", 10), Err(EntryError::Parse(_))));
        assert!(matches!(validate_entry("1,-2,3", 10), Err(EntryError::Parse(_))));
    }

    #[test]
    fn test_accepted_text_is_idempotent() {
        for text in ["5", "1-10", "1,2,3"] {
            let first = validate_entry(text, 10).unwrap();
            let second = validate_entry(text, 10).unwrap();
            assert_eq!(first, second, "{text} should re-validate identically");
        }
    }

    #[test]
    fn test_row_clears_on_rejection() {
        let catalog = catalog();
        let mut row = Row::new();
        row.select_flavour("nu_e");
        row.select_energy(&catalog, "1");
        row.text = "15".to_string();

        assert!(!row.commit_text());
        assert_eq!(row.text, "", "rejected text must be cleared");
    }

    #[test]
    fn test_row_keeps_accepted_text() {
        let catalog = catalog();
        let mut row = Row::new();
        row.select_flavour("nu_e");
        row.select_energy(&catalog, "5");
        row.text = "42".to_string();

        assert!(row.commit_text());
        assert_eq!(row.text, "42", "accepted text must be left untouched");
    }

    #[test]
    fn test_row_empty_text_rejected_without_clearing() {
        let catalog = catalog();
        let mut row = Row::new();
        row.select_flavour("nu_e");
        row.select_energy(&catalog, "1");
        row.text = "   ".to_string();

        assert!(!row.commit_text());
        assert_eq!(row.text, "   ", "empty input is rejected but not cleared");
    }

    #[test]
    fn test_scenario_energy_five_limit_fifty() {
        // Scenario from the requirements: energies ["1","5"], evs [10,50].
        let catalog = catalog();
        let mut row = Row::new();
        row.select_flavour("nu_mu");
        row.select_energy(&catalog, "5");
        assert_eq!(row.limit(), 50);

        row.text = "42".to_string();
        assert!(row.commit_text());

        row.text = "51".to_string();
        assert!(!row.commit_text());
        assert_eq!(row.text, "");
    }

    #[test]
    fn test_row_default_limit_on_lookup_failure() {
        let catalog = catalog();
        let mut row = Row::new();
        row.select_flavour("nu_e");
        // A stale label that is not in the energy list.
        row.select_energy(&catalog, "99");
        assert_eq!(row.limit(), DEFAULT_EVENT_LIMIT);
    }

    #[test]
    fn test_row_phase_transitions() {
        let catalog = catalog();
        let mut row = Row::new();
        assert_eq!(row.phase(), RowPhase::Unselected);

        row.select_flavour("nu_e");
        assert_eq!(row.phase(), RowPhase::FlavourChosen);

        row.select_energy(&catalog, "1");
        assert_eq!(row.phase(), RowPhase::EnergyChosen);
        assert_eq!(row.limit(), 10);

        row.text = "3".to_string();
        assert_eq!(row.phase(), RowPhase::TextEntered);

        // Changing the flavour resets the energy and the cached limit.
        row.select_flavour("nu_mu");
        assert_eq!(row.phase(), RowPhase::FlavourChosen);
        assert_eq!(row.limit(), DEFAULT_EVENT_LIMIT);
    }

    #[test]
    fn test_reselecting_same_flavour_keeps_row() {
        let catalog = catalog();
        let mut row = Row::new();
        row.select_flavour("nu_e");
        row.select_energy(&catalog, "5");
        row.select_flavour("nu_e");
        assert_eq!(row.energy(), Some("5"));
        assert_eq!(row.limit(), 50);
    }

    fn valid_row(catalog: &SelectionCatalog, text: &str) -> Row {
        let mut row = Row::new();
        row.select_flavour("nu_e");
        row.select_energy(catalog, "5");
        row.text = text.to_string();
        row
    }

    #[test]
    fn test_submit_any_valid_skips_bad_rows() {
        let catalog = catalog();
        let mut rows = vec![valid_row(&catalog, "3"), valid_row(&catalog, "abc")];

        let submission =
            submit(&mut rows, SubmitMode::Static, SubmitPolicy::AnyValid).unwrap();
        assert_eq!(submission.mode, SubmitMode::Static);
        assert_eq!(submission.rows.len(), 1);
        assert_eq!(submission.rows[0].events, EventEntry::Single(3));
        // The invalid row was cleared on the way through.
        assert_eq!(rows[1].text, "");
    }

    #[test]
    fn test_submit_all_valid_rejects_on_bad_row() {
        let catalog = catalog();
        let mut rows = vec![valid_row(&catalog, "3"), valid_row(&catalog, "abc")];

        let err = submit(&mut rows, SubmitMode::Dynamic, SubmitPolicy::AllValid).unwrap_err();
        assert!(matches!(err, SubmitError::RowRejected { index: 1, .. }));
    }

    #[test]
    fn test_submit_no_valid_rows() {
        let catalog = catalog();
        let mut rows = vec![valid_row(&catalog, "abc"), Row::new()];

        let err = submit(&mut rows, SubmitMode::Static, SubmitPolicy::AnyValid).unwrap_err();
        assert_eq!(err, SubmitError::NoValidRows);
    }

    #[test]
    fn test_submit_all_valid_accepts_complete_form() {
        let catalog = catalog();
        let mut rows = vec![valid_row(&catalog, "1-10"), valid_row(&catalog, "2,4")];

        let submission =
            submit(&mut rows, SubmitMode::Dynamic, SubmitPolicy::AllValid).unwrap();
        assert_eq!(submission.rows.len(), 2);
        assert_eq!(
            submission.rows[0].events,
            EventEntry::Range { start: 1, end: 10 }
        );
    }

    #[test]
    fn test_event_entry_display() {
        assert_eq!(EventEntry::Single(5).to_string(), "5");
        assert_eq!(EventEntry::Range { start: 1, end: 10 }.to_string(), "1-10");
        assert_eq!(EventEntry::List(vec![1, 2, 3]).to_string(), "1,2,3");
    }
}
