//! # Shelf Labels
//!
//! Item selection, price staging and the print queue for shelf labels.
//!
//! ## Label Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shelf Label Flow                                │
//! │                                                                         │
//! │   Label catalog          Selection            Print queue               │
//! │   ─────────────          ─────────            ───────────               │
//! │   search(field, q) ───►  toggle / all /  ───► add(price > 0, qty ≥ 1)   │
//! │   (name | code)          none (visible)       remove(job id)            │
//! │                               │                     │                   │
//! │                               ▼                     ▼                   │
//! │                    default price from        A4 layout: 8 per page      │
//! │                    the active category       one label per unit qty     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult, FieldErrors};
use crate::money::{self, Money};
use crate::pricing::parse_units_lenient;
use crate::types::loose;

/// Currency suffix printed after label prices.
pub const CURRENCY_SUFFIX: &str = "ج.م";

pub const INVALID_PRICE_MESSAGE: &str = "الرجاء إدخال سعر صحيح.";
pub const INVALID_QUANTITY_MESSAGE: &str = "الرجاء إدخال كمية صحيحة.";

/// Most labels one queued job may print.
pub const MAX_LABEL_QUANTITY: u32 = 1_000;

// =============================================================================
// Label Catalog
// =============================================================================

/// An item row as returned by `getItems`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLabelItem {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(deserialize_with = "loose::string", default)]
    pub name: String,

    #[serde(deserialize_with = "loose::string", default)]
    pub code: String,

    #[serde(default)]
    pub prices: BTreeMap<String, Value>,
}

/// A printable item with its price per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelItem {
    pub id: u64,
    pub name: String,
    pub code: String,
    pub prices: BTreeMap<String, Money>,
}

impl LabelItem {
    /// Price for a category, zero when the category has no price.
    pub fn price_for(&self, category: &str) -> Money {
        self.prices.get(category).copied().unwrap_or_default()
    }
}

/// Assigns ids to raw rows: the row's own id, else its position.
pub fn label_items_from_rows(rows: Vec<RawLabelItem>) -> Vec<LabelItem> {
    rows.into_iter()
        .enumerate()
        .map(|(index, raw)| LabelItem {
            id: raw.id.unwrap_or(index as u64),
            name: raw.name,
            code: raw.code,
            prices: raw
                .prices
                .iter()
                .filter_map(|(category, value)| {
                    money::decimal::from_value(value)
                        .ok()
                        .map(|price| (category.clone(), price))
                })
                .collect(),
        })
        .collect()
}

/// Field the label search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelSearchField {
    #[default]
    Name,
    Code,
}

impl std::str::FromStr for LabelSearchField {
    type Err = crate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(LabelSearchField::Name),
            "code" => Ok(LabelSearchField::Code),
            _ => Err(crate::ValidationError::NotAllowed {
                field: "field".to_string(),
                allowed: vec!["name".to_string(), "code".to_string()],
            }),
        }
    }
}

/// Substring search on one field. An empty query returns every item.
pub fn search_label_items<'a>(
    items: &'a [LabelItem],
    field: LabelSearchField,
    query: &str,
) -> Vec<&'a LabelItem> {
    let needle = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| {
            if needle.is_empty() {
                return true;
            }
            let haystack = match field {
                LabelSearchField::Name => &item.name,
                LabelSearchField::Code => &item.code,
            };
            haystack.to_lowercase().contains(&needle)
        })
        .collect()
}

// =============================================================================
// Price Category
// =============================================================================

/// Branch to price-category mapping from `getBranchCategories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchCategory {
    #[serde(deserialize_with = "loose::string", default)]
    pub branch_code: String,

    #[serde(deserialize_with = "loose::string", default)]
    pub branch_name: String,

    #[serde(deserialize_with = "loose::string", default)]
    pub category: String,
}

/// The price category a label session runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCategory {
    pub category: String,
    pub display_name: String,
}

/// Resolves the category from the user's assigned branch.
///
/// `None` means the operator has to pick a category by hand.
pub fn resolve_category(
    mappings: &[BranchCategory],
    assigned_branch_code: Option<&str>,
) -> Option<ActiveCategory> {
    let code = assigned_branch_code?.trim();
    if code.is_empty() {
        return None;
    }
    mappings
        .iter()
        .find(|m| m.branch_code.trim() == code)
        .filter(|m| !m.category.trim().is_empty())
        .map(|m| ActiveCategory {
            category: m.category.to_lowercase(),
            display_name: m.branch_name.clone(),
        })
}

// =============================================================================
// Selection
// =============================================================================

/// Items picked for staging, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelection {
    ids: Vec<u64>,
}

impl LabelSelection {
    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Flips one item. Returns true if the item is now selected.
    pub fn toggle(&mut self, id: u64) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn select(&mut self, id: u64) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| *x != id);
        self.ids.len() != before
    }

    pub fn select_all(&mut self, visible: &[u64]) {
        for id in visible {
            self.select(*id);
        }
    }

    pub fn deselect_all(&mut self, visible: &[u64]) {
        self.ids.retain(|id| !visible.contains(id));
    }

    /// True when there is something visible and all of it is selected.
    pub fn all_selected(&self, visible: &[u64]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.contains(*id))
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A selected item ready to be priced, with its default price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedItem<'a> {
    pub item: &'a LabelItem,
    pub default_price: String,
}

/// Staged items for the active category. Ids no longer in the catalog are
/// skipped.
pub fn staged_items<'a>(
    items: &'a [LabelItem],
    selection: &LabelSelection,
    category: &str,
) -> Vec<StagedItem<'a>> {
    selection
        .ids()
        .iter()
        .filter_map(|id| items.iter().find(|item| item.id == *id))
        .map(|item| StagedItem {
            item,
            default_price: item.price_for(category).format_fixed(2),
        })
        .collect()
}

// =============================================================================
// Print Queue
// =============================================================================

/// One queued label run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelJob {
    pub id: u64,
    pub name: String,
    #[serde(with = "money::decimal")]
    pub price: Money,
    pub quantity: u32,
}

impl LabelJob {
    /// Price as printed on the label: `12.50 ج.م`.
    pub fn price_text(&self) -> String {
        format!("{} {}", self.price.format_fixed(2), CURRENCY_SUFFIX)
    }
}

/// Checks the staging price and quantity fields.
///
/// Reports the first failing field only, price before quantity.
pub fn validate_staging(price_text: &str, quantity_text: &str) -> Result<(Money, u32), FieldErrors> {
    let mut errors = FieldErrors::default();

    let price = match Money::parse_prefix(price_text) {
        Some(price) if price.is_positive() => price,
        _ => {
            errors.push("price", INVALID_PRICE_MESSAGE);
            return Err(errors);
        }
    };

    let quantity = parse_units_lenient(quantity_text);
    match u32::try_from(quantity) {
        Ok(quantity) if (1..=MAX_LABEL_QUANTITY).contains(&quantity) => Ok((price, quantity)),
        _ => {
            errors.push("quantity", INVALID_QUANTITY_MESSAGE);
            Err(errors)
        }
    }
}

/// Queued label jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintQueue {
    jobs: Vec<LabelJob>,
    next_id: u64,
}

impl Default for PrintQueue {
    fn default() -> Self {
        PrintQueue {
            jobs: Vec::new(),
            next_id: 1,
        }
    }
}

impl PrintQueue {
    /// Validates the staging fields and queues a job for `item`.
    pub fn add(&mut self, item: &LabelItem, price_text: &str, quantity_text: &str) -> CoreResult<&LabelJob> {
        let (price, quantity) = validate_staging(price_text, quantity_text)?;
        let id = self.next_id;
        self.next_id += 1;
        self.jobs.push(LabelJob {
            id,
            name: item.name.clone(),
            price,
            quantity,
        });
        self.jobs.last().ok_or(CoreError::PrintJobNotFound(id))
    }

    pub fn remove(&mut self, id: u64) -> CoreResult<LabelJob> {
        let index = self
            .jobs
            .iter()
            .position(|job| job.id == id)
            .ok_or(CoreError::PrintJobNotFound(id))?;
        Ok(self.jobs.remove(index))
    }

    pub fn jobs(&self) -> &[LabelJob] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Sum of quantities over all jobs.
    pub fn total_labels(&self) -> u64 {
        self.jobs.iter().map(|job| u64::from(job.quantity)).sum()
    }

    /// One entry per printed label, in queue order.
    pub fn expand(&self) -> Vec<&LabelJob> {
        self.jobs
            .iter()
            .flat_map(|job| std::iter::repeat(job).take(job.quantity as usize))
            .collect()
    }
}

/// Moves a staged item into the print queue and drops it from the selection.
pub fn queue_staged_item(
    items: &[LabelItem],
    selection: &mut LabelSelection,
    queue: &mut PrintQueue,
    item_id: u64,
    price_text: &str,
    quantity_text: &str,
) -> CoreResult<LabelJob> {
    let item = items
        .iter()
        .find(|item| item.id == item_id)
        .ok_or(CoreError::LabelItemNotFound(item_id))?;
    let job = queue.add(item, price_text, quantity_text)?.clone();
    selection.remove(item_id);
    Ok(job)
}

// =============================================================================
// Page Layout
// =============================================================================

/// Vertical layout of one label column on a page, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub page_height_mm: u32,
    pub margin_mm: u32,
    pub label_height_mm: u32,
    pub gap_mm: u32,
}

impl Default for PageLayout {
    /// A4 portrait.
    fn default() -> Self {
        PageLayout {
            page_height_mm: 297,
            margin_mm: 10,
            label_height_mm: 30,
            gap_mm: 5,
        }
    }
}

impl PageLayout {
    pub fn printable_height_mm(&self) -> u32 {
        self.page_height_mm.saturating_sub(self.margin_mm * 2)
    }

    /// `floor((printable + gap) / (label + gap))`
    pub fn labels_per_page(&self) -> u32 {
        let pitch = self.label_height_mm + self.gap_mm;
        if pitch == 0 {
            return 0;
        }
        (self.printable_height_mm() + self.gap_mm) / pitch
    }

    pub fn pages_for(&self, labels: u64) -> u64 {
        let per_page = u64::from(self.labels_per_page());
        if per_page == 0 {
            return 0;
        }
        labels.div_ceil(per_page)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
