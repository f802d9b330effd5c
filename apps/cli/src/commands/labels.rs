//! # Shelf-Label Commands
//!
//! ```text
//! setup ──► items / select / select-all ──► staged ──► queue ──► preview
//!   │            (selection)                 (default    (print     (labels
//!   │                                         price)      jobs)      per page)
//!   └── price category: assigned branch ──► branch-category mapping,
//!       otherwise --category
//! ```
//!
//! Selection, queue and category persist between commands; `setup` starts a
//! fresh label session.

use std::io::Write;

use kero_core::label::{
    queue_staged_item, resolve_category, search_label_items, staged_items, ActiveCategory,
    LabelItem, LabelSearchField, LabelSelection, PageLayout, PrintQueue,
};
use kero_core::session::Session;
use kero_core::{CoreError, FieldErrors};
use kero_remote::labels::{categories_failed_message, items_failed_message};
use tracing::{info, warn};

use crate::cli::{LabelFilterArgs, LabelsCommand};
use crate::error::{AppError, AppResult};
use crate::output::{write_json, Table};
use crate::state::AppState;

pub const MANUAL_CATEGORY_MESSAGE: &str =
    "اختر فئة السعر: لم يتم تحديد فرعك تلقائياً. الرجاء الاختيار يدوياً (--category).";
pub const NOTHING_SELECTED_MESSAGE: &str = "لم يتم تحديد أي صنف.";
pub const NOT_SET_UP_MESSAGE: &str = "No label session. Run `kero labels setup` first.";

pub async fn handle(state: &AppState, out: &mut dyn Write, cmd: LabelsCommand) -> AppResult<()> {
    let session = state.require_session().await?;
    match cmd {
        LabelsCommand::Setup { category } => setup(state, out, &session, category.as_deref()).await,
        LabelsCommand::Items(filter) => items(state, out, &filter).await,
        LabelsCommand::Select { ids } => select(state, out, &ids).await,
        LabelsCommand::Deselect { ids } => deselect(state, out, &ids).await,
        LabelsCommand::SelectAll(filter) => select_visible(state, out, &filter, true).await,
        LabelsCommand::DeselectAll(filter) => select_visible(state, out, &filter, false).await,
        LabelsCommand::Staged => staged(state, out).await,
        LabelsCommand::Queue {
            id,
            price,
            quantity,
        } => queue(state, out, id, price, &quantity).await,
        LabelsCommand::Dequeue { job } => dequeue(state, out, job).await,
        LabelsCommand::Preview => preview(state, out).await,
        LabelsCommand::ClearQueue => clear_queue(state, out).await,
    }
}

// =============================================================================
// Setup
// =============================================================================

/// Resolves the price category and loads the label items.
///
/// The category comes from the session's assigned branch when the mapping
/// has one; `manual` is only used otherwise.
pub async fn setup(
    state: &AppState,
    out: &mut dyn Write,
    session: &Session,
    manual: Option<&str>,
) -> AppResult<()> {
    let api = state.labels_api()?;

    let mappings = api
        .branch_categories()
        .await
        .map_err(|e| AppError::remote(categories_failed_message(&e)))?;

    let assigned = session.permissions.assigned_branch_code();
    let active = match resolve_category(&mappings, assigned.as_deref()) {
        Some(active) => active,
        None => {
            if let Some(code) = &assigned {
                warn!(code = %code, "Assigned branch has no price category; falling back to manual");
            }
            let manual = manual
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| AppError::validation(MANUAL_CATEGORY_MESSAGE))?;
            ActiveCategory {
                category: manual.to_lowercase(),
                display_name: manual.to_string(),
            }
        }
    };

    let items = api
        .items()
        .await
        .map_err(|e| AppError::remote(items_failed_message(&e)))?;

    state.workspace.save_label_items(&items).await?;
    state.workspace.save_label_category(&active).await?;
    state.workspace.save_label_selection(&LabelSelection::default()).await?;
    state.workspace.save_print_queue(&PrintQueue::default()).await?;
    info!(category = %active.category, items = items.len(), "Label session started");

    writeln!(out, "فئة السعر النشطة: {}", active.display_name)?;
    writeln!(out, "تم تحميل {} صنف بنجاح.", items.len())?;
    Ok(())
}

struct LabelSession {
    items: Vec<LabelItem>,
    category: ActiveCategory,
    selection: LabelSelection,
    queue: PrintQueue,
}

async fn load_session(state: &AppState) -> AppResult<LabelSession> {
    let category = state
        .workspace
        .label_category()
        .await?
        .ok_or_else(|| AppError::validation(NOT_SET_UP_MESSAGE))?;
    Ok(LabelSession {
        items: state.workspace.label_items().await?,
        category,
        selection: state.workspace.label_selection().await?,
        queue: state.workspace.print_queue().await?,
    })
}

// =============================================================================
// Item Selection
// =============================================================================

pub async fn items(state: &AppState, out: &mut dyn Write, filter: &LabelFilterArgs) -> AppResult<()> {
    let session = load_session(state).await?;
    let visible = visible_items(&session.items, filter);

    if state.json {
        write_json(out, &visible)?;
        return Ok(());
    }

    let mut table = Table::new(["", "ID", "Code", "Name", "Price"]);
    for item in &visible {
        table.row([
            if session.selection.contains(item.id) { "*" } else { "" }.to_string(),
            item.id.to_string(),
            item.code.clone(),
            item.name.clone(),
            item.price_for(&session.category.category).format_fixed(2),
        ]);
    }
    table.write_to(out)?;
    writeln!(out, "{} صنف محدد", session.selection.len())?;
    Ok(())
}

pub async fn select(state: &AppState, out: &mut dyn Write, ids: &[u64]) -> AppResult<()> {
    let mut session = load_session(state).await?;
    for id in ids {
        if !session.items.iter().any(|item| item.id == *id) {
            return Err(CoreError::LabelItemNotFound(*id).into());
        }
    }
    for id in ids {
        session.selection.select(*id);
    }
    state.workspace.save_label_selection(&session.selection).await?;
    writeln!(out, "{} صنف محدد", session.selection.len())?;
    Ok(())
}

pub async fn deselect(state: &AppState, out: &mut dyn Write, ids: &[u64]) -> AppResult<()> {
    let mut session = load_session(state).await?;
    for id in ids {
        session.selection.remove(*id);
    }
    state.workspace.save_label_selection(&session.selection).await?;
    writeln!(out, "{} صنف محدد", session.selection.len())?;
    Ok(())
}

/// Selects or deselects every item the filter shows.
pub async fn select_visible(
    state: &AppState,
    out: &mut dyn Write,
    filter: &LabelFilterArgs,
    selected: bool,
) -> AppResult<()> {
    let mut session = load_session(state).await?;
    let visible: Vec<u64> = visible_items(&session.items, filter)
        .iter()
        .map(|item| item.id)
        .collect();

    if selected {
        session.selection.select_all(&visible);
    } else {
        session.selection.deselect_all(&visible);
    }
    state.workspace.save_label_selection(&session.selection).await?;
    writeln!(out, "{} صنف محدد", session.selection.len())?;
    Ok(())
}

fn visible_items<'a>(items: &'a [LabelItem], filter: &LabelFilterArgs) -> Vec<&'a LabelItem> {
    let field: LabelSearchField = filter.field;
    search_label_items(items, field, filter.query.as_deref().unwrap_or(""))
}

// =============================================================================
// Staging & Print Queue
// =============================================================================

pub async fn staged(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let session = load_session(state).await?;
    let staged = staged_items(&session.items, &session.selection, &session.category.category);

    if staged.is_empty() {
        writeln!(out, "{}", NOTHING_SELECTED_MESSAGE)?;
        return Ok(());
    }

    let mut table = Table::new(["ID", "Code", "Name", "Price"]);
    for s in &staged {
        let code = if s.item.code.is_empty() { "N/A" } else { s.item.code.as_str() };
        table.row([s.item.id.to_string(), code.to_string(), s.item.name.clone(), s.default_price.clone()]);
    }
    table.write_to(out)?;
    writeln!(out, "{} أصناف جاهزة للتجهيز.", staged.len())?;
    Ok(())
}

/// Moves a staged item into the print queue.
///
/// Without `--price` the category price is used, as shown by `staged`.
pub async fn queue(
    state: &AppState,
    out: &mut dyn Write,
    id: u64,
    price: Option<String>,
    quantity: &str,
) -> AppResult<()> {
    let mut session = load_session(state).await?;
    if !session.selection.contains(id) {
        return Err(AppError::validation(format!(
            "Item {} is not staged. Select it with `kero labels select {}`.",
            id, id
        )));
    }

    let price = match price {
        Some(price) => price,
        None => session
            .items
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.price_for(&session.category.category).format_fixed(2))
            .unwrap_or_default(),
    };

    let job = queue_staged_item(
        &session.items,
        &mut session.selection,
        &mut session.queue,
        id,
        &price,
        quantity,
    )
    .map_err(staging_error)?;

    state.workspace.save_print_queue(&session.queue).await?;
    state.workspace.save_label_selection(&session.selection).await?;
    info!(job = job.id, item = id, quantity = job.quantity, "Label job queued");

    writeln!(out, "#{}  {}  {}  x{}", job.id, job.name, job.price_text(), job.quantity)?;
    writeln!(out, "الإجمالي: {} بطاقة", session.queue.total_labels())?;
    Ok(())
}

pub async fn dequeue(state: &AppState, out: &mut dyn Write, job: u64) -> AppResult<()> {
    let mut session = load_session(state).await?;
    let removed = session.queue.remove(job)?;
    state.workspace.save_print_queue(&session.queue).await?;

    writeln!(out, "Removed #{} {}", removed.id, removed.name)?;
    writeln!(out, "الإجمالي: {} بطاقة", session.queue.total_labels())?;
    Ok(())
}

/// Every label in print order, one line each, then the page capacity.
pub async fn preview(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let session = load_session(state).await?;
    let layout = PageLayout::default();
    let total = session.queue.total_labels();

    if state.json {
        write_json(out, session.queue.jobs())?;
        return Ok(());
    }

    let per_page = layout.labels_per_page().max(1) as usize;
    for (i, job) in session.queue.expand().iter().enumerate() {
        if i > 0 && i % per_page == 0 {
            writeln!(out, "--- page break ---")?;
        }
        writeln!(out, "{}  {}", job.name, job.price_text())?;
    }
    writeln!(
        out,
        "سعة الصفحة: {} بطاقات | القائمة: {} بطاقة",
        layout.labels_per_page(),
        total
    )?;
    writeln!(out, "Pages: {}", layout.pages_for(total))?;
    Ok(())
}

pub async fn clear_queue(state: &AppState, out: &mut dyn Write) -> AppResult<()> {
    let mut session = load_session(state).await?;
    session.queue.clear();
    state.workspace.save_print_queue(&session.queue).await?;
    writeln!(out, "الإجمالي: 0 بطاقة")?;
    Ok(())
}

/// Staging failures report the first field's own message.
fn staging_error(err: CoreError) -> AppError {
    match err {
        CoreError::Form(errors) => AppError::validation(first_message(&errors)),
        other => other.into(),
    }
}

fn first_message(errors: &FieldErrors) -> String {
    errors
        .iter()
        .next()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| errors.to_string())
}
