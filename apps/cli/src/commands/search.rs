//! Autocomplete commands.
//!
//! `search --watch` treats each stdin line as the current contents of the
//! search box: lines arriving inside the debounce window replace each other
//! and only the last one is searched.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use kero_core::search::{autocomplete, item_details, Autocomplete};
use kero_core::CatalogItem;
use kero_remote::Debouncer;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cli::SearchArgs;
use crate::commands::catalog::NOT_LOADED_MESSAGE;
use crate::error::{AppError, AppResult};
use crate::output::{write_json, Table};
use crate::state::AppState;

pub async fn search(state: &AppState, out: &mut dyn Write, args: SearchArgs) -> AppResult<()> {
    if args.watch {
        let stdin = BufReader::new(tokio::io::stdin());
        return watch_terms(state, stdin, out, state.config.debounce()).await;
    }

    let term = args
        .term
        .ok_or_else(|| AppError::validation("Enter a code or name to search."))?;
    let catalog = loaded_catalog(state).await?;
    let result = autocomplete(&catalog, &term);
    debug!(term = %term, open = result.is_open(), "Search ran");

    if state.json {
        let items: Vec<&CatalogItem> = match &result {
            Autocomplete::Hidden => Vec::new(),
            Autocomplete::Exact(item) => vec![*item],
            Autocomplete::Suggestions(items) => items.clone(),
        };
        write_json(out, &items)?;
    } else {
        render(out, &result)?;
    }
    Ok(())
}

/// Fills name and supplier for an exact code.
pub async fn lookup(state: &AppState, out: &mut dyn Write, code: &str) -> AppResult<()> {
    let catalog = loaded_catalog(state).await?;
    let details = item_details(&catalog, code);
    if details.name.is_empty() && details.supplier.is_empty() {
        return Err(AppError::not_found("Item", code.trim()));
    }

    if state.json {
        write_json(
            out,
            &serde_json::json!({ "name": details.name, "supplier": details.supplier }),
        )?;
    } else {
        writeln!(out, "Name: {}", details.name)?;
        writeln!(out, "Supplier: {}", details.supplier)?;
    }
    Ok(())
}

/// Debounced search over lines from `reader`. Returns at end of input, after
/// the last pending search has run.
pub async fn watch_terms<R>(
    state: &AppState,
    reader: R,
    out: &mut dyn Write,
    delay: Duration,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let catalog = Arc::new(loaded_catalog(state).await?);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let mut debouncer = Debouncer::new(delay);
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(term) => {
                    let catalog = Arc::clone(&catalog);
                    let tx = tx.clone();
                    debouncer.call(async move {
                        match render_to_string(&catalog, &term) {
                            // The receiver only goes away once the watch has returned.
                            Ok(text) => { let _ = tx.send(text); }
                            Err(e) => warn!(error = %e, "Could not render suggestions"),
                        }
                    });
                }
                None => break,
            },
            Some(text) = rx.recv() => out.write_all(text.as_bytes())?,
        }
    }

    debouncer.settle().await;
    while let Ok(text) = rx.try_recv() {
        out.write_all(text.as_bytes())?;
    }
    Ok(())
}

async fn loaded_catalog(state: &AppState) -> AppResult<Vec<CatalogItem>> {
    let catalog = state.workspace.catalog().await?;
    if catalog.is_empty() {
        return Err(AppError::validation(NOT_LOADED_MESSAGE));
    }
    Ok(catalog)
}

fn render_to_string(catalog: &[CatalogItem], term: &str) -> io::Result<String> {
    let mut buf = Vec::new();
    writeln!(buf, "> {}", term.trim())?;
    render(&mut buf, &autocomplete(catalog, term))?;
    String::from_utf8(buf).map_err(io::Error::other)
}

fn render(out: &mut dyn Write, result: &Autocomplete<'_>) -> io::Result<()> {
    match result {
        Autocomplete::Hidden => writeln!(out, "No matches."),
        Autocomplete::Exact(item) => writeln!(out, "{}  {}  ({})", item.code, item.name, item.supplier),
        Autocomplete::Suggestions(items) => {
            let mut table = Table::new(["Code", "Name", "Supplier"]);
            for item in items {
                table.row([item.code.as_str(), item.name.as_str(), item.supplier.as_str()]);
            }
            table.write_to(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_exact_match_is_one_line() {
        let catalog = vec![
            CatalogItem::new("A1", "Widget", "X"),
            CatalogItem::new("A10", "Widget XL", "Y"),
        ];
        let text = render_to_string(&catalog, "A1").unwrap();
        assert_eq!(text, "> A1\nA1  Widget  (X)\n");
    }

    #[test]
    fn test_render_no_matches() {
        let catalog = vec![CatalogItem::new("A1", "Widget", "X")];
        let text = render_to_string(&catalog, "zzz").unwrap();
        assert!(text.ends_with("No matches.\n"));
    }
}
