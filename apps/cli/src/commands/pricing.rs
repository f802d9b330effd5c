//! Calculator command.

use std::io::Write;

use kero_core::pricing::CalculatorInput;
use serde_json::json;
use tracing::debug;

use crate::cli::PriceArgs;
use crate::error::AppResult;
use crate::output::write_json;
use crate::state::AppState;

/// Evaluates the calculator fields; with `--apply` the unit price goes into
/// the entry form and units/discount/VAT are kept for the next ledger line.
pub async fn price(state: &AppState, out: &mut dyn Write, args: PriceArgs) -> AppResult<()> {
    let input = CalculatorInput::new(args.cost, args.units, args.discount, args.vat);
    let outcome = input.evaluate();
    debug!(cost = %input.cost, units = %input.units, %outcome, "Calculator evaluated");

    if state.json {
        let body = match outcome.quote() {
            Some(q) => json!({
                "unitPrice": q.unit_price.to_string(),
                "casePrice": q.case_price.to_string(),
            }),
            None => json!({ "error": outcome.to_string() }),
        };
        write_json(out, &body)?;
    } else {
        match outcome.quote() {
            Some(q) => {
                writeln!(out, "Unit price: {}", q.unit_price)?;
                writeln!(out, "Case price: {}", q.case_price)?;
            }
            None => {
                writeln!(out, "Unit price: {}", outcome)?;
                writeln!(out, "Case price: {}", outcome)?;
            }
        }
    }

    if args.apply {
        let applied = input.apply()?;
        let unit_price = applied.quote.unit_price.to_string();
        state.workspace.set_pending_unit_price(&unit_price).await?;
        state.workspace.save_calculator_memory(&applied.memory).await?;
        debug!(
            unit_price = %unit_price,
            units = applied.memory.units,
            "Calculator price applied"
        );
        if !state.json {
            writeln!(
                out,
                "Applied {} to the entry form ({} units, {}% discount, {}% VAT).",
                unit_price, applied.memory.units, applied.memory.discount, applied.memory.vat
            )?;
        }
    }

    Ok(())
}
