//! Plain-text rendering of command results.
//!
//! Formatters return strings so they stay testable without capturing
//! stdout; the command router does the printing.

use crate::api::operations::{OrdersOverview, SlotDay, Trolley};
use crate::api::types::{Product, SearchResults, Session};

pub fn status(session: Option<&Session>) -> String {
    match session {
        None => "Not logged in.\n".to_string(),
        Some(session) => {
            let mut out = String::new();
            out.push_str("Logged in.\n");
            if !session.customer_id.is_empty() {
                out.push_str(&format!("  customer:  {}\n", session.customer_id));
            }
            if !session.customer_order_id.is_empty() {
                out.push_str(&format!(
                    "  order:     {} ({})\n",
                    session.customer_order_id, session.customer_order_state
                ));
            }
            if !session.default_branch_id.is_empty() {
                out.push_str(&format!("  branch:    {}\n", session.default_branch_id));
            }
            out
        }
    }
}

pub fn search_results(results: &SearchResults) -> String {
    let mut out = format!("{} match(es)\n", results.total_matches);
    for product in &results.products {
        out.push_str(&product_line(product));
    }
    out
}

pub fn products(products: &[Product]) -> String {
    let mut out = String::new();
    for product in products {
        out.push_str(&product_line(product));
    }
    if out.is_empty() {
        out.push_str("No products found.\n");
    }
    out
}

pub fn trolley(trolley: &Trolley) -> String {
    if trolley.trolley_items.is_empty() {
        return "Trolley is empty.\n".to_string();
    }
    let mut out = String::new();
    for item in &trolley.trolley_items {
        let name = item.product_name.as_deref().unwrap_or("(unnamed)");
        let line_number = item.line_number.as_deref().unwrap_or("-");
        match &item.quantity {
            Some(q) => out.push_str(&format!("  {name} [{line_number}] x{} {}\n", q.amount, q.uom)),
            None => out.push_str(&format!("  {name} [{line_number}]\n")),
        }
    }
    out
}

pub fn orders(overview: &OrdersOverview) -> String {
    let mut out = String::new();
    out.push_str(&format!("Pending orders ({}):\n", overview.pending.len()));
    for order in &overview.pending {
        out.push_str(&order_line(order));
    }
    out.push_str(&format!("Previous orders ({}):\n", overview.previous.len()));
    for order in &overview.previous {
        out.push_str(&order_line(order));
    }
    out
}

pub fn slot_days(days: &[SlotDay]) -> String {
    if days.is_empty() {
        return "No slots available.\n".to_string();
    }
    let mut out = String::new();
    for day in days {
        out.push_str(&format!("{}\n", day.date));
        for slot in &day.slots {
            let start = slot.start_date_time.as_deref().unwrap_or("?");
            let end = slot.end_date_time.as_deref().unwrap_or("?");
            let marker = if slot.available { " " } else { "x" };
            out.push_str(&format!("  [{marker}] {start} - {end}\n"));
        }
    }
    out
}

fn product_line(product: &Product) -> String {
    let name = product.name.as_deref().unwrap_or("(unnamed)");
    let line_number = product.line_number.as_deref().unwrap_or(&product.id);
    let mut line = format!("  {name} [{line_number}]");
    if let Some(size) = &product.size {
        line.push_str(&format!(" {size}"));
    }
    if let Some(price) = &product.display_price {
        line.push_str(&format!(" {price}"));
    }
    line.push('\n');
    line
}

fn order_line(order: &crate::api::operations::Order) -> String {
    let status = order.status.as_deref().unwrap_or("?");
    let mut line = format!("  {} {status}", order.customer_order_id);
    if let Some(slot) = &order.slot {
        if let Some(start) = &slot.start_date_time {
            line.push_str(&format!(" slot {start}"));
        }
    }
    if let Some(total) = order.total_estimated_cost {
        line.push_str(&format!(" ~£{total:.2}"));
    }
    line.push('\n');
    line
}
