//! Terminal rendering of debts and summaries.

use colored::Colorize;
use models::{Debt, DebtStatus, DebtSummary};

const BAR_WIDTH: usize = 30;

/// Colombian peso formatting without decimals: `$ 1.234.567`.
pub fn cop(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if negative { format!("-$ {grouped}") } else { format!("$ {grouped}") }
}

pub fn status_label(status: DebtStatus) -> String {
    match status {
        DebtStatus::Paid => "Pagada".green().to_string(),
        DebtStatus::Pending => "Pendiente".yellow().to_string(),
    }
}

pub fn print_debts(debts: &[Debt]) {
    if debts.is_empty() {
        println!("No hay deudas para mostrar.");
        return;
    }
    println!("{:<38} {:<28} {:>16}  {:<10} {}", "ID".bold(), "Título".bold(), "Monto".bold(), "Estado".bold(), "Creada".bold());
    for d in debts {
        println!(
            "{:<38} {:<28} {:>16}  {:<10} {}",
            d.id,
            truncate(&d.title, 28),
            cop(d.amount),
            status_label(d.status),
            d.created_at.format("%-d/%-m/%Y")
        );
    }
}

pub fn print_detail(d: &Debt) {
    println!("{}", "Detalle de la deuda".bold());
    println!("  Título: {}", d.title);
    println!("  Monto: {}", cop(d.amount));
    println!("  Estado: {}", status_label(d.status));
    println!("  Fecha de creación: {}", d.created_at.format("%-d/%-m/%Y"));
    if let Some(paid_at) = d.paid_at {
        println!("  Fecha de pago: {}", paid_at.format("%-d/%-m/%Y"));
    }
}

/// Two-bar chart of paid vs pending totals.
pub fn print_summary(s: &DebtSummary) {
    let max = s.total_pagado.max(s.total_pendiente);
    let bar = |value: f64| {
        if max <= 0.0 {
            return String::new();
        }
        let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
        "█".repeat(len)
    };
    println!("{:<10} {:<30} {} ({})", "Pagado", bar(s.total_pagado).green(), cop(s.total_pagado), s.cantidad_pagadas);
    println!("{:<10} {:<30} {} ({})", "Pendiente", bar(s.total_pendiente).yellow(), cop(s.total_pendiente), s.cantidad_pendientes);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
