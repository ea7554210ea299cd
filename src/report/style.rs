//! Terminal styling helpers shared by the console report and the CLI

use colored::*;

const W: usize = 58; // box inner width

pub(crate) fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
pub(crate) fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
pub(crate) fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
pub(crate) fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
pub(crate) fn warn(s: &str) -> ColoredString   { s.truecolor(240, 110, 100) }

pub(crate) fn line_box_top()    { println!("  {}", dim("┌──────────────────────────────────────────────────────────┐")); }
pub(crate) fn line_box_bottom() { println!("  {}", dim("└──────────────────────────────────────────────────────────┘")); }
pub(crate) fn line_box_sep()    { println!("  {}", dim("├──────────────────────────────────────────────────────────┤")); }

pub(crate) fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len + 2);
    println!("  {}  {}{}{}", dim("│"), content, " ".repeat(pad), dim("│"));
}

pub(crate) fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}{}{}{}{}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

pub(crate) fn line_box_empty() { line_box_center(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

pub(crate) fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

pub(crate) fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

pub(crate) fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

pub(crate) fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}
